use restplus::prelude::*;
use todo_api::{build_api, Todos};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RestConfig::load("dev").unwrap_or_else(|_| RestConfig::empty());
    let addr = config.get_or("server.addr", "0.0.0.0:3000".to_string());

    build_api(Todos::seeded())?
        .with_config(config)
        .with(Tracing)
        .with(Cors::permissive())
        .with(SwaggerPlugin::from_config())
        .with(ErrorHandling)
        .serve(&addr)
        .await
}
