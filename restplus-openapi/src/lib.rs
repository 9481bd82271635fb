mod builder;
mod ext;
mod handlers;
mod ui;

pub use builder::{build_spec, DocContext, DocView, SwaggerConfig};
pub use ext::SwaggerPlugin;
pub use handlers::swagger_routes;
pub use ui::render_swagger_ui;
