//! Built-in plugins for cross-cutting concerns.

use crate::builder::Api;
use crate::plugin::Plugin;
use tower_http::cors::CorsLayer;

/// API-wide CORS plugin.
///
/// For per-resource headers use [`CrossDomain`](crate::CrossDomain) instead.
pub struct Cors {
    layer: CorsLayer,
}

impl Cors {
    /// Any origin, method and header.
    pub fn permissive() -> Self {
        Self {
            layer: crate::layers::default_cors(),
        }
    }

    pub fn custom(layer: CorsLayer) -> Self {
        Self { layer }
    }
}

impl Plugin for Cors {
    fn install<S: Clone + Send + Sync + 'static>(self, api: Api<S>) -> Api<S> {
        api.with_layer_fn(move |router| router.layer(self.layer))
    }
}

/// Installs the global `tracing` subscriber (see [`init_tracing`](crate::init_tracing))
/// and a tower-http `TraceLayer` logging requests and responses.
///
/// ```ignore
/// Api::new(state)
///     .namespace(todos)
///     .with(Tracing)
///     .serve("0.0.0.0:5000")
///     .await?;
/// ```
pub struct Tracing;

impl Plugin for Tracing {
    fn install<S: Clone + Send + Sync + 'static>(self, api: Api<S>) -> Api<S> {
        crate::layers::init_tracing();
        api.with_layer_fn(|router| router.layer(crate::layers::default_trace()))
    }
}

/// Converts handler panics into JSON 500 responses.
pub struct ErrorHandling;

impl Plugin for ErrorHandling {
    fn install<S: Clone + Send + Sync + 'static>(self, api: Api<S>) -> Api<S> {
        api.with_layer_fn(|router| router.layer(crate::layers::catch_panic_layer()))
    }
}
