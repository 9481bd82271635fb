use crate::{swagger_routes, SwaggerConfig};
use restplus_core::meta::ApiDoc;
use restplus_core::{Api, Plugin};

/// Plugin serving the Swagger 2.0 document and the documentation page.
///
/// # Example
///
/// ```ignore
/// use restplus_openapi::{SwaggerConfig, SwaggerPlugin};
///
/// Api::new(state)
///     .namespace(todos)
///     .with(SwaggerPlugin::new(SwaggerConfig::new().doc_path("/doc/")))
///     .build()
/// ```
pub struct SwaggerPlugin {
    config: Option<SwaggerConfig>,
}

impl SwaggerPlugin {
    pub fn new(config: SwaggerConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    /// Read the `swagger.*` keys from the configuration attached to the API
    /// with [`Api::with_config`], falling back to defaults.
    pub fn from_config() -> Self {
        Self { config: None }
    }
}

impl Default for SwaggerPlugin {
    fn default() -> Self {
        Self::new(SwaggerConfig::default())
    }
}

impl Plugin for SwaggerPlugin {
    fn install<S: Clone + Send + Sync + 'static>(self, api: Api<S>) -> Api<S> {
        let config = match self.config {
            Some(config) => config,
            None => api
                .config()
                .map(SwaggerConfig::from_config)
                .unwrap_or_default(),
        };
        api.with_meta_consumer::<ApiDoc, _>(move |docs| {
            docs.iter().fold(restplus_core::http::Router::new(), |router, doc| {
                router.merge(swagger_routes::<S>(config.clone(), doc))
            })
        })
    }
}
