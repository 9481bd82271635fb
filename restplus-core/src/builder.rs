use crate::config::RestConfig;
use crate::dispatch::{default_status, Endpoint, Shared};
use crate::error::{ApiError, ErrorHandlers, SpecsError};
use crate::http::{routing, Method, Request, Router, State};
use crate::meta::{
    ApiDoc, ApiInfo, BodyDoc, MetaRegistry, NamespaceDoc, OperationDoc, ParamDoc, ParamLocation,
    ResponseDoc, RouteDoc, TagDoc,
};
use crate::model::Model;
use crate::namespace::Namespace;
use crate::negotiate::{Renderer, Representations, TEXT_PLAIN};
use crate::pattern::RoutePattern;
use crate::plugin::Plugin;
use crate::resource::{Operation, Resource};
use crate::settings::ApiSettings;
use crate::utils::default_id;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

type LayerFn = Box<dyn FnOnce(Router) -> Router + Send>;

/// A meta consumer reads typed metadata from the registry and returns a
/// router fragment to merge into the application.
type MetaConsumer<S> = Box<dyn FnOnce(&MetaRegistry) -> Router<S> + Send>;

/// Builder for a REST API over axum.
///
/// Collects namespaces, resources, models, representations and plugins,
/// checks them once in [`try_build`](Self::try_build) and produces an
/// `axum::Router` (or starts serving directly).
///
/// ```ignore
/// let api = Api::new(state)
///     .info(ApiInfo::new("TodoMVC API", "1.0").description("A simple TodoMVC API"))
///     .namespace(todos)
///     .with(SwaggerPlugin::new())
///     .with(Tracing);
/// api.serve("0.0.0.0:5000").await?;
/// ```
pub struct Api<S: Clone + Send + Sync + 'static = ()> {
    state: S,
    info: ApiInfo,
    prefix: String,
    settings: ApiSettings,
    config: Option<RestConfig>,
    representations: Vec<(String, Renderer)>,
    errors: ErrorHandlers,
    models: Vec<Model>,
    tags: Vec<TagDoc>,
    default_namespace: Namespace<S>,
    namespaces: Vec<Namespace<S>>,
    routes: Vec<Router<S>>,
    custom_layers: Vec<LayerFn>,
    meta_consumers: Vec<MetaConsumer<S>>,
    last_plugin_name: Option<&'static str>,
}

impl<S: Clone + Send + Sync + 'static> Api<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            info: ApiInfo::default(),
            prefix: String::new(),
            settings: ApiSettings::default(),
            config: None,
            representations: Vec::new(),
            errors: ErrorHandlers::default(),
            models: Vec::new(),
            tags: Vec::new(),
            default_namespace: Namespace::new("default")
                .description("Default namespace")
                .path("/"),
            namespaces: Vec::new(),
            routes: Vec::new(),
            custom_layers: Vec::new(),
            meta_consumers: Vec::new(),
            last_plugin_name: None,
        }
    }

    pub fn info(mut self, info: ApiInfo) -> Self {
        self.info = info;
        self
    }

    /// Mount every namespace under `prefix` (e.g. `/api/v1`).
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_matches('/');
        self.prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    pub fn get_prefix(&self) -> &str {
        &self.prefix
    }

    /// Validate `expect` payloads by default.
    pub fn validate(mut self, validate: bool) -> Self {
        self.settings.validate = validate;
        self
    }

    /// Media type for `*/*` and unmatched `Accept` headers. `None` answers
    /// unmatched headers with 406.
    pub fn default_mediatype(mut self, mediatype: Option<&str>) -> Self {
        self.settings.default_mediatype = mediatype.map(str::to_string);
        self
    }

    pub fn settings(mut self, settings: ApiSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn get_settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Apply the `restplus.*` keys of `config` and keep it for plugins.
    pub fn with_config(mut self, config: RestConfig) -> Self {
        self.settings = ApiSettings::from_config(&config);
        self.config = Some(config);
        self
    }

    pub fn config(&self) -> Option<&RestConfig> {
        self.config.as_ref()
    }

    /// Register a model for documentation.
    pub fn model(mut self, model: &Model) -> Self {
        if !self.models.iter().any(|m| m.name() == model.name()) {
            self.models.push(model.clone());
        }
        self
    }

    pub fn namespace(mut self, namespace: Namespace<S>) -> Self {
        self.namespaces.push(namespace);
        self
    }

    /// Bind a resource in the default namespace, relative to the API prefix.
    pub fn route(mut self, pattern: impl Into<String>, resource: Resource<S>) -> Self {
        self.default_namespace = self.default_namespace.route(pattern, resource);
        self
    }

    /// Add a documentation tag that does not come from a namespace.
    pub fn tag(mut self, name: impl Into<String>, description: Option<&str>) -> Self {
        self.tags.push(TagDoc {
            name: name.into(),
            description: description.map(str::to_string),
        });
        self
    }

    /// Register a renderer for `mediatype`. Registering `application/json`
    /// replaces the built-in JSON renderer.
    pub fn representation(mut self, mediatype: impl Into<String>, renderer: Renderer) -> Self {
        let mediatype = mediatype.into();
        self.representations.retain(|(m, _)| *m != mediatype);
        self.representations.push((mediatype, renderer));
        self
    }

    /// Map an application error of type `E` to an [`ApiError`] for every
    /// resource. Namespace handlers take precedence.
    ///
    /// ```ignore
    /// Api::new(state).error_handler(|err: &std::num::ParseIntError| abort(400, err.to_string()))
    /// ```
    pub fn error_handler<E, F>(mut self, handler: F) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&E) -> ApiError + Send + Sync + 'static,
    {
        self.errors.push(handler);
        self
    }

    // ── Plugin system ───────────────────────────────────────────────────

    /// Install a [`Plugin`].
    ///
    /// ```ignore
    /// Api::new(state)
    ///     .with(Cors::permissive())
    ///     .with(Tracing)
    ///     .with(ErrorHandling)
    /// ```
    pub fn with<Pl: Plugin>(mut self, plugin: Pl) -> Self {
        if let Some(last_name) = self.last_plugin_name {
            tracing::warn!(
                previous = last_name,
                current = Pl::name(),
                "Plugin {} should be installed last, but {} is being installed after it",
                last_name,
                Pl::name(),
            );
        }
        if Pl::should_be_last() {
            self.last_plugin_name = Some(Pl::name());
        }
        plugin.install(self)
    }

    /// Apply a custom transformation to the final router, typically
    /// `router.layer(..)`. Transformations run in registration order.
    pub fn with_layer_fn<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Router) -> Router + Send + 'static,
    {
        self.custom_layers.push(Box::new(f));
        self
    }

    /// Merge a raw axum router next to the API routes.
    pub fn register_routes(mut self, router: Router<S>) -> Self {
        self.routes.push(router);
        self
    }

    /// Register a typed metadata consumer.
    ///
    /// At build time the consumer receives every `M` item of the
    /// [`MetaRegistry`] (for instance the [`ApiDoc`]) and returns a router to
    /// merge into the application.
    pub fn with_meta_consumer<M, F>(mut self, f: F) -> Self
    where
        M: Any + Send + Sync,
        F: FnOnce(&[M]) -> Router<S> + Send + 'static,
    {
        self.meta_consumers.push(Box::new(move |registry| {
            let items = registry.get_or_empty::<M>();
            f(items)
        }));
        self
    }

    // ── Build ───────────────────────────────────────────────────────────

    /// Check the declaration and assemble the router.
    ///
    /// # Errors
    ///
    /// [`SpecsError`] when a pattern is invalid, a pattern is bound twice in
    /// one namespace, two bindings share a full path, or the default media
    /// type has no representation.
    pub fn try_build(self) -> Result<Router, SpecsError> {
        let mut representations = Representations::json(self.settings.json_indent);
        for (mediatype, renderer) in self.representations {
            representations.insert(mediatype, renderer);
        }
        if let Some(default) = &self.settings.default_mediatype {
            if default != TEXT_PLAIN && !representations.contains(default) {
                return Err(SpecsError::UnknownMediaType(default.clone()));
            }
        }
        let produces: Vec<String> = representations.mediatypes().map(str::to_string).collect();
        let shared = Arc::new(Shared {
            settings: self.settings,
            representations,
            errors: self.errors,
        });

        let mut namespaces = Vec::with_capacity(self.namespaces.len() + 1);
        if !self.default_namespace.bindings.is_empty() {
            namespaces.push(self.default_namespace);
        }
        namespaces.extend(self.namespaces);

        let mut router: Router<S> = Router::new();
        // Route shape -> namespace that bound it.
        let mut seen_shapes: HashMap<String, String> = HashMap::new();
        let mut operation_ids = HashSet::new();
        let mut models = self.models;
        let mut namespace_docs = Vec::with_capacity(namespaces.len());

        for ns in namespaces {
            let mut route_docs = Vec::with_capacity(ns.bindings.len());
            for model in &ns.models {
                push_model(&mut models, model);
            }
            let ns_errors = Arc::new(ns.errors);

            for binding in ns.bindings {
                let pattern = RoutePattern::join(&[self.prefix.as_str(), ns.path.as_str(), binding.pattern.as_str()])?;
                let path = pattern.axum_path();
                match seen_shapes.get(&pattern.shape()) {
                    Some(owner) if *owner == ns.name => {
                        return Err(SpecsError::DuplicateRoute {
                            namespace: ns.name.clone(),
                            pattern: binding.pattern,
                        });
                    }
                    Some(_) => return Err(SpecsError::PathConflict { path }),
                    None => {
                        seen_shapes.insert(pattern.shape(), ns.name.clone());
                    }
                }

                let route_doc = document_route(
                    &pattern,
                    &binding.resource,
                    &shared.settings,
                    &mut operation_ids,
                    &mut models,
                );
                debug!(
                    namespace = %ns.name,
                    resource = %binding.resource.name,
                    path = %path,
                    methods = ?binding.resource.methods(),
                    "Route registered"
                );
                route_docs.push(route_doc);

                let endpoint = Arc::new(Endpoint {
                    pattern,
                    resource: binding.resource,
                    shared: shared.clone(),
                    errors: ns_errors.clone(),
                });
                let handler = move |State(state): State<S>, req: Request| {
                    let endpoint = endpoint.clone();
                    async move { endpoint.handle(state, req).await }
                };
                if path != "/" {
                    router = router.route(&format!("{path}/"), routing::any(handler.clone()));
                }
                router = router.route(&path, routing::any(handler));
            }

            namespace_docs.push(NamespaceDoc {
                name: ns.name,
                description: ns.description,
                routes: route_docs,
            });
        }

        let mut registry = MetaRegistry::new();
        registry.push(ApiDoc {
            info: self.info,
            prefix: self.prefix,
            tags: self.tags,
            namespaces: namespace_docs,
            models,
            produces,
        });

        for r in self.routes {
            router = router.merge(r);
        }
        for consumer in self.meta_consumers {
            router = router.merge(consumer(&registry));
        }

        let fallback_shared = shared.clone();
        router = router.fallback(move |req: Request| {
            let shared = fallback_shared.clone();
            async move { shared.not_found(req.headers()) }
        });

        let mut app = router.with_state(self.state);
        for layer_fn in self.custom_layers {
            app = layer_fn(app);
        }
        Ok(app)
    }

    /// Like [`try_build`](Self::try_build).
    ///
    /// # Panics
    ///
    /// Panics when the declaration is invalid.
    pub fn build(self) -> Router {
        match self.try_build() {
            Ok(router) => router,
            Err(err) => panic!("invalid API declaration: {err}"),
        }
    }

    /// Build the API and serve it on `addr` until Ctrl-C or SIGTERM.
    pub async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.try_build()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "restplus server listening");
        crate::http::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("restplus server stopped");
        Ok(())
    }
}

fn push_model(models: &mut Vec<Model>, model: &Model) {
    if !models.iter().any(|m| m.name() == model.name()) {
        models.push(model.clone());
    }
}

fn document_route<S>(
    pattern: &RoutePattern,
    resource: &Resource<S>,
    settings: &ApiSettings,
    operation_ids: &mut HashSet<String>,
    models: &mut Vec<Model>,
) -> RouteDoc {
    let operations = resource
        .operations
        .iter()
        .map(|(method, op)| {
            let base_id = op
                .operation_id
                .clone()
                .unwrap_or_else(|| default_id(&resource.name, method.as_str()));
            let mut operation_id = base_id.clone();
            let mut n = 2;
            while !operation_ids.insert(operation_id.clone()) {
                operation_id = format!("{base_id}_{n}");
                n += 1;
            }

            let mut params = path_params(pattern, resource, op);
            if let Some(parser) = &op.parser {
                for param in parser.documented_params() {
                    if !params.iter().any(|p| p.name == param.name) {
                        params.push(param);
                    }
                }
            }
            if op.marshal.is_some() && settings.mask_swagger {
                params.push(ParamDoc {
                    name: settings.mask_header.clone(),
                    location: ParamLocation::Header,
                    param_type: "string".to_string(),
                    required: false,
                    description: Some("An optional fields mask".to_string()),
                    default: None,
                    choices: Vec::new(),
                    format: Some("mask".to_string()),
                });
            }

            let body = match (&op.expect, &op.parser) {
                (Some(expect), _) => {
                    push_model(models, &expect.model);
                    Some(BodyDoc::Model {
                        model: expect.model.clone(),
                        list: expect.list,
                    })
                }
                (None, Some(parser)) => parser.body_schema().map(BodyDoc::Inline),
                (None, None) => None,
            };

            let responses = responses(method, resource, op, models);

            OperationDoc {
                method: method.as_str().to_lowercase(),
                operation_id,
                summary: op.summary.clone(),
                description: op.description.clone().or_else(|| resource.doc.clone()),
                params,
                body,
                responses,
                deprecated: op.deprecated,
            }
        })
        .collect();

    RouteDoc {
        path: pattern.swagger_path(),
        resource: resource.name.clone(),
        operations,
    }
}

fn path_params<S>(pattern: &RoutePattern, resource: &Resource<S>, op: &Operation<S>) -> Vec<ParamDoc> {
    pattern
        .params()
        .map(|(name, converter)| {
            let description = op
                .params
                .iter()
                .chain(resource.params.iter())
                .find(|(n, _)| n == name)
                .map(|(_, d)| d.clone());
            ParamDoc {
                name: name.to_string(),
                location: ParamLocation::Path,
                param_type: converter.swagger_type().to_string(),
                required: true,
                description,
                default: None,
                choices: Vec::new(),
                format: None,
            }
        })
        .collect()
}

/// Success response first, then resource-level and operation-level ones;
/// an operation entry replaces a resource entry with the same code.
fn responses<S>(
    method: &Method,
    resource: &Resource<S>,
    op: &Operation<S>,
    models: &mut Vec<Model>,
) -> Vec<ResponseDoc> {
    let success = op.code.unwrap_or_else(|| default_status(method)).as_u16();
    let mut out = vec![ResponseDoc {
        code: success,
        description: "Success".to_string(),
        model: op.marshal.as_ref().map(|m| m.model.clone()),
        list: op.marshal.as_ref().is_some_and(|m| m.list),
    }];
    for doc in resource.responses.iter().chain(op.responses.iter()) {
        match out.iter_mut().find(|r| r.code == doc.code) {
            Some(existing) => {
                existing.description = doc.description.clone();
                if doc.model.is_some() {
                    existing.model = doc.model.clone();
                    existing.list = doc.list;
                }
            }
            None => out.push(doc.clone()),
        }
    }
    for response in &out {
        if let Some(model) = &response.model {
            push_model(models, model);
        }
    }
    out
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
