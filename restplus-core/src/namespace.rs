use crate::error::{ApiError, ErrorHandlers};
use crate::model::Model;
use crate::resource::Resource;

/// A route binding: a pattern relative to its namespace and the resource
/// answering it.
pub(crate) struct Binding<S> {
    pub pattern: String,
    pub resource: Resource<S>,
}

/// A group of resources sharing a URL prefix and a documentation tag.
///
/// ```ignore
/// let ns = Namespace::new("todos")
///     .description("TODO operations")
///     .model(&todo)
///     .route("/", todo_list)
///     .route("/<todo_id:int>", todo_item);
/// ```
pub struct Namespace<S> {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) path: String,
    pub(crate) bindings: Vec<Binding<S>>,
    pub(crate) models: Vec<Model>,
    pub(crate) errors: ErrorHandlers,
}

impl<S> Namespace<S> {
    /// A namespace mounted at `/{name}`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let path = format!("/{}", name.trim_matches('/'));
        Self {
            name,
            description: None,
            path,
            bindings: Vec::new(),
            models: Vec::new(),
            errors: ErrorHandlers::default(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Override the mount path. `"/"` mounts the namespace at the API root.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Bind `resource` to `pattern`, relative to the namespace path.
    ///
    /// Binding the same pattern twice is reported by
    /// [`Api::try_build`](crate::Api::try_build).
    pub fn route(mut self, pattern: impl Into<String>, resource: Resource<S>) -> Self {
        self.bindings.push(Binding {
            pattern: pattern.into(),
            resource,
        });
        self
    }

    /// Register a model for documentation.
    pub fn model(mut self, model: &Model) -> Self {
        if !self.models.iter().any(|m| m.name() == model.name()) {
            self.models.push(model.clone());
        }
        self
    }

    /// Map an application error of type `E` to an [`ApiError`] for the
    /// resources of this namespace. Errors wrapped with [`ApiError::other`]
    /// are resolved here first, then by the API-wide handlers.
    ///
    /// ```ignore
    /// let ns = Namespace::new("todos").error_handler(|err: &StoreError| {
    ///     abort_with(503, err.to_string(), json!({"retry": true}))
    /// });
    /// ```
    pub fn error_handler<E, F>(mut self, handler: F) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&E) -> ApiError + Send + Sync + 'static,
    {
        self.errors.push(handler);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mount_path(&self) -> &str {
        &self.path
    }

    /// Patterns bound so far, in registration order.
    pub fn patterns(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.pattern.as_str()).collect()
    }
}
