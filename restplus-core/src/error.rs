use crate::http::{HeaderMap, HeaderValue, IntoResponse, Json, Method, Response, StatusCode, ALLOW};
use crate::mask::MaskError;
use crate::validation::ValidationError;
use serde_json::{json, Map, Value};
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error returned by resource handlers and by the dispatch pipeline.
///
/// Every variant maps to an HTTP status and a JSON body of the form
/// `{"message": "..."}`. Inside an [`Api`](crate::Api) the body goes through
/// content negotiation like any other response; used on its own,
/// `IntoResponse` renders it as JSON.
pub enum ApiError {
    /// Explicit abort raised by application code, see [`abort`].
    Abort {
        status: StatusCode,
        message: Option<String>,
        data: Map<String, Value>,
    },
    /// Input payload failed model or parser validation.
    Validation(ValidationError),
    /// The field mask header could not be parsed.
    Mask(MaskError),
    /// A handler result could not be marshaled against its response model.
    Marshal(MarshalError),
    /// No representation matches the `Accept` header.
    NotAcceptable,
    /// The resource has no handler for the request method.
    MethodNotAllowed { allow: Vec<Method> },
    Internal(String),
    /// An application error, resolved by the handlers registered with
    /// [`Namespace::error_handler`](crate::Namespace::error_handler) and
    /// [`Api::error_handler`](crate::Api::error_handler). Unhandled ones
    /// answer 500.
    Other(BoxError),
}

/// Abort the current request with the given status and message.
///
/// The handler propagates the returned error with `?` or `return Err(..)`;
/// the client receives `{"message": message}` with `status`. Invalid status
/// codes degrade to 500.
///
/// ```ignore
/// if !todos.contains_key(&id) {
///     return Err(abort(404, format!("Todo {id} doesn't exist")));
/// }
/// ```
pub fn abort(status: u16, message: impl Into<String>) -> ApiError {
    ApiError::Abort {
        status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        message: Some(message.into()),
        data: Map::new(),
    }
}

/// Like [`abort`], attaching extra fields to the error body.
///
/// `data` must be a JSON object; any other value is ignored.
pub fn abort_with(status: u16, message: impl Into<String>, data: Value) -> ApiError {
    let data = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    ApiError::Abort {
        status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        message: Some(message.into()),
        data,
    }
}

impl ApiError {
    /// Shorthand for a 404 abort without a custom message.
    pub fn not_found() -> Self {
        ApiError::Abort {
            status: StatusCode::NOT_FOUND,
            message: None,
            data: Map::new(),
        }
    }

    /// Wrap an application error for the registered error handlers.
    ///
    /// ```ignore
    /// let todo = store.fetch(&id).await.map_err(ApiError::other)?;
    /// ```
    pub fn other<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        ApiError::Other(Box::new(err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Abort { status, .. } => *status,
            ApiError::Validation(_) | ApiError::Mask(_) => StatusCode::BAD_REQUEST,
            ApiError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Marshal(_) | ApiError::Internal(_) | ApiError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Build the JSON error body.
    ///
    /// `include_message` and `include_code` mirror the
    /// `restplus.error.message` / `restplus.error.code` settings.
    pub fn body(&self, include_message: bool, include_code: bool) -> Value {
        let status = self.status();
        let mut body = Map::new();

        match self {
            ApiError::Abort { message, data, .. } => {
                if include_message {
                    let message = message
                        .clone()
                        .unwrap_or_else(|| reason(status).to_string());
                    body.insert("message".into(), json!(message));
                }
                for (k, v) in data {
                    body.insert(k.clone(), v.clone());
                }
            }
            ApiError::Validation(err) => {
                body.insert("errors".into(), err.errors_json());
                if include_message {
                    body.insert("message".into(), json!(err.message));
                }
            }
            ApiError::Mask(err) => {
                if include_message {
                    body.insert("message".into(), json!(format!("Mask parse error: {err}")));
                }
            }
            ApiError::MethodNotAllowed { .. } => {
                if include_message {
                    body.insert(
                        "message".into(),
                        json!("The method is not allowed for the requested URL."),
                    );
                }
            }
            ApiError::NotAcceptable
            | ApiError::Marshal(_)
            | ApiError::Internal(_)
            | ApiError::Other(_) => {
                if include_message {
                    body.insert("message".into(), json!(reason(status)));
                }
            }
        }

        if include_code {
            body.insert("code".into(), json!(status.as_u16()));
        }
        Value::Object(body)
    }

    /// Headers that must accompany the error response (e.g. `Allow` on 405).
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let ApiError::MethodNotAllowed { allow } = self {
            let joined = allow
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&joined) {
                headers.insert(ALLOW, value);
            }
        }
        headers
    }
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown Error")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let headers = self.headers();
        let body = self.body(true, false);
        (status, headers, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Abort { status, message, .. } => match message {
                Some(msg) => write!(f, "Abort ({status}): {msg}"),
                None => write!(f, "Abort ({status})"),
            },
            ApiError::Validation(err) => write!(f, "{err}"),
            ApiError::Mask(err) => write!(f, "Mask error: {err}"),
            ApiError::Marshal(err) => write!(f, "Marshal error: {err}"),
            ApiError::NotAcceptable => write!(f, "Not Acceptable"),
            ApiError::MethodNotAllowed { allow } => {
                write!(f, "Method Not Allowed (allowed: {allow:?})")
            }
            ApiError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            ApiError::Other(err) => write!(f, "Unhandled error: {err}"),
        }
    }
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<MaskError> for ApiError {
    fn from(err: MaskError) -> Self {
        ApiError::Mask(err)
    }
}

impl From<MarshalError> for ApiError {
    fn from(err: MarshalError) -> Self {
        ApiError::Marshal(err)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Generate `From<E> for ApiError` implementations mapping error types to
/// an HTTP status.
///
/// ```ignore
/// restplus_core::map_error! {
///     std::num::ParseIntError => 400,
///     MyStoreError => 503,
/// }
/// ```
#[macro_export]
macro_rules! map_error {
    ( $( $err_ty:ty => $status:expr ),* $(,)? ) => {
        $(
            impl From<$err_ty> for $crate::ApiError {
                fn from(err: $err_ty) -> Self {
                    $crate::abort($status, err.to_string())
                }
            }
        )*
    };
}

type HandlerFn = Box<dyn Fn(&(dyn StdError + Send + Sync + 'static)) -> Option<ApiError> + Send + Sync>;

/// Typed error handlers, tried in registration order.
#[derive(Default)]
pub(crate) struct ErrorHandlers {
    handlers: Vec<HandlerFn>,
}

impl ErrorHandlers {
    pub(crate) fn push<E, F>(&mut self, handler: F)
    where
        E: StdError + Send + Sync + 'static,
        F: Fn(&E) -> ApiError + Send + Sync + 'static,
    {
        self.handlers.push(Box::new(move |err: &(dyn StdError + Send + Sync + 'static)| {
            err.downcast_ref::<E>().map(|e| handler(e))
        }));
    }

    pub(crate) fn resolve(&self, err: &(dyn StdError + Send + Sync + 'static)) -> Option<ApiError> {
        self.handlers.iter().find_map(|handler| handler(err))
    }
}

/// Error raised while marshaling a value against a model.
#[derive(Debug, Clone, PartialEq)]
pub enum MarshalError {
    /// A field value cannot be converted to the field's type.
    InvalidValue {
        field: String,
        expected: &'static str,
        found: String,
    },
    /// The value being marshaled against a model is not an object.
    NotAnObject { model: String, found: String },
    /// The value could not be serialized to JSON in the first place.
    Serialize(String),
}

impl std::fmt::Display for MarshalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarshalError::InvalidValue {
                field,
                expected,
                found,
            } => write!(f, "field '{field}': expected {expected}, got {found}"),
            MarshalError::NotAnObject { model, found } => {
                write!(f, "cannot marshal {found} as model '{model}'")
            }
            MarshalError::Serialize(msg) => write!(f, "serialization failed: {msg}"),
        }
    }
}

impl std::error::Error for MarshalError {}

/// Incoherent API declaration, detected once at startup by
/// [`Api::try_build`](crate::Api::try_build).
#[derive(Debug, Clone, PartialEq)]
pub enum SpecsError {
    DuplicateField { model: String, field: String },
    DuplicateRoute { namespace: String, pattern: String },
    /// Two bindings resolve to the same full URL path.
    PathConflict { path: String },
    InvalidPattern { pattern: String, reason: String },
    /// The default media type has no registered representation.
    UnknownMediaType(String),
}

impl std::fmt::Display for SpecsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecsError::DuplicateField { model, field } => {
                write!(f, "field '{field}' declared twice in model '{model}'")
            }
            SpecsError::DuplicateRoute { namespace, pattern } => {
                write!(f, "route '{pattern}' registered twice in namespace '{namespace}'")
            }
            SpecsError::PathConflict { path } => {
                write!(f, "path '{path}' is bound by more than one resource")
            }
            SpecsError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid route pattern '{pattern}': {reason}")
            }
            SpecsError::UnknownMediaType(mediatype) => {
                write!(f, "no representation registered for default media type '{mediatype}'")
            }
        }
    }
}

impl std::error::Error for SpecsError {}
