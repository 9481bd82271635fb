use crate::cors::CrossDomain;
use crate::error::{abort, ApiError};
use crate::http::{Bytes, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, CONTENT_TYPE};
use crate::meta::ResponseDoc;
use crate::model::Model;
use crate::reqparse::RequestParser;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

// ── Call ────────────────────────────────────────────────────────────────────

/// Everything a handler receives about the current request.
pub struct Call<S> {
    state: S,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
    body: Bytes,
    payload: Option<Value>,
    payload_error: Option<String>,
    args: Map<String, Value>,
}

impl<S> Call<S> {
    /// Build a call from raw request parts. The query string is decoded, and
    /// the body is parsed as a form or as JSON depending on `Content-Type`.
    pub fn new(state: S, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let query = uri
            .query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let mut form = Vec::new();
        let mut payload = None;
        let mut payload_error = None;
        if content_type.starts_with("application/x-www-form-urlencoded") {
            form = form_urlencoded::parse(&body).into_owned().collect();
        } else if !body.is_empty() && !content_type.starts_with("multipart/") {
            match serde_json::from_slice::<Value>(&body) {
                Ok(value) => payload = Some(value),
                Err(e) => payload_error = Some(e.to_string()),
            }
        }

        Self {
            state,
            method,
            uri,
            headers,
            params: HashMap::new(),
            query,
            form,
            body,
            payload,
            payload_error,
            args: Map::new(),
        }
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub(crate) fn set_args(&mut self, args: Map<String, Value>) {
        self.args = args;
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw path parameter captured by the route pattern.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Path parameter parsed into `T`. A missing or unparsable value is a 404,
    /// since the URL did not name an existing resource.
    pub fn param_as<T: FromStr>(&self, name: &str) -> Result<T, ApiError> {
        self.param(name)
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(ApiError::not_found)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// First query-string value for `name`.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_all(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// First form field value for `name` (urlencoded bodies only).
    pub fn form(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The decoded JSON body, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub(crate) fn payload_error(&self) -> Option<&str> {
        self.payload_error.as_deref()
    }

    /// Deserialize the JSON body into `T`; any failure is a 400.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if let Some(err) = &self.payload_error {
            return Err(abort(400, format!("Failed to decode JSON object: {err}")));
        }
        let payload = self.payload.clone().unwrap_or(Value::Null);
        serde_json::from_value(payload)
            .map_err(|e| abort(400, format!("Invalid payload: {e}")))
    }

    /// Values produced by the operation's [`RequestParser`].
    pub fn args(&self) -> &Map<String, Value> {
        &self.args
    }

    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name).filter(|v| !v.is_null())
    }
}

// ── Reply ───────────────────────────────────────────────────────────────────

/// A handler result: data, an optional status and extra headers.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    data: Value,
    status: Option<StatusCode>,
    headers: HeaderMap,
}

impl Reply {
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            status: None,
            headers: HeaderMap::new(),
        }
    }

    /// An empty 204 reply.
    pub fn no_content() -> Self {
        Self::new(Value::Null).status(StatusCode::NO_CONTENT)
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Add a response header. Invalid values are skipped.
    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub(crate) fn into_parts(self) -> (Value, Option<StatusCode>, HeaderMap) {
        (self.data, self.status, self.headers)
    }
}

impl From<Value> for Reply {
    fn from(data: Value) -> Self {
        Reply::new(data)
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::new(Value::Null)
    }
}

impl From<(Value, StatusCode)> for Reply {
    fn from((data, status): (Value, StatusCode)) -> Self {
        Reply::new(data).status(status)
    }
}

impl From<(Value, u16)> for Reply {
    fn from((data, status): (Value, u16)) -> Self {
        let mut reply = Reply::new(data);
        reply.status = StatusCode::from_u16(status).ok();
        reply
    }
}

impl From<(Value, StatusCode, HeaderMap)> for Reply {
    fn from((data, status, headers): (Value, StatusCode, HeaderMap)) -> Self {
        Self {
            data,
            status: Some(status),
            headers,
        }
    }
}

// ── Operation ───────────────────────────────────────────────────────────────

pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
pub(crate) type HandlerFn<S> = Arc<dyn Fn(Call<S>) -> BoxFuture<Result<Reply, ApiError>> + Send + Sync>;

/// Expected request body.
#[derive(Debug, Clone)]
pub(crate) struct Expect {
    pub model: Model,
    pub list: bool,
}

/// One HTTP method of a [`Resource`]: an async handler plus its metadata.
///
/// ```ignore
/// Operation::new(create_todo)
///     .summary("Create a todo")
///     .expect(&todo)
///     .marshal_with(&todo)
///     .code(201)
/// ```
pub struct Operation<S> {
    pub(crate) handler: HandlerFn<S>,
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) operation_id: Option<String>,
    pub(crate) expect: Option<Expect>,
    pub(crate) validate: Option<bool>,
    pub(crate) marshal: Option<Expect>,
    pub(crate) code: Option<StatusCode>,
    pub(crate) responses: Vec<ResponseDoc>,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) parser: Option<Arc<RequestParser>>,
    pub(crate) deprecated: bool,
}

impl<S: Send + 'static> Operation<S> {
    pub fn new<F, Fut, R>(handler: F) -> Self
    where
        F: Fn(Call<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
        R: Into<Reply> + Send + 'static,
    {
        let handler: HandlerFn<S> = Arc::new(move |call| -> BoxFuture<Result<Reply, ApiError>> {
            let fut = handler(call);
            Box::pin(async move { fut.await.map(Into::into) })
        });
        Self {
            handler,
            summary: None,
            description: None,
            operation_id: None,
            expect: None,
            validate: None,
            marshal: None,
            code: None,
            responses: Vec::new(),
            params: Vec::new(),
            parser: None,
            deprecated: false,
        }
    }
}

impl<S> Operation<S> {
    /// Set summary and description from one docstring-like text: the first
    /// line is the summary, the remainder the description.
    pub fn doc(mut self, text: &str) -> Self {
        let text = text.trim();
        let (summary, rest) = text.split_once('\n').unwrap_or((text, ""));
        self.summary = Some(summary.trim().to_string()).filter(|s| !s.is_empty());
        self.description = Some(rest.trim().to_string()).filter(|s| !s.is_empty());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    pub fn expect(mut self, model: &Model) -> Self {
        self.expect = Some(Expect {
            model: model.clone(),
            list: false,
        });
        self
    }

    pub fn expect_list(mut self, model: &Model) -> Self {
        self.expect = Some(Expect {
            model: model.clone(),
            list: true,
        });
        self
    }

    /// Override the API-wide validation setting for this operation.
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn marshal_with(mut self, model: &Model) -> Self {
        self.marshal = Some(Expect {
            model: model.clone(),
            list: false,
        });
        self
    }

    pub fn marshal_list_with(mut self, model: &Model) -> Self {
        self.marshal = Some(Expect {
            model: model.clone(),
            list: true,
        });
        self
    }

    /// Default success status. Invalid codes are ignored.
    pub fn code(mut self, code: u16) -> Self {
        self.code = StatusCode::from_u16(code).ok();
        self
    }

    pub fn response(mut self, code: u16, description: impl Into<String>, model: Option<&Model>) -> Self {
        self.responses.push(ResponseDoc {
            code,
            description: description.into(),
            model: model.cloned(),
            list: false,
        });
        self
    }

    /// Document a path parameter.
    pub fn param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.params.push((name.into(), description.into()));
        self
    }

    pub fn parser(mut self, parser: RequestParser) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

impl<S> Clone for Operation<S> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            summary: self.summary.clone(),
            description: self.description.clone(),
            operation_id: self.operation_id.clone(),
            expect: self.expect.clone(),
            validate: self.validate,
            marshal: self.marshal.clone(),
            code: self.code,
            responses: self.responses.clone(),
            params: self.params.clone(),
            parser: self.parser.clone(),
            deprecated: self.deprecated,
        }
    }
}

// ── Resource ────────────────────────────────────────────────────────────────

/// A named set of operations, at most one per HTTP method.
pub struct Resource<S> {
    pub(crate) name: String,
    pub(crate) doc: Option<String>,
    pub(crate) operations: IndexMap<Method, Operation<S>>,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) responses: Vec<ResponseDoc>,
    pub(crate) cross_domain: Option<CrossDomain>,
}

impl<S> Resource<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            operations: IndexMap::new(),
            params: Vec::new(),
            responses: Vec::new(),
            cross_domain: None,
        }
    }

    /// Register `operation` for `method`, replacing any previous one.
    pub fn method(mut self, method: Method, operation: Operation<S>) -> Self {
        self.operations.insert(method, operation);
        self
    }

    pub fn get(self, operation: Operation<S>) -> Self {
        self.method(Method::GET, operation)
    }

    pub fn post(self, operation: Operation<S>) -> Self {
        self.method(Method::POST, operation)
    }

    pub fn put(self, operation: Operation<S>) -> Self {
        self.method(Method::PUT, operation)
    }

    pub fn patch(self, operation: Operation<S>) -> Self {
        self.method(Method::PATCH, operation)
    }

    pub fn delete(self, operation: Operation<S>) -> Self {
        self.method(Method::DELETE, operation)
    }

    pub fn head(self, operation: Operation<S>) -> Self {
        self.method(Method::HEAD, operation)
    }

    pub fn options(self, operation: Operation<S>) -> Self {
        self.method(Method::OPTIONS, operation)
    }

    /// Description used for operations that carry none of their own.
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    /// Document a path parameter for every operation.
    pub fn param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.params.push((name.into(), description.into()));
        self
    }

    /// Document a response for every operation.
    pub fn response(mut self, code: u16, description: impl Into<String>, model: Option<&Model>) -> Self {
        self.responses.push(ResponseDoc {
            code,
            description: description.into(),
            model: model.cloned(),
            list: false,
        });
        self
    }

    pub fn cross_domain(mut self, cors: CrossDomain) -> Self {
        self.cross_domain = Some(cors);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Methods with a registered operation, in registration order.
    pub fn methods(&self) -> Vec<Method> {
        self.operations.keys().cloned().collect()
    }

    pub fn operation(&self, method: &Method) -> Option<&Operation<S>> {
        self.operations.get(method)
    }
}
