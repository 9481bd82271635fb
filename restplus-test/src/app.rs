use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use restplus_core::http::{Body, Router};
use restplus_core::Api;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower::util::ServiceExt;

use crate::path::resolve_path;

/// In-process HTTP client over a built API.
///
/// Requests go through `tower::ServiceExt::oneshot`; no port is bound.
///
/// ```ignore
/// let app = TestApp::from_api(api);
/// app.post("/todos/").json(&json!({"task": "write tests"})).send().await
///     .assert_created()
///     .assert_json_path("id", 1);
/// ```
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Build `api` and wrap the resulting router.
    pub fn from_api<S: Clone + Send + Sync + 'static>(api: Api<S>) -> Self {
        Self::new(api.build())
    }

    pub fn get(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::DELETE, path)
    }

    pub fn head(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::HEAD, path)
    }

    pub fn options(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::OPTIONS, path)
    }

    pub fn request(&self, method: Method, path: &str) -> TestRequest<'_> {
        TestRequest {
            app: self,
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// A request under construction.
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl TestRequest<'_> {
    pub fn header(mut self, name: &str, value: impl AsRef<str>) -> Self {
        let name: HeaderName = name.parse().expect("invalid header name");
        let value = HeaderValue::from_str(value.as_ref()).expect("invalid header value");
        self.headers.append(name, value);
        self
    }

    pub fn accept(self, mediatype: &str) -> Self {
        self.header(ACCEPT.as_str(), mediatype)
    }

    /// Send a fields mask in the `X-Fields` header.
    pub fn mask(self, fields: &str) -> Self {
        self.header("X-Fields", fields)
    }

    /// JSON body with `Content-Type: application/json`.
    pub fn json(mut self, body: &impl Serialize) -> Self {
        self.body = Some(serde_json::to_vec(body).expect("failed to serialize JSON body"));
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// URL-encoded form body.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.body = Some(encoded.into_bytes());
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        self
    }

    /// Raw body, content type left to the caller.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub async fn send(self) -> TestResponse {
        let body = self.body.map(Body::from).unwrap_or_else(Body::empty);
        let mut request = Request::builder()
            .method(self.method)
            .uri(&self.path)
            .body(body)
            .expect("failed to build request");
        *request.headers_mut() = self.headers;

        let response = self
            .app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();
        TestResponse { status, headers, body }
    }
}

/// A collected response with chainable assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    // ── Status ──

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_created(self) -> Self {
        self.assert_status(StatusCode::CREATED)
    }

    pub fn assert_no_content(self) -> Self {
        self.assert_status(StatusCode::NO_CONTENT)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_method_not_allowed(self) -> Self {
        self.assert_status(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn assert_not_acceptable(self) -> Self {
        self.assert_status(StatusCode::NOT_ACCEPTABLE)
    }

    pub fn assert_status(self, expected: impl TryInto<StatusCode>) -> Self {
        let expected = expected
            .try_into()
            .unwrap_or_else(|_| panic!("invalid expected status"));
        assert_eq!(
            self.status,
            expected,
            "Expected {expected}, got {}\nBody: {}",
            self.status,
            self.text()
        );
        self
    }

    // ── Headers ──

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn assert_header(self, name: &str, expected: &str) -> Self {
        assert_eq!(
            self.header(name),
            Some(expected),
            "Header {name} mismatch\nHeaders: {:?}",
            self.headers
        );
        self
    }

    /// Assert the `Allow` header lists exactly `methods`, in any order.
    pub fn assert_allow(self, methods: &[&str]) -> Self {
        let mut actual: Vec<String> = self
            .header("allow")
            .unwrap_or_default()
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        let mut expected: Vec<String> = methods.iter().map(|m| m.to_string()).collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected, "Allow header mismatch");
        self
    }

    // ── JSON ──

    /// Assert the whole body equals `expected`.
    pub fn assert_json(self, expected: impl Into<Value>) -> Self {
        let expected = expected.into();
        let actual: Value = self.json();
        assert_eq!(actual, expected, "JSON body mismatch");
        self
    }

    /// Assert a dotted JSON path resolves to `expected`.
    ///
    /// ```ignore
    /// resp.assert_json_path("errors.task", "The task details 'task' is a required property")
    ///     .assert_json_path("items.len()", 2);
    /// ```
    pub fn assert_json_path(self, path: &str, expected: impl Into<Value>) -> Self {
        let root: Value = self.json();
        let actual = resolve_path(&root, path);
        let expected = expected.into();
        assert_eq!(
            actual, expected,
            "JSON path \"{path}\" assertion failed\n  Expected: {expected}\n  Actual:   {actual}\n  Body: {root}",
        );
        self
    }

    pub fn assert_json_path_fn(self, path: &str, predicate: impl FnOnce(&Value) -> bool) -> Self {
        let root: Value = self.json();
        let actual = resolve_path(&root, path);
        assert!(
            predicate(&actual),
            "JSON path \"{path}\" predicate failed\n  Value: {actual}\n  Body: {root}",
        );
        self
    }

    pub fn json_path<T: DeserializeOwned>(&self, path: &str) -> T {
        let root: Value = self.json();
        let value = resolve_path(&root, path);
        serde_json::from_value(value.clone())
            .unwrap_or_else(|e| panic!("Failed to deserialize JSON path \"{path}\": {e}\n  Value: {value}"))
    }

    /// The `message` of an error body.
    pub fn message(&self) -> String {
        self.json_path::<Option<String>>("message").unwrap_or_default()
    }

    // ── Body ──

    pub fn assert_empty(self) -> Self {
        assert!(self.body.is_empty(), "Expected an empty body, got: {}", self.text());
        self
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("Failed to parse JSON: {e}\nBody: {}", self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
