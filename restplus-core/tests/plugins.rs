use http::Request;
use http_body_util::BodyExt;
use restplus_core::http::{Body, Router, StatusCode};
use restplus_core::plugins::{Cors, ErrorHandling, Tracing};
use restplus_core::{Api, ApiError, Operation, Resource};
use serde_json::{json, Value};
use tower::ServiceExt;

fn api() -> Api<()> {
    let ok = Resource::new("Ok").get(Operation::new(|_call| async {
        Ok::<_, ApiError>(json!({"ok": true}))
    }));
    let boom = Resource::new("Boom").get(Operation::new(|_call| async {
        if true {
            panic!("boom");
        }
        Ok::<_, ApiError>(Value::Null)
    }));
    Api::new(()).route("/ok", ok).route("/boom", boom)
}

async fn call(router: Router, uri: &str, origin: Option<&str>) -> (StatusCode, Option<String>, Value) {
    let mut req = Request::builder().uri(uri);
    if let Some(origin) = origin {
        req = req.header("origin", origin);
    }
    let response = router.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, allow_origin, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn error_handling_turns_panics_into_500() {
    let router = api().with(ErrorHandling).build();
    let (status, _, body) = call(router, "/boom", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Internal Server Error"}));
}

#[tokio::test]
async fn cors_plugin_adds_headers() {
    let router = api().with(Cors::permissive()).build();
    let (status, origin, _) = call(router, "/ok", Some("http://example.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(origin.as_deref(), Some("*"));
}

#[tokio::test]
async fn tracing_plugin_keeps_responses() {
    let router = api().with(Tracing).with(ErrorHandling).build();
    let (status, _, body) = call(router, "/ok", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn layers_wrap_the_fallback() {
    let router = api().with(Cors::permissive()).build();
    let (status, origin, _) = call(router, "/missing", Some("http://example.com")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(origin.as_deref(), Some("*"));
}
