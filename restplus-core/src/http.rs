//! Thin re-export layer over axum, so downstream crates never name axum directly.

pub use axum::body::{Body, Bytes};
pub use axum::extract::{DefaultBodyLimit, FromRequest, FromRequestParts, RawPathParams, Request, State};
pub use axum::http::header::{
    self, HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCESS_CONTROL_ALLOW_CREDENTIALS,
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, ALLOW, CONTENT_TYPE,
};
pub use axum::http::request::Parts;
pub use axum::http::{Method, StatusCode, Uri};
pub use axum::response::{Html, IntoResponse, Response};
pub use axum::routing;
pub use axum::{serve, Json, Router};
