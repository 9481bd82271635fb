//! Content negotiation and response representations.

use crate::error::ApiError;
use crate::http::{Body, HeaderMap, HeaderValue, IntoResponse, Response, StatusCode, CONTENT_TYPE};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain";

/// Renders response data for one media type.
pub type Renderer = Arc<dyn Fn(&Value, StatusCode, HeaderMap) -> Response + Send + Sync>;

/// Parse an `Accept` header into `(media range, quality)` pairs, in header order.
///
/// Media-range parameters other than `q` are kept on the range
/// (`application/json;charset=utf8`). Quality is clamped to `[0, 1]`.
pub fn parse_accept(header: &str) -> Vec<(String, f32)> {
    let mut out = Vec::new();
    for item in header.split(',') {
        let mut parts = item.split(';').map(str::trim);
        let Some(range) = parts.next().filter(|r| !r.is_empty()) else {
            continue;
        };
        let mut media = range.to_string();
        let mut quality = 1.0_f32;
        for param in parts {
            match param.split_once('=') {
                Some((key, value)) if key.trim() == "q" => {
                    quality = value.trim().parse::<f32>().unwrap_or(1.0).clamp(0.0, 1.0);
                }
                _ if !param.is_empty() => {
                    media.push(';');
                    media.push_str(param);
                }
                _ => {}
            }
        }
        out.push((media, quality));
    }
    out
}

/// Pick the best available media type for an `Accept` header.
///
/// Exact matches are collected in header order, then matches on the
/// type without parameters; wildcards only count when nothing matched and
/// resolve to `default`. The highest quality wins, ties keep header order.
/// Returns `None` when the winner has quality 0 or resolves to no default.
pub fn best_match<'a>(
    accept: Option<&str>,
    available: impl IntoIterator<Item = &'a str>,
    default: Option<&str>,
) -> Option<String> {
    let available: Vec<&str> = available.into_iter().collect();
    if available.is_empty() {
        return default.map(str::to_string);
    }
    let entries = accept.map(parse_accept).unwrap_or_default();
    if entries.is_empty() {
        return default.map(str::to_string);
    }

    let mut found: Vec<(f32, Option<String>)> = Vec::new();
    for (media, q) in &entries {
        if available.contains(&media.as_str()) {
            found.push((*q, Some(media.clone())));
        }
    }
    for (media, q) in &entries {
        let bare = media.split(';').next().unwrap_or_default().trim();
        if available.contains(&bare) {
            let candidate = (*q, Some(bare.to_string()));
            if !found.contains(&candidate) {
                found.push(candidate);
            }
        }
    }
    if found.is_empty() {
        for (media, q) in &entries {
            if matches!(media.as_str(), "*" | "*/*" | "*.*") {
                found.push((*q, default.map(str::to_string)));
            }
        }
    }

    // Stable sort: equal qualities keep header order.
    found.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    match found.into_iter().next() {
        Some((q, _)) if q <= 0.0 => None,
        Some((_, best)) => best,
        None => default.map(str::to_string),
    }
}

/// Registered renderers keyed by media type, in registration order.
#[derive(Clone)]
pub struct Representations {
    renderers: IndexMap<String, Renderer>,
}

impl Representations {
    pub fn empty() -> Self {
        Self {
            renderers: IndexMap::new(),
        }
    }

    /// JSON-only representations. `indent` > 0 pretty-prints.
    pub fn json(indent: usize) -> Self {
        let mut reps = Self::empty();
        reps.insert(APPLICATION_JSON, json_renderer(indent));
        reps
    }

    pub fn insert(&mut self, mediatype: impl Into<String>, renderer: Renderer) {
        self.renderers.insert(mediatype.into(), renderer);
    }

    pub fn clear(&mut self) {
        self.renderers.clear();
    }

    pub fn contains(&self, mediatype: &str) -> bool {
        self.renderers.contains_key(mediatype)
    }

    pub fn mediatypes(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.renderers.keys().next().map(String::as_str)
    }

    /// Render `data` as `mediatype`, setting the `Content-Type` header.
    ///
    /// `text/plain` is always renderable, even without a registered renderer.
    pub fn render(
        &self,
        mediatype: &str,
        data: &Value,
        status: StatusCode,
        headers: HeaderMap,
    ) -> Result<Response, ApiError> {
        let mut response = if let Some(renderer) = self.renderers.get(mediatype) {
            renderer(data, status, headers)
        } else if mediatype == TEXT_PLAIN {
            text_response(data, status, headers)
        } else {
            return Err(ApiError::Internal(format!(
                "no representation for media type '{mediatype}'"
            )));
        };
        if let Ok(value) = HeaderValue::from_str(mediatype) {
            response.headers_mut().insert(CONTENT_TYPE, value);
        }
        Ok(response)
    }
}

impl Default for Representations {
    fn default() -> Self {
        Self::json(0)
    }
}

/// The default `application/json` renderer. Bodies end with a newline.
pub fn json_renderer(indent: usize) -> Renderer {
    Arc::new(move |data, status, headers| {
        let mut body = if indent > 0 {
            let indent_bytes = vec![b' '; indent];
            let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
            let mut buf = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            match serde::Serialize::serialize(data, &mut ser) {
                Ok(()) => buf,
                Err(_) => b"null".to_vec(),
            }
        } else {
            serde_json::to_vec(data).unwrap_or_else(|_| b"null".to_vec())
        };
        body.push(b'\n');
        (status, headers, Body::from(body)).into_response()
    })
}

fn text_response(data: &Value, status: StatusCode, headers: HeaderMap) -> Response {
    let text = match data {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    (status, headers, text).into_response()
}
