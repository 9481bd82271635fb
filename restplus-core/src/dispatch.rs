//! Request pipeline for bound resources.
//!
//! One axum route per bound path; the handler picks the operation by method,
//! then runs negotiation, validation, the handler, marshaling and rendering.

use crate::error::{abort, ApiError, ErrorHandlers};
use crate::http::{
    Body, Bytes, FromRequest, FromRequestParts, HeaderMap, HeaderValue, IntoResponse, Json, Method,
    Parts, RawPathParams, Request, Response, StatusCode, ACCEPT, ALLOW,
};
use crate::mask::Mask;
use crate::marshal::marshal;
use crate::negotiate::{best_match, Representations, TEXT_PLAIN};
use crate::pattern::RoutePattern;
use crate::resource::{Call, Resource};
use crate::settings::ApiSettings;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) const NOT_FOUND_MESSAGE: &str = "The requested URL was not found on the server. \
If you entered the URL manually please check your spelling and try again.";

/// Read-only state shared by every endpoint of one API.
pub(crate) struct Shared {
    pub settings: ApiSettings,
    pub representations: Representations,
    pub errors: ErrorHandlers,
}

impl Shared {
    pub(crate) fn negotiate(&self, headers: &HeaderMap) -> Option<String> {
        let accept = headers.get(ACCEPT).and_then(|v| v.to_str().ok());
        best_match(
            accept,
            self.representations.mediatypes(),
            self.settings.default_mediatype.as_deref(),
        )
    }

    fn fallback_mediatype(&self) -> String {
        self.settings
            .default_mediatype
            .clone()
            .or_else(|| self.representations.first().map(str::to_string))
            .unwrap_or_else(|| TEXT_PLAIN.to_string())
    }

    /// Render an error through the negotiated representation, falling back
    /// to plain JSON when that fails.
    pub(crate) fn render_error(&self, mediatype: Option<&str>, err: ApiError) -> Response {
        let status = err.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %err, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %err, "Request rejected");
        }
        let body = err.body(self.settings.error_message, self.settings.error_code);
        let headers = err.headers();
        let mediatype = mediatype
            .map(str::to_string)
            .unwrap_or_else(|| self.fallback_mediatype());
        match self
            .representations
            .render(&mediatype, &body, status, headers.clone())
        {
            Ok(response) => response,
            Err(_) => (status, headers, Json(body)).into_response(),
        }
    }

    fn render(&self, mediatype: &str, data: &Value, status: StatusCode, headers: HeaderMap) -> Response {
        if status == StatusCode::NO_CONTENT {
            return (status, headers).into_response();
        }
        match self.representations.render(mediatype, data, status, headers) {
            Ok(response) => response,
            Err(err) => self.render_error(None, err),
        }
    }

    /// Fallback for URLs no route matches.
    pub(crate) fn not_found(&self, headers: &HeaderMap) -> Response {
        let mediatype = self.negotiate(headers);
        self.render_error(mediatype.as_deref(), abort(404, NOT_FOUND_MESSAGE))
    }
}

/// A resource bound to one full path.
pub(crate) struct Endpoint<S> {
    pub pattern: RoutePattern,
    pub resource: Resource<S>,
    pub shared: Arc<Shared>,
    /// Handlers of the owning namespace.
    pub errors: Arc<ErrorHandlers>,
}

impl<S: Clone + Send + Sync + 'static> Endpoint<S> {
    /// Methods advertised in `Allow`: registered ones, `HEAD` when `GET`
    /// exists, and `OPTIONS`.
    fn allowed(&self) -> Vec<Method> {
        let mut allow = self.resource.methods();
        if allow.contains(&Method::GET) && !allow.contains(&Method::HEAD) {
            allow.push(Method::HEAD);
        }
        if !allow.contains(&Method::OPTIONS) {
            allow.push(Method::OPTIONS);
        }
        allow
    }

    fn not_allowed(&self) -> ApiError {
        ApiError::MethodNotAllowed {
            allow: self.allowed(),
        }
    }

    fn resolve(&self, err: ApiError) -> ApiError {
        match err {
            ApiError::Other(source) => self
                .errors
                .resolve(source.as_ref())
                .or_else(|| self.shared.errors.resolve(source.as_ref()))
                .unwrap_or(ApiError::Other(source)),
            err => err,
        }
    }

    fn options_response(&self) -> Response {
        let joined = self
            .allowed()
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&joined) {
            headers.insert(ALLOW, value);
        }
        (StatusCode::NO_CONTENT, headers).into_response()
    }

    pub(crate) async fn handle(self: Arc<Self>, state: S, req: Request) -> Response {
        let (mut parts, body) = req.into_parts();
        let params: HashMap<String, String> =
            match RawPathParams::from_request_parts(&mut parts, &state).await {
                Ok(raw) => raw
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                Err(_) => HashMap::new(),
            };
        let method = parts.method.clone();

        let mut response = if !self.pattern.accepts(&params) {
            self.shared.not_found(&parts.headers)
        } else {
            match self.shared.negotiate(&parts.headers) {
                None => self.shared.render_error(None, ApiError::NotAcceptable),
                Some(mediatype) => {
                    match self.run(state, parts, body, params, &mediatype).await {
                        Ok(response) => response,
                        Err(err) => self.shared.render_error(Some(&mediatype), self.resolve(err)),
                    }
                }
            }
        };

        if method == Method::HEAD {
            *response.body_mut() = Body::empty();
        }
        if let Some(cors) = &self.resource.cross_domain {
            if cors.applies_to(&method) {
                cors.apply(response.headers_mut(), &self.resource.methods());
            }
        }
        response
    }

    async fn run(
        &self,
        state: S,
        parts: Parts,
        body: Body,
        params: HashMap<String, String>,
        mediatype: &str,
    ) -> Result<Response, ApiError> {
        let method = parts.method.clone();
        let automatic_options = self
            .resource
            .cross_domain
            .as_ref()
            .is_some_and(|cors| cors.handles_options());

        if method == Method::OPTIONS
            && (automatic_options || self.resource.operation(&Method::OPTIONS).is_none())
        {
            return Ok(self.options_response());
        }
        let operation = match self.resource.operation(&method) {
            Some(op) => op,
            None if method == Method::HEAD => self
                .resource
                .operation(&Method::GET)
                .ok_or_else(|| self.not_allowed())?,
            None => return Err(self.not_allowed()),
        };

        let mask = match &operation.marshal {
            Some(_) => parts
                .headers
                .get(self.shared.settings.mask_header.as_str())
                .and_then(|v| v.to_str().ok())
                .filter(|raw| !raw.trim().is_empty())
                .map(Mask::parse)
                .transpose()?,
            None => None,
        };

        let uri = parts.uri.clone();
        let headers = parts.headers.clone();
        // The extractor honours `DefaultBodyLimit` (2 MiB unless a layer says otherwise).
        let bytes = Bytes::from_request(Request::from_parts(parts, body), &state)
            .await
            .map_err(|rejection| abort(rejection.status().as_u16(), rejection.body_text()))?;
        let mut call = Call::new(state, method.clone(), uri, headers, bytes).with_params(params);

        if let Some(expect) = &operation.expect {
            if operation.validate.unwrap_or(self.shared.settings.validate) {
                if let Some(err) = call.payload_error() {
                    return Err(abort(400, format!("Failed to decode JSON object: {err}")));
                }
                let payload = call.payload().cloned().unwrap_or(Value::Null);
                if expect.list {
                    expect.model.validate_list(&payload)?;
                } else {
                    expect.model.validate(&payload)?;
                }
            }
        }
        if let Some(parser) = &operation.parser {
            let args = parser.parse(&call)?;
            call.set_args(args);
        }

        let reply = (operation.handler)(call).await?;
        let (data, status, headers) = reply.into_parts();
        let status = status
            .or(operation.code)
            .unwrap_or_else(|| default_status(&method));

        let data = match &operation.marshal {
            Some(target) => {
                let marshaled = marshal(&data, &target.model)?;
                match &mask {
                    Some(mask) => mask.apply(&marshaled),
                    None => marshaled,
                }
            }
            None => data,
        };
        Ok(self.shared.render(mediatype, &data, status, headers))
    }
}

/// Success status used when neither the operation nor the reply sets one.
pub fn default_status(method: &Method) -> StatusCode {
    match *method {
        Method::POST => StatusCode::CREATED,
        Method::DELETE => StatusCode::NO_CONTENT,
        _ => StatusCode::OK,
    }
}
