use restplus_core::http::header::CONTENT_TYPE;
use restplus_core::http::routing::get;
use restplus_core::http::{Html, IntoResponse, Router};
use restplus_core::meta::ApiDoc;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::builder::{build_spec, DocContext, SwaggerConfig};
use crate::ui::render_swagger_ui;

struct SwaggerState {
    spec_json: String,
    page: String,
}

/// Build a router serving `{prefix}/swagger.json` and, unless disabled, the
/// documentation page.
///
/// The returned router is merged by [`SwaggerPlugin`](crate::SwaggerPlugin)
/// through the meta consumer mechanism.
pub fn swagger_routes<S: Clone + Send + Sync + 'static>(
    config: SwaggerConfig,
    doc: &ApiDoc,
) -> Router<S> {
    let spec = build_spec(&config, doc);
    let spec_json = serde_json::to_string(&spec).unwrap_or_else(|_| "{}".to_string());
    let specs_url = format!("{}/swagger.json", doc.prefix);

    let static_url = match config.static_dir {
        Some(_) => format!("{}/swaggerui", doc.prefix),
        None => config.static_url.trim_end_matches('/').to_string(),
    };
    let context = DocContext {
        title: doc.info.title.clone(),
        specs_url: specs_url.clone(),
        static_url,
    };
    let page = match &config.doc_view {
        Some(view) => view(&context),
        None => render_swagger_ui(&config, &context),
    };
    let state = Arc::new(SwaggerState { spec_json, page });

    let json_state = state.clone();
    let mut router = Router::<S>::new().route(
        &specs_url,
        get(move || {
            let json = json_state.spec_json.clone();
            async move { ([(CONTENT_TYPE, "application/json")], json).into_response() }
        }),
    );

    if let Some(doc_path) = &config.doc_path {
        let page_path = page_path(&doc.prefix, doc_path);
        if doc.paths().any(|p| p == page_path) {
            tracing::warn!(
                path = %page_path,
                "Documentation page collides with an API route, not serving it"
            );
        } else {
            let page_state = state.clone();
            router = router.route(
                &page_path,
                get(move || {
                    let page = page_state.page.clone();
                    async move { Html(page).into_response() }
                }),
            );
            tracing::debug!(path = %page_path, "Serving documentation page");
        }
    }

    if let Some(dir) = &config.static_dir {
        router = router.nest_service(&format!("{}/swaggerui", doc.prefix), ServeDir::new(dir));
    }
    router
}

fn page_path(prefix: &str, doc_path: &str) -> String {
    let doc_path = doc_path.trim_matches('/');
    match (prefix.is_empty(), doc_path.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => prefix.to_string(),
        (_, false) => format!("{prefix}/{doc_path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::page_path;

    #[test]
    fn page_path_joins_prefix() {
        assert_eq!(page_path("", "/"), "/");
        assert_eq!(page_path("/api", "/"), "/api");
        assert_eq!(page_path("", "/doc/"), "/doc");
        assert_eq!(page_path("/api", "doc"), "/api/doc");
    }
}
