use restplus_core::meta::{ApiDoc, BodyDoc, OperationDoc, ParamDoc, ResponseDoc};
use restplus_core::{Model, RestConfig};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Default location of the Swagger UI assets.
pub const DEFAULT_STATIC_URL: &str = "https://cdn.jsdelivr.net/npm/swagger-ui-dist@3";

/// What a custom documentation view gets to render the page.
#[derive(Debug, Clone)]
pub struct DocContext {
    pub title: String,
    pub specs_url: String,
    pub static_url: String,
}

/// Renders the documentation page in place of the bundled Swagger UI.
pub type DocView = Arc<dyn Fn(&DocContext) -> String + Send + Sync>;

/// Configuration of the generated document and the documentation page.
#[derive(Clone)]
pub struct SwaggerConfig {
    /// Documentation page path relative to the API prefix, `None` when disabled.
    pub doc_path: Option<String>,
    pub static_url: String,
    /// Local directory with the Swagger UI assets, served under `{prefix}/swaggerui`.
    pub static_dir: Option<PathBuf>,
    pub doc_expansion: String,
    pub display_operation_id: bool,
    pub display_request_duration: bool,
    pub validator_url: Option<String>,
    pub host: Option<String>,
    pub doc_view: Option<DocView>,
}

impl Default for SwaggerConfig {
    fn default() -> Self {
        Self {
            doc_path: Some("/".to_string()),
            static_url: DEFAULT_STATIC_URL.to_string(),
            static_dir: None,
            doc_expansion: "none".to_string(),
            display_operation_id: false,
            display_request_duration: false,
            validator_url: None,
            host: None,
            doc_view: None,
        }
    }
}

impl SwaggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `swagger.*` keys. `swagger.path: false` disables the page.
    pub fn from_config(config: &RestConfig) -> Self {
        let defaults = Self::default();
        let doc_path = match config.get::<bool>("swagger.path") {
            Ok(false) => None,
            Ok(true) => defaults.doc_path.clone(),
            Err(_) => Some(config.get_or("swagger.path", "/".to_string())),
        };
        Self {
            doc_path,
            static_url: config.get_or("swagger.static", defaults.static_url),
            doc_expansion: config.get_or("swagger.ui.expansion", defaults.doc_expansion),
            display_operation_id: config.get_or("swagger.ui.operationid", false),
            display_request_duration: config.get_or("swagger.ui.duration", false),
            validator_url: config.get::<Option<String>>("swagger.validator").ok().flatten(),
            ..defaults
        }
    }

    pub fn doc_path(mut self, path: impl Into<String>) -> Self {
        self.doc_path = Some(path.into());
        self
    }

    /// Serve `swagger.json` only.
    pub fn no_doc(mut self) -> Self {
        self.doc_path = None;
        self
    }

    pub fn static_url(mut self, url: impl Into<String>) -> Self {
        self.static_url = url.into();
        self
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// `none`, `list` or `full`.
    pub fn doc_expansion(mut self, expansion: impl Into<String>) -> Self {
        self.doc_expansion = expansion.into();
        self
    }

    pub fn display_operation_id(mut self, display: bool) -> Self {
        self.display_operation_id = display;
        self
    }

    pub fn display_request_duration(mut self, display: bool) -> Self {
        self.display_request_duration = display;
        self
    }

    pub fn validator_url(mut self, url: impl Into<String>) -> Self {
        self.validator_url = Some(url.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn doc_view<F>(mut self, view: F) -> Self
    where
        F: Fn(&DocContext) -> String + Send + Sync + 'static,
    {
        self.doc_view = Some(Arc::new(view));
        self
    }
}

/// Build the Swagger 2.0 document for an API.
pub fn build_spec(config: &SwaggerConfig, doc: &ApiDoc) -> Value {
    let mut paths: Map<String, Value> = Map::new();
    for ns in &doc.namespaces {
        for route in &ns.routes {
            let path = relative_path(&doc.prefix, &route.path);
            let mut item = Map::new();
            for op in &route.operations {
                item.insert(op.method.clone(), operation(op, &ns.name));
            }
            let entry = paths.entry(path).or_insert_with(|| json!({}));
            if let Some(obj) = entry.as_object_mut() {
                obj.extend(item);
            }
        }
    }

    let mut spec = Map::new();
    spec.insert("swagger".into(), json!("2.0"));
    let base_path = if doc.prefix.is_empty() { "/" } else { doc.prefix.as_str() };
    spec.insert("basePath".into(), json!(base_path));
    spec.insert("paths".into(), Value::Object(paths));
    spec.insert("info".into(), info(doc));
    spec.insert("produces".into(), json!(doc.produces));
    spec.insert("consumes".into(), json!(["application/json"]));
    spec.insert("tags".into(), tags(doc));

    let definitions = definitions(&doc.models);
    if !definitions.is_empty() {
        spec.insert("definitions".into(), Value::Object(definitions));
    }
    spec.insert(
        "responses".into(),
        json!({
            "ParseError": {"description": "When a mask can't be parsed"},
            "MaskError": {"description": "When any error occurs on mask"}
        }),
    );
    if let Some(host) = &config.host {
        spec.insert("host".into(), json!(host));
    }
    Value::Object(spec)
}

fn relative_path(prefix: &str, path: &str) -> String {
    match path.strip_prefix(prefix) {
        Some(rest) if !prefix.is_empty() && (rest.is_empty() || rest.starts_with('/')) => {
            if rest.is_empty() {
                "/".to_string()
            } else {
                rest.to_string()
            }
        }
        _ => path.to_string(),
    }
}

fn info(doc: &ApiDoc) -> Value {
    let info = &doc.info;
    let mut out = Map::new();
    out.insert("title".into(), json!(info.title));
    out.insert("version".into(), json!(info.version));
    if let Some(description) = &info.description {
        out.insert("description".into(), json!(description));
    }
    if let Some(terms) = &info.terms_url {
        out.insert("termsOfService".into(), json!(terms));
    }
    if let Some(contact) = &info.contact {
        let mut c = Map::new();
        if let Some(name) = &contact.name {
            c.insert("name".into(), json!(name));
        }
        if let Some(url) = &contact.url {
            c.insert("url".into(), json!(url));
        }
        if let Some(email) = &contact.email {
            c.insert("email".into(), json!(email));
        }
        out.insert("contact".into(), Value::Object(c));
    }
    if let Some(license) = &info.license {
        let mut l = Map::new();
        l.insert("name".into(), json!(license.name));
        if let Some(url) = &license.url {
            l.insert("url".into(), json!(url));
        }
        out.insert("license".into(), Value::Object(l));
    }
    Value::Object(out)
}

/// Configured tags first, then every namespace that binds at least one route.
fn tags(doc: &ApiDoc) -> Value {
    let mut names = Vec::new();
    let mut out = Vec::new();
    let namespaces = doc
        .namespaces
        .iter()
        .filter(|ns| !ns.routes.is_empty())
        .map(|ns| (&ns.name, &ns.description));
    let configured = doc.tags.iter().map(|t| (&t.name, &t.description));
    for (name, description) in configured.chain(namespaces) {
        if names.contains(&name) {
            continue;
        }
        names.push(name);
        let mut tag = Map::new();
        tag.insert("name".into(), json!(name));
        if let Some(description) = description {
            tag.insert("description".into(), json!(description));
        }
        out.push(Value::Object(tag));
    }
    Value::Array(out)
}

fn definitions(models: &[Model]) -> Map<String, Value> {
    let mut out = Map::new();
    for model in models {
        for m in std::iter::once(model.clone()).chain(model.nested_models()) {
            if !out.contains_key(m.name()) {
                out.insert(m.name().to_string(), m.schema());
            }
        }
    }
    out
}

fn model_ref(model: &Model, list: bool) -> Value {
    let reference = json!({ "$ref": format!("#/definitions/{}", model.name()) });
    if list {
        json!({ "type": "array", "items": reference })
    } else {
        reference
    }
}

fn parameter(param: &ParamDoc) -> Value {
    let mut out = Map::new();
    out.insert("name".into(), json!(param.name));
    out.insert("in".into(), json!(param.location.as_str()));
    out.insert("type".into(), json!(param.param_type));
    out.insert("required".into(), json!(param.required));
    if let Some(description) = &param.description {
        out.insert("description".into(), json!(description));
    }
    if let Some(format) = &param.format {
        out.insert("format".into(), json!(format));
    }
    if let Some(default) = &param.default {
        out.insert("default".into(), default.clone());
    }
    if !param.choices.is_empty() {
        out.insert("enum".into(), Value::Array(param.choices.clone()));
    }
    Value::Object(out)
}

fn response(doc: &ResponseDoc) -> Value {
    let mut out = Map::new();
    out.insert("description".into(), json!(doc.description));
    if doc.code != 204 {
        if let Some(model) = &doc.model {
            out.insert("schema".into(), model_ref(model, doc.list));
        }
    }
    Value::Object(out)
}

fn operation(op: &OperationDoc, tag: &str) -> Value {
    let mut out = Map::new();
    out.insert("operationId".into(), json!(op.operation_id));
    if let Some(summary) = &op.summary {
        out.insert("summary".into(), json!(summary));
    }
    if let Some(description) = &op.description {
        out.insert("description".into(), json!(description));
    }
    out.insert("tags".into(), json!([tag]));

    let mut params: Vec<Value> = op.params.iter().map(parameter).collect();
    if let Some(body) = &op.body {
        let schema = match body {
            BodyDoc::Model { model, list } => model_ref(model, *list),
            BodyDoc::Inline(schema) => schema.clone(),
        };
        params.push(json!({
            "name": "payload",
            "in": "body",
            "required": true,
            "schema": schema,
        }));
    }
    if !params.is_empty() {
        out.insert("parameters".into(), Value::Array(params));
    }

    let mut responses = Map::new();
    for doc in &op.responses {
        responses.insert(doc.code.to_string(), response(doc));
    }
    out.insert("responses".into(), Value::Object(responses));

    if op.deprecated {
        out.insert("deprecated".into(), json!(true));
    }
    Value::Object(out)
}
