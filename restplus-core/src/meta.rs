use crate::model::Model;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// A generic, type-erased metadata registry.
///
/// [`Api::try_build`](crate::Api::try_build) pushes an [`ApiDoc`] into the
/// registry; plugins read the types they care about through
/// [`Api::with_meta_consumer`](crate::Api::with_meta_consumer).
///
/// Internally stores `Vec<M>` per type, keyed by `TypeId`.
#[derive(Default)]
pub struct MetaRegistry {
    inner: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MetaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<M: Any + Send + Sync>(&mut self, item: M) {
        self.entry::<M>().push(item);
    }

    pub fn get<M: Any + Send + Sync>(&self) -> Option<&[M]> {
        self.inner
            .get(&TypeId::of::<M>())
            .and_then(|boxed| boxed.downcast_ref::<Vec<M>>())
            .map(|v| v.as_slice())
    }

    pub fn get_or_empty<M: Any + Send + Sync>(&self) -> &[M] {
        self.get::<M>().unwrap_or(&[])
    }

    fn entry<M: Any + Send + Sync>(&mut self) -> &mut Vec<M> {
        let slot = self
            .inner
            .entry(TypeId::of::<M>())
            .or_insert_with(|| Box::new(Vec::<M>::new()));
        if !slot.is::<Vec<M>>() {
            *slot = Box::new(Vec::<M>::new());
        }
        match slot.downcast_mut::<Vec<M>>() {
            Some(vec) => vec,
            None => unreachable!("slot was just reset to Vec<M>"),
        }
    }
}

// ── Documentation metadata ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Contact {
    pub name: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct License {
    pub name: String,
    pub url: Option<String>,
}

/// Top-level API description shown in the documentation.
#[derive(Debug, Clone)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub terms_url: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
}

impl ApiInfo {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            terms_url: None,
            contact: None,
            license: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn terms_url(mut self, url: impl Into<String>) -> Self {
        self.terms_url = Some(url.into());
        self
    }

    pub fn contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    pub fn license(mut self, name: impl Into<String>, url: Option<&str>) -> Self {
        self.license = Some(License {
            name: name.into(),
            url: url.map(str::to_string),
        });
        self
    }
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self::new("API", "1.0")
    }
}

#[derive(Debug, Clone)]
pub struct TagDoc {
    pub name: String,
    pub description: Option<String>,
}

/// Where a documented parameter lives, in Swagger 2.0 terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    FormData,
}

impl ParamLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::FormData => "formData",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamDoc {
    pub name: String,
    pub location: ParamLocation,
    pub param_type: String,
    pub required: bool,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub choices: Vec<Value>,
    pub format: Option<String>,
}

/// A request body: either a model reference or an inline schema.
#[derive(Debug, Clone)]
pub enum BodyDoc {
    Model { model: Model, list: bool },
    Inline(Value),
}

/// One documented response code.
#[derive(Debug, Clone)]
pub struct ResponseDoc {
    pub code: u16,
    pub description: String,
    pub model: Option<Model>,
    pub list: bool,
}

#[derive(Debug, Clone)]
pub struct OperationDoc {
    pub method: String,
    pub operation_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub params: Vec<ParamDoc>,
    pub body: Option<BodyDoc>,
    /// Responses in documentation order, the default success code first.
    pub responses: Vec<ResponseDoc>,
    pub deprecated: bool,
}

#[derive(Debug, Clone)]
pub struct RouteDoc {
    /// Full path in `{param}` syntax, relative to the host.
    pub path: String,
    pub resource: String,
    pub operations: Vec<OperationDoc>,
}

#[derive(Debug, Clone)]
pub struct NamespaceDoc {
    pub name: String,
    pub description: Option<String>,
    pub routes: Vec<RouteDoc>,
}

/// Everything the documentation generator needs, frozen at build time.
#[derive(Debug, Clone)]
pub struct ApiDoc {
    pub info: ApiInfo,
    /// API prefix, `""` when mounted at the root.
    pub prefix: String,
    pub tags: Vec<TagDoc>,
    pub namespaces: Vec<NamespaceDoc>,
    /// Registered and referenced models, nested ones not yet expanded.
    pub models: Vec<Model>,
    pub produces: Vec<String>,
}

impl ApiDoc {
    /// Every documented route path.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.namespaces
            .iter()
            .flat_map(|ns| ns.routes.iter().map(|r| r.path.as_str()))
    }
}
