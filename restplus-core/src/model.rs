use crate::error::SpecsError;
use crate::fields::{Field, FieldKind};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// A named schema: an ordered mapping of field name to [`Field`].
///
/// Models are immutable once built and cheap to clone (the field table is
/// shared), so the same model can be nested in others, bound to several
/// operations and listed in the generated documentation.
///
/// ```ignore
/// let todo = Model::builder("Todo")
///     .field("id", Field::integer().read_only())
///     .field("task", Field::string().required())
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

#[derive(Debug)]
struct ModelInner {
    name: String,
    description: Option<String>,
    fields: IndexMap<String, Field>,
}

impl Model {
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            duplicate: None,
        }
    }

    /// Start a new model under `name` that copies every field of `self`.
    pub fn extend(&self, name: impl Into<String>) -> ModelBuilder {
        ModelBuilder {
            name: name.into(),
            description: self.inner.description.clone(),
            fields: self.inner.fields.clone(),
            duplicate: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.inner.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.inner.fields.get(name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.inner.fields.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fields.is_empty()
    }

    /// Swagger 2.0 definition for this model.
    pub fn schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for (name, field) in self.fields() {
            properties.insert(name.to_string(), field.schema());
            if field.is_required() {
                required.push(json!(name));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        schema.insert("properties".into(), Value::Object(properties));
        if let Some(desc) = self.description() {
            schema.insert("description".into(), json!(desc));
        }
        Value::Object(schema)
    }

    /// Every model reachable through nested and list fields, depth first,
    /// without duplicates and excluding `self`.
    pub fn nested_models(&self) -> Vec<Model> {
        let mut out: Vec<Model> = Vec::new();
        collect_nested(self, &mut out);
        out.retain(|m| m.name() != self.name());
        out
    }
}

fn collect_nested(model: &Model, out: &mut Vec<Model>) {
    for (_, field) in model.fields() {
        let mut kind = field.kind();
        while let FieldKind::List(item) = kind {
            kind = item.kind();
        }
        if let FieldKind::Nested(nested) = kind {
            if !out.iter().any(|m| m.name() == nested.name()) {
                out.push(nested.clone());
                collect_nested(nested, out);
            }
        }
    }
}

/// Builder returned by [`Model::builder`] and [`Model::extend`].
pub struct ModelBuilder {
    name: String,
    description: Option<String>,
    fields: IndexMap<String, Field>,
    duplicate: Option<String>,
}

impl ModelBuilder {
    /// Declare a field. Declaring the same name twice makes [`build`](Self::build) fail.
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        let name = name.into();
        if self.fields.contains_key(&name) && self.duplicate.is_none() {
            self.duplicate = Some(name.clone());
        }
        self.fields.insert(name, field);
        self
    }

    /// Replace a field inherited through [`Model::extend`].
    pub fn override_field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn build(self) -> Result<Model, SpecsError> {
        if let Some(field) = self.duplicate {
            return Err(SpecsError::DuplicateField {
                model: self.name,
                field,
            });
        }
        Ok(Model {
            inner: Arc::new(ModelInner {
                name: self.name,
                description: self.description,
                fields: self.fields,
            }),
        })
    }
}
