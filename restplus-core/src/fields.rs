//! Typed field descriptors used by [`Model`].
//!
//! A [`Field`] plays three roles: it formats outgoing values during
//! marshaling, checks incoming values during validation, and describes itself
//! as a Swagger schema fragment.

use crate::error::MarshalError;
use crate::marshal::marshal_object;
use crate::model::Model;
use serde_json::{json, Map, Number, Value};

/// The value type carried by a [`Field`].
#[derive(Debug, Clone)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    /// RFC 3339 timestamp carried as a string.
    DateTime,
    /// Any JSON value, passed through untouched.
    Raw,
    Nested(Model),
    List(Box<Field>),
}

impl FieldKind {
    /// JSON type name used in validation messages and schemas.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::DateTime => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Raw | FieldKind::Nested(_) => "object",
            FieldKind::List(_) => "array",
        }
    }
}

/// A named-by-its-model, typed field with documentation attributes.
///
/// ```ignore
/// let task = Field::string().required().description("The task details");
/// let id = Field::integer().read_only();
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    required: bool,
    read_only: bool,
    default: Option<Value>,
    description: Option<String>,
    example: Option<Value>,
    attribute: Option<String>,
}

impl Field {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            read_only: false,
            default: None,
            description: None,
            example: None,
            attribute: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    pub fn date_time() -> Self {
        Self::new(FieldKind::DateTime)
    }

    pub fn raw() -> Self {
        Self::new(FieldKind::Raw)
    }

    pub fn nested(model: &Model) -> Self {
        Self::new(FieldKind::Nested(model.clone()))
    }

    pub fn list(item: Field) -> Self {
        Self::new(FieldKind::List(Box::new(item)))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Value used when the field is missing or `null` at marshaling time.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Read the value from a differently named key of the source object.
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn get_attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Convert a raw value into this field's output representation.
    ///
    /// `null` becomes the declared default (or stays `null`). `path` is the
    /// dotted field name used in error messages.
    pub fn format(&self, value: &Value, path: &str) -> Result<Value, MarshalError> {
        if value.is_null() {
            return match &self.default {
                Some(default) if !default.is_null() => self.format(default, path),
                _ => Ok(Value::Null),
            };
        }

        let invalid = || MarshalError::InvalidValue {
            field: path.to_string(),
            expected: self.kind.type_name(),
            found: value.to_string(),
        };

        match &self.kind {
            FieldKind::String => match value {
                Value::String(_) => Ok(value.clone()),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err(invalid()),
            },
            FieldKind::Integer => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
                Value::Number(n) => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(json!(f as i64))
                    }
                    _ => Err(invalid()),
                },
                Value::String(s) => s.trim().parse::<i64>().map(|i| json!(i)).map_err(|_| invalid()),
                _ => Err(invalid()),
            },
            FieldKind::Float => {
                let parsed = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                parsed
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(invalid)
            }
            FieldKind::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            FieldKind::DateTime => match value {
                Value::String(_) => Ok(value.clone()),
                _ => Err(invalid()),
            },
            FieldKind::Raw => Ok(value.clone()),
            FieldKind::Nested(model) => marshal_object(value, model, path),
            FieldKind::List(item) => match value {
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| item.format(v, &format!("{path}.{i}")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                _ => Err(invalid()),
            },
        }
    }

    /// Whether an incoming, non-null value has a compatible JSON type.
    pub fn check(&self, value: &Value) -> bool {
        match &self.kind {
            FieldKind::String | FieldKind::DateTime => value.is_string(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Float => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Raw => true,
            FieldKind::Nested(_) => value.is_object(),
            FieldKind::List(_) => value.is_array(),
        }
    }

    /// Swagger 2.0 schema fragment for this field.
    pub fn schema(&self) -> Value {
        let mut schema = match &self.kind {
            FieldKind::DateTime => json!({ "type": "string", "format": "date-time" }),
            FieldKind::Nested(model) => {
                json!({ "$ref": format!("#/definitions/{}", model.name()) })
            }
            FieldKind::List(item) => json!({ "type": "array", "items": item.schema() }),
            other => json!({ "type": other.type_name() }),
        };

        if let Some(obj) = schema.as_object_mut() {
            insert_opt(obj, "description", self.description.as_ref().map(|d| json!(d)));
            insert_opt(obj, "default", self.default.clone());
            insert_opt(obj, "example", self.example.clone());
            if self.read_only {
                obj.insert("readOnly".into(), json!(true));
            }
        }
        schema
    }
}

fn insert_opt(obj: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        obj.insert(key.to_string(), value);
    }
}
