use crate::fields::FieldKind;
use crate::model::Model;
use serde::Serialize;
use serde_json::{Map, Value};

const PAYLOAD_FAILED: &str = "Input payload validation failed";

/// A field-level validation error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Input did not match the expected model or parser arguments.
///
/// Surfaced as HTTP 400 with body
/// `{"errors": {"<field>": "<message>"}, "message": "Input payload validation failed"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self {
            message: PAYLOAD_FAILED.to_string(),
            errors,
        }
    }

    /// Single-error shorthand.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError {
            field: field.into(),
            message: message.into(),
        }])
    }

    /// Names of the offending fields, in detection order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    pub(crate) fn errors_json(&self) -> Value {
        let mut map = Map::new();
        for err in &self.errors {
            map.entry(err.field.clone())
                .or_insert_with(|| Value::String(err.message.clone()));
        }
        Value::Object(map)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.message)?;
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{} ({})", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for ValidationError {}

impl Model {
    /// Validate an incoming payload against this model.
    ///
    /// Checks that the payload is an object, that every required field is
    /// present and non-null, and that present fields have a compatible type.
    /// Nested models are checked recursively and reported with dotted names
    /// (`todo.task`, `tags.1`). All problems are collected.
    pub fn validate(&self, payload: &Value) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        validate_object(self, payload, "", &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(errors))
        }
    }

    /// Validate a collection payload. A single object counts as a
    /// one-element collection.
    pub fn validate_list(&self, payload: &Value) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        match payload {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    validate_object(self, item, &i.to_string(), &mut errors);
                }
            }
            other => validate_object(self, other, "", &mut errors),
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(errors))
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn validate_object(model: &Model, value: &Value, prefix: &str, errors: &mut Vec<FieldError>) {
    let Some(obj) = value.as_object() else {
        errors.push(FieldError {
            field: if prefix.is_empty() { "payload".to_string() } else { prefix.to_string() },
            message: format!("{value} is not of type 'object'"),
        });
        return;
    };

    for (name, field) in model.fields() {
        let path = join(prefix, name);
        match obj.get(name) {
            None | Some(Value::Null) => {
                if field.is_required() {
                    errors.push(FieldError {
                        field: path,
                        message: format!("'{name}' is a required property"),
                    });
                }
            }
            Some(v) if !field.check(v) => errors.push(FieldError {
                field: path,
                message: format!("{v} is not of type '{}'", field.kind().type_name()),
            }),
            Some(v) => match field.kind() {
                FieldKind::Nested(nested) => validate_object(nested, v, &path, errors),
                FieldKind::List(item) => {
                    let items = v.as_array().map(Vec::as_slice).unwrap_or_default();
                    for (i, element) in items.iter().enumerate() {
                        let element_path = join(&path, &i.to_string());
                        if element.is_null() {
                            continue;
                        }
                        if !item.check(element) {
                            errors.push(FieldError {
                                field: element_path,
                                message: format!(
                                    "{element} is not of type '{}'",
                                    item.kind().type_name()
                                ),
                            });
                        } else if let FieldKind::Nested(nested) = item.kind() {
                            validate_object(nested, element, &element_path, errors);
                        }
                    }
                }
                _ => {}
            },
        }
    }
}
