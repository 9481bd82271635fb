//! Shape outgoing data according to a [`Model`].

use crate::error::MarshalError;
use crate::model::Model;
use serde::Serialize;
use serde_json::{Map, Value};

/// Marshal `value` against `model`.
///
/// Objects produce exactly the model's declared fields, in declaration
/// order; undeclared keys are dropped and missing ones get the field default
/// (or `null`). Arrays are marshaled element-wise, `null` stays `null`.
///
/// Marshaling an already marshaled value yields the same value.
pub fn marshal(value: &Value, model: &Model) -> Result<Value, MarshalError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| marshal_object(item, model, ""))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => marshal_object(other, model, ""),
    }
}

/// Serialize `value` with serde, then [`marshal`] it.
pub fn marshal_serialize<T: Serialize + ?Sized>(value: &T, model: &Model) -> Result<Value, MarshalError> {
    let raw = serde_json::to_value(value).map_err(|e| MarshalError::Serialize(e.to_string()))?;
    marshal(&raw, model)
}

pub(crate) fn marshal_object(value: &Value, model: &Model, path: &str) -> Result<Value, MarshalError> {
    let source = match value {
        Value::Null => return Ok(Value::Null),
        Value::Object(map) => map,
        other => {
            return Err(MarshalError::NotAnObject {
                model: model.name().to_string(),
                found: other.to_string(),
            })
        }
    };

    let mut out = Map::with_capacity(model.len());
    for (name, field) in model.fields() {
        // Fall back to the declared name so re-marshaling output is stable.
        let raw = field
            .get_attribute()
            .and_then(|attr| source.get(attr))
            .or_else(|| source.get(name))
            .unwrap_or(&Value::Null);
        let field_path = if path.is_empty() {
            name.to_string()
        } else {
            format!("{path}.{name}")
        };
        out.insert(name.to_string(), field.format(raw, &field_path)?);
    }
    Ok(Value::Object(out))
}
