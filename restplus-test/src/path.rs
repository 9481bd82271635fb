//! Dotted JSON paths used by the response assertions: `items[0].name`,
//! `items.len()`.

use serde_json::Value;

#[derive(Debug, PartialEq)]
pub enum PathToken {
    Field(String),
    Index(usize),
    Len,
}

pub fn tokenize_path(path: &str) -> Vec<PathToken> {
    let mut tokens = Vec::new();
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        if segment == "len()" {
            tokens.push(PathToken::Len);
            continue;
        }
        let Some(bracket) = segment.find('[') else {
            tokens.push(PathToken::Field(segment.to_string()));
            continue;
        };
        if bracket > 0 {
            tokens.push(PathToken::Field(segment[..bracket].to_string()));
        }
        for index in segment[bracket..].split('[').filter(|s| !s.is_empty()) {
            let index = index
                .strip_suffix(']')
                .and_then(|i| i.parse().ok())
                .unwrap_or_else(|| panic!("invalid array index in JSON path: {path}"));
            tokens.push(PathToken::Index(index));
        }
    }
    tokens
}

/// Resolve `path` against `root`; missing fields and indices give `null`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let mut current = root.clone();
    for token in tokenize_path(path) {
        current = match token {
            PathToken::Field(name) => current.get(&name).cloned().unwrap_or(Value::Null),
            PathToken::Index(i) => current.get(i).cloned().unwrap_or(Value::Null),
            PathToken::Len => {
                let len = match &current {
                    Value::Array(a) => a.len(),
                    Value::Object(o) => o.len(),
                    Value::String(s) => s.chars().count(),
                    other => panic!("len() applied to a non-collection in {path}: {other}"),
                };
                Value::from(len)
            }
        };
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tokenizes_fields_indices_and_len() {
        assert_eq!(
            tokenize_path("items[1][0].name.len()"),
            vec![
                PathToken::Field("items".into()),
                PathToken::Index(1),
                PathToken::Index(0),
                PathToken::Field("name".into()),
                PathToken::Len,
            ]
        );
    }

    #[test]
    fn resolves_nested_values() {
        let doc = json!({"todos": [{"task": "build an API"}, {"task": "?????"}]});
        assert_eq!(resolve_path(&doc, "todos[1].task"), json!("?????"));
        assert_eq!(resolve_path(&doc, "todos.len()"), json!(2));
        assert_eq!(resolve_path(&doc, "todos[5].task"), Value::Null);
    }
}
