use std::collections::HashMap;
use std::path::Path;

use serde_yaml::Value as Yaml;

use super::value::ConfigValue;
use super::ConfigError;

pub(crate) type Values = HashMap<String, ConfigValue>;

/// Merge `path` into `values`. Absent files are skipped.
pub(crate) fn merge_file(path: &Path, values: &mut Values) -> Result<(), ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ConfigError::Load(format!("{}: {e}", path.display()))),
    };
    merge_str(&content, values).map_err(|e| match e {
        ConfigError::Load(msg) => ConfigError::Load(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub(crate) fn merge_str(content: &str, values: &mut Values) -> Result<(), ConfigError> {
    let doc: Yaml = serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    let mut stack = vec![(String::new(), &doc)];
    while let Some((key, node)) = stack.pop() {
        match node {
            Yaml::Mapping(map) => {
                for (k, v) in map {
                    stack.push((child_key(&key, &segment(k)), v));
                }
            }
            // Lists are kept whole and per index (`swagger.tags.0`).
            Yaml::Sequence(items) if !key.is_empty() => {
                values.insert(key.clone(), ConfigValue::from_yaml(node));
                for (i, item) in items.iter().enumerate() {
                    stack.push((child_key(&key, &i.to_string()), item));
                }
            }
            _ if key.is_empty() => {}
            leaf => {
                values.insert(key, ConfigValue::from_yaml(leaf));
            }
        }
    }
    Ok(())
}

/// Overlay process environment variables: `SWAGGER_UI_EXPANSION` sets
/// `swagger.ui.expansion`.
pub(crate) fn overlay_env(values: &mut Values) {
    for (name, value) in std::env::vars() {
        values.insert(name.to_lowercase().replace('_', "."), ConfigValue::String(value));
    }
}

fn segment(key: &Yaml) -> String {
    match key {
        Yaml::String(s) => s.clone(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        other => format!("{other:?}"),
    }
}

fn child_key(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}
