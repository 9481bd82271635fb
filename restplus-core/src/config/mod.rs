//! YAML and environment configuration for an [`Api`](crate::Api).

mod loader;
pub mod value;

use std::path::Path;

use loader::Values;
pub use value::{ConfigValue, FromConfigValue};

const PROFILE_VAR: &str = "RESTPLUS_PROFILE";

#[derive(Debug)]
pub enum ConfigError {
    NotFound(String),
    TypeMismatch { key: String, expected: &'static str },
    /// Unreadable file or invalid YAML.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "missing config key '{key}'"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "config key '{key}' is not a valid {expected}")
            }
            ConfigError::Load(msg) => write!(f, "cannot load configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Flattened configuration: dotted keys (`restplus.mask.header`) to values.
///
/// [`RestConfig::load`] layers, lowest priority first:
/// 1. `application.yaml`
/// 2. `application-{profile}.yaml`
/// 3. `.env` then `.env.{profile}`, exported into the process environment
///    without overwriting variables that are already set
/// 4. every environment variable, `RESTPLUS_JSON_INDENT` setting
///    `restplus.json.indent`
///
/// `RESTPLUS_PROFILE` takes precedence over the profile argument.
#[derive(Debug, Clone)]
pub struct RestConfig {
    values: Values,
    profile: String,
}

impl RestConfig {
    /// Load from the current directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile)
    }

    pub fn load_from(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        let profile = std::env::var(PROFILE_VAR).unwrap_or_else(|_| profile.to_string());

        let mut values = Values::new();
        for file in ["application.yaml".to_string(), format!("application-{profile}.yaml")] {
            loader::merge_file(&dir.join(file), &mut values)?;
        }
        for env_file in [".env".to_string(), format!(".env.{profile}")] {
            // A missing dotenv file is normal.
            let _ = dotenvy::from_path(dir.join(env_file));
        }
        loader::overlay_env(&mut values);

        tracing::debug!(%profile, keys = values.len(), "Configuration loaded");
        Ok(Self { values, profile })
    }

    /// Parse a YAML document, ignoring files and the environment.
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = Values::new();
        loader::merge_str(yaml, &mut values)?;
        Ok(Self {
            values,
            profile: profile.to_string(),
        })
    }

    pub fn empty() -> Self {
        Self {
            values: Values::new(),
            profile: "test".to_string(),
        }
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Typed lookup of a dotted key.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        match self.values.get(key) {
            Some(value) => V::from_config_value(value, key),
            None => Err(ConfigError::NotFound(key.to_string())),
        }
    }

    /// Typed lookup, `default` when the key is absent or malformed.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }
}
