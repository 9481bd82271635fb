use crate::config::RestConfig;
use crate::negotiate::APPLICATION_JSON;

/// API-wide behaviour switches.
///
/// Defaults match an empty configuration; [`ApiSettings::from_config`]
/// reads the `restplus.*` keys.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Validate `expect` payloads unless an operation says otherwise.
    pub validate: bool,
    /// Media type used for `*/*`, unmatched `Accept` headers and errors.
    /// `None` turns unmatched `Accept` headers into 406.
    pub default_mediatype: Option<String>,
    pub mask_header: String,
    /// Document the mask header on masked operations.
    pub mask_swagger: bool,
    pub error_message: bool,
    pub error_code: bool,
    pub json_indent: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            validate: false,
            default_mediatype: Some(APPLICATION_JSON.to_string()),
            mask_header: "X-Fields".to_string(),
            mask_swagger: true,
            error_message: true,
            error_code: false,
            json_indent: 0,
        }
    }
}

impl ApiSettings {
    pub fn from_config(config: &RestConfig) -> Self {
        let defaults = Self::default();
        let default_mediatype = if config.contains_key("restplus.mediatype") {
            config
                .get::<Option<String>>("restplus.mediatype")
                .ok()
                .flatten()
                .filter(|m| !m.is_empty() && m != "none")
        } else {
            defaults.default_mediatype
        };
        Self {
            validate: config.get_or("restplus.validate", defaults.validate),
            default_mediatype,
            mask_header: config.get_or("restplus.mask.header", defaults.mask_header),
            mask_swagger: config.get_or("restplus.mask.swagger", defaults.mask_swagger),
            error_message: config.get_or("restplus.error.message", defaults.error_message),
            error_code: config.get_or("restplus.error.code", defaults.error_code),
            json_indent: config.get_or("restplus.json.indent", defaults.json_indent),
        }
    }
}
