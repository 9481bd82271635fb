//! Route patterns: `/todos/<todo_id>` or `/items/<id:int>`.
//!
//! Each `<name>` or `<name:type>` placeholder must fill a whole path
//! segment. Known types are `string` (default), `int`, `number` and
//! `alpha`; anything else is used as a regular expression.

use crate::error::SpecsError;
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub enum Converter {
    String,
    Int,
    Number,
    Alpha,
    Regex(Regex),
}

impl Converter {
    fn parse(spec: &str, pattern: &str) -> Result<Self, SpecsError> {
        Ok(match spec {
            "" | "string" => Converter::String,
            "int" => Converter::Int,
            "number" => Converter::Number,
            "alpha" => Converter::Alpha,
            custom => {
                let regex = Regex::new(&format!("^(?:{custom})$")).map_err(|e| {
                    SpecsError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Converter::Regex(regex)
            }
        })
    }

    /// Whether a raw path segment is accepted by this converter.
    pub fn matches(&self, segment: &str) -> bool {
        match self {
            Converter::String => !segment.is_empty(),
            Converter::Int => !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()),
            Converter::Number => {
                !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit() || b == b'.')
            }
            Converter::Alpha => {
                !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_alphabetic())
            }
            Converter::Regex(regex) => regex.is_match(segment),
        }
    }

    /// Swagger parameter type.
    pub fn swagger_type(&self) -> &'static str {
        match self {
            Converter::Int => "integer",
            Converter::Number => "number",
            Converter::String | Converter::Alpha | Converter::Regex(_) => "string",
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Static(String),
    Param { name: String, converter: Converter },
}

/// A parsed, normalised route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, SpecsError> {
        let invalid = |reason: &str| SpecsError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        for part in raw.split('/').filter(|s| !s.is_empty()) {
            if let Some(inner) = part.strip_prefix('<').and_then(|p| p.strip_suffix('>')) {
                let (name, spec) = inner.split_once(':').unwrap_or((inner, ""));
                if name.is_empty() {
                    return Err(invalid("empty parameter name"));
                }
                let duplicate = segments
                    .iter()
                    .any(|s| matches!(s, Segment::Param { name: n, .. } if n == name));
                if duplicate {
                    return Err(invalid("duplicate parameter name"));
                }
                segments.push(Segment::Param {
                    name: name.to_string(),
                    converter: Converter::parse(spec, raw)?,
                });
            } else if part.contains(['<', '>', '{', '}']) {
                return Err(invalid("parameters must span a whole path segment"));
            } else if part.starts_with([':', '*']) {
                return Err(invalid("segments cannot start with ':' or '*'"));
            } else {
                segments.push(Segment::Static(part.to_string()));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Join several pattern pieces (api prefix, namespace path, route) into one.
    pub fn join(parts: &[&str]) -> Result<Self, SpecsError> {
        let joined = parts
            .iter()
            .flat_map(|p| p.split('/'))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self::parse(&format!("/{joined}"))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Path in axum syntax: `/todos/{todo_id}`.
    pub fn axum_path(&self) -> String {
        self.render(|name| format!("{{{name}}}"))
    }

    /// Path with parameter names erased (`/todos/{}`). Two patterns with the
    /// same shape match the same URLs, so axum cannot hold both.
    pub fn shape(&self) -> String {
        self.render(|_| "{}".to_string())
    }

    /// Path in Swagger syntax. Identical to the axum form today.
    pub fn swagger_path(&self) -> String {
        self.axum_path()
    }

    fn render(&self, param: impl Fn(&str) -> String) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Static(s) => out.push_str(s),
                Segment::Param { name, .. } => out.push_str(&param(name)),
            }
        }
        out
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &Converter)> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, converter } => Some((name.as_str(), converter)),
            Segment::Static(_) => None,
        })
    }

    /// Whether every captured value is accepted by its converter.
    pub fn accepts(&self, captured: &HashMap<String, String>) -> bool {
        self.params().all(|(name, converter)| {
            captured
                .get(name)
                .is_some_and(|value| converter.matches(value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn renders_axum_path() {
        let pattern = RoutePattern::parse("/todos/<todo_id>/tags/<tag:alpha>").unwrap();
        assert_eq!(pattern.axum_path(), "/todos/{todo_id}/tags/{tag}");
        assert_eq!(RoutePattern::parse("/").unwrap().axum_path(), "/");
    }

    #[test]
    fn join_normalises_slashes() {
        let pattern = RoutePattern::join(&["/api/", "/todos", "/<id:int>/"]).unwrap();
        assert_eq!(pattern.axum_path(), "/api/todos/{id}");
        assert_eq!(RoutePattern::join(&["", "/", "/"]).unwrap().axum_path(), "/");
    }

    #[test]
    fn shape_erases_parameter_names() {
        let a = RoutePattern::parse("/todos/<id>").unwrap();
        let b = RoutePattern::parse("todos/<todo_id:int>/").unwrap();
        assert_eq!(a.shape(), "/todos/{}");
        assert_eq!(a.shape(), b.shape());
    }

    #[test]
    fn converters_check_segments() {
        let pattern = RoutePattern::parse("/<id:int>/<ratio:number>/<code:[A-Z]{2}>").unwrap();
        assert!(pattern.accepts(&captured(&[("id", "12"), ("ratio", "0.5"), ("code", "FR")])));
        assert!(!pattern.accepts(&captured(&[("id", "x"), ("ratio", "0.5"), ("code", "FR")])));
        assert!(!pattern.accepts(&captured(&[("id", "1"), ("ratio", "0.5"), ("code", "FRA")])));
        assert!(!pattern.accepts(&captured(&[("id", "1")])));
    }

    #[test]
    fn swagger_types() {
        let pattern = RoutePattern::parse("/<a:int>/<b:number>/<c>").unwrap();
        let types: Vec<&str> = pattern.params().map(|(_, c)| c.swagger_type()).collect();
        assert_eq!(types, ["integer", "number", "string"]);
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert!(RoutePattern::parse("/<>").is_err());
        assert!(RoutePattern::parse("/<id>/<id>").is_err());
        assert!(RoutePattern::parse("/todo<id>").is_err());
        assert!(RoutePattern::parse("/<id:[unclosed>").is_err());
        assert!(RoutePattern::parse("/todos/:id").is_err());
        assert!(RoutePattern::parse("/files/*rest").is_err());
    }
}
