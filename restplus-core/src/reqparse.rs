//! Request argument parsing.
//!
//! A [`RequestParser`] declares the arguments an operation reads from the
//! query string, form body, JSON body, headers or path. Parsing collects
//! every problem before failing, with the same 400 body as model validation.

use crate::error::ApiError;
use crate::meta::{ParamDoc, ParamLocation};
use crate::resource::Call;
use crate::validation::{FieldError, ValidationError};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Json,
    Query,
    Form,
    Headers,
    Path,
}

impl Location {
    fn describe(self) -> &'static str {
        match self {
            Location::Json => "the JSON body",
            Location::Query => "the query string",
            Location::Form => "the post body",
            Location::Headers => "the HTTP headers",
            Location::Path => "the URL path",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl ArgKind {
    fn type_name(self) -> &'static str {
        match self {
            ArgKind::String => "string",
            ArgKind::Integer => "integer",
            ArgKind::Float => "number",
            ArgKind::Boolean => "boolean",
        }
    }

    /// Convert a raw value. Strings from the query, form or headers are parsed.
    fn convert(self, raw: &Value) -> Result<Value, String> {
        let invalid = || format!("invalid literal for {}: {raw}", self.type_name());
        match (self, raw) {
            (ArgKind::String, Value::String(_)) => Ok(raw.clone()),
            (ArgKind::String, Value::Number(n)) => Ok(json!(n.to_string())),
            (ArgKind::String, Value::Bool(b)) => Ok(json!(b.to_string())),
            (ArgKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(raw.clone()),
            (ArgKind::Integer, Value::String(s)) => {
                s.trim().parse::<i64>().map(|i| json!(i)).map_err(|_| invalid())
            }
            (ArgKind::Float, Value::Number(_)) => Ok(raw.clone()),
            (ArgKind::Float, Value::String(s)) => {
                s.trim().parse::<f64>().map(|f| json!(f)).map_err(|_| invalid())
            }
            (ArgKind::Boolean, Value::Bool(_)) => Ok(raw.clone()),
            (ArgKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Ok(json!(true)),
                "false" | "0" | "off" | "no" => Ok(json!(false)),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        }
    }
}

/// One declared request argument.
#[derive(Debug, Clone)]
pub struct Argument {
    name: String,
    kind: ArgKind,
    locations: Vec<Location>,
    required: bool,
    default: Option<Value>,
    help: Option<String>,
    choices: Vec<Value>,
}

impl Argument {
    /// A string argument looked up in the JSON body, then the query string,
    /// then the form body.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ArgKind::String,
            locations: vec![Location::Json, Location::Query, Location::Form],
            required: false,
            default: None,
            help: None,
            choices: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: ArgKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.locations = vec![location];
        self
    }

    pub fn locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations = locations.into_iter().collect();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lookup<S>(&self, call: &Call<S>) -> Option<Value> {
        self.locations.iter().find_map(|location| match location {
            Location::Json => call
                .payload()
                .and_then(|p| p.get(&self.name))
                .filter(|v| !v.is_null())
                .cloned(),
            Location::Query => call.query(&self.name).map(|v| json!(v)),
            Location::Form => call.form(&self.name).map(|v| json!(v)),
            Location::Headers => call.header(&self.name).map(|v| json!(v)),
            Location::Path => call.param(&self.name).map(|v| json!(v)),
        })
    }

    fn parse<S>(&self, call: &Call<S>) -> Result<Value, String> {
        let Some(raw) = self.lookup(call) else {
            if self.required {
                let places: Vec<&str> = self.locations.iter().map(|l| l.describe()).collect();
                return Err(format!("Missing required parameter in {}", places.join(" or ")));
            }
            return Ok(self.default.clone().unwrap_or(Value::Null));
        };
        let value = self.kind.convert(&raw)?;
        if !self.choices.is_empty() && !self.choices.contains(&value) {
            return Err(format!("{value} is not a valid choice"));
        }
        Ok(value)
    }

    fn error_message(&self, reason: String) -> String {
        match &self.help {
            Some(help) => format!("{help} {reason}"),
            None => reason,
        }
    }

    fn param_location(&self) -> Option<ParamLocation> {
        if self.locations.contains(&Location::Path) {
            Some(ParamLocation::Path)
        } else if self.locations.contains(&Location::Query) {
            Some(ParamLocation::Query)
        } else if self.locations.contains(&Location::Form) {
            Some(ParamLocation::FormData)
        } else if self.locations.contains(&Location::Headers) {
            Some(ParamLocation::Header)
        } else {
            None
        }
    }
}

/// An ordered set of [`Argument`]s.
#[derive(Debug, Clone, Default)]
pub struct RequestParser {
    args: Vec<Argument>,
}

impl RequestParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, replacing any previous one with the same name.
    pub fn arg(mut self, arg: Argument) -> Self {
        self.args.retain(|a| a.name != arg.name);
        self.args.push(arg);
        self
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Parse every argument from the request. Missing optional arguments are
    /// present in the result with their default or `null`.
    pub fn parse<S>(&self, call: &Call<S>) -> Result<Map<String, Value>, ApiError> {
        let mut values = Map::new();
        let mut errors = Vec::new();
        for arg in &self.args {
            match arg.parse(call) {
                Ok(value) => {
                    values.insert(arg.name.clone(), value);
                }
                Err(reason) => errors.push(FieldError {
                    field: arg.name.clone(),
                    message: arg.error_message(reason),
                }),
            }
        }
        if errors.is_empty() {
            Ok(values)
        } else {
            Err(ValidationError::new(errors).into())
        }
    }

    /// Swagger parameters for the non-JSON arguments.
    pub fn documented_params(&self) -> Vec<ParamDoc> {
        self.args
            .iter()
            .filter_map(|arg| {
                let location = arg.param_location()?;
                Some(ParamDoc {
                    name: arg.name.clone(),
                    location,
                    param_type: arg.kind.type_name().to_string(),
                    required: arg.required || location == ParamLocation::Path,
                    description: arg.help.clone(),
                    default: arg.default.clone(),
                    choices: arg.choices.clone(),
                    format: None,
                })
            })
            .collect()
    }

    /// Inline body schema for JSON-only arguments, if there are any.
    pub fn body_schema(&self) -> Option<Value> {
        let json_args: Vec<&Argument> = self
            .args
            .iter()
            .filter(|a| a.param_location().is_none())
            .collect();
        if json_args.is_empty() {
            return None;
        }
        let mut properties = Map::new();
        let mut required = Vec::new();
        for arg in json_args {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(arg.kind.type_name()));
            if let Some(help) = &arg.help {
                prop.insert("description".into(), json!(help));
            }
            if let Some(default) = &arg.default {
                prop.insert("default".into(), default.clone());
            }
            if !arg.choices.is_empty() {
                prop.insert("enum".into(), Value::Array(arg.choices.clone()));
            }
            if arg.required {
                required.push(json!(arg.name));
            }
            properties.insert(arg.name.clone(), Value::Object(prop));
        }
        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        schema.insert("properties".into(), Value::Object(properties));
        Some(Value::Object(schema))
    }
}
