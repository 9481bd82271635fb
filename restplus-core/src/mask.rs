//! Field masks: partial responses selected by the client.
//!
//! A mask lists the keys to keep, with optional sub-masks for nested
//! objects: `id,todo{task}` or `{id,todo{task}}`. `*` keeps every key
//! not otherwise listed.

use serde_json::{Map, Value};

/// Deepest sub-mask accepted in a header.
pub const MAX_MASK_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct MaskError {
    pub position: usize,
    pub reason: &'static str,
}

impl std::fmt::Display for MaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at position {}", self.reason, self.position)
    }
}

impl std::error::Error for MaskError {}

/// A parsed field mask.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mask {
    fields: Vec<(String, Option<Mask>)>,
    wildcard: bool,
}

impl Mask {
    pub fn parse(input: &str) -> Result<Self, MaskError> {
        let trimmed = input.trim();
        let chars: Vec<char> = trimmed.chars().collect();
        let mut pos = 0;

        // Optional enclosing braces.
        let enclosed = chars.first() == Some(&'{');
        if enclosed {
            pos += 1;
        }
        let mask = parse_level(&chars, &mut pos, 0)?;
        if enclosed {
            if chars.get(pos) != Some(&'}') {
                return Err(MaskError { position: pos, reason: "missing closing brace" });
            }
            pos += 1;
        }
        if pos != chars.len() {
            return Err(MaskError { position: pos, reason: "unexpected closing brace" });
        }
        Ok(mask)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && !self.wildcard
    }

    /// Keep only the masked keys of `value`. Arrays are masked element-wise;
    /// scalars are returned untouched.
    pub fn apply(&self, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(|v| self.apply(v)).collect()),
            Value::Object(obj) => {
                let mut out = Map::new();
                for (key, v) in obj {
                    match self.fields.iter().find(|(name, _)| name == key) {
                        Some((_, Some(sub))) => {
                            out.insert(key.clone(), sub.apply(v));
                        }
                        Some((_, None)) => {
                            out.insert(key.clone(), v.clone());
                        }
                        None if self.wildcard => {
                            out.insert(key.clone(), v.clone());
                        }
                        None => {}
                    }
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }
}

fn parse_level(chars: &[char], pos: &mut usize, depth: usize) -> Result<Mask, MaskError> {
    let mut mask = Mask::default();
    let mut name = String::new();

    while let Some(&c) = chars.get(*pos) {
        match c {
            ',' => {
                push_name(&mut mask, &mut name, None);
                *pos += 1;
            }
            '{' => {
                if name.trim().is_empty() {
                    return Err(MaskError { position: *pos, reason: "nested mask without a field name" });
                }
                if depth >= MAX_MASK_DEPTH {
                    return Err(MaskError { position: *pos, reason: "mask nested too deeply" });
                }
                *pos += 1;
                let sub = parse_level(chars, pos, depth + 1)?;
                if chars.get(*pos) != Some(&'}') {
                    return Err(MaskError { position: *pos, reason: "missing closing brace" });
                }
                *pos += 1;
                push_name(&mut mask, &mut name, Some(sub));
            }
            '}' => break,
            c if c.is_whitespace() => *pos += 1,
            c => {
                name.push(c);
                *pos += 1;
            }
        }
    }
    push_name(&mut mask, &mut name, None);
    Ok(mask)
}

fn push_name(mask: &mut Mask, name: &mut String, sub: Option<Mask>) {
    let taken = std::mem::take(name);
    if taken.is_empty() {
        return;
    }
    if taken == "*" {
        mask.wildcard = true;
    } else {
        mask.fields.push((taken, sub));
    }
}
