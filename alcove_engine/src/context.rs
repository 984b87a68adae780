//! Player context: the values templates read through dotted paths.
//!
//! A [`Context`] maps paths such as `player.intelligence`, `player.talent` or
//! `this.uses` to [`Value`]s. It can be built in code or flattened from a
//! nested JSON or TOML document, where `{ player = { talent = "Iris" } }`
//! becomes the single entry `player.talent`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A context value. Comparisons between values never coerce across kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "string",
        }
    }

    /// Interpret a command-line value: booleans and numbers first, text otherwise.
    ///
    /// Surrounding quotes force text, so `"'5'"` is the string `5`.
    pub fn infer(raw: &str) -> Self {
        let raw = raw.trim();
        for quote in ['"', '\''] {
            if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
                return Value::Text(raw[1..raw.len() - 1].to_string());
            }
        }
        match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => Value::Number(n),
                _ => Value::Text(raw.to_string()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            // f64's Display already prints whole numbers without a fraction.
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Errors building a context from a document.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("invalid JSON context: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TOML context: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("context root must be a table/object")]
    NotATable,
    #[error("unsupported {kind} value at '{path}'")]
    Unsupported { path: String, kind: &'static str },
}

/// Read-only path → value mapping consulted by conditions and variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(path, value);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(path.into(), value.into());
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    /// All paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` on this context; its values win.
    pub fn merge(&mut self, other: Context) {
        self.values.extend(other.values);
    }

    /// Flatten a JSON object into dotted paths. `null` entries are skipped.
    ///
    /// # Errors
    /// Fails on invalid JSON, a non-object root, or array values.
    pub fn from_json(text: &str) -> Result<Self, ContextError> {
        let root: serde_json::Value = serde_json::from_str(text)?;
        let serde_json::Value::Object(map) = root else {
            return Err(ContextError::NotATable);
        };
        let mut ctx = Context::new();
        for (key, value) in map {
            flatten_json(&mut ctx, key, value)?;
        }
        Ok(ctx)
    }

    /// Flatten a TOML document into dotted paths. Datetimes become text.
    ///
    /// # Errors
    /// Fails on invalid TOML or array values.
    pub fn from_toml(text: &str) -> Result<Self, ContextError> {
        let table: toml::Table = toml::from_str(text)?;
        let mut ctx = Context::new();
        for (key, value) in table {
            flatten_toml(&mut ctx, key, value)?;
        }
        Ok(ctx)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

fn flatten_json(ctx: &mut Context, path: String, value: serde_json::Value) -> Result<(), ContextError> {
    match value {
        serde_json::Value::Null => {},
        serde_json::Value::Bool(b) => ctx.insert(path, b),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(n) => ctx.insert(path, n),
            None => return Err(ContextError::Unsupported { path, kind: "number" }),
        },
        serde_json::Value::String(s) => ctx.insert(path, s),
        serde_json::Value::Array(_) => return Err(ContextError::Unsupported { path, kind: "array" }),
        serde_json::Value::Object(map) => {
            for (key, value) in map {
                flatten_json(ctx, format!("{path}.{key}"), value)?;
            }
        },
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn flatten_toml(ctx: &mut Context, path: String, value: toml::Value) -> Result<(), ContextError> {
    match value {
        toml::Value::Boolean(b) => ctx.insert(path, b),
        toml::Value::Integer(i) => ctx.insert(path, i as f64),
        toml::Value::Float(f) => ctx.insert(path, f),
        toml::Value::String(s) => ctx.insert(path, s),
        toml::Value::Datetime(dt) => ctx.insert(path, dt.to_string()),
        toml::Value::Array(_) => return Err(ContextError::Unsupported { path, kind: "array" }),
        toml::Value::Table(table) => {
            for (key, value) in table {
                flatten_toml(ctx, format!("{path}.{key}"), value)?;
            }
        },
    }
    Ok(())
}

/// True for dotted identifier paths such as `player.intelligence`.
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
