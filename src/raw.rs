//! Source-format fixtures: the provider's nested JSON flattened into dotted
//! field paths (`teams.home.name`, `score.fulltime.away`, ...).

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// A snapshot cell, kept verbatim. Empty cells are null; numbers are only
    /// read out of the text by `as_int`.
    pub fn from_cell(cell: &str) -> Self {
        if cell.is_empty() {
            RawValue::Null
        } else {
            RawValue::Text(cell.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Any non-null scalar rendered as text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Integer view. Whole floats (`2.0`) are accepted since nullable integer
    /// columns are often widened to floats by other tools.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RawValue::Int(v) => Some(*v),
            RawValue::Float(v) => whole_float(*v),
            RawValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_float))
            }
            RawValue::Null | RawValue::Bool(_) => None,
        }
    }

    pub fn to_cell(&self) -> String {
        match self {
            RawValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

fn whole_float(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => Ok(()),
            RawValue::Bool(v) => write!(f, "{v}"),
            RawValue::Int(v) => write!(f, "{v}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&Value> for RawValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Int(i),
                None => n.as_f64().map(RawValue::Float).unwrap_or(RawValue::Null),
            },
            Value::String(s) => RawValue::Text(s.clone()),
            // Lists stay opaque; they are kept as JSON text in the snapshot.
            Value::Array(_) | Value::Object(_) => RawValue::Text(value.to_string()),
        }
    }
}

/// One fixture as an ordered list of `(dotted path, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFixture {
    fields: Vec<(String, RawValue)>,
}

impl RawFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: RawValue) {
        let path = path.into();
        if let Some(slot) = self.fields.iter_mut().find(|(p, _)| *p == path) {
            slot.1 = value;
        } else {
            self.fields.push((path, value));
        }
    }

    pub fn with(mut self, path: &str, value: RawValue) -> Self {
        self.insert(path, value);
        self
    }

    pub fn get(&self, path: &str) -> Option<&RawValue> {
        self.fields.iter().find(|(p, _)| p == path).map(|(_, v)| v)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Short label for error messages: the fixture id when present, else the position.
    pub fn label(&self, index: usize) -> String {
        match self.get("fixture.id").and_then(RawValue::as_int) {
            Some(id) => format!("#{index} (fixture {id})"),
            None => format!("#{index}"),
        }
    }
}

/// Flattens one fixture object. Nested objects become dotted paths; arrays
/// are kept whole as JSON text.
pub fn flatten_fixture(value: &Value) -> RawFixture {
    let mut out = RawFixture::new();
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(&mut out, key, child);
            }
        }
        other => out.insert("value", RawValue::from(other)),
    }
    out
}

fn flatten_into(out: &mut RawFixture, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(out, &format!("{prefix}.{key}"), child);
            }
        }
        Value::Object(_) => out.insert(prefix, RawValue::Null),
        other => out.insert(prefix, RawValue::from(other)),
    }
}

/// Parses a `/fixtures` response body and flattens its `response` array.
pub fn parse_fixtures_response(raw: &str) -> Result<Vec<RawFixture>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(PipelineError::EmptyResponse);
    }
    let root: Value = serde_json::from_str(trimmed)?;
    let Some(items) = root.get("response").and_then(Value::as_array) else {
        return Err(PipelineError::Schema {
            field: "response".to_string(),
            record: "API body".to_string(),
        });
    };
    if items.is_empty() {
        return Err(PipelineError::EmptyResponse);
    }
    Ok(items.iter().map(flatten_fixture).collect())
}

/// Union of all field paths, in first-seen order.
pub fn snapshot_columns(fixtures: &[RawFixture]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for fixture in fixtures {
        for path in fixture.paths() {
            if seen.insert(path.to_string()) {
                out.push(path.to_string());
            }
        }
    }
    out
}
