use std::cmp::Ordering;

use serde_json::Value;

/// A field value after null substitution and case folding.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Text(String),
    Number(f64),
    Bool(bool),
    Structured(Value),
}

/// Missing and `null` become `""`, strings are lower-cased, everything else
/// passes through.
pub fn normalize(value: Option<&Value>) -> Normalized {
    match value {
        None | Some(Value::Null) => Normalized::Text(String::new()),
        Some(Value::String(s)) => Normalized::Text(s.to_lowercase()),
        Some(Value::Number(n)) => Normalized::Number(n.as_f64().unwrap_or(0.0)),
        Some(Value::Bool(b)) => Normalized::Bool(*b),
        Some(other) => Normalized::Structured(other.clone()),
    }
}

/// Totally ordered comparison key: `Empty < Numeric < Text < Structured`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SortKey {
    Empty,
    Numeric(f64),
    Text(String),
    Structured(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Empty => 0,
            SortKey::Numeric(_) => 1,
            SortKey::Text(_) => 2,
            SortKey::Structured(_) => 3,
        }
    }

    pub(crate) fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            // keys are always finite, see `coerce_numeric`
            (SortKey::Numeric(a), SortKey::Numeric(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Structured(a), SortKey::Structured(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Builds comparison keys for one listing. Strings are coerced to numbers
/// only when the listing also holds numeric values for the field; blank text
/// then counts as 0.
pub(crate) fn sort_keys(values: Vec<Normalized>) -> Vec<SortKey> {
    let mixed = values
        .iter()
        .any(|v| matches!(v, Normalized::Number(_) | Normalized::Bool(_)));

    values
        .into_iter()
        .map(|value| match value {
            Normalized::Text(text) if mixed => {
                if text.trim().is_empty() {
                    SortKey::Numeric(0.0)
                } else {
                    match coerce_numeric(&text) {
                        Some(n) => SortKey::Numeric(n),
                        None => SortKey::Text(text),
                    }
                }
            }
            Normalized::Text(text) if text.is_empty() => SortKey::Empty,
            Normalized::Text(text) => SortKey::Text(text),
            Normalized::Number(n) if n.is_finite() => SortKey::Numeric(n),
            Normalized::Number(_) => SortKey::Numeric(0.0),
            Normalized::Bool(b) => SortKey::Numeric(if b { 1.0 } else { 0.0 }),
            Normalized::Structured(v) => SortKey::Structured(v.to_string()),
        })
        .collect()
}

/// Numeric tie-break value of a record's `id`; missing or unparsable is 0.
pub(crate) fn record_id(record: &Value) -> f64 {
    match record.get("id") {
        Some(Value::Number(n)) => n.as_f64().filter(|n| n.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => coerce_numeric(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn coerce_numeric(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
