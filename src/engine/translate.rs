use crate::error::{Result, SbrError};
use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Readable keys whose values are timestamps.
pub const DATETIME_FIELDS: [&str; 5] = [
    "datetime",
    "start datetime",
    "end datetime",
    "last updated",
    "date",
];

/// Internal bookkeeping keys the lines endpoints always return.
pub const LINE_NOISE_KEYS: [&str; 11] = [
    "boid", "lineid", "sequence", "dp", "bs", "iof", "sbid", "sid", "fpd", "fpn", "sort",
];

/// Abbreviated response key -> readable key ("eid" -> "event id").
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    keys: HashMap<String, String>,
}

impl TranslationTable {
    pub fn new(keys: HashMap<String, String>) -> Self {
        Self { keys }
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let keys: HashMap<String, String> = serde_json::from_value(value.clone())
            .map_err(|e| SbrError::Config(format!("translation dictionary: {}", e)))?;
        Ok(Self::new(keys))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.keys.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Return a renamed copy of `value`. Keys without a translation and their
    /// values are carried over as-is; nested objects and arrays are walked.
    pub fn normalize(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, v) in map {
                    let v = self.normalize(v);
                    match self.get(key) {
                        Some(readable) => {
                            out.insert(readable.to_string(), convert_scalar(readable, v));
                        }
                        None => {
                            out.insert(key.clone(), v);
                        }
                    }
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.iter().map(|v| self.normalize(v)).collect()),
            scalar => scalar.clone(),
        }
    }
}

fn convert_scalar(key: &str, value: Value) -> Value {
    let value = match value {
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(s),
        },
        other => other,
    };
    if DATETIME_FIELDS.contains(&key) {
        if let Some(rendered) = value_to_millis(&value).and_then(render_local) {
            return Value::String(rendered);
        }
    }
    value
}

fn value_to_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if s.ends_with('Z') => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        _ => None,
    }
}

fn render_local(millis: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Epoch milliseconds, as the service expects timestamps in arguments.
pub fn datetime_to_millis<Tz: TimeZone>(dt: &DateTime<Tz>) -> i64 {
    dt.with_timezone(&Utc).timestamp_millis()
}

/// Copy of `value` with line noise keys removed from every record, including
/// a record nested under `line`.
pub fn strip_line_noise(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(strip_line_noise).collect()),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, v) in map {
                if LINE_NOISE_KEYS.contains(&key.as_str()) {
                    continue;
                }
                let v = if key == "line" { strip_line_noise(v) } else { v.clone() };
                out.insert(key.clone(), v);
            }
            Value::Object(out)
        }
        scalar => scalar.clone(),
    }
}
