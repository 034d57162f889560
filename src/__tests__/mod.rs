mod dsl_test;
mod grammar_test;

use crate::{Environment, Value};

/// Build a [Value] out of a `serde_json` literal; handy for nested environments.
pub fn value_from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(0.0)),
        },
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(value_from_json).collect())
        }
        serde_json::Value::Object(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key, value_from_json(value)))
                .collect(),
        ),
    }
}

/// Build an [Environment] out of a `serde_json` object literal.
pub fn env_from_json(json: serde_json::Value) -> Environment {
    match json {
        serde_json::Value::Object(entries) => entries
            .into_iter()
            .map(|(key, value)| (key, value_from_json(value)))
            .collect(),
        _ => Environment::new(),
    }
}
