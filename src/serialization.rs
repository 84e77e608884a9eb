use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A typed default value, as carried by an `insert` intent.
///
/// Values arriving as JSON never produce [`DefaultValue::Date`] (strings become
/// [`DefaultValue::Text`]); dates come from intents built in Rust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(DateTime<Utc>),
    List(Vec<DefaultValue>),
    Map(BTreeMap<String, DefaultValue>),
}

impl From<&str> for DefaultValue {
    fn from(text: &str) -> Self {
        DefaultValue::Text(text.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(text: String) -> Self {
        DefaultValue::Text(text)
    }
}

impl From<bool> for DefaultValue {
    fn from(flag: bool) -> Self {
        DefaultValue::Bool(flag)
    }
}

impl From<f64> for DefaultValue {
    fn from(number: f64) -> Self {
        DefaultValue::Number(number)
    }
}

impl From<i64> for DefaultValue {
    fn from(number: i64) -> Self {
        DefaultValue::Number(number as f64)
    }
}

impl From<DateTime<Utc>> for DefaultValue {
    fn from(date: DateTime<Utc>) -> Self {
        DefaultValue::Date(date)
    }
}

impl From<Vec<DefaultValue>> for DefaultValue {
    fn from(items: Vec<DefaultValue>) -> Self {
        DefaultValue::List(items)
    }
}

/// Converts a default value into the form a browser would submit for it.
///
/// Dates become ISO-8601 strings, `true` becomes `"on"`, numbers become their
/// decimal text. `false` and `null` are omitted.
pub fn serialize(value: &DefaultValue) -> Option<Value> {
    match value {
        DefaultValue::Null | DefaultValue::Bool(false) => None,
        DefaultValue::Bool(true) => Some(Value::String("on".to_string())),
        DefaultValue::Number(number) => Some(Value::String(format_number(*number))),
        DefaultValue::Text(text) => Some(Value::String(text.clone())),
        DefaultValue::Date(date) => Some(Value::String(
            date.to_rfc3339_opts(SecondsFormat::Millis, true),
        )),
        DefaultValue::List(items) => Some(Value::Array(
            items
                .iter()
                .map(|item| serialize(item).unwrap_or(Value::Null))
                .collect(),
        )),
        DefaultValue::Map(entries) => Some(Value::Object(
            entries
                .iter()
                .filter_map(|(key, item)| serialize(item).map(|item| (key.clone(), item)))
                .collect::<Map<String, Value>>(),
        )),
    }
}

fn format_number(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number.is_infinite() {
        let text = if number > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}
