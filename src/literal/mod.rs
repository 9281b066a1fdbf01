//! JS object-literal values: the on-disk shape of the static temples module.
//!
//! The printer mirrors the hand-rolled pretty-printer the map front-end was
//! built against (2-space indents, single-quoted strings, bare identifier keys).
//! Its output is valid JSON5, which is how it gets read back.

mod print;

pub use print::{js_number, to_js_literal};

/// A value in the JS literal subset we write.
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsValue>),
    /// Entries keep their source order.
    Object(Vec<(String, JsValue)>),
}

impl JsValue {
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, JsValue)>) -> Self {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Numeric field with the NaN sentinel for missing values.
    pub fn number_or_nan(value: Option<i64>) -> Self {
        Self::Number(value.map(|v| v as f64).unwrap_or(f64::NAN))
    }
}

impl From<&serde_json::Value> for JsValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.iter().map(|(k, v)| (k.clone(), Self::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_convert() {
        assert_eq!(JsValue::from(&json!(null)), JsValue::Null);
        assert_eq!(
            JsValue::from(&json!([1, 2.5, "x"])),
            JsValue::Array(vec![
                JsValue::Number(1.0),
                JsValue::Number(2.5),
                JsValue::String("x".to_string()),
            ])
        );
        assert_eq!(
            JsValue::from(&json!({ "note": true })),
            JsValue::object([("note", JsValue::Bool(true))])
        );
    }

    #[test]
    fn printed_literal_reads_back_as_json5() {
        let value = JsValue::object([
            ("id", JsValue::Number(12.0)),
            ("name", JsValue::String("L'Oracle \\ Delphes".to_string())),
            ("tags", JsValue::Array(vec![JsValue::Bool(true), JsValue::Null])),
            ("needs-quotes", JsValue::Number(1.5)),
            ("missing", JsValue::Number(f64::NAN)),
        ]);
        let printed = to_js_literal(&value);
        let read: serde_json::Value = json5::from_str(&printed).unwrap();
        assert_eq!(
            read,
            json!({
                "id": 12,
                "name": "L'Oracle \\ Delphes",
                "tags": [true, null],
                "needs-quotes": 1.5,
                "missing": null
            })
        );
    }
}
