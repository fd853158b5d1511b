//! JSON document parsing.
//!
//! Parses JSON text with serde_json and converts it into the shared
//! [`DocValue`] tree. Path locators use JSONPath syntax rooted at `$`.

use serde_json::Value as SerdeValue;

use super::{DocumentParser, ParseError};
use crate::document::node::{DocNumber, DocValue};

/// Parser for JSON documents.
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        JsonParser
    }
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new()
    }
}

fn convert(value: SerdeValue) -> DocValue {
    match value {
        SerdeValue::Null => DocValue::Null,
        SerdeValue::Bool(b) => DocValue::Boolean(b),
        SerdeValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                DocValue::Number(DocNumber::Integer(i))
            } else {
                DocValue::Number(DocNumber::Float(n.as_f64().unwrap_or(0.0)))
            }
        }
        SerdeValue::String(s) => DocValue::String(s),
        SerdeValue::Array(items) => DocValue::Array(items.into_iter().map(convert).collect()),
        SerdeValue::Object(props) => DocValue::Object(
            props
                .into_iter()
                .map(|(key, value)| (key, convert(value)))
                .collect(),
        ),
    }
}

impl DocumentParser for JsonParser {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, content: &str) -> Result<DocValue, ParseError> {
        let value: SerdeValue = serde_json::from_str(content).map_err(|err| ParseError {
            format: "json",
            message: err.to_string(),
        })?;
        Ok(convert(value))
    }

    fn root_selector(&self) -> &'static str {
        "$"
    }

    fn format_property_path(&self, base: &str, key: &str) -> String {
        format!("{}.{}", base, key)
    }

    fn format_array_path(&self, base: &str, index_expr: &str) -> String {
        format!("{}[{}]", base, index_expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_preserves_key_order() {
        let parser = JsonParser::new();
        let doc = parser.parse(r#"{"zebra": 1, "apple": 2}"#).unwrap();

        if let DocValue::Object(props) = doc {
            let keys: Vec<&String> = props.keys().collect();
            assert_eq!(keys, vec!["zebra", "apple"]);
        } else {
            panic!("expected object");
        }
    }

    #[test]
    fn test_parse_number_kinds() {
        let parser = JsonParser::new();
        let doc = parser.parse(r#"{"i": 3, "f": 3.5}"#).unwrap();

        assert_eq!(doc.get("i"), Some(&DocValue::Number(DocNumber::Integer(3))));
        assert_eq!(doc.get("f"), Some(&DocValue::Number(DocNumber::Float(3.5))));
    }

    #[test]
    fn test_parse_malformed_fails() {
        let parser = JsonParser::new();
        let err = parser.parse("{oops").unwrap_err();
        assert_eq!(err.format, "json");
    }

    #[test]
    fn test_path_formatting() {
        let parser = JsonParser::new();
        assert_eq!(parser.format_property_path("$", "store"), "$.store");
        assert_eq!(parser.format_array_path("$.book", "0"), "$.book[0]");
        assert_eq!(parser.format_array_path("$.book", "*"), "$.book[*]");
    }
}
