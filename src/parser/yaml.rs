//! YAML document parsing.
//!
//! Parses YAML text with serde_yaml into the shared [`DocValue`] tree.
//! Mapping keys are stringified, since the query languages address children
//! by name. Path locators use the dotted YQ syntax rooted at `.`.

use serde_yaml::Value as YamlValue;

use super::{DocumentParser, ParseError};
use crate::document::node::{DocNumber, DocValue};

/// Parser for YAML documents.
pub struct YamlParser;

impl YamlParser {
    pub fn new() -> Self {
        YamlParser
    }
}

impl Default for YamlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn key_string(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn convert(value: YamlValue) -> DocValue {
    match value {
        YamlValue::Null => DocValue::Null,
        YamlValue::Bool(b) => DocValue::Boolean(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                DocValue::Number(DocNumber::Integer(i))
            } else {
                DocValue::Number(DocNumber::Float(n.as_f64().unwrap_or(0.0)))
            }
        }
        YamlValue::String(s) => DocValue::String(s),
        YamlValue::Sequence(items) => DocValue::Array(items.into_iter().map(convert).collect()),
        YamlValue::Mapping(mapping) => DocValue::Object(
            mapping
                .into_iter()
                .map(|(key, value)| (key_string(&key), convert(value)))
                .collect(),
        ),
        YamlValue::Tagged(tagged) => convert(tagged.value),
    }
}

impl DocumentParser for YamlParser {
    fn format_name(&self) -> &'static str {
        "yaml"
    }

    fn parse(&self, content: &str) -> Result<DocValue, ParseError> {
        let value: YamlValue = serde_yaml::from_str(content).map_err(|err| ParseError {
            format: "yaml",
            message: err.to_string(),
        })?;
        Ok(convert(value))
    }

    fn root_selector(&self) -> &'static str {
        "."
    }

    fn format_property_path(&self, base: &str, key: &str) -> String {
        if base == "." {
            format!(".{}", key)
        } else {
            format!("{}.{}", base, key)
        }
    }

    fn format_array_path(&self, base: &str, index_expr: &str) -> String {
        if base == "." {
            format!(".[{}]", index_expr)
        } else {
            format!("{}[{}]", base, index_expr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mapping_preserves_order() {
        let parser = YamlParser::new();
        let doc = parser.parse("zebra: 1\napple: 2\n").unwrap();

        if let DocValue::Object(props) = doc {
            let keys: Vec<&String> = props.keys().collect();
            assert_eq!(keys, vec!["zebra", "apple"]);
        } else {
            panic!("expected object");
        }
    }

    #[test]
    fn test_parse_sequence_and_scalars() {
        let parser = YamlParser::new();
        let doc = parser
            .parse("items:\n  - 1\n  - name: two\nflag: true\n")
            .unwrap();

        let items = doc.get("items").unwrap();
        assert!(items.is_array());
        assert_eq!(doc.get("flag"), Some(&DocValue::Boolean(true)));
    }

    #[test]
    fn test_non_string_keys_are_stringified() {
        let parser = YamlParser::new();
        let doc = parser.parse("1: one\ntrue: yes\n").unwrap();

        assert!(doc.get("1").is_some());
        assert!(doc.get("true").is_some());
    }

    #[test]
    fn test_parse_malformed_fails() {
        let parser = YamlParser::new();
        assert!(parser.parse("key: [unclosed").is_err());
    }

    #[test]
    fn test_path_formatting_is_dotted() {
        let parser = YamlParser::new();
        assert_eq!(parser.format_property_path(".", "store"), ".store");
        assert_eq!(parser.format_property_path(".store", "book"), ".store.book");
        assert_eq!(parser.format_array_path(".", "0"), ".[0]");
        assert_eq!(parser.format_array_path(".store.book", "0"), ".store.book[0]");
    }
}
