//! Document tree representation shared by every parser and evaluator.
//!
//! Query evaluation operates on a single in-memory tree type regardless of
//! the format the document was parsed from. Mappings preserve key insertion
//! order so that suggestions and extracted paths appear in document order.
//!
//! # Example
//!
//! ```
//! use queryquill::document::node::{DocValue, DocNumber};
//! use indexmap::IndexMap;
//!
//! let mut map = IndexMap::new();
//! map.insert("name".to_string(), DocValue::String("queryquill".to_string()));
//! map.insert("version".to_string(), DocValue::Number(DocNumber::Integer(2)));
//! let doc = DocValue::Object(map);
//!
//! assert!(doc.is_object());
//! assert_eq!(doc.type_name(), "object");
//! ```

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A document number (integer or float).
#[derive(Debug, Clone, PartialEq)]
pub enum DocNumber {
    Integer(i64),
    Float(f64),
}

impl std::fmt::Display for DocNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocNumber::Integer(i) => write!(f, "{}", i),
            DocNumber::Float(fl) => write!(f, "{}", fl),
        }
    }
}

impl DocNumber {
    pub fn as_f64(&self) -> f64 {
        match self {
            DocNumber::Integer(i) => *i as f64,
            DocNumber::Float(f) => *f,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DocNumber::Integer(_))
    }
}

/// A parsed document value.
///
/// This enum represents the core value kinds every supported format maps
/// onto: objects (ordered key-value pairs), arrays, strings, numbers,
/// booleans, and null. Parsers produce it; evaluators only read it.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    /// An object containing ordered key-value pairs
    Object(IndexMap<String, DocValue>),
    /// An array containing ordered values
    Array(Vec<DocValue>),
    /// A string value
    String(String),
    /// A number (integer or float)
    Number(DocNumber),
    /// A boolean
    Boolean(bool),
    /// A null value
    Null,
}

impl DocValue {
    /// Returns true if this value is an object.
    pub fn is_object(&self) -> bool {
        matches!(self, DocValue::Object(_))
    }

    /// Returns true if this value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, DocValue::Array(_))
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, DocValue::Null)
    }

    /// Returns true if this value is a container (object or array).
    pub fn is_container(&self) -> bool {
        matches!(self, DocValue::Object(_) | DocValue::Array(_))
    }

    /// Returns the value kind as a lowercase name.
    ///
    /// # Example
    ///
    /// ```
    /// use queryquill::document::node::DocValue;
    ///
    /// assert_eq!(DocValue::Null.type_name(), "null");
    /// assert_eq!(DocValue::Array(vec![]).type_name(), "array");
    /// ```
    pub fn type_name(&self) -> &'static str {
        match self {
            DocValue::Object(_) => "object",
            DocValue::Array(_) => "array",
            DocValue::String(_) => "string",
            DocValue::Number(_) => "number",
            DocValue::Boolean(_) => "boolean",
            DocValue::Null => "null",
        }
    }

    /// Looks up a key on an object value.
    pub fn get(&self, key: &str) -> Option<&DocValue> {
        match self {
            DocValue::Object(props) => props.get(key),
            _ => None,
        }
    }

    /// Serializes this value to its canonical JSON form.
    ///
    /// Used for structural-identity comparison when deduplicating union
    /// results. Falls back to the debug representation for values that
    /// cannot be serialized as JSON (e.g. non-finite floats from YAML).
    pub fn canonical_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

impl Serialize for DocNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DocNumber::Integer(i) => serializer.serialize_i64(*i),
            DocNumber::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

impl Serialize for DocValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DocValue::Object(props) => {
                let mut map = serializer.serialize_map(Some(props.len()))?;
                for (key, value) in props {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            DocValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DocValue::String(s) => serializer.serialize_str(s),
            DocValue::Number(n) => n.serialize(serializer),
            DocValue::Boolean(b) => serializer.serialize_bool(*b),
            DocValue::Null => serializer.serialize_unit(),
        }
    }
}
