//! Document parsing and path-catalog extraction.
//!
//! Every supported document format implements [`DocumentParser`]. The trait
//! is a template-method split: the depth-bounded traversal that builds the
//! queryable path catalog is shared, while the path-string syntax (`$.a.b`
//! for JSON, `.a.b` for YAML) comes from three format-specific methods.

pub mod json;
pub mod yaml;

pub use json::JsonParser;
pub use yaml::YamlParser;

use indexmap::IndexMap;

use crate::document::node::DocValue;

/// Maximum length of a string sample before truncation.
const SAMPLE_STRING_LIMIT: usize = 50;

/// Error produced when a document cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Name of the format the parser expected ("json", "yaml").
    pub format: &'static str,
    /// Underlying parser message.
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} document: {}", self.format, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Result of a non-failing validation pass over raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// The kind of value a catalog path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl PathKind {
    /// Classifies a document value.
    pub fn of(value: &DocValue) -> Self {
        match value {
            DocValue::Object(_) => PathKind::Object,
            DocValue::Array(_) => PathKind::Array,
            DocValue::String(_) => PathKind::String,
            DocValue::Number(_) => PathKind::Number,
            DocValue::Boolean(_) => PathKind::Boolean,
            DocValue::Null => PathKind::Null,
        }
    }
}

/// One entry in the catalog of queryable paths.
///
/// Descriptors are deduplicated by path string; the catalog is a set, and
/// callers must not rely on more than document order within one extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct PathDescriptor {
    /// Format-specific locator string (e.g. `$.store.book[0]`).
    pub path: String,
    /// Kind of the value at this path.
    pub kind: PathKind,
    /// Nesting depth; the root selector is depth 0.
    pub depth: usize,
    /// Whether the value is a non-empty container.
    pub has_children: bool,
    /// Short rendering of the value, for suggestion descriptions only.
    pub sample_value: Option<String>,
}

/// Renders a short sample of a value for suggestion descriptions.
///
/// Strings are truncated to 50 characters with an ellipsis; containers are
/// summarized by size. Never used for evaluation.
pub fn sample_value(value: &DocValue) -> Option<String> {
    match value {
        DocValue::Null => None,
        DocValue::String(s) => {
            if s.chars().count() > SAMPLE_STRING_LIMIT {
                let truncated: String = s.chars().take(SAMPLE_STRING_LIMIT).collect();
                Some(format!("{}...", truncated))
            } else {
                Some(s.clone())
            }
        }
        DocValue::Number(n) => Some(n.to_string()),
        DocValue::Boolean(b) => Some(b.to_string()),
        DocValue::Array(items) => Some(format!("Array({})", items.len())),
        DocValue::Object(props) => Some(format!("Object({} keys)", props.len())),
    }
}

/// Contract every document format implements.
///
/// `parse` and the three path-formatting methods are format-specific;
/// `validate` and `extract_paths` are shared.
pub trait DocumentParser {
    /// Name of the format this parser handles ("json", "yaml").
    fn format_name(&self) -> &'static str;

    /// Parses raw text into a document tree.
    fn parse(&self, content: &str) -> Result<DocValue, ParseError>;

    /// The locator for the document root (`$` or `.`).
    fn root_selector(&self) -> &'static str;

    /// Appends a property access to a base path.
    fn format_property_path(&self, base: &str, key: &str) -> String;

    /// Appends an array access (`0`, `*`, ...) to a base path.
    fn format_array_path(&self, base: &str, index_expr: &str) -> String;

    /// Attempts to parse the content, reporting problems without failing.
    fn validate(&self, content: &str) -> ValidationReport {
        match self.parse(content) {
            Ok(_) => ValidationReport {
                valid: true,
                errors: Vec::new(),
            },
            Err(err) => ValidationReport {
                valid: false,
                errors: vec![err.to_string()],
            },
        }
    }

    /// Extracts the catalog of queryable paths, depth-first and bounded.
    ///
    /// Arrays are sampled by representative element: an index-0 path is
    /// emitted, a wildcard path is added when the array has more than one
    /// element, and recursion continues into element 0 only. Objects recurse
    /// into every key. Recursion stops at null values.
    fn extract_paths(&self, document: &DocValue, max_depth: usize) -> Vec<PathDescriptor> {
        let mut catalog: IndexMap<String, PathDescriptor> = IndexMap::new();
        self.collect_paths(self.root_selector(), document, 0, max_depth, &mut catalog);
        catalog.into_values().collect()
    }

    /// Recursive step of [`extract_paths`](DocumentParser::extract_paths).
    fn collect_paths(
        &self,
        path: &str,
        value: &DocValue,
        depth: usize,
        max_depth: usize,
        catalog: &mut IndexMap<String, PathDescriptor>,
    ) {
        if depth > max_depth {
            return;
        }

        catalog
            .entry(path.to_string())
            .or_insert_with(|| descriptor_for(path, value, depth));

        if depth == max_depth {
            return;
        }

        match value {
            // Null terminates recursion
            DocValue::Null => {}
            DocValue::Object(props) => {
                for (key, child) in props {
                    let child_path = self.format_property_path(path, key);
                    self.collect_paths(&child_path, child, depth + 1, max_depth, catalog);
                }
            }
            DocValue::Array(items) => {
                if let Some(first) = items.first() {
                    let index_path = self.format_array_path(path, "0");
                    self.collect_paths(&index_path, first, depth + 1, max_depth, catalog);

                    if items.len() > 1 {
                        let wildcard_path = self.format_array_path(path, "*");
                        catalog
                            .entry(wildcard_path.clone())
                            .or_insert_with(|| descriptor_for(&wildcard_path, first, depth + 1));
                    }
                }
            }
            _ => {}
        }
    }
}

fn descriptor_for(path: &str, value: &DocValue, depth: usize) -> PathDescriptor {
    let has_children = match value {
        DocValue::Object(props) => !props.is_empty(),
        DocValue::Array(items) => !items.is_empty(),
        _ => false,
    };
    PathDescriptor {
        path: path.to_string(),
        kind: PathKind::of(value),
        depth,
        has_children,
        sample_value: sample_value(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_value_truncates_long_strings() {
        let long = "x".repeat(80);
        let sample = sample_value(&DocValue::String(long)).unwrap();
        assert_eq!(sample.len(), 53); // 50 chars + "..."
        assert!(sample.ends_with("..."));
    }

    #[test]
    fn test_sample_value_short_string_untouched() {
        let sample = sample_value(&DocValue::String("red".to_string()));
        assert_eq!(sample, Some("red".to_string()));
    }

    #[test]
    fn test_sample_value_summarizes_containers() {
        let arr = DocValue::Array(vec![DocValue::Null, DocValue::Null]);
        assert_eq!(sample_value(&arr), Some("Array(2)".to_string()));

        let mut map = indexmap::IndexMap::new();
        map.insert("a".to_string(), DocValue::Null);
        assert_eq!(
            sample_value(&DocValue::Object(map)),
            Some("Object(1 keys)".to_string())
        );
    }

    #[test]
    fn test_sample_value_null_is_none() {
        assert_eq!(sample_value(&DocValue::Null), None);
    }

    #[test]
    fn test_extract_paths_samples_arrays() {
        let parser = JsonParser::new();
        let doc = parser
            .parse(r#"{"items": [{"id": 1}, {"id": 2}, {"id": 3}]}"#)
            .unwrap();

        let paths: Vec<String> = parser
            .extract_paths(&doc, 5)
            .into_iter()
            .map(|d| d.path)
            .collect();

        assert!(paths.contains(&"$".to_string()));
        assert!(paths.contains(&"$.items".to_string()));
        assert!(paths.contains(&"$.items[0]".to_string()));
        assert!(paths.contains(&"$.items[*]".to_string()));
        assert!(paths.contains(&"$.items[0].id".to_string()));
        // Only element 0 is walked
        assert!(!paths.contains(&"$.items[1]".to_string()));
    }

    #[test]
    fn test_extract_paths_skips_wildcard_for_single_element() {
        let parser = JsonParser::new();
        let doc = parser.parse(r#"{"items": [1]}"#).unwrap();

        let paths: Vec<String> = parser
            .extract_paths(&doc, 5)
            .into_iter()
            .map(|d| d.path)
            .collect();

        assert!(paths.contains(&"$.items[0]".to_string()));
        assert!(!paths.contains(&"$.items[*]".to_string()));
    }

    #[test]
    fn test_extract_paths_respects_max_depth() {
        let parser = JsonParser::new();
        let doc = parser.parse(r#"{"a": {"b": {"c": {"d": 1}}}}"#).unwrap();

        let paths: Vec<String> = parser
            .extract_paths(&doc, 2)
            .into_iter()
            .map(|d| d.path)
            .collect();

        assert!(paths.contains(&"$.a.b".to_string()));
        assert!(!paths.contains(&"$.a.b.c".to_string()));
    }

    #[test]
    fn test_extract_paths_stops_at_null() {
        let parser = JsonParser::new();
        let doc = parser.parse(r#"{"gone": null}"#).unwrap();

        let descriptors = parser.extract_paths(&doc, 5);
        let null_entry = descriptors.iter().find(|d| d.path == "$.gone").unwrap();
        assert_eq!(null_entry.kind, PathKind::Null);
        assert_eq!(null_entry.sample_value, None);
    }

    #[test]
    fn test_validate_reports_errors_without_failing() {
        let parser = JsonParser::new();
        let report = parser.validate("{not json");
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);

        let ok = parser.validate("{\"a\": 1}");
        assert!(ok.valid);
        assert!(ok.errors.is_empty());
    }
}
