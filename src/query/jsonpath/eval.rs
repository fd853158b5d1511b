//! Path execution strategies.
//!
//! Two interchangeable walkers implement [`PathExecutor`], selected when the
//! evaluator is constructed. [`FullWalker`] covers the whole custom subset
//! (wildcards, slices, multi-property, negative indices). [`BasicWalker`]
//! reproduces the historical minimal fallback: literal keys, `[n]` and `[*]`
//! only. The gap is a capability difference, not a bug.

use super::ast::PathSegment;
use super::error::JsonPathError;
use super::parser::Parser;
use crate::document::node::DocValue;

/// Strategy interface for turning a query string into matched values.
pub trait PathExecutor {
    /// Short strategy label, surfaced in engine info.
    fn name(&self) -> &'static str;

    /// Executes a query against a document, returning matched values.
    fn execute(&self, document: &DocValue, query: &str) -> Result<Vec<DocValue>, JsonPathError>;
}

/// Walker for the full custom subset.
pub struct FullWalker;

impl PathExecutor for FullWalker {
    fn name(&self) -> &'static str {
        "full"
    }

    fn execute(&self, document: &DocValue, query: &str) -> Result<Vec<DocValue>, JsonPathError> {
        let path = Parser::parse(query)?;

        let mut current: Vec<&DocValue> = vec![document];
        for segment in &path.segments {
            let mut next = Vec::new();
            for node in &current {
                step(document, node, segment, &mut next);
            }
            current = next;
        }

        Ok(current.into_iter().cloned().collect())
    }
}

/// Evaluates a single segment against a single node.
fn step<'a>(
    root: &'a DocValue,
    node: &'a DocValue,
    segment: &PathSegment,
    out: &mut Vec<&'a DocValue>,
) {
    match segment {
        PathSegment::Root => out.push(root),
        PathSegment::Child(name) => {
            if let Some(child) = node.get(name) {
                out.push(child);
            }
        }
        PathSegment::Index(idx) => {
            if let DocValue::Array(items) = node {
                if let Some(item) = index_element(items, *idx) {
                    out.push(item);
                }
            }
        }
        PathSegment::Wildcard => match node {
            DocValue::Object(props) => out.extend(props.values()),
            DocValue::Array(items) => out.extend(items.iter()),
            _ => {}
        },
        PathSegment::Slice(start, end) => {
            if let DocValue::Array(items) = node {
                let (start_idx, end_idx) = normalize_slice(items.len(), *start, *end);
                if start_idx <= end_idx {
                    out.extend(items[start_idx..end_idx].iter());
                }
            }
        }
        PathSegment::MultiProperty(props) => {
            for prop in props {
                if let Some(child) = node.get(prop) {
                    out.push(child);
                }
            }
        }
    }
}

/// Normalizes a possibly-negative index against an array length.
fn index_element(items: &[DocValue], idx: isize) -> Option<&DocValue> {
    let len = items.len() as isize;
    let normalized = if idx < 0 { len + idx } else { idx };
    if normalized >= 0 && normalized < len {
        items.get(normalized as usize)
    } else {
        None
    }
}

/// Clamps slice bounds to the array, wrapping negative offsets.
fn normalize_slice(len: usize, start: Option<isize>, end: Option<isize>) -> (usize, usize) {
    let len = len as isize;
    let start_idx = match start {
        Some(s) if s < 0 => (len + s).max(0) as usize,
        Some(s) => s.min(len) as usize,
        None => 0,
    };
    let end_idx = match end {
        Some(e) if e < 0 => (len + e).max(0) as usize,
        Some(e) => e.min(len) as usize,
        None => len as usize,
    };
    (start_idx, end_idx)
}

/// The minimal fallback walker: literal keys, `[n]`, `[*]`.
///
/// No slices, no filters, no quoted keys, no negative indices. Anything
/// outside that subset fails with `UnsupportedSyntax`.
pub struct BasicWalker;

impl PathExecutor for BasicWalker {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn execute(&self, document: &DocValue, query: &str) -> Result<Vec<DocValue>, JsonPathError> {
        if query.contains("..") {
            return Err(JsonPathError::InvalidSyntax {
                message: "recursive descent ('..') is not supported".to_string(),
            });
        }

        // Anything after a pipe belongs to the function registry.
        let path_part = query.split('|').next().unwrap_or("").trim();
        let chars: Vec<char> = path_part.chars().collect();
        let mut pos = 0;

        if chars.first() != Some(&'$') {
            return Err(JsonPathError::InvalidSyntax {
                message: "JSONPath must start with '$'".to_string(),
            });
        }
        pos += 1;

        let mut current: Vec<&DocValue> = vec![document];

        while pos < chars.len() {
            match chars[pos] {
                '.' => {
                    pos += 1;
                    let start = pos;
                    while pos < chars.len()
                        && (chars[pos].is_alphanumeric() || chars[pos] == '_' || chars[pos] == '-')
                    {
                        pos += 1;
                    }
                    if pos == start {
                        return Err(JsonPathError::InvalidSyntax {
                            message: "Expected property name after '.'".to_string(),
                        });
                    }
                    let key: String = chars[start..pos].iter().collect();
                    current = current
                        .into_iter()
                        .filter_map(|node| node.get(&key))
                        .collect();
                }
                '[' => {
                    pos += 1;
                    if chars.get(pos) == Some(&'*') {
                        pos += 1;
                        if chars.get(pos) != Some(&']') {
                            return Err(JsonPathError::UnexpectedEnd {
                                expected: "']'".to_string(),
                            });
                        }
                        pos += 1;
                        let mut next = Vec::new();
                        for node in current {
                            match node {
                                DocValue::Array(items) => next.extend(items.iter()),
                                DocValue::Object(props) => next.extend(props.values()),
                                _ => {}
                            }
                        }
                        current = next;
                    } else {
                        let start = pos;
                        while pos < chars.len() && chars[pos].is_ascii_digit() {
                            pos += 1;
                        }
                        if pos == start || chars.get(pos) != Some(&']') {
                            return Err(JsonPathError::UnsupportedSyntax {
                                message:
                                    "basic walker supports only literal keys, [n] and [*]"
                                        .to_string(),
                            });
                        }
                        let idx: usize = chars[start..pos]
                            .iter()
                            .collect::<String>()
                            .parse()
                            .map_err(|_| JsonPathError::InvalidSyntax {
                                message: "Invalid array index".to_string(),
                            })?;
                        pos += 1;
                        current = current
                            .into_iter()
                            .filter_map(|node| match node {
                                DocValue::Array(items) => items.get(idx),
                                _ => None,
                            })
                            .collect();
                    }
                }
                ch => {
                    return Err(JsonPathError::UnsupportedSyntax {
                        message: format!(
                            "basic walker cannot handle '{}' (literal keys, [n] and [*] only)",
                            ch
                        ),
                    });
                }
            }
        }

        Ok(current.into_iter().cloned().collect())
    }
}
