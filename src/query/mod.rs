//! Query evaluation and suggestion contracts.
//!
//! Every query language implements [`QueryEvaluator`]. The trait carries the
//! shared union-query plumbing (naive comma split, canonical-serialization
//! dedup) and the module provides the relevance pipeline every engine runs
//! its suggestions through.
//!
//! # Supported Languages
//!
//! - `jsonpath` - dollar-rooted paths with wildcards, slices and filters
//! - `yq` - dotted/piped navigation stages

pub mod jsonpath;
pub mod pipes;
pub mod yq;

pub use jsonpath::JsonPathEvaluator;
pub use yq::YqEvaluator;

use std::collections::HashSet;

use crate::document::node::DocValue;
use crate::parser::PathDescriptor;

/// Default cap on the number of suggestions returned to a caller.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 10;

/// Error produced when a query fails to evaluate.
///
/// Carries the evaluator's language name alongside the underlying message,
/// so a caller juggling several engines can attribute the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluateError {
    pub language: &'static str,
    pub message: String,
}

impl EvaluateError {
    pub fn new(language: &'static str, message: impl Into<String>) -> Self {
        Self {
            language,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EvaluateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} evaluation failed: {}", self.language, self.message)
    }
}

impl std::error::Error for EvaluateError {}

/// Structured result of a never-failing query validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryValidation {
    pub valid: bool,
    pub error: Option<String>,
}

impl QueryValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// The kind of completion a suggestion proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Property,
    ArrayAccess,
    Wildcard,
    Slice,
    Filter,
    PipeFunction,
    RecursiveDescent,
}

/// A proposed completion with an exact text-replacement range.
///
/// `insert_text` replaces the byte range `replace_start..replace_end` of the
/// full query; applying the replacement always yields a syntactically
/// continuable query.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// The bare completion (a key name, `[0]`, a function name, ...).
    pub text: String,
    /// What a dropdown should display.
    pub display_text: String,
    pub kind: SuggestionKind,
    pub description: String,
    /// Short rendering of the value behind the suggestion, if known.
    pub sample_value: Option<String>,
    /// Full replacement for the active sub-expression.
    pub insert_text: String,
    pub replace_start: usize,
    pub replace_end: usize,
}

impl Suggestion {
    /// Creates a suggestion replacing the context's active sub-expression.
    pub fn new(
        text: impl Into<String>,
        display_text: impl Into<String>,
        kind: SuggestionKind,
        description: impl Into<String>,
        insert_text: impl Into<String>,
        context: &QueryContext,
    ) -> Self {
        Self {
            text: text.into(),
            display_text: display_text.into(),
            kind,
            description: description.into(),
            sample_value: None,
            insert_text: insert_text.into(),
            replace_start: context.expression_start,
            replace_end: context.expression_end,
        }
    }

    pub fn with_sample(mut self, sample: Option<String>) -> Self {
        self.sample_value = sample;
        self
    }
}

/// Which comma-delimited sub-expression of a union query the cursor is in.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    pub full_query: String,
    pub current_expression: String,
    pub cursor_position: usize,
    pub expression_start: usize,
    pub expression_end: usize,
    pub before_expression: String,
    pub after_expression: String,
    /// Name of the consuming tool, used by injected suggestion sources.
    pub tool: Option<String>,
}

impl QueryContext {
    /// Builds a context for a standalone expression (no union, cursor at end).
    pub fn for_expression(expression: &str) -> Self {
        Self {
            full_query: expression.to_string(),
            current_expression: expression.trim().to_string(),
            cursor_position: expression.len(),
            expression_start: 0,
            expression_end: expression.len(),
            before_expression: String::new(),
            after_expression: String::new(),
            tool: None,
        }
    }
}

/// Contract every query language implements.
///
/// Evaluators are pure with respect to the document: neither evaluation nor
/// suggestion generation may mutate it.
pub trait QueryEvaluator {
    /// Language name ("jsonpath", "yq").
    fn language(&self) -> &'static str;

    /// Feature labels surfaced through engine info.
    fn supported_features(&self) -> Vec<&'static str>;

    /// Whether comma-separated union queries are accepted.
    fn supports_union(&self) -> bool {
        true
    }

    /// Evaluates a complete query against a document.
    fn evaluate(&self, document: &DocValue, query: &str) -> Result<Vec<DocValue>, EvaluateError>;

    /// Produces context-aware suggestions for a partial expression.
    ///
    /// Must never fail: internal errors are logged and an empty list
    /// returned, so a keystroke can never crash an input field.
    fn get_suggestions(
        &self,
        document: &DocValue,
        partial_query: &str,
        context: &QueryContext,
        available_paths: &[PathDescriptor],
    ) -> Vec<Suggestion>;

    /// Suggestions for an empty query.
    fn root_suggestions(&self, document: &DocValue, context: &QueryContext) -> Vec<Suggestion>;

    /// Checks query syntax without evaluating, never failing.
    fn validate_query(&self, query: &str) -> QueryValidation;

    /// Splits a union query on every comma, trimming whitespace and dropping
    /// empty expressions.
    ///
    /// Known limitation, preserved on purpose: the split does not track
    /// bracket or quote nesting, so a literal comma inside a filter or a
    /// function argument is mis-split.
    fn split_union_query<'q>(&self, query: &'q str) -> Vec<&'q str> {
        query
            .split(',')
            .map(str::trim)
            .filter(|expr| !expr.is_empty())
            .collect()
    }

    /// Flattens result sets, deduplicating by canonical serialization while
    /// preserving first-seen order.
    fn combine_union_results(&self, result_sets: Vec<Vec<DocValue>>) -> Vec<DocValue> {
        let mut seen = HashSet::new();
        let mut combined = Vec::new();
        for results in result_sets {
            for value in results {
                if seen.insert(value.canonical_string()) {
                    combined.push(value);
                }
            }
        }
        combined
    }
}

/// External suggestion source backing the `compare(` context.
///
/// Implementations typically look up previously recorded data for the
/// consuming tool; the engine only injects and queries them, it never
/// performs I/O itself.
pub trait DataHistorySource {
    fn suggestions(
        &self,
        tool: Option<&str>,
        partial_query: &str,
        context: &QueryContext,
    ) -> Vec<Suggestion>;
}

/// Shared relevance pipeline: filter, sort, limit.
///
/// Keeps entries whose text or display text contains `partial_input`
/// case-insensitively (no-op for an empty input), orders exact matches
/// first, then prefix matches, then by ascending text length, and truncates
/// to `max_count`. The sort is stable, so insertion order breaks ties.
pub fn process_suggestions(
    mut suggestions: Vec<Suggestion>,
    partial_input: &str,
    max_count: usize,
) -> Vec<Suggestion> {
    let needle = partial_input.to_lowercase();

    if !needle.is_empty() {
        suggestions.retain(|s| {
            s.text.to_lowercase().contains(&needle)
                || s.display_text.to_lowercase().contains(&needle)
        });
    }

    suggestions.sort_by_key(|s| {
        let text = s.text.to_lowercase();
        let rank = if !needle.is_empty() && text == needle {
            0
        } else if text.starts_with(&needle) {
            1
        } else {
            2
        };
        (rank, s.text.len())
    });

    suggestions.truncate(max_count);
    suggestions
}
