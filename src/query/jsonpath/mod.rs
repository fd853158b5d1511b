//! JSONPath query engine with context-aware suggestions.
//!
//! # Supported Syntax
//!
//! - `$` - root node
//! - `.property` - named property access
//! - `['property']` - bracket notation
//! - `[index]` - array index (negative indices wrap)
//! - `[*]` or `.*` - all children (wildcard)
//! - `[start:end]` - array slicing
//! - `['prop1','prop2']` - multiple properties
//!
//! Recursive descent (`..`) is rejected as invalid syntax; this custom
//! parser is deliberately partial. Path execution is pluggable through
//! [`PathExecutor`]: the default [`FullWalker`] covers the whole subset,
//! while [`BasicWalker`] reproduces the minimal fallback.

pub mod ast;
pub mod error;
pub mod eval;
pub mod parser;
mod suggest;

pub use ast::{JsonPath, PathSegment};
pub use error::JsonPathError;
pub use eval::{BasicWalker, FullWalker, PathExecutor};
pub use parser::Parser;
pub use suggest::fuzzy_score;

use crate::config::Config;
use crate::document::node::DocValue;
use crate::parser::PathDescriptor;
use crate::query::{
    DataHistorySource, EvaluateError, QueryContext, QueryEvaluator, QueryValidation, Suggestion,
    DEFAULT_MAX_SUGGESTIONS,
};

/// JSONPath evaluator and suggestion generator.
pub struct JsonPathEvaluator {
    pub(crate) executor: Box<dyn PathExecutor>,
    pub(crate) max_suggestions: usize,
    pub(crate) enable_pipe_functions: bool,
    pub(crate) enable_filters: bool,
    pub(crate) data_history: Option<Box<dyn DataHistorySource>>,
}

impl JsonPathEvaluator {
    /// Creates an evaluator with the full path walker and default options.
    pub fn new() -> Self {
        Self {
            executor: Box::new(FullWalker),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            enable_pipe_functions: true,
            enable_filters: true,
            data_history: None,
        }
    }

    /// Creates an evaluator restricted to the minimal fallback walker.
    pub fn with_basic_walker() -> Self {
        Self {
            executor: Box::new(BasicWalker),
            ..Self::new()
        }
    }

    /// Creates an evaluator configured from engine options.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_suggestions: config.max_suggestions,
            enable_pipe_functions: config.enable_pipe_functions,
            enable_filters: config.enable_filters,
            ..Self::new()
        }
    }

    /// Injects the external data-history suggestion source used by the
    /// `compare(` context.
    pub fn set_data_history(&mut self, source: Box<dyn DataHistorySource>) {
        self.data_history = Some(source);
    }

    fn evaluate_single(
        &self,
        document: &DocValue,
        query: &str,
    ) -> Result<Vec<DocValue>, EvaluateError> {
        self.executor
            .execute(document, query)
            .map_err(|err| EvaluateError::new(self.language(), err.to_string()))
    }
}

impl Default for JsonPathEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEvaluator for JsonPathEvaluator {
    fn language(&self) -> &'static str {
        "jsonpath"
    }

    fn supported_features(&self) -> Vec<&'static str> {
        let mut features = vec!["union", "wildcards", "slices", "fuzzy-matching"];
        if self.enable_pipe_functions {
            features.push("pipe-functions");
        }
        if self.enable_filters {
            features.push("filters");
        }
        features
    }

    fn evaluate(&self, document: &DocValue, query: &str) -> Result<Vec<DocValue>, EvaluateError> {
        let query = query.trim();
        if self.supports_union() && query.contains(',') {
            let mut result_sets = Vec::new();
            for expression in self.split_union_query(query) {
                // The first failing sub-expression fails the whole union
                result_sets.push(self.evaluate_single(document, expression)?);
            }
            Ok(self.combine_union_results(result_sets))
        } else {
            self.evaluate_single(document, query)
        }
    }

    fn get_suggestions(
        &self,
        document: &DocValue,
        partial_query: &str,
        context: &QueryContext,
        _available_paths: &[PathDescriptor],
    ) -> Vec<Suggestion> {
        suggest::suggestions_for(self, document, partial_query, context)
    }

    fn root_suggestions(&self, document: &DocValue, context: &QueryContext) -> Vec<Suggestion> {
        suggest::root_suggestions(document, context)
    }

    fn validate_query(&self, query: &str) -> QueryValidation {
        match Parser::parse(query.trim()) {
            Ok(_) => QueryValidation::ok(),
            Err(err) => QueryValidation::invalid(err.to_string()),
        }
    }
}
