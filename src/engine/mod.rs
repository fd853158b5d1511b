//! The suggestion engine.
//!
//! Ties a [`DocumentParser`] and a [`QueryEvaluator`] together for one
//! document-type/query-language pairing, owns the bounded document cache
//! and the current document, and parses cursor context so that suggestions
//! target the right sub-expression of a union query.

use std::num::NonZeroUsize;
use std::rc::Rc;
use std::str::FromStr;

use lru::LruCache;
use tracing::{debug, warn};

use crate::config::Config;
use crate::document::node::DocValue;
use crate::parser::{DocumentParser, JsonParser, PathDescriptor, YamlParser};
use crate::query::{
    EvaluateError, JsonPathEvaluator, QueryContext, QueryEvaluator, QueryValidation, Suggestion,
    YqEvaluator,
};

/// Supported document formats.
///
/// A closed set: adding a format means adding a variant here and a parser
/// arm in [`SuggestionEngine::new`], so unsupported combinations surface in
/// exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Json,
    Yaml,
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentType::Json => write!(f, "json"),
            DocumentType::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for DocumentType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(DocumentType::Json),
            "yaml" | "yml" => Ok(DocumentType::Yaml),
            other => Err(EngineError::UnsupportedType {
                kind: "document type",
                value: other.to_string(),
            }),
        }
    }
}

/// Supported query languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryLanguage {
    JsonPath,
    Yq,
}

impl std::fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryLanguage::JsonPath => write!(f, "jsonpath"),
            QueryLanguage::Yq => write!(f, "yq"),
        }
    }
}

impl FromStr for QueryLanguage {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonpath" => Ok(QueryLanguage::JsonPath),
            "yq" => Ok(QueryLanguage::Yq),
            other => Err(EngineError::UnsupportedType {
                kind: "query language",
                value: other.to_string(),
            }),
        }
    }
}

/// Engine-level errors.
#[derive(Debug)]
pub enum EngineError {
    /// Unknown document type or query language at construction.
    UnsupportedType { kind: &'static str, value: String },
    /// A query operation was called before a successful `initialize`.
    NotInitialized,
    /// Query evaluation failed.
    Evaluate(EvaluateError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::UnsupportedType { kind, value } => {
                write!(f, "unsupported {} '{}'", kind, value)
            }
            EngineError::NotInitialized => {
                write!(f, "engine is not initialized; call initialize() first")
            }
            EngineError::Evaluate(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Evaluate(err) => Some(err),
            _ => None,
        }
    }
}

/// Snapshot of engine state for consumers.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub document_type: DocumentType,
    pub query_language: QueryLanguage,
    pub is_initialized: bool,
    pub cache_size: usize,
    pub available_paths_count: usize,
    pub supported_features: Vec<&'static str>,
}

/// 32-bit rolling polynomial hash (`h = h*31 + char`), wrapping.
///
/// Only needs to be stable within one process; it keys the document cache.
pub fn content_hash(input: &str) -> i32 {
    let mut hash: i32 = 0;
    for ch in input.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(ch as i32);
    }
    hash
}

/// Splits cursor context out of a possibly-union query.
///
/// The active sub-expression runs from just after the last comma before the
/// cursor to the next comma at or past it, with leading whitespace skipped,
/// so replacements only ever touch the expression the cursor is in.
fn parse_context(query_input: &str, cursor_position: Option<usize>) -> QueryContext {
    let mut pos = cursor_position
        .unwrap_or(query_input.len())
        .min(query_input.len());
    while pos > 0 && !query_input.is_char_boundary(pos) {
        pos -= 1;
    }

    let expression_start = query_input[..pos].rfind(',').map(|i| i + 1).unwrap_or(0);
    let expression_end = query_input[pos..]
        .find(',')
        .map(|i| pos + i)
        .unwrap_or(query_input.len());

    let segment = &query_input[expression_start..expression_end];
    let start = expression_start + (segment.len() - segment.trim_start().len());

    QueryContext {
        full_query: query_input.to_string(),
        current_expression: query_input[start..expression_end].trim().to_string(),
        cursor_position: pos,
        expression_start: start,
        expression_end,
        before_expression: query_input[..start].to_string(),
        after_expression: query_input[expression_end..].to_string(),
        tool: None,
    }
}

/// Context-aware query suggestion and evaluation engine.
///
/// # Example
///
/// ```
/// use queryquill::config::Config;
/// use queryquill::engine::SuggestionEngine;
///
/// let mut engine = SuggestionEngine::new("json", "jsonpath", Config::default()).unwrap();
/// assert!(engine.initialize(r#"{"store": {"bicycle": {"color": "red"}}}"#));
///
/// let suggestions = engine.get_suggestions("$.store.", None);
/// assert!(suggestions.iter().any(|s| s.text == "bicycle"));
/// ```
pub struct SuggestionEngine {
    document_type: DocumentType,
    query_language: QueryLanguage,
    parser: Box<dyn DocumentParser>,
    evaluator: Box<dyn QueryEvaluator>,
    config: Config,
    cache: LruCache<i32, Rc<DocValue>>,
    current_document: Option<Rc<DocValue>>,
    available_paths: Vec<PathDescriptor>,
    is_initialized: bool,
}

impl SuggestionEngine {
    /// Creates an engine for a document-type/query-language pairing.
    ///
    /// Unknown type or language strings fail immediately: that is a caller
    /// configuration error, unlike the fail-soft runtime operations.
    pub fn new(
        document_type: &str,
        query_language: &str,
        config: Config,
    ) -> Result<Self, EngineError> {
        let document_type: DocumentType = document_type.parse()?;
        let query_language: QueryLanguage = query_language.parse()?;

        let parser: Box<dyn DocumentParser> = match document_type {
            DocumentType::Json => Box::new(JsonParser::new()),
            DocumentType::Yaml => Box::new(YamlParser::new()),
        };
        let evaluator: Box<dyn QueryEvaluator> = match query_language {
            QueryLanguage::JsonPath => Box::new(JsonPathEvaluator::from_config(&config)),
            QueryLanguage::Yq => Box::new(YqEvaluator::from_config(&config)),
        };

        let capacity = NonZeroUsize::new(config.max_cache_size.max(1))
            .expect("capacity is at least 1");

        Ok(Self {
            document_type,
            query_language,
            parser,
            evaluator,
            cache: LruCache::new(capacity),
            config,
            current_document: None,
            available_paths: Vec::new(),
            is_initialized: false,
        })
    }

    /// Parses (or fetches from cache) the content and makes it the current
    /// document, recomputing the path catalog.
    ///
    /// Never fails: parse problems are logged and reported as `false`.
    pub fn initialize(&mut self, content: &str) -> bool {
        let key = self.cache_key(content);

        let document = if let Some(cached) = self.cache.get(&key) {
            debug!(key, "document cache hit");
            Rc::clone(cached)
        } else {
            match self.parser.parse(content) {
                Ok(parsed) => {
                    let document = Rc::new(parsed);
                    self.cache.put(key, Rc::clone(&document));
                    document
                }
                Err(err) => {
                    warn!(error = %err, "failed to initialize document");
                    self.current_document = None;
                    self.available_paths.clear();
                    self.is_initialized = false;
                    return false;
                }
            }
        };

        self.available_paths = self.parser.extract_paths(&document, self.config.max_depth);
        self.current_document = Some(document);
        self.is_initialized = true;
        true
    }

    fn cache_key(&self, content: &str) -> i32 {
        content_hash(&format!(
            "{}:{}:{}",
            self.document_type, self.query_language, content
        ))
    }

    /// Suggestions for the comma-delimited sub-expression under the cursor.
    ///
    /// `cursor_position` defaults to the end of the input. Returns an empty
    /// list when no document is initialized.
    pub fn get_suggestions(
        &self,
        query_input: &str,
        cursor_position: Option<usize>,
    ) -> Vec<Suggestion> {
        let document = match (&self.current_document, self.is_initialized) {
            (Some(document), true) => document,
            _ => return Vec::new(),
        };

        let context = parse_context(query_input, cursor_position);
        if context.current_expression.is_empty() {
            return self.evaluator.root_suggestions(document, &context);
        }

        self.evaluator.get_suggestions(
            document,
            &context.current_expression,
            &context,
            &self.available_paths,
        )
    }

    /// Suggestions for an empty query.
    pub fn get_root_suggestions(&self) -> Vec<Suggestion> {
        let document = match (&self.current_document, self.is_initialized) {
            (Some(document), true) => document,
            _ => return Vec::new(),
        };
        let context = QueryContext::for_expression("");
        self.evaluator.root_suggestions(document, &context)
    }

    /// Evaluates a complete query against the current document.
    pub fn execute_query(&self, query: &str) -> Result<Vec<DocValue>, EngineError> {
        let document = self.require_document()?;
        self.evaluator
            .evaluate(document, query)
            .map_err(EngineError::Evaluate)
    }

    /// Validates query syntax against the configured language.
    pub fn validate_query(&self, query: &str) -> Result<QueryValidation, EngineError> {
        self.require_document()?;
        Ok(self.evaluator.validate_query(query))
    }

    fn require_document(&self) -> Result<&DocValue, EngineError> {
        match (&self.current_document, self.is_initialized) {
            (Some(document), true) => Ok(document),
            _ => Err(EngineError::NotInitialized),
        }
    }

    /// Drops the current document, the path catalog and the cache.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.current_document = None;
        self.available_paths.clear();
        self.is_initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// The extracted path catalog for the current document.
    pub fn available_paths(&self) -> &[PathDescriptor] {
        &self.available_paths
    }

    pub fn get_info(&self) -> EngineInfo {
        EngineInfo {
            document_type: self.document_type,
            query_language: self.query_language,
            is_initialized: self.is_initialized,
            cache_size: self.cache.len(),
            available_paths_count: self.available_paths.len(),
            supported_features: self.evaluator.supported_features(),
        }
    }
}
