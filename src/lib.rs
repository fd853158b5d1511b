//! QueryQuill - context-aware path query suggestions and evaluation.
//!
//! QueryQuill evaluates path-query expressions (a JSONPath subset and a
//! YQ-style dotted/piped language) against parsed JSON or YAML documents,
//! and produces ranked, context-aware completion suggestions for partial
//! expressions on every keystroke.
//!
//! The pieces compose bottom-up:
//!
//! - [`document`] - the parsed tree every format maps onto
//! - [`parser`] - the [`parser::DocumentParser`] contract plus the JSON and
//!   YAML implementations and path-catalog extraction
//! - [`query`] - the [`query::QueryEvaluator`] contract, the shared
//!   suggestion ranking pipeline, and the JSONPath and YQ engines
//! - [`engine`] - the [`engine::SuggestionEngine`] orchestrator: document
//!   caching, union-query cursor context, delegation
//! - [`config`] - engine options, loadable from TOML
//!
//! # Example
//!
//! ```
//! use queryquill::config::Config;
//! use queryquill::engine::SuggestionEngine;
//!
//! let mut engine = SuggestionEngine::new("json", "jsonpath", Config::default()).unwrap();
//! engine.initialize(r#"{"store": {"book": [{"title": "Sayings of the Century"}]}}"#);
//!
//! let results = engine.execute_query("$.store.book[0].title").unwrap();
//! assert_eq!(results.len(), 1);
//! ```

pub mod config;
pub mod document;
pub mod engine;
pub mod parser;
pub mod query;
