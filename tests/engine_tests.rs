//! Integration tests for the suggestion engine.

use queryquill::config::Config;
use queryquill::document::node::{DocNumber, DocValue};
use queryquill::engine::{EngineError, SuggestionEngine};

const BOOKSTORE: &str = r#"{
    "store": {
        "book": [
            {"author": "Nigel Rees"},
            {"author": "Evelyn Waugh"}
        ],
        "bicycle": {"color": "red"}
    }
}"#;

fn engine() -> SuggestionEngine {
    SuggestionEngine::new("json", "jsonpath", Config::default()).unwrap()
}

#[test]
fn test_construction_rejects_unknown_kinds() {
    assert!(matches!(
        SuggestionEngine::new("xml", "jsonpath", Config::default()),
        Err(EngineError::UnsupportedType { .. })
    ));
    assert!(matches!(
        SuggestionEngine::new("json", "xpath", Config::default()),
        Err(EngineError::UnsupportedType { .. })
    ));
    // Keys are matched case-insensitively
    assert!(SuggestionEngine::new("JSON", "JSONPath", Config::default()).is_ok());
}

#[test]
fn test_initialize_success_and_failure() {
    let mut engine = engine();

    assert!(!engine.is_initialized());
    assert!(engine.initialize(BOOKSTORE));
    assert!(engine.is_initialized());

    // A malformed document reports false and de-initializes, never panics
    assert!(!engine.initialize("{broken"));
    assert!(!engine.is_initialized());
    assert!(engine.get_suggestions("$.store.", None).is_empty());
}

#[test]
fn test_initialize_recomputes_path_catalog() {
    let mut engine = engine();
    engine.initialize(BOOKSTORE);
    let first_count = engine.available_paths().len();
    assert!(first_count > 0);

    engine.initialize(r#"{"only": 1}"#);
    let paths: Vec<&str> = engine
        .available_paths()
        .iter()
        .map(|d| d.path.as_str())
        .collect();
    assert_eq!(paths, vec!["$", "$.only"]);
}

/// Scenario A: suggestions for `$.store.b` include `book` and `bicycle`.
#[test]
fn test_scenario_partial_property() {
    let mut engine = engine();
    engine.initialize(BOOKSTORE);

    let suggestions = engine.get_suggestions("$.store.b", Some(9));
    let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
    assert!(texts.contains(&"book"), "got {:?}", texts);
    assert!(texts.contains(&"bicycle"), "got {:?}", texts);
}

/// Scenario B: a fuzzy subsequence match survives a longer path.
#[test]
fn test_scenario_fuzzy_author() {
    let mut engine = engine();
    engine.initialize(BOOKSTORE);

    let suggestions = engine.get_suggestions("$.store.book[0].auth", Some(21));
    let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
    assert!(texts.contains(&"author"), "got {:?}", texts);
}

/// Root-suggestion equivalence: an empty query and the explicit root call
/// produce the same suggestion texts.
#[test]
fn test_root_suggestion_equivalence() {
    let mut engine = engine();
    engine.initialize(BOOKSTORE);

    let via_query: Vec<String> = engine
        .get_suggestions("", None)
        .into_iter()
        .map(|s| s.text)
        .collect();
    let via_root: Vec<String> = engine
        .get_root_suggestions()
        .into_iter()
        .map(|s| s.text)
        .collect();
    assert_eq!(via_query, via_root);
    assert!(!via_root.is_empty());
}

/// Union awareness: the cursor selects which sub-expression is completed,
/// and the replacement range covers only that sub-expression.
#[test]
fn test_union_context_targets_active_expression() {
    let mut engine = engine();
    engine.initialize(BOOKSTORE);

    let query = "$.store.bicycle, $.store.b";
    let suggestions = engine.get_suggestions(query, Some(query.len()));
    let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
    assert!(texts.contains(&"book"), "got {:?}", texts);

    let book = suggestions.iter().find(|s| s.text == "book").unwrap();
    assert_eq!(book.replace_start, 17);
    assert_eq!(book.replace_end, query.len());
    assert_eq!(book.insert_text, "$.store.book");

    // Applying the replacement yields a well-formed union query.
    let mut replaced = String::new();
    replaced.push_str(&query[..book.replace_start]);
    replaced.push_str(&book.insert_text);
    replaced.push_str(&query[book.replace_end..]);
    assert_eq!(replaced, "$.store.bicycle, $.store.book");
}

#[test]
fn test_cursor_in_first_union_expression() {
    let mut engine = engine();
    engine.initialize(BOOKSTORE);

    // Cursor sits inside "$.store.b", before the comma
    let query = "$.store.b, $.store.bicycle";
    let suggestions = engine.get_suggestions(query, Some(9));
    let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
    assert!(texts.contains(&"book"), "got {:?}", texts);

    let book = suggestions.iter().find(|s| s.text == "book").unwrap();
    assert_eq!(book.replace_start, 0);
    assert_eq!(book.replace_end, 9);
}

#[test]
fn test_empty_sub_expression_falls_back_to_root() {
    let mut engine = engine();
    engine.initialize(BOOKSTORE);

    // Cursor after the comma, nothing typed yet in the second expression
    let query = "$.store.bicycle, ";
    let suggestions = engine.get_suggestions(query, Some(query.len()));
    let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
    assert!(texts.contains(&"store"), "got {:?}", texts);
}

#[test]
fn test_execute_and_validate_require_initialization() {
    let engine = engine();

    assert!(matches!(
        engine.execute_query("$.store"),
        Err(EngineError::NotInitialized)
    ));
    assert!(matches!(
        engine.validate_query("$.store"),
        Err(EngineError::NotInitialized)
    ));
}

#[test]
fn test_execute_query_delegates_to_evaluator() {
    let mut engine = engine();
    engine.initialize(BOOKSTORE);

    let results = engine.execute_query("$.store.bicycle.color").unwrap();
    assert_eq!(results, vec![DocValue::String("red".to_string())]);

    let validation = engine.validate_query("$..price").unwrap();
    assert!(!validation.valid);
}

/// Cache bound: after inserting more documents than the capacity, the cache
/// never exceeds it.
#[test]
fn test_cache_is_bounded_with_lru_eviction() {
    let config = Config {
        max_cache_size: 2,
        ..Config::default()
    };
    let mut engine = SuggestionEngine::new("json", "jsonpath", config).unwrap();

    for i in 0..5 {
        assert!(engine.initialize(&format!(r#"{{"doc": {}}}"#, i)));
        assert!(engine.get_info().cache_size <= 2);
    }
    assert_eq!(engine.get_info().cache_size, 2);

    // An evicted document can still be re-initialized from scratch
    assert!(engine.initialize(r#"{"doc": 0}"#));
    assert_eq!(
        engine.execute_query("$.doc").unwrap(),
        vec![DocValue::Number(DocNumber::Integer(0))]
    );
}

#[test]
fn test_reset_clears_everything() {
    let mut engine = engine();
    engine.initialize(BOOKSTORE);
    assert!(engine.is_initialized());

    engine.reset();
    assert!(!engine.is_initialized());
    assert_eq!(engine.get_info().cache_size, 0);
    assert!(engine.available_paths().is_empty());
    assert!(engine.get_suggestions("$.store.", None).is_empty());
    assert!(engine.get_root_suggestions().is_empty());
    assert!(matches!(
        engine.execute_query("$.store"),
        Err(EngineError::NotInitialized)
    ));
}

#[test]
fn test_get_info_reflects_state() {
    let mut engine = engine();

    let before = engine.get_info();
    assert!(!before.is_initialized);
    assert_eq!(before.available_paths_count, 0);
    assert_eq!(before.document_type.to_string(), "json");
    assert_eq!(before.query_language.to_string(), "jsonpath");
    assert!(before.supported_features.contains(&"union"));

    engine.initialize(BOOKSTORE);
    let after = engine.get_info();
    assert!(after.is_initialized);
    assert!(after.available_paths_count > 0);
    assert_eq!(after.cache_size, 1);
}

#[test]
fn test_yaml_document_with_yq_language() {
    let mut engine = SuggestionEngine::new("yaml", "yq", Config::default()).unwrap();
    assert!(engine.initialize(
        "spec:\n  replicas: 3\n  selector:\n    app: web\n"
    ));

    let results = engine.execute_query(".spec.replicas").unwrap();
    assert_eq!(results, vec![DocValue::Number(DocNumber::Integer(3))]);

    let suggestions = engine.get_suggestions(".spec.", None);
    let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
    assert!(texts.contains(&"replicas"), "got {:?}", texts);
    assert!(texts.contains(&"selector"), "got {:?}", texts);

    // YAML path catalogs use dotted locators
    assert!(engine
        .available_paths()
        .iter()
        .any(|d| d.path == ".spec.replicas"));
}

#[test]
fn test_suggestions_respect_configured_cap() {
    let config = Config {
        max_suggestions: 3,
        ..Config::default()
    };
    let mut engine = SuggestionEngine::new("json", "jsonpath", config).unwrap();
    engine.initialize(
        r#"{"wide": {"k1": 1, "k2": 2, "k3": 3, "k4": 4, "k5": 5, "k6": 6}}"#,
    );

    assert!(engine.get_suggestions("$.wide.", None).len() <= 3);
}
