//! Integration tests for the YQ-style query engine.

use queryquill::document::node::{DocNumber, DocValue};
use queryquill::parser::{DocumentParser, JsonParser, YamlParser};
use queryquill::query::{QueryContext, QueryEvaluator, YqEvaluator};

fn bookstore() -> DocValue {
    JsonParser::new()
        .parse(
            r#"{
                "store": {
                    "book": [
                        {"title": "Sayings of the Century", "price": 8.95},
                        {"title": "Sword of Honour", "price": 12.99},
                        {"title": "Moby Dick", "price": 8.99},
                        {"title": "The Lord of the Rings", "price": 22.99}
                    ],
                    "bicycle": {"color": "red"}
                }
            }"#,
        )
        .unwrap()
}

#[test]
fn test_identity_returns_whole_document() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    let results = eval.evaluate(&doc, ".").unwrap();
    assert_eq!(results, vec![doc]);
}

#[test]
fn test_dotted_navigation() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    let results = eval.evaluate(&doc, ".store.bicycle.color").unwrap();
    assert_eq!(results, vec![DocValue::String("red".to_string())]);
}

/// Scenario: negative indices wrap around from the end.
#[test]
fn test_negative_index_wraps() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    let results = eval.evaluate(&doc, ".store.book[-1].title").unwrap();
    assert_eq!(
        results,
        vec![DocValue::String("The Lord of the Rings".to_string())]
    );
}

/// Scenario: a double dot is a syntax error, not an empty result.
#[test]
fn test_double_dot_is_a_syntax_error() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    let err = eval.evaluate(&doc, ".store.book[0]..title").unwrap_err();
    assert_eq!(err.language, "yq");
    assert!(err.message.contains("recursive descent"));
}

#[test]
fn test_iterate_broadcasts_following_navigation() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    let results = eval.evaluate(&doc, ".store.book[].title").unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(
        results[0],
        DocValue::String("Sayings of the Century".to_string())
    );
}

#[test]
fn test_slice_produces_sub_array() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    let results = eval.evaluate(&doc, ".store.book[1:3]").unwrap();
    assert_eq!(results.len(), 1);
    match &results[0] {
        DocValue::Array(items) => assert_eq!(items.len(), 2),
        other => panic!("expected array, got {:?}", other),
    }
}

#[test]
fn test_missing_key_and_out_of_range_index_yield_null() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    assert_eq!(
        eval.evaluate(&doc, ".store.magazine").unwrap(),
        vec![DocValue::Null]
    );
    assert_eq!(
        eval.evaluate(&doc, ".store.book[99]").unwrap(),
        vec![DocValue::Null]
    );
}

#[test]
fn test_navigation_on_scalar_is_an_error() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    assert!(eval.evaluate(&doc, ".store.bicycle.color.inner").is_err());
    assert!(eval.evaluate(&doc, ".store.bicycle.color[]").is_err());
}

#[test]
fn test_keys_and_values_functions() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    let keys = eval.evaluate(&doc, ".store | keys").unwrap();
    assert_eq!(
        keys,
        vec![DocValue::Array(vec![
            DocValue::String("book".to_string()),
            DocValue::String("bicycle".to_string()),
        ])]
    );

    let each_key = eval.evaluate(&doc, ".store | keys[]").unwrap();
    assert_eq!(each_key.len(), 2);

    let values = eval.evaluate(&doc, ".store.bicycle | values[]").unwrap();
    assert_eq!(values, vec![DocValue::String("red".to_string())]);
}

#[test]
fn test_keys_of_array_are_indices() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    let keys = eval.evaluate(&doc, ".store.book | keys").unwrap();
    assert_eq!(
        keys,
        vec![DocValue::Array(vec![
            DocValue::Number(DocNumber::Integer(0)),
            DocValue::Number(DocNumber::Integer(1)),
            DocValue::Number(DocNumber::Integer(2)),
            DocValue::Number(DocNumber::Integer(3)),
        ])]
    );
}

#[test]
fn test_length_function() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    assert_eq!(
        eval.evaluate(&doc, ".store.book | length").unwrap(),
        vec![DocValue::Number(DocNumber::Integer(4))]
    );
    assert_eq!(
        eval.evaluate(&doc, ".store.bicycle.color | length").unwrap(),
        vec![DocValue::Number(DocNumber::Integer(3))]
    );
    // Numbers have no length here
    assert!(eval.evaluate(&doc, ".store.book[0].price | length").is_err());
}

#[test]
fn test_union_queries() {
    let doc = JsonParser::new().parse(r#"{"a": 1, "b": 2}"#).unwrap();
    let eval = YqEvaluator::new();

    let results = eval.evaluate(&doc, ".a, .b").unwrap();
    assert_eq!(
        results,
        vec![
            DocValue::Number(DocNumber::Integer(1)),
            DocValue::Number(DocNumber::Integer(2)),
        ]
    );
}

#[test]
fn test_works_against_yaml_documents() {
    let doc = YamlParser::new()
        .parse("spec:\n  replicas: 3\n  containers:\n    - name: app\n    - name: sidecar\n")
        .unwrap();
    let eval = YqEvaluator::new();

    assert_eq!(
        eval.evaluate(&doc, ".spec.replicas").unwrap(),
        vec![DocValue::Number(DocNumber::Integer(3))]
    );
    assert_eq!(
        eval.evaluate(&doc, ".spec.containers[].name").unwrap(),
        vec![
            DocValue::String("app".to_string()),
            DocValue::String("sidecar".to_string()),
        ]
    );
}

#[test]
fn test_validate_query() {
    let eval = YqEvaluator::new();

    assert!(eval.validate_query(".store.book[0]").valid);
    assert!(eval.validate_query(". | keys").valid);
    assert!(!eval.validate_query(".a..b").valid);
    assert!(!eval.validate_query("store").valid);
    assert!(!eval.validate_query(".a | | keys").valid);
}

#[test]
fn test_suggestions_after_trailing_dot() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    let expr = ".store.";
    let context = QueryContext::for_expression(expr);
    let suggestions = eval.get_suggestions(&doc, expr, &context, &[]);
    let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();

    assert!(texts.contains(&"book"));
    assert!(texts.contains(&"bicycle"));

    let book = suggestions.iter().find(|s| s.text == "book").unwrap();
    assert_eq!(book.insert_text, ".store.book");
}

#[test]
fn test_suggestions_filter_partial_key() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    let expr = ".store.bo";
    let context = QueryContext::for_expression(expr);
    let suggestions = eval.get_suggestions(&doc, expr, &context, &[]);
    let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();

    assert!(texts.contains(&"book"));
    assert!(!texts.contains(&"bicycle"));
}

#[test]
fn test_suggestions_for_pipe_position() {
    let doc = bookstore();
    let eval = YqEvaluator::new();

    let expr = ".store.book | k";
    let context = QueryContext::for_expression(expr);
    let suggestions = eval.get_suggestions(&doc, expr, &context, &[]);
    let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();

    assert!(texts.contains(&"keys"));
    assert!(texts.contains(&"keys[]"));

    let keys = suggestions.iter().find(|s| s.text == "keys").unwrap();
    assert_eq!(keys.insert_text, ".store.book | keys");
}

#[test]
fn test_root_suggestions_for_array_document() {
    let doc = JsonParser::new().parse(r#"[1, 2, 3]"#).unwrap();
    let eval = YqEvaluator::new();

    let context = QueryContext::for_expression("");
    let suggestions = eval.root_suggestions(&doc, &context);
    let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();

    assert!(texts.contains(&".[0]"));
    assert!(texts.contains(&".[]"));
    assert!(texts.contains(&".[-1]"));
}
