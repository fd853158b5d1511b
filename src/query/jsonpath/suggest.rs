//! Context classification and suggestion generation for partial JSONPath
//! input.
//!
//! The entry point classifies the partial expression into one of eight
//! priority-ordered contexts (root, data-history compare, select-key, pipe
//! function, trailing dot, trailing bracket, partial property name, filter)
//! and produces suggestions for the first context that matches. Every path
//! through here is fail-soft: an internal error is logged and an empty list
//! returned, because suggestions must never take down an input field.

use tracing::debug;

use super::error::JsonPathError;
use super::JsonPathEvaluator;
use crate::document::node::DocValue;
use crate::parser::sample_value;
use crate::query::pipes::PIPE_FUNCTIONS;
use crate::query::{process_suggestions, QueryContext, Suggestion, SuggestionKind};

/// Fuzzy scores at or below this are discarded.
const FUZZY_SCORE_CUTOFF: f64 = 30.0;

/// Generic filter templates offered when the user has typed `?`.
const FILTER_TEMPLATES: &[(&str, &str)] = &[
    ("?(@.property)", "Entries where a property exists"),
    ("?(@.length > 0)", "Non-empty entries"),
    ("?(@.property == 'value')", "Entries with a matching string"),
];

pub(super) fn suggestions_for(
    ev: &JsonPathEvaluator,
    document: &DocValue,
    expression: &str,
    context: &QueryContext,
) -> Vec<Suggestion> {
    match classify(ev, document, expression, context) {
        Ok(suggestions) => suggestions,
        Err(err) => {
            debug!(query = expression, error = %err, "suggestion generation failed");
            Vec::new()
        }
    }
}

/// Priority-ordered context classification.
fn classify(
    ev: &JsonPathEvaluator,
    document: &DocValue,
    expression: &str,
    context: &QueryContext,
) -> Result<Vec<Suggestion>, JsonPathError> {
    let expr = expression.trim();

    // 1. Nothing typed yet, or just the root selector.
    if expr.is_empty() || expr == "$" {
        return Ok(root_suggestions(document, context));
    }

    // 2. compare() completions come from the injected data-history source.
    if expr.contains("compare(") {
        return Ok(ev
            .data_history
            .as_ref()
            .map(|source| source.suggestions(context.tool.as_deref(), expr, context))
            .unwrap_or_default());
    }

    // 3. select() completes object keys from the data before the call.
    if let Some(select_idx) = expr.find("select(") {
        return select_suggestions(ev, document, expr, select_idx, context);
    }

    // 4. Pipe-function names after the last '|'.
    if ev.enable_pipe_functions {
        if let Some(pipe_idx) = expr.rfind('|') {
            return pipe_suggestions(ev, document, expr, pipe_idx, context);
        }
    }

    // 5. Trailing dot: children of the path before it.
    if let Some(base) = expr.strip_suffix('.') {
        return child_suggestions(ev, document, expr, base, context);
    }

    // 6. Trailing bracket: index, slice and sampled filter completions.
    if let Some(base) = expr.strip_suffix('[') {
        return bracket_suggestions(ev, document, expr, base, context);
    }

    // 7. Partial property name: fuzzy match against sibling keys.
    if let Some(dot_idx) = expr.rfind('.') {
        let partial = &expr[dot_idx + 1..];
        if !partial.is_empty()
            && partial
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return fuzzy_suggestions(ev, document, &expr[..dot_idx], partial, context);
        }
    }

    // 8. Filter templates.
    if ev.enable_filters && expr.contains('?') {
        return Ok(filter_template_suggestions(expr, context, ev.max_suggestions));
    }

    Ok(Vec::new())
}

/// Suggestions for an empty query or a bare `$`.
pub(super) fn root_suggestions(document: &DocValue, context: &QueryContext) -> Vec<Suggestion> {
    match document {
        DocValue::Object(props) => {
            let mut out: Vec<Suggestion> = props
                .iter()
                .map(|(key, value)| {
                    let insert = format!("$.{}", key);
                    Suggestion::new(
                        key.as_str(),
                        insert.clone(),
                        SuggestionKind::Property,
                        value.type_name(),
                        insert,
                        context,
                    )
                    .with_sample(sample_value(value))
                })
                .collect();
            // Full engines support recursive descent even though the custom
            // parser rejects it.
            out.push(Suggestion::new(
                "$..*",
                "$..*",
                SuggestionKind::RecursiveDescent,
                "All values (recursive descent)",
                "$..*",
                context,
            ));
            out
        }
        DocValue::Array(items) => {
            let mut out = vec![
                Suggestion::new(
                    "$[0]",
                    "$[0]",
                    SuggestionKind::ArrayAccess,
                    "First element",
                    "$[0]",
                    context,
                )
                .with_sample(items.first().and_then(sample_value)),
                Suggestion::new(
                    "$[*]",
                    "$[*]",
                    SuggestionKind::Wildcard,
                    "All elements",
                    "$[*]",
                    context,
                ),
                Suggestion::new(
                    "$[(@.length-1)]",
                    "$[(@.length-1)]",
                    SuggestionKind::ArrayAccess,
                    "Last element",
                    "$[(@.length-1)]",
                    context,
                ),
            ];
            if items.len() > 1 {
                out.push(Suggestion::new(
                    "$[1]",
                    "$[1]",
                    SuggestionKind::ArrayAccess,
                    "Second element",
                    "$[1]",
                    context,
                ));
            }
            out
        }
        _ => Vec::new(),
    }
}

/// Object keys reachable through the sub-path before `select(`.
fn select_suggestions(
    ev: &JsonPathEvaluator,
    document: &DocValue,
    expr: &str,
    select_idx: usize,
    context: &QueryContext,
) -> Result<Vec<Suggestion>, JsonPathError> {
    let after = &expr[select_idx + "select(".len()..];
    let partial = after.trim_start_matches(|c: char| {
        c == '@' || c == '.' || c == '(' || c == '\'' || c == '"' || c.is_whitespace()
    });
    let partial_offset = expr.len() - partial.len();

    let mut base = expr[..select_idx].trim_end();
    base = base.strip_suffix('|').map(str::trim_end).unwrap_or(base);
    let base_query = if base.is_empty() { "$" } else { base };

    let results = ev.executor.execute(document, base_query)?;
    let suggestions = candidate_keys(&results)
        .into_iter()
        .map(|(key, type_name, sample)| {
            let insert = format!("{}{}", &expr[..partial_offset], key);
            Suggestion::new(key.clone(), key, SuggestionKind::Property, type_name, insert, context)
                .with_sample(sample)
        })
        .collect();

    Ok(process_suggestions(suggestions, partial, ev.max_suggestions))
}

/// Keys of the first object found in a result set, looking one level into
/// arrays of objects.
fn candidate_keys(results: &[DocValue]) -> Vec<(String, &'static str, Option<String>)> {
    let first_object = match results.first() {
        Some(DocValue::Object(_)) => results.first(),
        Some(DocValue::Array(items)) => items.iter().find(|item| item.is_object()),
        _ => None,
    };
    match first_object {
        Some(DocValue::Object(props)) => props
            .iter()
            .map(|(key, value)| (key.clone(), value.type_name(), sample_value(value)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Pipe-function names after the last `|`, narrowed by applicability.
fn pipe_suggestions(
    ev: &JsonPathEvaluator,
    document: &DocValue,
    expr: &str,
    pipe_idx: usize,
    context: &QueryContext,
) -> Result<Vec<Suggestion>, JsonPathError> {
    let partial = expr[pipe_idx + 1..].trim();
    let base = expr[..pipe_idx].trim_end();

    // Narrow the catalog by what the path actually produces; on any
    // evaluation hiccup every function stays eligible.
    let path_part = expr.split('|').next().unwrap_or("").trim();
    let piped_value = if path_part.is_empty() {
        None
    } else {
        ev.executor
            .execute(document, path_part)
            .ok()
            .and_then(|mut results| match results.len() {
                0 => None,
                1 => results.pop(),
                _ => Some(DocValue::Array(results)),
            })
    };

    let suggestions = PIPE_FUNCTIONS
        .iter()
        .filter(|spec| {
            piped_value
                .as_ref()
                .map_or(true, |value| (spec.applies)(value))
        })
        .map(|spec| {
            Suggestion::new(
                spec.name,
                format!("| {}", spec.name),
                SuggestionKind::PipeFunction,
                spec.description,
                format!("{} | {}", base, spec.name),
                context,
            )
        })
        .collect();

    Ok(process_suggestions(suggestions, partial, ev.max_suggestions))
}

/// Children of the path before a trailing dot.
fn child_suggestions(
    ev: &JsonPathEvaluator,
    document: &DocValue,
    expr: &str,
    base: &str,
    context: &QueryContext,
) -> Result<Vec<Suggestion>, JsonPathError> {
    if base.trim().is_empty() {
        return Ok(Vec::new());
    }

    let results = ev.executor.execute(document, base.trim_end())?;
    let first = match results.first() {
        Some(value) => value,
        None => return Ok(Vec::new()),
    };

    let suggestions = match first {
        DocValue::Object(props) => props
            .iter()
            .map(|(key, value)| {
                Suggestion::new(
                    key.as_str(),
                    key.as_str(),
                    SuggestionKind::Property,
                    value.type_name(),
                    format!("{}{}", expr, key),
                    context,
                )
                .with_sample(sample_value(value))
            })
            .collect(),
        DocValue::Array(_) => {
            // A dot cannot index an array; propose bracket access instead.
            ["[0]", "[*]", "[(@.length-1)]"]
                .iter()
                .zip(["First element", "All elements", "Last element"])
                .map(|(access, description)| {
                    let kind = if *access == "[*]" {
                        SuggestionKind::Wildcard
                    } else {
                        SuggestionKind::ArrayAccess
                    };
                    Suggestion::new(
                        *access,
                        *access,
                        kind,
                        description,
                        format!("{}{}", base.trim_end(), access),
                        context,
                    )
                })
                .collect()
        }
        _ => Vec::new(),
    };

    Ok(process_suggestions(suggestions, "", ev.max_suggestions))
}

/// Index, wildcard, slice and sampled filter completions after `[`.
fn bracket_suggestions(
    ev: &JsonPathEvaluator,
    document: &DocValue,
    expr: &str,
    base: &str,
    context: &QueryContext,
) -> Result<Vec<Suggestion>, JsonPathError> {
    if base.trim().is_empty() {
        return Ok(Vec::new());
    }

    let results = ev.executor.execute(document, base.trim_end())?;
    let items = match results.first() {
        Some(DocValue::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };

    let mut out = Vec::new();
    let accesses: &[(&str, SuggestionKind, &str)] = &[
        ("0", SuggestionKind::ArrayAccess, "First element"),
        ("*", SuggestionKind::Wildcard, "All elements"),
        ("(@.length-1)", SuggestionKind::ArrayAccess, "Last element"),
    ];
    for (access, kind, description) in accesses {
        out.push(Suggestion::new(
            *access,
            format!("[{}]", access),
            *kind,
            *description,
            format!("{}{}]", expr, access),
            context,
        ));
    }

    if items.len() > 2 {
        for slice in ["0:2", "1:", ":3"] {
            out.push(Suggestion::new(
                slice,
                format!("[{}]", slice),
                SuggestionKind::Slice,
                "Slice",
                format!("{}{}]", expr, slice),
                context,
            ));
        }
    }

    // Filters sampled from the first element's own keys and values.
    if let Some(DocValue::Object(props)) = items.first() {
        for (key, value) in props {
            let existence = format!("?(@.{})", key);
            let insert = format!("{}{}]", expr, existence);
            out.push(Suggestion::new(
                existence.clone(),
                existence,
                SuggestionKind::Filter,
                format!("Entries with {}", key),
                insert,
                context,
            ));

            let comparison = match value {
                DocValue::String(s) => Some(format!("?(@.{} == '{}')", key, s)),
                DocValue::Number(n) => Some(format!("?(@.{} > {})", key, n)),
                _ => None,
            };
            if let Some(filter) = comparison {
                let insert = format!("{}{}]", expr, filter);
                out.push(Suggestion::new(
                    filter.clone(),
                    filter,
                    SuggestionKind::Filter,
                    format!("Compare {}", key),
                    insert,
                    context,
                ));
            }
        }
    }

    Ok(process_suggestions(out, "", ev.max_suggestions))
}

/// Fuzzy matching of a partial property name against sibling keys.
fn fuzzy_suggestions(
    ev: &JsonPathEvaluator,
    document: &DocValue,
    parent: &str,
    partial: &str,
    context: &QueryContext,
) -> Result<Vec<Suggestion>, JsonPathError> {
    if parent.trim().is_empty() {
        return Ok(Vec::new());
    }

    let results = ev.executor.execute(document, parent.trim_end())?;
    let props = match results.first() {
        Some(DocValue::Object(props)) => props,
        _ => return Ok(Vec::new()),
    };

    let mut scored: Vec<(f64, Suggestion)> = props
        .iter()
        .filter_map(|(key, value)| {
            let score = fuzzy_score(partial, key);
            if score <= FUZZY_SCORE_CUTOFF {
                return None;
            }
            let suggestion = Suggestion::new(
                key.as_str(),
                key.as_str(),
                SuggestionKind::Property,
                value.type_name(),
                format!("{}.{}", parent, key),
                context,
            )
            .with_sample(sample_value(value));
            Some((score, suggestion))
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    Ok(scored
        .into_iter()
        .take(ev.max_suggestions)
        .map(|(_, suggestion)| suggestion)
        .collect())
}

fn filter_template_suggestions(
    expr: &str,
    context: &QueryContext,
    max_suggestions: usize,
) -> Vec<Suggestion> {
    let question_idx = match expr.rfind('?') {
        Some(idx) => idx,
        None => return Vec::new(),
    };
    let base = &expr[..question_idx];

    FILTER_TEMPLATES
        .iter()
        .map(|(template, description)| {
            Suggestion::new(
                *template,
                *template,
                SuggestionKind::Filter,
                *description,
                format!("{}{}]", base, template),
                context,
            )
        })
        .take(max_suggestions)
        .collect()
}

/// Scores a candidate key against partially-typed input.
///
/// Exact match (case-insensitive) scores 100 and a proper prefix match 90.
/// Otherwise the candidate is scanned left to right: each character that
/// matches the next unconsumed input character earns the candidate length
/// minus the distance between the two cursors, and the accumulated sum is
/// normalized over both lengths and scaled to 80. Input that is not a
/// subsequence of the candidate scores 0, so scores stay within [0, 100].
pub fn fuzzy_score(input: &str, target: &str) -> f64 {
    let input_chars: Vec<char> = input.to_lowercase().chars().collect();
    let target_chars: Vec<char> = target.to_lowercase().chars().collect();

    if input_chars.is_empty() || target_chars.is_empty() {
        return 0.0;
    }
    if input_chars == target_chars {
        return 100.0;
    }
    if input_chars.len() < target_chars.len()
        && target_chars[..input_chars.len()] == input_chars[..]
    {
        return 90.0;
    }

    let target_len = target_chars.len() as f64;
    let mut accumulated = 0.0;
    let mut input_idx = 0usize;

    for (i, ch) in target_chars.iter().enumerate() {
        if input_idx < input_chars.len() && *ch == input_chars[input_idx] {
            accumulated += target_len - (i as f64 - input_idx as f64).abs();
            input_idx += 1;
        }
    }

    if input_idx == input_chars.len() {
        (accumulated / (target_len * input_chars.len() as f64)) * 80.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_exact_match_scores_100() {
        assert_eq!(fuzzy_score("author", "author"), 100.0);
        assert_eq!(fuzzy_score("AUTHOR", "author"), 100.0);
    }

    #[test]
    fn test_fuzzy_prefix_scores_90() {
        assert_eq!(fuzzy_score("auth", "author"), 90.0);
        assert_eq!(fuzzy_score("b", "bicycle"), 90.0);
    }

    #[test]
    fn test_fuzzy_subsequence_scores_between_cutoff_and_prefix() {
        let score = fuzzy_score("athr", "author");
        assert!(score > 30.0, "score was {}", score);
        assert!(score < 90.0, "score was {}", score);
    }

    #[test]
    fn test_fuzzy_non_subsequence_scores_0() {
        assert_eq!(fuzzy_score("xyz", "author"), 0.0);
        assert_eq!(fuzzy_score("authors", "author"), 0.0);
    }

    #[test]
    fn test_fuzzy_scores_bounded() {
        let pairs = [
            ("a", "a"),
            ("a", "abc"),
            ("ac", "abc"),
            ("abd", "abcd"),
            ("price", "priceRange"),
            ("zz", "bazz"),
            ("", "anything"),
            ("anything", ""),
        ];
        for (input, target) in pairs {
            let score = fuzzy_score(input, target);
            assert!(
                (0.0..=100.0).contains(&score),
                "score({:?}, {:?}) = {} out of bounds",
                input,
                target,
                score
            );
        }
    }

    #[test]
    fn test_fuzzy_100_only_for_equal_inputs() {
        assert!(fuzzy_score("autho", "author") < 100.0);
        assert!(fuzzy_score("author", "autho") < 100.0);
    }
}
