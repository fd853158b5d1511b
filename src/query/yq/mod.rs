//! YQ-style dotted/piped query engine.
//!
//! A small pipeline language independent of JSONPath syntax: stages are
//! separated by `|`, and each stage is either a navigation segment or a
//! function call.
//!
//! # Supported Syntax
//!
//! - `.` - the whole document
//! - `.key` - named child access
//! - `[n]` - array index (negative indices wrap around)
//! - `[a:b]` - array slice
//! - `[]` - iterate all elements
//! - `keys`, `keys[]`, `values`, `values[]`, `length` - functions
//! - `.a.b[0] | keys` - pipelines
//!
//! Evaluation accumulates left to right: every stage maps the current
//! result set to a new result set, so navigation after `[]` broadcasts over
//! the iterated elements. `..` is a syntax error, mirroring the JSONPath
//! engine's restriction.

use tracing::debug;

use crate::document::node::{DocNumber, DocValue};
use crate::parser::{sample_value, PathDescriptor};
use crate::query::{
    process_suggestions, EvaluateError, QueryContext, QueryEvaluator, QueryValidation, Suggestion,
    SuggestionKind, DEFAULT_MAX_SUGGESTIONS,
};

/// Errors from YQ parsing or evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YqError {
    /// The query text is not valid YQ syntax.
    InvalidSyntax { message: String },
    /// The query is valid but cannot be applied to the data it met.
    InvalidOperation { message: String },
}

impl std::fmt::Display for YqError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YqError::InvalidSyntax { message } => {
                write!(f, "Invalid YQ syntax: {}", message)
            }
            YqError::InvalidOperation { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for YqError {}

/// One navigation step inside a stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `.key`
    Key(String),
    /// `[n]`, negative wraps from the end
    Index(isize),
    /// `[a:b]`
    Slice(Option<isize>, Option<isize>),
    /// `[]` - iterate all elements
    IterateAll,
}

/// A built-in function stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YqFunction {
    Keys,
    KeysIter,
    Values,
    ValuesIter,
    Length,
}

/// One pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Bare `.`
    Identity,
    Function(YqFunction),
    Navigation(Vec<Step>),
}

/// Function catalog used for pipe-position suggestions.
const YQ_FUNCTIONS: &[(&str, &str)] = &[
    ("keys", "Keys of the current value"),
    ("keys[]", "Keys, one result per key"),
    ("values", "Values of the current value"),
    ("values[]", "Values, one result per value"),
    ("length", "Number of elements, keys or characters"),
];

/// Parses a full query into pipeline stages.
pub fn parse_query(query: &str) -> Result<Vec<Stage>, YqError> {
    if query.contains("..") {
        return Err(YqError::InvalidSyntax {
            message: "recursive descent ('..') is not supported".to_string(),
        });
    }
    query.split('|').map(|stage| parse_stage(stage.trim())).collect()
}

fn parse_stage(stage: &str) -> Result<Stage, YqError> {
    if stage.is_empty() {
        return Err(YqError::InvalidSyntax {
            message: "empty pipeline stage".to_string(),
        });
    }
    if stage == "." {
        return Ok(Stage::Identity);
    }

    let function = match stage {
        "keys" => Some(YqFunction::Keys),
        "keys[]" => Some(YqFunction::KeysIter),
        "values" => Some(YqFunction::Values),
        "values[]" => Some(YqFunction::ValuesIter),
        "length" => Some(YqFunction::Length),
        _ => None,
    };
    if let Some(func) = function {
        return Ok(Stage::Function(func));
    }

    parse_navigation(stage).map(Stage::Navigation)
}

fn parse_navigation(stage: &str) -> Result<Vec<Step>, YqError> {
    let chars: Vec<char> = stage.chars().collect();
    let mut pos = 0;
    let mut steps = Vec::new();

    if !matches!(chars.first(), Some('.') | Some('[')) {
        return Err(YqError::InvalidSyntax {
            message: format!("expected '.' or '[' at start of '{}'", stage),
        });
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                pos += 1;
                // `.[...]` - the dot before a bracket is decorative
                if matches!(chars.get(pos), Some('[') | None) {
                    continue;
                }
                let start = pos;
                while pos < chars.len()
                    && (chars[pos].is_alphanumeric() || chars[pos] == '_' || chars[pos] == '-')
                {
                    pos += 1;
                }
                if pos == start {
                    return Err(YqError::InvalidSyntax {
                        message: format!("expected key name at position {}", pos),
                    });
                }
                steps.push(Step::Key(chars[start..pos].iter().collect()));
            }
            '[' => {
                pos += 1;
                if chars.get(pos) == Some(&']') {
                    pos += 1;
                    steps.push(Step::IterateAll);
                    continue;
                }
                let (step, consumed) = parse_bracket(&chars[pos..])?;
                pos += consumed;
                steps.push(step);
            }
            ch => {
                return Err(YqError::InvalidSyntax {
                    message: format!("unexpected character '{}'", ch),
                });
            }
        }
    }

    Ok(steps)
}

/// Parses the inside of a bracket (after `[`), returning the step and the
/// number of characters consumed including the closing bracket.
fn parse_bracket(chars: &[char]) -> Result<(Step, usize), YqError> {
    let mut pos = 0;

    let read_number = |pos: &mut usize| -> Result<Option<isize>, YqError> {
        let start = *pos;
        if chars.get(*pos) == Some(&'-') {
            *pos += 1;
        }
        while matches!(chars.get(*pos), Some(ch) if ch.is_ascii_digit()) {
            *pos += 1;
        }
        if *pos == start {
            return Ok(None);
        }
        let text: String = chars[start..*pos].iter().collect();
        text.parse::<isize>()
            .map(Some)
            .map_err(|_| YqError::InvalidSyntax {
                message: format!("invalid number '{}'", text),
            })
    };

    let first = read_number(&mut pos)?;

    match chars.get(pos) {
        Some(']') => {
            let idx = first.ok_or_else(|| YqError::InvalidSyntax {
                message: "expected index, slice or ']'".to_string(),
            })?;
            Ok((Step::Index(idx), pos + 1))
        }
        Some(':') => {
            pos += 1;
            let second = read_number(&mut pos)?;
            if chars.get(pos) != Some(&']') {
                return Err(YqError::InvalidSyntax {
                    message: "expected ']' after slice".to_string(),
                });
            }
            Ok((Step::Slice(first, second), pos + 1))
        }
        Some(ch) => Err(YqError::InvalidSyntax {
            message: format!("unexpected character '{}' in brackets", ch),
        }),
        None => Err(YqError::InvalidSyntax {
            message: "unterminated bracket expression".to_string(),
        }),
    }
}

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

fn apply_step(step: &Step, value: DocValue, out: &mut Vec<DocValue>) -> Result<(), YqError> {
    match step {
        Step::Key(name) => match value {
            DocValue::Object(mut props) => {
                out.push(props.shift_remove(name).unwrap_or(DocValue::Null));
            }
            DocValue::Null => out.push(DocValue::Null),
            other => {
                return Err(YqError::InvalidOperation {
                    message: format!("cannot index {} with '{}'", other.type_name(), name),
                })
            }
        },
        Step::Index(idx) => match value {
            DocValue::Array(items) => {
                let len = items.len() as isize;
                let normalized = if *idx < 0 { len + idx } else { *idx };
                if normalized >= 0 && normalized < len {
                    out.push(items.into_iter().nth(normalized as usize).unwrap_or(DocValue::Null));
                } else {
                    out.push(DocValue::Null);
                }
            }
            DocValue::Null => out.push(DocValue::Null),
            other => {
                return Err(YqError::InvalidOperation {
                    message: format!("cannot index {} with a number", other.type_name()),
                })
            }
        },
        Step::Slice(start, end) => match value {
            DocValue::Array(items) => {
                let (start_idx, end_idx) = normalize_slice(items.len(), *start, *end);
                let slice = if start_idx <= end_idx {
                    items[start_idx..end_idx].to_vec()
                } else {
                    Vec::new()
                };
                out.push(DocValue::Array(slice));
            }
            DocValue::Null => out.push(DocValue::Null),
            other => {
                return Err(YqError::InvalidOperation {
                    message: format!("cannot slice {}", other.type_name()),
                })
            }
        },
        Step::IterateAll => match value {
            DocValue::Array(items) => out.extend(items),
            DocValue::Object(props) => out.extend(props.into_values()),
            other => {
                return Err(YqError::InvalidOperation {
                    message: format!("cannot iterate over {}", other.type_name()),
                })
            }
        },
    }
    Ok(())
}

fn keys_of(value: &DocValue) -> Result<Vec<DocValue>, YqError> {
    match value {
        DocValue::Object(props) => Ok(props.keys().map(|k| DocValue::String(k.clone())).collect()),
        DocValue::Array(items) => Ok((0..items.len() as i64)
            .map(|i| DocValue::Number(DocNumber::Integer(i)))
            .collect()),
        other => Err(YqError::InvalidOperation {
            message: format!("{} has no keys", other.type_name()),
        }),
    }
}

fn apply_function(func: YqFunction, inputs: Vec<DocValue>) -> Result<Vec<DocValue>, YqError> {
    let mut out = Vec::new();
    for value in inputs {
        match func {
            YqFunction::Keys => out.push(DocValue::Array(keys_of(&value)?)),
            YqFunction::KeysIter => out.extend(keys_of(&value)?),
            YqFunction::Values => match value {
                DocValue::Object(props) => {
                    out.push(DocValue::Array(props.into_values().collect()))
                }
                DocValue::Array(items) => out.push(DocValue::Array(items)),
                other => {
                    return Err(YqError::InvalidOperation {
                        message: format!("{} has no values", other.type_name()),
                    })
                }
            },
            YqFunction::ValuesIter => match value {
                DocValue::Object(props) => out.extend(props.into_values()),
                DocValue::Array(items) => out.extend(items),
                other => {
                    return Err(YqError::InvalidOperation {
                        message: format!("{} has no values", other.type_name()),
                    })
                }
            },
            YqFunction::Length => {
                let length = match &value {
                    DocValue::Null => 0,
                    DocValue::String(s) => s.chars().count() as i64,
                    DocValue::Array(items) => items.len() as i64,
                    DocValue::Object(props) => props.len() as i64,
                    other => {
                        return Err(YqError::InvalidOperation {
                            message: format!("{} has no length", other.type_name()),
                        })
                    }
                };
                out.push(DocValue::Number(DocNumber::Integer(length)));
            }
        }
    }
    Ok(out)
}

/// Runs a parsed pipeline against a document.
pub fn run_pipeline(stages: &[Stage], document: &DocValue) -> Result<Vec<DocValue>, YqError> {
    let mut current = vec![document.clone()];
    for stage in stages {
        current = match stage {
            Stage::Identity => current,
            Stage::Function(func) => apply_function(*func, current)?,
            Stage::Navigation(steps) => {
                let mut next = Vec::new();
                for value in current {
                    let mut stage_out = vec![value];
                    for step in steps {
                        let mut stepped = Vec::new();
                        for item in stage_out {
                            apply_step(step, item, &mut stepped)?;
                        }
                        stage_out = stepped;
                    }
                    next.extend(stage_out);
                }
                next
            }
        };
    }
    Ok(current)
}

/// YQ evaluator and suggestion generator.
pub struct YqEvaluator {
    max_suggestions: usize,
}

impl YqEvaluator {
    pub fn new() -> Self {
        Self {
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            max_suggestions: config.max_suggestions,
        }
    }

    fn evaluate_single(
        &self,
        document: &DocValue,
        query: &str,
    ) -> Result<Vec<DocValue>, EvaluateError> {
        let stages =
            parse_query(query).map_err(|err| EvaluateError::new(self.language(), err.to_string()))?;
        run_pipeline(&stages, document)
            .map_err(|err| EvaluateError::new(self.language(), err.to_string()))
    }

    fn classify(
        &self,
        document: &DocValue,
        expression: &str,
        context: &QueryContext,
    ) -> Result<Vec<Suggestion>, YqError> {
        let expr = expression.trim();

        if expr.is_empty() || expr == "." {
            return Ok(self.root_suggestions_impl(document, context));
        }

        // Function names after the last '|'.
        if let Some(pipe_idx) = expr.rfind('|') {
            let partial = expr[pipe_idx + 1..].trim();
            let base = expr[..pipe_idx].trim_end();
            let suggestions = YQ_FUNCTIONS
                .iter()
                .map(|(name, description)| {
                    Suggestion::new(
                        *name,
                        format!("| {}", name),
                        SuggestionKind::PipeFunction,
                        *description,
                        format!("{} | {}", base, name),
                        context,
                    )
                })
                .collect();
            return Ok(process_suggestions(suggestions, partial, self.max_suggestions));
        }

        // Trailing dot: children of the path before it.
        if let Some(base) = expr.strip_suffix('.') {
            let base_query = if base.is_empty() { "." } else { base };
            let results =
                run_pipeline(&parse_query(base_query)?, document)?;
            return Ok(self.navigation_suggestions(&results, expr, base_query, context, ""));
        }

        // Partial key after the last dot.
        if let Some(dot_idx) = expr.rfind('.') {
            let partial = &expr[dot_idx + 1..];
            if !partial.is_empty()
                && partial
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
            {
                let parent = &expr[..dot_idx];
                let parent_query = if parent.is_empty() { "." } else { parent };
                let results = run_pipeline(&parse_query(parent_query)?, document)?;
                let with_dot = format!("{}.", parent);
                return Ok(self.navigation_suggestions(
                    &results,
                    &with_dot,
                    parent_query,
                    context,
                    partial,
                ));
            }
        }

        Ok(Vec::new())
    }

    /// Key or element completions for the first value of a result set.
    fn navigation_suggestions(
        &self,
        results: &[DocValue],
        prefix: &str,
        base_query: &str,
        context: &QueryContext,
        partial: &str,
    ) -> Vec<Suggestion> {
        let first = match results.first() {
            Some(value) => value,
            None => return Vec::new(),
        };

        let suggestions = match first {
            DocValue::Object(props) => props
                .iter()
                .map(|(key, value)| {
                    Suggestion::new(
                        key.as_str(),
                        format!(".{}", key),
                        SuggestionKind::Property,
                        value.type_name(),
                        format!("{}{}", prefix, key),
                        context,
                    )
                    .with_sample(sample_value(value))
                })
                .collect(),
            DocValue::Array(_) => {
                let base = base_query.trim_end_matches('.');
                [
                    ("[0]", SuggestionKind::ArrayAccess, "First element"),
                    ("[-1]", SuggestionKind::ArrayAccess, "Last element"),
                    ("[]", SuggestionKind::Wildcard, "Iterate all elements"),
                ]
                .iter()
                .map(|(access, kind, description)| {
                    Suggestion::new(
                        *access,
                        *access,
                        *kind,
                        *description,
                        format!("{}{}", base, access),
                        context,
                    )
                })
                .collect()
            }
            _ => Vec::new(),
        };

        process_suggestions(suggestions, partial, self.max_suggestions)
    }

    fn root_suggestions_impl(
        &self,
        document: &DocValue,
        context: &QueryContext,
    ) -> Vec<Suggestion> {
        match document {
            DocValue::Object(props) => {
                let mut out = vec![Suggestion::new(
                    ".",
                    ".",
                    SuggestionKind::Property,
                    "Whole document",
                    ".",
                    context,
                )];
                out.extend(props.iter().map(|(key, value)| {
                    let insert = format!(".{}", key);
                    Suggestion::new(
                        key.as_str(),
                        insert.clone(),
                        SuggestionKind::Property,
                        value.type_name(),
                        insert,
                        context,
                    )
                    .with_sample(sample_value(value))
                }));
                out
            }
            DocValue::Array(items) => {
                let mut out = vec![
                    Suggestion::new(
                        ".[0]",
                        ".[0]",
                        SuggestionKind::ArrayAccess,
                        "First element",
                        ".[0]",
                        context,
                    )
                    .with_sample(items.first().and_then(sample_value)),
                    Suggestion::new(
                        ".[]",
                        ".[]",
                        SuggestionKind::Wildcard,
                        "Iterate all elements",
                        ".[]",
                        context,
                    ),
                ];
                if !items.is_empty() {
                    out.push(Suggestion::new(
                        ".[-1]",
                        ".[-1]",
                        SuggestionKind::ArrayAccess,
                        "Last element",
                        ".[-1]",
                        context,
                    ));
                }
                out
            }
            _ => Vec::new(),
        }
    }
}

impl Default for YqEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEvaluator for YqEvaluator {
    fn language(&self) -> &'static str {
        "yq"
    }

    fn supported_features(&self) -> Vec<&'static str> {
        vec!["union", "pipes", "slices", "iteration"]
    }

    fn evaluate(&self, document: &DocValue, query: &str) -> Result<Vec<DocValue>, EvaluateError> {
        let query = query.trim();
        if self.supports_union() && query.contains(',') {
            let mut result_sets = Vec::new();
            for expression in self.split_union_query(query) {
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
        match self.classify(document, partial_query, context) {
            Ok(suggestions) => suggestions,
            Err(err) => {
                debug!(query = partial_query, error = %err, "suggestion generation failed");
                Vec::new()
            }
        }
    }

    fn root_suggestions(&self, document: &DocValue, context: &QueryContext) -> Vec<Suggestion> {
        self.root_suggestions_impl(document, context)
    }

    fn validate_query(&self, query: &str) -> QueryValidation {
        match parse_query(query.trim()) {
            Ok(_) => QueryValidation::ok(),
            Err(err) => QueryValidation::invalid(err.to_string()),
        }
    }
}
