//! Declarative catalog of pipe-function names.
//!
//! The suggestion engine only proposes names from this table; executing a
//! resolved pipeline is the consuming tool's job, through its own function
//! registry. Each entry carries an applicability predicate so suggestions
//! can be narrowed to functions that make sense for the data at hand.

use crate::document::node::DocValue;

/// One suggestible pipe function.
pub struct PipeFunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Whether the function applies to the given piped-in value.
    pub applies: fn(&DocValue) -> bool,
}

fn any(_: &DocValue) -> bool {
    true
}

fn arrays(value: &DocValue) -> bool {
    value.is_array()
}

fn containers(value: &DocValue) -> bool {
    value.is_container()
}

fn objects(value: &DocValue) -> bool {
    value.is_object()
}

/// The fixed suggestion catalog.
pub const PIPE_FUNCTIONS: &[PipeFunctionSpec] = &[
    PipeFunctionSpec {
        name: "list",
        description: "Render results as a list",
        applies: any,
    },
    PipeFunctionSpec {
        name: "filter",
        description: "Keep results matching a condition",
        applies: any,
    },
    PipeFunctionSpec {
        name: "compare",
        description: "Compare results against recorded data",
        applies: any,
    },
    PipeFunctionSpec {
        name: "select",
        description: "Select entries by key condition",
        applies: containers,
    },
    PipeFunctionSpec {
        name: "uniq",
        description: "Drop duplicate values",
        applies: arrays,
    },
    PipeFunctionSpec {
        name: "count",
        description: "Count results",
        applies: any,
    },
    PipeFunctionSpec {
        name: "flatten",
        description: "Flatten nested arrays",
        applies: arrays,
    },
    PipeFunctionSpec {
        name: "keys",
        description: "Keys of each object",
        applies: objects,
    },
    PipeFunctionSpec {
        name: "values",
        description: "Values of each object",
        applies: objects,
    },
    PipeFunctionSpec {
        name: "sort",
        description: "Sort values",
        applies: arrays,
    },
    PipeFunctionSpec {
        name: "reverse",
        description: "Reverse order",
        applies: arrays,
    },
    PipeFunctionSpec {
        name: "first",
        description: "First value",
        applies: arrays,
    },
    PipeFunctionSpec {
        name: "last",
        description: "Last value",
        applies: arrays,
    },
    PipeFunctionSpec {
        name: "limit",
        description: "Limit the number of results",
        applies: arrays,
    },
];

/// Looks up a catalog entry by lower-cased name.
pub fn lookup(name: &str) -> Option<&'static PipeFunctionSpec> {
    let lowered = name.to_lowercase();
    PIPE_FUNCTIONS.iter().find(|spec| spec.name == lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(lookup("FLATTEN").is_some());
        assert!(lookup("uniq").is_some());
        assert!(lookup("nope").is_none());
    }

    #[test]
    fn test_applicability_predicates() {
        let arr = DocValue::Array(vec![]);
        let spec = lookup("sort").unwrap();
        assert!((spec.applies)(&arr));
        assert!(!(spec.applies)(&DocValue::Null));

        let count = lookup("count").unwrap();
        assert!((count.applies)(&DocValue::Null));
    }
}
