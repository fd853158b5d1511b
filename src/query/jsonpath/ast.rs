//! Abstract syntax tree for the custom JSONPath subset.

/// A segment in a JSONPath expression.
///
/// There is deliberately no recursive-descent segment: the custom parser
/// rejects `..` outright, unlike full-featured external engines.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Root node ($)
    Root,
    /// Named child (.property or ['property'])
    Child(String),
    /// Array index ([0], [-1])
    Index(isize),
    /// Wildcard (* or [*]) - all children
    Wildcard,
    /// Array slice ([start:end])
    Slice(Option<isize>, Option<isize>),
    /// Multiple properties (['prop1','prop2'])
    MultiProperty(Vec<String>),
}

/// A complete parsed JSONPath expression.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    /// Segments that make up the path.
    pub segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Creates a new path from segments.
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }
}
