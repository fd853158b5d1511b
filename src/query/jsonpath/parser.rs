//! Parser for the custom JSONPath subset.
//!
//! Recursive descent (`..`) is rejected up front: this parser is
//! deliberately partial, and double-dot queries must fail validation rather
//! than silently matching nothing. A `|` terminates the path; everything
//! after it is a pipeline for the consuming tool's function registry.

use super::ast::{JsonPath, PathSegment};
use super::error::JsonPathError;

/// Character-cursor parser for JSONPath query strings.
pub struct Parser {
    chars: Vec<char>,
    position: usize,
}

impl Parser {
    fn new(query: &str) -> Self {
        Self {
            chars: query.chars().collect(),
            position: 0,
        }
    }

    /// Parses a query string into a [`JsonPath`].
    pub fn parse(query: &str) -> Result<JsonPath, JsonPathError> {
        if query.contains("..") {
            return Err(JsonPathError::InvalidSyntax {
                message: "recursive descent ('..') is not supported".to_string(),
            });
        }

        let mut parser = Parser::new(query);
        let path = parser.parse_path()?;

        parser.skip_whitespace();
        match parser.peek() {
            // A pipe tail belongs to the pipe-function registry, not the path
            None | Some('|') => Ok(path),
            Some(ch) => Err(JsonPathError::UnexpectedToken {
                position: parser.position,
                found: ch.to_string(),
                expected: "'.', '[', '|' or end of input".to_string(),
            }),
        }
    }

    fn parse_path(&mut self) -> Result<JsonPath, JsonPathError> {
        let mut segments = Vec::new();

        self.skip_whitespace();
        if self.peek() != Some('$') {
            return Err(JsonPathError::InvalidSyntax {
                message: "JSONPath must start with '$'".to_string(),
            });
        }
        self.next();
        segments.push(PathSegment::Root);

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('.') => {
                    self.next();
                    self.skip_whitespace();
                    if self.peek() == Some('*') {
                        self.next();
                        segments.push(PathSegment::Wildcard);
                    } else {
                        let name = self.parse_identifier()?;
                        segments.push(PathSegment::Child(name));
                    }
                }
                Some('[') => {
                    segments.push(self.parse_bracket_expression()?);
                }
                _ => break,
            }
        }

        Ok(JsonPath::new(segments))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), JsonPathError> {
        self.skip_whitespace();
        let position = self.position;
        match self.next() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(JsonPathError::UnexpectedToken {
                position,
                found: ch.to_string(),
                expected: format!("'{}'", expected),
            }),
            None => Err(JsonPathError::UnexpectedEnd {
                expected: format!("'{}'", expected),
            }),
        }
    }

    fn parse_identifier(&mut self) -> Result<String, JsonPathError> {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                name.push(ch);
                self.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            Err(JsonPathError::InvalidSyntax {
                message: "Expected property name after '.'".to_string(),
            })
        } else {
            Ok(name)
        }
    }

    /// Parses a bracket expression: `[index]`, `[start:end]`, `['key']`,
    /// `['k1','k2']`, or `[*]`.
    fn parse_bracket_expression(&mut self) -> Result<PathSegment, JsonPathError> {
        self.expect('[')?;
        self.skip_whitespace();

        let segment = match self.peek() {
            Some('*') => {
                self.next();
                self.expect(']')?;
                PathSegment::Wildcard
            }
            Some('\'') | Some('"') => {
                let mut properties = self.parse_quoted_properties()?;
                self.expect(']')?;
                if properties.len() == 1 {
                    PathSegment::Child(properties.remove(0))
                } else {
                    PathSegment::MultiProperty(properties)
                }
            }
            Some('-') | Some('0'..='9') => {
                if self.slice_ahead() {
                    self.parse_slice()?
                } else {
                    let idx = self.parse_signed_number()?;
                    self.expect(']')?;
                    PathSegment::Index(idx)
                }
            }
            Some(':') => self.parse_slice()?,
            _ => {
                return Err(JsonPathError::InvalidSyntax {
                    message: "Invalid bracket expression".to_string(),
                })
            }
        };

        Ok(segment)
    }

    /// Looks ahead for a ':' before the closing bracket.
    fn slice_ahead(&self) -> bool {
        for ch in &self.chars[self.position..] {
            match ch {
                ':' => return true,
                ']' => return false,
                _ => {}
            }
        }
        false
    }

    fn parse_quoted_properties(&mut self) -> Result<Vec<String>, JsonPathError> {
        let mut properties = Vec::new();
        loop {
            self.skip_whitespace();
            let quote = match self.peek() {
                Some(ch @ ('\'' | '"')) => {
                    self.next();
                    ch
                }
                _ => break,
            };

            let mut value = String::new();
            loop {
                match self.next() {
                    Some(ch) if ch == quote => break,
                    Some('\\') => match self.next() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('\\') => value.push('\\'),
                        Some('\'') => value.push('\''),
                        Some('"') => value.push('"'),
                        Some(_) | None => {
                            return Err(JsonPathError::InvalidSyntax {
                                message: "Invalid escape sequence".to_string(),
                            })
                        }
                    },
                    Some(ch) => value.push(ch),
                    None => {
                        return Err(JsonPathError::UnexpectedEnd {
                            expected: format!("closing quote '{}'", quote),
                        })
                    }
                }
            }
            properties.push(value);

            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.next();
            } else {
                break;
            }
        }
        Ok(properties)
    }

    fn parse_signed_number(&mut self) -> Result<isize, JsonPathError> {
        let mut num = String::new();
        if self.peek() == Some('-') {
            num.push('-');
            self.next();
        }
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            num.push(self.next().unwrap());
        }
        if num.is_empty() || num == "-" {
            return Err(JsonPathError::InvalidSyntax {
                message: "Expected number".to_string(),
            });
        }
        num.parse::<isize>().map_err(|_| JsonPathError::InvalidSyntax {
            message: format!("Invalid number: {}", num),
        })
    }

    /// Parses an array slice: `[start:end]`, `[start:]`, `[:end]`, `[:]`.
    fn parse_slice(&mut self) -> Result<PathSegment, JsonPathError> {
        let start = if self.peek() == Some(':') {
            None
        } else {
            Some(self.parse_signed_number()?)
        };

        self.expect(':')?;
        self.skip_whitespace();

        let end = if self.peek() == Some(']') {
            None
        } else {
            Some(self.parse_signed_number()?)
        };

        self.expect(']')?;

        if let (Some(s), Some(e)) = (start, end) {
            if s >= 0 && e >= 0 && s > e {
                return Err(JsonPathError::InvalidSyntax {
                    message: format!("Invalid slice: start ({}) > end ({})", s, e),
                });
            }
        }

        Ok(PathSegment::Slice(start, end))
    }
}
