//! Variable paths: `resources[0].configuration.engine`.
//!
//! A [`VarPath`] is a non-empty list of segments. Its `Display` form is the
//! canonical spelling used as the key in a `VariableContext`, so parsing and
//! printing must agree: `VarPath::parse(&p.to_string()) == Ok(p)`.
//!
//! Grammar:
//!
//! ```text
//! path    := head ( "." key | "[" index "]" | "[" quoted "]" )*
//! head    := key | "[" index "]" | "[" quoted "]"
//! key     := [A-Za-z0-9_-]+        (all digits after "." means an index)
//! quoted  := '"' chars '"' | "'" chars "'"
//! ```

use std::fmt;
use std::str::FromStr;

use crate::domain::{error::DomainError, value::Value};

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }
}

/// A parsed, non-empty variable path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarPath {
    segments: Vec<Segment>,
}

impl VarPath {
    /// A single-segment path.
    pub fn root(key: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Key(key.into())],
        }
    }

    /// Build from segments; `None` when empty.
    pub fn from_segments(segments: Vec<Segment>) -> Option<Self> {
        (!segments.is_empty()).then_some(Self { segments })
    }

    pub fn parse(input: &str) -> Result<Self, DomainError> {
        Parser::new(input).parse()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The first segment's key, if the path starts with one.
    pub fn head_key(&self) -> Option<&str> {
        match self.segments.first() {
            Some(Segment::Key(k)) => Some(k),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// The first `n` segments, or `None` if `n` is zero or too long.
    pub fn prefix(&self, n: usize) -> Option<Self> {
        if n == 0 || n > self.segments.len() {
            return None;
        }
        Some(Self {
            segments: self.segments[..n].to_vec(),
        })
    }
}

impl fmt::Display for VarPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Index(idx) => write!(f, "[{idx}]")?,
                Segment::Key(key) if is_simple_key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                Segment::Key(key) => {
                    f.write_str("[\"")?;
                    for c in key.chars() {
                        if matches!(c, '"' | '\\') {
                            f.write_str("\\")?;
                        }
                        write!(f, "{c}")?;
                    }
                    f.write_str("\"]")?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for VarPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Keys that can be written after a dot without quoting.
fn is_simple_key(key: &str) -> bool {
    !key.is_empty()
        && key.chars().all(is_key_char)
        && !key.chars().all(|c| c.is_ascii_digit())
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

// ── Navigation ───────────────────────────────────────────────────────────────

/// Outcome of walking a path through a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Value),
    Missing,
    /// An index past the end of an array.
    OutOfRange { index: usize, len: usize },
}

impl<'a> Lookup<'a> {
    pub fn found(self) -> Option<&'a Value> {
        match self {
            Self::Found(v) => Some(v),
            _ => None,
        }
    }
}

/// Walk `segments` from `value`.
///
/// A numeric key on an array acts as an index and an index on an object
/// falls back to its decimal key.
pub fn navigate<'a>(value: &'a Value, segments: &[Segment]) -> Lookup<'a> {
    let mut current = value;
    for segment in segments {
        let next = match (current, segment) {
            (Value::Object(map), Segment::Key(k)) => map.get(k),
            (Value::Object(map), Segment::Index(i)) => map.get(&i.to_string()),
            (Value::Array(items), Segment::Index(i)) => match items.get(*i) {
                Some(item) => Some(item),
                None => {
                    return Lookup::OutOfRange {
                        index: *i,
                        len: items.len(),
                    };
                }
            },
            (Value::Array(items), Segment::Key(k)) => match k.parse::<usize>() {
                Ok(i) => match items.get(i) {
                    Some(item) => Some(item),
                    None => {
                        return Lookup::OutOfRange {
                            index: i,
                            len: items.len(),
                        };
                    }
                },
                Err(_) => None,
            },
            _ => None,
        };
        match next {
            Some(v) => current = v,
            None => return Lookup::Missing,
        }
    }
    Lookup::Found(current)
}

// ── Parser ───────────────────────────────────────────────────────────────────

struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn parse(mut self) -> Result<VarPath, DomainError> {
        if self.input.is_empty() {
            return Err(self.error("path is empty"));
        }

        let mut segments = Vec::new();
        match self.chars.peek() {
            Some((_, '[')) => segments.push(self.bracket()?),
            _ => segments.push(self.dotted_key()?),
        }

        while let Some((_, c)) = self.chars.next() {
            match c {
                '.' => segments.push(self.dotted_key()?),
                '[' => segments.push(self.bracket_body()?),
                other => return Err(self.error(&format!("unexpected character '{other}'"))),
            }
        }

        Ok(VarPath { segments })
    }

    fn dotted_key(&mut self) -> Result<Segment, DomainError> {
        let mut key = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if !is_key_char(c) {
                break;
            }
            key.push(c);
            self.chars.next();
        }
        if key.is_empty() {
            return Err(self.error("expected a key"));
        }
        if key.chars().all(|c| c.is_ascii_digit()) {
            return self.index(&key);
        }
        Ok(Segment::Key(key))
    }

    fn bracket(&mut self) -> Result<Segment, DomainError> {
        self.chars.next();
        self.bracket_body()
    }

    /// Parses what follows an opening `[`.
    fn bracket_body(&mut self) -> Result<Segment, DomainError> {
        let segment = match self.chars.peek() {
            Some(&(_, quote @ ('"' | '\''))) => {
                self.chars.next();
                let mut key = String::new();
                loop {
                    match self.chars.next() {
                        Some((_, '\\')) => match self.chars.next() {
                            Some((_, c)) => key.push(c),
                            None => return Err(self.error("unterminated quoted key")),
                        },
                        Some((_, c)) if c == quote => break,
                        Some((_, c)) => key.push(c),
                        None => return Err(self.error("unterminated quoted key")),
                    }
                }
                Segment::Key(key)
            }
            _ => {
                let mut digits = String::new();
                while let Some(&(_, c)) = self.chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    digits.push(c);
                    self.chars.next();
                }
                if digits.is_empty() {
                    return Err(self.error("expected an index or quoted key inside '[]'"));
                }
                self.index(&digits)?
            }
        };

        match self.chars.next() {
            Some((_, ']')) => Ok(segment),
            _ => Err(self.error("expected ']'")),
        }
    }

    fn index(&self, digits: &str) -> Result<Segment, DomainError> {
        digits
            .parse::<usize>()
            .map(Segment::Index)
            .map_err(|_| self.error(&format!("index '{digits}' is too large")))
    }

    fn error(&self, reason: &str) -> DomainError {
        DomainError::InvalidPath {
            path: self.input.to_owned(),
            reason: reason.to_owned(),
        }
    }
}
