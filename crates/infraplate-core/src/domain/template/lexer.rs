//! Splits raw template text into literal runs and `{{ }}` tags.
//!
//! Comments are dropped here and escapes are turned into literal text, so the
//! parser only ever sees text and tag bodies.

use crate::domain::entities::{Location, TemplateError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    Tag { body: &'a str, location: Location },
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const COMMENT_OPEN: &str = "{{!--";
const COMMENT_CLOSE: &str = "--}}";

/// Maps byte offsets to 1-based line/column (columns count chars).
pub(crate) struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    pub(crate) fn location(&self, offset: usize) -> Location {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line - 1];
        let column = self.source[start..offset].chars().count() + 1;
        Location::new(line, column)
    }
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token<'_>>, TemplateError> {
    let lines = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(rel) = source[pos..].find(OPEN) {
        let start = pos + rel;

        // `\{{...}}` emits the tag text itself, minus the backslash.
        if source[..start].ends_with('\\') {
            push_text(&mut tokens, &source[pos..start - 1]);
            let end = match find_close(&source[start + OPEN.len()..]) {
                Some(close) => start + OPEN.len() + close + CLOSE.len(),
                None => start + OPEN.len(),
            };
            push_text(&mut tokens, &source[start..end]);
            pos = end;
            continue;
        }

        push_text(&mut tokens, &source[pos..start]);

        let rest = &source[start..];
        if rest.starts_with(COMMENT_OPEN) {
            let body_start = start + COMMENT_OPEN.len();
            let close = source[body_start..].find(COMMENT_CLOSE).ok_or_else(|| {
                TemplateError::syntax("unclosed comment '{{!--'", lines.location(start))
            })?;
            pos = body_start + close + COMMENT_CLOSE.len();
            continue;
        }

        let body_start = start + OPEN.len();
        let close = find_close(&source[body_start..])
            .ok_or_else(|| TemplateError::syntax("unclosed tag '{{'", lines.location(start)))?;
        let body = &source[body_start..body_start + close];
        pos = body_start + close + CLOSE.len();

        if body.starts_with('!') {
            continue;
        }
        tokens.push(Token::Tag {
            body: body.trim(),
            location: lines.location(start),
        });
    }

    push_text(&mut tokens, &source[pos..]);
    Ok(tokens)
}

/// Offset of the `}}` ending a tag, skipping any inside quoted strings.
///
/// Comment bodies are not scanned for quotes. An unbalanced quote falls back
/// to the first `}}` so the expression parser reports the bad string.
fn find_close(rest: &str) -> Option<usize> {
    if rest.starts_with('!') {
        return rest.find(CLOSE);
    }
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if rest[i..].starts_with(CLOSE) => return Some(i),
            None => {}
        }
    }
    rest.find(CLOSE)
}

fn push_text<'a>(tokens: &mut Vec<Token<'a>>, text: &'a str) {
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
}
