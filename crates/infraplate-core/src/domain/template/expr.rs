//! Expressions inside `{{ }}`.
//!
//! ```text
//! expr      := head ( "|" filter )*
//! head      := operand | helper operand+
//! filter    := "default:" operand | helper ( ":" operand ( "," operand )* )?
//! operand   := literal | reference
//! reference := ("../")* ( "this" ( "." path | "[" ... )? | "@index" | "@first" | "@last" | "@key" | path )
//! literal   := "string" | 'string' | number | true | false | null
//! ```

use crate::domain::{
    path::{Segment, VarPath},
    template::helpers::HelperRegistry,
    value::Value,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expression {
    pub(crate) head: Head,
    pub(crate) filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Head {
    Operand(Operand),
    Call { helper: String, args: Vec<Operand> },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Filter {
    Default(Operand),
    Helper { name: String, args: Vec<Operand> },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Literal(Value),
    Ref(Reference),
}

/// A variable reference, scoped relative to enclosing `#each` blocks.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Reference {
    /// Source spelling, used in diagnostics.
    pub(crate) raw: String,
    /// Number of leading `../`.
    pub(crate) up: usize,
    pub(crate) target: RefTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RefTarget {
    /// A bare path: the current element first, then outer scopes, then the context.
    Path(VarPath),
    /// `this`, optionally followed by segments.
    This(Vec<Segment>),
    Meta(Meta),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Meta {
    Index,
    First,
    Last,
    Key,
}

impl Expression {
    /// Parse a tag body, checking helper names and arities against `helpers`.
    pub(crate) fn parse(body: &str, helpers: &HelperRegistry) -> Result<Self, String> {
        let stages = split_outside_quotes(body, '|')?;
        let (head, filters) = match stages.split_first() {
            Some((head, filters)) => (head.trim(), filters),
            None => return Err("empty expression".into()),
        };
        if head.is_empty() {
            return Err("empty expression".into());
        }

        let head = parse_head(head, helpers)?;
        let filters = filters
            .iter()
            .map(|f| parse_filter(f.trim(), helpers))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { head, filters })
    }
}

fn parse_head(text: &str, helpers: &HelperRegistry) -> Result<Head, String> {
    let words = split_words(text)?;
    match words.as_slice() {
        [] => Err("empty expression".into()),
        [single] => Ok(Head::Operand(Operand::parse(single)?)),
        [name, args @ ..] => {
            let helper = helpers
                .get(name)
                .ok_or_else(|| format!("unknown helper '{name}'"))?;
            helper.check_arity(name, args.len())?;
            let args = args
                .iter()
                .map(|a| Operand::parse(a))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Head::Call {
                helper: (*name).to_owned(),
                args,
            })
        }
    }
}

fn parse_filter(text: &str, helpers: &HelperRegistry) -> Result<Filter, String> {
    if text.is_empty() {
        return Err("empty filter after '|'".into());
    }
    let (name, args) = match text.split_once(':') {
        Some((name, args)) => (name.trim(), Some(args.trim())),
        None => (text, None),
    };

    let args = match args {
        Some(list) => split_outside_quotes(list, ',')?
            .iter()
            .map(|a| Operand::parse(a.trim()))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    if name == "default" {
        return match <[Operand; 1]>::try_from(args) {
            Ok([fallback]) => Ok(Filter::Default(fallback)),
            Err(_) => Err("'default' takes exactly one value, e.g. default:\"3\"".into()),
        };
    }

    let helper = helpers
        .get(name)
        .ok_or_else(|| format!("unknown helper '{name}'"))?;
    // The piped value is the first argument.
    helper.check_arity(name, args.len() + 1)?;
    Ok(Filter::Helper {
        name: name.to_owned(),
        args,
    })
}

impl Operand {
    fn parse(text: &str) -> Result<Self, String> {
        if text.is_empty() {
            return Err("expected a value".into());
        }
        if let Some(literal) = parse_literal(text)? {
            return Ok(Self::Literal(literal));
        }
        Reference::parse(text).map(Self::Ref)
    }
}

impl Reference {
    pub(crate) fn parse(text: &str) -> Result<Self, String> {
        let raw = text.to_owned();
        let mut rest = text;
        let mut up = 0;
        while let Some(stripped) = rest.strip_prefix("../") {
            up += 1;
            rest = stripped;
        }

        let target = match rest {
            "@index" => RefTarget::Meta(Meta::Index),
            "@first" => RefTarget::Meta(Meta::First),
            "@last" => RefTarget::Meta(Meta::Last),
            "@key" => RefTarget::Meta(Meta::Key),
            "this" => RefTarget::This(Vec::new()),
            _ if rest.starts_with('@') => return Err(format!("unknown variable '{rest}'")),
            _ => {
                let path = VarPath::parse(rest).map_err(|e| e.to_string())?;
                match path.head_key() {
                    Some("this") => RefTarget::This(path.segments()[1..].to_vec()),
                    _ => RefTarget::Path(path),
                }
            }
        };

        Ok(Self { raw, up, target })
    }
}

fn parse_literal(text: &str) -> Result<Option<Value>, String> {
    let first = text.chars().next();
    match first {
        Some(quote @ ('"' | '\'')) => unquote(text, quote).map(|s| Some(Value::String(s))),
        Some(c) if c.is_ascii_digit() || c == '-' => match serde_json::from_str::<serde_json::Number>(text) {
            Ok(n) => Ok(Some(Value::Number(n))),
            Err(_) => Err(format!("invalid number '{text}'")),
        },
        _ => Ok(match text {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            "null" => Some(Value::Null),
            _ => None,
        }),
    }
}

fn unquote(text: &str, quote: char) -> Result<String, String> {
    let inner = text
        .strip_prefix(quote)
        .and_then(|t| t.strip_suffix(quote))
        .ok_or_else(|| format!("unterminated string {text}"))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => return Err(format!("dangling escape in {text}")),
        }
    }
    Ok(out)
}

/// Split on `sep` where it is not inside a quoted string.
fn split_outside_quotes(text: &str, sep: char) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut quote = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == sep => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            None => {}
        }
    }
    if quote.is_some() {
        return Err(format!("unterminated string in '{text}'"));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// Split on whitespace outside quotes.
fn split_words(text: &str) -> Result<Vec<&str>, String> {
    let mut words = Vec::new();
    let mut quote = None;
    let mut escaped = false;
    let mut start = None;

    for (i, c) in text.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c.is_whitespace() => {
                if let Some(s) = start.take() {
                    words.push(&text[s..i]);
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                start.get_or_insert(i);
            }
        }
    }
    if quote.is_some() {
        return Err(format!("unterminated string in '{text}'"));
    }
    if let Some(s) = start {
        words.push(&text[s..]);
    }
    Ok(words)
}
