//! Builds the block tree from lexer tokens.

use crate::domain::{
    entities::{Location, TemplateError},
    template::{
        expr::{Expression, Head, Operand, Reference},
        helpers::HelperRegistry,
        lexer::Token,
    },
    value::Value,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node<'a> {
    Text(&'a str),
    Expr {
        expr: Expression,
        location: Location,
    },
    If {
        condition: Expression,
        negate: bool,
        then: Vec<Node<'a>>,
        otherwise: Vec<Node<'a>>,
    },
    Each {
        target: Reference,
        body: Vec<Node<'a>>,
        otherwise: Vec<Node<'a>>,
        location: Location,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    If,
    Unless,
    Each,
}

impl BlockKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "if" => Some(Self::If),
            "unless" => Some(Self::Unless),
            "each" => Some(Self::Each),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Unless => "unless",
            Self::Each => "each",
        }
    }
}

enum Header {
    Condition(Expression),
    Each(Reference),
}

/// An open block waiting for its closing tag.
struct Frame<'a> {
    kind: BlockKind,
    header: Header,
    location: Location,
    primary: Vec<Node<'a>>,
    alternate: Option<Vec<Node<'a>>>,
}

impl<'a> Frame<'a> {
    fn into_node(self) -> Node<'a> {
        let otherwise = self.alternate.unwrap_or_default();
        match self.header {
            Header::Condition(condition) => Node::If {
                condition,
                negate: self.kind == BlockKind::Unless,
                then: self.primary,
                otherwise,
            },
            Header::Each(target) => Node::Each {
                target,
                body: self.primary,
                otherwise,
                location: self.location,
            },
        }
    }

    fn current(&mut self) -> &mut Vec<Node<'a>> {
        match self.alternate {
            Some(ref mut nodes) => nodes,
            None => &mut self.primary,
        }
    }
}

/// Parse tokens into nodes, collecting every syntax error it can find.
pub(crate) fn parse<'a>(
    tokens: Vec<Token<'a>>,
    helpers: &HelperRegistry,
) -> Result<Vec<Node<'a>>, Vec<TemplateError>> {
    let mut root = Vec::new();
    let mut stack: Vec<Frame<'a>> = Vec::new();
    let mut errors = Vec::new();

    for token in tokens {
        let (body, location) = match token {
            Token::Text(text) => {
                push(&mut root, &mut stack, Node::Text(text));
                continue;
            }
            Token::Tag { body, location } => (body, location),
        };

        if let Some(open) = body.strip_prefix('#') {
            let (name, arg) = split_tag(open);
            let Some(kind) = BlockKind::from_name(name) else {
                errors.push(TemplateError::syntax(
                    format!("unknown block '#{name}'"),
                    location,
                ));
                continue;
            };
            let header = if arg.is_empty() {
                errors.push(TemplateError::syntax(
                    format!("'#{name}' needs an argument"),
                    location,
                ));
                None
            } else {
                let parsed = match kind {
                    BlockKind::Each => Reference::parse(arg).map(Header::Each),
                    BlockKind::If | BlockKind::Unless => {
                        Expression::parse(arg, helpers).map(Header::Condition)
                    }
                };
                parsed
                    .map_err(|message| errors.push(TemplateError::syntax(message, location)))
                    .ok()
            };
            // A broken header still opens a frame so its close tag pairs up.
            stack.push(Frame {
                kind,
                header: header.unwrap_or_else(placeholder),
                location,
                primary: Vec::new(),
                alternate: None,
            });
        } else if let Some(close) = body.strip_prefix('/') {
            let name = close.trim();
            match stack.pop() {
                None => errors.push(TemplateError::syntax(
                    format!("'{{{{/{name}}}}}' has no matching opening block"),
                    location,
                )),
                Some(frame) => {
                    if frame.kind.name() != name {
                        errors.push(TemplateError::syntax(
                            format!(
                                "expected '{{{{/{}}}}}' to close the block opened at {}, found '{{{{/{name}}}}}'",
                                frame.kind.name(),
                                frame.location
                            ),
                            location,
                        ));
                    }
                    let node = frame.into_node();
                    push(&mut root, &mut stack, node);
                }
            }
        } else if body == "else" {
            match stack.last_mut() {
                None => errors.push(TemplateError::syntax(
                    "'{{else}}' outside of a block",
                    location,
                )),
                Some(frame) if frame.alternate.is_some() => errors.push(TemplateError::syntax(
                    format!("duplicate '{{{{else}}}}' in '#{}' block", frame.kind.name()),
                    location,
                )),
                Some(frame) => frame.alternate = Some(Vec::new()),
            }
        } else {
            match Expression::parse(body, helpers) {
                Ok(expr) => push(&mut root, &mut stack, Node::Expr { expr, location }),
                Err(message) => errors.push(TemplateError::syntax(message, location)),
            }
        }
    }

    for frame in stack.iter().rev() {
        errors.push(TemplateError::syntax(
            format!("unclosed '#{}' block", frame.kind.name()),
            frame.location,
        ));
    }

    if errors.is_empty() {
        Ok(root)
    } else {
        errors.sort_by_key(TemplateError::location);
        Err(errors)
    }
}

fn push<'a>(root: &mut Vec<Node<'a>>, stack: &mut [Frame<'a>], node: Node<'a>) {
    match stack.last_mut() {
        Some(frame) => frame.current().push(node),
        None => root.push(node),
    }
}

fn split_tag(open: &str) -> (&str, &str) {
    match open.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (open, ""),
    }
}

/// Stand-in header for a block whose argument failed to parse. Never rendered,
/// since any syntax error fails the whole file.
fn placeholder() -> Header {
    Header::Condition(Expression {
        head: Head::Operand(Operand::Literal(Value::Null)),
        filters: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::lexer::tokenize;

    fn parse_str(src: &str) -> Result<Vec<Node<'_>>, Vec<TemplateError>> {
        parse(tokenize(src).unwrap(), &HelperRegistry::builtin())
    }

    fn messages(src: &str) -> Vec<String> {
        parse_str(src)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn nests_blocks() {
        let nodes = parse_str("{{#each items}}{{#if this.on}}x{{else}}y{{/if}}{{/each}}").unwrap();
        let [Node::Each { body, .. }] = nodes.as_slice() else {
            panic!("expected one each node: {nodes:?}");
        };
        let [Node::If { then, otherwise, negate, .. }] = body.as_slice() else {
            panic!("expected one if node: {body:?}");
        };
        assert!(!negate);
        assert_eq!(then, &vec![Node::Text("x")]);
        assert_eq!(otherwise, &vec![Node::Text("y")]);
    }

    #[test]
    fn unless_negates() {
        let nodes = parse_str("{{#unless a}}b{{/unless}}").unwrap();
        assert!(matches!(nodes[0], Node::If { negate: true, .. }));
    }

    #[test]
    fn reports_unclosed_blocks_at_their_opening() {
        assert_eq!(messages("\n{{#if a}}x"), ["2:1: unclosed '#if' block"]);
    }

    #[test]
    fn reports_mismatched_close() {
        let errs = messages("{{#if a}}x{{/each}}");
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("expected '{{/if}}'"), "{errs:?}");
    }

    #[test]
    fn reports_stray_close_and_else() {
        assert_eq!(
            messages("{{/if}}{{else}}"),
            [
                "1:1: '{{/if}}' has no matching opening block",
                "1:8: '{{else}}' outside of a block",
            ]
        );
    }

    #[test]
    fn collects_multiple_errors() {
        let errs = messages("{{#with x}}{{/with}}{{nope name}}{{#if}}{{/if}}");
        assert_eq!(errs.len(), 4, "{errs:?}");
    }

    #[test]
    fn rejects_duplicate_else() {
        let errs = messages("{{#if a}}1{{else}}2{{else}}3{{/if}}");
        assert!(errs[0].contains("duplicate"));
    }
}
