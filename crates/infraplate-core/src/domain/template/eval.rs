//! Walks the node tree against a variable context.

use std::borrow::Cow;

use crate::domain::{
    context::VariableContext,
    entities::{Location, TemplateError},
    path::{Lookup, navigate},
    template::{
        expr::{Expression, Filter, Head, Meta, Operand, RefTarget, Reference},
        helpers::HelperRegistry,
        parser::Node,
    },
    value::Value,
};

/// Why a reference produced no value.
#[derive(Debug, Clone, PartialEq)]
enum Absent {
    Missing { path: String },
    OutOfRange { path: String, index: usize, len: usize },
}

type Eval<'c> = Result<Cow<'c, Value>, Absent>;

/// One `#each` iteration.
struct Scope<'c> {
    this: &'c Value,
    index: usize,
    len: usize,
    key: Option<&'c str>,
}

pub(crate) struct Renderer<'c, 'h> {
    ctx: &'c VariableContext,
    helpers: &'h HelperRegistry,
    strict: bool,
    scopes: Vec<Scope<'c>>,
    out: String,
    pub(crate) warnings: Vec<TemplateError>,
    pub(crate) errors: Vec<TemplateError>,
}

impl<'c, 'h> Renderer<'c, 'h> {
    pub(crate) fn new(ctx: &'c VariableContext, helpers: &'h HelperRegistry, strict: bool) -> Self {
        Self {
            ctx,
            helpers,
            strict,
            scopes: Vec::new(),
            out: String::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> (String, Vec<TemplateError>, Vec<TemplateError>) {
        (self.out, self.warnings, self.errors)
    }

    pub(crate) fn render(&mut self, nodes: &[Node<'_>]) {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.push_str(text),
                Node::Expr { expr, location } => match self.eval(expr) {
                    Ok(value) => self.out.push_str(&value.to_text()),
                    Err(absent) => self.unresolved(absent, *location),
                },
                Node::If {
                    condition,
                    negate,
                    then,
                    otherwise,
                } => {
                    // An absent condition is false, not a diagnostic.
                    let truthy = self.eval(condition).is_ok_and(|v| v.is_truthy());
                    if truthy != *negate {
                        self.render(then);
                    } else {
                        self.render(otherwise);
                    }
                }
                Node::Each {
                    target,
                    body,
                    otherwise,
                    location,
                } => self.render_each(target, body, otherwise, *location),
            }
        }
    }

    fn render_each(
        &mut self,
        target: &Reference,
        body: &[Node<'_>],
        otherwise: &[Node<'_>],
        location: Location,
    ) {
        let collection = match self.resolve(target) {
            Ok(Cow::Borrowed(value)) => value,
            Ok(Cow::Owned(value)) => {
                self.errors.push(TemplateError::NotIterable {
                    path: target.raw.clone(),
                    found: value.type_name(),
                    location,
                });
                return;
            }
            Err(absent) => {
                self.unresolved(absent, location);
                self.render(otherwise);
                return;
            }
        };

        match collection {
            Value::Array(items) if !items.is_empty() => {
                let len = items.len();
                for (index, item) in items.iter().enumerate() {
                    self.scopes.push(Scope {
                        this: item,
                        index,
                        len,
                        key: None,
                    });
                    self.render(body);
                    self.scopes.pop();
                }
            }
            Value::Object(map) if !map.is_empty() => {
                let len = map.len();
                for (index, (key, item)) in map.iter().enumerate() {
                    self.scopes.push(Scope {
                        this: item,
                        index,
                        len,
                        key: Some(key),
                    });
                    self.render(body);
                    self.scopes.pop();
                }
            }
            Value::Array(_) | Value::Object(_) | Value::Null => self.render(otherwise),
            scalar => self.errors.push(TemplateError::NotIterable {
                path: target.raw.clone(),
                found: scalar.type_name(),
                location,
            }),
        }
    }

    fn unresolved(&mut self, absent: Absent, location: Location) {
        let error = match absent {
            Absent::Missing { path } => TemplateError::MissingVariable {
                suggestions: self.ctx.suggest(&path),
                path,
                location,
            },
            Absent::OutOfRange { path, index, len } => TemplateError::IndexOutOfRange {
                path,
                index,
                len,
                location,
            },
        };
        if self.strict {
            self.errors.push(error);
        } else {
            self.warnings.push(error);
        }
    }

    // ── Expressions ──────────────────────────────────────────────────────────

    fn eval(&self, expr: &Expression) -> Eval<'c> {
        let mut current = match &expr.head {
            Head::Operand(operand) => self.operand(operand),
            Head::Call { helper, args } => self.call(helper, None, args),
        };

        for filter in &expr.filters {
            current = match filter {
                Filter::Default(fallback) => match current {
                    Ok(value) if !value.is_null() => Ok(value),
                    _ => self.operand(fallback),
                },
                Filter::Helper { name, args } => match current {
                    Ok(subject) => self.call(name, Some(subject), args),
                    absent => absent,
                },
            };
        }
        current
    }

    fn call(&self, name: &str, subject: Option<Cow<'c, Value>>, args: &[Operand]) -> Eval<'c> {
        let mut values = Vec::with_capacity(args.len() + 1);
        if let Some(subject) = subject {
            values.push(subject.into_owned());
        }
        for arg in args {
            values.push(self.operand(arg)?.into_owned());
        }
        // Names and arities were checked at parse time.
        let result = self
            .helpers
            .get(name)
            .map_or(Value::Null, |helper| helper.call(&values));
        Ok(Cow::Owned(result))
    }

    fn operand(&self, operand: &Operand) -> Eval<'c> {
        match operand {
            Operand::Literal(value) => Ok(Cow::Owned(value.clone())),
            Operand::Ref(reference) => self.resolve(reference),
        }
    }

    /// Resolve a reference through the scope chain.
    fn resolve(&self, reference: &Reference) -> Eval<'c> {
        let visible = self.scopes.len().saturating_sub(reference.up);
        let scopes = &self.scopes[..visible];
        let missing = || Absent::Missing {
            path: reference.raw.clone(),
        };
        let classify = |lookup: Lookup<'c>| match lookup {
            Lookup::Found(value) => Ok(Cow::Borrowed(value)),
            Lookup::Missing => Err(missing()),
            Lookup::OutOfRange { index, len } => Err(Absent::OutOfRange {
                path: reference.raw.clone(),
                index,
                len,
            }),
        };

        if reference.up > self.scopes.len() {
            return Err(missing());
        }

        match &reference.target {
            RefTarget::This(segments) => match scopes.last() {
                Some(scope) => classify(navigate(scope.this, segments)),
                None => Err(missing()),
            },
            RefTarget::Meta(meta) => {
                let scope = scopes.last().ok_or_else(missing)?;
                let value = match meta {
                    Meta::Index => Value::from(scope.index),
                    Meta::First => Value::Bool(scope.index == 0),
                    Meta::Last => Value::Bool(scope.index + 1 == scope.len),
                    Meta::Key => Value::from(scope.key.ok_or_else(missing)?),
                };
                Ok(Cow::Owned(value))
            }
            RefTarget::Path(path) => {
                // The innermost element that has the leading key owns the path.
                for scope in scopes.iter().rev() {
                    let owns = match (scope.this, path.head_key()) {
                        (Value::Object(map), Some(key)) => map.contains_key(key),
                        _ => false,
                    };
                    if owns {
                        return classify(navigate(scope.this, path.segments()));
                    }
                }
                classify(self.ctx.resolve(path))
            }
        }
    }
}
