//! Helper functions callable from templates.
//!
//! Helpers live in an explicit table handed to the processor by reference.
//! A helper receives its subject first (the piped value, or the first call
//! argument) followed by any extra arguments.

use std::collections::HashMap;

use crate::domain::value::Value;

pub type HelperFn = fn(&[Value]) -> Value;

/// A registered helper and the number of arguments it accepts.
#[derive(Debug, Clone, Copy)]
pub struct Helper {
    pub func: HelperFn,
    pub min_args: usize,
    pub max_args: usize,
}

impl Helper {
    pub const fn new(func: HelperFn, min_args: usize, max_args: usize) -> Self {
        Self {
            func,
            min_args,
            max_args,
        }
    }

    pub(crate) fn check_arity(&self, name: &str, given: usize) -> Result<(), String> {
        if (self.min_args..=self.max_args).contains(&given) {
            return Ok(());
        }
        let expected = if self.min_args == self.max_args {
            self.min_args.to_string()
        } else {
            format!("{}-{}", self.min_args, self.max_args)
        };
        Err(format!(
            "helper '{name}' takes {expected} argument(s), got {given}"
        ))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HelperRegistry {
    helpers: HashMap<String, Helper>,
}

impl HelperRegistry {
    /// A registry with no helpers at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in helper set.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("uppercase", Helper::new(uppercase, 1, 1));
        registry.register("lowercase", Helper::new(lowercase, 1, 1));
        registry.register("capitalize", Helper::new(capitalize, 1, 1));
        registry.register("trim", Helper::new(trim, 1, 1));
        registry.register("replace", Helper::new(replace, 3, 3));
        registry.register("json", Helper::new(json, 1, 1));
        registry.register("join", Helper::new(join, 1, 2));
        registry.register("length", Helper::new(length, 1, 1));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, helper: Helper) {
        self.helpers.insert(name.into(), helper);
    }

    pub fn get(&self, name: &str) -> Option<&Helper> {
        self.helpers.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.helpers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ── Built-ins ────────────────────────────────────────────────────────────────

fn text(args: &[Value], i: usize) -> String {
    args.get(i).map(Value::to_text).unwrap_or_default()
}

fn uppercase(args: &[Value]) -> Value {
    Value::String(text(args, 0).to_uppercase())
}

fn lowercase(args: &[Value]) -> Value {
    Value::String(text(args, 0).to_lowercase())
}

fn capitalize(args: &[Value]) -> Value {
    let subject = text(args, 0);
    let mut chars = subject.chars();
    let out = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    Value::String(out)
}

fn trim(args: &[Value]) -> Value {
    Value::String(text(args, 0).trim().to_owned())
}

fn replace(args: &[Value]) -> Value {
    let subject = text(args, 0);
    let from = text(args, 1);
    if from.is_empty() {
        return Value::String(subject);
    }
    Value::String(subject.replace(&from, &text(args, 2)))
}

/// Canonical JSON, so strings come out quoted.
fn json(args: &[Value]) -> Value {
    Value::String(args.first().map(Value::to_canonical_json).unwrap_or_default())
}

fn join(args: &[Value]) -> Value {
    let separator = match args.get(1) {
        Some(sep) => sep.to_text(),
        None => ",".to_owned(),
    };
    match args.first() {
        Some(Value::Array(items)) => Value::String(
            items
                .iter()
                .map(Value::to_text)
                .collect::<Vec<_>>()
                .join(&separator),
        ),
        Some(other) => Value::String(other.to_text()),
        None => Value::Null,
    }
}

fn length(args: &[Value]) -> Value {
    args.first()
        .and_then(Value::len)
        .map_or(Value::Null, Value::from)
}
