//! Overlaying user-supplied variables onto a built context.
//!
//! Custom values are merged into the payload itself and the context is
//! rebuilt, so containers always agree with their children and the
//! `blueprint.*` / `stack.*` spelling sees every override.

use serde::Serialize;

use crate::domain::{context::VariableContext, value::Value};

/// A custom variable replaced a value the payload already defined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverrideWarning {
    pub path: String,
    pub old_value: Value,
    pub new_value: Value,
}

/// Merge `custom` over a copy of `base`.
///
/// Objects merge key by key and arrays element by element; anything else is
/// replaced. A top-level key named after the alias (`blueprint:`) targets the
/// payload root unless the payload has a key of that name itself. One warning
/// per path present on both sides, in path order. `base` is left untouched.
pub fn merge(base: &VariableContext, custom: &Value) -> (VariableContext, Vec<OverrideWarning>) {
    let custom = lift_alias(base, custom);
    let root = overlay(base.root(), &custom);
    let merged = match base.kind() {
        Some(kind) => VariableContext::build(&root, kind),
        None => VariableContext::flatten(&root),
    };

    let warnings = VariableContext::flatten(&custom)
        .entries()
        .keys()
        .filter_map(|path| {
            let old_value = base.entries().get(path)?;
            let new_value = merged.entries().get(path)?;
            Some(OverrideWarning {
                path: path.to_string(),
                old_value: old_value.clone(),
                new_value: new_value.clone(),
            })
        })
        .collect();

    (merged, warnings)
}

/// Unwrap `{alias: {...}}` into root-level keys. Unprefixed keys in the same
/// file win over the aliased ones.
fn lift_alias(base: &VariableContext, custom: &Value) -> Value {
    let (Some(alias), Value::Object(map)) = (base.alias(), custom) else {
        return custom.clone();
    };
    let payload_owns_key = base
        .root()
        .as_object()
        .is_some_and(|root| root.contains_key(alias));
    let aliased = match map.get(alias) {
        Some(value) if matches!(value, Value::Object(_)) && !payload_owns_key => value,
        _ => return custom.clone(),
    };

    let mut rest = map.clone();
    rest.remove(alias);
    overlay(aliased, &Value::Object(rest))
}

fn overlay(base: &Value, custom: &Value) -> Value {
    match (base, custom) {
        (Value::Object(base), Value::Object(custom)) => {
            let mut merged = base.clone();
            for (key, value) in custom {
                let next = match base.get(key) {
                    Some(existing) => overlay(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (Value::Array(base), Value::Array(custom)) => {
            let mut merged = base.clone();
            for (index, value) in custom.iter().enumerate() {
                match merged.get_mut(index) {
                    Some(slot) => *slot = overlay(slot, value),
                    None => merged.push(value.clone()),
                }
            }
            Value::Array(merged)
        }
        _ => custom.clone(),
    }
}
