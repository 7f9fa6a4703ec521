//! Variables Service - the read-only "list variables" use case.
//!
//! Fetches the payload, builds the context, optionally merges a custom
//! variables file, and returns every path with its inferred type and a
//! sample. Never touches the output tree.

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    application::ports::{DataSource, VariablesLoader},
    domain::{Identifier, OverrideWarning, SourceKind, Value, VariableContext, merge},
    error::InfraplateResult,
};

/// One row of a variable listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub sample: String,
    #[serde(skip)]
    pub value: Value,
    /// Also reachable unprefixed; the `blueprint.*`/`stack.*` spelling.
    pub alias: bool,
}

impl VariableEntry {
    /// First path segment, used to group listings.
    pub fn root_key(&self) -> &str {
        let end = self
            .path
            .find(['.', '['])
            .unwrap_or(self.path.len());
        &self.path[..end]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableListing {
    pub kind: SourceKind,
    pub identifier: Identifier,
    pub entries: Vec<VariableEntry>,
    pub overrides: Vec<OverrideWarning>,
}

impl VariableListing {
    /// Keep entries whose path starts with `prefix`.
    pub fn retain_prefix(&mut self, prefix: &str) {
        self.entries.retain(|e| e.path.starts_with(prefix));
    }

    /// Drop the aliased duplicates.
    pub fn without_aliases(mut self) -> Self {
        self.entries.retain(|e| !e.alias);
        self
    }
}

/// Merge the custom variables file, if any, over `base`.
pub(crate) fn apply_custom_variables(
    loader: &dyn VariablesLoader,
    base: &VariableContext,
    path: Option<&Path>,
) -> InfraplateResult<(VariableContext, Vec<OverrideWarning>)> {
    let Some(path) = path else {
        return Ok((base.clone(), Vec::new()));
    };

    let custom = loader.load(path)?;
    let (merged, overrides) = merge(base, &custom);
    for o in &overrides {
        warn!(
            path = %o.path,
            old = %o.old_value.sample(),
            new = %o.new_value.sample(),
            "Custom variable overrides fetched value"
        );
    }
    info!(file = %path.display(), overrides = overrides.len(), "Custom variables merged");
    Ok((merged, overrides))
}

pub struct VariablesService {
    source: Box<dyn DataSource>,
    loader: Box<dyn VariablesLoader>,
}

impl VariablesService {
    pub fn new(source: Box<dyn DataSource>, loader: Box<dyn VariablesLoader>) -> Self {
        Self { source, loader }
    }

    /// List every variable a template could reference.
    #[instrument(skip_all, fields(kind = %kind, identifier = %identifier))]
    pub fn list(
        &self,
        kind: SourceKind,
        identifier: &Identifier,
        custom: Option<&Path>,
    ) -> InfraplateResult<VariableListing> {
        let payload = self.source.fetch(kind, identifier)?;
        let base = VariableContext::build(&payload, kind);
        let (context, overrides) = apply_custom_variables(self.loader.as_ref(), &base, custom)?;

        let entries = context
            .list()
            .into_iter()
            .map(|(path, value)| VariableEntry {
                path: path.to_string(),
                type_name: value.type_name(),
                sample: value.sample(),
                value: value.clone(),
                alias: context.is_alias_entry(path),
            })
            .collect();

        Ok(VariableListing {
            kind,
            identifier: identifier.clone(),
            entries,
            overrides,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        ConfigError, FetchError,
        ports::{MockDataSource, MockVariablesLoader},
    };
    use crate::error::InfraplateError;
    use serde_json::json;

    fn source(payload: serde_json::Value) -> Box<MockDataSource> {
        let mut source = MockDataSource::new();
        source
            .expect_fetch()
            .returning(move |_, _| Ok(Value::from(payload.clone())));
        Box::new(source)
    }

    fn shop() -> Identifier {
        Identifier::parse("shop").unwrap()
    }

    #[test]
    fn lists_sorted_paths_with_types_and_samples() {
        let service = VariablesService::new(
            source(json!({"name": "shop", "resources": [{"name": "web"}]})),
            Box::new(MockVariablesLoader::new()),
        );

        let listing = service
            .list(SourceKind::Blueprint, &shop(), None)
            .unwrap()
            .without_aliases();

        let rows: Vec<(&str, &str, &str)> = listing
            .entries
            .iter()
            .map(|e| (e.path.as_str(), e.type_name, e.sample.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("name", "string", "\"shop\""),
                ("resources", "array", "[1 element]"),
                ("resources[0]", "object", "{ 1 property }"),
                ("resources[0].name", "string", "\"web\""),
            ]
        );
    }

    #[test]
    fn aliased_entries_are_flagged() {
        let service = VariablesService::new(
            source(json!({"name": "shop"})),
            Box::new(MockVariablesLoader::new()),
        );
        let listing = service.list(SourceKind::Stack, &shop(), None).unwrap();
        let alias: Vec<&str> = listing
            .entries
            .iter()
            .filter(|e| e.alias)
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(alias, ["stack", "stack.name"]);
        assert!(listing.entries.iter().filter(|e| e.alias).all(|e| e.root_key() == "stack"));
    }

    #[test]
    fn custom_variables_are_merged_and_reported() {
        let mut loader = MockVariablesLoader::new();
        loader
            .expect_load()
            .returning(|_| Ok(Value::from(json!({"name": "shop-dev", "env": "dev"}))));
        let service = VariablesService::new(source(json!({"name": "shop"})), Box::new(loader));

        let mut listing = service
            .list(SourceKind::Blueprint, &shop(), Some(Path::new("vars.yaml")))
            .unwrap();
        assert_eq!(listing.overrides.len(), 1);

        listing.retain_prefix("env");
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].value, Value::from("dev"));
    }

    #[test]
    fn fetch_and_config_errors_propagate() {
        let mut failing = MockDataSource::new();
        failing.expect_fetch().returning(|kind, id| {
            Err(FetchError::NotFound {
                kind,
                identifier: id.to_string(),
            })
        });
        let service = VariablesService::new(Box::new(failing), Box::new(MockVariablesLoader::new()));
        assert!(matches!(
            service.list(SourceKind::Blueprint, &shop(), None),
            Err(InfraplateError::Application(_))
        ));

        let mut loader = MockVariablesLoader::new();
        loader.expect_load().returning(|p| {
            Err(ConfigError::UnsupportedFormat {
                path: p.to_path_buf(),
            })
        });
        let service = VariablesService::new(source(json!({})), Box::new(loader));
        let err = service
            .list(SourceKind::Blueprint, &shop(), Some(Path::new("vars.toml")))
            .unwrap_err();
        assert!(err.to_string().contains("vars.toml"));
    }
}
