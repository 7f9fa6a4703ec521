// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for infraplate.
//!
//! Pure logic only: the value model, variable paths, the flattened variable
//! context, custom-variable merging and the template language. All I/O goes
//! through ports defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Immutable data**: Contexts are built once; merging returns a new one
//! - **Explicit state**: Helpers are a table passed by reference, never global
//!
// Public API - what the world sees
pub mod context;
pub mod entities;
pub mod error;
pub mod merge;
pub mod path;
pub mod source;
pub mod template;
pub mod value;

// Internal only
mod suggest;

// Re-exports for convenience
pub use context::VariableContext;
pub use entities::{
    Location, OutputValidationError, ProcessedFile, RelativePath, TemplateError, TemplateFile,
    TemplateFormat,
};
pub use error::{DomainError, ErrorCategory};
pub use merge::{OverrideWarning, merge};
pub use path::{Lookup, Segment, VarPath};
pub use source::{Identifier, SourceKind};
pub use template::{Helper, HelperFn, HelperRegistry, Rendered, TemplateProcessor};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        Value::from(json!({
            "name": "shop",
            "resources": [
                {"name": "web", "configuration": {"replicas": 2}},
                {"name": "db", "configuration": {"engine": "postgres"}}
            ]
        }))
    }

    // ========================================================================
    // Build -> Merge -> Render
    // ========================================================================

    #[test]
    fn override_is_used_and_reported_once() {
        let base = VariableContext::build(&payload(), SourceKind::Blueprint);
        let custom = Value::from(json!({"name": "shop-staging"}));
        let (ctx, warnings) = merge(&base, &custom);

        let helpers = HelperRegistry::builtin();
        let out = TemplateProcessor::new(&helpers)
            .render("name = \"{{name}}\"", &ctx)
            .unwrap();

        assert_eq!(out.content, "name = \"shop-staging\"");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].path, "name");
        assert_eq!(base.get("name"), Some(&Value::from("shop")));
    }

    #[test]
    fn partial_overrides_agree_across_access_styles() {
        let base = VariableContext::build(
            &Value::from(json!({
                "region": "eu-west-1",
                "resources": [{"name": "web", "configuration": {"replicas": 2}}]
            })),
            SourceKind::Blueprint,
        );
        let custom = Value::from(json!({
            "region": "us-east-1",
            "resources": [{"configuration": {"replicas": 5}}]
        }));
        let (ctx, _) = merge(&base, &custom);

        let helpers = HelperRegistry::builtin();
        let out = TemplateProcessor::new(&helpers)
            .render(
                "idx={{resources[0].name}} each={{#each resources}}{{this.name}}/{{this.configuration.replicas}}{{/each}} ns={{blueprint.region}} plain={{region}}",
                &ctx,
            )
            .unwrap();

        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
        assert_eq!(out.content, "idx=web each=web/5 ns=us-east-1 plain=us-east-1");
    }

    #[test]
    fn every_context_path_renders_its_canonical_text() {
        let ctx = VariableContext::build(&payload(), SourceKind::Blueprint);
        let helpers = HelperRegistry::builtin();
        let processor = TemplateProcessor::new(&helpers).strict(true);

        for (path, value) in ctx.list() {
            let template = format!("{{{{{path}}}}}");
            let out = processor.render(&template, &ctx).unwrap();
            assert_eq!(out.content, value.to_text(), "{path}");
        }
    }

    #[test]
    fn terraform_template_renders_end_to_end() {
        let ctx = VariableContext::build(&payload(), SourceKind::Blueprint);
        let helpers = HelperRegistry::builtin();
        let template = r#"{{!-- generated --}}
{{#each resources}}
resource "aws_instance" "{{name}}" {
  count = {{configuration.replicas|default:"1"}}
  tags  = { Project = "{{uppercase ../name}}" }
}
{{/each}}"#;

        let out = TemplateProcessor::new(&helpers).render(template, &ctx).unwrap();
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
        assert_eq!(
            out.content,
            "\n\nresource \"aws_instance\" \"web\" {\n  count = 2\n  tags  = { Project = \"SHOP\" }\n}\n\nresource \"aws_instance\" \"db\" {\n  count = 1\n  tags  = { Project = \"SHOP\" }\n}\n"
        );
    }
}
