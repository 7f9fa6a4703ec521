//! The template language.
//!
//! ```text
//! {{path}}                          value at path (containers as canonical JSON)
//! {{list[0].field}}                 index access
//! {{path|default:"3"}}              fallback when absent or null
//! {{#if path}}..{{else}}..{{/if}}   truthiness test ({{#unless}} negates)
//! {{#each list}}..{{/each}}         iteration: this, @index, @first, @last, @key
//! {{!-- comment --}}                removed
//! \{{literal}}                      emitted verbatim
//! {{uppercase name}}  {{name|replace:"-","_"}}   helpers
//! ```
//!
//! Text outside tags is copied byte for byte.

mod eval;
mod expr;
pub mod helpers;
mod lexer;
mod parser;

pub use helpers::{Helper, HelperFn, HelperRegistry};

use crate::domain::{context::VariableContext, entities::TemplateError};

/// A successful render plus anything worth warning about.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub content: String,
    /// Unresolved paths tolerated in non-strict mode.
    pub warnings: Vec<TemplateError>,
}

/// Renders template text against a context using a borrowed helper table.
#[derive(Debug, Clone, Copy)]
pub struct TemplateProcessor<'h> {
    helpers: &'h HelperRegistry,
    strict: bool,
}

impl<'h> TemplateProcessor<'h> {
    pub fn new(helpers: &'h HelperRegistry) -> Self {
        Self {
            helpers,
            strict: false,
        }
    }

    /// In strict mode an unresolved path fails the file instead of rendering empty.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Render `template`. Every diagnostic in the file is collected before
    /// returning; syntax errors always fail.
    pub fn render(
        &self,
        template: &str,
        ctx: &VariableContext,
    ) -> Result<Rendered, Vec<TemplateError>> {
        let tokens = lexer::tokenize(template).map_err(|e| vec![e])?;
        let nodes = parser::parse(tokens, self.helpers)?;

        let mut renderer = eval::Renderer::new(ctx, self.helpers, self.strict);
        renderer.render(&nodes);
        let (content, warnings, errors) = renderer.finish();

        if errors.is_empty() {
            Ok(Rendered { content, warnings })
        } else {
            Err(errors)
        }
    }
}

/// One-shot render with the given helper table.
pub fn render(
    template: &str,
    ctx: &VariableContext,
    strict: bool,
    helpers: &HelperRegistry,
) -> Result<Rendered, Vec<TemplateError>> {
    TemplateProcessor::new(helpers).strict(strict).render(template, ctx)
}
