//! Assembly of the final tracking text.

use std::fmt::Write as _;

use crate::host::TokenData;
use crate::tokens::TokenResolver;
use crate::variables::{Section, VariableMap, VariableSet};

use super::EntityOverride;

/// Joins rendered sections and snippets in emission order:
///
/// 1. header variables
/// 2. the main code snippet
/// 3. `variables` section variables
/// 4. footer variables
/// 5. the entity's custom snippet
///
/// Variables are written as `name="value";` lines. Snippets are token-resolved
/// and followed by a newline.
pub struct SnippetComposer<'a> {
    resolver: TokenResolver<'a>,
    context: &'a TokenData,
}

impl<'a> SnippetComposer<'a> {
    pub fn new(resolver: TokenResolver<'a>, context: &'a TokenData) -> Self {
        Self {
            resolver,
            context,
        }
    }

    /// Compose an already-rendered set. Variable values are written as they are.
    #[must_use]
    pub fn compose(&self, rendered: &VariableSet, entity_override: &EntityOverride) -> String {
        let mut output = String::new();
        let include_variables = entity_override.include_section_variables;

        if include_variables {
            write_section(&mut output, rendered.section(Section::Header));
        }

        if entity_override.include_main_snippet {
            output.push_str(&self.format_snippet(rendered.code_snippet()));
        }

        if include_variables {
            write_section(&mut output, rendered.section(Section::Variables));
            write_section(&mut output, rendered.section(Section::Footer));
        }

        if !entity_override.custom_snippet.is_empty() {
            output.push_str(&self.format_snippet(&entity_override.custom_snippet));
        }

        output
    }

    fn format_snippet(&self, raw: &str) -> String {
        let mut snippet = self.resolver.resolve(raw, self.context);
        snippet.push('\n');
        snippet
    }
}

/// Append `name="value";` lines for every variable of a section.
fn write_section(output: &mut String, variables: Option<&VariableMap>) {
    let Some(variables) = variables else {
        return;
    };
    for (name, value) in variables.iter() {
        let _ = writeln!(output, "{name}=\"{}\";", value.collapse());
    }
}
