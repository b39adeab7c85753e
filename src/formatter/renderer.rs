//! Token-resolved copies of variable sections.

use std::collections::BTreeMap;

use crate::host::TokenData;
use crate::tokens::{TokenResolver, escape_html_no_quotes};
use crate::variables::{VariableMap, VariableSet};

/// Renders every variable of a set through a [`TokenResolver`].
pub struct VariableRenderer<'a> {
    resolver: TokenResolver<'a>,
    context: &'a TokenData,
}

impl<'a> VariableRenderer<'a> {
    pub fn new(resolver: TokenResolver<'a>, context: &'a TokenData) -> Self {
        Self {
            resolver,
            context,
        }
    }

    /// Render one section.
    ///
    /// Multi-valued entries collapse to their last candidate, names are escaped
    /// without touching quotes, and values are token-resolved. Entries whose
    /// resolved value is blank after trimming are dropped; `"0"` is kept.
    #[must_use]
    pub fn render_section(&self, variables: &VariableMap) -> VariableMap {
        let mut rendered = VariableMap::new();
        for (name, value) in variables.iter() {
            let resolved = self.resolver.resolve(value.collapse(), self.context);
            rendered.insert(escape_html_no_quotes(name), resolved);
        }

        rendered.retain(|name, value| {
            let keep = !value.collapse().trim().is_empty();
            if !keep {
                tracing::debug!(variable = name, "Dropping variable with an empty value");
            }
            keep
        });
        rendered
    }

    /// A new set with every section rendered; the source is left untouched.
    #[must_use]
    pub fn render(&self, source: &VariableSet) -> VariableSet {
        let sections: BTreeMap<_, _> = source
            .sections()
            .iter()
            .map(|(section, variables)| (*section, self.render_section(variables)))
            .collect();
        source.with_sections(sections)
    }
}
