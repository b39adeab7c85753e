//! A minimal token engine reading entity fields.
//!
//! Supports `[type:field]` and nested `[type:field:key]` placeholders. Field
//! lists resolve to their first item, and an item object resolves to its
//! `value` key unless a further key is named.

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

use crate::host::{Entity, TokenData, TokenOptions, TokenReplacer};

use super::{escape_html, normalize_token_type};

static TOKEN_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[([^\s\[\]:]+):([^\s\[\]]+)\]").ok());

/// [`TokenReplacer`] backed by the fields of the entities in [`TokenData`].
///
/// ```rust
/// use analytics_snippet::host::{Entity, TokenData, TokenOptions, TokenReplacer};
/// use analytics_snippet::tokens::EntityTokenReplacer;
///
/// let mut data = TokenData::new();
/// data.insert("node", Entity::new("node", "1").with_field("title", "Fish & Chips"));
///
/// let replacer = EntityTokenReplacer::new();
/// let text = replacer.replace("[node:title] [node:missing]", &data, TokenOptions::RENDER);
/// assert_eq!(text, "Fish &amp; Chips ");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityTokenReplacer;

impl EntityTokenReplacer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TokenReplacer for EntityTokenReplacer {
    fn replace(&self, text: &str, data: &TokenData, options: TokenOptions) -> String {
        let Some(pattern) = TOKEN_PATTERN.as_ref() else {
            return text.to_string();
        };

        pattern
            .replace_all(text, |caps: &Captures<'_>| {
                let token_type = &caps[1];
                let entity = data.get(token_type).or_else(|| data.get(normalize_token_type(token_type)));
                match entity.and_then(|entity| entity_token_value(entity, &caps[2])) {
                    Some(value) if options.sanitize => escape_html(&value),
                    Some(value) => value,
                    None if options.clear => String::new(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

fn entity_token_value(entity: &Entity, path: &str) -> Option<String> {
    let mut keys = path.split(':');
    let field = keys.next()?;
    let rest: Vec<&str> = keys.collect();

    match entity.field(field) {
        Some(value) => value_at(value, &rest),
        None if rest.is_empty() && field == "id" => Some(entity.id.clone()),
        None if rest.is_empty() && field == "type" => Some(entity.entity_type.clone()),
        None => None,
    }
}

fn value_at(value: &Value, keys: &[&str]) -> Option<String> {
    match (value, keys.split_first()) {
        (Value::Array(items), _) => value_at(items.first()?, keys),
        (Value::Object(map), Some((key, rest))) => value_at(map.get(*key)?, rest),
        (Value::Object(map), None) => value_at(map.get("value")?, &[]),
        (_, Some(_)) => None,
        (Value::String(s), None) => Some(s.clone()),
        (Value::Number(n), None) => Some(n.to_string()),
        (Value::Bool(b), None) => Some(if *b { "1".to_string() } else { "0".to_string() }),
        (Value::Null, None) => None,
    }
}
