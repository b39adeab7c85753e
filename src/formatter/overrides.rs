//! Per-entity overrides read from an analytics field.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::host::{FieldMapProvider, RequestContext};

/// Field type whose values carry entity overrides.
pub const ANALYTICS_FIELD_TYPE: &str = "adobe_analytics";

/// Inclusion flags and custom snippet from the entity being viewed.
///
/// Both flags are on when no entity supplies overrides. Once a field item is
/// read, a flag missing from it is off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOverride {
    #[serde(rename = "include_main_codesnippet", default, deserialize_with = "flag")]
    pub include_main_snippet: bool,
    #[serde(rename = "include_custom_variables", default, deserialize_with = "flag")]
    pub include_section_variables: bool,
    #[serde(rename = "codesnippet", default, deserialize_with = "snippet")]
    pub custom_snippet: String,
}

impl Default for EntityOverride {
    fn default() -> Self {
        Self {
            include_main_snippet: true,
            include_section_variables: true,
            custom_snippet: String::new(),
        }
    }
}

/// Stored field values may be booleans, numbers or strings.
///
/// Zero, `null` and the strings `""` and `"0"` are off. Every other string is
/// on, including `"false"`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|n| n != 0.0)),
        Value::String(s) => Ok(!matches!(s.as_str(), "" | "0")),
        Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!("expected a flag, found {other}"))),
    }
}

fn snippet<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read the overrides of the entity the current route resolved.
///
/// The first entity type in the field map for which the route exposes an
/// entity decides the result, even when its field is empty. Without such an
/// entity, or when its first field item cannot be read, the defaults apply.
#[must_use]
pub fn extract_entity_overrides(field_map: &dyn FieldMapProvider, request: &dyn RequestContext) -> EntityOverride {
    let map = field_map.field_map_for_field_type(ANALYTICS_FIELD_TYPE);

    let Some((entity, field_name)) = map.iter().find_map(|(entity_type, field_names)| {
        let entity = request.route_entity(entity_type)?;
        Some((entity, field_names.first()?.as_str()))
    }) else {
        return EntityOverride::default();
    };

    let Some(first) = entity.field_items(field_name).first().map(|item| (*item).clone()) else {
        return EntityOverride::default();
    };

    match serde_json::from_value::<EntityOverride>(first) {
        Ok(entity_override) => {
            tracing::debug!(
                entity_type = entity.entity_type.as_str(),
                id = entity.id.as_str(),
                field = field_name,
                "Entity overrides detected"
            );
            entity_override
        }
        Err(e) => {
            tracing::warn!(
                entity_type = entity.entity_type.as_str(),
                id = entity.id.as_str(),
                field = field_name,
                error = %e,
                "Ignoring unreadable analytics field"
            );
            EntityOverride::default()
        }
    }
}
