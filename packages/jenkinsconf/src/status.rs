//! Helpers for the `api/json` status snapshots of jobs, views and the server.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ConfError, Result};
use crate::registry::Resolver;

/// One entry of a `jobs` or `views` listing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EntityEntry {
    pub name: String,
    pub url: String,
    #[serde(rename = "_class", default)]
    pub class: Option<String>,
}

/// Read a string field of a snapshot.
pub fn string_field(status: &Value, field: &str, context: &str) -> Result<String> {
    status
        .get(field)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| ConfError::MissingField {
            field: field.to_string(),
            context: context.to_string(),
        })
}

/// Decode a listing such as `jobs` or `views`. A missing field is an empty
/// listing.
pub fn entries(status: &Value, field: &str) -> Result<Vec<EntityEntry>> {
    match status.get(field) {
        Some(list) => Ok(Vec::<EntityEntry>::deserialize(list)?),
        None => Ok(Vec::new()),
    }
}

/// Keep the entries whose `_class` has a registered handler, warning about
/// the rest.
pub fn supported_entries(
    entries: Vec<EntityEntry>,
    resolver: &Resolver,
    parent: &str,
) -> Vec<EntityEntry> {
    entries
        .into_iter()
        .filter(|entry| {
            let class = entry.class.as_deref().unwrap_or_default();
            if resolver.registry().contains(class) {
                return true;
            }
            tracing::warn!(
                identifier = class,
                name = %entry.name,
                parent,
                "Skipping unsupported plugin"
            );
            false
        })
        .collect()
}
