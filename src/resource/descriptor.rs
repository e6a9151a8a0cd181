//! Resource descriptors handed to the import stage

use super::registry::{ResourceKind, ADDITIONAL_FIELDS, ALLOW_EMPTY_VALUES, PROVIDER_NAME};
use serde::Serialize;
use std::collections::BTreeMap;

/// One discovered cloud resource, normalized for import
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    /// Short local name (last path segment of `id`)
    pub resource_name: String,
    /// Fully-qualified remote identifier
    pub id: String,
    pub resource_type: ResourceKind,
    pub provider: String,
    /// Import attributes: `name`, `project`, `location`
    pub attributes: BTreeMap<String, String>,
    pub allow_empty_values: Vec<String>,
    pub additional_fields: BTreeMap<String, String>,
}

impl ResourceDescriptor {
    /// Build a descriptor for a remote object named `full_name`
    pub fn new(kind: ResourceKind, full_name: &str, project: &str, location: &str) -> Self {
        let name = local_name(full_name);

        let attributes = BTreeMap::from([
            ("name".to_string(), name.to_string()),
            ("project".to_string(), project.to_string()),
            ("location".to_string(), location.to_string()),
        ]);

        Self {
            resource_name: name.to_string(),
            id: full_name.to_string(),
            resource_type: kind,
            provider: PROVIDER_NAME.to_string(),
            attributes,
            allow_empty_values: ALLOW_EMPTY_VALUES.iter().map(|s| s.to_string()).collect(),
            additional_fields: ADDITIONAL_FIELDS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Last `/`-separated segment of a resource name
///
/// e.g., "projects/acme/locations/us-central1/services/web" -> "web".
/// A name without `/` is returned unchanged.
pub fn local_name(full_name: &str) -> &str {
    full_name.rsplit('/').next().unwrap_or(full_name)
}
