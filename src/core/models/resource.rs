//! Server-level RBAC administration models
//!
//! Roles and resources managed from the per-server dashboard. These are
//! distinct from team roles: they are free-form names stored by the backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role record from `GET /role`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

/// Envelope used by list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceAction {
    Create,
    Read,
    Update,
    Delete,
    List,
    Start,
    Stop,
    Restart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceActionPayload {
    pub action: ResourceAction,
    pub resource: String,
}

impl ResourceActionPayload {
    /// One payload entry per action of `resource`
    pub fn expand(resource: &str, actions: &[ResourceAction]) -> Vec<Self> {
        actions
            .iter()
            .map(|&action| Self {
                action,
                resource: resource.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceItem {
    pub id: String,
    pub resource: String,
    pub action: ResourceAction,
    #[serde(default)]
    pub role_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceResponse {
    pub resources: Vec<ResourceItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedResourceAction {
    pub id: String,
    pub action: ResourceAction,
    pub role_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedResource {
    pub resource: String,
    pub actions: Vec<GroupedResourceAction>,
}

/// Group flat resource/action rows by resource name, sorted by name
pub fn group_resources(items: &[ResourceItem]) -> Vec<GroupedResource> {
    let mut grouped: BTreeMap<&str, Vec<GroupedResourceAction>> = BTreeMap::new();

    for item in items {
        grouped
            .entry(item.resource.as_str())
            .or_default()
            .push(GroupedResourceAction {
                id: item.id.clone(),
                action: item.action,
                role_ids: item.role_ids.clone(),
            });
    }

    grouped
        .into_iter()
        .map(|(resource, actions)| GroupedResource {
            resource: resource.to_string(),
            actions,
        })
        .collect()
}
