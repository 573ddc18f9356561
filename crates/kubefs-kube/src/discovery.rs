//! Discovery documents and the preferred-resources merge.

use std::collections::HashSet;

use serde::Deserialize;

use kubefs_core::names::{dedup, join_group_version};
use kubefs_core::{GroupVersionListing, ResourceDescriptor};

/// `GET /api`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiVersions {
    #[serde(default)]
    pub versions: Vec<String>,
}

/// `GET /apis`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiGroupList {
    #[serde(default)]
    pub groups: Vec<ApiGroup>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroup {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<GroupVersionForDiscovery>,
    #[serde(default)]
    pub preferred_version: Option<GroupVersionForDiscovery>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupVersionForDiscovery {
    pub group_version: String,
    pub version: String,
}

/// `GET /api/<v>` or `GET /apis/<group>/<v>`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceList {
    pub group_version: String,
    #[serde(default)]
    pub resources: Vec<ApiResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiResource {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub namespaced: bool,
}

impl ApiResource {
    pub fn is_subresource(&self) -> bool {
        kubefs_core::names::is_subresource(&self.name)
    }
}

impl ApiGroup {
    /// Versions in preference order: the preferred version first, then the
    /// rest in server order.
    pub fn versions_by_preference(&self) -> Vec<String> {
        let preferred = self.preferred_version.iter().map(|v| v.version.clone());
        let rest = self.versions.iter().map(|v| v.version.clone());
        dedup(preferred.chain(rest))
    }

    pub fn group_versions(&self) -> Vec<String> {
        self.versions_by_preference()
            .iter()
            .map(|v| join_group_version(&self.name, v))
            .collect()
    }
}

/// One group's resource lists, ordered by version preference.
#[derive(Debug, Clone)]
pub struct GroupResources {
    pub group: String,
    pub lists: Vec<ApiResourceList>,
}

/// Merge per-version resource lists into preferred listings.
///
/// Within a group each resource name is reported only under the first
/// (most preferred) version that serves it. Group/versions left without any
/// resource are dropped. Group order and server order within a list are kept.
pub fn preferred_listings(groups: Vec<GroupResources>) -> Vec<GroupVersionListing> {
    let mut listings = Vec::new();
    for group in groups {
        let mut seen: HashSet<String> = HashSet::new();
        for list in group.lists {
            let resources: Vec<ResourceDescriptor> = list
                .resources
                .into_iter()
                .filter(|r| seen.insert(r.name.clone()))
                .map(|r| ResourceDescriptor::new(r.name, r.kind, r.namespaced))
                .collect();
            if !resources.is_empty() {
                listings.push(GroupVersionListing::new(list.group_version, resources));
            }
        }
    }
    listings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(gv: &str, names: &[(&str, &str, bool)]) -> ApiResourceList {
        ApiResourceList {
            group_version: gv.to_string(),
            resources: names
                .iter()
                .map(|(n, k, ns)| ApiResource {
                    name: n.to_string(),
                    kind: k.to_string(),
                    namespaced: *ns,
                })
                .collect(),
        }
    }

    #[test]
    fn test_versions_by_preference() {
        let group: ApiGroup = serde_json::from_str(
            r#"{
                "name": "autoscaling",
                "versions": [
                    {"groupVersion": "autoscaling/v1", "version": "v1"},
                    {"groupVersion": "autoscaling/v2", "version": "v2"}
                ],
                "preferredVersion": {"groupVersion": "autoscaling/v2", "version": "v2"}
            }"#,
        )
        .unwrap();
        assert_eq!(group.versions_by_preference(), vec!["v2", "v1"]);
        assert_eq!(group.group_versions(), vec!["autoscaling/v2", "autoscaling/v1"]);
    }

    #[test]
    fn test_resource_reported_under_first_version_only() {
        let merged = preferred_listings(vec![GroupResources {
            group: "autoscaling".to_string(),
            lists: vec![
                list(
                    "autoscaling/v2",
                    &[("horizontalpodautoscalers", "HorizontalPodAutoscaler", true)],
                ),
                list(
                    "autoscaling/v1",
                    &[
                        ("horizontalpodautoscalers", "HorizontalPodAutoscaler", true),
                        ("horizontalpodautoscalers/status", "HorizontalPodAutoscaler", true),
                    ],
                ),
            ],
        }]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].group_version, "autoscaling/v2");
        assert_eq!(merged[0].resources[0].name, "horizontalpodautoscalers");
        assert_eq!(merged[1].group_version, "autoscaling/v1");
        assert_eq!(merged[1].resources.len(), 1);
        assert!(merged[1].resources[0].is_subresource());
    }

    #[test]
    fn test_empty_versions_dropped() {
        let merged = preferred_listings(vec![
            GroupResources {
                group: String::new(),
                lists: vec![list("v1", &[("pods", "Pod", true)])],
            },
            GroupResources {
                group: "metrics.k8s.io".to_string(),
                lists: vec![list("metrics.k8s.io/v1beta1", &[])],
            },
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].label(), "v1");
    }

    #[test]
    fn test_parse_resource_list() {
        let parsed: ApiResourceList = serde_json::from_str(
            r#"{
                "kind": "APIResourceList",
                "groupVersion": "v1",
                "resources": [
                    {"name": "pods", "singularName": "", "namespaced": true, "kind": "Pod", "verbs": ["get", "list"]},
                    {"name": "pods/log", "namespaced": true, "kind": "Pod"},
                    {"name": "nodes", "namespaced": false, "kind": "Node"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.resources.len(), 3);
        assert!(parsed.resources[1].is_subresource());
        assert!(!parsed.resources[2].namespaced);
    }
}
