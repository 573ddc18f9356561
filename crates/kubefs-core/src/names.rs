//! Name helpers shared by every directory level.
//!
//! The group label rules live here and nowhere else: the core group (empty
//! group, version `v1`) is labelled by its version, so it surfaces as `v1`
//! next to named groups like `apps` or `batch`.

use indexmap::IndexSet;

/// Version string of the built-in core group.
pub const CORE_VERSION: &str = "v1";

/// Remove duplicates, keeping the first occurrence of each name.
pub fn dedup<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(Into::into)
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

/// Split an `apiVersion` string into `(group, version)`.
///
/// `"apps/v1"` gives `("apps", "v1")`; a bare `"v1"` gives `("", "v1")`.
pub fn split_group_version(group_version: &str) -> (&str, &str) {
    match group_version.split_once('/') {
        Some((group, rest)) => {
            let version = rest.split_once('/').map_or(rest, |(v, _)| v);
            (group, version)
        }
        None => ("", group_version),
    }
}

/// Join a group and version back into an `apiVersion` string.
pub fn join_group_version(group: &str, version: &str) -> String {
    if group.is_empty() {
        version.to_string()
    } else {
        format!("{}/{}", group, version)
    }
}

/// Directory label for a group: the group itself, or the version for the
/// unnamed core group.
pub fn group_label<'a>(group: &'a str, version: &'a str) -> &'a str {
    if group.is_empty() {
        version
    } else {
        group
    }
}

/// True for the built-in core group/version.
pub fn is_core_group(group: &str, version: &str) -> bool {
    group.is_empty() && version == CORE_VERSION
}

/// Whether the group/version pair is reachable under the directory `name`.
///
/// A pair matches when its label equals `name`; the core group is also always
/// reachable as `v1`, even when a custom group happens to share that name.
pub fn matches_group(name: &str, group: &str, version: &str) -> bool {
    group_label(group, version) == name || (name == CORE_VERSION && is_core_group(group, version))
}

/// Subresources (`pods/log`, `deployments/scale`) carry a `/` in their name.
pub fn is_subresource(resource_name: &str) -> bool {
    resource_name.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let names = dedup(["batch", "apps", "batch", "v1", "apps"]);
        assert_eq!(names, vec!["batch", "apps", "v1"]);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(dedup(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_split_group_version() {
        assert_eq!(split_group_version("apps/v1"), ("apps", "v1"));
        assert_eq!(split_group_version("v1"), ("", "v1"));
        assert_eq!(split_group_version("/v1"), ("", "v1"));
        assert_eq!(
            split_group_version("rbac.authorization.k8s.io/v1beta1"),
            ("rbac.authorization.k8s.io", "v1beta1")
        );
        assert_eq!(split_group_version("a/b/c"), ("a", "b"));
        assert_eq!(split_group_version(""), ("", ""));
    }

    #[test]
    fn test_join_group_version() {
        assert_eq!(join_group_version("", "v1"), "v1");
        assert_eq!(join_group_version("apps", "v1"), "apps/v1");
    }

    #[test]
    fn test_group_label() {
        assert_eq!(group_label("apps", "v1"), "apps");
        assert_eq!(group_label("", "v1"), "v1");
    }

    #[test]
    fn test_group_labels_dedup() {
        let labels = dedup(
            ["apps/v1", "batch/v1", "/v1", "apps/v1beta1"]
                .iter()
                .map(|gv| {
                    let (g, v) = split_group_version(gv);
                    group_label(g, v).to_string()
                }),
        );
        assert_eq!(labels, vec!["apps", "batch", "v1"]);
    }

    #[test]
    fn test_matches_group() {
        assert!(matches_group("apps", "apps", "v1"));
        assert!(!matches_group("apps", "batch", "v1"));
        assert!(matches_group("v1", "", "v1"));
        // A custom group literally named "v1" also matches
        assert!(matches_group("v1", "v1", "v2"));
        assert!(!matches_group("v1", "apps", "v1"));
    }

    #[test]
    fn test_is_subresource() {
        assert!(is_subresource("pods/log"));
        assert!(is_subresource("deployments/scale"));
        assert!(!is_subresource("pods"));
    }
}
