//! Discovery levels of the tree: groups, versions, resource kinds.
//!
//! ```text
//! <groups>/                 one entry per group label (core group as "v1")
//!   apps/                   single group/version: straight to its kinds
//!     deployments/
//!   example.com/            several group/versions share the label
//!     v1alpha1/
//!       widgets/
//! ```

use tracing::debug;

use crate::cancel::CallContext;
use crate::error::NodeError;
use crate::listing::{ResourceDir, ResourceNamespacesDir};
use crate::names;
use crate::node::{DirEntry, Env, Node};
use crate::types::{GroupVersionKind, GroupVersionListing};

/// Every API group the server reports, keyed by label.
#[derive(Debug, Clone)]
pub struct GroupsDir {
    env: Env,
}

impl GroupsDir {
    pub fn new(env: Env) -> Self {
        GroupsDir { env }
    }

    async fn fetch(&self, cx: &CallContext) -> Result<Vec<GroupVersionListing>, NodeError> {
        cx.run("discovery", self.env.cluster.preferred_resources())
            .await
    }

    pub async fn list_children(&self, cx: &CallContext) -> Result<Vec<DirEntry>, NodeError> {
        let listings = self.fetch(cx).await?;
        let labels = names::dedup(listings.iter().map(|l| l.label()));
        debug!(entries = ?labels, "readdir on groups dir");
        Ok(DirEntry::dirs(labels))
    }

    pub async fn resolve(&self, name: &str, cx: &CallContext) -> Result<Node, NodeError> {
        let listings = self.fetch(cx).await?;
        let mut matches: Vec<GroupVersionListing> = listings
            .into_iter()
            .filter(|l| names::matches_group(name, l.group(), l.version()))
            .collect();

        debug!(name, matches = matches.len(), "lookup on groups dir");
        match matches.len() {
            0 => Err(NodeError::NotFound(name.to_string())),
            1 => {
                let listing = matches.remove(0);
                Ok(Node::Resources(ResourcesDir::new(self.env.clone(), listing)))
            }
            _ => Ok(Node::GroupVersions(GroupVersionsDir::new(
                self.env.clone(),
                matches,
            ))),
        }
    }
}

/// Versions of one group label. Works only from the candidates captured when
/// it was resolved; never re-fetches discovery.
#[derive(Debug, Clone)]
pub struct GroupVersionsDir {
    env: Env,
    candidates: Vec<GroupVersionListing>,
}

impl GroupVersionsDir {
    /// Candidates without any resource kinds are dropped here.
    pub fn new(env: Env, candidates: Vec<GroupVersionListing>) -> Self {
        let candidates = candidates.into_iter().filter(|l| l.has_kinds()).collect();
        GroupVersionsDir { env, candidates }
    }

    pub fn list_children(&self) -> Vec<DirEntry> {
        let versions = names::dedup(self.candidates.iter().map(|l| l.version()));
        debug!(entries = ?versions, "readdir on group versions dir");
        DirEntry::dirs(versions)
    }

    pub fn resolve(&self, version: &str) -> Result<Node, NodeError> {
        let listing = self
            .candidates
            .iter()
            .find(|l| l.version() == version)
            .ok_or_else(|| NodeError::NotFound(version.to_string()))?;
        Ok(Node::Resources(ResourcesDir::new(
            self.env.clone(),
            listing.clone(),
        )))
    }
}

/// Resource kinds of a single group/version.
#[derive(Debug, Clone)]
pub struct ResourcesDir {
    env: Env,
    listing: GroupVersionListing,
}

impl ResourcesDir {
    pub fn new(env: Env, listing: GroupVersionListing) -> Self {
        ResourcesDir { env, listing }
    }

    pub fn group_version(&self) -> &str {
        &self.listing.group_version
    }

    pub fn list_children(&self) -> Vec<DirEntry> {
        let kinds = names::dedup(self.listing.kinds().map(|r| r.name.as_str()));
        debug!(group_version = %self.listing.group_version, entries = ?kinds, "readdir on resources dir");
        DirEntry::dirs(kinds)
    }

    /// Fetch the live listing for `name` and hand it to the listing levels.
    pub async fn resolve(&self, name: &str, cx: &CallContext) -> Result<Node, NodeError> {
        let descriptor = self
            .listing
            .kinds()
            .find(|r| r.name == name)
            .ok_or_else(|| NodeError::NotFound(name.to_string()))?;

        let gvk = GroupVersionKind::new(
            self.listing.group(),
            self.listing.version(),
            descriptor.kind.clone(),
        );
        let records = cx.run("list", self.env.cluster.list(&gvk, None)).await?;
        debug!(%gvk, items = records.len(), namespaced = descriptor.namespaced, "listed resource");

        if descriptor.namespaced {
            Ok(Node::ResourceNamespaces(ResourceNamespacesDir::new(
                self.env.clone(),
                gvk,
                records,
            )))
        } else {
            Ok(Node::Resource(ResourceDir::new(
                self.env.clone(),
                gvk,
                records.into(),
                String::new(),
            )))
        }
    }
}
