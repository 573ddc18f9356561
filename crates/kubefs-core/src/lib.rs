//! Projection of a Kubernetes cluster into a virtual directory tree.
//!
//! The tree is resolved lazily, one name at a time, and nothing is cached:
//! every `list_children`/`resolve` performs its own discovery or list call
//! against the [`Cluster`] it was built with.
//!
//! ```text
//! by-gvk/
//!   v1/                        core group
//!     pods/
//!       default/               namespace
//!         nginx/
//!           yaml  json
//!     configmaps/
//!       default/
//!         settings/
//!           yaml  json  data/
//!   apps/
//!     deployments/...
//! ```

mod cancel;
mod cluster;
mod discovery;
mod error;
mod file;
pub mod kinds;
mod listing;
mod memory;
pub mod names;
mod node;
mod object;
mod registry;
mod root;
mod types;
mod walk;

pub use cancel::{CallContext, CancelSource, CancelToken};
pub use cluster::{Cluster, SharedCluster};
pub use discovery::{GroupVersionsDir, GroupsDir, ResourcesDir};
pub use error::{ClusterError, NodeError};
pub use file::FileNode;
pub use kinds::default_registry;
pub use listing::{ResourceDir, ResourceNamespacesDir};
pub use memory::MemoryCluster;
pub use node::{Attr, DirEntry, Env, Node, NodeKind};
pub use object::{render_json, render_yaml, ObjectDir, JSON_FILE, YAML_FILE};
pub use registry::{
    Constructor, KeyValueDir, MapDir, SpecializationRegistry, SpecializedDir, DATA_DIR,
};
pub use root::{Projection, ViewsDir, BY_GVK_VIEW};
pub use types::{GroupVersionKind, GroupVersionListing, ObjectRecord, ResourceDescriptor};
pub use walk::{split_path, walk};
