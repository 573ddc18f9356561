//! Kubernetes API server client for kubefs.
//!
//! [`KubeClient`] implements [`kubefs_core::Cluster`] over HTTPS using the
//! credentials of a kubeconfig context.

mod client;
pub mod discovery;
mod error;
pub mod kubeconfig;

pub use client::{collection_path, group_version_path, status_error, KubeClient};
pub use error::KubeconfigError;
pub use kubeconfig::{ClusterConfig, Credentials, Kubeconfig};
