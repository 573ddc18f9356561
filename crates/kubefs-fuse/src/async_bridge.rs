//! Runtime the synchronous FUSE callbacks block on.
//!
//! `fuser` invokes callbacks on its own session thread, while every node
//! operation is async. One process-wide multi-thread runtime serves them all.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Runtime};

use crate::error::{FuseError, FuseResult};

/// Build outcome is kept so a failed build is reported, not retried.
static RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();

fn build() -> Result<Runtime, String> {
    Builder::new_multi_thread()
        .worker_threads(4)
        .thread_name("kubefs-fuse-worker")
        .enable_all()
        .build()
        .map_err(|e| format!("cannot build FUSE runtime: {}", e))
}

/// Build the runtime on first call; later calls return the same one.
pub fn init_runtime() -> FuseResult<&'static Runtime> {
    RUNTIME
        .get_or_init(build)
        .as_ref()
        .map_err(|e| FuseError::Runtime(e.clone()))
}

/// The runtime, if `init_runtime` has succeeded.
pub fn runtime() -> FuseResult<&'static Runtime> {
    match RUNTIME.get() {
        Some(built) => built.as_ref().map_err(|e| FuseError::Runtime(e.clone())),
        None => Err(FuseError::Runtime("FUSE runtime not initialized".to_string())),
    }
}

/// Drive `future` to completion from a callback thread.
///
/// Must not be called from a thread that is already inside a tokio runtime.
pub fn block_on<F: Future>(future: F) -> FuseResult<F::Output> {
    Ok(runtime()?.block_on(future))
}
