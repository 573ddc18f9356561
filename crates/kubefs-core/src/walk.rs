use crate::cancel::CallContext;
use crate::error::NodeError;
use crate::node::Node;

/// Split a slash path into segments.
///
/// Empty segments and `.` are skipped. `..` is not supported and yields
/// `NotFound`.
pub fn split_path(path: &str) -> Result<Vec<&str>, NodeError> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(NodeError::NotFound(path.to_string())),
            s => segments.push(s),
        }
    }
    Ok(segments)
}

/// Resolve `segments` one at a time starting from `root`.
///
/// Each step may fetch from the cluster; the first failure stops the walk.
pub async fn walk<S: AsRef<str>>(
    root: Node,
    segments: &[S],
    cx: &CallContext,
) -> Result<Node, NodeError> {
    let mut node = root;
    for segment in segments {
        node = node.resolve(segment.as_ref(), cx).await?;
    }
    Ok(node)
}
