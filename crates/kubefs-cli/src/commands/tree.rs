use kubefs_core::NodeKind;
use tracing::warn;

use crate::session::{child_path, Session};

pub async fn run(
    session: &Session,
    path: Option<String>,
    max_depth: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.as_deref().unwrap_or("/");
    let max_depth = max_depth.unwrap_or(usize::MAX);

    // The starting point itself must resolve
    session.lookup(path).await?;

    println!("{}", path);
    print_tree(session, path, "", 0, max_depth).await?;

    Ok(())
}

#[async_recursion::async_recursion]
async fn print_tree(
    session: &Session,
    path: &str,
    prefix: &str,
    depth: usize,
    max_depth: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if depth >= max_depth {
        return Ok(());
    }

    // Re-walk from the root so each level sees the cluster as it is now
    let entries = match session.lookup(path).await {
        Ok(node) => match session.children(&node).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path, error = %e, "skipping unlistable directory");
                return Ok(());
            }
        },
        Err(e) => {
            warn!(path, error = %e, "skipping vanished directory");
            return Ok(());
        }
    };

    let count = entries.len();
    for (i, entry) in entries.iter().enumerate() {
        let is_last_entry = i == count - 1;
        let connector = if is_last_entry { "└── " } else { "├── " };

        println!("{}{}{}", prefix, connector, entry.name);

        if entry.kind == NodeKind::Directory {
            let new_prefix = format!("{}{}", prefix, if is_last_entry { "    " } else { "│   " });
            print_tree(
                session,
                &child_path(path, &entry.name),
                &new_prefix,
                depth + 1,
                max_depth,
            )
            .await?;
        }
    }

    Ok(())
}
