use kubefs_core::NodeKind;

use crate::session::Session;

pub async fn run(session: &Session, path: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.as_deref().unwrap_or("/");

    let node = session.lookup(path).await?;
    let entries = session.children(&node).await?;

    if entries.is_empty() {
        println!("(empty)");
        return Ok(());
    }

    for entry in entries {
        let (type_indicator, size) = match entry.kind {
            NodeKind::Directory => ("d", "-".to_string()),
            NodeKind::File => {
                // Files only live under objects, so resolving them is local
                let size = session.child(&node, &entry.name).await?.stat().size;
                ("-", format_size(size))
            }
        };

        println!("{} {:>8}  {}", type_indicator, size, entry.name);
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1}M", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{}B", bytes)
    }
}
