use crate::session::Session;

pub async fn run(session: &Session, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let node = session.lookup(path).await?;
    let attr = node.stat();
    let name = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or("/");

    println!("Path:     {}", path);
    println!("Name:     {}", name);
    println!("Type:     {}", if attr.is_dir() { "directory" } else { "file" });
    println!("Node:     {}", node.type_name());

    if !attr.is_dir() {
        println!("Size:     {} bytes", attr.size);
    }

    Ok(())
}
