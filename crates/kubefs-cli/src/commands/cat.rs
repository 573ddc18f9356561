use std::io::Write;

use crate::session::Session;

pub async fn run(session: &Session, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let file = session.lookup(path).await?.into_file()?;

    // Secret values may be binary; write them through untouched
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(file.contents())?;
    stdout.flush()?;

    Ok(())
}
