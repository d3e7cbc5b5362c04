//! Copy files to and from the server container

use anyhow::{Context, Result};

/// Copy `src` to `dst`, one of which carries the `server:` prefix.
pub async fn run(backend: &str, src: &str, dst: &str, user: &str, group: &str) -> Result<i32> {
    let mut cnx = super::connect(backend)?;
    cnx.copy(src, dst, user, group)
        .await
        .with_context(|| format!("Failed to copy {src} to {dst}"))?;
    Ok(0)
}
