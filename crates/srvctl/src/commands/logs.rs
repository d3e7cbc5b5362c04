//! Show or follow server log files

use anyhow::Result;
use backend_connection::logs;

/// Tail the given paths inside the target, following when asked to.
pub async fn run(backend: &str, paths: Vec<String>, follow: bool) -> Result<i32> {
    let mut cnx = super::connect(backend)?;
    let status = logs::tail(&mut cnx, &paths, follow).await?;
    Ok(status.propagation_code())
}
