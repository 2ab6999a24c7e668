// Blocks until the configured database accepts connections, then exits 0.
// Exits non-zero only when no DATABASE_URL can be resolved.
// Meant to run before `server` in container start scripts.

use recipe_api::db::readiness::{DatabaseUrlProbe, TokioSleeper, wait_for_database};
use recipe_api::server::config::ServerConfig;
use recipe_api::server::logging::init_cli_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_cli_logging();

    let database_url = ServerConfig::load_database_url(None)?;

    // The gate logs its own progress to stdout.
    wait_for_database(&DatabaseUrlProbe::new(database_url), &TokioSleeper).await;
    Ok(())
}
