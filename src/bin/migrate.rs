//! Schema migration runner
//!
//! Creates the `users` table and exits. A failure yields a non-zero exit code.

use anyhow::Context;
use tracing::info;

use crud_users::infrastructure::database::{run_migrations, DatabaseManager, MySqlUserRepository};
use crud_users::infrastructure::logger::Logger;
use crud_users::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    Logger::init(&config.logging.level);

    info!(
        "connecting to {}:{}/{}",
        config.database.host, config.database.port, config.database.name
    );
    let database = DatabaseManager::new(&config.database);
    let repository = MySqlUserRepository::new(database.get_pool().clone());

    let result = run_migrations(&repository).await;
    database.get_pool().close().await;

    result.context("migration failed")
}
