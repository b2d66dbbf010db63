//! Sessions command - Session store maintenance.

use crate::cli::args::{SessionsAction, SessionsArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

/// Execute the sessions command
pub async fn execute(args: SessionsArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let services = Services::from_connection(db.get_connection(), &config);

    match args.action {
        SessionsAction::Prune => {
            let removed = services.auth().prune_expired_sessions().await?;
            println!("Removed {} expired session(s)", removed);
        }
    }

    Ok(())
}
