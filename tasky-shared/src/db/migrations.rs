/// Embedded database migrations
///
/// The SQL files under `tasky-shared/migrations/` are compiled into the
/// binary, so a deployed server needs no migration files on disk.

use sqlx::{migrate::Migrator, postgres::PgPool};
use tracing::{info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies every migration that has not run yet
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!(
        known_migrations = MIGRATOR.iter().count(),
        "Running database migrations"
    );

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
