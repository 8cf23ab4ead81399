use anyhow::{bail, Context, Result};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use stateset_line_items::config::{init_tracing, load_config};
use stateset_line_items::db::{self, DbConfig};
use stateset_line_items::migrator::Migrator;

/// Applies (`up`, the default) or rolls back (`down`) the line item schema
/// against the configured database.
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(&config.log_level, config.log_json);

    let direction = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());

    info!(environment = %config.environment, "Starting database migration");
    let pool = db::establish_connection_with_config(&DbConfig::from(&config))
        .await
        .context("failed to connect to database")?;

    match direction.as_str() {
        "up" => db::run_migrations(&pool).await?,
        "down" => {
            Migrator::down(&pool, None)
                .await
                .context("failed to roll back migrations")?;
            info!("All migrations rolled back");
        }
        other => bail!("unknown migration direction '{}', expected 'up' or 'down'", other),
    }

    info!("Migration completed successfully");
    Ok(())
}
