use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use stockroom_api::{config, db, migrator::Migrator};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    info!("Starting database migration");

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to database")?;

    let pending = Migrator::get_pending_migrations(&pool)
        .await
        .context("failed to inspect migration state")?;
    info!(pending = pending.len(), "Applying pending migrations");

    db::run_migrations(&pool)
        .await
        .context("failed to apply migrations")?;

    info!("Migration completed successfully");
    Ok(())
}
