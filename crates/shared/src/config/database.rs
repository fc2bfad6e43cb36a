use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use tracing::info;

pub type ConnectionPool = Pool<Postgres>;

pub struct ConnectionManager;

impl ConnectionManager {
    pub async fn new_pool(
        connection_string: &str,
        max_connections: u32,
    ) -> anyhow::Result<ConnectionPool> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await
            .map_err(|err| anyhow::anyhow!("Failed to create database connection pool: {}", err))?;

        Ok(pool)
    }
}

pub async fn run_migrations(pool: &ConnectionPool) -> anyhow::Result<()> {
    info!("🗄️ Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
