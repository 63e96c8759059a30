pub mod file;
pub mod memory;
pub mod postgres;

use crate::config::Settings;
use anyhow::Context;
use std::sync::Arc;

/// Named string blobs, each replaced wholesale on `put`.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

/// Postgres when `DATABASE_URL` is set, otherwise files under `HISTORY_DIR`.
pub async fn open_blob_store(settings: &Settings) -> anyhow::Result<Arc<dyn BlobStore>> {
    if let Ok(db_url) = settings.require_database_url() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
            .context("connect DATABASE_URL failed")?;
        migrate(&pool).await?;
        return Ok(Arc::new(postgres::PgBlobStore::new(pool)));
    }

    Ok(Arc::new(file::FileBlobStore::new(settings.history_dir())))
}
