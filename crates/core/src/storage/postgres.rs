use crate::storage::BlobStore;
use anyhow::Context;

#[derive(Debug, Clone)]
pub struct PgBlobStore {
    pool: sqlx::PgPool,
}

impl PgBlobStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BlobStore for PgBlobStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM history_blobs WHERE key = $1")
                .persistent(false)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("select history_blobs failed (key={key})"))?;
        Ok(row.map(|(payload,)| payload))
    }

    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO history_blobs (key, payload, updated_at) \
             VALUES ($1, $2, now()) \
             ON CONFLICT (key) DO UPDATE \
               SET payload = EXCLUDED.payload, updated_at = EXCLUDED.updated_at",
        )
        .persistent(false)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("upsert history_blobs failed (key={key})"))?;
        Ok(())
    }
}
