use tracing::info;

use super::core::Database;
use crate::TARGET_DB;

impl Database {
    pub(crate) async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.pool().acquire().await?;
        sqlx::query(
            r#"
            -- One row per stored day, even when no language passed the threshold
            CREATE TABLE IF NOT EXISTS snapshots (
                day_id INTEGER PRIMARY KEY,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS snapshot_scores (
                day_id INTEGER NOT NULL,
                language TEXT NOT NULL,
                popularity REAL NOT NULL,
                PRIMARY KEY (day_id, language),
                FOREIGN KEY (day_id) REFERENCES snapshots (day_id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_snapshot_scores_language ON snapshot_scores (language);
            "#,
        )
        .execute(&mut *conn)
        .await?;

        info!(target: TARGET_DB, "Database schema initialized");
        Ok(())
    }
}
