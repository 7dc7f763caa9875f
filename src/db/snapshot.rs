use chrono::Utc;
use sqlx::Row;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::core::Database;
use crate::popularity::Snapshot;
use crate::TARGET_DB;

impl Database {
    /// Checks whether a snapshot is already stored for the given day
    pub async fn has_snapshot(&self, day_id: i64) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM snapshots WHERE day_id = ?")
            .bind(day_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count > 0)
    }

    /// Stores a snapshot in a single transaction
    ///
    /// # Arguments
    /// * `snapshot` - Day id and per-language popularity
    ///
    /// # Returns
    /// * `Ok(())` - If the snapshot was stored
    /// * `Err` - If the day is already stored or the write failed
    pub async fn insert_snapshot(&self, snapshot: &Snapshot) -> Result<(), sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("INSERT INTO snapshots (day_id, created_at) VALUES (?, ?)")
            .bind(snapshot.day_id)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;

        for (language, popularity) in &snapshot.scores {
            sqlx::query(
                "INSERT INTO snapshot_scores (day_id, language, popularity) VALUES (?, ?, ?)",
            )
            .bind(snapshot.day_id)
            .bind(language)
            .bind(popularity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(target: TARGET_DB, "Stored snapshot {} with {} languages", snapshot.day_id, snapshot.scores.len());
        Ok(())
    }

    /// Loads the snapshot of one day, if stored
    pub async fn load_snapshot(&self, day_id: i64) -> Result<Option<Snapshot>, sqlx::Error> {
        if !self.has_snapshot(day_id).await? {
            return Ok(None);
        }

        let rows = sqlx::query(
            "SELECT language, popularity FROM snapshot_scores WHERE day_id = ? ORDER BY language",
        )
        .bind(day_id)
        .fetch_all(self.pool())
        .await?;

        let scores = rows
            .iter()
            .map(|row| (row.get::<String, _>("language"), row.get::<f64, _>("popularity")))
            .collect();

        Ok(Some(Snapshot { day_id, scores }))
    }

    /// Loads every stored snapshot, oldest first
    pub async fn load_all_snapshots(&self) -> Result<Vec<Snapshot>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT s.day_id, sc.language, sc.popularity
            FROM snapshots s
            LEFT JOIN snapshot_scores sc ON sc.day_id = s.day_id
            ORDER BY s.day_id, sc.language
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        let mut snapshots: Vec<Snapshot> = Vec::new();
        for row in rows {
            let day_id: i64 = row.get("day_id");
            if snapshots.last().map(|s| s.day_id) != Some(day_id) {
                snapshots.push(Snapshot {
                    day_id,
                    scores: BTreeMap::new(),
                });
            }

            let language: Option<String> = row.get("language");
            let popularity: Option<f64> = row.get("popularity");
            if let (Some(language), Some(popularity), Some(current)) =
                (language, popularity, snapshots.last_mut())
            {
                current.scores.insert(language, popularity);
            }
        }

        debug!(target: TARGET_DB, "Loaded {} snapshots", snapshots.len());
        Ok(snapshots)
    }

    /// The most recent stored day
    pub async fn latest_day_id(&self) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(day_id) FROM snapshots")
            .fetch_one(self.pool())
            .await
    }
}
