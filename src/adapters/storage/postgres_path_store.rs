//! PostgreSQL implementation of PathStore.
//!
//! One row per `(user_id, advisor_id)`. Entries and the recommendation are
//! stored as JSONB. Updates match on `version` and `created_at`, so a row
//! recreated after a reset never accepts a write prepared against the old one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::domain::foundation::{AdvisorId, Timestamp, UserId};
use crate::domain::path::{DecisionPath, PathEntry};
use crate::domain::recommendation::FinalRecommendation;
use crate::ports::{PathStore, PathStoreError};

/// PostgreSQL implementation of PathStore.
#[derive(Clone)]
pub struct PostgresPathStore {
    pool: PgPool,
}

impl PostgresPathStore {
    /// Creates a new PostgresPathStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), PathStoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PathStoreError::DatabaseError(format!("Migration failed: {}", e)))
    }

    async fn fetch(
        &self,
        user_id: &UserId,
        advisor_id: &AdvisorId,
    ) -> Result<Option<DecisionPath>, PathStoreError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, advisor_id, entries, completed, version,
                   recommendation, created_at, updated_at
            FROM decision_paths
            WHERE user_id = $1 AND advisor_id = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(advisor_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PathStoreError::DatabaseError(format!("Failed to fetch path: {}", e)))?;

        row.map(row_to_path).transpose()
    }

    /// Resolves a write that matched no row: either the same path is
    /// already stored (idempotent retry) or someone else won the race.
    async fn resolve_lost_write(&self, path: &DecisionPath) -> Result<(), PathStoreError> {
        match self.fetch(path.user_id(), path.advisor_id()).await? {
            Some(stored)
                if stored.version() == path.version()
                    && same_instant(stored.created_at(), path.created_at())
                    && stored.entries() == path.entries() =>
            {
                Ok(())
            }
            Some(stored) => Err(PathStoreError::conflict(path, stored.version())),
            None => Err(PathStoreError::conflict(path, 0)),
        }
    }

    async fn insert(&self, path: &DecisionPath) -> Result<(), PathStoreError> {
        let (entries, recommendation) = encode_json(path)?;

        let result = sqlx::query(
            r#"
            INSERT INTO decision_paths (
                user_id, advisor_id, entries, completed, version,
                recommendation, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(path.user_id().as_str())
        .bind(path.advisor_id().as_str())
        .bind(entries)
        .bind(path.is_completed())
        .bind(path.version() as i64)
        .bind(recommendation)
        .bind(path.created_at().as_datetime())
        .bind(path.updated_at().as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                self.resolve_lost_write(path).await
            }
            Err(e) => Err(PathStoreError::DatabaseError(format!(
                "Failed to insert path: {}",
                e
            ))),
        }
    }

    async fn update(&self, path: &DecisionPath) -> Result<(), PathStoreError> {
        let (entries, recommendation) = encode_json(path)?;

        let result = sqlx::query(
            r#"
            UPDATE decision_paths SET
                entries = $3,
                completed = $4,
                version = $5,
                recommendation = $6,
                updated_at = $7
            WHERE user_id = $1 AND advisor_id = $2 AND version = $8 AND created_at = $9
            "#,
        )
        .bind(path.user_id().as_str())
        .bind(path.advisor_id().as_str())
        .bind(entries)
        .bind(path.is_completed())
        .bind(path.version() as i64)
        .bind(recommendation)
        .bind(path.updated_at().as_datetime())
        .bind(path.expected_stored_version() as i64)
        .bind(path.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| PathStoreError::DatabaseError(format!("Failed to update path: {}", e)))?;

        if result.rows_affected() == 0 {
            return self.resolve_lost_write(path).await;
        }

        Ok(())
    }
}

#[async_trait]
impl PathStore for PostgresPathStore {
    async fn load(
        &self,
        user_id: &UserId,
        advisor_id: &AdvisorId,
    ) -> Result<DecisionPath, PathStoreError> {
        Ok(self
            .fetch(user_id, advisor_id)
            .await?
            .unwrap_or_else(|| DecisionPath::new(user_id.clone(), advisor_id.clone())))
    }

    async fn save(&self, path: &DecisionPath) -> Result<(), PathStoreError> {
        if path.expected_stored_version() == 0 {
            self.insert(path).await
        } else {
            self.update(path).await
        }
    }

    async fn reset(&self, user_id: &UserId, advisor_id: &AdvisorId) -> Result<(), PathStoreError> {
        sqlx::query("DELETE FROM decision_paths WHERE user_id = $1 AND advisor_id = $2")
            .bind(user_id.as_str())
            .bind(advisor_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| PathStoreError::DatabaseError(format!("Failed to reset path: {}", e)))?;

        Ok(())
    }

    async fn exists(
        &self,
        user_id: &UserId,
        advisor_id: &AdvisorId,
    ) -> Result<bool, PathStoreError> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM decision_paths WHERE user_id = $1 AND advisor_id = $2",
        )
        .bind(user_id.as_str())
        .bind(advisor_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            PathStoreError::DatabaseError(format!("Failed to check path existence: {}", e))
        })?;

        Ok(result.0 > 0)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Row Conversions
// ════════════════════════════════════════════════════════════════════════════════

fn encode_json(
    path: &DecisionPath,
) -> Result<(serde_json::Value, Option<serde_json::Value>), PathStoreError> {
    let entries = serde_json::to_value(path.entries())
        .map_err(|e| PathStoreError::SerializationFailed(e.to_string()))?;
    let recommendation = path
        .recommendation()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| PathStoreError::SerializationFailed(e.to_string()))?;
    Ok((entries, recommendation))
}

/// Compares timestamps at the column's microsecond precision.
fn same_instant(a: Timestamp, b: Timestamp) -> bool {
    a.as_datetime().timestamp_micros() == b.as_datetime().timestamp_micros()
}

fn row_to_path(row: PgRow) -> Result<DecisionPath, PathStoreError> {
    let corrupt = |e: String| PathStoreError::DeserializationFailed(e);
    let db = |e: sqlx::Error| PathStoreError::DatabaseError(e.to_string());

    let user_id: String = row.try_get("user_id").map_err(db)?;
    let advisor_id: String = row.try_get("advisor_id").map_err(db)?;
    let entries: serde_json::Value = row.try_get("entries").map_err(db)?;
    let completed: bool = row.try_get("completed").map_err(db)?;
    let version: i64 = row.try_get("version").map_err(db)?;
    let recommendation: Option<serde_json::Value> = row.try_get("recommendation").map_err(db)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(db)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(db)?;

    let entries: Vec<PathEntry> =
        serde_json::from_value(entries).map_err(|e| corrupt(e.to_string()))?;
    let recommendation: Option<FinalRecommendation> = recommendation
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| corrupt(e.to_string()))?;
    let version = u64::try_from(version)
        .map_err(|_| corrupt(format!("negative path version {}", version)))?;

    Ok(DecisionPath::reconstitute(
        UserId::new(user_id).map_err(|e| corrupt(e.to_string()))?,
        AdvisorId::new(advisor_id).map_err(|e| corrupt(e.to_string()))?,
        entries,
        completed,
        version,
        recommendation,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_instant_ignores_sub_microsecond_digits() {
        let at = |s: &str| {
            Timestamp::from_datetime(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
        };

        assert!(same_instant(
            at("2026-01-01T10:00:00.123456789Z"),
            at("2026-01-01T10:00:00.123456Z")
        ));
        assert!(!same_instant(
            at("2026-01-01T10:00:00.123456Z"),
            at("2026-01-01T10:00:00.123457Z")
        ));
    }

    #[test]
    fn encode_json_uses_camel_case_entries() {
        let path = DecisionPath::reconstitute(
            UserId::new("user-1").unwrap(),
            AdvisorId::new("budget_planning").unwrap(),
            vec![PathEntry {
                step: 0,
                option_id: "none".to_string(),
                value: "0".to_string(),
                title: "No savings".to_string(),
                description: "Nothing set aside yet".to_string(),
                timestamp: Timestamp::now(),
            }],
            false,
            1,
            None,
            Timestamp::now(),
            Timestamp::now(),
        );

        let (entries, recommendation) = encode_json(&path).unwrap();

        assert_eq!(entries[0]["optionId"], "none");
        assert_eq!(entries[0]["step"], 0);
        assert!(recommendation.is_none());
    }
}
