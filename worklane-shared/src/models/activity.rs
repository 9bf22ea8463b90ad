/// Activity model: the innermost nesting level, owned by a task
///
/// Activities carry an `ACT-NNN` identifier scoped to their task. Time logs
/// reference activities, so activity deletion cascades into timesheet rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Activity model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    /// Unique activity ID (UUID v4)
    pub id: Uuid,

    /// Owning task
    pub task_id: Uuid,

    /// Sequential identifier scoped to the task (`ACT-001`, ...)
    pub custom_id: String,

    /// Activity name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// When the row was created
    pub created_at: DateTime<Utc>,

    /// When the row was last updated
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Finds an activity by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, task_id, custom_id, name, description, created_at, updated_at
            FROM activities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(activity)
    }

    /// Lists the activities of a task, ordered by custom identifier
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, task_id, custom_id, name, description, created_at, updated_at
            FROM activities
            WHERE task_id = $1
            ORDER BY custom_id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(activities)
    }

    /// Counts the activities of a task
    pub async fn count_by_task(pool: &PgPool, task_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM activities WHERE task_id = $1")
                .bind(task_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
