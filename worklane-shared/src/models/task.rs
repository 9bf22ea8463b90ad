/// Task model: the second nesting level, owned by a module
///
/// Tasks carry a `TSK-NNN` identifier scoped to their module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning module
    pub module_id: Uuid,

    /// Sequential identifier scoped to the module (`TSK-001`, ...)
    pub custom_id: String,

    /// Task name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// When the row was created
    pub created_at: DateTime<Utc>,

    /// When the row was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, module_id, custom_id, name, description, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists the tasks of a module, ordered by custom identifier
    pub async fn list_by_module(pool: &PgPool, module_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, module_id, custom_id, name, description, created_at, updated_at
            FROM tasks
            WHERE module_id = $1
            ORDER BY custom_id ASC
            "#,
        )
        .bind(module_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts the tasks of a module
    pub async fn count_by_module(pool: &PgPool, module_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE module_id = $1")
            .bind(module_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
