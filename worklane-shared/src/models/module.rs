/// Module model: the first nesting level under a project
///
/// Modules carry a `MOD-NNN` identifier scoped to their project. Creation and
/// deletion go through the engine's lifecycle controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Module model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Module {
    /// Unique module ID (UUID v4)
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Sequential identifier scoped to the project (`MOD-001`, ...)
    pub custom_id: String,

    /// Module name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// When the row was created
    pub created_at: DateTime<Utc>,

    /// When the row was last updated
    pub updated_at: DateTime<Utc>,
}

impl Module {
    /// Finds a module by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let module = sqlx::query_as::<_, Module>(
            r#"
            SELECT id, project_id, custom_id, name, description, created_at, updated_at
            FROM modules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(module)
    }

    /// Lists the modules of a project, ordered by custom identifier
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let modules = sqlx::query_as::<_, Module>(
            r#"
            SELECT id, project_id, custom_id, name, description, created_at, updated_at
            FROM modules
            WHERE project_id = $1
            ORDER BY custom_id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(modules)
    }

    /// Counts the modules of a project
    pub async fn count_by_project(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM modules WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
