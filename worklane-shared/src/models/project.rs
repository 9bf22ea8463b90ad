/// Project model and read operations
///
/// Projects are the root of the resource tree (project → module → task →
/// activity). Each project has exactly one manager; the project's member set
/// is derived from that manager's reporting subtree and maintained by the
/// engine's team synchronizer.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('active', 'completed', 'on_hold', 'cancelled');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     custom_id VARCHAR(32) NOT NULL UNIQUE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     manager_id UUID NOT NULL REFERENCES users(id),
///     status project_status NOT NULL DEFAULT 'active',
///     start_date DATE NOT NULL DEFAULT CURRENT_DATE,
///     end_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Creation and mutation go through the engine's lifecycle controller, which
/// owns `PRO-NNN` identifier generation and membership synchronization.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// In progress; the only status that accepts mutations
    Active,

    /// Delivered
    Completed,

    /// Paused
    OnHold,

    /// Abandoned
    Cancelled,
}

impl ProjectStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    /// Whether resource and grant mutations are allowed in this status
    pub fn accepts_mutations(&self) -> bool {
        matches!(self, ProjectStatus::Active)
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Human-readable sequential identifier (`PRO-001`, `PRO-002`, ...)
    pub custom_id: String,

    /// Project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Current project manager
    pub manager_id: Uuid,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// Start date (set to the creation date by the lifecycle controller)
    pub start_date: NaiveDate,

    /// End date (auto-set when status leaves `active` without an explicit date)
    pub end_date: Option<NaiveDate>,

    /// When the row was created
    pub created_at: DateTime<Utc>,

    /// When the row was last updated
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Finds a project by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, custom_id, name, description, manager_id, status,
                   start_date, end_date, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by its custom identifier
    pub async fn find_by_custom_id(
        pool: &PgPool,
        custom_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, custom_id, name, description, manager_id, status,
                   start_date, end_date, created_at, updated_at
            FROM projects
            WHERE custom_id = $1
            "#,
        )
        .bind(custom_id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all active projects
    ///
    /// Used by the reconciliation sweep, which re-syncs every active
    /// project's member set.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, custom_id, name, description, manager_id, status,
                   start_date, end_date, created_at, updated_at
            FROM projects
            WHERE status = 'active'
            ORDER BY custom_id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Lists projects managed by a user
    pub async fn list_by_manager(
        pool: &PgPool,
        manager_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, custom_id, name, description, manager_id, status,
                   start_date, end_date, created_at, updated_at
            FROM projects
            WHERE manager_id = $1
            ORDER BY custom_id ASC
            "#,
        )
        .bind(manager_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Counts all projects
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(ProjectStatus::Active.as_str(), "active");
        assert_eq!(ProjectStatus::Completed.as_str(), "completed");
        assert_eq!(ProjectStatus::OnHold.as_str(), "on_hold");
        assert_eq!(ProjectStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_only_active_accepts_mutations() {
        assert!(ProjectStatus::Active.accepts_mutations());
        assert!(!ProjectStatus::Completed.accepts_mutations());
        assert!(!ProjectStatus::OnHold.accepts_mutations());
        assert!(!ProjectStatus::Cancelled.accepts_mutations());
    }
}
