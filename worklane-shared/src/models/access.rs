/// Access-grant models for the three nested resource levels
///
/// The `module_access`, `task_access`, and `activity_access` tables share one
/// shape: (resource_id, user_id, granted_by, granted_at) with the pair as the
/// primary key. `AccessLevel` is the discriminant that selects the table, so
/// grant/revoke/cascade logic is written once instead of three times.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE module_access (
///     module_id UUID NOT NULL REFERENCES modules(id),
///     user_id UUID NOT NULL REFERENCES users(id),
///     granted_by UUID NOT NULL REFERENCES users(id),
///     granted_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (module_id, user_id)
/// );
/// -- task_access and activity_access are identical modulo the resource column
/// ```
///
/// Grants never exist for users outside the owning project's member set for
/// long: membership removal cascades into these tables on the next sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// The resource level an access grant attaches to
///
/// Levels are strictly nested: Activity ⊂ Task ⊂ Module ⊂ Project. Revoking
/// at a level cascades to the levels below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Module-level grant (cascades to tasks and activities on revoke)
    Module,

    /// Task-level grant (cascades to activities on revoke)
    Task,

    /// Activity-level grant (no further cascade)
    Activity,
}

impl AccessLevel {
    /// Converts level to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Module => "module",
            AccessLevel::Task => "task",
            AccessLevel::Activity => "activity",
        }
    }

    /// The grant table for this level
    pub fn table(&self) -> &'static str {
        match self {
            AccessLevel::Module => "module_access",
            AccessLevel::Task => "task_access",
            AccessLevel::Activity => "activity_access",
        }
    }

    /// The resource-id column of this level's grant table
    pub fn resource_column(&self) -> &'static str {
        match self {
            AccessLevel::Module => "module_id",
            AccessLevel::Task => "task_id",
            AccessLevel::Activity => "activity_id",
        }
    }

    /// Levels a revoke at this level cascades into, child-most first
    pub fn cascade_targets(&self) -> &'static [AccessLevel] {
        match self {
            AccessLevel::Module => &[AccessLevel::Activity, AccessLevel::Task],
            AccessLevel::Task => &[AccessLevel::Activity],
            AccessLevel::Activity => &[],
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single access-grant row, scoped to one resource
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessGrant {
    /// User holding the grant
    pub user_id: Uuid,

    /// User who issued the grant
    pub granted_by: Uuid,

    /// When the grant was issued
    pub granted_at: DateTime<Utc>,
}

impl AccessGrant {
    /// Lists the grants on one resource
    pub async fn list_for_resource(
        pool: &PgPool,
        level: AccessLevel,
        resource_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let grants = sqlx::query_as::<_, AccessGrant>(&format!(
            "SELECT user_id, granted_by, granted_at FROM {} WHERE {} = $1 ORDER BY granted_at ASC",
            level.table(),
            level.resource_column(),
        ))
        .bind(resource_id)
        .fetch_all(pool)
        .await?;

        Ok(grants)
    }

    /// Checks whether a user holds a grant on a resource
    pub async fn exists(
        pool: &PgPool,
        level: AccessLevel,
        resource_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND user_id = $2)",
            level.table(),
            level.resource_column(),
        ))
        .bind(resource_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_as_str() {
        assert_eq!(AccessLevel::Module.as_str(), "module");
        assert_eq!(AccessLevel::Task.as_str(), "task");
        assert_eq!(AccessLevel::Activity.as_str(), "activity");
    }

    #[test]
    fn test_level_tables() {
        assert_eq!(AccessLevel::Module.table(), "module_access");
        assert_eq!(AccessLevel::Task.table(), "task_access");
        assert_eq!(AccessLevel::Activity.table(), "activity_access");

        assert_eq!(AccessLevel::Module.resource_column(), "module_id");
        assert_eq!(AccessLevel::Task.resource_column(), "task_id");
        assert_eq!(AccessLevel::Activity.resource_column(), "activity_id");
    }

    #[test]
    fn test_cascade_targets_are_strictly_below() {
        assert_eq!(
            AccessLevel::Module.cascade_targets(),
            &[AccessLevel::Activity, AccessLevel::Task]
        );
        assert_eq!(AccessLevel::Task.cascade_targets(), &[AccessLevel::Activity]);
        assert!(AccessLevel::Activity.cascade_targets().is_empty());
    }
}
