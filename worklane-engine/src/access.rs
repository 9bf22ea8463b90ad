/// Level-scoped access grant management
///
/// Grants attach at three nested levels: module, task, activity. Granting is
/// an idempotent insert. Revoking cascades downward: a user stripped of a
/// module loses every task and activity grant under it, a user stripped of a
/// task loses the activity grants under it. It never cascades upward or sideways:
/// grants on unrelated resources are untouched.
///
/// Two rules guard every mutation:
/// - the owning project must be active (`ProjectNotActive` otherwise), and
/// - the current project manager cannot be revoked (`ProtectedRoleViolation`)
///   since manager access only changes through manager reassignment.
///
/// Both operations return the refreshed grant list for the resource so the
/// caller can update UI state without a second round-trip.
///
/// # Example
///
/// ```no_run
/// use worklane_engine::access::AccessGrantManager;
/// use worklane_shared::models::access::AccessLevel;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, module_id: Uuid, user_id: Uuid, admin: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let access = AccessGrantManager::new(pool);
///
/// let snapshot = access
///     .grant(AccessLevel::Module, module_id, user_id, admin)
///     .await?;
/// println!("{} users hold grants on the module", snapshot.entries.len());
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use worklane_shared::models::access::AccessLevel;

use crate::error::{EngineError, EngineResult};
use crate::owner::{owner_chain_of, OwnerChain};

/// One entry in a resource's refreshed grant list
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GrantEntry {
    /// User holding the grant
    pub user_id: Uuid,

    /// User display name
    pub name: String,

    /// Whether this user is the owning project's current manager
    pub is_current_manager: bool,
}

/// The grant list of one resource after a grant/revoke
#[derive(Debug, Clone, Serialize)]
pub struct GrantSnapshot {
    /// Resource level
    pub level: AccessLevel,

    /// Resource ID
    pub resource_id: Uuid,

    /// Current grant holders
    pub entries: Vec<GrantEntry>,
}

/// Grants and revokes per-level access
#[derive(Debug, Clone)]
pub struct AccessGrantManager {
    /// Database connection pool
    db: PgPool,
}

impl AccessGrantManager {
    /// Creates a new grant manager
    pub fn new(db: PgPool) -> Self {
        AccessGrantManager { db }
    }

    /// Grants a user access to a resource
    ///
    /// Idempotent: granting an existing grant is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the resource does not exist
    /// - `ProjectNotActive` if the owning project is not active
    pub async fn grant(
        &self,
        level: AccessLevel,
        resource_id: Uuid,
        user_id: Uuid,
        granted_by: Uuid,
    ) -> EngineResult<GrantSnapshot> {
        let mut tx = self.db.begin().await?;

        let owner = require_active_owner(&mut tx, level, resource_id).await?;

        sqlx::query(&format!(
            "INSERT INTO {} ({}, user_id, granted_by) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            level.table(),
            level.resource_column(),
        ))
        .bind(resource_id)
        .bind(user_id)
        .bind(granted_by)
        .execute(&mut *tx)
        .await?;

        let snapshot = grant_snapshot(&mut tx, level, resource_id, owner.manager_id).await?;
        tx.commit().await?;

        debug!(
            level = %level,
            resource_id = %resource_id,
            user_id = %user_id,
            granted_by = %granted_by,
            "Access granted"
        );

        Ok(snapshot)
    }

    /// Revokes a user's access to a resource, cascading downward
    ///
    /// # Errors
    ///
    /// - `NotFound` if the resource does not exist
    /// - `ProjectNotActive` if the owning project is not active
    /// - `ProtectedRoleViolation` if the target is the owning project's
    ///   current manager; the grant is left untouched
    pub async fn revoke(
        &self,
        level: AccessLevel,
        resource_id: Uuid,
        user_id: Uuid,
        requested_by: Uuid,
    ) -> EngineResult<GrantSnapshot> {
        let mut tx = self.db.begin().await?;

        let owner = require_active_owner(&mut tx, level, resource_id).await?;

        if user_id == owner.manager_id {
            return Err(EngineError::ProtectedRoleViolation);
        }

        sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = $1 AND user_id = $2",
            level.table(),
            level.resource_column(),
        ))
        .bind(resource_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        for target in level.cascade_targets() {
            delete_grants_in_scope(&mut tx, *target, level, resource_id, user_id).await?;
        }

        let snapshot = grant_snapshot(&mut tx, level, resource_id, owner.manager_id).await?;
        tx.commit().await?;

        debug!(
            level = %level,
            resource_id = %resource_id,
            user_id = %user_id,
            requested_by = %requested_by,
            "Access revoked"
        );

        Ok(snapshot)
    }

    /// Reads the current grant list of a resource without mutating it
    ///
    /// # Errors
    ///
    /// - `NotFound` if the resource does not exist
    pub async fn list(&self, level: AccessLevel, resource_id: Uuid) -> EngineResult<GrantSnapshot> {
        let mut conn = self.db.acquire().await?;

        let owner = owner_chain_of(&mut conn, level, resource_id)
            .await?
            .ok_or_else(|| EngineError::not_found(level.as_str(), resource_id))?;

        let snapshot = grant_snapshot(&mut conn, level, resource_id, owner.manager_id).await?;
        Ok(snapshot)
    }
}

/// Resolves the owner chain and checks the owning project is active
pub(crate) async fn require_active_owner(
    conn: &mut PgConnection,
    level: AccessLevel,
    resource_id: Uuid,
) -> EngineResult<OwnerChain> {
    let owner = owner_chain_of(&mut *conn, level, resource_id)
        .await?
        .ok_or_else(|| EngineError::not_found(level.as_str(), resource_id))?;

    if !owner.project_status.accepts_mutations() {
        return Err(EngineError::ProjectNotActive(owner.project_id));
    }

    Ok(owner)
}

/// Deletes one user's grants at `target` level within the scope of an
/// ancestor resource
///
/// Only strictly-nested (ancestor, target) pairs carry a scope join; any
/// other combination is a no-op.
async fn delete_grants_in_scope(
    conn: &mut PgConnection,
    target: AccessLevel,
    ancestor: AccessLevel,
    ancestor_id: Uuid,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    let sql = match (ancestor, target) {
        (AccessLevel::Module, AccessLevel::Activity) => {
            r#"
            DELETE FROM activity_access aa
            USING activities a, tasks t
            WHERE aa.activity_id = a.id
              AND a.task_id = t.id
              AND t.module_id = $1
              AND aa.user_id = $2
            "#
        }
        (AccessLevel::Module, AccessLevel::Task) => {
            r#"
            DELETE FROM task_access ta
            USING tasks t
            WHERE ta.task_id = t.id
              AND t.module_id = $1
              AND ta.user_id = $2
            "#
        }
        (AccessLevel::Task, AccessLevel::Activity) => {
            r#"
            DELETE FROM activity_access aa
            USING activities a
            WHERE aa.activity_id = a.id
              AND a.task_id = $1
              AND aa.user_id = $2
            "#
        }
        _ => return Ok(()),
    };

    sqlx::query(sql)
        .bind(ancestor_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Reads the refreshed grant list of a resource on the caller's connection
async fn grant_snapshot(
    conn: &mut PgConnection,
    level: AccessLevel,
    resource_id: Uuid,
    manager_id: Uuid,
) -> Result<GrantSnapshot, sqlx::Error> {
    let entries = sqlx::query_as::<_, GrantEntry>(&format!(
        r#"
        SELECT g.user_id, u.name, (g.user_id = $2) AS is_current_manager
        FROM {} g
        JOIN users u ON u.id = g.user_id
        WHERE g.{} = $1
        ORDER BY u.name ASC, g.user_id ASC
        "#,
        level.table(),
        level.resource_column(),
    ))
    .bind(resource_id)
    .bind(manager_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(GrantSnapshot {
        level,
        resource_id,
        entries,
    })
}
