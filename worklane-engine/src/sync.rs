/// Project team synchronization
///
/// A project's member set is derived data: after every sync it equals the
/// manager plus the manager's transitive reporting subtree, nothing more.
/// Membership is never extended upward: a manager's own manager is not a
/// member unless they sit in someone's subtree on another project.
///
/// `sync_project_team` is the self-healing primitive. It is invoked for one
/// project when the project is created or its manager changes, and swept
/// across all active projects by the reconciler to repair drift caused by
/// reporting-line changes elsewhere in the organization. It is idempotent:
/// repeated calls with the same inputs converge to the same member set.
///
/// Removal is subtractive in two steps: membership rows outside the target
/// set are deleted, and every removed user loses their module, task, and
/// activity grants within the project (child level first). A member removed
/// by sync keeps nothing, including grants that were issued manually.
///
/// # Example
///
/// ```no_run
/// use worklane_engine::sync::TeamSynchronizer;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, manager_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let synchronizer = TeamSynchronizer::new(pool);
/// synchronizer.sync_project_team(project_id, manager_id).await?;
///
/// // Scheduled reconciliation across every active project:
/// let summary = synchronizer.sync_all_project_teams().await?;
/// println!("synced {}, failed {}", summary.synced, summary.failed);
/// # Ok(())
/// # }
/// ```

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use worklane_shared::models::project::Project;

use crate::error::EngineResult;
use crate::subtree::resolve_subtree;

/// Outcome of a full reconciliation sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Projects whose member set was reconciled
    pub synced: usize,

    /// Projects whose sync failed and was skipped
    pub failed: usize,
}

/// Reconciles project member sets against the reporting hierarchy
#[derive(Debug, Clone)]
pub struct TeamSynchronizer {
    /// Database connection pool
    db: PgPool,
}

impl TeamSynchronizer {
    /// Creates a new synchronizer
    pub fn new(db: PgPool) -> Self {
        TeamSynchronizer { db }
    }

    /// Synchronizes one project's member set in its own transaction
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails; the transaction rolls back and no
    /// partial membership or grant change is committed.
    pub async fn sync_project_team(&self, project_id: Uuid, manager_id: Uuid) -> EngineResult<()> {
        let mut tx = self.db.begin().await?;
        sync_project_team(&mut tx, project_id, manager_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Sweeps every active project through `sync_project_team`
    ///
    /// Each project syncs in its own transaction, so one project's failure
    /// cannot corrupt another's state. Failures are logged and counted; the
    /// sweep itself only errors if the project list cannot be read.
    pub async fn sync_all_project_teams(&self) -> EngineResult<SweepSummary> {
        let projects = Project::list_active(&self.db).await?;
        let total = projects.len();

        let mut summary = SweepSummary::default();

        for project in projects {
            match self.sync_project_team(project.id, project.manager_id).await {
                Ok(()) => summary.synced += 1,
                Err(e) => {
                    warn!(
                        project_id = %project.id,
                        custom_id = %project.custom_id,
                        error = %e,
                        "Project team sync failed, continuing sweep"
                    );
                    summary.failed += 1;
                }
            }
        }

        info!(
            total,
            synced = summary.synced,
            failed = summary.failed,
            "Team reconciliation sweep complete"
        );

        Ok(summary)
    }
}

/// Synchronizes a project's member set on the caller's transaction
///
/// Steps:
/// 1. target = {manager} ∪ subtree(manager)
/// 2. insert membership rows missing from target (ON CONFLICT DO NOTHING)
/// 3. delete membership rows outside target
/// 4. delete the removed users' grants within the project, activity level
///    first, then task, then module
pub async fn sync_project_team(
    conn: &mut PgConnection,
    project_id: Uuid,
    manager_id: Uuid,
) -> EngineResult<()> {
    let mut target = resolve_subtree(&mut *conn, manager_id).await?;
    target.insert(manager_id);

    let target_ids: Vec<Uuid> = target.into_iter().collect();

    sqlx::query(
        r#"
        INSERT INTO project_members (project_id, user_id)
        SELECT $1, unnest($2::uuid[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(project_id)
    .bind(&target_ids)
    .execute(&mut *conn)
    .await?;

    let removed: Vec<(Uuid,)> = sqlx::query_as(
        r#"
        DELETE FROM project_members
        WHERE project_id = $1 AND user_id <> ALL($2)
        RETURNING user_id
        "#,
    )
    .bind(project_id)
    .bind(&target_ids)
    .fetch_all(&mut *conn)
    .await?;

    if !removed.is_empty() {
        let removed_ids: Vec<Uuid> = removed.into_iter().map(|(id,)| id).collect();
        revoke_all_grants_for_users(&mut *conn, project_id, &removed_ids).await?;

        debug!(
            project_id = %project_id,
            removed = removed_ids.len(),
            "Removed members outside the manager subtree"
        );
    }

    debug!(
        project_id = %project_id,
        manager_id = %manager_id,
        members = target_ids.len(),
        "Project team synchronized"
    );

    Ok(())
}

/// Deletes every grant the given users hold within a project, child level
/// first
///
/// Used for the membership-removal cascade here and reused by manager
/// reassignment (which passes every previous grant holder).
pub(crate) async fn revoke_all_grants_for_users(
    conn: &mut PgConnection,
    project_id: Uuid,
    user_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM activity_access aa
        USING activities a, tasks t, modules m
        WHERE aa.activity_id = a.id
          AND a.task_id = t.id
          AND t.module_id = m.id
          AND m.project_id = $1
          AND aa.user_id = ANY($2)
        "#,
    )
    .bind(project_id)
    .bind(user_ids)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM task_access ta
        USING tasks t, modules m
        WHERE ta.task_id = t.id
          AND t.module_id = m.id
          AND m.project_id = $1
          AND ta.user_id = ANY($2)
        "#,
    )
    .bind(project_id)
    .bind(user_ids)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM module_access ma
        USING modules m
        WHERE ma.module_id = m.id
          AND m.project_id = $1
          AND ma.user_id = ANY($2)
        "#,
    )
    .bind(project_id)
    .bind(user_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
