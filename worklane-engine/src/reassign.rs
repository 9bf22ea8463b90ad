/// Manager reassignment
///
/// Changing a project's manager invalidates every prior access decision:
/// they were made in the context of the old manager's authority chain. The
/// coordinator therefore does a full reset inside one transaction rather
/// than trying to diff grants:
///
/// 1. validate the candidate's employment status
/// 2. persist the new manager on the project row
/// 3. wipe all module/task/activity grants under the project
/// 4. rebuild membership from the new manager's subtree
/// 5. grant the new manager baseline access to every existing resource
///
/// Step 5 is re-derivable by re-running, so at-least-once is sufficient.
/// The project row is locked for the duration, serializing reassignment
/// against concurrent grant mutations on the same project.

use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use worklane_shared::models::project::Project;
use worklane_shared::models::user::UserStatus;

use crate::error::{EngineError, EngineResult};
use crate::notify::{Notification, NotificationSender};
use crate::sync::sync_project_team;

/// Orchestrates the manager-change sequence
#[derive(Clone)]
pub struct ManagerReassignmentCoordinator {
    /// Database connection pool
    db: PgPool,

    /// Post-commit notification delivery
    notifier: Arc<dyn NotificationSender>,
}

impl ManagerReassignmentCoordinator {
    /// Creates a new coordinator
    pub fn new(db: PgPool, notifier: Arc<dyn NotificationSender>) -> Self {
        ManagerReassignmentCoordinator { db, notifier }
    }

    /// Reassigns a project to a new manager
    ///
    /// Runs the full wipe/resync/regrant sequence in one transaction and
    /// returns the updated project. A manager-assigned notification goes out
    /// after commit, fire-and-forget.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project or the candidate user does not exist
    /// - `InvalidManagerStatus` if the candidate is on notice, resigned,
    ///   terminated, or inactive
    ///
    /// Any failure rolls the whole sequence back.
    pub async fn reassign_manager(
        &self,
        project_id: Uuid,
        new_manager_id: Uuid,
        requested_by: Uuid,
    ) -> EngineResult<Project> {
        let mut tx = self.db.begin().await?;

        let current: Option<Project> = sqlx::query_as(
            r#"
            SELECT id, custom_id, name, description, manager_id, status,
                   start_date, end_date, created_at, updated_at
            FROM projects
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;

        let current = current.ok_or_else(|| EngineError::not_found("project", project_id))?;

        let status: Option<UserStatus> =
            sqlx::query_scalar("SELECT status FROM users WHERE id = $1")
                .bind(new_manager_id)
                .fetch_optional(&mut *tx)
                .await?;

        let status = status.ok_or_else(|| EngineError::not_found("user", new_manager_id))?;

        if !status.can_manage_projects() {
            return Err(EngineError::InvalidManagerStatus {
                user_id: new_manager_id,
                status,
            });
        }

        let project: Project = sqlx::query_as(
            r#"
            UPDATE projects
            SET manager_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, custom_id, name, description, manager_id, status,
                      start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(new_manager_id)
        .fetch_one(&mut *tx)
        .await?;

        wipe_project_grants(&mut tx, project_id).await?;
        sync_project_team(&mut tx, project_id, new_manager_id).await?;
        grant_manager_baseline(&mut tx, project_id, new_manager_id, requested_by).await?;

        tx.commit().await?;

        info!(
            project_id = %project_id,
            custom_id = %project.custom_id,
            old_manager_id = %current.manager_id,
            new_manager_id = %new_manager_id,
            requested_by = %requested_by,
            "Project manager reassigned"
        );

        self.notifier
            .send(Notification::ManagerAssigned {
                project_id,
                custom_id: project.custom_id.clone(),
                manager_id: new_manager_id,
                requested_by,
            })
            .await;

        Ok(project)
    }
}

/// Unconditionally deletes every grant under a project, child level first
pub(crate) async fn wipe_project_grants(
    conn: &mut PgConnection,
    project_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM activity_access aa
        USING activities a, tasks t, modules m
        WHERE aa.activity_id = a.id
          AND a.task_id = t.id
          AND t.module_id = m.id
          AND m.project_id = $1
        "#,
    )
    .bind(project_id)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM task_access ta
        USING tasks t, modules m
        WHERE ta.task_id = t.id
          AND t.module_id = m.id
          AND m.project_id = $1
        "#,
    )
    .bind(project_id)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM module_access ma
        USING modules m
        WHERE ma.module_id = m.id
          AND m.project_id = $1
        "#,
    )
    .bind(project_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Grants a manager access to every existing resource under a project
pub(crate) async fn grant_manager_baseline(
    conn: &mut PgConnection,
    project_id: Uuid,
    manager_id: Uuid,
    granted_by: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO module_access (module_id, user_id, granted_by)
        SELECT id, $2, $3 FROM modules WHERE project_id = $1
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(project_id)
    .bind(manager_id)
    .bind(granted_by)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO task_access (task_id, user_id, granted_by)
        SELECT t.id, $2, $3
        FROM tasks t
        JOIN modules m ON t.module_id = m.id
        WHERE m.project_id = $1
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(project_id)
    .bind(manager_id)
    .bind(granted_by)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO activity_access (activity_id, user_id, granted_by)
        SELECT a.id, $2, $3
        FROM activities a
        JOIN tasks t ON a.task_id = t.id
        JOIN modules m ON t.module_id = m.id
        WHERE m.project_id = $1
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(project_id)
    .bind(manager_id)
    .bind(granted_by)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
