/// Project lifecycle control
///
/// Creation, update, and deletion of the four resource levels. This is the
/// only place the entity tables are written: it owns custom-identifier
/// generation (inside the insert's transaction), invokes the team
/// synchronizer when a project appears, routes manager changes through the
/// reassignment coordinator, and runs the ordered deletion cascades.
///
/// Update requests are explicit typed structs rather than free-form field
/// maps: the controller must special-case exactly two fields, a manager
/// change (full access reset) and a status transition away from `active`
/// (end-date backfill), and a typed struct keeps those paths visible.
///
/// # Example
///
/// ```no_run
/// use worklane_engine::lifecycle::{CreateProject, ProjectLifecycleController};
/// use worklane_engine::notify::NoopNotifier;
/// use sqlx::PgPool;
/// use std::sync::Arc;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, manager_id: Uuid, admin: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let controller = ProjectLifecycleController::new(pool, Arc::new(NoopNotifier));
///
/// let project = controller
///     .create_project(
///         CreateProject {
///             name: "Payroll revamp".to_string(),
///             description: None,
///             manager_id,
///         },
///         admin,
///     )
///     .await?;
/// assert!(project.custom_id.starts_with("PRO-"));
/// # Ok(())
/// # }
/// ```

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use worklane_shared::models::access::AccessLevel;
use worklane_shared::models::activity::Activity;
use worklane_shared::models::module::Module;
use worklane_shared::models::project::{Project, ProjectStatus};
use worklane_shared::models::task::Task;
use worklane_shared::models::user::UserStatus;

use crate::access::require_active_owner;
use crate::error::{EngineError, EngineResult};
use crate::ident::{
    next_custom_id, ACTIVITY_PREFIX, MODULE_PREFIX, PROJECT_PREFIX, TASK_PREFIX,
};
use crate::notify::{Notification, NotificationSender};
use crate::reassign::ManagerReassignmentCoordinator;
use crate::sync::sync_project_team;

/// Input for creating a project
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    /// Project name
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial project manager
    pub manager_id: Uuid,
}

/// Input for updating a project
///
/// Only `Some` fields are applied. A `manager_id` different from the current
/// one triggers the full reassignment sequence before the remaining fields
/// are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New lifecycle status
    pub status: Option<ProjectStatus>,

    /// Explicit end date
    pub end_date: Option<NaiveDate>,

    /// New manager
    pub manager_id: Option<Uuid>,
}

/// Input for creating a module, task, or activity
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateResource {
    /// Resource name
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Creates, updates, and deletes project-tree entities
#[derive(Clone)]
pub struct ProjectLifecycleController {
    /// Database connection pool
    db: PgPool,

    /// Post-commit notification delivery
    notifier: Arc<dyn NotificationSender>,

    /// Handles manager changes detected on update
    reassigner: ManagerReassignmentCoordinator,
}

impl ProjectLifecycleController {
    /// Creates a new controller
    pub fn new(db: PgPool, notifier: Arc<dyn NotificationSender>) -> Self {
        let reassigner = ManagerReassignmentCoordinator::new(db.clone(), notifier.clone());
        ProjectLifecycleController {
            db,
            notifier,
            reassigner,
        }
    }

    /// Creates a project and synchronizes its initial team
    ///
    /// The project starts `active` with `start_date` = today. Identifier
    /// generation, the insert, and the membership sync share one
    /// transaction.
    ///
    /// # Errors
    ///
    /// - `Validation` if the input is malformed
    /// - `NotFound` if the manager does not exist
    /// - `InvalidManagerStatus` if the manager cannot take projects
    /// - `DuplicateIdentifier` if the generated id collides
    pub async fn create_project(
        &self,
        data: CreateProject,
        created_by: Uuid,
    ) -> EngineResult<Project> {
        data.validate()?;

        let mut tx = self.db.begin().await?;

        let status: Option<UserStatus> =
            sqlx::query_scalar("SELECT status FROM users WHERE id = $1")
                .bind(data.manager_id)
                .fetch_optional(&mut *tx)
                .await?;

        let status = status.ok_or_else(|| EngineError::not_found("user", data.manager_id))?;

        if !status.can_manage_projects() {
            return Err(EngineError::InvalidManagerStatus {
                user_id: data.manager_id,
                status,
            });
        }

        // The PRO sequence is global, so there is no parent row to lock the
        // way scoped sequences do; serialize generation explicitly.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext('projects_custom_id'))")
            .execute(&mut *tx)
            .await?;

        let custom_id = next_custom_id(&mut tx, "projects", PROJECT_PREFIX, None).await?;

        let project: Project = sqlx::query_as(
            r#"
            INSERT INTO projects (custom_id, name, description, manager_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, custom_id, name, description, manager_id, status,
                      start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(&custom_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.manager_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| EngineError::from_insert(e, &custom_id))?;

        sync_project_team(&mut tx, project.id, project.manager_id).await?;

        tx.commit().await?;

        info!(
            project_id = %project.id,
            custom_id = %project.custom_id,
            manager_id = %project.manager_id,
            created_by = %created_by,
            "Project created"
        );

        self.notifier
            .send(Notification::ProjectCreated {
                project_id: project.id,
                custom_id: project.custom_id.clone(),
                manager_id: project.manager_id,
            })
            .await;

        Ok(project)
    }

    /// Applies a typed update to a project
    ///
    /// A manager change runs the full reassignment sequence first. A status
    /// transition away from `active` without an explicit end date sets
    /// `end_date` to today.
    pub async fn update_project(
        &self,
        project_id: Uuid,
        data: UpdateProject,
        requested_by: Uuid,
    ) -> EngineResult<Project> {
        let current = Project::find_by_id(&self.db, project_id)
            .await?
            .ok_or_else(|| EngineError::not_found("project", project_id))?;

        if let Some(new_manager_id) = data.manager_id {
            if new_manager_id != current.manager_id {
                self.reassigner
                    .reassign_manager(project_id, new_manager_id, requested_by)
                    .await?;
            }
        }

        let leaving_active = current.status == ProjectStatus::Active
            && data.status.is_some_and(|s| s != ProjectStatus::Active);

        let end_date = match data.end_date {
            Some(date) => Some(date),
            None if leaving_active && current.end_date.is_none() => {
                Some(Utc::now().date_naive())
            }
            None => None,
        };

        let project: Project = sqlx::query_as(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                end_date = COALESCE($5, end_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, custom_id, name, description, manager_id, status,
                      start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.status)
        .bind(end_date)
        .fetch_one(&self.db)
        .await?;

        info!(
            project_id = %project.id,
            custom_id = %project.custom_id,
            status = %project.status,
            "Project updated"
        );

        Ok(project)
    }

    /// Creates a module under a project
    ///
    /// The parent project row is locked for the transaction, serializing
    /// `MOD-NNN` generation within the project. The current manager receives
    /// baseline access to the new module immediately.
    pub async fn create_module(
        &self,
        project_id: Uuid,
        data: CreateResource,
        created_by: Uuid,
    ) -> EngineResult<Module> {
        data.validate()?;

        let mut tx = self.db.begin().await?;

        let parent: Option<(Uuid, ProjectStatus)> =
            sqlx::query_as("SELECT manager_id, status FROM projects WHERE id = $1 FOR UPDATE")
                .bind(project_id)
                .fetch_optional(&mut *tx)
                .await?;

        let (manager_id, status) =
            parent.ok_or_else(|| EngineError::not_found("project", project_id))?;

        if !status.accepts_mutations() {
            return Err(EngineError::ProjectNotActive(project_id));
        }

        let custom_id =
            next_custom_id(&mut tx, "modules", MODULE_PREFIX, Some(("project_id", project_id)))
                .await?;

        let module: Module = sqlx::query_as(
            r#"
            INSERT INTO modules (project_id, custom_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, custom_id, name, description, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(&custom_id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| EngineError::from_insert(e, &custom_id))?;

        grant_on_new_resource(&mut tx, AccessLevel::Module, module.id, manager_id, created_by)
            .await?;

        tx.commit().await?;

        info!(
            module_id = %module.id,
            custom_id = %module.custom_id,
            project_id = %project_id,
            "Module created"
        );

        Ok(module)
    }

    /// Creates a task under a module
    pub async fn create_task(
        &self,
        module_id: Uuid,
        data: CreateResource,
        created_by: Uuid,
    ) -> EngineResult<Task> {
        data.validate()?;

        let mut tx = self.db.begin().await?;

        lock_parent_row(&mut tx, "modules", module_id)
            .await?
            .then_some(())
            .ok_or_else(|| EngineError::not_found("module", module_id))?;

        let owner = require_active_owner(&mut tx, AccessLevel::Module, module_id).await?;

        let custom_id =
            next_custom_id(&mut tx, "tasks", TASK_PREFIX, Some(("module_id", module_id))).await?;

        let task: Task = sqlx::query_as(
            r#"
            INSERT INTO tasks (module_id, custom_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, module_id, custom_id, name, description, created_at, updated_at
            "#,
        )
        .bind(module_id)
        .bind(&custom_id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| EngineError::from_insert(e, &custom_id))?;

        grant_on_new_resource(&mut tx, AccessLevel::Task, task.id, owner.manager_id, created_by)
            .await?;

        tx.commit().await?;

        info!(
            task_id = %task.id,
            custom_id = %task.custom_id,
            module_id = %module_id,
            "Task created"
        );

        Ok(task)
    }

    /// Creates an activity under a task
    pub async fn create_activity(
        &self,
        task_id: Uuid,
        data: CreateResource,
        created_by: Uuid,
    ) -> EngineResult<Activity> {
        data.validate()?;

        let mut tx = self.db.begin().await?;

        lock_parent_row(&mut tx, "tasks", task_id)
            .await?
            .then_some(())
            .ok_or_else(|| EngineError::not_found("task", task_id))?;

        let owner = require_active_owner(&mut tx, AccessLevel::Task, task_id).await?;

        let custom_id =
            next_custom_id(&mut tx, "activities", ACTIVITY_PREFIX, Some(("task_id", task_id)))
                .await?;

        let activity: Activity = sqlx::query_as(
            r#"
            INSERT INTO activities (task_id, custom_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, task_id, custom_id, name, description, created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(&custom_id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| EngineError::from_insert(e, &custom_id))?;

        grant_on_new_resource(
            &mut tx,
            AccessLevel::Activity,
            activity.id,
            owner.manager_id,
            created_by,
        )
        .await?;

        tx.commit().await?;

        info!(
            activity_id = %activity.id,
            custom_id = %activity.custom_id,
            task_id = %task_id,
            "Activity created"
        );

        Ok(activity)
    }

    /// Deletes a project and everything under it
    ///
    /// One transaction, dependency order: time logs, activity grants,
    /// activities, task grants, tasks, module grants, modules, membership,
    /// project row. Deletion is allowed in any project status.
    pub async fn delete_project(&self, project_id: Uuid) -> EngineResult<()> {
        let mut tx = self.db.begin().await?;

        lock_parent_row(&mut tx, "projects", project_id)
            .await?
            .then_some(())
            .ok_or_else(|| EngineError::not_found("project", project_id))?;

        sqlx::query("DELETE FROM time_logs WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

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
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM activities
            WHERE task_id IN (
                SELECT t.id FROM tasks t
                JOIN modules m ON t.module_id = m.id
                WHERE m.project_id = $1
            )
            "#,
        )
        .bind(project_id)
        .execute(&mut *tx)
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
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM tasks WHERE module_id IN (SELECT id FROM modules WHERE project_id = $1)",
        )
        .bind(project_id)
        .execute(&mut *tx)
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
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM modules WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM project_members WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(project_id = %project_id, "Project deleted");
        Ok(())
    }

    /// Deletes a module and everything under it
    ///
    /// Requires the owning project to be active.
    pub async fn delete_module(&self, module_id: Uuid) -> EngineResult<()> {
        let mut tx = self.db.begin().await?;

        require_active_owner(&mut tx, AccessLevel::Module, module_id).await?;

        sqlx::query("DELETE FROM time_logs WHERE module_id = $1")
            .bind(module_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            DELETE FROM activity_access aa
            USING activities a, tasks t
            WHERE aa.activity_id = a.id
              AND a.task_id = t.id
              AND t.module_id = $1
            "#,
        )
        .bind(module_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM activities WHERE task_id IN (SELECT id FROM tasks WHERE module_id = $1)",
        )
        .bind(module_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM task_access ta
            USING tasks t
            WHERE ta.task_id = t.id
              AND t.module_id = $1
            "#,
        )
        .bind(module_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM tasks WHERE module_id = $1")
            .bind(module_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM module_access WHERE module_id = $1")
            .bind(module_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(module_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(module_id = %module_id, "Module deleted");
        Ok(())
    }

    /// Deletes a task and everything under it
    ///
    /// Requires the owning project to be active.
    pub async fn delete_task(&self, task_id: Uuid) -> EngineResult<()> {
        let mut tx = self.db.begin().await?;

        require_active_owner(&mut tx, AccessLevel::Task, task_id).await?;

        sqlx::query("DELETE FROM time_logs WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            DELETE FROM activity_access aa
            USING activities a
            WHERE aa.activity_id = a.id
              AND a.task_id = $1
            "#,
        )
        .bind(task_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM activities WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM task_access WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(task_id = %task_id, "Task deleted");
        Ok(())
    }

    /// Deletes an activity, its grants, and its time logs
    ///
    /// Requires the owning project to be active.
    pub async fn delete_activity(&self, activity_id: Uuid) -> EngineResult<()> {
        let mut tx = self.db.begin().await?;

        require_active_owner(&mut tx, AccessLevel::Activity, activity_id).await?;

        sqlx::query("DELETE FROM time_logs WHERE activity_id = $1")
            .bind(activity_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM activity_access WHERE activity_id = $1")
            .bind(activity_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(activity_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(activity_id = %activity_id, "Activity deleted");
        Ok(())
    }
}

/// Locks a parent row for the transaction; returns false when absent
///
/// The lock serializes child-identifier generation under one parent.
async fn lock_parent_row(
    conn: &mut PgConnection,
    table: &str,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let locked: Option<(i32,)> =
        sqlx::query_as(&format!("SELECT 1 FROM {table} WHERE id = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(locked.is_some())
}

/// Gives the current manager baseline access to a freshly created resource
async fn grant_on_new_resource(
    conn: &mut PgConnection,
    level: AccessLevel,
    resource_id: Uuid,
    manager_id: Uuid,
    granted_by: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO {} ({}, user_id, granted_by) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        level.table(),
        level.resource_column(),
    ))
    .bind(resource_id)
    .bind(manager_id)
    .bind(granted_by)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
