/// Integration tests for the project lifecycle controller
///
/// Requires a running PostgreSQL database (see tests/common/mod.rs).

mod common;

use chrono::Utc;
use common::TestContext;
use worklane_engine::error::EngineError;
use worklane_engine::lifecycle::{CreateResource, UpdateProject};
use worklane_shared::models::activity::Activity;
use worklane_shared::models::member::ProjectMember;
use worklane_shared::models::module::Module;
use worklane_shared::models::project::{Project, ProjectStatus};
use worklane_shared::models::task::Task;
use worklane_shared::models::time_log::{CreateTimeLog, TimeLog};

/// Modules under one project number sequentially; a different project
/// starts its own sequence
#[tokio::test]
async fn test_module_identifiers_are_scoped_to_project() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let project_a = ctx.project(manager.id).await.unwrap();
    let project_b = ctx.project(manager.id).await.unwrap();

    let m1 = ctx.module(project_a.id).await.unwrap();
    let m2 = ctx.module(project_a.id).await.unwrap();
    let m3 = ctx.module(project_a.id).await.unwrap();
    assert_eq!(m1.custom_id, "MOD-001");
    assert_eq!(m2.custom_id, "MOD-002");
    assert_eq!(m3.custom_id, "MOD-003");

    let other = ctx.module(project_b.id).await.unwrap();
    assert_eq!(other.custom_id, "MOD-001");

    ctx.cleanup_project(project_a.id).await.unwrap();
    ctx.cleanup_project(project_b.id).await.unwrap();
}

/// Tasks number per module and activities per task
#[tokio::test]
async fn test_nested_identifier_scopes() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let project = ctx.project(manager.id).await.unwrap();
    let module_a = ctx.module(project.id).await.unwrap();
    let module_b = ctx.module(project.id).await.unwrap();

    let t1 = ctx.task(module_a.id).await.unwrap();
    let t2 = ctx.task(module_a.id).await.unwrap();
    assert_eq!(t1.custom_id, "TSK-001");
    assert_eq!(t2.custom_id, "TSK-002");

    // A sibling module starts its own task sequence
    let t_other = ctx.task(module_b.id).await.unwrap();
    assert_eq!(t_other.custom_id, "TSK-001");

    let a1 = ctx.activity(t1.id).await.unwrap();
    let a2 = ctx.activity(t1.id).await.unwrap();
    assert_eq!(a1.custom_id, "ACT-001");
    assert_eq!(a2.custom_id, "ACT-002");

    ctx.cleanup_project(project.id).await.unwrap();
}

/// Projects draw from a global PRO sequence and start active today
#[tokio::test]
async fn test_project_creation_defaults() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let project = ctx.project(manager.id).await.unwrap();

    assert!(project.custom_id.starts_with("PRO-"));
    assert_eq!(project.status, ProjectStatus::Active);
    assert_eq!(project.start_date, Utc::now().date_naive());
    assert!(project.end_date.is_none());

    // Creation synced the initial team
    assert!(ProjectMember::is_member(&ctx.db, project.id, manager.id)
        .await
        .unwrap());

    ctx.cleanup_project(project.id).await.unwrap();
}

/// Creating a project under an unassignable manager fails
#[tokio::test]
async fn test_project_creation_validates_manager() {
    let ctx = TestContext::new().await.unwrap();

    let resigned = ctx
        .user_with_status(worklane_shared::models::user::UserStatus::Resigned)
        .await
        .unwrap();

    let result = ctx
        .lifecycle
        .create_project(
            worklane_engine::lifecycle::CreateProject {
                name: "Doomed".to_string(),
                description: None,
                manager_id: resigned.id,
            },
            ctx.admin.id,
        )
        .await;
    assert!(matches!(result, Err(EngineError::InvalidManagerStatus { .. })));
}

/// Leaving `active` without an explicit end date backfills today
#[tokio::test]
async fn test_status_transition_sets_end_date() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let project = ctx.project(manager.id).await.unwrap();

    let updated = ctx
        .lifecycle
        .update_project(
            project.id,
            UpdateProject {
                status: Some(ProjectStatus::Completed),
                ..Default::default()
            },
            ctx.admin.id,
        )
        .await
        .unwrap();

    assert_eq!(updated.status, ProjectStatus::Completed);
    assert_eq!(updated.end_date, Some(Utc::now().date_naive()));

    ctx.cleanup_project(project.id).await.unwrap();
}

/// An update that names a new manager routes through reassignment
#[tokio::test]
async fn test_update_with_manager_change_reassigns() {
    let ctx = TestContext::new().await.unwrap();

    let old_manager = ctx.manager().await.unwrap();
    let new_manager = ctx.manager().await.unwrap();
    let project = ctx.project(old_manager.id).await.unwrap();

    let updated = ctx
        .lifecycle
        .update_project(
            project.id,
            UpdateProject {
                manager_id: Some(new_manager.id),
                ..Default::default()
            },
            ctx.admin.id,
        )
        .await
        .unwrap();

    assert_eq!(updated.manager_id, new_manager.id);
    assert!(ProjectMember::is_member(&ctx.db, project.id, new_manager.id)
        .await
        .unwrap());
    assert!(!ProjectMember::is_member(&ctx.db, project.id, old_manager.id)
        .await
        .unwrap());

    ctx.cleanup_project(project.id).await.unwrap();
}

/// Deleting a project removes modules, tasks, activities, grants,
/// membership, and time logs; queries by the old id come back empty
#[tokio::test]
async fn test_project_deletion_cascade_is_complete() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let worker = ctx.user(Some(manager.id)).await.unwrap();
    let (project, module, task, activity) = ctx.resource_tree(manager.id).await.unwrap();

    TimeLog::create(
        &ctx.db,
        CreateTimeLog {
            user_id: worker.id,
            project_id: project.id,
            module_id: module.id,
            task_id: task.id,
            activity_id: activity.id,
            work_date: Utc::now().date_naive(),
            hours: 6.5,
            note: Some("wiring".to_string()),
        },
    )
    .await
    .unwrap();

    ctx.lifecycle.delete_project(project.id).await.unwrap();

    assert!(Project::find_by_id(&ctx.db, project.id).await.unwrap().is_none());
    assert!(Module::find_by_id(&ctx.db, module.id).await.unwrap().is_none());
    assert!(Task::find_by_id(&ctx.db, task.id).await.unwrap().is_none());
    assert!(Activity::find_by_id(&ctx.db, activity.id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        ProjectMember::count_by_project(&ctx.db, project.id)
            .await
            .unwrap(),
        0
    );
    assert_eq!(TimeLog::count_by_project(&ctx.db, project.id).await.unwrap(), 0);

    // Deleting again reports the project as missing
    let result = ctx.lifecycle.delete_project(project.id).await;
    assert!(matches!(result, Err(EngineError::NotFound { kind: "project", .. })));
}

/// Deleting a module removes its subtree but not its siblings
#[tokio::test]
async fn test_module_deletion_subcascade() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let (project, module, task, activity) = ctx.resource_tree(manager.id).await.unwrap();
    let sibling = ctx.module(project.id).await.unwrap();

    ctx.lifecycle.delete_module(module.id).await.unwrap();

    assert!(Module::find_by_id(&ctx.db, module.id).await.unwrap().is_none());
    assert!(Task::find_by_id(&ctx.db, task.id).await.unwrap().is_none());
    assert!(Activity::find_by_id(&ctx.db, activity.id)
        .await
        .unwrap()
        .is_none());
    assert!(Module::find_by_id(&ctx.db, sibling.id).await.unwrap().is_some());

    ctx.cleanup_project(project.id).await.unwrap();
}

/// Resources cannot be added to a non-active project
#[tokio::test]
async fn test_resource_creation_requires_active_project() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let project = ctx.project(manager.id).await.unwrap();

    ctx.lifecycle
        .update_project(
            project.id,
            UpdateProject {
                status: Some(ProjectStatus::OnHold),
                ..Default::default()
            },
            ctx.admin.id,
        )
        .await
        .unwrap();

    let result = ctx
        .lifecycle
        .create_module(
            project.id,
            CreateResource {
                name: "Too late".to_string(),
                description: None,
            },
            ctx.admin.id,
        )
        .await;
    assert!(matches!(result, Err(EngineError::ProjectNotActive(id)) if id == project.id));

    ctx.cleanup_project(project.id).await.unwrap();
}

/// Empty names are rejected before touching the database
#[tokio::test]
async fn test_input_validation() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let result = ctx
        .lifecycle
        .create_project(
            worklane_engine::lifecycle::CreateProject {
                name: String::new(),
                description: None,
                manager_id: manager.id,
            },
            ctx.admin.id,
        )
        .await;
    assert!(matches!(result, Err(EngineError::Validation(_))));
}
