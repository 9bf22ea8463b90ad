/// Integration tests for access grant management
///
/// Requires a running PostgreSQL database (see tests/common/mod.rs).

mod common;

use common::TestContext;
use worklane_engine::error::EngineError;
use worklane_engine::lifecycle::UpdateProject;
use worklane_shared::models::access::{AccessGrant, AccessLevel};
use worklane_shared::models::project::ProjectStatus;

/// Granting twice is a no-op, not an error
#[tokio::test]
async fn test_grant_is_idempotent() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let user = ctx.user(Some(manager.id)).await.unwrap();
    let (project, module, _task, _activity) = ctx.resource_tree(manager.id).await.unwrap();

    ctx.access
        .grant(AccessLevel::Module, module.id, user.id, ctx.admin.id)
        .await
        .unwrap();
    let snapshot = ctx
        .access
        .grant(AccessLevel::Module, module.id, user.id, ctx.admin.id)
        .await
        .unwrap();

    let holders: Vec<_> = snapshot
        .entries
        .iter()
        .filter(|e| e.user_id == user.id)
        .collect();
    assert_eq!(holders.len(), 1);

    ctx.cleanup_project(project.id).await.unwrap();
}

/// Revoking a module cascades into task and activity grants under it but
/// leaves an unrelated module untouched
#[tokio::test]
async fn test_module_revoke_cascades_downward_only() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let user = ctx.user(Some(manager.id)).await.unwrap();
    let (project, module, task, activity) = ctx.resource_tree(manager.id).await.unwrap();

    let other_module = ctx.module(project.id).await.unwrap();

    for (level, id) in [
        (AccessLevel::Module, module.id),
        (AccessLevel::Task, task.id),
        (AccessLevel::Activity, activity.id),
        (AccessLevel::Module, other_module.id),
    ] {
        ctx.access
            .grant(level, id, user.id, ctx.admin.id)
            .await
            .unwrap();
    }

    ctx.access
        .revoke(AccessLevel::Module, module.id, user.id, ctx.admin.id)
        .await
        .unwrap();

    assert!(!AccessGrant::exists(&ctx.db, AccessLevel::Module, module.id, user.id)
        .await
        .unwrap());
    assert!(!AccessGrant::exists(&ctx.db, AccessLevel::Task, task.id, user.id)
        .await
        .unwrap());
    assert!(!AccessGrant::exists(&ctx.db, AccessLevel::Activity, activity.id, user.id)
        .await
        .unwrap());

    // The unrelated module keeps its grant
    assert!(
        AccessGrant::exists(&ctx.db, AccessLevel::Module, other_module.id, user.id)
            .await
            .unwrap()
    );

    ctx.cleanup_project(project.id).await.unwrap();
}

/// Revoking a task cascades into its activities but not its siblings
#[tokio::test]
async fn test_task_revoke_cascades_to_activities() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let user = ctx.user(Some(manager.id)).await.unwrap();
    let (project, module, task, activity) = ctx.resource_tree(manager.id).await.unwrap();

    ctx.access
        .grant(AccessLevel::Module, module.id, user.id, ctx.admin.id)
        .await
        .unwrap();
    ctx.access
        .grant(AccessLevel::Task, task.id, user.id, ctx.admin.id)
        .await
        .unwrap();
    ctx.access
        .grant(AccessLevel::Activity, activity.id, user.id, ctx.admin.id)
        .await
        .unwrap();

    ctx.access
        .revoke(AccessLevel::Task, task.id, user.id, ctx.admin.id)
        .await
        .unwrap();

    assert!(!AccessGrant::exists(&ctx.db, AccessLevel::Task, task.id, user.id)
        .await
        .unwrap());
    assert!(!AccessGrant::exists(&ctx.db, AccessLevel::Activity, activity.id, user.id)
        .await
        .unwrap());

    // The module-level grant is above the revoked level and survives
    assert!(AccessGrant::exists(&ctx.db, AccessLevel::Module, module.id, user.id)
        .await
        .unwrap());

    ctx.cleanup_project(project.id).await.unwrap();
}

/// The current project manager's access cannot be revoked at any level
#[tokio::test]
async fn test_manager_access_is_protected() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let (project, module, task, activity) = ctx.resource_tree(manager.id).await.unwrap();

    for (level, id) in [
        (AccessLevel::Module, module.id),
        (AccessLevel::Task, task.id),
        (AccessLevel::Activity, activity.id),
    ] {
        let result = ctx.access.revoke(level, id, manager.id, ctx.admin.id).await;
        assert!(matches!(result, Err(EngineError::ProtectedRoleViolation)));

        // The grant is left untouched
        assert!(AccessGrant::exists(&ctx.db, level, id, manager.id)
            .await
            .unwrap());
    }

    ctx.cleanup_project(project.id).await.unwrap();
}

/// Grant and revoke require the owning project to be active
#[tokio::test]
async fn test_mutations_rejected_on_inactive_project() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let user = ctx.user(Some(manager.id)).await.unwrap();
    let (project, module, _task, _activity) = ctx.resource_tree(manager.id).await.unwrap();

    ctx.lifecycle
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

    let result = ctx
        .access
        .grant(AccessLevel::Module, module.id, user.id, ctx.admin.id)
        .await;
    assert!(matches!(result, Err(EngineError::ProjectNotActive(id)) if id == project.id));

    let result = ctx
        .access
        .revoke(AccessLevel::Module, module.id, user.id, ctx.admin.id)
        .await;
    assert!(matches!(result, Err(EngineError::ProjectNotActive(_))));

    ctx.cleanup_project(project.id).await.unwrap();
}

/// The refreshed snapshot marks the current manager
#[tokio::test]
async fn test_snapshot_flags_current_manager() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let user = ctx.user(Some(manager.id)).await.unwrap();
    let (project, module, _task, _activity) = ctx.resource_tree(manager.id).await.unwrap();

    let snapshot = ctx
        .access
        .grant(AccessLevel::Module, module.id, user.id, ctx.admin.id)
        .await
        .unwrap();

    let manager_entry = snapshot
        .entries
        .iter()
        .find(|e| e.user_id == manager.id)
        .expect("manager holds baseline access on the new module");
    assert!(manager_entry.is_current_manager);

    let user_entry = snapshot
        .entries
        .iter()
        .find(|e| e.user_id == user.id)
        .expect("freshly granted user appears in the snapshot");
    assert!(!user_entry.is_current_manager);

    ctx.cleanup_project(project.id).await.unwrap();
}

/// Granting on a missing resource is a NotFound error
#[tokio::test]
async fn test_grant_on_missing_resource() {
    let ctx = TestContext::new().await.unwrap();

    let user = ctx.user(None).await.unwrap();
    let missing = uuid::Uuid::new_v4();

    let result = ctx
        .access
        .grant(AccessLevel::Module, missing, user.id, ctx.admin.id)
        .await;
    assert!(matches!(result, Err(EngineError::NotFound { kind: "module", .. })));
}
