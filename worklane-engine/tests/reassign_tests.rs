/// Integration tests for manager reassignment
///
/// Requires a running PostgreSQL database (see tests/common/mod.rs).

mod common;

use common::TestContext;
use std::collections::HashSet;
use worklane_engine::error::EngineError;
use worklane_shared::models::access::{AccessGrant, AccessLevel};
use worklane_shared::models::member::ProjectMember;
use worklane_shared::models::user::UserStatus;

/// Reassignment wipes old grants, rebuilds membership from the new
/// manager's subtree, and grants the new manager every existing resource
#[tokio::test]
async fn test_reassignment_resets_access_and_membership() {
    let ctx = TestContext::new().await.unwrap();

    let old_manager = ctx.manager().await.unwrap();
    let old_report = ctx.user(Some(old_manager.id)).await.unwrap();

    let new_manager = ctx.manager().await.unwrap();
    let new_report = ctx.user(Some(new_manager.id)).await.unwrap();

    let (project, module, task, activity) = ctx.resource_tree(old_manager.id).await.unwrap();

    // Grants issued under the old manager's authority
    ctx.access
        .grant(AccessLevel::Module, module.id, old_report.id, ctx.admin.id)
        .await
        .unwrap();
    ctx.access
        .grant(AccessLevel::Task, task.id, old_report.id, ctx.admin.id)
        .await
        .unwrap();

    let project = ctx
        .reassigner
        .reassign_manager(project.id, new_manager.id, ctx.admin.id)
        .await
        .unwrap();
    assert_eq!(project.manager_id, new_manager.id);

    // All prior grants are gone, including the old manager's baseline
    for (level, id, user) in [
        (AccessLevel::Module, module.id, old_report.id),
        (AccessLevel::Task, task.id, old_report.id),
        (AccessLevel::Module, module.id, old_manager.id),
        (AccessLevel::Activity, activity.id, old_manager.id),
    ] {
        assert!(!AccessGrant::exists(&ctx.db, level, id, user).await.unwrap());
    }

    // The new manager holds baseline access to every existing resource
    for (level, id) in [
        (AccessLevel::Module, module.id),
        (AccessLevel::Task, task.id),
        (AccessLevel::Activity, activity.id),
    ] {
        assert!(AccessGrant::exists(&ctx.db, level, id, new_manager.id)
            .await
            .unwrap());
    }

    // Membership is exactly the new manager plus their subtree
    let members = ProjectMember::member_ids(&ctx.db, project.id).await.unwrap();
    let expected: HashSet<_> = [new_manager.id, new_report.id].into_iter().collect();
    assert_eq!(members, expected);

    ctx.cleanup_project(project.id).await.unwrap();
}

/// Candidates on notice or separated are rejected and nothing changes
#[tokio::test]
async fn test_reassignment_rejects_unassignable_status() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let project = ctx.project(manager.id).await.unwrap();

    for status in [
        UserStatus::OnNotice,
        UserStatus::Resigned,
        UserStatus::Terminated,
        UserStatus::Inactive,
    ] {
        let candidate = ctx.user_with_status(status).await.unwrap();

        let result = ctx
            .reassigner
            .reassign_manager(project.id, candidate.id, ctx.admin.id)
            .await;
        assert!(
            matches!(result, Err(EngineError::InvalidManagerStatus { user_id, .. }) if user_id == candidate.id)
        );

        // The rollback leaves the current manager in place
        let current = worklane_shared::models::project::Project::find_by_id(&ctx.db, project.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.manager_id, manager.id);
    }

    ctx.cleanup_project(project.id).await.unwrap();
}

/// Reassigning a missing project or to a missing user is NotFound
#[tokio::test]
async fn test_reassignment_not_found() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let project = ctx.project(manager.id).await.unwrap();
    let missing = uuid::Uuid::new_v4();

    let result = ctx
        .reassigner
        .reassign_manager(missing, manager.id, ctx.admin.id)
        .await;
    assert!(matches!(result, Err(EngineError::NotFound { kind: "project", .. })));

    let result = ctx
        .reassigner
        .reassign_manager(project.id, missing, ctx.admin.id)
        .await;
    assert!(matches!(result, Err(EngineError::NotFound { kind: "user", .. })));

    ctx.cleanup_project(project.id).await.unwrap();
}
