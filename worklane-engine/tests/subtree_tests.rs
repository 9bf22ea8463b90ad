/// Integration tests for reporting-subtree resolution
///
/// Requires a running PostgreSQL database (see tests/common/mod.rs).

mod common;

use common::TestContext;
use worklane_shared::models::user::User;

/// A manager with direct reports [A, B] where A has direct report C resolves
/// to exactly {A, B, C}
#[tokio::test]
async fn test_subtree_includes_indirect_reports() {
    let ctx = TestContext::new().await.unwrap();

    let manager = ctx.manager().await.unwrap();
    let a = ctx.user(Some(manager.id)).await.unwrap();
    let b = ctx.user(Some(manager.id)).await.unwrap();
    let c = ctx.user(Some(a.id)).await.unwrap();

    let subtree = ctx.subtree.resolve(manager.id).await.unwrap();

    assert_eq!(subtree.len(), 3);
    assert!(subtree.contains(&a.id));
    assert!(subtree.contains(&b.id));
    assert!(subtree.contains(&c.id));
    assert!(!subtree.contains(&manager.id), "manager is not their own report");
}

/// A user with no reports resolves to the empty set
#[tokio::test]
async fn test_subtree_of_leaf_is_empty() {
    let ctx = TestContext::new().await.unwrap();

    let leaf = ctx.user(None).await.unwrap();

    let subtree = ctx.subtree.resolve(leaf.id).await.unwrap();
    assert!(subtree.is_empty());
}

/// A reporting cycle (corrupted data) terminates and yields a finite set
#[tokio::test]
async fn test_subtree_terminates_on_cycle() {
    let ctx = TestContext::new().await.unwrap();

    let x = ctx.user(None).await.unwrap();
    let y = ctx.user(Some(x.id)).await.unwrap();

    // Corrupt the graph: x reports to y, y reports to x
    User::set_reporting_manager(&ctx.db, x.id, Some(y.id))
        .await
        .unwrap();

    let subtree = ctx.subtree.resolve(x.id).await.unwrap();

    // y is reachable; the cycle back through x is not re-expanded
    assert!(subtree.contains(&y.id));
    assert!(!subtree.contains(&x.id));
    assert_eq!(subtree.len(), 1);
}
