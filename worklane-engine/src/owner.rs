/// Owner-chain lookup for nested resources
///
/// Every grant/revoke decision needs the same three facts about the project
/// that transitively owns a resource: its id, its current manager, and its
/// status. This module is the single place that join chain lives; the
/// per-level services must not re-derive it.

use sqlx::PgConnection;
use uuid::Uuid;

use worklane_shared::models::access::AccessLevel;
use worklane_shared::models::project::ProjectStatus;

/// The owning project of a module, task, or activity
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnerChain {
    /// Owning project
    pub project_id: Uuid,

    /// The project's current manager
    pub manager_id: Uuid,

    /// The project's lifecycle status
    pub project_status: ProjectStatus,
}

/// Resolves the owning project of a resource at the given level
///
/// Returns `None` when the resource does not exist.
pub async fn owner_chain_of(
    conn: &mut PgConnection,
    level: AccessLevel,
    resource_id: Uuid,
) -> Result<Option<OwnerChain>, sqlx::Error> {
    let sql = match level {
        AccessLevel::Module => {
            r#"
            SELECT p.id AS project_id, p.manager_id, p.status AS project_status
            FROM projects p
            JOIN modules m ON m.project_id = p.id
            WHERE m.id = $1
            "#
        }
        AccessLevel::Task => {
            r#"
            SELECT p.id AS project_id, p.manager_id, p.status AS project_status
            FROM projects p
            JOIN modules m ON m.project_id = p.id
            JOIN tasks t ON t.module_id = m.id
            WHERE t.id = $1
            "#
        }
        AccessLevel::Activity => {
            r#"
            SELECT p.id AS project_id, p.manager_id, p.status AS project_status
            FROM projects p
            JOIN modules m ON m.project_id = p.id
            JOIN tasks t ON t.module_id = m.id
            JOIN activities a ON a.task_id = t.id
            WHERE a.id = $1
            "#
        }
    };

    sqlx::query_as::<_, OwnerChain>(sql)
        .bind(resource_id)
        .fetch_optional(&mut *conn)
        .await
}
