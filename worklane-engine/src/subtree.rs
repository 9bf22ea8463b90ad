/// Reporting-subtree resolution
///
/// Computes the transitive closure of "reports to M, directly or indirectly"
/// over the `reporting_manager_id` relation. This is the input to every team
/// sync: a project's member set is its manager plus this subtree.
///
/// The traversal is an explicit breadth-first worklist with a visited set
/// rather than a recursive SQL query, so termination is guaranteed by
/// construction even when the reporting graph has been corrupted into a
/// cycle. Each round fetches the next level of reports for the whole
/// frontier in one query.
///
/// # Example
///
/// ```no_run
/// use worklane_engine::subtree::SubtreeResolver;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, manager_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = SubtreeResolver::new(pool);
/// let reports = resolver.resolve(manager_id).await?;
/// println!("{} transitive reports", reports.len());
/// # Ok(())
/// # }
/// ```

use sqlx::{PgConnection, PgPool};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::EngineResult;

/// Resolves the transitive reporting subtree of a manager
#[derive(Debug, Clone)]
pub struct SubtreeResolver {
    /// Database connection pool
    db: PgPool,
}

impl SubtreeResolver {
    /// Creates a new resolver
    pub fn new(db: PgPool) -> Self {
        SubtreeResolver { db }
    }

    /// Computes the full set of direct and indirect reports of a manager
    ///
    /// Returns an empty set for a user with no reports (including a user
    /// that does not exist; a pure read never errors on absence).
    ///
    /// # Errors
    ///
    /// Returns an error only if the database is unreachable.
    pub async fn resolve(&self, manager_id: Uuid) -> EngineResult<HashSet<Uuid>> {
        let mut conn = self.db.acquire().await?;
        let subtree = resolve_subtree(&mut conn, manager_id).await?;
        Ok(subtree)
    }
}

/// Worklist traversal over `reporting_manager_id`, on the caller's connection
///
/// The visited set makes the traversal cycle-safe: a user reached twice is
/// never expanded again, so corrupted data (X reports to Y, Y reports to X)
/// yields a finite set instead of a hang. The manager itself is excluded
/// from the result.
pub async fn resolve_subtree(
    conn: &mut PgConnection,
    manager_id: Uuid,
) -> Result<HashSet<Uuid>, sqlx::Error> {
    let mut seen: HashSet<Uuid> = HashSet::new();
    seen.insert(manager_id);

    let mut frontier = vec![manager_id];

    while !frontier.is_empty() {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE reporting_manager_id = ANY($1)")
                .bind(&frontier)
                .fetch_all(&mut *conn)
                .await?;

        frontier = rows
            .into_iter()
            .map(|(id,)| id)
            .filter(|id| seen.insert(*id))
            .collect();
    }

    seen.remove(&manager_id);
    Ok(seen)
}
