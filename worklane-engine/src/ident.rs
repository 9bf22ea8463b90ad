/// Sequential custom-identifier generation
///
/// Entities carry a human-readable `PREFIX-NNN` identifier next to their
/// primary key: `PRO-001` globally for projects, `MOD-001` per project,
/// `TSK-001` per module, `ACT-001` per task. The next id is derived from the
/// highest existing one in the scope, so generation MUST run inside the same
/// transaction as the insert: that transaction is the only thing standing
/// between two concurrent creations and a duplicate identifier.

use sqlx::PgConnection;
use uuid::Uuid;

/// Identifier prefix for projects
pub const PROJECT_PREFIX: &str = "PRO";
/// Identifier prefix for modules
pub const MODULE_PREFIX: &str = "MOD";
/// Identifier prefix for tasks
pub const TASK_PREFIX: &str = "TSK";
/// Identifier prefix for activities
pub const ACTIVITY_PREFIX: &str = "ACT";

/// Computes the identifier that follows `last` in a sequence
///
/// `None` (empty scope) starts the sequence at `PREFIX-001`. The numeric
/// suffix is zero-padded to three digits and keeps growing past `999`.
pub fn next_in_sequence(prefix: &str, last: Option<&str>) -> String {
    let next = last
        .and_then(|id| id.rsplit('-').next())
        .and_then(|suffix| suffix.parse::<u64>().ok())
        .map_or(1, |n| n + 1);

    format!("{prefix}-{next:03}")
}

/// Fetches the next custom identifier for a table, optionally scoped to a
/// parent row, on the caller's transaction
///
/// Ordering is by suffix length before text so `PREFIX-1000` ranks above
/// `PREFIX-999`.
///
/// The `table` and parent-column names are compile-time constants supplied by
/// the lifecycle controller, never user input.
pub(crate) async fn next_custom_id(
    conn: &mut PgConnection,
    table: &str,
    prefix: &str,
    parent: Option<(&str, Uuid)>,
) -> Result<String, sqlx::Error> {
    let pattern = format!("{prefix}-%");

    let last: Option<String> = match parent {
        Some((parent_column, parent_id)) => {
            sqlx::query_scalar(&format!(
                "SELECT custom_id FROM {table} WHERE {parent_column} = $1 AND custom_id LIKE $2 \
                 ORDER BY LENGTH(custom_id) DESC, custom_id DESC LIMIT 1",
            ))
            .bind(parent_id)
            .bind(&pattern)
            .fetch_optional(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_scalar(&format!(
                "SELECT custom_id FROM {table} WHERE custom_id LIKE $1 \
                 ORDER BY LENGTH(custom_id) DESC, custom_id DESC LIMIT 1",
            ))
            .bind(&pattern)
            .fetch_optional(&mut *conn)
            .await?
        }
    };

    Ok(next_in_sequence(prefix, last.as_deref()))
}
