/// Read-only lookups into the employee directory
///
/// The engine never mutates employee records; it only needs two facts about a
/// user: their employment status (to decide whether they can take over a
/// project) and who they report to. `UserDirectory` is that boundary.
///
/// Missing users come back as `None`; absence is a valid transient state
/// during org setup, and the caller decides whether it is an error.
///
/// # Example
///
/// ```no_run
/// use worklane_shared::directory::UserDirectory;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let directory = UserDirectory::new(pool);
///
/// if let Some(status) = directory.get_status(user_id).await? {
///     println!("status: {}", status.as_str());
/// }
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{User, UserStatus};

/// Read-side view of the employee directory
#[derive(Debug, Clone)]
pub struct UserDirectory {
    /// Database connection pool
    db: PgPool,
}

impl UserDirectory {
    /// Creates a new directory view
    pub fn new(db: PgPool) -> Self {
        UserDirectory { db }
    }

    /// Looks up a user's employment status
    ///
    /// Returns `None` if the user does not exist.
    pub async fn get_status(&self, user_id: Uuid) -> Result<Option<UserStatus>, sqlx::Error> {
        let status: Option<UserStatus> =
            sqlx::query_scalar("SELECT status FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(status)
    }

    /// Looks up the manager a user reports to
    ///
    /// Returns `None` when the user does not exist or sits at the top of the
    /// reporting forest.
    pub async fn get_reporting_manager(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let manager: Option<Option<Uuid>> =
            sqlx::query_scalar("SELECT reporting_manager_id FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(manager.flatten())
    }

    /// Fetches the full user record
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        User::find_by_id(&self.db, user_id).await
    }
}
