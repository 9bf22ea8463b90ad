/// Error handling for the engine
///
/// All engine operations return `EngineResult<T>`. Multi-step mutations roll
/// back their whole transaction on any failure, so an error never leaves a
/// partially applied cascade behind. The variants map one-to-one onto the
/// failure modes callers need to distinguish; message formatting is left to
/// the API layer.

use uuid::Uuid;
use worklane_shared::models::user::UserStatus;

/// Engine result type alias
pub type EngineResult<T> = Result<T, EngineError>;

/// Unified engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A referenced entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind ("project", "module", "task", "activity", "user")
        kind: &'static str,
        /// The missing ID
        id: Uuid,
    },

    /// The manager candidate is not in an assignable employment status
    #[error("User {user_id} cannot manage projects: status is {status}")]
    InvalidManagerStatus {
        /// The rejected candidate
        user_id: Uuid,
        /// Their current status
        status: UserStatus,
    },

    /// A generated custom identifier collided with an existing one
    ///
    /// Should not occur given transactional generation, but is surfaced
    /// rather than swallowed when it does.
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// Attempt to revoke the current project manager's access
    #[error("The current project manager's access cannot be revoked")]
    ProtectedRoleViolation,

    /// Mutation attempted on a project that is not active
    #[error("Project {0} is not active")]
    ProjectNotActive(Uuid),

    /// Caller lacks the role or relationship required
    #[error("Not authorized to perform this operation")]
    Unauthorized,

    /// Request input failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl EngineError {
    /// Shorthand for a `NotFound` error
    pub fn not_found(kind: &'static str, id: Uuid) -> Self {
        EngineError::NotFound { kind, id }
    }

    /// Maps an insert failure to `DuplicateIdentifier` when the violated
    /// constraint is a custom-id uniqueness key
    pub(crate) fn from_insert(err: sqlx::Error, custom_id: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err
                .constraint()
                .is_some_and(|c| c.contains("custom_id"))
            {
                return EngineError::DuplicateIdentifier(custom_id.to_string());
            }
        }
        EngineError::Database(err)
    }
}
