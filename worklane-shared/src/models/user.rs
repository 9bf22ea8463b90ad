/// User model and database operations
///
/// This module provides the User model for employee records. Users form a
/// forest via the nullable `reporting_manager_id` self-reference; the engine
/// derives project membership from this hierarchy.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_status AS ENUM ('active', 'on_notice', 'resigned', 'terminated', 'inactive');
/// CREATE TYPE user_role AS ENUM ('admin', 'manager', 'employee');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     employee_code VARCHAR(32) NOT NULL UNIQUE,
///     email CITEXT NOT NULL UNIQUE,
///     name VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'employee',
///     status user_status NOT NULL DEFAULT 'active',
///     reporting_manager_id UUID REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The reporting graph is expected to be acyclic; that invariant is owned by
/// the employee-administration flows, not enforced here. The engine's subtree
/// traversal tolerates cyclic data regardless.
///
/// # Example
///
/// ```no_run
/// use worklane_shared::models::user::{User, CreateUser, UserRole, UserStatus};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let manager = User::create(&pool, CreateUser {
///     employee_code: "EMP-042".to_string(),
///     email: "manager@example.com".to_string(),
///     name: "A. Manager".to_string(),
///     role: UserRole::Manager,
///     status: UserStatus::Active,
///     reporting_manager_id: None,
/// }).await?;
///
/// let reports = User::direct_reports(&pool, manager.id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Employment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Regular active employee
    Active,

    /// Serving a notice period
    OnNotice,

    /// Resignation processed
    Resigned,

    /// Employment terminated
    Terminated,

    /// Account disabled without a separation event
    Inactive,
}

impl UserStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::OnNotice => "on_notice",
            UserStatus::Resigned => "resigned",
            UserStatus::Terminated => "terminated",
            UserStatus::Inactive => "inactive",
        }
    }

    /// Whether a user in this status may be assigned as a project manager
    ///
    /// Users on notice or already separated cannot take over projects.
    pub fn can_manage_projects(&self) -> bool {
        matches!(self, UserStatus::Active)
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organizational role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// HR/system administrator
    Admin,

    /// Manages projects and a reporting line
    Manager,

    /// Individual contributor
    Employee,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Employee => "employee",
        }
    }
}

/// User model representing an employee record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Human-readable employee code (unique)
    pub employee_code: String,

    /// Email address (case-insensitive via CITEXT)
    pub email: String,

    /// Display name
    pub name: String,

    /// Organizational role
    pub role: UserRole,

    /// Employment status
    pub status: UserStatus,

    /// Direct manager this user reports to (None for roots of the forest)
    pub reporting_manager_id: Option<Uuid>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Employee code (unique)
    pub employee_code: String,

    /// Email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Organizational role
    pub role: UserRole,

    /// Employment status
    pub status: UserStatus,

    /// Direct manager, if any
    pub reporting_manager_id: Option<Uuid>,
}

const USER_COLUMNS: &str =
    "id, employee_code, email, name, role, status, reporting_manager_id, created_at, updated_at";

impl User {
    /// Creates a new user
    ///
    /// Employee CRUD is owned by the HR administration flows; the engine only
    /// reads users. This constructor exists for those flows and for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee code or email already exists, the
    /// referenced manager is missing, or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (employee_code, email, name, role, status, reporting_manager_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.employee_code)
        .bind(data.email)
        .bind(data.name)
        .bind(data.role)
        .bind(data.status)
        .bind(data.reporting_manager_id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists the direct reports of a manager
    ///
    /// Only the immediate level; the engine's subtree resolver walks the full
    /// transitive chain.
    pub async fn direct_reports(pool: &PgPool, manager_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE reporting_manager_id = $1
            ORDER BY employee_code ASC
            "#,
        ))
        .bind(manager_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Moves a user under a different manager (or to the top of the forest)
    ///
    /// Returns true if the user existed. Reporting-line changes do not touch
    /// project membership directly; drift is repaired by the reconciliation
    /// sweep or the next explicit sync.
    pub async fn set_reporting_manager(
        pool: &PgPool,
        id: Uuid,
        manager_id: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET reporting_manager_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(manager_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates a user's employment status
    ///
    /// Returns true if the user existed.
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: UserStatus,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
