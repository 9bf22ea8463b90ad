/// Time-log model
///
/// Rows are written by the timesheet subsystem, which owns entry validation
/// (daily/weekly caps, submission windows). The engine only deletes from this
/// table when a project, module, task, or activity is removed, so the model
/// here is deliberately slim: an insert for the timesheet side and read
/// helpers for cascade verification.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Time-log row: hours booked by a user against an activity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TimeLog {
    /// Unique row ID (UUID v4)
    pub id: Uuid,

    /// User who booked the hours
    pub user_id: Uuid,

    /// Owning project (denormalized for cascade scoping)
    pub project_id: Uuid,

    /// Owning module
    pub module_id: Uuid,

    /// Owning task
    pub task_id: Uuid,

    /// Activity the hours were booked against
    pub activity_id: Uuid,

    /// Day the work was performed
    pub work_date: NaiveDate,

    /// Hours booked
    pub hours: f64,

    /// Optional note
    pub note: Option<String>,

    /// When the row was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a time-log row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeLog {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub module_id: Uuid,
    pub task_id: Uuid,
    pub activity_id: Uuid,
    pub work_date: NaiveDate,
    pub hours: f64,
    pub note: Option<String>,
}

impl TimeLog {
    /// Creates a time-log row
    pub async fn create(pool: &PgPool, data: CreateTimeLog) -> Result<Self, sqlx::Error> {
        let log = sqlx::query_as::<_, TimeLog>(
            r#"
            INSERT INTO time_logs (user_id, project_id, module_id, task_id, activity_id, work_date, hours, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, project_id, module_id, task_id, activity_id,
                      work_date, hours, note, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.project_id)
        .bind(data.module_id)
        .bind(data.task_id)
        .bind(data.activity_id)
        .bind(data.work_date)
        .bind(data.hours)
        .bind(data.note)
        .fetch_one(pool)
        .await?;

        Ok(log)
    }

    /// Counts the time-log rows under a project
    pub async fn count_by_project(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM time_logs WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Counts the time-log rows under an activity
    pub async fn count_by_activity(pool: &PgPool, activity_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM time_logs WHERE activity_id = $1")
                .bind(activity_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
