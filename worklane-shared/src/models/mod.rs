/// Database models for Worklane
///
/// This module contains the models for the organizational hierarchy (users
/// with a self-referential reporting relation) and the project resource tree
/// (project → module → task → activity), plus the derived membership and
/// access-grant tables the engine maintains.
///
/// # Models
///
/// - `user`: Employees and the reporting hierarchy
/// - `project`: Top-level projects with an assigned manager
/// - `module` / `task` / `activity`: The three nested resource levels
/// - `member`: Derived project membership rows
/// - `access`: Per-level access grants and the `AccessLevel` discriminant
/// - `time_log`: Timesheet rows (deleted by the engine during cascades)
///
/// Project-tree entities are created exclusively through the engine's
/// lifecycle controller, which owns custom-identifier generation; the models
/// here expose row types and read queries.

pub mod access;
pub mod activity;
pub mod member;
pub mod module;
pub mod project;
pub mod task;
pub mod time_log;
pub mod user;
