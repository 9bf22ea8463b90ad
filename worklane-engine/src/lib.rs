//! # Worklane Engine
//!
//! Core services for the Worklane project hierarchy: derived team membership,
//! per-level access grants with cascading revocation, and atomic manager
//! reassignment.
//!
//! ## Module Organization
//!
//! - `subtree`: Transitive reporting-subtree resolution
//! - `sync`: Project team synchronization (single project and full sweep)
//! - `access`: Grant/revoke at module, task, and activity level
//! - `reassign`: Manager reassignment (wipe, resync, regrant)
//! - `lifecycle`: Project/module/task/activity CRUD and deletion cascades
//! - `ident`: Sequential custom-identifier generation
//! - `owner`: Owner-chain lookup for nested resources
//! - `notify`: Fire-and-forget notification delivery
//! - `error`: The engine error type
//!
//! ## Consistency model
//!
//! Every multi-step mutation runs inside a single transaction created by the
//! top-level operation; nested helpers take the open connection as a
//! parameter and never begin transactions of their own. Membership and grant
//! state is always read fresh from the store; the self-healing sweep depends
//! on never caching either.

pub mod access;
pub mod error;
pub mod ident;
pub mod lifecycle;
pub mod notify;
pub mod owner;
pub mod reassign;
pub mod subtree;
pub mod sync;

pub use error::{EngineError, EngineResult};

/// Current version of the Worklane engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
