//! # Worklane Reconciler
//!
//! Long-running worker that keeps project member sets consistent with the
//! reporting hierarchy. Reporting lines change in the HR flows without any
//! project being touched; this worker periodically sweeps every active
//! project through the team synchronizer so membership and grants converge
//! back to the derived invariant.

pub mod config;
pub mod sweeper;
