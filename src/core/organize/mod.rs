//! Sorted-copy planning and execution.
//!
//! The planner turns hash groups into copy and sidecar-rewrite actions; the
//! executor performs them on a worker pool.

mod executor;
mod planner;
mod types;

pub use executor::{execute_action, DirectoryGuard, ExecutionPool};
pub use planner::ActionPlanner;
pub use types::*;
