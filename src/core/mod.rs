//! # Core Module
//!
//! The picture sorting engine.
//!
//! ## Modules
//! - `scanner` - Discovers pictures in directories
//! - `digest` - Computes content digests
//! - `pool` - Bounded worker pool shared by the parallel phases
//! - `grouping` - Groups pictures with identical content
//! - `metadata` - Reads camera model and capture date from EXIF
//! - `sidecar` - Finds and rewrites XMP sidecars
//! - `organize` - Plans and executes the sorted copy
//! - `verify` - Checks a sorted tree against its digest labels
//! - `reporter` - Writes the failure report
//! - `pipeline` - Orchestrates the full workflow

pub mod digest;
pub mod grouping;
pub mod metadata;
pub mod organize;
pub mod pipeline;
pub mod pool;
pub mod reporter;
pub mod scanner;
pub mod sidecar;
pub mod verify;

// Re-export commonly used types
pub use digest::{Digest, DigestKind};
pub use grouping::{Group, GroupMap};
pub use organize::{Action, FailureRecord};
pub use pipeline::Pipeline;
