//! # picsort
//!
//! Deduplicates pictures by content digest and sorts the unique ones into a
//! tree named from their EXIF data, carrying XMP sidecars along.
//!
//! ## Core Philosophy
//! - **Never touch the inputs** - sorting only ever copies
//! - **Names carry digests** - a sorted tree can be verified later
//! - **Isolate failures** - one bad file never stops the run
//!
//! ## Architecture
//! - `core` - scanning, hashing, planning, execution and verification
//! - `events` - progress reporting over a channel
//! - `error` - error types
//! - `cli` - command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PicsortError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when verbose.
/// Calling it twice is harmless.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
