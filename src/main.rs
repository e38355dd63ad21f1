//! # picsort CLI
//!
//! Deduplicates pictures by content and copies the unique ones into a
//! `<camera>/<year>/<month>/<day>` tree.
//!
//! ## Usage
//! ```bash
//! picsort ~/card-dump --output ~/Pictures/sorted
//! picsort ~/Pictures/sorted --verify
//! ```

mod cli;

use picsort::Result;

fn main() -> Result<()> {
    cli::run()
}
