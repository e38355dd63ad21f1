//! # Scanner Module
//!
//! Discovers picture files under one or more input roots.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - Photoshop (.psd)
//! - Nikon raw (.nef)
//! - Canon raw (.cr2)
//!
//! Any error while walking a root aborts the scan: a partial view of the
//! inputs would make the dedup result misleading.

mod filter;
mod walker;

pub use filter::{PictureFilter, PICTURE_EXTENSIONS};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use std::path::PathBuf;

/// Trait for picture scanners
pub trait PictureScanner: Send + Sync {
    /// Scan roots and return every discovered picture as an absolute path
    fn scan(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
        self.scan_with_events(paths, &crate::events::null_sender())
    }

    /// Scan with progress reporting via events
    fn scan_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<Vec<PathBuf>, ScanError>;
}
