//! File filtering logic for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Extensions picsort treats as pictures (compared case-insensitively)
pub const PICTURE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "psd", "nef", "cr2", "png"];

/// Filters files to determine if they are supported pictures
pub struct PictureFilter {
    extensions: HashSet<String>,
    include_hidden: bool,
}

impl PictureFilter {
    /// Create a new filter with the default picture extensions
    pub fn new() -> Self {
        Self {
            extensions: PICTURE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_hidden: true,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for PictureFilter {
    fn default() -> Self {
        Self::new()
    }
}
