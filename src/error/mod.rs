//! # Error Module
//!
//! Error types for picsort.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - every error names the path it concerns
//! - **Fatal vs isolated** - scan and hash errors end the run, action
//!   errors become failure records, metadata errors degrade to a fallback

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum PicsortError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Sidecar error: {0}")]
    Sidecar(#[from] SidecarError),

    #[error("Action failed: {0}")]
    Action(#[from] ActionError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error(transparent)]
    Pool(#[from] WorkerPanic),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while discovering pictures
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while computing a content digest
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Hashing pool failed: {0}")]
    Pool(#[from] WorkerPanic),
}

/// Errors from capture metadata resolution.
///
/// A file without EXIF data is not an error; these variants mean the
/// resolver could not do its job at all.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read metadata from {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed EXIF data in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// Errors from locating or rewriting XMP sidecars
#[derive(Error, Debug)]
pub enum SidecarError {
    #[error("Failed to access sidecar {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse sidecar {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Sidecar {path} has no rdf:Description element")]
    MissingDescription { path: PathBuf },

    #[error("Sidecar {path} has no crs:RawFileName attribute")]
    MissingRawFileName { path: PathBuf },
}

/// Errors raised while executing a single planned action
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {source_path} to {destination}: {source}")]
    Copy {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination has no parent directory: {path}")]
    NoParent { path: PathBuf },

    #[error(transparent)]
    Sidecar(#[from] SidecarError),
}

/// Errors that occur when persisting the failure report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One or more pool workers panicked instead of returning
#[derive(Error, Debug)]
#[error("{panicked} of {workers} workers panicked")]
pub struct WorkerPanic {
    pub panicked: usize,
    pub workers: usize,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PicsortError>;
