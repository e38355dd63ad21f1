//! # Metadata Module
//!
//! Turns a picture's EXIF data into destination directory segments.
//!
//! ## Layout
//! `<camera model>/<year>/<month>/<day>`, with `unknown camera` and
//! `unknown date` standing in for missing tags.
//!
//! ## Failure modes
//! A file with no EXIF block (or a container kamadak-exif doesn't know) is
//! normal and resolves to the unknown segments. A file that can't be read
//! or whose EXIF block is corrupt is a `MetadataError`; the planner logs
//! it and files the picture under [`FALLBACK_SEGMENT`].

use crate::error::MetadataError;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const UNKNOWN_CAMERA: &str = "unknown camera";
pub const UNKNOWN_DATE: &str = "unknown date";
/// Directory used when metadata could not be read at all
pub const FALLBACK_SEGMENT: &str = "bad exif";

/// Resolves the destination sub-directory for a picture
pub trait MetadataResolver: Send + Sync {
    /// Ordered path segments, e.g. `["Canon", "2020", "05", "01"]`
    fn resolve(&self, path: &Path) -> Result<Vec<String>, MetadataError>;
}

/// Capture fields picsort cares about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// Camera model (e.g., "Canon EOS R5")
    pub camera_model: Option<String>,
    /// Original capture date
    pub date_taken: Option<NaiveDate>,
}

impl CaptureMetadata {
    /// Check if any metadata was extracted
    pub fn has_data(&self) -> bool {
        self.camera_model.is_some() || self.date_taken.is_some()
    }

    /// Destination segments for this metadata
    pub fn segments(&self) -> Vec<String> {
        let mut segments = vec![self
            .camera_model
            .as_deref()
            .map(sanitize_segment)
            .unwrap_or_else(|| UNKNOWN_CAMERA.to_string())];

        match self.date_taken {
            Some(date) => {
                segments.push(format!("{:04}", date.year()));
                segments.push(format!("{:02}", date.month()));
                segments.push(format!("{:02}", date.day()));
            }
            None => segments.push(UNKNOWN_DATE.to_string()),
        }

        segments
    }
}

/// Resolver backed by kamadak-exif
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifResolver;

impl MetadataResolver for ExifResolver {
    fn resolve(&self, path: &Path) -> Result<Vec<String>, MetadataError> {
        extract_metadata(path).map(|m| m.segments())
    }
}

/// Extract capture metadata from a picture file
pub fn extract_metadata(path: &Path) -> Result<CaptureMetadata, MetadataError> {
    let file = File::open(path).map_err(|source| MetadataError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut bufreader = BufReader::new(file);
    let exif = match Reader::new().read_from_container(&mut bufreader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(CaptureMetadata::default()),
        Err(exif::Error::InvalidFormat(msg)) if msg == "Unknown image format" => {
            return Ok(CaptureMetadata::default())
        }
        Err(exif::Error::Io(source)) => {
            return Err(MetadataError::Unreadable {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(e) => {
            return Err(MetadataError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    let mut metadata = CaptureMetadata::default();

    if let Some(field) = exif.get_field(Tag::Model, In::PRIMARY) {
        metadata.camera_model = get_string_value(&field.value);
    }

    if let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
        metadata.date_taken = get_string_value(&field.value)
            .as_deref()
            .and_then(parse_exif_date);
    }

    Ok(metadata)
}

/// Parse "YYYY:MM:DD HH:MM:SS", tolerating a missing or broken time part
fn parse_exif_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S") {
        return Some(dt.date());
    }
    let date_part = s.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%Y:%m:%d").ok()
}

/// Helper to extract string from EXIF ASCII value
fn get_string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

/// Keep a metadata value from escaping its directory level
fn sanitize_segment(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "unknown".to_string()
    } else {
        cleaned.to_string()
    }
}
