//! # Sidecar Module
//!
//! XMP edit sidecars live next to the picture they describe
//! (`IMG_0001.CR2` + `IMG_0001.xmp`) and name that picture in the
//! `crs:RawFileName` attribute. When a picture is renamed its sidecars
//! must be rewritten to point at the new name.

mod rewrite;

pub use rewrite::{patch_raw_file_name, rewrite_sidecar};

use crate::error::SidecarError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Extension used for sidecar files
pub const SIDECAR_EXTENSION: &str = "xmp";

/// A sidecar found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidecar {
    pub path: PathBuf,
    /// Last status change (ctime) on Unix, last modification elsewhere
    pub changed: SystemTime,
}

/// Finds the sidecar belonging to a picture
pub trait SidecarLocator: Send + Sync {
    fn locate(&self, picture: &Path) -> Result<Option<Sidecar>, SidecarError>;
}

/// Looks for `<stem>.xmp` in the picture's directory
#[derive(Debug, Clone, Copy, Default)]
pub struct XmpSidecarLocator;

impl XmpSidecarLocator {
    /// Where a picture's sidecar would be
    pub fn sidecar_path(picture: &Path) -> Option<PathBuf> {
        let stem = picture.file_stem()?;
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(SIDECAR_EXTENSION);
        Some(picture.with_file_name(name))
    }
}

impl SidecarLocator for XmpSidecarLocator {
    fn locate(&self, picture: &Path) -> Result<Option<Sidecar>, SidecarError> {
        let Some(path) = Self::sidecar_path(picture) else {
            return Ok(None);
        };

        let metadata = match fs::metadata(&path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SidecarError::Io { path, source }),
        };

        Ok(Some(Sidecar {
            changed: change_time(&metadata),
            path,
        }))
    }
}

#[cfg(unix)]
fn change_time(metadata: &fs::Metadata) -> SystemTime {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let secs = u64::try_from(metadata.ctime()).unwrap_or(0);
    let nanos = u32::try_from(metadata.ctime_nsec()).unwrap_or(0);
    UNIX_EPOCH + Duration::new(secs, nanos)
}

#[cfg(not(unix))]
fn change_time(metadata: &fs::Metadata) -> SystemTime {
    metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn sidecar_path_replaces_extension() {
        assert_eq!(
            XmpSidecarLocator::sidecar_path(Path::new("/photos/IMG_0001.CR2")),
            Some(PathBuf::from("/photos/IMG_0001.xmp"))
        );
        assert_eq!(
            XmpSidecarLocator::sidecar_path(Path::new("/photos/pano.v2.nef")),
            Some(PathBuf::from("/photos/pano.v2.xmp"))
        );
    }

    #[test]
    fn locate_finds_existing_sidecar() {
        let temp = TempDir::new().unwrap();
        let picture = temp.path().join("IMG_0001.cr2");
        File::create(&picture).unwrap();
        File::create(temp.path().join("IMG_0001.xmp")).unwrap();

        let sidecar = XmpSidecarLocator.locate(&picture).unwrap().unwrap();
        assert_eq!(sidecar.path, temp.path().join("IMG_0001.xmp"));
        assert!(sidecar.changed > SystemTime::UNIX_EPOCH);
    }

    #[test]
    fn locate_returns_none_without_sidecar() {
        let temp = TempDir::new().unwrap();
        let picture = temp.path().join("IMG_0002.cr2");
        File::create(&picture).unwrap();

        assert!(XmpSidecarLocator.locate(&picture).unwrap().is_none());
    }

    #[test]
    fn directory_named_like_sidecar_is_ignored() {
        let temp = TempDir::new().unwrap();
        let picture = temp.path().join("IMG_0003.cr2");
        File::create(&picture).unwrap();
        fs::create_dir(temp.path().join("IMG_0003.xmp")).unwrap();

        assert!(XmpSidecarLocator.locate(&picture).unwrap().is_none());
    }
}
