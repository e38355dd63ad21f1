//! Types for the organize module.

use crate::core::digest::{Digest, DigestKind};
use crate::core::grouping::Group;
use crate::core::sidecar::SIDECAR_EXTENSION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One filesystem operation produced by the planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Copy a picture's bytes, permissions and timestamps
    Copy { source: PathBuf, destination: PathBuf },
    /// Write `source` to `destination` with its raw file name set to `image_name`
    RewriteSidecar {
        source: PathBuf,
        destination: PathBuf,
        image_name: String,
    },
}

impl Action {
    pub fn source(&self) -> &Path {
        match self {
            Action::Copy { source, .. } | Action::RewriteSidecar { source, .. } => source,
        }
    }

    pub fn destination(&self) -> &Path {
        match self {
            Action::Copy { destination, .. } | Action::RewriteSidecar { destination, .. } => {
                destination
            }
        }
    }
}

/// An action together with the group it was planned for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub digest: Digest,
    pub members: Vec<PathBuf>,
    pub action: Action,
}

impl PlannedAction {
    pub fn new(group: &Group, action: Action) -> Self {
        Self {
            digest: group.digest.clone(),
            members: group.members.clone(),
            action,
        }
    }

    /// Failure record for this action's group
    pub fn failure(&self, detail: impl Into<String>) -> FailureRecord {
        FailureRecord {
            hash: self.digest.to_string(),
            files: self.members.clone(),
            detail: detail.into(),
        }
    }
}

/// A failure that was isolated instead of aborting the run.
///
/// Serialized as `{"hash": ..., "files": [...], "detail": ...}` in the
/// failure report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Digest of the group the failure belongs to
    pub hash: String,
    /// Files of that group
    pub files: Vec<PathBuf>,
    /// What went wrong
    pub detail: String,
}

impl FailureRecord {
    pub fn for_group(group: &Group, detail: impl Into<String>) -> Self {
        Self {
            hash: group.digest.to_string(),
            files: group.members.clone(),
            detail: detail.into(),
        }
    }
}

/// The ordered action list for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<PlannedAction>,
    /// Groups whose sidecars could not be resolved
    pub failures: Vec<FailureRecord>,
}

impl Plan {
    pub fn copy_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a.action, Action::Copy { .. }))
            .count()
    }

    pub fn sidecar_count(&self) -> usize {
        self.actions.len() - self.copy_count()
    }
}

/// Outcome of executing a plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Actions that finished without error
    pub completed: usize,
    /// Destination directories this run had to create
    pub folders_created: usize,
    /// One record per failed action, sorted
    pub failures: Vec<FailureRecord>,
    pub duration_ms: u64,
}

/// Destination file names derived from a group's primary member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationNames {
    base: String,
    extension: String,
}

impl DestinationNames {
    /// `IMG_0001.CR2` with digest `ab12` becomes base `IMG_0001_sha1_ab12`
    pub fn new(primary: &Path, kind: DigestKind, digest: &Digest) -> Self {
        let stem = primary
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = primary
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Self {
            base: format!("{}_{}_{}", stem, kind.tag(), digest),
            extension,
        }
    }

    /// File name for the copied picture; the original extension is kept
    pub fn image(&self) -> String {
        format!("{}{}", self.base, self.extension)
    }

    /// File name for the canonical sidecar
    pub fn sidecar(&self) -> String {
        format!("{}.{}", self.base, SIDECAR_EXTENSION)
    }

    /// File name for the `n`th alternate sidecar, counting from 1
    pub fn alternate_sidecar(&self, n: usize) -> String {
        format!("{}_sidecar{}.{}", self.base, n, SIDECAR_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_names_embed_tag_and_digest() {
        let names = DestinationNames::new(
            Path::new("/in/IMG_0001.CR2"),
            DigestKind::Sha1,
            &Digest::from_hex("ab12"),
        );

        assert_eq!(names.image(), "IMG_0001_sha1_ab12.CR2");
        assert_eq!(names.sidecar(), "IMG_0001_sha1_ab12.xmp");
        assert_eq!(names.alternate_sidecar(2), "IMG_0001_sha1_ab12_sidecar2.xmp");
    }

    #[test]
    fn failure_record_serializes_with_report_keys() {
        let record = FailureRecord {
            hash: "ab12".to_string(),
            files: vec![PathBuf::from("/in/a.jpg")],
            detail: "disk full".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["hash"], "ab12");
        assert_eq!(json["files"][0], "/in/a.jpg");
        assert_eq!(json["detail"], "disk full");
    }

    #[test]
    fn action_exposes_source_and_destination() {
        let action = Action::RewriteSidecar {
            source: PathBuf::from("/in/a.xmp"),
            destination: PathBuf::from("/out/a_sha1_ab.xmp"),
            image_name: "a_sha1_ab.jpg".to_string(),
        };
        assert_eq!(action.source(), Path::new("/in/a.xmp"));
        assert_eq!(action.destination(), Path::new("/out/a_sha1_ab.xmp"));
    }
}
