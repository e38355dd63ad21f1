//! # Verify Module
//!
//! Checks an already sorted tree: every picture name carries the digest it
//! was sorted under (`IMG_0001_sha1_<hex>.CR2`), so re-hashing the tree and
//! comparing each group's digest with the one in its representative's name
//! finds files that changed after sorting.
//!
//! Only the representative (primary) of each group is checked.

use crate::core::digest::{Digest, DigestKind};
use crate::core::grouping::{Group, GroupMap};
use crate::core::organize::FailureRecord;
use crate::events::{null_sender, Event, EventSender, VerifyEvent};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A file whose content no longer matches its name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub path: PathBuf,
    /// Digest embedded in the file name
    pub expected: String,
    /// Digest of the current content
    pub found: Digest,
}

/// Result of a verification pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub verified: Vec<PathBuf>,
    pub mismatched: Vec<Mismatch>,
    /// Representatives without a digest label in their name
    pub unlabeled: Vec<PathBuf>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.mismatched.is_empty()
    }

    /// Paths that failed verification
    pub fn failing_files(&self) -> Vec<PathBuf> {
        self.mismatched.iter().map(|m| m.path.clone()).collect()
    }

    /// Mismatches in failure report form
    pub fn failure_records(&self) -> Vec<FailureRecord> {
        self.mismatched
            .iter()
            .map(|m| FailureRecord {
                hash: m.found.to_string(),
                files: vec![m.path.clone()],
                detail: format!("name says {}, content hashes to {}", m.expected, m.found),
            })
            .collect()
    }
}

/// Outcome for a single group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    Mismatch { expected: String },
    Unlabeled,
}

/// Compares digest labels in file names with actual content digests
#[derive(Debug, Clone)]
pub struct Verifier {
    label: Regex,
}

impl Verifier {
    pub fn new(kind: DigestKind) -> Self {
        // Greedy prefix: a re-sorted name carries several labels, the last is current.
        let pattern = format!("^.*_{}_([0-9a-fA-F]{{{}}})", kind.tag(), kind.hex_len());
        Self {
            label: Regex::new(&pattern).expect("digest label pattern is valid"),
        }
    }

    /// The digest label in a file name, if any
    pub fn label<'a>(&self, path: &'a Path) -> Option<&'a str> {
        let name = path.file_name()?.to_str()?;
        self.label
            .captures(name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// Check one group's representative against the group digest
    pub fn check(&self, group: &Group) -> Verdict {
        match self.label(group.primary()) {
            None => Verdict::Unlabeled,
            Some(expected) if expected.eq_ignore_ascii_case(group.digest.as_str()) => {
                Verdict::Verified
            }
            Some(expected) => Verdict::Mismatch {
                expected: expected.to_string(),
            },
        }
    }

    pub fn verify(&self, groups: &GroupMap) -> VerifyReport {
        self.verify_with_events(groups, &null_sender())
    }

    pub fn verify_with_events(&self, groups: &GroupMap, events: &EventSender) -> VerifyReport {
        let mut report = VerifyReport::default();

        for group in groups {
            let path = group.primary().to_path_buf();
            match self.check(group) {
                Verdict::Verified => {
                    info!("verified {}", path.display());
                    events.send(Event::Verify(VerifyEvent::Verified { path: path.clone() }));
                    report.verified.push(path);
                }
                Verdict::Mismatch { expected } => {
                    warn!("{}", mismatch_message(&path, &group.digest, &expected));
                    events.send(Event::Verify(VerifyEvent::Mismatch {
                        path: path.clone(),
                        expected: expected.clone(),
                        found: group.digest.to_string(),
                    }));
                    report.mismatched.push(Mismatch {
                        path,
                        expected,
                        found: group.digest.clone(),
                    });
                }
                Verdict::Unlabeled => {
                    info!("{} does not have a hash, skipping", path.display());
                    events.send(Event::Verify(VerifyEvent::Unlabeled { path: path.clone() }));
                    report.unlabeled.push(path);
                }
            }
        }

        report
    }
}

/// `<path> failed to verify: <computed> vs <label>`
fn mismatch_message(path: &Path, found: &Digest, expected: &str) -> String {
    format!("{} failed to verify: {} vs {}", path.display(), found, expected)
}
