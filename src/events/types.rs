//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the sorting pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Hashing phase events
    Hash(HashEvent),
    /// Execution phase events
    Execute(ExecuteEvent),
    /// Verification events
    Verify(VerifyEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { paths: Vec<PathBuf> },
    /// A picture was found
    PictureFound { path: PathBuf },
    /// Scanning completed
    Completed { total_pictures: usize },
}

/// Events during the hashing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Hashing has started
    Started { total_files: usize },
    /// A file was digested
    Progress(HashProgress),
    /// Hashing completed
    Completed { total_hashed: usize, groups: usize },
}

/// Progress information during hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of files hashed so far
    pub completed: usize,
    /// Total number of files to hash
    pub total: usize,
    /// File that was just hashed
    pub current_path: PathBuf,
}

/// Events during the execution phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecuteEvent {
    /// Execution has started
    Started { total_actions: usize },
    /// An action finished, successfully or not
    Progress { completed: usize, total: usize },
    /// An action failed and was recorded
    ActionFailed { hash: String, message: String },
    /// Execution completed
    Completed { succeeded: usize, failed: usize },
}

/// Per-group verification outcomes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerifyEvent {
    Verified { path: PathBuf },
    Mismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
    Unlabeled { path: PathBuf },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed
    Completed { summary: PipelineSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Hashing,
    Planning,
    Executing,
    Verifying,
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total pictures scanned
    pub total_pictures: usize,
    /// Number of distinct digests
    pub unique_pictures: usize,
    /// Number of failure records produced
    pub failures: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Planning => write!(f, "Planning"),
            PipelinePhase::Executing => write!(f, "Copying"),
            PipelinePhase::Verifying => write!(f, "Verifying"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Hash(HashEvent::Progress(HashProgress {
            completed: 10,
            total: 50,
            current_path: PathBuf::from("/photos/a.jpg"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Hash(HashEvent::Progress(p)) => {
                assert_eq!(p.total, 50);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn executing_phase_displays_as_copying() {
        assert_eq!(PipelinePhase::Executing.to_string(), "Copying");
    }
}
