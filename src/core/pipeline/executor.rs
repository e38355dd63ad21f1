//! Pipeline execution implementation.

use crate::core::digest::DigestKind;
use crate::core::grouping::{GroupMap, HashingPool, PrimaryPolicy};
use crate::core::metadata::{ExifResolver, MetadataResolver};
use crate::core::organize::{ActionPlanner, ExecutionPool, ExecutionReport, FailureRecord};
use crate::core::scanner::{PictureScanner, ScanConfig, WalkDirScanner};
use crate::core::sidecar::{SidecarLocator, XmpSidecarLocator};
use crate::core::verify::{Verifier, VerifyReport};
use crate::error::PicsortError;
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Result of a sort run
#[derive(Debug)]
pub struct SortOutcome {
    /// Pictures found by the scan
    pub total_pictures: usize,
    /// Content groups, one per unique picture
    pub groups: GroupMap,
    /// Number of actions planned
    pub planned_actions: usize,
    pub execution: ExecutionReport,
    /// Planning failures followed by execution failures
    pub failures: Vec<FailureRecord>,
    pub duration_ms: u64,
}

/// Result of a verify run
#[derive(Debug)]
pub struct VerifyOutcome {
    pub total_pictures: usize,
    pub groups: usize,
    pub report: VerifyReport,
    pub duration_ms: u64,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directories to scan
    pub inputs: Vec<PathBuf>,
    /// Root of the sorted tree; required for sorting
    pub output: Option<PathBuf>,
    /// Worker threads per phase (0 = run inline)
    pub workers: usize,
    pub digest: DigestKind,
    pub primary_policy: PrimaryPolicy,
    pub scan_config: ScanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: None,
            workers: default_workers(),
            digest: DigestKind::default(),
            primary_policy: PrimaryPolicy::default(),
            scan_config: ScanConfig::default(),
        }
    }
}

/// Number of available CPUs, or 1 if that can't be determined
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    resolver: Option<Box<dyn MetadataResolver>>,
    locator: Option<Box<dyn SidecarLocator>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            resolver: None,
            locator: None,
        }
    }

    /// Directories to scan
    pub fn inputs(mut self, inputs: Vec<PathBuf>) -> Self {
        self.config.inputs = inputs;
        self
    }

    /// Root of the sorted tree
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.config.output = Some(output.into());
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn digest(mut self, digest: DigestKind) -> Self {
        self.config.digest = digest;
        self
    }

    pub fn primary_policy(mut self, policy: PrimaryPolicy) -> Self {
        self.config.primary_policy = policy;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.scan_config.follow_symlinks = follow;
        self
    }

    /// Replace the EXIF resolver
    pub fn resolver(mut self, resolver: Box<dyn MetadataResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Replace the on-disk sidecar locator
    pub fn locator(mut self, locator: Box<dyn SidecarLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            resolver: self.resolver.unwrap_or_else(|| Box::new(ExifResolver)),
            locator: self.locator.unwrap_or_else(|| Box::new(XmpSidecarLocator)),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan, hash, then either sort into a new tree or verify an existing one
pub struct Pipeline {
    config: PipelineConfig,
    resolver: Box<dyn MetadataResolver>,
    locator: Box<dyn SidecarLocator>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Sort without events
    pub fn sort(&self) -> Result<SortOutcome, PicsortError> {
        self.sort_with_events(&null_sender())
    }

    /// Copy every unique picture and its sidecars into the output tree
    pub fn sort_with_events(&self, events: &EventSender) -> Result<SortOutcome, PicsortError> {
        let output = self
            .config
            .output
            .as_deref()
            .ok_or_else(|| PicsortError::Config("sorting needs an output directory".into()))?;

        let start = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));

        let (total_pictures, groups) = self.scan_and_hash(events)?;

        phase(events, PipelinePhase::Planning);
        let plan = ActionPlanner::new(output, self.config.digest).plan(
            &groups,
            &*self.resolver,
            &*self.locator,
        );
        info!(
            copies = plan.copy_count(),
            sidecars = plan.sidecar_count(),
            "plan ready"
        );

        phase(events, PipelinePhase::Executing);
        let execution =
            ExecutionPool::new(self.config.workers).execute_with_events(&plan.actions, events)?;

        let mut failures = plan.failures;
        failures.extend(execution.failures.iter().cloned());

        let duration_ms = start.elapsed().as_millis() as u64;
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_pictures,
                unique_pictures: groups.len(),
                failures: failures.len(),
                duration_ms,
            },
        }));

        Ok(SortOutcome {
            total_pictures,
            planned_actions: plan.actions.len(),
            groups,
            execution,
            failures,
            duration_ms,
        })
    }

    /// Verify without events
    pub fn verify(&self) -> Result<VerifyOutcome, PicsortError> {
        self.verify_with_events(&null_sender())
    }

    /// Re-hash a sorted tree and check every digest label
    pub fn verify_with_events(&self, events: &EventSender) -> Result<VerifyOutcome, PicsortError> {
        let start = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));

        let (total_pictures, groups) = self.scan_and_hash(events)?;

        phase(events, PipelinePhase::Verifying);
        let report = Verifier::new(self.config.digest).verify_with_events(&groups, events);

        let duration_ms = start.elapsed().as_millis() as u64;
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_pictures,
                unique_pictures: groups.len(),
                failures: report.mismatched.len(),
                duration_ms,
            },
        }));

        Ok(VerifyOutcome {
            total_pictures,
            groups: groups.len(),
            report,
            duration_ms,
        })
    }

    fn scan_and_hash(&self, events: &EventSender) -> Result<(usize, GroupMap), PicsortError> {
        if self.config.inputs.is_empty() {
            return Err(PicsortError::Config("no input directories given".into()));
        }

        phase(events, PipelinePhase::Scanning);
        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let pictures = scanner.scan_with_events(&self.config.inputs, events)?;
        info!(pictures = pictures.len(), "scan complete");

        phase(events, PipelinePhase::Hashing);
        let groups = HashingPool::new(self.config.workers, self.config.digest)
            .primary_policy(self.config.primary_policy)
            .hash_with_events(&pictures, events)?;
        info!(
            groups = groups.len(),
            duplicates = groups.duplicate_count(),
            "hashing complete"
        );

        Ok((pictures.len(), groups))
    }
}

fn phase(events: &EventSender, phase: PipelinePhase) {
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
}

/// True when `output` lies inside one of `inputs`
pub fn output_inside_inputs(output: &Path, inputs: &[PathBuf]) -> bool {
    let output = output.canonicalize().unwrap_or_else(|_| output.to_path_buf());
    inputs.iter().any(|input| {
        input
            .canonicalize()
            .map(|input| output.starts_with(input))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(&path).unwrap().write_all(content).unwrap();
        path
    }

    #[test]
    fn pipeline_builder_sets_config() {
        let pipeline = Pipeline::builder()
            .inputs(vec![PathBuf::from("/photos")])
            .output("/sorted")
            .workers(3)
            .digest(DigestKind::Sha256)
            .primary_policy(PrimaryPolicy::FirstInserted)
            .build();

        let config = pipeline.config();
        assert_eq!(config.workers, 3);
        assert_eq!(config.digest, DigestKind::Sha256);
        assert_eq!(config.output.as_deref(), Some(Path::new("/sorted")));
        assert_eq!(config.primary_policy, PrimaryPolicy::FirstInserted);
    }

    #[test]
    fn default_workers_is_at_least_one() {
        assert!(PipelineConfig::default().workers >= 1);
    }

    #[test]
    fn sort_without_output_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let err = Pipeline::builder()
            .inputs(vec![temp.path().to_path_buf()])
            .build()
            .sort()
            .unwrap_err();
        assert!(matches!(err, PicsortError::Config(_)));
    }

    #[test]
    fn missing_inputs_is_a_config_error() {
        let err = Pipeline::builder().build().verify().unwrap_err();
        assert!(matches!(err, PicsortError::Config(_)));
    }

    #[test]
    fn pipeline_handles_empty_directory() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let outcome = Pipeline::builder()
            .inputs(vec![input.path().to_path_buf()])
            .output(output.path())
            .build()
            .sort()
            .unwrap();

        assert_eq!(outcome.total_pictures, 0);
        assert!(outcome.groups.is_empty());
        assert_eq!(outcome.planned_actions, 0);
    }

    #[test]
    fn duplicates_are_copied_once() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_file(input.path(), "a/photo.jpg", b"identical");
        write_file(input.path(), "b/photo.jpg", b"identical");
        write_file(input.path(), "c/other.png", b"different");

        for workers in [0, 4] {
            let out = output.path().join(format!("w{workers}"));
            let outcome = Pipeline::builder()
                .inputs(vec![input.path().to_path_buf()])
                .output(&out)
                .workers(workers)
                .build()
                .sort()
                .unwrap();

            assert_eq!(outcome.total_pictures, 3);
            assert_eq!(outcome.groups.len(), 2);
            assert_eq!(outcome.execution.completed, 2);
            assert!(outcome.failures.is_empty());

            let copied: Vec<_> = fs::read_dir(out.join("unknown camera/unknown date"))
                .unwrap()
                .map(|e| e.unwrap().file_name())
                .collect();
            assert_eq!(copied.len(), 2);
        }
    }

    #[test]
    fn sort_emits_phase_events() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_file(input.path(), "x.jpg", b"bytes");

        let (sender, receiver) = EventChannel::new();
        Pipeline::builder()
            .inputs(vec![input.path().to_path_buf()])
            .output(output.path())
            .workers(1)
            .build()
            .sort_with_events(&sender)
            .unwrap();
        drop(sender);

        let phases: Vec<_> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => Some(phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                PipelinePhase::Scanning,
                PipelinePhase::Hashing,
                PipelinePhase::Planning,
                PipelinePhase::Executing,
            ]
        );
    }

    #[test]
    fn detects_output_inside_input() {
        let input = TempDir::new().unwrap();
        let nested = input.path().join("sorted");
        fs::create_dir(&nested).unwrap();
        let elsewhere = TempDir::new().unwrap();

        let inputs = vec![input.path().to_path_buf()];
        assert!(output_inside_inputs(&nested, &inputs));
        assert!(!output_inside_inputs(elsewhere.path(), &inputs));
    }
}
