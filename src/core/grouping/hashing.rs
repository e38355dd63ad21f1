//! Parallel hashing of scanned pictures.

use super::{GroupAccumulator, GroupMap, PrimaryPolicy};
use crate::core::digest::{compute_digest, DigestKind};
use crate::core::pool::WorkerPool;
use crate::error::HashError;
use crate::events::{null_sender, Event, EventSender, HashEvent, HashProgress};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, error};

/// Hashes files on a worker pool and groups them by digest
#[derive(Debug, Clone, Copy)]
pub struct HashingPool {
    pool: WorkerPool,
    kind: DigestKind,
    policy: PrimaryPolicy,
}

impl HashingPool {
    /// Create a hashing pool with `workers` threads (0 = inline)
    pub fn new(workers: usize, kind: DigestKind) -> Self {
        Self {
            pool: WorkerPool::new(workers),
            kind,
            policy: PrimaryPolicy::default(),
        }
    }

    /// Set how each group's primary member is chosen
    pub fn primary_policy(mut self, policy: PrimaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Hash every path without progress reporting
    pub fn hash(&self, paths: &[PathBuf]) -> Result<GroupMap, HashError> {
        self.hash_with_events(paths, &null_sender())
    }

    /// Hash every path and group the results.
    ///
    /// The first unreadable file fails the whole phase. Once a failure is
    /// seen the remaining workers keep draining the queue without hashing,
    /// so the pool still shuts down cleanly.
    pub fn hash_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<GroupMap, HashError> {
        let total = paths.len();
        let accumulator = GroupAccumulator::new();
        let completed = AtomicUsize::new(0);
        let aborted = AtomicBool::new(false);
        let first_error: Mutex<Option<HashError>> = Mutex::new(None);

        events.send(Event::Hash(HashEvent::Started { total_files: total }));
        debug!(files = total, workers = self.pool.workers(), "hashing started");

        self.pool.run(paths.iter().cloned(), |path| {
            if aborted.load(Ordering::Acquire) {
                return;
            }

            match compute_digest(&path, self.kind) {
                Ok(digest) => {
                    debug!(path = %path.display(), %digest, "hashed");
                    accumulator.insert(digest, path.clone());

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    events.send(Event::Hash(HashEvent::Progress(HashProgress {
                        completed: done,
                        total,
                        current_path: path,
                    })));
                }
                Err(e) => {
                    error!("{}", e);
                    aborted.store(true, Ordering::Release);
                    let mut slot = first_error.lock().unwrap_or_else(|p| p.into_inner());
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                }
            }
        })?;

        if let Some(e) = first_error.into_inner().unwrap_or_else(|p| p.into_inner()) {
            return Err(e);
        }

        let groups = accumulator.into_groups(self.policy);

        events.send(Event::Hash(HashEvent::Completed {
            total_hashed: completed.into_inner(),
            groups: groups.len(),
        }));

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap().write_all(content).unwrap();
        path
    }

    fn membership(map: &GroupMap) -> BTreeSet<(String, BTreeSet<PathBuf>)> {
        map.iter()
            .map(|g| {
                (
                    g.digest.to_string(),
                    g.members.iter().cloned().collect::<BTreeSet<_>>(),
                )
            })
            .collect()
    }

    #[test]
    fn identical_content_shares_a_group() {
        let temp = TempDir::new().unwrap();
        let a = write_file(temp.path(), "a.jpg", b"same bytes");
        let b = write_file(temp.path(), "b.jpg", b"same bytes");
        let c = write_file(temp.path(), "c.jpg", b"same bytez");

        let map = HashingPool::new(0, DigestKind::Sha1)
            .hash(&[a.clone(), b.clone(), c.clone()])
            .unwrap();

        assert_eq!(map.len(), 2);
        let shared = map.iter().find(|g| g.members.len() == 2).unwrap();
        assert_eq!(shared.members, vec![a, b]);
    }

    #[test]
    fn membership_is_independent_of_worker_count() {
        let temp = TempDir::new().unwrap();
        let paths: Vec<_> = (0..40)
            .map(|i| {
                let content = format!("picture {}", i % 7);
                write_file(temp.path(), &format!("{i:03}.jpg"), content.as_bytes())
            })
            .collect();

        let reference = HashingPool::new(0, DigestKind::Sha1).hash(&paths).unwrap();
        assert_eq!(reference.len(), 7);
        assert_eq!(reference.total_files(), paths.len());

        for workers in [1, 4] {
            let pooled = HashingPool::new(workers, DigestKind::Sha1)
                .hash(&paths)
                .unwrap();
            assert_eq!(membership(&pooled), membership(&reference));
            // Default policy makes even the primary choice reproducible.
            assert_eq!(pooled, reference);
        }
    }

    #[test]
    fn unreadable_file_fails_the_phase() {
        let temp = TempDir::new().unwrap();
        let mut paths: Vec<_> = (0..10)
            .map(|i| write_file(temp.path(), &format!("{i}.jpg"), b"x"))
            .collect();
        paths.insert(3, temp.path().join("vanished.jpg"));

        for workers in [0, 3] {
            let result = HashingPool::new(workers, DigestKind::Sha1).hash(&paths);
            match result {
                Err(HashError::Io { path, .. }) => assert!(path.ends_with("vanished.jpg")),
                other => panic!("expected io error, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_input_yields_empty_map() {
        let map = HashingPool::new(4, DigestKind::Sha1).hash(&[]).unwrap();
        assert!(map.is_empty());
    }
}
