//! Thread-safe digest-to-members accumulation.

use super::{Group, GroupMap, PrimaryPolicy};
use crate::core::digest::Digest;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Collects files into groups as hashing workers finish.
///
/// One mutex guards the whole map; the critical section is a single
/// entry-or-create plus push. Entries are never removed or reordered.
#[derive(Debug, Default)]
pub struct GroupAccumulator {
    groups: Mutex<HashMap<Digest, Vec<PathBuf>>>,
}

impl GroupAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `path` hashed to `digest`
    pub fn insert(&self, digest: Digest, path: PathBuf) {
        // A poisoned lock only means another worker panicked mid-push;
        // the map itself is still consistent.
        let mut groups = self.groups.lock().unwrap_or_else(|e| e.into_inner());
        groups.entry(digest).or_default().push(path);
    }

    /// Number of distinct digests seen so far
    pub fn len(&self) -> usize {
        self.groups.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finish accumulation and build the group map
    pub fn into_groups(self, policy: PrimaryPolicy) -> GroupMap {
        let groups = self.groups.into_inner().unwrap_or_else(|e| e.into_inner());

        groups
            .into_iter()
            .map(|(digest, mut members)| {
                if policy == PrimaryPolicy::SmallestPath {
                    members.sort();
                }
                Group { digest, members }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn insert_creates_then_appends() {
        let acc = GroupAccumulator::new();
        acc.insert(Digest::from_hex("aa"), PathBuf::from("/z.jpg"));
        acc.insert(Digest::from_hex("aa"), PathBuf::from("/a.jpg"));
        acc.insert(Digest::from_hex("bb"), PathBuf::from("/b.jpg"));

        assert_eq!(acc.len(), 2);

        let map = acc.into_groups(PrimaryPolicy::FirstInserted);
        let group = map.get(&Digest::from_hex("aa")).unwrap();
        assert_eq!(group.members, vec![PathBuf::from("/z.jpg"), PathBuf::from("/a.jpg")]);
    }

    #[test]
    fn smallest_path_policy_sorts_members() {
        let acc = GroupAccumulator::new();
        acc.insert(Digest::from_hex("aa"), PathBuf::from("/z.jpg"));
        acc.insert(Digest::from_hex("aa"), PathBuf::from("/a.jpg"));

        let map = acc.into_groups(PrimaryPolicy::SmallestPath);
        let group = map.get(&Digest::from_hex("aa")).unwrap();
        assert_eq!(group.primary(), PathBuf::from("/a.jpg"));
    }

    #[test]
    fn concurrent_inserts_lose_nothing() {
        let acc = GroupAccumulator::new();

        thread::scope(|scope| {
            for worker in 0..8 {
                let acc = &acc;
                scope.spawn(move || {
                    for i in 0..250 {
                        let digest = Digest::from_hex(&format!("{:02x}", i % 5));
                        acc.insert(digest, PathBuf::from(format!("/w{worker}/{i}.jpg")));
                    }
                });
            }
        });

        let map = acc.into_groups(PrimaryPolicy::SmallestPath);
        assert_eq!(map.len(), 5);
        assert_eq!(map.total_files(), 8 * 250);
    }
}
