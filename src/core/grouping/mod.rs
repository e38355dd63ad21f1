//! # Grouping Module
//!
//! Hashes every scanned picture and groups files with identical content.
//!
//! ## Components
//! - `GroupAccumulator` - the only state shared by hashing workers
//! - `HashingPool` - runs the digest computation on a `WorkerPool`
//!
//! ## Primary member
//! Workers finish in whatever order the OS schedules them, so the order in
//! which members land in a group is a race. `PrimaryPolicy::SmallestPath`
//! (the default) sorts members once hashing is done so the primary is the
//! lexicographically smallest path and runs are reproducible.

mod accumulator;
mod hashing;

pub use accumulator::GroupAccumulator;
pub use hashing::HashingPool;

use crate::core::digest::Digest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// How the primary member of a group is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryPolicy {
    /// Sort members by path; the smallest one is the primary
    #[default]
    SmallestPath,
    /// Keep hashing completion order; the first file hashed is the primary
    FirstInserted,
}

/// A set of files sharing one digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub digest: Digest,
    /// Never empty
    pub members: Vec<PathBuf>,
}

impl Group {
    /// The member that drives naming and metadata lookup
    pub fn primary(&self) -> &Path {
        &self.members[0]
    }

    /// Number of redundant copies
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }
}

/// Digest-ordered map of groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupMap {
    groups: BTreeMap<Digest, Group>,
}

impl GroupMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, digest: &Digest) -> Option<&Group> {
        self.groups.get(digest)
    }

    /// Groups in digest order
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Total number of files across all groups
    pub fn total_files(&self) -> usize {
        self.groups.values().map(|g| g.members.len()).sum()
    }

    /// Total number of redundant copies across all groups
    pub fn duplicate_count(&self) -> usize {
        self.groups.values().map(Group::duplicate_count).sum()
    }

    fn insert_group(&mut self, group: Group) {
        self.groups.insert(group.digest.clone(), group);
    }
}

impl FromIterator<Group> for GroupMap {
    fn from_iter<T: IntoIterator<Item = Group>>(iter: T) -> Self {
        let mut map = GroupMap::new();
        for group in iter {
            map.insert_group(group);
        }
        map
    }
}

impl<'a> IntoIterator for &'a GroupMap {
    type Item = &'a Group;
    type IntoIter = std::collections::btree_map::Values<'a, Digest, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.values()
    }
}
