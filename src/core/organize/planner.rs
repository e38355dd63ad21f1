//! Plan generator: groups in, filesystem actions out.
//!
//! Planning does no writes. Given the same groups, metadata and sidecars
//! it always produces the same plan.

use super::types::*;
use crate::core::digest::DigestKind;
use crate::core::grouping::{Group, GroupMap};
use crate::core::metadata::{MetadataResolver, FALLBACK_SEGMENT};
use crate::core::sidecar::{Sidecar, SidecarLocator};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Builds the action list for a sorted copy of the input
#[derive(Debug, Clone)]
pub struct ActionPlanner {
    root: PathBuf,
    kind: DigestKind,
}

impl ActionPlanner {
    pub fn new(root: impl Into<PathBuf>, kind: DigestKind) -> Self {
        Self {
            root: root.into(),
            kind,
        }
    }

    /// Plan every group. A group whose sidecars can't be resolved still
    /// gets its copy action and a failure record; other groups are
    /// unaffected.
    pub fn plan(
        &self,
        groups: &GroupMap,
        resolver: &dyn MetadataResolver,
        locator: &dyn SidecarLocator,
    ) -> Plan {
        let mut plan = Plan::default();
        for group in groups {
            self.plan_group(group, resolver, locator, &mut plan);
        }
        plan
    }

    fn plan_group(
        &self,
        group: &Group,
        resolver: &dyn MetadataResolver,
        locator: &dyn SidecarLocator,
        plan: &mut Plan,
    ) {
        let primary = group.primary();
        let directory = self.destination_dir(primary, resolver);
        let names = DestinationNames::new(primary, self.kind, &group.digest);
        let image_name = names.image();

        plan.actions.push(PlannedAction::new(
            group,
            Action::Copy {
                source: primary.to_path_buf(),
                destination: directory.join(&image_name),
            },
        ));

        let mut sidecars = Vec::new();
        for member in &group.members {
            match locator.locate(member) {
                Ok(Some(sidecar)) => sidecars.push(sidecar),
                Ok(None) => {}
                Err(e) => {
                    warn!(digest = %group.digest, "skipping sidecars: {}", e);
                    plan.failures.push(FailureRecord::for_group(group, e.to_string()));
                    return;
                }
            }
        }

        let Some(canonical) = newest_sidecar(&sidecars) else {
            return;
        };

        plan.actions.push(PlannedAction::new(
            group,
            Action::RewriteSidecar {
                source: sidecars[canonical].path.clone(),
                destination: directory.join(names.sidecar()),
                image_name: image_name.clone(),
            },
        ));

        let alternates = sidecars
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != canonical)
            .map(|(_, sidecar)| sidecar);

        for (n, sidecar) in alternates.enumerate() {
            plan.actions.push(PlannedAction::new(
                group,
                Action::RewriteSidecar {
                    source: sidecar.path.clone(),
                    destination: directory.join(names.alternate_sidecar(n + 1)),
                    image_name: image_name.clone(),
                },
            ));
        }
    }

    /// `root/<segments>` for a picture, or `root/bad exif` when the
    /// resolver fails
    pub fn destination_dir(&self, primary: &Path, resolver: &dyn MetadataResolver) -> PathBuf {
        let segments = resolver.resolve(primary).unwrap_or_else(|e| {
            warn!("{}; filing under '{}'", e, FALLBACK_SEGMENT);
            vec![FALLBACK_SEGMENT.to_string()]
        });

        segments
            .iter()
            .fold(self.root.clone(), |dir, segment| dir.join(segment))
    }
}

/// Index of the most recently changed sidecar; the earliest located wins ties
fn newest_sidecar(sidecars: &[Sidecar]) -> Option<usize> {
    let mut newest: Option<usize> = None;
    for (index, sidecar) in sidecars.iter().enumerate() {
        match newest {
            Some(best) if sidecars[best].changed >= sidecar.changed => {}
            _ => newest = Some(index),
        }
    }
    newest
}
