//! Per-path violation state
//!
//! The tracker is the only owner of the record set. Every commit and
//! eviction carries a [`Revision`]; the tracker remembers the newest revision
//! seen per path (eviction leaves a tombstone) and drops anything older. An
//! analysis triggered before a newer one, or before a removal, can therefore
//! never overwrite fresher state or resurrect an evicted file.
//!
//! Tombstones are only needed while an older analysis may still land.
//! [`ViolationTracker::prune`] drops them once every outstanding revision is
//! newer, so the map stays bounded by tracked files plus in-flight work.

use crate::models::{Severity, Trend, Violation};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Monotonic stamp handed out when an analysis or eviction is scheduled
pub type Revision = u64;

/// Tracked state for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub violations: Vec<Violation>,
    pub previous_count: usize,
}

impl FileRecord {
    pub fn count(&self) -> usize {
        self.violations.len()
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }
}

/// Outcome of [`ViolationTracker::commit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied(Trend),
    /// A newer revision was already committed or evicted for the path
    Stale,
}

/// Totals across every tracked file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub total_files: usize,
    pub files_with_violations: usize,
    pub total_violations: usize,
    pub quality_score: u32,
}

/// `max(0, 100 - 2 * total)`
pub fn quality_score(total_violations: usize) -> u32 {
    100u32.saturating_sub(total_violations.saturating_mul(2).min(100) as u32)
}

#[derive(Debug, Default)]
pub struct ViolationTracker {
    records: BTreeMap<PathBuf, FileRecord>,
    revisions: HashMap<PathBuf, Revision>,
}

impl ViolationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the record for `path` and classify the change
    pub fn commit(&mut self, path: &Path, revision: Revision, violations: Vec<Violation>) -> Commit {
        if !self.accept(path, revision) {
            return Commit::Stale;
        }

        let previous_count = self.records.get(path).map_or(0, FileRecord::count);
        let trend = Trend::classify(previous_count, violations.len());

        self.records.insert(
            path.to_path_buf(),
            FileRecord {
                path: path.to_path_buf(),
                violations,
                previous_count,
            },
        );

        Commit::Applied(trend)
    }

    /// Drop the record for `path`. Returns whether a record existed.
    pub fn evict(&mut self, path: &Path, revision: Revision) -> bool {
        if !self.accept(path, revision) {
            return false;
        }
        self.records.remove(path).is_some()
    }

    /// Forget revisions of untracked paths that no outstanding analysis can
    /// race. `oldest_outstanding` is the lowest revision still in flight.
    pub fn prune(&mut self, oldest_outstanding: Option<Revision>) {
        let records = &self.records;
        self.revisions.retain(|path, seen| {
            records.contains_key(path) || oldest_outstanding.is_some_and(|oldest| oldest < *seen)
        });
    }

    pub fn aggregate(&self) -> Aggregate {
        let total_violations: usize = self.records.values().map(FileRecord::count).sum();
        Aggregate {
            total_files: self.records.len(),
            files_with_violations: self.records.values().filter(|r| r.count() > 0).count(),
            total_violations,
            quality_score: quality_score(total_violations),
        }
    }

    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.records.get(path)
    }

    /// Records ordered by path
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn remembered_revisions(&self) -> usize {
        self.revisions.len()
    }

    fn accept(&mut self, path: &Path, revision: Revision) -> bool {
        match self.revisions.get(path) {
            Some(&seen) if seen > revision => false,
            _ => {
                self.revisions.insert(path.to_path_buf(), revision);
                true
            }
        }
    }
}
