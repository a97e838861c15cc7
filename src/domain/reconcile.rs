//! Reconciliation engine
//!
//! Compares the two indices in four independent phases:
//!
//! | Phase | Checks |
//! |-------|--------|
//! | Presence | unresolved landscape entries, registry projects absent from the landscape |
//! | Repository | main repository per project, honoring accepted repo pairs |
//! | Dates | join, incubating and graduated dates |
//! | Status | status group membership and per-status counts |
//!
//! Field checks scan landscape-keyed data first and registry-keyed data
//! second. Each `(category, name)` pair is reported at most once per run, so
//! the reverse scan never repeats what the forward scan already found.

use std::collections::HashSet;

use serde::Serialize;

use super::exceptions::{ExceptionRegistry, Milestone, RepoPair};
use super::index::{CanonicalIndex, Catalogs, StatusGroups};
use super::name::Side;

/// One disagreement between the catalogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Landscape lists a project the registry does not know
    MissingInRegistry { name: String },

    /// Registry project with no landscape entry
    MissingInLandscape { name: String },

    /// An accepted repo pair no longer describes what a side lists
    IgnoredRepoIncorrect {
        name: String,
        expected: RepoPair,
        /// Landscape repo when it deviates from the expected value
        landscape: Option<String>,
        /// Registry repo when it deviates from the expected value
        registry: Option<String>,
    },

    RepoMissingOnOtherSide {
        name: String,
        present_on: Side,
        repo: String,
    },

    RepoMismatch {
        name: String,
        landscape: String,
        registry: String,
    },

    DateMissingOnOtherSide {
        name: String,
        field: Milestone,
        present_on: Side,
        date: String,
    },

    DateMismatch {
        name: String,
        field: Milestone,
        landscape: String,
        registry: String,
    },

    /// Project listed under `status` on one side only
    StatusMissing {
        name: String,
        status: String,
        missing_from: Side,
        /// Status the project holds on the side that lacks it, if any
        present_as: Option<String>,
    },

    StatusCountMismatch {
        status: String,
        landscape: usize,
        registry: usize,
    },
}

/// Reporting category used for de-duplication and per-phase totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Presence,
    Repo,
    Date(Milestone),
    Status,
    StatusCount,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Presence => write!(f, "presence"),
            Category::Repo => write!(f, "repos"),
            Category::Date(milestone) => write!(f, "{} dates", milestone),
            Category::Status => write!(f, "status"),
            Category::StatusCount => write!(f, "status count"),
        }
    }
}

impl Mismatch {
    pub fn category(&self) -> Category {
        match self {
            Mismatch::MissingInRegistry { .. } | Mismatch::MissingInLandscape { .. } => Category::Presence,
            Mismatch::IgnoredRepoIncorrect { .. }
            | Mismatch::RepoMissingOnOtherSide { .. }
            | Mismatch::RepoMismatch { .. } => Category::Repo,
            Mismatch::DateMissingOnOtherSide { field, .. } | Mismatch::DateMismatch { field, .. } => {
                Category::Date(*field)
            }
            Mismatch::StatusMissing { .. } => Category::Status,
            Mismatch::StatusCountMismatch { .. } => Category::StatusCount,
        }
    }

    /// The project name, or the status for count mismatches
    pub fn subject(&self) -> &str {
        match self {
            Mismatch::MissingInRegistry { name }
            | Mismatch::MissingInLandscape { name }
            | Mismatch::IgnoredRepoIncorrect { name, .. }
            | Mismatch::RepoMissingOnOtherSide { name, .. }
            | Mismatch::RepoMismatch { name, .. }
            | Mismatch::DateMissingOnOtherSide { name, .. }
            | Mismatch::DateMismatch { name, .. }
            | Mismatch::StatusMissing { name, .. } => name,
            Mismatch::StatusCountMismatch { status, .. } => status,
        }
    }
}

/// Per-status project counts, restricted to non-exempt projects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTally {
    pub status: String,
    pub landscape: usize,
    pub registry: usize,
}

impl StatusTally {
    pub fn agrees(&self) -> bool {
        self.landscape == self.registry
    }
}

/// Outcome of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reconciliation {
    pub mismatches: Vec<Mismatch>,
    pub statuses: Vec<StatusTally>,
}

impl Reconciliation {
    pub fn drift_detected(&self) -> bool {
        !self.mismatches.is_empty()
    }

    /// Number of mismatches in a category
    pub fn count(&self, category: Category) -> usize {
        self.mismatches
            .iter()
            .filter(|m| m.category() == category)
            .count()
    }
}

/// Ordered log that drops repeats of an already reported `(category, subject)`
#[derive(Debug, Default)]
struct MismatchLog {
    entries: Vec<Mismatch>,
    reported: HashSet<(Category, String)>,
}

impl MismatchLog {
    fn record(&mut self, mismatch: Mismatch) -> bool {
        let key = (mismatch.category(), mismatch.subject().to_string());
        if !self.reported.insert(key) {
            return false;
        }
        self.entries.push(mismatch);
        true
    }
}

/// Runs every check phase against a pair of indices
pub struct Reconciler<'a> {
    exceptions: &'a ExceptionRegistry,
}

impl<'a> Reconciler<'a> {
    pub fn new(exceptions: &'a ExceptionRegistry) -> Self {
        Self { exceptions }
    }

    pub fn reconcile(&self, catalogs: &Catalogs) -> Reconciliation {
        let mut log = MismatchLog::default();

        self.check_presence(catalogs, &mut log);
        self.check_repos(&catalogs.landscape.projects, &catalogs.registry.projects, &mut log);
        for milestone in Milestone::all() {
            self.check_dates(*milestone, &catalogs.landscape.projects, &catalogs.registry.projects, &mut log);
        }
        let statuses = self.check_statuses(catalogs, &mut log);

        Reconciliation {
            mismatches: log.entries,
            statuses,
        }
    }

    fn check_presence(&self, catalogs: &Catalogs, log: &mut MismatchLog) {
        for name in &catalogs.landscape.unresolved {
            if catalogs.registry.disabled.contains(name) || self.exceptions.ignores_missing(name) {
                continue;
            }
            log.record(Mismatch::MissingInRegistry { name: name.clone() });
        }

        for name in catalogs.registry.projects.names() {
            if !catalogs.landscape.projects.contains(name) {
                log.record(Mismatch::MissingInLandscape { name: name.to_string() });
            }
        }
    }

    fn check_repos(&self, landscape: &CanonicalIndex, registry: &CanonicalIndex, log: &mut MismatchLog) {
        let scans = [(Side::Landscape, landscape, registry), (Side::Registry, registry, landscape)];

        for (side, this, other) in scans {
            for (name, entry) in this.iter() {
                let Some(repo) = entry.repo.as_deref() else {
                    continue;
                };

                if let Some(pair) = self.exceptions.repo_pair(name) {
                    if let Some(mismatch) = ignored_repo_deviation(name, pair, landscape, registry) {
                        log.record(mismatch);
                    }
                    continue;
                }

                match other.repo(name) {
                    None => {
                        log.record(Mismatch::RepoMissingOnOtherSide {
                            name: name.to_string(),
                            present_on: side,
                            repo: repo.to_string(),
                        });
                    }
                    Some(other_repo) if other_repo != repo => {
                        let (landscape_repo, registry_repo) = oriented(side, repo, other_repo);
                        log.record(Mismatch::RepoMismatch {
                            name: name.to_string(),
                            landscape: landscape_repo.to_string(),
                            registry: registry_repo.to_string(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
    }

    fn check_dates(
        &self,
        milestone: Milestone,
        landscape: &CanonicalIndex,
        registry: &CanonicalIndex,
        log: &mut MismatchLog,
    ) {
        let scans = [(Side::Landscape, landscape, registry), (Side::Registry, registry, landscape)];

        for (side, this, other) in scans {
            for (name, entry) in this.iter() {
                let Some(date) = entry.date(milestone) else {
                    continue;
                };
                if self.exceptions.ignores_date(milestone, name) {
                    continue;
                }

                match other.date(milestone, name) {
                    None => {
                        log.record(Mismatch::DateMissingOnOtherSide {
                            name: name.to_string(),
                            field: milestone,
                            present_on: side,
                            date: date.to_string(),
                        });
                    }
                    Some(other_date) if other_date != date => {
                        let (landscape_date, registry_date) = oriented(side, date, other_date);
                        log.record(Mismatch::DateMismatch {
                            name: name.to_string(),
                            field: milestone,
                            landscape: landscape_date.to_string(),
                            registry: registry_date.to_string(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
    }

    fn check_statuses(&self, catalogs: &Catalogs, log: &mut MismatchLog) -> Vec<StatusTally> {
        let landscape = &catalogs.landscape.statuses;
        let registry = &catalogs.registry.statuses;
        let scans = [
            (Side::Landscape, landscape, registry, &catalogs.registry.projects),
            (Side::Registry, registry, landscape, &catalogs.landscape.projects),
        ];

        for (side, this, other, other_projects) in scans {
            for status in this.statuses() {
                for name in this.members(status) {
                    if self.exceptions.ignores_status(name) || other.contains(status, name) {
                        continue;
                    }
                    // The other side's own status, else any group listing the name
                    let present_as = other_projects
                        .get(name)
                        .and_then(|entry| entry.status.as_deref())
                        .or_else(|| other.status_of(name));
                    log.record(Mismatch::StatusMissing {
                        name: name.to_string(),
                        status: status.to_string(),
                        missing_from: side.other(),
                        present_as: present_as.map(String::from),
                    });
                }
            }
        }

        let mut statuses: Vec<&str> = landscape.statuses().chain(registry.statuses()).collect();
        statuses.sort_unstable();
        statuses.dedup();

        let count = |groups: &StatusGroups, status: &str| {
            groups
                .members(status)
                .filter(|name| !self.exceptions.ignores_status(name))
                .count()
        };

        let tallies: Vec<StatusTally> = statuses
            .into_iter()
            .map(|status| StatusTally {
                status: status.to_string(),
                landscape: count(landscape, status),
                registry: count(registry, status),
            })
            .filter(|tally| tally.landscape > 0 || tally.registry > 0)
            .collect();

        for tally in tallies.iter().filter(|t| !t.agrees()) {
            log.record(Mismatch::StatusCountMismatch {
                status: tally.status.clone(),
                landscape: tally.landscape,
                registry: tally.registry,
            });
        }

        tallies
    }
}

/// Orders a `(this, other)` pair as `(landscape, registry)`
fn oriented<'v>(side: Side, this: &'v str, other: &'v str) -> (&'v str, &'v str) {
    match side {
        Side::Landscape => (this, other),
        Side::Registry => (other, this),
    }
}

/// Compares each side's observed repo with what the accepted pair expects
fn ignored_repo_deviation(
    name: &str,
    pair: &RepoPair,
    landscape: &CanonicalIndex,
    registry: &CanonicalIndex,
) -> Option<Mismatch> {
    let deviation = |observed: Option<&str>, expected: &str| {
        observed.filter(|repo| *repo != expected).map(String::from)
    };
    let landscape_repo = deviation(landscape.repo(name), &pair.landscape);
    let registry_repo = deviation(registry.repo(name), &pair.registry);

    if landscape_repo.is_none() && registry_repo.is_none() {
        return None;
    }
    Some(Mismatch::IgnoredRepoIncorrect {
        name: name.to_string(),
        expected: pair.clone(),
        landscape: landscape_repo,
        registry: registry_repo,
    })
}
