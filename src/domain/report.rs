//! Text rendering of a reconciliation
//!
//! Every mismatch renders as one or more lines starting with `error:`. Lines
//! follow the engine's ordering, which is already sorted by name within each
//! phase, and each phase ends with its total. The per-status summary closes
//! the report.

use super::reconcile::{Category, Mismatch, Reconciliation, StatusTally};

impl Mismatch {
    /// Report lines for this mismatch
    pub fn lines(&self) -> Vec<String> {
        match self {
            Mismatch::MissingInRegistry { name } => {
                vec![format!("error: missing in registry: '{}'", name)]
            }
            Mismatch::MissingInLandscape { name } => {
                vec![format!("error: missing in landscape: '{}'", name)]
            }
            Mismatch::IgnoredRepoIncorrect {
                name,
                expected,
                landscape,
                registry,
            } => {
                let mut lines = Vec::new();
                if let Some(repo) = landscape {
                    lines.push(format!(
                        "error: ignored landscape repo is incorrect '{}' '{}' <=> '{}'",
                        name, repo, expected.landscape
                    ));
                }
                if let Some(repo) = registry {
                    lines.push(format!(
                        "error: ignored registry repo is incorrect '{}' '{}' <=> '{}'",
                        name, repo, expected.registry
                    ));
                }
                lines
            }
            Mismatch::RepoMissingOnOtherSide { name, present_on, repo } => vec![format!(
                "error: {} repo missing in {} '{}' '{}'",
                present_on,
                present_on.other(),
                name,
                repo
            )],
            Mismatch::RepoMismatch {
                name,
                landscape,
                registry,
            } => vec![format!(
                "error: landscape repo not equal to registry repo '{}' '{}' <=> '{}'",
                name, landscape, registry
            )],
            Mismatch::DateMissingOnOtherSide {
                name,
                field,
                present_on,
                date,
            } => vec![format!(
                "error: {} {} date missing in {} '{}' '{}'",
                present_on,
                field,
                present_on.other(),
                name,
                date
            )],
            Mismatch::DateMismatch {
                name,
                field,
                landscape,
                registry,
            } => vec![format!(
                "error: landscape {} date not equal to registry {} date '{}' '{}' <=> '{}'",
                field, field, name, landscape, registry
            )],
            Mismatch::StatusMissing {
                name,
                status,
                missing_from,
                present_as,
            } => {
                let mut line = format!("error: {} is missing {} '{}'", missing_from, status, name);
                if let Some(other) = present_as {
                    line.push_str(&format!(", but is present in {}", other));
                }
                vec![line]
            }
            Mismatch::StatusCountMismatch {
                status,
                landscape,
                registry,
            } => vec![format!(
                "error: {}: {} landscape projects, {} registry projects",
                status, landscape, registry
            )],
        }
    }
}

impl StatusTally {
    /// Summary line: the shared count, or the discrepancy
    pub fn line(&self) -> String {
        if self.agrees() {
            format!("{}: {} projects", self.status, self.landscape)
        } else {
            format!(
                "error: {}: {} landscape projects, {} registry projects",
                self.status, self.landscape, self.registry
            )
        }
    }
}

/// Rendered report plus the drift flag handed to notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    lines: Vec<String>,
    drift_detected: bool,
}

impl Report {
    pub fn new(result: &Reconciliation) -> Self {
        let mut lines = Vec::new();
        let mut current: Option<Category> = None;

        let body = result
            .mismatches
            .iter()
            .filter(|m| m.category() != Category::StatusCount);

        for mismatch in body {
            let category = mismatch.category();
            if let Some(previous) = current.filter(|c| *c != category) {
                lines.push(total_line(result, previous));
            }
            current = Some(category);
            lines.extend(mismatch.lines());
        }
        if let Some(last) = current {
            lines.push(total_line(result, last));
        }

        lines.extend(result.statuses.iter().map(StatusTally::line));

        Self {
            lines,
            drift_detected: result.drift_detected(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn drift_detected(&self) -> bool {
        self.drift_detected
    }

    /// The whole report, one line per row, newline terminated
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

fn total_line(result: &Reconciliation, category: Category) -> String {
    format!(
        "error: {} mismatches detected: {}",
        category,
        result.count(category)
    )
}
