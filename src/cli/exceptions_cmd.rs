//! Exceptions command: shows the tables a check would run with

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::domain::{ExceptionRegistry, Milestone};
use crate::storage::Config;

pub fn run(config_path: Option<&Path>, output: &Output) -> Result<()> {
    let config = Config::load(config_path)?;
    let exceptions = &config.exceptions;

    if output.is_json() {
        output.data(&serde_json::json!({
            "config": config.path.as_ref().map(|p| p.display().to_string()),
            "entries": exceptions.len(),
            "exceptions": exceptions,
        }));
        return Ok(());
    }

    output.lines(&render(exceptions));
    Ok(())
}

fn render(exceptions: &ExceptionRegistry) -> Vec<String> {
    let mut lines = Vec::new();

    section(
        &mut lines,
        "renames",
        exceptions.renames.iter().map(|(from, to)| format!("{} -> {}", from, to)),
    );
    section(&mut lines, "skip", exceptions.skip.iter().cloned());
    section(&mut lines, "ignore_missing", exceptions.ignore_missing.iter().cloned());
    section(
        &mut lines,
        "ignore_repo",
        exceptions
            .ignore_repo
            .iter()
            .map(|(name, pair)| format!("{}: landscape '{}', registry '{}'", name, pair.landscape, pair.registry)),
    );
    for milestone in Milestone::all() {
        let names = match milestone {
            Milestone::Join => &exceptions.ignore_join_date,
            Milestone::Incubating => &exceptions.ignore_incubating_date,
            Milestone::Graduated => &exceptions.ignore_graduated_date,
        };
        section(&mut lines, &format!("ignore_{}_date", milestone), names.iter().cloned());
    }
    section(&mut lines, "ignore_status", exceptions.ignore_status.iter().cloned());

    lines
}

fn section(lines: &mut Vec<String>, title: &str, entries: impl Iterator<Item = String>) {
    let entries: Vec<String> = entries.collect();
    lines.push(format!("{} ({}):", title, entries.len()));
    lines.extend(entries.into_iter().map(|e| format!("  {}", e)));
}
