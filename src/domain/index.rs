//! Canonical-name-keyed indices for both catalogs
//!
//! The registry is indexed first so that landscape names can be resolved
//! against it. Both sides end up with the same shape: one [`CanonicalEntry`]
//! per project plus status groups, which is what the reconciler compares.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::catalog::{LandscapeDocument, LandscapeItem, ProjectRecord, RegistryDocument, DATE_FORMAT};
use super::exceptions::{ExceptionRegistry, Milestone};
use super::name::{fold, AliasTable, Canonicalizer, Resolution};

/// Prefix stripped from landscape repository URLs
pub const GITHUB_PREFIX: &str = "https://github.com/";

/// Comparable fields of one project on one side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalEntry {
    pub repo: Option<String>,
    pub join_date: Option<String>,
    pub incubating_date: Option<String>,
    pub graduated_date: Option<String>,
    pub status: Option<String>,
}

impl CanonicalEntry {
    pub fn date(&self, milestone: Milestone) -> Option<&str> {
        match milestone {
            Milestone::Join => self.join_date.as_deref(),
            Milestone::Incubating => self.incubating_date.as_deref(),
            Milestone::Graduated => self.graduated_date.as_deref(),
        }
    }

    fn date_slot(&mut self, milestone: Milestone) -> &mut Option<String> {
        match milestone {
            Milestone::Join => &mut self.join_date,
            Milestone::Incubating => &mut self.incubating_date,
            Milestone::Graduated => &mut self.graduated_date,
        }
    }

    /// Records a landscape milestone date, keeping the first value seen.
    ///
    /// Incubation must come after the join date and graduation after both;
    /// a date that breaks that order is dropped.
    fn offer_date(&mut self, milestone: Milestone, raw: Option<&str>) -> bool {
        if self.date(milestone).is_some() {
            return false;
        }
        let Some(date) = raw.and_then(truncate_date) else {
            return false;
        };

        let earlier: &[Milestone] = match milestone {
            Milestone::Join => &[],
            Milestone::Incubating => &[Milestone::Join],
            Milestone::Graduated => &[Milestone::Join, Milestone::Incubating],
        };
        let ordered = earlier
            .iter()
            .filter_map(|m| self.date(*m))
            .all(|prior| date.as_str() > prior);
        if !ordered {
            return false;
        }

        *self.date_slot(milestone) = Some(date);
        true
    }
}

/// Trims a free-text date and keeps its leading `YYYY-MM-DD` part.
///
/// Blank input yields `None`. The prefix is not validated.
pub fn truncate_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(10).collect())
}

/// Folds a landscape repo URL down to `org/repo`
pub fn normalize_landscape_repo(raw: &str) -> Option<String> {
    let folded = fold(raw);
    let repo = folded.strip_prefix(GITHUB_PREFIX).unwrap_or(&folded);
    if repo.is_empty() {
        None
    } else {
        Some(repo.to_string())
    }
}

/// Canonical name -> entry for one side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalIndex {
    entries: BTreeMap<String, CanonicalEntry>,
}

impl CanonicalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&CanonicalEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entry(&mut self, name: &str) -> &mut CanonicalEntry {
        self.entries.entry(name.to_string()).or_default()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: CanonicalEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// Names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CanonicalEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn repo(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|e| e.repo.as_deref())
    }

    pub fn date(&self, milestone: Milestone, name: &str) -> Option<&str> {
        self.get(name).and_then(|e| e.date(milestone))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Status -> canonical names holding it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusGroups {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl StatusGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a project under a folded status; blank statuses are not grouped
    pub fn add(&mut self, status: &str, name: &str) {
        let status = fold(status);
        if status.is_empty() {
            return;
        }
        self.groups
            .entry(status)
            .or_default()
            .insert(name.to_string());
    }

    pub fn contains(&self, status: &str, name: &str) -> bool {
        self.groups
            .get(status)
            .is_some_and(|members| members.contains(name))
    }

    pub fn members(&self, status: &str) -> impl Iterator<Item = &str> {
        self.groups
            .get(status)
            .into_iter()
            .flat_map(|members| members.iter().map(String::as_str))
    }

    /// Statuses in sorted order
    pub fn statuses(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// First status, in sorted order, that lists `name`
    pub fn status_of(&self, name: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, members)| members.contains(name))
            .map(|(status, _)| status.as_str())
    }
}

/// The registry side after indexing
#[derive(Debug, Clone, Default)]
pub struct RegistryIndex {
    pub projects: CanonicalIndex,
    pub statuses: StatusGroups,
    /// Folded keys of disabled projects
    pub disabled: BTreeSet<String>,
}

/// The landscape side after indexing
#[derive(Debug, Clone, Default)]
pub struct LandscapeIndex {
    pub projects: CanonicalIndex,
    pub statuses: StatusGroups,
    /// Folded names of landscape projects the registry does not know
    pub unresolved: BTreeSet<String>,
}

/// Both indices plus the aliases collected while building them
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub registry: RegistryIndex,
    pub landscape: LandscapeIndex,
    pub aliases: AliasTable,
}

/// Builds [`Catalogs`] from the two raw documents
pub struct CatalogIndexer<'a> {
    exceptions: &'a ExceptionRegistry,
    names: Canonicalizer<'a>,
}

impl<'a> CatalogIndexer<'a> {
    pub fn new(exceptions: &'a ExceptionRegistry) -> Self {
        Self {
            exceptions,
            names: Canonicalizer::new(&exceptions.renames),
        }
    }

    /// Indexes the registry and then the landscape
    pub fn index(mut self, registry: &RegistryDocument, landscape: &LandscapeDocument) -> Catalogs {
        let registry = self.index_registry(registry);
        let landscape = self.index_landscape(landscape, &registry.projects);

        Catalogs {
            registry,
            landscape,
            aliases: self.names.into_aliases(),
        }
    }

    fn index_registry(&mut self, document: &RegistryDocument) -> RegistryIndex {
        let mut index = RegistryIndex::default();

        for (key, record) in &document.projects {
            let key = fold(key);
            if self.exceptions.is_skipped(&key) {
                continue;
            }
            if record.disabled {
                index.disabled.insert(key);
                continue;
            }

            // A record without a display name is known by its key
            let full_name = match record.full_name.trim() {
                "" => key.as_str(),
                name => name,
            };
            let name = self.names.register(&key, full_name);
            index.statuses.add(&record.status, &name);
            index.projects.insert(name, registry_entry(record));
        }

        index
    }

    fn index_landscape(&self, document: &LandscapeDocument, registry: &CanonicalIndex) -> LandscapeIndex {
        let mut index = LandscapeIndex::default();

        for item in document.items() {
            let name = match self.names.resolve(&item.name, |n| registry.contains(n)) {
                Resolution::Known(name) => name,
                Resolution::Unknown(name) => {
                    if is_tracked(item) {
                        index.unresolved.insert(name);
                    }
                    continue;
                }
            };

            let entry = index.projects.entry(&name);
            if entry.repo.is_none() {
                entry.repo = item.repo_url.as_deref().and_then(normalize_landscape_repo);
            }
            entry.offer_date(Milestone::Join, item.accepted());
            entry.offer_date(Milestone::Incubating, item.incubating());
            entry.offer_date(Milestone::Graduated, item.graduated());

            if let Some(status) = item.status.as_deref() {
                let status = fold(status);
                if !status.is_empty() {
                    if entry.status.is_none() {
                        entry.status = Some(status.clone());
                    }
                    index.statuses.add(&status, &name);
                }
            }
        }

        index
    }
}

/// A landscape item counts as a project when it carries a join date or a
/// maturity marker
fn is_tracked(item: &LandscapeItem) -> bool {
    let non_blank = |v: Option<&str>| v.is_some_and(|s| !s.trim().is_empty());
    non_blank(item.accepted()) || non_blank(item.status.as_deref())
}

fn registry_entry(record: &ProjectRecord) -> CanonicalEntry {
    let render = |date: Option<chrono::NaiveDate>| date.map(|d| d.format(DATE_FORMAT).to_string());
    let repo = fold(&record.main_repo);
    let status = fold(&record.status);

    CanonicalEntry {
        repo: (!repo.is_empty()).then_some(repo),
        join_date: render(record.join_date),
        incubating_date: render(record.incubating_date),
        graduated_date: render(record.graduated_date),
        status: (!status.is_empty()).then_some(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Category, ItemExtra, Subcategory};
    use chrono::NaiveDate;

    fn record(name: &str, repo: &str, status: &str, join: (i32, u32, u32)) -> ProjectRecord {
        ProjectRecord {
            full_name: name.to_string(),
            main_repo: repo.to_string(),
            status: status.to_string(),
            join_date: NaiveDate::from_ymd_opt(join.0, join.1, join.2),
            ..Default::default()
        }
    }

    fn item(name: &str, status: Option<&str>, accepted: Option<&str>) -> LandscapeItem {
        LandscapeItem {
            name: name.to_string(),
            repo_url: None,
            status: status.map(String::from),
            extra: Some(ItemExtra {
                accepted: accepted.map(String::from),
                ..Default::default()
            }),
        }
    }

    fn landscape(items: Vec<LandscapeItem>) -> LandscapeDocument {
        LandscapeDocument {
            landscape: vec![Category {
                name: "Runtime".to_string(),
                subcategories: vec![Subcategory {
                    name: "Container Runtime".to_string(),
                    items,
                }],
            }],
        }
    }

    fn registry(records: Vec<(&str, ProjectRecord)>) -> RegistryDocument {
        RegistryDocument {
            projects: records
                .into_iter()
                .map(|(key, record)| (key.to_string(), record))
                .collect(),
        }
    }

    #[test]
    fn truncate_keeps_date_prefix() {
        assert_eq!(truncate_date(" 2020-01-01T00:00:00Z "), Some("2020-01-01".to_string()));
        assert_eq!(truncate_date("2020-01-01"), Some("2020-01-01".to_string()));
        assert_eq!(truncate_date("   "), None);
    }

    #[test]
    fn landscape_repo_is_stripped() {
        assert_eq!(
            normalize_landscape_repo(" https://github.com/Org/Foo "),
            Some("org/foo".to_string())
        );
        assert_eq!(
            normalize_landscape_repo("https://gitlab.com/org/foo"),
            Some("https://gitlab.com/org/foo".to_string())
        );
        assert_eq!(normalize_landscape_repo(""), None);
    }

    #[test]
    fn first_date_wins() {
        let mut entry = CanonicalEntry::default();
        assert!(entry.offer_date(Milestone::Join, Some("2021-05-01")));
        assert!(!entry.offer_date(Milestone::Join, Some("2022-01-01")));
        assert!(!entry.offer_date(Milestone::Join, Some("")));
        assert_eq!(entry.join_date.as_deref(), Some("2021-05-01"));
    }

    #[test]
    fn blank_date_does_not_claim_slot() {
        let mut entry = CanonicalEntry::default();
        assert!(!entry.offer_date(Milestone::Join, Some("  ")));
        assert!(entry.offer_date(Milestone::Join, Some("2021-05-01")));
    }

    #[test]
    fn incubation_must_follow_join() {
        let mut entry = CanonicalEntry::default();
        entry.offer_date(Milestone::Join, Some("2021-05-01"));

        assert!(!entry.offer_date(Milestone::Incubating, Some("2021-05-01")));
        assert!(!entry.offer_date(Milestone::Incubating, Some("2020-01-01")));
        assert_eq!(entry.incubating_date, None);

        assert!(entry.offer_date(Milestone::Incubating, Some("2022-03-01")));
    }

    #[test]
    fn graduation_must_follow_join_and_incubation() {
        let mut entry = CanonicalEntry::default();
        entry.offer_date(Milestone::Join, Some("2018-01-01"));
        entry.offer_date(Milestone::Incubating, Some("2019-01-01"));

        assert!(!entry.offer_date(Milestone::Graduated, Some("2018-06-01")));
        assert!(entry.offer_date(Milestone::Graduated, Some("2020-01-01")));
    }

    #[test]
    fn nameless_registry_records_keep_their_keys() {
        let doc = registry(vec![
            ("foo", record("", "org/foo", "sandbox", (2021, 1, 1))),
            ("Bar", record("  ", "org/bar", "sandbox", (2022, 1, 1))),
        ]);

        let catalogs = CatalogIndexer::new(&ExceptionRegistry::empty()).index(&doc, &LandscapeDocument::default());
        let names: Vec<&str> = catalogs.registry.projects.names().collect();

        assert_eq!(names, vec!["bar", "foo"]);
        assert_eq!(catalogs.registry.projects.repo("bar"), Some("org/bar"));
        assert!(catalogs.aliases.is_empty());
    }

    #[test]
    fn registry_skips_and_disables() {
        let exceptions = ExceptionRegistry::builtin();
        let mut disabled = record("Old", "org/old", "archived", (2019, 1, 1));
        disabled.disabled = true;

        let doc = registry(vec![
            ("all", record("All CNCF", "", "", (2016, 1, 1))),
            ("old", disabled),
            ("k8s", record("Kubernetes", " Kubernetes/Kubernetes ", "Graduated", (2016, 3, 10))),
        ]);

        let catalogs = CatalogIndexer::new(&exceptions).index(&doc, &LandscapeDocument::default());
        let projects = &catalogs.registry.projects;

        assert_eq!(projects.len(), 1);
        assert_eq!(projects.repo("kubernetes"), Some("kubernetes/kubernetes"));
        assert_eq!(projects.date(Milestone::Join, "kubernetes"), Some("2016-03-10"));
        assert!(catalogs.registry.statuses.contains("graduated", "kubernetes"));
        assert!(catalogs.registry.disabled.contains("old"));
        assert_eq!(catalogs.aliases.resolve("k8s"), Some("kubernetes"));
    }

    #[test]
    fn landscape_resolves_through_aliases_and_dedupes() {
        let exceptions = ExceptionRegistry::empty();
        let doc = registry(vec![("k8s", record("Kubernetes", "kubernetes/kubernetes", "graduated", (2016, 3, 10)))]);

        let mut first = item("K8s", Some("graduated"), Some("2016-03-10"));
        first.repo_url = Some("https://github.com/kubernetes/kubernetes".to_string());
        let mut second = item("Kubernetes", Some("graduated"), Some("2017-01-01"));
        second.repo_url = Some("https://github.com/kubernetes/website".to_string());

        let catalogs = CatalogIndexer::new(&exceptions).index(&doc, &landscape(vec![first, second]));
        let projects = &catalogs.landscape.projects;

        assert_eq!(projects.len(), 1);
        assert_eq!(projects.repo("kubernetes"), Some("kubernetes/kubernetes"));
        assert_eq!(projects.date(Milestone::Join, "kubernetes"), Some("2016-03-10"));
        assert_eq!(catalogs.landscape.statuses.members("graduated").count(), 1);
    }

    #[test]
    fn unresolved_requires_marker() {
        let exceptions = ExceptionRegistry::empty();
        let items = vec![
            item("Bar", None, Some("2020-02-02")),
            item("Baz", Some("sandbox"), None),
            item("Vendor Product", None, None),
        ];

        let catalogs = CatalogIndexer::new(&exceptions).index(&RegistryDocument::default(), &landscape(items));
        let unresolved: Vec<_> = catalogs.landscape.unresolved.iter().map(String::as_str).collect();

        assert_eq!(unresolved, vec!["bar", "baz"]);
        assert!(catalogs.landscape.projects.is_empty());
    }

    #[test]
    fn status_of_reports_first_group() {
        let mut groups = StatusGroups::new();
        groups.add(" Incubating ", "foo");
        groups.add("", "bar");

        assert_eq!(groups.status_of("foo"), Some("incubating"));
        assert_eq!(groups.status_of("bar"), None);
        assert_eq!(groups.statuses().count(), 1);
    }
}
