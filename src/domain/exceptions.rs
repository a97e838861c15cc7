//! Accepted discrepancies between the two catalogs
//!
//! Every table is keyed by canonical project name. The registry is loaded
//! once, normalized, and then only read; lookups are total, so a name that
//! is absent from a table is simply not exempted.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::name::fold;

#[derive(Debug, Error, PartialEq)]
pub enum ExceptionError {
    #[error("Rename target '{0}' is itself renamed; renames must not chain")]
    ChainedRename(String),

    #[error("Duplicate entry '{name}' in {table} after case folding")]
    Duplicate { table: &'static str, name: String },
}

/// Milestone dates tracked for each project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Join,
    Incubating,
    Graduated,
}

impl Milestone {
    pub fn all() -> &'static [Milestone] {
        &[Milestone::Join, Milestone::Incubating, Milestone::Graduated]
    }
}

impl std::fmt::Display for Milestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Milestone::Join => write!(f, "join"),
            Milestone::Incubating => write!(f, "incubating"),
            Milestone::Graduated => write!(f, "graduated"),
        }
    }
}

/// Known repository difference: what each side is expected to list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPair {
    pub landscape: String,
    pub registry: String,
}

impl RepoPair {
    pub fn new(landscape: impl Into<String>, registry: impl Into<String>) -> Self {
        Self {
            landscape: landscape.into(),
            registry: registry.into(),
        }
    }
}

/// All exemption tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionRegistry {
    /// Registry display name -> landscape name
    pub renames: BTreeMap<String, String>,

    /// Registry projects excluded from indexing altogether
    pub skip: BTreeSet<String>,

    /// Landscape entries with no registry counterpart
    pub ignore_missing: BTreeSet<String>,

    /// Accepted repository differences
    pub ignore_repo: BTreeMap<String, RepoPair>,

    pub ignore_join_date: BTreeSet<String>,
    pub ignore_incubating_date: BTreeSet<String>,
    pub ignore_graduated_date: BTreeSet<String>,

    /// Accepted lifecycle status differences
    pub ignore_status: BTreeSet<String>,
}

impl Default for ExceptionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ExceptionRegistry {
    /// A registry with no exemptions at all
    pub fn empty() -> Self {
        Self {
            renames: BTreeMap::new(),
            skip: BTreeSet::new(),
            ignore_missing: BTreeSet::new(),
            ignore_repo: BTreeMap::new(),
            ignore_join_date: BTreeSet::new(),
            ignore_incubating_date: BTreeSet::new(),
            ignore_graduated_date: BTreeSet::new(),
            ignore_status: BTreeSet::new(),
        }
    }

    /// The discrepancies already reviewed and accepted upstream
    pub fn builtin() -> Self {
        let renames = [
            ("foniod", "fonio"),
            ("litmuschaos", "litmus"),
            ("opa", "open policy agent (opa)"),
            ("tuf", "the update framework (tuf)"),
            ("opcr", "open policy containers"),
            ("cni", "container network interface (cni)"),
            ("cloud deployment kit for kubernetes", "cdk for kubernetes (cdk8s)"),
            ("piraeus-datastore", "piraeus datastore"),
            ("external secrets operator", "external-secrets"),
            ("smi", "service mesh interface (smi)"),
            ("hexa policy orchestrator", "hexa"),
        ];

        // Landscape repo first, registry repo second
        let repos = [
            ("capsule", "clastix/capsule", "capsule-rs/capsule"),
            ("sealer", "alibaba/sealer", "sealerio/sealer"),
            (
                "network service mesh",
                "networkservicemesh/networkservicemesh",
                "networkservicemesh/api",
            ),
            (
                "confidential containers",
                "confidential-containers/documentation",
                "confidential-containers/operator",
            ),
            (
                "piraeus datastore",
                "piraeusdatastore/piraeus",
                "piraeusdatastore/piraeus-operator",
            ),
            ("devspace", "devspace-sh/devspace", "devspace-cloud/devspace-cloud"),
            ("notary", "notaryproject/notary", "notaryproject/notation"),
            ("knative", "knative/community", "knative/serving"),
            (
                "open cluster management",
                "open-cluster-management-io/ocm",
                "open-cluster-management-io/api",
            ),
            (
                "opentelemetry",
                "open-telemetry/community",
                "open-telemetry/opentelemetry-java",
            ),
            ("openfeature", "open-feature/community", "open-feature/spec"),
        ];

        Self {
            renames: renames
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            skip: set(&["all", "gitopswg", "inspektorgadget", "kubevip", "vscodek8stools"]),
            ignore_missing: set(&["opengitops", "tetragon", "traefik mesh"]),
            ignore_repo: repos
                .iter()
                .map(|(name, landscape, registry)| {
                    (name.to_string(), RepoPair::new(*landscape, *registry))
                })
                .collect(),
            ignore_join_date: set(&["capsule", "clusterpedia", "curve", "kubedl"]),
            ignore_incubating_date: BTreeSet::new(),
            ignore_graduated_date: BTreeSet::new(),
            ignore_status: set(&["capsule", "metallb"]),
        }
    }

    /// Folds every key and value so lookups can use canonical names directly
    pub fn normalized(self) -> Result<Self, ExceptionError> {
        let renames = fold_map("renames", self.renames, |to| fold(&to))?;
        if let Some(target) = renames.values().find(|to| renames.contains_key(*to)) {
            return Err(ExceptionError::ChainedRename(target.clone()));
        }

        let fold_pair = |pair: RepoPair| RepoPair::new(fold(&pair.landscape), fold(&pair.registry));

        Ok(Self {
            renames,
            skip: fold_set("skip", self.skip)?,
            ignore_missing: fold_set("ignore_missing", self.ignore_missing)?,
            ignore_repo: fold_map("ignore_repo", self.ignore_repo, fold_pair)?,
            ignore_join_date: fold_set("ignore_join_date", self.ignore_join_date)?,
            ignore_incubating_date: fold_set("ignore_incubating_date", self.ignore_incubating_date)?,
            ignore_graduated_date: fold_set("ignore_graduated_date", self.ignore_graduated_date)?,
            ignore_status: fold_set("ignore_status", self.ignore_status)?,
        })
    }

    pub fn is_skipped(&self, name: &str) -> bool {
        self.skip.contains(name)
    }

    pub fn ignores_missing(&self, name: &str) -> bool {
        self.ignore_missing.contains(name)
    }

    pub fn repo_pair(&self, name: &str) -> Option<&RepoPair> {
        self.ignore_repo.get(name)
    }

    pub fn ignores_date(&self, milestone: Milestone, name: &str) -> bool {
        match milestone {
            Milestone::Join => self.ignore_join_date.contains(name),
            Milestone::Incubating => self.ignore_incubating_date.contains(name),
            Milestone::Graduated => self.ignore_graduated_date.contains(name),
        }
    }

    pub fn ignores_status(&self, name: &str) -> bool {
        self.ignore_status.contains(name)
    }

    /// Total number of entries across all tables
    pub fn len(&self) -> usize {
        self.renames.len()
            + self.skip.len()
            + self.ignore_missing.len()
            + self.ignore_repo.len()
            + self.ignore_join_date.len()
            + self.ignore_incubating_date.len()
            + self.ignore_graduated_date.len()
            + self.ignore_status.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn fold_set(table: &'static str, names: BTreeSet<String>) -> Result<BTreeSet<String>, ExceptionError> {
    let mut folded = BTreeSet::new();
    for name in names {
        let name = fold(&name);
        if !folded.insert(name.clone()) {
            return Err(ExceptionError::Duplicate { table, name });
        }
    }
    Ok(folded)
}

fn fold_map<V>(
    table: &'static str,
    entries: BTreeMap<String, V>,
    fold_value: impl Fn(V) -> V,
) -> Result<BTreeMap<String, V>, ExceptionError> {
    let mut folded = BTreeMap::new();
    for (name, value) in entries {
        let name = fold(&name);
        if folded.insert(name.clone(), fold_value(value)).is_some() {
            return Err(ExceptionError::Duplicate { table, name });
        }
    }
    Ok(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_is_already_normalized() {
        let builtin = ExceptionRegistry::builtin();
        assert_eq!(builtin.clone().normalized().unwrap(), builtin);
    }

    #[test]
    fn lookups_are_total() {
        let exceptions = ExceptionRegistry::empty();
        assert!(!exceptions.is_skipped("anything"));
        assert!(!exceptions.ignores_missing("anything"));
        assert!(exceptions.repo_pair("anything").is_none());
        assert!(!exceptions.ignores_date(Milestone::Graduated, "anything"));
        assert!(!exceptions.ignores_status("anything"));
        assert!(exceptions.is_empty());
    }

    #[test]
    fn builtin_entries() {
        let exceptions = ExceptionRegistry::builtin();
        assert!(exceptions.is_skipped("all"));
        assert!(exceptions.ignores_missing("tetragon"));
        assert!(exceptions.ignores_date(Milestone::Join, "kubedl"));
        assert!(!exceptions.ignores_date(Milestone::Incubating, "kubedl"));
        assert!(exceptions.ignores_status("metallb"));
        assert_eq!(
            exceptions.repo_pair("knative"),
            Some(&RepoPair::new("knative/community", "knative/serving"))
        );
    }

    #[test]
    fn normalize_folds_keys_and_values() {
        let mut exceptions = ExceptionRegistry::empty();
        exceptions.skip.insert(" ALL ".to_string());
        exceptions
            .renames
            .insert("Cloud Deployment Kit".to_string(), "CDK (cdk8S)".to_string());
        exceptions
            .ignore_repo
            .insert("Capsule".to_string(), RepoPair::new("Clastix/Capsule", "capsule-rs/capsule"));

        let normalized = exceptions.normalized().unwrap();
        assert!(normalized.is_skipped("all"));
        assert_eq!(
            normalized.renames.get("cloud deployment kit").map(String::as_str),
            Some("cdk (cdk8s)")
        );
        assert_eq!(
            normalized.repo_pair("capsule").map(|p| p.landscape.as_str()),
            Some("clastix/capsule")
        );
    }

    #[test]
    fn normalize_rejects_chained_renames() {
        let mut exceptions = ExceptionRegistry::empty();
        exceptions.renames.insert("a".to_string(), "b".to_string());
        exceptions.renames.insert("b".to_string(), "c".to_string());

        assert_eq!(
            exceptions.normalized(),
            Err(ExceptionError::ChainedRename("b".to_string()))
        );
    }

    #[test]
    fn normalize_rejects_case_duplicates() {
        let mut exceptions = ExceptionRegistry::empty();
        exceptions.ignore_status.insert("Capsule".to_string());
        exceptions.ignore_status.insert("capsule".to_string());

        assert!(matches!(
            exceptions.normalized(),
            Err(ExceptionError::Duplicate { table: "ignore_status", .. })
        ));
    }

    #[test]
    fn parse_partial_table_keeps_builtin_defaults() {
        let toml = r#"
ignore_status = ["linkerd"]

[ignore_repo]
foo = { landscape = "org/foo-docs", registry = "org/foo" }
"#;

        let exceptions: ExceptionRegistry = toml::from_str(toml).unwrap();
        assert!(exceptions.ignores_status("linkerd"));
        assert!(!exceptions.ignores_status("capsule"));
        assert_eq!(exceptions.ignore_repo.len(), 1);
        assert!(exceptions.is_skipped("all"));
    }
}
