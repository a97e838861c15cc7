//! Raw catalog records
//!
//! These mirror the two upstream documents closely: the registry is a flat
//! map of project key to record, the landscape is a category tree whose
//! leaves are items. Unknown fields are ignored on both sides.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

/// Date format used for every milestone comparison
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The registry document (`projects.yaml`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectRecord>,
}

/// A project as the registry describes it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProjectRecord {
    /// Display name
    #[serde(rename = "name", default)]
    pub full_name: String,

    #[serde(default)]
    pub main_repo: String,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub join_date: Option<NaiveDate>,

    #[serde(default)]
    pub incubating_date: Option<NaiveDate>,

    #[serde(default)]
    pub graduated_date: Option<NaiveDate>,

    #[serde(default)]
    pub disabled: bool,
}

/// The landscape document (`landscape.yml`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LandscapeDocument {
    #[serde(default)]
    pub landscape: Vec<Category>,
}

impl LandscapeDocument {
    /// Flattens the category tree into its items, in document order
    pub fn items(&self) -> impl Iterator<Item = &LandscapeItem> {
        self.landscape
            .iter()
            .flat_map(|category| category.subcategories.iter())
            .flat_map(|subcategory| subcategory.items.iter())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Subcategory {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub items: Vec<LandscapeItem>,
}

/// A landscape card. The same project may appear under several subcategories.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LandscapeItem {
    pub name: String,

    #[serde(default)]
    pub repo_url: Option<String>,

    /// Maturity marker (`sandbox`, `incubating`, `graduated`, ...)
    #[serde(default, rename = "project")]
    pub status: Option<String>,

    #[serde(default)]
    pub extra: Option<ItemExtra>,
}

/// Free-text milestone markers attached to an item
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemExtra {
    #[serde(default)]
    pub accepted: Option<String>,

    #[serde(default)]
    pub incubating: Option<String>,

    #[serde(default)]
    pub graduated: Option<String>,
}

impl LandscapeItem {
    pub fn accepted(&self) -> Option<&str> {
        self.extra.as_ref().and_then(|e| e.accepted.as_deref())
    }

    pub fn incubating(&self) -> Option<&str> {
        self.extra.as_ref().and_then(|e| e.incubating.as_deref())
    }

    pub fn graduated(&self) -> Option<&str> {
        self.extra.as_ref().and_then(|e| e.graduated.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_registry_document() {
        let yaml = r#"
projects:
  opa:
    name: OPA
    main_repo: open-policy-agent/opa
    status: Graduated
    join_date: 2018-03-29
    incubating_date: 2019-04-02
    graduated_date: 2021-01-29
    shared_db: ignored
  old:
    name: Old
    disabled: true
"#;

        let doc: RegistryDocument = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(doc.projects.len(), 2);

        let opa = &doc.projects["opa"];
        assert_eq!(opa.full_name, "OPA");
        assert_eq!(opa.join_date, NaiveDate::from_ymd_opt(2018, 3, 29));
        assert_eq!(opa.graduated_date, NaiveDate::from_ymd_opt(2021, 1, 29));
        assert!(!opa.disabled);

        let old = &doc.projects["old"];
        assert!(old.disabled);
        assert_eq!(old.join_date, None);
    }

    #[test]
    fn parse_landscape_tree() {
        let yaml = r#"
landscape:
  - category:
    name: Provisioning
    subcategories:
      - subcategory:
        name: Automation
        items:
          - item:
            name: Airship
            project: incubating
            repo_url: https://github.com/airshipit/treasuremap
            extra:
              accepted: '2018-10-22'
              incubating: 2021-04-22T00:00:00Z
          - item:
            name: Ansible
            homepage_url: https://www.ansible.com/
      - subcategory:
        name: Empty
  - category:
    name: Runtime
"#;

        let doc: LandscapeDocument = serde_yaml::from_str(yaml).unwrap();
        let items: Vec<_> = doc.items().collect();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].name, "Airship");
        assert_eq!(items[0].status.as_deref(), Some("incubating"));
        assert_eq!(items[0].accepted(), Some("2018-10-22"));
        assert_eq!(items[0].incubating(), Some("2021-04-22T00:00:00Z"));
        assert_eq!(items[0].graduated(), None);

        assert_eq!(items[1].repo_url, None);
        assert_eq!(items[1].accepted(), None);
    }
}
