//! Reconciliation core
//!
//! Contains the comparison logic without any I/O concerns: name
//! canonicalization, exception tables, indexing, the check phases and
//! report rendering.

mod catalog;
mod exceptions;
mod index;
mod name;
mod reconcile;
mod report;

pub use catalog::{
    Category as LandscapeCategory, ItemExtra, LandscapeDocument, LandscapeItem, ProjectRecord,
    RegistryDocument, Subcategory, DATE_FORMAT,
};
pub use exceptions::{ExceptionError, ExceptionRegistry, Milestone, RepoPair};
pub use index::{
    normalize_landscape_repo, truncate_date, CanonicalEntry, CanonicalIndex, CatalogIndexer, Catalogs,
    LandscapeIndex, RegistryIndex, StatusGroups,
};
pub use name::{fold, AliasTable, Canonicalizer, Resolution, Side};
pub use reconcile::{Category, Mismatch, Reconciler, Reconciliation, StatusTally};
pub use report::Report;

/// Indexes both documents and runs every check phase
pub fn reconcile(
    registry: &RegistryDocument,
    landscape: &LandscapeDocument,
    exceptions: &ExceptionRegistry,
) -> Reconciliation {
    let catalogs = CatalogIndexer::new(exceptions).index(registry, landscape);
    Reconciler::new(exceptions).reconcile(&catalogs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(yaml: &str) -> RegistryDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn landscape(yaml: &str) -> LandscapeDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn matching_project_has_no_drift() {
        let registry = registry(
            r#"
projects:
  foo:
    name: foo
    main_repo: org/foo
    status: incubating
    join_date: 2020-01-01
"#,
        );
        let landscape = landscape(
            r#"
landscape:
  - name: Runtime
    subcategories:
      - name: Scheduling
        items:
          - name: Foo
            project: incubating
            repo_url: https://github.com/org/foo
            extra:
              accepted: "2020-01-01T00:00:00Z"
"#,
        );

        let result = reconcile(&registry, &landscape, &ExceptionRegistry::empty());

        assert!(!result.drift_detected(), "{:?}", result.mismatches);
        assert_eq!(Report::new(&result).text(), "incubating: 1 projects\n");
    }

    #[test]
    fn unknown_landscape_project_is_missing_in_registry() {
        let landscape = landscape(
            r#"
landscape:
  - name: Runtime
    subcategories:
      - name: Scheduling
        items:
          - name: Bar
            extra:
              accepted: "2021-06-01"
"#,
        );

        let result = reconcile(&RegistryDocument::default(), &landscape, &ExceptionRegistry::empty());

        assert_eq!(
            result.mismatches,
            vec![Mismatch::MissingInRegistry { name: "bar".to_string() }]
        );
    }

    #[test]
    fn disabled_registry_project_suppresses_missing() {
        let registry = registry(
            r#"
projects:
  bar:
    name: Bar
    disabled: true
"#,
        );
        let landscape = landscape(
            r#"
landscape:
  - name: Runtime
    subcategories:
      - name: Scheduling
        items:
          - name: Bar
            project: archived
"#,
        );

        let result = reconcile(&registry, &landscape, &ExceptionRegistry::empty());

        assert!(!result.drift_detected(), "{:?}", result.mismatches);
    }
}
