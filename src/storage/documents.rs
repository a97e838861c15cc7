//! Loading and parsing the two catalog documents

use anyhow::{Context, Result};

use super::source::{Fetcher, Source};
use crate::domain::{LandscapeDocument, RegistryDocument};

/// Parses a landscape document (`landscape.yml`)
pub fn parse_landscape(bytes: &[u8]) -> Result<LandscapeDocument> {
    serde_yaml::from_slice(bytes).context("Failed to parse landscape document")
}

/// Parses a registry document (`projects.yaml`)
pub fn parse_registry(bytes: &[u8]) -> Result<RegistryDocument> {
    serde_yaml::from_slice(bytes).context("Failed to parse registry document")
}

/// Both documents, loaded and parsed
pub struct Documents {
    pub landscape: LandscapeDocument,
    pub registry: RegistryDocument,
}

impl Documents {
    /// Reads and parses both sources. Any failure aborts the load.
    pub fn load(fetcher: &Fetcher, landscape: &Source, registry: &Source) -> Result<Self> {
        let landscape_bytes = fetcher.read(landscape)?;
        let registry_bytes = fetcher.read(registry)?;

        let landscape = parse_landscape(&landscape_bytes)
            .with_context(|| format!("Invalid landscape source: {}", landscape))?;
        let registry = parse_registry(&registry_bytes)
            .with_context(|| format!("Invalid registry source: {}", registry))?;

        Ok(Self { landscape, registry })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_local_documents() {
        let dir = TempDir::new().unwrap();
        let landscape = dir.path().join("landscape.yml");
        let registry = dir.path().join("projects.yaml");
        fs::write(
            &landscape,
            "landscape:\n  - name: Runtime\n    subcategories:\n      - name: Mesh\n        items:\n          - name: Linkerd\n            project: graduated\n",
        )
        .unwrap();
        fs::write(&registry, "projects:\n  linkerd:\n    name: Linkerd\n    status: Graduated\n").unwrap();

        let fetcher = Fetcher::new(None).unwrap();
        let docs = Documents::load(&fetcher, &Source::Local(landscape), &Source::Local(registry)).unwrap();

        assert_eq!(docs.landscape.items().count(), 1);
        assert_eq!(docs.registry.projects["linkerd"].status, "Graduated");
    }

    #[test]
    fn parse_error_names_source() {
        let dir = TempDir::new().unwrap();
        let landscape = dir.path().join("landscape.yml");
        let registry = dir.path().join("projects.yaml");
        fs::write(&landscape, "landscape: []\n").unwrap();
        fs::write(&registry, "projects: [not, a, map]\n").unwrap();

        let fetcher = Fetcher::new(None).unwrap();
        let err = Documents::load(&fetcher, &Source::Local(landscape), &Source::Local(registry.clone()))
            .err()
            .unwrap();

        let message = format!("{:#}", err);
        assert!(message.contains("Invalid registry source"));
        assert!(message.contains(&registry.display().to_string()));
    }

    #[test]
    fn missing_file_aborts() {
        let fetcher = Fetcher::new(None).unwrap();
        let result = Documents::load(
            &fetcher,
            &Source::Local("/nonexistent/landscape.yml".into()),
            &Source::Local("/nonexistent/projects.yaml".into()),
        );

        assert!(result.is_err());
    }
}
