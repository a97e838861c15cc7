//! # Storage Layer
//!
//! Everything that touches the outside world before reconciliation starts.
//!
//! ## Inputs
//!
//! | Data | Format | Default location |
//! |------|--------|------------------|
//! | Landscape | YAML (`landscape.yml`) | CNCF landscape repository |
//! | Registry | YAML (`projects.yaml`) | DevStats repository |
//! | Config | TOML | `~/.config/catalog-sync/config.toml` |
//!
//! Each document location is a [`Source`]: remote (`http`/`https`, fetched
//! with a blocking client, no retries) or a local path. A failure to read or
//! parse either document aborts the run before any comparison happens.
//!
//! ## Key Types
//!
//! - [`Config`] - Sources, fetch, notification and exception settings
//! - [`Fetcher`] - Reads a [`Source`] into bytes
//! - [`Documents`] - Both parsed catalogs

mod config;
mod documents;
mod source;

pub use config::{
    Config, ConfigError, FetchConfig, NotifyConfig, SourcesConfig, CONFIG_ENV, DEFAULT_LANDSCAPE,
    DEFAULT_REGISTRY,
};
pub use documents::{parse_landscape, parse_registry, Documents};
pub use source::{Fetcher, Source, SourceError, USER_AGENT};
