//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `check` | Fetch both catalogs, print the drift report, notify on drift |
//! | `exceptions` | Show the exception tables a check would use |
//!
//! ## Environment
//!
//! `check` honours the variables the sync job has always been driven by:
//! `LANDSCAPE_YAML_PATH`, `PROJECTS_YAML_PATH`, `EMAIL_TO` and `SKIP_EMAIL`.
//! The config file itself can be named with `CATALOG_SYNC_CONFIG`.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - The report, one line per finding
//! - `json` - Machine-parseable JSON
//!
//! ## Exit Status
//!
//! `check` exits non-zero when drift is detected or when a catalog cannot be
//! fetched or parsed.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! catalog-sync --verbose check
//! ```

mod app;
mod output;
mod check;
mod exceptions_cmd;

pub use app::{Cli, Commands, run};
pub use check::CheckArgs;
pub use output::{Output, OutputFormat};
