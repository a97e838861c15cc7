//! catalog-sync - Keeps the CNCF landscape and the DevStats registry honest
//!
//! Both catalogs describe the same set of CNCF projects. This crate fetches
//! them, lines projects up by canonical name and reports every disagreement
//! in presence, repository, milestone dates and maturity status.

pub mod domain;
pub mod storage;
pub mod notify;
pub mod cli;

pub use domain::{reconcile, ExceptionRegistry, Mismatch, Reconciliation, Report};
