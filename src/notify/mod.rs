//! Drift notifications
//!
//! When a run detects drift, the report text is handed to a [`Notifier`].
//! The default notifier pipes an HTML mail per recipient into a
//! sendmail-compatible command.

mod mail;

pub use mail::{html_body, render_message, SendmailNotifier};

use anyhow::Result;

/// What gets delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Per-recipient delivery outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: Vec<String>,
    /// Recipient and error message
    pub failed: Vec<(String, String)>,
}

impl Delivery {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delivers a notification to its recipients
pub trait Notifier {
    /// Sends to every recipient. Individual failures are collected, not fatal.
    fn deliver(&self, notification: &Notification) -> Result<Delivery>;
}
