//! sendmail delivery

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use super::{Delivery, Notification, Notifier};
use crate::storage::NotifyConfig;

/// Wraps report text in a minimal HTML page, one `<br/>` per line
pub fn html_body(title: &str, text: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        title,
        text.replace('\n', "<br/>\n")
    )
}

/// Full message text for one recipient
pub fn render_message(sender: &str, recipient: &str, notification: &Notification) -> String {
    format!(
        "From: {}\nTo: {}\nSubject: {}\nContent-Type: text/html\nMIME-Version: 1.0\n\n{}\n",
        sender,
        recipient,
        notification.subject,
        html_body(&notification.subject, &notification.body)
    )
}

/// Pipes one message per recipient into `sendmail <recipient>`
pub struct SendmailNotifier {
    command: String,
    sender: String,
    recipients: Vec<String>,
}

impl SendmailNotifier {
    pub fn new(command: impl Into<String>, sender: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            command: command.into(),
            sender: sender.into(),
            recipients,
        }
    }

    pub fn from_config(config: &NotifyConfig) -> Self {
        Self::new(&config.sendmail, &config.sender, config.recipients.clone())
    }

    fn send_one(&self, recipient: &str, message: &str) -> Result<()> {
        let mut child = Command::new(&self.command)
            .arg(recipient)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.command))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to open stdin of {}", self.command))?;
        stdin
            .write_all(message.as_bytes())
            .with_context(|| format!("Failed to write message to {}", self.command))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for {}", self.command))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(())
    }
}

impl Notifier for SendmailNotifier {
    fn deliver(&self, notification: &Notification) -> Result<Delivery> {
        let mut delivery = Delivery::default();

        for recipient in &self.recipients {
            let message = render_message(&self.sender, recipient, notification);
            match self.send_one(recipient, &message) {
                Ok(()) => delivery.delivered.push(recipient.clone()),
                Err(e) => delivery.failed.push((recipient.clone(), format!("{:#}", e))),
            }
        }

        Ok(delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification {
            subject: "sync status".to_string(),
            body: "error: missing in landscape: 'foo'\nsandbox: 3 projects".to_string(),
        }
    }

    #[test]
    fn html_body_breaks_lines() {
        let html = html_body("t", "a\nb");
        assert!(html.contains("<title>t</title>"));
        assert!(html.contains("a<br/>\nb"));
    }

    #[test]
    fn message_has_headers() {
        let message = render_message("sync@example.com", "ops@example.com", &notification());

        assert!(message.starts_with("From: sync@example.com\nTo: ops@example.com\nSubject: sync status\n"));
        assert!(message.contains("Content-Type: text/html\nMIME-Version: 1.0\n\n<!DOCTYPE html>"));
        assert!(message.contains("error: missing in landscape: 'foo'<br/>"));
    }

    #[cfg(unix)]
    #[test]
    fn deliver_through_command() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fake-sendmail");
        std::fs::write(
            &script,
            format!("#!/bin/sh\ncat > \"{}/$1.eml\"\n", dir.path().display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let notifier = SendmailNotifier::new(
            script.display().to_string(),
            "sync@example.com",
            vec!["a@example.com".to_string()],
        );
        let delivery = notifier.deliver(&notification()).unwrap();

        assert!(delivery.is_complete(), "{:?}", delivery.failed);
        assert_eq!(delivery.delivered, vec!["a@example.com"]);

        let sent = std::fs::read_to_string(dir.path().join("a@example.com.eml")).unwrap();
        assert!(sent.contains("To: a@example.com\n"));
    }

    #[test]
    fn missing_command_is_collected_per_recipient() {
        let notifier = SendmailNotifier::new(
            "/nonexistent/sendmail",
            "sync@example.com",
            vec!["a@example.com".to_string(), "b@example.com".to_string()],
        );
        let delivery = notifier.deliver(&notification()).unwrap();

        assert!(delivery.delivered.is_empty());
        assert_eq!(delivery.failed.len(), 2);
        assert!(delivery.failed[0].1.contains("/nonexistent/sendmail"));
    }
}
