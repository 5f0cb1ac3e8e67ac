use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::config::MailgunConfig;

pub const VERIFY_EMAIL_TEMPLATE: &str = "verify-email";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailVar {
    pub key: String,
    pub value: String,
}

impl EmailVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatedEmail {
    pub to: String,
    pub subject: String,
    pub template: String,
    pub vars: Vec<EmailVar>,
}

impl TemplatedEmail {
    pub fn verification(email: &str, code: &str) -> Self {
        Self {
            to: email.to_string(),
            subject: "Verify Your Email".to_string(),
            template: VERIFY_EMAIL_TEMPLATE.to_string(),
            vars: vec![EmailVar::new("code", code), EmailVar::new("username", email)],
        }
    }

    fn form_fields(&self, from: &str) -> Vec<(String, String)> {
        let mut fields = vec![
            ("from".to_string(), from.to_string()),
            ("to".to_string(), self.to.clone()),
            ("subject".to_string(), self.subject.clone()),
            ("template".to_string(), self.template.clone()),
        ];
        fields.extend(
            self.vars
                .iter()
                .map(|var| (format!("v:{}", var.key), var.value.clone())),
        );
        fields
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: TemplatedEmail) -> Result<()>;
}

pub async fn send_verification_email(sender: &dyn EmailSender, email: &str, code: &str) -> Result<()> {
    sender.send(TemplatedEmail::verification(email, code)).await
}

/// Mailgun HTTP API sender.
pub struct MailgunSender {
    client: Client,
    config: MailgunConfig,
}

impl MailgunSender {
    pub fn new(client: Client, config: MailgunConfig) -> Self {
        Self { client, config }
    }

    fn messages_url(&self) -> String {
        format!("{}/v3/{}/messages", self.config.base_url, self.config.domain)
    }
}

#[async_trait]
impl EmailSender for MailgunSender {
    async fn send(&self, email: TemplatedEmail) -> Result<()> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(&self.config.api_key))
            .form(&email.form_fields(&self.config.from_email))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!("Mailgun returned status {}", response.status()));
        }
        Ok(())
    }
}

/// Logs instead of sending; used when Mailgun is not configured.
#[derive(Default)]
pub struct LogSender;

#[async_trait]
impl EmailSender for LogSender {
    async fn send(&self, email: TemplatedEmail) -> Result<()> {
        info!(to = %email.to, template = %email.template, "email delivery disabled; skipping send");
        Ok(())
    }
}

/// Keeps sent messages in memory.
#[derive(Default, Clone)]
pub struct MemorySender {
    sent: Arc<Mutex<Vec<TemplatedEmail>>>,
}

impl MemorySender {
    pub fn sent(&self) -> Vec<TemplatedEmail> {
        self.sent.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailSender for MemorySender {
    async fn send(&self, email: TemplatedEmail) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow!("email outbox lock poisoned"))?
            .push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_form_carries_template_vars() {
        let email = TemplatedEmail::verification("ada@example.com", "abc-123");
        let fields = email.form_fields("Eats <mailgun@mg.example.com>");
        assert!(fields.contains(&("template".to_string(), "verify-email".to_string())));
        assert!(fields.contains(&("v:code".to_string(), "abc-123".to_string())));
        assert!(fields.contains(&("v:username".to_string(), "ada@example.com".to_string())));
        assert!(fields.contains(&("to".to_string(), "ada@example.com".to_string())));
    }

    #[test]
    fn messages_url_uses_domain() {
        let sender = MailgunSender::new(
            Client::new(),
            MailgunConfig {
                api_key: "key".into(),
                domain: "mg.example.com".into(),
                from_email: "Eats <mailgun@mg.example.com>".into(),
                base_url: "https://api.mailgun.net".into(),
            },
        );
        assert_eq!(sender.messages_url(), "https://api.mailgun.net/v3/mg.example.com/messages");
    }

    #[tokio::test]
    async fn memory_sender_records_messages() {
        let sender = MemorySender::default();
        send_verification_email(&sender, "ada@example.com", "code-1").await.unwrap();
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template, VERIFY_EMAIL_TEMPLATE);
    }
}
