//! Provider-neutral sending surface.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One address or several; serializes as a bare string or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    Single(String),
    Many(Vec<String>),
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Self::Single(address.to_string())
    }
}

impl From<String> for Recipients {
    fn from(address: String) -> Self {
        Self::Single(address)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addresses: Vec<String>) -> Self {
        Self::Many(addresses)
    }
}

/// Key/value label attached to a message for provider-side filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTag {
    pub name: String,
    pub value: String,
}

/// Everything a caller may specify for one message. `from` falls back to
/// the configured sender when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailParams {
    pub to: Recipients,
    pub subject: String,
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Recipients>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Recipients>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Recipients>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<EmailTag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl SendEmailParams {
    pub fn new(to: impl Into<Recipients>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
            text: None,
            from: None,
            reply_to: None,
            cc: None,
            bcc: None,
            tags: None,
            headers: None,
        }
    }
}

/// Outcome of one send attempt. `id` is the provider's message id on
/// success; `error` the reason on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEmailResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendEmailResult {
    pub fn sent(id: Option<String>) -> Self {
        Self {
            success: true,
            id,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(error.into()),
        }
    }
}

/// Sends one message. Never errors out-of-band: transport and provider
/// failures are folded into the result and logged at the implementation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, params: &SendEmailParams) -> SendEmailResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipients_serialize_untagged() {
        let single: Recipients = "a@b.co".into();
        assert_eq!(serde_json::to_string(&single).unwrap(), r#""a@b.co""#);

        let many: Recipients = vec!["a@b.co".to_string(), "c@d.co".to_string()].into();
        assert_eq!(
            serde_json::to_string(&many).unwrap(),
            r#"["a@b.co","c@d.co"]"#
        );

        let parsed: Recipients = serde_json::from_str(r#""a@b.co""#).unwrap();
        assert_eq!(parsed, Recipients::Single("a@b.co".to_string()));
    }

    #[test]
    fn params_omit_absent_fields() {
        let params = SendEmailParams::new("a@b.co", "Hello", "<p>Hi</p>");
        let json = serde_json::to_value(&params).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(json["to"], "a@b.co");
        assert_eq!(json["subject"], "Hello");
    }

    #[test]
    fn result_constructors() {
        let sent = SendEmailResult::sent(Some("email_1".to_string()));
        assert!(sent.success);
        assert_eq!(sent.id.as_deref(), Some("email_1"));
        assert!(sent.error.is_none());

        let failed = SendEmailResult::failed("rate limited");
        assert!(!failed.success);
        assert!(failed.id.is_none());
        assert_eq!(failed.error.as_deref(), Some("rate limited"));
    }
}
