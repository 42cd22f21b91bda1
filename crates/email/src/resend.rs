//! Resend-backed [`Mailer`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::mailer::{EmailTag, Mailer, Recipients, SendEmailParams, SendEmailResult};

pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";

const UNKNOWN_ERROR: &str = "Unknown error";

/// Client for the provider's `POST /emails` endpoint.
#[derive(Clone)]
pub struct ResendMailer {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    default_from: String,
}

/// Request body in the provider's wire format. Only supplied optional
/// fields are serialized.
#[derive(Serialize)]
struct WireEmail<'a> {
    from: &'a str,
    to: &'a Recipients,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a Recipients>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<&'a Recipients>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<&'a Recipients>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [EmailTag]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<&'a HashMap<String, String>>,
}

#[derive(Deserialize)]
struct SendResponse {
    id: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>, default_from: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            default_from: default_from.into(),
        }
    }

    /// Point at a different API host (test stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn wire_body<'a>(&'a self, params: &'a SendEmailParams) -> WireEmail<'a> {
        WireEmail {
            from: params.from.as_deref().unwrap_or(&self.default_from),
            to: &params.to,
            subject: &params.subject,
            html: &params.html,
            text: params.text.as_deref(),
            reply_to: params.reply_to.as_ref(),
            cc: params.cc.as_ref(),
            bcc: params.bcc.as_ref(),
            tags: params.tags.as_deref(),
            headers: params.headers.as_ref(),
        }
    }

    async fn deliver(&self, params: &SendEmailParams) -> Result<SendEmailResult, reqwest::Error> {
        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.wire_body(params))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|err| err.message)
                .ok()
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| {
                    if text.is_empty() {
                        UNKNOWN_ERROR.to_string()
                    } else {
                        text
                    }
                });
            tracing::error!(to = ?params.to, error = %message, "failed to send email");
            return Ok(SendEmailResult::failed(message));
        }
        let body: SendResponse = response.json().await?;
        tracing::info!(email_id = ?body.id, to = ?params.to, "email sent successfully");
        Ok(SendEmailResult::sent(body.id))
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, params: &SendEmailParams) -> SendEmailResult {
        match self.deliver(params).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(to = ?params.to, error = %err, "an error occurred sending mail");
                SendEmailResult::failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> ResendMailer {
        ResendMailer::new("re_secret", "Forgekit <noreply@forgekit.dev>")
    }

    #[test]
    fn wire_body_falls_back_to_the_default_sender() {
        let mailer = mailer();
        let params = SendEmailParams::new("a@b.co", "Hello", "<p>Hi</p>");
        let json = serde_json::to_value(mailer.wire_body(&params)).unwrap();
        assert_eq!(json["from"], "Forgekit <noreply@forgekit.dev>");

        let mut params = params;
        params.from = Some("Support <support@forgekit.dev>".to_string());
        let json = serde_json::to_value(mailer.wire_body(&params)).unwrap();
        assert_eq!(json["from"], "Support <support@forgekit.dev>");
    }

    #[test]
    fn wire_body_serializes_only_supplied_fields() {
        let mailer = mailer();
        let params = SendEmailParams::new("a@b.co", "Hello", "<p>Hi</p>");
        let json = serde_json::to_value(mailer.wire_body(&params)).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert!(object.contains_key("from"));
        assert!(!object.contains_key("reply_to"));
        assert!(!object.contains_key("headers"));

        let mut params = SendEmailParams::new("a@b.co", "Hello", "<p>Hi</p>");
        params.reply_to = Some("c@d.co".into());
        params.tags = Some(vec![EmailTag {
            name: "category".to_string(),
            value: "welcome".to_string(),
        }]);
        let json = serde_json::to_value(mailer.wire_body(&params)).unwrap();
        assert_eq!(json["reply_to"], "c@d.co");
        assert_eq!(json["tags"][0]["name"], "category");
    }

    #[test]
    fn base_url_loses_its_trailing_slash() {
        let mailer = mailer().with_base_url("http://127.0.0.1:8099/");
        assert_eq!(mailer.base_url, "http://127.0.0.1:8099");
    }

    #[tokio::test]
    async fn transport_failure_folds_into_a_failed_result() {
        // Nothing listens here; the connect error must come back inside the
        // result, not as a panic or an Err.
        let mailer = mailer().with_base_url("http://127.0.0.1:1");
        let params = SendEmailParams::new("a@b.co", "Hello", "<p>Hi</p>");

        let result = mailer.send(&params).await;
        assert!(!result.success);
        assert!(result.id.is_none());
        assert!(result.error.is_some());
    }

    #[test]
    fn provider_error_body_parses_to_a_message() {
        let err: ApiError =
            serde_json::from_str(r#"{"statusCode":422,"name":"validation_error","message":"Invalid `to` address"}"#)
                .unwrap();
        assert_eq!(err.message, "Invalid `to` address");

        let err: ApiError = serde_json::from_str("{}").unwrap();
        assert!(err.message.is_empty());
    }
}
