//! Slack Web API client — authenticated calls to the conversations API

use super::wire::Envelope;
use crate::api::{methods, SlackApi};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::types::{Channel, ConversationPage};
use async_trait::async_trait;

/// HTTP client for the Slack Web API
///
/// Cheap to build; the provider creates one per operation from the
/// configuration.
pub struct SlackClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl SlackClient {
    /// Build a client from a validated configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("terraform-provider-slack/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Get the configuration this client was built from
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// POST a Web API method and unwrap Slack's `ok`/`error` envelope
    async fn call(&self, method: &str, params: &[(&str, &str)]) -> Result<Envelope> {
        let url = self.config.method_url(method);
        tracing::trace!(method, "Calling Slack API");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.token)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(method, status = %status, "Slack API returned HTTP error");
            return Err(ProviderError::slack(
                method,
                format!("http_{}", status.as_u16()),
            ));
        }

        let body = response.text().await?;
        let envelope: Envelope = serde_json::from_str(&body)?;

        if !envelope.ok {
            let error = envelope
                .error
                .unwrap_or_else(|| "unknown_error".to_string());
            tracing::debug!(method, error = %error, "Slack API call failed");
            return Err(ProviderError::slack(method, error));
        }

        Ok(envelope)
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn create_conversation(&self, name: &str, is_private: bool) -> Result<Channel> {
        let is_private = if is_private { "true" } else { "false" };
        self.call(methods::CREATE, &[("name", name), ("is_private", is_private)])
            .await?
            .into_channel(methods::CREATE)
    }

    async fn conversation_info(&self, channel_id: &str) -> Result<Channel> {
        self.call(methods::INFO, &[("channel", channel_id)])
            .await?
            .into_channel(methods::INFO)
    }

    async fn list_conversations(&self, cursor: Option<&str>) -> Result<ConversationPage> {
        let limit = self.config.page_limit.to_string();
        let mut params = vec![
            ("exclude_archived", "false"),
            ("types", "public_channel"),
            ("limit", limit.as_str()),
        ];
        if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
            params.push(("cursor", cursor));
        }

        let envelope = self.call(methods::LIST, &params).await?;
        let next_cursor = envelope.next_cursor();
        Ok(ConversationPage {
            channels: envelope.channels,
            next_cursor,
        })
    }

    async fn rename_conversation(&self, channel_id: &str, name: &str) -> Result<Channel> {
        self.call(methods::RENAME, &[("channel", channel_id), ("name", name)])
            .await?
            .into_channel(methods::RENAME)
    }

    async fn set_topic(&self, channel_id: &str, topic: &str) -> Result<()> {
        self.call(methods::SET_TOPIC, &[("channel", channel_id), ("topic", topic)])
            .await?;
        Ok(())
    }

    async fn set_purpose(&self, channel_id: &str, purpose: &str) -> Result<()> {
        self.call(
            methods::SET_PURPOSE,
            &[("channel", channel_id), ("purpose", purpose)],
        )
        .await?;
        Ok(())
    }

    async fn archive_conversation(&self, channel_id: &str) -> Result<()> {
        self.call(methods::ARCHIVE, &[("channel", channel_id)]).await?;
        Ok(())
    }

    async fn unarchive_conversation(&self, channel_id: &str) -> Result<()> {
        self.call(methods::UNARCHIVE, &[("channel", channel_id)]).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "slack"
    }
}
