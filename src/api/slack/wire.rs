//! Response envelope shared by the `conversations.*` methods

use crate::error::{ProviderError, Result};
use crate::types::Channel;
use serde::Deserialize;

/// Fields of a Slack response this crate reads
///
/// `channel` stays untyped until a caller asks for it, because
/// `setTopic`/`setPurpose` may return partial channel objects.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub ok: bool,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub channel: Option<serde_json::Value>,

    #[serde(default)]
    pub channels: Vec<Channel>,

    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

impl Envelope {
    /// Take the `channel` object, failing if Slack omitted it
    pub fn into_channel(self, method: &str) -> Result<Channel> {
        let value = self
            .channel
            .ok_or_else(|| ProviderError::slack(method, "invalid_response: missing channel"))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Cursor for the next page, empty on the last page
    pub fn next_cursor(&self) -> String {
        self.response_metadata
            .as_ref()
            .map(|m| m.next_cursor.clone())
            .unwrap_or_default()
    }
}
