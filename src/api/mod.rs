//! Slack API trait — the boundary between resource logic and Slack
//!
//! The resource handler talks to Slack only through `SlackApi`. Two
//! backends implement it: `SlackClient` (HTTPS, bearer token) and
//! `MemorySlack` (in-process workspace for tests and benchmarks).

use crate::error::Result;
use crate::types::{Channel, ConversationPage};
use async_trait::async_trait;

pub mod memory;
pub mod slack;

/// Slack Web API method names
pub mod methods {
    pub const CREATE: &str = "conversations.create";
    pub const INFO: &str = "conversations.info";
    pub const LIST: &str = "conversations.list";
    pub const RENAME: &str = "conversations.rename";
    pub const SET_TOPIC: &str = "conversations.setTopic";
    pub const SET_PURPOSE: &str = "conversations.setPurpose";
    pub const ARCHIVE: &str = "conversations.archive";
    pub const UNARCHIVE: &str = "conversations.unarchive";
}

/// Conversation operations consumed by the provider
///
/// Every failure reported by Slack surfaces as `ProviderError::SlackApi`
/// carrying Slack's error code unchanged.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// `conversations.create`
    async fn create_conversation(&self, name: &str, is_private: bool) -> Result<Channel>;

    /// `conversations.info`
    async fn conversation_info(&self, channel_id: &str) -> Result<Channel>;

    /// `conversations.list`, archived channels included
    ///
    /// Pass `None` for the first page, then the previous page's
    /// `next_cursor` until it comes back empty.
    async fn list_conversations(&self, cursor: Option<&str>) -> Result<ConversationPage>;

    /// `conversations.rename`
    async fn rename_conversation(&self, channel_id: &str, name: &str) -> Result<Channel>;

    /// `conversations.setTopic`
    async fn set_topic(&self, channel_id: &str, topic: &str) -> Result<()>;

    /// `conversations.setPurpose`
    async fn set_purpose(&self, channel_id: &str, purpose: &str) -> Result<()>;

    /// `conversations.archive`
    async fn archive_conversation(&self, channel_id: &str) -> Result<()>;

    /// `conversations.unarchive`
    async fn unarchive_conversation(&self, channel_id: &str) -> Result<()>;

    /// Backend name (e.g., "slack", "memory")
    fn name(&self) -> &str;
}
