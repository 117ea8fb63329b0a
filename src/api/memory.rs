//! In-memory Slack workspace
//!
//! Mimics the conversations API closely enough to drive the resource
//! handler without a network: paginated listing, Slack's error codes for
//! the common failure cases, per-method call counters, and one-shot
//! failure injection.

use crate::api::{methods, SlackApi};
use crate::error::{ProviderError, Result};
use crate::types::{Channel, ConversationPage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default number of channels per `conversations.list` page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Longest channel name Slack accepts
const MAX_NAME_LEN: usize = 80;

const CURSOR_PREFIX: &str = "page:";

#[derive(Default)]
struct Workspace {
    /// Channels in creation order
    channels: Vec<Channel>,

    /// Method name → number of calls
    calls: HashMap<String, usize>,

    /// Method name → error code returned by the next call
    failures: HashMap<String, String>,

    /// Fake unix clock for `created` / `last_set`
    clock: i64,
}

impl Workspace {
    fn record(&mut self, method: &str) -> Result<()> {
        *self.calls.entry(method.to_string()).or_insert(0) += 1;
        match self.failures.remove(method) {
            Some(error) => Err(ProviderError::slack(method, error)),
            None => Ok(()),
        }
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn find_mut(&mut self, method: &str, channel_id: &str) -> Result<&mut Channel> {
        self.channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| ProviderError::slack(method, "channel_not_found"))
    }

    fn check_name(&self, method: &str, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ProviderError::slack(method, "invalid_name_required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ProviderError::slack(method, "invalid_name_maxlength"));
        }
        if self.channels.iter().any(|c| c.name == name) {
            return Err(ProviderError::slack(method, "name_taken"));
        }
        Ok(())
    }
}

/// In-memory `SlackApi` backend for testing and single-process use
///
/// Clones share the same workspace, so a test can hand one clone to the
/// provider and inspect the other.
#[derive(Clone)]
pub struct MemorySlack {
    workspace: Arc<Mutex<Workspace>>,
    page_size: usize,
}

impl Default for MemorySlack {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl MemorySlack {
    /// Create an empty workspace listing `page_size` channels per page
    pub fn new(page_size: usize) -> Self {
        Self {
            workspace: Arc::new(Mutex::new(Workspace::default())),
            page_size: page_size.max(1),
        }
    }

    /// Add a channel as-is (no validation, not counted as a call)
    pub async fn insert(&self, channel: Channel) {
        self.workspace.lock().await.channels.push(channel);
    }

    /// Look up a channel by ID
    pub async fn channel(&self, channel_id: &str) -> Option<Channel> {
        let ws = self.workspace.lock().await;
        ws.channels.iter().find(|c| c.id == channel_id).cloned()
    }

    /// Look up a channel by exact name
    pub async fn channel_by_name(&self, name: &str) -> Option<Channel> {
        let ws = self.workspace.lock().await;
        ws.channels.iter().find(|c| c.name == name).cloned()
    }

    /// All channels in creation order
    pub async fn channels(&self) -> Vec<Channel> {
        self.workspace.lock().await.channels.clone()
    }

    /// Number of calls made to a Web API method
    pub async fn call_count(&self, method: &str) -> usize {
        let ws = self.workspace.lock().await;
        ws.calls.get(method).copied().unwrap_or(0)
    }

    /// Number of calls across all methods
    pub async fn total_calls(&self) -> usize {
        self.workspace.lock().await.calls.values().sum()
    }

    /// Forget all recorded calls
    pub async fn reset_calls(&self) {
        self.workspace.lock().await.calls.clear();
    }

    /// Make the next call to `method` fail with Slack error `error`
    pub async fn fail_next(&self, method: &str, error: &str) {
        let mut ws = self.workspace.lock().await;
        ws.failures.insert(method.to_string(), error.to_string());
    }

    /// Give a channel a fresh Slack ID, as Slack does on some migrations
    ///
    /// Returns the new ID, or `None` if no channel had `channel_id`.
    pub async fn reassign_id(&self, channel_id: &str) -> Option<String> {
        let mut ws = self.workspace.lock().await;
        let new_id = generate_id();
        let channel = ws.channels.iter_mut().find(|c| c.id == channel_id)?;
        channel.id = new_id.clone();
        Some(new_id)
    }

    /// Remove a channel entirely, as if deleted by a workspace admin
    pub async fn remove(&self, channel_id: &str) -> Option<Channel> {
        let mut ws = self.workspace.lock().await;
        let pos = ws.channels.iter().position(|c| c.id == channel_id)?;
        Some(ws.channels.remove(pos))
    }
}

fn generate_id() -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("C{}", &raw[..10])
}

fn parse_cursor(cursor: &str) -> Option<usize> {
    cursor.strip_prefix(CURSOR_PREFIX)?.parse().ok()
}

#[async_trait]
impl SlackApi for MemorySlack {
    async fn create_conversation(&self, name: &str, is_private: bool) -> Result<Channel> {
        let mut ws = self.workspace.lock().await;
        ws.record(methods::CREATE)?;
        ws.check_name(methods::CREATE, name)?;

        let mut channel = Channel::new(generate_id(), name);
        channel.is_private = is_private;
        channel.created = ws.tick();
        ws.channels.push(channel.clone());
        Ok(channel)
    }

    async fn conversation_info(&self, channel_id: &str) -> Result<Channel> {
        let mut ws = self.workspace.lock().await;
        ws.record(methods::INFO)?;
        ws.find_mut(methods::INFO, channel_id).map(|c| c.clone())
    }

    async fn list_conversations(&self, cursor: Option<&str>) -> Result<ConversationPage> {
        let mut ws = self.workspace.lock().await;
        ws.record(methods::LIST)?;

        let public: Vec<&Channel> = ws.channels.iter().filter(|c| !c.is_private).collect();
        let start = match cursor.filter(|c| !c.is_empty()) {
            None => 0,
            Some(c) => parse_cursor(c)
                .filter(|&offset| offset <= public.len())
                .ok_or_else(|| ProviderError::slack(methods::LIST, "invalid_cursor"))?,
        };
        let end = (start + self.page_size).min(public.len());
        let channels = public
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|c| (*c).clone())
            .collect();
        let next_cursor = if end < public.len() {
            format!("{}{}", CURSOR_PREFIX, end)
        } else {
            String::new()
        };

        Ok(ConversationPage {
            channels,
            next_cursor,
        })
    }

    async fn rename_conversation(&self, channel_id: &str, name: &str) -> Result<Channel> {
        let mut ws = self.workspace.lock().await;
        ws.record(methods::RENAME)?;
        if ws.find_mut(methods::RENAME, channel_id)?.is_archived {
            return Err(ProviderError::slack(methods::RENAME, "is_archived"));
        }
        ws.check_name(methods::RENAME, name)?;

        let channel = ws.find_mut(methods::RENAME, channel_id)?;
        channel.name = name.to_string();
        Ok(channel.clone())
    }

    async fn set_topic(&self, channel_id: &str, topic: &str) -> Result<()> {
        let mut ws = self.workspace.lock().await;
        ws.record(methods::SET_TOPIC)?;
        let now = ws.tick();
        let channel = ws.find_mut(methods::SET_TOPIC, channel_id)?;
        if channel.is_archived {
            return Err(ProviderError::slack(methods::SET_TOPIC, "is_archived"));
        }
        channel.topic.value = topic.to_string();
        channel.topic.last_set = now;
        Ok(())
    }

    async fn set_purpose(&self, channel_id: &str, purpose: &str) -> Result<()> {
        let mut ws = self.workspace.lock().await;
        ws.record(methods::SET_PURPOSE)?;
        let now = ws.tick();
        let channel = ws.find_mut(methods::SET_PURPOSE, channel_id)?;
        if channel.is_archived {
            return Err(ProviderError::slack(methods::SET_PURPOSE, "is_archived"));
        }
        channel.purpose.value = purpose.to_string();
        channel.purpose.last_set = now;
        Ok(())
    }

    async fn archive_conversation(&self, channel_id: &str) -> Result<()> {
        let mut ws = self.workspace.lock().await;
        ws.record(methods::ARCHIVE)?;
        let channel = ws.find_mut(methods::ARCHIVE, channel_id)?;
        if channel.is_archived {
            return Err(ProviderError::slack(methods::ARCHIVE, "already_archived"));
        }
        channel.is_archived = true;
        Ok(())
    }

    async fn unarchive_conversation(&self, channel_id: &str) -> Result<()> {
        let mut ws = self.workspace.lock().await;
        ws.record(methods::UNARCHIVE)?;
        let channel = ws.find_mut(methods::UNARCHIVE, channel_id)?;
        if !channel.is_archived {
            return Err(ProviderError::slack(methods::UNARCHIVE, "not_archived"));
        }
        channel.is_archived = false;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_info() {
        let slack = MemorySlack::default();
        let created = slack.create_conversation("general", false).await.unwrap();
        assert!(created.id.starts_with('C'));
        assert_eq!(created.id.len(), 11);

        let info = slack.conversation_info(&created.id).await.unwrap();
        assert_eq!(info, created);
        assert_eq!(slack.call_count(methods::CREATE).await, 1);
        assert_eq!(slack.call_count(methods::INFO).await, 1);
    }

    #[tokio::test]
    async fn test_create_name_taken() {
        let slack = MemorySlack::default();
        slack.create_conversation("general", false).await.unwrap();
        let err = slack.create_conversation("general", false).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Slack API error in conversations.create: name_taken"
        );
    }

    #[tokio::test]
    async fn test_info_unknown_channel() {
        let slack = MemorySlack::default();
        let err = slack.conversation_info("C404").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let slack = MemorySlack::new(2);
        for name in ["a", "b", "c"] {
            slack.create_conversation(name, false).await.unwrap();
        }

        let first = slack.list_conversations(None).await.unwrap();
        assert_eq!(first.channels.len(), 2);
        assert!(first.has_more());

        let second = slack
            .list_conversations(Some(&first.next_cursor))
            .await
            .unwrap();
        assert_eq!(second.channels.len(), 1);
        assert_eq!(second.channels[0].name, "c");
        assert!(!second.has_more());
    }

    #[tokio::test]
    async fn test_list_skips_private_channels() {
        let slack = MemorySlack::default();
        slack.create_conversation("secret", true).await.unwrap();
        slack.create_conversation("open", false).await.unwrap();

        let page = slack.list_conversations(None).await.unwrap();
        assert_eq!(page.channels.len(), 1);
        assert_eq!(page.channels[0].name, "open");
    }

    #[tokio::test]
    async fn test_list_invalid_cursor() {
        let slack = MemorySlack::default();
        let err = slack.list_conversations(Some("bogus")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Slack API error in conversations.list: invalid_cursor"
        );
    }

    #[tokio::test]
    async fn test_archive_state_errors() {
        let slack = MemorySlack::default();
        let c = slack.create_conversation("general", false).await.unwrap();

        assert!(slack.unarchive_conversation(&c.id).await.is_err());
        slack.archive_conversation(&c.id).await.unwrap();
        assert!(slack.archive_conversation(&c.id).await.is_err());
        assert!(slack.set_topic(&c.id, "t").await.is_err());
        slack.unarchive_conversation(&c.id).await.unwrap();
        slack.set_topic(&c.id, "t").await.unwrap();

        assert_eq!(slack.channel(&c.id).await.unwrap().topic.value, "t");
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot() {
        let slack = MemorySlack::default();
        slack.fail_next(methods::LIST, "ratelimited").await;

        assert!(slack.list_conversations(None).await.is_err());
        assert!(slack.list_conversations(None).await.is_ok());
        assert_eq!(slack.call_count(methods::LIST).await, 2);
    }

    #[tokio::test]
    async fn test_reassign_id() {
        let slack = MemorySlack::default();
        let c = slack.create_conversation("general", false).await.unwrap();

        let new_id = slack.reassign_id(&c.id).await.unwrap();
        assert_ne!(new_id, c.id);
        assert!(slack.channel(&c.id).await.is_none());
        assert_eq!(slack.channel_by_name("general").await.unwrap().id, new_id);
    }
}
