//! Core types shared by the Slack API layer and the resource handler
//!
//! Slack wire types use Slack's snake_case field names. `ChannelState` uses
//! the Terraform attribute names, which happen to be snake_case as well.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A Slack conversation as returned by the `conversations.*` methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Slack channel ID (e.g., "C024BE91L"); may be reassigned by Slack
    pub id: String,

    /// Channel name, unique within the workspace
    pub name: String,

    /// Current topic
    #[serde(default)]
    pub topic: ChannelValue,

    /// Current purpose
    #[serde(default)]
    pub purpose: ChannelValue,

    /// Whether the channel is archived
    #[serde(default)]
    pub is_archived: bool,

    /// Whether the channel is private
    #[serde(default)]
    pub is_private: bool,

    /// Creation time as unix seconds
    #[serde(default)]
    pub created: i64,
}

impl Channel {
    /// Create an unarchived public channel with empty topic and purpose
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            topic: ChannelValue::default(),
            purpose: ChannelValue::default(),
            is_archived: false,
            is_private: false,
            created: 0,
        }
    }

    /// Creation time, if Slack reported one
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        if self.created <= 0 {
            return None;
        }
        Utc.timestamp_opt(self.created, 0).single()
    }
}

/// Topic or purpose of a channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelValue {
    /// Text value
    #[serde(default)]
    pub value: String,

    /// User ID of whoever last set the value
    #[serde(default)]
    pub creator: String,

    /// Unix seconds of the last change
    #[serde(default)]
    pub last_set: i64,
}

/// One page of a `conversations.list` traversal
#[derive(Debug, Clone, Default)]
pub struct ConversationPage {
    /// Channels on this page
    pub channels: Vec<Channel>,

    /// Cursor for the next page; empty when this is the last page
    pub next_cursor: String,
}

impl ConversationPage {
    /// Whether another page follows
    pub fn has_more(&self) -> bool {
        !self.next_cursor.is_empty()
    }
}

/// Terraform-side state of one `slack_channel` resource
///
/// An empty `id` means the resource does not exist (or must be recreated).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    /// Composite resource ID (`<slack_id>:<name>`), empty when absent
    #[serde(default)]
    pub id: String,

    /// Channel name
    pub name: String,

    /// Channel topic
    #[serde(default)]
    pub topic: String,

    /// Channel purpose
    #[serde(default)]
    pub purpose: String,

    /// Whether the channel should be archived
    #[serde(default)]
    pub is_archived: bool,
}

impl ChannelState {
    /// Desired state for a channel name with every optional attribute defaulted
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the topic
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set the purpose
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    /// Set the archival flag
    pub fn with_archived(mut self, is_archived: bool) -> Self {
        self.is_archived = is_archived;
        self
    }

    /// Whether a resource ID is set
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Copy every attribute from a live channel
    pub fn refresh_from(&mut self, channel: &Channel) {
        self.name = channel.name.clone();
        self.topic = channel.topic.value.clone();
        self.purpose = channel.purpose.value.clone();
        self.is_archived = channel.is_archived;
    }
}
