//! `slack_channel` resource — CRUD, exists, import, and state upgrade
//!
//! Slack has no hard delete for conversations, so the lifecycle is
//! absent → created → (renamed / retitled / archived / unarchived)* and
//! deleting a channel archives it.
//!
//! Every operation is a straight sequence of Slack calls. The first
//! failure aborts the operation; changes already applied on the Slack
//! side are not rolled back.

use crate::api::SlackApi;
use crate::error::Result;
use crate::id;
use crate::locator;
use crate::schema::{Attribute, AttributeType, Schema, Validator};
use crate::types::ChannelState;
use serde_json::json;

/// Resource type name registered with the host
pub const RESOURCE_TYPE: &str = "slack_channel";

/// Current state schema version
///
/// Version 0 stored the bare Slack channel ID; version 1 stores
/// `<slack_id>:<name>`.
pub const SCHEMA_VERSION: u32 = 1;

/// Longest channel name Slack accepts
pub const MAX_NAME_LEN: usize = 80;

/// Schema of the `slack_channel` resource
pub fn schema() -> Schema {
    Schema::new(SCHEMA_VERSION)
        .with_attribute(
            "id",
            Attribute::computed(AttributeType::String, "Composite ID <slack_id>:<name>"),
        )
        .with_attribute(
            "name",
            Attribute::required(AttributeType::String, "The name of the Slack channel")
                .with_validator(Validator::StringLenBetween {
                    min: 1,
                    max: MAX_NAME_LEN,
                }),
        )
        .with_attribute(
            "topic",
            Attribute::optional(AttributeType::String, "The topic of the Slack channel"),
        )
        .with_attribute(
            "purpose",
            Attribute::optional(AttributeType::String, "The purpose of the Slack channel"),
        )
        .with_attribute(
            "is_archived",
            Attribute::optional(AttributeType::Bool, "Determines if a channel is archived")
                .with_default(json!(false)),
        )
}

/// Handler for one `slack_channel` instance
///
/// Holds no state of its own; the caller owns the `ChannelState` and
/// the API handle for the duration of one operation.
pub struct ChannelResource<'a> {
    api: &'a dyn SlackApi,
}

impl<'a> ChannelResource<'a> {
    /// Bind the handler to an API backend
    pub fn new(api: &'a dyn SlackApi) -> Self {
        Self { api }
    }

    /// Create the channel, then apply topic, purpose, and archival
    ///
    /// The ID is written into `state` as soon as the channel exists, so a
    /// failure in a follow-up call still leaves the ID behind.
    pub async fn create(&self, state: &mut ChannelState) -> Result<()> {
        let channel = self.api.create_conversation(&state.name, false).await?;
        state.id = id::encode(&channel.id, &channel.name)?;

        tracing::info!(
            channel_id = %channel.id,
            name = %channel.name,
            backend = self.api.name(),
            "Channel created"
        );

        if !state.topic.is_empty() {
            self.api.set_topic(&channel.id, &state.topic).await?;
        }

        if !state.purpose.is_empty() {
            self.api.set_purpose(&channel.id, &state.purpose).await?;
        }

        if state.is_archived {
            self.api.archive_conversation(&channel.id).await?;
            tracing::info!(channel_id = %channel.id, "Channel archived on create");
        }

        Ok(())
    }

    /// Refresh `state` from the live channel
    ///
    /// On lookup failure the ID is cleared, telling the host the resource
    /// is gone, and the error is returned.
    pub async fn read(&self, state: &mut ChannelState) -> Result<()> {
        let channel = match locator::resolve(self.api, &state.id).await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!(id = %state.id, error = %e, "Channel lookup failed, clearing ID");
                state.id.clear();
                return Err(e);
            }
        };

        state.id = id::encode(&channel.id, &channel.name)?;
        state.refresh_from(&channel);
        Ok(())
    }

    /// Push the attributes in `state` to the live channel
    ///
    /// `state.id` identifies the channel; every other field is the desired
    /// value. Only attributes that differ from the live channel are sent.
    /// Unarchiving runs first and archiving last, because Slack rejects
    /// edits to archived channels.
    pub async fn update(&self, state: &mut ChannelState) -> Result<()> {
        let channel = match locator::resolve(self.api, &state.id).await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!(id = %state.id, error = %e, "Channel lookup failed, clearing ID");
                state.id.clear();
                return Err(e);
            }
        };

        if channel.is_archived && !state.is_archived {
            self.api.unarchive_conversation(&channel.id).await?;
            tracing::info!(channel_id = %channel.id, "Channel unarchived");
        }

        if channel.name != state.name {
            self.api.rename_conversation(&channel.id, &state.name).await?;
            state.id = id::encode(&channel.id, &state.name)?;
            tracing::info!(
                channel_id = %channel.id,
                from = %channel.name,
                to = %state.name,
                "Channel renamed"
            );
        }

        if channel.topic.value != state.topic {
            self.api.set_topic(&channel.id, &state.topic).await?;
            tracing::debug!(channel_id = %channel.id, "Channel topic updated");
        }

        if channel.purpose.value != state.purpose {
            self.api.set_purpose(&channel.id, &state.purpose).await?;
            tracing::debug!(channel_id = %channel.id, "Channel purpose updated");
        }

        if !channel.is_archived && state.is_archived {
            self.api.archive_conversation(&channel.id).await?;
            tracing::info!(channel_id = %channel.id, "Channel archived");
        }

        Ok(())
    }

    /// Archive the channel; a no-op if it is already archived or gone
    pub async fn delete(&self, state: &ChannelState) -> Result<()> {
        let channel = match locator::resolve(self.api, &state.id).await {
            Ok(channel) => channel,
            Err(e) if e.is_not_found() => {
                tracing::warn!(id = %state.id, "Channel no longer exists, nothing to delete");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if channel.is_archived {
            tracing::debug!(channel_id = %channel.id, "Channel already archived, nothing to delete");
            return Ok(());
        }

        self.api.archive_conversation(&channel.id).await?;
        tracing::info!(channel_id = %channel.id, name = %channel.name, "Channel archived on delete");
        Ok(())
    }

    /// Whether the channel behind `state` still exists
    ///
    /// Errors are never surfaced; any failure counts as "does not exist".
    pub async fn exists(&self, state: &ChannelState) -> bool {
        match locator::resolve(self.api, &state.id).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(id = %state.id, error = %e, "Existence probe failed");
                false
            }
        }
    }

    /// Build the initial state for `terraform import`
    ///
    /// A composite `<slack_id>:<name>` is taken as-is. Anything else is a
    /// channel name, looked up and turned into a composite ID.
    pub async fn import(&self, import_id: &str) -> Result<ChannelState> {
        if let Ok((_, name)) = id::decode(import_id) {
            return Ok(ChannelState {
                id: import_id.to_string(),
                ..ChannelState::new(name)
            });
        }

        let channel = locator::find_by_name(self.api, import_id).await?;
        let mut state = ChannelState::new(&channel.name);
        state.id = id::encode(&channel.id, &channel.name)?;
        state.refresh_from(&channel);

        tracing::info!(channel_id = %channel.id, name = %channel.name, "Channel imported by name");
        Ok(state)
    }

    /// Migrate a version-0 state (bare Slack ID) to a composite ID
    ///
    /// States that already carry a composite ID are left alone.
    pub async fn upgrade_legacy(&self, state: &mut ChannelState) -> Result<()> {
        if id::decode(&state.id).is_ok() {
            return Ok(());
        }

        let channel = self.api.conversation_info(&state.id).await?;
        let legacy_id = std::mem::take(&mut state.id);
        state.id = id::encode(&channel.id, &channel.name)?;
        state.refresh_from(&channel);

        tracing::info!(from = %legacy_id, to = %state.id, "Upgraded legacy channel ID");
        Ok(())
    }
}
