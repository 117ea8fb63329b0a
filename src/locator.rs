//! Channel locator — find a channel by name across all listing pages
//!
//! Slack has no lookup-by-name endpoint, so the locator walks
//! `conversations.list` from the first page on every call. Nothing is
//! cached between calls.

use crate::api::SlackApi;
use crate::error::{ProviderError, Result};
use crate::id;
use crate::types::Channel;

/// Find a channel whose name matches `name` exactly
///
/// Archived channels are included. Fails with `NotFound` once the last
/// page has been checked.
pub async fn find_by_name(api: &dyn SlackApi, name: &str) -> Result<Channel> {
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = api.list_conversations(cursor.as_deref()).await?;
        pages += 1;
        let has_more = page.has_more();

        if let Some(channel) = page.channels.into_iter().find(|c| c.name == name) {
            tracing::debug!(
                name = %name,
                channel_id = %channel.id,
                pages,
                "Channel located"
            );
            return Ok(channel);
        }

        if !has_more {
            break;
        }
        cursor = Some(page.next_cursor);
    }

    tracing::debug!(name = %name, pages, "Channel not found in any page");
    Err(ProviderError::NotFound(name.to_string()))
}

/// Resolve a composite Terraform ID to the live channel
///
/// Only the name half is used for the lookup; the stored Slack ID may
/// be stale.
pub async fn resolve(api: &dyn SlackApi, terraform_id: &str) -> Result<Channel> {
    let (_, name) = id::decode(terraform_id)?;
    find_by_name(api, &name).await
}
