//! Composite resource identifiers — `<slack_id>:<channel_name>`
//!
//! Slack channel IDs can change when a channel is recreated or a workspace
//! is migrated. The Terraform ID therefore carries the last-known channel
//! name next to the Slack ID, and lookups go through the name.

use crate::error::{ProviderError, Result};
use std::fmt;
use std::str::FromStr;

/// Separator between the Slack ID and the channel name
pub const SEPARATOR: char = ':';

/// Encode a Slack channel ID and name into a Terraform resource ID
pub fn encode(slack_id: &str, name: &str) -> Result<String> {
    if slack_id.is_empty() || name.is_empty() {
        return Err(ProviderError::MalformedProperties {
            slack_id: slack_id.to_string(),
            name: name.to_string(),
        });
    }
    Ok(format!("{}{}{}", slack_id, SEPARATOR, name))
}

/// Decode a Terraform resource ID into `(slack_id, name)`
///
/// Anything other than exactly two non-empty colon-separated segments is
/// rejected.
pub fn decode(terraform_id: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = terraform_id.split(SEPARATOR).collect();
    match parts.as_slice() {
        [slack_id, name] if !slack_id.is_empty() && !name.is_empty() => {
            Ok((slack_id.to_string(), name.to_string()))
        }
        _ => Err(ProviderError::MalformedId(terraform_id.to_string())),
    }
}

/// Parsed form of a composite Terraform ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TerraformId {
    /// Slack channel ID at the time the ID was written
    pub slack_id: String,

    /// Channel name, used to re-resolve the channel
    pub name: String,
}

impl TerraformId {
    /// Create an ID, rejecting empty parts
    pub fn new(slack_id: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let slack_id = slack_id.into();
        let name = name.into();
        encode(&slack_id, &name)?;
        Ok(Self { slack_id, name })
    }
}

impl fmt::Display for TerraformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.slack_id, SEPARATOR, self.name)
    }
}

impl FromStr for TerraformId {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        let (slack_id, name) = decode(s)?;
        Ok(Self { slack_id, name })
    }
}
