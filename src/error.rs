//! Error types for terraform-provider-slack

use thiserror::Error;

/// Errors that can occur while managing Slack channels
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Resource identifier is not of the form `<slack_id>:<channel_name>`
    #[error("malformed_id: '{0}' is not of the form <slack_id>:<channel_name>")]
    MalformedId(String),

    /// Composite identifier requested from an empty id or name
    #[error("malformed_properties - slack_id:{slack_id} | name:{name}")]
    MalformedProperties {
        slack_id: String,
        name: String,
    },

    /// Name lookup exhausted every page without a match
    #[error("not_found: no channel named '{0}'")]
    NotFound(String),

    /// Slack answered with `ok: false`; `error` is Slack's error code verbatim
    #[error("Slack API error in {method}: {error}")]
    SlackApi {
        method: String,
        error: String,
    },

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Provider configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource attribute failed schema validation
    #[error("Validation failed for attribute '{attribute}': {reason}")]
    Validation {
        attribute: String,
        reason: String,
    },

    /// Resource type not registered with the provider
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// Operation failed after changing the channel in Slack
    ///
    /// `state` is what the host must persist so it keeps tracking the
    /// channel; `source` is the failure that stopped the operation.
    #[error("{source}")]
    Partial {
        state: serde_json::Value,
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Build a pass-through Slack API error
    pub fn slack(method: impl Into<String>, error: impl Into<String>) -> Self {
        Self::SlackApi {
            method: method.into(),
            error: error.into(),
        }
    }

    /// True when the error means the channel no longer exists
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::SlackApi { error, .. } => error == "channel_not_found",
            Self::Partial { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// State to persist despite the failure, if the operation got that far
    pub fn partial_state(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Partial { state, .. } => Some(state),
            _ => None,
        }
    }
}

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_properties_message() {
        let err = ProviderError::MalformedProperties {
            slack_id: String::new(),
            name: "general".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed_properties - slack_id: | name:general"
        );
    }

    #[test]
    fn test_slack_error_is_verbatim() {
        let err = ProviderError::slack("conversations.create", "name_taken");
        assert_eq!(
            err.to_string(),
            "Slack API error in conversations.create: name_taken"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(ProviderError::NotFound("general".into()).is_not_found());
        assert!(ProviderError::slack("conversations.info", "channel_not_found").is_not_found());
        assert!(!ProviderError::slack("conversations.info", "invalid_auth").is_not_found());
        assert!(!ProviderError::MalformedId("abc".into()).is_not_found());
    }

    #[test]
    fn test_partial_keeps_state_and_message() {
        let err = ProviderError::Partial {
            state: serde_json::json!({"id": "C1:general"}),
            source: Box::new(ProviderError::slack("conversations.setPurpose", "too_long")),
        };
        assert_eq!(
            err.to_string(),
            "Slack API error in conversations.setPurpose: too_long"
        );
        assert_eq!(err.partial_state().unwrap()["id"], "C1:general");
        assert!(std::error::Error::source(&err).is_some());
        assert!(ProviderError::NotFound("x".into()).partial_state().is_none());
    }
}
