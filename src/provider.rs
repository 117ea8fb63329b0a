//! Slack provider — resource registration and host-facing dispatch
//!
//! `SlackProvider` is what the plugin host talks to. It owns the provider
//! configuration, declares the `slack_channel` resource, and routes each
//! host call to `ChannelResource` with a freshly built API backend.
//! Attribute maps cross this boundary as JSON objects.

use crate::api::slack::SlackClient;
use crate::api::SlackApi;
use crate::config::{ProviderConfig, TOKEN_ENV};
use crate::error::{ProviderError, Result};
use crate::resource::{self, ChannelResource, RESOURCE_TYPE, SCHEMA_VERSION};
use crate::schema::{Attribute, AttributeType, ProviderSchema, Schema};
use crate::types::ChannelState;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds the API backend for one operation from the configuration
pub type ApiFactory = Arc<dyn Fn(&ProviderConfig) -> Result<Box<dyn SlackApi>> + Send + Sync>;

/// The Slack provider
pub struct SlackProvider {
    config: Option<ProviderConfig>,
    factory: ApiFactory,
}

impl Default for SlackProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SlackProvider {
    /// Provider backed by the Slack Web API
    pub fn new() -> Self {
        Self::with_factory(|config: &ProviderConfig| {
            let client = SlackClient::new(config)?;
            Ok(Box::new(client) as Box<dyn SlackApi>)
        })
    }

    /// Provider with a custom backend factory
    pub fn with_factory(
        factory: impl Fn(&ProviderConfig) -> Result<Box<dyn SlackApi>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            config: None,
            factory: Arc::new(factory),
        }
    }

    /// Provider that hands out clones of one backend (e.g., `MemorySlack`)
    pub fn with_api<A>(api: A) -> Self
    where
        A: SlackApi + Clone + 'static,
    {
        Self::with_factory(move |_| Ok(Box::new(api.clone()) as Box<dyn SlackApi>))
    }

    /// Schema of the provider block and every resource
    pub fn schema(&self) -> ProviderSchema {
        let provider = Schema::new(0).with_attribute(
            "token",
            Attribute::required(AttributeType::String, "The Slack API token")
                .with_env_default(TOKEN_ENV)
                .sensitive(),
        );

        let mut resources = BTreeMap::new();
        resources.insert(RESOURCE_TYPE.to_string(), resource::schema());

        ProviderSchema {
            provider,
            resources,
        }
    }

    /// Configure the provider from its block in the host configuration
    pub fn configure(&mut self, config: serde_json::Value) -> Result<()> {
        let config = ProviderConfig::from_value(config)?;
        tracing::info!(api_url = %config.api_url, "Slack provider configured");
        self.config = Some(config);
        Ok(())
    }

    /// Configure the provider from an already-built configuration
    pub fn configure_with(&mut self, config: ProviderConfig) -> Result<()> {
        config.validate()?;
        self.config = Some(config);
        Ok(())
    }

    /// The active configuration, if `configure` has run
    pub fn config(&self) -> Option<&ProviderConfig> {
        self.config.as_ref()
    }

    /// Resource type names this provider manages
    pub fn resource_types(&self) -> Vec<&'static str> {
        vec![RESOURCE_TYPE]
    }

    /// Validate a resource configuration against its schema
    pub fn validate_resource_config(
        &self,
        resource_type: &str,
        config: &serde_json::Value,
    ) -> Result<()> {
        check_type(resource_type)?;
        resource::schema().validate(config)
    }

    /// Create a resource from its planned attributes, returning the new state
    ///
    /// If the channel was created but a follow-up call failed, the error is
    /// `ProviderError::Partial` carrying the state with the new ID.
    pub async fn create(
        &self,
        resource_type: &str,
        planned: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let mut state = self.planned_state(resource_type, planned)?;
        state.id.clear();
        let api = self.api()?;

        let result = ChannelResource::new(api.as_ref()).create(&mut state).await;
        finish(result, &state)
    }

    /// Refresh a resource; `None` means it no longer exists
    pub async fn read(
        &self,
        resource_type: &str,
        current: serde_json::Value,
    ) -> Result<Option<serde_json::Value>> {
        check_type(resource_type)?;
        let mut state = state_from_value(current)?;
        let api = self.api()?;

        match ChannelResource::new(api.as_ref()).read(&mut state).await {
            Ok(()) => Ok(Some(serde_json::to_value(&state)?)),
            Err(e) if e.is_not_found() => {
                tracing::warn!(name = %state.name, "Channel gone, dropping from state");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Apply planned attributes to an existing resource
    ///
    /// Steps already applied are not rolled back. A failure after the
    /// channel was located is `ProviderError::Partial`, whose state holds
    /// the current composite ID (renamed or not).
    pub async fn update(
        &self,
        resource_type: &str,
        prior: serde_json::Value,
        planned: serde_json::Value,
    ) -> Result<serde_json::Value> {
        check_type(resource_type)?;
        let prior = state_from_value(prior)?;
        let mut state = self.planned_state(resource_type, planned)?;
        state.id = prior.id;
        let api = self.api()?;

        let result = ChannelResource::new(api.as_ref()).update(&mut state).await;
        finish(result, &state)
    }

    /// Delete (archive) a resource
    pub async fn delete(&self, resource_type: &str, current: serde_json::Value) -> Result<()> {
        check_type(resource_type)?;
        let state = state_from_value(current)?;
        let api = self.api()?;

        ChannelResource::new(api.as_ref()).delete(&state).await
    }

    /// Whether a resource still exists; lookup errors count as "no"
    pub async fn exists(&self, resource_type: &str, current: serde_json::Value) -> Result<bool> {
        check_type(resource_type)?;
        let state = state_from_value(current)?;
        let api = self.api()?;

        Ok(ChannelResource::new(api.as_ref()).exists(&state).await)
    }

    /// Import an existing channel by name or composite ID
    ///
    /// The imported state is read back immediately so every attribute is
    /// populated.
    pub async fn import(&self, resource_type: &str, import_id: &str) -> Result<serde_json::Value> {
        check_type(resource_type)?;
        let api = self.api()?;
        let resource = ChannelResource::new(api.as_ref());

        let mut state = resource.import(import_id).await?;
        resource.read(&mut state).await?;
        Ok(serde_json::to_value(&state)?)
    }

    /// Upgrade stored state written at an older schema version
    pub async fn upgrade_state(
        &self,
        resource_type: &str,
        version: u32,
        state: serde_json::Value,
    ) -> Result<serde_json::Value> {
        check_type(resource_type)?;
        let mut state = state_from_value(state)?;

        match version {
            0 => {
                let api = self.api()?;
                ChannelResource::new(api.as_ref())
                    .upgrade_legacy(&mut state)
                    .await?;
            }
            SCHEMA_VERSION => {}
            other => {
                return Err(ProviderError::Config(format!(
                    "state schema version {} is newer than supported version {}",
                    other, SCHEMA_VERSION
                )));
            }
        }

        Ok(serde_json::to_value(&state)?)
    }

    fn api(&self) -> Result<Box<dyn SlackApi>> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| ProviderError::Config("provider is not configured".to_string()))?;
        (self.factory)(config)
    }

    fn planned_state(
        &self,
        resource_type: &str,
        mut planned: serde_json::Value,
    ) -> Result<ChannelState> {
        check_type(resource_type)?;
        let schema = resource::schema();
        schema.apply_defaults(&mut planned);
        schema.validate(&planned)?;
        state_from_value(planned)
    }
}

/// Serialize `state` after a mutating operation
///
/// A failed operation that still left an ID behind hands the state back
/// inside `ProviderError::Partial`.
fn finish(result: Result<()>, state: &ChannelState) -> Result<serde_json::Value> {
    let value = serde_json::to_value(state)?;
    match result {
        Ok(()) => Ok(value),
        Err(e) if state.has_id() => {
            tracing::warn!(id = %state.id, error = %e, "Operation failed part-way, keeping state");
            Err(ProviderError::Partial {
                state: value,
                source: Box::new(e),
            })
        }
        Err(e) => Err(e),
    }
}

fn check_type(resource_type: &str) -> Result<()> {
    if resource_type != RESOURCE_TYPE {
        return Err(ProviderError::UnknownResource(resource_type.to_string()));
    }
    Ok(())
}

/// Decode a state object, treating `null` attributes as absent
fn state_from_value(mut value: serde_json::Value) -> Result<ChannelState> {
    if let Some(map) = value.as_object_mut() {
        map.retain(|_, v| !v.is_null());
    }
    Ok(serde_json::from_value(value)?)
}
