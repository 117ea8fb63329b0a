//! Resource and provider schemas — attribute types, defaults, validation
//!
//! The plugin host validates configuration against these schemas before
//! calling into a resource. `validate` and `apply_defaults` run the same
//! rules inside the provider so the handler never sees unvalidated input.

use crate::error::{ProviderError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Bool,
}

impl AttributeType {
    fn matches(self, value: &serde_json::Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
        }
    }
}

/// Value constraint attached to an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// String length in characters, inclusive on both ends
    StringLenBetween { min: usize, max: usize },
}

impl Validator {
    fn check(&self, value: &serde_json::Value) -> std::result::Result<(), String> {
        match *self {
            Self::StringLenBetween { min, max } => {
                let len = value.as_str().map(|s| s.chars().count()).unwrap_or(0);
                if len < min || len > max {
                    return Err(format!(
                        "expected length to be in the range ({} - {}), got {}",
                        min, max, len
                    ));
                }
                Ok(())
            }
        }
    }
}

/// A single schema attribute
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub ty: AttributeType,

    pub description: String,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub computed: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,

    /// Value filled in when the attribute is absent from configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Environment variable consulted when the attribute is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_default: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<Validator>,
}

impl Attribute {
    fn base(ty: AttributeType, description: &str) -> Self {
        Self {
            ty,
            description: description.to_string(),
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            default: None,
            env_default: None,
            validator: None,
        }
    }

    /// Required attribute
    pub fn required(ty: AttributeType, description: &str) -> Self {
        Self {
            required: true,
            ..Self::base(ty, description)
        }
    }

    /// Optional attribute
    pub fn optional(ty: AttributeType, description: &str) -> Self {
        Self {
            optional: true,
            ..Self::base(ty, description)
        }
    }

    /// Attribute set only by the provider
    pub fn computed(ty: AttributeType, description: &str) -> Self {
        Self {
            computed: true,
            ..Self::base(ty, description)
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_env_default(mut self, var: &str) -> Self {
        self.env_default = Some(var.to_string());
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// Schema of a resource type or of the provider block
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    /// State schema version; bumped when stored state changes shape
    pub version: u32,

    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    /// Empty schema at a version
    pub fn new(version: u32) -> Self {
        Self {
            version,
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    /// Check a configuration object against this schema
    ///
    /// Computed attributes may be present (they come back from state) but
    /// are not type-checked against configuration rules.
    pub fn validate(&self, config: &serde_json::Value) -> Result<()> {
        let map = config.as_object().ok_or_else(|| ProviderError::Validation {
            attribute: String::new(),
            reason: "configuration must be an object".to_string(),
        })?;

        for key in map.keys() {
            if !self.attributes.contains_key(key) {
                return Err(ProviderError::Validation {
                    attribute: key.clone(),
                    reason: "unsupported argument".to_string(),
                });
            }
        }

        for (name, attr) in &self.attributes {
            let value = map.get(name).filter(|v| !v.is_null());
            let value = match value {
                Some(v) => v,
                None if attr.required => {
                    return Err(ProviderError::Validation {
                        attribute: name.clone(),
                        reason: "required attribute is missing".to_string(),
                    });
                }
                None => continue,
            };

            if attr.computed && !attr.optional && !attr.required {
                continue;
            }

            if !attr.ty.matches(value) {
                return Err(ProviderError::Validation {
                    attribute: name.clone(),
                    reason: format!("expected {:?}, got {}", attr.ty, value),
                });
            }

            if let Some(validator) = &attr.validator {
                validator
                    .check(value)
                    .map_err(|reason| ProviderError::Validation {
                        attribute: name.clone(),
                        reason,
                    })?;
            }
        }

        Ok(())
    }

    /// Fill in defaults for absent attributes
    pub fn apply_defaults(&self, config: &mut serde_json::Value) {
        let Some(map) = config.as_object_mut() else {
            return;
        };
        for (name, attr) in &self.attributes {
            if let Some(default) = &attr.default {
                let absent = map.get(name).map_or(true, |v| v.is_null());
                if absent {
                    map.insert(name.clone(), default.clone());
                }
            }
        }
    }
}

/// Everything the provider declares to the host
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSchema {
    /// Provider configuration block
    pub provider: Schema,

    /// Resource type name → schema
    pub resources: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    /// Schema for a resource type
    pub fn resource(&self, resource_type: &str) -> Option<&Schema> {
        self.resources.get(resource_type)
    }
}
