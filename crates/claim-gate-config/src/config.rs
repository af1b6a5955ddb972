// crates/claim-gate-config/src/config.rs
// ============================================================================
// Module: Claim Gate Policy-Set Configuration
// Description: Policy-set loading and validation for Claim Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: claim-gate-core, serde, serde_json, toml
// ============================================================================

//! ## Overview
//! A policy set is loaded from a TOML or JSON file with strict size and path
//! limits, validated structurally, and converted into core policies or
//! applied directly to an [`AuthorizationEngineBuilder`]. Missing or invalid
//! configuration fails closed; no partial policy set is ever produced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use claim_gate_core::AuthorizationEngineBuilder;
use claim_gate_core::ClaimRequirement;
use claim_gate_core::CustomRequirement;
use claim_gate_core::Policy;
use claim_gate_core::PolicyName;
use claim_gate_core::Requirement;
use claim_gate_core::RequirementTag;
use claim_gate_core::RoleRequirement;
use claim_gate_core::is_builtin_requirement_tag;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "claim-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "CLAIM_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of policies in one policy set.
pub(crate) const MAX_POLICIES: usize = 1024;
/// Maximum number of requirements in one policy.
pub(crate) const MAX_REQUIREMENTS_PER_POLICY: usize = 256;
/// Maximum length of a policy name.
pub(crate) const MAX_POLICY_NAME_LENGTH: usize = 256;
/// Maximum length of a custom requirement tag.
pub(crate) const MAX_TAG_LENGTH: usize = 128;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Declarative set of named policies.
///
/// # Invariants
/// - Policy names are unique and non-empty after [`PolicySetConfig::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySetConfig {
    /// Policy definitions in declaration order.
    #[serde(default)]
    pub policies: Vec<PolicyConfig>,
}

/// One named policy definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Unique policy name.
    pub name: String,
    /// Requirements, all of which must be satisfied.
    #[serde(default)]
    pub requirements: Vec<RequirementConfig>,
}

/// Declarative form of one requirement.
///
/// The `kind` field selects the variant; unknown kinds are rejected at parse
/// time, so a typo in a config file can never silently drop a requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequirementConfig {
    /// Role membership requirement.
    Role {
        /// Role names, any one of which satisfies the requirement.
        allowed_roles: BTreeSet<String>,
    },
    /// Claim presence/value requirement.
    Claim {
        /// Claim type that must be present.
        claim_type: String,
        /// Accepted claim values; empty means any value.
        #[serde(default)]
        allowed_values: BTreeSet<String>,
    },
    /// Custom requirement resolved by tag at evaluation time.
    Custom {
        /// Stable tag for handler resolution.
        tag: String,
        /// Kind-specific parameters, passed through uninterpreted.
        #[serde(default)]
        params: Value,
    },
}

impl RequirementConfig {
    /// Converts the declarative form into a core requirement.
    #[must_use]
    pub fn to_requirement(&self) -> Requirement {
        match self {
            Self::Role { allowed_roles } => Requirement::Role(RoleRequirement {
                allowed_roles: allowed_roles.clone(),
            }),
            Self::Claim {
                claim_type,
                allowed_values,
            } => Requirement::Claim(ClaimRequirement {
                claim_type: claim_type.clone(),
                allowed_values: allowed_values.clone(),
            }),
            Self::Custom { tag, params } => Requirement::Custom(CustomRequirement::new(
                RequirementTag::new(tag.clone()),
                params.clone(),
            )),
        }
    }
}

impl PolicyConfig {
    /// Converts the declarative form into a core policy.
    #[must_use]
    pub fn to_policy(&self) -> Policy {
        Policy::new(
            PolicyName::new(self.name.clone()),
            self.requirements.iter().map(RequirementConfig::to_requirement).collect(),
        )
    }
}

impl PolicySetConfig {
    /// Loads a policy set from disk using the default resolution rules.
    ///
    /// The format is chosen by extension: `.json` parses as JSON, anything
    /// else as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, parsing, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self = if resolved.extension().and_then(|ext| ext.to_str()) == Some("json") {
            serde_json::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?
        } else {
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the policy set for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the policy set is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policies.len() > MAX_POLICIES {
            return Err(ConfigError::Invalid("policy count exceeds limit".to_string()));
        }
        let mut seen = BTreeSet::new();
        for policy in &self.policies {
            let name = policy.name.trim();
            if name.is_empty() {
                return Err(ConfigError::Invalid("policy name must be non-empty".to_string()));
            }
            if name.len() > MAX_POLICY_NAME_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "policy name {name} exceeds max length"
                )));
            }
            if !seen.insert(name) {
                return Err(ConfigError::Invalid(format!("duplicate policy name: {name}")));
            }
            if policy.requirements.len() > MAX_REQUIREMENTS_PER_POLICY {
                return Err(ConfigError::Invalid(format!(
                    "policy {name} requirement count exceeds limit"
                )));
            }
            for requirement in &policy.requirements {
                validate_requirement(name, requirement)?;
            }
        }
        Ok(())
    }

    /// Converts the policy set into core policies in declaration order.
    #[must_use]
    pub fn to_policies(&self) -> Vec<Policy> {
        self.policies.iter().map(PolicyConfig::to_policy).collect()
    }

    /// Defines every policy in the set on the given engine builder.
    #[must_use]
    pub fn apply(&self, builder: AuthorizationEngineBuilder) -> AuthorizationEngineBuilder {
        self.to_policies()
            .into_iter()
            .fold(builder, AuthorizationEngineBuilder::define_policy)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Policy-set loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML or JSON parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid policy-set data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates one declarative requirement within the named policy.
fn validate_requirement(policy: &str, requirement: &RequirementConfig) -> Result<(), ConfigError> {
    match requirement {
        RequirementConfig::Role { allowed_roles } => {
            if allowed_roles.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "policy {policy}: role requirement needs at least one allowed role"
                )));
            }
            if allowed_roles.iter().any(|role| role.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "policy {policy}: role names must be non-empty"
                )));
            }
        }
        RequirementConfig::Claim { claim_type, .. } => {
            if claim_type.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "policy {policy}: claim requirement needs a claim type"
                )));
            }
        }
        RequirementConfig::Custom { tag, .. } => {
            let trimmed = tag.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "policy {policy}: custom requirement needs a tag"
                )));
            }
            if trimmed.len() > MAX_TAG_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "policy {policy}: custom tag exceeds max length"
                )));
            }
            if is_builtin_requirement_tag(trimmed) {
                return Err(ConfigError::Invalid(format!(
                    "policy {policy}: custom tag {trimmed} is reserved for a built-in kind"
                )));
            }
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use serde_json::json;

    use super::*;

    fn role_policy(name: &str) -> PolicyConfig {
        PolicyConfig {
            name: name.to_string(),
            requirements: vec![RequirementConfig::Role {
                allowed_roles: BTreeSet::from(["Admin".to_string()]),
            }],
        }
    }

    #[test]
    fn validate_accepts_well_formed_policy_set() {
        let config = PolicySetConfig {
            policies: vec![role_policy("AdminOnly"), role_policy("AlsoAdmin")],
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_policy_names() {
        let config = PolicySetConfig {
            policies: vec![role_policy("AdminOnly"), role_policy("AdminOnly")],
        };
        let error = config.validate().expect_err("duplicate name must be rejected");
        assert!(error.to_string().contains("duplicate policy name"));
    }

    #[test]
    fn validate_rejects_empty_policy_name() {
        let config = PolicySetConfig {
            policies: vec![role_policy("  ")],
        };
        let error = config.validate().expect_err("blank name must be rejected");
        assert!(error.to_string().contains("policy name must be non-empty"));
    }

    #[test]
    fn validate_rejects_role_requirement_without_roles() {
        let config = PolicySetConfig {
            policies: vec![PolicyConfig {
                name: "Empty".to_string(),
                requirements: vec![RequirementConfig::Role {
                    allowed_roles: BTreeSet::new(),
                }],
            }],
        };
        let error = config.validate().expect_err("empty role set must be rejected");
        assert!(error.to_string().contains("at least one allowed role"));
    }

    #[test]
    fn validate_rejects_reserved_custom_tag() {
        let config = PolicySetConfig {
            policies: vec![PolicyConfig {
                name: "Shadowed".to_string(),
                requirements: vec![RequirementConfig::Custom {
                    tag: "role".to_string(),
                    params: json!({}),
                }],
            }],
        };
        let error = config.validate().expect_err("reserved tag must be rejected");
        assert!(error.to_string().contains("reserved for a built-in kind"));
    }

    #[test]
    fn unknown_requirement_kind_is_a_parse_error() {
        let toml = r#"
            [[policies]]
            name = "Broken"

            [[policies.requirements]]
            kind = "biometric"
        "#;
        let result: Result<PolicySetConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn to_policies_preserves_declaration_order() {
        let config = PolicySetConfig {
            policies: vec![role_policy("First"), role_policy("Second")],
        };
        let policies = config.to_policies();
        assert_eq!(policies[0].name, PolicyName::new("First"));
        assert_eq!(policies[1].name, PolicyName::new("Second"));
    }
}
