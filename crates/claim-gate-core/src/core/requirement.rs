// crates/claim-gate-core/src/core/requirement.rs
// ============================================================================
// Module: Claim Gate Requirements
// Description: Data-only requirement variants and their stable type tags.
// Purpose: Describe conditions a principal must meet, without any behavior.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Requirements are immutable, data-only descriptions of one condition to
//! satisfy. Evaluation logic lives entirely in handlers; handler resolution is
//! an ordinary mapping lookup keyed by a stable [`RequirementTag`], so new
//! requirement kinds plug in at startup without touching the evaluator.
//!
//! Built-in kinds (`role`, `claim`) have reserved tags. Custom kinds carry a
//! caller-chosen tag plus kind-specific parameters as JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Requirement Tags
// ============================================================================

/// Reserved tags for built-in requirement kinds.
///
/// # Invariants
/// - Tags are lowercase ASCII strings.
/// - Tags remain stable for config and handler registration.
pub const BUILTIN_REQUIREMENT_TAGS: [&str; 2] = ["role", "claim"];

/// Returns true when the tag is reserved for a built-in requirement kind.
#[must_use]
pub fn is_builtin_requirement_tag(tag: &str) -> bool {
    BUILTIN_REQUIREMENT_TAGS.iter().any(|builtin| builtin == &tag)
}

/// Stable type tag identifying a requirement kind for handler resolution.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementTag(String);

impl RequirementTag {
    /// Creates a new requirement tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RequirementTag {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RequirementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RequirementTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RequirementTag {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Built-in Requirement Kinds
// ============================================================================

/// Requirement satisfied when the principal holds any of the allowed roles.
///
/// # Invariants
/// - `allowed_roles` comparison is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequirement {
    /// Role names, any one of which satisfies the requirement.
    pub allowed_roles: BTreeSet<String>,
}

impl RoleRequirement {
    /// Creates a role requirement from the given role names.
    #[must_use]
    pub fn new<I, S>(allowed_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_roles: allowed_roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Requirement satisfied when the principal holds a matching claim.
///
/// # Invariants
/// - An empty `allowed_values` set means any claim of `claim_type` satisfies
///   the requirement regardless of its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequirement {
    /// Claim type that must be present.
    pub claim_type: String,
    /// Accepted claim values; empty means any value.
    pub allowed_values: BTreeSet<String>,
}

impl ClaimRequirement {
    /// Creates a claim requirement for a claim type and accepted values.
    #[must_use]
    pub fn new<I, S>(claim_type: impl Into<String>, allowed_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            claim_type: claim_type.into(),
            allowed_values: allowed_values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a claim requirement satisfied by any value of the claim type.
    #[must_use]
    pub fn any_value(claim_type: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            allowed_values: BTreeSet::new(),
        }
    }
}

// ============================================================================
// SECTION: Custom Requirement Kinds
// ============================================================================

/// Open-ended requirement kind evaluated by caller-registered handlers.
///
/// # Invariants
/// - `tag` selects the handlers that evaluate this requirement.
/// - `params` is immutable, kind-specific data; the engine never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRequirement {
    /// Stable tag for handler resolution.
    pub tag: RequirementTag,
    /// Kind-specific parameters.
    pub params: Value,
}

impl CustomRequirement {
    /// Creates a custom requirement from a tag and parameters.
    #[must_use]
    pub fn new(tag: impl Into<RequirementTag>, params: Value) -> Self {
        Self {
            tag: tag.into(),
            params,
        }
    }
}

// ============================================================================
// SECTION: Requirement
// ============================================================================

/// One atomic condition a principal must meet.
///
/// # Invariants
/// - Requirements carry no behavior; evaluation logic lives in handlers.
/// - Duplicate requirements within one policy are evaluated independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// Role membership requirement.
    Role(RoleRequirement),
    /// Claim presence/value requirement.
    Claim(ClaimRequirement),
    /// Custom requirement evaluated by registered handlers.
    Custom(CustomRequirement),
}

impl Requirement {
    /// Creates a role requirement from the given role names.
    #[must_use]
    pub fn role<I, S>(allowed_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Role(RoleRequirement::new(allowed_roles))
    }

    /// Creates a claim requirement for a claim type and accepted values.
    #[must_use]
    pub fn claim<I, S>(claim_type: impl Into<String>, allowed_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Claim(ClaimRequirement::new(claim_type, allowed_values))
    }

    /// Creates a custom requirement from a tag and parameters.
    #[must_use]
    pub fn custom(tag: impl Into<RequirementTag>, params: Value) -> Self {
        Self::Custom(CustomRequirement::new(tag, params))
    }

    /// Returns the stable tag used to resolve handlers for this requirement.
    #[must_use]
    pub fn tag(&self) -> RequirementTag {
        match self {
            Self::Role(_) => RequirementTag::new(BUILTIN_REQUIREMENT_TAGS[0]),
            Self::Claim(_) => RequirementTag::new(BUILTIN_REQUIREMENT_TAGS[1]),
            Self::Custom(custom) => custom.tag.clone(),
        }
    }

    /// Returns the tag as a string slice without allocating.
    #[must_use]
    pub fn tag_str(&self) -> &str {
        match self {
            Self::Role(_) => BUILTIN_REQUIREMENT_TAGS[0],
            Self::Claim(_) => BUILTIN_REQUIREMENT_TAGS[1],
            Self::Custom(custom) => custom.tag.as_str(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(_) => f.write_str("RoleRequirement"),
            Self::Claim(_) => f.write_str("ClaimRequirement"),
            Self::Custom(custom) => write!(f, "CustomRequirement({})", custom.tag),
        }
    }
}
