// crates/claim-gate-core/src/core/policy.rs
// ============================================================================
// Module: Claim Gate Policies
// Description: Named requirement conjunctions and the immutable policy registry.
// Purpose: Hold the process-wide policy set built once at initialization.
// Dependencies: crate::core::requirement, serde
// ============================================================================

//! ## Overview
//! A policy is a named, ordered conjunction of requirements. Policies are
//! registered once at process start and are read-only thereafter; there is no
//! runtime mutation API. Reconfiguration means rebuilding the registry.
//!
//! A policy with zero requirements is legal and trivially succeeds for every
//! principal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::requirement::Requirement;

// ============================================================================
// SECTION: Policy Name
// ============================================================================

/// Unique policy name used for lookup at evaluation time.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyName(String);

impl PolicyName {
    /// Creates a new policy name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PolicyName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PolicyName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Named conjunction of requirements.
///
/// # Invariants
/// - `requirements` order is the evaluation order and is preserved.
/// - Zero requirements is legal and trivially satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Unique policy name.
    pub name: PolicyName,
    /// Ordered requirement conjunction.
    pub requirements: Vec<Requirement>,
}

impl Policy {
    /// Creates a policy from a name and ordered requirements.
    #[must_use]
    pub fn new(name: impl Into<PolicyName>, requirements: Vec<Requirement>) -> Self {
        Self {
            name: name.into(),
            requirements,
        }
    }
}

// ============================================================================
// SECTION: Policy Registry
// ============================================================================

/// Immutable name-to-policy map shared by all evaluations.
///
/// # Invariants
/// - Built once at initialization; no mutation API exists post-construction.
/// - Safe for unlimited concurrent reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRegistry {
    /// Registered policies keyed by name.
    policies: BTreeMap<PolicyName, Policy>,
}

impl PolicyRegistry {
    /// Builds a registry from the given policies.
    ///
    /// Later entries with a duplicate name are rejected by the engine builder
    /// before this constructor runs; this type itself keeps the last entry.
    #[must_use]
    pub fn from_policies(policies: impl IntoIterator<Item = Policy>) -> Self {
        Self {
            policies: policies
                .into_iter()
                .map(|policy| (policy.name.clone(), policy))
                .collect(),
        }
    }

    /// Returns the policy registered under the given name, if any.
    #[must_use]
    pub fn get(&self, name: &PolicyName) -> Option<&Policy> {
        self.policies.get(name)
    }

    /// Returns true when a policy is registered under the given name.
    #[must_use]
    pub fn contains(&self, name: &PolicyName) -> bool {
        self.policies.contains_key(name)
    }

    /// Returns the number of registered policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns true when no policies are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Returns registered policy names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &PolicyName> {
        self.policies.keys()
    }
}
