// crates/claim-gate-core/src/core/principal.rs
// ============================================================================
// Module: Claim Gate Principal Model
// Description: Claims, roles, and the authenticated principal for one request.
// Purpose: Provide the immutable identity input consumed by requirement handlers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A principal is the authenticated identity for the current request. It is
//! produced by an external authentication subsystem, owned by the request
//! context for the duration of the request, and never mutated by the engine.
//!
//! Security posture: the engine trusts principal contents completely; claim
//! and role verification is the authentication layer's responsibility.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Claims
// ============================================================================

/// A typed key/value attribute held by a principal.
///
/// # Invariants
/// - `claim_type` and `value` are opaque UTF-8 strings; no normalization is
///   applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type (e.g. `Permission`, `Experience`).
    pub claim_type: String,
    /// Claim value (e.g. `ManageOrders`, `7`).
    pub value: String,
}

impl Claim {
    /// Creates a claim from a type and value.
    #[must_use]
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Principal
// ============================================================================

/// Authenticated identity for the current request.
///
/// # Invariants
/// - `claims` may contain multiple claims of the same type; ordering carries
///   no meaning.
/// - The engine reads but never mutates a principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Claims held by the principal.
    pub claims: Vec<Claim>,
    /// Role names assigned to the principal.
    pub roles: BTreeSet<String>,
}

impl Principal {
    /// Creates an empty principal with no claims and no roles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a claim, keeping any existing claims of the same type.
    #[must_use]
    pub fn with_claim(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.push(Claim::new(claim_type, value));
        self
    }

    /// Adds a role name.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Returns true when the principal holds the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns all claim values held for the given claim type.
    pub fn claim_values<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a str> {
        self.claims
            .iter()
            .filter(move |claim| claim.claim_type == claim_type)
            .map(|claim| claim.value.as_str())
    }

    /// Returns the first claim value for the given claim type, if any.
    #[must_use]
    pub fn first_claim_value<'a>(&'a self, claim_type: &'a str) -> Option<&'a str> {
        self.claim_values(claim_type).next()
    }
}
