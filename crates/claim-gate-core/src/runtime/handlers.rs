// crates/claim-gate-core/src/runtime/handlers.rs
// ============================================================================
// Module: Claim Gate Built-in Handlers
// Description: Role and claim handlers for the built-in requirement kinds.
// Purpose: Evaluate role membership and claim matching against a principal.
// Dependencies: crate::core, crate::interfaces, crate::runtime::context
// ============================================================================

//! ## Overview
//! Built-in handlers cover the two requirement kinds every deployment needs:
//! role membership and claim matching. Both succeed or abstain; they never
//! hard-fail, so per-requirement semantics stay composable with other
//! handlers registered for the same kind (auditing, logging).
//!
//! Both handlers abstain on a requirement variant they do not evaluate; a
//! mismatched variant can only reach a handler through a custom tag collision
//! and must not fail open.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use smallvec::SmallVec;
use smallvec::smallvec;

use crate::core::requirement::Requirement;
use crate::core::requirement::RequirementTag;
use crate::interfaces::HandlerError;
use crate::interfaces::RequirementHandler;
use crate::runtime::context::AuthorizationContext;

// ============================================================================
// SECTION: Role Handler
// ============================================================================

/// Handler for [`Requirement::Role`]: succeeds when the principal's role set
/// intersects the allowed roles, abstains otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleHandler;

impl RoleHandler {
    /// Creates the role handler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RequirementHandler for RoleHandler {
    fn name(&self) -> &str {
        "role-handler"
    }

    fn tags(&self) -> SmallVec<[RequirementTag; 2]> {
        smallvec![RequirementTag::new("role")]
    }

    async fn handle(
        &self,
        ctx: &mut AuthorizationContext<'_>,
        requirement: &Requirement,
    ) -> Result<(), HandlerError> {
        let Requirement::Role(role) = requirement else {
            return Ok(());
        };
        let held = role
            .allowed_roles
            .iter()
            .any(|allowed| ctx.principal().has_role(allowed));
        if held {
            ctx.succeed();
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Claim Handler
// ============================================================================

/// Handler for [`Requirement::Claim`]: succeeds when the principal holds at
/// least one claim of the required type whose value is accepted, abstains
/// otherwise. An empty accepted-value set accepts any value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimHandler;

impl ClaimHandler {
    /// Creates the claim handler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RequirementHandler for ClaimHandler {
    fn name(&self) -> &str {
        "claim-handler"
    }

    fn tags(&self) -> SmallVec<[RequirementTag; 2]> {
        smallvec![RequirementTag::new("claim")]
    }

    async fn handle(
        &self,
        ctx: &mut AuthorizationContext<'_>,
        requirement: &Requirement,
    ) -> Result<(), HandlerError> {
        let Requirement::Claim(claim) = requirement else {
            return Ok(());
        };
        let held = ctx
            .principal()
            .claim_values(&claim.claim_type)
            .any(|value| claim.allowed_values.is_empty() || claim.allowed_values.contains(value));
        if held {
            ctx.succeed();
        }
        Ok(())
    }
}
