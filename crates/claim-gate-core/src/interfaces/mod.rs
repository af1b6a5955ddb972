// crates/claim-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Claim Gate Interfaces
// Description: Handler contract surface for requirement evaluation.
// Purpose: Define how evaluation logic plugs into the engine without editing it.
// Dependencies: crate::core, crate::runtime::context
// ============================================================================

//! ## Overview
//! A handler is a unit of evaluation logic for one or more requirement kinds.
//! Handlers inspect the principal (and optionally a resource) through the
//! authorization context and vote by acting on it: mark the requirement
//! succeeded, explicitly fail the whole evaluation, or do nothing (abstain).
//!
//! ## Layer Responsibilities
//! - Declare the requirement tags the handler evaluates.
//! - Vote deterministically from `(principal, requirement, resource)` alone.
//!
//! ## Invariants
//! - Handlers must be stateless; the context argument is the only legal
//!   mutation target. A handler keeping mutable internal state is a caller
//!   error, not an engine bug.
//! - Handler votes must not depend on the order handlers run in; ordering
//!   only affects diagnostic reason text, never the outcome.
//!
//! Security posture: a handler fault (an `Err` return) is converted by the
//! engine into a hard fail so authorization never fails open.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use smallvec::SmallVec;
use thiserror::Error;

use crate::core::requirement::Requirement;
use crate::core::requirement::RequirementTag;
use crate::runtime::context::AuthorizationContext;

// ============================================================================
// SECTION: Handler Errors
// ============================================================================

/// Handler internal fault reported during evaluation.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Handler logic reported an error (e.g. an unreachable permission source).
    #[error("requirement handler error: {0}")]
    Evaluation(String),
}

// ============================================================================
// SECTION: Requirement Handler
// ============================================================================

/// Evaluation logic bound to one or more requirement kinds.
///
/// Handlers may perform I/O; each invocation is a suspension point for the
/// sequential evaluation loop. Registering the same handler twice yields two
/// invocations per evaluation; the registry never deduplicates.
#[async_trait]
pub trait RequirementHandler: Send + Sync {
    /// Returns the handler name used in trace records and fault reasons.
    fn name(&self) -> &str;

    /// Returns the requirement tags this handler evaluates.
    fn tags(&self) -> SmallVec<[RequirementTag; 2]>;

    /// Evaluates one requirement against the context.
    ///
    /// Legal effects are exactly one of: `ctx.succeed()`, `ctx.fail(reason)`,
    /// or nothing (abstain). Handlers inspecting `ctx.resource()` must treat
    /// an absent resource as abstain, never as an error.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] on an internal fault; the engine converts the
    /// fault into a hard fail for the evaluation.
    async fn handle(
        &self,
        ctx: &mut AuthorizationContext<'_>,
        requirement: &Requirement,
    ) -> Result<(), HandlerError>;
}
