// crates/claim-gate-core/src/core/decision.rs
// ============================================================================
// Module: Claim Gate Decisions
// Description: Final authorization verdicts, handler votes, and trace records.
// Purpose: Capture deterministic evaluation outcomes with diagnostics.
// Dependencies: crate::core::requirement, serde
// ============================================================================

//! ## Overview
//! A [`Decision`] is the only externally observed result of an evaluation:
//! a single succeeded/failed outcome plus diagnostic reasons. Partial success
//! is never expressed. Trace records expose per-handler votes for audit and
//! diagnostics without altering the decision.
//!
//! Security posture: reasons may reveal policy internals and are intended for
//! logs and diagnostics, not for direct display to end users.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::requirement::Requirement;

// ============================================================================
// SECTION: Handler Votes
// ============================================================================

/// Outcome of a single handler invocation for one requirement.
///
/// # Invariants
/// - Abstention is the default; absence of a success vote requires no action
///   from a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    /// Handler marked the requirement satisfied.
    Succeeded,
    /// Handler explicitly failed the whole evaluation.
    Failed,
    /// Handler took no action.
    Abstained,
}

impl Vote {
    /// Returns true if the vote is `Succeeded`.
    #[must_use]
    pub const fn is_succeeded(self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns true if the vote is `Failed`.
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns true if the vote is `Abstained`.
    #[must_use]
    pub const fn is_abstained(self) -> bool {
        matches!(self, Self::Abstained)
    }
}

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Final authorization outcome.
///
/// # Invariants
/// - Variants are stable and exhaustive for authorization outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// Every requirement was satisfied and no handler failed the evaluation.
    Succeeded,
    /// At least one requirement was unsatisfied, a handler explicitly failed
    /// the evaluation, or the requested policy was unknown.
    Failed,
}

/// Atomic authorization verdict returned to the caller.
///
/// # Invariants
/// - `reasons` is empty on success.
/// - On failure, `reasons` lists every unsatisfied requirement in policy
///   order, followed by explicit hard-fail reasons in generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Final outcome.
    pub outcome: DecisionOutcome,
    /// Diagnostic reasons; empty on success.
    pub reasons: Vec<String>,
}

impl Decision {
    /// Creates a succeeded decision with no reasons.
    #[must_use]
    pub const fn succeeded() -> Self {
        Self {
            outcome: DecisionOutcome::Succeeded,
            reasons: Vec::new(),
        }
    }

    /// Creates a failed decision with the given reasons.
    #[must_use]
    pub const fn failed(reasons: Vec<String>) -> Self {
        Self {
            outcome: DecisionOutcome::Failed,
            reasons,
        }
    }

    /// Returns true when the decision succeeded.
    #[must_use]
    pub const fn is_succeeded(&self) -> bool {
        matches!(self.outcome, DecisionOutcome::Succeeded)
    }

    /// Returns true when the decision failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.outcome, DecisionOutcome::Failed)
    }
}

// ============================================================================
// SECTION: Trace Records
// ============================================================================

/// Trace entry for a single handler invocation.
///
/// # Invariants
/// - `vote` reflects the context transition caused by this invocation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerTraceEntry {
    /// Handler name as reported by the handler.
    pub handler: String,
    /// Vote derived from the invocation.
    pub vote: Vote,
}

/// Trace record for one requirement slot within an evaluation.
///
/// # Invariants
/// - `handlers` preserves registration order; one entry per invocation.
/// - `satisfied` is the slot's final state after all handlers ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementTraceEntry {
    /// Zero-based slot index within the evaluated requirement list.
    pub slot: usize,
    /// Requirement that was evaluated.
    pub requirement: Requirement,
    /// Per-handler votes in invocation order.
    pub handlers: Vec<HandlerTraceEntry>,
    /// Whether the requirement ended satisfied.
    pub satisfied: bool,
}
