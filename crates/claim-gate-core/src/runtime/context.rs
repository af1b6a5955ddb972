// crates/claim-gate-core/src/runtime/context.rs
// ============================================================================
// Module: Claim Gate Authorization Context
// Description: Per-call accumulator for requirement evaluation state.
// Purpose: Track pending/succeeded requirement slots and hard-fail reasons.
// Dependencies: crate::core, smallvec
// ============================================================================

//! ## Overview
//! The authorization context is created fresh for every evaluation call and
//! discarded afterwards; it is never shared across calls or threads. Slot
//! state is move-only (pending to succeeded), so a requirement can never be
//! "un-succeeded". Hard failure is a latch with an append-only reason list.
//!
//! Requirements are tracked by slot index, so duplicate requirements within
//! one policy are independent entries by construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use smallvec::SmallVec;

use crate::core::principal::Principal;
use crate::core::requirement::Requirement;

// ============================================================================
// SECTION: Slot State
// ============================================================================

/// Evaluation state of one requirement slot.
///
/// # Invariants
/// - The only legal transition is `Pending` to `Succeeded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No handler has voted success for this slot yet.
    Pending,
    /// A handler marked this slot satisfied.
    Succeeded,
}

impl SlotState {
    /// Returns true when the slot is satisfied.
    #[must_use]
    pub const fn is_succeeded(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

// ============================================================================
// SECTION: Authorization Context
// ============================================================================

/// Per-call mutable accumulator handed to requirement handlers.
///
/// # Invariants
/// - Owned exclusively by one evaluation call; never retained by handlers.
/// - `succeed` only acts on the slot currently under evaluation, which scopes
///   handler effects to the requirement they were invoked for.
#[derive(Debug)]
pub struct AuthorizationContext<'a> {
    /// Principal being authorized.
    principal: &'a Principal,
    /// Optional resource under inspection; opaque to the engine.
    resource: Option<&'a Value>,
    /// Requirements under evaluation, in policy order.
    requirements: &'a [Requirement],
    /// Per-slot evaluation state, parallel to `requirements`.
    states: Vec<SlotState>,
    /// Index of the slot currently offered to handlers.
    cursor: usize,
    /// Hard-fail latch set by an explicit handler fail.
    failed: bool,
    /// Append-only hard-fail reasons in generation order.
    failure_reasons: SmallVec<[String; 4]>,
}

impl<'a> AuthorizationContext<'a> {
    /// Creates a fresh context with every slot pending.
    #[must_use]
    pub fn new(
        principal: &'a Principal,
        requirements: &'a [Requirement],
        resource: Option<&'a Value>,
    ) -> Self {
        Self {
            principal,
            resource,
            requirements,
            states: vec![SlotState::Pending; requirements.len()],
            cursor: 0,
            failed: false,
            failure_reasons: SmallVec::new(),
        }
    }

    /// Returns the principal being authorized.
    ///
    /// The returned reference carries the evaluation lifetime, so handlers
    /// can hold it across later context mutations.
    #[must_use]
    pub const fn principal(&self) -> &'a Principal {
        self.principal
    }

    /// Returns the resource under inspection, if the caller supplied one.
    #[must_use]
    pub const fn resource(&self) -> Option<&'a Value> {
        self.resource
    }

    /// Returns the requirement currently under evaluation.
    ///
    /// Returns `None` only when the requirement list is empty, in which case
    /// no handler is ever invoked.
    #[must_use]
    pub fn requirement(&self) -> Option<&'a Requirement> {
        self.requirements.get(self.cursor)
    }

    /// Marks the requirement currently under evaluation as satisfied.
    ///
    /// Success is additive only; calling this on an already-satisfied slot
    /// has no effect.
    pub fn succeed(&mut self) {
        if let Some(state) = self.states.get_mut(self.cursor) {
            *state = SlotState::Succeeded;
        }
    }

    /// Explicitly fails the whole evaluation with a human-readable reason.
    ///
    /// The hard-fail latch short-circuits the final outcome regardless of
    /// other requirements; remaining handlers still run for their side
    /// effects.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.failed = true;
        self.failure_reasons.push(reason.into());
    }

    /// Returns true once any handler has explicitly failed the evaluation.
    #[must_use]
    pub const fn has_failed(&self) -> bool {
        self.failed
    }

    /// Returns requirements that have not received a success vote, with their
    /// slot indices, in policy order.
    pub fn pending(&self) -> impl Iterator<Item = (usize, &Requirement)> {
        self.requirements
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.slot_state(*index).is_succeeded())
    }

    /// Returns satisfied requirements with their slot indices, in policy order.
    pub fn succeeded(&self) -> impl Iterator<Item = (usize, &Requirement)> {
        self.requirements
            .iter()
            .enumerate()
            .filter(|(index, _)| self.slot_state(*index).is_succeeded())
    }

    /// Returns true when every slot is satisfied.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.states.iter().all(|state| state.is_succeeded())
    }

    /// Returns the state of the given slot; out-of-range reads as pending.
    #[must_use]
    pub fn slot_state(&self, index: usize) -> SlotState {
        self.states.get(index).copied().unwrap_or(SlotState::Pending)
    }

    /// Returns hard-fail reasons in the order they were generated.
    #[must_use]
    pub fn failure_reasons(&self) -> &[String] {
        &self.failure_reasons
    }

    /// Positions the cursor on the slot about to be offered to handlers.
    pub(crate) const fn set_cursor(&mut self, index: usize) {
        self.cursor = index;
    }
}
