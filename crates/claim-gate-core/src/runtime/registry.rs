// crates/claim-gate-core/src/runtime/registry.rs
// ============================================================================
// Module: Claim Gate Handler Registry
// Description: Tag-keyed handler resolution in registration order.
// Purpose: Map each requirement kind to the handlers able to evaluate it.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The handler registry associates each requirement tag with zero or more
//! handlers. Resolution is an ordinary map lookup on the requirement's stable
//! tag; no runtime type inspection is involved. Handlers resolve in
//! registration order, and registering the same handler twice yields two
//! invocations per evaluation (a documented hazard, not silently prevented).
//!
//! Resolving zero handlers is legal: the requirement can then never succeed,
//! which surfaces as a normal failed decision, not a configuration error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::requirement::Requirement;
use crate::core::requirement::RequirementTag;
use crate::interfaces::RequirementHandler;

// ============================================================================
// SECTION: Handler Registry
// ============================================================================

/// Immutable-after-build registry resolving requirements to handlers.
///
/// # Invariants
/// - Per-tag handler lists preserve registration order.
/// - Built once at initialization; read-only during evaluation.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    /// Handlers keyed by the requirement tag they declared.
    by_tag: BTreeMap<RequirementTag, Vec<Arc<dyn RequirementHandler>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler under every tag it declares.
    ///
    /// No deduplication is performed; a handler registered twice is invoked
    /// twice per applicable requirement.
    pub fn register(&mut self, handler: Arc<dyn RequirementHandler>) {
        for tag in handler.tags() {
            self.by_tag.entry(tag).or_default().push(Arc::clone(&handler));
        }
    }

    /// Returns the handlers able to evaluate the requirement, in registration
    /// order; empty when no handler declared the requirement's tag.
    #[must_use]
    pub fn handlers_for(&self, requirement: &Requirement) -> &[Arc<dyn RequirementHandler>] {
        self.by_tag
            .get(requirement.tag_str())
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the number of handlers registered under the given tag.
    #[must_use]
    pub fn handler_count(&self, tag: &RequirementTag) -> usize {
        self.by_tag.get(tag).map_or(0, Vec::len)
    }

    /// Returns true when no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_tag.values().all(Vec::is_empty)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (tag, handlers) in &self.by_tag {
            let names: Vec<&str> = handlers.iter().map(|handler| handler.name()).collect();
            map.entry(&tag.as_str(), &names);
        }
        map.finish()
    }
}
