// crates/claim-gate-core/src/core/mod.rs
// ============================================================================
// Module: Claim Gate Core Model
// Description: Value types shared across the authorization engine.
// Purpose: Group principals, requirements, policies, and decisions.
// Dependencies: crate::core::{decision, policy, principal, requirement}
// ============================================================================

//! ## Overview
//! The core model holds the data-only types of the authorization engine:
//! the principal identity, requirement variants, named policies, and the
//! decision values evaluations produce. Behavior lives in `runtime`.

/// Decision outcomes, votes, and trace records.
pub mod decision;
/// Policies and the immutable policy registry.
pub mod policy;
/// Claims, roles, and the principal identity.
pub mod principal;
/// Requirement variants and stable type tags.
pub mod requirement;

pub use decision::Decision;
pub use decision::DecisionOutcome;
pub use decision::HandlerTraceEntry;
pub use decision::RequirementTraceEntry;
pub use decision::Vote;
pub use policy::Policy;
pub use policy::PolicyName;
pub use policy::PolicyRegistry;
pub use principal::Claim;
pub use principal::Principal;
pub use requirement::BUILTIN_REQUIREMENT_TAGS;
pub use requirement::ClaimRequirement;
pub use requirement::CustomRequirement;
pub use requirement::Requirement;
pub use requirement::RequirementTag;
pub use requirement::RoleRequirement;
pub use requirement::is_builtin_requirement_tag;
