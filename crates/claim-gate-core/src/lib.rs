// crates/claim-gate-core/src/lib.rs
// ============================================================================
// Module: Claim Gate Core Root
// Description: Public API surface for the authorization evaluator.
// Purpose: Wire together the core model, interfaces, and runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Claim Gate decides, per request, whether a principal (an authenticated
//! identity carrying roles and claims) may proceed, by combining role checks,
//! claim checks, and custom requirement logic into named, reusable policies.
//!
//! Policies and handlers are registered once at process start through
//! [`AuthorizationEngineBuilder`]; the resulting [`AuthorizationEngine`] is
//! immutable and serves unlimited concurrent evaluations. Every failure mode
//! folds into the returned [`Decision`]; evaluation never errors or panics.
//!
//! ```
//! use claim_gate_core::AuthorizationEngine;
//! use claim_gate_core::Policy;
//! use claim_gate_core::PolicyName;
//! use claim_gate_core::Principal;
//! use claim_gate_core::Requirement;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), claim_gate_core::EngineBuildError> {
//! let engine = AuthorizationEngine::builder()
//!     .define_policy(Policy::new("AdminOnly", vec![Requirement::role(["Admin"])]))
//!     .build()?;
//!
//! let principal = Principal::new().with_role("Admin");
//! let decision = engine.evaluate(&principal, &PolicyName::new("AdminOnly"), None).await;
//! assert!(decision.is_succeeded());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::BUILTIN_REQUIREMENT_TAGS;
pub use crate::core::Claim;
pub use crate::core::ClaimRequirement;
pub use crate::core::CustomRequirement;
pub use crate::core::Decision;
pub use crate::core::DecisionOutcome;
pub use crate::core::HandlerTraceEntry;
pub use crate::core::Policy;
pub use crate::core::PolicyName;
pub use crate::core::PolicyRegistry;
pub use crate::core::Principal;
pub use crate::core::Requirement;
pub use crate::core::RequirementTag;
pub use crate::core::RequirementTraceEntry;
pub use crate::core::RoleRequirement;
pub use crate::core::Vote;
pub use crate::core::is_builtin_requirement_tag;
pub use crate::interfaces::HandlerError;
pub use crate::interfaces::RequirementHandler;
pub use crate::runtime::AuthorizationContext;
pub use crate::runtime::AuthorizationEngine;
pub use crate::runtime::AuthorizationEngineBuilder;
pub use crate::runtime::ClaimHandler;
pub use crate::runtime::EngineBuildError;
pub use crate::runtime::HandlerRegistry;
pub use crate::runtime::RoleHandler;
