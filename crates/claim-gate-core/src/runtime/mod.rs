// crates/claim-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Claim Gate Runtime
// Description: Evaluation behavior built on the core model.
// Purpose: Group the context, registry, built-in handlers, and engine.
// Dependencies: crate::runtime::{context, engine, handlers, registry}
// ============================================================================

//! ## Overview
//! The runtime layer holds everything that evaluates: the per-call
//! authorization context, the tag-keyed handler registry, the built-in role
//! and claim handlers, and the engine with its builder.

/// Per-call authorization context.
pub mod context;
/// Authorization engine and builder.
pub mod engine;
/// Built-in role and claim handlers.
pub mod handlers;
/// Tag-keyed handler registry.
pub mod registry;

pub use context::AuthorizationContext;
pub use context::SlotState;
pub use engine::AuthorizationEngine;
pub use engine::AuthorizationEngineBuilder;
pub use engine::EngineBuildError;
pub use handlers::ClaimHandler;
pub use handlers::RoleHandler;
pub use registry::HandlerRegistry;
