// crates/claim-gate-config/src/lib.rs
// ============================================================================
// Module: Claim Gate Config Library
// Description: Declarative policy-set model, loading, and validation.
// Purpose: Single source of truth for claim-gate.toml semantics.
// Dependencies: claim-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `claim-gate-config` defines the declarative policy-set model for Claim
//! Gate: named policies and their requirements expressed as TOML or JSON,
//! loaded with strict fail-closed guards and converted into the core engine
//! builder.
//!
//! Security posture: config inputs are untrusted; loading enforces hard path,
//! size, and encoding limits before any parsing happens.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
