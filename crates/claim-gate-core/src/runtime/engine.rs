// crates/claim-gate-core/src/runtime/engine.rs
// ============================================================================
// Module: Claim Gate Authorization Engine
// Description: Policy resolution, handler orchestration, and decision assembly.
// Purpose: Evaluate one authorization request into a deterministic decision.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! The engine is the single evaluation entry point. It resolves the named
//! policy, offers every requirement to every applicable handler in
//! registration order, aggregates votes in a per-call context, and folds the
//! result into a [`Decision`].
//!
//! All handlers always run, even after a hard fail or after a requirement has
//! already succeeded: later handlers for the same requirement are part of the
//! extension mechanism (auditing, logging) and must observe every call. The
//! decision outcome, however, no longer depends on handlers run after the
//! first explicit fail.
//!
//! The engine is immutable after [`AuthorizationEngineBuilder::build`] and
//! supports unlimited concurrent `evaluate` calls without locking. Each call
//! runs its requirement/handler loop sequentially; the cooperative suspension
//! unit is the individual handler invocation.
//!
//! Security posture: every failure mode folds into the decision value; the
//! engine never returns an error or panics from `evaluate`, so deny-by-default
//! needs no caller-side error handling.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::core::decision::Decision;
use crate::core::decision::HandlerTraceEntry;
use crate::core::decision::RequirementTraceEntry;
use crate::core::decision::Vote;
use crate::core::policy::Policy;
use crate::core::policy::PolicyName;
use crate::core::policy::PolicyRegistry;
use crate::core::principal::Principal;
use crate::core::requirement::Requirement;
use crate::interfaces::RequirementHandler;
use crate::runtime::context::AuthorizationContext;
use crate::runtime::handlers::ClaimHandler;
use crate::runtime::handlers::RoleHandler;
use crate::runtime::registry::HandlerRegistry;

// ============================================================================
// SECTION: Build Errors
// ============================================================================

/// Errors raised while building the engine at process initialization.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum EngineBuildError {
    /// Two policies were defined under the same name.
    #[error("duplicate policy name: {name}")]
    DuplicatePolicy {
        /// The conflicting policy name.
        name: PolicyName,
    },
    /// A handler declared no requirement tags and could never be resolved.
    #[error("handler {handler} declares no requirement tags")]
    NoDeclaredTags {
        /// Name of the offending handler.
        handler: String,
    },
}

// ============================================================================
// SECTION: Engine Builder
// ============================================================================

/// Process-start configuration surface for the authorization engine.
///
/// # Invariants
/// - Consumed by `build`; the resulting engine is immutable.
#[derive(Default)]
pub struct AuthorizationEngineBuilder {
    /// Policies defined so far, in definition order.
    policies: Vec<Policy>,
    /// Handlers registered so far, in registration order.
    handlers: Vec<Arc<dyn RequirementHandler>>,
}

impl AuthorizationEngineBuilder {
    /// Creates a builder with the built-in role and claim handlers
    /// pre-registered.
    #[must_use]
    pub fn new() -> Self {
        Self::empty()
            .register_handler(Arc::new(RoleHandler::new()))
            .register_handler(Arc::new(ClaimHandler::new()))
    }

    /// Creates a builder with no handlers at all.
    ///
    /// Requirements without handlers can never succeed; use this only when
    /// every handler, built-ins included, is registered explicitly.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            policies: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Defines a named policy.
    #[must_use]
    pub fn define_policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Registers a handler under every tag it declares.
    ///
    /// Registering the same handler twice yields two invocations per
    /// applicable requirement; no deduplication is performed.
    #[must_use]
    pub fn register_handler(mut self, handler: Arc<dyn RequirementHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Validates the configuration and builds the immutable engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineBuildError`] on duplicate policy names or a handler
    /// that declares no tags.
    pub fn build(self) -> Result<AuthorizationEngine, EngineBuildError> {
        let mut seen = std::collections::BTreeSet::new();
        for policy in &self.policies {
            if !seen.insert(policy.name.clone()) {
                return Err(EngineBuildError::DuplicatePolicy {
                    name: policy.name.clone(),
                });
            }
        }

        let mut registry = HandlerRegistry::new();
        for handler in self.handlers {
            if handler.tags().is_empty() {
                return Err(EngineBuildError::NoDeclaredTags {
                    handler: handler.name().to_string(),
                });
            }
            registry.register(handler);
        }

        Ok(AuthorizationEngine {
            policies: PolicyRegistry::from_policies(self.policies),
            handlers: registry,
        })
    }
}

// ============================================================================
// SECTION: Authorization Engine
// ============================================================================

/// Immutable authorization evaluator shared by all requests.
///
/// # Invariants
/// - Policies and handlers are read-only for the lifetime of the engine.
/// - `evaluate` is infallible; every failure mode folds into the decision.
#[derive(Debug)]
pub struct AuthorizationEngine {
    /// Registered policies.
    policies: PolicyRegistry,
    /// Registered handlers keyed by requirement tag.
    handlers: HandlerRegistry,
}

impl AuthorizationEngine {
    /// Returns a builder with built-in handlers pre-registered.
    #[must_use]
    pub fn builder() -> AuthorizationEngineBuilder {
        AuthorizationEngineBuilder::new()
    }

    /// Returns the registered policies.
    #[must_use]
    pub const fn policies(&self) -> &PolicyRegistry {
        &self.policies
    }

    /// Returns the handler registry.
    #[must_use]
    pub const fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Evaluates the named policy for the principal.
    ///
    /// An unknown policy name yields a failed decision with a configuration
    /// error reason, distinguishable from a requirement failure.
    pub async fn evaluate(
        &self,
        principal: &Principal,
        policy: &PolicyName,
        resource: Option<&Value>,
    ) -> Decision {
        match self.policies.get(policy) {
            Some(found) => {
                self.run(principal, &found.requirements, resource, false)
                    .await
                    .0
            }
            None => Decision::failed(vec![format!(
                "configuration error: unknown policy \"{policy}\""
            )]),
        }
    }

    /// Evaluates an ad-hoc requirement list for the principal.
    pub async fn evaluate_requirements(
        &self,
        principal: &Principal,
        requirements: &[Requirement],
        resource: Option<&Value>,
    ) -> Decision {
        self.run(principal, requirements, resource, false).await.0
    }

    /// Evaluates the named policy and returns per-handler vote traces.
    ///
    /// Tracing never alters the decision; the trace is empty for an unknown
    /// policy.
    pub async fn evaluate_traced(
        &self,
        principal: &Principal,
        policy: &PolicyName,
        resource: Option<&Value>,
    ) -> (Decision, Vec<RequirementTraceEntry>) {
        match self.policies.get(policy) {
            Some(found) => self.run(principal, &found.requirements, resource, true).await,
            None => (
                Decision::failed(vec![format!(
                    "configuration error: unknown policy \"{policy}\""
                )]),
                Vec::new(),
            ),
        }
    }

    /// Runs the requirement/handler loop and assembles the decision.
    async fn run(
        &self,
        principal: &Principal,
        requirements: &[Requirement],
        resource: Option<&Value>,
        record_trace: bool,
    ) -> (Decision, Vec<RequirementTraceEntry>) {
        let mut ctx = AuthorizationContext::new(principal, requirements, resource);
        let mut trace = Vec::new();

        for (index, requirement) in requirements.iter().enumerate() {
            ctx.set_cursor(index);
            let mut votes = Vec::new();

            for handler in self.handlers.handlers_for(requirement) {
                let vote = Self::invoke(handler, &mut ctx, requirement, index).await;
                if record_trace {
                    votes.push(HandlerTraceEntry {
                        handler: handler.name().to_string(),
                        vote,
                    });
                }
            }

            if record_trace {
                trace.push(RequirementTraceEntry {
                    slot: index,
                    requirement: requirement.clone(),
                    handlers: votes,
                    satisfied: ctx.slot_state(index).is_succeeded(),
                });
            }
        }

        (Self::decide(&ctx), trace)
    }

    /// Invokes one handler and derives its vote from the context transition.
    async fn invoke(
        handler: &Arc<dyn RequirementHandler>,
        ctx: &mut AuthorizationContext<'_>,
        requirement: &Requirement,
        index: usize,
    ) -> Vote {
        let was_succeeded = ctx.slot_state(index).is_succeeded();
        let reasons_before = ctx.failure_reasons().len();

        if let Err(fault) = handler.handle(ctx, requirement).await {
            // Fail closed: a faulting handler must never read as an abstain.
            ctx.fail(format!("handler {} fault on {requirement}: {fault}", handler.name()));
            return Vote::Failed;
        }

        if ctx.failure_reasons().len() > reasons_before {
            Vote::Failed
        } else if !was_succeeded && ctx.slot_state(index).is_succeeded() {
            Vote::Succeeded
        } else {
            Vote::Abstained
        }
    }

    /// Folds the context into the final decision.
    ///
    /// Unsatisfied-requirement reasons come first in policy order, followed
    /// by explicit hard-fail reasons in generation order, so diagnostics are
    /// reproducible for identical input.
    fn decide(ctx: &AuthorizationContext<'_>) -> Decision {
        let mut reasons: Vec<String> = ctx
            .pending()
            .map(|(_, requirement)| format!("requirement {requirement} not satisfied"))
            .collect();
        reasons.extend(ctx.failure_reasons().iter().cloned());

        if ctx.has_failed() || !ctx.all_succeeded() {
            Decision::failed(reasons)
        } else {
            Decision::succeeded()
        }
    }
}
