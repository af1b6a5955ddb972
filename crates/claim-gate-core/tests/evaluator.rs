// crates/claim-gate-core/tests/evaluator.rs
// ============================================================================
// Module: Evaluator Tests
// Description: Validate decision assembly, ordering, and failure semantics.
// Purpose: Ensure the engine aggregates handler votes deterministically.
// Dependencies: claim-gate-core, tokio
// ============================================================================

//! Evaluator behavior tests for decision outcomes and diagnostics.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use claim_gate_core::AuthorizationContext;
use claim_gate_core::AuthorizationEngine;
use claim_gate_core::AuthorizationEngineBuilder;
use claim_gate_core::DecisionOutcome;
use claim_gate_core::HandlerError;
use claim_gate_core::Policy;
use claim_gate_core::PolicyName;
use claim_gate_core::Principal;
use claim_gate_core::Requirement;
use claim_gate_core::RequirementHandler;
use claim_gate_core::RequirementTag;
use claim_gate_core::Vote;
use smallvec::SmallVec;
use smallvec::smallvec;
use support::TestResult;
use support::ensure;

// ============================================================================
// SECTION: Test Handlers
// ============================================================================

/// Observe-only handler that counts invocations and always abstains.
#[derive(Clone, Default)]
struct AuditHandler {
    /// Tag the handler registers under.
    tag: String,
    /// Number of invocations observed.
    count: Arc<Mutex<u64>>,
}

impl AuditHandler {
    /// Creates an audit handler for the given tag.
    fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns the number of invocations observed.
    fn invocations(&self) -> u64 {
        self.count.lock().map_or(0, |count| *count)
    }
}

#[async_trait]
impl RequirementHandler for AuditHandler {
    fn name(&self) -> &str {
        "audit-handler"
    }

    fn tags(&self) -> SmallVec<[RequirementTag; 2]> {
        smallvec![RequirementTag::new(self.tag.clone())]
    }

    async fn handle(
        &self,
        _ctx: &mut AuthorizationContext<'_>,
        _requirement: &Requirement,
    ) -> Result<(), HandlerError> {
        let mut guard = self
            .count
            .lock()
            .map_err(|_| HandlerError::Evaluation("audit count lock poisoned".to_string()))?;
        *guard = guard.saturating_add(1);
        Ok(())
    }
}

/// Handler that hard-fails when the principal carries a lockout claim.
struct LockoutHandler;

#[async_trait]
impl RequirementHandler for LockoutHandler {
    fn name(&self) -> &str {
        "lockout-handler"
    }

    fn tags(&self) -> SmallVec<[RequirementTag; 2]> {
        smallvec![RequirementTag::new("role")]
    }

    async fn handle(
        &self,
        ctx: &mut AuthorizationContext<'_>,
        _requirement: &Requirement,
    ) -> Result<(), HandlerError> {
        if ctx.principal().first_claim_value("LockedOut") == Some("true") {
            ctx.fail("account locked out");
        }
        Ok(())
    }
}

/// Handler that always reports an internal fault.
struct FaultyHandler;

#[async_trait]
impl RequirementHandler for FaultyHandler {
    fn name(&self) -> &str {
        "faulty-handler"
    }

    fn tags(&self) -> SmallVec<[RequirementTag; 2]> {
        smallvec![RequirementTag::new("claim")]
    }

    async fn handle(
        &self,
        _ctx: &mut AuthorizationContext<'_>,
        _requirement: &Requirement,
    ) -> Result<(), HandlerError> {
        Err(HandlerError::Evaluation("permission source unreachable".to_string()))
    }
}

/// Resource-aware handler: succeeds when the resource owner matches the
/// principal's `sub` claim, abstains when no resource was supplied.
struct OwnerHandler;

#[async_trait]
impl RequirementHandler for OwnerHandler {
    fn name(&self) -> &str {
        "owner-handler"
    }

    fn tags(&self) -> SmallVec<[RequirementTag; 2]> {
        smallvec![RequirementTag::new("owner")]
    }

    async fn handle(
        &self,
        ctx: &mut AuthorizationContext<'_>,
        _requirement: &Requirement,
    ) -> Result<(), HandlerError> {
        let Some(resource) = ctx.resource() else {
            return Ok(());
        };
        let owner = resource.get("owner").and_then(|value| value.as_str());
        let subject = ctx.principal().first_claim_value("sub");
        if let (Some(owner), Some(subject)) = (owner, subject)
            && owner == subject
        {
            ctx.succeed();
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds an engine with the built-in handlers and the given policies.
fn engine_with(policies: Vec<Policy>) -> TestResult<AuthorizationEngine> {
    let mut builder = AuthorizationEngine::builder();
    for policy in policies {
        builder = builder.define_policy(policy);
    }
    Ok(builder.build()?)
}

// ============================================================================
// SECTION: Empty Policy and Unknown Policy
// ============================================================================

#[tokio::test]
async fn empty_policy_succeeds_for_any_principal() -> TestResult {
    let engine = engine_with(vec![Policy::new("Open", Vec::new())])?;
    let nobody = Principal::new();
    let somebody = Principal::new().with_role("Driver").with_claim("Permission", "X");

    for principal in [&nobody, &somebody] {
        let decision = engine.evaluate(principal, &PolicyName::new("Open"), None).await;
        ensure(decision.is_succeeded(), "empty policy must trivially succeed")?;
        ensure(decision.reasons.is_empty(), "success must carry no reasons")?;
    }
    Ok(())
}

#[tokio::test]
async fn unknown_policy_yields_configuration_error() -> TestResult {
    let engine = engine_with(Vec::new())?;
    let principal = Principal::new().with_role("Admin");

    let decision = engine.evaluate(&principal, &PolicyName::new("NoSuchPolicy"), None).await;
    ensure(decision.is_failed(), "unknown policy must fail")?;
    ensure(decision.reasons.len() == 1, "expected exactly one reason")?;
    ensure(
        decision.reasons[0] == "configuration error: unknown policy \"NoSuchPolicy\"",
        format!("unexpected reason: {}", decision.reasons[0]),
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Reason Assembly
// ============================================================================

#[tokio::test]
async fn admin_only_denies_driver_with_exact_reason() -> TestResult {
    let engine =
        engine_with(vec![Policy::new("AdminOnly", vec![Requirement::role(["Admin"])])])?;
    let principal = Principal::new().with_role("Driver");

    let decision = engine.evaluate(&principal, &PolicyName::new("AdminOnly"), None).await;
    ensure(decision.is_failed(), "driver must not pass AdminOnly")?;
    ensure(
        decision.reasons == vec!["requirement RoleRequirement not satisfied".to_string()],
        format!("unexpected reasons: {:?}", decision.reasons),
    )?;
    Ok(())
}

#[tokio::test]
async fn two_unsatisfied_requirements_yield_two_reasons_in_policy_order() -> TestResult {
    let engine = engine_with(vec![Policy::new(
        "Both",
        vec![
            Requirement::role(["Admin"]),
            Requirement::claim("Permission", ["ManageOrders"]),
        ],
    )])?;
    let principal = Principal::new().with_role("Driver").with_claim("Permission", "ViewOrders");

    let decision = engine.evaluate(&principal, &PolicyName::new("Both"), None).await;
    ensure(decision.is_failed(), "principal satisfies neither requirement")?;
    ensure(
        decision.reasons
            == vec![
                "requirement RoleRequirement not satisfied".to_string(),
                "requirement ClaimRequirement not satisfied".to_string(),
            ],
        format!("unexpected reasons: {:?}", decision.reasons),
    )?;
    Ok(())
}

#[tokio::test]
async fn duplicate_requirements_are_independent_slots() -> TestResult {
    let engine = engine_with(vec![Policy::new(
        "Doubled",
        vec![Requirement::role(["Admin"]), Requirement::role(["Admin"])],
    )])?;
    let principal = Principal::new();

    let decision = engine.evaluate(&principal, &PolicyName::new("Doubled"), None).await;
    ensure(decision.reasons.len() == 2, "each duplicate slot must report separately")?;
    Ok(())
}

// ============================================================================
// SECTION: Hard Fail Semantics
// ============================================================================

#[tokio::test]
async fn hard_fail_short_circuits_outcome_but_not_execution() -> TestResult {
    let audit = AuditHandler::new("role");
    let engine = AuthorizationEngine::builder()
        .define_policy(Policy::new(
            "Gated",
            vec![Requirement::role(["Admin"]), Requirement::role(["Admin"])],
        ))
        .register_handler(Arc::new(LockoutHandler))
        .register_handler(Arc::new(audit.clone()))
        .build()?;
    let principal = Principal::new().with_role("Admin").with_claim("LockedOut", "true");

    let decision = engine.evaluate(&principal, &PolicyName::new("Gated"), None).await;
    ensure(decision.is_failed(), "lockout must veto an otherwise satisfied policy")?;
    ensure(
        decision.reasons == vec!["account locked out".to_string(), "account locked out".to_string()],
        format!("unexpected reasons: {:?}", decision.reasons),
    )?;
    // Every handler still observed both requirement slots after the veto.
    ensure(audit.invocations() == 2, "audit handler must run for every slot")?;
    Ok(())
}

#[tokio::test]
async fn handler_fault_fails_closed() -> TestResult {
    let engine = AuthorizationEngine::builder()
        .define_policy(Policy::new(
            "Mixed",
            vec![Requirement::role(["Admin"]), Requirement::claim("Permission", ["X"])],
        ))
        .register_handler(Arc::new(FaultyHandler))
        .build()?;
    let principal = Principal::new().with_role("Admin").with_claim("Permission", "X");

    let decision = engine.evaluate(&principal, &PolicyName::new("Mixed"), None).await;
    ensure(decision.is_failed(), "a faulting handler must not fail open")?;
    ensure(
        decision.reasons.iter().any(|reason| {
            reason.contains("faulty-handler") && reason.contains("permission source unreachable")
        }),
        format!("fault reason missing: {:?}", decision.reasons),
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Handler Ordering and Duplication
// ============================================================================

#[tokio::test]
async fn registration_order_does_not_change_outcome() -> TestResult {
    let policy = Policy::new("AdminOnly", vec![Requirement::role(["Admin"])]);
    let principal = Principal::new().with_role("Admin");

    let first = AuthorizationEngineBuilder::empty()
        .define_policy(policy.clone())
        .register_handler(Arc::new(claim_gate_core::RoleHandler::new()))
        .register_handler(Arc::new(AuditHandler::new("role")))
        .build()?;
    let second = AuthorizationEngineBuilder::empty()
        .define_policy(policy)
        .register_handler(Arc::new(AuditHandler::new("role")))
        .register_handler(Arc::new(claim_gate_core::RoleHandler::new()))
        .build()?;

    let name = PolicyName::new("AdminOnly");
    let outcome_first = first.evaluate(&principal, &name, None).await.outcome;
    let outcome_second = second.evaluate(&principal, &name, None).await.outcome;
    ensure(outcome_first == outcome_second, "outcome must be order-invariant")?;
    ensure(outcome_first == DecisionOutcome::Succeeded, "admin must pass AdminOnly")?;
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_yields_two_invocations() -> TestResult {
    let audit = AuditHandler::new("role");
    let shared: Arc<dyn RequirementHandler> = Arc::new(audit.clone());
    let engine = AuthorizationEngine::builder()
        .define_policy(Policy::new("AdminOnly", vec![Requirement::role(["Admin"])]))
        .register_handler(Arc::clone(&shared))
        .register_handler(shared)
        .build()?;
    let principal = Principal::new().with_role("Admin");

    let decision = engine.evaluate(&principal, &PolicyName::new("AdminOnly"), None).await;
    ensure(decision.is_succeeded(), "duplicate audit registration must not affect outcome")?;
    ensure(audit.invocations() == 2, "handler registered twice must run twice")?;
    Ok(())
}

#[tokio::test]
async fn zero_handlers_is_permanent_failure_not_an_error() -> TestResult {
    let engine = AuthorizationEngineBuilder::empty()
        .define_policy(Policy::new("AdminOnly", vec![Requirement::role(["Admin"])]))
        .build()?;
    let principal = Principal::new().with_role("Admin");

    let decision = engine.evaluate(&principal, &PolicyName::new("AdminOnly"), None).await;
    ensure(decision.is_failed(), "a requirement with no handlers can never succeed")?;
    ensure(
        decision.reasons == vec!["requirement RoleRequirement not satisfied".to_string()],
        format!("unexpected reasons: {:?}", decision.reasons),
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Idempotence and Ad-hoc Requirements
// ============================================================================

#[tokio::test]
async fn evaluation_is_idempotent_for_identical_input() -> TestResult {
    let engine = engine_with(vec![Policy::new(
        "ManageOrders",
        vec![Requirement::claim("Permission", ["ManageOrders"])],
    )])?;
    let principal = Principal::new().with_claim("Permission", "ManageOrders");
    let name = PolicyName::new("ManageOrders");

    let first = engine.evaluate(&principal, &name, None).await;
    let second = engine.evaluate(&principal, &name, None).await;
    ensure(first == second, "identical input must yield identical decisions")?;
    ensure(first.is_succeeded(), "matching claim must satisfy the policy")?;
    Ok(())
}

#[tokio::test]
async fn ad_hoc_requirement_list_evaluates_without_a_policy() -> TestResult {
    let engine = engine_with(Vec::new())?;
    let principal = Principal::new().with_role("Admin");

    let decision = engine
        .evaluate_requirements(&principal, &[Requirement::role(["Admin"])], None)
        .await;
    ensure(decision.is_succeeded(), "ad-hoc requirement list must evaluate")?;
    Ok(())
}

// ============================================================================
// SECTION: Resource-Scoped Requirements
// ============================================================================

#[tokio::test]
async fn resource_aware_handler_abstains_without_a_resource() -> TestResult {
    let engine = AuthorizationEngine::builder()
        .define_policy(Policy::new(
            "OwnerOnly",
            vec![Requirement::custom("owner", serde_json::json!({}))],
        ))
        .register_handler(Arc::new(OwnerHandler))
        .build()?;
    let principal = Principal::new().with_claim("sub", "user-1");
    let name = PolicyName::new("OwnerOnly");

    let absent = engine.evaluate(&principal, &name, None).await;
    ensure(absent.is_failed(), "absent resource must abstain into failure, not crash")?;

    let owned = serde_json::json!({"owner": "user-1"});
    let present = engine.evaluate(&principal, &name, Some(&owned)).await;
    ensure(present.is_succeeded(), "matching owner must satisfy the requirement")?;

    let foreign = serde_json::json!({"owner": "user-2"});
    let denied = engine.evaluate(&principal, &name, Some(&foreign)).await;
    ensure(denied.is_failed(), "foreign owner must not satisfy the requirement")?;
    Ok(())
}

// ============================================================================
// SECTION: Traced Evaluation
// ============================================================================

#[tokio::test]
async fn traced_evaluation_matches_untraced_decision() -> TestResult {
    let audit = AuditHandler::new("role");
    let engine = AuthorizationEngine::builder()
        .define_policy(Policy::new("AdminOnly", vec![Requirement::role(["Admin"])]))
        .register_handler(Arc::new(audit))
        .build()?;
    let principal = Principal::new().with_role("Admin");
    let name = PolicyName::new("AdminOnly");

    let plain = engine.evaluate(&principal, &name, None).await;
    let (traced, trace) = engine.evaluate_traced(&principal, &name, None).await;
    ensure(plain == traced, "tracing must not alter the decision")?;

    ensure(trace.len() == 1, "expected one requirement trace entry")?;
    ensure(trace[0].slot == 0, "trace slot index must match policy order")?;
    ensure(trace[0].satisfied, "traced slot must be satisfied")?;
    let votes: Vec<Vote> = trace[0].handlers.iter().map(|entry| entry.vote).collect();
    ensure(
        votes == vec![Vote::Succeeded, Vote::Abstained],
        format!("unexpected votes: {votes:?}"),
    )?;
    ensure(
        trace[0].handlers[0].handler == "role-handler",
        "first vote must come from the built-in role handler",
    )?;
    Ok(())
}

#[tokio::test]
async fn traced_evaluation_reports_hard_fail_votes() -> TestResult {
    let engine = AuthorizationEngine::builder()
        .define_policy(Policy::new("Gated", vec![Requirement::role(["Admin"])]))
        .register_handler(Arc::new(LockoutHandler))
        .build()?;
    let principal = Principal::new().with_role("Admin").with_claim("LockedOut", "true");

    let (decision, trace) =
        engine.evaluate_traced(&principal, &PolicyName::new("Gated"), None).await;
    ensure(decision.is_failed(), "lockout must fail the evaluation")?;
    ensure(trace.len() == 1, "expected one requirement trace entry")?;
    let votes: Vec<Vote> = trace[0].handlers.iter().map(|entry| entry.vote).collect();
    ensure(
        votes == vec![Vote::Succeeded, Vote::Failed],
        format!("unexpected votes: {votes:?}"),
    )?;
    ensure(trace[0].satisfied, "role slot itself was satisfied before the veto")?;
    Ok(())
}
