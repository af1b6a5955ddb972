// demos/minimal/src/main.rs
// ============================================================================
// Module: Claim Gate Minimal Demo
// Description: Minimal end-to-end authorization run with a custom handler.
// Purpose: Demonstrate policy definition, handler registration, and evaluation.
// Dependencies: claim-gate-core
// ============================================================================

//! ## Overview
//! Defines one policy mixing built-in and custom requirements, registers a
//! custom handler for a minimum-experience check, and evaluates two
//! principals against it.

use std::sync::Arc;

use async_trait::async_trait;
use claim_gate_core::AuthorizationContext;
use claim_gate_core::AuthorizationEngine;
use claim_gate_core::HandlerError;
use claim_gate_core::Policy;
use claim_gate_core::PolicyName;
use claim_gate_core::Principal;
use claim_gate_core::Requirement;
use claim_gate_core::RequirementHandler;
use claim_gate_core::RequirementTag;
use serde_json::json;
use smallvec::SmallVec;
use smallvec::smallvec;

/// Error type for demo postconditions.
#[derive(Debug)]
struct DemoError(&'static str);

impl std::fmt::Display for DemoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for DemoError {}

/// Tag for the minimum-experience requirement kind.
const EXPERIENCE_TAG: &str = "minimum_experience";

/// Succeeds when the principal's `Experience` claim parses to at least the
/// `min_years` parameter; abstains on missing or malformed data.
#[derive(Debug, Clone, Copy, Default)]
struct MinimumExperienceHandler;

#[async_trait]
impl RequirementHandler for MinimumExperienceHandler {
    fn name(&self) -> &str {
        "minimum_experience"
    }

    fn tags(&self) -> SmallVec<[RequirementTag; 2]> {
        smallvec![RequirementTag::new(EXPERIENCE_TAG)]
    }

    async fn handle(
        &self,
        ctx: &mut AuthorizationContext<'_>,
        requirement: &Requirement,
    ) -> Result<(), HandlerError> {
        let Requirement::Custom(custom) = requirement else {
            return Ok(());
        };
        let Some(min_years) = custom.params.get("min_years").and_then(serde_json::Value::as_u64)
        else {
            return Ok(());
        };
        let meets_minimum = ctx
            .principal()
            .claim_values("Experience")
            .filter_map(|value| value.parse::<u64>().ok())
            .any(|years| years >= min_years);
        if meets_minimum {
            ctx.succeed();
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let policy = Policy::new(
        "SeniorDriver",
        vec![
            Requirement::role(["Driver"]),
            Requirement::claim("Permission", ["OperateHeavyMachinery"]),
            Requirement::custom(EXPERIENCE_TAG, json!({ "min_years": 5 })),
        ],
    );
    let engine = AuthorizationEngine::builder()
        .define_policy(policy)
        .register_handler(Arc::new(MinimumExperienceHandler))
        .build()?;

    let veteran = Principal::new()
        .with_role("Driver")
        .with_claim("Permission", "OperateHeavyMachinery")
        .with_claim("Experience", "9");
    let granted = engine.evaluate(&veteran, &PolicyName::new("SeniorDriver"), None).await;
    if !granted.is_succeeded() {
        return Err(Box::new(DemoError("veteran driver must be granted")) as Box<dyn std::error::Error>);
    }

    let trainee = Principal::new().with_role("Driver").with_claim("Experience", "1");
    let denied = engine.evaluate(&trainee, &PolicyName::new("SeniorDriver"), None).await;
    if !denied.is_failed() || denied.reasons.len() != 2 {
        return Err(Box::new(DemoError("trainee must be denied with two reasons")) as Box<dyn std::error::Error>);
    }

    Ok(())
}
