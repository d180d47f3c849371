//! Routing decisions.
//!
//! The tier transition is a pure function of the complexity score, with the
//! most-specific guard evaluated first so the high-complexity case can never
//! be shadowed by a broader one:
//!
//! 1. `raw_score < 0.2` and exactly one matched capability whose agent
//!    exists → direct.
//! 2. `raw_score >= 0.75` or `domain_count >= 4` → advanced coordinator.
//! 3. Otherwise → standard coordinator.
//!
//! The threshold bounds are exact (`>=`, not `>`). An unavailable
//! coordinator degrades the decision to the next-lower tier with the
//! degradation recorded in the rationale; unavailability alone never fails
//! a request.

use crate::registry::AgentRegistry;
use serde::Serialize;
use std::fmt;

use super::classifier::ComplexityScore;

/// Score below which a single-capability task is handled directly.
pub const DIRECT_THRESHOLD: f64 = 0.2;

/// Score at or above which the advanced coordinator takes over.
pub const ADVANCED_THRESHOLD: f64 = 0.75;

/// Specialist-domain count at or above which the advanced coordinator
/// takes over regardless of score.
pub const ADVANCED_DOMAIN_COUNT: usize = 4;

/// Coordinator for standard multi-agent tasks.
pub const STANDARD_COORDINATOR: &str = "orchestrate-agents";

/// Coordinator for enterprise cross-domain tasks.
pub const ADVANCED_COORDINATOR: &str = "orchestrate-agents-adv";

/// Safe default direct target when no coordinator is available.
pub const DEFAULT_DIRECT_TARGET: &str = "orchestrate-tasks";

/// Routing tier, in increasing coordination complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingTier {
    Direct,
    Standard,
    Advanced,
}

impl fmt::Display for RoutingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingTier::Direct => write!(f, "direct"),
            RoutingTier::Standard => write!(f, "standard"),
            RoutingTier::Advanced => write!(f, "advanced"),
        }
    }
}

/// A routing decision: tier, concrete handoff target, and the reasons.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub tier: RoutingTier,
    pub target: String,
    pub rationale: Vec<String>,
}

/// Map a complexity score onto a tier and target, given agent availability.
pub fn decide(score: &ComplexityScore, registry: &AgentRegistry) -> RoutingDecision {
    let mut rationale = vec![format!(
        "score {:.3}, {} specialist domain(s), matched: [{}]",
        score.raw_score,
        score.domain_count,
        score.matched_categories.join(", ")
    )];

    if score.raw_score < DIRECT_THRESHOLD
        && let [capability] = score.matched_capabilities.as_slice()
        && registry.contains(capability)
    {
        rationale.push(format!(
            "low complexity maps to single capability '{}'",
            capability
        ));
        return RoutingDecision {
            tier: RoutingTier::Direct,
            target: capability.clone(),
            rationale,
        };
    }

    if score.raw_score >= ADVANCED_THRESHOLD || score.domain_count >= ADVANCED_DOMAIN_COUNT {
        if score.raw_score >= ADVANCED_THRESHOLD {
            rationale.push(format!(
                "score {:.3} >= {}",
                score.raw_score, ADVANCED_THRESHOLD
            ));
        } else {
            rationale.push(format!(
                "{} specialist domains >= {}",
                score.domain_count, ADVANCED_DOMAIN_COUNT
            ));
        }
        return coordinator_or_degrade(RoutingTier::Advanced, registry, rationale);
    }

    rationale.push("mid-range complexity".to_string());
    coordinator_or_degrade(RoutingTier::Standard, registry, rationale)
}

/// Hand off to the coordinator for `tier`, degrading tier by tier when a
/// coordinator's agent is missing from the registry.
fn coordinator_or_degrade(
    tier: RoutingTier,
    registry: &AgentRegistry,
    mut rationale: Vec<String>,
) -> RoutingDecision {
    if tier == RoutingTier::Advanced {
        if registry.contains(ADVANCED_COORDINATOR) {
            return RoutingDecision {
                tier: RoutingTier::Advanced,
                target: ADVANCED_COORDINATOR.to_string(),
                rationale,
            };
        }
        rationale.push(format!(
            "'{}' unavailable; degrading to standard tier",
            ADVANCED_COORDINATOR
        ));
    }

    if registry.contains(STANDARD_COORDINATOR) {
        return RoutingDecision {
            tier: RoutingTier::Standard,
            target: STANDARD_COORDINATOR.to_string(),
            rationale,
        };
    }

    rationale.push(format!(
        "'{}' unavailable; falling back to direct target '{}'",
        STANDARD_COORDINATOR, DEFAULT_DIRECT_TARGET
    ));
    RoutingDecision {
        tier: RoutingTier::Direct,
        target: DEFAULT_DIRECT_TARGET.to_string(),
        rationale,
    }
}
