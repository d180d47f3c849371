//! Complexity classification and routing of task descriptions.

mod classifier;
mod decider;


pub use classifier::{COMPOUND_MULTIPLIER, ComplexityScore, classify};
pub use decider::{
    ADVANCED_COORDINATOR, ADVANCED_DOMAIN_COUNT, ADVANCED_THRESHOLD, DEFAULT_DIRECT_TARGET,
    DIRECT_THRESHOLD, RoutingDecision, RoutingTier, STANDARD_COORDINATOR, decide,
};

use crate::registry::AgentRegistry;

/// Classify a task description and decide its routing in one step.
pub fn route(text: &str, registry: &AgentRegistry) -> (ComplexityScore, RoutingDecision) {
    let score = classify(text);
    let decision = decide(&score, registry);
    (score, decision)
}
