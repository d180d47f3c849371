//! Complexity classification of task descriptions.
//!
//! Scoring walks a static, ordered table of weighted categories. Each
//! category counts distinct keyword patterns matched in the lower-cased
//! input (word-boundary matches only) and contributes
//! `min(matches, cap) * weight` to the raw score. When two or more
//! specialist-domain categories match at once, a compound multiplier is
//! applied before clamping: a task spanning security *and* performance is
//! qualitatively harder than either alone, not just additively so.
//!
//! `classify` is a pure function with no shared mutable state; concurrent
//! invocation is safe.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Multiplier applied when two or more specialist domains match.
pub const COMPOUND_MULTIPLIER: f64 = 1.35;

/// One row of the scoring table.
struct ScoringCategory {
    name: &'static str,
    patterns: &'static [&'static str],
    weight: f64,
    cap: u32,
    /// Specialist domains count toward `domain_count` and the compound rule.
    specialist: bool,
    /// Agent capability this category maps to, for direct routing.
    capability: Option<&'static str>,
}

/// The scoring table. Order is fixed; weights are calibrated against the
/// routing thresholds (0.2 and 0.75), so changes here need the boundary
/// tests re-checked.
static CATEGORIES: &[ScoringCategory] = &[
    ScoringCategory {
        name: "simple-read",
        patterns: &["read", "show", "display", "print", "config"],
        weight: 0.05,
        cap: 2,
        specialist: false,
        capability: Some("config-reader"),
    },
    ScoringCategory {
        name: "development",
        patterns: &[
            "implement", "build", "refactor", "feature", "component", "api", "endpoint", "bugfix",
        ],
        weight: 0.1,
        cap: 3,
        specialist: false,
        capability: None,
    },
    ScoringCategory {
        name: "security",
        patterns: &[
            "security", "audit", "compliance", "vulnerability", "penetration", "threat model",
        ],
        weight: 0.2,
        cap: 3,
        specialist: true,
        capability: None,
    },
    ScoringCategory {
        name: "performance",
        patterns: &[
            "performance", "optimize", "latency", "throughput", "profiling", "bottleneck",
        ],
        weight: 0.15,
        cap: 3,
        specialist: true,
        capability: None,
    },
    ScoringCategory {
        name: "architecture",
        patterns: &[
            "architecture", "microservice", "system design", "scalability", "distributed",
        ],
        weight: 0.15,
        cap: 3,
        specialist: true,
        capability: None,
    },
    ScoringCategory {
        name: "legacy-migration",
        patterns: &["legacy", "migration", "migrate", "modernize", "modernization"],
        weight: 0.15,
        cap: 3,
        specialist: true,
        capability: None,
    },
    ScoringCategory {
        name: "infrastructure",
        patterns: &[
            "infrastructure", "kubernetes", "terraform", "observability", "deployment pipeline",
        ],
        weight: 0.15,
        cap: 3,
        specialist: true,
        capability: None,
    },
    ScoringCategory {
        name: "enterprise-scale",
        patterns: &[
            "comprehensive", "enterprise", "organization-wide", "end-to-end", "multi-team",
        ],
        weight: 0.15,
        cap: 2,
        specialist: false,
        capability: None,
    },
];

/// Word-boundary regexes, one per pattern, compiled once.
static PATTERN_REGEXES: LazyLock<Vec<Vec<Regex>>> = LazyLock::new(|| {
    CATEGORIES
        .iter()
        .map(|category| {
            category
                .patterns
                .iter()
                .map(|p| {
                    Regex::new(&format!(r"\b{}\b", regex::escape(p)))
                        .expect("static pattern compiles")
                })
                .collect()
        })
        .collect()
});

/// Complexity score derived purely from input text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityScore {
    /// Normalized score in `[0, 1]`.
    pub raw_score: f64,

    /// Names of categories with at least one pattern match.
    pub matched_categories: Vec<String>,

    /// Number of specialist-domain categories matched.
    pub domain_count: usize,

    /// Agent capabilities the matched categories map to.
    pub matched_capabilities: Vec<String>,
}

/// Score a free-text task description.
pub fn classify(text: &str) -> ComplexityScore {
    let lowered = text.to_lowercase();

    let mut total = 0.0;
    let mut matched_categories = Vec::new();
    let mut matched_capabilities = Vec::new();
    let mut domain_count = 0;

    for (category, regexes) in CATEGORIES.iter().zip(PATTERN_REGEXES.iter()) {
        let matches = regexes.iter().filter(|re| re.is_match(&lowered)).count() as u32;
        if matches == 0 {
            continue;
        }

        total += f64::from(matches.min(category.cap)) * category.weight;
        matched_categories.push(category.name.to_string());
        if category.specialist {
            domain_count += 1;
        }
        if let Some(capability) = category.capability {
            matched_capabilities.push(capability.to_string());
        }
    }

    if domain_count >= 2 {
        total *= COMPOUND_MULTIPLIER;
    }

    ComplexityScore {
        raw_score: total.min(1.0),
        matched_categories,
        domain_count,
        matched_capabilities,
    }
}
