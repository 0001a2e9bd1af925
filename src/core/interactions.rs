//! Default collaborator sets keyed by agent role.
//!
//! Used to populate an empty `interactsWith` list. Suggestions are filtered
//! against the store so a record never gains a reference to a missing agent.

use crate::core::store::SlugIndex;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

const INTERACTION_PATTERNS: &[(&str, &[&str])] = &[
    // orchestration
    ("uber-orchestrator-agent", &["task-planning-agent", "development-orchestrator-agent", "marketing-strategy-orchestrator"]),
    ("task-deep-manager-agent", &["task-planning-agent", "uber-orchestrator-agent", "development-orchestrator-agent"]),
    ("task-sync-agent", &["task-planning-agent", "uber-orchestrator-agent", "task-deep-manager-agent"]),
    // planning
    ("task-planning-agent", &["uber-orchestrator-agent", "prd-architect-agent", "development-orchestrator-agent"]),
    ("prd-architect-agent", &["task-planning-agent", "system-architect-agent", "tech-spec-agent"]),
    ("system-architect-agent", &["prd-architect-agent", "tech-spec-agent", "coding-agent"]),
    // development
    ("development-orchestrator-agent", &["coding-agent", "code-reviewer-agent", "test-orchestrator-agent"]),
    ("coding-agent", &["development-orchestrator-agent", "code-reviewer-agent", "tech-spec-agent"]),
    ("code-reviewer-agent", &["coding-agent", "development-orchestrator-agent", "test-orchestrator-agent"]),
    // testing
    ("test-orchestrator-agent", &["development-orchestrator-agent", "functional-tester-agent", "test-case-generator-agent"]),
    ("functional-tester-agent", &["test-orchestrator-agent", "test-case-generator-agent", "exploratory-tester-agent"]),
    ("test-case-generator-agent", &["test-orchestrator-agent", "functional-tester-agent", "coding-agent"]),
    // design
    ("ui-designer-agent", &["design-system-agent", "ux-researcher-agent", "prototyping-agent"]),
    ("ux-researcher-agent", &["ui-designer-agent", "design-system-agent", "usability-heuristic-agent"]),
    ("design-system-agent", &["ui-designer-agent", "branding-agent", "prototyping-agent"]),
    // research
    ("market-research-agent", &["idea-generation-agent", "technology-advisor-agent", "marketing-strategy-orchestrator"]),
    ("technology-advisor-agent", &["system-architect-agent", "market-research-agent", "mcp-researcher-agent"]),
    ("mcp-researcher-agent", &["technology-advisor-agent", "mcp-configuration-agent", "coding-agent"]),
    // marketing
    ("marketing-strategy-orchestrator", &["campaign-manager-agent", "content-strategy-agent", "growth-hacking-idea-agent"]),
    ("campaign-manager-agent", &["marketing-strategy-orchestrator", "content-strategy-agent", "social-media-setup-agent"]),
    ("content-strategy-agent", &["campaign-manager-agent", "graphic-design-agent", "seo-sem-agent"]),
    // quality and compliance
    ("design-qa-analyst", &["ui-designer-agent", "ux-researcher-agent", "compliance-testing-agent"]),
    ("security-auditor-agent", &["security-penetration-tester-agent", "compliance-testing-agent", "system-architect-agent"]),
    ("compliance-testing-agent", &["security-auditor-agent", "test-orchestrator-agent", "compliance-scope-agent"]),
    // deployment and operations
    ("devops-agent", &["adaptive-deployment-strategist-agent", "development-orchestrator-agent", "security-auditor-agent"]),
    ("adaptive-deployment-strategist-agent", &["devops-agent", "health-monitor-agent", "efficiency-optimization-agent"]),
    ("health-monitor-agent", &["adaptive-deployment-strategist-agent", "root-cause-analysis-agent", "incident-learning-agent"]),
    // documentation and knowledge
    ("documentation-agent", &["coding-agent", "tech-spec-agent", "knowledge-evolution-agent"]),
    ("knowledge-evolution-agent", &["documentation-agent", "incident-learning-agent", "efficiency-optimization-agent"]),
    // feedback
    ("user-feedback-collector-agent", &["ux-researcher-agent", "usability-heuristic-agent", "analytics-setup-agent"]),
    ("usability-heuristic-agent", &["user-feedback-collector-agent", "ux-researcher-agent", "design-qa-analyst"]),
    // analytics
    ("analytics-setup-agent", &["user-feedback-collector-agent", "seo-sem-agent", "efficiency-optimization-agent"]),
    ("efficiency-optimization-agent", &["analytics-setup-agent", "health-monitor-agent", "knowledge-evolution-agent"]),
    // intake
    ("elicitation-agent", &["nlu-processor-agent", "compliance-scope-agent", "idea-generation-agent"]),
    ("nlu-processor-agent", &["elicitation-agent", "uber-orchestrator-agent", "idea-generation-agent"]),
    ("compliance-scope-agent", &["elicitation-agent", "compliance-testing-agent", "security-auditor-agent"]),
];

static PATTERNS: LazyLock<FxHashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| INTERACTION_PATTERNS.iter().copied().collect());

/// Raw table entry for a role, unfiltered.
pub fn default_collaborators(slug: &str) -> Option<&'static [&'static str]> {
    PATTERNS.get(slug).copied()
}

/// Table suggestions for `slug` that exist in `index`, in table order.
/// Empty when the role is unknown or nothing survives filtering.
pub fn suggest(slug: &str, index: &dyn SlugIndex) -> Vec<String> {
    default_collaborators(slug)
        .unwrap_or_default()
        .iter()
        .filter(|candidate| index.contains(candidate))
        .map(|candidate| candidate.to_string())
        .collect()
}
