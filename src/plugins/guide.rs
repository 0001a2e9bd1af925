//! Quick Agent Reference Guide generation and template splicing.

use crate::core::config::Workspace;
use crate::core::error::AgentCheckError;
use crate::core::store::{self, AgentStore};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::sync::LazyLock;
use tracing::info;

pub const GUIDE_HEADER: &str = "### Quick Agent Reference Guide\n";
const DISCOVERY_HEADER: &str = "### Agent Discovery Process\n";
pub const FALLBACK_CATEGORY: &str = "Specialized Tools";

/// Categories in output order with the slug substrings that select them.
/// First matching category wins.
pub const CATEGORIES: &[(&str, &[&str])] = &[
    ("Orchestration & Management", &["orchestrator", "uber-", "swarm-scaler", "workflow-architect"]),
    ("Project Initiation & Planning", &["project-initiator", "idea-generation", "idea-refinement", "task-planning", "task-deep-manager", "task-sync"]),
    ("Requirements & Analysis", &["nlu-processor", "elicitation", "market-research", "compliance-scope", "prd-architect"]),
    ("Development & Technical", &["coding", "system-architect", "devops", "tech-spec", "algorithmic-problem-solver", "code-reviewer", "mcp-configuration", "mcp-researcher"]),
    ("Testing & Quality", &["test-", "functional-tester", "exploratory-tester", "performance-load-tester", "visual-regression-testing", "uat-coordinator", "lead-testing", "compliance-testing", "security-penetration-tester", "usability-heuristic"]),
    ("Design & User Experience", &["ui-designer", "ux-researcher", "design-", "prototyping", "branding", "graphic-design"]),
    ("Content & Communication", &["content-strategy", "documentation", "scribe", "user-feedback-collector", "video-production"]),
    ("Data & Analytics", &["analytics-setup", "brainjs-ml", "knowledge-evolution", "deep-research"]),
    ("Business & Strategy", &["growth-hacking-idea", "campaign-manager", "marketing-strategy", "seo-sem", "social-media-setup", "community-strategy", "technology-advisor"]),
    ("Security & Compliance", &["security-auditor", "ethical-review", "compliance-testing"]),
    ("Operations & Monitoring", &["health-monitor", "remediation", "root-cause-analysis", "incident-learning", "efficiency-optimization", "adaptive-deployment-strategist"]),
    (FALLBACK_CATEGORY, &["debugger", "core-concept"]),
];

static NEXT_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"### [A-Z]|\n## [A-Z]").expect("static regex"));

static NEXT_SUBHEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n### [A-Z]").expect("static regex"));

pub fn categorize(slug: &str) -> &'static str {
    CATEGORIES
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| slug.contains(p)))
        .map(|(name, _)| *name)
        .unwrap_or(FALLBACK_CATEGORY)
}

/// First sentence of `roleDefinition`, else `name`, else empty.
fn short_description(doc: &Value) -> String {
    let Some(mode) = store::first_mode(doc) else {
        return String::new();
    };
    match mode.get("roleDefinition").and_then(Value::as_str) {
        Some(role) if !role.is_empty() => role.split('.').next().unwrap_or("").to_string(),
        _ => mode
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    }
}

/// `(category, sorted entries)` for every category, in output order.
pub fn categorized_entries(agent_store: &AgentStore) -> Vec<(&'static str, Vec<String>)> {
    let mut groups: Vec<(&'static str, Vec<String>)> =
        CATEGORIES.iter().map(|(name, _)| (*name, Vec::new())).collect();
    for path in agent_store.list_files() {
        let Some(slug) = store::storage_key(&path) else {
            continue;
        };
        let description = store::load_document(&path)
            .map(|doc| short_description(&doc))
            .unwrap_or_default();
        let category = categorize(&slug);
        if let Some((_, entries)) = groups.iter_mut().find(|(name, _)| *name == category) {
            entries.push(format!("`@{slug}` - {description}"));
        }
    }
    for (_, entries) in groups.iter_mut() {
        entries.sort();
    }
    groups
}

pub fn render_guide(groups: &[(&str, Vec<String>)]) -> String {
    let total: usize = groups.iter().map(|(_, entries)| entries.len()).sum();
    let mut out = format!("{GUIDE_HEADER}\n**Total Agents Available: {total}**\n\n");
    for (category, entries) in groups.iter().filter(|(_, e)| !e.is_empty()) {
        out.push_str(&format!("**{category}:**\n"));
        for entry in entries {
            out.push_str(&format!("- {entry}\n"));
        }
        out.push('\n');
    }
    out
}

/// Put `guide` into `content`.
///
/// An existing guide section is replaced up to the next heading (or the end
/// of the document). Otherwise the guide goes after the discovery section,
/// and failing that it is appended.
pub fn splice_guide(content: &str, guide: &str) -> String {
    if let Some(start) = content.find(GUIDE_HEADER) {
        let body_start = start + GUIDE_HEADER.len();
        let end = NEXT_HEADING
            .find_at(content, body_start)
            .map(|m| m.start())
            .unwrap_or(content.len());
        return format!("{}{}{}", &content[..start], guide, &content[end..]);
    }
    if let Some(start) = content.find(DISCOVERY_HEADER) {
        let body_start = start + DISCOVERY_HEADER.len();
        if let Some(m) = NEXT_SUBHEADING.find_at(content, body_start) {
            let newline = m.start();
            return format!(
                "{}\n\n{}{}",
                &content[..newline],
                guide,
                &content[newline + 1..]
            );
        }
    }
    format!("{content}\n\n{guide}")
}

/// Rewrite the template with a fresh guide; returns the agent count.
pub fn update_template(ws: &Workspace) -> Result<usize, AgentCheckError> {
    if !ws.template_file.is_file() {
        return Err(AgentCheckError::NotFound(format!(
            "template file {}",
            ws.template_file.display()
        )));
    }
    let content = fs::read_to_string(&ws.template_file)?;
    let groups = categorized_entries(&AgentStore::new(&ws.agents_dir));
    let total: usize = groups.iter().map(|(_, e)| e.len()).sum();
    let categories = groups.iter().filter(|(_, e)| !e.is_empty()).count();
    let updated = splice_guide(&content, &render_guide(&groups));
    fs::write(&ws.template_file, updated)?;
    info!(
        file = %ws.template_file.display(),
        total,
        categories,
        "updated agent reference guide"
    );
    Ok(total)
}
