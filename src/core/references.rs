//! Static remapping tables for `connectivity.interactsWith` entries.
//!
//! Two process-wide tables: known-bad names with a canonical replacement, and
//! names that never correspond to an agent and are dropped outright. A name in
//! both tables is remapped.

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use std::sync::LazyLock;

const REFERENCE_MAPPINGS: &[(&str, &str)] = &[
    // PascalCase
    ("MarketingStrategyOrchestrator", "marketing-strategy-orchestrator"),
    ("DesignQAAnalyst", "design-qa-analyst"),
    // quality assurance
    ("quality-assurance-agent", "test-orchestrator-agent"),
    ("qa-agent", "test-orchestrator-agent"),
    // business and product
    ("business-analyst-agent", "market-research-agent"),
    ("product-manager-agent", "prd-architect-agent"),
    ("ProductOwner", "prd-architect-agent"),
    // technical leadership
    ("technical-lead-agent", "system-architect-agent"),
    ("TechnicalArchitect", "system-architect-agent"),
    ("architect-agent", "system-architect-agent"),
    // project management
    ("project-manager-agent", "task-planning-agent"),
    ("ProjectManager", "task-planning-agent"),
    ("scrum-master-agent", "task-planning-agent"),
    // development
    ("developer-agent", "coding-agent"),
    ("DevelopmentTeam", "development-orchestrator-agent"),
    ("frontend-developer-agent", "ui-designer-agent"),
    ("web-developer-agent", "ui-designer-agent"),
    // design
    ("design-agent", "ui-designer-agent"),
    ("ux-designer-agent", "ux-researcher-agent"),
    ("web-designer-agent", "ui-designer-agent"),
    // testing
    ("testing-agent", "functional-tester-agent"),
    ("usability-tester-agent", "usability-heuristic-agent"),
    ("performance-tester-agent", "performance-load-tester-agent"),
    ("security-tester-agent", "security-penetration-tester-agent"),
    ("security-testing-agent", "security-penetration-tester-agent"),
    ("automation-testing-agent", "test-case-generator-agent"),
    ("AutomationEngineer", "test-case-generator-agent"),
    // content and marketing
    ("content-marketing-agent", "content-strategy-agent"),
    ("social-media-agent", "social-media-setup-agent"),
    ("marketing-agent", "marketing-strategy-orchestrator"),
    ("copywriting-agent", "content-strategy-agent"),
    // data
    ("data-scientist-agent", "analytics-setup-agent"),
    ("data-analyst-agent", "analytics-setup-agent"),
    // security and compliance
    ("SecurityArchitect", "security-auditor-agent"),
    ("compliance-agent", "compliance-scope-agent"),
    ("legal-compliance-agent", "compliance-scope-agent"),
    ("ComplianceSpecialist", "compliance-scope-agent"),
    // requirements
    ("RequirementsAnalyst", "elicitation-agent"),
    ("requirement-analysis-agent", "elicitation-agent"),
    ("requirement-elicitation-agent", "elicitation-agent"),
    ("technical-writer-agent", "documentation-agent"),
    ("stakeholder-agent", "elicitation-agent"),
    ("api-design-agent", "tech-spec-agent"),
    ("conversion-optimization-agent", "growth-hacking-idea-agent"),
    ("accessibility-agent", "design-qa-analyst"),
    ("accessibility-testing-agent", "compliance-testing-agent"),
];

const INVALID_REFERENCES: &[&str] = &[
    // generic audiences
    "Human stakeholders",
    "External systems and APIs",
    "Project management tools",
    "All technical and specialized agents",
    "All specialized agents",
    "AllSystemAgents",
    "All system agents",
    "Project stakeholders and users",
    "Documentation and knowledge systems",
    "Quality assurance and validation systems",
    // systems and tools
    "TaskManagementSystems",
    "ProjectManagementTools",
    "DatabaseSystems",
    "APIEndpoints",
    "FileSystemMonitors",
    "NotificationSystems",
    "AuditingSystems",
    "BackupSystems",
    // teams
    "QualityAssuranceTeam",
    "StakeholderTeam",
    "StakeholderTeams",
    "AuditTeam",
    "IncidentResponseTeam",
    // agents that were never defined
    "optimization-agent",
    "performance-agent",
    "usability-agent",
    "ci-agent",
    "support-agent",
    "sales-agent",
    "email-marketing-agent",
    "creative-agent",
    "customer-success-agent",
    "event-marketing-agent",
    "influencer-marketing-agent",
    "data-privacy-agent",
    "risk-assessment-agent",
    "competitive-analysis-agent",
    "product-strategy-agent",
    "strategy-agent",
    "trend-analysis-agent",
    "database-administrator-agent",
    "cost-analyst-agent",
    "performance-engineer-agent",
    "data-governance-agent",
    "legal-advisor-agent",
    "knowledge-management-agent",
    "community-manager-agent",
    "customer-service-agent",
    "technical-seo-agent",
    "cost-optimization-agent",
    "TestDataManager",
    "RiskManager",
    "SecurityPenetrationTester",
    "DevOpsEngineer",
    "TechnologyAdvisor",
    "DataArchitect",
    "PerformanceEngineer",
    "TeamLead",
    "StakeholderRepresentative",
    "ComplianceSpecialist",
    "TrainingCoordinator",
    "KnowledgeManager",
    "CommunicationSpecialist",
    "audio-production-agent",
    "seo-agent",
    "team-coordinator-agent",
    "methodology-agent",
    "process-optimization-agent",
];

static MAPPINGS: LazyLock<FxHashMap<&'static str, &'static str>> =
    LazyLock::new(|| REFERENCE_MAPPINGS.iter().copied().collect());

static INVALID: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| INVALID_REFERENCES.iter().copied().collect());

/// Canonical slug for a known-bad reference name.
pub fn canonical_for(name: &str) -> Option<&'static str> {
    MAPPINGS.get(name).copied()
}

/// True when `name` is a known stale/invalid reference with no replacement.
pub fn is_invalid(name: &str) -> bool {
    canonical_for(name).is_none() && INVALID.contains(name)
}

/// What the reference fixer does with one `interactsWith` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceAction {
    Keep(String),
    Remap { from: String, to: String },
    DropInvalid(String),
    /// Entry was not a string; holds its JSON rendering.
    DropNonString(String),
}

impl ReferenceAction {
    pub fn is_change(&self) -> bool {
        !matches!(self, ReferenceAction::Keep(_))
    }

    pub fn describe(&self) -> String {
        match self {
            ReferenceAction::Keep(name) => format!("kept {name}"),
            ReferenceAction::Remap { from, to } => format!("mapped {from} → {to}"),
            ReferenceAction::DropInvalid(name) => format!("removed invalid reference {name}"),
            ReferenceAction::DropNonString(raw) => format!("skipped non-string reference {raw}"),
        }
    }
}

pub fn resolve(entry: &Value) -> ReferenceAction {
    let Some(name) = entry.as_str() else {
        return ReferenceAction::DropNonString(entry.to_string());
    };
    if let Some(target) = canonical_for(name) {
        ReferenceAction::Remap {
            from: name.to_string(),
            to: target.to_string(),
        }
    } else if INVALID.contains(name) {
        ReferenceAction::DropInvalid(name.to_string())
    } else {
        ReferenceAction::Keep(name.to_string())
    }
}

/// Cleaned list plus the non-trivial actions taken, in entry order.
pub fn clean_references(entries: &[Value]) -> (Vec<Value>, Vec<ReferenceAction>) {
    let mut cleaned = Vec::with_capacity(entries.len());
    let mut changes = Vec::new();
    for entry in entries {
        let action = resolve(entry);
        match &action {
            ReferenceAction::Keep(name) => cleaned.push(Value::String(name.clone())),
            ReferenceAction::Remap { to, .. } => cleaned.push(Value::String(to.clone())),
            ReferenceAction::DropInvalid(_) | ReferenceAction::DropNonString(_) => {}
        }
        if action.is_change() {
            changes.push(action);
        }
    }
    (cleaned, changes)
}
