//! Workspace layout and optional `agentcheck.toml` overrides.
//!
//! Every path the tool reads or writes is resolved here from a single
//! workspace root, so the engine modules never hard-code locations.

use crate::core::error::AgentCheckError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "agentcheck.toml";

/// Marker directory used to discover the workspace root.
pub const MACHINE_DIR: &str = "01_Machine";

/// Fixed slug ordering for the canonical output and cursor rules.
pub const WORKFLOW_AGENT_ORDER: &[&str] = &[
    "uber-orchestrator-agent",
    "nlu-processor-agent",
    "elicitation-agent",
    "compliance-scope-agent",
    "idea-generation-agent",
    "idea-refinement-agent",
    "core-concept-agent",
    "market-research-agent",
    "mcp-researcher-agent",
    "technology-advisor-agent",
    "system-architect-agent",
    "branding-agent",
    "design-system-agent",
    "ui-designer-agent",
    "prototyping-agent",
    "design-qa-analyst",
    "ux-researcher-agent",
    "tech-spec-agent",
    "task-planning-agent",
    "prd-architect-agent",
    "mcp-configuration-agent",
    "algorithmic-problem-solver-agent",
    "coding-agent",
    "code-reviewer-agent",
    "documentation-agent",
    "development-orchestrator-agent",
    "test-case-generator-agent",
    "test-orchestrator-agent",
    "functional-tester-agent",
    "exploratory-tester-agent",
    "performance-load-tester-agent",
    "visual-regression-testing-agent",
    "uat-coordinator-agent",
    "lead-testing-agent",
    "compliance-testing-agent",
    "security-penetration-tester-agent",
    "usability-heuristic-agent",
    "adaptive-deployment-strategist-agent",
    "devops-agent",
    "user-feedback-collector-agent",
    "efficiency-optimization-agent",
    "knowledge-evolution-agent",
    "security-auditor-agent",
    "swarm-scaler-agent",
    "root-cause-analysis-agent",
    "remediation-agent",
    "health-monitor-agent",
    "incident-learning-agent",
    "marketing-strategy-orchestrator",
    "campaign-manager-agent",
    "content-strategy-agent",
    "graphic-design-agent",
    "growth-hacking-idea-agent",
    "video-production-agent",
    "analytics-setup-agent",
    "seo-sem-agent",
    "social-media-setup-agent",
    "community-strategy-agent",
    "project-initiator-agent",
];

/// Path overrides from `[paths]`, all relative to the workspace root.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathOverrides {
    pub agents_dir: Option<PathBuf>,
    pub brain_dir: Option<PathBuf>,
    pub check_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub canonical_file: Option<PathBuf>,
    pub cursor_rules_file: Option<PathBuf>,
    pub template_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ValidateSettings {
    pub strict: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Replaces [`WORKFLOW_AGENT_ORDER`] when set.
    pub priority: Option<Vec<String>>,
}

/// Parsed contents of `agentcheck.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub paths: PathOverrides,
    pub validate: ValidateSettings,
    pub sync: SyncSettings,
}

/// Resolved locations and settings for one run.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Workspace root (parent of `01_Machine`)
    pub root: PathBuf,
    /// One JSON document per agent, named `<slug>.json`
    pub agents_dir: PathBuf,
    /// Holds the companion documents (DNA, Genesis, Step)
    pub brain_dir: PathBuf,
    pub check_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub log_dir: PathBuf,
    pub report_file: PathBuf,
    /// Canonical output consumed by the mode runtime
    pub canonical_file: PathBuf,
    pub cursor_rules_file: PathBuf,
    pub template_file: PathBuf,
    pub strict: bool,
    pub priority: Vec<String>,
}

impl Workspace {
    /// Default layout rooted at `root`, without reading any config file.
    pub fn with_defaults(root: &Path) -> Self {
        let machine = root.join(MACHINE_DIR);
        let brain_dir = machine.join("03_Brain");
        let check_dir = brain_dir.join("Agents-Check");
        let log_dir = check_dir.join("Log");
        Workspace {
            root: root.to_path_buf(),
            agents_dir: machine.join("02_Agents"),
            backup_dir: check_dir.join("backups"),
            report_file: log_dir.join("unified_validation_report.md"),
            log_dir,
            check_dir,
            brain_dir,
            canonical_file: root.join(".roomodes"),
            cursor_rules_file: root.join(".cursorrules"),
            template_file: machine
                .join("04_Documentation")
                .join("01_System")
                .join("Template-Step-Structure.md"),
            strict: false,
            priority: WORKFLOW_AGENT_ORDER.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Default layout with `config` applied on top.
    pub fn from_config(root: &Path, config: &FileConfig) -> Self {
        let mut ws = Workspace::with_defaults(root);
        let p = &config.paths;
        let resolve = |over: &Option<PathBuf>, current: &mut PathBuf| {
            if let Some(rel) = over {
                *current = root.join(rel);
            }
        };
        resolve(&p.agents_dir, &mut ws.agents_dir);
        resolve(&p.brain_dir, &mut ws.brain_dir);
        resolve(&p.check_dir, &mut ws.check_dir);
        resolve(&p.backup_dir, &mut ws.backup_dir);
        if let Some(rel) = &p.log_dir {
            ws.log_dir = root.join(rel);
            ws.report_file = ws.log_dir.join("unified_validation_report.md");
        }
        resolve(&p.canonical_file, &mut ws.canonical_file);
        resolve(&p.cursor_rules_file, &mut ws.cursor_rules_file);
        resolve(&p.template_file, &mut ws.template_file);
        ws.strict = config.validate.strict;
        if let Some(priority) = &config.sync.priority {
            ws.priority = priority.clone();
        }
        ws
    }

    /// Resolve the root, then load `agentcheck.toml` (or `config_path`) if present.
    pub fn load(
        explicit_root: Option<&Path>,
        config_path: Option<&Path>,
    ) -> Result<Self, AgentCheckError> {
        let root = match explicit_root {
            Some(r) => r.to_path_buf(),
            None => find_workspace_root(&std::env::current_dir()?)?,
        };
        let config = match config_path {
            Some(path) => load_file_config(path)?.ok_or_else(|| {
                AgentCheckError::NotFound(format!("config file {}", path.display()))
            })?,
            None => load_file_config(&root.join(CONFIG_FILE_NAME))?.unwrap_or_default(),
        };
        Ok(Workspace::from_config(&root, &config))
    }

    pub fn priority_refs(&self) -> Vec<&str> {
        self.priority.iter().map(String::as_str).collect()
    }

    /// Create the directories the tool writes into.
    pub fn ensure_dirs(&self) -> Result<(), AgentCheckError> {
        for dir in [&self.check_dir, &self.log_dir, &self.backup_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// `Ok(None)` when the file does not exist; a parse failure is an error.
pub fn load_file_config(path: &Path) -> Result<Option<FileConfig>, AgentCheckError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)
        .map_err(|e| AgentCheckError::ConfigError(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

/// Nearest ancestor of `start_dir` containing `01_Machine`.
pub fn find_workspace_root(start_dir: &Path) -> Result<PathBuf, AgentCheckError> {
    let mut current_dir = PathBuf::from(start_dir);
    loop {
        if current_dir.join(MACHINE_DIR).is_dir() {
            return Ok(current_dir);
        }
        if !current_dir.pop() {
            return Err(AgentCheckError::NotFound(format!(
                "'{}' directory not found in current or parent directories. Pass --workspace explicitly.",
                MACHINE_DIR
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_machine_layout() {
        let ws = Workspace::with_defaults(Path::new("/w"));
        assert_eq!(ws.agents_dir, Path::new("/w/01_Machine/02_Agents"));
        assert_eq!(ws.canonical_file, Path::new("/w/.roomodes"));
        assert_eq!(
            ws.backup_dir,
            Path::new("/w/01_Machine/03_Brain/Agents-Check/backups")
        );
        assert_eq!(ws.priority.first().map(String::as_str), Some("uber-orchestrator-agent"));
        assert!(!ws.strict);
    }

    #[test]
    fn toml_overrides_apply() {
        let config: FileConfig = toml::from_str(
            r#"
            [paths]
            agents_dir = "agents"
            log_dir = "logs"

            [validate]
            strict = true

            [sync]
            priority = ["b-agent", "a-agent"]
            "#,
        )
        .unwrap();
        let ws = Workspace::from_config(Path::new("/w"), &config);
        assert_eq!(ws.agents_dir, Path::new("/w/agents"));
        assert_eq!(ws.report_file, Path::new("/w/logs/unified_validation_report.md"));
        assert!(ws.strict);
        assert_eq!(ws.priority, vec!["b-agent", "a-agent"]);
    }

    #[test]
    fn root_discovery_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("01_Machine").join("02_Agents");
        fs::create_dir_all(&nested).unwrap();
        let found = find_workspace_root(&nested).unwrap();
        assert_eq!(found, dir.path());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[paths\nagents_dir = 3").unwrap();
        assert!(matches!(
            load_file_config(&path),
            Err(AgentCheckError::ConfigError(_))
        ));
    }
}
