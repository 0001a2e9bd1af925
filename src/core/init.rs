//! Companion document checks: DNA (agent registry), Genesis (workflow
//! phases) and Step (status).
//!
//! Stages run in order and the first fatal stage stops the pipeline. Missing
//! core agents and missing directories are recorded without stopping it.
//! Step is rewritten with the outcome on every run.

use crate::core::backup;
use crate::core::config::Workspace;
use crate::core::error::AgentCheckError;
use crate::core::store;
use crate::core::time;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const CORE_AGENTS: &[&str] = &["uber-orchestrator-agent", "scribe-agent", "task-sync-agent"];

/// Directories expected under the workspace root, as relative paths.
pub const READINESS_DIRS: &[&str] = &[
    "01_Machine/01_Workflow",
    "01_Machine/02_Agents",
    "01_Machine/03_Brain",
    "02_Vision",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    Initialized,
    Partial,
    Failed,
}

impl SystemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemStatus::Initialized => "initialized",
            SystemStatus::Partial => "partial",
            SystemStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage a run stopped at; `Complete` when no fatal stage fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStage {
    ConfigurationValidation,
    ConfigurationLoading,
    CrossValidation,
    WorkflowSetup,
    Complete,
}

impl InitStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitStage::ConfigurationValidation => "configuration_validation",
            InitStage::ConfigurationLoading => "configuration_loading",
            InitStage::CrossValidation => "cross_validation",
            InitStage::WorkflowSetup => "workflow_setup",
            InitStage::Complete => "complete",
        }
    }
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub status: SystemStatus,
    pub stage: InitStage,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// False when Step could not be written.
    pub step_updated: bool,
}

impl InitReport {
    pub fn is_initialized(&self) -> bool {
        self.status == SystemStatus::Initialized
    }
}

struct Companions {
    dna: Map<String, Value>,
    genesis: Map<String, Value>,
}

pub struct SystemInitializer {
    root: PathBuf,
    dna_file: PathBuf,
    genesis_file: PathBuf,
    step_file: PathBuf,
    backup_dir: PathBuf,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl SystemInitializer {
    pub fn new(workspace: &Workspace) -> Self {
        SystemInitializer {
            root: workspace.root.clone(),
            dna_file: workspace.brain_dir.join("DNA.json"),
            genesis_file: workspace.brain_dir.join("Genesis.json"),
            step_file: workspace.brain_dir.join("Step.json"),
            backup_dir: workspace.backup_dir.clone(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn companion_files(&self) -> [(&'static str, &Path); 3] {
        [
            ("dna", self.dna_file.as_path()),
            ("genesis", self.genesis_file.as_path()),
            ("step", self.step_file.as_path()),
        ]
    }

    pub fn initialize(mut self) -> InitReport {
        info!(root = %self.root.display(), "starting system initialization");

        let stage = self.run_stages();
        let status = match stage {
            InitStage::Complete if self.errors.is_empty() => SystemStatus::Initialized,
            InitStage::Complete => SystemStatus::Partial,
            _ => SystemStatus::Failed,
        };
        let step_updated = match self.update_step(status) {
            Ok(()) => true,
            Err(e) => {
                error!(file = %self.step_file.display(), error = %e, "failed to update system status");
                false
            }
        };
        info!(
            status = %status,
            stage = %stage,
            errors = self.errors.len(),
            warnings = self.warnings.len(),
            "system initialization finished"
        );
        InitReport {
            status,
            stage,
            errors: self.errors,
            warnings: self.warnings,
            step_updated,
        }
    }

    /// Returns the stage that aborted, or `Complete`.
    fn run_stages(&mut self) -> InitStage {
        if !self.check_parseable() {
            return InitStage::ConfigurationValidation;
        }
        let Some(companions) = self.load_companions() else {
            return InitStage::ConfigurationLoading;
        };
        if !self.check_phase_references(&companions) {
            return InitStage::CrossValidation;
        }
        self.check_core_agents(&companions);
        if !self.check_workflow(&companions) {
            return InitStage::WorkflowSetup;
        }
        self.check_readiness();
        InitStage::Complete
    }

    fn check_parseable(&mut self) -> bool {
        let mut all_valid = true;
        let mut problems = Vec::new();
        for (kind, path) in self.companion_files() {
            if !path.exists() {
                problems.push(format!("Missing config file: {}", path.display()));
                all_valid = false;
                continue;
            }
            let parsed = fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|raw| serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string()));
            match parsed {
                Ok(_) => info!(config = kind, "configuration valid"),
                Err(e) => {
                    problems.push(format!("Invalid JSON in {}: {}", path.display(), e));
                    all_valid = false;
                }
            }
        }
        self.errors.extend(problems);
        all_valid
    }

    fn load_companions(&mut self) -> Option<Companions> {
        let mut load = |path: &Path| match store::load_document(path) {
            Some(Value::Object(map)) => Some(map),
            _ => {
                self.errors
                    .push(format!("Configuration must be a JSON object: {}", path.display()));
                None
            }
        };
        let dna = load(&self.dna_file);
        let genesis = load(&self.genesis_file);
        let step = load(&self.step_file);
        match (dna, genesis, step) {
            (Some(dna), Some(genesis), Some(_)) => Some(Companions { dna, genesis }),
            _ => None,
        }
    }

    fn check_phase_references(&mut self, companions: &Companions) -> bool {
        let declared: Vec<&Value> = array_field(&companions.genesis, "workflowSequence")
            .iter()
            .filter_map(|phase| phase.get("phaseID"))
            .collect();

        let before = self.errors.len();
        for agent in array_field(&companions.dna, "agentRegistry") {
            let name = agent
                .get("agentName")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN");
            let phases = agent.get("phases").and_then(Value::as_array);
            for phase in phases.into_iter().flatten() {
                if !declared.contains(&phase) {
                    self.errors.push(format!(
                        "Agent '{}' references undefined phase: '{}'",
                        name,
                        render(phase)
                    ));
                }
            }
        }
        self.errors.len() == before
    }

    fn check_core_agents(&mut self, companions: &Companions) {
        let available: Vec<&str> = array_field(&companions.dna, "agentRegistry")
            .iter()
            .filter_map(|agent| agent.get("agentName").and_then(Value::as_str))
            .collect();
        for core in CORE_AGENTS {
            if !available.contains(core) {
                warn!(agent = core, "core agent missing from registry");
                self.errors.push(format!("Missing core agent: '{core}'"));
            }
        }
    }

    fn check_workflow(&mut self, companions: &Companions) -> bool {
        if array_field(&companions.genesis, "workflowSequence").is_empty() {
            self.errors.push("No workflow sequence defined".to_string());
            return false;
        }
        true
    }

    fn check_readiness(&mut self) {
        for rel in READINESS_DIRS {
            if !self.root.join(rel).is_dir() {
                self.warnings.push(format!("Missing directory: {rel}"));
            }
        }
    }

    /// Merge status fields into Step, backing up a corrupt Step first.
    fn update_step(&self, status: SystemStatus) -> Result<(), AgentCheckError> {
        let mut step = match store::load_document(&self.step_file) {
            Some(Value::Object(map)) => map,
            _ => {
                if self.step_file.exists() {
                    match backup::backup_file(&self.backup_dir, &self.step_file) {
                        Ok(copy) => warn!(backup = %copy.display(), "replacing unreadable Step document"),
                        Err(e) => warn!(error = %e, "could not back up unreadable Step document"),
                    }
                }
                Map::new()
            }
        };
        let now = time::now_iso();
        step.insert("lastInitialization".to_string(), json!(now));
        step.insert("systemStatus".to_string(), json!(status.as_str()));
        step.insert(
            "validationResults".to_string(),
            json!({
                "errors": self.errors.len(),
                "warnings": self.warnings.len(),
                "timestamp": now,
            }),
        );
        store::write_document(&self.step_file, &Value::Object(step))?;
        info!(file = %self.step_file.display(), status = %status, "updated system status");
        Ok(())
    }
}

fn array_field<'a>(map: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    map.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
