//! Markdown report for a validation run.

use crate::core::error::AgentCheckError;
use crate::core::init::InitReport;
use crate::core::output::title_case;
use crate::core::repair::RepairSummary;
use crate::core::validate::ValidationOutcome;
use indexmap::IndexMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub fn render_report(
    generated_at: &str,
    agent_results: &IndexMap<String, ValidationOutcome>,
    init: Option<&InitReport>,
    repairs: Option<&RepairSummary>,
) -> String {
    let mut out = format!("# Unified Agent Validation Report\nGenerated: {generated_at}\n\n");

    if let Some(repairs) = repairs {
        let _ = writeln!(out, "## Repair Summary\n\n- Total repairs made: {}", repairs.total());
        for (kind, count) in repairs.entries() {
            if count > 0 {
                let _ = writeln!(out, "- {}: {}", title_case(kind), count);
            }
        }
        out.push('\n');
    }

    out.push_str("## Agent Validation Summary\n");
    if agent_results.is_empty() {
        out.push_str("\nNo agents were tested.\n");
    } else {
        let total = agent_results.len();
        let valid = agent_results.values().filter(|o| o.passed).count();
        let rate = valid as f64 / total as f64 * 100.0;
        let _ = write!(
            out,
            "\n- Total agents tested: {total}\n- Valid agents: {valid}\n- Failed agents: {}\n- Success rate: {rate:.1}%\n\n## Detailed Agent Results\n",
            total - valid
        );
        for (file, outcome) in agent_results {
            let status = if outcome.passed { "✅ PASS" } else { "❌ FAIL" };
            let _ = writeln!(out, "\n### {file} - {status}");
            if !outcome.errors.is_empty() {
                out.push_str("\n**Errors:**\n");
                for e in &outcome.errors {
                    let _ = writeln!(out, "- {e}");
                }
            }
            if !outcome.warnings.is_empty() {
                out.push_str("\n**Warnings:**\n");
                for w in &outcome.warnings {
                    let _ = writeln!(out, "- {w}");
                }
            }
        }
    }

    if let Some(init) = init {
        let _ = write!(
            out,
            "\n## System Initialization Results\n\n- Status: {}\n- Stage: {}\n- Errors: {}\n- Warnings: {}\n\n",
            init.status.as_str().to_uppercase(),
            init.stage,
            init.errors.len(),
            init.warnings.len()
        );
        if !init.errors.is_empty() {
            out.push_str("**System Errors:**\n");
            for e in &init.errors {
                let _ = writeln!(out, "- {e}");
            }
        }
        if !init.warnings.is_empty() {
            out.push_str("\n**System Warnings:**\n");
            for w in &init.warnings {
                let _ = writeln!(out, "- {w}");
            }
        }
    }

    let deep: Vec<String> = agent_results
        .iter()
        .flat_map(|(file, outcome)| {
            outcome
                .deep_findings()
                .into_iter()
                .map(move |finding| format!("{file}: {finding}"))
        })
        .collect();
    if !deep.is_empty() {
        out.push_str("\n## Deep Field Issues (Strict Mode)\n\n");
        for issue in deep {
            let _ = writeln!(out, "- {issue}");
        }
    }
    out
}

pub fn write_report(path: &Path, content: &str) -> Result<(), AgentCheckError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
