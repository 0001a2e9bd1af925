//! agentcheck: schema validation, repair and synchronization for agent
//! definition records.
//!
//! Each agent lives in its own JSON document (`01_Machine/02_Agents/<slug>.json`)
//! holding a single mode definition. This crate checks those documents against
//! a fixed schema, repairs the common kinds of drift in place, and publishes the
//! passing set to the canonical `.roomodes` file and the derived `.cursorrules`
//! and reference-guide documents.
//!
//! # Commands
//!
//! ```bash
//! # Validate every agent, sync outputs, check companion configs
//! agentcheck validate
//!
//! # Deep fields become hard failures
//! agentcheck validate --strict --slug coding-agent
//!
//! # Run the repair passes only
//! agentcheck repair --references
//!
//! # Re-publish outputs without printing a full validation run
//! agentcheck sync --target canonical
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: record store, validator, repairer, reconciler, initializer, ambient plumbing
//! - [`plugins`]: derived outputs (cursor rules, reference guide, report) and the loading probe

pub mod core;
pub mod plugins;

use core::{
    config::Workspace,
    confirm::{AutoConfirm, Confirm, StdinConfirm},
    error::AgentCheckError,
    init::{InitReport, SystemInitializer},
    logging, output, reconcile,
    repair::{RepairSummary, Repairer},
    store::{self, AgentStore},
    time,
    validate::{self, ValidationOptions, ValidationOutcome},
};
use plugins::{cursor, guide, probe, report};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::warn;

const MAX_LISTED_MESSAGES: usize = 12;
const MAX_MESSAGE_CHARS: usize = 160;

#[derive(Parser, Debug)]
#[clap(
    name = "agentcheck",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate, repair and synchronize agent definition records"
)]
struct Cli {
    /// Workspace root (directory containing 01_Machine). Discovered from the
    /// current directory when omitted.
    #[clap(long, global = true)]
    workspace: Option<PathBuf>,
    /// Explicit config file instead of <workspace>/agentcheck.toml.
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Debug-level logging on stderr.
    #[clap(short, long, global = true)]
    verbose: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate agent records and companion configs, then publish outputs
    Validate(ValidateCli),
    /// Run repair passes over all agent records
    Repair(RepairCli),
    /// Re-publish canonical modes and/or cursor rules from passing records
    Sync(SyncCli),
    /// Check companion configs (DNA, Genesis, Step) only
    Init,
    /// Regenerate the Quick Agent Reference Guide in the step template
    Guide,
}

#[derive(clap::Args, Debug)]
struct ValidateCli {
    /// Validate only these slugs (repeatable).
    #[clap(long = "slug")]
    slugs: Vec<String>,
    /// Deep-field findings fail the record.
    #[clap(long)]
    strict: bool,
    /// Run all repair passes before validating.
    #[clap(long)]
    auto_repair: bool,
    /// Skip companion config checks.
    #[clap(long, conflicts_with = "system_only")]
    agents_only: bool,
    /// Only check companion configs.
    #[clap(long)]
    system_only: bool,
    /// Do not update the canonical modes file.
    #[clap(long)]
    no_sync: bool,
    /// Do not regenerate cursor rules.
    #[clap(long)]
    no_cursor: bool,
    /// Back up cursor rules before regenerating them.
    #[clap(long)]
    cursor_backup: bool,
    /// Ask, per passing record, whether the runtime loaded it.
    #[clap(long)]
    probe: bool,
    /// Answer yes to every probe question.
    #[clap(short = 'y', long)]
    yes: bool,
    /// Print the markdown report after the run.
    #[clap(long)]
    report: bool,
}

#[derive(clap::Args, Debug)]
struct RepairCli {
    /// Flatten compound edit groups.
    #[clap(long)]
    groups: bool,
    /// Remap or drop stale interactsWith references.
    #[clap(long)]
    references: bool,
    /// Populate empty interactsWith lists.
    #[clap(long)]
    interactions: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SyncTarget {
    All,
    Canonical,
    Cursor,
}

#[derive(clap::Args, Debug)]
struct SyncCli {
    #[clap(long, value_enum, default_value = "all")]
    target: SyncTarget,
    /// Back up cursor rules before regenerating them.
    #[clap(long)]
    backup: bool,
}

fn phase_header(title: &str) {
    println!();
    println!("{}", title.bright_cyan().bold());
    println!("{}", "-".repeat(title.chars().count()).bright_black());
}

fn print_outcome(file: &str, outcome: &ValidationOutcome) {
    if outcome.passed {
        println!("  {} {}", "✓".bright_green(), file);
    } else {
        println!("  {} {}", "✗".bright_red(), file.bold());
    }
    for line in output::bounded_lines(&outcome.errors, MAX_LISTED_MESSAGES, MAX_MESSAGE_CHARS) {
        println!("      {} {}", "error:".red(), line);
    }
    for line in output::bounded_lines(&outcome.warnings, MAX_LISTED_MESSAGES, MAX_MESSAGE_CHARS) {
        println!("      {} {}", "warn:".yellow(), line);
    }
}

fn print_repairs(summary: &RepairSummary) {
    println!("  Made {} total repairs", summary.total());
    for (kind, count) in summary.entries() {
        if count > 0 {
            println!("   - {}: {}", output::title_case(kind), count);
        }
    }
}

fn print_init(init: &InitReport) {
    let status = init.status.as_str().to_uppercase();
    let status = if init.is_initialized() {
        status.bright_green().bold()
    } else {
        status.bright_red().bold()
    };
    println!("  Status: {}  (stage: {})", status, init.stage);
    for line in output::bounded_lines(&init.errors, MAX_LISTED_MESSAGES, MAX_MESSAGE_CHARS) {
        println!("      {} {}", "error:".red(), line);
    }
    for line in output::bounded_lines(&init.warnings, MAX_LISTED_MESSAGES, MAX_MESSAGE_CHARS) {
        println!("      {} {}", "warn:".yellow(), line);
    }
}

fn passed_files(files: &[PathBuf], results: &IndexMap<String, ValidationOutcome>) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|path| {
            results
                .get(&store::file_name(path))
                .is_some_and(|outcome| outcome.passed)
        })
        .cloned()
        .collect()
}

fn sync_canonical_for(ws: &Workspace, passed: &[PathBuf]) -> Result<usize, AgentCheckError> {
    let count = reconcile::sync_canonical(&ws.canonical_file, passed, &ws.priority_refs())?;
    println!(
        "  Synced {} modes to {}",
        count,
        display_relative(&ws.root, &ws.canonical_file)
    );
    Ok(count)
}

/// Cursor rules failures are reported but never fail the run.
fn sync_cursor_for(ws: &Workspace, backup: bool) {
    match cursor::sync_cursor_rules(ws, backup) {
        Ok(count) => println!(
            "  Generated {} with {} agents",
            display_relative(&ws.root, &ws.cursor_rules_file),
            count
        ),
        Err(e) => {
            warn!(error = %e, "cursor rules not generated");
            println!("  {} cursor rules not generated: {}", "!".yellow(), e);
        }
    }
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn run_validate(ws: &Workspace, args: ValidateCli) -> Result<(), AgentCheckError> {
    ws.ensure_dirs()?;
    let agent_store = AgentStore::new(&ws.agents_dir);
    let options = ValidationOptions {
        strict: args.strict || ws.strict,
    };
    let mut results: IndexMap<String, ValidationOutcome> = IndexMap::new();
    let mut repairs: Option<RepairSummary> = None;
    let mut init: Option<InitReport> = None;

    if !args.system_only {
        let files = agent_store.select_files(&args.slugs)?;

        if args.auto_repair && !files.is_empty() {
            phase_header("Agent Repair Phase");
            let mut repairer = Repairer::new(&ws.backup_dir, &agent_store);
            let summary = repairer.repair_all(&files);
            print_repairs(&summary);
            repairs = Some(summary);
        }

        phase_header(if options.strict {
            "Agent Validation Phase (strict)"
        } else {
            "Agent Validation Phase"
        });
        if files.is_empty() {
            println!("  {} No agent files found", "!".yellow());
        }
        results = validate::validate_all(&files, &agent_store, options);

        if args.probe {
            let mut confirm: Box<dyn Confirm> = if args.yes {
                Box::new(AutoConfirm)
            } else {
                Box::new(StdinConfirm)
            };
            probe::probe_passing(&files, &mut results, &ws.canonical_file, confirm.as_mut())?;
        }

        for (file, outcome) in &results {
            print_outcome(file, outcome);
        }

        if !files.is_empty() {
            let passed = passed_files(&files, &results);
            if !args.no_sync {
                sync_canonical_for(ws, &passed)?;
            }
            if !args.no_cursor {
                sync_cursor_for(ws, args.cursor_backup);
            }
        }
    }

    if !args.agents_only {
        phase_header("System Initialization Phase");
        let init_report = SystemInitializer::new(ws).initialize();
        print_init(&init_report);
        init = Some(init_report);
    }

    let rendered = report::render_report(&time::now_iso(), &results, init.as_ref(), repairs.as_ref());
    report::write_report(&ws.report_file, &rendered)?;
    if args.report {
        println!();
        println!("{rendered}");
    } else {
        println!(
            "\n  Report written to {}",
            display_relative(&ws.root, &ws.report_file)
        );
    }

    let failed = results.values().filter(|o| !o.passed).count();
    if !results.is_empty() {
        let summary = format!("{}/{} agents passed", results.len() - failed, results.len());
        if failed == 0 {
            println!("\n{}", summary.bright_green().bold());
        } else {
            println!("\n{}", summary.bright_red().bold());
        }
    }

    if failed > 0 {
        return Err(AgentCheckError::ValidationError(format!(
            "{failed} agent(s) failed validation"
        )));
    }
    if let Some(init) = init.filter(|r| !r.is_initialized()) {
        return Err(AgentCheckError::ValidationError(format!(
            "system initialization {} at stage {}",
            init.status, init.stage
        )));
    }
    Ok(())
}

fn run_repair(ws: &Workspace, args: RepairCli) -> Result<(), AgentCheckError> {
    let agent_store = AgentStore::new(&ws.agents_dir);
    let files = agent_store.list_files();
    phase_header("Agent Repair Phase");
    if files.is_empty() {
        println!("  {} No agent files found for repair", "!".yellow());
        return Ok(());
    }

    let mut repairer = Repairer::new(&ws.backup_dir, &agent_store);
    let summary = if !(args.groups || args.references || args.interactions) {
        repairer.repair_all(&files)
    } else {
        RepairSummary {
            groups_fixes: if args.groups { repairer.fix_groups_format(&files) } else { 0 },
            reference_fixes: if args.references { repairer.fix_broken_references(&files) } else { 0 },
            interaction_fixes: if args.interactions { repairer.fix_empty_interactions(&files) } else { 0 },
        }
    };
    for entry in repairer.log() {
        println!("  {} {}", "◆".bright_cyan(), entry);
    }
    print_repairs(&summary);
    Ok(())
}

fn run_sync(ws: &Workspace, args: SyncCli) -> Result<(), AgentCheckError> {
    let agent_store = AgentStore::new(&ws.agents_dir);
    phase_header("Synchronization");
    if matches!(args.target, SyncTarget::All | SyncTarget::Canonical) {
        let files = agent_store.list_files();
        let results = validate::validate_all(&files, &agent_store, ValidationOptions::default());
        let passed = passed_files(&files, &results);
        println!("  {}/{} agents pass validation", passed.len(), files.len());
        sync_canonical_for(ws, &passed)?;
    }
    if matches!(args.target, SyncTarget::All | SyncTarget::Cursor) {
        let count = cursor::sync_cursor_rules(ws, args.backup)?;
        println!(
            "  Generated {} with {} agents",
            display_relative(&ws.root, &ws.cursor_rules_file),
            count
        );
    }
    Ok(())
}

fn run_init(ws: &Workspace) -> Result<(), AgentCheckError> {
    phase_header("System Initialization Phase");
    let report = SystemInitializer::new(ws).initialize();
    print_init(&report);
    if report.is_initialized() {
        Ok(())
    } else {
        Err(AgentCheckError::ValidationError(format!(
            "system initialization {} at stage {}",
            report.status, report.stage
        )))
    }
}

fn run_guide(ws: &Workspace) -> Result<(), AgentCheckError> {
    phase_header("Template Update");
    let total = guide::update_template(ws)?;
    println!(
        "  Updated {} with {} agents",
        display_relative(&ws.root, &ws.template_file),
        total
    );
    Ok(())
}

pub fn run() -> Result<(), AgentCheckError> {
    let cli = Cli::parse();
    let ws = Workspace::load(cli.workspace.as_deref(), cli.config.as_deref())?;
    logging::init_logging(Some(&ws.log_dir), cli.verbose);

    match cli.command {
        Command::Validate(args) => run_validate(&ws, args),
        Command::Repair(args) => run_repair(&ws, args),
        Command::Sync(args) => run_sync(&ws, args),
        Command::Init => run_init(&ws),
        Command::Guide => run_guide(&ws),
    }
}
