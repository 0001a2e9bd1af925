use agentcheck::core::references;
use agentcheck::core::repair::Repairer;
use agentcheck::core::store::{self, AgentStore};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

fn write_agent(store: &AgentStore, slug: &str, mode: Value) {
    store::write_document(&store.path_for(slug), &json!({ "customModes": [mode] })).unwrap();
}

fn backup_count(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

fn interacts_with(store: &AgentStore, slug: &str) -> Value {
    let doc = store::load_document(&store.path_for(slug)).unwrap();
    doc["customModes"][0]["connectivity"]["interactsWith"].clone()
}

fn seeded() -> (tempfile::TempDir, AgentStore) {
    let dir = tempfile::tempdir().unwrap();
    let agents = AgentStore::new(dir.path().join("agents"));
    fs::create_dir_all(&agents.root).unwrap();

    write_agent(
        &agents,
        "coding-agent",
        json!({
            "slug": "coding-agent",
            "groups": ["read", ["edit", {"fileRegex": "\\.rs$"}], "mcp", "command"],
            "connectivity": {"interactsWith": [], "feedbackLoop": "reviews"}
        }),
    );
    write_agent(
        &agents,
        "code-reviewer-agent",
        json!({
            "slug": "code-reviewer-agent",
            "groups": ["read", "edit", "mcp", "command"],
            "connectivity": {
                "interactsWith": ["developer-agent", "All system agents", {"slug": "x"}, "devops-agent"],
                "feedbackLoop": "comments"
            }
        }),
    );
    write_agent(
        &agents,
        "devops-agent",
        json!({
            "slug": "devops-agent",
            "groups": ["read", "edit", "mcp", "command"],
            "connectivity": {"interactsWith": ["coding-agent"], "feedbackLoop": "alerts"}
        }),
    );
    (dir, agents)
}

#[test]
fn each_pass_touches_only_records_that_need_it() {
    let (dir, agents) = seeded();
    let backups = dir.path().join("backups");
    let files = agents.list_files();
    let devops_before = fs::read_to_string(agents.path_for("devops-agent")).unwrap();

    let mut repairer = Repairer::new(&backups, &agents);
    assert_eq!(repairer.fix_groups_format(&files), 1);
    assert_eq!(backup_count(&backups), 1);
    assert_eq!(repairer.fix_broken_references(&files), 1);
    assert_eq!(backup_count(&backups), 2);
    assert_eq!(repairer.fix_empty_interactions(&files), 1);
    assert_eq!(backup_count(&backups), 3);

    assert_eq!(
        fs::read_to_string(agents.path_for("devops-agent")).unwrap(),
        devops_before
    );
    assert_eq!(
        repairer.log()[0],
        "Fixed groups format in coding-agent.json"
    );
    assert!(repairer.log()[1].starts_with("Fixed references in code-reviewer-agent.json"));
    assert_eq!(
        repairer.log()[2],
        "Populated interactsWith in coding-agent.json with 1 agents"
    );
}

#[test]
fn repair_all_is_idempotent() {
    let (dir, agents) = seeded();
    let backups = dir.path().join("backups");
    let files = agents.list_files();

    let first = Repairer::new(&backups, &agents).repair_all(&files);
    assert_eq!(first.groups_fixes, 1);
    assert_eq!(first.reference_fixes, 1);
    assert_eq!(first.interaction_fixes, 1);
    let backups_after_first = backup_count(&backups);

    let mut again = Repairer::new(&backups, &agents);
    let second = again.repair_all(&files);
    assert_eq!(second.total(), 0);
    assert!(again.log().is_empty());
    assert_eq!(backup_count(&backups), backups_after_first);
}

#[test]
fn references_resolve_after_fixing() {
    let (dir, agents) = seeded();
    let files = agents.list_files();
    Repairer::new(dir.path().join("backups"), &agents).fix_broken_references(&files);

    assert_eq!(
        interacts_with(&agents, "code-reviewer-agent"),
        json!(["coding-agent", "devops-agent"])
    );
    for path in &files {
        let doc = store::load_document(path).unwrap();
        for entry in doc["customModes"][0]["connectivity"]["interactsWith"]
            .as_array()
            .unwrap()
        {
            let name = entry.as_str().expect("only strings remain");
            assert!(!references::is_invalid(name));
            assert!(references::canonical_for(name).is_none());
        }
    }
}

#[test]
fn inferred_collaborators_exist_in_store() {
    let (dir, agents) = seeded();
    let files = agents.list_files();
    Repairer::new(dir.path().join("backups"), &agents).fix_empty_interactions(&files);
    // the other defaults (development-orchestrator-agent, tech-spec-agent) have no record
    assert_eq!(
        interacts_with(&agents, "coding-agent"),
        json!(["code-reviewer-agent"])
    );
}

#[test]
fn unknown_role_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let agents = AgentStore::new(dir.path());
    write_agent(
        &agents,
        "mystery-agent",
        json!({"slug": "mystery-agent", "connectivity": {"interactsWith": []}}),
    );
    let backups = dir.path().join("backups");
    let fixed = Repairer::new(&backups, &agents).fix_empty_interactions(&agents.list_files());
    assert_eq!(fixed, 0);
    assert_eq!(backup_count(&backups), 0);
}

#[test]
fn backup_failure_does_not_block_repair() {
    let (dir, agents) = seeded();
    // A regular file where the backup directory should be
    let blocked = dir.path().join("backups");
    fs::write(&blocked, "not a directory").unwrap();

    let mut repairer = Repairer::new(&blocked, &agents);
    assert_eq!(repairer.fix_groups_format(&agents.list_files()), 1);
    let doc = store::load_document(&agents.path_for("coding-agent")).unwrap();
    assert_eq!(doc["customModes"][0]["groups"][1], "edit");
}

#[test]
fn unreadable_records_are_skipped() {
    let (dir, agents) = seeded();
    fs::write(agents.path_for("broken-agent"), "{ nope").unwrap();
    let summary = Repairer::new(dir.path().join("backups"), &agents).repair_all(&agents.list_files());
    assert_eq!(summary.total(), 3);
    assert_eq!(fs::read_to_string(agents.path_for("broken-agent")).unwrap(), "{ nope");
}
