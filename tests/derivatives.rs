use agentcheck::core::config::Workspace;
use agentcheck::core::error::AgentCheckError;
use agentcheck::core::store::{self, AgentStore};
use agentcheck::plugins::{cursor, guide};
use serde_json::json;
use std::fs;

fn workspace_with_agents(slugs: &[(&str, &str)]) -> (tempfile::TempDir, Workspace) {
    let dir = tempfile::tempdir().unwrap();
    let mut ws = Workspace::with_defaults(dir.path());
    ws.priority = vec!["uber-orchestrator-agent".to_string(), "coding-agent".to_string()];
    fs::create_dir_all(&ws.agents_dir).unwrap();
    let agents = AgentStore::new(&ws.agents_dir);
    for (slug, role) in slugs {
        store::write_document(
            &agents.path_for(slug),
            &json!({"customModes": [{
                "slug": slug,
                "name": slug.replace('-', " "),
                "roleDefinition": role,
                "description": format!("{slug} description"),
                "connectivity": {"interactsWith": ["coding-agent"]}
            }]}),
        )
        .unwrap();
    }
    (dir, ws)
}

#[test]
fn cursor_rules_follow_priority_then_file_order() {
    let (_dir, ws) = workspace_with_agents(&[
        ("alpha-agent", "Does alpha things."),
        ("coding-agent", "Writes code."),
        ("uber-orchestrator-agent", "Runs everything."),
    ]);
    let count = cursor::sync_cursor_rules(&ws, false).unwrap();
    assert_eq!(count, 3);

    let rules = fs::read_to_string(&ws.cursor_rules_file).unwrap();
    let uber = rules.find("## @uber-orchestrator-agent").unwrap();
    let coding = rules.find("## @coding-agent").unwrap();
    let alpha = rules.find("## @alpha-agent").unwrap();
    assert!(uber < coding && coding < alpha);
    assert!(rules.contains("### Collaborates with:\n- @coding-agent\n"));
    assert!(rules.contains("alpha-agent description\n\n"));
}

#[test]
fn cursor_backup_keeps_previous_rules() {
    let (_dir, ws) = workspace_with_agents(&[("coding-agent", "Writes code.")]);
    fs::write(&ws.cursor_rules_file, "old rules").unwrap();
    cursor::sync_cursor_rules(&ws, true).unwrap();

    let backups: Vec<_> = fs::read_dir(&ws.backup_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "old rules");
    let name = backups[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("cursorrules_") && name.ends_with(".txt"));
}

#[test]
fn cursor_sync_without_agents_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::with_defaults(dir.path());
    assert!(matches!(
        cursor::sync_cursor_rules(&ws, false),
        Err(AgentCheckError::NotFound(_))
    ));
}

#[test]
fn guide_is_categorized_and_spliced_into_template() {
    let (_dir, ws) = workspace_with_agents(&[
        ("uber-orchestrator-agent", "Coordinates all agents. Delegates work."),
        ("coding-agent", "Implements features"),
        ("functional-tester-agent", ""),
        ("odd-one-agent", "Does odd things."),
    ]);
    fs::create_dir_all(ws.template_file.parent().unwrap()).unwrap();
    fs::write(
        &ws.template_file,
        "# Step Template\n\n### Agent Discovery Process\nLook around.\n\n### Task Format\nDetails.\n",
    )
    .unwrap();

    let total = guide::update_template(&ws).unwrap();
    assert_eq!(total, 4);
    let content = fs::read_to_string(&ws.template_file).unwrap();
    assert!(content.contains("**Total Agents Available: 4**"));
    assert!(content.contains(
        "**Orchestration & Management:**\n- `@uber-orchestrator-agent` - Coordinates all agents\n"
    ));
    assert!(content.contains("**Development & Technical:**\n- `@coding-agent` - Implements features\n"));
    // empty roleDefinition falls back to the name
    assert!(content.contains("- `@functional-tester-agent` - functional tester agent\n"));
    assert!(content.contains("**Specialized Tools:**\n- `@odd-one-agent` - Does odd things\n"));

    let discovery = content.find("### Agent Discovery Process").unwrap();
    let guide_at = content.find("### Quick Agent Reference Guide").unwrap();
    let task = content.find("### Task Format").unwrap();
    assert!(discovery < guide_at && guide_at < task);

    // a second run replaces the section instead of adding another
    guide::update_template(&ws).unwrap();
    let again = fs::read_to_string(&ws.template_file).unwrap();
    assert_eq!(again.matches("### Quick Agent Reference Guide").count(), 1);
    assert_eq!(again, content);
}

#[test]
fn guide_requires_template() {
    let (_dir, ws) = workspace_with_agents(&[("coding-agent", "Writes code.")]);
    assert!(matches!(
        guide::update_template(&ws),
        Err(AgentCheckError::NotFound(_))
    ));
}
