//! Cursor rules projection.
//!
//! Renders every agent record into one markdown-like instruction file,
//! priority agents first, so editors can invoke agents with `@slug`.

use crate::core::backup;
use crate::core::config::Workspace;
use crate::core::error::AgentCheckError;
use crate::core::store::{self, AgentStore};
use rustc_hash::FxHashSet;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

pub const CURSOR_HEADER: &str = "# Specialized AI Agents for Cursor

This file contains specialized AI agents converted from the agent definition records.
Each agent has specific expertise and can be invoked using @agent-name syntax.

## Usage
- Use @agent-name to invoke a specific agent
- Agents can collaborate with each other as specified in their connectivity
- Each agent has specialized knowledge and capabilities

## Available Agents

";

/// One agent block. Empty when the document has no mode definition.
pub fn render_agent(doc: &Value, slug: &str) -> String {
    let Some(mode) = store::first_mode(doc) else {
        return String::new();
    };
    let text = |key: &str| mode.get(key).and_then(Value::as_str).unwrap_or("");
    let name = mode.get("name").and_then(Value::as_str).unwrap_or(slug);

    let mut out = format!("## @{slug}\n\n**{name}**\n\n");
    let description = text("description");
    if !description.is_empty() {
        out.push_str(description);
        out.push_str("\n\n");
    }
    let instructions = text("instructions");
    if !instructions.is_empty() {
        out.push_str(&format!("### Instructions:\n{instructions}\n\n"));
    }
    let collaborators = mode
        .get("connectivity")
        .and_then(|c| c.get("interactsWith"))
        .and_then(Value::as_array)
        .filter(|list| !list.is_empty());
    if let Some(list) = collaborators {
        out.push_str("### Collaborates with:\n");
        for agent in list {
            match agent.as_str() {
                Some(s) => out.push_str(&format!("- @{s}\n")),
                None => out.push_str(&format!("- @{agent}\n")),
            }
        }
        out.push('\n');
    }
    out.push_str("---\n\n");
    out
}

/// Full rules text and the number of agents rendered.
///
/// Priority slugs with a record come first in priority order; every other
/// record follows in file-name order. Unreadable records are skipped.
pub fn render_rules(agent_store: &AgentStore, priority: &[&str]) -> (String, usize) {
    let mut content = String::from(CURSOR_HEADER);
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut rendered = 0;

    let ordered: Vec<(String, PathBuf)> = priority
        .iter()
        .map(|slug| (slug.to_string(), agent_store.path_for(slug)))
        .filter(|(_, path)| path.is_file())
        .chain(
            agent_store
                .list_files()
                .into_iter()
                .filter_map(|path| store::storage_key(&path).map(|slug| (slug, path))),
        )
        .collect();

    for (slug, path) in ordered {
        if !seen.insert(slug.clone()) {
            continue;
        }
        let Some(doc) = store::load_document(&path) else {
            continue;
        };
        let block = render_agent(&doc, &slug);
        if !block.is_empty() {
            content.push_str(&block);
            rendered += 1;
        }
    }
    (content, rendered)
}

/// Regenerate the cursor rules file, optionally backing up the current one.
pub fn sync_cursor_rules(ws: &Workspace, backup: bool) -> Result<usize, AgentCheckError> {
    let agent_store = AgentStore::new(&ws.agents_dir);
    if agent_store.list_files().is_empty() {
        return Err(AgentCheckError::NotFound(format!(
            "no agent files in {}",
            ws.agents_dir.display()
        )));
    }
    if backup && ws.cursor_rules_file.exists() {
        match backup::backup_file_as(&ws.backup_dir, &ws.cursor_rules_file, "cursorrules", "txt") {
            Ok(copy) => info!(backup = %copy.display(), "backed up cursor rules"),
            Err(e) => warn!(error = %e, "cursor rules backup failed"),
        }
    }
    let (content, count) = render_rules(&agent_store, &ws.priority_refs());
    if let Some(parent) = ws.cursor_rules_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&ws.cursor_rules_file, content)?;
    info!(file = %ws.cursor_rules_file.display(), count, "generated cursor rules");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn block_includes_optional_parts_only_when_present() {
        let doc = json!({"customModes": [{
            "slug": "coding-agent",
            "name": "Coding Agent",
            "instructions": "Write code.",
            "connectivity": {"interactsWith": ["code-reviewer-agent"]}
        }]});
        let block = render_agent(&doc, "coding-agent");
        assert_eq!(
            block,
            "## @coding-agent\n\n**Coding Agent**\n\n### Instructions:\nWrite code.\n\n### Collaborates with:\n- @code-reviewer-agent\n\n---\n\n"
        );
    }

    #[test]
    fn name_falls_back_to_slug() {
        let doc = json!({"customModes": [{"connectivity": {"interactsWith": []}}]});
        assert_eq!(render_agent(&doc, "x-agent"), "## @x-agent\n\n**x-agent**\n\n---\n\n");
        assert_eq!(render_agent(&json!({"customModes": []}), "x-agent"), "");
    }

    #[test]
    fn priority_agents_render_first() {
        let dir = tempfile::tempdir().unwrap();
        for slug in ["a-agent", "b-agent", "z-agent"] {
            store::write_document(
                &dir.path().join(format!("{slug}.json")),
                &json!({"customModes": [{"slug": slug, "name": slug}]}),
            )
            .unwrap();
        }
        let (content, count) = render_rules(&AgentStore::new(dir.path()), &["z-agent", "ghost-agent"]);
        assert_eq!(count, 3);
        let z = content.find("## @z-agent").unwrap();
        let a = content.find("## @a-agent").unwrap();
        let b = content.find("## @b-agent").unwrap();
        assert!(z < a && a < b);
        assert!(content.starts_with(CURSOR_HEADER));
    }
}
