//! Profile file parsing.
//!
//! Profiles are plain-text files:
//!
//! ```text
//! name: backend
//! description: Backend development agents
//!
//! agents:
//! - nextjs-pro
//! - code-reviewer  # review every change
//! ```
//!
//! Header lines are `key: value` pairs. The `agents:` marker starts the
//! agent list; each following non-blank line names one agent, with or
//! without a leading `- `. Everything after a `#` on a line is a comment.
//! The parser does not care whether the file ends with a newline.

use crate::error::{AgentryError, Result};
use std::path::Path;

/// A parsed profile: name, description, and the ordered agent id list as
/// written (duplicates included; resolution deduplicates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Profile name from the header, falling back to the file stem.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    agent_ids: Vec<String>,
}

impl Profile {
    /// Agent ids in file order, duplicates preserved.
    pub fn agent_ids(&self) -> &[String] {
        &self.agent_ids
    }

    /// Build a profile that has no backing file, e.g. for a category.
    pub(crate) fn synthesized(name: &str, description: &str, agent_ids: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            agent_ids,
        }
    }
}

/// Parse profile file content. `path` is used for error messages and the
/// name fallback only.
pub fn parse_profile(content: &str, path: &Path) -> Result<Profile> {
    let mut name = String::new();
    let mut description = String::new();
    let mut agent_ids = Vec::new();
    let mut in_agents = false;

    for (lineno, raw_line) in content.lines().enumerate() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        if line == "agents:" {
            in_agents = true;
            continue;
        }

        if in_agents {
            let id = line.strip_prefix("- ").unwrap_or(line).trim();
            if id.is_empty() {
                continue;
            }
            agent_ids.push(id.to_string());
        } else if let Some((key, value)) = line.split_once(':') {
            match key.trim() {
                "name" => name = value.trim().to_string(),
                "description" => description = value.trim().to_string(),
                // Unknown header keys are tolerated for forward compatibility.
                _ => {}
            }
        } else {
            return Err(AgentryError::ProfileParse(format!(
                "{}:{}: expected 'key: value' before the agents: section, got '{}'",
                path.display(),
                lineno + 1,
                line
            )));
        }
    }

    if !in_agents {
        return Err(AgentryError::ProfileParse(format!(
            "{}: missing agents: section",
            path.display()
        )));
    }

    if name.is_empty() {
        name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
    }

    Ok(Profile {
        name,
        description,
        agent_ids,
    })
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}
