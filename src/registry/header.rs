//! Agent file frontmatter parsing.
//!
//! Agent definitions are markdown files with a YAML frontmatter header:
//!
//! ```markdown
//! ---
//! name: code-reviewer
//! description: Reviews code changes for defects and style issues
//! tools: Read, Grep, Edit
//! ---
//!
//! Prompt body...
//! ```
//!
//! `tools` may be a comma-separated string or a YAML list; both forms exist
//! in the wild. The body is ignored by the registry; only the header matters
//! for resolution and deployment.

use serde::Deserialize;
use std::path::Path;

/// Parsed frontmatter header of an agent file.
#[derive(Debug, Clone, Default)]
pub struct AgentHeader {
    /// Declared agent id. Empty when the header omits `name`.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Declared tool permissions.
    pub tools: Vec<String>,
}

impl AgentHeader {
    /// The effective agent id: the declared name, or the file stem when the
    /// header omits one.
    pub fn effective_id(&self, path: &Path) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    }
}

/// Raw deserialization target; `tools` accepts both string and list forms.
#[derive(Debug, Deserialize)]
struct RawHeader {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tools: RawTools,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTools {
    CommaSeparated(String),
    List(Vec<String>),
}

impl Default for RawTools {
    fn default() -> Self {
        RawTools::CommaSeparated(String::new())
    }
}

impl RawTools {
    fn into_vec(self) -> Vec<String> {
        match self {
            RawTools::CommaSeparated(s) => s
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            RawTools::List(list) => list,
        }
    }
}

/// Parse an agent file's frontmatter header.
///
/// Returns a human-readable reason string on failure; the registry reports
/// it as a warning and excludes the file rather than failing the load.
pub fn parse_agent_file(path: &Path) -> std::result::Result<AgentHeader, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read file: {}", e))?;

    parse_frontmatter(&content)
}

/// Parse the frontmatter block out of agent file content.
pub fn parse_frontmatter(content: &str) -> std::result::Result<AgentHeader, String> {
    let rest = content
        .strip_prefix("---")
        .ok_or_else(|| "missing frontmatter header (expected leading ---)".to_string())?;

    let end = rest
        .find("\n---")
        .ok_or_else(|| "unterminated frontmatter header (missing closing ---)".to_string())?;

    let yaml = &rest[..end];

    let raw: RawHeader =
        serde_yaml::from_str(yaml).map_err(|e| format!("invalid frontmatter YAML: {}", e))?;

    Ok(AgentHeader {
        name: raw.name,
        description: raw.description,
        tools: raw.tools.into_vec(),
    })
}
