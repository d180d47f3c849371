//! Agent registry for agentry.
//!
//! The registry is a read-only catalog of the agent definitions available in
//! the hub: id, category, declared tools, and the source path used by the
//! deployment engine. Definitions are immutable once loaded.
//!
//! Loading walks the fixed, ordered list of category directories and parses
//! each agent file's frontmatter header. Two files declaring the same id
//! within one load are a fatal `DuplicateAgentId` error; a file with a
//! malformed header is reported as a warning and excluded so the registry
//! stays usable when individual agent files are broken.

mod header;


pub use header::AgentHeader;

use crate::error::{AgentryError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Agent category, one per hub subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    /// Simple single-purpose agents.
    Core,
    /// Standard development agents.
    Development,
    /// Complex-reasoning and enterprise agents.
    Specialists,
}

impl Category {
    /// Directory name for this category.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Core => "core",
            Category::Development => "development",
            Category::Specialists => "specialists",
        }
    }

    /// Parse a category from its directory name.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "core" => Some(Category::Core),
            "development" => Some(Category::Development),
            "specialists" => Some(Category::Specialists),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// An immutable agent definition loaded from the hub.
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    /// Unique agent id (frontmatter `name`, falling back to the file stem).
    pub id: String,

    /// Category derived from the containing directory.
    pub category: Category,

    /// Human-readable description from the frontmatter.
    pub description: String,

    /// Declared tool permissions.
    pub declared_tools: Vec<String>,

    /// Absolute path to the source file in the hub.
    pub source_path: PathBuf,
}

/// Read-only catalog of available agent definitions.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    // BTreeMap keeps list() output deterministic.
    agents: BTreeMap<String, AgentDefinition>,

    /// Paths excluded during load because their header was malformed.
    skipped: Vec<(PathBuf, String)>,
}

impl AgentRegistry {
    /// Load the registry from an ordered list of category root directories.
    ///
    /// Missing category directories are skipped. Files within each directory
    /// are visited in filename order so duplicate detection is deterministic.
    ///
    /// # Returns
    ///
    /// * `Ok(AgentRegistry)` - Usable registry (possibly with skipped files)
    /// * `Err(AgentryError::DuplicateAgentId)` - Two files declare the same id
    pub fn load(root_paths: &[PathBuf]) -> Result<Self> {
        let mut agents: BTreeMap<String, AgentDefinition> = BTreeMap::new();
        let mut skipped = Vec::new();

        for root in root_paths {
            if !root.is_dir() {
                continue;
            }

            let category = root
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(Category::from_dir_name)
                .unwrap_or(Category::Core);

            for path in agent_files(root)? {
                match header::parse_agent_file(&path) {
                    Ok(hdr) => {
                        let id = hdr.effective_id(&path);

                        if let Some(existing) = agents.get(&id) {
                            return Err(AgentryError::DuplicateAgentId {
                                id,
                                first: existing.source_path.clone(),
                                second: path,
                            });
                        }

                        agents.insert(
                            id.clone(),
                            AgentDefinition {
                                id,
                                category,
                                description: hdr.description,
                                declared_tools: hdr.tools,
                                source_path: path,
                            },
                        );
                    }
                    Err(reason) => {
                        eprintln!(
                            "Warning: skipping agent file '{}': {}",
                            path.display(),
                            reason
                        );
                        skipped.push((path, reason));
                    }
                }
            }
        }

        Ok(Self { agents, skipped })
    }

    /// Look up an agent by id.
    pub fn lookup(&self, id: &str) -> Option<&AgentDefinition> {
        self.agents.get(id)
    }

    /// Whether an agent id exists in the registry.
    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// List agents, optionally filtered by category, in id order.
    pub fn list(&self, category: Option<Category>) -> Vec<&AgentDefinition> {
        self.agents
            .values()
            .filter(|a| category.is_none_or(|c| a.category == c))
            .collect()
    }

    /// Number of loaded agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Files excluded during load and the reason each was skipped.
    pub fn skipped_files(&self) -> &[(PathBuf, String)] {
        &self.skipped
    }
}

/// Collect `.md` agent files in a directory, sorted by filename.
fn agent_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        AgentryError::RegistryLoad(format!(
            "failed to read agent directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            AgentryError::RegistryLoad(format!("failed to read directory entry: {}", e))
        })?;
        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        // Documentation files live alongside agent definitions in the hub.
        if matches!(
            path.file_name().and_then(|n| n.to_str()),
            Some("README.md")
        ) {
            continue;
        }

        files.push(path);
    }

    files.sort();
    Ok(files)
}
