//! Profile resolution for agentry.
//!
//! A profile is a named, ordered list of agent ids to be installed together.
//! Resolution turns any profile source into a [`ResolvedAgentSet`]: ordered,
//! deduplicated, and validated against the registry.
//!
//! All source kinds (named hub profile, category, explicit file) resolve
//! through one code path, so no deployment mode can silently lack support
//! for user-defined profile files.

mod parser;


pub use parser::{Profile, parse_profile};

use crate::error::{AgentryError, Result};
use crate::hub::HubContext;
use crate::registry::{AgentRegistry, Category};
use std::path::PathBuf;

/// Where a profile comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    /// A named profile in the hub's profiles directory.
    Named(String),
    /// All agents in one hub category.
    Category(Category),
    /// An explicit profile file path.
    File(PathBuf),
}

/// Output of profile resolution: ordered agent ids with no duplicates,
/// every id known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAgentSet {
    ordered_ids: Vec<String>,
}

impl ResolvedAgentSet {
    /// Agent ids in resolution order.
    pub fn ordered_ids(&self) -> &[String] {
        &self.ordered_ids
    }

    /// Number of resolved agents.
    pub fn len(&self) -> usize {
        self.ordered_ids.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ordered_ids.is_empty()
    }
}

/// Resolve a profile source into a deduplicated, validated agent set.
///
/// Duplicate ids keep their first occurrence and produce a non-fatal
/// warning on stderr. Any id unknown to the registry fails the whole
/// resolve call with `UnknownAgent` (fail closed, not partial).
pub fn resolve(
    source: &ProfileSource,
    hub: &HubContext,
    registry: &AgentRegistry,
) -> Result<ResolvedAgentSet> {
    let profile = load_profile(source, hub, registry)?;
    resolve_ids(profile.agent_ids())
        .and_then(|ids| validate_against_registry(ids, registry))
        .map(|ordered_ids| ResolvedAgentSet { ordered_ids })
}

/// Load the profile behind a source, without resolving it.
pub fn load_profile(
    source: &ProfileSource,
    hub: &HubContext,
    registry: &AgentRegistry,
) -> Result<Profile> {
    match source {
        ProfileSource::Named(name) => {
            let path = hub.profile_path(name);
            if !path.is_file() {
                return Err(AgentryError::UnknownProfile(name.clone()));
            }
            parse_profile_file(&path)
        }
        ProfileSource::File(path) => {
            if !path.is_file() {
                return Err(AgentryError::ProfileParse(format!(
                    "profile file '{}' does not exist",
                    path.display()
                )));
            }
            parse_profile_file(path)
        }
        ProfileSource::Category(category) => {
            // A category behaves as a synthesized profile listing every
            // agent in that category, in registry order.
            let ids = registry
                .list(Some(*category))
                .iter()
                .map(|a| a.id.clone())
                .collect();
            Ok(Profile::synthesized(
                category.dir_name(),
                &format!("All agents in the {} category", category),
                ids,
            ))
        }
    }
}

fn parse_profile_file(path: &std::path::Path) -> Result<Profile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AgentryError::ProfileParse(format!(
            "failed to read profile '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_profile(&content, path)
}

/// Deduplicate ids, preserving first-seen order.
fn resolve_ids(ids: &[String]) -> Result<Vec<String>> {
    let mut seen = std::collections::HashSet::new();
    let mut ordered = Vec::with_capacity(ids.len());

    for id in ids {
        if seen.insert(id.as_str()) {
            ordered.push(id.clone());
        } else {
            eprintln!("Warning: duplicate agent '{}' in profile, keeping first occurrence", id);
        }
    }

    Ok(ordered)
}

/// Validate every id against the registry; unknown ids fail the whole call.
fn validate_against_registry(ids: Vec<String>, registry: &AgentRegistry) -> Result<Vec<String>> {
    for id in &ids {
        if !registry.contains(id) {
            return Err(AgentryError::UnknownAgent(id.clone()));
        }
    }
    Ok(ids)
}

/// List all profiles available in the hub, sorted by name.
pub fn list_profiles(hub: &HubContext) -> Result<Vec<Profile>> {
    if !hub.profiles_dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(&hub.profiles_dir).map_err(|e| {
        AgentryError::ProfileParse(format!(
            "failed to read profiles directory '{}': {}",
            hub.profiles_dir.display(),
            e
        ))
    })?;

    let mut profiles = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            AgentryError::ProfileParse(format!("failed to read profiles entry: {}", e))
        })?;
        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some("profile") {
            continue;
        }

        match parse_profile_file(&path) {
            Ok(profile) => profiles.push(profile),
            Err(e) => eprintln!("Warning: skipping profile '{}': {}", path.display(), e),
        }
    }

    profiles.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(profiles)
}
