use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a minimal agent definition file into a hub category directory.
pub(crate) fn write_agent(hub: &Path, category: &str, id: &str, tools: &str) -> PathBuf {
    let dir = hub.join("agents").join(category);
    std::fs::create_dir_all(&dir).unwrap();

    let path = dir.join(format!("{}.md", id));
    let content = format!(
        "---\nname: {}\ndescription: Test agent {}\ntools: {}\n---\n\nYou are {}.\n",
        id, id, tools, id
    );
    std::fs::write(&path, content).unwrap();
    path
}

/// Write a profile file into the hub's profiles directory.
pub(crate) fn write_profile(hub: &Path, name: &str, content: &str) -> PathBuf {
    let dir = hub.join("profiles");
    std::fs::create_dir_all(&dir).unwrap();

    let path = dir.join(format!("{}.profile", name));
    std::fs::write(&path, content).unwrap();
    path
}

/// Create a scratch hub with the standard category layout and a small set of
/// agents covering every routing tier.
pub(crate) fn create_test_hub() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let hub = temp_dir.path();

    for category in ["core", "development", "specialists"] {
        std::fs::create_dir_all(hub.join("agents").join(category)).unwrap();
    }
    std::fs::create_dir_all(hub.join("profiles")).unwrap();

    write_agent(hub, "core", "config-reader", "Read");
    write_agent(hub, "core", "orchestrate-tasks", "Read, Bash");
    write_agent(hub, "development", "nextjs-pro", "Read, Write, Edit");
    write_agent(hub, "development", "code-reviewer", "Read, Grep");
    write_agent(hub, "specialists", "security-auditor", "Read, Grep, Bash");
    write_agent(hub, "specialists", "orchestrate-agents", "Read, Bash");
    write_agent(hub, "specialists", "orchestrate-agents-adv", "Read, Bash");

    write_profile(
        hub,
        "backend",
        "name: backend\ndescription: Backend development agents\n\nagents:\n- nextjs-pro\n- code-reviewer\n",
    );

    temp_dir
}

/// Create a scratch project directory for project-scope deployments.
pub(crate) fn create_test_project() -> TempDir {
    TempDir::new().unwrap()
}
