use super::*;
use crate::config::Config;
use crate::deploy::{
    DeploymentScope, InstallOptions, PROJECT_AGENTS_DIR, install,
};
use crate::hub::HubContext;
use crate::test_support::{create_test_hub, create_test_project};
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    hub_dir: TempDir,
    registry: AgentRegistry,
    project_dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let hub_dir = create_test_hub();
        let hub = HubContext::resolve_from(hub_dir.path()).unwrap();
        let registry = AgentRegistry::load(&hub.category_roots()).unwrap();
        Self {
            hub_dir,
            registry,
            project_dir: create_test_project(),
        }
    }

    fn target(&self, mode: DeployMode) -> DeploymentTarget {
        DeploymentTarget::new(
            DeploymentScope::Project(self.project_dir.path().to_path_buf()),
            mode,
        )
    }

    fn root(&self) -> PathBuf {
        self.project_dir.path().join(PROJECT_AGENTS_DIR)
    }

    fn install(&self, ids: &[&str], mode: DeployMode) {
        let ids: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
        let report = install(
            &self.registry,
            &ids,
            &self.target(mode),
            &Config::default(),
            &InstallOptions::default(),
        )
        .unwrap();
        assert_eq!(report.count(EntryStatus::Failed), 0);
    }

    fn status_of(&self, report: &HealthReport, id: &str) -> HealthStatus {
        report
            .entries
            .iter()
            .find(|e| e.agent_id == id)
            .unwrap()
            .status
    }
}

#[test]
fn fresh_install_is_all_ok() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader", "nextjs-pro"], DeployMode::Symlink);

    let report = check(&fixture.target(DeployMode::Symlink)).unwrap();

    assert_eq!(report.entries.len(), 2);
    assert!(report.all_ok());
    assert!(report.foreign.is_empty());
}

#[test]
fn missing_target_root_is_empty_and_ok() {
    let fixture = Fixture::new();
    let report = check(&fixture.target(DeployMode::Symlink)).unwrap();

    assert!(report.entries.is_empty());
    assert!(report.all_ok());
}

#[test]
fn deleted_entry_is_missing() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader"], DeployMode::Symlink);
    std::fs::remove_file(fixture.root().join("config-reader.md")).unwrap();

    let report = check(&fixture.target(DeployMode::Symlink)).unwrap();

    assert_eq!(fixture.status_of(&report, "config-reader"), HealthStatus::Missing);
    assert!(!report.all_ok());
}

#[test]
fn removed_hub_source_is_broken_link() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader"], DeployMode::Symlink);

    let source = fixture
        .registry
        .lookup("config-reader")
        .unwrap()
        .source_path
        .clone();
    std::fs::remove_file(&source).unwrap();

    let report = check(&fixture.target(DeployMode::Symlink)).unwrap();

    assert_eq!(
        fixture.status_of(&report, "config-reader"),
        HealthStatus::BrokenLink
    );
}

#[test]
fn edited_copy_is_drifted() {
    let fixture = Fixture::new();
    fixture.install(&["nextjs-pro"], DeployMode::Copy);

    std::fs::write(fixture.root().join("nextjs-pro.md"), "edited locally\n").unwrap();

    let report = check(&fixture.target(DeployMode::Copy)).unwrap();

    assert_eq!(fixture.status_of(&report, "nextjs-pro"), HealthStatus::Drifted);
}

#[test]
fn relinked_symlink_is_drifted() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader"], DeployMode::Symlink);

    let dest = fixture.root().join("config-reader.md");
    let other = fixture
        .registry
        .lookup("code-reviewer")
        .unwrap()
        .source_path
        .clone();
    std::fs::remove_file(&dest).unwrap();
    std::os::unix::fs::symlink(&other, &dest).unwrap();

    let report = check(&fixture.target(DeployMode::Symlink)).unwrap();

    assert_eq!(
        fixture.status_of(&report, "config-reader"),
        HealthStatus::Drifted
    );
}

#[test]
fn foreign_files_are_reported_not_tracked() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader"], DeployMode::Symlink);
    std::fs::write(fixture.root().join("notes.md"), "scratch\n").unwrap();

    let report = check(&fixture.target(DeployMode::Symlink)).unwrap();

    assert!(report.all_ok());
    assert_eq!(report.foreign.len(), 1);
    assert!(report.foreign[0].ends_with("notes.md"));
}

#[test]
fn bookkeeping_files_are_not_foreign() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader"], DeployMode::Symlink);

    // Record store, lock-era leftovers, audit log, backups.
    std::fs::write(
        fixture.root().join("config-reader.md.bak.20260101000000"),
        "old\n",
    )
    .unwrap();

    let report = check(&fixture.target(DeployMode::Symlink)).unwrap();
    assert!(report.foreign.is_empty());
}

#[test]
fn repair_restores_missing_and_drifted_entries() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader"], DeployMode::Symlink);
    fixture.install(&["nextjs-pro"], DeployMode::Copy);

    std::fs::remove_file(fixture.root().join("config-reader.md")).unwrap();
    std::fs::write(fixture.root().join("nextjs-pro.md"), "edited locally\n").unwrap();

    let target = fixture.target(DeployMode::Symlink);
    let report = repair(&target, &fixture.registry, &Config::default()).unwrap();

    assert_eq!(report.modified_count(), 2);
    assert!(report.all_repaired());

    let after = check(&target).unwrap();
    assert!(after.all_ok());

    // Recorded modes were reused, not the repair call's mode.
    assert!(fixture.root().join("config-reader.md").is_symlink());
    assert!(
        std::fs::symlink_metadata(fixture.root().join("nextjs-pro.md"))
            .unwrap()
            .is_file()
    );
}

#[test]
fn repair_is_idempotent() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader", "nextjs-pro"], DeployMode::Symlink);
    std::fs::remove_file(fixture.root().join("config-reader.md")).unwrap();

    let target = fixture.target(DeployMode::Symlink);
    let first = repair(&target, &fixture.registry, &Config::default()).unwrap();
    assert_eq!(first.modified_count(), 1);

    let second = repair(&target, &fixture.registry, &Config::default()).unwrap();
    assert_eq!(second.modified_count(), 0);
}

#[test]
fn repair_never_touches_foreign_files() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader"], DeployMode::Symlink);
    std::fs::remove_file(fixture.root().join("config-reader.md")).unwrap();

    let foreign = fixture.root().join("notes.md");
    std::fs::write(&foreign, "scratch\n").unwrap();

    repair(&fixture.target(DeployMode::Symlink), &fixture.registry, &Config::default()).unwrap();

    assert_eq!(std::fs::read_to_string(&foreign).unwrap(), "scratch\n");
}

#[test]
fn repair_fails_entry_whose_agent_left_the_registry() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader"], DeployMode::Symlink);
    std::fs::remove_file(fixture.root().join("config-reader.md")).unwrap();

    // Reload the registry with the agent's hub file gone.
    let source = fixture
        .registry
        .lookup("config-reader")
        .unwrap()
        .source_path
        .clone();
    std::fs::remove_file(&source).unwrap();
    let hub = HubContext::resolve_from(fixture.hub_dir.path()).unwrap();
    let registry = AgentRegistry::load(&hub.category_roots()).unwrap();

    let report = repair(&fixture.target(DeployMode::Symlink), &registry, &Config::default()).unwrap();

    assert_eq!(report.modified_count(), 0);
    assert!(!report.all_repaired());
    assert!(
        report.failed[0]
            .message
            .as_ref()
            .unwrap()
            .contains("no longer in the registry")
    );
}

#[test]
fn repair_honors_the_configured_timeout_budget() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader"], DeployMode::Symlink);
    std::fs::remove_file(fixture.root().join("config-reader.md")).unwrap();

    // Placement runs under the configured bound; a zero retry budget still
    // succeeds on a healthy filesystem.
    let config = Config {
        fs_timeout_ms: 2000,
        timeout_retries: 0,
        ..Config::default()
    };
    let report = repair(&fixture.target(DeployMode::Symlink), &fixture.registry, &config).unwrap();

    assert_eq!(report.modified_count(), 1);
    assert!(report.all_repaired());
    assert!(fixture.root().join("config-reader.md").is_symlink());
}

#[test]
fn repair_appends_audit_event_only_when_mutating() {
    let fixture = Fixture::new();
    fixture.install(&["config-reader"], DeployMode::Symlink);

    // All ok: no event beyond the install one.
    repair(&fixture.target(DeployMode::Symlink), &fixture.registry, &Config::default()).unwrap();
    let log = std::fs::read_to_string(fixture.root().join(crate::events::EVENTS_FILE)).unwrap();
    assert_eq!(log.lines().count(), 1);

    std::fs::remove_file(fixture.root().join("config-reader.md")).unwrap();
    repair(&fixture.target(DeployMode::Symlink), &fixture.registry, &Config::default()).unwrap();
    let log = std::fs::read_to_string(fixture.root().join(crate::events::EVENTS_FILE)).unwrap();
    assert_eq!(log.lines().count(), 2);
    assert!(log.contains("\"repair\""));
}
