//! Deployment of resolved agent sets onto the filesystem.

mod engine;
mod report;
mod target;


pub use engine::{CancelFlag, InstallOptions, LOCK_FILE, install, uninstall};
pub use report::{EntryOutcome, EntryStatus, InstallReport, OverallStatus, UninstallReport};
pub use target::{DeployMode, DeploymentScope, DeploymentTarget, PROJECT_AGENTS_DIR};

pub(crate) use engine::{entry_path, hash_file, place_entry, record_for};
