//! Lifecycle Engine
//!
//! The `Ims` context ties the config, the event log and a command runner
//! together and implements the install/remove/commit/tag state machine.
//! Every operation returns a value describing what happened; printing and
//! exit codes are left to the caller.

mod packages;
mod tags;

use std::path::Path;

use crate::config::Config;
use crate::error::ImsResult;
use crate::event_store::{get_installed, EventLog, EventStoreConfig};
use crate::executor::{CommandRunner, SystemRunner};
use crate::import::AptHistoryEntry;
use crate::resolver::ResolvedCommand;
use crate::script::{generate_install_script, InstallScript};
use crate::types::{InstallState, PackageRecord};

/// Result of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub command: ResolvedCommand,
    /// Which sequence the install was recorded in
    pub state: InstallState,
}

/// Result of a successful remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub command: ResolvedCommand,
    /// A pending install of the same package was dropped from the uncommitted log
    pub cancelled_pending: bool,
}

/// Result of `commit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    NothingToCommit,
    Committed(usize),
}

/// Result of `add_tag` / `remove_tag`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    Added,
    AlreadyExists,
    Removed,
    NotFound,
}

/// IMS context: configuration, event log and command runner
pub struct Ims<'a, R: CommandRunner = SystemRunner> {
    pub(crate) config: &'a Config,
    pub(crate) log: EventLog,
    pub(crate) runner: R,
}

impl<'a> Ims<'a, SystemRunner> {
    /// Open the log in the configured data folder, running real commands
    pub fn open(config: &'a Config) -> ImsResult<Self> {
        Self::open_with_runner(config, SystemRunner)
    }
}

impl<'a, R: CommandRunner> Ims<'a, R> {
    /// Open the log in the configured data folder with a custom runner
    pub fn open_with_runner(config: &'a Config, runner: R) -> ImsResult<Self> {
        let log = EventLog::load(EventStoreConfig::new(config.data_dir()))?;
        Ok(Self::with_log(config, log, runner))
    }

    /// Build a context around an already loaded log
    pub fn with_log(config: &'a Config, log: EventLog, runner: R) -> Self {
        Self { config, log, runner }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn data_dir(&self) -> &Path {
        self.log.config().data_dir()
    }

    // Package operations (from packages.rs)
    pub fn install(&mut self, spec: &str, commit_immediately: bool) -> ImsResult<InstallOutcome> {
        packages::install(self, spec, commit_immediately)
    }

    pub fn remove(&mut self, spec: &str) -> ImsResult<RemoveOutcome> {
        packages::remove(self, spec)
    }

    pub fn commit(&mut self) -> ImsResult<CommitOutcome> {
        packages::commit(self)
    }

    pub fn import_apt_history(&mut self, entries: &[AptHistoryEntry]) -> ImsResult<usize> {
        packages::import_apt_history(self, entries)
    }

    // Tag operations (from tags.rs)
    pub fn add_tag(&mut self, tag_name: &str) -> ImsResult<TagOutcome> {
        tags::add_tag(self, tag_name)
    }

    pub fn remove_tag(&mut self, tag_name: &str) -> ImsResult<TagOutcome> {
        tags::remove_tag(self, tag_name)
    }

    // Read-only views
    pub fn installed(&self, tag: Option<&str>) -> Vec<PackageRecord> {
        get_installed(&self.log, tag)
    }

    pub fn install_script(&self, tag: Option<&str>) -> Option<InstallScript> {
        generate_install_script(&self.log, tag)
    }
}
