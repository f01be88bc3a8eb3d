//! Event Log - durable storage of the two event sequences
//!
//! Both sequences are loaded fully into memory and every save rewrites the
//! whole file. There is no locking: two concurrent invocations race and the
//! last writer wins.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ImsResult;
use crate::types::{Event, InstallState};
use crate::utils::{atomic_write, remove_stale_temp};

/// Location of the persisted log
#[derive(Debug, Clone)]
pub struct EventStoreConfig {
    /// Path to the data directory
    pub data_dir: PathBuf,
}

impl EventStoreConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get path to uncommitted.json
    pub fn uncommitted_path(&self) -> PathBuf {
        self.data_dir.join("uncommitted.json")
    }

    /// Get path to committed.json
    pub fn committed_path(&self) -> PathBuf {
        self.data_dir.join("committed.json")
    }
}

/// The two event sequences
///
/// `uncommitted` holds pending installs only. `committed` holds committed
/// installs, removes, commit markers and tags in append order; that order
/// is what replay and tags depend on.
#[derive(Debug)]
pub struct EventLog {
    config: EventStoreConfig,
    uncommitted: Vec<Event>,
    committed: Vec<Event>,
    corrupt_files: Vec<PathBuf>,
}

impl EventLog {
    /// Create an empty log that will persist to `config`'s directory
    pub fn new(config: EventStoreConfig) -> Self {
        Self {
            config,
            uncommitted: Vec::new(),
            committed: Vec::new(),
            corrupt_files: Vec::new(),
        }
    }

    /// Create a log from existing sequences (nothing is written)
    pub fn from_events(
        config: EventStoreConfig,
        uncommitted: Vec<Event>,
        committed: Vec<Event>,
    ) -> Self {
        Self {
            config,
            uncommitted,
            committed,
            corrupt_files: Vec::new(),
        }
    }

    /// Load both sequences from the data directory
    ///
    /// A missing file is an empty sequence. A file that cannot be decoded
    /// is also treated as empty; it is logged and listed in
    /// [`EventLog::corrupt_files`] so the caller can warn the user, since
    /// the next save of that sequence will overwrite it.
    pub fn load(config: EventStoreConfig) -> ImsResult<Self> {
        fs::create_dir_all(config.data_dir())?;

        for path in [config.uncommitted_path(), config.committed_path()] {
            match remove_stale_temp(&path) {
                Ok(true) => debug!(path = %path.display(), "Removed leftover temp file"),
                Ok(false) => {}
                Err(error) => warn!(%error, "Could not remove leftover temp file"),
            }
        }

        let mut log = Self::new(config);

        let uncommitted_path = log.config.uncommitted_path();
        let committed_path = log.config.committed_path();
        log.uncommitted = log.load_file(&uncommitted_path);
        log.committed = log.load_file(&committed_path);

        let before = log.uncommitted.len();
        log.uncommitted.retain(|event| {
            matches!(event, Event::Install(record) if record.state == InstallState::Uncommitted)
        });
        if log.uncommitted.len() != before {
            warn!(
                dropped = before - log.uncommitted.len(),
                "Ignoring entries in uncommitted log that are not pending installs"
            );
        }

        debug!(
            uncommitted = log.uncommitted.len(),
            committed = log.committed.len(),
            "Loaded event log"
        );

        Ok(log)
    }

    fn load_file(&mut self, path: &Path) -> Vec<Event> {
        if !path.exists() {
            return Vec::new();
        }

        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<Vec<Event>>(&content).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(events) => events,
            Err(error) => {
                warn!(
                    path = %path.display(),
                    %error,
                    "Error reading event log, starting with empty list"
                );
                self.corrupt_files.push(path.to_path_buf());
                Vec::new()
            }
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &EventStoreConfig {
        &self.config
    }

    pub fn uncommitted(&self) -> &[Event] {
        &self.uncommitted
    }

    pub fn committed(&self) -> &[Event] {
        &self.committed
    }

    /// Files that existed but could not be decoded during [`EventLog::load`]
    pub fn corrupt_files(&self) -> &[PathBuf] {
        &self.corrupt_files
    }

    /// Append to the uncommitted sequence (in memory only)
    pub fn append_uncommitted(&mut self, event: Event) {
        self.uncommitted.push(event);
    }

    /// Append to the committed sequence (in memory only)
    pub fn append_committed(&mut self, event: Event) {
        self.committed.push(event);
    }

    /// Take every uncommitted event, leaving the sequence empty (in memory only)
    pub fn take_uncommitted(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.uncommitted)
    }

    /// Remove the first uncommitted event matching `predicate`
    pub fn remove_uncommitted_matching<F>(&mut self, predicate: F) -> Option<Event>
    where
        F: FnMut(&Event) -> bool,
    {
        remove_first(&mut self.uncommitted, predicate)
    }

    /// Remove the first committed event matching `predicate`
    pub fn remove_committed_matching<F>(&mut self, predicate: F) -> Option<Event>
    where
        F: FnMut(&Event) -> bool,
    {
        remove_first(&mut self.committed, predicate)
    }

    /// Persist the uncommitted sequence, overwriting the file
    pub fn save_uncommitted(&self) -> ImsResult<()> {
        write_events(&self.config.uncommitted_path(), &self.uncommitted)
    }

    /// Persist the committed sequence, overwriting the file
    pub fn save_committed(&self) -> ImsResult<()> {
        write_events(&self.config.committed_path(), &self.committed)
    }
}

fn remove_first<F>(events: &mut Vec<Event>, predicate: F) -> Option<Event>
where
    F: FnMut(&Event) -> bool,
{
    let index = events.iter().position(predicate)?;
    Some(events.remove(index))
}

fn write_events(path: &Path, events: &[Event]) -> ImsResult<()> {
    let json = serde_json::to_string_pretty(events)?;
    atomic_write(path, &json)?;
    debug!(path = %path.display(), count = events.len(), "Saved event log");
    Ok(())
}
