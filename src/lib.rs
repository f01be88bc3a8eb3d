//! IMS - Install My Stuff
//!
//! Tracks packages installed and removed through several package managers
//! (apt, flatpak, pip, ...) in a durable event log, so the installed set can
//! be reconstructed at any point in time and turned back into a script.
//!
//! # Modules
//!
//! - `types`: Event model (install/remove/commit/tag) and package identity
//! - `event_store`: The uncommitted/committed logs and their replay
//! - `config`: Typed configuration, defaults and bootstrap
//! - `resolver`: Package specification to command resolution
//! - `executor`: Running package manager commands
//! - `lifecycle`: Install/remove/commit/tag operations
//! - `script`: Reinstall script generation
//! - `listing`: Table output
//! - `import`: apt history import
//! - `utils`: Atomic writes and timestamps
//!
//! # Example
//!
//! ```no_run
//! use ims::{Config, Ims};
//!
//! fn main() -> ims::ImsResult<()> {
//!     let config = Config::load(ims::config::default_config_path())?;
//!     let mut ims = Ims::open(&config)?;
//!     ims.install("flatpak:org.gimp.GIMP", false)?;
//!     ims.commit()?;
//!     ims.add_tag("workstation")?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod event_store;
pub mod executor;
pub mod import;
pub mod lifecycle;
pub mod listing;
pub mod resolver;
pub mod script;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{Config, ManagerCommands};
pub use error::{ImsError, ImsResult};
pub use event_store::{get_installed, EventLog, EventStoreConfig};
pub use executor::{CommandOutput, CommandRunner, SystemRunner};
pub use lifecycle::{CommitOutcome, Ims, InstallOutcome, RemoveOutcome, TagOutcome};
pub use resolver::{resolve, Operation, ResolvedCommand};
pub use script::{generate_install_script, InstallScript};
pub use types::{Action, Event, InstallState, PackageKey, PackageRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
