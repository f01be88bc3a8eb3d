//! Data types for the package log
//!
//! This module contains the event model shared by the store, the replay
//! engine and the lifecycle operations.

mod event;
mod package;

pub use event::{Action, Event, InstallState, PackageRecord};
pub use package::PackageKey;
