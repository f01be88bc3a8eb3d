//! Event Store Module
//!
//! - `EventLog`: the uncommitted and committed sequences and their files
//! - `get_installed`: replay of the log into the installed package set
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌───────────┐    ┌──────────────────┐    ┌──────────────────────┐
//! │ lifecycle │───►│ append in memory │───►│ save_*(): rewrite    │
//! │ operation │    │                  │    │ whole JSON file      │
//! └───────────┘    └──────────────────┘    └──────────────────────┘
//!
//! Read Path:
//! ┌──────────────┐    ┌──────────────────────┐    ┌───────────────────┐
//! │ load() both  │───►│ replay committed     │───►│ + uncommitted     │
//! │ JSON files   │    │ (stop at tag if any) │    │ (only if no tag)  │
//! └──────────────┘    └──────────────────────┘    └───────────────────┘
//! ```

mod replay;
mod store;

pub use replay::get_installed;
pub use store::{EventLog, EventStoreConfig};
