//! apt history import
//!
//! Reads apt's `history.log` so packages installed before IMS was in use
//! can be brought into the committed log. Each transaction block looks like:
//!
//! ```text
//! Start-Date: 2024-01-02  10:11:12
//! Commandline: apt install htop
//! Install: htop:amd64 (3.2.2-2), libnl-3-200:amd64 (3.7.0-0.2, automatic)
//! End-Date: 2024-01-02  10:11:14
//! ```
//!
//! Only explicitly requested packages are kept; dependencies pulled in
//! automatically are skipped.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::warn;

use crate::error::ImsResult;
use crate::utils::format_iso;

/// Default location of apt's transaction log
pub const APT_HISTORY_PATH: &str = "/var/log/apt/history.log";

/// Kind of apt transaction line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Install,
    Remove,
}

/// One explicitly installed or removed package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AptHistoryEntry {
    /// Transaction start, formatted like an event date
    pub date: String,
    pub action: HistoryAction,
    pub package: String,
}

fn package_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // name:arch (version[, automatic])
    RE.get_or_init(|| Regex::new(r"([\w\-.+]+):[\w\-]+\s+\(([^)]*)\)").expect("valid regex"))
}

fn parse_start_date(value: &str) -> Option<String> {
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|ts| format_iso(&ts))
}

/// Parse the contents of an apt `history.log`
///
/// Entries are returned in file order. Blocks with an unreadable
/// `Start-Date` are skipped with a warning.
pub fn parse_apt_history(text: &str) -> Vec<AptHistoryEntry> {
    let mut entries = Vec::new();
    let mut date: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(value) = line.strip_prefix("Start-Date:") {
            date = parse_start_date(value);
            if date.is_none() {
                warn!(line, "Skipping apt history block with unreadable date");
            }
            continue;
        }

        if line.starts_with("End-Date:") {
            date = None;
            continue;
        }

        let (action, packages) = if let Some(rest) = line.strip_prefix("Install:") {
            (HistoryAction::Install, rest)
        } else if let Some(rest) = line.strip_prefix("Remove:") {
            (HistoryAction::Remove, rest)
        } else {
            continue;
        };

        let Some(date) = date.as_ref() else {
            continue;
        };

        for caps in package_regex().captures_iter(packages) {
            if caps[2].contains("automatic") {
                continue;
            }
            entries.push(AptHistoryEntry {
                date: date.clone(),
                action,
                package: caps[1].to_string(),
            });
        }
    }

    entries
}

/// Read and parse an apt `history.log` file
pub fn read_apt_history<P: AsRef<Path>>(path: P) -> ImsResult<Vec<AptHistoryEntry>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_apt_history(&text))
}
