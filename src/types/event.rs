//! Event types for the package log
//!
//! Events are immutable records of package actions. The installed-package
//! state is never stored directly; it is derived by replaying events in order.

use serde::{Deserialize, Serialize};

use super::PackageKey;
use crate::resolver::ResolvedCommand;
use crate::utils::now_iso;

/// Kind of action an event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// A package was installed
    Install,
    /// A package was removed
    Remove,
    /// Pending installs were promoted to committed
    Commit,
    /// A named checkpoint
    Tag,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Install => write!(f, "install"),
            Action::Remove => write!(f, "remove"),
            Action::Commit => write!(f, "commit"),
            Action::Tag => write!(f, "tag"),
        }
    }
}

/// Whether an install has been promoted to the committed log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallState {
    Uncommitted,
    Committed,
}

impl std::fmt::Display for InstallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallState::Uncommitted => write!(f, "uncommitted"),
            InstallState::Committed => write!(f, "committed"),
        }
    }
}

/// Payload shared by install and remove events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub package_name: String,
    pub package_manager_name: String,
    /// Full argv that was executed, package name included
    pub package_manager_command: Vec<String>,
    pub date: String,
    pub state: InstallState,
}

impl PackageRecord {
    /// Identity of the package this record is about
    pub fn key(&self) -> PackageKey {
        PackageKey::new(&self.package_manager_name, &self.package_name)
    }

    /// Whether this record is about `key`
    pub fn matches(&self, key: &PackageKey) -> bool {
        self.package_manager_name == key.manager && self.package_name == key.package
    }

    /// The stored command as a single shell line
    pub fn command_line(&self) -> String {
        self.package_manager_command.join(" ")
    }
}

/// A single entry of the package log
///
/// Encoded as a JSON object discriminated by its `action` field, so each
/// variant only carries the fields that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Event {
    Install(PackageRecord),
    Remove(PackageRecord),
    Commit { date: String, packages_count: usize },
    Tag { tag_name: String, date: String },
}

impl Event {
    /// Build an install event for a command that just succeeded
    pub fn install(command: &ResolvedCommand, state: InstallState) -> Self {
        Event::Install(PackageRecord {
            package_name: command.package.clone(),
            package_manager_name: command.manager.clone(),
            package_manager_command: command.argv(),
            date: now_iso(),
            state,
        })
    }

    /// Build a remove event; removals always go straight to the committed log
    pub fn remove(command: &ResolvedCommand) -> Self {
        Event::Remove(PackageRecord {
            package_name: command.package.clone(),
            package_manager_name: command.manager.clone(),
            package_manager_command: command.argv(),
            date: now_iso(),
            state: InstallState::Committed,
        })
    }

    /// Build a commit marker for `packages_count` promoted installs
    pub fn commit(packages_count: usize) -> Self {
        Event::Commit {
            date: now_iso(),
            packages_count,
        }
    }

    /// Build a tag marker
    pub fn tag(tag_name: impl Into<String>) -> Self {
        Event::Tag {
            tag_name: tag_name.into(),
            date: now_iso(),
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Event::Install(_) => Action::Install,
            Event::Remove(_) => Action::Remove,
            Event::Commit { .. } => Action::Commit,
            Event::Tag { .. } => Action::Tag,
        }
    }

    pub fn date(&self) -> &str {
        match self {
            Event::Install(record) | Event::Remove(record) => &record.date,
            Event::Commit { date, .. } | Event::Tag { date, .. } => date,
        }
    }

    /// Package payload for install/remove events
    pub fn package(&self) -> Option<&PackageRecord> {
        match self {
            Event::Install(record) | Event::Remove(record) => Some(record),
            Event::Commit { .. } | Event::Tag { .. } => None,
        }
    }

    /// True for an install event of `key`
    pub fn is_install_of(&self, key: &PackageKey) -> bool {
        matches!(self, Event::Install(record) if record.matches(key))
    }

    /// True for a tag event named `name`
    pub fn is_tag_named(&self, name: &str) -> bool {
        matches!(self, Event::Tag { tag_name, .. } if tag_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(manager: &str, package: &str, state: InstallState) -> PackageRecord {
        PackageRecord {
            package_name: package.to_string(),
            package_manager_name: manager.to_string(),
            package_manager_command: vec!["pip".to_string(), "install".to_string(), package.to_string()],
            date: "2024-03-01T10:00:00.000000".to_string(),
            state,
        }
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&Action::Install).unwrap();
        assert_eq!(json, "\"install\"");
        assert_eq!(Action::Tag.to_string(), "tag");
    }

    #[test]
    fn test_install_event_layout() {
        let event = Event::Install(record("pip", "requests", InstallState::Uncommitted));
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["action"], "install");
        assert_eq!(value["package_name"], "requests");
        assert_eq!(value["package_manager_name"], "pip");
        assert_eq!(value["state"], "uncommitted");
        assert_eq!(value["package_manager_command"], json!(["pip", "install", "requests"]));
    }

    #[test]
    fn test_tag_event_has_no_package_fields() {
        let event = Event::Tag {
            tag_name: "v1".to_string(),
            date: "2024-03-01T10:00:00.000000".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["action"], "tag");
        assert_eq!(value["tag_name"], "v1");
        assert!(value.get("package_name").is_none());
        assert!(value.get("state").is_none());
    }

    #[test]
    fn test_parse_log_written_by_older_tool() {
        let raw = json!([
            {
                "action": "install",
                "package_name": "vim",
                "package_manager_name": "apt",
                "package_manager_command": ["sudo", "apt", "install", "-y", "vim"],
                "date": "2024-03-01T10:00:00.123456",
                "state": "committed"
            },
            {"action": "commit", "date": "2024-03-01T10:01:00.000000", "packages_count": 1},
            {"action": "tag", "tag_name": "base", "date": "2024-03-01T10:02:00.000000"}
        ]);

        let events: Vec<Event> = serde_json::from_value(raw).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].action(), Action::Install);
        assert_eq!(
            events[0].package().unwrap().command_line(),
            "sudo apt install -y vim"
        );
        assert_eq!(events[1], Event::Commit {
            date: "2024-03-01T10:01:00.000000".to_string(),
            packages_count: 1,
        });
        assert!(events[2].is_tag_named("base"));
        assert!(!events[2].is_tag_named("other"));
    }

    #[test]
    fn test_is_install_of() {
        let key = PackageKey::new("pip", "requests");
        let install = Event::Install(record("pip", "requests", InstallState::Committed));
        let remove = Event::Remove(record("pip", "requests", InstallState::Committed));
        let other = Event::Install(record("apt", "requests", InstallState::Committed));

        assert!(install.is_install_of(&key));
        assert!(!remove.is_install_of(&key));
        assert!(!other.is_install_of(&key));
    }
}
