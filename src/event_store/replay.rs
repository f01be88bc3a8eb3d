//! Point-in-time reconstruction of the installed package set
//!
//! Replays the committed sequence in order, then (for "now" queries) the
//! pending installs, to answer "what is installed". Read-only: the same log
//! and tag always give the same result.

use std::collections::HashMap;

use crate::types::{Event, PackageKey, PackageRecord};

use super::EventLog;

/// Installed packages keyed by identity, remembering first-insertion order
///
/// Re-installing a package overwrites its record in place; removing and
/// installing it again moves it to the end.
#[derive(Debug, Default)]
struct InstalledSet {
    slots: Vec<Option<PackageRecord>>,
    index: HashMap<PackageKey, usize>,
}

impl InstalledSet {
    fn insert(&mut self, record: &PackageRecord) {
        let key = record.key();
        match self.index.get(&key) {
            Some(&slot) => self.slots[slot] = Some(record.clone()),
            None => {
                self.index.insert(key, self.slots.len());
                self.slots.push(Some(record.clone()));
            }
        }
    }

    fn remove(&mut self, key: &PackageKey) {
        if let Some(slot) = self.index.remove(key) {
            self.slots[slot] = None;
        }
    }

    fn into_records(self) -> Vec<PackageRecord> {
        self.slots.into_iter().flatten().collect()
    }
}

/// Packages installed as of `tag`, or as of now when `tag` is `None`
///
/// With a tag, replay stops at the first tag event of that name: the tag
/// itself and everything after it are excluded. Pending installs are only
/// included for "now" queries. A tag that does not exist yields the full
/// committed replay, still without pending installs.
///
/// Returns the install records in first-install order.
pub fn get_installed(log: &EventLog, tag: Option<&str>) -> Vec<PackageRecord> {
    let mut installed = InstalledSet::default();

    for event in log.committed() {
        match event {
            Event::Tag { tag_name, .. } if Some(tag_name.as_str()) == tag => break,
            Event::Install(record) => installed.insert(record),
            Event::Remove(record) => installed.remove(&record.key()),
            Event::Commit { .. } | Event::Tag { .. } => {}
        }
    }

    if tag.is_none() {
        for event in log.uncommitted() {
            if let Event::Install(record) = event {
                installed.insert(record);
            }
        }
    }

    installed.into_records()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::EventStoreConfig;
    use crate::types::InstallState;

    fn record(manager: &str, package: &str, date: &str, state: InstallState) -> PackageRecord {
        PackageRecord {
            package_name: package.to_string(),
            package_manager_name: manager.to_string(),
            package_manager_command: vec![manager.to_string(), "install".to_string(), package.to_string()],
            date: date.to_string(),
            state,
        }
    }

    fn installed(manager: &str, package: &str) -> Event {
        Event::Install(record(manager, package, "2024-01-01T00:00:00.000000", InstallState::Committed))
    }

    fn pending(manager: &str, package: &str) -> Event {
        Event::Install(record(manager, package, "2024-01-02T00:00:00.000000", InstallState::Uncommitted))
    }

    fn removed(manager: &str, package: &str) -> Event {
        Event::Remove(record(manager, package, "2024-01-03T00:00:00.000000", InstallState::Committed))
    }

    fn tag(name: &str) -> Event {
        Event::Tag {
            tag_name: name.to_string(),
            date: "2024-01-04T00:00:00.000000".to_string(),
        }
    }

    fn log(uncommitted: Vec<Event>, committed: Vec<Event>) -> EventLog {
        EventLog::from_events(EventStoreConfig::new("unused"), uncommitted, committed)
    }

    fn keys(records: &[PackageRecord]) -> Vec<String> {
        records.iter().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn test_empty_log() {
        assert!(get_installed(&log(vec![], vec![]), None).is_empty());
    }

    #[test]
    fn test_tag_boundary_excludes_later_events() {
        let log = log(vec![], vec![installed("apt", "a"), tag("t1"), removed("apt", "a")]);

        assert_eq!(keys(&get_installed(&log, Some("t1"))), vec!["apt:a"]);
        assert!(get_installed(&log, None).is_empty());
    }

    #[test]
    fn test_install_right_after_tag_is_excluded() {
        let log = log(vec![], vec![installed("apt", "a"), tag("t1"), installed("apt", "b")]);

        assert_eq!(keys(&get_installed(&log, Some("t1"))), vec!["apt:a"]);
        assert_eq!(keys(&get_installed(&log, None)), vec!["apt:a", "apt:b"]);
    }

    #[test]
    fn test_other_tags_and_commits_are_inert() {
        let log = log(
            vec![],
            vec![
                installed("apt", "a"),
                Event::Commit {
                    date: "2024-01-01T00:00:00.000000".to_string(),
                    packages_count: 1,
                },
                tag("t0"),
                installed("pip", "b"),
                tag("t1"),
            ],
        );

        assert_eq!(keys(&get_installed(&log, Some("t1"))), vec!["apt:a", "pip:b"]);
    }

    #[test]
    fn test_overwrite_keeps_later_data_in_original_position() {
        let later = record("apt", "a", "2024-06-01T00:00:00.000000", InstallState::Committed);
        let log = log(
            vec![],
            vec![installed("apt", "a"), installed("apt", "b"), Event::Install(later.clone())],
        );

        let result = get_installed(&log, None);
        assert_eq!(keys(&result), vec!["apt:a", "apt:b"]);
        assert_eq!(result[0], later);
    }

    #[test]
    fn test_reinstall_after_remove_moves_to_end() {
        let log = log(
            vec![],
            vec![installed("apt", "a"), installed("apt", "b"), removed("apt", "a"), installed("apt", "a")],
        );

        assert_eq!(keys(&get_installed(&log, None)), vec!["apt:b", "apt:a"]);
    }

    #[test]
    fn test_same_name_under_two_managers() {
        let log = log(
            vec![],
            vec![installed("apt", "htop"), installed("flatpak", "htop"), removed("apt", "htop")],
        );

        assert_eq!(keys(&get_installed(&log, None)), vec!["flatpak:htop"]);
    }

    #[test]
    fn test_pending_installs_only_for_current_state() {
        let log = log(vec![pending("pip", "bar")], vec![installed("apt", "foo")]);

        let now = get_installed(&log, None);
        assert_eq!(keys(&now), vec!["apt:foo", "pip:bar"]);
        assert_eq!(now[1].state, InstallState::Uncommitted);

        assert_eq!(keys(&get_installed(&log, Some("anytag"))), vec!["apt:foo"]);
    }

    #[test]
    fn test_pending_install_overwrites_committed_entry() {
        let log = log(vec![pending("apt", "foo")], vec![installed("apt", "foo")]);

        let now = get_installed(&log, None);
        assert_eq!(now.len(), 1);
        assert_eq!(now[0].state, InstallState::Uncommitted);
    }

    #[test]
    fn test_first_matching_tag_wins() {
        let log = log(
            vec![],
            vec![installed("apt", "a"), tag("dup"), installed("apt", "b"), tag("dup")],
        );

        assert_eq!(keys(&get_installed(&log, Some("dup"))), vec!["apt:a"]);
    }

    #[test]
    fn test_reconstruction_is_repeatable() {
        let log = log(
            vec![pending("pip", "c")],
            vec![installed("apt", "a"), tag("t1"), removed("apt", "a"), installed("apt", "b")],
        );

        assert_eq!(get_installed(&log, None), get_installed(&log, None));
        assert_eq!(get_installed(&log, Some("t1")), get_installed(&log, Some("t1")));
    }
}
