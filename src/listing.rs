//! Table output for `list_installed` and `list_all`

use crate::event_store::EventLog;
use crate::types::{Event, PackageRecord};
use crate::utils::display_date;

/// Table of installed packages, oldest install first
///
/// Returns `None` when there is nothing to list.
pub fn format_installed(packages: &[PackageRecord], tag: Option<&str>) -> Option<String> {
    if packages.is_empty() {
        return None;
    }

    let mut sorted: Vec<&PackageRecord> = packages.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));

    let mut out = String::new();
    match tag {
        Some(tag) => out.push_str(&format!("Installed packages at tag {}:\n", tag)),
        None => out.push_str("Installed packages (current state):\n"),
    }
    out.push_str(&format!(
        "{:<30} {:<15} {:<12} {:<20}\n",
        "Package", "Manager", "State", "Install Date"
    ));
    out.push_str(&"-".repeat(80));
    out.push('\n');

    for pkg in sorted {
        out.push_str(&format!(
            "{:<30} {:<15} {:<12} {:<20}\n",
            pkg.package_name,
            pkg.package_manager_name,
            pkg.state.to_string(),
            display_date(&pkg.date)
        ));
    }

    Some(out)
}

/// Every entry of the log: committed events in order, then pending installs
pub fn format_all(log: &EventLog) -> String {
    let mut out = String::new();
    out.push_str("All entries:\n");
    out.push_str(&format!(
        "{:<12} {:<25} {:<12} {:<12} {:<20}\n",
        "Action", "Package", "Manager", "State", "Date"
    ));
    out.push_str(&"-".repeat(85));
    out.push('\n');

    for event in log.committed().iter().chain(log.uncommitted()) {
        out.push_str(&format_entry(event));
        out.push('\n');
    }

    out
}

fn format_entry(event: &Event) -> String {
    match event {
        Event::Install(record) | Event::Remove(record) => format!(
            "{:<12} {:<25} {:<12} {:<12} {:<20}",
            event.action().to_string(),
            record.package_name,
            record.package_manager_name,
            record.state.to_string(),
            display_date(&record.date)
        ),
        Event::Commit {
            date,
            packages_count,
        } => format!(
            "{:<12} {:<25} {:<12} {:<12} {:<20}",
            "COMMIT",
            format!("{} packages", packages_count),
            "N/A",
            "N/A",
            display_date(date)
        ),
        Event::Tag { tag_name, date } => format!(
            "{:<12} {:<25} {:<12} {:<12} {:<20}",
            "TAG",
            tag_name,
            "N/A",
            "N/A",
            display_date(date)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::EventStoreConfig;
    use crate::types::InstallState;

    fn record(package: &str, date: &str, state: InstallState) -> PackageRecord {
        PackageRecord {
            package_name: package.to_string(),
            package_manager_name: "apt".to_string(),
            package_manager_command: vec!["apt".to_string(), "install".to_string(), package.to_string()],
            date: date.to_string(),
            state,
        }
    }

    #[test]
    fn test_format_installed_empty() {
        assert!(format_installed(&[], None).is_none());
    }

    #[test]
    fn test_format_installed_sorted_by_date() {
        let packages = vec![
            record("zsh", "2024-02-01T00:00:00.000000", InstallState::Committed),
            record("git", "2024-01-01T00:00:00.000000", InstallState::Uncommitted),
        ];

        let table = format_installed(&packages, Some("base")).unwrap();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Installed packages at tag base:");
        assert!(lines[3].starts_with("git "));
        assert!(lines[3].contains("uncommitted"));
        assert!(lines[3].ends_with("2024-01-01T00:00:00 "));
        assert!(lines[4].starts_with("zsh "));
    }

    #[test]
    fn test_format_all_lists_every_kind() {
        let log = EventLog::from_events(
            EventStoreConfig::new("unused"),
            vec![Event::Install(record("git", "2024-03-01T00:00:00.000000", InstallState::Uncommitted))],
            vec![
                Event::Install(record("vim", "2024-01-01T00:00:00.000000", InstallState::Committed)),
                Event::Commit {
                    date: "2024-01-02T00:00:00.000000".to_string(),
                    packages_count: 1,
                },
                Event::Tag {
                    tag_name: "base".to_string(),
                    date: "2024-01-03T00:00:00.000000".to_string(),
                },
                Event::Remove(record("vim", "2024-01-04T00:00:00.000000", InstallState::Committed)),
            ],
        );

        let table = format_all(&log);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3 + 5);
        assert!(lines[3].starts_with("install      vim"));
        assert!(lines[4].starts_with("COMMIT       1 packages"));
        assert!(lines[5].starts_with("TAG          base"));
        assert!(lines[6].starts_with("remove       vim"));
        assert!(lines[7].starts_with("install      git"));
        assert!(lines[7].contains("uncommitted"));
    }
}
