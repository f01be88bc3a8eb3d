//! Reinstall script generation
//!
//! Turns the installed set at a tag (or now) into a bash script that
//! replays the recorded install commands.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ImsResult;
use crate::event_store::{get_installed, EventLog};
use crate::types::InstallState;
use crate::utils::{atomic_write_with, now_iso};

/// A generated reinstall script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallScript {
    pub tag: Option<String>,
    pub generated_on: String,
    /// One command line per committed package, in install order
    pub commands: Vec<String>,
}

impl InstallScript {
    /// `reinstall_tag_<tag>.sh` or `reinstall_current.sh`
    pub fn file_name(&self) -> String {
        match &self.tag {
            Some(tag) => format!("reinstall_tag_{}.sh", tag.replace(['/', '\\'], "_")),
            None => "reinstall_current.sh".to_string(),
        }
    }

    /// Full script text
    pub fn contents(&self) -> String {
        let target = match &self.tag {
            Some(tag) => format!("tag: {}", tag),
            None => "current state".to_string(),
        };

        let mut out = String::new();
        out.push_str("#!/bin/bash\n");
        out.push_str("# Generated by IMS - Install My Stuff\n");
        out.push_str(&format!("# Reinstall script for {}\n", target));
        out.push_str(&format!("# Generated on: {}\n\n", self.generated_on));
        for command in &self.commands {
            out.push_str(command);
            out.push('\n');
        }
        out.push('\n');
        out
    }

    /// Write the script into `dir` and make it executable
    pub fn write_to(&self, dir: &Path) -> ImsResult<PathBuf> {
        let path = dir.join(self.file_name());
        let contents = self.contents();
        atomic_write_with(&path, |file| file.write_all(contents.as_bytes()))?;
        make_executable(&path)?;

        info!(path = %path.display(), commands = self.commands.len(), "Wrote install script");
        Ok(path)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> ImsResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> ImsResult<()> {
    Ok(())
}

/// Build the reinstall script for `tag`, or for the current state
///
/// Returns `None` when nothing is installed. Pending installs are left out
/// so the script only replays committed actions.
pub fn generate_install_script(log: &EventLog, tag: Option<&str>) -> Option<InstallScript> {
    let installed = get_installed(log, tag);
    if installed.is_empty() {
        return None;
    }

    let commands = installed
        .iter()
        .filter(|record| record.state == InstallState::Committed)
        .map(|record| record.command_line())
        .collect();

    Some(InstallScript {
        tag: tag.map(str::to_string),
        generated_on: now_iso(),
        commands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::EventStoreConfig;
    use crate::types::{Event, PackageRecord};
    use tempfile::TempDir;

    fn install(argv: &[&str], state: InstallState) -> Event {
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        Event::Install(PackageRecord {
            package_name: argv.last().cloned().unwrap(),
            package_manager_name: argv[0].clone(),
            package_manager_command: argv,
            date: "2024-01-01T00:00:00.000000".to_string(),
            state,
        })
    }

    fn log(uncommitted: Vec<Event>, committed: Vec<Event>) -> EventLog {
        EventLog::from_events(EventStoreConfig::new("unused"), uncommitted, committed)
    }

    #[test]
    fn test_empty_log_has_no_script() {
        assert!(generate_install_script(&log(vec![], vec![]), None).is_none());
    }

    #[test]
    fn test_pending_installs_are_skipped() {
        let log = log(
            vec![install(&["pip", "install", "black"], InstallState::Uncommitted)],
            vec![
                install(&["flatpak", "install", "-y", "org.gimp.GIMP"], InstallState::Committed),
                install(&["pip", "install", "ruff"], InstallState::Committed),
            ],
        );

        let script = generate_install_script(&log, None).unwrap();

        assert_eq!(
            script.commands,
            vec!["flatpak install -y org.gimp.GIMP", "pip install ruff"]
        );
    }

    #[test]
    fn test_only_pending_gives_header_only_script() {
        let log = log(vec![install(&["pip", "install", "black"], InstallState::Uncommitted)], vec![]);

        let script = generate_install_script(&log, None).unwrap();
        assert!(script.commands.is_empty());
    }

    #[test]
    fn test_contents_and_file_name() {
        let script = InstallScript {
            tag: Some("fresh".to_string()),
            generated_on: "2024-05-05T12:00:00.000000".to_string(),
            commands: vec!["sudo apt install -y vim".to_string()],
        };

        assert_eq!(script.file_name(), "reinstall_tag_fresh.sh");
        assert_eq!(
            script.contents(),
            "#!/bin/bash\n\
             # Generated by IMS - Install My Stuff\n\
             # Reinstall script for tag: fresh\n\
             # Generated on: 2024-05-05T12:00:00.000000\n\n\
             sudo apt install -y vim\n\n"
        );

        let current = InstallScript { tag: None, ..script };
        assert_eq!(current.file_name(), "reinstall_current.sh");
        assert!(current.contents().contains("# Reinstall script for current state\n"));
    }

    #[test]
    fn test_file_name_sanitizes_separators() {
        let script = InstallScript {
            tag: Some("2024/05".to_string()),
            generated_on: String::new(),
            commands: Vec::new(),
        };
        assert_eq!(script.file_name(), "reinstall_tag_2024_05.sh");
    }

    #[test]
    fn test_write_to() {
        let dir = TempDir::new().unwrap();
        let script = InstallScript {
            tag: None,
            generated_on: "now".to_string(),
            commands: vec!["pip install ruff".to_string()],
        };

        let path = script.write_to(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("reinstall_current.sh"));
        assert_eq!(fs::read_to_string(&path).unwrap(), script.contents());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }
}
