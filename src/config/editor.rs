//! Opening the config file for manual editing

use std::env;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{ImsError, ImsResult};

/// Open `path` in the user's editor
///
/// `$VISUAL` or `$EDITOR` win when set; otherwise the desktop opener is used.
pub fn open_in_editor(path: &Path) -> ImsResult<()> {
    let (program, mut args) = editor_command();
    args.push(path.display().to_string());

    debug!(program = %program, ?args, "Opening config in editor");

    let status = Command::new(&program)
        .args(&args)
        .status()
        .map_err(|source| ImsError::CommandLaunch {
            program: program.clone(),
            source,
        })?;

    if !status.success() {
        return Err(ImsError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            status: status.code(),
            stdout: String::new(),
            stderr: String::new(),
        });
    }

    Ok(())
}

fn editor_command() -> (String, Vec<String>) {
    let from_env = env::var("VISUAL")
        .ok()
        .or_else(|| env::var("EDITOR").ok())
        .filter(|value| !value.trim().is_empty());

    if let Some(value) = from_env {
        let mut parts = value.split_whitespace().map(str::to_string);
        if let Some(program) = parts.next() {
            return (program, parts.collect());
        }
    }

    if cfg!(target_os = "windows") {
        ("cmd".to_string(), vec!["/C".to_string(), "start".to_string(), String::new()])
    } else if cfg!(target_os = "macos") {
        ("open".to_string(), Vec::new())
    } else {
        ("xdg-open".to_string(), Vec::new())
    }
}
