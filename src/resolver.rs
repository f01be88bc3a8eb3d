//! Command resolution
//!
//! Turns a package specification (`manager:name` or bare `name`) and an
//! operation into the argv to execute. Pure lookup against the config.

use tracing::debug;

use crate::config::Config;
use crate::error::{ImsError, ImsResult};
use crate::types::PackageKey;

/// Operation to resolve a command for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Install,
    Uninstall,
}

impl Operation {
    /// Key of this operation in the config file
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Install => "install",
            Operation::Uninstall => "uninstall",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command template bound to a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// Manager argv without the package name
    pub template: Vec<String>,
    pub manager: String,
    pub package: String,
}

impl ResolvedCommand {
    /// Full argv: the template followed by the package name
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.template.clone();
        argv.push(self.package.clone());
        argv
    }

    pub fn key(&self) -> PackageKey {
        PackageKey::new(&self.manager, &self.package)
    }

    /// The full command as a single line, for messages
    pub fn display(&self) -> String {
        self.argv().join(" ")
    }
}

/// Split a package specification into `(manager, package)`
///
/// Only the first `:` separates; the rest belongs to the package name.
pub fn split_spec<'a>(spec: &'a str, default_manager: &'a str) -> (&'a str, &'a str) {
    match spec.split_once(':') {
        Some((manager, package)) => (manager, package),
        None => (default_manager, spec),
    }
}

/// Resolve the command for `spec` and `operation`
pub fn resolve(config: &Config, spec: &str, operation: Operation) -> ImsResult<ResolvedCommand> {
    let (manager, package) = split_spec(spec, &config.default_package_manager);

    let commands = config
        .package_managers
        .get(manager)
        .ok_or_else(|| ImsError::UnknownManager(manager.to_string()))?;

    let template = match operation {
        Operation::Install => commands.install.as_ref(),
        Operation::Uninstall => commands.uninstall.as_ref(),
    }
    .ok_or_else(|| ImsError::UnknownOperation {
        manager: manager.to_string(),
        operation: operation.to_string(),
    })?;

    let resolved = ResolvedCommand {
        template: template.clone(),
        manager: manager.to_string(),
        package: package.to_string(),
    };
    debug!(command = %resolved.display(), %operation, "Resolved command");

    Ok(resolved)
}
