//! Package identity

use serde::{Deserialize, Serialize};

/// Identity of a tracked package: the manager plus the package name
///
/// The same name under two managers (`apt:htop` and `flatpak:htop`) is two
/// different packages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageKey {
    pub manager: String,
    pub package: String,
}

impl PackageKey {
    pub fn new(manager: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            manager: manager.into(),
            package: package.into(),
        }
    }
}

impl std::fmt::Display for PackageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.manager, self.package)
    }
}
