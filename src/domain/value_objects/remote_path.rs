//! Remote Path Value Object
//!
//! An absolute POSIX path on the remote host. Derived from a template's
//! path relative to its asset directory by rooting it at `/`, with forward
//! slashes regardless of the local platform's separator.

use std::fmt;
use std::path::{Component, Path};

/// Absolute POSIX path on the remote host
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RemotePath(String);

impl RemotePath {
    /// Root a path relative to an asset directory at `/`
    ///
    /// Normal components are joined with `/`; `.` components are dropped.
    pub fn from_relative(rel: &Path) -> Self {
        let mut out = String::new();
        for component in rel.components() {
            if let Component::Normal(part) = component {
                out.push('/');
                out.push_str(&part.to_string_lossy());
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        Self(out)
    }

    /// Create from an already-absolute POSIX path string
    pub fn from_absolute(path: &str) -> Self {
        if path.starts_with('/') {
            Self(path.to_string())
        } else {
            Self(format!("/{}", path))
        }
    }

    /// The full path string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parent directory, or `/` for top-level files
    pub fn parent(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &self.0[..idx],
        }
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RemotePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
