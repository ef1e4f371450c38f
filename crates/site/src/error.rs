use std::fmt;
use std::path::PathBuf;

use mdpress_core::{ConfigError, PipelineError};
use mdpress_markdown::PluginError;
use thiserror::Error;

/// A page that could not be built.
#[derive(Debug)]
pub struct PageFailure {
    /// Source file of the page.
    pub path: PathBuf,
    /// What went wrong.
    pub error: PipelineError,
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

/// Errors that stop a build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A markdown plugin could not be constructed.
    #[error(transparent)]
    Plugin(#[from] PluginError),
    /// A filesystem operation failed.
    #[error("{action} {path}: {source}")]
    Io {
        /// What was being done (`read`, `write`, `create`, `copy`).
        action: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A configured or requested name is not known.
    #[error("unknown {kind} `{name}`")]
    Unknown {
        /// What was looked up (`integration`, `toolchain plugin`, `source extension`).
        kind: &'static str,
        /// Configured name.
        name: String,
    },
    /// An integration rejected its options or failed in a hook.
    #[error("integration `{name}` failed: {message}")]
    Integration {
        /// Integration name.
        name: String,
        /// What went wrong.
        message: String,
    },
    /// Two sources would write the same output file.
    #[error("{} and {} both build route `{route}`", .first.display(), .second.display())]
    RouteConflict {
        /// Route both sources map to.
        route: String,
        /// Source found first.
        first: PathBuf,
        /// Source found second.
        second: PathBuf,
    },
    /// One or more pages failed; every failure is listed.
    #[error("{} page(s) failed to build:\n{}", .0.len(), format_failures(.0))]
    Pages(Vec<PageFailure>),
    /// The worker pool could not be created.
    #[error("failed to start worker pool: {0}")]
    ThreadPool(String),
}

fn format_failures(failures: &[PageFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("  - {failure}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl BuildError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn integration(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Integration {
            name: name.into(),
            message: message.to_string(),
        }
    }
}
