use std::path::PathBuf;
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path
    pub file: Option<PathBuf>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Attach a file path to this location.
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Location of an mdast node, falling back to the document start.
    pub fn of_position(position: Option<&markdown::unist::Position>) -> Self {
        match position {
            Some(position) => Self::new(position.start.line, position.start.column),
            None => Self::new(1, 1),
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file.display(), self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that can occur while turning a source document into HTML.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// IO error while reading a source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    Parse {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// Frontmatter could not be extracted.
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] crate::FrontmatterError),
    /// A remark or rehype plugin failed while transforming a document.
    #[error("Plugin `{plugin}` failed: {message}")]
    Plugin {
        /// Plugin name as written in the configuration
        plugin: String,
        /// Error message
        message: String,
    },
    /// Rendering error while emitting HTML.
    #[error("Render error at {location}: {message}")]
    Render {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// A component was used that nothing can render.
    #[error("Unknown component `{name}`: {reason}")]
    UnknownComponent {
        /// Component name
        name: String,
        /// Why the component could not be resolved
        reason: String,
    },
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Create a parse error with location
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Create a plugin failure for the named plugin.
    pub fn plugin(plugin: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            message: message.to_string(),
        }
    }

    /// Create an unknown component error
    pub fn unknown_component(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnknownComponent {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Non-fatal warning raised while processing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Where the warning originated, when known.
    pub location: Option<SourceLocation>,
    /// Human-readable message.
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}", location, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Warnings collected while processing a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Non-fatal warnings in the order they were raised.
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning without location.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(Warning {
            location: None,
            message: message.into(),
        });
    }

    /// Record a warning at a source location.
    pub fn warn_at(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.warnings.push(Warning {
            location: Some(location),
            message: message.into(),
        });
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Attach a file path to every warning that lacks one.
    pub fn attach_file(&mut self, file: &std::path::Path) {
        for warning in &mut self.warnings {
            match &mut warning.location {
                Some(location) if location.file.is_none() => {
                    location.file = Some(file.to_path_buf());
                }
                Some(_) => {}
                None => warning.location = Some(SourceLocation::new(1, 1).in_file(file)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display_includes_file() {
        let loc = SourceLocation::new(3, 7).in_file("src/pages/index.md");
        assert_eq!(loc.to_string(), "src/pages/index.md:3:7");
        assert_eq!(SourceLocation::new(1, 2).to_string(), "1:2");
    }

    #[test]
    fn attach_file_fills_missing_locations() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn("no location");
        diagnostics.warn_at(SourceLocation::new(4, 1), "located");
        diagnostics.attach_file(std::path::Path::new("a.md"));

        let rendered: Vec<String> = diagnostics.warnings.iter().map(|w| w.to_string()).collect();
        assert_eq!(rendered, vec!["a.md:1:1: no location", "a.md:4:1: located"]);
    }
}
