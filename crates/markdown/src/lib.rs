#![deny(missing_docs)]
//! mdpress markdown stages: remark plugins over mdast, HTML rendering, and
//! rehype plugins over the rendered HTML.

/// Per-document state and the processed result.
pub mod document;
/// Plugin construction errors.
pub mod error;
/// syntect-backed code highlighting.
pub mod highlight;
/// The configured pipeline.
pub mod processor;
/// HTML transform plugins.
pub mod rehype;
/// Markdown AST transform plugins.
pub mod remark;
/// mdast → HTML rendering.
pub mod renderer;

pub use document::{Document, FileData, HeadingEntry, SourceKind};
pub use error::PluginError;
pub use highlight::Highlighter;
pub use processor::{DEFAULT_REMARK_PLUGINS, MarkdownProcessor};
pub use rehype::{RehypePlugin, RehypeRegistry};
pub use remark::{RemarkPlugin, RemarkRegistry};
pub use renderer::{COMPONENT_TAG, RenderOptions, json_attribute, render};
