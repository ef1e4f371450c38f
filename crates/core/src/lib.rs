#![deny(missing_docs)]
//! mdpress core: site configuration, frontmatter extraction, ESM hoisting, parsing and slugs.

/// Site configuration schema, loading and validation.
pub mod config;
/// Core error and diagnostic types.
pub mod error;
/// Root-level `import`/`export` hoisting for MDX bodies.
pub mod esm;
/// YAML/TOML frontmatter extraction helpers.
pub mod frontmatter;
/// Markdown parsing utilities.
pub mod parse;
/// Slug generation utilities.
pub mod slug;

pub use config::{
    BuildFormat, BuildOptions, ConfigError, MarkdownConfig, PluginCatalog, PluginSpec,
    SiteConfig, SyntaxHighlight, ViteConfig,
};
pub use error::{Diagnostics, PipelineError, SourceLocation, Warning};
pub use esm::{HoistedStatements, ImportBinding, ImportedName, collect_root_statements, parse_import};
pub use frontmatter::{FrontmatterError, FrontmatterExtraction, FrontmatterFormat, extract_frontmatter};
pub use parse::{ParseOptions, parse_mdast};
pub use slug::{Slugger, extract_custom_id, slugify};
