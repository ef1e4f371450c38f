#![deny(missing_docs)]
//! Static site builds for mdpress.
//!
//! Page sources are loaded from the pages directory, run through the
//! markdown pipeline in parallel, have their component islands rendered by
//! the mounted integrations, and are written into the output directory
//! wrapped in a document shell. A sitemap and the integrations' post-build
//! steps follow.

/// Parallel page builds.
pub mod build;
/// Component islands.
pub mod components;
/// Build errors.
pub mod error;
/// Build integrations.
pub mod integrations;
/// HTML document shell.
pub mod layout;
/// Source discovery.
pub mod loader;
/// Rendered pages.
pub mod page;
/// Route computation.
pub mod routes;
/// `sitemap.xml` generation.
pub mod sitemap;
/// Component compiler plugins.
pub mod toolchain;

pub use build::{BuildReport, SiteBuilder};
pub use components::{ComponentRenderer, Island};
pub use error::{BuildError, PageFailure};
pub use integrations::{BuildContext, Integration, IntegrationSetup, WrittenPage};
pub use loader::{SourceFile, load_sources};
pub use page::Page;
pub use toolchain::ToolchainPlugin;
