//! Build integrations.
//!
//! Integrations are mounted in configuration order. `setup` runs once before
//! any page is built, `transform_page` runs for every page (in parallel
//! across pages), and `build_done` runs once after all pages are written.

mod mdx;
mod svelte;
mod tailwind;

pub use mdx::Mdx;
pub use svelte::{ISLAND_LOADER, Svelte, SvelteRenderer};
pub use tailwind::{Tailwind, TailwindOptions};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use mdpress_core::{PipelineError, PluginSpec, SiteConfig};

use crate::BuildError;
use crate::components::ComponentRenderer;
use crate::page::Page;

/// What integrations contribute while the builder is assembled.
#[derive(Default)]
pub struct IntegrationSetup {
    /// Source extensions that become pages (without the dot).
    pub extensions: Vec<String>,
    /// Component renderers, in registration order.
    pub renderers: Vec<Box<dyn ComponentRenderer>>,
}

impl IntegrationSetup {
    /// Setup with the extensions every site handles.
    pub fn new() -> Self {
        Self {
            extensions: vec!["md".to_string(), "markdown".to_string()],
            renderers: Vec::new(),
        }
    }

    /// Claims a page extension.
    pub fn add_extension(&mut self, extension: &str) {
        if !self.extensions.iter().any(|ext| ext == extension) {
            self.extensions.push(extension.to_string());
        }
    }

    /// Registers a component renderer. Earlier renderers win a claim.
    pub fn add_renderer(&mut self, renderer: Box<dyn ComponentRenderer>) {
        self.renderers.push(renderer);
    }
}

/// A page that was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPage {
    /// Route.
    pub route: String,
    /// Output file on disk.
    pub output: PathBuf,
}

/// State handed to `build_done` hooks.
#[derive(Debug)]
pub struct BuildContext<'a> {
    /// Project root.
    pub root: &'a Path,
    /// Output directory.
    pub out_dir: &'a Path,
    /// Site configuration.
    pub config: &'a SiteConfig,
    /// Pages written, sorted by route.
    pub pages: &'a [WrittenPage],
    /// Component sources referenced by any page.
    pub components: &'a BTreeSet<PathBuf>,
}

/// A build integration.
pub trait Integration: Send + Sync {
    /// Name as written in configuration.
    fn name(&self) -> &str;

    /// Registers extensions and component renderers.
    fn setup(&self, _setup: &mut IntegrationSetup) -> Result<(), BuildError> {
        Ok(())
    }

    /// Adjusts a rendered page before it is wrapped and written.
    fn transform_page(&self, _page: &mut Page) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Runs once after every page has been written.
    fn build_done(&self, _ctx: &BuildContext<'_>) -> Result<(), BuildError> {
        Ok(())
    }
}

/// Instantiates a configured integration.
pub fn from_spec(spec: &PluginSpec) -> Result<Box<dyn Integration>, BuildError> {
    match spec.name.as_str() {
        mdx::NAME => Ok(Box::new(Mdx)),
        svelte::NAME => Ok(Box::new(Svelte)),
        tailwind::NAME => Ok(Box::new(Tailwind::from_spec(spec)?)),
        other => Err(BuildError::Unknown {
            kind: "integration",
            name: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_integrations_match_catalog() {
        for name in &mdpress_core::PluginCatalog::builtin().integrations {
            let integration = from_spec(&PluginSpec::new(name.as_str())).unwrap();
            assert_eq!(integration.name(), name.as_str());
        }
        assert!(matches!(
            from_spec(&PluginSpec::new("react")),
            Err(BuildError::Unknown { kind: "integration", .. })
        ));
    }

    #[test]
    fn setup_collects_extensions_and_renderers() {
        let mut setup = IntegrationSetup::new();
        for name in ["mdx", "svelte", "mdx"] {
            from_spec(&PluginSpec::new(name)).unwrap().setup(&mut setup).unwrap();
        }
        assert_eq!(setup.extensions, vec!["md", "markdown", "mdx"]);
        assert_eq!(setup.renderers.len(), 1);
        assert_eq!(setup.renderers[0].name(), "svelte");
    }
}
