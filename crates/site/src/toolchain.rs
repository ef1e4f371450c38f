//! Toolchain plugins (`vite.plugins`).
//!
//! A toolchain plugin compiles component sources referenced by islands into
//! something the browser can load. Compiled output lives under
//! `outDir/_components/`.

use std::path::Path;

use mdpress_core::PluginSpec;

use crate::BuildError;
use crate::components::component_asset;
use crate::integrations::BuildContext;

/// Directory under the output directory that holds compiled components.
pub const COMPONENTS_DIR: &str = "_components";

/// Component compiler step.
pub trait ToolchainPlugin: Send + Sync {
    /// Name as written in configuration.
    fn name(&self) -> &str;

    /// True when this plugin compiles the component at `source`.
    fn compiles(&self, source: &Path) -> bool;

    /// Runs once after every page has been written.
    fn build_done(&self, ctx: &BuildContext<'_>) -> Result<(), BuildError>;
}

/// Instantiates a configured toolchain plugin.
pub fn from_spec(spec: &PluginSpec) -> Result<Box<dyn ToolchainPlugin>, BuildError> {
    match spec.name.as_str() {
        SVELTE => Ok(Box::new(SvelteCompiler)),
        other => Err(BuildError::Unknown {
            kind: "toolchain plugin",
            name: other.to_string(),
        }),
    }
}

/// Components no plugin compiles. These islands render but cannot hydrate.
pub fn uncompiled<'a>(
    plugins: &[Box<dyn ToolchainPlugin>],
    components: impl IntoIterator<Item = &'a Path>,
) -> Vec<&'a Path> {
    components
        .into_iter()
        .filter(|source| !plugins.iter().any(|plugin| plugin.compiles(source)))
        .collect()
}

const SVELTE: &str = "svelte";

/// Publishes `.svelte` sources under `_components/` for the island loader,
/// mirroring their path under the project root.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvelteCompiler;

impl ToolchainPlugin for SvelteCompiler {
    fn name(&self) -> &str {
        SVELTE
    }

    fn compiles(&self, source: &Path) -> bool {
        source.extension().is_some_and(|ext| ext == "svelte")
    }

    fn build_done(&self, ctx: &BuildContext<'_>) -> Result<(), BuildError> {
        let sources: Vec<&Path> = ctx
            .components
            .iter()
            .map(|path| path.as_path())
            .filter(|path| self.compiles(path))
            .collect();
        if sources.is_empty() {
            return Ok(());
        }

        let target_dir = ctx.out_dir.join(COMPONENTS_DIR);
        for source in sources {
            let target = target_dir.join(component_asset(ctx.root, source));
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|err| BuildError::io("create", parent, err))?;
            }
            std::fs::copy(source, &target).map_err(|err| BuildError::io("copy", source, err))?;
            log::debug!("compiled {} -> {}", source.display(), target.display());
        }
        Ok(())
    }
}
