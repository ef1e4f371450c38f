use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::info;
use mdpress_core::{PluginCatalog, SiteConfig};
use mdpress_site::{BuildReport, SiteBuilder};

use crate::cli::ConfigFormat;

/// Loads `config`, or `mdpress.toml` under `root` when it exists, or the
/// defaults.
pub fn load_config(root: &Path, config: Option<&Path>) -> Result<SiteConfig> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => {
            let path = root.join(mdpress_core::config::DEFAULT_CONFIG_FILE);
            if !path.is_file() {
                info!("No {} found, using the default configuration", path.display());
                return Ok(SiteConfig::default());
            }
            path
        }
    };
    SiteConfig::from_file(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Overrides applied to the loaded configuration by `build`.
#[derive(Debug, Default)]
pub struct BuildOverrides {
    /// Output directory.
    pub out: Option<PathBuf>,
    /// Build drafts.
    pub drafts: bool,
    /// Worker threads.
    pub jobs: Option<usize>,
}

/// Builds the site with command line overrides applied.
pub fn build(root: &Path, mut config: SiteConfig, overrides: BuildOverrides) -> Result<BuildReport> {
    if let Some(out) = overrides.out {
        config.build.out_dir = out;
    }
    if overrides.drafts {
        config.build.drafts = true;
    }
    if overrides.jobs.is_some() {
        config.build.concurrency = overrides.jobs;
    }

    let builder = SiteBuilder::new(root, config).context("Failed to set up the build")?;
    let report = builder.build().context("Build failed")?;
    info!(
        "Site built successfully in {}",
        builder.out_dir().display()
    );
    Ok(report)
}

/// Validates a configuration. Returns every problem found; plugin options
/// are checked by assembling the pipeline.
pub fn check(root: &Path, config: SiteConfig) -> Vec<String> {
    let problems = config.problems(&PluginCatalog::builtin());
    if !problems.is_empty() {
        return problems;
    }
    match SiteBuilder::new(root, config) {
        Ok(_) => Vec::new(),
        Err(err) => vec![err.to_string()],
    }
}

/// Writes the reference configuration and returns where it went.
pub fn init(format: ConfigFormat, force: bool, path: Option<PathBuf>) -> Result<PathBuf> {
    let output = path.unwrap_or_else(|| PathBuf::from(format.default_file_name()));
    if output.exists() && !force {
        bail!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            output.display()
        );
    }

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        info!("Created directory: {}", parent.display());
    }

    let config = SiteConfig::reference();
    let content = match format {
        ConfigFormat::Toml => config.to_toml_string()?,
        ConfigFormat::Json => config.to_json_string()?,
    };
    fs::write(&output, content)
        .with_context(|| format!("Failed to write configuration file: {}", output.display()))?;
    info!("Configuration file written to {}", output.display());
    Ok(output)
}

/// Renders one file with the site's pipeline and returns the body HTML.
pub fn render(root: &Path, config: SiteConfig, file: &Path) -> Result<String> {
    let builder = SiteBuilder::new(root, config).context("Failed to set up the pipeline")?;
    let source = builder.read_source(file)?;
    let page = builder
        .render_source(&source)
        .with_context(|| format!("Failed to render {}", file.display()))?;
    Ok(page.body)
}
