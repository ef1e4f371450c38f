use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use maud::html;
use mdpress_core::{PipelineError, PluginSpec};
use serde::Deserialize;

use super::{BuildContext, Integration};
use crate::BuildError;
use crate::page::Page;

pub(super) const NAME: &str = "tailwind";

/// Public URL of the generated stylesheet.
pub const STYLESHEET_URL: &str = "/_assets/tailwind.css";

/// Entry used when the configured input file does not exist.
const DEFAULT_ENTRY: &str = "@import \"tailwindcss\";\n";

/// Options accepted by the `tailwind` integration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TailwindOptions {
    /// Tailwind CLI executable.
    pub binary: PathBuf,
    /// Stylesheet entry, relative to the project root.
    pub input: PathBuf,
    /// Pass `--minify` to the CLI.
    pub minify: bool,
}

impl Default for TailwindOptions {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tailwindcss"),
            input: PathBuf::from("src/styles/global.css"),
            minify: true,
        }
    }
}

/// Compiles the site stylesheet with the Tailwind CLI and links it from
/// every page.
#[derive(Debug, Clone, Default)]
pub struct Tailwind {
    options: TailwindOptions,
}

impl Tailwind {
    /// Integration with explicit options.
    pub fn new(options: TailwindOptions) -> Self {
        Self { options }
    }

    /// Reads options from a configured plugin entry.
    pub fn from_spec(spec: &PluginSpec) -> Result<Self, BuildError> {
        let options = match &spec.options {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|err| BuildError::integration(NAME, format!("invalid options: {err}")))?,
            None => TailwindOptions::default(),
        };
        Ok(Self::new(options))
    }

    /// Options in effect.
    pub fn options(&self) -> &TailwindOptions {
        &self.options
    }

    /// Runs the CLI from `root`; it scans for class names relative to its
    /// working directory.
    fn compile(&self, root: &Path, input_css: &str) -> Result<String, BuildError> {
        let mut command = Command::new(&self.options.binary);
        command
            .args(["--input", "-", "--output", "-"])
            .current_dir(root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if self.options.minify {
            command.arg("--minify");
        }

        let mut child = command.spawn().map_err(|err| {
            BuildError::integration(
                NAME,
                format!(
                    "failed to start `{}`, is the Tailwind CLI installed? ({err})",
                    self.options.binary.display()
                ),
            )
        })?;

        // stdin is closed when the handle drops
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input_css.as_bytes())
                .map_err(|err| BuildError::integration(NAME, format!("failed to write stdin: {err}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|err| BuildError::integration(NAME, err))?;
        if !output.status.success() {
            return Err(BuildError::integration(
                NAME,
                format!(
                    "Tailwind CLI exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Integration for Tailwind {
    fn name(&self) -> &str {
        NAME
    }

    fn transform_page(&self, page: &mut Page) -> Result<(), PipelineError> {
        page.add_head(html! { link rel="stylesheet" href=(STYLESHEET_URL); }.into_string());
        Ok(())
    }

    fn build_done(&self, ctx: &BuildContext<'_>) -> Result<(), BuildError> {
        let started = Instant::now();
        let input_path = ctx.root.join(&self.options.input);
        let input_css = if input_path.is_file() {
            std::fs::read_to_string(&input_path).map_err(|err| BuildError::io("read", &input_path, err))?
        } else {
            log::debug!(
                "{} not found, compiling the default Tailwind entry",
                input_path.display()
            );
            DEFAULT_ENTRY.to_string()
        };

        let css = self.compile(ctx.root, &input_css)?;

        let destination = ctx.out_dir.join(STYLESHEET_URL.trim_start_matches('/'));
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|err| BuildError::io("create", parent, err))?;
        }
        std::fs::write(&destination, css).map_err(|err| BuildError::io("write", &destination, err))?;

        log::info!(
            "wrote {} in {:.2?}",
            destination.display(),
            started.elapsed()
        );
        Ok(())
    }
}
