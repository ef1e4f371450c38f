use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command line interface for mdpress
#[derive(Parser, Debug)]
#[command(author, version, about = "mdpress: static sites from Markdown and MDX")]
pub struct Cli {
    /// Subcommand to execute (see [`Commands`])
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Configuration file format written by `init`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `mdpress.toml`
    Toml,
    /// `mdpress.json`
    Json,
}

impl ConfigFormat {
    /// File name used when no path is given.
    pub fn default_file_name(self) -> &'static str {
        match self {
            ConfigFormat::Toml => mdpress_core::config::DEFAULT_CONFIG_FILE,
            ConfigFormat::Json => "mdpress.json",
        }
    }
}

/// All supported subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the site into the output directory.
    Build {
        /// Configuration file (defaults to `mdpress.toml` in the root, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Project root that relative paths are resolved against
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Override `build.outDir`
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also build pages marked `draft: true`
        #[arg(long)]
        drafts: bool,

        /// Number of worker threads for page rendering
        #[arg(short = 'j', long = "jobs")]
        jobs: Option<usize>,
    },

    /// Load and validate the configuration, listing every problem.
    Check {
        /// Configuration file (defaults to `mdpress.toml` in the root, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Project root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Write the reference configuration.
    Init {
        /// Format of the configuration file
        #[arg(short = 'F', long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,

        /// Where to write the file
        path: Option<PathBuf>,
    },

    /// Render one Markdown or MDX file and print the HTML body.
    Render {
        /// Source file
        file: PathBuf,

        /// Configuration file (defaults to `mdpress.toml` in the root, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Project root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}
