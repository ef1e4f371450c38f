use anyhow::{Result, bail};
use clap::Parser;
use log::{LevelFilter, error, info};

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::BuildOverrides;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over the flags
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else if cli.quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .write_style(env_logger::WriteStyle::Auto)
        .init();

    match cli.command {
        Commands::Build {
            config,
            root,
            out,
            drafts,
            jobs,
        } => {
            let site = commands::load_config(&root, config.as_deref())?;
            let report = commands::build(&root, site, BuildOverrides { out, drafts, jobs })?;
            info!(
                "{} of {} page(s) written, {} public file(s) copied",
                report.pages.len(),
                report.total,
                report.public_files
            );
        }

        Commands::Check { config, root } => {
            let site = commands::load_config(&root, config.as_deref())?;
            let problems = commands::check(&root, site);
            if !problems.is_empty() {
                for problem in &problems {
                    error!("{problem}");
                }
                bail!("Configuration has {} problem(s)", problems.len());
            }
            info!("Configuration is valid");
        }

        Commands::Init {
            format,
            force,
            path,
        } => {
            commands::init(format, force, path)?;
        }

        Commands::Render { file, config, root } => {
            let site = commands::load_config(&root, config.as_deref())?;
            println!("{}", commands::render(&root, site, &file)?);
        }
    }

    Ok(())
}
