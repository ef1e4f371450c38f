//! The site build.
//!
//! A [`SiteBuilder`] is assembled once from a [`SiteConfig`]: the markdown
//! processor, integrations, component renderers and toolchain plugins are
//! all constructed up front, so option errors surface before any page is
//! touched. [`SiteBuilder::build`] then renders pages in parallel and runs
//! the post-build hooks sequentially.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use mdpress_core::{PipelineError, SiteConfig};
use mdpress_markdown::MarkdownProcessor;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::components::{ComponentRenderer, resolve_components};
use crate::error::{BuildError, PageFailure};
use crate::integrations::{self, BuildContext, Integration, IntegrationSetup, WrittenPage};
use crate::layout::render_page;
use crate::loader::{SourceFile, load_sources};
use crate::page::Page;
use crate::routes::output_path;
use crate::sitemap::{SitemapEntry, write_sitemap};
use crate::toolchain::{self, ToolchainPlugin};

/// Summary of a finished build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    /// Sources found.
    pub total: usize,
    /// Pages written.
    pub written: usize,
    /// Pages skipped because they are drafts.
    pub skipped_drafts: usize,
    /// Pages written, sorted by route.
    pub pages: Vec<WrittenPage>,
    /// Files copied from the public directory.
    pub public_files: usize,
    /// Sitemap location, when one was written.
    pub sitemap: Option<PathBuf>,
    /// Wall time.
    pub elapsed: Duration,
}

/// Builds a site from its configuration.
pub struct SiteBuilder {
    root: PathBuf,
    config: SiteConfig,
    processor: MarkdownProcessor,
    integrations: Vec<Box<dyn Integration>>,
    extensions: Vec<String>,
    renderers: Vec<Box<dyn ComponentRenderer>>,
    toolchain: Vec<Box<dyn ToolchainPlugin>>,
}

impl fmt::Debug for SiteBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteBuilder")
            .field("root", &self.root)
            .field("integrations", &self.integration_names())
            .field("extensions", &self.extensions)
            .field(
                "toolchain",
                &self.toolchain.iter().map(|plugin| plugin.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

enum PageOutcome {
    Written {
        page: WrittenPage,
        components: BTreeSet<PathBuf>,
    },
    Draft,
}

impl SiteBuilder {
    /// Validates `config` and assembles every plugin it names.
    ///
    /// Relative paths in the configuration are resolved against `root`.
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Result<Self, BuildError> {
        config.validate()?;
        let processor = MarkdownProcessor::new(&config.markdown)?;

        let integrations = config
            .integrations
            .iter()
            .map(integrations::from_spec)
            .collect::<Result<Vec<_>, _>>()?;
        let mut setup = IntegrationSetup::new();
        for integration in &integrations {
            integration.setup(&mut setup)?;
        }

        let toolchain = config
            .vite
            .plugins
            .iter()
            .map(toolchain::from_spec)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: root.into(),
            config,
            processor,
            integrations,
            extensions: setup.extensions,
            renderers: setup.renderers,
            toolchain,
        })
    }

    /// Configuration in effect.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Markdown processor shared by every page.
    pub fn processor(&self) -> &MarkdownProcessor {
        &self.processor
    }

    /// Page extensions claimed by the mounted integrations.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Integration names in mount order.
    pub fn integration_names(&self) -> Vec<&str> {
        self.integrations.iter().map(|integration| integration.name()).collect()
    }

    /// Pages directory.
    pub fn src_dir(&self) -> PathBuf {
        self.root.join(&self.config.build.src_dir)
    }

    /// Output directory.
    pub fn out_dir(&self) -> PathBuf {
        self.root.join(&self.config.build.out_dir)
    }

    /// Reads a single source with this site's routing.
    pub fn read_source(&self, path: &Path) -> Result<SourceFile, BuildError> {
        SourceFile::read(path, &self.src_dir(), self.config.build.format)
    }

    /// Runs one source through the pipeline without writing it.
    ///
    /// Drafts are rendered like any other page.
    pub fn render_source(&self, source: &SourceFile) -> Result<Page, PipelineError> {
        self.assemble(source).map(|(page, _)| page)
    }

    fn assemble(&self, source: &SourceFile) -> Result<(Page, BTreeSet<PathBuf>), PipelineError> {
        let mut document = self.processor.process(&source.contents, source.kind)?;
        document.diagnostics.attach_file(&source.path);
        for warning in &document.diagnostics.warnings {
            log::warn!("{warning}");
        }

        let page_dir = source.path.parent().unwrap_or_else(|| Path::new("."));
        let resolved = resolve_components(&document, &self.root, page_dir, &self.renderers)?;

        let route = source.route.clone();
        let mut page = Page {
            title: document.title().map_or_else(|| route.clone(), str::to_string),
            description: document.description().map(str::to_string),
            canonical: self.config.absolute_url(&route),
            source: source.path.clone(),
            output: output_path(&route),
            head: Vec::new(),
            body: resolved.html,
            document,
            route,
        };
        for index in &resolved.renderers_used {
            for markup in self.renderers[*index].head() {
                page.add_head(markup);
            }
        }
        for integration in &self.integrations {
            integration.transform_page(&mut page)?;
        }

        Ok((page, resolved.sources))
    }

    fn build_page(&self, source: &SourceFile, out_dir: &Path) -> Result<PageOutcome, PipelineError> {
        let started = Instant::now();
        let (page, components) = self.assemble(source)?;
        if page.document.is_draft() && !self.config.build.drafts {
            log::debug!("skipping draft {}", source.path.display());
            return Ok(PageOutcome::Draft);
        }

        let destination = out_dir.join(&page.output);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&destination, render_page(&page))?;
        log::debug!("rendered {} in {:.2?}", page.route, started.elapsed());

        Ok(PageOutcome::Written {
            page: WrittenPage {
                route: page.route,
                output: destination,
            },
            components,
        })
    }

    /// Builds every page, then runs the post-build steps.
    ///
    /// Every failing page is logged; the build fails after all pages were
    /// attempted if any of them failed.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let started = Instant::now();
        let out_dir = self.out_dir();
        std::fs::create_dir_all(&out_dir).map_err(|err| BuildError::io("create", &out_dir, err))?;

        let sources = load_sources(&self.src_dir(), &self.extensions, self.config.build.format)?;
        log::info!("building {} page(s) into {}", sources.len(), out_dir.display());

        let pool = match self.config.build.concurrency {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|err| BuildError::ThreadPool(err.to_string()))?,
            ),
            None => None,
        };

        let failed = AtomicUsize::new(0);
        let process = |source: &SourceFile| {
            self.build_page(source, &out_dir).map_err(|error| {
                failed.fetch_add(1, Ordering::Relaxed);
                PageFailure {
                    path: source.path.clone(),
                    error,
                }
            })
        };
        let outcomes: Vec<Result<PageOutcome, PageFailure>> = match &pool {
            Some(pool) => pool.install(|| sources.par_iter().map(process).collect()),
            None => sources.par_iter().map(process).collect(),
        };

        let mut pages = Vec::new();
        let mut components = BTreeSet::new();
        let mut failures = Vec::with_capacity(failed.load(Ordering::Relaxed));
        let mut skipped_drafts = 0;
        for outcome in outcomes {
            match outcome {
                Ok(PageOutcome::Written { page, components: used }) => {
                    pages.push(page);
                    components.extend(used);
                }
                Ok(PageOutcome::Draft) => skipped_drafts += 1,
                Err(failure) => {
                    log::error!("{failure}");
                    failures.push(failure);
                }
            }
        }
        if !failures.is_empty() {
            return Err(BuildError::Pages(failures));
        }
        pages.sort_by(|a, b| a.route.cmp(&b.route));

        let public_files = self.copy_public_dir(&out_dir)?;

        for source in toolchain::uncompiled(&self.toolchain, components.iter().map(PathBuf::as_path)) {
            log::warn!(
                "no toolchain plugin compiles {}; its islands will not hydrate",
                source.display()
            );
        }

        let ctx = BuildContext {
            root: &self.root,
            out_dir: &out_dir,
            config: &self.config,
            pages: &pages,
            components: &components,
        };
        for plugin in &self.toolchain {
            plugin.build_done(&ctx)?;
        }
        for integration in &self.integrations {
            integration.build_done(&ctx)?;
        }

        let sitemap = if self.config.build.sitemap && self.config.site.is_some() {
            let entries = pages.iter().filter_map(|page| {
                self.config
                    .absolute_url(&page.route)
                    .map(|loc| SitemapEntry { loc })
            });
            Some(write_sitemap(entries, &out_dir)?)
        } else {
            None
        };

        let report = BuildReport {
            total: sources.len(),
            written: pages.len(),
            skipped_drafts,
            pages,
            public_files,
            sitemap,
            elapsed: started.elapsed(),
        };
        log::info!(
            "built {} page(s) in {:.2?} ({} draft(s) skipped)",
            report.written,
            report.elapsed,
            report.skipped_drafts
        );
        Ok(report)
    }

    fn copy_public_dir(&self, out_dir: &Path) -> Result<usize, BuildError> {
        let public_dir = self.root.join(&self.config.build.public_dir);
        if !public_dir.is_dir() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(&public_dir).follow_links(true) {
            let entry = entry.map_err(|err| {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| public_dir.clone());
                BuildError::io("walk", path, err.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&public_dir).unwrap_or(entry.path());
            let target = out_dir.join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|err| BuildError::io("create", parent, err))?;
            }
            std::fs::copy(entry.path(), &target)
                .map_err(|err| BuildError::io("copy", entry.path(), err))?;
            copied += 1;
        }
        log::debug!("copied {copied} public file(s) from {}", public_dir.display());
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpress_core::PluginSpec;

    fn site(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (relative, contents) in files {
            let path = dir.path().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        }
        dir
    }

    #[test]
    fn invalid_configuration_fails_before_building() {
        let config = SiteConfig {
            integrations: vec![PluginSpec::new("react")],
            ..Default::default()
        };
        let err = SiteBuilder::new(".", config).unwrap_err();
        assert!(matches!(err, BuildError::Config(_)), "{err}");
    }

    #[test]
    fn bad_plugin_options_fail_before_building() {
        let mut config = SiteConfig::default();
        config.markdown.rehype_plugins = vec![PluginSpec::with_options(
            "rehype-autolink-headings",
            serde_json::json!({ "behavior": "sideways" }),
        )];
        let err = SiteBuilder::new(".", config).unwrap_err();
        assert!(matches!(err, BuildError::Plugin(_)), "{err}");
    }

    #[test]
    fn titles_fall_back_to_heading_then_route() {
        let dir = site(&[]);
        let builder = SiteBuilder::new(dir.path(), SiteConfig::default()).unwrap();
        let source = |route: &str, contents: &str| SourceFile {
            path: dir.path().join("src/pages/x.md"),
            relative: PathBuf::from("x.md"),
            route: route.to_string(),
            kind: mdpress_markdown::SourceKind::Markdown,
            contents: contents.to_string(),
        };

        let page = builder
            .render_source(&source("/a/", "---\ntitle: Front\n---\n# Heading"))
            .unwrap();
        assert_eq!(page.title, "Front");
        let page = builder.render_source(&source("/b/", "## Sub\n\n# Heading")).unwrap();
        assert_eq!(page.title, "Heading");
        let page = builder.render_source(&source("/c/", "plain")).unwrap();
        assert_eq!(page.title, "/c/");
        assert_eq!(page.output, PathBuf::from("c/index.html"));
        assert_eq!(page.canonical, None);
    }

    #[test]
    fn drafts_are_skipped_unless_enabled() {
        let dir = site(&[
            ("src/pages/index.md", "# Home"),
            ("src/pages/wip.md", "---\ndraft: true\n---\n# WIP"),
        ]);
        let report = SiteBuilder::new(dir.path(), SiteConfig::default())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.written, 1);
        assert_eq!(report.skipped_drafts, 1);
        assert!(!dir.path().join("dist/wip/index.html").exists());

        let mut config = SiteConfig::default();
        config.build.drafts = true;
        let report = SiteBuilder::new(dir.path(), config).unwrap().build().unwrap();
        assert_eq!(report.skipped_drafts, 0);
        assert!(dir.path().join("dist/wip/index.html").exists());
    }

    #[test]
    fn conflicting_routes_fail_before_writing() {
        let dir = site(&[
            ("src/pages/about.md", "# One"),
            ("src/pages/about/index.md", "# Two"),
        ]);
        let err = SiteBuilder::new(dir.path(), SiteConfig::default())
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::RouteConflict { ref route, .. } if route == "/about/"), "{err}");
        assert!(!dir.path().join("dist/about/index.html").exists());
    }

    #[cfg(unix)]
    #[test]
    fn broken_public_links_fail_the_copy() {
        let dir = site(&[("src/pages/index.md", "# Home"), ("public/ok.txt", "ok")]);
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("public/dangling"))
            .unwrap();
        let err = SiteBuilder::new(dir.path(), SiteConfig::default())
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::Io { action: "walk", .. }), "{err}");
    }

    #[test]
    fn public_files_are_copied_and_pool_is_sized() {
        let dir = site(&[
            ("src/pages/index.md", "# Home"),
            ("public/favicon.svg", "<svg/>"),
            ("public/img/logo.png", "png"),
        ]);
        let mut config = SiteConfig::default();
        config.build.concurrency = Some(2);
        let report = SiteBuilder::new(dir.path(), config).unwrap().build().unwrap();
        assert_eq!(report.public_files, 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("dist/img/logo.png")).unwrap(),
            "png"
        );
        assert_eq!(report.sitemap, None);
    }
}
