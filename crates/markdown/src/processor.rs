//! The markdown stages: frontmatter → mdast → remark chain → HTML → rehype chain.

use mdpress_core::{
    MarkdownConfig, ParseOptions, PipelineError, PluginSpec, Slugger, collect_root_statements,
    extract_frontmatter, parse_mdast,
};

use crate::highlight::Highlighter;
use crate::rehype::{ALL_HEADINGS, RehypePlugin, RehypeRegistry, assign_ids, scan_headings};
use crate::remark::{RemarkPlugin, RemarkRegistry};
use crate::renderer::{RenderOptions, render};
use crate::{Document, FileData, HeadingEntry, PluginError, SourceKind};

/// Remark plugins applied when none are configured, or when
/// `extendDefaultPlugins` is set.
pub const DEFAULT_REMARK_PLUGINS: [&str; 2] = ["remark-gfm", "remark-smartypants"];

/// Label used for errors raised by the final heading pass.
const HEADINGS_PASS: &str = "heading ids";

/// A configured, immutable pipeline shared by every page of a build.
///
/// ```
/// use mdpress_core::MarkdownConfig;
/// use mdpress_markdown::{MarkdownProcessor, SourceKind};
///
/// let processor = MarkdownProcessor::new(&MarkdownConfig::default()).unwrap();
/// let doc = processor.process("# Hi -- there", SourceKind::Markdown).unwrap();
/// assert_eq!(doc.html, "<h1 id=\"hi--there\">Hi — there</h1>");
/// ```
pub struct MarkdownProcessor {
    remark: Vec<Box<dyn RemarkPlugin>>,
    rehype: Vec<Box<dyn RehypePlugin>>,
    render: RenderOptions,
    math: bool,
}

impl std::fmt::Debug for MarkdownProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownProcessor")
            .field("remark", &self.remark_names())
            .field("rehype", &self.rehype_names())
            .field("render", &self.render)
            .finish()
    }
}

impl MarkdownProcessor {
    /// Builds the pipeline with the built-in plugins.
    pub fn new(config: &MarkdownConfig) -> Result<Self, PluginError> {
        Self::with_registries(config, &RemarkRegistry::builtin(), &RehypeRegistry::builtin())
    }

    /// Builds the pipeline resolving plugin names against the given registries.
    pub fn with_registries(
        config: &MarkdownConfig,
        remark_registry: &RemarkRegistry,
        rehype_registry: &RehypeRegistry,
    ) -> Result<Self, PluginError> {
        let use_defaults = config.extend_default_plugins
            || (config.remark_plugins.is_empty() && config.rehype_plugins.is_empty());

        let mut remark_specs: Vec<PluginSpec> = Vec::new();
        if use_defaults {
            remark_specs.extend(DEFAULT_REMARK_PLUGINS.iter().map(|name| PluginSpec::new(*name)));
        }
        remark_specs.extend(config.remark_plugins.iter().cloned());

        let remark = remark_registry.build_chain(&remark_specs)?;
        let rehype = rehype_registry.build_chain(&config.rehype_plugins)?;
        let highlighter = Highlighter::new(config.syntax_highlight, &config.shiki_theme)?;

        let processor = Self {
            remark,
            rehype,
            render: RenderOptions {
                highlighter,
                allow_raw_html: config.allow_raw_html,
            },
            math: config.math,
        };
        log::debug!(
            "markdown pipeline: remark {:?}, rehype {:?}",
            processor.remark_names(),
            processor.rehype_names()
        );
        Ok(processor)
    }

    /// Remark plugin names in execution order.
    pub fn remark_names(&self) -> Vec<&str> {
        self.remark.iter().map(|plugin| plugin.name()).collect()
    }

    /// Rehype plugin names in execution order.
    pub fn rehype_names(&self) -> Vec<&str> {
        self.rehype.iter().map(|plugin| plugin.name()).collect()
    }

    fn parse_options(&self, kind: SourceKind) -> ParseOptions {
        let mut options = match kind {
            SourceKind::Markdown => ParseOptions::markdown(),
            SourceKind::Mdx => ParseOptions::mdx(),
        };
        options.math = self.math;
        for plugin in &self.remark {
            plugin.configure_parser(&mut options);
        }
        options
    }

    /// Runs one source through every stage.
    pub fn process(&self, source: &str, kind: SourceKind) -> Result<Document, PipelineError> {
        let frontmatter = extract_frontmatter(source)?;
        let body = frontmatter.body(source);
        let line_offset = source[..frontmatter.body_start].matches('\n').count();

        let (esm, body) = match kind {
            SourceKind::Mdx => {
                let (esm, lines) = collect_root_statements(body);
                (esm, std::borrow::Cow::Owned(lines.join("\n")))
            }
            SourceKind::Markdown => (Default::default(), std::borrow::Cow::Borrowed(body)),
        };

        let mut tree = parse_mdast(&body, &self.parse_options(kind)).map_err(|err| match err {
            PipelineError::Parse {
                message,
                mut location,
            } => {
                location.line += line_offset;
                PipelineError::Parse { message, location }
            }
            other => other,
        })?;

        let mut file = FileData::new(kind, frontmatter.value);
        for plugin in &self.remark {
            log::trace!("remark: {}", plugin.name());
            plugin.transform(&mut tree, &mut file)?;
        }

        let mut html = render(&tree, &self.render, &mut file);
        // Visible heading text, taken before rehype plugins add link content.
        let rendered_headings = scan_headings(&html, ALL_HEADINGS, HEADINGS_PASS)?;

        for plugin in &self.rehype {
            log::trace!("rehype: {}", plugin.name());
            html = plugin.transform(&html, &mut file)?;
        }

        let (html, headings) = finalize_headings(html, &rendered_headings)?;

        let FileData {
            frontmatter,
            diagnostics,
            ..
        } = file;
        Ok(Document {
            html,
            frontmatter,
            headings,
            imports: esm.bindings(),
            esm,
            diagnostics,
        })
    }
}

/// Gives headings still lacking an id one from their text, then lists them.
fn finalize_headings(
    html: String,
    rendered: &[crate::rehype::ScannedHeading],
) -> Result<(String, Vec<HeadingEntry>), PipelineError> {
    let scanned = scan_headings(&html, ALL_HEADINGS, HEADINGS_PASS)?;
    let text_of = |index: usize| -> String {
        match rendered.get(index) {
            Some(heading) if rendered.len() == scanned.len() => heading.text.clone(),
            _ => scanned[index].text.clone(),
        }
    };

    let mut slugger = Slugger::new();
    for id in scanned.iter().filter_map(|heading| heading.id.as_deref()) {
        slugger.reserve(id);
    }

    let mut missing = Vec::with_capacity(scanned.len());
    let mut headings = Vec::with_capacity(scanned.len());
    for (index, heading) in scanned.iter().enumerate() {
        let text = text_of(index);
        let slug = match &heading.id {
            Some(id) => {
                missing.push(None);
                id.clone()
            }
            None => {
                let slug = slugger.next_slug(&text);
                missing.push(Some(slug.clone()));
                slug
            }
        };
        headings.push(HeadingEntry {
            depth: heading.depth,
            slug,
            text,
        });
    }

    let html = if missing.iter().any(Option::is_some) {
        assign_ids(&html, ALL_HEADINGS, &missing, HEADINGS_PASS)?
    } else {
        html
    };
    Ok((html, headings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpress_core::SyntaxHighlight;
    use serde_json::json;

    fn config(remark: Vec<PluginSpec>, rehype: Vec<PluginSpec>) -> MarkdownConfig {
        MarkdownConfig {
            syntax_highlight: SyntaxHighlight::Disabled,
            remark_plugins: remark,
            rehype_plugins: rehype,
            ..MarkdownConfig::default()
        }
    }

    #[test]
    fn defaults_apply_without_configured_plugins() {
        let processor = MarkdownProcessor::new(&config(vec![], vec![])).unwrap();
        assert_eq!(processor.remark_names(), DEFAULT_REMARK_PLUGINS);
    }

    #[test]
    fn configured_plugins_replace_defaults_unless_extended() {
        let remark = vec![PluginSpec::new("remark-prism")];
        let processor = MarkdownProcessor::new(&config(remark.clone(), vec![])).unwrap();
        assert_eq!(processor.remark_names(), vec!["remark-prism"]);

        let mut extended = config(remark, vec![]);
        extended.extend_default_plugins = true;
        let processor = MarkdownProcessor::new(&extended).unwrap();
        assert_eq!(
            processor.remark_names(),
            vec!["remark-gfm", "remark-smartypants", "remark-prism"]
        );
    }

    #[test]
    fn repeated_plugins_run_each_time() {
        let behead = PluginSpec::with_options("remark-behead", json!({ "depth": 1 }));
        let processor =
            MarkdownProcessor::new(&config(vec![behead.clone(), behead], vec![])).unwrap();
        let doc = processor.process("# A", SourceKind::Markdown).unwrap();
        assert_eq!(doc.html, "<h3 id=\"a\">A</h3>");
    }

    #[test]
    fn unknown_plugins_fail_construction() {
        let err = MarkdownProcessor::new(&config(vec![], vec![PluginSpec::new("rehype-x")]))
            .err()
            .unwrap();
        assert!(matches!(err, PluginError::Unknown { stage: "rehype", .. }));
    }

    #[test]
    fn frontmatter_and_headings() {
        let processor = MarkdownProcessor::new(&config(vec![], vec![])).unwrap();
        let source = "---\ntitle: Guide\ndraft: true\n---\n# Intro\n\n## Intro\n\n## Setup {#install}\n";
        let doc = processor.process(source, SourceKind::Markdown).unwrap();

        assert_eq!(doc.frontmatter["title"], json!("Guide"));
        assert!(doc.is_draft());
        let slugs: Vec<&str> = doc.headings.iter().map(|h| h.slug.as_str()).collect();
        assert_eq!(slugs, vec!["intro", "intro-1", "install"]);
        assert_eq!(doc.headings[2].text, "Setup");
        assert_eq!(
            doc.html,
            "<h1 id=\"intro\">Intro</h1><h2 id=\"intro-1\">Intro</h2><h2 id=\"install\">Setup</h2>"
        );
    }

    #[test]
    fn heading_text_excludes_autolink_content() {
        let rehype = vec![
            PluginSpec::new("rehype-slug"),
            PluginSpec::with_options(
                "rehype-autolink-headings",
                json!({ "content": { "type": "text", "value": "#" } }),
            ),
        ];
        let processor = MarkdownProcessor::new(&config(vec![], rehype)).unwrap();
        let doc = processor.process("## Usage", SourceKind::Markdown).unwrap();
        assert_eq!(doc.headings[0].text, "Usage");
        assert!(doc.html.contains("href=\"#usage\">#</a>Usage"), "{}", doc.html);
    }

    #[test]
    fn mdx_imports_are_hoisted() {
        let processor = MarkdownProcessor::new(&config(vec![], vec![])).unwrap();
        let source = "---\ntitle: T\n---\nimport Counter from '../components/Counter.svelte';\n\n<Counter client:visible />\n";
        let doc = processor.process(source, SourceKind::Mdx).unwrap();

        assert_eq!(doc.esm.imports.len(), 1);
        let binding = doc.import_for("Counter").unwrap();
        assert_eq!(binding.source, "../components/Counter.svelte");
        assert_eq!(
            doc.html,
            "<mdx-component data-name=\"Counter\" data-props='{}' data-hydrate=\"visible\"></mdx-component>"
        );
    }

    #[test]
    fn parse_errors_report_source_lines() {
        let processor = MarkdownProcessor::new(&config(vec![], vec![])).unwrap();
        let source = "---\ntitle: T\n---\n\n<Broken\n";
        let err = processor.process(source, SourceKind::Mdx).err().unwrap();
        let PipelineError::Parse { location, .. } = err else {
            panic!("expected a parse error, got {err}");
        };
        assert_eq!(location.line, 5, "{location}");
    }

    #[test]
    fn parse_errors_after_imports_keep_their_line() {
        let processor = MarkdownProcessor::new(&config(vec![], vec![])).unwrap();
        let source = "---\ntitle: T\n---\nimport A from './A.svelte';\nimport {\n  B,\n} from './B.svelte';\n\n# Title\n\n<Broken\n";
        let err = processor.process(source, SourceKind::Mdx).err().unwrap();
        let PipelineError::Parse { location, .. } = err else {
            panic!("expected a parse error, got {err}");
        };
        assert_eq!((location.line, location.column), (11, 1));
    }

    #[test]
    fn processor_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MarkdownProcessor>();
    }
}
