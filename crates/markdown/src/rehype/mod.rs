//! HTML transforms run after the tree has been rendered.
//!
//! Plugins receive the HTML fragment of the whole document and return a
//! rewritten one. Rewriting goes through lol_html, so plugins never re-parse
//! into a tree of their own.

mod autolink;
mod hast;
mod slug;

pub use autolink::{AutolinkHeadings, Behavior};
pub use hast::{HastContent, HastNode, attribute_name, properties_to_attributes};
pub use slug::Slug;

use std::cell::RefCell;
use std::collections::BTreeMap;

use lol_html::{RewriteStrSettings, element, rewrite_str, text};
use mdpress_core::{PipelineError, PluginSpec};

use crate::{FileData, PluginError};

/// Selector matching every heading level.
pub(crate) const ALL_HEADINGS: &str = "h1, h2, h3, h4, h5, h6";

/// An HTML transform.
pub trait RehypePlugin: Send + Sync {
    /// Name as written in configuration.
    fn name(&self) -> &str;

    /// Rewrites the document's HTML.
    fn transform(&self, html: &str, file: &mut FileData) -> Result<String, PipelineError>;
}

/// Builds a plugin from its configuration entry.
pub type RehypeFactory = fn(&PluginSpec) -> Result<Box<dyn RehypePlugin>, PluginError>;

/// Name → factory table for rehype plugins.
#[derive(Clone)]
pub struct RehypeRegistry {
    factories: BTreeMap<String, RehypeFactory>,
}

impl RehypeRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with every built-in plugin.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(slug::NAME, |spec| Ok(Box::new(Slug::from_spec(spec)?)));
        registry.register(autolink::NAME, |spec| {
            Ok(Box::new(AutolinkHeadings::from_spec(spec)?))
        });
        registry
    }

    /// Adds or replaces a plugin.
    pub fn register(&mut self, name: &str, factory: RehypeFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiates one plugin.
    pub fn build(&self, spec: &PluginSpec) -> Result<Box<dyn RehypePlugin>, PluginError> {
        let factory = self
            .factories
            .get(&spec.name)
            .ok_or_else(|| PluginError::Unknown {
                stage: "rehype",
                name: spec.name.clone(),
            })?;
        factory(spec)
    }

    /// Instantiates a chain, preserving order.
    pub fn build_chain(
        &self,
        specs: &[PluginSpec],
    ) -> Result<Vec<Box<dyn RehypePlugin>>, PluginError> {
        specs.iter().map(|spec| self.build(spec)).collect()
    }
}

impl Default for RehypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A heading found in rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScannedHeading {
    pub depth: u8,
    pub id: Option<String>,
    /// Decoded text content.
    pub text: String,
}

fn rewrite_error(plugin: &str, err: impl std::fmt::Display) -> PipelineError {
    PipelineError::plugin(plugin, format!("HTML rewriting failed: {err}"))
}

/// Lists headings matched by `selector` in document order.
pub(crate) fn scan_headings(
    html: &str,
    selector: &str,
    plugin: &str,
) -> Result<Vec<ScannedHeading>, PipelineError> {
    let headings = RefCell::new(Vec::new());

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(selector, |el| {
                    let depth = el
                        .tag_name()
                        .strip_prefix('h')
                        .and_then(|level| level.parse::<u8>().ok())
                        .unwrap_or(1);
                    let id = el
                        .get_attribute("id")
                        .filter(|id| !id.is_empty())
                        .map(|id| html_escape::decode_html_entities(&id).into_owned());
                    headings.borrow_mut().push(ScannedHeading {
                        depth,
                        id,
                        text: String::new(),
                    });
                    Ok(())
                }),
                // Headings never nest, so text belongs to the last one opened.
                text!(selector, |chunk| {
                    if let Some(heading) = headings.borrow_mut().last_mut() {
                        heading
                            .text
                            .push_str(&html_escape::decode_html_entities(chunk.as_str()));
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| rewrite_error(plugin, err))?;

    let mut headings = headings.into_inner();
    for heading in &mut headings {
        heading.text = heading.text.trim().to_string();
    }
    Ok(headings)
}

/// Sets `id` on the n-th heading matched by `selector` to `ids[n]`, leaving
/// headings with `None` untouched.
pub(crate) fn assign_ids(
    html: &str,
    selector: &str,
    ids: &[Option<String>],
    plugin: &str,
) -> Result<String, PipelineError> {
    let mut index = 0usize;

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, |el| {
                if let Some(Some(id)) = ids.get(index) {
                    el.set_attribute("id", id)?;
                }
                index += 1;
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| rewrite_error(plugin, err))
}
