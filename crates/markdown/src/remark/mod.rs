//! Markdown AST (mdast) transforms.
//!
//! Each plugin may adjust parser options before the source is parsed and then
//! rewrite the tree. Plugins run in configuration order; a plugin listed twice
//! runs twice.
//!
//! HTML produced by a plugin is inserted as an `Html` node without a source
//! position. The renderer always trusts such nodes, even when raw HTML from
//! sources is escaped.

mod a11y_emoji;
mod behead;
mod gfm;
mod prism;
mod smartypants;

pub use a11y_emoji::A11yEmoji;
pub use behead::Behead;
pub use gfm::Gfm;
pub use prism::Prism;
pub use smartypants::{DashStyle, SmartyPants, SmartyPantsOptions};

use std::collections::BTreeMap;

use markdown::mdast::{Html, Node};
use mdpress_core::{ParseOptions, PipelineError, PluginSpec};

use crate::{FileData, PluginError};

/// A markdown AST transform.
pub trait RemarkPlugin: Send + Sync {
    /// Name as written in configuration.
    fn name(&self) -> &str;

    /// Adjusts parser options before the document is parsed.
    fn configure_parser(&self, _options: &mut ParseOptions) {}

    /// Rewrites the tree in place.
    fn transform(&self, tree: &mut Node, file: &mut FileData) -> Result<(), PipelineError>;
}

/// Builds a plugin from its configuration entry.
pub type RemarkFactory = fn(&PluginSpec) -> Result<Box<dyn RemarkPlugin>, PluginError>;

/// Name → factory table for remark plugins.
#[derive(Clone)]
pub struct RemarkRegistry {
    factories: BTreeMap<String, RemarkFactory>,
}

impl RemarkRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with every built-in plugin.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(gfm::NAME, |spec| Ok(Box::new(Gfm::from_spec(spec)?)));
        registry.register(smartypants::NAME, |spec| {
            Ok(Box::new(SmartyPants::from_spec(spec)?))
        });
        registry.register(prism::NAME, |spec| Ok(Box::new(Prism::from_spec(spec)?)));
        registry.register(a11y_emoji::NAME, |spec| {
            Ok(Box::new(A11yEmoji::from_spec(spec)?))
        });
        registry.register(behead::NAME, |spec| Ok(Box::new(Behead::from_spec(spec)?)));
        registry
    }

    /// Adds or replaces a plugin.
    pub fn register(&mut self, name: &str, factory: RemarkFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiates one plugin.
    pub fn build(&self, spec: &PluginSpec) -> Result<Box<dyn RemarkPlugin>, PluginError> {
        let factory = self
            .factories
            .get(&spec.name)
            .ok_or_else(|| PluginError::Unknown {
                stage: "remark",
                name: spec.name.clone(),
            })?;
        factory(spec)
    }

    /// Instantiates a chain, preserving order.
    pub fn build_chain(
        &self,
        specs: &[PluginSpec],
    ) -> Result<Vec<Box<dyn RemarkPlugin>>, PluginError> {
        specs.iter().map(|spec| self.build(spec)).collect()
    }
}

impl Default for RemarkRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Plain text of a list of phrasing nodes (used for heading matching).
pub fn plain_text(nodes: &[Node]) -> String {
    fn collect(node: &Node, buffer: &mut String) {
        match node {
            Node::Text(text) => buffer.push_str(&text.value),
            Node::InlineCode(code) => buffer.push_str(&code.value),
            Node::InlineMath(math) => buffer.push_str(&math.value),
            other => {
                if let Some(children) = other.children() {
                    for child in children {
                        collect(child, buffer);
                    }
                }
            }
        }
    }

    let mut text = String::new();
    for node in nodes {
        collect(node, &mut text);
    }
    text.trim().to_string()
}

/// Visits every node depth-first, parents before children.
pub(crate) fn walk_mut(node: &mut Node, visit: &mut dyn FnMut(&mut Node)) {
    visit(node);
    if let Some(children) = node.children_mut() {
        for child in children {
            walk_mut(child, visit);
        }
    }
}

/// HTML node for markup generated by a plugin.
pub(crate) fn synthesized_html(value: String) -> Node {
    Node::Html(Html {
        value,
        position: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpress_core::parse_mdast;
    use serde_json::json;

    #[test]
    fn builtin_names_match_catalog() {
        let registry = RemarkRegistry::builtin();
        let names: Vec<&str> = registry.names().collect();
        let catalog = mdpress_core::PluginCatalog::builtin();
        let expected: Vec<&str> = catalog.remark.iter().map(String::as_str).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn unknown_plugin_is_an_error() {
        let err = RemarkRegistry::builtin()
            .build(&PluginSpec::new("remark-toc"))
            .err()
            .unwrap();
        assert!(matches!(err, PluginError::Unknown { stage: "remark", .. }));
    }

    #[test]
    fn invalid_options_name_the_plugin() {
        let spec = PluginSpec::with_options("remark-behead", json!({ "depth": "one" }));
        let err = RemarkRegistry::builtin().build(&spec).err().unwrap();
        assert!(err.to_string().contains("remark-behead"), "{err}");
    }

    #[test]
    fn plain_text_flattens_phrasing() {
        let tree = parse_mdast("# Hello *big* `world`", &ParseOptions::markdown()).unwrap();
        let heading = &tree.children().unwrap()[0];
        assert_eq!(plain_text(heading.children().unwrap()), "Hello big world");
    }
}
