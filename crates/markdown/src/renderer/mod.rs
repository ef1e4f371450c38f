//! mdast → HTML rendering.
//!
//! Output is a single HTML fragment with no whitespace between blocks.
//! Heading ids are only emitted for explicit `{#custom-id}` suffixes; the
//! rest are assigned after the rehype chain.

mod context;
mod mdx;
mod render;

pub use mdx::{COMPONENT_TAG, json_attribute};

use markdown::mdast::Node;

use crate::FileData;
use crate::highlight::Highlighter;
use context::Context;

/// Settings that change how nodes are emitted.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Code block highlighter.
    pub highlighter: Highlighter,
    /// Pass raw HTML from sources through unescaped.
    pub allow_raw_html: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            highlighter: Highlighter::disabled(),
            allow_raw_html: true,
        }
    }
}

/// Renders a tree to an HTML fragment. Warnings are recorded on `file`.
pub fn render(tree: &Node, options: &RenderOptions, file: &mut FileData) -> String {
    let mut ctx = Context::new(tree, options, file);
    render::render_node(tree, &mut ctx);
    ctx.finish()
}
