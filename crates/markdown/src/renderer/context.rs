//! Rendering state threaded through the mdast traversal.

use std::collections::HashMap;

use html_escape::{encode_double_quoted_attribute_to_string, encode_text_to_string};
use markdown::mdast::Node;
use mdpress_core::SourceLocation;
use markdown::unist::Position;

use super::RenderOptions;
use crate::FileData;

/// Which element the renderer is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    Root,
    Paragraph,
    List { loose: bool },
    Table,
}

/// Link/image target declared by a definition (`[id]: url "title"`).
#[derive(Debug, Clone)]
pub(crate) struct LinkTarget {
    pub url: String,
    pub title: Option<String>,
}

/// Sanitizes a footnote identifier for use in `id`/`href` attributes.
pub(crate) fn sanitize_footnote_id(id: &str) -> String {
    id.chars()
        .filter_map(|c| {
            let c = c.to_ascii_lowercase();
            (c.is_ascii_alphanumeric() || c == '-' || c == '_').then_some(c)
        })
        .collect()
}

#[derive(Debug, Default)]
struct Footnotes {
    /// Identifiers in order of first reference.
    order: Vec<String>,
    /// References seen so far per identifier.
    ref_counts: HashMap<String, usize>,
    /// Rendered definition bodies.
    definitions: HashMap<String, String>,
}

pub(crate) struct Context<'a> {
    html: String,
    stack: Vec<Scope>,
    options: &'a RenderOptions,
    pub(crate) file: &'a mut FileData,
    definitions: HashMap<String, LinkTarget>,
    footnotes: Footnotes,
}

impl<'a> Context<'a> {
    pub fn new(tree: &Node, options: &'a RenderOptions, file: &'a mut FileData) -> Self {
        let mut definitions = HashMap::new();
        collect_definitions(tree, &mut definitions);

        Self {
            html: String::with_capacity(4096),
            stack: vec![Scope::Root],
            options,
            file,
            definitions,
            footnotes: Footnotes::default(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        self.options
    }

    /// Writes markup without escaping.
    pub fn push_raw(&mut self, s: &str) {
        self.html.push_str(s);
    }

    /// Writes escaped text content.
    pub fn push_text(&mut self, s: &str) {
        encode_text_to_string(s, &mut self.html);
    }

    /// Writes an escaped attribute value (without the quotes).
    pub fn push_attr_value(&mut self, s: &str) {
        encode_double_quoted_attribute_to_string(s, &mut self.html);
    }

    /// Writes ` name="value"`.
    pub fn push_attr(&mut self, name: &str, value: &str) {
        self.html.push(' ');
        self.html.push_str(name);
        self.html.push_str("=\"");
        self.push_attr_value(value);
        self.html.push('"');
    }

    pub fn enter(&mut self, scope: Scope) {
        self.stack.push(scope);
    }

    pub fn exit(&mut self) -> Option<Scope> {
        self.stack.pop()
    }

    /// True inside a tight list, where paragraphs lose their `<p>`.
    pub fn is_in_tight_list(&self) -> bool {
        self.stack
            .iter()
            .rev()
            .find(|scope| matches!(scope, Scope::List { .. }))
            .is_some_and(|scope| matches!(scope, Scope::List { loose: false }))
    }

    /// Renders `render` into a separate buffer and returns what it wrote.
    pub fn capture(&mut self, render: impl FnOnce(&mut Self)) -> String {
        let saved = std::mem::take(&mut self.html);
        render(self);
        std::mem::replace(&mut self.html, saved)
    }

    pub fn definition(&self, identifier: &str) -> Option<&LinkTarget> {
        self.definitions.get(identifier)
    }

    pub fn warn_at(&mut self, position: Option<&Position>, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.file
            .diagnostics
            .warn_at(SourceLocation::of_position(position), message);
    }

    /// Registers a reference; returns `(ordinal, nth reference to this id)`.
    pub fn footnote_reference(&mut self, identifier: &str) -> (usize, usize) {
        let ordinal = match self.footnotes.order.iter().position(|id| id == identifier) {
            Some(index) => index + 1,
            None => {
                self.footnotes.order.push(identifier.to_string());
                self.footnotes.order.len()
            }
        };
        let count = self
            .footnotes
            .ref_counts
            .entry(identifier.to_string())
            .or_insert(0);
        *count += 1;
        (ordinal, *count)
    }

    pub fn push_footnote_definition(&mut self, identifier: &str, html: String) {
        self.footnotes
            .definitions
            .entry(identifier.to_string())
            .or_insert(html);
    }

    /// Consumes the context, appending the footnotes section when any
    /// referenced footnote has a definition.
    pub fn finish(mut self) -> String {
        let footnotes = std::mem::take(&mut self.footnotes);
        let items: Vec<(usize, &String, &String)> = footnotes
            .order
            .iter()
            .filter_map(|id| footnotes.definitions.get(id).map(|body| (id, body)))
            .enumerate()
            .map(|(i, (id, body))| (i + 1, id, body))
            .collect();

        if items.is_empty() {
            return self.html;
        }

        self.html.push_str(
            "<section data-footnotes class=\"footnotes\"><h2 class=\"sr-only\" id=\"footnote-label\">Footnotes</h2><ol>",
        );
        for (ordinal, id, body) in items {
            let safe_id = sanitize_footnote_id(id);
            let refs = footnotes.ref_counts.get(id).copied().unwrap_or(1);
            let mut backrefs = String::new();
            for n in 1..=refs {
                let suffix = if n == 1 { String::new() } else { format!("-{n}") };
                let label = if n == 1 {
                    format!("Back to reference {ordinal}")
                } else {
                    format!("Back to reference {ordinal}-{n}")
                };
                backrefs.push_str(&format!(
                    " <a href=\"#user-content-fnref-{safe_id}{suffix}\" data-footnote-backref aria-label=\"{label}\" class=\"data-footnote-backref\">↩</a>"
                ));
            }

            self.html
                .push_str(&format!("<li id=\"user-content-fn-{safe_id}\">"));
            // The back reference goes inside the last paragraph when there is one.
            match body.strip_suffix("</p>") {
                Some(head) => {
                    self.html.push_str(head);
                    self.html.push_str(&backrefs);
                    self.html.push_str("</p>");
                }
                None => {
                    self.html.push_str(body);
                    self.html.push_str(&backrefs);
                }
            }
            self.html.push_str("</li>");
        }
        self.html.push_str("</ol></section>");
        self.html
    }
}

fn collect_definitions(node: &Node, out: &mut HashMap<String, LinkTarget>) {
    if let Node::Definition(definition) = node {
        // The first definition of a label wins.
        out.entry(definition.identifier.clone())
            .or_insert_with(|| LinkTarget {
                url: definition.url.clone(),
                title: definition.title.clone(),
            });
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_definitions(child, out);
        }
    }
}
