//! Smart punctuation (quotes, dashes, ellipses) over text nodes.

use markdown::mdast::Node;
use mdpress_core::{PipelineError, PluginSpec};
use serde::Deserialize;

use super::RemarkPlugin;
use crate::error::plugin_options;
use crate::{FileData, PluginError};

pub(super) const NAME: &str = "remark-smartypants";

const EM_DASH: char = '\u{2014}';
const EN_DASH: char = '\u{2013}';
const ELLIPSIS: char = '\u{2026}';
const LEFT_DOUBLE: char = '\u{201c}';
const RIGHT_DOUBLE: char = '\u{201d}';
const LEFT_SINGLE: char = '\u{2018}';
const RIGHT_SINGLE: char = '\u{2019}';

/// How `--` and `---` are educated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "DashesRepr")]
pub enum DashStyle {
    /// `--` → em dash.
    #[default]
    EmOnly,
    /// `--` → en dash, `---` → em dash.
    OldSchool,
    /// `--` → em dash, `---` → en dash.
    Inverted,
    /// Dashes are left alone.
    Disabled,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DashesRepr {
    Flag(bool),
    Style(String),
}

impl TryFrom<DashesRepr> for DashStyle {
    type Error = String;

    fn try_from(repr: DashesRepr) -> Result<Self, Self::Error> {
        match repr {
            DashesRepr::Flag(true) => Ok(DashStyle::EmOnly),
            DashesRepr::Flag(false) => Ok(DashStyle::Disabled),
            DashesRepr::Style(style) => match style.as_str() {
                "oldschool" => Ok(DashStyle::OldSchool),
                "inverted" => Ok(DashStyle::Inverted),
                other => Err(format!(
                    "unknown dashes style `{other}` (expected true, false, \"oldschool\" or \"inverted\")"
                )),
            },
        }
    }
}

/// Options accepted by `remark-smartypants`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SmartyPantsOptions {
    /// Curl straight quotes.
    pub quotes: bool,
    /// `...` → `…`
    pub ellipses: bool,
    /// ``` ``x'' ``` → `“x”`
    pub backticks: bool,
    /// Dash handling.
    pub dashes: DashStyle,
}

impl Default for SmartyPantsOptions {
    fn default() -> Self {
        Self {
            quotes: true,
            ellipses: true,
            backticks: true,
            dashes: DashStyle::EmOnly,
        }
    }
}

/// Educates punctuation in text nodes. Code, inline code, math, raw HTML
/// and MDX expressions are never touched.
#[derive(Debug, Clone)]
pub struct SmartyPants {
    options: SmartyPantsOptions,
}

impl SmartyPants {
    /// Builds the plugin from its configuration entry.
    pub fn from_spec(spec: &PluginSpec) -> Result<Self, PluginError> {
        Ok(Self::new(plugin_options(spec)?))
    }

    /// Plugin with explicit options.
    pub fn new(options: SmartyPantsOptions) -> Self {
        Self { options }
    }

    /// Quote direction depends on the character before, which may belong to
    /// a previous sibling (`"*Hi*"`), so `prev` is threaded through a block.
    fn visit(&self, node: &mut Node, prev: &mut Option<char>) {
        match node {
            Node::Text(text) => {
                text.value = self.educate(&text.value, prev);
                return;
            }
            Node::InlineCode(code) => {
                if let Some(last) = code.value.chars().next_back() {
                    *prev = Some(last);
                }
                return;
            }
            Node::Break(_) => {
                *prev = Some('\n');
                return;
            }
            _ => {}
        }

        let block = matches!(
            node,
            Node::Root(_)
                | Node::Blockquote(_)
                | Node::List(_)
                | Node::ListItem(_)
                | Node::Table(_)
                | Node::TableRow(_)
                | Node::FootnoteDefinition(_)
                | Node::MdxJsxFlowElement(_)
        );

        if let Some(children) = node.children_mut() {
            for child in children {
                if block {
                    *prev = None;
                }
                self.visit(child, prev);
            }
        }
    }

    /// Educates one run of text; `prev` is the character before it.
    fn educate(&self, input: &str, prev: &mut Option<char>) -> String {
        let opts = &self.options;
        let mut out = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();
        let mut last = *prev;

        while let Some(c) = chars.next() {
            match c {
                '-' if opts.dashes != DashStyle::Disabled && chars.peek() == Some(&'-') => {
                    chars.next();
                    let triple = chars.peek() == Some(&'-');
                    let dash = match (opts.dashes, triple) {
                        (DashStyle::OldSchool, true) => {
                            chars.next();
                            EM_DASH
                        }
                        (DashStyle::OldSchool, false) => EN_DASH,
                        (DashStyle::Inverted, true) => {
                            chars.next();
                            EN_DASH
                        }
                        _ => EM_DASH,
                    };
                    out.push(dash);
                }
                '.' if opts.ellipses && chars.clone().take(2).eq(['.', '.']) => {
                    chars.next();
                    chars.next();
                    out.push(ELLIPSIS);
                }
                '`' if opts.backticks && chars.peek() == Some(&'`') => {
                    chars.next();
                    out.push(LEFT_DOUBLE);
                }
                '\'' if opts.backticks && chars.peek() == Some(&'\'') => {
                    chars.next();
                    out.push(RIGHT_DOUBLE);
                }
                '"' if opts.quotes => {
                    out.push(if opens(last) { LEFT_DOUBLE } else { RIGHT_DOUBLE });
                }
                '\'' if opts.quotes => {
                    out.push(if opens(last) { LEFT_SINGLE } else { RIGHT_SINGLE });
                }
                _ => out.push(c),
            }
            last = out.chars().next_back();
        }

        *prev = last;
        out
    }
}

fn opens(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => {
            c.is_whitespace()
                || matches!(
                    c,
                    '(' | '[' | '{' | '<' | '-' | EM_DASH | EN_DASH | LEFT_DOUBLE | LEFT_SINGLE
                )
        }
    }
}

impl RemarkPlugin for SmartyPants {
    fn name(&self) -> &str {
        NAME
    }

    fn transform(&self, tree: &mut Node, _file: &mut FileData) -> Result<(), PipelineError> {
        let mut prev = None;
        self.visit(tree, &mut prev);
        Ok(())
    }
}
