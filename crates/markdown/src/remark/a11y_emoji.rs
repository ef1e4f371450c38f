use html_escape::encode_double_quoted_attribute;
use markdown::mdast::{Node, Text};
use mdpress_core::{PipelineError, PluginSpec};

use super::{RemarkPlugin, synthesized_html};
use crate::{FileData, PluginError};

pub(super) const NAME: &str = "@fec/remark-a11y-emoji";

/// Longest emoji sequence tried, in chars (family ZWJ sequences are 7-11).
const MAX_SEQUENCE: usize = 12;

/// Wraps emoji in `<span role="img" aria-label="NAME">` so screen readers
/// announce them.
#[derive(Debug, Clone, Default)]
pub struct A11yEmoji;

impl A11yEmoji {
    /// Builds the plugin; it takes no options.
    pub fn from_spec(spec: &PluginSpec) -> Result<Self, PluginError> {
        match &spec.options {
            Some(options) if options.as_object().is_some_and(|map| !map.is_empty()) => Err(
                PluginError::invalid_options(&spec.name, "this plugin takes no options"),
            ),
            _ => Ok(Self),
        }
    }
}

/// A piece of a text node after emoji detection.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Emoji(&'a str, &'static str),
}

fn may_start_emoji(c: char, next: Option<char>) -> bool {
    // Keycaps start with an ASCII digit, `#` or `*`.
    !c.is_ascii() || matches!(next, Some('\u{fe0f}' | '\u{20e3}'))
}

fn split_emoji(text: &str) -> Vec<Segment<'_>> {
    let indices: Vec<(usize, char)> = text.char_indices().collect();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < indices.len() {
        let (start, c) = indices[i];
        let next = indices.get(i + 1).map(|(_, c)| *c);
        if !may_start_emoji(c, next) {
            i += 1;
            continue;
        }

        // Greedy: the longest run of chars that is a known emoji wins.
        let longest = (1..=MAX_SEQUENCE.min(indices.len() - i))
            .rev()
            .find_map(|len| {
                let end = indices.get(i + len).map_or(text.len(), |(offset, _)| *offset);
                let candidate = &text[start..end];
                let emoji = emojis::get(candidate)?;
                // Lone Latin-1 symbols (©, ®) are text unless followed by VS16.
                if len == 1 && (c as u32) < 0x100 {
                    return None;
                }
                Some((len, end, emoji.name()))
            });

        match longest {
            Some((len, end, name)) => {
                if text_start < start {
                    segments.push(Segment::Text(&text[text_start..start]));
                }
                segments.push(Segment::Emoji(&text[start..end], name));
                text_start = end;
                i += len;
            }
            None => i += 1,
        }
    }

    if text_start < text.len() {
        segments.push(Segment::Text(&text[text_start..]));
    }
    segments
}

fn emoji_html(emoji: &str, name: &str) -> String {
    format!(
        "<span role=\"img\" aria-label=\"{}\">{}</span>",
        encode_double_quoted_attribute(name),
        emoji
    )
}

fn rewrite_children(children: &mut Vec<Node>) {
    let needs_split = children.iter().any(|child| match child {
        Node::Text(text) => split_emoji(&text.value)
            .iter()
            .any(|segment| matches!(segment, Segment::Emoji(..))),
        _ => false,
    });

    if needs_split {
        let old = std::mem::take(children);
        for child in old {
            let Node::Text(text) = child else {
                children.push(child);
                continue;
            };
            for segment in split_emoji(&text.value) {
                children.push(match segment {
                    Segment::Text(value) => Node::Text(Text {
                        value: value.to_string(),
                        position: None,
                    }),
                    Segment::Emoji(emoji, name) => synthesized_html(emoji_html(emoji, name)),
                });
            }
        }
    }

    for child in children.iter_mut() {
        if let Some(grandchildren) = child.children_mut() {
            rewrite_children(grandchildren);
        }
    }
}

impl RemarkPlugin for A11yEmoji {
    fn name(&self) -> &str {
        NAME
    }

    fn transform(&self, tree: &mut Node, _file: &mut FileData) -> Result<(), PipelineError> {
        if let Some(children) = tree.children_mut() {
            rewrite_children(children);
        }
        Ok(())
    }
}
