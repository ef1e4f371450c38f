//! Markdown parsing utilities.

use crate::{PipelineError, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};

/// Parser options for building markdown-rs parse options.
///
/// Remark plugins adjust these before parsing (e.g. `remark-gfm` turns on `gfm`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Enable MDX JSX and expressions.
    pub mdx: bool,
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Whether a single tilde (`~a~`) is strikethrough under GFM.
    pub gfm_single_tilde: bool,
    /// Enable frontmatter parsing inside markdown-rs.
    pub frontmatter: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
    /// Allow raw HTML nodes in the AST.
    pub raw_html: bool,
    /// Enable math constructs ($inline$ and $$block$$).
    pub math: bool,
}

impl ParseOptions {
    /// CommonMark defaults with raw HTML allowed. Extensions are opt-in.
    pub const fn markdown() -> Self {
        Self {
            mdx: false,
            gfm: false,
            gfm_single_tilde: true,
            frontmatter: false,
            code_indented: true,
            raw_html: true,
            math: false,
        }
    }

    /// MDX defaults (JSX and expressions enabled, no raw HTML or indented code).
    pub const fn mdx() -> Self {
        Self {
            mdx: true,
            gfm: false,
            gfm_single_tilde: true,
            frontmatter: false,
            code_indented: false,
            raw_html: false,
            math: false,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    ///
    /// ESM is never enabled here: import/export statements are hoisted out of
    /// MDX bodies before parsing.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            frontmatter: self.frontmatter,
            code_indented: self.code_indented,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        if self.mdx {
            constructs.mdx_expression_flow = true;
            constructs.mdx_expression_text = true;
            constructs.mdx_jsx_flow = true;
            constructs.mdx_jsx_text = true;
        }

        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        markdown::ParseOptions {
            constructs,
            gfm_strikethrough_single_tilde: self.gfm_single_tilde,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::markdown()
    }
}

/// Parse markdown into an MDAST tree.
///
/// In MDX mode a tag that never closes is an error, even where markdown-rs
/// would fall back to text.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, PipelineError> {
    let tree =
        markdown::to_mdast(input, &options.to_markdown()).map_err(|err| PipelineError::Parse {
            message: err.reason.clone(),
            location: message_location(&err),
        })?;

    if options.mdx
        && let Some((offset, name)) = unclosed_tag(&tree, input)
    {
        return Err(PipelineError::Parse {
            message: format!("Unexpected end of tag `<{name}`, expected a closing `>`"),
            location: offset_location(input, offset),
        });
    }
    Ok(tree)
}

/// Finds a `<` followed by a tag name in text. MDX has no literal `<` before a
/// name, so such text is a tag markdown-rs could not finish.
fn unclosed_tag(node: &Node, input: &str) -> Option<(usize, String)> {
    if let Node::Text(text) = node
        && let Some(position) = &text.position
        && let Some(raw) = input.get(position.start.offset..position.end.offset)
    {
        let bytes = raw.as_bytes();
        for (index, byte) in bytes.iter().enumerate() {
            let offset = position.start.offset + index;
            let escaped = offset > 0 && input.as_bytes()[offset - 1] == b'\\';
            let opens = bytes
                .get(index + 1)
                .is_some_and(|next| next.is_ascii_alphabetic() || *next == b'/');
            if *byte == b'<' && opens && !escaped {
                let name = raw[index + 1..]
                    .chars()
                    .take_while(|c| {
                        c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '-' | '_' | ':')
                    })
                    .collect();
                return Some((offset, name));
            }
        }
        return None;
    }
    node.children()?
        .iter()
        .find_map(|child| unclosed_tag(child, input))
}

fn offset_location(input: &str, offset: usize) -> SourceLocation {
    let before = &input[..offset];
    let line_start = before.rfind('\n').map_or(0, |newline| newline + 1);
    SourceLocation::new(
        before.matches('\n').count() + 1,
        before[line_start..].chars().count() + 1,
    )
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_table(node: &Node) -> bool {
        matches!(node, Node::Table(_))
            || node
                .children()
                .is_some_and(|children| children.iter().any(has_table))
    }

    #[test]
    fn tables_require_gfm() {
        let input = "| a | b |\n| - | - |\n| 1 | 2 |";
        let plain = parse_mdast(input, &ParseOptions::markdown()).unwrap();
        assert!(!has_table(&plain));

        let gfm = ParseOptions {
            gfm: true,
            ..ParseOptions::markdown()
        };
        assert!(has_table(&parse_mdast(input, &gfm).unwrap()));
    }

    #[test]
    fn mdx_syntax_errors_carry_a_location() {
        let err = parse_mdast("# Title\n\n<Counter", &ParseOptions::mdx()).unwrap_err();
        match err {
            PipelineError::Parse { location, .. } => assert_eq!(location.line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_tag_with_attributes_is_an_error() {
        let err = parse_mdast("# T\n\n<Counter start={1}\n", &ParseOptions::mdx()).unwrap_err();
        let PipelineError::Parse { message, location } = err else {
            panic!("expected parse error");
        };
        assert!(message.contains("`<Counter`"), "{message}");
        assert_eq!((location.line, location.column), (3, 1));
    }

    #[test]
    fn escaped_angle_bracket_is_text() {
        assert!(parse_mdast("\\<Counter\n", &ParseOptions::mdx()).is_ok());
        assert!(parse_mdast("<Counter\n", &ParseOptions::markdown()).is_ok());
    }
}
