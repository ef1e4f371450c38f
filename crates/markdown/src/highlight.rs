//! Code highlighting backed by syntect.
//!
//! `prism` emits class-based token spans (`token-*`), `shiki` emits
//! inline-styled spans from a color theme, and a disabled highlighter only
//! escapes the code.

use std::sync::OnceLock;

use html_escape::{encode_double_quoted_attribute, encode_text};
use mdpress_core::SyntaxHighlight;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{
    ClassStyle, ClassedHTMLGenerator, IncludeBackground, styled_line_to_highlighted_html,
};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::PluginError;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Class prefix for prism-style token spans.
pub const TOKEN_CLASS_PREFIX: &str = "token-";

/// Looks up a syntax by fence language (token, name or extension).
pub fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    let ss = syntax_set();
    ss.find_syntax_by_token(lang)
        .or_else(|| ss.find_syntax_by_name(lang))
        .or_else(|| ss.find_syntax_by_extension(lang))
}

/// Highlights `code` into class-based spans; `None` for unknown languages.
pub fn highlight_classed(code: &str, lang: &str) -> Option<String> {
    let syntax = find_syntax(lang)?;
    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        syntax_set(),
        ClassStyle::SpacedPrefixed {
            prefix: TOKEN_CLASS_PREFIX,
        },
    );

    for line in LinesWithEndings::from(code) {
        if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
            log::warn!("failed to highlight `{lang}` code: {err}");
            return None;
        }
    }

    Some(generator.finalize())
}

fn highlight_styled(
    code: &str,
    syntax: &SyntaxReference,
    theme: &Theme,
) -> Result<String, syntect::Error> {
    let ss = syntax_set();
    let mut lines = HighlightLines::new(syntax, theme);
    let mut highlighted = String::with_capacity(code.len() * 2);

    for line in LinesWithEndings::from(code) {
        let regions = lines.highlight_line(line, ss)?;
        highlighted.push_str(&styled_line_to_highlighted_html(
            &regions,
            IncludeBackground::No,
        )?);
    }

    Ok(highlighted)
}

fn language_class(lang: Option<&str>) -> String {
    match lang {
        Some(lang) => format!(
            " class=\"language-{}\"",
            encode_double_quoted_attribute(lang)
        ),
        None => String::new(),
    }
}

/// The configured highlighting engine, resolved once per processor.
#[derive(Debug, Clone, Copy)]
pub struct Highlighter {
    engine: SyntaxHighlight,
    theme: Option<&'static Theme>,
}

impl Highlighter {
    /// Resolves the engine and, for `shiki`, its theme.
    pub fn new(engine: SyntaxHighlight, theme_name: &str) -> Result<Self, PluginError> {
        let theme = match engine {
            SyntaxHighlight::Shiki => {
                let themes = theme_set();
                let theme = themes.themes.get(theme_name).ok_or_else(|| {
                    let known: Vec<&str> = themes.themes.keys().map(String::as_str).collect();
                    PluginError::invalid_options(
                        "markdown.shikiTheme",
                        format!("unknown theme `{theme_name}` (available: {})", known.join(", ")),
                    )
                })?;
                Some(theme)
            }
            SyntaxHighlight::Prism | SyntaxHighlight::Disabled => None,
        };

        Ok(Self { engine, theme })
    }

    /// A highlighter that only escapes code.
    pub fn disabled() -> Self {
        Self {
            engine: SyntaxHighlight::Disabled,
            theme: None,
        }
    }

    /// The selected engine.
    pub fn engine(&self) -> SyntaxHighlight {
        self.engine
    }

    /// Renders a complete `<pre><code>` block.
    pub fn render_block(&self, code: &str, lang: Option<&str>) -> String {
        let class = language_class(lang);

        match (self.engine, self.theme) {
            (SyntaxHighlight::Shiki, Some(theme)) => {
                let syntax = lang
                    .and_then(find_syntax)
                    .unwrap_or_else(|| syntax_set().find_syntax_plain_text());
                let body = match highlight_styled(code, syntax, theme) {
                    Ok(body) => body,
                    Err(err) => {
                        log::warn!("failed to highlight code block: {err}");
                        encode_text(code).into_owned()
                    }
                };
                let background = theme
                    .settings
                    .background
                    .map(|c| format!(" style=\"background-color:#{:02x}{:02x}{:02x};\"", c.r, c.g, c.b))
                    .unwrap_or_default();
                format!("<pre class=\"astro-code\"{background} tabindex=\"0\"><code{class}>{body}</code></pre>")
            }
            (SyntaxHighlight::Prism, _) => {
                let body = lang
                    .and_then(|lang| highlight_classed(code, lang))
                    .unwrap_or_else(|| encode_text(code).into_owned());
                format!("<pre{class}><code{class}>{body}</code></pre>")
            }
            _ => format!("<pre><code{class}>{}</code></pre>", encode_text(code)),
        }
    }
}
