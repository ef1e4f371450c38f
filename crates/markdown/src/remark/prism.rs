use html_escape::{encode_double_quoted_attribute, encode_text};
use markdown::mdast::Node;
use mdpress_core::{PipelineError, PluginSpec};
use serde::Deserialize;

use super::{RemarkPlugin, synthesized_html, walk_mut};
use crate::error::plugin_options;
use crate::highlight::highlight_classed;
use crate::{FileData, PluginError};

pub(super) const NAME: &str = "remark-prism";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct PrismOptions {
    /// Extra classes on the wrapping `<div>`.
    class_name: Option<String>,
}

/// Replaces fenced code that names a language with token-highlighted HTML:
/// `<div class="remark-highlight"><pre class="language-X"><code class="language-X">…`.
#[derive(Debug, Clone)]
pub struct Prism {
    wrapper_class: String,
}

impl Prism {
    /// Builds the plugin from its configuration entry.
    pub fn from_spec(spec: &PluginSpec) -> Result<Self, PluginError> {
        let options: PrismOptions = plugin_options(spec)?;
        let wrapper_class = match options.class_name {
            Some(extra) if !extra.trim().is_empty() => format!("remark-highlight {}", extra.trim()),
            _ => "remark-highlight".to_string(),
        };
        Ok(Self { wrapper_class })
    }

    fn render(&self, code: &str, lang: &str) -> String {
        let lang_attr = encode_double_quoted_attribute(lang);
        let body = highlight_classed(code, lang).unwrap_or_else(|| {
            log::debug!("remark-prism: no grammar for `{lang}`, emitting plain text");
            encode_text(code).into_owned()
        });
        format!(
            "<div class=\"{}\"><pre class=\"language-{lang_attr}\"><code class=\"language-{lang_attr}\">{body}</code></pre></div>",
            encode_double_quoted_attribute(&self.wrapper_class)
        )
    }
}

impl RemarkPlugin for Prism {
    fn name(&self) -> &str {
        NAME
    }

    fn transform(&self, tree: &mut Node, _file: &mut FileData) -> Result<(), PipelineError> {
        walk_mut(tree, &mut |node| {
            let Node::Code(code) = node else {
                return;
            };
            let Some(lang) = code.lang.as_deref().filter(|lang| !lang.is_empty()) else {
                return;
            };
            let html = self.render(&code.value, lang);
            *node = synthesized_html(html);
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceKind;
    use mdpress_core::{ParseOptions, parse_mdast};
    use serde_json::json;

    fn transform(input: &str) -> Vec<Node> {
        let plugin = Prism::from_spec(&PluginSpec::new(NAME)).unwrap();
        let mut tree = parse_mdast(input, &ParseOptions::markdown()).unwrap();
        let mut file = FileData::new(SourceKind::Markdown, json!({}));
        plugin.transform(&mut tree, &mut file).unwrap();
        tree.children().cloned().unwrap_or_default()
    }

    #[test]
    fn highlights_known_language() {
        let nodes = transform("```rust\nlet x = 1;\n```");
        let Node::Html(html) = &nodes[0] else {
            panic!("expected html node, got {:?}", nodes[0]);
        };
        assert!(html.position.is_none());
        assert!(html.value.starts_with(
            "<div class=\"remark-highlight\"><pre class=\"language-rust\"><code class=\"language-rust\">"
        ));
        assert!(html.value.contains("token-"));
        assert!(html.value.ends_with("</code></pre></div>"));
    }

    #[test]
    fn unknown_language_is_escaped() {
        let nodes = transform("```zzz\n<b>\n```");
        let Node::Html(html) = &nodes[0] else {
            panic!("expected html node");
        };
        assert!(html.value.contains("<code class=\"language-zzz\">&lt;b&gt;</code>"));
    }

    #[test]
    fn code_without_language_is_left_alone() {
        let nodes = transform("```\nplain\n```");
        assert!(matches!(nodes[0], Node::Code(_)));
    }
}
