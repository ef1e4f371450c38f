use html_escape::encode_double_quoted_attribute;
use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use mdpress_core::{PipelineError, PluginSpec};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue, json};

use super::hast::{HastContent, attribute_name, properties_to_attributes, validate_properties};
use super::{ALL_HEADINGS, RehypePlugin};
use crate::FileData;
use crate::PluginError;
use crate::error::plugin_options;

pub(super) const NAME: &str = "rehype-autolink-headings";

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Where the link goes relative to the heading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// First child of the heading.
    #[default]
    Prepend,
    /// Last child of the heading.
    Append,
    /// The link wraps the heading's children.
    Wrap,
    /// Sibling before the heading.
    Before,
    /// Sibling after the heading.
    After,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct AutolinkOptions {
    behavior: Behavior,
    properties: Option<Map<String, JsonValue>>,
    content: Option<HastContent>,
    test: Option<Vec<String>>,
}

/// Adds `<a href="#id">` links to headings that have an `id`.
#[derive(Debug, Clone)]
pub struct AutolinkHeadings {
    behavior: Behavior,
    /// Opening tag, ready to insert.
    open_tag: String,
    /// Link content; empty for `wrap`.
    content: String,
    selector: String,
}

impl AutolinkHeadings {
    /// Builds the plugin from its configuration entry.
    pub fn from_spec(spec: &PluginSpec) -> Result<Self, PluginError> {
        let options: AutolinkOptions = plugin_options(spec)?;
        let behavior = options.behavior;

        let properties = options.properties.unwrap_or_else(|| match behavior {
            Behavior::Prepend | Behavior::Append => {
                let mut defaults = Map::new();
                defaults.insert("ariaHidden".to_string(), json!(true));
                defaults.insert("tabIndex".to_string(), json!(-1));
                defaults
            }
            Behavior::Wrap | Behavior::Before | Behavior::After => Map::new(),
        });
        validate_properties(&properties)
            .map_err(|message| PluginError::invalid_options(&spec.name, message))?;
        if let Some(content) = &options.content {
            content.validate().map_err(|message| {
                PluginError::invalid_options(&spec.name, format!("`content`: {message}"))
            })?;
        }
        // `href` always comes from the heading id.
        if properties.keys().any(|key| attribute_name(key) == "href") {
            return Err(PluginError::invalid_options(
                &spec.name,
                "`properties` cannot set `href`",
            ));
        }

        let attributes = properties_to_attributes(&properties);

        let content = match behavior {
            Behavior::Wrap => String::new(),
            _ => match &options.content {
                Some(content) => content.to_html(),
                None => "<span class=\"icon icon-link\"></span>".to_string(),
            },
        };

        let selector = match options.test {
            None => ALL_HEADINGS.to_string(),
            Some(tags) => {
                let tags: Vec<String> = tags.iter().map(|tag| tag.to_ascii_lowercase()).collect();
                if let Some(bad) = tags.iter().find(|tag| !HEADING_TAGS.contains(&tag.as_str())) {
                    return Err(PluginError::invalid_options(
                        &spec.name,
                        format!("`test` entry `{bad}` is not a heading tag"),
                    ));
                }
                if tags.is_empty() {
                    return Err(PluginError::invalid_options(&spec.name, "`test` is empty"));
                }
                tags.join(", ")
            }
        };

        Ok(Self {
            behavior,
            open_tag: format!("<a{attributes}"),
            content,
            selector,
        })
    }

    fn link_open(&self, id: &str) -> String {
        format!(
            "{} href=\"#{}\">",
            self.open_tag,
            encode_double_quoted_attribute(id)
        )
    }
}

impl RehypePlugin for AutolinkHeadings {
    fn name(&self) -> &str {
        NAME
    }

    fn transform(&self, html: &str, _file: &mut FileData) -> Result<String, PipelineError> {
        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![element!(self.selector, |el| {
                    let Some(id) = el.get_attribute("id").filter(|id| !id.is_empty()) else {
                        return Ok(());
                    };
                    let open = self.link_open(&id);
                    let link = || format!("{open}{}</a>", self.content);
                    match self.behavior {
                        Behavior::Prepend => el.prepend(&link(), ContentType::Html),
                        Behavior::Append => el.append(&link(), ContentType::Html),
                        Behavior::Before => el.before(&link(), ContentType::Html),
                        Behavior::After => el.after(&link(), ContentType::Html),
                        Behavior::Wrap => {
                            el.prepend(&open, ContentType::Html);
                            el.append("</a>", ContentType::Html);
                        }
                    }
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )
        .map_err(|err| PipelineError::plugin(NAME, format!("HTML rewriting failed: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceKind;

    fn run(options: JsonValue, html: &str) -> String {
        let spec = PluginSpec::with_options(NAME, options);
        let plugin = AutolinkHeadings::from_spec(&spec).unwrap();
        let mut file = FileData::new(SourceKind::Markdown, json!({}));
        plugin.transform(html, &mut file).unwrap()
    }

    #[test]
    fn prepends_by_default() {
        let plugin = AutolinkHeadings::from_spec(&PluginSpec::new(NAME)).unwrap();
        let mut file = FileData::new(SourceKind::Markdown, json!({}));
        assert_eq!(
            plugin.transform("<h2 id=\"a\">A</h2><h3>B</h3>", &mut file).unwrap(),
            "<h2 id=\"a\"><a aria-hidden=\"true\" tabindex=\"-1\" href=\"#a\"><span class=\"icon icon-link\"></span></a>A</h2><h3>B</h3>"
        );
    }

    #[test]
    fn appends_configured_content() {
        let html = run(
            json!({
                "behavior": "append",
                "content": {
                    "type": "element",
                    "tagName": "span",
                    "properties": { "className": ["headerLink"], "ariaHidden": true },
                    "children": []
                }
            }),
            "<h3 id=\"title\">Title</h3>",
        );
        assert_eq!(
            html,
            "<h3 id=\"title\">Title<a aria-hidden=\"true\" tabindex=\"-1\" href=\"#title\"><span class=\"headerLink\" aria-hidden=\"true\"></span></a></h3>"
        );
    }

    #[test]
    fn wrap_ignores_content() {
        let html = run(
            json!({ "behavior": "wrap", "content": { "type": "text", "value": "#" } }),
            "<h1 id=\"x\">X</h1>",
        );
        assert_eq!(html, "<h1 id=\"x\"><a href=\"#x\">X</a></h1>");
    }

    #[test]
    fn before_and_after_are_siblings() {
        let html = run(
            json!({ "behavior": "after", "properties": { "className": "anchor" } }),
            "<h1 id=\"x\">X</h1>",
        );
        assert_eq!(
            html,
            "<h1 id=\"x\">X</h1><a class=\"anchor\" href=\"#x\"><span class=\"icon icon-link\"></span></a>"
        );
    }

    #[test]
    fn test_option_restricts_levels() {
        let html = run(
            json!({ "test": ["h2"], "content": [] }),
            "<h1 id=\"a\">A</h1><h2 id=\"b\">B</h2>",
        );
        assert_eq!(
            html,
            "<h1 id=\"a\">A</h1><h2 id=\"b\"><a aria-hidden=\"true\" tabindex=\"-1\" href=\"#b\"></a>B</h2>"
        );
    }

    #[test]
    fn invalid_options() {
        for options in [
            json!({ "behavior": "inside" }),
            json!({ "test": ["p"] }),
            json!({ "properties": { "href": "/x" } }),
            json!({ "properties": { "x\"y": 1 } }),
            json!({ "content": { "type": "element", "tagName": "span><script" } }),
        ] {
            let spec = PluginSpec::with_options(NAME, options);
            assert!(AutolinkHeadings::from_spec(&spec).is_err());
        }
    }
}
