//! The small subset of hast (HTML AST) that plugin options can carry.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

/// A hast node given in configuration, e.g.
/// `{ type = "element", tagName = "span", properties = { className = ["x"] } }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HastNode {
    /// An element with properties and children.
    Element {
        /// Tag name.
        #[serde(rename = "tagName")]
        tag_name: String,
        /// Properties in hast (DOM) naming.
        #[serde(default)]
        properties: Map<String, JsonValue>,
        /// Child nodes.
        #[serde(default)]
        children: Vec<HastNode>,
    },
    /// A text node.
    Text {
        /// Text content.
        value: String,
    },
}

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// True for names matching `[A-Za-z][A-Za-z0-9-]*`, the only tag and
/// property names emitted.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Checks every property name.
pub fn validate_properties(properties: &Map<String, JsonValue>) -> Result<(), String> {
    match properties.keys().find(|key| !is_valid_name(key)) {
        Some(key) => Err(format!("invalid property name `{key}`")),
        None => Ok(()),
    }
}

/// One node or a list of nodes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HastContent {
    /// A single node.
    One(HastNode),
    /// Several nodes, rendered in order.
    Many(Vec<HastNode>),
}

impl HastContent {
    fn nodes(&self) -> &[HastNode] {
        match self {
            HastContent::One(node) => std::slice::from_ref(node),
            HastContent::Many(nodes) => nodes,
        }
    }

    /// Rejects tag and property names that cannot be emitted as written,
    /// and void elements with children.
    pub fn validate(&self) -> Result<(), String> {
        self.nodes().iter().try_for_each(HastNode::validate)
    }

    /// Renders the content to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        match self {
            HastContent::One(node) => node.write_html(&mut out),
            HastContent::Many(nodes) => {
                for node in nodes {
                    node.write_html(&mut out);
                }
            }
        }
        out
    }
}

impl HastNode {
    fn validate(&self) -> Result<(), String> {
        let HastNode::Element {
            tag_name,
            properties,
            children,
        } = self
        else {
            return Ok(());
        };
        if !is_valid_name(tag_name) {
            return Err(format!("invalid tag name `{tag_name}`"));
        }
        if is_void(tag_name) && !children.is_empty() {
            return Err(format!("`{tag_name}` cannot have children"));
        }
        validate_properties(properties)?;
        children.iter().try_for_each(HastNode::validate)
    }

    fn write_html(&self, out: &mut String) {
        match self {
            HastNode::Text { value } => out.push_str(&encode_text(value)),
            HastNode::Element {
                tag_name,
                properties,
                children,
            } => {
                out.push('<');
                out.push_str(tag_name);
                out.push_str(&properties_to_attributes(properties));
                if is_void(tag_name) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag_name);
                out.push('>');
            }
        }
    }
}

fn is_void(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name.to_ascii_lowercase().as_str())
}

/// Maps a hast property name to its HTML attribute name.
///
/// ```
/// use mdpress_markdown::rehype::attribute_name;
///
/// assert_eq!(attribute_name("className"), "class");
/// assert_eq!(attribute_name("ariaHidden"), "aria-hidden");
/// assert_eq!(attribute_name("dataFooBar"), "data-foo-bar");
/// assert_eq!(attribute_name("tabIndex"), "tabindex");
/// ```
pub fn attribute_name(property: &str) -> String {
    match property {
        "className" => return "class".to_string(),
        "htmlFor" => return "for".to_string(),
        _ => {}
    }

    let dashed = ["aria", "data"].iter().find_map(|prefix| {
        let rest = property.strip_prefix(prefix)?;
        rest.starts_with(|c: char| c.is_ascii_uppercase())
            .then_some((prefix, rest))
    });
    match dashed {
        Some((prefix, rest)) => {
            let mut name = prefix.to_string();
            for c in rest.chars() {
                if c.is_ascii_uppercase() {
                    name.push('-');
                    name.push(c.to_ascii_lowercase());
                } else {
                    name.push(c);
                }
            }
            name
        }
        None => property.to_ascii_lowercase(),
    }
}

/// Converts hast properties to ` name="value"` attribute text, preserving
/// order. `false` and `null` drop the attribute; `true` is a bare attribute
/// except on `aria-*`, where it is spelled out.
pub fn properties_to_attributes(properties: &Map<String, JsonValue>) -> String {
    let mut out = String::new();
    for (key, value) in properties {
        let name = attribute_name(key);
        let text = match value {
            JsonValue::Null => continue,
            JsonValue::Bool(flag) if !name.starts_with("aria-") => {
                if *flag {
                    out.push(' ');
                    out.push_str(&name);
                }
                continue;
            }
            JsonValue::Bool(flag) => flag.to_string(),
            JsonValue::String(s) => s.clone(),
            JsonValue::Number(n) => n.to_string(),
            JsonValue::Array(items) => {
                let separator = if name == "class" { " " } else { "," };
                items
                    .iter()
                    .map(|item| match item {
                        JsonValue::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(separator)
            }
            JsonValue::Object(_) => value.to_string(),
        };
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(&text));
        out.push('"');
    }
    out
}
