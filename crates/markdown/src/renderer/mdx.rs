//! MDX JSX elements and expressions.
//!
//! Lowercase JSX names are plain HTML elements. Capitalized or member names
//! (`Counter`, `ui.Card`) are components: they become
//! `<mdx-component data-name data-props data-hydrate>` placeholders that the
//! site builder later resolves against the page's imports.

use markdown::mdast::{AttributeContent, AttributeValue, Node};
use markdown::unist::Position;
use serde_json::{Map, Value as JsonValue};

use super::context::Context;
use super::render::render_node;

/// Tag of the placeholder element emitted for components.
pub const COMPONENT_TAG: &str = "mdx-component";

/// Prefix of hydration directives (`client:load`, `client:visible`, ...).
const CLIENT_DIRECTIVE: &str = "client:";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serializes `value` as JSON safe to embed in a single-quoted attribute.
///
/// Characters that would need entity escaping only occur inside JSON string
/// literals, so they are written as `\uXXXX` escapes instead.
///
/// ```
/// use mdpress_markdown::json_attribute;
/// use serde_json::json;
///
/// assert_eq!(
///     json_attribute(&json!({ "q": "it's <b>" })),
///     r#"{"q":"it\u0027s \u003cb\u003e"}"#
/// );
/// ```
pub fn json_attribute(value: &JsonValue) -> String {
    let json = value.to_string();
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '\'' => out.push_str("\\u0027"),
            '&' => out.push_str("\\u0026"),
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            c => out.push(c),
        }
    }
    out
}

fn is_component_name(name: &str) -> bool {
    name.contains('.') || name.starts_with(|c: char| c.is_ascii_uppercase())
}

/// True for `{/* ... */}` bodies, which MDX treats as comments.
fn is_comment(expression: &str) -> bool {
    let trimmed = expression.trim();
    trimmed.is_empty() || (trimmed.starts_with("/*") && trimmed.ends_with("*/"))
}

/// Evaluates the expressions mdpress understands: JSON literals and
/// `frontmatter.path` lookups.
fn evaluate(expression: &str, ctx: &Context) -> Option<JsonValue> {
    let trimmed = expression.trim();
    if let Ok(value) = serde_json::from_str::<JsonValue>(trimmed) {
        return Some(value);
    }
    let path = trimmed.strip_prefix("frontmatter.")?;
    ctx.file.frontmatter_path(path).cloned()
}

fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Renders `{expression}` in flow or text position.
pub(crate) fn render_expression(expression: &str, position: Option<&Position>, ctx: &mut Context) {
    if is_comment(expression) {
        return;
    }
    match evaluate(expression, ctx) {
        Some(value) => {
            let text = display_value(&value);
            ctx.push_text(&text);
        }
        None => ctx.warn_at(
            position,
            format!("dropping unsupported MDX expression `{{{}}}`", expression.trim()),
        ),
    }
}

/// Renders a JSX element as HTML, a component placeholder, or (for
/// fragments) just its children.
pub(crate) fn render_jsx(
    name: Option<&str>,
    attributes: &[AttributeContent],
    children: &[Node],
    position: Option<&Position>,
    ctx: &mut Context,
) {
    let Some(name) = name else {
        for child in children {
            render_node(child, ctx);
        }
        return;
    };

    if is_component_name(name) {
        render_component(name, attributes, children, position, ctx);
    } else {
        render_element(name, attributes, children, position, ctx);
    }
}

fn render_component(
    name: &str,
    attributes: &[AttributeContent],
    children: &[Node],
    position: Option<&Position>,
    ctx: &mut Context,
) {
    let mut props = Map::new();
    let mut hydrate = None;

    for attribute in attributes {
        match attribute {
            AttributeContent::Property(prop) => {
                if let Some(directive) = prop.name.strip_prefix(CLIENT_DIRECTIVE) {
                    hydrate = Some(directive.to_string());
                    continue;
                }
                let value = match &prop.value {
                    None => JsonValue::Bool(true),
                    Some(AttributeValue::Literal(literal)) => JsonValue::String(literal.clone()),
                    Some(AttributeValue::Expression(expr)) => match evaluate(&expr.value, ctx) {
                        Some(value) => value,
                        None => {
                            ctx.warn_at(
                                position,
                                format!(
                                    "prop `{}` of <{name}> is not a literal; passing `{}` as a string",
                                    prop.name, expr.value
                                ),
                            );
                            JsonValue::String(expr.value.clone())
                        }
                    },
                };
                props.insert(prop.name.clone(), value);
            }
            AttributeContent::Expression(spread) => ctx.warn_at(
                position,
                format!("ignoring spread attribute `{{{}}}` on <{name}>", spread.value),
            ),
        }
    }

    ctx.push_raw("<");
    ctx.push_raw(COMPONENT_TAG);
    ctx.push_attr("data-name", name);
    ctx.push_raw(" data-props='");
    ctx.push_raw(&json_attribute(&JsonValue::Object(props)));
    ctx.push_raw("'");
    if let Some(hydrate) = hydrate {
        ctx.push_attr("data-hydrate", &hydrate);
    }
    ctx.push_raw(">");
    for child in children {
        render_node(child, ctx);
    }
    ctx.push_raw("</");
    ctx.push_raw(COMPONENT_TAG);
    ctx.push_raw(">");
}

fn render_element(
    name: &str,
    attributes: &[AttributeContent],
    children: &[Node],
    position: Option<&Position>,
    ctx: &mut Context,
) {
    ctx.push_raw("<");
    ctx.push_raw(name);
    for attribute in attributes {
        match attribute {
            AttributeContent::Property(prop) => {
                // JSX spells a few attributes differently from HTML.
                let attr_name = match prop.name.as_str() {
                    "className" => "class",
                    "htmlFor" => "for",
                    other => other,
                };
                match &prop.value {
                    None => {
                        ctx.push_raw(" ");
                        ctx.push_raw(attr_name);
                    }
                    Some(AttributeValue::Literal(literal)) => ctx.push_attr(attr_name, literal),
                    Some(AttributeValue::Expression(expr)) => match evaluate(&expr.value, ctx) {
                        Some(JsonValue::Bool(false) | JsonValue::Null) => {}
                        Some(JsonValue::Bool(true)) => {
                            ctx.push_raw(" ");
                            ctx.push_raw(attr_name);
                        }
                        Some(value) => {
                            let text = display_value(&value);
                            ctx.push_attr(attr_name, &text);
                        }
                        None => ctx.warn_at(
                            position,
                            format!(
                                "dropping attribute `{}` of <{name}>: unsupported expression",
                                prop.name
                            ),
                        ),
                    },
                }
            }
            AttributeContent::Expression(spread) => ctx.warn_at(
                position,
                format!("ignoring spread attribute `{{{}}}` on <{name}>", spread.value),
            ),
        }
    }

    if children.is_empty() && VOID_ELEMENTS.contains(&name) {
        ctx.push_raw(" />");
        return;
    }

    ctx.push_raw(">");
    for child in children {
        render_node(child, ctx);
    }
    ctx.push_raw("</");
    ctx.push_raw(name);
    ctx.push_raw(">");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_names() {
        assert!(is_component_name("Counter"));
        assert!(is_component_name("ui.Card"));
        assert!(!is_component_name("div"));
        assert!(!is_component_name("my-element"));
    }

    #[test]
    fn comments_are_recognized() {
        assert!(is_comment("/* note */"));
        assert!(is_comment("  "));
        assert!(!is_comment("frontmatter.title"));
    }

    #[test]
    fn json_attribute_has_no_markup_characters() {
        let value = serde_json::json!({ "html": "<a href='x'>&</a>" });
        let encoded = json_attribute(&value);
        assert!(!encoded.contains(['<', '>', '\'', '&']));
        let decoded: JsonValue = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, value);
    }
}
