//! Rendering functions for the mdast renderer.

use markdown::mdast::{self, AlignKind, Node};
use mdpress_core::slug::extract_custom_id;

use super::context::{Context, Scope, sanitize_footnote_id};
use super::mdx;

/// Walks the AST to find a `{#custom-id}` only in the last Text node.
///
/// Inline code such as `` `{#bar}` `` is literal and never an id.
fn find_custom_id_in_last_text_node(nodes: &[Node]) -> Option<&str> {
    match nodes.last()? {
        Node::Text(t) => extract_custom_id(&t.value).1,
        Node::Strong(s) => find_custom_id_in_last_text_node(&s.children),
        Node::Emphasis(e) => find_custom_id_in_last_text_node(&e.children),
        Node::Link(l) => find_custom_id_in_last_text_node(&l.children),
        Node::Delete(d) => find_custom_id_in_last_text_node(&d.children),
        _ => None,
    }
}

fn render_children(children: &[Node], ctx: &mut Context) {
    for child in children {
        render_node(child, ctx);
    }
}

fn render_wrapped(tag: &str, children: &[Node], ctx: &mut Context) {
    ctx.push_raw("<");
    ctx.push_raw(tag);
    ctx.push_raw(">");
    render_children(children, ctx);
    ctx.push_raw("</");
    ctx.push_raw(tag);
    ctx.push_raw(">");
}

/// Renders a heading. A trailing `{#custom-id}` becomes the `id` and is
/// stripped from the output; other headings get ids later from the HTML stage.
fn render_heading(heading: &mdast::Heading, ctx: &mut Context) {
    let tag = format!("h{}", heading.depth.clamp(1, 6));
    ctx.push_raw("<");
    ctx.push_raw(&tag);

    match find_custom_id_in_last_text_node(&heading.children) {
        Some(id) => {
            ctx.push_attr("id", id);
            ctx.push_raw(">");
            render_heading_children(&heading.children, ctx);
        }
        None => {
            ctx.push_raw(">");
            render_children(&heading.children, ctx);
        }
    }

    ctx.push_raw("</");
    ctx.push_raw(&tag);
    ctx.push_raw(">");
}

/// Renders heading children, stripping the trailing `{#...}` from the deepest last Text descendant.
fn render_heading_children(children: &[Node], ctx: &mut Context) {
    let Some((last, rest)) = children.split_last() else {
        return;
    };
    render_children(rest, ctx);

    match last {
        Node::Text(text) => {
            let (clean, _) = extract_custom_id(&text.value);
            ctx.push_text(clean);
        }
        Node::Strong(strong) => {
            ctx.push_raw("<strong>");
            render_heading_children(&strong.children, ctx);
            ctx.push_raw("</strong>");
        }
        Node::Emphasis(em) => {
            ctx.push_raw("<em>");
            render_heading_children(&em.children, ctx);
            ctx.push_raw("</em>");
        }
        Node::Delete(del) => {
            ctx.push_raw("<del>");
            render_heading_children(&del.children, ctx);
            ctx.push_raw("</del>");
        }
        Node::Link(link) => {
            open_link(&link.url, link.title.as_deref(), ctx);
            render_heading_children(&link.children, ctx);
            ctx.push_raw("</a>");
        }
        other => render_node(other, ctx),
    }
}

/// Renders a paragraph node, suppressing `<p>` wrappers in tight lists.
fn render_paragraph(para: &mdast::Paragraph, ctx: &mut Context) {
    let in_tight_list = ctx.is_in_tight_list();
    if !in_tight_list {
        ctx.push_raw("<p>");
    }
    ctx.enter(Scope::Paragraph);
    render_children(&para.children, ctx);
    ctx.exit();
    if !in_tight_list {
        ctx.push_raw("</p>");
    }
}

fn open_link(url: &str, title: Option<&str>, ctx: &mut Context) {
    ctx.push_raw("<a");
    ctx.push_attr("href", url);
    if let Some(title) = title {
        ctx.push_attr("title", title);
    }
    ctx.push_raw(">");
}

fn render_image(url: &str, alt: &str, title: Option<&str>, ctx: &mut Context) {
    ctx.push_raw("<img");
    ctx.push_attr("src", url);
    ctx.push_attr("alt", alt);
    if let Some(title) = title {
        ctx.push_attr("title", title);
    }
    ctx.push_raw(" />");
}

/// Renders a list node as `<ul>` or `<ol>`.
fn render_list(list: &mdast::List, ctx: &mut Context) {
    let loose = list.spread
        || list
            .children
            .iter()
            .any(|item| matches!(item, Node::ListItem(item) if item.spread));
    let is_task_list = list
        .children
        .iter()
        .any(|item| matches!(item, Node::ListItem(item) if item.checked.is_some()));

    let tag = if list.ordered { "ol" } else { "ul" };
    ctx.push_raw("<");
    ctx.push_raw(tag);
    if let Some(start) = list.start.filter(|start| list.ordered && *start != 1) {
        ctx.push_attr("start", &start.to_string());
    }
    if is_task_list {
        ctx.push_raw(" class=\"contains-task-list\"");
    }
    ctx.push_raw(">");

    ctx.enter(Scope::List { loose });
    render_children(&list.children, ctx);
    ctx.exit();

    ctx.push_raw("</");
    ctx.push_raw(tag);
    ctx.push_raw(">");
}

/// Renders a list item, with a disabled checkbox for GFM task items.
fn render_list_item(item: &mdast::ListItem, ctx: &mut Context) {
    match item.checked {
        Some(checked) => {
            ctx.push_raw("<li class=\"task-list-item\"><input type=\"checkbox\" disabled");
            if checked {
                ctx.push_raw(" checked");
            }
            ctx.push_raw(" /> ");
        }
        None => ctx.push_raw("<li>"),
    }
    render_children(&item.children, ctx);
    ctx.push_raw("</li>");
}

/// Renders a table node as `<table>` with `<thead>` and optional `<tbody>`.
fn render_table(table: &mdast::Table, ctx: &mut Context) {
    ctx.enter(Scope::Table);
    ctx.push_raw("<table><thead>");
    if let Some(Node::TableRow(row)) = table.children.first() {
        render_table_row(row, ctx, true, &table.align);
    }
    ctx.push_raw("</thead>");

    if table.children.len() > 1 {
        ctx.push_raw("<tbody>");
        for row in table.children.iter().skip(1) {
            if let Node::TableRow(row) = row {
                render_table_row(row, ctx, false, &table.align);
            }
        }
        ctx.push_raw("</tbody>");
    }

    ctx.push_raw("</table>");
    ctx.exit();
}

fn render_table_row(row: &mdast::TableRow, ctx: &mut Context, is_header: bool, aligns: &[AlignKind]) {
    let tag = if is_header { "th" } else { "td" };
    ctx.push_raw("<tr>");

    for (i, cell) in row.children.iter().enumerate() {
        let Node::TableCell(cell) = cell else {
            continue;
        };
        ctx.push_raw("<");
        ctx.push_raw(tag);
        match aligns.get(i) {
            Some(AlignKind::Left) => ctx.push_raw(" align=\"left\""),
            Some(AlignKind::Right) => ctx.push_raw(" align=\"right\""),
            Some(AlignKind::Center) => ctx.push_raw(" align=\"center\""),
            Some(AlignKind::None) | None => {}
        }
        ctx.push_raw(">");
        render_children(&cell.children, ctx);
        ctx.push_raw("</");
        ctx.push_raw(tag);
        ctx.push_raw(">");
    }

    ctx.push_raw("</tr>");
}

/// Raw HTML from the source passes through only when allowed; HTML
/// synthesized by plugins has no position and always passes through.
fn render_html(html: &mdast::Html, ctx: &mut Context) {
    if html.position.is_none() || ctx.options().allow_raw_html {
        ctx.push_raw(&html.value);
    } else {
        log::debug!("escaping raw HTML: {}", html.value);
        ctx.push_text(&html.value);
    }
}

fn render_code(code: &mdast::Code, ctx: &mut Context) {
    let lang = code.lang.as_deref().filter(|lang| !lang.is_empty());
    let block = ctx.options().highlighter.render_block(&code.value, lang);
    ctx.push_raw(&block);
}

fn render_link_reference(reference: &mdast::LinkReference, ctx: &mut Context) {
    match ctx.definition(&reference.identifier).cloned() {
        Some(target) => {
            open_link(&target.url, target.title.as_deref(), ctx);
            render_children(&reference.children, ctx);
            ctx.push_raw("</a>");
        }
        None => render_children(&reference.children, ctx),
    }
}

fn render_image_reference(reference: &mdast::ImageReference, ctx: &mut Context) {
    match ctx.definition(&reference.identifier).cloned() {
        Some(target) => render_image(&target.url, &reference.alt, target.title.as_deref(), ctx),
        None => ctx.push_text(&reference.alt),
    }
}

/// Renders a footnote reference as `<sup><a …>n</a></sup>`; repeated
/// references get suffixed ids (`fnref-x`, `fnref-x-2`).
fn render_footnote_reference(fnref: &mdast::FootnoteReference, ctx: &mut Context) {
    let safe_id = sanitize_footnote_id(&fnref.identifier);
    let (ordinal, nth) = ctx.footnote_reference(&fnref.identifier);
    let suffix = if nth == 1 { String::new() } else { format!("-{nth}") };

    ctx.push_raw(&format!(
        "<sup><a href=\"#user-content-fn-{safe_id}\" id=\"user-content-fnref-{safe_id}{suffix}\" data-footnote-ref aria-describedby=\"footnote-label\">{ordinal}</a></sup>"
    ));
}

/// Definitions are rendered out of line and emitted in the footnotes section.
fn render_footnote_definition(fndef: &mdast::FootnoteDefinition, ctx: &mut Context) {
    let body = ctx.capture(|ctx| render_children(&fndef.children, ctx));
    ctx.push_footnote_definition(&fndef.identifier, body);
}

/// Recursively renders an AST node to HTML.
pub(crate) fn render_node(node: &Node, ctx: &mut Context) {
    match node {
        Node::Root(root) => render_children(&root.children, ctx),
        Node::Text(text) => ctx.push_text(&text.value),
        Node::Paragraph(para) => render_paragraph(para, ctx),
        Node::Heading(heading) => render_heading(heading, ctx),
        Node::Strong(strong) => render_wrapped("strong", &strong.children, ctx),
        Node::Emphasis(emphasis) => render_wrapped("em", &emphasis.children, ctx),
        Node::Delete(delete) => render_wrapped("del", &delete.children, ctx),
        Node::Blockquote(quote) => render_wrapped("blockquote", &quote.children, ctx),
        Node::InlineCode(code) => {
            ctx.push_raw("<code>");
            ctx.push_text(&code.value);
            ctx.push_raw("</code>");
        }
        Node::Break(_) => ctx.push_raw("<br />"),
        Node::ThematicBreak(_) => ctx.push_raw("<hr />"),
        Node::Link(link) => {
            open_link(&link.url, link.title.as_deref(), ctx);
            render_children(&link.children, ctx);
            ctx.push_raw("</a>");
        }
        Node::Image(img) => render_image(&img.url, &img.alt, img.title.as_deref(), ctx),
        Node::LinkReference(reference) => render_link_reference(reference, ctx),
        Node::ImageReference(reference) => render_image_reference(reference, ctx),
        Node::Definition(_) => {}
        Node::List(list) => render_list(list, ctx),
        Node::ListItem(item) => render_list_item(item, ctx),
        Node::Code(code) => render_code(code, ctx),
        Node::Html(html) => render_html(html, ctx),
        Node::Table(table) => render_table(table, ctx),
        Node::TableRow(_) | Node::TableCell(_) => {}
        Node::FootnoteReference(fnref) => render_footnote_reference(fnref, ctx),
        Node::FootnoteDefinition(fndef) => render_footnote_definition(fndef, ctx),
        Node::Math(math) => {
            ctx.push_raw("<div class=\"math math-display\">");
            ctx.push_text(&math.value);
            ctx.push_raw("</div>");
        }
        Node::InlineMath(math) => {
            ctx.push_raw("<span class=\"math math-inline\">");
            ctx.push_text(&math.value);
            ctx.push_raw("</span>");
        }
        Node::MdxJsxFlowElement(elem) => mdx::render_jsx(
            elem.name.as_deref(),
            &elem.attributes,
            &elem.children,
            elem.position.as_ref(),
            ctx,
        ),
        Node::MdxJsxTextElement(elem) => mdx::render_jsx(
            elem.name.as_deref(),
            &elem.attributes,
            &elem.children,
            elem.position.as_ref(),
            ctx,
        ),
        Node::MdxFlowExpression(expr) => {
            mdx::render_expression(&expr.value, expr.position.as_ref(), ctx)
        }
        Node::MdxTextExpression(expr) => {
            mdx::render_expression(&expr.value, expr.position.as_ref(), ctx)
        }
        // Frontmatter and ESM are handled before parsing.
        Node::Yaml(_) | Node::Toml(_) | Node::MdxjsEsm(_) => {}
    }
}
