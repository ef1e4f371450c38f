use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::page::Page;

const GENERATOR: &str = concat!("mdpress ", env!("CARGO_PKG_VERSION"));

/// Wraps a page body in the HTML document shell.
pub fn document_shell(page: &Page) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="generator" content=(GENERATOR);
                title { (page.title) }
                @if let Some(description) = &page.description {
                    meta name="description" content=(description);
                }
                @if let Some(canonical) = &page.canonical {
                    link rel="canonical" href=(canonical);
                }
                @for markup in &page.head {
                    (PreEscaped(markup))
                }
            }
            body {
                main {
                    (PreEscaped(&page.body))
                }
            }
        }
    }
}

/// Renders the finished page to a string.
pub fn render_page(page: &Page) -> String {
    document_shell(page).into_string()
}
