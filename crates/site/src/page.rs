use std::path::PathBuf;

use mdpress_markdown::Document;

/// A rendered page on its way to disk.
#[derive(Debug, Clone)]
pub struct Page {
    /// Route the page is served at.
    pub route: String,
    /// Source file.
    pub source: PathBuf,
    /// Output file, relative to the output directory.
    pub output: PathBuf,
    /// `<title>` text.
    pub title: String,
    /// Meta description.
    pub description: Option<String>,
    /// Absolute canonical URL, when `site` is set.
    pub canonical: Option<String>,
    /// Extra `<head>` markup, in insertion order.
    pub head: Vec<String>,
    /// Body HTML with component islands rendered.
    pub body: String,
    /// Markdown stage output.
    pub document: Document,
}

impl Page {
    /// Adds head markup unless an identical element is already present.
    pub fn add_head(&mut self, markup: impl Into<String>) {
        let markup = markup.into();
        if !self.head.contains(&markup) {
            self.head.push(markup);
        }
    }
}
