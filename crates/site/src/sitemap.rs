use std::path::{Path, PathBuf};

use crate::BuildError;

/// File name of the generated sitemap.
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// A single `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SitemapEntry {
    /// Absolute page URL.
    pub loc: String,
}

impl SitemapEntry {
    fn to_xml(&self) -> String {
        format!("<url><loc>{}</loc></url>", escape_xml(&self.loc))
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Renders a sitemap, sorted by URL with duplicates removed.
pub fn render_sitemap(entries: impl IntoIterator<Item = SitemapEntry>) -> String {
    let mut entries: Vec<SitemapEntry> = entries.into_iter().collect();
    entries.sort();
    entries.dedup();

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in &entries {
        xml.push_str(&entry.to_xml());
        xml.push('\n');
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Writes `sitemap.xml` into `out_dir` and returns its path.
pub fn write_sitemap(
    entries: impl IntoIterator<Item = SitemapEntry>,
    out_dir: &Path,
) -> Result<PathBuf, BuildError> {
    let xml = render_sitemap(entries);
    let path = out_dir.join(SITEMAP_FILE);
    std::fs::write(&path, xml).map_err(|err| BuildError::io("write", &path, err))?;
    log::info!(target: "sitemap", "generated sitemap at {}", path.display());
    Ok(path)
}
