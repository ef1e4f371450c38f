use std::path::Path;

use mdpress_core::{Diagnostics, HoistedStatements, ImportBinding};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Source syntax of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// CommonMark (`.md`, `.markdown`).
    Markdown,
    /// MDX (`.mdx`): JSX, expressions and ESM.
    Mdx,
}

impl SourceKind {
    /// Picks the kind from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "md" | "markdown" => Some(SourceKind::Markdown),
            "mdx" => Some(SourceKind::Mdx),
            _ => None,
        }
    }
}

/// Heading metadata collected from the final HTML.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    /// Heading depth (1-6).
    pub depth: u8,
    /// Slugified identifier.
    pub slug: String,
    /// Visible heading text.
    pub text: String,
}

/// Per-document state shared by every plugin in the chain.
#[derive(Debug, Clone)]
pub struct FileData {
    /// Source syntax.
    pub kind: SourceKind,
    /// Parsed frontmatter (always an object).
    pub frontmatter: JsonValue,
    /// Warnings raised so far.
    pub diagnostics: Diagnostics,
}

impl FileData {
    /// Fresh state for a document.
    pub fn new(kind: SourceKind, frontmatter: JsonValue) -> Self {
        Self {
            kind,
            frontmatter,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Resolves a dotted path (`a.b.0`) inside the frontmatter.
    pub fn frontmatter_path(&self, path: &str) -> Option<&JsonValue> {
        path.split('.').try_fold(&self.frontmatter, |value, key| match value {
            JsonValue::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => value.get(key),
        })
    }
}

/// Output of the markdown stages for one source.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Rendered HTML body.
    pub html: String,
    /// Frontmatter as a JSON object.
    pub frontmatter: JsonValue,
    /// Headings in document order.
    pub headings: Vec<HeadingEntry>,
    /// Bindings introduced by hoisted MDX imports.
    #[serde(skip)]
    pub imports: Vec<ImportBinding>,
    /// Raw hoisted import/export statements.
    #[serde(skip)]
    pub esm: HoistedStatements,
    /// Non-fatal warnings.
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

impl Document {
    /// Frontmatter `title`, else the text of the first `h1`.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter
            .get("title")
            .and_then(JsonValue::as_str)
            .or_else(|| {
                self.headings
                    .iter()
                    .find(|heading| heading.depth == 1)
                    .map(|heading| heading.text.as_str())
            })
    }

    /// Frontmatter `description`, if any.
    pub fn description(&self) -> Option<&str> {
        self.frontmatter.get("description").and_then(JsonValue::as_str)
    }

    /// True when frontmatter sets `draft: true`.
    pub fn is_draft(&self) -> bool {
        self.frontmatter
            .get("draft")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }

    /// Looks up the import that introduced `local`.
    pub fn import_for(&self, local: &str) -> Option<&ImportBinding> {
        self.imports.iter().find(|binding| binding.local == local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_from_extension() {
        assert_eq!(SourceKind::from_path(Path::new("a/b.md")), Some(SourceKind::Markdown));
        assert_eq!(SourceKind::from_path(Path::new("b.mdx")), Some(SourceKind::Mdx));
        assert_eq!(SourceKind::from_path(Path::new("c.svelte")), None);
    }

    #[test]
    fn frontmatter_paths() {
        let file = FileData::new(
            SourceKind::Mdx,
            json!({ "title": "Hi", "author": { "names": ["Ann", "Bo"] } }),
        );
        assert_eq!(file.frontmatter_path("title"), Some(&json!("Hi")));
        assert_eq!(file.frontmatter_path("author.names.1"), Some(&json!("Bo")));
        assert_eq!(file.frontmatter_path("author.missing"), None);
    }

    #[test]
    fn title_falls_back_to_first_h1() {
        let mut doc = Document {
            html: String::new(),
            frontmatter: json!({}),
            headings: vec![
                HeadingEntry { depth: 2, slug: "a".into(), text: "A".into() },
                HeadingEntry { depth: 1, slug: "b".into(), text: "B".into() },
            ],
            imports: Vec::new(),
            esm: HoistedStatements::default(),
            diagnostics: Diagnostics::new(),
        };
        assert_eq!(doc.title(), Some("B"));
        doc.frontmatter = json!({ "title": "Front", "draft": true });
        assert_eq!(doc.title(), Some("Front"));
        assert!(doc.is_draft());
    }
}
