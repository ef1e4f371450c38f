//! Finds and reads page sources.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use mdpress_core::BuildFormat;
use mdpress_markdown::SourceKind;
use walkdir::{DirEntry, WalkDir};

use crate::BuildError;
use crate::routes::{output_path, route_for};

/// A page source read from disk.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path on disk.
    pub path: PathBuf,
    /// Path relative to the pages directory.
    pub relative: PathBuf,
    /// Route the page is served at.
    pub route: String,
    /// Markdown or MDX.
    pub kind: SourceKind,
    /// File contents.
    pub contents: String,
}

impl SourceFile {
    /// Reads a single source. Files outside `src_dir` are routed by file name.
    pub fn read(path: &Path, src_dir: &Path, format: BuildFormat) -> Result<Self, BuildError> {
        let kind = SourceKind::from_path(path).ok_or_else(|| BuildError::Unknown {
            kind: "source extension",
            name: path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })?;
        read_source(path, kind, src_dir, format)
    }
}

fn read_source(
    path: &Path,
    kind: SourceKind,
    src_dir: &Path,
    format: BuildFormat,
) -> Result<SourceFile, BuildError> {
    let relative = match path.strip_prefix(src_dir) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => PathBuf::from(path.file_name().unwrap_or(path.as_os_str())),
    };
    let contents = fs::read_to_string(path).map_err(|err| BuildError::io("read", path, err))?;
    Ok(SourceFile {
        route: route_for(&relative, format),
        path: path.to_path_buf(),
        relative,
        kind,
        contents,
    })
}

/// Names starting with `_` are partials and never become pages.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('_') || name.starts_with('.'))
}

/// Reads every source under `src_dir` whose extension is in `extensions`,
/// sorted by path. A missing directory yields no sources.
///
/// Two sources that would write the same output file (`about.md` and
/// `about/index.md`) are an error.
pub fn load_sources(
    src_dir: &Path,
    extensions: &[String],
    format: BuildFormat,
) -> Result<Vec<SourceFile>, BuildError> {
    if !src_dir.is_dir() {
        debug!("Pages directory {} does not exist", src_dir.display());
        return Ok(Vec::new());
    }

    let mut sources = Vec::new();
    let walker = WalkDir::new(src_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| src_dir.to_path_buf());
            BuildError::io("walk", path, err.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let claimed = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|claimed| claimed == ext));
        if !claimed {
            trace!("Skipping {}", path.display());
            continue;
        }
        // Claimed extensions are always a known kind.
        let Some(kind) = SourceKind::from_path(path) else {
            continue;
        };

        sources.push(read_source(path, kind, src_dir, format)?);
    }

    sources.sort_by(|a, b| a.path.cmp(&b.path));
    check_outputs(&sources)?;
    trace!("Found {} page sources", sources.len());
    Ok(sources)
}

fn check_outputs(sources: &[SourceFile]) -> Result<(), BuildError> {
    let mut claimed: BTreeMap<PathBuf, &SourceFile> = BTreeMap::new();
    for source in sources {
        if let Some(first) = claimed.insert(output_path(&source.route), source) {
            return Err(BuildError::RouteConflict {
                route: source.route.clone(),
                first: first.path.clone(),
                second: source.path.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn loads_claimed_sources_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md", "# Home");
        write(dir.path(), "posts/b.mdx", "# B");
        write(dir.path(), "posts/a.md", "# A");
        write(dir.path(), "posts/_draft-partial.md", "skip");
        write(dir.path(), "_partials/x.md", "skip");
        write(dir.path(), "styles.css", "body {}");

        let extensions = vec!["md".to_string(), "mdx".to_string()];
        let sources = load_sources(dir.path(), &extensions, BuildFormat::Directory).unwrap();
        let routes: Vec<&str> = sources.iter().map(|s| s.route.as_str()).collect();
        assert_eq!(routes, vec!["/", "/posts/a/", "/posts/b/"]);
        assert_eq!(sources[2].kind, SourceKind::Mdx);
        assert_eq!(sources[1].contents, "# A");
    }

    #[test]
    fn mdx_is_skipped_unless_claimed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.mdx", "# A");
        write(dir.path(), "b.markdown", "# B");

        let extensions = vec!["md".to_string(), "markdown".to_string()];
        let sources = load_sources(dir.path(), &extensions, BuildFormat::File).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].route, "/b.html");
    }

    #[test]
    fn single_files_outside_the_pages_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes/today.md", "# Today");
        let source = SourceFile::read(
            &dir.path().join("notes/today.md"),
            &dir.path().join("src/pages"),
            BuildFormat::Directory,
        )
        .unwrap();
        assert_eq!(source.route, "/today/");
        assert_eq!(source.contents, "# Today");

        let err = SourceFile::read(Path::new("x.txt"), dir.path(), BuildFormat::Directory).unwrap_err();
        assert_eq!(err.to_string(), "unknown source extension `txt`");
    }

    #[test]
    fn sources_sharing_an_output_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "about.md", "# One");
        write(dir.path(), "about/index.md", "# Two");
        let extensions = vec!["md".to_string()];

        let err = load_sources(dir.path(), &extensions, BuildFormat::Directory).unwrap_err();
        let BuildError::RouteConflict { route, first, second } = err else {
            panic!("expected a route conflict, got {err}");
        };
        assert_eq!(route, "/about/");
        let mut paths = vec![first, second];
        paths.sort();
        assert_eq!(
            paths,
            vec![dir.path().join("about/index.md"), dir.path().join("about.md")]
        );

        let err = load_sources(dir.path(), &extensions, BuildFormat::File).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("both build route `/about.html`"), "{message}");
        assert!(message.contains("about.md"), "{message}");
        assert!(message.contains("index.md"), "{message}");
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sources = load_sources(&dir.path().join("nope"), &[], BuildFormat::Directory).unwrap();
        assert!(sources.is_empty());
    }
}
