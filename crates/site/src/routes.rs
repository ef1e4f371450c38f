//! File-based routes.

use std::path::{Component, Path, PathBuf};

use mdpress_core::BuildFormat;

/// Route of a page source, from its path relative to the pages directory.
///
/// ```
/// use std::path::Path;
/// use mdpress_core::BuildFormat;
/// use mdpress_site::routes::route_for;
///
/// assert_eq!(route_for(Path::new("index.md"), BuildFormat::Directory), "/");
/// assert_eq!(route_for(Path::new("posts/hello.mdx"), BuildFormat::Directory), "/posts/hello/");
/// assert_eq!(route_for(Path::new("posts/hello.mdx"), BuildFormat::File), "/posts/hello.html");
/// ```
pub fn route_for(relative: &Path, format: BuildFormat) -> String {
    let mut segments: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.last().is_some_and(|last| last == "index") {
        segments.pop();
    }
    if segments.is_empty() {
        return "/".to_string();
    }

    let joined = segments.join("/");
    match format {
        BuildFormat::Directory => format!("/{joined}/"),
        BuildFormat::File => format!("/{joined}.html"),
    }
}

/// Output file of a route, relative to the output directory.
pub fn output_path(route: &str) -> PathBuf {
    let trimmed = route.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        Path::new(trimmed).join("index.html")
    } else {
        PathBuf::from(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_routes() {
        let route = |p: &str| route_for(Path::new(p), BuildFormat::Directory);
        assert_eq!(route("index.md"), "/");
        assert_eq!(route("about.md"), "/about/");
        assert_eq!(route("docs/index.mdx"), "/docs/");
        assert_eq!(route("docs/guide/setup.md"), "/docs/guide/setup/");
    }

    #[test]
    fn file_routes() {
        let route = |p: &str| route_for(Path::new(p), BuildFormat::File);
        assert_eq!(route("index.md"), "/");
        assert_eq!(route("docs/index.md"), "/docs.html");
        assert_eq!(route("docs/setup.markdown"), "/docs/setup.html");
    }

    #[test]
    fn output_paths() {
        assert_eq!(output_path("/"), PathBuf::from("index.html"));
        assert_eq!(output_path("/a/b/"), PathBuf::from("a/b/index.html"));
        assert_eq!(output_path("/a/b.html"), PathBuf::from("a/b.html"));
    }
}
