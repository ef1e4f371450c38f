use std::fs;
use std::path::Path;

use mdpress_core::{PipelineError, SiteConfig};
use mdpress_site::{BuildError, SiteBuilder};

const CONFIG: &str = r#"
site = "https://bootstrapped.me"
integrations = ["mdx", "svelte"]

[vite]
plugins = ["svelte"]

[markdown]
syntaxHighlight = false
rehypePlugins = ["rehype-slug"]
"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

fn blog(root: &Path) {
    write(
        root,
        "src/pages/index.md",
        "---\ntitle: Home\ndescription: Notes & experiments\n---\n# Welcome\n\nHello.\n",
    );
    write(
        root,
        "src/pages/posts/counter.mdx",
        "---\ntitle: Counter\n---\nimport Counter from '../../components/Counter.svelte';\n\n# Counter demo\n\n<Counter start={2} client:load>\n  Clicks\n</Counter>\n",
    );
    write(root, "src/pages/posts/wip.md", "---\ndraft: true\n---\n# Not yet\n");
    write(root, "src/pages/_partial.md", "# Never a page\n");
    write(root, "src/components/Counter.svelte", "<script>export let start = 0;</script>\n");
    write(root, "public/robots.txt", "User-agent: *\n");
}

#[test]
fn builds_a_small_site() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    blog(root);

    let config = SiteConfig::from_toml_str(CONFIG).unwrap();
    let builder = SiteBuilder::new(root, config).unwrap();
    assert_eq!(builder.extensions(), ["md", "markdown", "mdx"]);
    let report = builder.build().unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.skipped_drafts, 1);
    let routes: Vec<&str> = report.pages.iter().map(|page| page.route.as_str()).collect();
    assert_eq!(routes, ["/", "/posts/counter/"]);
    assert_eq!(report.public_files, 1);

    let index = read(root, "dist/index.html");
    assert!(index.contains("<title>Home</title>"), "{index}");
    assert!(index.contains("<meta name=\"description\" content=\"Notes &amp; experiments\">"));
    assert!(index.contains("<link rel=\"canonical\" href=\"https://bootstrapped.me/\">"));
    assert!(index.contains("<h1 id=\"welcome\">Welcome</h1>"));
    assert!(!index.contains("svelte-island"));

    let counter = read(root, "dist/posts/counter/index.html");
    assert!(counter.contains(
        "<svelte-island component=\"Counter\" component-url=\"/_components/src/components/Counter.svelte\" props=\"{&quot;start&quot;:2}\" client=\"load\"><p>Clicks</p></svelte-island>"
    ), "{counter}");
    assert_eq!(counter.matches("customElements.define(\"svelte-island\"").count(), 1);
    assert!(!counter.contains("mdx-component"));

    assert_eq!(
        read(root, "dist/_components/src/components/Counter.svelte"),
        "<script>export let start = 0;</script>\n"
    );
    assert_eq!(read(root, "dist/robots.txt"), "User-agent: *\n");
    assert!(!root.join("dist/posts/wip/index.html").exists());
    assert!(!root.join("dist/_partial/index.html").exists());

    assert_eq!(report.sitemap.as_deref(), Some(root.join("dist/sitemap.xml").as_path()));
    let sitemap = read(root, "dist/sitemap.xml");
    assert!(sitemap.contains(
        "<url><loc>https://bootstrapped.me/</loc></url>\n<url><loc>https://bootstrapped.me/posts/counter/</loc></url>"
    ));
}

#[test]
fn file_format_and_no_site_skip_the_sitemap() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    blog(root);

    let mut config = SiteConfig::from_toml_str(CONFIG).unwrap();
    config.site = None;
    config.build.format = mdpress_core::BuildFormat::File;
    let report = SiteBuilder::new(root, config).unwrap().build().unwrap();

    assert!(root.join("dist/posts/counter.html").exists());
    assert!(report.sitemap.is_none());
    assert!(!root.join("dist/sitemap.xml").exists());
}

#[test]
fn every_failing_page_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "src/pages/a.mdx", "# A\n\n<Chart />\n");
    write(root, "src/pages/b.mdx", "import Map from './Map.vue';\n\n<Map />\n");
    write(root, "src/pages/c.md", "# Fine\n");

    let config = SiteConfig::from_toml_str(CONFIG).unwrap();
    let err = SiteBuilder::new(root, config).unwrap().build().unwrap_err();
    let BuildError::Pages(failures) = err else {
        panic!("expected page failures, got {err}");
    };
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().all(|failure| matches!(
        failure.error,
        PipelineError::UnknownComponent { .. }
    )));
    assert!(failures[0].path.ends_with("a.mdx"));
    assert!(failures[1].to_string().contains("Map.vue"));
}
