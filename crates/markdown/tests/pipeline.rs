use mdpress_core::SiteConfig;
use mdpress_markdown::{MarkdownProcessor, SourceKind};
use once_cell::sync::Lazy;

const REFERENCE_CONFIG: &str = r#"
site = "https://bootstrapped.me"
integrations = ["mdx", "svelte", "tailwind"]

[vite]
plugins = ["svelte"]

[markdown]
syntaxHighlight = "prism"
remarkPlugins = [
  "remark-gfm",
  "remark-smartypants",
  "remark-prism",
  "@fec/remark-a11y-emoji",
  ["remark-behead", { depth = 1 }],
]
rehypePlugins = [
  "rehype-slug",
  ["rehype-autolink-headings", { behavior = "append", content = { type = "element", tagName = "span", properties = { className = ["headerLink"], ariaHidden = true }, children = [] } }],
]
"#;

static PROCESSOR: Lazy<MarkdownProcessor> = Lazy::new(|| {
    let config = SiteConfig::from_toml_str(REFERENCE_CONFIG).unwrap();
    config.validate().unwrap();
    MarkdownProcessor::new(&config.markdown).unwrap()
});

#[test]
fn plugin_chains_follow_configuration_order() {
    assert_eq!(
        PROCESSOR.remark_names(),
        vec![
            "remark-gfm",
            "remark-smartypants",
            "remark-prism",
            "@fec/remark-a11y-emoji",
            "remark-behead"
        ]
    );
    assert_eq!(
        PROCESSOR.rehype_names(),
        vec!["rehype-slug", "rehype-autolink-headings"]
    );
}

#[test]
fn heading_is_beheaded_slugged_and_linked() {
    let doc = PROCESSOR.process("## Title", SourceKind::Markdown).unwrap();
    assert_eq!(
        doc.html,
        r##"<h3 id="title">Title<a aria-hidden="true" tabindex="-1" href="#title"><span class="headerLink" aria-hidden="true"></span></a></h3>"##
    );
    assert_eq!(doc.headings.len(), 1);
    assert_eq!(doc.headings[0].depth, 3);
    assert_eq!(doc.headings[0].slug, "title");
    assert_eq!(doc.headings[0].text, "Title");
}

#[test]
fn reference_pipeline_renders_a_post() {
    let source = "---\ntitle: Launch\n---\n# \"Shipping\" day 🚀\n\nWe're live -- finally...\n\n```js\nconst a = 1;\n```\n\n- [x] deploy\n";
    let doc = PROCESSOR.process(source, SourceKind::Markdown).unwrap();

    assert!(
        doc.html.starts_with("<h2 id=\"shipping-day-\">“Shipping” day <span role=\"img\" aria-label=\"rocket\">🚀</span><a "),
        "{}",
        doc.html
    );
    assert!(doc.html.contains("<p>We’re live — finally…</p>"), "{}", doc.html);
    assert!(
        doc.html.contains("<div class=\"remark-highlight\"><pre class=\"language-js\"><code class=\"language-js\">"),
        "{}",
        doc.html
    );
    assert!(doc.html.contains("<input type=\"checkbox\" disabled checked />"));
    assert_eq!(doc.title(), Some("Launch"));
}

#[test]
fn mdx_page_keeps_component_placeholders() {
    let source = "import Counter from '../components/Counter.svelte';\n\n# Demo\n\n<Counter start={2} client:load>\n  Clicks\n</Counter>\n";
    let doc = PROCESSOR.process(source, SourceKind::Mdx).unwrap();

    assert!(doc.html.contains(
        "<mdx-component data-name=\"Counter\" data-props='{\"start\":2}' data-hydrate=\"load\"><p>Clicks</p></mdx-component>"
    ), "{}", doc.html);
    assert_eq!(doc.imports.len(), 1);
    assert_eq!(doc.headings[0].depth, 2);
}
