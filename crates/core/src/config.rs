//! Site configuration.
//!
//! Keys are camelCase so configuration files read like the framework
//! configuration they replace. TOML (`mdpress.toml`) and JSON are supported,
//! chosen by file extension.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Default configuration file name looked up in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "mdpress.toml";

/// Errors raised while loading, saving or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that failed to load
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
    /// The configuration file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
    /// Invalid TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    /// The configuration could not be written as TOML.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    /// Invalid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// File extension is neither `.toml` nor `.json`.
    #[error("unsupported configuration format: {} (expected .toml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),
    /// Semantic validation failed; one entry per problem.
    #[error("invalid configuration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

/// A plugin activation: a name plus optional options.
///
/// Written either as a bare string (`"remark-gfm"`) or as a two element array
/// (`["remark-behead", { depth = 1 }]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PluginSpecRepr", into = "PluginSpecRepr")]
pub struct PluginSpec {
    /// Plugin identifier.
    pub name: String,
    /// Plugin options, if any.
    pub options: Option<JsonValue>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PluginSpecRepr {
    Name(String),
    WithOptions(String, JsonValue),
}

impl From<PluginSpecRepr> for PluginSpec {
    fn from(repr: PluginSpecRepr) -> Self {
        match repr {
            PluginSpecRepr::Name(name) => PluginSpec::new(name),
            PluginSpecRepr::WithOptions(name, options) => PluginSpec::with_options(name, options),
        }
    }
}

impl From<PluginSpec> for PluginSpecRepr {
    fn from(spec: PluginSpec) -> Self {
        match spec.options {
            Some(options) => PluginSpecRepr::WithOptions(spec.name, options),
            None => PluginSpecRepr::Name(spec.name),
        }
    }
}

impl PluginSpec {
    /// Plugin without options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: None,
        }
    }

    /// Plugin with options.
    pub fn with_options(name: impl Into<String>, options: JsonValue) -> Self {
        Self {
            name: name.into(),
            options: Some(options),
        }
    }

    /// Looks up a single option value.
    pub fn option(&self, key: &str) -> Option<&JsonValue> {
        self.options.as_ref().and_then(|options| options.get(key))
    }
}

/// Code highlighting engine: `"shiki"`, `"prism"` or `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HighlightRepr", into = "HighlightRepr")]
pub enum SyntaxHighlight {
    /// Inline-styled token spans using a color theme.
    #[default]
    Shiki,
    /// Class-based token spans (`token-*`).
    Prism,
    /// No highlighting; code is escaped as-is.
    Disabled,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum HighlightRepr {
    Engine(String),
    Flag(bool),
}

impl TryFrom<HighlightRepr> for SyntaxHighlight {
    type Error = String;

    fn try_from(repr: HighlightRepr) -> Result<Self, Self::Error> {
        match repr {
            HighlightRepr::Engine(engine) => match engine.as_str() {
                "shiki" => Ok(SyntaxHighlight::Shiki),
                "prism" => Ok(SyntaxHighlight::Prism),
                other => Err(format!(
                    "unknown syntaxHighlight `{other}` (expected \"shiki\", \"prism\" or false)"
                )),
            },
            HighlightRepr::Flag(false) => Ok(SyntaxHighlight::Disabled),
            HighlightRepr::Flag(true) => Err(
                "syntaxHighlight = true is not allowed; name an engine (\"shiki\" or \"prism\")"
                    .to_string(),
            ),
        }
    }
}

impl From<SyntaxHighlight> for HighlightRepr {
    fn from(value: SyntaxHighlight) -> Self {
        match value {
            SyntaxHighlight::Shiki => HighlightRepr::Engine("shiki".into()),
            SyntaxHighlight::Prism => HighlightRepr::Engine("prism".into()),
            SyntaxHighlight::Disabled => HighlightRepr::Flag(false),
        }
    }
}

/// How page routes map to output files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildFormat {
    /// `about.md` → `about/index.html`
    #[default]
    Directory,
    /// `about.md` → `about.html`
    File,
}

/// Build-time options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BuildOptions {
    /// Directory holding page sources, relative to the project root.
    pub src_dir: PathBuf,
    /// Output directory.
    pub out_dir: PathBuf,
    /// Directory copied verbatim into the output.
    pub public_dir: PathBuf,
    /// Output file layout.
    pub format: BuildFormat,
    /// Write `sitemap.xml` when `site` is set.
    pub sitemap: bool,
    /// Build pages marked `draft: true`.
    pub drafts: bool,
    /// Worker threads for page rendering; the global rayon pool when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src/pages"),
            out_dir: PathBuf::from("dist"),
            public_dir: PathBuf::from("public"),
            format: BuildFormat::Directory,
            sitemap: true,
            drafts: false,
            concurrency: None,
        }
    }
}

/// Markdown pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Highlighting engine for fenced code.
    pub syntax_highlight: SyntaxHighlight,
    /// Theme used by the `shiki` engine.
    pub shiki_theme: String,
    /// Pass raw HTML in sources through to the output.
    pub allow_raw_html: bool,
    /// Parse `$inline$` and `$$block$$` math.
    pub math: bool,
    /// Keep the default remark plugins when user plugins are configured.
    pub extend_default_plugins: bool,
    /// Markdown AST transform chain, in order.
    pub remark_plugins: Vec<PluginSpec>,
    /// HTML transform chain, in order.
    pub rehype_plugins: Vec<PluginSpec>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            syntax_highlight: SyntaxHighlight::Shiki,
            shiki_theme: "base16-ocean.dark".to_string(),
            allow_raw_html: true,
            math: false,
            extend_default_plugins: false,
            remark_plugins: Vec::new(),
            rehype_plugins: Vec::new(),
        }
    }
}

/// Toolchain configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ViteConfig {
    /// Toolchain plugins, in order.
    pub plugins: Vec<PluginSpec>,
}

/// The whole site configuration.
///
/// Field order matters for TOML output: plain values come before tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute base URL of the deployed site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    /// Build integrations, in mount order.
    pub integrations: Vec<PluginSpec>,
    /// Toolchain plugins.
    pub vite: ViteConfig,
    /// Build options.
    pub build: BuildOptions,
    /// Markdown pipeline.
    pub markdown: MarkdownConfig,
}

/// Names accepted in each plugin list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginCatalog {
    /// Recognized `markdown.remarkPlugins` names.
    pub remark: BTreeSet<String>,
    /// Recognized `markdown.rehypePlugins` names.
    pub rehype: BTreeSet<String>,
    /// Recognized `integrations` names.
    pub integrations: BTreeSet<String>,
    /// Recognized `vite.plugins` names.
    pub vite: BTreeSet<String>,
}

impl PluginCatalog {
    /// Every plugin shipped with mdpress.
    pub fn builtin() -> Self {
        fn set(names: &[&str]) -> BTreeSet<String> {
            names.iter().map(|name| name.to_string()).collect()
        }

        Self {
            remark: set(&[
                "remark-gfm",
                "remark-smartypants",
                "remark-prism",
                "@fec/remark-a11y-emoji",
                "remark-behead",
            ]),
            rehype: set(&["rehype-slug", "rehype-autolink-headings"]),
            integrations: set(&["mdx", "svelte", "tailwind"]),
            vite: set(&["svelte"]),
        }
    }
}

impl SiteConfig {
    /// Loads a configuration file, TOML or JSON by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loading configuration from {}", path.display());

        match format {
            ConfigFormat::Toml => Self::from_toml_str(&content),
            ConfigFormat::Json => Self::from_json_str(&content),
        }
    }

    /// Parses a TOML configuration.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Parses a JSON configuration.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the configuration, TOML or JSON by extension.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => self.to_toml_string()?,
            ConfigFormat::Json => self.to_json_string()?,
        };
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates against the built-in plugin catalog.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_with(&PluginCatalog::builtin())
    }

    /// Validates against a caller-supplied catalog, reporting every problem.
    pub fn validate_with(&self, catalog: &PluginCatalog) -> Result<(), ConfigError> {
        let problems = self.problems(catalog);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// Lists every validation problem; empty when the configuration is valid.
    pub fn problems(&self, catalog: &PluginCatalog) -> Vec<String> {
        let mut problems = Vec::new();

        if let Some(site) = &self.site
            && let Err(reason) = validate_site_url(site)
        {
            problems.push(format!("site `{site}` {reason}"));
        }

        let lists: [(&str, &[PluginSpec], &BTreeSet<String>); 4] = [
            ("integrations", &self.integrations, &catalog.integrations),
            ("vite.plugins", &self.vite.plugins, &catalog.vite),
            (
                "markdown.remarkPlugins",
                &self.markdown.remark_plugins,
                &catalog.remark,
            ),
            (
                "markdown.rehypePlugins",
                &self.markdown.rehype_plugins,
                &catalog.rehype,
            ),
        ];
        for (field, specs, known) in lists {
            for (index, spec) in specs.iter().enumerate() {
                if !known.contains(&spec.name) {
                    problems.push(format!(
                        "{field}[{index}]: unrecognized plugin `{}`",
                        spec.name
                    ));
                }
                if let Some(options) = &spec.options
                    && !options.is_object()
                {
                    problems.push(format!(
                        "{field}[{index}]: options for `{}` must be an object",
                        spec.name
                    ));
                }
            }
        }

        if self.build.concurrency == Some(0) {
            problems.push("build.concurrency must be at least 1".to_string());
        }

        problems
    }

    /// The configuration `mdpress init` writes: MDX with Svelte islands,
    /// Tailwind, Prism highlighting and linked headings.
    pub fn reference() -> Self {
        Self {
            site: Some("https://bootstrapped.me".to_string()),
            integrations: ["mdx", "svelte", "tailwind"].map(PluginSpec::new).to_vec(),
            vite: ViteConfig {
                plugins: vec![PluginSpec::new("svelte")],
            },
            build: BuildOptions::default(),
            markdown: MarkdownConfig {
                syntax_highlight: SyntaxHighlight::Prism,
                remark_plugins: vec![
                    PluginSpec::new("remark-gfm"),
                    PluginSpec::new("remark-smartypants"),
                    PluginSpec::new("remark-prism"),
                    PluginSpec::new("@fec/remark-a11y-emoji"),
                    PluginSpec::with_options("remark-behead", serde_json::json!({ "depth": 1 })),
                ],
                rehype_plugins: vec![
                    PluginSpec::new("rehype-slug"),
                    PluginSpec::with_options(
                        "rehype-autolink-headings",
                        serde_json::json!({
                            "behavior": "append",
                            "content": {
                                "type": "element",
                                "tagName": "span",
                                "properties": { "className": ["headerLink"], "ariaHidden": true },
                                "children": []
                            }
                        }),
                    ),
                ],
                ..MarkdownConfig::default()
            },
        }
    }

    /// Returns true when an integration with this name is active.
    pub fn has_integration(&self, name: &str) -> bool {
        self.integrations.iter().any(|spec| spec.name == name)
    }

    /// Builds an absolute URL for a site-relative route, if `site` is set.
    ///
    /// ```
    /// use mdpress_core::SiteConfig;
    ///
    /// let config = SiteConfig { site: Some("https://bootstrapped.me/".into()), ..Default::default() };
    /// assert_eq!(config.absolute_url("/posts/hello/").as_deref(), Some("https://bootstrapped.me/posts/hello/"));
    /// assert_eq!(SiteConfig::default().absolute_url("/"), None);
    /// ```
    pub fn absolute_url(&self, route: &str) -> Option<String> {
        let base = self.site.as_deref()?.trim_end_matches('/');
        Some(format!("{}/{}", base, route.trim_start_matches('/')))
    }
}

#[derive(Debug, Clone, Copy)]
enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Checks that `url` is an absolute `http`/`https` URL with a host.
pub fn validate_site_url(url: &str) -> Result<(), String> {
    if url.chars().any(char::is_whitespace) {
        return Err("must not contain whitespace".to_string());
    }

    let Some((scheme, rest)) = url.split_once("://") else {
        return Err("must be an absolute URL (e.g. https://example.com)".to_string());
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Err(format!("has unsupported scheme `{scheme}` (expected http or https)"));
    }

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let (host, port) = if let Some(bracketed) = host_port.strip_prefix('[') {
        match bracketed.split_once(']') {
            Some((ipv6, tail)) => (ipv6, tail.strip_prefix(':')),
            None => return Err("has an unterminated IPv6 host".to_string()),
        }
    } else {
        match host_port.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        }
    };

    if host.is_empty() {
        return Err("has no host".to_string());
    }
    if !host_port.starts_with('[')
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '.')
    {
        return Err(format!("has an invalid host `{host}`"));
    }
    if let Some(port) = port
        && (port.is_empty() || port.parse::<u16>().is_err())
    {
        return Err(format!("has an invalid port `{port}`"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const REFERENCE: &str = r#"
site = "https://bootstrapped.me"
integrations = ["mdx", "svelte", "tailwind"]

[vite]
plugins = ["svelte"]

[build]

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

    fn names(specs: &[PluginSpec]) -> Vec<&str> {
        specs.iter().map(|spec| spec.name.as_str()).collect()
    }

    #[test]
    fn loads_reference_configuration() {
        let config = SiteConfig::from_toml_str(REFERENCE).unwrap();
        assert_eq!(config.site.as_deref(), Some("https://bootstrapped.me"));
        assert_eq!(names(&config.integrations), vec!["mdx", "svelte", "tailwind"]);
        assert_eq!(config.markdown.syntax_highlight, SyntaxHighlight::Prism);
        assert_eq!(config.build, BuildOptions::default());
        assert_eq!(
            config.markdown.remark_plugins[4],
            PluginSpec::with_options("remark-behead", json!({ "depth": 1 }))
        );
        assert_eq!(
            config.markdown.rehype_plugins[1].option("behavior"),
            Some(&json!("append"))
        );
        config.validate().unwrap();
    }

    #[test]
    fn reference_constructor_matches_reference_file() {
        assert_eq!(SiteConfig::reference(), SiteConfig::from_toml_str(REFERENCE).unwrap());
    }

    #[test]
    fn plugin_order_survives_toml_round_trip() {
        let config = SiteConfig::from_toml_str(REFERENCE).unwrap();
        let reloaded = SiteConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(
            names(&reloaded.markdown.remark_plugins),
            vec![
                "remark-gfm",
                "remark-smartypants",
                "remark-prism",
                "@fec/remark-a11y-emoji",
                "remark-behead",
            ]
        );
    }

    #[test]
    fn plugin_order_survives_json_round_trip() {
        let config = SiteConfig::from_toml_str(REFERENCE).unwrap();
        let json = config.to_json_string().unwrap();
        let reloaded = SiteConfig::from_json_str(&json).unwrap();
        assert_eq!(reloaded, config);
        assert!(json.contains(r#""syntaxHighlight": "prism""#));
    }

    #[test]
    fn syntax_highlight_values() {
        let parse = |value: &str| {
            SiteConfig::from_json_str(&format!(r#"{{"markdown": {{"syntaxHighlight": {value}}}}}"#))
        };
        assert_eq!(
            parse("\"shiki\"").unwrap().markdown.syntax_highlight,
            SyntaxHighlight::Shiki
        );
        assert_eq!(
            parse("false").unwrap().markdown.syntax_highlight,
            SyntaxHighlight::Disabled
        );
        assert!(parse("true").is_err());
        assert!(parse("\"highlightjs\"").is_err());
        assert_eq!(
            SiteConfig::default().markdown.syntax_highlight,
            SyntaxHighlight::Shiki
        );
    }

    #[test]
    fn disabled_highlight_serializes_as_false() {
        let mut config = SiteConfig::default();
        config.markdown.syntax_highlight = SyntaxHighlight::Disabled;
        let toml = config.to_toml_string().unwrap();
        assert!(toml.contains("syntaxHighlight = false"), "{toml}");
    }

    #[test]
    fn rejects_unknown_build_keys() {
        let err = SiteConfig::from_toml_str("[build]\noutput = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn build_format_parses() {
        let config = SiteConfig::from_toml_str("[build]\nformat = \"file\"\nconcurrency = 4").unwrap();
        assert_eq!(config.build.format, BuildFormat::File);
        assert_eq!(config.build.concurrency, Some(4));
        assert!(SiteConfig::from_toml_str("[build]\nformat = \"flat\"").is_err());
    }

    #[test]
    fn reports_every_problem() {
        let config = SiteConfig {
            site: Some("ftp://example.com".into()),
            integrations: vec![PluginSpec::new("react")],
            markdown: MarkdownConfig {
                remark_plugins: vec![
                    PluginSpec::new("remark-gfm"),
                    PluginSpec::new("remark-toc"),
                ],
                rehype_plugins: vec![PluginSpec::with_options("rehype-slug", json!(3))],
                ..Default::default()
            },
            ..Default::default()
        };

        let Err(ConfigError::Invalid(problems)) = config.validate() else {
            panic!("expected validation failure");
        };
        assert_eq!(problems.len(), 4, "{problems:#?}");
        assert!(problems[0].contains("unsupported scheme"));
        assert!(problems[1].contains("integrations[0]"));
        assert!(problems[2].contains("markdown.remarkPlugins[1]"));
        assert!(problems[3].contains("must be an object"));
    }

    #[test]
    fn custom_catalog() {
        let config = SiteConfig {
            integrations: vec![PluginSpec::new("react")],
            ..Default::default()
        };
        let mut catalog = PluginCatalog::builtin();
        catalog.integrations.insert("react".into());
        assert!(config.validate_with(&catalog).is_ok());
    }

    #[test]
    fn site_url_rules() {
        for ok in [
            "https://bootstrapped.me",
            "http://localhost:4321/",
            "https://example.com/blog?x#y",
            "https://[::1]:8080",
        ] {
            assert!(validate_site_url(ok).is_ok(), "{ok}");
        }
        for bad in [
            "bootstrapped.me",
            "https://",
            "https://exa mple.com",
            "mailto://x",
            "https://host:99999",
            "https://ho_st.com",
        ] {
            assert!(validate_site_url(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("mdpress.toml");
        std::fs::write(&toml_path, REFERENCE).unwrap();
        let config = SiteConfig::from_file(&toml_path).unwrap();

        let json_path = dir.path().join("mdpress.json");
        config.write_file(&json_path).unwrap();
        assert_eq!(SiteConfig::from_file(&json_path).unwrap(), config);

        let err = SiteConfig::from_file(dir.path().join("mdpress.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
        let err = SiteConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
