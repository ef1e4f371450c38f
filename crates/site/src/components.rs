//! Component islands.
//!
//! MDX components reach the site builder as `<mdx-component>` placeholders.
//! Each is matched to the import that introduced its name and handed to the
//! first component renderer that claims the import's source.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use mdpress_core::PipelineError;
use mdpress_markdown::{COMPONENT_TAG, Document};
use serde_json::Value as JsonValue;

/// A component occurrence ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Island {
    /// Name used in the page (`Counter`, `ui.Card`).
    pub name: String,
    /// Import source as written (`../components/Counter.svelte`).
    pub specifier: String,
    /// Import source resolved against the page's directory.
    pub source: PathBuf,
    /// Published location of the source under the components directory,
    /// `/`-separated (see [`component_asset`]).
    pub asset: String,
    /// Props as a JSON object.
    pub props: JsonValue,
    /// Hydration directive (`load`, `visible`, ...), if any.
    pub hydrate: Option<String>,
}

/// Turns islands of one component framework into markup.
pub trait ComponentRenderer: Send + Sync {
    /// Renderer name, for logs.
    fn name(&self) -> &str;

    /// True when this renderer handles components imported from `specifier`.
    fn claims(&self, specifier: &str) -> bool;

    /// Opening markup; the placeholder's children follow it.
    fn open_tag(&self, island: &Island) -> String;

    /// Closing markup.
    fn close_tag(&self, island: &Island) -> String;

    /// Head elements added once to every page that uses this renderer.
    fn head(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Result of resolving a page's placeholders.
#[derive(Debug, Default)]
pub struct ResolvedComponents {
    /// Page HTML with islands rendered.
    pub html: String,
    /// Indices (into the renderer list) of renderers that were used.
    pub renderers_used: BTreeSet<usize>,
    /// Component sources referenced by the page.
    pub sources: BTreeSet<PathBuf>,
}

/// Joins `specifier` onto `base` and folds `.`/`..` without touching the
/// filesystem.
pub fn resolve_specifier(base: &Path, specifier: &str) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in base.join(specifier).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

/// Path a component source is published at: relative to the project `root`,
/// so two components with the same file name never collide.
///
/// ```
/// use std::path::Path;
/// use mdpress_site::components::component_asset;
///
/// let asset = component_asset(Path::new("/site"), Path::new("/site/src/components/Counter.svelte"));
/// assert_eq!(asset, "src/components/Counter.svelte");
/// ```
pub fn component_asset(root: &Path, source: &Path) -> String {
    let root = resolve_specifier(root, ".");
    source
        .strip_prefix(&root)
        .unwrap_or(source)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Renders every component placeholder in `document.html`.
///
/// Unknown names and imports no renderer claims fail the page.
pub fn resolve_components(
    document: &Document,
    root: &Path,
    page_dir: &Path,
    renderers: &[Box<dyn ComponentRenderer>],
) -> Result<ResolvedComponents, PipelineError> {
    if !document.html.contains(COMPONENT_TAG) {
        return Ok(ResolvedComponents {
            html: document.html.clone(),
            ..Default::default()
        });
    }

    let failure: RefCell<Option<PipelineError>> = RefCell::new(None);
    let used = RefCell::new(BTreeSet::new());
    let sources = RefCell::new(BTreeSet::new());

    let html = rewrite_str(
        &document.html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(COMPONENT_TAG, |el| {
                if failure.borrow().is_some() {
                    return Ok(());
                }
                let name = el.get_attribute("data-name").unwrap_or_default();
                let props = el
                    .get_attribute("data-props")
                    .and_then(|raw| serde_json::from_str(&raw).ok())
                    .unwrap_or_else(|| JsonValue::Object(Default::default()));
                let hydrate = el.get_attribute("data-hydrate");

                // `ui.Card` is looked up through the `ui` binding.
                let local = name.split('.').next().unwrap_or(&name);
                let Some(binding) = document.import_for(local) else {
                    *failure.borrow_mut() = Some(PipelineError::unknown_component(
                        &name,
                        format!("`{local}` is not imported"),
                    ));
                    return Ok(());
                };
                let Some((index, renderer)) = renderers
                    .iter()
                    .enumerate()
                    .find(|(_, renderer)| renderer.claims(&binding.source))
                else {
                    *failure.borrow_mut() = Some(PipelineError::unknown_component(
                        &name,
                        format!("no integration renders components from `{}`", binding.source),
                    ));
                    return Ok(());
                };

                let source = resolve_specifier(page_dir, &binding.source);
                let island = Island {
                    name: name.clone(),
                    specifier: binding.source.clone(),
                    asset: component_asset(root, &source),
                    source,
                    props,
                    hydrate,
                };
                log::trace!("rendering <{name}> with {}", renderer.name());

                el.before(&renderer.open_tag(&island), ContentType::Html);
                el.after(&renderer.close_tag(&island), ContentType::Html);
                el.remove_and_keep_content();

                used.borrow_mut().insert(index);
                sources.borrow_mut().insert(island.source);
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| PipelineError::Render {
        message: format!("failed to rewrite component placeholders: {err}"),
        location: mdpress_core::SourceLocation::new(1, 1),
    })?;

    if let Some(err) = failure.into_inner() {
        return Err(err);
    }
    Ok(ResolvedComponents {
        html,
        renderers_used: used.into_inner(),
        sources: sources.into_inner(),
    })
}
