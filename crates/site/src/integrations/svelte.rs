use html_escape::encode_double_quoted_attribute;

use super::{Integration, IntegrationSetup};
use crate::BuildError;
use crate::components::{ComponentRenderer, Island};

pub(super) const NAME: &str = "svelte";

/// URL prefix compiled components are served from.
pub const COMPONENTS_URL: &str = "/_components";

/// Defines `<svelte-island>`: imports the component named by
/// `component-url` and mounts it with `props` when hydration is requested.
pub const ISLAND_LOADER: &str = r#"<script type="module">
customElements.define("svelte-island", class extends HTMLElement {
  async connectedCallback() {
    if (!this.hasAttribute("client")) return;
    const { default: Component } = await import(this.getAttribute("component-url"));
    const props = JSON.parse(this.getAttribute("props") || "{}");
    const mount = () => new Component({ target: this, props, hydrate: true });
    if (this.getAttribute("client") === "visible") {
      new IntersectionObserver((entries, observer) => {
        if (entries.some((entry) => entry.isIntersecting)) { observer.disconnect(); mount(); }
      }).observe(this);
    } else if (this.getAttribute("client") === "idle" && "requestIdleCallback" in window) {
      requestIdleCallback(mount);
    } else {
      mount();
    }
  }
});
</script>"#;

/// Renders Svelte components as hydration islands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Svelte;

impl Integration for Svelte {
    fn name(&self) -> &str {
        NAME
    }

    fn setup(&self, setup: &mut IntegrationSetup) -> Result<(), BuildError> {
        setup.add_renderer(Box::new(SvelteRenderer));
        Ok(())
    }
}

/// Component renderer claiming `.svelte` imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvelteRenderer;

impl ComponentRenderer for SvelteRenderer {
    fn name(&self) -> &str {
        NAME
    }

    fn claims(&self, specifier: &str) -> bool {
        specifier.ends_with(".svelte")
    }

    fn open_tag(&self, island: &Island) -> String {
        let mut tag = format!(
            "<svelte-island component=\"{}\" component-url=\"{COMPONENTS_URL}/{}\" props=\"{}\"",
            encode_double_quoted_attribute(&island.name),
            encode_double_quoted_attribute(&island.asset),
            encode_double_quoted_attribute(&island.props.to_string()),
        );
        if let Some(client) = &island.hydrate {
            tag.push_str(&format!(
                " client=\"{}\"",
                encode_double_quoted_attribute(client)
            ));
        }
        tag.push('>');
        tag
    }

    fn close_tag(&self, _island: &Island) -> String {
        "</svelte-island>".to_string()
    }

    fn head(&self) -> Vec<String> {
        vec![ISLAND_LOADER.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn island_markup() {
        let island = Island {
            name: "Counter".to_string(),
            specifier: "../components/Counter.svelte".to_string(),
            source: PathBuf::from("/site/src/components/Counter.svelte"),
            asset: "src/components/Counter.svelte".to_string(),
            props: json!({ "start": 2, "label": "a\"b" }),
            hydrate: Some("load".to_string()),
        };
        assert!(SvelteRenderer.claims(&island.specifier));
        assert!(!SvelteRenderer.claims("./Chart.vue"));
        assert_eq!(
            SvelteRenderer.open_tag(&island),
            "<svelte-island component=\"Counter\" component-url=\"/_components/src/components/Counter.svelte\" props=\"{&quot;start&quot;:2,&quot;label&quot;:&quot;a\\&quot;b&quot;}\" client=\"load\">"
        );
    }

    #[test]
    fn static_islands_have_no_client_attribute() {
        let island = Island {
            name: "Badge".to_string(),
            specifier: "./Badge.svelte".to_string(),
            source: PathBuf::from("Badge.svelte"),
            asset: "Badge.svelte".to_string(),
            props: json!({}),
            hydrate: None,
        };
        assert!(SvelteRenderer.open_tag(&island).ends_with("props=\"{}\">"));
    }
}
