use mdpress_core::{PipelineError, PluginSpec, Slugger};
use serde::Deserialize;

use super::{ALL_HEADINGS, RehypePlugin, assign_ids, scan_headings};
use crate::FileData;
use crate::PluginError;
use crate::error::plugin_options;

pub(super) const NAME: &str = "rehype-slug";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct SlugOptions {
    prefix: String,
}

/// Gives every heading without an `id` one derived from its text.
#[derive(Debug, Clone, Default)]
pub struct Slug {
    prefix: String,
}

impl Slug {
    /// Builds the plugin from its configuration entry.
    pub fn from_spec(spec: &PluginSpec) -> Result<Self, PluginError> {
        let options: SlugOptions = plugin_options(spec)?;
        Ok(Self {
            prefix: options.prefix,
        })
    }
}

impl RehypePlugin for Slug {
    fn name(&self) -> &str {
        NAME
    }

    fn transform(&self, html: &str, _file: &mut FileData) -> Result<String, PipelineError> {
        let headings = scan_headings(html, ALL_HEADINGS, NAME)?;
        if headings.iter().all(|heading| heading.id.is_some()) {
            return Ok(html.to_string());
        }

        let mut slugger = Slugger::new();
        for id in headings.iter().filter_map(|heading| heading.id.as_deref()) {
            slugger.reserve(id);
        }

        let ids: Vec<Option<String>> = headings
            .iter()
            .map(|heading| match heading.id {
                Some(_) => None,
                None => Some(format!("{}{}", self.prefix, slugger.next_slug(&heading.text))),
            })
            .collect();

        assign_ids(html, ALL_HEADINGS, &ids, NAME)
    }
}
