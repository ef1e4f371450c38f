use markdown::mdast::Node;
use mdpress_core::{ParseOptions, PipelineError, PluginSpec};
use serde::Deserialize;

use super::RemarkPlugin;
use crate::error::plugin_options;
use crate::{FileData, PluginError};

pub(super) const NAME: &str = "remark-gfm";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct GfmOptions {
    single_tilde: bool,
}

impl Default for GfmOptions {
    fn default() -> Self {
        Self { single_tilde: true }
    }
}

/// GitHub Flavored Markdown: autolink literals, footnotes, strikethrough,
/// tables and task lists.
///
/// Everything happens at parse time; the tree is left alone.
#[derive(Debug, Clone)]
pub struct Gfm {
    single_tilde: bool,
}

impl Gfm {
    /// Builds the plugin from its configuration entry.
    pub fn from_spec(spec: &PluginSpec) -> Result<Self, PluginError> {
        let options: GfmOptions = plugin_options(spec)?;
        Ok(Self {
            single_tilde: options.single_tilde,
        })
    }
}

impl RemarkPlugin for Gfm {
    fn name(&self) -> &str {
        NAME
    }

    fn configure_parser(&self, options: &mut ParseOptions) {
        options.gfm = true;
        options.gfm_single_tilde = self.single_tilde;
    }

    fn transform(&self, _tree: &mut Node, _file: &mut FileData) -> Result<(), PipelineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enables_gfm_parsing() {
        let plugin = Gfm::from_spec(&PluginSpec::new(NAME)).unwrap();
        let mut options = ParseOptions::markdown();
        plugin.configure_parser(&mut options);
        assert!(options.gfm);
        assert!(options.gfm_single_tilde);
    }

    #[test]
    fn single_tilde_can_be_disabled() {
        let spec = PluginSpec::with_options(NAME, json!({ "singleTilde": false }));
        let plugin = Gfm::from_spec(&spec).unwrap();
        let mut options = ParseOptions::markdown();
        plugin.configure_parser(&mut options);
        assert!(!options.gfm_single_tilde);
    }
}
