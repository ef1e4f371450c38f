use markdown::mdast::Node;
use mdpress_core::{PipelineError, PluginSpec};
use serde::Deserialize;

use super::{RemarkPlugin, plain_text, walk_mut};
use crate::error::plugin_options;
use crate::{FileData, PluginError};

pub(super) const NAME: &str = "remark-behead";

/// Locates the heading that bounds the shifted range.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HeadingMarker {
    /// Zero-based index among all headings.
    Index(usize),
    /// Exact heading text.
    Text(String),
}

impl HeadingMarker {
    fn matches(&self, index: usize, text: &str) -> bool {
        match self {
            HeadingMarker::Index(i) => *i == index,
            HeadingMarker::Text(t) => t == text,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct BeheadOptions {
    depth: i64,
    after: Option<HeadingMarker>,
    before: Option<HeadingMarker>,
}

/// Shifts heading depths by a fixed amount, clamped to 1..=6.
#[derive(Debug, Clone)]
pub struct Behead {
    depth: i64,
    after: Option<HeadingMarker>,
    before: Option<HeadingMarker>,
}

impl Behead {
    /// Builds the plugin from its configuration entry.
    pub fn from_spec(spec: &PluginSpec) -> Result<Self, PluginError> {
        let options: BeheadOptions = plugin_options(spec)?;
        Ok(Self {
            depth: options.depth,
            after: options.after,
            before: options.before,
        })
    }

    /// Plugin shifting every heading by `depth`.
    pub fn by(depth: i64) -> Self {
        Self {
            depth,
            after: None,
            before: None,
        }
    }
}

impl RemarkPlugin for Behead {
    fn name(&self) -> &str {
        NAME
    }

    fn transform(&self, tree: &mut Node, _file: &mut FileData) -> Result<(), PipelineError> {
        if self.depth == 0 {
            return Ok(());
        }

        // Shifting starts right after the `after` marker and stops at the
        // `before` marker; both markers themselves keep their depth.
        let mut index = 0;
        let mut active = self.after.is_none();
        let mut stopped = false;

        walk_mut(tree, &mut |node| {
            let Node::Heading(heading) = node else {
                return;
            };
            let text = plain_text(&heading.children);
            let current = index;
            index += 1;

            if let Some(before) = &self.before
                && before.matches(current, &text)
            {
                stopped = true;
            }
            if active && !stopped {
                let shifted = i64::from(heading.depth).saturating_add(self.depth).clamp(1, 6);
                heading.depth = shifted as u8;
            }
            if let Some(after) = &self.after
                && !active
                && after.matches(current, &text)
            {
                active = true;
            }
        });

        Ok(())
    }
}
