use mdpress_core::PluginSpec;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while assembling a plugin chain.
///
/// These surface when a [`MarkdownProcessor`](crate::MarkdownProcessor) is
/// built, never while a document is being processed.
#[derive(Debug, Error)]
pub enum PluginError {
    /// No plugin with this name is registered for the stage.
    #[error("unknown {stage} plugin `{name}`")]
    Unknown {
        /// `remark` or `rehype`
        stage: &'static str,
        /// Name as written in the configuration
        name: String,
    },
    /// The plugin rejected its options.
    #[error("invalid options for `{plugin}`: {message}")]
    InvalidOptions {
        /// Plugin name
        plugin: String,
        /// What was wrong
        message: String,
    },
}

impl PluginError {
    /// Shorthand for [`PluginError::InvalidOptions`].
    pub fn invalid_options(plugin: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::InvalidOptions {
            plugin: plugin.into(),
            message: message.to_string(),
        }
    }
}

/// Deserializes a plugin's options, falling back to defaults when absent.
pub(crate) fn plugin_options<T>(spec: &PluginSpec) -> Result<T, PluginError>
where
    T: DeserializeOwned + Default,
{
    match &spec.options {
        None => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|err| PluginError::invalid_options(&spec.name, err)),
    }
}
