use super::{Integration, IntegrationSetup};
use crate::BuildError;

pub(super) const NAME: &str = "mdx";

/// Builds `.mdx` sources as pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mdx;

impl Integration for Mdx {
    fn name(&self) -> &str {
        NAME
    }

    fn setup(&self, setup: &mut IntegrationSetup) -> Result<(), BuildError> {
        setup.add_extension("mdx");
        Ok(())
    }
}
