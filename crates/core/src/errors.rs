use thiserror::Error;

use crate::catalog::dataset::DatasetError;
use crate::config::ConfigError;
use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ApplicationError {
    /// Stable label used in command output envelopes.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config_validation",
            Self::Dataset(_) => "dataset_load",
            Self::Render(_) => "render",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Dataset(_) => 3,
            Self::Render(_) => 4,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "Configuration is invalid. Run `prodcat config` to inspect it.",
            Self::Dataset(_) => "The catalog dataset could not be loaded.",
            Self::Render(_) => "The product table could not be rendered.",
        }
    }
}
