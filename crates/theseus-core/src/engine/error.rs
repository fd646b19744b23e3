use thiserror::Error;

use super::config::ConfigError;
use super::state::VariantId;
use crate::core::io::error::StructureError;
use crate::workflows::catalog::CatalogLoadError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidStructure(#[from] StructureError),

    #[error("Generation {generation} is empty: all {requested} population slots exhausted their mutation retries")]
    EmptyPopulation { generation: usize, requested: usize },

    #[error("Unknown variant {0} (continuing requires a variant of the latest generation)")]
    UnknownVariant(VariantId),

    #[error("Unknown target: {name}")]
    UnknownTarget { name: String },

    #[error("Operation cancelled before the population was complete")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load seed catalog: {0}")]
    Catalog(#[from] CatalogLoadError),
}
