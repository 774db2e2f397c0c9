use thiserror::Error;

use crate::configuration::config::ConfigError;
use crate::simulation::states::ParticleId;

/// Errors surfaced to the host by the simulation boundary
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("no particle with id {0}")]
    UnknownParticle(ParticleId),
}
