use super::OrganismId;

use thiserror::Error;

/// Errors raised by [`Population`] bookkeeping.
///
/// [`Population`]: crate::Population
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PopulationError {
    #[error("no organism {0} in the population")]
    UnknownOrganism(OrganismId),
    #[error("fitness of organism {id} must be finite, got {score}")]
    InvalidFitness { id: OrganismId, score: f64 },
}
