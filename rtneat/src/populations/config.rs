use serde::{Deserialize, Serialize};

/// Configuration data for steady-state
/// population evolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Evaluation cycles an organism must go through
    /// before it can be selected for replacement.
    pub min_eligible_age: usize,
    /// Initial genetic distance threshold, beyond which
    /// genomes are considered as belonging to
    /// different species.
    pub compatibility_threshold: f64,
    /// Amount by which the threshold is nudged
    /// after each replacement.
    pub compatibility_step: f64,
    /// Floor below which the threshold is never nudged.
    pub min_compatibility_threshold: f64,
    /// Desired amount of species in the population.
    pub target_species: usize,
}

impl PopulationConfig {
    /// Returns a "zero-valued" default configuration.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use rtneat::PopulationConfig;
    ///
    /// let config = PopulationConfig {
    ///     compatibility_threshold: 3.0,
    ///     target_species: 4,
    ///     ..PopulationConfig::zero()
    /// };
    /// assert_eq!(config.min_eligible_age, 0);
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            min_eligible_age: 0,
            compatibility_threshold: 0.0,
            compatibility_step: 0.0,
            min_compatibility_threshold: 0.0,
            target_species: 0,
        }
    }
}
