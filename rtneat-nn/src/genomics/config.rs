use rtneat::Rates;
use serde::{Deserialize, Serialize};

/// Configuration data for genome generation
/// and inter-genome operations.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]. Using
/// values that are not in this bound may result
/// in odd behaviours and/or incorrect programs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Maximum magnitude of a connection's weight.
    /// New connections get a uniform random weight
    /// within ±this bound.
    pub weight_bound: f64,
    /// Magnitude of bound on weight mutation uniform distribution.
    /// It is assumed to be lesser than [`weight_bound`]
    ///
    /// [`weight_bound`]: GeneticConfig::weight_bound
    pub weight_mutation_power: f64,
    /// Weight of excess genes in genetic distance.
    pub excess_gene_factor: f64,
    /// Weight of disjoint genes in genetic distance.
    pub disjoint_gene_factor: f64,
    /// Weight of the common gene weight average in genetic distance.
    pub common_weight_factor: f64,
    /// Chance a connection is enabled in a child if it
    /// was disabled in either parent.
    pub reactivation_chance: f64,
    /// Connections whose input node sits on this hidden
    /// layer or deeper are never split.
    pub max_split_depth: i64,
    /// Whether generated genomes carry a bias node.
    pub bias: bool,
    /// Probabilities driving reproduction.
    pub rates: Rates,
}

impl GeneticConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0 or `false`.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to fill in unused values during
    /// configuration instantiation.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::genomics::GeneticConfig;
    ///
    /// let config = GeneticConfig {
    ///     // Specify some values here...
    ///     weight_bound: 5.0,
    ///     reactivation_chance: 0.25,
    ///     // Default the rest...
    ///     ..GeneticConfig::zero()
    /// };
    /// assert!(!config.bias);
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            weight_bound: 0.0,
            weight_mutation_power: 0.0,
            excess_gene_factor: 0.0,
            disjoint_gene_factor: 0.0,
            common_weight_factor: 0.0,
            reactivation_chance: 0.0,
            max_split_depth: 0,
            bias: false,
            rates: Rates::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip() {
        let config = GeneticConfig {
            weight_bound: 5.0,
            weight_mutation_power: 2.5,
            excess_gene_factor: 1.0,
            disjoint_gene_factor: 1.0,
            common_weight_factor: 0.4,
            reactivation_chance: 0.25,
            max_split_depth: 6,
            bias: true,
            rates: Rates {
                mutation: 0.8,
                mutation_connect: 0.1,
                ..Rates::zero()
            },
        };
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<GeneticConfig>(&text).unwrap(), config);
    }
}
