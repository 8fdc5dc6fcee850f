use super::GeneticConfig;
use crate::{Innovation, NodeId};

use rand::Rng;

use std::fmt;

/// Connection genes are created between two nodes,
/// and become network links in the genome's phenotype.
///
/// A connection is _recurrent_ when its output node does
/// not sit on a later layer than its input node; such
/// connections carry the previous activation of their
/// input in the phenotype.
#[derive(Clone, PartialEq, Debug)]
pub struct ConnectionGene {
    innovation: Innovation,
    input: NodeId,
    output: NodeId,
    weight: f64,
    enabled: bool,
    recurrent: bool,
}

impl ConnectionGene {
    /// Returns a new _enabled_ connection with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::genomics::ConnectionGene;
    ///
    /// let connection = ConnectionGene::new(42, 3, 9, 2.0, false);
    /// assert!(connection.enabled());
    /// ```
    pub fn new(
        innovation: Innovation,
        input: NodeId,
        output: NodeId,
        weight: f64,
        recurrent: bool,
    ) -> ConnectionGene {
        ConnectionGene {
            innovation,
            input,
            output,
            weight,
            enabled: true,
            recurrent,
        }
    }

    /// Returns a random weight, uniform over
    /// the range ±[`weight_bound`].
    ///
    /// [`weight_bound`]: crate::genomics::GeneticConfig::weight_bound
    pub(crate) fn random_weight(config: &GeneticConfig, rng: &mut impl Rng) -> f64 {
        if config.weight_bound > 0.0 {
            rng.gen_range(-config.weight_bound..=config.weight_bound)
        } else {
            0.0
        }
    }

    /// Nudges the connection's weight by a random amount. Uses
    /// a uniform distribution over the range ±[`weight_mutation_power`].
    /// If the weight's magnitude would exceed the [`weight_bound`],
    /// the weight is set to the maximum magnitude with the same
    /// sign.
    ///
    /// [`weight_mutation_power`]: crate::genomics::GeneticConfig::weight_mutation_power
    /// [`weight_bound`]: crate::genomics::GeneticConfig::weight_bound
    pub(crate) fn nudge_weight(&mut self, config: &GeneticConfig, rng: &mut impl Rng) {
        if config.weight_mutation_power > 0.0 {
            self.weight +=
                rng.gen_range(-config.weight_mutation_power..=config.weight_mutation_power);
        }
        let bound = config.weight_bound.max(0.0);
        self.weight = self.weight.clamp(-bound, bound);
    }

    pub fn innovation(&self) -> Innovation {
        self.innovation
    }

    /// Returns the id of the node the connection starts at.
    pub fn input(&self) -> NodeId {
        self.input
    }

    /// Returns the id of the node the connection ends at.
    pub fn output(&self) -> NodeId {
        self.output
    }

    /// Returns the connection's input and output node ids.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.input, self.output)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Returns whether the connection is expressed in the phenotype.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn recurrent(&self) -> bool {
        self.recurrent
    }

    pub(crate) fn set_recurrent(&mut self, recurrent: bool) {
        self.recurrent = recurrent;
    }
}

impl fmt::Display for ConnectionGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} -{}-> {} ({:+.3})",
            self.innovation,
            self.input,
            if self.recurrent { "r" } else { "" },
            self.output,
            self.weight,
        )?;
        if !self.enabled {
            write!(f, " off")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config(weight_bound: f64, weight_mutation_power: f64) -> GeneticConfig {
        GeneticConfig {
            weight_bound,
            weight_mutation_power,
            ..GeneticConfig::zero()
        }
    }

    #[test]
    fn random_weight_within_bound() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = config(2.0, 0.0);
        for _ in 0..1000 {
            assert!(ConnectionGene::random_weight(&config, &mut rng).abs() <= 2.0);
        }
    }

    #[test]
    fn random_weight_without_bound() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(ConnectionGene::random_weight(&GeneticConfig::zero(), &mut rng), 0.0);
    }

    #[test]
    fn nudged_weight_is_clamped() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = config(1.0, 0.5);
        let mut connection = ConnectionGene::new(0, 0, 1, 0.9, false);
        for _ in 0..1000 {
            let before = connection.weight();
            connection.nudge_weight(&config, &mut rng);
            assert!(connection.weight().abs() <= 1.0);
            assert!((connection.weight() - before).abs() <= 0.5 + 1e-12);
        }
    }

    #[test]
    fn display() {
        let mut connection = ConnectionGene::new(3, 1, 4, 0.5, true);
        connection.set_enabled(false);
        assert_eq!(connection.to_string(), "[3] 1 -r-> 4 (+0.500) off");
    }
}
