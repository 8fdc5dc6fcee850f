//! A real-time (steady-state) implementation of NeuroEvolution
//! of Augmenting Topologies, following the rtNEAT variant of the
//! algorithm: instead of replacing whole generations, the
//! population continuously replaces its weakest organism with
//! a child bred from a fitness-selected specie.
//!
//! The engine is agnostic of the genetic representation, which
//! only needs to implement the [`Evolvable`] trait. A neural
//! network representation, as in the original algorithm, is
//! supplied via the `rtneat-nn` crate.
//!
//! # Example usage: real-time evolution of a XOR approximator, using `rtneat-nn`
//! ```
//! use rtneat::{Population, PopulationConfig, Rates};
//! use rtneat_nn::{
//!     genomics::{EvolutionContext, GeneticConfig, Genome},
//!     networks::PhenotypeNetwork,
//! };
//!
//! fn evaluate_xor(genome: &Genome) -> f64 {
//!     let mut network = PhenotypeNetwork::from(genome);
//!     let cases = [
//!         ([0.0, 0.0], 0.0),
//!         ([0.0, 1.0], 1.0),
//!         ([1.0, 0.0], 1.0),
//!         ([1.0, 1.0], 0.0),
//!     ];
//!
//!     let mut error = 0.0;
//!     for (input, expected) in cases {
//!         network.reset();
//!         let output = network.feed_forward(&input).unwrap_or_else(|_| vec![0.0]);
//!         error += (output[0] - expected).abs();
//!     }
//!     (4.0 - error).max(0.0).powi(2)
//! }
//!
//! let genetic_config = GeneticConfig {
//!     weight_bound: 5.0,
//!     weight_mutation_power: 2.5,
//!     excess_gene_factor: 1.0,
//!     disjoint_gene_factor: 1.0,
//!     common_weight_factor: 0.4,
//!     reactivation_chance: 0.25,
//!     max_split_depth: 4,
//!     bias: true,
//!     rates: Rates {
//!         mutation: 0.8,
//!         cross_over: 0.6,
//!         mutation_activation: 0.01,
//!         mutation_connect: 0.1,
//!         mutation_allow_recurrent: 0.0,
//!         mutation_split_connect: 0.03,
//!     },
//! };
//! let population_config = PopulationConfig {
//!     min_eligible_age: 2,
//!     compatibility_threshold: 3.0,
//!     compatibility_step: 0.1,
//!     min_compatibility_threshold: 0.3,
//!     target_species: 4,
//! };
//!
//! let mut context = EvolutionContext::seeded(genetic_config, 7);
//! let genomes: Vec<Genome> = (0..50)
//!     .map(|_| Genome::generate(&mut context, 2, 1))
//!     .collect();
//! let mut population = Population::<Genome>::new(population_config, context);
//! population.seed(genomes);
//!
//! for _ in 0..200 {
//!     let scores: Vec<_> = population
//!         .organisms()
//!         .iter()
//!         .map(|o| (o.id(), evaluate_xor(o.genome())))
//!         .collect();
//!     for (id, score) in scores {
//!         population.report_fitness(id, score).unwrap();
//!     }
//!     population.evolve();
//! }
//!
//! assert_eq!(population.organisms().len(), 50);
//! assert!(population.replacements() > 0);
//! ```

mod evolvable;
mod populations;

pub use evolvable::*;
pub use populations::*;

#[cfg(test)]
mod tests {
    //! A one-dimensional representation for exercising
    //! the engine without a neural network genome.
    use super::*;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// A point on the real line.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Blob {
        pub position: f64,
    }

    impl Blob {
        pub fn at(position: f64) -> Blob {
            Blob { position }
        }
    }

    pub struct BlobContext {
        pub rng: StdRng,
        pub rates: Rates,
    }

    impl Default for BlobContext {
        fn default() -> Self {
            BlobContext {
                rng: StdRng::seed_from_u64(0),
                rates: Rates::zero(),
            }
        }
    }

    impl Context for BlobContext {
        type Rng = StdRng;

        fn rng(&mut self) -> &mut StdRng {
            &mut self.rng
        }

        fn rates(&self) -> &Rates {
            &self.rates
        }
    }

    impl Evolvable for Blob {
        type Context = BlobContext;

        fn cross_over(&self, other: &Blob, dominance: Dominance, _: &mut BlobContext) -> Blob {
            match dominance {
                Dominance::CurrentBetter => self.clone(),
                Dominance::OtherBetter => other.clone(),
                Dominance::Equal => Blob::at((self.position + other.position) / 2.0),
            }
        }

        fn mutate(&mut self, context: &mut BlobContext) {
            if context.rng.gen::<f64>() < context.rates.mutation {
                self.position += context.rng.gen_range(-1.0..1.0);
            }
        }

        fn distance(&self, other: &Blob, _: &BlobContext) -> Option<f64> {
            Some((self.position - other.position).abs())
        }
    }

    /// A representation without a distance metric.
    impl Evolvable for () {
        type Context = BlobContext;

        fn cross_over(&self, _: &(), _: Dominance, _: &mut BlobContext) {}

        fn mutate(&mut self, _: &mut BlobContext) {}

        fn distance(&self, _: &(), _: &BlobContext) -> Option<f64> {
            None
        }
    }

    #[test]
    fn formless_genomes_share_one_specie() {
        let mut population = Population::<()>::new(
            PopulationConfig {
                compatibility_threshold: 0.0,
                ..PopulationConfig::zero()
            },
            BlobContext::default(),
        );
        population.seed(vec![(); 5]);
        assert_eq!(population.species().len(), 1);
    }
}
