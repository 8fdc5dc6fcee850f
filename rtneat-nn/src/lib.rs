//! # rtneat-nn
//! A neural network genome for the [`rtneat`] crate's
//! [`Evolvable`](rtneat::Evolvable) trait.
//!
//! Provides a [`Genome`] type whose topology grows through
//! connection and node mutations, tracked across a run by the
//! [`EvolutionContext`]'s innovation numbers so that genomes
//! can be aligned for crossover and speciation. Genomes are
//! compiled into a [`PhenotypeNetwork`] for evaluation, with
//! recurrent links carrying values from one activation to
//! the next.
//!
//! [`Genome`]: crate::genomics::Genome
//! [`EvolutionContext`]: crate::genomics::EvolutionContext
//! [`PhenotypeNetwork`]: crate::networks::PhenotypeNetwork
//!
//! # Example usage: growing and evaluating a network by hand
//! ```
//! use rtneat::Rates;
//! use rtneat_nn::{
//!     genomics::{EvolutionContext, GeneticConfig, Genome},
//!     networks::PhenotypeNetwork,
//! };
//!
//! let mut context = EvolutionContext::seeded(
//!     GeneticConfig {
//!         weight_bound: 3.0,
//!         weight_mutation_power: 0.5,
//!         max_split_depth: 4,
//!         bias: true,
//!         rates: Rates {
//!             mutation: 0.8,
//!             mutation_connect: 0.2,
//!             mutation_split_connect: 0.05,
//!             ..Rates::zero()
//!         },
//!         ..GeneticConfig::zero()
//!     },
//!     1,
//! );
//! let mut genome = Genome::generate(&mut context, 2, 1);
//! for _ in 0..100 {
//!     genome.mutate(&mut context);
//! }
//! assert!(genome.is_recurrence_consistent());
//!
//! let mut network = PhenotypeNetwork::from(&genome);
//! let output = network.feed_forward(&[0.5, -0.5]).unwrap();
//! assert_eq!(output.len(), 1);
//! assert!(output[0].abs() <= 1.0);
//! ```

pub mod genomics;
pub mod networks;

/// Identifier type used to designate historically
/// identical mutations for the purposes of
/// genome comparison and genetic tracking.
pub type Innovation = usize;

/// Identifier type of the nodes of a genome.
pub type NodeId = usize;
