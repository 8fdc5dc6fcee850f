use rand::Rng;
use serde::{Deserialize, Serialize};

use std::cmp::Ordering;

/// Relative fitness of the two parents taking part
/// in a crossover, seen from the parent on which
/// the crossover is called.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dominance {
    /// The current parent is fitter.
    CurrentBetter,
    /// Both parents are equally fit.
    Equal,
    /// The other parent is fitter.
    OtherBetter,
}

impl Dominance {
    /// Derives the dominance relation from the
    /// parents' raw fitnesses.
    ///
    /// # Examples
    /// ```
    /// use rtneat::Dominance;
    ///
    /// assert_eq!(Dominance::from_fitness(2.0, 1.0), Dominance::CurrentBetter);
    /// assert_eq!(Dominance::from_fitness(1.0, 1.0), Dominance::Equal);
    /// assert_eq!(Dominance::from_fitness(0.5, 1.0), Dominance::OtherBetter);
    /// ```
    pub fn from_fitness(current: f64, other: f64) -> Dominance {
        match current.partial_cmp(&other) {
            Some(Ordering::Greater) => Dominance::CurrentBetter,
            Some(Ordering::Less) => Dominance::OtherBetter,
            _ => Dominance::Equal,
        }
    }
}

/// Probabilities driving reproduction.
///
/// # Note
/// All quantities should be in the range [0.0, 1.0].
/// Using values outside of it will not fail, but will
/// saturate the corresponding behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    /// Chance of perturbing a connection weight.
    pub mutation: f64,
    /// Chance that a child is bred by crossover
    /// instead of cloning a single parent.
    pub cross_over: f64,
    /// Chance of toggling a connection's enabled flag.
    pub mutation_activation: f64,
    /// Chance of adding a connection.
    pub mutation_connect: f64,
    /// Chance that a would-be recurrent connection
    /// is kept as such instead of being flipped.
    pub mutation_allow_recurrent: f64,
    /// Chance of splitting a connection with a new node.
    pub mutation_split_connect: f64,
}

impl Rates {
    /// Returns rates that disable every behaviour.
    ///
    /// # Examples
    /// ```
    /// use rtneat::Rates;
    ///
    /// let rates = Rates {
    ///     mutation_connect: 0.1,
    ///     ..Rates::zero()
    /// };
    /// assert_eq!(rates.cross_over, 0.0);
    /// ```
    pub const fn zero() -> Rates {
        Rates {
            mutation: 0.0,
            cross_over: 0.0,
            mutation_activation: 0.0,
            mutation_connect: 0.0,
            mutation_allow_recurrent: 0.0,
            mutation_split_connect: 0.0,
        }
    }
}

/// Run-wide state shared by every individual
/// of a population: the random source and the
/// reproduction rates. Representations extend
/// it with whatever bookkeeping they need
/// (e.g. innovation counters).
pub trait Context {
    type Rng: Rng;

    /// Returns the run's single random source.
    fn rng(&mut self) -> &mut Self::Rng;

    /// Returns the run's reproduction rates.
    fn rates(&self) -> &Rates;
}

/// An interface for genetic representations
/// that can be evolved by a [`Population`].
///
/// [`Population`]: crate::Population
pub trait Evolvable: Sized {
    type Context: Context;

    /// Combines `self` with `other` and returns the child.
    fn cross_over(&self, other: &Self, dominance: Dominance, context: &mut Self::Context) -> Self;

    /// Mutates `self` in place. Mutations that find
    /// nothing to act on must leave `self` unchanged.
    fn mutate(&mut self, context: &mut Self::Context);

    /// Returns the genetic distance between two individuals,
    /// or `None` if the representation has no such metric.
    fn distance(&self, other: &Self, context: &Self::Context) -> Option<f64>;
}
