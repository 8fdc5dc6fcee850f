use super::SpecieId;
use crate::{Dominance, Evolvable};

use std::fmt;

/// Stable organism identifier, unique
/// within a [`Population`].
///
/// [`Population`]: crate::Population
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrganismId(pub u64);

impl fmt::Display for OrganismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An evolvable individual paired with the
/// bookkeeping the population needs: raw and
/// specie-adjusted fitness, age, specie and
/// removal status.
#[derive(Debug, Clone)]
pub struct Organism<G> {
    id: OrganismId,
    genome: G,
    fitness: f64,
    adjusted_fitness: f64,
    age: usize,
    specie: Option<SpecieId>,
    removed: bool,
}

impl<G> Organism<G> {
    /// Wraps `genome` into a fresh organism with
    /// zero fitness and age, and no specie.
    ///
    /// # Examples
    /// ```
    /// use rtneat::{Organism, OrganismId};
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome};
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 0);
    /// let organism = Organism::new(OrganismId(7), Genome::generate(&mut context, 2, 1));
    ///
    /// assert_eq!(organism.id(), OrganismId(7));
    /// assert_eq!(organism.fitness(), 0.0);
    /// assert_eq!(organism.age(), 0);
    /// assert!(organism.specie().is_none());
    /// ```
    pub fn new(id: OrganismId, genome: G) -> Organism<G> {
        Organism {
            id,
            genome,
            fitness: 0.0,
            adjusted_fitness: 0.0,
            age: 0,
            specie: None,
            removed: false,
        }
    }

    pub fn id(&self) -> OrganismId {
        self.id
    }

    pub fn genome(&self) -> &G {
        &self.genome
    }

    pub fn genome_mut(&mut self) -> &mut G {
        &mut self.genome
    }

    /// Returns the organism's raw fitness.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Returns the organism's fitness divided by the
    /// size of its specie, as of the last evolution step.
    pub fn adjusted_fitness(&self) -> f64 {
        self.adjusted_fitness
    }

    pub(crate) fn set_adjusted_fitness(&mut self, adjusted_fitness: f64) {
        self.adjusted_fitness = adjusted_fitness;
    }

    /// Returns the number of evaluation cycles
    /// the organism has gone through.
    pub fn age(&self) -> usize {
        self.age
    }

    pub fn set_age(&mut self, age: usize) {
        self.age = age;
    }

    /// Counts one more evaluation cycle.
    pub fn grow_older(&mut self) {
        self.age += 1;
    }

    pub fn specie(&self) -> Option<SpecieId> {
        self.specie
    }

    pub(crate) fn set_specie(&mut self, specie: Option<SpecieId>) {
        self.specie = specie;
    }

    /// Returns whether the organism was evicted
    /// from its population.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub(crate) fn mark_removed(&mut self) {
        self.removed = true;
        self.specie = None;
    }

    /// Returns how `self` compares to `other` in terms
    /// of raw fitness.
    pub fn dominance_over(&self, other: &Organism<G>) -> Dominance {
        Dominance::from_fitness(self.fitness, other.fitness)
    }
}

impl<G: Evolvable> Organism<G> {
    /// Crosses the organisms' genomes over, returning
    /// the child genome. Excess and disjoint genetic
    /// material is inherited from the dominant parent,
    /// or from both on [`Dominance::Equal`].
    ///
    /// # Examples
    /// ```
    /// use rtneat::{Dominance, Organism, OrganismId};
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome};
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 0);
    /// let mut genome = Genome::generate(&mut context, 1, 1);
    /// let innovation = genome.add_connection(&mut context, 0, 1, None).unwrap();
    ///
    /// let mut mother = Organism::new(OrganismId(0), genome.clone());
    /// let mut father = Organism::new(OrganismId(1), genome);
    /// mother.genome_mut().connection_mut(innovation).unwrap().set_weight(1.0);
    /// father.genome_mut().connection_mut(innovation).unwrap().set_weight(3.0);
    ///
    /// let child = mother.cross_over(&father, Dominance::Equal, &mut context);
    /// assert_eq!(child.connections()[0].weight(), 2.0);
    /// ```
    pub fn cross_over(
        &self,
        other: &Organism<G>,
        dominance: Dominance,
        context: &mut G::Context,
    ) -> G {
        self.genome.cross_over(&other.genome, dominance, context)
    }

    /// Mutates the organism's genome.
    pub fn mutate(&mut self, context: &mut G::Context) {
        self.genome.mutate(context);
    }

    /// Returns the genetic distance to `other`, if
    /// the representation defines one.
    pub fn distance(&self, other: &Organism<G>, context: &G::Context) -> Option<f64> {
        self.genome.distance(&other.genome, context)
    }
}
