//! A Population is a collection of organisms, grouped
//! into species, which evolves one replacement at a time
//! using externally reported fitness as the source of
//! selective pressure.
mod config;
mod errors;
pub mod logging;
mod organism;
mod selection;
mod species;

use crate::{Context, Evolvable};
pub use config::PopulationConfig;
pub use errors::PopulationError;
pub use organism::{Organism, OrganismId};
use selection::roulette;
pub use species::{Specie, SpecieId, Species};

use ahash::RandomState;
use rand::Rng;
use tracing::{debug, info};

use std::collections::HashMap;

/// The outcome of a single evolution step.
#[derive(Debug, Clone)]
pub struct Replacement<G> {
    /// The organism evicted from the population.
    pub removed: Organism<G>,
    /// The identifier of the child that took its place.
    pub added: OrganismId,
}

/// A steady-state population of organisms.
///
/// Instead of advancing in generations, the population
/// replaces its least fit eligible organism with a new
/// child each time [`evolve`] is called.
///
/// [`evolve`]: Population::evolve
pub struct Population<G: Evolvable> {
    organisms: Vec<Organism<G>>,
    species: Species<G>,
    context: G::Context,
    config: PopulationConfig,
    next_organism_id: u64,
    replacements: usize,
}

impl<G: Evolvable + Clone> Population<G> {
    /// Creates an empty population using the passed
    /// configuration and evolution context.
    ///
    /// # Examples
    /// ```
    /// use rtneat::{Population, PopulationConfig};
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome};
    ///
    /// let config = PopulationConfig {
    ///     compatibility_threshold: 3.0,
    ///     ..PopulationConfig::zero()
    /// };
    /// let context = EvolutionContext::seeded(GeneticConfig::zero(), 42);
    /// let population = Population::<Genome>::new(config, context);
    ///
    /// assert!(population.organisms().is_empty());
    /// assert!(population.champion().is_none());
    /// ```
    pub fn new(config: PopulationConfig, context: G::Context) -> Population<G> {
        Population {
            organisms: vec![],
            species: Species::new(
                config.compatibility_threshold,
                config.compatibility_step,
                config.min_compatibility_threshold,
            ),
            context,
            config,
            next_organism_id: 0,
            replacements: 0,
        }
    }

    /// Replaces every organism with fresh organisms wrapping
    /// `genomes`, and classifies them into species. Returns
    /// the identifiers of the new organisms, in order.
    ///
    /// Seeding starts a new run: the species pool, its
    /// compatibility threshold and the replacement count are
    /// reset. Organism ids keep counting from the last run.
    ///
    /// # Examples
    /// ```
    /// use rtneat::{Population, PopulationConfig};
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome};
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 42);
    /// let genomes: Vec<_> = (0..10).map(|_| Genome::generate(&mut context, 3, 2)).collect();
    ///
    /// let mut population = Population::<Genome>::new(PopulationConfig::zero(), context);
    /// let ids = population.seed(genomes);
    ///
    /// assert_eq!(ids.len(), 10);
    /// assert!(population.organisms().iter().all(|o| o.specie().is_some()));
    /// ```
    pub fn seed(&mut self, genomes: impl IntoIterator<Item = G>) -> Vec<OrganismId> {
        self.organisms.clear();
        self.species = Species::new(
            self.config.compatibility_threshold,
            self.config.compatibility_step,
            self.config.min_compatibility_threshold,
        );
        self.replacements = 0;
        for genome in genomes {
            let id = self.next_id();
            self.organisms.push(Organism::new(id, genome));
        }
        self.speciate_all();
        self.organisms.iter().map(|o| o.id()).collect()
    }

    /// Records the result of one evaluation cycle of
    /// an organism: its fitness is set to `score`,
    /// and its age is increased.
    ///
    /// # Errors
    /// Fails if no organism has the given id, or if
    /// `score` is not finite.
    pub fn report_fitness(&mut self, id: OrganismId, score: f64) -> Result<(), PopulationError> {
        if !score.is_finite() {
            return Err(PopulationError::InvalidFitness { id, score });
        }
        let organism = self
            .organism_mut(id)
            .ok_or(PopulationError::UnknownOrganism(id))?;
        organism.set_fitness(score);
        organism.grow_older();
        Ok(())
    }

    /// Performs one replacement: the eligible organism with
    /// the lowest adjusted fitness is evicted, and a child bred
    /// from a fitness-selected specie takes its place.
    ///
    /// Returns `None`, leaving the population untouched, if
    /// no organism is old enough to be replaced or if fewer
    /// than two organisms are present.
    ///
    /// # Examples
    /// ```
    /// use rtneat::{Population, PopulationConfig};
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome};
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 42);
    /// let genomes: Vec<_> = (0..3).map(|_| Genome::generate(&mut context, 2, 1)).collect();
    /// let mut population = Population::<Genome>::new(
    ///     PopulationConfig {
    ///         min_eligible_age: 1,
    ///         ..PopulationConfig::zero()
    ///     },
    ///     context,
    /// );
    /// let ids = population.seed(genomes);
    ///
    /// // Nobody was evaluated yet.
    /// assert!(population.evolve().is_none());
    ///
    /// for (i, id) in ids.iter().enumerate() {
    ///     population.report_fitness(*id, i as f64).unwrap();
    /// }
    /// let replacement = population.evolve().unwrap();
    /// assert_eq!(replacement.removed.id(), ids[0]);
    /// assert_eq!(population.organisms().len(), 3);
    /// ```
    pub fn evolve(&mut self) -> Option<Replacement<G>> {
        if self.organisms.len() < 2 {
            return None;
        }
        let min_age = self.config.min_eligible_age;
        if !self.organisms.iter().any(|o| o.age() >= min_age) {
            return None;
        }

        self.update_fitness();
        let worst = self
            .organisms
            .iter()
            .enumerate()
            .filter(|(_, o)| o.age() >= min_age)
            .min_by(|(_, a), (_, b)| a.adjusted_fitness().total_cmp(&b.adjusted_fitness()))
            .map(|(i, _)| i)?;

        let child = self.breed(self.organisms[worst].id())?;

        let mut removed = self.organisms.remove(worst);
        if let Some(specie) = removed.specie().and_then(|id| self.species.get_mut(id)) {
            specie.remove_member(removed.id());
        }
        removed.mark_removed();

        let added = self.next_id();
        self.organisms.push(Organism::new(added, child));
        self.species
            .adjust_compatibility_threshold(self.config.target_species);
        self.speciate_all();
        self.replacements += 1;

        info!(
            replacement = self.replacements,
            removed = %removed.id(),
            removed_fitness = removed.fitness(),
            added = %added,
            species = self.species.len(),
            threshold = self.species.compatibility_threshold(),
            "replaced organism"
        );
        Some(Replacement { removed, added })
    }

    /// Breeds a child from a specie chosen proportionally to the
    /// average fitness of its members, leaving out the organism
    /// about to be evicted.
    fn breed(&mut self, evicted: OrganismId) -> Option<G> {
        let positions = self.positions();
        let candidates: Vec<Vec<&Organism<G>>> = self
            .species
            .iter()
            .map(|s| {
                s.members()
                    .iter()
                    .filter(|id| **id != evicted)
                    .filter_map(|id| positions.get(id).map(|&i| &self.organisms[i]))
                    .collect::<Vec<_>>()
            })
            .filter(|members| !members.is_empty())
            .collect();

        let weights: Vec<f64> = candidates
            .iter()
            .map(|members| members.iter().map(|o| o.fitness()).sum::<f64>() / members.len() as f64)
            .collect();
        let parents = &candidates[roulette(&weights, self.context.rng())?];

        let fitness: Vec<f64> = parents.iter().map(|o| o.fitness()).collect();
        let mother = parents[roulette(&fitness, self.context.rng())?];
        let father = parents[roulette(&fitness, self.context.rng())?];

        let cross_over_rate = self.context.rates().cross_over;
        let mut child = if self.context.rng().gen::<f64>() < cross_over_rate {
            mother.cross_over(father, mother.dominance_over(father), &mut self.context)
        } else {
            mother.genome().clone()
        };
        child.mutate(&mut self.context);
        Some(child)
    }

    /// Recomputes the average fitness of every specie, and
    /// the adjusted fitness of every organism.
    fn update_fitness(&mut self) {
        let positions = self.positions();
        for specie in self.species.iter_mut() {
            let indices: Vec<usize> = specie
                .members()
                .iter()
                .filter_map(|id| positions.get(id).copied())
                .collect();
            if indices.is_empty() {
                specie.set_average_fitness(0.0);
                continue;
            }
            let size = indices.len() as f64;
            let total: f64 = indices.iter().map(|&i| self.organisms[i].fitness()).sum();
            specie.set_average_fitness(total / size);
            for i in indices {
                let organism = &mut self.organisms[i];
                organism.set_adjusted_fitness(organism.fitness() / size);
            }
        }
    }

    /// Empties the species pool and classifies
    /// every organism anew.
    fn speciate_all(&mut self) {
        self.species.clear();
        for organism in &mut self.organisms {
            self.species.add_organism(organism, &self.context);
        }
        debug!(
            organisms = self.organisms.len(),
            species = self.species.len(),
            "reclassified population"
        );
    }

    fn positions(&self) -> HashMap<OrganismId, usize, RandomState> {
        self.organisms
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id(), i))
            .collect()
    }

    fn next_id(&mut self) -> OrganismId {
        let id = OrganismId(self.next_organism_id);
        self.next_organism_id += 1;
        id
    }

    pub fn organism(&self, id: OrganismId) -> Option<&Organism<G>> {
        self.organisms.iter().find(|o| o.id() == id)
    }

    pub fn organism_mut(&mut self, id: OrganismId) -> Option<&mut Organism<G>> {
        self.organisms.iter_mut().find(|o| o.id() == id)
    }

    /// Returns the population's organisms, in order of insertion.
    pub fn organisms(&self) -> &[Organism<G>] {
        &self.organisms
    }

    /// Iterates over the organisms belonging to a specie.
    pub fn members_of(&self, specie: SpecieId) -> impl Iterator<Item = &Organism<G>> {
        self.organisms
            .iter()
            .filter(move |o| o.specie() == Some(specie))
    }

    pub fn species(&self) -> &Species<G> {
        &self.species
    }

    /// Returns the organism with the highest raw
    /// fitness, or `None` for an empty population.
    /// Ties go to the latest inserted organism.
    pub fn champion(&self) -> Option<&Organism<G>> {
        self.organisms
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    /// Returns the number of replacements performed so far.
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    pub fn context(&self) -> &G::Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut G::Context {
        &mut self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{Blob, BlobContext};
    use crate::Rates;

    fn population(positions: &[f64], config: PopulationConfig) -> (Population<Blob>, Vec<OrganismId>) {
        let mut population = Population::new(config, BlobContext::default());
        let ids = population.seed(positions.iter().map(|p| Blob::at(*p)));
        (population, ids)
    }

    fn eligible_from(age: usize) -> PopulationConfig {
        PopulationConfig {
            min_eligible_age: age,
            compatibility_threshold: 1.0,
            compatibility_step: 0.1,
            min_compatibility_threshold: 0.1,
            target_species: 2,
        }
    }

    fn assert_partitioned(population: &Population<Blob>) {
        let mut members: Vec<OrganismId> = population
            .species()
            .iter()
            .flat_map(|s| s.members().iter().copied())
            .collect();
        members.sort();
        let mut ids: Vec<OrganismId> = population.organisms().iter().map(|o| o.id()).collect();
        ids.sort();
        assert_eq!(members, ids);
        for organism in population.organisms() {
            let specie = population.species().get(organism.specie().unwrap()).unwrap();
            assert!(specie.members().contains(&organism.id()));
        }
    }

    #[test]
    fn seeding_classifies_everyone() {
        let (population, ids) = population(&[0.0, 0.5, 10.0, 10.2, 50.0], eligible_from(0));
        assert_eq!(ids, (0..5).map(OrganismId).collect::<Vec<_>>());
        assert_eq!(population.species().len(), 3);
        assert_partitioned(&population);
    }

    #[test]
    fn report_fitness() {
        let (mut population, ids) = population(&[0.0, 1.0], eligible_from(0));
        population.report_fitness(ids[1], 2.5).unwrap();
        population.report_fitness(ids[1], 3.5).unwrap();
        let organism = population.organism(ids[1]).unwrap();
        assert_eq!(organism.fitness(), 3.5);
        assert_eq!(organism.age(), 2);

        assert_eq!(
            population.report_fitness(OrganismId(99), 1.0),
            Err(PopulationError::UnknownOrganism(OrganismId(99)))
        );
        assert!(matches!(
            population.report_fitness(ids[0], f64::NAN),
            Err(PopulationError::InvalidFitness { .. })
        ));
        assert_eq!(population.organism(ids[0]).unwrap().age(), 0);
    }

    #[test]
    fn nothing_to_do_without_eligible_organisms() {
        let (mut population, ids) = population(&[0.0, 0.0, 0.0], eligible_from(2));
        population.report_fitness(ids[0], 1.0).unwrap();
        assert!(population.evolve().is_none());
        assert_eq!(population.replacements(), 0);
        assert_eq!(population.organisms().len(), 3);
    }

    #[test]
    fn nothing_to_do_with_a_lone_organism() {
        let (mut population, ids) = population(&[0.0], eligible_from(0));
        population.report_fitness(ids[0], 1.0).unwrap();
        assert!(population.evolve().is_none());
    }

    #[test]
    fn the_worst_is_replaced() {
        let (mut population, ids) = population(&[0.0; 4], eligible_from(1));
        for (id, fitness) in ids.iter().zip([3.0, 1.0, 4.0, 2.0]) {
            population.report_fitness(*id, fitness).unwrap();
        }
        let replacement = population.evolve().unwrap();

        assert_eq!(replacement.removed.id(), ids[1]);
        assert!(replacement.removed.is_removed());
        assert_eq!(replacement.removed.specie(), None);
        assert_eq!(replacement.added, OrganismId(4));
        assert!(population.organism(ids[1]).is_none());

        let child = population.organism(replacement.added).unwrap();
        assert_eq!(child.age(), 0);
        assert_eq!(child.fitness(), 0.0);
        assert_eq!(population.organisms().len(), 4);
        assert_eq!(population.replacements(), 1);
        assert_partitioned(&population);
    }

    #[test]
    fn worst_is_judged_by_adjusted_fitness() {
        // Three members sharing 3.0 each weigh less than
        // a lone member at 1.5.
        let (mut population, ids) = population(&[0.0, 0.0, 0.0, 100.0], eligible_from(1));
        for (id, fitness) in ids.iter().zip([3.0, 3.0, 3.0, 1.5]) {
            population.report_fitness(*id, fitness).unwrap();
        }
        let replacement = population.evolve().unwrap();
        assert_eq!(replacement.removed.id(), ids[0]);
        assert_eq!(replacement.removed.adjusted_fitness(), 1.0);
    }

    #[test]
    fn young_organisms_are_spared() {
        let (mut population, ids) = population(&[0.0; 3], eligible_from(1));
        population.report_fitness(ids[1], 5.0).unwrap();
        population.report_fitness(ids[2], 6.0).unwrap();
        // ids[0] has the lowest fitness but was never evaluated.
        let replacement = population.evolve().unwrap();
        assert_eq!(replacement.removed.id(), ids[1]);
    }

    #[test]
    fn evicted_organism_is_never_a_parent() {
        let mut context = BlobContext::default();
        context.rates = Rates {
            cross_over: 0.0,
            ..Rates::zero()
        };
        let mut population = Population::new(eligible_from(0), context);
        let ids = population.seed([Blob::at(0.0), Blob::at(0.5)]);
        population.report_fitness(ids[0], 1.0).unwrap();
        population.report_fitness(ids[1], 2.0).unwrap();

        let replacement = population.evolve().unwrap();
        assert_eq!(replacement.removed.id(), ids[0]);
        // No mutation, so the child is a clone of the only parent.
        let child = population.organism(replacement.added).unwrap();
        assert_eq!(child.genome(), &Blob::at(0.5));
    }

    #[test]
    fn breeding_ignores_the_evicted_fitness() {
        use rand::SeedableRng;

        for seed in 0..20 {
            let mut context = BlobContext::default();
            context.rng = rand::rngs::StdRng::seed_from_u64(seed);
            let mut population = Population::new(eligible_from(1), context);
            let ids = population.seed([Blob::at(0.0), Blob::at(10.0), Blob::at(10.2)]);
            population.report_fitness(ids[0], 5.0).unwrap();
            population.report_fitness(ids[2], 0.1).unwrap();

            // Without the evicted organism, the second specie
            // averages zero and is never picked.
            let replacement = population.evolve().unwrap();
            assert_eq!(replacement.removed.id(), ids[2]);
            let child = population.organism(replacement.added).unwrap();
            assert_eq!(child.genome(), &Blob::at(0.0));
        }
    }

    #[test]
    fn seeding_starts_a_new_run() {
        let (mut population, ids) = population(&[0.0; 3], eligible_from(0));
        for id in &ids {
            population.report_fitness(*id, 1.0).unwrap();
        }
        population.evolve().unwrap();
        assert_eq!(population.replacements(), 1);

        let ids = population.seed([Blob::at(0.0), Blob::at(5.0)]);
        assert_eq!(population.replacements(), 0);
        assert_eq!(population.species().compatibility_threshold(), 1.0);
        assert_eq!(population.species().len(), 2);
        assert_eq!(ids, vec![OrganismId(4), OrganismId(5)]);
        assert_partitioned(&population);
    }

    #[test]
    fn threshold_moves_toward_target() {
        let (mut population, ids) = population(&[0.0; 3], eligible_from(0));
        for id in &ids {
            population.report_fitness(*id, 1.0).unwrap();
        }
        population.evolve().unwrap();
        // One specie against a target of two.
        assert!((population.species().compatibility_threshold() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn runs_are_reproducible() {
        let run = || {
            let mut context = BlobContext::default();
            context.rates = Rates {
                mutation: 1.0,
                cross_over: 0.5,
                ..Rates::zero()
            };
            let mut population = Population::new(eligible_from(1), context);
            population.seed((0..8).map(|i| Blob::at(i as f64 * 0.3)));
            let mut trace = vec![];
            for _ in 0..30 {
                let scores: Vec<(OrganismId, f64)> = population
                    .organisms()
                    .iter()
                    .map(|o| (o.id(), -o.genome().position.abs()))
                    .collect();
                for (id, score) in scores {
                    population.report_fitness(id, score).unwrap();
                }
                if let Some(replacement) = population.evolve() {
                    trace.push(replacement.removed.id());
                }
                assert_partitioned(&population);
            }
            trace
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn champion() {
        let (mut population, ids) = population(&[0.0; 3], eligible_from(0));
        population.report_fitness(ids[2], 1.0).unwrap();
        population.report_fitness(ids[0], 7.0).unwrap();
        assert_eq!(population.champion().unwrap().id(), ids[0]);
    }
}
