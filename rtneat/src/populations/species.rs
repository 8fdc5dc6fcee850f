use super::{Organism, OrganismId};
use crate::Evolvable;

use tracing::trace;

use std::fmt;

/// Specie identifier. Identifiers are handed
/// out in creation order and never reused by
/// the same [`Species`] pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecieId(pub usize);

impl fmt::Display for SpecieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// A specie is a cluster of organisms whose genomes
/// are within the compatibility threshold of a
/// _reference_ genome, namely that of the first
/// organism to join it.
#[derive(Debug, Clone)]
pub struct Specie<G> {
    id: SpecieId,
    reference: G,
    members: Vec<OrganismId>,
    average_fitness: f64,
}

impl<G: Evolvable + Clone> Specie<G> {
    /// Creates an empty specie whose compatibility
    /// tests are made against `reference`.
    pub fn new(id: SpecieId, reference: G) -> Specie<G> {
        Specie {
            id,
            reference,
            members: vec![],
            average_fitness: 0.0,
        }
    }

    pub fn id(&self) -> SpecieId {
        self.id
    }

    /// Returns the reference genome used
    /// for compatibility tests.
    pub fn reference(&self) -> &G {
        &self.reference
    }

    /// Returns the identifiers of the specie's members,
    /// in order of arrival.
    pub fn members(&self) -> &[OrganismId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the mean raw fitness of the members,
    /// as of the last fitness update.
    pub fn average_fitness(&self) -> f64 {
        self.average_fitness
    }

    pub(crate) fn set_average_fitness(&mut self, average_fitness: f64) {
        self.average_fitness = average_fitness;
    }

    /// Returns whether `genome` is closer to the reference
    /// than `threshold`. Representations without a distance
    /// metric are compatible with every specie.
    pub fn is_compatible(&self, genome: &G, threshold: f64, context: &G::Context) -> bool {
        self.reference
            .distance(genome, context)
            .map_or(true, |distance| distance < threshold)
    }

    /// Adds the organism to the specie and tags it
    /// with the specie's id.
    pub fn add_member(&mut self, organism: &mut Organism<G>) {
        organism.set_specie(Some(self.id));
        self.members.push(organism.id());
    }

    /// Removes a member, returning whether it was present.
    pub fn remove_member(&mut self, id: OrganismId) -> bool {
        match self.members.iter().position(|m| *m == id) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }
}

/// The pool of all species of a population, along with
/// the adaptive compatibility threshold that decides
/// specie membership.
#[derive(Debug, Clone)]
pub struct Species<G> {
    species: Vec<Specie<G>>,
    compatibility_threshold: f64,
    threshold_step: f64,
    min_threshold: f64,
    next_id: usize,
}

impl<G: Evolvable + Clone> Species<G> {
    /// Creates an empty pool.
    ///
    /// # Examples
    /// ```
    /// use rtneat::Species;
    /// use rtneat_nn::genomics::Genome;
    ///
    /// let species = Species::<Genome>::new(3.0, 0.1, 0.3);
    /// assert!(species.is_empty());
    /// assert_eq!(species.compatibility_threshold(), 3.0);
    /// ```
    pub fn new(compatibility_threshold: f64, threshold_step: f64, min_threshold: f64) -> Species<G> {
        Species {
            species: vec![],
            compatibility_threshold: compatibility_threshold.max(min_threshold),
            threshold_step,
            min_threshold,
            next_id: 0,
        }
    }

    pub fn compatibility_threshold(&self) -> f64 {
        self.compatibility_threshold
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specie<G>> {
        self.species.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Specie<G>> {
        self.species.iter_mut()
    }

    pub fn get(&self, id: SpecieId) -> Option<&Specie<G>> {
        self.species.iter().find(|s| s.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: SpecieId) -> Option<&mut Specie<G>> {
        self.species.iter_mut().find(|s| s.id() == id)
    }

    /// Places the organism in the first compatible specie,
    /// or in a new specie appended to the pool if none is.
    /// Returns the id of the specie the organism joined.
    ///
    /// # Examples
    /// ```
    /// use rtneat::{Organism, OrganismId, Species};
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome};
    ///
    /// let config = GeneticConfig {
    ///     excess_gene_factor: 1.0,
    ///     disjoint_gene_factor: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut context = EvolutionContext::seeded(config, 0);
    /// let genome = Genome::generate(&mut context, 2, 1);
    /// let mut first = Organism::new(OrganismId(0), genome.clone());
    /// let mut second = Organism::new(OrganismId(1), genome.clone());
    ///
    /// let mut species = Species::new(0.5, 0.1, 0.1);
    /// let s1 = species.add_organism(&mut first, &context);
    /// let s2 = species.add_organism(&mut second, &context);
    ///
    /// // Identical genomes share a specie.
    /// assert_eq!(s1, s2);
    /// assert_eq!(species.len(), 1);
    /// assert_eq!(second.specie(), Some(s1));
    ///
    /// // Genomes sharing no connections are kept apart.
    /// let mut left = genome.clone();
    /// left.connect(&mut context, 0, 2).unwrap();
    /// let mut right = genome;
    /// right.connect(&mut context, 1, 2).unwrap();
    /// let mut third = Organism::new(OrganismId(2), left);
    /// let mut fourth = Organism::new(OrganismId(3), right);
    /// let s3 = species.add_organism(&mut third, &context);
    /// let s4 = species.add_organism(&mut fourth, &context);
    /// assert_ne!(s3, s1);
    /// assert_ne!(s4, s1);
    /// assert_ne!(s3, s4);
    /// assert_eq!(species.len(), 3);
    /// ```
    pub fn add_organism(&mut self, organism: &mut Organism<G>, context: &G::Context) -> SpecieId {
        for specie in &mut self.species {
            if specie.is_compatible(organism.genome(), self.compatibility_threshold, context) {
                specie.add_member(organism);
                return specie.id();
            }
        }

        let id = SpecieId(self.next_id);
        self.next_id += 1;
        let mut specie = Specie::new(id, organism.genome().clone());
        specie.add_member(organism);
        self.species.push(specie);
        trace!(specie = %id, organism = %organism.id(), "created specie");
        id
    }

    /// Nudges the compatibility threshold toward producing
    /// `target` species: fewer species than targeted lower
    /// the threshold by one step, more raise it. The
    /// threshold never drops below its configured minimum.
    ///
    /// # Examples
    /// ```
    /// use rtneat::Species;
    /// use rtneat_nn::genomics::Genome;
    ///
    /// let mut species = Species::<Genome>::new(3.0, 0.5, 1.0);
    /// // No species yet, so fewer than targeted.
    /// species.adjust_compatibility_threshold(4);
    /// assert_eq!(species.compatibility_threshold(), 2.5);
    /// ```
    pub fn adjust_compatibility_threshold(&mut self, target: usize) {
        let count = self.species.len();
        if count < target {
            self.compatibility_threshold -= self.threshold_step;
        } else if count > target {
            self.compatibility_threshold += self.threshold_step;
        }
        self.compatibility_threshold = self.compatibility_threshold.max(self.min_threshold);
    }

    /// Removes every specie. Identifiers keep counting
    /// from where they were.
    pub fn clear(&mut self) {
        self.species.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{Blob, BlobContext};

    fn organism(id: u64, position: f64) -> Organism<Blob> {
        Organism::new(OrganismId(id), Blob::at(position))
    }

    fn pool_with(count: usize, threshold: f64) -> Species<Blob> {
        let context = BlobContext::default();
        let mut species = Species::new(threshold, 0.5, 0.5);
        for i in 0..count {
            species.add_organism(&mut organism(i as u64, i as f64 * 100.0), &context);
        }
        species
    }

    #[test]
    fn identical_genomes_share_a_specie() {
        let context = BlobContext::default();
        let mut species = Species::new(0.001, 0.1, 0.0);
        let mut a = organism(0, 1.0);
        let mut b = organism(1, 1.0);
        assert_eq!(
            species.add_organism(&mut a, &context),
            species.add_organism(&mut b, &context)
        );
        assert_eq!(species.len(), 1);
        assert_eq!(species.iter().next().unwrap().members(), &[OrganismId(0), OrganismId(1)]);
    }

    #[test]
    fn distant_genomes_are_separated() {
        let context = BlobContext::default();
        let mut species = Species::new(1.0, 0.1, 0.0);
        let mut a = organism(0, 0.0);
        let mut b = organism(1, 10.0);
        let sa = species.add_organism(&mut a, &context);
        let sb = species.add_organism(&mut b, &context);
        assert_ne!(sa, sb);
        assert_eq!(a.specie(), Some(sa));
        assert_eq!(b.specie(), Some(sb));
    }

    #[test]
    fn first_compatible_specie_wins() {
        let context = BlobContext::default();
        let mut species = Species::new(2.0, 0.1, 0.0);
        let sa = species.add_organism(&mut organism(0, 0.0), &context);
        let sb = species.add_organism(&mut organism(1, 3.0), &context);
        // Compatible with both references.
        let sc = species.add_organism(&mut organism(2, 1.5), &context);
        assert_ne!(sa, sb);
        assert_eq!(sc, sa);
    }

    #[test]
    fn threshold_rises_with_too_many_species() {
        let mut species = pool_with(5, 3.0);
        assert_eq!(species.len(), 5);
        species.adjust_compatibility_threshold(4);
        assert_eq!(species.compatibility_threshold(), 3.5);
    }

    #[test]
    fn threshold_drops_with_too_few_species() {
        let mut species = pool_with(3, 3.0);
        species.adjust_compatibility_threshold(4);
        assert_eq!(species.compatibility_threshold(), 2.5);
    }

    #[test]
    fn threshold_holds_on_target() {
        let mut species = pool_with(4, 3.0);
        species.adjust_compatibility_threshold(4);
        assert_eq!(species.compatibility_threshold(), 3.0);
    }

    #[test]
    fn threshold_is_floored() {
        let mut species = pool_with(1, 0.7);
        species.adjust_compatibility_threshold(4);
        assert_eq!(species.compatibility_threshold(), 0.5);
        species.adjust_compatibility_threshold(4);
        assert_eq!(species.compatibility_threshold(), 0.5);
    }

    #[test]
    fn clear_keeps_counting_ids() {
        let context = BlobContext::default();
        let mut species = pool_with(2, 1.0);
        species.clear();
        assert!(species.is_empty());
        let id = species.add_organism(&mut organism(9, 0.0), &context);
        assert_eq!(id, SpecieId(2));
    }

    #[test]
    fn remove_member() {
        let context = BlobContext::default();
        let mut specie = Specie::new(SpecieId(0), Blob::at(0.0));
        let mut a = organism(0, 0.0);
        specie.add_member(&mut a);
        assert!(specie.is_compatible(&Blob::at(0.5), 1.0, &context));
        assert!(specie.remove_member(OrganismId(0)));
        assert!(!specie.remove_member(OrganismId(0)));
        assert!(specie.is_empty());
    }
}
