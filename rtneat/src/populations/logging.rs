use super::{Organism, Population, SpecieId};

use crate::Evolvable;

use std::cmp::Ordering;
use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportingLevel {
    /// Clones the entire population.
    AllOrganisms,
    /// Clones the fittest organism of each specie.
    SpeciesChampions,
    /// Clones only the population champion.
    PopulationChampion,
    /// Clones no organisms.
    NoOrganisms,
}

/// A snapshot of a population.
#[derive(Clone, Debug)]
pub struct Log<G> {
    pub replacement_number: usize,
    pub species_count: usize,
    pub compatibility_threshold: f64,
    pub sample: OrganismRecord<G>,
    pub organism_stats: Vec<(String, Stats)>,
}

impl<G> fmt::Display for Log<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Log {{")?;
        writeln!(f, "\treplacement_number: {}", self.replacement_number)?;
        writeln!(f, "\tspecies_count: {}", self.species_count)?;
        writeln!(f, "\tcompatibility_threshold: {}", self.compatibility_threshold)?;
        for (name, stats) in &self.organism_stats {
            writeln!(f, "\t{}: {:?}", name, stats)?;
        }
        write!(f, "}}")
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    /// Returns statistics about numbers in a sequence,
    /// or `None` if the sequence is empty.
    ///
    /// # Examples
    /// ```
    /// use rtneat::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied()).unwrap();
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    ///
    /// assert!(Stats::from(std::iter::empty()).is_none());
    /// ```
    pub fn from(data: impl Iterator<Item = f64>) -> Option<Stats> {
        let mut data: Vec<f64> = data.collect();
        if data.is_empty() {
            return None;
        }
        data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        let (max, min, sum) = data.iter().fold(
            (f64::MIN, f64::MAX, 0.0),
            |(max, min, sum), d| (d.max(max), d.min(min), sum + d),
        );

        Some(Stats {
            maximum: max,
            minimum: min,
            mean: sum / data.len() as f64,
            median,
        })
    }
}

/// A reporting-level dependant store
/// of organisms from a population.
#[derive(Clone, Debug)]
pub enum OrganismRecord<G> {
    /// Specie ids and all their members.
    Species(Vec<(SpecieId, Vec<Organism<G>>)>),
    /// Specie ids and their fittest members.
    SpeciesChampions(Vec<(SpecieId, Organism<G>)>),
    /// Only the population champion.
    PopulationChampion(Organism<G>),
    /// Empty.
    None,
}

/// A log of the evolution of a population over time.
#[derive(Clone, Debug)]
pub struct EvolutionLogger<G> {
    reporting_level: ReportingLevel,
    logs: Vec<Log<G>>,
}

impl<G: Evolvable + Clone> EvolutionLogger<G> {
    /// Returns a logger with the appropiate reporting level.
    ///
    /// # Examples
    /// ```
    /// use rtneat::logging::{EvolutionLogger, ReportingLevel};
    /// use rtneat_nn::genomics::Genome;
    ///
    /// let logger = EvolutionLogger::<Genome>::new(ReportingLevel::NoOrganisms);
    /// assert_eq!(logger.iter().count(), 0);
    /// ```
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger<G> {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Store a snapshot of a population.
    ///
    /// The `stat_extractor` provides a way of
    /// obtaining arbitrary statistics on the population,
    /// where each statistic is named by `stat_names`.
    /// Statistics are skipped for an empty population.
    ///
    /// # Examples
    /// ```
    /// use rtneat::{Population, PopulationConfig};
    /// use rtneat::logging::{EvolutionLogger, ReportingLevel};
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome};
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 0);
    /// let genomes: Vec<_> = (0..4).map(|_| Genome::generate(&mut context, 2, 1)).collect();
    /// let mut population = Population::<Genome>::new(PopulationConfig::zero(), context);
    /// population.seed(genomes);
    ///
    /// let mut logger = EvolutionLogger::new(ReportingLevel::PopulationChampion);
    /// logger.log(&population, &|o| [o.fitness(), o.genome().connections().len() as f64], ["fitness", "links"]);
    ///
    /// let log = logger.iter().next().unwrap();
    /// assert_eq!(log.organism_stats.len(), 2);
    /// assert_eq!(log.organism_stats[1].1.maximum, 0.0);
    /// ```
    pub fn log<SE, const N: usize>(
        &mut self,
        population: &Population<G>,
        stat_extractor: &SE,
        stat_names: [&str; N],
    ) where
        SE: Fn(&Organism<G>) -> [f64; N],
    {
        let stats: Vec<[f64; N]> = population.organisms().iter().map(stat_extractor).collect();
        let organism_stats = stat_names
            .iter()
            .map(|name| name.to_string())
            .zip(unzip_n_vecs(stats.into_iter()))
            .filter_map(|(name, data)| Stats::from(data.into_iter()).map(|s| (name, s)))
            .collect();

        let sample = match self.reporting_level {
            ReportingLevel::AllOrganisms => OrganismRecord::Species(
                population
                    .species()
                    .iter()
                    .map(|s| (s.id(), population.members_of(s.id()).cloned().collect()))
                    .collect(),
            ),
            ReportingLevel::SpeciesChampions => OrganismRecord::SpeciesChampions(
                population
                    .species()
                    .iter()
                    .filter_map(|s| {
                        population
                            .members_of(s.id())
                            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
                            .map(|champion| (s.id(), champion.clone()))
                    })
                    .collect(),
            ),
            ReportingLevel::PopulationChampion => match population.champion() {
                Some(champion) => OrganismRecord::PopulationChampion(champion.clone()),
                None => OrganismRecord::None,
            },
            ReportingLevel::NoOrganisms => OrganismRecord::None,
        };

        self.logs.push(Log {
            replacement_number: population.replacements(),
            species_count: population.species().len(),
            compatibility_threshold: population.species().compatibility_threshold(),
            sample,
            organism_stats,
        })
    }

    /// Iterate over all logged snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &Log<G>> {
        self.logs.iter()
    }
}

fn unzip_n_vecs<T: Clone, const N: usize>(iter: impl Iterator<Item = [T; N]>) -> Vec<Vec<T>> {
    let mut vecs = vec![Vec::default(); N];
    for items in iter {
        for (i, item) in items.into_iter().enumerate() {
            vecs[i].push(item);
        }
    }
    vecs
}
