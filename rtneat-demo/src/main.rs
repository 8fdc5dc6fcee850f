use rtneat::logging::{EvolutionLogger, ReportingLevel, Stats};
use rtneat::{Population, PopulationConfig, PopulationError, Rates};
use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome, NodeType};
use rtneat_nn::networks::PhenotypeNetwork;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use std::error::Error;
use std::fs;

/// Errors below this margin count as exact answers.
const ERROR_MARGIN: f64 = 0.3;
const SOLVED: f64 = 16.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DemoConfig {
    genetic: GeneticConfig,
    population: PopulationConfig,
    population_size: usize,
    ticks: usize,
    runs: u64,
    log_every: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            genetic: GeneticConfig {
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
                    cross_over: 0.6,
                    mutation_activation: 0.01,
                    mutation_connect: 0.08,
                    mutation_allow_recurrent: 0.0,
                    mutation_split_connect: 0.03,
                },
            },
            population: PopulationConfig {
                min_eligible_age: 20,
                compatibility_threshold: 3.0,
                compatibility_step: 0.1,
                min_compatibility_threshold: 0.3,
                target_species: 6,
            },
            population_size: 100,
            ticks: 4000,
            runs: 64,
            log_every: 250,
        }
    }
}

fn evaluate_xor(genome: &Genome) -> f64 {
    let mut network = PhenotypeNetwork::from(genome);
    let cases = [
        ([0.0, 0.0], 0.0),
        ([0.0, 1.0], 1.0),
        ([1.0, 0.0], 1.0),
        ([1.0, 1.0], 0.0),
    ];

    let mut errors = 0.0;
    for (input, expected) in cases {
        network.reset();
        let error = match network.feed_forward(&input) {
            Ok(output) => (output[0] - expected).abs(),
            Err(_) => 1.0,
        };
        if error >= ERROR_MARGIN {
            errors += error;
        }
    }
    (4.0 - errors).max(0.0).powi(2)
}

/// Builds a population of fully connected minimal genomes.
fn xor_population(config: &DemoConfig, seed: u64) -> Population<Genome> {
    let mut context = EvolutionContext::seeded(config.genetic.clone(), seed);
    let genomes: Vec<_> = (0..config.population_size)
        .map(|_| {
            let mut genome = Genome::generate(&mut context, 2, 1);
            let sources: Vec<_> = genome
                .nodes()
                .iter()
                .filter(|n| matches!(n.node_type(), NodeType::Input | NodeType::Bias))
                .map(|n| n.id())
                .collect();
            for source in sources {
                if let Err(e) = genome.connect(&mut context, source, 2) {
                    debug!(error = %e, "initial connection skipped");
                }
            }
            genome
        })
        .collect();

    let mut population = Population::new(config.population.clone(), context);
    population.seed(genomes);
    population
}

/// Evaluates every organism and reports its score.
fn tick(population: &mut Population<Genome>) -> Result<(), PopulationError> {
    let scores: Vec<_> = population
        .organisms()
        .iter()
        .map(|o| (o.id(), evaluate_xor(o.genome())))
        .collect();
    for (id, score) in scores {
        population.report_fitness(id, score)?;
    }
    Ok(())
}

fn is_solved(population: &Population<Genome>) -> bool {
    population
        .champion()
        .map_or(false, |c| (c.fitness() - SOLVED).abs() < f64::EPSILON)
}

/// Returns the number of replacements needed to
/// find a solution, or `None` if it wasn't found.
fn run(config: &DemoConfig, seed: u64) -> Result<Option<usize>, PopulationError> {
    let mut population = xor_population(config, seed);
    for _ in 0..config.ticks {
        tick(&mut population)?;
        if is_solved(&population) {
            return Ok(Some(population.replacements()));
        }
        population.evolve();
    }
    Ok(None)
}

/// A single logged run.
fn showcase(config: &DemoConfig) -> Result<(), PopulationError> {
    let mut population = xor_population(config, 0);
    let mut logger = EvolutionLogger::new(ReportingLevel::PopulationChampion);
    let extractor = |o: &rtneat::Organism<Genome>| {
        [
            o.fitness(),
            o.genome().connections().len() as f64,
            o.genome().nodes().len() as f64,
        ]
    };

    for t in 0..config.ticks {
        tick(&mut population)?;
        if t % config.log_every.max(1) == 0 {
            logger.log(&population, &extractor, ["fitness", "connections", "nodes"]);
        }
        if is_solved(&population) {
            break;
        }
        population.evolve();
    }
    logger.log(&population, &extractor, ["fitness", "connections", "nodes"]);

    for log in logger.iter() {
        info!("{}", log);
    }
    match population.champion() {
        Some(champion) if is_solved(&population) => info!(
            replacements = population.replacements(),
            "solution found: {}",
            champion.genome()
        ),
        Some(champion) => info!(fitness = champion.fitness(), "no solution found"),
        None => info!("empty population"),
    }
    Ok(())
}

fn stress_test(config: &DemoConfig) -> Result<(), PopulationError> {
    let results = (0..config.runs)
        .into_par_iter()
        .map(|seed| run(config, seed))
        .collect::<Result<Vec<_>, _>>()?;

    let failures = results.iter().filter(|r| r.is_none()).count();
    info!(
        "Successful run replacement count {:?}, {}% failure rate over {} runs",
        Stats::from(results.iter().flatten().map(|&r| r as f64)),
        failures as f64 * 100.0 / config.runs.max(1) as f64,
        config.runs
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rtneat_demo=info,warn")),
        )
        .init();

    let config: DemoConfig = match std::env::args().nth(1) {
        Some(path) => ron::from_str(&fs::read_to_string(path)?)?,
        None => DemoConfig::default(),
    };
    debug!(?config, "configuration loaded");

    showcase(&config)?;
    stress_test(&config)?;
    Ok(())
}
