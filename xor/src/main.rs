use layerneat::{Genome, MutationConfig, Population, SpeciesConfig, Stats};

use std::error::Error;
use std::fs;

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const ERROR_MARGIN: f32 = 0.3;

const XOR: [([f32; 2], f32); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

/// Run parameters, read from the RON file passed as
/// the first argument. Missing fields keep their defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RunConfig {
    population_size: usize,
    generations: usize,
    runs: usize,
    seed: Option<u64>,
    mutation: MutationConfig,
    species: SpeciesConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            population_size: 150,
            generations: 100,
            runs: 10,
            seed: None,
            mutation: MutationConfig::default(),
            species: SpeciesConfig::default(),
        }
    }
}

fn evaluate_xor(genome: &mut Genome) -> f32 {
    let error: f32 = XOR
        .iter()
        .map(|(input, expected)| (genome.feed_forward(input)[0] - expected).powi(2))
        .sum();
    1.0 / (1.0 + error)
}

fn solves_xor(genome: &Genome) -> bool {
    let mut genome = genome.clone();
    XOR.iter()
        .all(|(input, expected)| (genome.feed_forward(input)[0] - expected).abs() < ERROR_MARGIN)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ron::from_str(&fs::read_to_string(path)?)?,
        None => RunConfig::default(),
    };
    info!(?config, "starting xor runs");

    let mut generations = vec![];
    for run in 0..config.runs {
        generations.push(evolve(&config, run)?);
    }

    let failures = generations.iter().filter(|g| g.is_none()).count();
    match Stats::from(generations.iter().filter_map(|g| g.map(|g| g as f32))) {
        Some(stats) => info!(%stats, "generations until solved"),
        None => warn!("no run solved xor"),
    }
    info!(
        failure_rate = failures as f32 * 100.0 / config.runs.max(1) as f32,
        runs = config.runs,
        "runs finished"
    );
    Ok(())
}

/// Evolves a population until its champion solves
/// XOR, returning the generation it was found in.
fn evolve(config: &RunConfig, run: usize) -> Result<Option<usize>, Box<dyn Error>> {
    let mut population = match config.seed {
        Some(seed) => Population::with_seed(
            2,
            1,
            config.population_size,
            config.mutation.clone(),
            config.species.clone(),
            seed.wrapping_add(run as u64),
        )?,
        None => Population::new(
            2,
            1,
            config.population_size,
            config.mutation.clone(),
            config.species.clone(),
        )?,
    };

    for _ in 0..config.generations {
        population.genomes_mut().par_iter_mut().for_each(|genome| {
            let fitness = evaluate_xor(genome);
            genome.set_fitness(fitness);
        });
        if solves_xor(population.champion()) {
            info!(run, generation = population.generation(), "solution found");
            return Ok(Some(population.generation()));
        }
        population.start_next_generation()?;
    }
    Ok(None)
}
