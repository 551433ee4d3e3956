//! A Population is a collection of genomes.
//! These are grouped into species each generation,
//! and reproduced according to externally assigned
//! fitness as the source of selective pressure.
mod config;
mod errors;
pub mod logging;
mod species;
mod species_handler;

pub use config::SpeciesConfig;
pub use errors::PopulationError;
pub use species::{edge_difference, EdgeDifference, Species};
pub use species_handler::SpeciesHandler;

use crate::genomics::{Genome, InnovationCounters, InnovationLedger, MutationConfig};
use logging::Stats;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

/// A population of genomes, advanced one generation at a time.
///
/// Each generation the caller assigns a fitness to every genome
/// and then calls one of the `start_next_generation` variants,
/// which clusters the current genomes into species, records
/// fitness statistics and the best genome, and replaces the
/// genomes with their offspring.
#[derive(Debug, Clone)]
pub struct Population {
    genomes: Vec<Genome>,
    input_count: usize,
    output_count: usize,
    generation: usize,
    population_size: usize,
    mutation_config: MutationConfig,
    species_config: SpeciesConfig,
    counters: InnovationCounters,
    rng: StdRng,
    best_fitness_history: Vec<f32>,
    average_fitness_history: Vec<f32>,
    worst_fitness_history: Vec<f32>,
    best_genome_history: Vec<Genome>,
}

impl Population {
    /// Creates a new population of `size` fully-connected genomes,
    /// with an entropy-seeded random number generator.
    ///
    /// # Errors
    /// Returns an error if `size` is zero, or if genomes would
    /// have no inputs or no outputs.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::MutationConfig;
    /// use layerneat::populations::{Population, SpeciesConfig};
    ///
    /// let population = Population::new(
    ///     2,
    ///     1,
    ///     150,
    ///     MutationConfig::default(),
    ///     SpeciesConfig::default(),
    /// ).unwrap();
    ///
    /// assert_eq!(population.genomes().len(), 150);
    /// assert_eq!(population.generation(), 0);
    /// ```
    pub fn new(
        input_count: usize,
        output_count: usize,
        size: usize,
        mutation_config: MutationConfig,
        species_config: SpeciesConfig,
    ) -> Result<Population, PopulationError> {
        Self::with_rng(
            input_count,
            output_count,
            size,
            mutation_config,
            species_config,
            StdRng::from_entropy(),
        )
    }

    /// Creates a new population like [`Population::new`], with a
    /// random number generator seeded from `seed`. Two populations
    /// created with the same seed and fed the same fitness evolve
    /// identically.
    pub fn with_seed(
        input_count: usize,
        output_count: usize,
        size: usize,
        mutation_config: MutationConfig,
        species_config: SpeciesConfig,
        seed: u64,
    ) -> Result<Population, PopulationError> {
        Self::with_rng(
            input_count,
            output_count,
            size,
            mutation_config,
            species_config,
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        input_count: usize,
        output_count: usize,
        size: usize,
        mutation_config: MutationConfig,
        species_config: SpeciesConfig,
        mut rng: StdRng,
    ) -> Result<Population, PopulationError> {
        if input_count == 0 || output_count == 0 {
            return Err(PopulationError::InvalidDimensions {
                input_count,
                output_count,
            });
        }
        check_size(size)?;

        let genomes = (0..size)
            .map(|_| Genome::with_rng(input_count, output_count, true, &mut rng))
            .collect();

        Ok(Population {
            genomes,
            input_count,
            output_count,
            generation: 0,
            population_size: size,
            mutation_config,
            species_config,
            counters: InnovationCounters::for_template(input_count, output_count),
            rng,
            best_fitness_history: vec![],
            average_fitness_history: vec![],
            worst_fitness_history: vec![],
            best_genome_history: vec![],
        })
    }

    /// Returns the current generation's genomes.
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Returns the current generation's genomes mutably,
    /// for evaluation and fitness assignment.
    pub fn genomes_mut(&mut self) -> &mut [Genome] {
        &mut self.genomes
    }

    pub fn genome(&self, index: usize) -> Option<&Genome> {
        self.genomes.get(index)
    }

    /// Returns the fittest genome of the current generation.
    /// Ties resolve to the earliest genome.
    pub fn champion(&self) -> &Genome {
        self.genomes
            .iter()
            .fold(&self.genomes[0], |best, genome| {
                if genome.fitness() > best.fitness() {
                    genome
                } else {
                    best
                }
            })
    }

    /// Assigns every genome the fitness returned
    /// by `evaluator` for it.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::MutationConfig;
    /// use layerneat::populations::{Population, SpeciesConfig};
    ///
    /// let mut population = Population::with_seed(
    ///     1,
    ///     1,
    ///     10,
    ///     MutationConfig::default(),
    ///     SpeciesConfig::default(),
    ///     7,
    /// ).unwrap();
    ///
    /// population.evaluate_fitness(|genome| genome.feed_forward(&[1.0])[0].abs());
    /// assert!(population.genomes().iter().all(|g| g.fitness() >= 0.0));
    /// ```
    pub fn evaluate_fitness(&mut self, mut evaluator: impl FnMut(&mut Genome) -> f32) {
        for genome in &mut self.genomes {
            let fitness = evaluator(genome);
            genome.set_fitness(fitness);
        }
    }

    /// Returns the number of genomes in the current generation.
    pub fn size(&self) -> usize {
        self.genomes.len()
    }

    /// Returns the size the population was created with, which
    /// generations advanced without an explicit size return to.
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Returns the number of completed generations.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.output_count
    }

    pub fn mutation_config(&self) -> &MutationConfig {
        &self.mutation_config
    }

    pub fn set_mutation_config(&mut self, config: MutationConfig) {
        self.mutation_config = config;
    }

    pub fn species_config(&self) -> &SpeciesConfig {
        &self.species_config
    }

    pub fn set_species_config(&mut self, config: SpeciesConfig) {
        self.species_config = config;
    }

    /// Returns the identifier counters the next
    /// reproduction round will resume from.
    pub fn innovation_counters(&self) -> InnovationCounters {
        self.counters
    }

    /// Best fitness of each completed generation.
    pub fn best_fitness_history(&self) -> &[f32] {
        &self.best_fitness_history
    }

    /// Mean fitness of each completed generation.
    pub fn average_fitness_history(&self) -> &[f32] {
        &self.average_fitness_history
    }

    /// Worst fitness of each completed generation.
    pub fn worst_fitness_history(&self) -> &[f32] {
        &self.worst_fitness_history
    }

    /// A copy of the best genome of each completed generation.
    pub fn best_genome_history(&self) -> &[Genome] {
        &self.best_genome_history
    }

    /// Advances to the next generation, producing
    /// [`population_size`] offspring and using the
    /// fitness currently assigned to each genome.
    ///
    /// [`population_size`]: Population::population_size
    ///
    /// # Errors
    /// Returns an error if any genome's fitness is
    /// negative or not finite. Nothing is modified
    /// in that case.
    pub fn start_next_generation(&mut self) -> Result<(), PopulationError> {
        self.start_next_generation_sized(self.population_size)
    }

    /// Advances to the next generation, producing `size` offspring.
    ///
    /// # Errors
    /// Returns an error if `size` is zero, or if any genome's
    /// fitness is negative or not finite. Nothing is modified
    /// in that case.
    pub fn start_next_generation_sized(&mut self, size: usize) -> Result<(), PopulationError> {
        check_size(size)?;
        check_fitness(self.genomes.iter().map(Genome::fitness))?;
        self.advance(size);
        Ok(())
    }

    /// Assigns `fitness[i]` to the `i`-th genome, then advances
    /// to the next generation, producing [`population_size`]
    /// offspring.
    ///
    /// [`population_size`]: Population::population_size
    ///
    /// # Errors
    /// Returns an error if there is not exactly one fitness value
    /// per genome, or if any value is negative or not finite.
    /// Nothing is modified in that case.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::MutationConfig;
    /// use layerneat::populations::{Population, PopulationError, SpeciesConfig};
    ///
    /// let mut population = Population::with_seed(
    ///     2,
    ///     1,
    ///     3,
    ///     MutationConfig::default(),
    ///     SpeciesConfig::default(),
    ///     0,
    /// ).unwrap();
    ///
    /// assert_eq!(
    ///     population.start_next_generation_with_fitness(&[1.0, 2.0]),
    ///     Err(PopulationError::FitnessCountMismatch { expected: 3, found: 2 }),
    /// );
    /// assert_eq!(population.generation(), 0);
    ///
    /// population.start_next_generation_with_fitness(&[1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(population.generation(), 1);
    /// assert_eq!(population.best_fitness_history(), &[3.0]);
    /// ```
    pub fn start_next_generation_with_fitness(
        &mut self,
        fitness: &[f32],
    ) -> Result<(), PopulationError> {
        self.start_next_generation_with(self.population_size, fitness)
    }

    /// Assigns `fitness[i]` to the `i`-th genome, then advances
    /// to the next generation, producing `size` offspring.
    ///
    /// # Errors
    /// Returns an error if `size` is zero, if there is not exactly
    /// one fitness value per genome, or if any value is negative or
    /// not finite. Nothing is modified in that case.
    pub fn start_next_generation_with(
        &mut self,
        size: usize,
        fitness: &[f32],
    ) -> Result<(), PopulationError> {
        check_size(size)?;
        if fitness.len() != self.genomes.len() {
            return Err(PopulationError::FitnessCountMismatch {
                expected: self.genomes.len(),
                found: fitness.len(),
            });
        }
        check_fitness(fitness.iter().copied())?;

        for (genome, &value) in self.genomes.iter_mut().zip(fitness) {
            genome.set_fitness(value);
        }
        self.advance(size);
        Ok(())
    }

    /// Records the current generation's statistics, and
    /// replaces its genomes with `size` offspring.
    fn advance(&mut self, size: usize) {
        let stats = Stats::from(self.genomes.iter().map(Genome::fitness));
        if let Some(stats) = &stats {
            self.best_fitness_history.push(stats.maximum);
            self.average_fitness_history.push(stats.mean);
            self.worst_fitness_history.push(stats.minimum);
        }
        self.best_genome_history.push(self.champion().clone());

        let mut handler = SpeciesHandler::from_genomes(
            std::mem::take(&mut self.genomes),
            self.species_config.clone(),
        );
        let species_count = handler.species().len();

        let mut ledger =
            InnovationLedger::with_counters(self.input_count, self.output_count, self.counters);
        self.genomes = handler.reproduce(size, &self.mutation_config, &mut ledger, &mut self.rng);
        self.counters = ledger.counters();
        self.generation += 1;

        if let Some(stats) = stats {
            info!(
                generation = self.generation,
                species = species_count,
                best = stats.maximum,
                average = stats.mean,
                worst = stats.minimum,
                "generation completed"
            );
        }
    }
}

fn check_size(size: usize) -> Result<(), PopulationError> {
    if size == 0 {
        Err(PopulationError::InvalidSize(size))
    } else {
        Ok(())
    }
}

fn check_fitness(values: impl Iterator<Item = f32>) -> Result<(), PopulationError> {
    for (index, value) in values.enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(PopulationError::InvalidFitness { index, value });
        }
    }
    Ok(())
}
