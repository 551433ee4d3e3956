use super::{Species, SpeciesConfig};
use crate::genomics::{Genome, InnovationLedger, MutationConfig};

use rand::Rng;
use tracing::{debug, warn};

/// Partitions genomes into species by compatibility
/// distance, and allots each species its share of
/// the next generation.
#[derive(Debug, Clone)]
pub struct SpeciesHandler {
    species: Vec<Species>,
    config: SpeciesConfig,
}

impl SpeciesHandler {
    /// Creates a handler without species.
    pub fn new(config: SpeciesConfig) -> SpeciesHandler {
        SpeciesHandler {
            species: vec![],
            config,
        }
    }

    /// Creates a handler and clusters the passed genomes,
    /// in iteration order.
    pub fn from_genomes(
        genomes: impl IntoIterator<Item = Genome>,
        config: SpeciesConfig,
    ) -> SpeciesHandler {
        let mut handler = Self::new(config);
        handler.add_genomes(genomes);
        handler
    }

    /// Assigns a genome to the closest species, if its distance
    /// to that species' representative is within the threshold.
    /// Otherwise the genome founds a new species.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::Genome;
    /// use layerneat::populations::{SpeciesConfig, SpeciesHandler};
    ///
    /// let genome = Genome::new(2, 1, true);
    /// let mut handler = SpeciesHandler::new(SpeciesConfig::default());
    ///
    /// handler.add_genome(genome.clone());
    /// handler.add_genome(genome);
    /// assert_eq!(handler.species().len(), 1);
    /// assert_eq!(handler.species()[0].len(), 2);
    /// ```
    pub fn add_genome(&mut self, genome: Genome) {
        let closest = self
            .species
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s.distance(&genome, &self.config)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match closest {
            Some((i, distance)) if distance <= self.config.threshold => {
                self.species[i].add_genome(genome)
            }
            _ => {
                debug!(species = self.species.len() + 1, "new species founded");
                self.species.push(Species::new(genome));
            }
        }
    }

    /// Assigns every passed genome, in iteration order.
    pub fn add_genomes(&mut self, genomes: impl IntoIterator<Item = Genome>) {
        for genome in genomes {
            self.add_genome(genome);
        }
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn config(&self) -> &SpeciesConfig {
        &self.config
    }

    /// Returns the sum over all species of
    /// their members' mean fitness.
    pub fn average_fitness_sum(&self) -> f32 {
        self.species.iter().map(Species::average_fitness).sum()
    }

    /// Produces exactly `count` offspring across all species.
    ///
    /// Every species' fitness is shared first. Each species is then
    /// allotted offspring in proportion to its mean fitness, using
    /// largest-remainder rounding so the allotments add up to `count`.
    /// If the fitness sum is not positive, allotments follow species
    /// sizes instead. All offspring share the same `ledger`.
    pub fn reproduce<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        config: &MutationConfig,
        ledger: &mut InnovationLedger,
        rng: &mut R,
    ) -> Vec<Genome> {
        for species in &mut self.species {
            species.fitness_share();
        }

        let allotments = self.allot_offspring(count);
        debug!(?allotments, "offspring allotted");

        let mut offspring = Vec::with_capacity(count);
        for (species, allotted) in self.species.iter().zip(allotments) {
            offspring.extend(species.generate_next_generation(ledger, allotted, config, rng));
        }
        offspring
    }

    /// Splits `count` among the species.
    fn allot_offspring(&self, count: usize) -> Vec<usize> {
        let fitness_sum = self.average_fitness_sum();
        let shares: Vec<f32> = if fitness_sum > 0.0 && fitness_sum.is_finite() {
            self.species
                .iter()
                .map(|s| s.average_fitness() / fitness_sum * count as f32)
                .collect()
        } else {
            warn!(
                fitness_sum,
                "degenerate population fitness, allotting offspring by species size"
            );
            let members: usize = self.species.iter().map(Species::len).sum();
            self.species
                .iter()
                .map(|s| s.len() as f32 / members as f32 * count as f32)
                .collect()
        };
        round_retain_sum(&shares, count)
    }
}

/// Rounds `values` to integers adding up to `total`,
/// giving the leftover units to the values with the
/// largest fractional parts.
fn round_retain_sum(values: &[f32], total: usize) -> Vec<usize> {
    if values.is_empty() {
        return vec![];
    }
    let mut truncated: Vec<(usize, usize, f32)> = values
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let u = f.floor();
            let e = f - u;
            (i, u as usize, e)
        })
        .collect();
    let truncated_sum: usize = truncated.iter().map(|(_, u, _)| *u).sum();

    // Sort in decreasing order of error
    truncated.sort_unstable_by(|a, b| b.2.total_cmp(&a.2));
    let len = truncated.len();
    for k in 0..total.saturating_sub(truncated_sum) {
        truncated[k % len].1 += 1;
    }
    // Float error may leave the truncated sum above the total.
    let mut surplus = truncated_sum.saturating_sub(total);
    for (_, u, _) in truncated.iter_mut().rev() {
        if surplus == 0 {
            break;
        }
        if *u > 0 {
            *u -= 1;
            surplus -= 1;
        }
    }

    truncated.sort_by_key(|(i, ..)| *i);
    truncated.iter().map(|(_, u, _)| *u).collect()
}
