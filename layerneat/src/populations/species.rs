use super::SpeciesConfig;
use crate::genomics::{Genome, InnovationLedger, MutationConfig};
use crate::rng::Randomness;
use crate::Innovation;

use rand::Rng;

/// Chance that an offspring is a mutated clone
/// rather than the product of crossover.
const CLONE_CHANCE: f32 = 0.25;

/// Genomes below this many genes are compared
/// without normalizing by their size.
const NORMALIZATION_THRESHOLD: usize = 20;

/// Guards mean weight computations on genomes without edges.
const WEIGHT_EPSILON: f32 = 1e-7;

/// Classification of one genome's edges relative to another's.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeDifference {
    /// Edges present in both genomes.
    pub matching: Vec<Innovation>,
    /// Edges absent from the other genome, within its innovation range.
    pub disjoint: Vec<Innovation>,
    /// Edges beyond the other genome's highest innovation number.
    pub excess: Vec<Innovation>,
}

/// Classifies every edge of `genome` relative to `other`.
/// All lists are in ascending innovation order.
///
/// # Examples
/// ```
/// use layerneat::genomics::Genome;
/// use layerneat::populations::edge_difference;
///
/// let a = Genome::new(2, 2, true);
/// let b = Genome::new(2, 2, false);
/// let diff = edge_difference(&a, &b);
/// // `b` has no edges, so all of `a`'s are excess.
/// assert_eq!(diff.excess, vec![0, 1, 2, 3]);
///
/// let diff = edge_difference(&a, &a.clone());
/// assert_eq!(diff.matching.len(), 4);
/// ```
pub fn edge_difference(genome: &Genome, other: &Genome) -> EdgeDifference {
    let other_max = other.max_innovation();
    let mut difference = EdgeDifference::default();
    for edge in genome.edges() {
        let id = edge.innovation();
        if other.edge(id).is_some() {
            difference.matching.push(id);
        } else if other_max.map_or(true, |max| id > max) {
            difference.excess.push(id);
        } else {
            difference.disjoint.push(id);
        }
    }
    difference
}

fn mean_weight(genome: &Genome) -> f32 {
    let (sum, count) = genome
        .edges()
        .fold((0.0, 0usize), |(sum, count), e| (sum + e.weight(), count + 1));
    sum / (count as f32 + WEIGHT_EPSILON)
}

/// Species are collections of reproductively
/// compatible genomes. Membership is determined by
/// the compatibility distance to a _representative_,
/// which is the fittest member added so far.
///
/// Species only live for a single reproduction round.
#[derive(Debug, Clone)]
pub struct Species {
    genomes: Vec<Genome>,
    representative: usize,
    total_fitness: f32,
}

impl Species {
    /// Creates a new species with `founder`
    /// as its sole member and representative.
    pub fn new(founder: Genome) -> Species {
        Species {
            total_fitness: founder.fitness(),
            genomes: vec![founder],
            representative: 0,
        }
    }

    /// Adds a genome to the species. It becomes the
    /// representative if it is strictly fitter
    /// than the current one.
    pub fn add_genome(&mut self, genome: Genome) {
        self.total_fitness += genome.fitness();
        if genome.fitness() > self.representative().fitness() {
            self.representative = self.genomes.len();
        }
        self.genomes.push(genome);
    }

    /// Returns the species' representative.
    pub fn representative(&self) -> &Genome {
        &self.genomes[self.representative]
    }

    /// Returns the fittest member of the species,
    /// which is always its representative.
    pub fn champion(&self) -> &Genome {
        self.representative()
    }

    /// Returns an iterator over the species' members,
    /// in insertion order.
    pub fn genomes(&self) -> impl Iterator<Item = &Genome> {
        self.genomes.iter()
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Returns the sum of the members' fitness.
    pub fn total_fitness(&self) -> f32 {
        self.total_fitness
    }

    /// Returns the members' mean fitness.
    pub fn average_fitness(&self) -> f32 {
        self.total_fitness / self.genomes.len() as f32
    }

    /// Returns the compatibility distance between the
    /// species' representative and `genome`.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::Genome;
    /// use layerneat::populations::{Species, SpeciesConfig};
    ///
    /// let genome = Genome::new(3, 1, true);
    /// let species = Species::new(genome.clone());
    ///
    /// assert_eq!(species.distance(&genome, &SpeciesConfig::default()), 0.0);
    /// ```
    pub fn distance(&self, genome: &Genome, config: &SpeciesConfig) -> f32 {
        let representative = self.representative();
        let difference = edge_difference(representative, genome);

        let genes = representative
            .number_of_genes()
            .max(genome.number_of_genes());
        let normalizer = if genes < NORMALIZATION_THRESHOLD {
            1.0
        } else {
            genes as f32
        };
        let weight_difference = (mean_weight(genome) - mean_weight(representative)).abs();

        config.excess_factor * difference.excess.len() as f32 / normalizer
            + config.disjoint_factor * difference.disjoint.len() as f32 / normalizer
            + config.weight_factor * weight_difference
    }

    /// Returns the compatibility distance to `genome` if it is
    /// below the configured threshold, or `None` otherwise.
    pub fn compatibility(&self, genome: &Genome, config: &SpeciesConfig) -> Option<f32> {
        let distance = self.distance(genome, config);
        if distance < config.threshold {
            Some(distance)
        } else {
            None
        }
    }

    /// Divides every member's fitness by the species' size.
    pub fn fitness_share(&mut self) {
        let size = self.genomes.len() as f32;
        for genome in &mut self.genomes {
            genome.set_fitness(genome.fitness() / size);
        }
        self.total_fitness = self.genomes.iter().map(Genome::fitness).sum();
    }

    /// Picks a member index by fitness-proportionate sampling,
    /// skipping `exclude`. If the sampled members' total fitness
    /// is not positive, picks uniformly instead.
    ///
    /// Returns `None` if there is no member to pick.
    pub fn select_index<R: Rng + ?Sized>(
        &self,
        exclude: Option<usize>,
        rng: &mut R,
    ) -> Option<usize> {
        let pool: Vec<usize> = (0..self.genomes.len())
            .filter(|&i| Some(i) != exclude)
            .collect();
        let first = *pool.first()?;

        let total: f32 = pool.iter().map(|&i| self.genomes[i].fitness()).sum();
        if total <= 0.0 || !total.is_finite() {
            return Some(pool[rng.uniform_index(0, pool.len() - 1)]);
        }

        let target = rng.uniform(0.0, 1.0) * total;
        let mut cumulative = 0.0;
        for &i in &pool {
            cumulative += self.genomes[i].fitness();
            if cumulative >= target {
                return Some(i);
            }
        }
        Some(first)
    }

    /// Produces an offspring from two parents.
    ///
    /// The offspring inherits every edge of the fitter parent
    /// (`second` on ties): matching edges are taken from either
    /// parent with equal chance, disjoint and excess edges from
    /// the fitter one. Nodes are then rebuilt from the parents,
    /// preferring the fitter one.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{Genome, InnovationLedger, MutationConfig};
    /// use layerneat::populations::Species;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let mut ledger = InnovationLedger::new(2, 1);
    /// let mut fit = Genome::with_rng(2, 1, true, &mut rng);
    /// fit.mutate_add_node(&mut ledger, &mut rng).unwrap();
    /// fit.set_fitness(2.0);
    /// let unfit = Genome::with_rng(2, 1, true, &mut rng);
    ///
    /// let child = Species::crossover(&fit, &unfit, &mut rng);
    /// assert_eq!(child.edges().count(), fit.edges().count());
    /// assert_eq!(child.nodes().count(), fit.nodes().count());
    /// ```
    pub fn crossover<R: Rng + ?Sized>(first: &Genome, second: &Genome, rng: &mut R) -> Genome {
        let (fitter, other) = if first.fitness() > second.fitness() {
            (first, second)
        } else {
            (second, first)
        };
        let difference = edge_difference(fitter, other);
        let mut child = Genome::empty(fitter.input_count(), fitter.output_count());

        for id in difference.disjoint.iter().chain(&difference.excess) {
            if let Some(edge) = fitter.edge(*id) {
                let _ = child.place_edge(edge.clone());
            }
        }
        for id in difference.matching {
            let parent = if rng.chance(0.5) { first } else { second };
            if let Some(edge) = parent.edge(id) {
                let _ = child.place_edge(edge.clone());
            }
        }

        child.rebuild_nodes_from(fitter, other);
        child
    }

    /// Produces `count` mutated offspring from the species' members.
    ///
    /// With at most two members, or at most two offspring requested,
    /// every offspring is a clone of a fitness-sampled member.
    /// Otherwise each offspring is a clone with a 25% chance, or the
    /// crossover of two distinct fitness-sampled members. Every
    /// offspring is mutated once, and starts with zero fitness.
    pub fn generate_next_generation<R: Rng + ?Sized>(
        &self,
        ledger: &mut InnovationLedger,
        count: usize,
        config: &MutationConfig,
        rng: &mut R,
    ) -> Vec<Genome> {
        let asexual_only = self.genomes.len() <= 2 || count <= 2;
        let mut offspring = Vec::with_capacity(count);

        for _ in 0..count {
            let first = match self.select_index(None, rng) {
                Some(first) => first,
                None => break,
            };
            let mut child = if asexual_only || rng.chance(CLONE_CHANCE) {
                self.genomes[first].clone()
            } else {
                match self.select_index(Some(first), rng) {
                    Some(second) => {
                        Self::crossover(&self.genomes[first], &self.genomes[second], rng)
                    }
                    None => self.genomes[first].clone(),
                }
            };
            child.mutate(ledger, config, rng);
            child.set_fitness(0.0);
            offspring.push(child);
        }

        offspring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{ActivationType, Edge, Node, NodeType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// A 1-input, 1-output genome with one hidden
    /// node `100 + id` per edge `0 -> 100 + id`.
    fn genome_with_edges(ids: &[Innovation], weight: f32, fitness: f32) -> Genome {
        let mut genome = Genome::new(1, 1, false);
        genome.node_mut(1).unwrap().set_layer(2);
        for &id in ids {
            genome
                .add_node(Node::new(
                    100 + id,
                    NodeType::Hidden,
                    1,
                    0.0,
                    ActivationType::Sigmoid,
                ))
                .unwrap();
            genome.add_edge(Edge::new(id, 0, 100 + id, weight)).unwrap();
        }
        genome.set_fitness(fitness);
        genome
    }

    #[test]
    fn classifies_edges() {
        let a = genome_with_edges(&[0, 1, 2, 5, 8], 1.0, 0.0);
        let b = genome_with_edges(&[0, 1, 3, 6], 1.0, 0.0);

        let diff = edge_difference(&a, &b);
        assert_eq!(diff.matching, vec![0, 1]);
        assert_eq!(diff.disjoint, vec![2, 5]);
        assert_eq!(diff.excess, vec![8]);

        let diff = edge_difference(&b, &a);
        assert_eq!(diff.matching, vec![0, 1]);
        assert_eq!(diff.disjoint, vec![3, 6]);
        assert!(diff.excess.is_empty());
    }

    #[test]
    fn small_genomes_are_not_normalized() {
        let species = Species::new(genome_with_edges(&[0, 1, 2, 5, 8], 1.0, 0.0));
        let genome = genome_with_edges(&[0, 1, 3, 6], 1.0, 0.0);
        let config = SpeciesConfig {
            threshold: 3.5,
            ..SpeciesConfig::default()
        };

        let distance = species.distance(&genome, &config);
        assert!((distance - 3.0).abs() < 1e-4, "{}", distance);
        assert!(species.compatibility(&genome, &config).is_some());
        assert!(species
            .compatibility(&genome, &SpeciesConfig::default())
            .map_or(true, |d| d < 3.0));
        assert!(species
            .compatibility(&genome, &SpeciesConfig { threshold: 2.0, ..config })
            .is_none());
    }

    #[test]
    fn large_genomes_are_normalized() {
        let ids: Vec<Innovation> = (0..15).collect();
        let species = Species::new(genome_with_edges(&ids, 1.0, 0.0));
        let config = SpeciesConfig {
            excess_factor: 1.0,
            ..SpeciesConfig::zero()
        };

        // 2 + 15 nodes and 15 edges in the representative.
        assert_eq!(
            species.distance(&genome_with_edges(&[], 1.0, 0.0), &config),
            15.0 / 32.0
        );
    }

    #[test]
    fn weight_difference_contributes() {
        let species = Species::new(genome_with_edges(&[0, 1], 1.0, 0.0));
        let config = SpeciesConfig {
            weight_factor: 0.5,
            ..SpeciesConfig::zero()
        };
        let distance = species.distance(&genome_with_edges(&[0, 1], 3.0, 0.0), &config);
        assert!((distance - 1.0).abs() < 1e-4);
    }

    #[test]
    fn representative_is_strictly_fittest() {
        let mut species = Species::new(genome_with_edges(&[0], 1.0, 1.0));
        species.add_genome(genome_with_edges(&[1], 1.0, 3.0));
        species.add_genome(genome_with_edges(&[2], 1.0, 3.0));
        species.add_genome(genome_with_edges(&[3], 1.0, 2.0));

        assert_eq!(species.len(), 4);
        assert_eq!(species.representative().max_innovation(), Some(1));
        assert_eq!(species.champion().fitness(), 3.0);
        assert_eq!(species.total_fitness(), 9.0);
        assert_eq!(species.average_fitness(), 2.25);
    }

    #[test]
    fn fitness_sharing_divides_by_size() {
        let mut species = Species::new(genome_with_edges(&[0], 1.0, 2.0));
        species.add_genome(genome_with_edges(&[0], 1.0, 4.0));
        species.add_genome(genome_with_edges(&[0], 1.0, 6.0));
        species.fitness_share();

        let shared: Vec<f32> = species.genomes().map(Genome::fitness).collect();
        assert_eq!(shared, vec![2.0 / 3.0, 4.0 / 3.0, 2.0]);
        assert!((species.total_fitness() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn selection_follows_fitness() {
        let mut rng = StdRng::seed_from_u64(29);
        let mut species = Species::new(genome_with_edges(&[0], 1.0, 5.0));
        species.add_genome(genome_with_edges(&[0], 1.0, 0.0));
        species.add_genome(genome_with_edges(&[0], 1.0, 0.0));

        for _ in 0..100 {
            assert_eq!(species.select_index(None, &mut rng), Some(0));
            let other = species.select_index(Some(0), &mut rng).unwrap();
            assert!(other == 1 || other == 2);
        }

        let lonely = Species::new(genome_with_edges(&[0], 1.0, 5.0));
        assert_eq!(lonely.select_index(Some(0), &mut rng), None);
    }

    #[test]
    fn crossover_inherits_fitter_structure() {
        let mut rng = StdRng::seed_from_u64(31);
        let fit = genome_with_edges(&[0, 1, 2, 5, 8], 1.0, 2.0);
        let unfit = genome_with_edges(&[0, 1, 3, 6], -1.0, 1.0);

        let (mut from_fit, mut from_unfit) = (false, false);
        for _ in 0..20 {
            let child = Species::crossover(&unfit, &fit, &mut rng);
            let ids: Vec<Innovation> = child.edges().map(Edge::innovation).collect();
            assert_eq!(ids, vec![0, 1, 2, 5, 8]);
            for id in [2, 5, 8] {
                assert_eq!(child.edge(id).unwrap().weight(), 1.0);
            }
            for id in [0, 1] {
                let weight = child.edge(id).unwrap().weight();
                assert!(weight == 1.0 || weight == -1.0);
                from_fit |= weight == 1.0;
                from_unfit |= weight == -1.0;
            }
            assert_eq!(child.nodes().count(), fit.nodes().count());
            assert!(child.respects_layer_order());
            assert_eq!(child.fitness(), 0.0);
        }
        // Matching genes are drawn from either parent.
        assert!(from_fit && from_unfit);

        // Ties favour the second parent.
        let tied = genome_with_edges(&[0, 1, 3, 6], -1.0, 2.0);
        let child = Species::crossover(&fit, &tied, &mut rng);
        let ids: Vec<Innovation> = child.edges().map(Edge::innovation).collect();
        assert_eq!(ids, vec![0, 1, 3, 6]);
    }

    #[test]
    fn next_generation_sizes() {
        let mut rng = StdRng::seed_from_u64(37);
        let mut ledger = InnovationLedger::new(1, 1);
        let config = MutationConfig::default();

        let mut species = Species::new(genome_with_edges(&[0, 1], 1.0, 1.0));
        assert_eq!(
            species
                .generate_next_generation(&mut ledger, 5, &config, &mut rng)
                .len(),
            5
        );

        species.add_genome(genome_with_edges(&[0, 2], 1.0, 2.0));
        species.add_genome(genome_with_edges(&[1, 2], 1.0, 3.0));
        assert!(species
            .generate_next_generation(&mut ledger, 0, &config, &mut rng)
            .is_empty());

        let offspring = species.generate_next_generation(&mut ledger, 30, &config, &mut rng);
        assert_eq!(offspring.len(), 30);
        assert!(offspring.iter().all(|g| g.fitness() == 0.0));
        assert!(offspring.iter().all(Genome::respects_layer_order));
    }
}
