//! An implementation of NeuroEvolution of Augmenting Topologies,
//! following the 2002 paper: <http://nn.cs.utexas.edu/keyword?stanley:ec02>
//!
//! Genomes are kept as layered, feed-forward graphs: every edge goes
//! from a lower layer to a strictly higher one, so a genome can be
//! evaluated directly with a single sweep and without building a
//! separate network. Structural mutations keep the layering intact,
//! and an [`InnovationLedger`] makes sure identical structural changes
//! within a round receive identical identifiers across genomes.
//!
//! Fitness is computed by the caller. A [`Population`] only clusters
//! genomes into species and reproduces them, recording per-generation
//! statistics along the way.
//!
//! # Example usage: Evolution of XOR function approximator
//! ```
//! use layerneat::{MutationConfig, Population, SpeciesConfig};
//!
//! const XOR: [([f32; 2], f32); 4] = [
//!     ([0.0, 0.0], 0.0),
//!     ([0.0, 1.0], 1.0),
//!     ([1.0, 0.0], 1.0),
//!     ([1.0, 1.0], 0.0),
//! ];
//!
//! let mut population = Population::with_seed(
//!     2,
//!     1,
//!     150,
//!     MutationConfig::default(),
//!     SpeciesConfig::default(),
//!     42,
//! ).unwrap();
//!
//! for _ in 0..10 {
//!     population.evaluate_fitness(|genome| {
//!         let error: f32 = XOR
//!             .iter()
//!             .map(|(input, expected)| (genome.feed_forward(input)[0] - expected).powi(2))
//!             .sum();
//!         1.0 / (1.0 + error)
//!     });
//!     population.start_next_generation().unwrap();
//! }
//!
//! assert_eq!(population.generation(), 10);
//! assert_eq!(population.best_fitness_history().len(), 10);
//! ```

pub mod genomics;
pub mod populations;
pub mod rng;

/// Node ids and edge innovation numbers.
pub type Innovation = usize;

pub use genomics::{
    ActivationType, Edge, Genome, InnovationLedger, MutationConfig, Node, NodeType,
};
pub use populations::{
    logging::Stats, Population, PopulationError, Species, SpeciesConfig, SpeciesHandler,
};
