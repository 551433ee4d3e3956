use serde::{Deserialize, Serialize};

/// Configuration data for speciation.
///
/// The compatibility distance between a genome and
/// a species' representative is
/// `excess_factor ⨯ E / N + disjoint_factor ⨯ D / N + weight_factor ⨯ W`,
/// where `E` and `D` count the genome's excess and disjoint
/// edges, `W` is the absolute difference between both genomes'
/// mean edge weights, and `N` is the larger gene count of the
/// two (or 1, for genomes under 20 genes).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesConfig {
    /// Weight of excess edges in the distance.
    pub excess_factor: f32,
    /// Weight of disjoint edges in the distance.
    pub disjoint_factor: f32,
    /// Weight of the mean weight difference in the distance.
    pub weight_factor: f32,
    /// Compatibility distance threshold, beyond which
    /// genomes are considered as belonging to
    /// different species.
    pub threshold: f32,
}

impl SpeciesConfig {
    /// Returns a "zero-valued" configuration.
    ///
    /// # Note
    /// With a threshold of zero only genomes at distance
    /// exactly zero share a species. This value is meant
    /// as a way to abbreviate configuration instantiation.
    ///
    /// # Examples
    /// ```
    /// use layerneat::populations::SpeciesConfig;
    ///
    /// let cfg = SpeciesConfig {
    ///     threshold: 1.5,
    ///     ..SpeciesConfig::zero()
    /// };
    /// assert_eq!(cfg.weight_factor, 0.0);
    /// ```
    pub const fn zero() -> SpeciesConfig {
        SpeciesConfig {
            excess_factor: 0.0,
            disjoint_factor: 0.0,
            weight_factor: 0.0,
            threshold: 0.0,
        }
    }
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        SpeciesConfig {
            excess_factor: 1.0,
            disjoint_factor: 1.0,
            weight_factor: 0.4,
            threshold: 3.0,
        }
    }
}
