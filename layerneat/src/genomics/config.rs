use serde::{Deserialize, Serialize};

/// Configuration data for genome mutation.
///
/// Each probability is rolled independently
/// on every call to [`Genome::mutate`], so a single
/// call may trigger none, some, or all operators.
///
/// [`Genome::mutate`]: crate::genomics::Genome::mutate
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]. Using
/// values that are not in this bound may result
/// in odd behaviours and/or incorrect programs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Chance of splitting an edge with a new hidden node.
    pub add_node_probability: f32,
    /// Chance of connecting two unconnected nodes.
    pub add_edge_probability: f32,
    /// Chance of flipping an edge's enabled flag.
    pub toggle_edge_probability: f32,
    /// Chance of nudging an edge's weight.
    pub weight_probability: f32,
    /// Chance of replacing a hidden node's activation function.
    pub activation_probability: f32,
    /// Chance of nudging a non-input node's bias.
    pub bias_probability: f32,
    /// Standard deviation of the Gaussian weight nudge.
    pub weight_perturbation: f32,
    /// Standard deviation of the Gaussian bias nudge.
    pub bias_perturbation: f32,
    /// Maximum number of node pairs drawn during an
    /// edge addition before the mutation gives up.
    pub max_edge_attempts: usize,
}

impl MutationConfig {
    /// Returns a "zero-valued" configuration, in which
    /// no mutation ever fires.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::MutationConfig;
    ///
    /// let cfg = MutationConfig {
    ///     add_node_probability: 1.0,
    ///     ..MutationConfig::zero()
    /// };
    /// assert_eq!(cfg.add_edge_probability, 0.0);
    /// ```
    pub const fn zero() -> MutationConfig {
        MutationConfig {
            add_node_probability: 0.0,
            add_edge_probability: 0.0,
            toggle_edge_probability: 0.0,
            weight_probability: 0.0,
            activation_probability: 0.0,
            bias_probability: 0.0,
            weight_perturbation: 0.0,
            bias_perturbation: 0.0,
            max_edge_attempts: 0,
        }
    }
}

impl Default for MutationConfig {
    fn default() -> Self {
        MutationConfig {
            add_node_probability: 0.03,
            add_edge_probability: 0.05,
            toggle_edge_probability: 0.05,
            weight_probability: 0.8,
            activation_probability: 0.1,
            bias_probability: 0.1,
            weight_perturbation: 0.001,
            bias_perturbation: 0.001,
            max_edge_attempts: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: MutationConfig =
            serde_json::from_str(r#"{ "add_node_probability": 0.5 }"#).unwrap();
        assert_eq!(cfg.add_node_probability, 0.5);
        assert_eq!(cfg.weight_probability, 0.8);
        assert_eq!(cfg.max_edge_attempts, 20);
    }
}
