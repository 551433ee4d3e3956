use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An ActivationType represents the scalar function
/// a node applies to its accumulated input plus bias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationType {
    // x
    Identity,
    // 1 / (1 + exp(-x))
    Sigmoid,
    // tanh(x)
    Tanh,
    // 0   if x ≤ 0
    // x   if x > 0
    ReLU,
    // 0   if x ≤ 0
    // 1   if x > 0
    Step,
}

impl ActivationType {
    /// Every activation type, in catalog order.
    pub const ALL: [ActivationType; 5] = [
        ActivationType::Identity,
        ActivationType::Sigmoid,
        ActivationType::Tanh,
        ActivationType::ReLU,
        ActivationType::Step,
    ];

    /// Applies the activation function to `x`.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::ActivationType;
    ///
    /// assert_eq!(ActivationType::Identity.apply(-3.0), -3.0);
    /// assert_eq!(ActivationType::Sigmoid.apply(0.0), 0.5);
    /// assert_eq!(ActivationType::ReLU.apply(-3.0), 0.0);
    /// assert_eq!(ActivationType::Step.apply(0.2), 1.0);
    /// ```
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Identity => x,
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
            Self::ReLU => {
                if x > 0.0 {
                    x
                } else {
                    0.0
                }
            }
            Self::Step => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Returns a uniformly chosen activation type.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> ActivationType {
        *Self::ALL
            .choose(rng)
            .unwrap_or(&ActivationType::Sigmoid)
    }
}

impl Default for ActivationType {
    fn default() -> Self {
        ActivationType::Sigmoid
    }
}
