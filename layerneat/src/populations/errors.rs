use std::error::Error;
use std::fmt;

/// An error type indicating a population operation
/// was called with invalid arguments. No state is
/// modified when one of these is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum PopulationError {
    /// A population size of zero was requested.
    InvalidSize(usize),
    /// Genomes need at least one input and one output.
    InvalidDimensions { input_count: usize, output_count: usize },
    /// The number of fitness values does not match the number of genomes.
    FitnessCountMismatch { expected: usize, found: usize },
    /// A fitness value is negative or not finite.
    InvalidFitness { index: usize, value: f32 },
}

impl fmt::Display for PopulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize(size) => write!(f, "invalid population size {}", size),
            Self::InvalidDimensions {
                input_count,
                output_count,
            } => write!(
                f,
                "invalid genome dimensions: {} inputs, {} outputs",
                input_count, output_count
            ),
            Self::FitnessCountMismatch { expected, found } => write!(
                f,
                "expected {} fitness values, found {}",
                expected, found
            ),
            Self::InvalidFitness { index, value } => {
                write!(f, "invalid fitness {} for genome {}", value, index)
            }
        }
    }
}

impl Error for PopulationError {}
