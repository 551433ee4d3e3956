use crate::Innovation;

use std::error::Error;
use std::fmt;

/// An error type indicating the edge being
/// added is invalid for the genome.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeValidityError {
    /// The edge's innovation number is already present.
    DuplicateInnovation(Innovation),
    /// One or both of the edge's endpoints do not exist.
    NonexistentEndpoints(Innovation, Innovation),
    /// Another edge already connects the same endpoints.
    DuplicateEndpoints(Innovation, (Innovation, Innovation)),
    /// The edge does not go from a lower to a higher layer.
    LayerOrder(Innovation, Innovation),
}

/// An error type indicating the node being
/// added is invalid for the genome.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValidityError {
    /// The node's id is already present.
    DuplicateNodeId(Innovation),
}

/// An error type describing why a single
/// mutation operator left the genome unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationError {
    /// The genome has no edges to operate on.
    NoEdges,
    /// The targeted edge is not part of the genome.
    UnknownEdge(Innovation),
    /// The genome has no eligible nodes.
    NoEligibleNodes,
    /// No pair of nodes on different layers was drawn.
    NoNodePairFound,
    /// The drawn nodes are already connected.
    AlreadyConnected(Innovation, Innovation),
    /// The mutation produced an invalid edge.
    Edge(EdgeValidityError),
}

impl fmt::Display for EdgeValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateInnovation(id) => {
                write!(f, "duplicate edge insertion with innovation {}", id)
            }
            Self::NonexistentEndpoints(from, to) => write!(
                f,
                "edge insertion between nonexistent endpoint(s) {} -> {}",
                from, to
            ),
            Self::DuplicateEndpoints(id, (from, to)) => write!(
                f,
                "edge insertion with endpoints {} -> {} and innovation {} shadows edge with same endpoints",
                from, to, id
            ),
            Self::LayerOrder(from, to) => write!(
                f,
                "edge insertion {} -> {} does not point to a higher layer",
                from, to
            ),
        }
    }
}

impl fmt::Display for NodeValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNodeId(id) => write!(f, "duplicate node insertion with id {}", id),
        }
    }
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEdges => write!(f, "mutation on genome without edges"),
            Self::UnknownEdge(id) => write!(f, "mutation on nonexistent edge {}", id),
            Self::NoEligibleNodes => write!(f, "mutation on genome without eligible nodes"),
            Self::NoNodePairFound => write!(f, "no viable node pair found for edge mutation"),
            Self::AlreadyConnected(from, to) => {
                write!(f, "edge mutation between connected nodes {} -> {}", from, to)
            }
            Self::Edge(e) => write!(f, "{}", e),
        }
    }
}

impl Error for EdgeValidityError {}
impl Error for NodeValidityError {}

impl Error for MutationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Edge(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EdgeValidityError> for MutationError {
    fn from(e: EdgeValidityError) -> Self {
        Self::Edge(e)
    }
}
