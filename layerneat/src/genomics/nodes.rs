use super::{ActivationType, EdgeValidityError};
use crate::Innovation;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use std::collections::HashSet;
use std::fmt;

/// A NodeType indicates the function of
/// the node in the evaluated network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Input nodes.
    Input,
    /// Output nodes.
    Output,
    /// Hidden nodes, created by node addition mutations.
    Hidden,
    /// Reserved; no genome operation creates bias nodes.
    Bias,
}

/// Nodes are the vertices of a genome, between
/// which edges are created.
///
/// A node only knows the innovation numbers of its
/// incoming and outgoing edges; resolving them is
/// always done through the owning genome.
#[derive(Clone, PartialEq, Debug)]
pub struct Node {
    id: Innovation,
    node_type: NodeType,
    layer: usize,
    bias: f32,
    value: f32,
    visited: bool,
    activation_type: ActivationType,
    incoming: HashSet<Innovation, RandomState>,
    outgoing: HashSet<Innovation, RandomState>,
}

impl Node {
    /// Generate a new node with the passed parameters
    /// and no adjacent edges.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{ActivationType, Node, NodeType};
    ///
    /// let node = Node::new(5, NodeType::Hidden, 1, 0.5, ActivationType::Sigmoid);
    /// assert_eq!(node.id(), 5);
    /// assert_eq!(node.layer(), 1);
    /// assert_eq!(node.incoming_edges().count(), 0);
    /// ```
    pub fn new(
        id: Innovation,
        node_type: NodeType,
        layer: usize,
        bias: f32,
        activation_type: ActivationType,
    ) -> Node {
        Node {
            id,
            node_type,
            layer,
            bias,
            value: 0.0,
            visited: false,
            activation_type,
            incoming: HashSet::default(),
            outgoing: HashSet::default(),
        }
    }

    /// Returns a copy of the node's type, layer, bias and
    /// activation, without any adjacency or evaluation state.
    pub fn structural_copy(&self) -> Node {
        Node::new(
            self.id,
            self.node_type,
            self.layer,
            self.bias,
            self.activation_type,
        )
    }

    /// Adds the passed innovation number to the node's
    /// list of incoming edges.
    ///
    /// # Errors
    /// Returns an error if the edge is already
    /// in the node's incoming edges.
    pub(crate) fn add_incoming_edge(&mut self, edge: Innovation) -> Result<(), EdgeValidityError> {
        if self.incoming.insert(edge) {
            Ok(())
        } else {
            Err(EdgeValidityError::DuplicateInnovation(edge))
        }
    }

    /// Adds the passed innovation number to the node's
    /// list of outgoing edges.
    ///
    /// # Errors
    /// Returns an error if the edge is already
    /// in the node's outgoing edges.
    pub(crate) fn add_outgoing_edge(&mut self, edge: Innovation) -> Result<(), EdgeValidityError> {
        if self.outgoing.insert(edge) {
            Ok(())
        } else {
            Err(EdgeValidityError::DuplicateInnovation(edge))
        }
    }

    pub(crate) fn remove_incoming_edge(&mut self, edge: Innovation) {
        self.incoming.remove(&edge);
    }

    pub(crate) fn remove_outgoing_edge(&mut self, edge: Innovation) {
        self.outgoing.remove(&edge);
    }

    /// Returns the node's id.
    pub fn id(&self) -> Innovation {
        self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Returns the node's topological layer.
    /// Every edge goes from a lower to a higher layer.
    pub fn layer(&self) -> usize {
        self.layer
    }

    pub(crate) fn set_layer(&mut self, layer: usize) {
        self.layer = layer;
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias;
    }

    /// Returns the node's value from the last evaluation.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Returns whether the node was reached during the last evaluation.
    pub fn visited(&self) -> bool {
        self.visited
    }

    pub fn activation_type(&self) -> ActivationType {
        self.activation_type
    }

    pub fn set_activation_type(&mut self, activation_type: ActivationType) {
        self.activation_type = activation_type;
    }

    /// Returns an iterator over the node's incoming edges.
    pub fn incoming_edges(&self) -> impl Iterator<Item = &Innovation> {
        self.incoming.iter()
    }

    /// Returns an iterator over the node's outgoing edges.
    pub fn outgoing_edges(&self) -> impl Iterator<Item = &Innovation> {
        self.outgoing.iter()
    }

    pub(crate) fn reset(&mut self) {
        self.value = 0.0;
        self.visited = false;
    }

    pub(crate) fn accumulate(&mut self, input: f32) {
        self.value += input;
    }

    /// Activates the node in place and returns the new value.
    pub(crate) fn activate(&mut self) -> f32 {
        self.value = self.activation_type.apply(self.value + self.bias);
        self.visited = true;
        self.value
    }

    pub(crate) fn set_value(&mut self, value: f32) {
        self.value = value;
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut incoming: Vec<_> = self.incoming.iter().collect();
        let mut outgoing: Vec<_> = self.outgoing.iter().collect();
        incoming.sort_unstable();
        outgoing.sort_unstable();
        write!(
            f,
            "{:?}[{:?}, L{}, {:?}, b={:.3}, IN: {:?}, OUT: {:?}]",
            self.id,
            self.node_type,
            self.layer,
            self.activation_type,
            self.bias,
            incoming,
            outgoing,
        )
    }
}
