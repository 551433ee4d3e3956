//! Genomes are the focus of evolution in NEAT.
//! They are a collection of nodes and edges that can be evaluated
//! directly as a layered, feed-forward network. Genomes can be
//! progressively mutated, thus adding complexity and functionality.

mod activation;
mod config;
mod edges;
mod errors;
mod history;
mod mutation;
mod nodes;

pub use activation::ActivationType;
pub use config::MutationConfig;
pub use edges::Edge;
pub use errors::{EdgeValidityError, MutationError, NodeValidityError};
pub use history::{InnovationCounters, InnovationLedger};
pub use nodes::{Node, NodeType};

use crate::rng::Randomness;
use crate::Innovation;

use rand::Rng;
use tracing::warn;

use std::collections::btree_map::{BTreeMap, Entry};
use std::fmt;

/// A mutable collection of nodes and edges.
///
/// Node ids `0..input_count` are inputs and
/// `input_count..input_count + output_count` are outputs.
/// Every edge goes from a lower to a strictly higher layer,
/// which keeps the graph acyclic and makes a single sweep
/// in layer order sufficient for evaluation.
#[derive(Clone, PartialEq, Debug)]
pub struct Genome {
    input_count: usize,
    output_count: usize,
    nodes: BTreeMap<Innovation, Node>,
    edges: BTreeMap<Innovation, Edge>,
    fitness: f32,
}

impl Genome {
    /// Create a new genome with the specified dimensions,
    /// drawing initial biases and weights from the thread-local RNG.
    ///
    /// Input nodes are placed on layer 0 and output nodes on layer 1.
    /// If `fully_connected` is set, every input is connected to every
    /// output, and the edge `i -> input_count + o` is given the
    /// innovation number `o + i ⨯ output_count`.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{Genome, NodeType};
    ///
    /// let genome = Genome::new(2, 1, true);
    ///
    /// assert_eq!(genome.nodes().count(), 3);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Input).count(), 2);
    /// assert_eq!(genome.edges().count(), 2);
    /// assert!(genome.edges().all(|e| e.enabled()));
    /// assert_eq!(genome.edges().map(|e| e.innovation()).collect::<Vec<_>>(), vec![0, 1]);
    /// ```
    pub fn new(input_count: usize, output_count: usize, fully_connected: bool) -> Genome {
        Self::with_rng(
            input_count,
            output_count,
            fully_connected,
            &mut rand::thread_rng(),
        )
    }

    /// Create a new genome like [`Genome::new`], drawing
    /// random values from the passed RNG.
    pub fn with_rng<R: Rng + ?Sized>(
        input_count: usize,
        output_count: usize,
        fully_connected: bool,
        rng: &mut R,
    ) -> Genome {
        let mut genome = Self::empty(input_count, output_count);

        for i in 0..input_count {
            genome.nodes.insert(
                i,
                Node::new(i, NodeType::Input, 0, 0.0, ActivationType::Identity),
            );
        }
        for o in input_count..input_count + output_count {
            genome.nodes.insert(
                o,
                Node::new(
                    o,
                    NodeType::Output,
                    1,
                    rng.gaussian(0.0, 1.0),
                    ActivationType::Identity,
                ),
            );
        }

        if fully_connected {
            for i in 0..input_count {
                for o in 0..output_count {
                    let id = o + i * output_count;
                    genome.link(Edge::new(id, i, o + input_count, rng.gaussian(0.0, 1.0)));
                }
            }
        }

        genome
    }

    /// Create a genome without nodes or edges, to be
    /// populated with [`add_node`] and [`add_edge`].
    ///
    /// [`add_node`]: Genome::add_node
    /// [`add_edge`]: Genome::add_edge
    pub fn empty(input_count: usize, output_count: usize) -> Genome {
        Genome {
            input_count,
            output_count,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            fitness: 0.0,
        }
    }

    /// Add a new node to the genome.
    /// Returns a reference to the new node.
    ///
    /// # Errors
    /// Returns an error if a node with the same id
    /// already exists in the genome.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{ActivationType, Genome, Node, NodeType};
    ///
    /// let mut genome = Genome::new(2, 1, true);
    /// let node = Node::new(7, NodeType::Hidden, 1, 0.0, ActivationType::Sigmoid);
    ///
    /// assert!(genome.add_node(node.clone()).is_ok());
    /// assert!(genome.add_node(node).is_err());
    /// assert_eq!(genome.hidden_nodes().count(), 1);
    /// ```
    pub fn add_node(&mut self, node: Node) -> Result<&mut Node, NodeValidityError> {
        match self.nodes.entry(node.id()) {
            Entry::Occupied(_) => Err(NodeValidityError::DuplicateNodeId(node.id())),
            Entry::Vacant(entry) => Ok(entry.insert(node)),
        }
    }

    /// Add a new edge to the genome, wiring it into
    /// the adjacency of both its endpoints.
    /// Returns a reference to the new edge.
    ///
    /// # Errors
    /// Returns an error if an edge with the same innovation
    /// number already exists, if either endpoint is missing,
    /// if another edge already connects the same endpoints, or
    /// if the edge does not point to a higher layer.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{Edge, EdgeValidityError, Genome};
    ///
    /// let mut genome = Genome::new(2, 1, false);
    ///
    /// assert!(genome.add_edge(Edge::new(10, 0, 2, 0.5)).is_ok());
    /// assert_eq!(
    ///     genome.add_edge(Edge::new(10, 1, 2, 0.5)),
    ///     Err(EdgeValidityError::DuplicateInnovation(10)),
    /// );
    /// assert_eq!(
    ///     genome.add_edge(Edge::new(11, 2, 0, 0.5)),
    ///     Err(EdgeValidityError::DuplicateEndpoints(11, (2, 0))),
    /// );
    /// // Both inputs sit on layer 0.
    /// assert_eq!(
    ///     genome.add_edge(Edge::new(11, 1, 0, 0.5)),
    ///     Err(EdgeValidityError::LayerOrder(1, 0)),
    /// );
    /// ```
    pub fn add_edge(&mut self, edge: Edge) -> Result<&mut Edge, EdgeValidityError> {
        let id = edge.innovation();
        let (from, to) = edge.endpoints();

        if self.edges.contains_key(&id) {
            return Err(EdgeValidityError::DuplicateInnovation(id));
        }
        let (from_layer, to_layer) = match (self.nodes.get(&from), self.nodes.get(&to)) {
            (Some(from), Some(to)) => (from.layer(), to.layer()),
            _ => return Err(EdgeValidityError::NonexistentEndpoints(from, to)),
        };
        if self.edge_between(from, to).is_some() || self.edge_between(to, from).is_some() {
            return Err(EdgeValidityError::DuplicateEndpoints(id, (from, to)));
        }
        if from_layer >= to_layer {
            return Err(EdgeValidityError::LayerOrder(from, to));
        }

        Ok(self.link(edge))
    }

    /// Inserts an edge and attaches it to whichever
    /// of its endpoints are present.
    fn link(&mut self, edge: Edge) -> &mut Edge {
        let id = edge.innovation();
        let (from, to) = edge.endpoints();
        if let Some(node) = self.nodes.get_mut(&from) {
            let _ = node.add_outgoing_edge(id);
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            let _ = node.add_incoming_edge(id);
        }
        self.edges.entry(id).or_insert(edge)
    }

    fn unlink(&mut self, id: Innovation) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        if let Some(node) = self.nodes.get_mut(&edge.from()) {
            node.remove_outgoing_edge(id);
        }
        if let Some(node) = self.nodes.get_mut(&edge.to()) {
            node.remove_incoming_edge(id);
        }
        Some(edge)
    }

    /// Places an edge in an offspring shell without touching
    /// its endpoints, which may not exist yet.
    /// Adjacency is wired up by [`rebuild_nodes_from`].
    ///
    /// [`rebuild_nodes_from`]: Genome::rebuild_nodes_from
    pub(crate) fn place_edge(&mut self, edge: Edge) -> Result<(), EdgeValidityError> {
        match self.edges.entry(edge.innovation()) {
            Entry::Occupied(_) => Err(EdgeValidityError::DuplicateInnovation(edge.innovation())),
            Entry::Vacant(entry) => {
                entry.insert(edge);
                Ok(())
            }
        }
    }

    /// Reconstructs the nodes of an offspring shell after its edges
    /// have been placed. Input and output nodes are always copied;
    /// every other endpoint is copied from `primary` if it owns that
    /// node id, else from `secondary`. Copies carry type, layer, bias
    /// and activation, but no adjacency.
    ///
    /// Edges whose endpoints neither parent owns are dropped. If the
    /// inherited layers put an edge out of order, layers are recomputed
    /// from the edge structure.
    pub(crate) fn rebuild_nodes_from(&mut self, primary: &Genome, secondary: &Genome) {
        for id in 0..self.input_count + self.output_count {
            self.adopt_node(id, primary, secondary);
        }

        let placed: Vec<Edge> = self.edges.values().cloned().collect();
        for edge in placed {
            let (from, to) = edge.endpoints();
            let resolved = self.adopt_node(from, primary, secondary)
                && self.adopt_node(to, primary, secondary);
            if resolved {
                self.link(edge);
            } else {
                warn!(
                    innovation = edge.innovation(),
                    from, to, "dropping inherited edge with unknown endpoint"
                );
                self.edges.remove(&edge.innovation());
            }
        }

        if !self.respects_layer_order() {
            self.relayer();
        }
    }

    /// Copies node `id` from the first parent that owns it, unless
    /// the genome already has it. Returns whether the genome now
    /// contains the node.
    fn adopt_node(&mut self, id: Innovation, primary: &Genome, secondary: &Genome) -> bool {
        if self.nodes.contains_key(&id) {
            return true;
        }
        match primary.node(id).or_else(|| secondary.node(id)) {
            Some(node) => {
                self.nodes.insert(id, node.structural_copy());
                true
            }
            None => false,
        }
    }

    /// Reassigns every node to the length of the longest path
    /// reaching it, so that each edge points to a higher layer.
    /// Edges left unresolved by a cycle are removed.
    fn relayer(&mut self) {
        let mut pending: BTreeMap<Innovation, usize> =
            self.nodes.keys().map(|&id| (id, 0)).collect();
        for edge in self.edges.values() {
            if let Some(count) = pending.get_mut(&edge.to()) {
                *count += 1;
            }
        }

        let mut layers: BTreeMap<Innovation, usize> = BTreeMap::new();
        let mut ready: Vec<Innovation> = pending
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(&id, _)| id)
            .collect();
        while let Some(id) = ready.pop() {
            let node = match self.nodes.get(&id) {
                Some(node) => node,
                None => continue,
            };
            // Only inputs may sit on layer 0.
            let base = if node.node_type() == NodeType::Input { 0 } else { 1 };
            let layer = *layers.entry(id).or_insert(base);
            let targets: Vec<Innovation> = node
                .outgoing_edges()
                .filter_map(|e| self.edges.get(e))
                .map(Edge::to)
                .collect();
            for to in targets {
                let target_layer = layers.entry(to).or_insert(0);
                *target_layer = (*target_layer).max(layer + 1);
                if let Some(count) = pending.get_mut(&to) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(to);
                    }
                }
            }
        }

        let unresolved = |id: &Innovation| pending.get(id).map_or(false, |&count| count > 0);
        let cyclic: Vec<Innovation> = self
            .edges
            .values()
            .filter(|e| unresolved(&e.from()) && unresolved(&e.to()))
            .map(Edge::innovation)
            .collect();
        if !cyclic.is_empty() {
            warn!(edges = ?cyclic, "removing inherited edges that form a cycle");
            for id in cyclic {
                self.unlink(id);
            }
            return self.relayer();
        }

        for (id, layer) in layers {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.set_layer(layer);
            }
        }
    }

    /// Returns `true` if every edge's endpoints exist
    /// and lie on strictly increasing layers.
    pub fn respects_layer_order(&self) -> bool {
        self.edges
            .values()
            .all(|edge| match self.edge_endpoints(edge.innovation()) {
                Some((from, to)) => from.layer() < to.layer(),
                None => false,
            })
    }

    /// Returns a reference to the node with the given id, if any.
    pub fn node(&self, id: Innovation) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: Innovation) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Returns a reference to the edge with the given
    /// innovation number, if any.
    pub fn edge(&self, innovation: Innovation) -> Option<&Edge> {
        self.edges.get(&innovation)
    }

    pub fn edge_mut(&mut self, innovation: Innovation) -> Option<&mut Edge> {
        self.edges.get_mut(&innovation)
    }

    /// Resolves an edge's endpoints within this genome.
    ///
    /// Returns `None` if the edge or either
    /// of its endpoints is missing.
    pub fn edge_endpoints(&self, innovation: Innovation) -> Option<(&Node, &Node)> {
        let edge = self.edges.get(&innovation)?;
        Some((self.nodes.get(&edge.from())?, self.nodes.get(&edge.to())?))
    }

    /// Returns the edge going from `from` to `to`, if any.
    pub fn edge_between(&self, from: Innovation, to: Innovation) -> Option<&Edge> {
        self.nodes
            .get(&from)?
            .outgoing_edges()
            .filter_map(|id| self.edges.get(id))
            .find(|edge| edge.to() == to)
    }

    /// Returns an iterator over the genome's nodes,
    /// in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns an iterator over the genome's hidden nodes.
    pub fn hidden_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .values()
            .filter(|n| n.node_type() == NodeType::Hidden)
    }

    /// Returns an iterator over the genome's edges,
    /// in ascending innovation number order.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::Genome;
    ///
    /// let genome = Genome::new(3, 2, true);
    /// for edge in genome.edges() {
    ///     let (from, to) = genome.edge_endpoints(edge.innovation()).unwrap();
    ///     assert!(from.layer() < to.layer());
    /// }
    /// ```
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Returns the highest innovation number among the
    /// genome's edges, or `None` if it has no edges.
    pub fn max_innovation(&self) -> Option<Innovation> {
        self.edges.keys().next_back().copied()
    }

    /// Returns the total number of nodes and edges.
    pub fn number_of_genes(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Returns the genome's fitness.
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Sets the genome's fitness.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::Genome;
    ///
    /// let mut genome = Genome::new(1, 1, true);
    /// assert_eq!(genome.fitness(), 0.0);
    ///
    /// genome.set_fitness(10.0);
    /// assert_eq!(genome.fitness(), 10.0);
    /// ```
    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Enables the edge with the given innovation number.
    /// Returns `false` if no such edge exists.
    pub fn enable_edge(&mut self, innovation: Innovation) -> bool {
        self.edges
            .get_mut(&innovation)
            .map(|edge| edge.set_enabled(true))
            .is_some()
    }

    /// Disables the edge with the given innovation number.
    /// Returns `false` if no such edge exists.
    pub fn disable_edge(&mut self, innovation: Innovation) -> bool {
        self.edges
            .get_mut(&innovation)
            .map(|edge| edge.set_enabled(false))
            .is_some()
    }

    /// Flips the edge with the given innovation number,
    /// returning its new state, or `None` if no such edge exists.
    pub fn toggle_edge(&mut self, innovation: Innovation) -> Option<bool> {
        let edge = self.edges.get_mut(&innovation)?;
        edge.toggle();
        Some(edge.enabled())
    }

    /// Evaluates the genome on the passed inputs, returning
    /// one value per output node.
    ///
    /// Nodes are visited once, in ascending layer order. Each
    /// node applies its activation to its accumulated value plus
    /// its bias, and pushes the weighted result along its enabled
    /// outgoing edges.
    ///
    /// If the number of inputs does not match the genome's input
    /// count, a warning is logged and all outputs are zero.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{Edge, Genome};
    ///
    /// let mut genome = Genome::new(2, 1, false);
    /// genome.node_mut(2).unwrap().set_bias(0.5);
    /// genome.add_edge(Edge::new(0, 0, 2, 2.0)).unwrap();
    /// genome.add_edge(Edge::new(1, 1, 2, -1.0)).unwrap();
    ///
    /// assert_eq!(genome.feed_forward(&[1.0, 3.0]), vec![-0.5]);
    /// assert_eq!(genome.feed_forward(&[1.0]), vec![0.0]);
    /// ```
    pub fn feed_forward(&mut self, inputs: &[f32]) -> Vec<f32> {
        if inputs.len() != self.input_count {
            warn!(
                expected = self.input_count,
                found = inputs.len(),
                "feed-forward input size mismatch"
            );
            return vec![0.0; self.output_count];
        }

        for node in self.nodes.values_mut() {
            node.reset();
        }
        for (id, &value) in inputs.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.set_value(value);
            }
        }

        let mut order: Vec<(usize, Innovation)> =
            self.nodes.values().map(|n| (n.layer(), n.id())).collect();
        order.sort_unstable();

        for (_, id) in order {
            let signals: Vec<(Innovation, f32)> = {
                let node = match self.nodes.get_mut(&id) {
                    Some(node) => node,
                    None => continue,
                };
                let value = node.activate();
                if node.node_type() == NodeType::Output {
                    continue;
                }
                let edges = &self.edges;
                node.outgoing_edges()
                    .filter_map(|e| edges.get(e))
                    .filter(|e| e.enabled())
                    .map(|e| (e.to(), e.weight() * value))
                    .collect()
            };
            for (to, signal) in signals {
                if let Some(target) = self.nodes.get_mut(&to) {
                    target.accumulate(signal);
                }
            }
        }

        (self.input_count..self.input_count + self.output_count)
            .map(|id| self.nodes.get(&id).map_or(0.0, Node::value))
            .collect()
    }

    /// Evaluates the genome and returns the index of the
    /// largest output. Ties resolve to the lowest index.
    pub fn predict(&mut self, inputs: &[f32]) -> usize {
        self.feed_forward(inputs)
            .into_iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |(best, max), (i, value)| {
                if value > max {
                    (i, value)
                } else {
                    (best, max)
                }
            })
            .0
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let edges: Vec<String> = self.edges.values().map(Edge::to_string).collect();
        let nodes: Vec<String> = self.nodes.values().map(Node::to_string).collect();
        f.debug_struct("Genome")
            .field("Edges", &edges)
            .field("Nodes", &nodes)
            .field("Fitness", &self.fitness)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn new_fully_connected() {
        let mut rng = StdRng::seed_from_u64(1);
        for input_count in 1..6 {
            for output_count in 1..6 {
                let genome = Genome::with_rng(input_count, output_count, true, &mut rng);
                assert_eq!(genome.nodes.len(), input_count + output_count);
                assert_eq!(genome.edges.len(), input_count * output_count);
                for node in genome.nodes() {
                    let expected = if node.id() < input_count {
                        (NodeType::Input, 0)
                    } else {
                        (NodeType::Output, 1)
                    };
                    assert_eq!((node.node_type(), node.layer()), expected);
                    assert_eq!(node.activation_type(), ActivationType::Identity);
                }
                for edge in genome.edges() {
                    assert_eq!(
                        edge.innovation(),
                        edge.from() * output_count + (edge.to() - input_count)
                    );
                    assert!(genome.nodes[&edge.from()]
                        .outgoing_edges()
                        .any(|&e| e == edge.innovation()));
                    assert!(genome.nodes[&edge.to()]
                        .incoming_edges()
                        .any(|&e| e == edge.innovation()));
                }
                assert_eq!(genome.max_innovation(), Some(input_count * output_count - 1));
            }
        }
    }

    #[test]
    fn new_unconnected() {
        let genome = Genome::new(3, 2, false);
        assert_eq!(genome.edges().count(), 0);
        assert_eq!(genome.nodes().count(), 5);
        assert_eq!(genome.max_innovation(), None);
        assert!(genome.nodes().all(|n| n.node_type() != NodeType::Input || n.bias() == 0.0));
    }

    #[test]
    fn empty_has_no_genes() {
        let genome = Genome::empty(4, 2);
        assert_eq!(genome.number_of_genes(), 0);
        assert_eq!(genome.input_count(), 4);
        assert_eq!(genome.output_count(), 2);
    }

    #[test]
    fn add_edge_rejections() {
        let mut genome = Genome::new(2, 1, true);
        genome
            .add_node(Node::new(5, NodeType::Hidden, 1, 0.0, ActivationType::Sigmoid))
            .unwrap();

        assert_eq!(
            genome.add_edge(Edge::new(0, 0, 5, 1.0)),
            Err(EdgeValidityError::DuplicateInnovation(0))
        );
        assert_eq!(
            genome.add_edge(Edge::new(9, 0, 8, 1.0)),
            Err(EdgeValidityError::NonexistentEndpoints(0, 8))
        );
        assert_eq!(
            genome.add_edge(Edge::new(9, 0, 2, 1.0)),
            Err(EdgeValidityError::DuplicateEndpoints(9, (0, 2)))
        );
        // Hidden node 5 shares layer 1 with the output.
        assert_eq!(
            genome.add_edge(Edge::new(9, 5, 2, 1.0)),
            Err(EdgeValidityError::LayerOrder(5, 2))
        );
        // Reversed endpoints count as a duplicate before layers are compared.
        assert_eq!(
            genome.add_edge(Edge::new(9, 2, 0, 1.0)),
            Err(EdgeValidityError::DuplicateEndpoints(9, (2, 0)))
        );
        assert_eq!(
            genome.add_edge(Edge::new(9, 1, 0, 1.0)),
            Err(EdgeValidityError::LayerOrder(1, 0))
        );
        assert_eq!(genome.edges().count(), 2);

        assert!(genome.add_edge(Edge::new(9, 0, 5, 1.0)).is_ok());
        assert_eq!(genome.node(5).unwrap().incoming_edges().count(), 1);
        assert_eq!(genome.number_of_genes(), 4 + 3);
    }

    #[test]
    fn edge_lookups_and_toggles() {
        let mut genome = Genome::new(2, 2, true);
        let (from, to) = genome.edge_endpoints(3).unwrap();
        assert_eq!((from.id(), to.id()), (1, 3));
        assert_eq!(genome.edge_between(1, 3).map(Edge::innovation), Some(3));
        assert!(genome.edge_between(3, 1).is_none());
        assert!(genome.edge_endpoints(42).is_none());

        assert!(genome.disable_edge(3));
        assert!(!genome.edge(3).unwrap().enabled());
        assert_eq!(genome.toggle_edge(3), Some(true));
        assert!(genome.enable_edge(3));
        assert!(!genome.enable_edge(42));
        assert_eq!(genome.toggle_edge(42), None);
    }

    #[test]
    fn feed_forward_through_hidden_layer() {
        let mut genome = Genome::new(2, 1, false);
        genome.node_mut(2).unwrap().set_bias(0.0);
        genome
            .add_node(Node::new(3, NodeType::Hidden, 1, 1.0, ActivationType::ReLU))
            .unwrap();
        genome.node_mut(2).unwrap().set_layer(2);
        genome.add_edge(Edge::new(0, 0, 3, 1.0)).unwrap();
        genome.add_edge(Edge::new(1, 1, 3, -2.0)).unwrap();
        genome.add_edge(Edge::new(2, 3, 2, 3.0)).unwrap();
        genome.add_edge(Edge::new(3, 0, 2, 10.0)).unwrap();

        // hidden = relu(1 - 2 + 1) = 0 ; out = 0 * 3 + 1 * 10
        assert_eq!(genome.feed_forward(&[1.0, 1.0]), vec![10.0]);
        // hidden = relu(2 + 1) = 3 ; out = 9 + 20
        assert_eq!(genome.feed_forward(&[2.0, 0.0]), vec![29.0]);

        genome.disable_edge(3);
        assert_eq!(genome.feed_forward(&[2.0, 0.0]), vec![9.0]);
        assert!(genome.node(3).unwrap().visited());
    }

    #[test]
    fn feed_forward_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut genome = Genome::with_rng(3, 2, true, &mut rng);
        let first = genome.feed_forward(&[0.3, -1.0, 2.0]);
        let second = genome.feed_forward(&[0.3, -1.0, 2.0]);
        assert_eq!(first, second);
    }

    #[test]
    fn feed_forward_size_mismatch() {
        let mut genome = Genome::new(3, 2, true);
        assert_eq!(genome.feed_forward(&[]), vec![0.0, 0.0]);
        assert_eq!(genome.feed_forward(&[1.0; 4]), vec![0.0, 0.0]);
    }

    #[test]
    fn predict_returns_argmax() {
        let mut genome = Genome::new(1, 3, false);
        genome.node_mut(1).unwrap().set_bias(0.1);
        genome.node_mut(2).unwrap().set_bias(0.7);
        genome.node_mut(3).unwrap().set_bias(0.7);
        assert_eq!(genome.predict(&[0.0]), 1);
    }

    #[test]
    fn rebuild_copies_io_and_endpoints() {
        let mut parent = Genome::new(2, 1, true);
        parent
            .add_node(Node::new(3, NodeType::Hidden, 1, 0.25, ActivationType::Tanh))
            .unwrap();
        parent.node_mut(2).unwrap().set_layer(2);
        parent.add_edge(Edge::new(5, 0, 3, 1.0)).unwrap();
        parent.add_edge(Edge::new(6, 3, 2, 1.0)).unwrap();

        let mut child = Genome::empty(2, 1);
        child.place_edge(parent.edge(5).unwrap().clone()).unwrap();
        child.place_edge(parent.edge(6).unwrap().clone()).unwrap();
        child.place_edge(Edge::new(7, 0, 99, 1.0)).unwrap();
        child.rebuild_nodes_from(&parent, &parent);

        assert_eq!(child.nodes().count(), 4);
        assert_eq!(child.edges().count(), 2);
        assert!(child.edge(7).is_none());
        let hidden = child.node(3).unwrap();
        assert_eq!(hidden.bias(), 0.25);
        assert_eq!(hidden.activation_type(), ActivationType::Tanh);
        assert_eq!(hidden.incoming_edges().count(), 1);
        assert!(child.respects_layer_order());
    }

    #[test]
    fn rebuild_repairs_conflicting_layers() {
        // Node 3 sits below node 4 in one parent and above it in the other.
        let mut first = Genome::new(1, 1, false);
        first
            .add_node(Node::new(3, NodeType::Hidden, 1, 0.0, ActivationType::Sigmoid))
            .unwrap();
        first
            .add_node(Node::new(4, NodeType::Hidden, 2, 0.0, ActivationType::Sigmoid))
            .unwrap();
        first.node_mut(1).unwrap().set_layer(3);
        first.add_edge(Edge::new(10, 3, 4, 1.0)).unwrap();

        let mut second = Genome::new(1, 1, false);
        second
            .add_node(Node::new(4, NodeType::Hidden, 1, 0.0, ActivationType::Sigmoid))
            .unwrap();
        second
            .add_node(Node::new(3, NodeType::Hidden, 2, 0.0, ActivationType::Sigmoid))
            .unwrap();
        second.node_mut(1).unwrap().set_layer(3);
        second.add_edge(Edge::new(11, 4, 3, 1.0)).unwrap();
        second.add_edge(Edge::new(12, 0, 4, 1.0)).unwrap();

        let mut child = Genome::empty(1, 1);
        child.place_edge(Edge::new(10, 3, 4, 1.0)).unwrap();
        child.place_edge(Edge::new(11, 4, 3, 1.0)).unwrap();
        child.place_edge(Edge::new(12, 0, 4, 1.0)).unwrap();
        child.rebuild_nodes_from(&first, &second);

        assert!(child.respects_layer_order());
        assert!(child.edge(12).is_some());
        assert!(child.edge(10).is_none());
        assert!(child.edge(11).is_none());
        assert_eq!(child.node(4).unwrap().layer(), 1);
    }

    #[test]
    fn display_lists_edges_and_nodes() {
        let genome = Genome::new(1, 1, true);
        let rendered = genome.to_string();
        assert!(rendered.starts_with("Genome"));
        assert!(rendered.contains("0[0->1"));
    }
}
