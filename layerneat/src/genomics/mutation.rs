use super::{
    ActivationType, Edge, EdgeValidityError, Genome, InnovationLedger, MutationConfig,
    MutationError, Node, NodeType,
};
use crate::rng::Randomness;
use crate::Innovation;

use rand::seq::IteratorRandom;
use rand::Rng;
use tracing::debug;

impl Genome {
    /// Performs all mutations on the genome.
    ///
    /// Each operator is rolled independently against its configured
    /// probability, in the order: node addition, edge addition, edge
    /// toggle, weight nudge, activation change, bias nudge. Operators
    /// that find nothing to act on are skipped silently.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::{Genome, InnovationLedger, MutationConfig};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let mut genome = Genome::with_rng(2, 1, true, &mut rng);
    /// let mut ledger = InnovationLedger::new(2, 1);
    /// let config = MutationConfig {
    ///     add_node_probability: 1.0,
    ///     ..MutationConfig::zero()
    /// };
    ///
    /// genome.mutate(&mut ledger, &config, &mut rng);
    ///
    /// assert_eq!(genome.nodes().count(), 4);
    /// assert_eq!(genome.edges().count(), 4);
    /// assert_eq!(genome.edges().filter(|e| !e.enabled()).count(), 1);
    /// ```
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut InnovationLedger,
        config: &MutationConfig,
        rng: &mut R,
    ) {
        if rng.chance(config.add_node_probability) {
            skipped("add node", self.mutate_add_node(ledger, rng));
        }
        if rng.chance(config.add_edge_probability) {
            skipped("add edge", self.mutate_add_edge(ledger, config, rng));
        }
        if rng.chance(config.toggle_edge_probability) {
            skipped("toggle edge", self.mutate_toggle_edge(rng));
        }
        if rng.chance(config.weight_probability) {
            skipped("weight", self.mutate_weight(config, rng));
        }
        if rng.chance(config.activation_probability) {
            skipped("activation", self.mutate_activation(rng));
        }
        if rng.chance(config.bias_probability) {
            skipped("bias", self.mutate_bias(config, rng));
        }
    }

    /// Induces a _node mutation_ on a uniformly chosen edge.
    /// If successful, returns the id of the new node.
    ///
    /// # Errors
    /// Returns an error if the genome has no edges.
    pub fn mutate_add_node<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut InnovationLedger,
        rng: &mut R,
    ) -> Result<Innovation, MutationError> {
        let edge = self
            .edges
            .keys()
            .choose(rng)
            .copied()
            .ok_or(MutationError::NoEdges)?;
        self.split_edge(edge, ledger, rng)
    }

    /// Splits the specified edge with a new hidden node.
    ///
    /// The edge is disabled, and replaced by an edge of weight 1
    /// into the new node and an edge carrying the old weight out
    /// of it. The new node is placed right above the edge's source
    /// layer, and every node at or above that layer is moved up by
    /// one. Identifiers come from `ledger`, so equal splits within
    /// one round produce equal identifiers.
    ///
    /// Returns the id of the new node.
    ///
    /// # Errors
    /// Returns an error if the edge or one of its endpoints
    /// does not exist, or if the ledger hands out an innovation
    /// number the genome already uses.
    pub fn split_edge<R: Rng + ?Sized>(
        &mut self,
        innovation: Innovation,
        ledger: &mut InnovationLedger,
        rng: &mut R,
    ) -> Result<Innovation, MutationError> {
        let (from, to, weight) = match self.edges.get(&innovation) {
            Some(edge) => (edge.from(), edge.to(), edge.weight()),
            None => return Err(MutationError::UnknownEdge(innovation)),
        };
        let new_layer = match (self.nodes.get(&from), self.nodes.get(&to)) {
            (Some(from), Some(to)) => from.layer().min(to.layer()) + 1,
            _ => return Err(EdgeValidityError::NonexistentEndpoints(from, to).into()),
        };

        let mut node_id = ledger.split_edge(from, to, innovation);
        while self.nodes.contains_key(&node_id) {
            node_id = ledger.resplit_edge(from, to, innovation);
        }
        let in_edge = ledger.register_edge(from, node_id);
        let out_edge = ledger.register_edge(node_id, to);
        for id in [in_edge, out_edge] {
            if self.edges.contains_key(&id) {
                return Err(EdgeValidityError::DuplicateInnovation(id).into());
            }
        }

        self.disable_edge(innovation);
        for node in self.nodes.values_mut() {
            if node.layer() >= new_layer {
                node.set_layer(node.layer() + 1);
            }
        }
        self.nodes.insert(
            node_id,
            Node::new(
                node_id,
                NodeType::Hidden,
                new_layer,
                rng.gaussian(0.0, 1.0),
                ActivationType::Sigmoid,
            ),
        );
        self.link(Edge::new(in_edge, from, node_id, 1.0));
        self.link(Edge::new(out_edge, node_id, to, weight));

        Ok(node_id)
    }

    /// Induces an _edge mutation_ between two unconnected
    /// nodes on different layers, pointing upwards.
    /// If successful, returns the new edge's innovation number.
    ///
    /// # Errors
    /// Returns an error if the drawn nodes are already connected,
    /// or if [`max_edge_attempts`] draws all picked a pair sharing
    /// a layer.
    ///
    /// [`max_edge_attempts`]: MutationConfig::max_edge_attempts
    pub fn mutate_add_edge<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut InnovationLedger,
        config: &MutationConfig,
        rng: &mut R,
    ) -> Result<Innovation, MutationError> {
        let candidates: Vec<(Innovation, usize)> =
            self.nodes.values().map(|n| (n.id(), n.layer())).collect();
        if candidates.len() < 2 {
            return Err(MutationError::NoNodePairFound);
        }

        for _ in 0..config.max_edge_attempts {
            let first = candidates[rng.uniform_index(0, candidates.len() - 1)];
            let second = candidates[rng.uniform_index(0, candidates.len() - 1)];
            if first.0 == second.0 || first.1 == second.1 {
                continue;
            }

            let (from, to) = if first.1 < second.1 {
                (first.0, second.0)
            } else {
                (second.0, first.0)
            };
            if self.edge_between(from, to).is_some() {
                return Err(MutationError::AlreadyConnected(from, to));
            }

            let id = ledger.register_edge(from, to);
            self.add_edge(Edge::new(id, from, to, rng.gaussian(0.0, 1.0)))?;
            return Ok(id);
        }

        Err(MutationError::NoNodePairFound)
    }

    /// Flips a uniformly chosen edge between enabled and disabled,
    /// returning its innovation number.
    pub fn mutate_toggle_edge<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Innovation, MutationError> {
        let edge = self
            .edges
            .values_mut()
            .choose(rng)
            .ok_or(MutationError::NoEdges)?;
        edge.toggle();
        Ok(edge.innovation())
    }

    /// Nudges the weight of a uniformly chosen edge by
    /// Gaussian noise, returning its innovation number.
    pub fn mutate_weight<R: Rng + ?Sized>(
        &mut self,
        config: &MutationConfig,
        rng: &mut R,
    ) -> Result<Innovation, MutationError> {
        let edge = self
            .edges
            .values_mut()
            .choose(rng)
            .ok_or(MutationError::NoEdges)?;
        edge.set_weight(edge.weight() + rng.gaussian(0.0, config.weight_perturbation));
        Ok(edge.innovation())
    }

    /// Replaces the activation function of a uniformly chosen
    /// hidden node, returning the node's id.
    pub fn mutate_activation<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Innovation, MutationError> {
        let node = self
            .nodes
            .values_mut()
            .filter(|n| n.node_type() == NodeType::Hidden)
            .choose(rng)
            .ok_or(MutationError::NoEligibleNodes)?;
        node.set_activation_type(ActivationType::random(rng));
        Ok(node.id())
    }

    /// Nudges the bias of a uniformly chosen hidden or
    /// output node, returning the node's id.
    pub fn mutate_bias<R: Rng + ?Sized>(
        &mut self,
        config: &MutationConfig,
        rng: &mut R,
    ) -> Result<Innovation, MutationError> {
        let node = self
            .nodes
            .values_mut()
            .filter(|n| matches!(n.node_type(), NodeType::Hidden | NodeType::Output))
            .choose(rng)
            .ok_or(MutationError::NoEligibleNodes)?;
        node.set_bias(node.bias() + rng.gaussian(0.0, config.bias_perturbation));
        Ok(node.id())
    }
}

fn skipped(mutation: &'static str, result: Result<Innovation, MutationError>) {
    if let Err(e) = result {
        debug!(mutation, reason = %e, "mutation skipped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layered(genome: &Genome) -> bool {
        genome.respects_layer_order()
            && genome
                .nodes()
                .filter(|n| n.node_type() == NodeType::Input)
                .all(|n| n.layer() == 0)
    }

    #[test]
    fn add_node_splits_edge() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut genome = Genome::with_rng(2, 1, true, &mut rng);
        let mut ledger = InnovationLedger::new(2, 1);
        let enabled = genome.edges().filter(|e| e.enabled()).count();
        let nodes = genome.nodes().count();
        let edges = genome.edges().count();

        let new_node = genome.mutate_add_node(&mut ledger, &mut rng).unwrap();

        assert_eq!(new_node, 3);
        assert_eq!(genome.nodes().count(), nodes + 1);
        assert_eq!(genome.edges().count(), edges + 2);
        assert_eq!(genome.edges().filter(|e| e.enabled()).count(), enabled + 1);

        let node = genome.node(new_node).unwrap();
        assert_eq!(node.node_type(), NodeType::Hidden);
        assert_eq!(node.activation_type(), ActivationType::Sigmoid);
        assert_eq!(node.layer(), 1);
        assert_eq!(genome.node(2).unwrap().layer(), 2);

        let split = genome.edges().find(|e| !e.enabled()).unwrap().clone();
        let into = genome.edge_between(split.from(), new_node).unwrap();
        let out = genome.edge_between(new_node, split.to()).unwrap();
        assert_eq!(into.weight(), 1.0);
        assert_eq!(out.weight(), split.weight());
        assert!(layered(&genome));
    }

    #[test]
    fn add_node_without_edges() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut genome = Genome::new(2, 1, false);
        let mut ledger = InnovationLedger::new(2, 1);
        assert_eq!(
            genome.mutate_add_node(&mut ledger, &mut rng),
            Err(MutationError::NoEdges)
        );
        assert_eq!(
            genome.split_edge(0, &mut ledger, &mut rng),
            Err(MutationError::UnknownEdge(0))
        );
    }

    #[test]
    fn identical_splits_share_identifiers() {
        let mut rng = StdRng::seed_from_u64(5);
        let template = Genome::with_rng(3, 2, true, &mut rng);
        let mut first = template.clone();
        let mut second = template;
        let mut ledger = InnovationLedger::new(3, 2);

        let a = first.split_edge(4, &mut ledger, &mut rng).unwrap();
        let b = second.split_edge(4, &mut ledger, &mut rng).unwrap();
        assert_eq!(a, b);

        let first_ids: Vec<_> = first.edges().map(|e| e.innovation()).collect();
        let second_ids: Vec<_> = second.edges().map(|e| e.innovation()).collect();
        assert_eq!(first_ids, second_ids);
        assert_eq!(first_ids.len(), 8);

        // A different split in the same round gets a different node.
        let c = second.split_edge(1, &mut ledger, &mut rng).unwrap();
        assert_ne!(c, a);
    }

    #[test]
    fn resplit_avoids_owned_node() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut genome = Genome::with_rng(2, 1, true, &mut rng);
        let mut ledger = InnovationLedger::new(2, 1);

        let first = genome.split_edge(0, &mut ledger, &mut rng).unwrap();
        let second = genome.split_edge(0, &mut ledger, &mut rng).unwrap();
        assert_ne!(first, second);
        assert_eq!(genome.hidden_nodes().count(), 2);
        assert!(layered(&genome));
    }

    #[test]
    fn split_collision_leaves_genome_untouched() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut genome = Genome::with_rng(2, 1, true, &mut rng);
        genome
            .add_node(Node::new(7, NodeType::Hidden, 1, 0.0, ActivationType::Sigmoid))
            .unwrap();
        // A fresh ledger numbers the first split's incoming edge 2.
        genome.add_edge(Edge::new(2, 0, 7, 1.0)).unwrap();
        let before = genome.clone();

        let mut ledger = InnovationLedger::new(2, 1);
        let error = genome.split_edge(0, &mut ledger, &mut rng).unwrap_err();
        assert_eq!(
            error,
            MutationError::Edge(EdgeValidityError::DuplicateInnovation(2))
        );
        assert!(std::error::Error::source(&error).is_some());
        assert_eq!(genome, before);
    }

    #[test]
    fn negative_perturbation_is_ignored() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut genome = Genome::with_rng(2, 1, true, &mut rng);
        let config = MutationConfig {
            weight_perturbation: -1.0,
            bias_perturbation: -1.0,
            ..MutationConfig::zero()
        };
        let before = genome.clone();

        for _ in 0..10 {
            genome.mutate_weight(&config, &mut rng).unwrap();
            genome.mutate_bias(&config, &mut rng).unwrap();
        }
        assert_eq!(genome, before);
    }

    #[test]
    fn add_edge_between_layers() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut genome = Genome::with_rng(2, 1, false, &mut rng);
        let mut ledger = InnovationLedger::new(2, 1);
        let config = MutationConfig {
            max_edge_attempts: 100,
            ..MutationConfig::zero()
        };

        let id = genome.mutate_add_edge(&mut ledger, &config, &mut rng).unwrap();
        let edge = genome.edge(id).unwrap();
        assert_eq!(edge.to(), 2);
        assert!(edge.from() < 2);
        // Template edges keep their template innovation numbers.
        assert_eq!(id, edge.from());
    }

    #[test]
    fn add_edge_on_saturated_genome() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut genome = Genome::with_rng(2, 1, true, &mut rng);
        let mut ledger = InnovationLedger::new(2, 1);
        let config = MutationConfig {
            max_edge_attempts: 50,
            ..MutationConfig::zero()
        };

        for _ in 0..20 {
            assert!(genome.mutate_add_edge(&mut ledger, &config, &mut rng).is_err());
        }
        assert_eq!(genome.edges().count(), 2);

        let config = MutationConfig::zero();
        assert_eq!(
            Genome::new(1, 1, false).mutate_add_edge(&mut ledger, &config, &mut rng),
            Err(MutationError::NoNodePairFound)
        );
    }

    #[test]
    fn activation_and_bias_targets() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut genome = Genome::with_rng(3, 1, true, &mut rng);
        let config = MutationConfig {
            bias_perturbation: 1.0,
            ..MutationConfig::zero()
        };

        assert_eq!(
            genome.mutate_activation(&mut rng),
            Err(MutationError::NoEligibleNodes)
        );
        for _ in 0..20 {
            assert_eq!(genome.mutate_bias(&config, &mut rng), Ok(3));
        }
        assert!(genome
            .nodes()
            .filter(|n| n.node_type() == NodeType::Input)
            .all(|n| n.bias() == 0.0));

        let mut ledger = InnovationLedger::new(3, 1);
        let hidden = genome.mutate_add_node(&mut ledger, &mut rng).unwrap();
        assert_eq!(genome.mutate_activation(&mut rng), Ok(hidden));
    }

    #[test]
    fn toggle_and_weight_pick_existing_edges() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut genome = Genome::with_rng(2, 2, true, &mut rng);
        let config = MutationConfig {
            weight_perturbation: 1.0,
            ..MutationConfig::zero()
        };
        let before = genome.clone();

        let toggled = genome.mutate_toggle_edge(&mut rng).unwrap();
        assert!(!genome.edge(toggled).unwrap().enabled());

        let nudged = genome.mutate_weight(&config, &mut rng).unwrap();
        assert_ne!(
            genome.edge(nudged).unwrap().weight(),
            before.edge(nudged).unwrap().weight()
        );

        let mut empty = Genome::new(2, 2, false);
        assert_eq!(empty.mutate_toggle_edge(&mut rng), Err(MutationError::NoEdges));
        assert_eq!(empty.mutate_weight(&config, &mut rng), Err(MutationError::NoEdges));
    }

    #[test]
    fn zero_config_changes_nothing() {
        let mut rng = StdRng::seed_from_u64(19);
        let mut genome = Genome::with_rng(3, 2, true, &mut rng);
        let before = genome.clone();
        let mut ledger = InnovationLedger::new(3, 2);
        for _ in 0..50 {
            genome.mutate(&mut ledger, &MutationConfig::zero(), &mut rng);
        }
        assert_eq!(genome, before);
    }

    #[test]
    fn mutations_preserve_layer_order() {
        let mut rng = StdRng::seed_from_u64(23);
        let config = MutationConfig {
            add_node_probability: 0.5,
            add_edge_probability: 0.8,
            toggle_edge_probability: 0.3,
            weight_probability: 1.0,
            activation_probability: 0.5,
            bias_probability: 0.5,
            weight_perturbation: 0.5,
            bias_perturbation: 0.5,
            max_edge_attempts: 20,
        };

        for _ in 0..10 {
            let mut genome = Genome::with_rng(3, 2, true, &mut rng);
            let mut counters = InnovationLedger::new(3, 2).counters();
            for _ in 0..40 {
                let mut ledger = InnovationLedger::with_counters(3, 2, counters);
                genome.mutate(&mut ledger, &config, &mut rng);
                counters = ledger.counters();
                assert!(layered(&genome), "{}", genome);
                assert!(genome
                    .feed_forward(&[0.5, -0.5, 1.0])
                    .iter()
                    .all(|v| v.is_finite()));
            }
        }
    }
}
