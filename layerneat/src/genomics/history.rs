use crate::Innovation;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use std::collections::hash_map::{Entry, HashMap};

/// The allocation state of an [`InnovationLedger`]:
/// the next edge innovation number and the next node id
/// it will hand out.
///
/// Carried from one reproduction round to the next so
/// that identifiers allocated in a later round never
/// collide with those of an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnovationCounters {
    pub next_edge_innovation: Innovation,
    pub next_node_id: Innovation,
}

impl InnovationCounters {
    /// Counters right past the identifiers of a fully-connected
    /// template genome with the given dimensions.
    pub fn for_template(input_count: usize, output_count: usize) -> InnovationCounters {
        InnovationCounters {
            next_edge_innovation: input_count * output_count,
            next_node_id: input_count + output_count,
        }
    }
}

/// An `InnovationLedger` keeps track of the structural mutations
/// performed during one reproduction round, in order to make sure
/// identical mutations are assigned the same identifiers.
///
/// For edge innovations the source and target nodes are used to
/// identify identical mutations, and the corresponding innovation
/// number is recorded.
///
/// For node innovations the split edge (its endpoints and innovation
/// number) is used to identify identical mutations, and the id of the
/// new node is recorded.
///
/// A ledger is created at the start of a round, borrowed mutably by
/// every mutation of that round, and dropped at its end.
#[derive(Debug, Clone)]
pub struct InnovationLedger {
    next_edge_innovation: Innovation,
    next_node_id: Innovation,
    edge_innovations: HashMap<(Innovation, Innovation), Innovation, RandomState>,
    split_innovations: HashMap<(Innovation, Innovation, Innovation), Innovation, RandomState>,
}

impl InnovationLedger {
    /// Creates a new ledger for genomes with the specified dimensions.
    ///
    /// The template edges `i -> input_count + o` are pre-registered
    /// with innovation number `o + i ⨯ output_count`, so the first
    /// freshly allocated edge innovation is `input_count ⨯ output_count`
    /// and the first fresh node id is `input_count + output_count`.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::InnovationLedger;
    ///
    /// let mut ledger = InnovationLedger::new(2, 1);
    ///
    /// // Template edges keep their numbers.
    /// assert_eq!(ledger.register_edge(1, 2), 1);
    /// // New edges start right after them.
    /// assert_eq!(ledger.register_edge(0, 3), 2);
    /// assert_eq!(ledger.split_edge(0, 2, 0), 3);
    /// ```
    pub fn new(input_count: usize, output_count: usize) -> InnovationLedger {
        Self::with_counters(
            input_count,
            output_count,
            InnovationCounters::for_template(input_count, output_count),
        )
    }

    /// Creates a new, empty-registry ledger whose allocation resumes
    /// from `counters`. Counters lower than the template's are raised
    /// to it.
    pub fn with_counters(
        input_count: usize,
        output_count: usize,
        counters: InnovationCounters,
    ) -> InnovationLedger {
        let template = InnovationCounters::for_template(input_count, output_count);
        let edge_innovations = (0..input_count)
            // Cartesian product of inputs and outputs...
            .flat_map(|i| (0..output_count).map(move |o| (i, o)))
            .map(|(i, o)| ((i, o + input_count), o + i * output_count))
            .collect();
        InnovationLedger {
            next_edge_innovation: counters
                .next_edge_innovation
                .max(template.next_edge_innovation),
            next_node_id: counters.next_node_id.max(template.next_node_id),
            edge_innovations,
            split_innovations: HashMap::default(),
        }
    }

    /// Returns the innovation number of the edge `from -> to`,
    /// allocating a new one if no such edge was registered yet.
    pub fn register_edge(&mut self, from: Innovation, to: Innovation) -> Innovation {
        match self.edge_innovations.entry((from, to)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let innovation = self.next_edge_innovation;
                self.next_edge_innovation += 1;
                *entry.insert(innovation)
            }
        }
    }

    /// Returns the id of the node splitting the edge `from -> to`
    /// with innovation number `edge`, allocating a new one if
    /// this split was not registered yet.
    pub fn split_edge(&mut self, from: Innovation, to: Innovation, edge: Innovation) -> Innovation {
        match self.split_innovations.entry((from, to, edge)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let node = self.next_node_id;
                self.next_node_id += 1;
                *entry.insert(node)
            }
        }
    }

    /// Allocates a new node id for a split of `edge` even if one was
    /// already registered, and replaces the recorded split with it.
    ///
    /// This is used when the mutating genome already owns the node
    /// previously registered for the split, which would otherwise
    /// result in a duplicate node within the same genome.
    pub fn resplit_edge(&mut self, from: Innovation, to: Innovation, edge: Innovation) -> Innovation {
        let node = self.next_node_id;
        self.next_node_id += 1;
        self.split_innovations.insert((from, to, edge), node);
        node
    }

    /// Returns the current allocation counters.
    pub fn counters(&self) -> InnovationCounters {
        InnovationCounters {
            next_edge_innovation: self.next_edge_innovation,
            next_node_id: self.next_node_id,
        }
    }

    /// Returns the highest edge innovation number allocated so far.
    pub fn max_edge_innovation(&self) -> Option<Innovation> {
        self.next_edge_innovation.checked_sub(1)
    }

    /// Returns the highest node id allocated so far.
    pub fn max_node_id(&self) -> Option<Innovation> {
        self.next_node_id.checked_sub(1)
    }

    /// Returns an iterator over the registered edges, in the
    /// format `((from, to), innovation)`. No ordering is guaranteed.
    pub fn edge_history(&self) -> impl Iterator<Item = (&(Innovation, Innovation), &Innovation)> {
        self.edge_innovations.iter()
    }

    /// Returns an iterator over the registered splits, in the
    /// format `((from, to, split edge), new node)`. No ordering is guaranteed.
    pub fn split_history(
        &self,
    ) -> impl Iterator<Item = (&(Innovation, Innovation, Innovation), &Innovation)> {
        self.split_innovations.iter()
    }
}
