use crate::Innovation;

use std::fmt;

/// Edges are the weighted, directed connections of a genome.
///
/// An edge refers to its endpoints by node id only, and
/// carries the innovation number used to align it with
/// edges of other genomes. Disabled edges stay in the genome
/// so that its mutation history remains comparable.
#[derive(Clone, PartialEq, Debug)]
pub struct Edge {
    id: Innovation,
    from: Innovation,
    to: Innovation,
    weight: f32,
    enabled: bool,
}

impl Edge {
    /// Returns a new _enabled_ edge with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::Edge;
    ///
    /// let edge = Edge::new(42, 3, 9, 2.0);
    /// assert_eq!(edge.endpoints(), (3, 9));
    /// assert!(edge.enabled());
    /// ```
    pub fn new(id: Innovation, from: Innovation, to: Innovation, weight: f32) -> Edge {
        Edge {
            id,
            from,
            to,
            weight,
            enabled: true,
        }
    }

    /// Returns the edge's innovation number.
    pub fn innovation(&self) -> Innovation {
        self.id
    }

    /// Returns the id of the edge's source node.
    pub fn from(&self) -> Innovation {
        self.from
    }

    /// Returns the id of the edge's target node.
    pub fn to(&self) -> Innovation {
        self.to
    }

    pub fn endpoints(&self) -> (Innovation, Innovation) {
        (self.from, self.to)
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flips the edge between enabled and disabled.
    ///
    /// # Examples
    /// ```
    /// use layerneat::genomics::Edge;
    ///
    /// let mut edge = Edge::new(0, 0, 1, 1.0);
    /// edge.toggle();
    /// assert!(!edge.enabled());
    /// edge.toggle();
    /// assert!(edge.enabled());
    /// ```
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:?}[{:?}->{:?}, {:.3}]{}",
            if self.enabled { "" } else { "(" },
            self.id,
            self.from,
            self.to,
            self.weight,
            if self.enabled { "" } else { ")" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_disabled_edges() {
        let mut edge = Edge::new(4, 0, 2, 1.5);
        assert_eq!(edge.to_string(), "4[0->2, 1.500]");
        edge.set_enabled(false);
        assert_eq!(edge.to_string(), "(4[0->2, 1.500])");
    }
}
