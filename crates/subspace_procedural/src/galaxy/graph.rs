//! # Connection Graph
//!
//! Undirected adjacency between star systems, kept apart from the record
//! cache. A system can appear here before its record exists: a neighbour
//! that connects to it pre-registers the edge.
//!
//! Every mutation goes through [`ConnectionGraph::connect`], which writes
//! both directions, so `b ∈ edges[a] ⇔ a ∈ edges[b]` always holds.

use std::collections::{HashMap, HashSet, VecDeque};

use super::system::SystemId;

/// Symmetric adjacency map.
#[derive(Debug, Default, Clone)]
pub struct ConnectionGraph {
    edges: HashMap<SystemId, Vec<SystemId>>,
}

impl ConnectionGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `id` has an adjacency entry (own or pre-registered).
    #[must_use]
    pub fn contains(&self, id: SystemId) -> bool {
        self.edges.contains_key(&id)
    }

    /// Neighbours of `id` in insertion order. Empty if unknown.
    #[must_use]
    pub fn neighbors(&self, id: SystemId) -> &[SystemId] {
        self.edges.get(&id).map_or(&[][..], Vec::as_slice)
    }

    /// Returns true if `a` and `b` are connected.
    #[must_use]
    pub fn is_connected(&self, a: SystemId, b: SystemId) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Creates an empty adjacency entry for `id` if it has none.
    pub fn ensure(&mut self, id: SystemId) {
        self.edges.entry(id).or_default();
    }

    /// Adds the undirected edge `a - b`. Returns false if it already existed
    /// or `a == b`.
    pub fn connect(&mut self, a: SystemId, b: SystemId) -> bool {
        if a == b || self.is_connected(a, b) {
            return false;
        }
        self.edges.entry(a).or_default().push(b);
        self.edges.entry(b).or_default().push(a);
        true
    }

    /// Systems with an adjacency entry.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Undirected edge count.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum::<usize>() / 2
    }

    /// Drops every edge.
    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Shortest jump path from `from` to `to`, both ends included.
    ///
    /// `Some(vec![from])` when the ends coincide; `None` when `to` cannot be
    /// reached or either end is unknown.
    #[must_use]
    pub fn shortest_path(&self, from: SystemId, to: SystemId) -> Option<Vec<SystemId>> {
        if from == to {
            return Some(vec![from]);
        }
        if !self.contains(from) || !self.contains(to) {
            return None;
        }

        let mut parent: HashMap<SystemId, SystemId> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        parent.insert(from, from);

        while let Some(current) = queue.pop_front() {
            for &next in self.neighbors(current) {
                if parent.contains_key(&next) {
                    continue;
                }
                parent.insert(next, current);
                if next == to {
                    return Some(Self::unwind(&parent, from, to));
                }
                queue.push_back(next);
            }
        }
        None
    }

    fn unwind(parent: &HashMap<SystemId, SystemId>, from: SystemId, to: SystemId) -> Vec<SystemId> {
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            match parent.get(&current) {
                Some(&prev) => {
                    path.push(prev);
                    current = prev;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Systems within `max_jumps` of `from`, nearest first, excluding `from`.
    #[must_use]
    pub fn within_jumps(&self, from: SystemId, max_jumps: u32) -> Vec<SystemId> {
        let mut seen: HashSet<SystemId> = HashSet::from([from]);
        let mut found = Vec::new();
        let mut queue = VecDeque::from([(from, 0_u32)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_jumps {
                continue;
            }
            for &next in self.neighbors(current) {
                if seen.insert(next) {
                    found.push(next);
                    queue.push_back((next, depth + 1));
                }
            }
        }
        found
    }

    /// Returns true if every edge has its reverse.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.edges
            .iter()
            .all(|(&a, list)| list.iter().all(|&b| self.is_connected(b, a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(x: i32) -> SystemId {
        SystemId::at(x, 0, 0)
    }

    #[test]
    fn test_connect_is_symmetric_and_deduplicated() {
        let mut graph = ConnectionGraph::new();
        assert!(graph.connect(id(0), id(1)));
        assert!(!graph.connect(id(1), id(0)));
        assert!(!graph.connect(id(2), id(2)));

        assert_eq!(graph.neighbors(id(0)), &[id(1)]);
        assert_eq!(graph.neighbors(id(1)), &[id(0)]);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_shortest_path() {
        let mut graph = ConnectionGraph::new();
        graph.connect(id(0), id(1));
        graph.connect(id(1), id(2));
        graph.connect(id(2), id(3));
        graph.connect(id(0), id(3));

        assert_eq!(graph.shortest_path(id(0), id(0)), Some(vec![id(0)]));
        assert_eq!(graph.shortest_path(id(0), id(2)).map(|p| p.len()), Some(3));
        assert_eq!(graph.shortest_path(id(0), id(3)), Some(vec![id(0), id(3)]));
        assert_eq!(graph.shortest_path(id(0), id(9)), None);
    }

    #[test]
    fn test_disjoint_islands() {
        let mut graph = ConnectionGraph::new();
        graph.connect(id(0), id(1));
        graph.connect(id(10), id(11));
        assert_eq!(graph.shortest_path(id(0), id(11)), None);
    }

    #[test]
    fn test_within_jumps() {
        let mut graph = ConnectionGraph::new();
        for x in 0..5 {
            graph.connect(id(x), id(x + 1));
        }
        assert_eq!(graph.within_jumps(id(0), 0), Vec::<SystemId>::new());
        assert_eq!(graph.within_jumps(id(0), 2), vec![id(1), id(2)]);
        assert_eq!(graph.within_jumps(id(2), 1).len(), 2);
        assert_eq!(graph.within_jumps(id(0), 100).len(), 5);
    }
}
