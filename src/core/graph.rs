//! CollectionGraph - the inventory seen as a directed graph.
//!
//! Collections are nodes and relations are edges from tail to head. The graph
//! is a snapshot: build it after the inventory is complete.

use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;

use crate::core::{Inventory, Name};

/// Directed graph of collection names connected by relation names.
#[derive(Debug, Clone)]
pub struct CollectionGraph {
    graph: DiGraph<Name, Name>,
    nodes: HashMap<Name, NodeIndex>,
}

impl CollectionGraph {
    /// Build the graph of every collection and relation in an inventory.
    pub fn from_inventory(inventory: &Inventory) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();

        for collection in inventory.collections() {
            let node = graph.add_node(collection.name());
            nodes.insert(collection.name(), node);
        }

        // Relation endpoints are registered members, so both lookups succeed.
        for relation in inventory.relations() {
            let tail = nodes.get(&relation.tail_collection().name());
            let head = nodes.get(&relation.head_collection().name());
            if let (Some(&tail), Some(&head)) = (tail, head) {
                graph.add_edge(tail, head, relation.name());
            }
        }

        CollectionGraph { graph, nodes }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.nodes.contains_key(collection)
    }

    /// Outgoing `(relation, head collection)` pairs of a collection.
    pub fn references(&self, collection: &str) -> Vec<(Name, Name)> {
        self.edges(collection, Direction::Outgoing)
    }

    /// Incoming `(relation, tail collection)` pairs of a collection.
    pub fn referenced_by(&self, collection: &str) -> Vec<(Name, Name)> {
        self.edges(collection, Direction::Incoming)
    }

    fn edges(&self, collection: &str, direction: Direction) -> Vec<(Name, Name)> {
        let Some(&node) = self.nodes.get(collection) else {
            return Vec::new();
        };

        let mut edges: Vec<(Name, Name)> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (*edge.weight(), self.graph[other])
            })
            .collect();

        // petgraph walks adjacency lists newest-first
        edges.reverse();
        edges
    }

    /// Collections reachable from `collection` by following relations,
    /// excluding the start unless it lies on a cycle through itself.
    pub fn reachable_from(&self, collection: &str) -> Vec<Name> {
        let Some(&start) = self.nodes.get(collection) else {
            return Vec::new();
        };

        let on_cycle = self
            .graph
            .neighbors(start)
            .any(|n| n == start || self.has_path(n, start));

        let mut dfs = Dfs::new(&self.graph, start);
        let mut reached = Vec::new();
        while let Some(node) = dfs.next(&self.graph) {
            if node != start || on_cycle {
                reached.push(self.graph[node]);
            }
        }
        reached
    }

    fn has_path(&self, from: NodeIndex, to: NodeIndex) -> bool {
        let mut dfs = Dfs::new(&self.graph, from);
        while let Some(node) = dfs.next(&self.graph) {
            if node == to {
                return true;
            }
        }
        false
    }

    /// Returns true if following relations can lead back to where it started.
    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Render as Graphviz DOT, labelling edges with relation names.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.graph))
    }
}
