use std::collections::HashMap;

use super::types::{GraphData, Task};

/// Index from node position to neighbours and incident edges.
///
/// Edge records stay immutable; everything here refers to them by index into
/// `GraphData::edges`.
#[derive(Clone, Debug, Default)]
pub struct Adjacency {
	index: HashMap<String, usize>,
	neighbors: Vec<Vec<usize>>,
	incident: Vec<Vec<usize>>,
	endpoints: Vec<Option<(usize, usize)>>,
}

impl Adjacency {
	pub fn build(graph: &GraphData) -> Self {
		let index: HashMap<String, usize> = graph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		let mut neighbors = vec![Vec::new(); graph.nodes.len()];
		let mut incident = vec![Vec::new(); graph.nodes.len()];
		let mut endpoints = Vec::with_capacity(graph.edges.len());

		for (edge_idx, edge) in graph.edges.iter().enumerate() {
			let (Some(&src), Some(&tgt)) = (index.get(&edge.source), index.get(&edge.target))
			else {
				endpoints.push(None);
				continue;
			};
			if !neighbors[src].contains(&tgt) {
				neighbors[src].push(tgt);
			}
			if !neighbors[tgt].contains(&src) {
				neighbors[tgt].push(src);
			}
			incident[src].push(edge_idx);
			incident[tgt].push(edge_idx);
			endpoints.push(Some((src, tgt)));
		}

		Self {
			index,
			neighbors,
			incident,
			endpoints,
		}
	}

	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Distinct neighbours in first-seen order.
	pub fn neighbors(&self, node: usize) -> &[usize] {
		self.neighbors.get(node).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn incident_edges(&self, node: usize) -> &[usize] {
		self.incident.get(node).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
		self.neighbors(a).contains(&b)
	}

	/// Node positions of an edge's endpoints.
	pub fn endpoints(&self, edge: usize) -> Option<(usize, usize)> {
		self.endpoints.get(edge).copied().flatten()
	}

	/// `(edge, source, target)` for every edge whose endpoints resolved.
	pub fn links(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
		self.endpoints
			.iter()
			.enumerate()
			.filter_map(|(edge, ends)| ends.map(|(src, tgt)| (edge, src, tgt)))
	}

	/// Tasks of every incident edge, in edge order.
	pub fn tasks_for<'a>(
		&'a self,
		graph: &'a GraphData,
		node: usize,
	) -> impl Iterator<Item = &'a Task> + 'a {
		self.incident_edges(node)
			.iter()
			.flat_map(move |&edge| graph.edges[edge].tasks.iter())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::super::sanitize::sanitize;
	use super::*;

	fn sample() -> GraphData {
		sanitize(&json!({
			"nodes": [{ "id": "a" }, { "id": "b" }, { "id": "c" }, { "id": "d" }],
			"edges": [
				{ "source": "a", "target": "b", "tasks": [{ "title": "t1" }] },
				{ "source": "c", "target": "a", "tasks": [{ "title": "t2" }, { "title": "t3" }] },
				{ "source": "b", "target": "a" },
			],
		}))
	}

	#[test]
	fn neighbours_are_deduplicated_and_symmetric() {
		let graph = sample();
		let adj = Adjacency::build(&graph);
		assert_eq!(adj.neighbors(0), [1, 2]);
		assert_eq!(adj.neighbors(1), [0]);
		assert_eq!(adj.neighbors(2), [0]);
		assert!(adj.neighbors(3).is_empty());
		assert!(adj.is_adjacent(2, 0));
		assert!(!adj.is_adjacent(1, 2));
		assert_eq!(adj.endpoints(1), Some((2, 0)));
		assert_eq!(adj.links().count(), 3);
	}

	#[test]
	fn incident_tasks_follow_edge_order() {
		let graph = sample();
		let adj = Adjacency::build(&graph);
		let titles: Vec<&str> = adj.tasks_for(&graph, 0).map(|t| t.title.as_str()).collect();
		assert_eq!(titles, ["t1", "t2", "t3"]);
		assert_eq!(adj.tasks_for(&graph, 3).count(), 0);
	}

	#[test]
	fn out_of_range_lookups_are_empty() {
		let adj = Adjacency::build(&GraphData::default());
		assert!(adj.neighbors(5).is_empty());
		assert_eq!(adj.endpoints(0), None);
		assert_eq!(adj.links().count(), 0);
		assert!(adj.incident_edges(5).is_empty());
		assert_eq!(adj.node_index("a"), None);
	}
}
