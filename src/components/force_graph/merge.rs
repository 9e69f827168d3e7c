use std::collections::HashMap;

use super::types::{GraphData, GraphEdge};

fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
	if a <= b { (a, b) } else { (b, a) }
}

/// Collapse every edge between the same unordered pair of nodes into one.
///
/// Weights are summed and task lists concatenated in input order. The merged
/// edge always points from the lexicographically smaller id to the larger
/// one, so the result does not depend on the direction of the inputs. Edges
/// keep the position of their pair's first occurrence.
pub fn merge_reciprocal(graph: &GraphData) -> GraphData {
	let mut slots: HashMap<(&str, &str), usize> = HashMap::new();
	let mut edges: Vec<GraphEdge> = Vec::new();

	for edge in &graph.edges {
		let (source, target) = canonical_pair(&edge.source, &edge.target);
		match slots.get(&(source, target)) {
			Some(&slot) => {
				let merged = &mut edges[slot];
				merged.weight += edge.weight;
				merged.tasks.extend(edge.tasks.iter().cloned());
			}
			None => {
				slots.insert((source, target), edges.len());
				edges.push(GraphEdge {
					source: source.to_string(),
					target: target.to_string(),
					weight: edge.weight,
					tasks: edge.tasks.clone(),
				});
			}
		}
	}

	GraphData {
		nodes: graph.nodes.clone(),
		edges,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::super::sanitize::sanitize;
	use super::super::types::Task;
	use super::*;

	fn edge(source: &str, target: &str, weight: f64, tasks: &[&str]) -> GraphEdge {
		GraphEdge {
			source: source.into(),
			target: target.into(),
			weight,
			tasks: tasks
				.iter()
				.map(|title| Task {
					title: title.to_string(),
					..Task::default()
				})
				.collect(),
		}
	}

	#[test]
	fn reciprocal_pair_sums_weight_and_orders_endpoints() {
		let graph = GraphData {
			nodes: Vec::new(),
			edges: vec![edge("b", "a", 2.0, &["t1"]), edge("a", "b", 3.0, &["t2", "t3"])],
		};
		let merged = merge_reciprocal(&graph);
		assert_eq!(merged.edges.len(), 1);
		let e = &merged.edges[0];
		assert_eq!((e.source.as_str(), e.target.as_str()), ("a", "b"));
		assert_eq!(e.weight, 5.0);
		let titles: Vec<&str> = e.tasks.iter().map(|t| t.title.as_str()).collect();
		assert_eq!(titles, ["t1", "t2", "t3"]);
	}

	#[test]
	fn distinct_pairs_keep_first_seen_order() {
		let graph = GraphData {
			nodes: Vec::new(),
			edges: vec![
				edge("c", "b", 1.0, &[]),
				edge("a", "b", 1.0, &[]),
				edge("b", "c", 4.0, &[]),
			],
		};
		let merged = merge_reciprocal(&graph);
		let pairs: Vec<(&str, &str, f64)> = merged
			.edges
			.iter()
			.map(|e| (e.source.as_str(), e.target.as_str(), e.weight))
			.collect();
		assert_eq!(pairs, [("b", "c", 5.0), ("a", "b", 1.0)]);
	}

	#[test]
	fn merging_twice_changes_nothing() {
		let graph = GraphData {
			nodes: Vec::new(),
			edges: vec![
				edge("x", "y", 1.0, &["a"]),
				edge("y", "x", 2.0, &["b"]),
				edge("y", "z", 1.0, &[]),
			],
		};
		let once = merge_reciprocal(&graph);
		assert_eq!(merge_reciprocal(&once), once);
	}

	#[test]
	fn sanitized_duplicates_collapse_to_single_edge() {
		let raw = json!({
			"nodes": [{ "id": "a" }, { "id": "b" }, { "id": "a" }],
			"edges": [
				{ "source": "a", "target": "b" },
				{ "source": "b", "target": "a" },
			],
		});
		let merged = merge_reciprocal(&sanitize(&raw));
		let ids: Vec<&str> = merged.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["a", "b"]);
		assert_eq!(merged.edges.len(), 1);
		assert_eq!(merged.edges[0].weight, 2.0);
	}
}
