//! Property tests for graph sanitizing and edge merging.

use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::{Value, json};

use super::merge::merge_reciprocal;
use super::sanitize::sanitize;

fn id_strategy() -> impl Strategy<Value = Value> {
	prop_oneof![
		"[a-e]".prop_map(Value::from),
		(0u8..4).prop_map(Value::from),
		Just(Value::Null),
		Just(json!("")),
	]
}

fn node_strategy() -> impl Strategy<Value = Value> {
	prop_oneof![
		(id_strategy(), proptest::option::of(-3.0f64..10.0)).prop_map(|(id, size)| {
			json!({ "id": id, "size": size })
		}),
		id_strategy().prop_map(|name| json!({ "name": name })),
		Just(json!("not a node")),
	]
}

fn endpoint_strategy() -> impl Strategy<Value = Value> {
	prop_oneof![
		3 => id_strategy(),
		1 => id_strategy().prop_map(|id| json!({ "id": id })),
	]
}

fn edge_strategy() -> impl Strategy<Value = Value> {
	(
		endpoint_strategy(),
		endpoint_strategy(),
		proptest::option::of(-2.0f64..6.0),
		proptest::collection::vec("[a-z]{1,6}", 0..3),
	)
		.prop_map(|(source, target, weight, titles)| {
			let tasks: Vec<Value> = titles.into_iter().map(|t| json!({ "title": t })).collect();
			json!({ "source": source, "target": target, "weight": weight, "tasks": tasks })
		})
}

fn raw_graph() -> impl Strategy<Value = Value> {
	(
		proptest::collection::vec(node_strategy(), 0..10),
		proptest::collection::vec(edge_strategy(), 0..20),
	)
		.prop_map(|(nodes, edges)| json!({ "nodes": nodes, "edges": edges }))
}

proptest! {
	#[test]
	fn sanitized_graph_is_well_formed(raw in raw_graph()) {
		let graph = sanitize(&raw);
		let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		prop_assert_eq!(ids.len(), graph.nodes.len());
		for node in &graph.nodes {
			prop_assert!(!node.id.is_empty());
			prop_assert!(node.size >= 1.0);
		}
		for edge in &graph.edges {
			prop_assert!(edge.source != edge.target);
			prop_assert!(ids.contains(edge.source.as_str()));
			prop_assert!(ids.contains(edge.target.as_str()));
			prop_assert!(edge.weight >= 1.0);
		}
	}

	#[test]
	fn merge_is_idempotent(raw in raw_graph()) {
		let once = merge_reciprocal(&sanitize(&raw));
		let twice = merge_reciprocal(&once);
		prop_assert_eq!(&once, &twice);
	}

	#[test]
	fn merge_keeps_one_canonical_edge_per_pair(raw in raw_graph()) {
		let sanitized = sanitize(&raw);
		let merged = merge_reciprocal(&sanitized);
		let mut pairs = HashSet::new();
		for edge in &merged.edges {
			prop_assert!(edge.source < edge.target);
			prop_assert!(pairs.insert((edge.source.clone(), edge.target.clone())));
		}
		prop_assert_eq!(&merged.nodes, &sanitized.nodes);

		let weight = |edges: &[super::types::GraphEdge]| edges.iter().map(|e| e.weight).sum::<f64>();
		prop_assert!((weight(&merged.edges) - weight(&sanitized.edges)).abs() < 1e-9);
		let tasks = |edges: &[super::types::GraphEdge]| edges.iter().map(|e| e.tasks.len()).sum::<usize>();
		prop_assert_eq!(tasks(&merged.edges), tasks(&sanitized.edges));
	}
}
