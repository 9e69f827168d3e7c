//! Coercion of untrusted backend JSON into a [`GraphData`].
//!
//! Nothing in here fails: malformed entries are skipped and the well-formed
//! remainder is kept in input order.

use std::collections::HashSet;

use log::debug;
use serde_json::{Map, Value};

use super::types::{GraphData, GraphEdge, GraphNode, Task};

const DEFAULT_GROUP: &str = "1";

/// Stringify a scalar. `null`, arrays and objects have no useful string form
/// and come back empty.
pub(crate) fn coerce_string(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Number(n) => match n.as_f64() {
			Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
			_ => n.to_string(),
		},
		Value::Bool(b) => b.to_string(),
		Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
	}
}

/// Finite number from a number or numeric string, `fallback` otherwise.
pub(crate) fn coerce_number(value: Option<&Value>, fallback: f64) -> f64 {
	let parsed = match value {
		Some(Value::Number(n)) => n.as_f64(),
		Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
		Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
		_ => None,
	};
	parsed.filter(|n| n.is_finite()).unwrap_or(fallback)
}

fn first_non_empty(obj: &Map<String, Value>, keys: &[&str]) -> String {
	keys.iter()
		.filter_map(|key| obj.get(*key))
		.map(coerce_string)
		.find(|s| !s.is_empty())
		.unwrap_or_default()
}

/// Endpoints come either as a bare id or as an object carrying `id`.
fn endpoint(value: Option<&Value>) -> String {
	match value {
		Some(Value::Object(obj)) => obj.get("id").map(coerce_string).unwrap_or_default(),
		Some(other) => coerce_string(other),
		None => String::new(),
	}
}

fn array_field<'a>(raw: &'a Value, key: &str) -> &'a [Value] {
	match raw.get(key) {
		Some(Value::Array(items)) => items,
		_ => &[],
	}
}

fn sanitize_task(raw: &Value) -> Option<Task> {
	match raw {
		Value::String(title) => Some(Task {
			title: title.clone(),
			..Task::default()
		}),
		Value::Object(obj) => {
			let details = match obj.get("details") {
				Some(Value::Null) | None => None,
				Some(other) => Some(coerce_string(other)),
			};
			let snippets = match obj.get("snippets") {
				Some(Value::Array(items)) => items
					.iter()
					.map(coerce_string)
					.filter(|s| !s.is_empty())
					.collect(),
				_ => Vec::new(),
			};
			Some(Task {
				title: obj.get("title").map(coerce_string).unwrap_or_default(),
				details,
				snippets,
			})
		}
		_ => None,
	}
}

fn sanitize_node(raw: &Value) -> Option<GraphNode> {
	let obj = raw.as_object()?;
	let id = first_non_empty(obj, &["id", "name", "label"]);
	if id.is_empty() {
		return None;
	}
	let label = obj
		.get("label")
		.map(coerce_string)
		.filter(|s| !s.is_empty())
		.unwrap_or_else(|| id.clone());
	let group = obj
		.get("group")
		.map(coerce_string)
		.filter(|s| !s.is_empty())
		.unwrap_or_else(|| DEFAULT_GROUP.to_string());

	Some(GraphNode {
		id,
		label,
		size: coerce_number(obj.get("size"), 1.0).max(1.0),
		group,
	})
}

/// Build a graph from an arbitrary `{ nodes, edges }` payload.
///
/// Node ids come from `id`, then `name`, then `label`; the first occurrence
/// of an id wins. Edges are checked in order: empty endpoint, self-loop,
/// unknown endpoint.
pub fn sanitize(raw: &Value) -> GraphData {
	let raw_nodes = array_field(raw, "nodes");
	let raw_edges = array_field(raw, "edges");

	let mut seen = HashSet::new();
	let mut nodes = Vec::with_capacity(raw_nodes.len());
	for node in raw_nodes.iter().filter_map(sanitize_node) {
		if seen.insert(node.id.clone()) {
			nodes.push(node);
		}
	}

	let mut edges = Vec::with_capacity(raw_edges.len());
	for raw_edge in raw_edges {
		let source = endpoint(raw_edge.get("source"));
		let target = endpoint(raw_edge.get("target"));
		if source.is_empty() || target.is_empty() {
			continue;
		}
		if source == target {
			continue;
		}
		if !seen.contains(&source) || !seen.contains(&target) {
			continue;
		}
		let tasks = array_field(raw_edge, "tasks")
			.iter()
			.filter_map(sanitize_task)
			.collect();
		edges.push(GraphEdge {
			source,
			target,
			weight: coerce_number(raw_edge.get("weight"), 1.0).max(1.0),
			tasks,
		});
	}

	debug!(
		"sanitize: kept {}/{} nodes, {}/{} edges",
		nodes.len(),
		raw_nodes.len(),
		edges.len(),
		raw_edges.len()
	);

	GraphData { nodes, edges }
}
