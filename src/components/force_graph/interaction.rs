use super::adjacency::Adjacency;
use super::state::Hit;
use super::types::{GraphData, Task};

const EDGE_TASK_LIMIT: usize = 2;
const NODE_TASK_LIMIT: usize = 3;
const NO_TASKS: &str = "No tasks";
const NO_PARTNERS: &str = "—";

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipContent {
	pub title: String,
	pub lines: Vec<String>,
}

/// What a click picked, by node id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
	Node(String),
	Edge(String, String),
}

fn task_lines<'a>(tasks: impl Iterator<Item = &'a Task>, limit: usize) -> Vec<String> {
	let lines: Vec<String> = tasks.take(limit).map(|t| format!("• {}", t.title)).collect();
	if lines.is_empty() {
		vec![NO_TASKS.to_string()]
	} else {
		lines
	}
}

fn label_of(graph: &GraphData, id: &str) -> String {
	graph
		.node(id)
		.map(|n| n.label.clone())
		.unwrap_or_else(|| id.to_string())
}

pub fn edge_tooltip(graph: &GraphData, edge: usize) -> Option<TooltipContent> {
	let edge = graph.edges.get(edge)?;
	Some(TooltipContent {
		title: format!(
			"{} ⇄ {}",
			label_of(graph, &edge.source),
			label_of(graph, &edge.target)
		),
		lines: task_lines(edge.tasks.iter(), EDGE_TASK_LIMIT),
	})
}

pub fn node_tooltip(graph: &GraphData, adjacency: &Adjacency, node: usize) -> Option<TooltipContent> {
	let data = graph.nodes.get(node)?;
	let partners: Vec<&str> = adjacency
		.neighbors(node)
		.iter()
		.filter_map(|&n| graph.nodes.get(n))
		.map(|n| n.label.as_str())
		.collect();
	let partners = if partners.is_empty() {
		NO_PARTNERS.to_string()
	} else {
		partners.join(", ")
	};

	let mut lines = vec![format!("Partners: {partners}")];
	lines.extend(task_lines(adjacency.tasks_for(graph, node), NODE_TASK_LIMIT));
	Some(TooltipContent {
		title: data.label.clone(),
		lines,
	})
}

pub fn selection_for(graph: &GraphData, hit: Hit) -> Option<Selection> {
	match hit {
		Hit::Node(idx) => graph.nodes.get(idx).map(|n| Selection::Node(n.id.clone())),
		Hit::Edge(idx) => graph
			.edges
			.get(idx)
			.map(|e| Selection::Edge(e.source.clone(), e.target.clone())),
	}
}

/// Resolve free text to a node id: exact id, then exact label, then the
/// first label containing the query. Matching ignores case.
pub fn resolve_search<'a>(graph: &'a GraphData, query: &str) -> Option<&'a str> {
	let needle = query.trim().to_lowercase();
	if needle.is_empty() {
		return None;
	}
	let nodes = &graph.nodes;
	nodes
		.iter()
		.find(|n| n.id.to_lowercase() == needle)
		.or_else(|| nodes.iter().find(|n| n.label.to_lowercase() == needle))
		.or_else(|| nodes.iter().find(|n| n.label.to_lowercase().contains(&needle)))
		.map(|n| n.id.as_str())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::super::merge::merge_reciprocal;
	use super::super::sanitize::sanitize;
	use super::*;

	fn graph() -> GraphData {
		merge_reciprocal(&sanitize(&json!({
			"nodes": [
				{ "id": "u1", "label": "Alice" },
				{ "id": "u2", "label": "Bob" },
				{ "id": "u3", "label": "Alicia" },
				{ "id": "bob", "label": "Robert" },
				{ "id": "loner" },
			],
			"edges": [
				{ "source": "u1", "target": "u2", "tasks": [
					{ "title": "Slides" }, { "title": "Budget" }, { "title": "Venue" },
				] },
				{ "source": "u3", "target": "u1", "tasks": [{ "title": "Hiring plan" }] },
				{ "source": "u2", "target": "u1" },
				{ "source": "u3", "target": "bob" },
			],
		})))
	}

	#[test]
	fn edge_tooltip_lists_two_tasks() {
		let g = graph();
		let tip = edge_tooltip(&g, 0).unwrap();
		assert_eq!(tip.title, "Alice ⇄ Bob");
		assert_eq!(tip.lines, ["• Slides", "• Budget"]);
		let tip = edge_tooltip(&g, 2).unwrap();
		assert_eq!(tip.lines, ["No tasks"]);
		assert!(edge_tooltip(&g, 9).is_none());
	}

	#[test]
	fn node_tooltip_lists_partners_and_three_tasks() {
		let g = graph();
		let adj = Adjacency::build(&g);
		let tip = node_tooltip(&g, &adj, 0).unwrap();
		assert_eq!(tip.title, "Alice");
		assert_eq!(
			tip.lines,
			["Partners: Bob, Alicia", "• Slides", "• Budget", "• Venue"]
		);
	}

	#[test]
	fn isolated_node_tooltip_uses_placeholders() {
		let g = graph();
		let adj = Adjacency::build(&g);
		let tip = node_tooltip(&g, &adj, 4).unwrap();
		assert_eq!(tip.title, "loner");
		assert_eq!(tip.lines, ["Partners: —", "No tasks"]);
	}

	#[test]
	fn clicks_select_by_id() {
		let g = graph();
		assert_eq!(
			selection_for(&g, Hit::Node(1)),
			Some(Selection::Node("u2".into()))
		);
		assert_eq!(
			selection_for(&g, Hit::Edge(1)),
			Some(Selection::Edge("u1".into(), "u3".into()))
		);
		assert_eq!(selection_for(&g, Hit::Node(42)), None);
	}

	#[test]
	fn search_prefers_id_then_label_then_substring() {
		let g = graph();
		assert_eq!(resolve_search(&g, "BOB"), Some("bob"));
		assert_eq!(resolve_search(&g, "  alicia "), Some("u3"));
		assert_eq!(resolve_search(&g, "rob"), Some("bob"));
		assert_eq!(resolve_search(&g, "ali"), Some("u1"));
	}

	#[test]
	fn search_without_match_is_none() {
		let g = graph();
		assert_eq!(resolve_search(&g, "zed"), None);
		assert_eq!(resolve_search(&g, "   "), None);
	}
}
