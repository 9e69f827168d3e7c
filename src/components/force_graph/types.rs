use serde::{Deserialize, Serialize};

/// A unit of work attached to an edge between two collaborators.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
	pub title: String,
	#[serde(default)]
	pub details: Option<String>,
	#[serde(default)]
	pub snippets: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	pub size: f64,
	pub group: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	pub weight: f64,
	#[serde(default)]
	pub tasks: Vec<Task>,
}

/// Validated collaboration graph. Node ids are unique and every edge
/// references two distinct nodes of the same graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl GraphData {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|node| node.id == id)
	}

	/// A graph worth drawing needs at least one connection.
	pub fn is_renderable(&self) -> bool {
		!self.nodes.is_empty() && !self.edges.is_empty()
	}
}
