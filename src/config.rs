//! Tuning constants for the layout engine and the backend client.

/// Cooling schedule of the force simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
	/// The simulation stops once alpha drops below this.
	pub alpha_min: f64,
	/// Number of ticks for alpha to decay from 1 to `alpha_min`.
	pub cooling_ticks: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			alpha_min: 0.001,
			cooling_ticks: 300.0,
			velocity_decay: 0.4,
		}
	}
}

/// Forces, geometry and interaction constants of the collaboration graph.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Rest length of link springs.
	pub link_distance: f64,
	/// Link spring stiffness; low enough that clusters stay loose.
	pub link_strength: f64,
	/// Many-body charge; negative repels.
	pub charge: f64,
	/// Collision radius is `collide_base + collide_per_size * size`.
	pub collide_base: f64,
	/// See `collide_base`.
	pub collide_per_size: f64,
	/// Drawn radius is `node_base + node_per_size * size`.
	pub node_base: f64,
	/// See `node_base`.
	pub node_per_size: f64,
	/// Stroke width is `edge_base_width + weight`.
	pub edge_base_width: f64,
	/// Extra pick tolerance around edges, in graph units.
	pub edge_hit_slop: f64,
	/// Lower bound of the zoom scale.
	pub zoom_min: f64,
	/// Upper bound of the zoom scale.
	pub zoom_max: f64,
	/// Multiplicative zoom per wheel notch.
	pub zoom_step: f64,
	/// Scale the viewport animates to when a node is focused.
	pub focus_scale: f64,
	/// Duration of the focus transition, seconds.
	pub focus_duration: f64,
	/// Delay between attempts to focus a node that has no position yet, seconds.
	pub focus_retry_delay: f64,
	/// Attempts before a pending focus request is dropped.
	pub focus_retries: u32,
	/// Alpha target while a node is dragged.
	pub drag_alpha_target: f64,
	/// Opacity of nodes and labels outside the focused neighbourhood.
	pub dimmed_node_opacity: f64,
	/// Opacity of edges not touching the focused node.
	pub dimmed_edge_opacity: f64,
	/// Opacity of edges touching the focused node.
	pub focused_edge_opacity: f64,
	/// Width used when the host element reports none.
	pub default_width: f64,
	/// Viewport height.
	pub height: f64,
	/// Simulation cooling schedule.
	pub simulation: SimulationConfig,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			link_distance: 120.0,
			link_strength: 0.25,
			charge: -260.0,
			collide_base: 10.0,
			collide_per_size: 3.0,
			node_base: 8.0,
			node_per_size: 3.0,
			edge_base_width: 1.0,
			edge_hit_slop: 3.0,
			zoom_min: 0.3,
			zoom_max: 2.5,
			zoom_step: 1.1,
			focus_scale: 1.6,
			focus_duration: 0.75,
			focus_retry_delay: 0.06,
			focus_retries: 50,
			drag_alpha_target: 0.3,
			dimmed_node_opacity: 0.35,
			dimmed_edge_opacity: 0.15,
			focused_edge_opacity: 1.0,
			default_width: 900.0,
			height: 560.0,
			simulation: SimulationConfig::default(),
		}
	}
}

impl LayoutConfig {
	pub fn node_radius(&self, size: f64) -> f64 {
		self.node_base + self.node_per_size * size
	}

	pub fn collide_radius(&self, size: f64) -> f64 {
		self.collide_base + self.collide_per_size * size
	}

	pub fn edge_width(&self, weight: f64) -> f64 {
		self.edge_base_width + weight
	}
}

/// Transcript backend endpoints and request defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
	/// Prefix of every endpoint.
	pub base: String,
	/// Passages retrieved per question.
	pub top_k: u32,
	/// Characters of context around a snippet match.
	pub snippet_window: u32,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			base: "/api".to_string(),
			top_k: 4,
			snippet_window: 600,
		}
	}
}

impl ApiConfig {
	pub fn url(&self, path: &str) -> String {
		format!("{}/{}", self.base.trim_end_matches('/'), path.trim_start_matches('/'))
	}
}
