use std::collections::HashMap;

use log::debug;

use crate::config::LayoutConfig;

use super::adjacency::Adjacency;
use super::forces::{CenterForce, CollideForce, LinkForce, ManyBodyForce};
use super::simulation::{Particle, Simulation};
use super::types::GraphData;

/// Screen position of graph point `p` is `p * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	fn lerp(&self, to: &ViewTransform, t: f64) -> ViewTransform {
		ViewTransform {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

fn ease_cubic_in_out(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HoverState {
	pub node: Option<usize>,
	pub edge: Option<usize>,
}

/// What lies under the pointer. Nodes are drawn above edges and win ties.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hit {
	Node(usize),
	Edge(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusOutcome {
	/// Focus removed.
	Cleared,
	/// The id is not in the graph; nothing changed.
	Unknown,
	/// The viewport is animating towards the node.
	Started,
	/// The node has no position yet; the transition starts once it has.
	Deferred,
}

#[derive(Clone, Debug)]
struct Transition {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

#[derive(Clone, Debug)]
struct PendingFocus {
	node: usize,
	waited: f64,
	retries_left: u32,
}

/// Layout and viewport state for one graph. Rebuilt whenever the graph
/// changes; nothing here outlives the canvas that owns it.
pub struct ForceGraphState {
	pub graph: GraphData,
	pub adjacency: Adjacency,
	pub sim: Simulation,
	pub config: LayoutConfig,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	focus: Option<usize>,
	transition: Option<Transition>,
	pending_focus: Option<PendingFocus>,
}

impl ForceGraphState {
	/// Build the simulation for `graph`. When `previous` laid out the very
	/// same graph its particles, temperature and viewport are carried over, so
	/// a layout that was still settling keeps settling.
	pub fn new(
		graph: GraphData,
		width: f64,
		height: f64,
		config: LayoutConfig,
		previous: Option<&ForceGraphState>,
	) -> Self {
		let warm = previous.filter(|prev| prev.graph == graph);
		let carried: HashMap<&str, &Particle> = warm
			.map(|prev| {
				prev.graph
					.nodes
					.iter()
					.map(|n| n.id.as_str())
					.zip(prev.sim.particles())
					.collect()
			})
			.unwrap_or_default();

		let particles = graph
			.nodes
			.iter()
			.map(|node| {
				carried
					.get(node.id.as_str())
					.map_or_else(Particle::unplaced, |p| p.carried())
			})
			.collect();

		let adjacency = Adjacency::build(&graph);
		let links = adjacency.links().map(|(_, s, t)| (s, t)).collect();
		let radii = graph
			.nodes
			.iter()
			.map(|n| config.collide_radius(n.size))
			.collect();

		let mut sim = Simulation::new(particles, (width / 2.0, height / 2.0), &config.simulation)
			.with_force(LinkForce::new(links, config.link_distance, config.link_strength))
			.with_force(ManyBodyForce::new(config.charge))
			.with_force(CenterForce::new(width / 2.0, height / 2.0))
			.with_force(CollideForce::new(radii));
		if let Some(prev) = warm {
			sim.resume(&prev.sim);
		}

		Self {
			transform: warm.map(|prev| prev.transform).unwrap_or_default(),
			graph,
			adjacency,
			sim,
			config,
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			focus: None,
			transition: None,
			pending_focus: None,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_radius(&self, idx: usize) -> f64 {
		self.graph
			.nodes
			.get(idx)
			.map(|n| self.config.node_radius(n.size))
			.unwrap_or(self.config.node_base)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.sim
			.particles()
			.iter()
			.enumerate()
			.filter(|(_, p)| p.is_placed())
			.map(|(idx, p)| (idx, ((p.x - gx).powi(2) + (p.y - gy).powi(2)).sqrt()))
			.filter(|&(idx, dist)| dist <= self.node_radius(idx))
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(idx, _)| idx)
	}

	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let particles = self.sim.particles();
		self.adjacency
			.links()
			.filter(|&(_, s, t)| particles[s].is_placed() && particles[t].is_placed())
			.map(|(edge, s, t)| {
				let (a, b) = (&particles[s], &particles[t]);
				(edge, distance_to_segment(gx, gy, a.x, a.y, b.x, b.y))
			})
			.filter(|&(edge, dist)| {
				let width = self.config.edge_width(self.graph.edges[edge].weight);
				dist <= width / 2.0 + self.config.edge_hit_slop
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(edge, _)| edge)
	}

	pub fn hit_test(&self, sx: f64, sy: f64) -> Option<Hit> {
		self.node_at_position(sx, sy)
			.map(Hit::Node)
			.or_else(|| self.edge_at_position(sx, sy).map(Hit::Edge))
	}

	pub fn set_hover(&mut self, hit: Option<Hit>) {
		self.hover = match hit {
			Some(Hit::Node(idx)) => HoverState {
				node: Some(idx),
				edge: None,
			},
			Some(Hit::Edge(idx)) => HoverState {
				node: None,
				edge: Some(idx),
			},
			None => HoverState::default(),
		};
	}

	pub fn begin_drag(&mut self, idx: usize, sx: f64, sy: f64) {
		let Some(p) = self.sim.particle_mut(idx) else {
			return;
		};
		let (x, y) = (p.x, p.y);
		p.pin(x, y);
		self.drag = DragState {
			node: Some(idx),
			start_x: sx,
			start_y: sy,
			node_start_x: x,
			node_start_y: y,
		};
		self.sim.set_alpha_target(self.config.drag_alpha_target);
		self.sim.restart();
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node else {
			return;
		};
		let (nx, ny) = (
			self.drag.node_start_x + (sx - self.drag.start_x) / self.transform.k,
			self.drag.node_start_y + (sy - self.drag.start_y) / self.transform.k,
		);
		if let Some(p) = self.sim.particle_mut(idx) {
			p.pin(nx, ny);
		}
	}

	/// Release the dragged node back to the simulation and let it cool.
	pub fn end_drag(&mut self) {
		if let Some(idx) = self.drag.node.take() {
			if let Some(p) = self.sim.particle_mut(idx) {
				p.unpin();
			}
			self.sim.set_alpha_target(0.0);
		}
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.node.is_some()
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.transition = None;
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Zoom around the pointer, clamped to the configured scale extent.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.transition = None;
		let factor = if delta_y > 0.0 {
			1.0 / self.config.zoom_step
		} else {
			self.config.zoom_step
		};
		let new_k = (self.transform.k * factor).clamp(self.config.zoom_min, self.config.zoom_max);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn focused(&self) -> Option<usize> {
		self.focus
	}

	pub fn set_focus(&mut self, id: Option<&str>) -> FocusOutcome {
		let Some(id) = id else {
			self.focus = None;
			self.pending_focus = None;
			return FocusOutcome::Cleared;
		};
		let Some(idx) = self.adjacency.node_index(id) else {
			debug!("focus: unknown node {id:?}");
			return FocusOutcome::Unknown;
		};
		self.focus = Some(idx);
		if self.start_focus_transition(idx) {
			self.pending_focus = None;
			FocusOutcome::Started
		} else {
			self.pending_focus = Some(PendingFocus {
				node: idx,
				waited: 0.0,
				retries_left: self.config.focus_retries,
			});
			FocusOutcome::Deferred
		}
	}

	pub fn focus_target(&self, idx: usize) -> Option<ViewTransform> {
		let p = self.sim.particle(idx).filter(|p| p.is_placed())?;
		let k = self
			.config
			.focus_scale
			.clamp(self.config.zoom_min, self.config.zoom_max);
		Some(ViewTransform {
			x: self.width / 2.0 - p.x * k,
			y: self.height / 2.0 - p.y * k,
			k,
		})
	}

	fn start_focus_transition(&mut self, idx: usize) -> bool {
		let Some(to) = self.focus_target(idx) else {
			return false;
		};
		self.transition = Some(Transition {
			from: self.transform,
			to,
			elapsed: 0.0,
			duration: self.config.focus_duration,
		});
		true
	}

	pub fn is_transitioning(&self) -> bool {
		self.transition.is_some()
	}

	pub fn has_pending_focus(&self) -> bool {
		self.pending_focus.is_some()
	}

	/// Opacity of a node and its label under the current focus.
	pub fn node_opacity(&self, idx: usize) -> f64 {
		match self.focus {
			Some(f) if f != idx && !self.adjacency.is_adjacent(f, idx) => {
				self.config.dimmed_node_opacity
			}
			_ => 1.0,
		}
	}

	pub fn edge_opacity(&self, edge: usize) -> f64 {
		let Some(f) = self.focus else {
			return 1.0;
		};
		match self.adjacency.endpoints(edge) {
			Some((s, t)) if s == f || t == f => self.config.focused_edge_opacity,
			_ => self.config.dimmed_edge_opacity,
		}
	}

	/// Advance the simulation and the viewport animation by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		if self.sim.is_running() {
			self.sim.tick();
		}
		self.advance_pending_focus(dt);
		self.advance_transition(dt);
	}

	fn advance_pending_focus(&mut self, dt: f64) {
		let Some(mut pending) = self.pending_focus.take() else {
			return;
		};
		pending.waited += dt;
		if pending.waited < self.config.focus_retry_delay {
			self.pending_focus = Some(pending);
			return;
		}
		if self.start_focus_transition(pending.node) {
			return;
		}
		pending.waited = 0.0;
		pending.retries_left = pending.retries_left.saturating_sub(1);
		if pending.retries_left == 0 {
			debug!("focus: node {} never got a position", pending.node);
			return;
		}
		self.pending_focus = Some(pending);
	}

	fn advance_transition(&mut self, dt: f64) {
		let Some(transition) = self.transition.as_mut() else {
			return;
		};
		transition.elapsed += dt;
		let t = if transition.duration > 0.0 {
			(transition.elapsed / transition.duration).min(1.0)
		} else {
			1.0
		};
		if t >= 1.0 {
			self.transform = transition.to;
			self.transition = None;
		} else {
			self.transform = transition.from.lerp(&transition.to, ease_cubic_in_out(t));
		}
	}

	/// Follow a new viewport size; the layout recentres on the next ticks.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.sim.recenter(width / 2.0, height / 2.0);
		self.sim.restart();
	}
}

fn distance_to_segment(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
	let (dx, dy) = (bx - ax, by - ay);
	let len2 = dx * dx + dy * dy;
	let t = if len2 > 0.0 {
		(((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
	} else {
		0.0
	};
	let (cx, cy) = (ax + t * dx, ay + t * dy);
	((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::super::merge::merge_reciprocal;
	use super::super::sanitize::sanitize;
	use super::*;

	const FRAME: f64 = 0.016;

	fn graph() -> GraphData {
		merge_reciprocal(&sanitize(&json!({
			"nodes": [{ "id": "a" }, { "id": "b" }, { "id": "c" }, { "id": "d" }],
			"edges": [
				{ "source": "a", "target": "b" },
				{ "source": "b", "target": "c" },
				{ "source": "c", "target": "d" },
			],
		})))
	}

	fn state() -> ForceGraphState {
		ForceGraphState::new(graph(), 900.0, 560.0, LayoutConfig::default(), None)
	}

	fn settled() -> ForceGraphState {
		let mut s = state();
		while s.sim.is_running() {
			s.tick(FRAME);
		}
		s
	}

	fn screen_pos(s: &ForceGraphState, idx: usize) -> (f64, f64) {
		let p = &s.sim.particles()[idx];
		(p.x * s.transform.k + s.transform.x, p.y * s.transform.k + s.transform.y)
	}

	#[test]
	fn unknown_focus_is_a_no_op() {
		let mut s = settled();
		let before = s.transform;
		assert_eq!(s.set_focus(Some("zz")), FocusOutcome::Unknown);
		assert_eq!(s.focused(), None);
		assert!(!s.is_transitioning());
		s.tick(FRAME);
		assert_eq!(s.transform, before);
	}

	#[test]
	fn focus_before_first_tick_is_deferred_then_runs() {
		let mut s = state();
		assert_eq!(s.set_focus(Some("c")), FocusOutcome::Deferred);
		assert_eq!(s.focused(), Some(2));
		assert!(s.has_pending_focus());
		for _ in 0..10 {
			s.tick(FRAME);
		}
		assert!(!s.has_pending_focus());
		assert!(s.is_transitioning());
	}

	#[test]
	fn focus_transition_centres_node_at_focus_scale() {
		let mut s = settled();
		assert_eq!(s.set_focus(Some("b")), FocusOutcome::Started);
		let target = s.focus_target(1).unwrap();
		let steps = (s.config.focus_duration / FRAME).ceil() as usize + 1;
		for _ in 0..steps {
			s.tick(FRAME);
		}
		assert!(!s.is_transitioning());
		assert_eq!(s.transform, target);
		assert_eq!(s.transform.k, 1.6);
	}

	#[test]
	fn transition_is_monotonic_in_scale() {
		let mut s = settled();
		s.set_focus(Some("a"));
		let mut last = s.transform.k;
		while s.is_transitioning() {
			s.tick(FRAME);
			assert!(s.transform.k >= last);
			last = s.transform.k;
		}
	}

	#[test]
	fn pan_interrupts_transition() {
		let mut s = settled();
		s.set_focus(Some("a"));
		s.tick(FRAME);
		s.begin_pan(10.0, 10.0);
		assert!(!s.is_transitioning());
		s.pan_to(30.0, 5.0);
		let moved = s.transform;
		s.end_pan();
		s.pan_to(100.0, 100.0);
		assert_eq!(s.transform, moved);
	}

	#[test]
	fn clearing_focus_removes_dimming() {
		let mut s = settled();
		s.set_focus(Some("a"));
		assert!(s.node_opacity(3) < 1.0);
		assert_eq!(s.set_focus(None), FocusOutcome::Cleared);
		assert_eq!(s.node_opacity(3), 1.0);
		assert_eq!(s.edge_opacity(2), 1.0);
	}

	#[test]
	fn focus_dims_only_non_adjacent_elements() {
		let mut s = settled();
		s.set_focus(Some("b"));
		let cfg = LayoutConfig::default();
		assert_eq!(s.node_opacity(1), 1.0);
		assert_eq!(s.node_opacity(0), 1.0);
		assert_eq!(s.node_opacity(2), 1.0);
		assert_eq!(s.node_opacity(3), cfg.dimmed_node_opacity);
		assert_eq!(s.edge_opacity(0), cfg.focused_edge_opacity);
		assert_eq!(s.edge_opacity(1), cfg.focused_edge_opacity);
		assert_eq!(s.edge_opacity(2), cfg.dimmed_edge_opacity);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut s = state();
		for _ in 0..100 {
			s.zoom_at(450.0, 280.0, -1.0);
		}
		assert_eq!(s.transform.k, 2.5);
		for _ in 0..100 {
			s.zoom_at(450.0, 280.0, 1.0);
		}
		assert_eq!(s.transform.k, 0.3);
	}

	#[test]
	fn zoom_keeps_pointer_anchor() {
		let mut s = state();
		let before = s.screen_to_graph(200.0, 100.0);
		s.zoom_at(200.0, 100.0, -1.0);
		let after = s.screen_to_graph(200.0, 100.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn drag_pins_node_and_release_resumes_simulation() {
		let mut s = settled();
		assert!(!s.sim.is_running());
		let (sx, sy) = screen_pos(&s, 0);
		assert_eq!(s.hit_test(sx, sy), Some(Hit::Node(0)));

		s.begin_drag(0, sx, sy);
		assert!(s.sim.is_running());
		s.drag_to(sx + 50.0, sy + 20.0);
		for _ in 0..20 {
			s.tick(FRAME);
		}
		let p = &s.sim.particles()[0];
		assert!(p.is_pinned());
		let (px, py) = (p.x, p.y);
		let (nx, ny) = screen_pos(&s, 0);
		assert!((nx - (sx + 50.0)).abs() < 1e-9);
		assert!((ny - (sy + 20.0)).abs() < 1e-9);

		s.end_drag();
		assert!(!s.is_dragging());
		s.tick(FRAME);
		let p = &s.sim.particles()[0];
		assert!(!p.is_pinned());
		assert!((p.x, p.y) != (px, py));
	}

	#[test]
	fn edge_hit_between_endpoints() {
		let s = settled();
		let (ax, ay) = screen_pos(&s, 0);
		let (bx, by) = screen_pos(&s, 1);
		let (mx, my) = ((ax + bx) / 2.0, (ay + by) / 2.0);
		assert_eq!(s.hit_test(mx, my), Some(Hit::Edge(0)));
		assert_eq!(s.hit_test(-5000.0, -5000.0), None);
	}

	#[test]
	fn warm_start_keeps_positions_for_same_graph() {
		let first = settled();
		let second = ForceGraphState::new(graph(), 900.0, 560.0, LayoutConfig::default(), Some(&first));
		assert!(!second.sim.is_running());
		for (a, b) in first.sim.particles().iter().zip(second.sim.particles()) {
			assert_eq!((a.x, a.y), (b.x, b.y));
		}
		let mut second = second;
		assert_eq!(second.set_focus(Some("d")), FocusOutcome::Started);

		let other = GraphData::default();
		let third = ForceGraphState::new(other, 900.0, 560.0, LayoutConfig::default(), Some(&first));
		assert!(third.sim.is_running());
	}

	fn distance(s: &ForceGraphState, a: usize, b: usize) -> f64 {
		let (p, q) = (&s.sim.particles()[a], &s.sim.particles()[b]);
		((p.x - q.x).powi(2) + (p.y - q.y).powi(2)).sqrt()
	}

	#[test]
	fn rebuild_mid_layout_keeps_settling() {
		let mut first = state();
		for _ in 0..5 {
			first.tick(FRAME);
		}
		let mut second =
			ForceGraphState::new(graph(), 900.0, 560.0, LayoutConfig::default(), Some(&first));
		assert!(second.sim.is_running());
		assert_eq!(second.sim.alpha(), first.sim.alpha());
		for (a, b) in first.sim.particles().iter().zip(second.sim.particles()) {
			assert_eq!((a.x, a.y, a.vx, a.vy), (b.x, b.y, b.vx, b.vy));
		}

		let before = distance(&second, 0, 1);
		for _ in 0..300 {
			second.tick(FRAME);
		}
		assert!((distance(&second, 0, 1) - before).abs() > 1e-3);
	}

	#[test]
	fn rebuild_before_first_tick_places_nodes_apart() {
		let first = state();
		let mut second =
			ForceGraphState::new(graph(), 900.0, 560.0, LayoutConfig::default(), Some(&first));
		assert!(second.sim.particles().iter().all(|p| !p.is_placed()));
		assert!(second.sim.is_running());
		second.tick(FRAME);
		let particles = second.sim.particles();
		assert!(particles.iter().all(|p| p.is_placed()));
		assert!(particles.iter().all(|p| (p.x, p.y) != (0.0, 0.0)));
		for i in 0..particles.len() {
			for j in i + 1..particles.len() {
				assert!(distance(&second, i, j) > 1.0);
			}
		}
	}

	#[test]
	fn resize_recentres_layout() {
		let mut s = settled();
		s.resize(1400.0, 560.0);
		assert!(s.sim.is_running());
		s.tick(FRAME);
		let n = s.sim.particles().len() as f64;
		let cx = s.sim.particles().iter().map(|p| p.x).sum::<f64>() / n;
		assert!((cx - 700.0).abs() < 1.0, "centre {cx}");
	}

	#[test]
	fn segment_distance() {
		assert_eq!(distance_to_segment(5.0, 3.0, 0.0, 0.0, 10.0, 0.0), 3.0);
		assert_eq!(distance_to_segment(-4.0, 3.0, 0.0, 0.0, 10.0, 0.0), 5.0);
		assert_eq!(distance_to_segment(1.0, 1.0, 0.0, 0.0, 0.0, 0.0), 2f64.sqrt());
	}
}
