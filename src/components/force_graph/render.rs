use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;

const BACKGROUND: &str = "#0b0f14";
const EDGE_COLOR: &str = "rgba(148, 163, 184, 0.35)";
const EDGE_HOVER_COLOR: &str = "rgba(110, 231, 249, 0.8)";
const NODE_STROKE: &str = "rgba(255, 255, 255, 0.35)";
const LABEL_COLOR: &str = "#e6eef7";
const LABEL_OFFSET: (f64, f64) = (12.0, 4.0);

/// Node colour by group.
pub fn group_color(group: &str) -> &'static str {
	match group {
		"1" => "#6ee7f9",
		"2" => "#a78bfa",
		"3" => "#fde68a",
		_ => "#93c5fd",
	}
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	draw_labels(state, ctx);
	ctx.restore();
	ctx.set_global_alpha(1.0);
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let particles = state.sim.particles();
	ctx.set_line_cap("round");
	for (edge, s, t) in state.adjacency.links() {
		let (a, b) = (&particles[s], &particles[t]);
		if !a.is_placed() || !b.is_placed() {
			continue;
		}
		let hovered = state.hover.edge == Some(edge);
		ctx.set_global_alpha(state.edge_opacity(edge));
		ctx.set_stroke_style_str(if hovered { EDGE_HOVER_COLOR } else { EDGE_COLOR });
		ctx.set_line_width(state.config.edge_width(state.graph.edges[edge].weight));
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	for (idx, (node, p)) in state
		.graph
		.nodes
		.iter()
		.zip(state.sim.particles())
		.enumerate()
	{
		if !p.is_placed() {
			continue;
		}
		let radius = state.node_radius(idx);
		ctx.set_global_alpha(state.node_opacity(idx));
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(group_color(&node.group));
		ctx.fill();
		ctx.set_stroke_style_str(NODE_STROKE);
		ctx.set_line_width(0.5);
		ctx.stroke();

		let highlighted = state.hover.node == Some(idx) || state.focused() == Some(idx);
		if highlighted {
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, radius + 3.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}
	}
}

fn draw_labels(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_font("12px sans-serif");
	ctx.set_fill_style_str(LABEL_COLOR);
	for (idx, (node, p)) in state
		.graph
		.nodes
		.iter()
		.zip(state.sim.particles())
		.enumerate()
	{
		if !p.is_placed() {
			continue;
		}
		ctx.set_global_alpha(state.node_opacity(idx));
		let _ = ctx.fill_text(&node.label, p.x + LABEL_OFFSET.0, p.y + LABEL_OFFSET.1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_groups_share_default_colour() {
		assert_eq!(group_color("1"), "#6ee7f9");
		assert_eq!(group_color("7"), group_color(""));
	}
}
