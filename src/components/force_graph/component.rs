use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use crate::config::LayoutConfig;

use super::interaction::{self, Selection};
use super::overlay::{Overlay, TooltipOverlay};
use super::render;
use super::state::{ForceGraphState, Hit};
use super::types::GraphData;

const FRAME_SECONDS: f64 = 0.016;
/// Pointer travel below which a press-release counts as a click.
const CLICK_SLOP: f64 = 4.0;

/// Everything one mounted graph owns. `teardown` releases all of it so a
/// rebuilt graph never shares a running loop or listener with the old one.
#[derive(Clone, Default)]
struct Runtime {
	state: Rc<RefCell<Option<ForceGraphState>>>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	frame: Rc<Cell<Option<i32>>>,
	resize: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl Runtime {
	fn teardown(&self) -> Option<ForceGraphState> {
		if let Some(window) = web_sys::window() {
			if let Some(id) = self.frame.take() {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(cb) = self.resize.borrow_mut().take() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		self.animate.borrow_mut().take();
		self.state.borrow_mut().take()
	}
}

fn host_width(canvas: &HtmlCanvasElement, fallback: f64) -> f64 {
	canvas
		.parent_element()
		.map(|p| p.client_width() as f64)
		.filter(|w| *w > 0.0)
		.unwrap_or(fallback)
}

fn pointer_position(canvas_ref: &NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Interactive collaboration graph on a canvas.
///
/// The layout is rebuilt whenever `data` or `focused` changes. Clicking a node
/// reports its id through `on_select_node`; clicking an edge reports both
/// endpoint ids through `on_select_edge`.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] focused: Signal<Option<String>>,
	#[prop(optional)] on_select_node: Option<Callback<String>>,
	#[prop(optional)] on_select_edge: Option<Callback<(String, String)>>,
	#[prop(optional)] config: Option<LayoutConfig>,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let height = config.height;
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let overlay = RwSignal::new(None::<Overlay>);
	let cursor = RwSignal::new("grab");
	let runtime = Runtime::default();
	let press: Rc<Cell<Option<(f64, f64)>>> = Rc::new(Cell::new(None));

	// Unmounting never re-runs the Effect, so release the loop and the window
	// listener here as well.
	let on_unmount = SendWrapper::new(runtime.clone());
	on_cleanup(move || {
		on_unmount.teardown();
	});

	let rt = runtime.clone();
	Effect::new(move |_| {
		let graph = data.get();
		let focus = focused.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let previous = rt.teardown();
		overlay.set(None);

		let width = host_width(&canvas, config.default_width);
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.map(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>())
		{
			Some(Ok(ctx)) => ctx,
			_ => {
				warn!("graph: canvas has no 2d context");
				return;
			}
		};

		debug!(
			"graph: building layout for {} nodes, {} edges",
			graph.nodes.len(),
			graph.edges.len()
		);
		let mut state = ForceGraphState::new(graph, width, height, config.clone(), previous.as_ref());
		state.set_focus(focus.as_deref());
		*rt.state.borrow_mut() = Some(state);

		let (state_resize, canvas_resize, fallback) =
			(rt.state.clone(), canvas.clone(), config.default_width);
		let on_resize = Closure::<dyn FnMut()>::new(move || {
			let w = host_width(&canvas_resize, fallback);
			canvas_resize.set_width(w as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				let h = s.height;
				s.resize(w, h);
			}
		});
		let _ = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
		*rt.resize.borrow_mut() = Some(on_resize);

		let (state_anim, animate_inner, frame_inner) =
			(rt.state.clone(), rt.animate.clone(), rt.frame.clone());
		*rt.animate.borrow_mut() = Some(Closure::new(move || {
			frame_inner.set(None);
			if !canvas.is_connected() {
				// Unmounted. Drop the loop once this callback has returned.
				state_anim.borrow_mut().take();
				let animate_inner = animate_inner.clone();
				wasm_bindgen_futures::spawn_local(async move {
					animate_inner.borrow_mut().take();
				});
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(FRAME_SECONDS);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *rt.animate.borrow() {
			rt.frame
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let (state_md, press_md) = (runtime.state.clone(), press.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(&canvas_ref, &ev) else {
			return;
		};
		press_md.set(Some((x, y)));
		if let Some(ref mut s) = *state_md.borrow_mut() {
			match s.node_at_position(x, y) {
				Some(idx) => {
					s.begin_drag(idx, x, y);
					cursor.set("grabbing");
				}
				None => s.begin_pan(x, y),
			}
		}
	};

	let state_mm = runtime.state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(&canvas_ref, &ev) else {
			return;
		};
		let mut guard = state_mm.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};
		if s.is_dragging() {
			s.drag_to(x, y);
			overlay.set(None);
			return;
		}
		if s.pan.active {
			s.pan_to(x, y);
			overlay.set(None);
			return;
		}

		let hit = s.hit_test(x, y);
		s.set_hover(hit);
		let content = match hit {
			Some(Hit::Node(idx)) => interaction::node_tooltip(&s.graph, &s.adjacency, idx),
			Some(Hit::Edge(idx)) => interaction::edge_tooltip(&s.graph, idx),
			None => None,
		};
		cursor.set(if hit.is_some() { "pointer" } else { "grab" });
		overlay.set(content.map(|c| Overlay::at_pointer(x, y, s.width, c)));
	};

	let (state_mu, press_mu) = (runtime.state.clone(), press.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let pressed_at = press_mu.take();
		let Some((x, y)) = pointer_position(&canvas_ref, &ev) else {
			return;
		};
		let selection = {
			let mut guard = state_mu.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			s.end_drag();
			s.end_pan();
			cursor.set("grab");
			let is_click = pressed_at
				.map(|(px, py)| ((x - px).powi(2) + (y - py).powi(2)).sqrt() < CLICK_SLOP)
				.unwrap_or(false);
			if is_click {
				s.hit_test(x, y)
					.and_then(|hit| interaction::selection_for(&s.graph, hit))
			} else {
				None
			}
		};
		// Callbacks run with the state released; they may rebuild the graph.
		match selection {
			Some(Selection::Node(id)) => {
				if let Some(cb) = on_select_node {
					cb.run(id);
				}
			}
			Some(Selection::Edge(a, b)) => {
				if let Some(cb) = on_select_edge {
					cb.run((a, b));
				}
			}
			None => {}
		}
	};

	let (state_ml, press_ml) = (runtime.state.clone(), press.clone());
	let on_mouseleave = move |_: MouseEvent| {
		press_ml.set(None);
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.end_drag();
			s.end_pan();
			s.set_hover(None);
		}
		cursor.set("grab");
		overlay.set(None);
	};

	let state_wh = runtime.state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_position(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	view! {
		<div class="graph-host" style=format!("height: {height}px;")>
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style:cursor=move || cursor.get()
			/>
			<TooltipOverlay overlay=overlay />
		</div>
	}
}
