use leptos::prelude::*;

use super::interaction::TooltipContent;

const POINTER_OFFSET: f64 = 14.0;
/// Matches the `max-width` of `.graph-tooltip`.
pub const TOOLTIP_MAX_WIDTH: f64 = 260.0;

/// A floating panel anchored next to the pointer, in container pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
	pub left: f64,
	pub top: f64,
	pub content: TooltipContent,
}

impl Overlay {
	/// Place the panel below-right of the pointer, flipping to the left
	/// when it would run past the container's right edge.
	pub fn at_pointer(x: f64, y: f64, container_width: f64, content: TooltipContent) -> Self {
		let mut left = x + POINTER_OFFSET;
		if left + TOOLTIP_MAX_WIDTH > container_width {
			left = (x - POINTER_OFFSET - TOOLTIP_MAX_WIDTH).max(0.0);
		}
		Self {
			left,
			top: y + POINTER_OFFSET,
			content,
		}
	}
}

#[component]
pub fn TooltipOverlay(#[prop(into)] overlay: Signal<Option<Overlay>>) -> impl IntoView {
	move || {
		overlay.get().map(|o| {
			let lines = o
				.content
				.lines
				.into_iter()
				.map(|line| view! { <div class="graph-tooltip-line">{line}</div> })
				.collect_view();
			view! {
				<div
					class="graph-tooltip"
					style=format!("left: {:.0}px; top: {:.0}px;", o.left, o.top)
				>
					<div class="graph-tooltip-title">{o.content.title}</div>
					{lines}
				</div>
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn content() -> TooltipContent {
		TooltipContent {
			title: "Alice".into(),
			lines: vec!["No tasks".into()],
		}
	}

	#[test]
	fn sits_below_right_of_pointer() {
		let o = Overlay::at_pointer(100.0, 50.0, 900.0, content());
		assert_eq!((o.left, o.top), (114.0, 64.0));
	}

	#[test]
	fn flips_left_near_right_edge() {
		let o = Overlay::at_pointer(800.0, 50.0, 900.0, content());
		assert_eq!(o.left, 800.0 - 14.0 - TOOLTIP_MAX_WIDTH);
		let o = Overlay::at_pointer(100.0, 50.0, 200.0, content());
		assert_eq!(o.left, 0.0);
	}
}
