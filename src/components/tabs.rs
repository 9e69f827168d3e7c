use leptos::prelude::*;
use leptos_router::components::A;

const TABS: [(&str, &str); 4] = [
	("/", "Upload"),
	("/orion", "Orion"),
	("/summary", "Summary"),
	("/todo", "To-Do"),
];

/// Top navigation. The router marks the active link with `aria-current`.
#[component]
pub fn TabBar() -> impl IntoView {
	view! {
		<nav class="tab-bar">
			{TABS
				.into_iter()
				.map(|(href, label)| {
					view! {
						<A href=href attr:class="tab">
							<span class="tab-label">{label}</span>
						</A>
					}
				})
				.collect_view()}
		</nav>
	}
}
