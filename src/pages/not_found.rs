use leptos::prelude::*;
use leptos_router::components::A;

#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<section class="panel">
			<h1>"Nothing here"</h1>
			<p class="muted">
				"This tab does not exist. " <A href="/">"Back to upload"</A>
			</p>
		</section>
	}
}
