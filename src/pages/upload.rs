use leptos::ev::Event;
use leptos::prelude::*;
use web_sys::HtmlInputElement;

use crate::session::Session;

/// Transcript picker. Saving replaces every tab's content.
#[component]
pub fn UploadPage() -> impl IntoView {
	let session = expect_context::<Session>();

	let on_change = move |ev: Event| {
		let input = event_target::<HtmlInputElement>(&ev);
		let Some(file) = input.files().and_then(|files| files.get(0)) else {
			return;
		};
		// Picking the same file again must fire another change.
		input.set_value("");
		session.upload(file);
	};

	view! {
		<section class="panel upload">
			<h1>"Upload Transcript"</h1>
			<p class="muted">"Drop a .txt file or choose from your computer"</p>
			<label class="dropzone">
				<input
					type="file"
					accept=".txt"
					class="visually-hidden"
					on:change=on_change
					prop:disabled=move || session.is_busy()
				/>
				<div class="dropzone-body">
					<div class="dropzone-title">
						{move || {
							if session.is_busy() {
								"Processing…"
							} else {
								"Drop transcript here or click to choose"
							}
						}}
					</div>
					<div class="muted">
						"Saved: " {move || session.saved_dir.get().unwrap_or_else(|| "—".to_string())}
					</div>
					{move || session.status.get().map(|status| view! { <div class="status-error">{status}</div> })}
				</div>
			</label>
		</section>
	}
}
