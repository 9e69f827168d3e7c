//! Browser viewer for processed meeting transcripts: upload, collaboration
//! graph, grouped summary with chat, and a to-do list.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

mod api;
mod components;
mod config;
mod meeting;
mod pages;
mod session;
mod storage;

use crate::components::tabs::TabBar;
use crate::config::ApiConfig;
use crate::pages::not_found::NotFound;
use crate::pages::orion::OrionPage;
use crate::pages::summary::SummaryPage;
use crate::pages::todo::TodoPage;
use crate::pages::upload::UploadPage;
use crate::session::Session;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Tabbed app. The newest run is restored from the backend on start.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let session = Session::new(ApiConfig::default());
	provide_context(session);
	session.load_latest();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Orion · Meeting Viewer" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<TabBar />
			<main class="page">
				<Routes fallback=|| view! { <NotFound /> }>
					<Route path=path!("/") view=UploadPage />
					<Route path=path!("/orion") view=OrionPage />
					<Route path=path!("/summary") view=SummaryPage />
					<Route path=path!("/todo") view=TodoPage />
				</Routes>
			</main>
		</Router>
	}
}
