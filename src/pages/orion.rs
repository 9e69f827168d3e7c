use leptos::ev::{MouseEvent, SubmitEvent};
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info, warn};

use crate::api;
use crate::components::force_graph::{
	ForceGraphCanvas, GraphData, Task, merge_reciprocal, resolve_search, sanitize,
};
use crate::meeting::chat::LATEST;
use crate::session::Session;

const PLACEHOLDER: &str =
	"No connections yet — upload a transcript (or the graph data was invalid and got filtered).";
const NO_SNIPPET: &str = "No snippet found";

fn label_of(graph: &GraphData, id: &str) -> String {
	graph
		.node(id)
		.map(|n| n.label.clone())
		.unwrap_or_else(|| id.to_string())
}

/// Collaboration graph of the current run with search and edge details.
#[component]
pub fn OrionPage() -> impl IntoView {
	let session = expect_context::<Session>();

	let graph = Memo::new(move |_| {
		session.graph.with(|raw| {
			let sanitized = sanitize(raw);
			let merged = merge_reciprocal(&sanitized);
			info!(
				"orion: {} nodes, {} edges ({} after merging reciprocal pairs)",
				merged.nodes.len(),
				sanitized.edges.len(),
				merged.edges.len()
			);
			merged
		})
	});

	let focused = RwSignal::new(None::<String>);
	let selected_edge = RwSignal::new(None::<(String, String)>);
	let query = RwSignal::new(String::new());
	let missed = RwSignal::new(false);

	// Focus and selection refer to ids of the previous graph.
	Effect::new(move |_| {
		graph.track();
		focused.set(None);
		selected_edge.set(None);
	});

	let on_search = move |ev: SubmitEvent| {
		ev.prevent_default();
		let q = query.get_untracked();
		let hit = graph.with_untracked(|g| resolve_search(g, &q).map(str::to_string));
		match hit {
			Some(id) => {
				missed.set(false);
				focused.set(Some(id));
			}
			None => {
				debug!("orion: no node matches {q:?}");
				missed.set(!q.trim().is_empty());
			}
		}
	};

	let clear = move |_: MouseEvent| {
		focused.set(None);
		query.set(String::new());
		missed.set(false);
	};

	let on_select_node = Callback::new(move |id: String| {
		missed.set(false);
		focused.set(Some(id));
	});
	let on_select_edge = Callback::new(move |pair: (String, String)| selected_edge.set(Some(pair)));

	view! {
		<section class="panel orion">
			<Show
				when=move || graph.with(GraphData::is_renderable)
				fallback=|| view! { <div class="placeholder">{PLACEHOLDER}</div> }
			>
				<form class="graph-toolbar" on:submit=on_search>
					<input
						type="search"
						placeholder="Find a person…"
						prop:value=move || query.get()
						on:input=move |ev| query.set(event_target_value(&ev))
					/>
					<button type="submit">"Focus"</button>
					<button type="button" on:click=clear disabled=move || focused.with(Option::is_none)>
						"Clear focus"
					</button>
					<Show when=move || missed.get()>
						<span class="muted">"No match"</span>
					</Show>
				</form>
				<ForceGraphCanvas
					data=graph
					focused=focused
					on_select_node=on_select_node
					on_select_edge=on_select_edge
				/>
				{move || {
					selected_edge
						.get()
						.map(|(source, target)| {
							view! {
								<EdgeDetails
									graph=graph
									source=source
									target=target
									on_close=Callback::new(move |_| selected_edge.set(None))
								/>
							}
						})
				}}
			</Show>
		</section>
	}
}

#[component]
fn EdgeDetails(
	graph: Memo<GraphData>,
	source: String,
	target: String,
	on_close: Callback<()>,
) -> impl IntoView {
	let edge = graph.with_untracked(|g| {
		g.edges
			.iter()
			.find(|e| e.source == source && e.target == target)
			.map(|e| {
				(
					format!("{} ⇄ {}", label_of(g, &e.source), label_of(g, &e.target)),
					e.weight,
					e.tasks.clone(),
				)
			})
	});
	let Some((title, weight, tasks)) = edge else {
		return ().into_any();
	};

	let rows = if tasks.is_empty() {
		view! { <li class="muted">"No tasks"</li> }.into_any()
	} else {
		tasks
			.into_iter()
			.map(|task| view! { <TaskRow task=task /> })
			.collect_view()
			.into_any()
	};

	view! {
		<aside class="edge-details">
			<header>
				<h2>{title}</h2>
				<span class="muted">{format!("weight {weight}")}</span>
				<button type="button" on:click=move |_| on_close.run(())>
					"Close"
				</button>
			</header>
			<ul class="task-list">{rows}</ul>
		</aside>
	}
	.into_any()
}

/// A task with its supporting snippets and an on-demand transcript lookup.
#[component]
fn TaskRow(task: Task) -> impl IntoView {
	let session = expect_context::<Session>();
	let source = RwSignal::new(None::<String>);
	let loading = RwSignal::new(false);

	let query = task.title.clone();
	let on_source = move |_: MouseEvent| {
		if loading.get_untracked() {
			return;
		}
		let api = session.api();
		let date = session
			.saved_dir
			.get_untracked()
			.unwrap_or_else(|| LATEST.to_string());
		let query = query.clone();
		loading.set(true);
		spawn_local(async move {
			let text = match api::fetch_snippet(&api, &date, &query).await {
				Ok(Some(text)) => text,
				Ok(None) => NO_SNIPPET.to_string(),
				Err(err) => {
					warn!("orion: snippet lookup failed: {err}");
					NO_SNIPPET.to_string()
				}
			};
			source.set(Some(text));
			loading.set(false);
		});
	};

	let snippets = task
		.snippets
		.into_iter()
		.map(|s| view! { <blockquote class="snippet">{s}</blockquote> })
		.collect_view();

	view! {
		<li class="task">
			<div class="task-title">{task.title}</div>
			{task.details.map(|d| view! { <div class="task-details">{d}</div> })}
			{snippets}
			<button type="button" on:click=on_source disabled=move || loading.get()>
				{move || if loading.get() { "Looking…" } else { "Source" }}
			</button>
			{move || source.get().map(|text| view! { <pre class="snippet source">{text}</pre> })}
		</li>
	}
}
