use leptos::ev::{FocusEvent, KeyboardEvent};
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;

use crate::api::{self, ASK_FALLBACK, Scope};
use crate::meeting::chat::{self, Engine, LATEST, Message, Speaker};
use crate::meeting::summary::group_bullets;
use crate::session::Session;

/// Grouped highlights of the run and a chat about it.
#[component]
pub fn SummaryPage() -> impl IntoView {
	let session = expect_context::<Session>();
	let groups = Memo::new(move |_| session.bullets.with(|b| group_bullets(b)));

	view! {
		<section class="panel summary">
			<div class="card">
				<header class="card-header">
					<h1>"Highlights"</h1>
					<span class="muted">
						"Run: " {move || session.saved_dir.get().unwrap_or_else(|| "—".to_string())}
					</span>
				</header>
				<Show
					when=move || groups.with(|g| !g.is_empty())
					fallback=|| {
						view! { <p class="muted">"No summary yet — upload a transcript first."</p> }
					}
				>
					<div class="summary-body">
						{move || {
							groups
								.get()
								.into_iter()
								.map(|group| {
									view! {
										<section>
											<h3 class="group-title">{group.key}</h3>
											<ul>
												{group
													.items
													.into_iter()
													.map(|item| view! { <li>{item}</li> })
													.collect_view()}
											</ul>
										</section>
									}
								})
								.collect_view()
						}}
					</div>
				</Show>
			</div>
			<ChatPanel />
		</section>
	}
}

#[component]
fn ChatPanel() -> impl IntoView {
	let session = expect_context::<Session>();
	let messages = RwSignal::new(Vec::<Message>::new());
	let question = RwSignal::new(String::new());
	let date = RwSignal::new(LATEST.to_string());
	let scope = RwSignal::new(Scope::default());
	let engine = RwSignal::new(Engine::default());
	let asking = RwSignal::new(false);
	let runs = RwSignal::new(None::<Vec<String>>);
	let runs_pending = RwSignal::new(false);

	// Run dates are only needed once someone opens the selector.
	let ensure_runs = move |_: FocusEvent| {
		if runs.with_untracked(Option::is_some) || runs_pending.get_untracked() {
			return;
		}
		runs_pending.set(true);
		let api = session.api();
		spawn_local(async move {
			match api::fetch_runs(&api).await {
				Ok(dates) => runs.set(Some(dates)),
				Err(err) => warn!("summary: could not list runs: {err}"),
			}
			runs_pending.set(false);
		});
	};

	let send = move || {
		if asking.get_untracked() {
			return;
		}
		let Some(q) = chat::prepare_question(&question.get_untracked()) else {
			return;
		};
		asking.set(true);
		messages.update(|m| m.push(Message::user(q.clone())));

		let api = session.api();
		let date = date.get_untracked();
		let scope = scope.get_untracked();
		let engine = engine.get_untracked();
		let history = messages.with_untracked(|m| chat::history(m));
		let bullets = session.bullets.get_untracked();
		spawn_local(async move {
			let result = match engine {
				Engine::Ask => api::ask(&api, &q, &date, scope).await,
				Engine::Friendli => {
					api::friendli_chat(&api, &history, &bullets, chat::run_for(&date)).await
				}
			};
			let answer = result.unwrap_or_else(|err| {
				warn!("summary: {} failed: {err}", engine.label());
				ASK_FALLBACK.to_string()
			});
			messages.update(|m| m.push(Message::ai(answer)));
			asking.set(false);
			question.set(String::new());
		});
	};

	let on_keydown = move |ev: KeyboardEvent| {
		if (ev.ctrl_key() || ev.meta_key()) && ev.key() == "Enter" {
			ev.prevent_default();
			send();
		}
	};

	view! {
		<div class="card chat">
			<header class="card-header">
				<h1>{move || format!("Ask {}", engine.get().label())}</h1>
			</header>
			<div class="chat-log">
				<Show
					when=move || messages.with(|m| !m.is_empty())
					fallback=|| view! { <p class="muted">"No messages yet."</p> }
				>
					{move || {
						messages
							.get()
							.into_iter()
							.map(|m| {
								let class = match m.speaker {
									Speaker::User => "bubble user",
									Speaker::Ai => "bubble ai",
								};
								view! { <div class=class>{m.content}</div> }
							})
							.collect_view()
					}}
				</Show>
			</div>
			<textarea
				placeholder="Type your question…"
				prop:value=move || question.get()
				on:input=move |ev| question.set(event_target_value(&ev))
				on:keydown=on_keydown
			/>
			<div class="chat-controls">
				<label>
					"Date "
					<select
						prop:value=move || date.get()
						on:focus=ensure_runs
						on:change=move |ev| date.set(event_target_value(&ev))
					>
						<option value=LATEST>"Latest"</option>
						{move || {
							runs.get()
								.unwrap_or_default()
								.into_iter()
								.map(|d| {
									let value = d.clone();
									view! { <option value=value>{d}</option> }
								})
								.collect_view()
						}}
					</select>
				</label>
				<label>
					"Scope "
					<select
						prop:value=move || scope.get().as_str()
						on:change=move |ev| {
							if let Some(s) = Scope::parse(&event_target_value(&ev)) {
								scope.set(s);
							}
						}
					>
						{Scope::ALL
							.into_iter()
							.map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
							.collect_view()}
					</select>
				</label>
				<label>
					"Engine "
					<select
						prop:value=move || engine.get().as_str()
						on:change=move |ev| {
							if let Some(e) = Engine::parse(&event_target_value(&ev)) {
								engine.set(e);
							}
						}
					>
						{Engine::ALL
							.into_iter()
							.map(|e| view! { <option value=e.as_str()>{e.label()}</option> })
							.collect_view()}
					</select>
				</label>
				<button
					type="button"
					class="send"
					title="Ctrl/Cmd + Enter to send"
					disabled=move || asking.get()
					on:click=move |_| send()
				>
					{move || {
						if asking.get() {
							"Asking…".to_string()
						} else {
							format!("Ask {}", engine.get().label())
						}
					}}
				</button>
			</div>
		</div>
	}
}
