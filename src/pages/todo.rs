use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use leptos::ev::Event;
use leptos::prelude::*;

use crate::meeting::todo::{self, TodoItem};
use crate::session::Session;
use crate::storage;

/// Wall-clock time of the browser.
fn local_now() -> Option<NaiveDateTime> {
	let now = js_sys::Date::new_0();
	NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())?
		.and_hms_opt(now.get_hours(), now.get_minutes(), now.get_seconds())
}

#[component]
pub fn TodoPage() -> impl IntoView {
	let session = expect_context::<Session>();
	let items = Memo::new(move |_| session.tasks.with(|raw| todo::parse_items(raw)));
	let done = RwSignal::new(HashMap::<String, bool>::new());

	Effect::new(move |_| {
		let saved = items.with(|items| {
			items
				.iter()
				.filter_map(|item| {
					storage::load_done(&item.description).map(|d| (item.description.clone(), d))
				})
				.collect()
		});
		done.set(saved);
	});

	view! {
		<section class="panel todo">
			<Show
				when=move || items.with(|i| !i.is_empty())
				fallback=|| view! { <p class="muted">"No tasks yet — upload a transcript first."</p> }
			>
				<div class="todo-grid">
					{move || {
						let now = local_now();
						items
							.get()
							.into_iter()
							.map(|item| view! { <TodoCard item=item now=now done=done /> })
							.collect_view()
					}}
				</div>
			</Show>
		</section>
	}
}

#[component]
fn TodoCard(item: TodoItem, now: Option<NaiveDateTime>, done: RwSignal<HashMap<String, bool>>) -> impl IntoView {
	let schedule = now.map(|now| todo::schedule(&item, now));
	let who = item.who().to_string();
	let key = item.description.clone();
	let checked = {
		let key = key.clone();
		move || done.with(|d| d.get(&key).copied().unwrap_or(false))
	};
	let toggle = move |_: Event| {
		done.update(|d| {
			let next = !d.get(&key).copied().unwrap_or(false);
			storage::save_done(&key, next);
			d.insert(key.clone(), next);
		});
	};

	let assignees = (!item.assignees.is_empty()).then(|| {
		view! {
			" · Assignees: " <span class="strong">{item.assignees.join(", ")}</span>
		}
	});

	view! {
		<div class="todo-card">
			<input type="checkbox" prop:checked=checked on:change=toggle />
			<div class="todo-body">
				<div class="todo-title">{item.description}</div>
				<div class="todo-meta">
					"Owner: " <span class="strong">{item.owner.unwrap_or_else(|| "Unassigned".to_string())}</span>
					{assignees}
				</div>
				{item.priority.map(|p| view! { <div class="todo-meta">"Priority: " {p}</div> })}
				{schedule
					.map(|s| {
						view! {
							<div class="todo-follow-up">
								<span class="dim">"Follow up:"</span> " Check with "
								<span class="accent">{who}</span> " at "
								<span class="accent">{s.follow_up_label()}</span>
								<span class="dim">" (30 min before target)"</span>
							</div>
							<div class="todo-meta">
								"Target: " <span class="strong">{s.target_label()}</span>
							</div>
						}
					})}
				{item.source_snippet.map(|s| view! { <blockquote class="snippet">{s}</blockquote> })}
			</div>
		</div>
	}
}
