//! State of the current run, shared by every tab.

use std::cell::Cell;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info, warn};
use serde_json::Value;
use web_sys::File;

use crate::api::{self, Bundle};
use crate::config::ApiConfig;

/// Issued per bundle request; only the newest one may write the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic request counter. A completion is applied only while its ticket
/// is still the newest issued, so a slow response never overwrites the
/// result of a later request.
#[derive(Debug, Default)]
pub struct RequestSeq {
	latest: Cell<u64>,
}

impl RequestSeq {
	pub fn issue(&self) -> Ticket {
		let next = self.latest.get() + 1;
		self.latest.set(next);
		Ticket(next)
	}

	pub fn is_current(&self, ticket: Ticket) -> bool {
		self.latest.get() == ticket.0
	}
}

#[derive(Clone, Copy)]
pub struct Session {
	/// Raw `{ nodes, edges }`; sanitized where it is drawn.
	pub graph: RwSignal<Value>,
	pub bullets: RwSignal<Vec<String>>,
	pub tasks: RwSignal<Vec<Value>>,
	pub saved_dir: RwSignal<Option<String>>,
	pub status: RwSignal<Option<String>>,
	uploads: RwSignal<u32>,
	seq: StoredValue<RequestSeq, LocalStorage>,
	api: StoredValue<ApiConfig>,
}

impl Session {
	pub fn new(api: ApiConfig) -> Self {
		Self {
			graph: RwSignal::new(Bundle::empty_graph()),
			bullets: RwSignal::new(Vec::new()),
			tasks: RwSignal::new(Vec::new()),
			saved_dir: RwSignal::new(None),
			status: RwSignal::new(None),
			uploads: RwSignal::new(0),
			seq: StoredValue::new_local(RequestSeq::default()),
			api: StoredValue::new(api),
		}
	}

	pub fn api(&self) -> ApiConfig {
		self.api.get_value()
	}

	/// An upload is in flight.
	pub fn is_busy(&self) -> bool {
		self.uploads.get() > 0
	}

	pub fn apply(&self, bundle: Bundle) {
		self.saved_dir.set(bundle.date_dir);
		self.graph.set(bundle.graph);
		self.bullets.set(bundle.bullets);
		self.tasks.set(bundle.tasks);
	}

	pub fn reset(&self) {
		self.apply(Bundle {
			graph: Bundle::empty_graph(),
			..Bundle::default()
		});
	}

	fn issue(&self) -> Ticket {
		self.seq.with_value(RequestSeq::issue)
	}

	fn is_current(&self, ticket: Ticket) -> bool {
		self.seq.with_value(|seq| seq.is_current(ticket))
	}

	/// Upload a transcript. Failure clears the session.
	pub fn upload(self, file: File) {
		let ticket = self.issue();
		let api = self.api();
		self.uploads.update(|n| *n += 1);
		self.status.set(None);
		info!("session: uploading {}", file.name());
		spawn_local(async move {
			let result = api::upload_transcript(&api, &file).await;
			self.uploads.update(|n| *n = n.saturating_sub(1));
			if !self.is_current(ticket) {
				debug!("session: discarding stale upload response");
				return;
			}
			match result {
				Ok(bundle) => self.apply(bundle),
				Err(err) => {
					warn!("session: upload failed: {err}");
					self.reset();
					self.status.set(Some("Failed".to_string()));
				}
			}
		});
	}

	/// Restore the newest run. Failure keeps the current state.
	pub fn load_latest(self) {
		let ticket = self.issue();
		let api = self.api();
		spawn_local(async move {
			let result = api::fetch_latest(&api).await;
			if !self.is_current(ticket) {
				debug!("session: discarding stale latest response");
				return;
			}
			match result {
				Ok(bundle) => self.apply(bundle),
				Err(err) => warn!("session: could not load latest run: {err}"),
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_newest_ticket_is_current() {
		let seq = RequestSeq::default();
		let upload = seq.issue();
		assert!(seq.is_current(upload));
		let latest = seq.issue();
		assert!(!seq.is_current(upload));
		assert!(seq.is_current(latest));
	}

	#[test]
	fn tickets_never_repeat() {
		let seq = RequestSeq::default();
		let tickets: Vec<Ticket> = (0..5).map(|_| seq.issue()).collect();
		for (i, a) in tickets.iter().enumerate() {
			assert!(tickets[i + 1..].iter().all(|b| a != b));
		}
		assert!(seq.is_current(tickets[4]));
	}
}
