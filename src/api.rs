//! Client for the transcript backend.
//!
//! Every call returns `Result<_, ApiError>`; pages decide how a failure
//! degrades. Payloads are read as untyped JSON and coerced, so a response
//! with missing or mistyped parts still yields something renderable.

use js_sys::encode_uri_component;
use log::debug;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Request, RequestInit, Response};

use crate::components::force_graph::coerce_string;
use crate::config::ApiConfig;

/// Shown in the chat whenever a question gets no usable answer.
pub const ASK_FALLBACK: &str = "Sorry, something went wrong. Try again.";

#[derive(Debug, Error)]
pub enum ApiError {
	/// The request never produced a response.
	#[error("request failed: {0}")]
	Transport(String),
	#[error("server answered {status}: {body}")]
	Status { status: u16, body: String },
	/// The body, or JSON text embedded in it, did not parse.
	#[error("invalid payload: {0}")]
	Decode(String),
}

impl From<JsValue> for ApiError {
	fn from(value: JsValue) -> Self {
		let message = value
			.as_string()
			.or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
			.unwrap_or_else(|| format!("{value:?}"));
		ApiError::Transport(message)
	}
}

impl From<serde_json::Error> for ApiError {
	fn from(err: serde_json::Error) -> Self {
		ApiError::Decode(err.to_string())
	}
}

/// One processed transcript as delivered by `upload` and `latest`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bundle {
	pub date_dir: Option<String>,
	/// Raw `{ nodes, edges }`, both guaranteed to be arrays.
	pub graph: Value,
	pub bullets: Vec<String>,
	/// Raw to-do items; validated when rendered.
	pub tasks: Vec<Value>,
}

/// A bundle part may arrive as an object or as JSON text.
fn embedded(part: Option<&Value>) -> Result<Option<Value>, ApiError> {
	match part {
		Some(Value::String(text)) => Ok(Some(serde_json::from_str(text)?)),
		Some(Value::Null) | None => Ok(None),
		Some(other) => Ok(Some(other.clone())),
	}
}

fn array_of(part: Option<&Value>, key: &str) -> Vec<Value> {
	match part.and_then(|p| p.get(key)) {
		Some(Value::Array(items)) => items.clone(),
		_ => Vec::new(),
	}
}

impl Bundle {
	/// Empty graph in the raw shape the sanitizer expects.
	pub fn empty_graph() -> Value {
		json!({ "nodes": [], "edges": [] })
	}

	/// Decode an upload or latest payload. Missing or mistyped parts become
	/// empty; only embedded JSON text that fails to parse is an error.
	pub fn from_value(raw: &Value) -> Result<Self, ApiError> {
		let date_dir = raw
			.get("date_dir")
			.map(coerce_string)
			.filter(|d| !d.is_empty());

		let star = embedded(raw.get("star_connect"))?;
		let graph = json!({
			"nodes": array_of(star.as_ref(), "nodes"),
			"edges": array_of(star.as_ref(), "edges"),
		});

		let summary = embedded(raw.get("summary"))?;
		let bullets = array_of(summary.as_ref(), "bullets")
			.iter()
			.map(coerce_string)
			.filter(|b| !b.trim().is_empty())
			.collect();

		let tasks = embedded(raw.get("tasks"))?;
		let tasks = array_of(tasks.as_ref(), "items");

		Ok(Self {
			date_dir,
			graph,
			bullets,
			tasks,
		})
	}
}

/// Which material the backend should search when answering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
	#[default]
	Auto,
	Summary,
	Tasks,
	Transcript,
	Graph,
}

impl Scope {
	pub const ALL: [Scope; 5] = [
		Scope::Auto,
		Scope::Summary,
		Scope::Tasks,
		Scope::Transcript,
		Scope::Graph,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Scope::Auto => "auto",
			Scope::Summary => "summary",
			Scope::Tasks => "tasks",
			Scope::Transcript => "transcript",
			Scope::Graph => "graph",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Scope::Auto => "Auto",
			Scope::Summary => "Summary",
			Scope::Tasks => "Tasks",
			Scope::Transcript => "Transcript",
			Scope::Graph => "Graph",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|s| s.as_str() == value)
	}
}

#[derive(Debug, Serialize)]
pub struct AskRequest<'a> {
	pub question: &'a str,
	pub date: &'a str,
	pub scope: Scope,
	pub top_k: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
	pub messages: &'a [ChatMessage],
	pub bullets: &'a [String],
}

/// Run dates from `/api/runs`, which answers `{ dates: [...] }` or a bare
/// array depending on the backend version.
pub fn parse_runs(raw: &Value) -> Vec<String> {
	let dates = match raw {
		Value::Array(items) => items.as_slice(),
		other => match other.get("dates") {
			Some(Value::Array(items)) => items.as_slice(),
			_ => &[],
		},
	};
	dates
		.iter()
		.map(coerce_string)
		.filter(|d| !d.is_empty())
		.collect()
}

/// Non-blank `answer` of an ask or chat response.
pub fn answer_text(raw: &Value) -> Option<String> {
	raw.get("answer")
		.map(coerce_string)
		.filter(|a| !a.trim().is_empty())
}

/// Snippet text from `{ snippet }`, `{ text }` or a bare string.
pub fn snippet_text(raw: &Value) -> Option<String> {
	let text = match raw {
		Value::String(s) => s.clone(),
		other => other
			.get("snippet")
			.or_else(|| other.get("text"))
			.map(coerce_string)
			.unwrap_or_default(),
	};
	let text = text.trim();
	(!text.is_empty()).then(|| text.to_string())
}

fn uri_component(value: &str) -> String {
	String::from(encode_uri_component(value))
}

async fn send(request: Request) -> Result<Response, ApiError> {
	let window = web_sys::window().ok_or_else(|| ApiError::Transport("no window".into()))?;
	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await?
		.dyn_into()?;
	if !response.ok() {
		let body = read_text(&response).await.unwrap_or_default();
		return Err(ApiError::Status {
			status: response.status(),
			body,
		});
	}
	Ok(response)
}

async fn read_text(response: &Response) -> Result<String, ApiError> {
	let text = JsFuture::from(response.text()?).await?;
	Ok(text.as_string().unwrap_or_default())
}

async fn read_json(response: &Response) -> Result<Value, ApiError> {
	let text = read_text(response).await?;
	Ok(serde_json::from_str(&text)?)
}

async fn get_json(url: &str) -> Result<Value, ApiError> {
	debug!("api: GET {url}");
	let request = Request::new_with_str(url)?;
	read_json(&send(request).await?).await
}

async fn post_json<T: Serialize>(url: &str, body: &T) -> Result<Value, ApiError> {
	debug!("api: POST {url}");
	let init = RequestInit::new();
	init.set_method("POST");
	init.set_body(&JsValue::from_str(&serde_json::to_string(body)?));
	let request = Request::new_with_str_and_init(url, &init)?;
	request.headers().set("Content-Type", "application/json")?;
	read_json(&send(request).await?).await
}

/// Multipart upload of a transcript file under the `file` field.
pub async fn upload_transcript(api: &ApiConfig, file: &File) -> Result<Bundle, ApiError> {
	let url = api.url("upload");
	debug!("api: POST {url} ({} bytes)", file.size());
	let form = FormData::new()?;
	form.append_with_blob("file", file)?;
	let init = RequestInit::new();
	init.set_method("POST");
	init.set_body(&form);
	let request = Request::new_with_str_and_init(&url, &init)?;
	let raw = read_json(&send(request).await?).await?;
	Bundle::from_value(&raw)
}

pub async fn fetch_latest(api: &ApiConfig) -> Result<Bundle, ApiError> {
	let raw = get_json(&api.url("latest")).await?;
	Bundle::from_value(&raw)
}

pub async fn fetch_runs(api: &ApiConfig) -> Result<Vec<String>, ApiError> {
	Ok(parse_runs(&get_json(&api.url("runs")).await?))
}

pub async fn ask(api: &ApiConfig, question: &str, date: &str, scope: Scope) -> Result<String, ApiError> {
	let body = AskRequest {
		question,
		date,
		scope,
		top_k: api.top_k,
	};
	let raw = post_json(&api.url("ask"), &body).await?;
	answer_text(&raw).ok_or_else(|| ApiError::Decode("response has no answer".into()))
}

/// Transcript passage around `query` in the run `date`, if any.
pub async fn fetch_snippet(api: &ApiConfig, date: &str, query: &str) -> Result<Option<String>, ApiError> {
	let url = format!(
		"{}?date={}&query={}&window_chars={}",
		api.url("snippet"),
		uri_component(date),
		uri_component(query),
		api.snippet_window
	);
	Ok(snippet_text(&get_json(&url).await?))
}

/// Chat over the whole conversation; `run` selects a run folder other than
/// the newest.
pub async fn friendli_chat(
	api: &ApiConfig,
	messages: &[ChatMessage],
	bullets: &[String],
	run: Option<&str>,
) -> Result<String, ApiError> {
	let mut url = api.url("friendli_chat");
	if let Some(run) = run {
		url = format!("{url}?run={}", uri_component(run));
	}
	let raw = post_json(&url, &ChatRequest { messages, bullets }).await?;
	answer_text(&raw).ok_or_else(|| ApiError::Decode("response has no answer".into()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bundle_reads_objects() {
		let raw = json!({
			"date_dir": "2025-03-01_1200",
			"star_connect": { "nodes": [{ "id": "a" }], "edges": [] },
			"summary": { "bullets": ["Decision: ship it", 3] },
			"tasks": { "items": [{ "description": "Deploy" }] },
		});
		let bundle = Bundle::from_value(&raw).unwrap();
		assert_eq!(bundle.date_dir.as_deref(), Some("2025-03-01_1200"));
		assert_eq!(bundle.graph["nodes"][0]["id"], "a");
		assert_eq!(bundle.bullets, ["Decision: ship it", "3"]);
		assert_eq!(bundle.tasks.len(), 1);
	}

	#[test]
	fn bundle_parses_embedded_json_text() {
		let raw = json!({
			"date_dir": null,
			"star_connect": r#"{"nodes":[{"id":"a"},{"id":"b"}],"edges":[{"source":"a","target":"b"}]}"#,
			"summary": r#"{"bullets":["Risk: budget"]}"#,
			"tasks": r#"{"items":[]}"#,
		});
		let bundle = Bundle::from_value(&raw).unwrap();
		assert_eq!(bundle.date_dir, None);
		assert_eq!(bundle.graph["edges"].as_array().map(Vec::len), Some(1));
		assert_eq!(bundle.bullets, ["Risk: budget"]);
		assert!(bundle.tasks.is_empty());
	}

	#[test]
	fn bundle_fills_missing_parts_with_empty_forms() {
		let bundle = Bundle::from_value(&json!({
			"star_connect": { "nodes": "oops" },
			"summary": { "bullets": null },
		}))
		.unwrap();
		assert_eq!(bundle.graph, Bundle::empty_graph());
		assert!(bundle.bullets.is_empty());
		assert!(bundle.tasks.is_empty());

		let bundle = Bundle::from_value(&json!([1, 2])).unwrap();
		assert_eq!(bundle, Bundle { graph: Bundle::empty_graph(), ..Bundle::default() });
	}

	#[test]
	fn bundle_rejects_broken_embedded_text() {
		let err = Bundle::from_value(&json!({ "summary": "{not json" })).unwrap_err();
		assert!(matches!(err, ApiError::Decode(_)));
	}

	#[test]
	fn runs_accept_both_shapes() {
		assert_eq!(parse_runs(&json!({ "dates": ["d1", "d2"] })), ["d1", "d2"]);
		assert_eq!(parse_runs(&json!(["d3", null])), ["d3"]);
		assert!(parse_runs(&json!({ "dates": "d1" })).is_empty());
	}

	#[test]
	fn blank_answers_are_missing() {
		assert_eq!(answer_text(&json!({ "answer": "Yes." })).as_deref(), Some("Yes."));
		assert_eq!(answer_text(&json!({ "answer": "  " })), None);
		assert_eq!(answer_text(&json!({ "sources": [] })), None);
	}

	#[test]
	fn snippet_shapes() {
		assert_eq!(snippet_text(&json!({ "snippet": " we agreed " })).as_deref(), Some("we agreed"));
		assert_eq!(snippet_text(&json!({ "text": "later" })).as_deref(), Some("later"));
		assert_eq!(snippet_text(&json!("bare")).as_deref(), Some("bare"));
		assert_eq!(snippet_text(&json!({ "snippet": "" })), None);
	}

	#[test]
	fn request_bodies_serialize_lowercase() {
		let body = AskRequest {
			question: "Who owns the demo?",
			date: "latest",
			scope: Scope::Transcript,
			top_k: 4,
		};
		assert_eq!(
			serde_json::to_value(&body).unwrap(),
			json!({ "question": "Who owns the demo?", "date": "latest", "scope": "transcript", "top_k": 4 })
		);

		let messages = [ChatMessage {
			role: Role::Assistant,
			content: "Hi".into(),
		}];
		let bullets = ["Decision: go".to_string()];
		assert_eq!(
			serde_json::to_value(ChatRequest {
				messages: &messages,
				bullets: &bullets,
			})
			.unwrap(),
			json!({ "messages": [{ "role": "assistant", "content": "Hi" }], "bullets": ["Decision: go"] })
		);
	}

	#[test]
	fn scope_round_trips_through_select_values() {
		for scope in Scope::ALL {
			assert_eq!(Scope::parse(scope.as_str()), Some(scope));
		}
		assert_eq!(Scope::parse("everything"), None);
		assert_eq!(Scope::default(), Scope::Auto);
	}
}
