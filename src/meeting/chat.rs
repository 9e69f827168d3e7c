//! Chat transcript of the summary tab.

use crate::api::{ChatMessage, Role};

/// Value of the date selector meaning "the newest run".
pub const LATEST: &str = "latest";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
	User,
	Ai,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
	pub speaker: Speaker,
	pub content: String,
}

impl Message {
	pub fn user(content: impl Into<String>) -> Self {
		Self {
			speaker: Speaker::User,
			content: content.into(),
		}
	}

	pub fn ai(content: impl Into<String>) -> Self {
		Self {
			speaker: Speaker::Ai,
			content: content.into(),
		}
	}
}

/// Backend answering the chat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Engine {
	/// Single question with retrieval over the selected scope.
	#[default]
	Ask,
	/// Whole conversation plus the current summary bullets.
	Friendli,
}

impl Engine {
	pub const ALL: [Engine; 2] = [Engine::Ask, Engine::Friendli];

	pub fn as_str(self) -> &'static str {
		match self {
			Engine::Ask => "ask",
			Engine::Friendli => "friendli",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Engine::Ask => "Gemini",
			Engine::Friendli => "Friendli",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|e| e.as_str() == value)
	}
}

/// Trimmed question, or `None` when there is nothing to send.
pub fn prepare_question(raw: &str) -> Option<String> {
	let q = raw.trim();
	(!q.is_empty()).then(|| q.to_string())
}

/// Run folder to target, `None` for the newest.
pub fn run_for(date: &str) -> Option<&str> {
	(date != LATEST && !date.is_empty()).then_some(date)
}

/// Conversation in the role vocabulary of the chat endpoint.
pub fn history(messages: &[Message]) -> Vec<ChatMessage> {
	messages
		.iter()
		.map(|m| ChatMessage {
			role: match m.speaker {
				Speaker::User => Role::User,
				Speaker::Ai => Role::Assistant,
			},
			content: m.content.clone(),
		})
		.collect()
}
