//! To-do items and their target and follow-up times.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::components::force_graph::coerce_string;

const NOBODY: &str = "someone";
const DELIVERY_WORDS: [&str; 7] = ["submit", "finish", "deliver", "ship", "deploy", "handoff", "share"];
const FOLLOW_UP_LEAD_MINUTES: i64 = 30;

lazy_static! {
	static ref CLOCK: Regex = Regex::new(r"(\d{1,2}):(\d{2})").unwrap();
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoItem {
	pub description: String,
	pub owner: Option<String>,
	pub assignees: Vec<String>,
	pub due: Option<String>,
	pub priority: Option<String>,
	pub source_snippet: Option<String>,
}

fn optional_text(value: Option<&Value>) -> Option<String> {
	value.map(coerce_string).filter(|s| !s.trim().is_empty())
}

impl TodoItem {
	/// `None` for non-objects and items without a description.
	pub fn from_value(raw: &Value) -> Option<Self> {
		let obj = raw.as_object()?;
		let description = optional_text(obj.get("description"))?;
		let assignees = match obj.get("assignees") {
			Some(Value::Array(items)) => items
				.iter()
				.map(coerce_string)
				.filter(|s| !s.is_empty())
				.collect(),
			_ => Vec::new(),
		};
		Some(Self {
			description,
			owner: optional_text(obj.get("owner")),
			assignees,
			due: optional_text(obj.get("due")),
			priority: optional_text(obj.get("priority")),
			source_snippet: optional_text(obj.get("source_snippet")),
		})
	}

	/// Person to check with: owner, else first assignee.
	pub fn who(&self) -> &str {
		self.owner
			.as_deref()
			.or_else(|| self.assignees.first().map(String::as_str))
			.unwrap_or(NOBODY)
	}
}

pub fn parse_items(items: &[Value]) -> Vec<TodoItem> {
	items.iter().filter_map(TodoItem::from_value).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
	pub target: NaiveDateTime,
	pub follow_up: NaiveDateTime,
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> Option<NaiveDateTime> {
	NaiveTime::from_hms_opt(hour, minute, 0).map(|t| date.and_time(t))
}

fn clock_time(text: &str) -> Option<(u32, u32)> {
	let caps = CLOCK.captures(text)?;
	let hour = caps[1].parse().ok()?;
	let minute = caps[2].parse().ok()?;
	NaiveTime::from_hms_opt(hour, minute, 0).map(|_| (hour, minute))
}

/// Guess when an item is due from the words in its description and `due`.
///
/// "tomorrow" moves to the next day. The time of day comes from the first
/// of: morning (10:00), afternoon (15:00), evening or end of day (17:00), an
/// explicit `H:MM`. Delivery words without a time mean end of day; anything
/// else keeps the current time.
pub fn schedule(item: &TodoItem, now: NaiveDateTime) -> Schedule {
	let text = format!("{} {}", item.description, item.due.as_deref().unwrap_or_default()).to_lowercase();

	let mut date = now.date();
	if text.contains("tomorrow") {
		date = date.checked_add_days(Days::new(1)).unwrap_or(date);
	}

	let chosen = if text.contains("morning") {
		Some((10, 0))
	} else if text.contains("afternoon") {
		Some((15, 0))
	} else if ["evening", "eod", "end of day"].iter().any(|w| text.contains(w)) {
		Some((17, 0))
	} else {
		clock_time(&text)
	};
	let chosen = chosen.or_else(|| {
		DELIVERY_WORDS
			.iter()
			.any(|w| text.contains(w))
			.then_some((17, 0))
	});

	let target = chosen
		.and_then(|(h, m)| at(date, h, m))
		.unwrap_or_else(|| date.and_time(now.time()));
	let follow_up = target
		.checked_sub_signed(TimeDelta::minutes(FOLLOW_UP_LEAD_MINUTES))
		.unwrap_or(target);
	Schedule { target, follow_up }
}

impl Schedule {
	/// e.g. `Tue Mar 04 2025 · 5:00 PM`
	pub fn target_label(&self) -> String {
		self.target.format("%a %b %d %Y · %-I:%M %p").to_string()
	}

	/// e.g. `4:30 PM`
	pub fn follow_up_label(&self) -> String {
		self.follow_up.format("%-I:%M %p").to_string()
	}
}
