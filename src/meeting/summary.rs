//! Grouping of summary bullets by their `Key: text` prefix.

use lazy_static::lazy_static;
use regex::Regex;

/// Groups always shown in this order when present.
pub const GROUP_ORDER: [&str; 9] = [
	"Decision",
	"Blocker",
	"Risk",
	"Key Date",
	"Action Item",
	"Progress",
	"Dependencies",
	"Communication",
	"Other",
];

const OTHER: &str = "Other";

lazy_static! {
	static ref KEYED: Regex = Regex::new(r"^(?:\*\*|__)?\s*([^:*]+?)\s*(?:\*\*|__)?\s*:\s*(.*)$").unwrap();
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bullet {
	pub key: String,
	pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
	pub key: String,
	pub items: Vec<String>,
}

fn strip_emphasis(text: &str) -> String {
	text.replace("**", "").trim().to_string()
}

/// Known keys match case-insensitively and take their canonical spelling.
fn canonical_key(key: &str) -> String {
	GROUP_ORDER
		.iter()
		.find(|known| known.eq_ignore_ascii_case(key))
		.map(|known| known.to_string())
		.unwrap_or_else(|| key.to_string())
}

pub fn parse_bullet(raw: &str) -> Bullet {
	let cleaned = raw
		.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '•' | '*' | '-'))
		.trim();
	match KEYED.captures(cleaned) {
		Some(caps) => Bullet {
			key: canonical_key(caps[1].trim()),
			text: strip_emphasis(&caps[2]),
		},
		None => Bullet {
			key: OTHER.to_string(),
			text: strip_emphasis(cleaned),
		},
	}
}

/// Group bullets in display order: known keys first, then any other key in
/// the order it first appeared.
pub fn group_bullets(bullets: &[String]) -> Vec<Group> {
	let mut groups: Vec<Group> = Vec::new();
	for bullet in bullets.iter().map(|b| parse_bullet(b)) {
		match groups.iter_mut().find(|g| g.key == bullet.key) {
			Some(group) => group.items.push(bullet.text),
			None => groups.push(Group {
				key: bullet.key,
				items: vec![bullet.text],
			}),
		}
	}
	let rank = |key: &str| {
		GROUP_ORDER
			.iter()
			.position(|known| *known == key)
			.unwrap_or(GROUP_ORDER.len())
	};
	// Stable, so unknown keys keep first-seen order.
	groups.sort_by_key(|g| rank(&g.key));
	groups
}
