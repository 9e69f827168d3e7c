//! Done-state of to-do items in browser local storage.

use log::warn;
use web_sys::Storage;

fn local_storage() -> Option<Storage> {
	web_sys::window()?.local_storage().ok().flatten()
}

pub fn done_key(description: &str) -> String {
	format!("todo_done_{description}")
}

fn flag(done: bool) -> &'static str {
	if done { "1" } else { "0" }
}

/// `None` when the item was never toggled or storage is unavailable.
pub fn load_done(description: &str) -> Option<bool> {
	let value = local_storage()?.get_item(&done_key(description)).ok().flatten()?;
	Some(value == flag(true))
}

pub fn save_done(description: &str, done: bool) {
	let Some(storage) = local_storage() else {
		warn!("storage: local storage unavailable, done state not kept");
		return;
	};
	if storage.set_item(&done_key(description), flag(done)).is_err() {
		warn!("storage: could not save done state for {description:?}");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keys_and_flags() {
		assert_eq!(done_key("Ship notes"), "todo_done_Ship notes");
		assert_eq!(flag(true), "1");
		assert_eq!(flag(false), "0");
	}
}
