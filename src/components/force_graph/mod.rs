mod adjacency;
mod component;
mod forces;
mod interaction;
mod merge;
mod overlay;
mod render;
mod sanitize;
mod simulation;
mod state;
mod types;

#[cfg(test)]
mod proptests;

pub use component::ForceGraphCanvas;
pub use interaction::resolve_search;
pub use merge::merge_reciprocal;
pub use sanitize::sanitize;
pub use types::{GraphData, Task};
pub(crate) use sanitize::coerce_string;
