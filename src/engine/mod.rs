//! Live side of the backend: the price mutator, the tick loop that drives it
//! and the broadcaster that fans each tick out to WebSocket listeners.

pub mod broadcaster;
pub mod feed;
pub mod mutator;
