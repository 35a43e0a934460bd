//! Event System
//!
//! Event types, the per-tick event queue, and JSONL logging.

pub mod logger;
pub mod types;

pub use logger::EventLogger;
pub use types::*;
