//! Core types for the webhook recorder.
//!
//! Provides the closed set of event names the incident system emits and the
//! shared in-memory log that records each call under its event.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod events;
pub mod store;

pub use events::EventName;
pub use store::{CallLog, CallSnapshot};
