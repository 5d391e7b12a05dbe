//! HTTP request handlers.
//!
//! Handlers are grouped by functionality:
//! - `hooks` - webhook endpoints that record calls
//! - `calls` - inspection and reset of the recorded calls
//!
//! Every handler receives the shared [`CallLog`](hooktester_core::CallLog)
//! through router state.

pub mod calls;
pub mod hooks;

pub use calls::{clear_calls, list_calls};
pub use hooks::record_call;
