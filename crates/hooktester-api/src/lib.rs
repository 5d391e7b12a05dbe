//! HTTP surface of the webhook recorder.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod payload;
pub mod server;

pub use config::Config;
pub use server::{create_router, serve, start_server};
