//! acts - Activity Log Library
//!
//! A personal task tracker whose state is never stored as a mutable record.
//! Every change is appended to a flat log file as an immutable event, and the
//! current list is derived by replaying that log.
//!
//! # Core Concepts
//!
//! - **Activity**: a timestamped text entry, identified by the SHA-1 of its
//!   timestamp and body
//! - **Event**: one `ADD` or `DELETE` line in the log
//! - **Replay**: folding events in append order into the live set
//! - **Resolution**: mapping a partial id to zero, one or many live activities
//!
//! # Module Organization
//!
//! - `activity`: Activity records, parsing, digests and listing order
//! - `codec`: Event log line encoding and decoding
//! - `store`: The append-only log file, replay and resolution
//! - `ops`: Add, due listing, done, delay and grep
//! - `calendar`: Delay units and calendar arithmetic
//! - `entry`: Composition of new-entry text from command-line words
//! - `config`: Configuration loading from `config.toml`
//! - `output`: Human and JSON output
//! - `cli`: Command-line interface using clap
//! - `error`: Error types and result aliases

pub mod activity;
pub mod calendar;
pub mod cli;
pub mod codec;
pub mod config;
pub mod entry;
pub mod error;
pub mod ops;
pub mod output;
pub mod store;

pub use error::{Error, Result};
