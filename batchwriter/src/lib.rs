//! Buffered, batched writes to a time-series store.
//!
//! [`BufferedClient`] is the entry point: `add` queues a point and returns
//! immediately, a background [`Batcher`] flushes queued points to a
//! [`Sink`](sink::Sink) by size, by age and on `close`.

pub mod batcher;
pub mod client;
pub mod commands;
pub mod config;
pub mod sink;

pub use batcher::{BatchError, Batcher, BufferConfig, FlushSummary, IngestHandle};
pub use client::BufferedClient;
