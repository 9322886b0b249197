//! Crawl loop over the persistent frontier
//!
//! This module contains the sequential crawl orchestration: draining the
//! frontier queue, extracting each target, persisting records, and
//! feeding newly discovered profiles back into the queue.

mod orchestrator;

pub use orchestrator::Orchestrator;
