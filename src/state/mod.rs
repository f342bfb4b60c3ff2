//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the controller's lifecycle (idle, initializing, running, draining, stopped)

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
