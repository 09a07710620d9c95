//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the lifecycle of one crawl session, from structure discovery
//!   (or a structure cache hit) through bulk fetching to the response cache

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
