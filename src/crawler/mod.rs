//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - HTML text and link extraction
//! - The frontier queue and visited set
//! - The worker pool and overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod report;
mod visited;
mod worker;

pub use coordinator::{run_crawl, Crawler};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{process_page, ProcessedPage};
pub use report::{CrawlReport, CrawlStats};
pub use visited::{Admission, VisitedSet};
