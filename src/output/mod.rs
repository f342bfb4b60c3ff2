//! Output module for crawl reports and archive statistics
//!
//! This module handles:
//! - Printing the report of a finished crawl
//! - Computing and printing statistics of an archive database

pub mod stats;

pub use stats::{load_statistics, print_statistics, ArchiveStatistics};

use crate::crawler::CrawlReport;

/// Prints a crawl report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("{}", report);
}
