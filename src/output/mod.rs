//! Output module for crawl reports
//!
//! This module handles:
//! - The [`CrawlReport`] carried by a completed crawl
//! - Rendering a report as markdown and writing it to disk
//! - Printing a report summary to the console

mod markdown;
mod report;
mod stats;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::{CrawlReport, OutputError, OutputResult};
pub use stats::print_report;
