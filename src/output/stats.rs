//! Console output of crawl results

use crate::output::report::CrawlReport;

/// Prints a report summary to stdout in a formatted manner
///
/// At most `top` accepted pages are listed, best match first.
pub fn print_report(report: &CrawlReport, top: usize) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages processed: {}", report.processed);
    println!("  Pages accepted: {}", report.accepted_count());
    println!("  Soft failures: {}", report.soft_failures());
    println!("  Cache hits: {}", report.cache_hits);
    println!("  Duration: {}s", report.duration().num_seconds());
    println!();

    if report.accepted.is_empty() {
        return;
    }

    let acceptance_rate = if report.processed > 0 {
        (report.accepted_count() as f64 / report.processed as f64) * 100.0
    } else {
        0.0
    };
    println!("Acceptance Rate: {:.1}%\n", acceptance_rate);

    println!("Top Pages:");
    for result in report.ranked().into_iter().take(top) {
        println!("  {:>5}  {}", result.match_count, result.url);
    }
    if report.accepted.len() > top {
        println!("  ... and {} more", report.accepted.len() - top);
    }
}
