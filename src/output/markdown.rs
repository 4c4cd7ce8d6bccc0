//! Markdown report generation
//!
//! Renders accepted pages, ranked by relevance, with the run statistics.

use crate::output::report::{CrawlReport, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report to `output_path`, creating parent directories
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let markdown = format_markdown_report(report);
    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Sift Crawl Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n\n",
        report.duration().num_seconds()
    ));

    md.push_str("## Statistics\n\n");
    md.push_str(&format!("- **Pages Processed**: {}\n", report.processed));
    md.push_str(&format!("- **Pages Accepted**: {}\n", report.accepted_count()));
    md.push_str(&format!("- **Soft Failures**: {}\n", report.soft_failures()));
    md.push_str(&format!("- **Cache Hits**: {}\n\n", report.cache_hits));

    md.push_str("## Accepted Pages\n\n");
    if report.accepted.is_empty() {
        md.push_str("No pages met the match threshold.\n\n");
    } else {
        md.push_str("| URL | Matches | Terms |\n");
        md.push_str("|-----|---------|-------|\n");
        for result in report.ranked() {
            let terms = result
                .term_counts
                .iter()
                .map(|(term, count)| format!("{} ({})", term, count))
                .collect::<Vec<_>>()
                .join(", ");
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(result.url.as_str()),
                result.match_count,
                escape_cell(&terms)
            ));
        }
        md.push('\n');
    }

    if !report.failures.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | Reason |\n");
        md.push_str("|-----|--------|\n");
        for failure in &report.failures {
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&failure.url),
                escape_cell(&failure.reason.to_string())
            ));
        }
        md.push('\n');
    }

    md
}

/// Escapes a value for use inside a markdown table cell
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{FetchError, FetchFailure};
    use crate::matcher::MatchResult;
    use crate::url::CrawlUrl;
    use chrono::Utc;

    fn sample_report() -> CrawlReport {
        let mut report = CrawlReport::new(Utc::now());
        report.processed = 3;

        let mut accepted =
            MatchResult::empty(CrawlUrl::parse("https://example.com/algorithms").unwrap());
        accepted.match_count = 4;
        accepted.matched.insert("algorithm".to_string());
        accepted.term_counts.insert("algorithm".to_string(), 4);
        report.accepted.push(accepted);

        report.failures.push(FetchError {
            url: "https://example.com/gone".to_string(),
            reason: FetchFailure::HttpStatus(404),
        });
        report
    }

    #[test]
    fn test_markdown_contains_sections() {
        let md = format_markdown_report(&sample_report());

        assert!(md.contains("# Sift Crawl Report"));
        assert!(md.contains("- **Pages Processed**: 3"));
        assert!(md.contains("- **Pages Accepted**: 1"));
        assert!(md.contains("| https://example.com/algorithms | 4 | algorithm (4) |"));
        assert!(md.contains("| https://example.com/gone | HTTP 404 |"));
    }

    #[test]
    fn test_pipes_in_cells_are_escaped() {
        let mut report = CrawlReport::new(Utc::now());
        report.accepted.push(MatchResult::empty(
            CrawlUrl::parse("https://example.com/search?q=a|b").unwrap(),
        ));
        report.failures.push(FetchError {
            url: "https://example.com/x?y=1|2".to_string(),
            reason: FetchFailure::Network("bad | reply".to_string()),
        });

        let md = format_markdown_report(&report);

        assert!(md.contains("| https://example.com/search?q=a\\|b | 0 |  |"));
        assert!(md.contains("| https://example.com/x?y=1\\|2 | network: bad \\| reply |"));
    }

    #[test]
    fn test_markdown_without_accepted_pages() {
        let report = CrawlReport::new(Utc::now());
        let md = format_markdown_report(&report);
        assert!(md.contains("No pages met the match threshold."));
        assert!(!md.contains("## Failed Pages"));
    }

    #[test]
    fn test_write_markdown_report() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reports").join("summary.md");

        write_markdown_report(&sample_report(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Sift Crawl Report"));
    }
}
