use std::fmt::Write;

use crate::{domain::text::capitalize, import::stats::ImportStats};

const RULE_WIDTH: usize = 60;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Summary of one category run
pub fn category_summary(category: &str, stats: &ImportStats, verbose: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "Summary for {}", capitalize(category));
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "Total:       {}", stats.total);
    let _ = writeln!(out, "Successful:  {}", stats.successful);
    let _ = writeln!(out, "Failed:      {}", stats.failed);
    let _ = writeln!(out, "Skipped:     {}", stats.skipped);
    let _ = writeln!(out, "Duration:    {:.1}s", stats.duration.as_secs_f64());

    if !stats.errors.is_empty() {
        let (shown, hidden) = stats.errors_preview();
        let _ = writeln!(out, "\nErrors ({}):", stats.errors.len());
        for error in shown {
            let _ = writeln!(out, "  - {}: {}", error.id, error.error);
            if verbose {
                if let Some(detail) = &error.detail {
                    let _ = writeln!(out, "      {detail}");
                }
            }
        }
        if hidden > 0 {
            let _ = writeln!(out, "  ... and {hidden} more");
        }
    }

    out
}

/// Totals over every category that ran
pub fn overall_summary(overall: &ImportStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "OVERALL SUMMARY");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "Total items:     {}", overall.total);
    let _ = writeln!(out, "Successful:      {}", overall.successful);
    let _ = writeln!(out, "Failed:          {}", overall.failed);
    let _ = writeln!(out, "Skipped:         {}", overall.skipped);
    let _ = writeln!(out, "Total duration:  {:.1}s", overall.duration.as_secs_f64());
    out
}
