use std::fmt::Write;

use crate::model::ReconciliationReport;
use crate::processing::processor::RepairSuggestion;

const RULER: &str = "============================================================";

fn percent(rate: f64) -> f64 {
    (rate * 1000.0).round() / 10.0
}

/// Human readable run summary. With `show_all` every result is listed with
/// its status, otherwise only the broken entries with their reasons.
pub fn format_summary(report: &ReconciliationReport, show_all: bool) -> String {
    let mut out = String::with_capacity(256 + report.total * 80);
    let _ = writeln!(out, "{RULER}");
    let _ = writeln!(out, "Channel report {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Total: {}", report.total);
    let _ = writeln!(out, "Working: {}", report.working_count);
    let _ = writeln!(out, "Broken: {}", report.broken_count);
    let _ = writeln!(out, "Success rate: {:.1}%", percent(report.success_rate));

    if report.total == 0 {
        let _ = writeln!(out, "No channels checked.");
        let _ = write!(out, "{RULER}");
        return out;
    }

    let stats = report.category_stats();
    let _ = writeln!(out, "\nCategories:");
    for stat in &stats {
        let _ = writeln!(out, "  {}: {}/{} ({:.1}%)", stat.category, stat.working, stat.total, percent(stat.success_rate()));
    }

    if show_all {
        let _ = writeln!(out, "\nChannels:");
        for result in report.results() {
            let mark = if result.reachable { "ok" } else { "broken" };
            let _ = writeln!(out, "  [{mark}] {} ({}): {}", result.name, result.category, result.status_label);
        }
    } else if report.broken.is_empty() {
        let _ = writeln!(out, "\nAll channels are working.");
    } else {
        let _ = writeln!(out, "\nBroken channels:");
        for result in &report.broken {
            let _ = writeln!(out, "  - {} ({}): {}", result.name, result.category, result.status_label);
        }
    }
    let _ = write!(out, "{RULER}");
    out
}

pub fn format_suggestions(suggestions: &[RepairSuggestion]) -> String {
    let mut out = String::with_capacity(128 + suggestions.len() * 160);
    let _ = writeln!(out, "{RULER}");
    if suggestions.is_empty() {
        let _ = writeln!(out, "No broken channels in last report.");
    }
    for suggestion in suggestions {
        let _ = writeln!(out, "{} ({}): {} [{}]", suggestion.name, suggestion.category, suggestion.status_label, suggestion.class);
        let _ = writeln!(out, "  advice: {}", suggestion.class.advice());
        match suggestion.replacement.as_deref() {
            Some(url) => { let _ = writeln!(out, "  replacement: {url}"); }
            None => { let _ = writeln!(out, "  no replacement"); }
        }
    }
    let _ = write!(out, "{RULER}");
    out
}
