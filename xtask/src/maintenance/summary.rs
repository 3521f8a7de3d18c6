//! Formatting for maintenance run reports (Functional Core).

use std::time::Duration;

use eip_core::maintenance::RunSummary;
use eip_core::transform::Rejection;

/// Formats a run summary for display.
pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Pages scanned: {}", summary.pages),
        format!("Items scanned: {}", summary.scanned),
        format!("Items written: {}", summary.written),
        format!("Items rejected: {}", summary.rejected.len()),
        format!(
            "Write calls: {} ({} resubmissions)",
            summary.store_calls, summary.resubmissions
        ),
    ];

    if summary.throttle_events > 0 {
        lines.push(format!(
            "Throttled: {} times, {} spent backing off",
            summary.throttle_events,
            format_duration(summary.total_backoff)
        ));
    }

    if summary.consumed_capacity > 0.0 {
        lines.push(format!(
            "Read capacity consumed: {:.1} RCU",
            summary.consumed_capacity
        ));
    }

    lines
}

/// Formats up to `limit` rejections, noting how many were left out.
pub fn format_rejections(rejected: &[Rejection], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = rejected
        .iter()
        .take(limit)
        .map(|rejection| format!("- {rejection}"))
        .collect();

    if rejected.len() > limit {
        lines.push(format!("... and {} more", rejected.len() - limit));
    }

    lines
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match (secs / 60, secs % 60) {
        (0, s) => format!("{}.{:03}s", s, duration.subsec_millis()),
        (m, s) => format!("{m}m {s}s"),
    }
}
