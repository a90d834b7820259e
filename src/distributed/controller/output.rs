use crate::error::AppResult;

use super::{AggregateReport, ControllerRun};

/// Printed before dispatch.
#[must_use]
pub fn banner_line(run: &ControllerRun) -> String {
    format!(
        "[keycrate] op={}, workers={} total_iters={} conc/worker={}",
        run.op,
        run.workers.len(),
        group_thousands(run.total_iters),
        run.concurrency_per_worker.get()
    )
}

/// Human-readable report: one line per answering worker, then the totals.
#[must_use]
pub fn render_text(report: &AggregateReport) -> String {
    let mut lines = vec![String::new(), "Per-worker:".to_owned()];
    for result in &report.per_worker {
        lines.push(format!(
            "  {:<12} {:<12} iters={} dur={:.3}s thr={}/s errors={}",
            result.hostname,
            result.op,
            group_thousands(result.completed_iterations()),
            result.duration_sec,
            format_throughput(result.throughput_ops_per_sec),
            result.errors
        ));
    }

    lines.push(String::new());
    lines.push("Aggregate:".to_owned());
    lines.push(format!(
        "  total iters: {}",
        group_thousands(report.total_completed)
    ));
    lines.push(format!(
        "  aggregate throughput: {} ops/s",
        format_throughput(Some(report.aggregate_throughput))
    ));
    lines.push(format!(
        "  wall time (controller): {:.3}s",
        report.wall_time_seconds
    ));
    if report.total_errors > 0 {
        lines.push(format!("  errors: {}", report.total_errors));
    }
    if !report.failures.is_empty() {
        lines.push(format!("  failed workers: {}", report.failures.len()));
        for failure in &report.failures {
            lines.push(format!("    {}: {}", failure.worker, failure.error));
        }
    }
    lines.join("\n")
}

/// # Errors
///
/// Returns an error when the report cannot be serialized.
pub fn render_json(report: &AggregateReport) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn format_throughput(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |ops| group_thousands(ops as u64))
}

pub(super) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len().saturating_mul(2));
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && digits.len().saturating_sub(index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
