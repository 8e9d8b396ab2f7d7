use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{AlertRecord, LabelCount, ReportRecord};
use crate::trends;

pub fn count_labels<I>(labels: I) -> Vec<LabelCount>
where
    I: IntoIterator<Item = String>,
{
    let mut map: HashMap<String, usize> = HashMap::new();
    for label in labels {
        *map.entry(label).or_insert(0) += 1;
    }

    let mut counts: Vec<LabelCount> = map
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts
}

pub fn top_locations(reports: &[ReportRecord], limit: usize) -> Vec<LabelCount> {
    let mut counts = count_labels(
        reports
            .iter()
            .map(|report| trends::normalize_location(report.location.as_deref())),
    );
    counts.truncate(limit);
    counts
}

pub fn build_report(
    scope: Option<&str>,
    since_days: i64,
    cutoff: DateTime<Utc>,
    reports: &[ReportRecord],
    alerts: &[AlertRecord],
) -> String {
    let categories = count_labels(reports.iter().map(|r| r.category.clone()));
    let sentiments = count_labels(reports.iter().map(|r| r.sentiment.clone()));
    let locations = top_locations(reports, 5);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all reports");

    let _ = writeln!(output, "# CrimeWatch Analytics Report");
    let _ = writeln!(
        output,
        "Generated for {} over the last {} days (reports since {})",
        scope_label,
        since_days,
        cutoff.date_naive()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Mix");

    if categories.is_empty() {
        let _ = writeln!(output, "No reports recorded for this window.");
    } else {
        for entry in categories.iter() {
            let _ = writeln!(output, "- {}: {} reports", entry.label, entry.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sentiment Mix");

    if sentiments.is_empty() {
        let _ = writeln!(output, "No reports recorded for this window.");
    } else {
        for entry in sentiments.iter() {
            let _ = writeln!(output, "- {}: {} reports", entry.label, entry.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Most Reported Locations");

    if locations.is_empty() {
        let _ = writeln!(output, "No reports recorded for this window.");
    } else {
        for entry in locations.iter() {
            let _ = writeln!(
                output,
                "- {}: {} reports",
                trends::display_location(&entry.label),
                entry.count
            );
        }
    }

    let mut recent_reports = reports.to_vec();
    recent_reports.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Reports");

    if recent_reports.is_empty() {
        let _ = writeln!(output, "No reports recorded for this window.");
    } else {
        for entry in recent_reports.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}, {}) on {}: {}",
                entry.title,
                entry.category,
                entry.status,
                entry.submitted_at.date_naive(),
                entry.description
            );
        }
    }

    let mut recent_alerts = alerts.to_vec();
    recent_alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Alerts");

    if recent_alerts.is_empty() {
        let _ = writeln!(output, "No alerts recorded.");
    } else {
        for alert in recent_alerts.iter().take(10) {
            let flag = if alert.is_read { "read" } else { "unread" };
            let _ = writeln!(
                output,
                "- {} ({}, {}): {}",
                alert.title, alert.trigger_date, flag, alert.description
            );
        }
    }

    output
}
