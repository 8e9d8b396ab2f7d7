use std::collections::BTreeMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::{AlertRecord, NewAlert, ReportRecord, SpikeCandidate, TrendOutcome};

pub const UNKNOWN_LOCATION: &str = "unknown";

#[derive(Debug, Clone, Copy)]
pub struct TrendConfig {
    pub window_days: i64,
    pub min_corpus: usize,
    pub spike_threshold: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            min_corpus: 5,
            spike_threshold: 2,
        }
    }
}

#[async_trait]
pub trait TrendStore {
    async fn list_reports_since(
        &self,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ReportRecord>>;

    async fn find_alert(
        &self,
        title: &str,
        trigger_date: NaiveDate,
    ) -> anyhow::Result<Option<AlertRecord>>;

    /// Returns false when an alert with the same (title, trigger_date)
    /// already exists.
    async fn create_alert(&self, alert: NewAlert) -> anyhow::Result<bool>;
}

pub fn cutoff(window_days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(window_days.max(1))
}

pub fn normalize_location(location: Option<&str>) -> String {
    match location.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_lowercase(),
        _ => UNKNOWN_LOCATION.to_string(),
    }
}

pub fn display_location(location: &str) -> String {
    location
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn detect_spikes(reports: &[ReportRecord], spike_threshold: usize) -> Vec<SpikeCandidate> {
    let mut groups: BTreeMap<(NaiveDate, String, String), usize> = BTreeMap::new();

    for report in reports {
        let key = (
            report.submitted_at.date_naive(),
            normalize_location(report.location.as_deref()),
            report.category.clone(),
        );
        *groups.entry(key).or_insert(0) += 1;
    }

    // Strictly greater than the threshold counts as a spike.
    groups
        .into_iter()
        .filter(|(_, count)| *count > spike_threshold)
        .map(|((date, location, category), count)| SpikeCandidate {
            date,
            location,
            category,
            count,
        })
        .collect()
}

pub fn alert_title(category: &str) -> String {
    format!("Spike in {category}")
}

pub fn alert_description(candidate: &SpikeCandidate) -> String {
    format!(
        "Detected {} reports of '{}' in {} on {}.",
        candidate.count,
        candidate.category,
        display_location(&candidate.location),
        candidate.date.format("%Y-%m-%d")
    )
}

pub async fn run_scan<S: TrendStore>(
    store: &S,
    config: &TrendConfig,
) -> anyhow::Result<TrendOutcome> {
    let since = cutoff(config.window_days);
    let reports = store
        .list_reports_since(since)
        .await
        .context("failed to read reports for trend scan")?;

    if reports.len() < config.min_corpus {
        tracing::info!(
            reports = reports.len(),
            min_corpus = config.min_corpus,
            "not enough recent reports to analyze"
        );
        return Ok(TrendOutcome::default());
    }

    let candidates = detect_spikes(&reports, config.spike_threshold);
    let mut outcome = TrendOutcome {
        candidates_found: candidates.len(),
        ..TrendOutcome::default()
    };

    for candidate in &candidates {
        let title = alert_title(&candidate.category);

        match store.find_alert(&title, candidate.date).await {
            Ok(Some(_)) => {
                tracing::debug!(%title, date = %candidate.date, "alert already recorded, skipping");
                continue;
            }
            Ok(None) => {}
            Err(err) => {
                // Candidates are independent; keep going with the rest.
                outcome.write_failures += 1;
                tracing::warn!(%title, error = %err, "failed to check for an existing alert");
                continue;
            }
        }

        let alert = NewAlert {
            title: title.clone(),
            description: alert_description(candidate),
            trigger_date: candidate.date,
        };

        match store.create_alert(alert).await {
            Ok(true) => {
                outcome.alerts_created += 1;
                tracing::info!(
                    %title,
                    date = %candidate.date,
                    count = candidate.count,
                    "new trend alert created"
                );
            }
            Ok(false) => {
                // A concurrent run won the insert; the unique index turned
                // ours into a no-op.
                tracing::debug!(%title, date = %candidate.date, "alert already recorded, skipping");
            }
            Err(err) => {
                outcome.write_failures += 1;
                tracing::warn!(%title, error = %err, "failed to persist trend alert");
            }
        }
    }

    Ok(outcome)
}
