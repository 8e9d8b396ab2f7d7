use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ReportRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub category: String,
    pub sentiment: String,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub category: String,
    pub sentiment: String,
    pub submitted_at: DateTime<Utc>,
    pub source_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AlertRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub trigger_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone)]
pub struct NewAlert {
    pub title: String,
    pub description: String,
    pub trigger_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpikeCandidate {
    pub date: NaiveDate,
    pub location: String,
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrendOutcome {
    pub candidates_found: usize,
    pub alerts_created: usize,
    pub write_failures: usize,
}

#[derive(Debug, Clone)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}
