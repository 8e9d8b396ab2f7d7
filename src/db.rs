use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::classifier::ClassifierConfig;
use crate::models::{AlertRecord, NewAlert, NewReport, ReportRecord};
use crate::trends::TrendStore;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let rules = ClassifierConfig::default();

    let rows = vec![
        (
            "seed-001",
            "Phone snatched",
            "Please help, my phone was stolen near the metro station",
            Some("Delhi"),
            1,
        ),
        (
            "seed-002",
            "Shop robbery",
            "Two men robbed the corner shop on the main road",
            Some("Delhi"),
            1,
        ),
        (
            "seed-003",
            "Car break-in",
            "Reporting a theft from a parked car outside my house",
            Some(" delhi "),
            1,
        ),
        (
            "seed-004",
            "Park vandalism",
            "Someone vandalized the park benches overnight",
            Some("Mumbai"),
            2,
        ),
        (
            "seed-005",
            "Account takeover",
            "My bank account was hacked and money was moved immediately",
            None,
            3,
        ),
    ];

    for (source_key, title, description, location, days_ago) in rows {
        let report = NewReport {
            title: title.to_string(),
            description: description.to_string(),
            location: location.map(|l| l.to_string()),
            category: rules.category.classify(description).to_string(),
            sentiment: rules.sentiment.classify(description).to_string(),
            submitted_at: Utc::now() - Duration::days(days_ago),
            source_key: Some(source_key.to_string()),
        };
        insert_report(pool, &report).await?;
    }

    Ok(())
}

pub async fn insert_report(pool: &PgPool, report: &NewReport) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO crimewatch.reports
        (id, title, description, location, category, sentiment, submitted_at, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&report.title)
    .bind(&report.description)
    .bind(&report.location)
    .bind(&report.category)
    .bind(&report.sentiment)
    .bind(report.submitted_at)
    .bind(&report.source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn import_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
    rules: &ClassifierConfig,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        title: String,
        description: String,
        location: Option<String>,
        submitted_at: DateTime<Utc>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let report = NewReport {
            category: rules.category.classify(&row.description).to_string(),
            sentiment: rules.sentiment.classify(&row.description).to_string(),
            title: row.title,
            description: row.description,
            location: row.location,
            submitted_at: row.submitted_at,
            source_key: Some(source_key),
        };

        if insert_report(pool, &report).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn fetch_reports_since(
    pool: &PgPool,
    since: DateTime<Utc>,
    category: Option<&str>,
    location: Option<&str>,
) -> anyhow::Result<Vec<ReportRecord>> {
    let mut query = String::from(
        "SELECT id, title, description, location, category, sentiment, status, submitted_at \
         FROM crimewatch.reports \
         WHERE submitted_at >= $1",
    );

    if category.is_some() {
        query.push_str(" AND category = $2");
    } else if location.is_some() {
        query.push_str(" AND lower(btrim(location)) = lower(btrim($2))");
    }
    query.push_str(" ORDER BY submitted_at");

    let mut rows = sqlx::query(&query).bind(since);

    if let Some(value) = category {
        rows = rows.bind(value);
    } else if let Some(value) = location {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut reports = Vec::new();

    for row in records {
        reports.push(ReportRecord {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            location: row.get("location"),
            category: row.get("category"),
            sentiment: row.get("sentiment"),
            status: row.get("status"),
            submitted_at: row.get("submitted_at"),
        });
    }

    Ok(reports)
}

fn alert_from_row(row: PgRow) -> AlertRecord {
    AlertRecord {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        trigger_date: row.get("trigger_date"),
        created_at: row.get("created_at"),
        is_read: row.get("is_read"),
    }
}

pub async fn fetch_alerts(pool: &PgPool, unread_only: bool) -> anyhow::Result<Vec<AlertRecord>> {
    let mut query = String::from(
        "SELECT id, title, description, trigger_date, created_at, is_read \
         FROM crimewatch.alerts",
    );
    if unread_only {
        query.push_str(" WHERE is_read = FALSE");
    }
    query.push_str(" ORDER BY created_at DESC");

    let rows = sqlx::query(&query).fetch_all(pool).await?;
    Ok(rows.into_iter().map(alert_from_row).collect())
}

pub async fn mark_alert_read(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("UPDATE crimewatch.alerts SET is_read = TRUE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl TrendStore for PgPool {
    async fn list_reports_since(
        &self,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ReportRecord>> {
        fetch_reports_since(self, since, None, None).await
    }

    async fn find_alert(
        &self,
        title: &str,
        trigger_date: NaiveDate,
    ) -> anyhow::Result<Option<AlertRecord>> {
        let row = sqlx::query(
            "SELECT id, title, description, trigger_date, created_at, is_read \
             FROM crimewatch.alerts \
             WHERE title = $1 AND trigger_date = $2",
        )
        .bind(title)
        .bind(trigger_date)
        .fetch_optional(self)
        .await?;

        Ok(row.map(alert_from_row))
    }

    async fn create_alert(&self, alert: NewAlert) -> anyhow::Result<bool> {
        // The unique index on (title, trigger_date) makes a concurrent
        // duplicate insert a no-op instead of a second alert.
        let result = sqlx::query(
            r#"
            INSERT INTO crimewatch.alerts (id, title, description, trigger_date, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (title, trigger_date) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&alert.title)
        .bind(&alert.description)
        .bind(alert.trigger_date)
        .bind(Utc::now())
        .execute(self)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
