//! Recruiter metrics aggregator.
//!
//! Answers "how is recruiting performing" over a trailing window, compared
//! against the equal-length window immediately before it. Everything here is
//! read-only; the metric arithmetic is kept in plain functions so the
//! zero-baseline rules can be tested without a store.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike as _, Duration, Utc};
use serde::Serialize;

use crate::{
  Error, Result,
  engagement::EngagementKind,
  job::JobListing,
  store::{AnalyticsStore, EngagementFilter},
};

/// Maximum number of jobs reported in [`AggregatedMetrics::position_stats`].
pub const POSITION_STATS_LIMIT: usize = 10;

/// Every job in the position stats is active, so this never varies.
pub const ACTIVE_STATUS: &str = "Active";

// ─── Time range ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
  SevenDays,
  #[default]
  ThirtyDays,
  NinetyDays,
  Year,
}

impl TimeRange {
  /// Unrecognised or absent values fall back to thirty days rather than
  /// failing the request.
  pub fn parse_lenient(raw: Option<&str>) -> Self {
    match raw {
      Some("7days") => TimeRange::SevenDays,
      Some("30days") => TimeRange::ThirtyDays,
      Some("90days") => TimeRange::NinetyDays,
      Some("year") => TimeRange::Year,
      _ => TimeRange::default(),
    }
  }

  pub fn days(self) -> i64 {
    match self {
      TimeRange::SevenDays => 7,
      TimeRange::ThirtyDays => 30,
      TimeRange::NinetyDays => 90,
      TimeRange::Year => 365,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      TimeRange::SevenDays => "7days",
      TimeRange::ThirtyDays => "30days",
      TimeRange::NinetyDays => "90days",
      TimeRange::Year => "year",
    }
  }
}

/// A half-open `[start, end)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl Window {
  pub fn ending_at(now: DateTime<Utc>, range: TimeRange) -> Self {
    Self { start: now - Duration::days(range.days()), end: now }
  }

  /// The equal-length window immediately before this one.
  pub fn previous(&self) -> Self {
    let len = self.end - self.start;
    Self { start: self.start - len, end: self.start }
  }
}

// ─── Metric arithmetic ───────────────────────────────────────────────────────

fn round1(x: f64) -> f64 { (x * 10.0).round() / 10.0 }

fn raw_rate(applications: u64, views: u64) -> f64 {
  if views == 0 { 0.0 } else { applications as f64 / views as f64 * 100.0 }
}

/// `applications / views * 100` to one decimal; `0` when there are no views.
pub fn conversion_rate(applications: u64, views: u64) -> f64 {
  round1(raw_rate(applications, views))
}

/// Per-job rate as displayed in the position table, e.g. `"20.0%"`.
pub fn conversion_rate_label(applications: u64, views: u64) -> String {
  if views == 0 {
    "0%".to_owned()
  } else {
    format!("{:.1}%", conversion_rate(applications, views))
  }
}

/// Period-over-period growth in percent, to one decimal.
///
/// A zero baseline reports a flat `100` whatever the current value, including
/// when the current value is also zero.
pub fn growth(current: u64, previous: u64) -> f64 {
  if previous == 0 {
    return 100.0;
  }
  round1((current as f64 - previous as f64) / previous as f64 * 100.0)
}

/// Growth of the conversion rate against the previous window's rate.
///
/// Unlike [`growth`], a zero baseline with a zero current rate reports `0`;
/// a zero baseline with any positive current rate reports `100`.
pub fn conversion_growth(current_rate: f64, previous_rate: f64) -> f64 {
  if previous_rate > 0.0 {
    round1((current_rate - previous_rate) / previous_rate * 100.0)
  } else if current_rate == 0.0 {
    0.0
  } else {
    100.0
  }
}

// ─── Weekly series ───────────────────────────────────────────────────────────

/// One point of a weekly series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekBucket {
  /// `"Week {n}"`, where `n` is the ISO week number.
  pub name:  String,
  pub count: u64,
}

/// Group timestamps by ISO (year, week) and emit buckets in ascending order,
/// regardless of input order.
pub fn bucket_by_iso_week<I>(times: I) -> Vec<WeekBucket>
where
  I: IntoIterator<Item = DateTime<Utc>>,
{
  let mut weeks: BTreeMap<(i32, u32), u64> = BTreeMap::new();
  for t in times {
    let iso = t.iso_week();
    *weeks.entry((iso.year(), iso.week())).or_default() += 1;
  }

  weeks
    .into_iter()
    .map(|((_, week), count)| WeekBucket { name: format!("Week {week}"), count })
    .collect()
}

// ─── Result types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiData {
  pub total_applications:       u64,
  pub application_growth:       f64,
  pub total_views:              u64,
  pub views_growth:             f64,
  pub conversion_rate:          f64,
  pub conversion_growth:        f64,
  pub total_active_jobs:        u64,
  // Aliases still read by older dashboard builds.
  pub system_wide_views:        u64,
  pub system_wide_apply_clicks: u64,
  pub active_jobs:              u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionStat {
  pub id:              String,
  pub title:           String,
  pub company:         String,
  pub views:           u64,
  pub applications:    u64,
  pub conversion_rate: String,
  pub status:          &'static str,
}

/// The computed dashboard payload. Never stored, always derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMetrics {
  pub kpi_data:          KpiData,
  pub applications_data: Vec<WeekBucket>,
  pub views_data:        Vec<WeekBucket>,
  pub position_stats:    Vec<PositionStat>,
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Count of jobs whose apply-by deadline is after `now`.
pub async fn count_active_jobs<S: AnalyticsStore>(store: &S, now: DateTime<Utc>) -> Result<u64> {
  store.count_active_jobs(now).await.map_err(Error::storage)
}

/// Compute the full recruiter dashboard for `range` ending at `now`.
///
/// The sub-queries are not read from a single snapshot; an engagement landing
/// mid-computation may show up in some counts and not others. Any store error
/// aborts the whole computation.
pub async fn compute_recruiter_analytics<S: AnalyticsStore>(
  store: &S,
  range: TimeRange,
  now: DateTime<Utc>,
) -> Result<AggregatedMetrics> {
  let current = Window::ending_at(now, range);
  let previous = current.previous();

  let total_views = count(store, EngagementKind::View, EngagementFilter::since(current.start)).await?;
  let total_applications =
    count(store, EngagementKind::ApplyClick, EngagementFilter::since(current.start)).await?;
  let total_active_jobs = count_active_jobs(store, now).await?;

  let views_data = weekly(store, EngagementKind::View, current).await?;
  let applications_data = weekly(store, EngagementKind::ApplyClick, current).await?;

  let listings = store
    .active_jobs(now, POSITION_STATS_LIMIT)
    .await
    .map_err(Error::storage)?;
  let mut position_stats = Vec::with_capacity(listings.len());
  for listing in listings {
    position_stats.push(position_stat(store, listing).await?);
  }

  let previous_filter = EngagementFilter::between(previous.start, previous.end);
  let previous_views = count(store, EngagementKind::View, previous_filter.clone()).await?;
  let previous_applications = count(store, EngagementKind::ApplyClick, previous_filter).await?;

  let conversion = conversion_rate(total_applications, total_views);
  let previous_conversion = raw_rate(previous_applications, previous_views);

  tracing::debug!(
    range = range.as_str(),
    total_views,
    total_applications,
    previous_views,
    previous_applications,
    "computed recruiter analytics"
  );

  Ok(AggregatedMetrics {
    kpi_data: KpiData {
      total_applications,
      application_growth: growth(total_applications, previous_applications),
      total_views,
      views_growth: growth(total_views, previous_views),
      conversion_rate: conversion,
      conversion_growth: conversion_growth(conversion, previous_conversion),
      total_active_jobs,
      system_wide_views: total_views,
      system_wide_apply_clicks: total_applications,
      active_jobs: total_active_jobs,
    },
    applications_data,
    views_data,
    position_stats,
  })
}

async fn count<S: AnalyticsStore>(
  store: &S,
  kind: EngagementKind,
  filter: EngagementFilter,
) -> Result<u64> {
  store.count_engagements(kind, filter).await.map_err(Error::storage)
}

async fn weekly<S: AnalyticsStore>(
  store: &S,
  kind: EngagementKind,
  window: Window,
) -> Result<Vec<WeekBucket>> {
  let times = store
    .engagement_times(kind, EngagementFilter::between(window.start, window.end))
    .await
    .map_err(Error::storage)?;
  Ok(bucket_by_iso_week(times))
}

/// Per-job counts are all-time, not windowed.
async fn position_stat<S: AnalyticsStore>(store: &S, listing: JobListing) -> Result<PositionStat> {
  let job_id = listing.job.job_id.clone();
  let views = count(store, EngagementKind::View, EngagementFilter::for_job(job_id.clone())).await?;
  let applications =
    count(store, EngagementKind::ApplyClick, EngagementFilter::for_job(job_id.clone())).await?;

  Ok(PositionStat {
    company: listing.company_display_name().to_owned(),
    id: job_id.as_str().to_owned(),
    title: listing.job.title,
    views,
    applications,
    conversion_rate: conversion_rate_label(applications, views),
    status: ACTIVE_STATUS,
  })
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::Ordering;

  use chrono::TimeZone as _;

  use super::*;
  use crate::{
    engagement::JobId,
    job::{Company, Job, UNKNOWN_COMPANY},
    memory::MemoryStore,
  };

  fn job(id: &str, company: Option<&str>, apply_by: DateTime<Utc>, created_at: DateTime<Utc>) -> Job {
    Job {
      job_id: JobId::parse(id).unwrap(),
      title: format!("Role {id}"),
      company_id: company.map(str::to_owned),
      apply_by,
      created_at,
    }
  }

  // ── Arithmetic ──────────────────────────────────────────────────────────

  #[test]
  fn unknown_time_range_defaults_to_thirty_days() {
    assert_eq!(TimeRange::parse_lenient(Some("7days")), TimeRange::SevenDays);
    assert_eq!(TimeRange::parse_lenient(Some("year")).days(), 365);
    assert_eq!(TimeRange::parse_lenient(Some("fortnight")), TimeRange::ThirtyDays);
    assert_eq!(TimeRange::parse_lenient(None), TimeRange::ThirtyDays);
  }

  #[test]
  fn previous_window_is_adjacent_and_equal_length() {
    let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
    let current = Window::ending_at(now, TimeRange::SevenDays);
    let previous = current.previous();
    assert_eq!(previous.end, current.start);
    assert_eq!(previous.end - previous.start, current.end - current.start);
    assert_eq!(previous.start, now - Duration::days(14));
  }

  #[test]
  fn conversion_rate_is_zero_without_views() {
    assert_eq!(conversion_rate(5, 0), 0.0);
    assert_eq!(conversion_rate(0, 0), 0.0);
    assert_eq!(conversion_rate(2, 10), 20.0);
    assert_eq!(conversion_rate(1, 3), 33.3);
  }

  #[test]
  fn conversion_rate_label_formatting() {
    assert_eq!(conversion_rate_label(2, 10), "20.0%");
    assert_eq!(conversion_rate_label(0, 10), "0.0%");
    assert_eq!(conversion_rate_label(3, 0), "0%");
  }

  #[test]
  fn growth_with_zero_baseline_is_flat_hundred() {
    assert_eq!(growth(5, 0), 100.0);
    assert_eq!(growth(5000, 0), 100.0);
    assert_eq!(growth(0, 0), 100.0);
  }

  #[test]
  fn growth_rounds_to_one_decimal() {
    assert_eq!(growth(15, 10), 50.0);
    assert_eq!(growth(5, 10), -50.0);
    assert_eq!(growth(4, 3), 33.3);
  }

  #[test]
  fn conversion_growth_zero_baseline_rules() {
    assert_eq!(conversion_growth(0.0, 0.0), 0.0);
    assert_eq!(conversion_growth(12.5, 0.0), 100.0);
    assert_eq!(conversion_growth(30.0, 20.0), 50.0);
  }

  #[test]
  fn weeks_are_emitted_in_ascending_order() {
    // ISO weeks 1, 3 and 2 of 2025, in that insertion order.
    let week1 = Utc.with_ymd_and_hms(2024, 12, 31, 9, 0, 0).unwrap();
    let week3 = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
    let week2 = Utc.with_ymd_and_hms(2025, 1, 8, 9, 0, 0).unwrap();

    let buckets = bucket_by_iso_week([week1, week3, week3, week2]);
    let names: Vec<_> = buckets.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Week 1", "Week 2", "Week 3"]);
    assert_eq!(buckets[2].count, 2);
  }

  #[test]
  fn weeks_sort_by_year_before_week() {
    let late_2024 = Utc.with_ymd_and_hms(2024, 12, 20, 9, 0, 0).unwrap(); // 2024-W51
    let early_2025 = Utc.with_ymd_and_hms(2025, 1, 8, 9, 0, 0).unwrap(); // 2025-W02
    let buckets = bucket_by_iso_week([early_2025, late_2024]);
    let names: Vec<_> = buckets.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Week 51", "Week 2"]);
  }

  // ── Aggregation ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn end_to_end_seven_day_dashboard() {
    let now = Utc::now();
    let store = MemoryStore::default();
    store.add_company(Company { company_id: "c1".into(), name: "Acme".into() });
    store.add_job(job("j1", Some("c1"), now + Duration::days(10), now - Duration::days(30)));

    for i in 0..10 {
      store.seed(EngagementKind::View, "j1", &format!("u{i}"), now - Duration::hours(i + 1));
    }
    for i in 0..2 {
      store.seed(EngagementKind::ApplyClick, "j1", &format!("u{i}"), now - Duration::hours(i + 1));
    }

    let metrics = compute_recruiter_analytics(&store, TimeRange::SevenDays, now).await.unwrap();
    let kpi = &metrics.kpi_data;
    assert_eq!(kpi.total_views, 10);
    assert_eq!(kpi.total_applications, 2);
    assert_eq!(kpi.conversion_rate, 20.0);
    assert_eq!(kpi.total_active_jobs, 1);
    assert_eq!(kpi.active_jobs, 1);
    assert_eq!(kpi.system_wide_views, 10);
    assert_eq!(kpi.system_wide_apply_clicks, 2);
    // Nothing in the previous window, nothing converted then either.
    assert_eq!(kpi.views_growth, 100.0);
    assert_eq!(kpi.application_growth, 100.0);
    assert_eq!(kpi.conversion_growth, 100.0);

    assert_eq!(metrics.position_stats.len(), 1);
    let stat = &metrics.position_stats[0];
    assert_eq!(stat.id, "j1");
    assert_eq!(stat.company, "Acme");
    assert_eq!(stat.views, 10);
    assert_eq!(stat.applications, 2);
    assert_eq!(stat.conversion_rate, "20.0%");
    assert_eq!(stat.status, "Active");

    let total: u64 = metrics.views_data.iter().map(|b| b.count).sum();
    assert_eq!(total, 10);
  }

  #[tokio::test]
  async fn empty_store_reports_zero_conversion() {
    let store = MemoryStore::default();
    let metrics = compute_recruiter_analytics(&store, TimeRange::ThirtyDays, Utc::now())
      .await
      .unwrap();

    assert_eq!(metrics.kpi_data.conversion_rate, 0.0);
    assert_eq!(metrics.kpi_data.conversion_growth, 0.0);
    assert_eq!(metrics.kpi_data.views_growth, 100.0);
    assert!(metrics.views_data.is_empty());
    assert!(metrics.position_stats.is_empty());

    let json = serde_json::to_value(&metrics).unwrap();
    assert_eq!(json["kpiData"]["conversionRate"], 0.0);
  }

  #[tokio::test]
  async fn growth_against_previous_window() {
    let now = Utc::now();
    let store = MemoryStore::default();
    // Previous 7-day window: 4 views, 1 application (25%).
    for i in 0..4 {
      store.seed(EngagementKind::View, "j1", &format!("p{i}"), now - Duration::days(10));
    }
    store.seed(EngagementKind::ApplyClick, "j1", "p0", now - Duration::days(10));
    // Current window: 6 views, 3 applications (50%).
    for i in 0..6 {
      store.seed(EngagementKind::View, "j1", &format!("c{i}"), now - Duration::days(1));
    }
    for i in 0..3 {
      store.seed(EngagementKind::ApplyClick, "j1", &format!("c{i}"), now - Duration::days(1));
    }

    let kpi = compute_recruiter_analytics(&store, TimeRange::SevenDays, now)
      .await
      .unwrap()
      .kpi_data;
    assert_eq!(kpi.total_views, 6);
    assert_eq!(kpi.views_growth, 50.0);
    assert_eq!(kpi.application_growth, 200.0);
    assert_eq!(kpi.conversion_rate, 50.0);
    assert_eq!(kpi.conversion_growth, 100.0);
  }

  #[tokio::test]
  async fn inactive_jobs_are_excluded() {
    let now = Utc::now();
    let store = MemoryStore::default();
    store.add_job(job("expired", None, now - Duration::days(1), now - Duration::days(20)));
    store.add_job(job("open", None, now + Duration::days(1), now - Duration::days(10)));

    assert_eq!(count_active_jobs(&store, now).await.unwrap(), 1);

    let metrics = compute_recruiter_analytics(&store, TimeRange::ThirtyDays, now).await.unwrap();
    assert_eq!(metrics.kpi_data.total_active_jobs, 1);
    let ids: Vec<_> = metrics.position_stats.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["open"]);
    assert_eq!(metrics.position_stats[0].company, UNKNOWN_COMPANY);
    assert_eq!(metrics.position_stats[0].conversion_rate, "0%");
  }

  #[tokio::test]
  async fn position_stats_capped_at_ten_in_creation_order() {
    let now = Utc::now();
    let store = MemoryStore::default();
    for i in (0..12).rev() {
      store.add_job(job(
        &format!("j{i:02}"),
        None,
        now + Duration::days(5),
        now - Duration::days(30 - i),
      ));
    }

    let metrics = compute_recruiter_analytics(&store, TimeRange::ThirtyDays, now).await.unwrap();
    assert_eq!(metrics.position_stats.len(), POSITION_STATS_LIMIT);
    assert_eq!(metrics.position_stats[0].id, "j00");
    assert_eq!(metrics.position_stats[9].id, "j09");
    assert_eq!(metrics.kpi_data.total_active_jobs, 12);
  }

  #[tokio::test]
  async fn store_failure_aborts_without_partial_result() {
    let store = MemoryStore::default();
    store.fail.store(true, Ordering::SeqCst);
    let err = compute_recruiter_analytics(&store, TimeRange::SevenDays, Utc::now())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
  }
}
