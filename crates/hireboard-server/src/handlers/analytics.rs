//! Handlers for the recruiter dashboard.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/analytics/recruiter` | Recruiters only; `?timeRange=7days\|30days\|90days\|year` |
//! | `GET`  | `/analytics/jobs/active/count` | Any authenticated caller |

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use chrono::Utc;
use hireboard_core::{
  analytics::{self, AggregatedMetrics, TimeRange},
  store::AnalyticsStore,
};
use serde::Serialize;

use crate::{
  AppState,
  auth::{Authenticated, Recruiter},
  error::Error,
  handlers::Envelope,
};

/// Pick the range from the first `timeRange` pair. A missing, repeated or
/// unreadable query string never fails the request; it falls back to `30days`.
fn time_range_param(query: Result<Query<Vec<(String, String)>>, QueryRejection>) -> TimeRange {
  let pairs = query.map(|Query(pairs)| pairs).unwrap_or_default();
  let raw = pairs
    .iter()
    .find(|(key, _)| key == "timeRange")
    .map(|(_, value)| value.as_str());
  TimeRange::parse_lenient(raw)
}

/// `GET /analytics/recruiter[?timeRange=...]`
pub async fn recruiter<S>(
  State(state): State<AppState<S>>,
  Recruiter(identity): Recruiter,
  query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Envelope<AggregatedMetrics>>, Error>
where
  S: AnalyticsStore + Clone + 'static,
{
  let range = time_range_param(query);
  tracing::debug!(range = range.as_str(), user = ?identity.id, "recruiter analytics requested");

  let metrics = analytics::compute_recruiter_analytics(state.store.as_ref(), range, Utc::now())
    .await
    .map_err(|e| Error::from_core(e, "Failed to retrieve analytics data"))?;

  Ok(Envelope::ok("Analytics data retrieved successfully", metrics))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveJobCount {
  pub total_active_jobs: u64,
}

/// `GET /analytics/jobs/active/count`
pub async fn active_job_count<S>(
  State(state): State<AppState<S>>,
  Authenticated(_): Authenticated,
) -> Result<Json<Envelope<ActiveJobCount>>, Error>
where
  S: AnalyticsStore + Clone + 'static,
{
  let total_active_jobs = analytics::count_active_jobs(state.store.as_ref(), Utc::now())
    .await
    .map_err(|e| Error::from_core(e, "Failed to retrieve total active jobs count"))?;

  Ok(Envelope::ok(
    "Total active jobs count retrieved successfully",
    ActiveJobCount { total_active_jobs },
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pairs(raw: &[(&str, &str)]) -> Result<Query<Vec<(String, String)>>, QueryRejection> {
    Ok(Query(raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()))
  }

  #[test]
  fn first_time_range_wins() {
    let range = time_range_param(pairs(&[("timeRange", "7days"), ("timeRange", "year")]));
    assert_eq!(range, TimeRange::SevenDays);
  }

  #[test]
  fn other_keys_are_ignored() {
    let range = time_range_param(pairs(&[("page", "2"), ("timeRange", "90days")]));
    assert_eq!(range, TimeRange::NinetyDays);
  }

  #[test]
  fn missing_time_range_defaults() {
    assert_eq!(time_range_param(pairs(&[])), TimeRange::ThirtyDays);
  }
}
