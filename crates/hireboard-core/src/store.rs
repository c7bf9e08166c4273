//! The `AnalyticsStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `hireboard-store-sqlite`).
//! The recorder, the aggregator, and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  engagement::{EngagementKind, JobId, UpsertOutcome},
  identity::UserId,
  job::JobListing,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Filter for [`AnalyticsStore::count_engagements`] and
/// [`AnalyticsStore::engagement_times`]. All bounds apply to `created_at`.
#[derive(Debug, Clone, Default)]
pub struct EngagementFilter {
  pub job_id:         Option<JobId>,
  /// Inclusive lower bound.
  pub created_after:  Option<DateTime<Utc>>,
  /// Exclusive upper bound.
  pub created_before: Option<DateTime<Utc>>,
}

impl EngagementFilter {
  pub fn since(start: DateTime<Utc>) -> Self {
    Self { created_after: Some(start), ..Self::default() }
  }

  pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
    Self {
      created_after: Some(start),
      created_before: Some(end),
      ..Self::default()
    }
  }

  pub fn for_job(job_id: JobId) -> Self {
    Self { job_id: Some(job_id), ..Self::default() }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the engagement event collections and the (read-only) job
/// directory.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait AnalyticsStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Engagement events ─────────────────────────────────────────────────

  /// Create the (kind, job, user) record, or refresh its occurred-at
  /// timestamp if it already exists, as one atomic write.
  fn upsert_engagement(
    &self,
    kind: EngagementKind,
    job_id: JobId,
    user_id: UserId,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + '_;

  fn count_engagements(
    &self,
    kind: EngagementKind,
    filter: EngagementFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// `created_at` of every matching record, in no particular order.
  fn engagement_times(
    &self,
    kind: EngagementKind,
    filter: EngagementFilter,
  ) -> impl Future<Output = Result<Vec<DateTime<Utc>>, Self::Error>> + Send + '_;

  // ── Job directory ─────────────────────────────────────────────────────

  /// Number of jobs whose apply-by deadline is strictly after `now`.
  fn count_active_jobs(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Up to `limit` active jobs in creation order, joined with company names.
  fn active_jobs(
    &self,
    now: DateTime<Utc>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<JobListing>, Self::Error>> + Send + '_;
}
