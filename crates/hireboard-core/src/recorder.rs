//! Engagement recorder.
//!
//! Recording is lenient: an engagement from a role that is not tracked, or a
//! write that loses a uniqueness race, is a successful no-op. Only a missing
//! identifier or a storage failure is an error.

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  engagement::{EngagementEvent, EngagementKind, JobId, UpsertOutcome},
  identity::{AuthorizedIdentity, Role, TRACKED_ROLES},
  store::AnalyticsStore,
};

/// Why an engagement was accepted without being counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
  RoleNotTracked(Role),
  AlreadyTracked,
}

#[derive(Debug, Clone)]
pub enum RecordOutcome {
  Counted(EngagementEvent),
  Ignored(IgnoreReason),
}

impl RecordOutcome {
  pub fn counted(&self) -> bool { matches!(self, Self::Counted(_)) }
}

/// Record that `identity` engaged with `job_id` at `now`.
pub async fn record_engagement<S>(
  store: &S,
  kind: EngagementKind,
  job_id: &str,
  identity: &AuthorizedIdentity,
  now: DateTime<Utc>,
) -> Result<RecordOutcome>
where
  S: AnalyticsStore,
{
  if !identity.has_role(TRACKED_ROLES) {
    tracing::debug!(
      kind = kind.label(),
      role = %identity.role,
      "engagement not tracked: role is not candidate or student"
    );
    return Ok(RecordOutcome::Ignored(IgnoreReason::RoleNotTracked(identity.role)));
  }

  let job_id = JobId::parse(job_id)?;
  let user_id = identity.user_id()?.clone();

  let outcome = store
    .upsert_engagement(kind, job_id.clone(), user_id.clone(), now)
    .await
    .map_err(Error::storage)?;

  match outcome {
    UpsertOutcome::Written(event) => {
      tracing::debug!(kind = kind.label(), %job_id, %user_id, "engagement tracked");
      Ok(RecordOutcome::Counted(event))
    }
    UpsertOutcome::Duplicate => {
      tracing::debug!(kind = kind.label(), %job_id, %user_id, "engagement already tracked");
      Ok(RecordOutcome::Ignored(IgnoreReason::AlreadyTracked))
    }
  }
}

pub async fn record_view<S: AnalyticsStore>(
  store: &S,
  job_id: &str,
  identity: &AuthorizedIdentity,
  now: DateTime<Utc>,
) -> Result<RecordOutcome> {
  record_engagement(store, EngagementKind::View, job_id, identity, now).await
}

pub async fn record_apply_click<S: AnalyticsStore>(
  store: &S,
  job_id: &str,
  identity: &AuthorizedIdentity,
  now: DateTime<Utc>,
) -> Result<RecordOutcome> {
  record_engagement(store, EngagementKind::ApplyClick, job_id, identity, now).await
}
