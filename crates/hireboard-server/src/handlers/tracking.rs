//! Handlers for engagement tracking.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/analytics/job/:jobId/view` | No body |
//! | `POST` | `/analytics/job/:jobId/apply-click` | No body |
//!
//! Both answer 200 with `counted: false` when the engagement is not recorded
//! (caller is not a candidate/student, or the write lost a uniqueness race).

use axum::{
  Json,
  extract::{Path, State, rejection::PathRejection},
};
use chrono::Utc;
use hireboard_core::{
  engagement::{EngagementEvent, EngagementKind},
  identity::AuthorizedIdentity,
  recorder::{self, IgnoreReason, RecordOutcome},
  store::AnalyticsStore,
};
use serde::Serialize;

use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
  pub success:     bool,
  pub message:     String,
  pub counted:     bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub job_view:    Option<EngagementEvent>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub apply_click: Option<EngagementEvent>,
}

fn failure_message(kind: EngagementKind) -> &'static str {
  match kind {
    EngagementKind::View => "Failed to track job view",
    EngagementKind::ApplyClick => "Failed to track apply click",
  }
}

fn job_id_param(path: Result<Path<String>, PathRejection>) -> Result<String, Error> {
  path.map(|Path(job_id)| job_id).map_err(|rejection| {
    tracing::debug!(error = %rejection, "unreadable job id in path");
    Error::BadRequest("Job ID is required".to_string())
  })
}

async fn track<S>(
  state: &AppState<S>,
  kind: EngagementKind,
  job_id: &str,
  identity: &AuthorizedIdentity,
) -> Result<Json<TrackResponse>, Error>
where
  S: AnalyticsStore + Clone + 'static,
{
  let outcome = recorder::record_engagement(state.store.as_ref(), kind, job_id, identity, Utc::now())
    .await
    .map_err(|e| Error::from_core(e, failure_message(kind)))?;

  let label = kind.label();
  let counted = outcome.counted();
  let (message, event) = match outcome {
    RecordOutcome::Counted(event) => (format!("{label} tracked successfully"), Some(event)),
    RecordOutcome::Ignored(IgnoreReason::RoleNotTracked(_)) => {
      (format!("{label} not tracked: User is not a candidate or student"), None)
    }
    RecordOutcome::Ignored(IgnoreReason::AlreadyTracked) => {
      (format!("{label} already tracked"), None)
    }
  };

  let (job_view, apply_click) = match kind {
    EngagementKind::View => (event, None),
    EngagementKind::ApplyClick => (None, event),
  };

  Ok(Json(TrackResponse { success: true, message, counted, job_view, apply_click }))
}

/// `POST /analytics/job/:jobId/view`
pub async fn view<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
  path: Result<Path<String>, PathRejection>,
) -> Result<Json<TrackResponse>, Error>
where
  S: AnalyticsStore + Clone + 'static,
{
  let job_id = job_id_param(path)?;
  track(&state, EngagementKind::View, &job_id, &identity).await
}

/// `POST /analytics/job/:jobId/apply-click`
pub async fn apply_click<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
  path: Result<Path<String>, PathRejection>,
) -> Result<Json<TrackResponse>, Error>
where
  S: AnalyticsStore + Clone + 'static,
{
  let job_id = job_id_param(path)?;
  track(&state, EngagementKind::ApplyClick, &job_id, &identity).await
}
