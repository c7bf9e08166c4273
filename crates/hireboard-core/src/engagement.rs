//! Engagement events: a candidate viewing a job or clicking "apply".
//!
//! Each kind lives in its own collection, and each collection holds at most
//! one record per (job, user) pair. A repeat engagement refreshes the
//! occurred-at timestamp of the existing record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer, ser::SerializeStruct as _};
use uuid::Uuid;

use crate::{Error, Result, identity::UserId};

// ─── JobId ───────────────────────────────────────────────────────────────────

/// Opaque, non-empty job identifier owned by the job-management service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
  pub fn parse(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return Err(Error::MissingJobId);
    }
    Ok(Self(trimmed.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for JobId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Kind ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementKind {
  View,
  ApplyClick,
}

impl EngagementKind {
  /// Human-readable label used in log lines and response messages.
  pub fn label(self) -> &'static str {
    match self {
      EngagementKind::View => "Job view",
      EngagementKind::ApplyClick => "Apply click",
    }
  }

  /// Name of the occurred-at field in serialised records.
  pub fn timestamp_field(self) -> &'static str {
    match self {
      EngagementKind::View => "viewedAt",
      EngagementKind::ApplyClick => "clickedAt",
    }
  }
}

// ─── Event ───────────────────────────────────────────────────────────────────

/// A persisted engagement record.
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementEvent {
  pub event_id:    Uuid,
  pub kind:        EngagementKind,
  pub job_id:      JobId,
  pub user_id:     UserId,
  /// Last time the user engaged; refreshed on every repeat.
  pub occurred_at: DateTime<Utc>,
  /// First time the user engaged; windowed counts are keyed on this.
  pub created_at:  DateTime<Utc>,
}

impl Serialize for EngagementEvent {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut s = serializer.serialize_struct("EngagementEvent", 5)?;
    s.serialize_field("id", &self.event_id)?;
    s.serialize_field("job", &self.job_id)?;
    s.serialize_field("user", &self.user_id)?;
    s.serialize_field(self.kind.timestamp_field(), &self.occurred_at)?;
    s.serialize_field("createdAt", &self.created_at)?;
    s.end()
  }
}

/// Result of a single atomic create-or-refresh write.
#[derive(Debug, Clone)]
pub enum UpsertOutcome {
  /// The record was created, or its timestamp refreshed.
  Written(EngagementEvent),
  /// A concurrent identical write won the race on the (job, user) uniqueness
  /// constraint. Exactly one record exists; nothing more to do.
  Duplicate,
}
