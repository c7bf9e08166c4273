//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use hireboard_core::{
  engagement::{EngagementEvent, EngagementKind, JobId},
  identity::UserId,
  job::{Job, JobListing},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── EngagementKind ───────────────────────────────────────────────────────────

/// Table holding records of `kind`.
pub fn engagement_table(kind: EngagementKind) -> &'static str {
  match kind {
    EngagementKind::View => "job_views",
    EngagementKind::ApplyClick => "apply_clicks",
  }
}

/// Column holding the refreshed occurred-at timestamp for `kind`.
pub fn occurred_column(kind: EngagementKind) -> &'static str {
  match kind {
    EngagementKind::View => "viewed_at",
    EngagementKind::ApplyClick => "clicked_at",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an engagement row.
pub struct RawEvent {
  pub event_id:    String,
  pub job_id:      String,
  pub user_id:     String,
  pub occurred_at: String,
  pub created_at:  String,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:    row.get(0)?,
      job_id:      row.get(1)?,
      user_id:     row.get(2)?,
      occurred_at: row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_event(self, kind: EngagementKind) -> Result<EngagementEvent> {
    Ok(EngagementEvent {
      event_id: decode_uuid(&self.event_id)?,
      kind,
      job_id: JobId::parse(&self.job_id)?,
      user_id: UserId::new(self.user_id).ok_or(Error::InvalidId("user_id"))?,
      occurred_at: decode_dt(&self.occurred_at)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from `jobs` left-joined with `companies`.
pub struct RawListing {
  pub job_id:       String,
  pub title:        String,
  pub company_id:   Option<String>,
  pub apply_by:     String,
  pub created_at:   String,
  pub company_name: Option<String>,
}

impl RawListing {
  pub fn into_listing(self) -> Result<JobListing> {
    Ok(JobListing {
      job:          Job {
        job_id:     JobId::parse(&self.job_id)?,
        title:      self.title,
        company_id: self.company_id,
        apply_by:   decode_dt(&self.apply_by)?,
        created_at: decode_dt(&self.created_at)?,
      },
      company_name: self.company_name,
    })
  }
}
