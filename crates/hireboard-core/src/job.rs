//! Job postings as seen by the analytics core.
//!
//! Jobs and companies are owned by the job-management service; this crate only
//! reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engagement::JobId;

/// Display name used when a job's company reference cannot be resolved.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
  pub company_id: String,
  pub name:       String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
  pub job_id:     JobId,
  pub title:      String,
  pub company_id: Option<String>,
  /// Applications close at this instant.
  pub apply_by:   DateTime<Utc>,
  pub created_at: DateTime<Utc>,
}

impl Job {
  /// A job is active while its apply-by deadline is strictly in the future.
  pub fn is_active(&self, now: DateTime<Utc>) -> bool { self.apply_by > now }
}

/// A job joined with its company's display name, if the company exists.
#[derive(Debug, Clone)]
pub struct JobListing {
  pub job:          Job,
  pub company_name: Option<String>,
}

impl JobListing {
  pub fn company_display_name(&self) -> &str {
    self.company_name.as_deref().unwrap_or(UNKNOWN_COMPANY)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  fn job(apply_by: DateTime<Utc>) -> Job {
    Job {
      job_id: JobId::parse("j").unwrap(),
      title: "Backend Engineer".into(),
      company_id: None,
      apply_by,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn active_is_strictly_future() {
    let now = Utc::now();
    assert!(job(now + Duration::days(1)).is_active(now));
    assert!(!job(now - Duration::days(1)).is_active(now));
    assert!(!job(now).is_active(now));
  }

  #[test]
  fn missing_company_falls_back() {
    let listing = JobListing { job: job(Utc::now()), company_name: None };
    assert_eq!(listing.company_display_name(), UNKNOWN_COMPANY);
  }
}
