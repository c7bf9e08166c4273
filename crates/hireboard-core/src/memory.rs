//! In-memory [`AnalyticsStore`] used by the core unit tests.

use std::sync::{
  Mutex,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  engagement::{EngagementEvent, EngagementKind, JobId, UpsertOutcome},
  identity::UserId,
  job::{Company, Job, JobListing},
  store::{AnalyticsStore, EngagementFilter},
};

#[derive(Debug, thiserror::Error)]
#[error("memory store failure")]
pub struct MemoryError;

#[derive(Default)]
pub struct MemoryStore {
  events:         Mutex<Vec<EngagementEvent>>,
  jobs:           Mutex<Vec<Job>>,
  companies:      Mutex<Vec<Company>>,
  /// When set, the next upsert reports a uniqueness collision.
  pub collide:    AtomicBool,
  /// When set, every call fails.
  pub fail:       AtomicBool,
  pub calls:      AtomicUsize,
}

impl MemoryStore {
  pub fn events(&self, kind: EngagementKind) -> Vec<EngagementEvent> {
    self
      .events
      .lock()
      .unwrap()
      .iter()
      .filter(|e| e.kind == kind)
      .cloned()
      .collect()
  }

  /// Insert a record directly, bypassing upsert, with a chosen `created_at`.
  pub fn seed(&self, kind: EngagementKind, job: &str, user: &str, created_at: DateTime<Utc>) {
    self.events.lock().unwrap().push(EngagementEvent {
      event_id: Uuid::new_v4(),
      kind,
      job_id: JobId::parse(job).unwrap(),
      user_id: UserId::new(user).unwrap(),
      occurred_at: created_at,
      created_at,
    });
  }

  pub fn add_job(&self, job: Job) { self.jobs.lock().unwrap().push(job); }

  pub fn add_company(&self, company: Company) { self.companies.lock().unwrap().push(company); }

  fn enter(&self) -> Result<(), MemoryError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.fail.load(Ordering::SeqCst) { Err(MemoryError) } else { Ok(()) }
  }

  fn matching(&self, kind: EngagementKind, filter: &EngagementFilter) -> Vec<EngagementEvent> {
    self
      .events(kind)
      .into_iter()
      .filter(|e| filter.job_id.as_ref().is_none_or(|j| *j == e.job_id))
      .filter(|e| filter.created_after.is_none_or(|t| e.created_at >= t))
      .filter(|e| filter.created_before.is_none_or(|t| e.created_at < t))
      .collect()
  }
}

impl AnalyticsStore for MemoryStore {
  type Error = MemoryError;

  async fn upsert_engagement(
    &self,
    kind: EngagementKind,
    job_id: JobId,
    user_id: UserId,
    at: DateTime<Utc>,
  ) -> Result<UpsertOutcome, MemoryError> {
    self.enter()?;
    if self.collide.swap(false, Ordering::SeqCst) {
      return Ok(UpsertOutcome::Duplicate);
    }

    let mut events = self.events.lock().unwrap();
    if let Some(existing) = events
      .iter_mut()
      .find(|e| e.kind == kind && e.job_id == job_id && e.user_id == user_id)
    {
      existing.occurred_at = at;
      return Ok(UpsertOutcome::Written(existing.clone()));
    }

    let event = EngagementEvent {
      event_id: Uuid::new_v4(),
      kind,
      job_id,
      user_id,
      occurred_at: at,
      created_at: at,
    };
    events.push(event.clone());
    Ok(UpsertOutcome::Written(event))
  }

  async fn count_engagements(
    &self,
    kind: EngagementKind,
    filter: EngagementFilter,
  ) -> Result<u64, MemoryError> {
    self.enter()?;
    Ok(self.matching(kind, &filter).len() as u64)
  }

  async fn engagement_times(
    &self,
    kind: EngagementKind,
    filter: EngagementFilter,
  ) -> Result<Vec<DateTime<Utc>>, MemoryError> {
    self.enter()?;
    Ok(self.matching(kind, &filter).into_iter().map(|e| e.created_at).collect())
  }

  async fn count_active_jobs(&self, now: DateTime<Utc>) -> Result<u64, MemoryError> {
    self.enter()?;
    Ok(self.jobs.lock().unwrap().iter().filter(|j| j.is_active(now)).count() as u64)
  }

  async fn active_jobs(
    &self,
    now: DateTime<Utc>,
    limit: usize,
  ) -> Result<Vec<JobListing>, MemoryError> {
    self.enter()?;
    let companies = self.companies.lock().unwrap();
    let mut jobs: Vec<Job> = self
      .jobs
      .lock()
      .unwrap()
      .iter()
      .filter(|j| j.is_active(now))
      .cloned()
      .collect();
    jobs.sort_by(|a, b| (a.created_at, a.job_id.as_str()).cmp(&(b.created_at, b.job_id.as_str())));

    Ok(
      jobs
        .into_iter()
        .take(limit)
        .map(|job| {
          let company_name = job.company_id.as_ref().and_then(|id| {
            companies.iter().find(|c| &c.company_id == id).map(|c| c.name.clone())
          });
          JobListing { job, company_name }
        })
        .collect(),
    )
  }
}
