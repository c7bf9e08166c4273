//! [`SqliteStore`]: the SQLite implementation of [`AnalyticsStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use hireboard_core::{
  engagement::{EngagementKind, JobId, UpsertOutcome},
  identity::UserId,
  job::{Company, Job, JobListing},
  store::{AnalyticsStore, EngagementFilter},
};

use crate::{
  Result,
  encode::{
    RawEvent, RawListing, decode_dt, encode_dt, encode_uuid, engagement_table, occurred_column,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An analytics store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Job directory seeding ─────────────────────────────────────────────────
  //
  // Jobs and companies belong to the job-management service. These exist for
  // tests and local development against a standalone database.

  pub async fn add_company(&self, company: Company) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO companies (company_id, name) VALUES (?1, ?2)",
          rusqlite::params![company.company_id, company.name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn add_job(&self, job: Job) -> Result<()> {
    let job_id_str     = job.job_id.as_str().to_owned();
    let apply_by_str   = encode_dt(job.apply_by);
    let created_at_str = encode_dt(job.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO jobs (job_id, title, company_id, apply_by, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![job_id_str, job.title, job.company_id, apply_by_str, created_at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Bind values shared by the engagement filter queries, in `?1..?3` order.
fn filter_params(filter: &EngagementFilter) -> (Option<String>, Option<String>, Option<String>) {
  (
    filter.job_id.as_ref().map(|j| j.as_str().to_owned()),
    filter.created_after.map(encode_dt),
    filter.created_before.map(encode_dt),
  )
}

const FILTER_CLAUSE: &str = "(?1 IS NULL OR job_id = ?1)
   AND (?2 IS NULL OR created_at >= ?2)
   AND (?3 IS NULL OR created_at < ?3)";

fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── AnalyticsStore impl ─────────────────────────────────────────────────────

impl AnalyticsStore for SqliteStore {
  type Error = crate::Error;

  // ── Engagement events ─────────────────────────────────────────────────────

  async fn upsert_engagement(
    &self,
    kind:    EngagementKind,
    job_id:  JobId,
    user_id: UserId,
    at:      DateTime<Utc>,
  ) -> Result<UpsertOutcome> {
    let table  = engagement_table(kind);
    let column = occurred_column(kind);
    let sql    = format!(
      "INSERT INTO {table} (event_id, job_id, user_id, {column}, created_at)
       VALUES (?1, ?2, ?3, ?4, ?4)
       ON CONFLICT (job_id, user_id) DO UPDATE SET {column} = excluded.{column}
       RETURNING event_id, job_id, user_id, {column}, created_at"
    );

    let event_id_str = encode_uuid(Uuid::new_v4());
    let job_id_str   = job_id.as_str().to_owned();
    let user_id_str  = user_id.as_str().to_owned();
    let at_str       = encode_dt(at);

    let result = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &sql,
          rusqlite::params![event_id_str, job_id_str, user_id_str, at_str],
          RawEvent::from_row,
        )?)
      })
      .await;

    match result {
      Ok(raw) => Ok(UpsertOutcome::Written(raw.into_event(kind)?)),
      Err(e) if is_unique_violation(&e) => {
        tracing::debug!(table, %job_id, %user_id, "engagement upsert collided");
        Ok(UpsertOutcome::Duplicate)
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn count_engagements(
    &self,
    kind:   EngagementKind,
    filter: EngagementFilter,
  ) -> Result<u64> {
    let table = engagement_table(kind);
    let sql   = format!("SELECT COUNT(*) FROM {table} WHERE {FILTER_CLAUSE}");
    let (job, after, before) = filter_params(&filter);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params![job, after, before], |r| r.get(0))?)
      })
      .await?;

    Ok(n as u64)
  }

  async fn engagement_times(
    &self,
    kind:   EngagementKind,
    filter: EngagementFilter,
  ) -> Result<Vec<DateTime<Utc>>> {
    let table = engagement_table(kind);
    let sql   = format!("SELECT created_at FROM {table} WHERE {FILTER_CLAUSE}");
    let (job, after, before) = filter_params(&filter);

    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![job, after, before], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.iter().map(|s| decode_dt(s)).collect()
  }

  // ── Job directory ─────────────────────────────────────────────────────────

  async fn count_active_jobs(&self, now: DateTime<Utc>) -> Result<u64> {
    let now_str = encode_dt(now);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM jobs WHERE apply_by > ?1",
          rusqlite::params![now_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(n as u64)
  }

  async fn active_jobs(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<JobListing>> {
    let now_str   = encode_dt(now);
    let limit_val = limit as i64;

    let raws: Vec<RawListing> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT j.job_id, j.title, j.company_id, j.apply_by, j.created_at, c.name
           FROM jobs j
           LEFT JOIN companies c ON c.company_id = j.company_id
           WHERE j.apply_by > ?1
           ORDER BY j.created_at, j.job_id
           LIMIT ?2",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![now_str, limit_val], |row| {
            Ok(RawListing {
              job_id:       row.get(0)?,
              title:        row.get(1)?,
              company_id:   row.get(2)?,
              apply_by:     row.get(3)?,
              created_at:   row.get(4)?,
              company_name: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawListing::into_listing).collect()
  }
}
