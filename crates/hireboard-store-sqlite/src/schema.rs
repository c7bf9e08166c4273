//! SQL schema for the Hireboard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Timestamps are fixed-width RFC 3339 UTC strings (microsecond precision,
/// `Z` suffix), so lexical order is chronological order.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Owned by the job-management service; read-only here.
CREATE TABLE IF NOT EXISTS companies (
    company_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL
);

-- company_id is deliberately not a foreign key: a dangling reference is
-- reported as an unknown company rather than rejected.
CREATE TABLE IF NOT EXISTS jobs (
    job_id      TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    company_id  TEXT,
    apply_by    TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- One row per (job, user); repeat views refresh viewed_at only.
CREATE TABLE IF NOT EXISTS job_views (
    event_id    TEXT PRIMARY KEY,
    job_id      TEXT NOT NULL CHECK (job_id != ''),
    user_id     TEXT NOT NULL CHECK (user_id != ''),
    viewed_at   TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (job_id, user_id)
);

-- One row per (job, user); repeat clicks refresh clicked_at only.
CREATE TABLE IF NOT EXISTS apply_clicks (
    event_id    TEXT PRIMARY KEY,
    job_id      TEXT NOT NULL CHECK (job_id != ''),
    user_id     TEXT NOT NULL CHECK (user_id != ''),
    clicked_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (job_id, user_id)
);

CREATE INDEX IF NOT EXISTS jobs_apply_by_idx        ON jobs(apply_by);
CREATE INDEX IF NOT EXISTS job_views_created_idx    ON job_views(created_at);
CREATE INDEX IF NOT EXISTS apply_clicks_created_idx ON apply_clicks(created_at);

PRAGMA user_version = 1;
";
