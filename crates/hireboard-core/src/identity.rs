//! Identity and role model shared by the access guard and the recorder.
//!
//! A verified token decodes into [`IdentityClaims`]. Tokens minted by
//! different login paths carry the user id under different keys, so the id is
//! resolved through an ordered list of extraction strategies rather than ad-hoc
//! probing at each call site.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Role ────────────────────────────────────────────────────────────────────

/// The role carried by an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Candidate,
  Student,
  Recruiter,
  /// Any role string this service does not know about, or none at all.
  #[serde(other)]
  Unknown,
}

/// Roles whose engagement is recorded. Recruiters browsing their own postings
/// must not inflate the numbers they later read.
pub const TRACKED_ROLES: &[Role] = &[Role::Candidate, Role::Student];

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::Candidate => "candidate",
      Role::Student => "student",
      Role::Recruiter => "recruiter",
      Role::Unknown => "unknown",
    }
  }
}

impl From<&str> for Role {
  fn from(s: &str) -> Self {
    match s {
      "candidate" => Role::Candidate,
      "student" => Role::Student,
      "recruiter" => Role::Recruiter,
      _ => Role::Unknown,
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ─── UserId ──────────────────────────────────────────────────────────────────

/// Opaque, non-empty user identifier issued by the account service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
  /// Returns `None` for empty or whitespace-only input.
  pub fn new(raw: impl Into<String>) -> Option<Self> {
    let raw = raw.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      None
    } else if trimmed.len() == raw.len() {
      Some(Self(raw))
    } else {
      Some(Self(trimmed.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Claims ──────────────────────────────────────────────────────────────────

/// Decoded bearer-token payload.
///
/// Every id field is optional; see [`resolve_user_id`] for the order in which
/// they are consulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityClaims {
  #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
  pub user_id:   Option<String>,
  #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
  pub object_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sub:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:      Option<Role>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub iat:       Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exp:       Option<i64>,
}

type IdStrategy = (&'static str, fn(&IdentityClaims) -> Option<&str>);

fn by_user_id(c: &IdentityClaims) -> Option<&str> { c.user_id.as_deref() }
fn by_object_id(c: &IdentityClaims) -> Option<&str> { c.object_id.as_deref() }
fn by_subject(c: &IdentityClaims) -> Option<&str> { c.sub.as_deref() }
fn by_id(c: &IdentityClaims) -> Option<&str> { c.id.as_deref() }

/// Extraction strategies in priority order.
const USER_ID_STRATEGIES: &[IdStrategy] = &[
  ("userId", by_user_id),
  ("_id", by_object_id),
  ("sub", by_subject),
  ("id", by_id),
];

/// Return the first non-empty user id found by [`USER_ID_STRATEGIES`].
pub fn resolve_user_id(claims: &IdentityClaims) -> Option<UserId> {
  USER_ID_STRATEGIES.iter().find_map(|(field, extract)| {
    let id = UserId::new(extract(claims)?)?;
    tracing::trace!(field, user_id = %id, "resolved user id");
    Some(id)
  })
}

// ─── AuthorizedIdentity ──────────────────────────────────────────────────────

/// A verified caller: who they are (if the token says) and what role they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedIdentity {
  pub id:   Option<UserId>,
  pub role: Role,
}

impl AuthorizedIdentity {
  pub fn new(id: Option<UserId>, role: Role) -> Self { Self { id, role } }

  pub fn from_claims(claims: &IdentityClaims) -> Self {
    Self {
      id:   resolve_user_id(claims),
      role: claims.role.unwrap_or(Role::Unknown),
    }
  }

  pub fn has_role(&self, roles: &[Role]) -> bool { roles.contains(&self.role) }

  pub fn user_id(&self) -> Result<&UserId> { self.id.as_ref().ok_or(Error::MissingUserId) }
}
