//! Bearer-token (JWT) extractors and standalone verifier.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use hireboard_core::{
  identity::{AuthorizedIdentity, IdentityClaims, Role},
  store::AnalyticsStore,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{AppState, error::Error};

/// Token keys and validation rules for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  validation:   Validation,
  token_ttl:    Duration,
}

impl AuthConfig {
  /// HS256 with a shared secret; `exp` is required and checked.
  pub fn from_secret(secret: &str, token_ttl_minutes: i64) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
      validation:   Validation::new(Algorithm::HS256),
      token_ttl:    Duration::minutes(token_ttl_minutes),
    }
  }

  /// Sign `claims`, filling in `iat` and `exp` when the caller left them
  /// unset.
  pub fn issue_token(&self, mut claims: IdentityClaims) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    claims.iat.get_or_insert(now.timestamp());
    claims.exp.get_or_insert((now + self.token_ttl).timestamp());
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
  }

  /// Check signature and expiry and return the decoded payload.
  pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<IdentityClaims> {
    decode::<IdentityClaims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
  }
}

/// Verify the bearer token in `headers` and return the caller's identity.
pub fn authenticate(headers: &HeaderMap, config: &AuthConfig) -> Result<AuthorizedIdentity, Error> {
  let header_val = headers
    .get(AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::MissingToken)?;

  let token = match header_val.split_once(' ') {
    Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
    _ => return Err(Error::MissingToken),
  };
  if token.is_empty() {
    return Err(Error::MissingToken);
  }

  let claims = config.verify(token).map_err(|e| {
    tracing::debug!(error = %e, "rejected bearer token");
    Error::InvalidToken
  })?;

  Ok(AuthorizedIdentity::from_claims(&claims))
}

/// Fail with [`Error::Forbidden`] unless `identity` holds `role`.
pub fn require_role(identity: &AuthorizedIdentity, role: Role) -> Result<(), Error> {
  if identity.has_role(&[role]) {
    return Ok(());
  }
  Err(Error::Forbidden(match role {
    Role::Recruiter => "Recruiter access required",
    _ => "Access denied",
  }))
}

/// Present in a handler means the request carried a valid token.
pub struct Authenticated(pub AuthorizedIdentity);

/// Present in a handler means the request carried a valid recruiter token.
pub struct Recruiter(pub AuthorizedIdentity);

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: AnalyticsStore + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    authenticate(&parts.headers, &state.auth).map(Authenticated)
  }
}

impl<S> FromRequestParts<AppState<S>> for Recruiter
where
  S: AnalyticsStore + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let identity = authenticate(&parts.headers, &state.auth)?;
    require_role(&identity, Role::Recruiter)?;
    Ok(Recruiter(identity))
  }
}
