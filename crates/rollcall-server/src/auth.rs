//! HTTP Basic authentication against the users table.
//!
//! Authentication and the check-in permission are decided here, before any
//! handler runs; the authenticated user becomes the acting user.

use std::future::Future;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand_core::OsRng;
use rollcall_store_sqlite::SqliteStore;

use crate::{AppState, Backend, error::Error};

// ─── Credential lookup ───────────────────────────────────────────────────────

/// Stored login data for one user.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user_id:       u64,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub can_check_in:  bool,
}

pub trait CredentialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up a user by login name. Returns `None` if unknown.
  fn load_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;
}

impl CredentialStore for SqliteStore {
  type Error = rollcall_store_sqlite::Error;

  async fn load_credentials(
    &self,
    username: &str,
  ) -> Result<Option<Credentials>, Self::Error> {
    let stored = SqliteStore::load_credentials(self, username).await?;
    Ok(stored.map(|c| Credentials {
      user_id:       c.user_id,
      password_hash: c.password_hash,
      can_check_in:  c.can_check_in,
    }))
  }
}

// ─── Password helpers ────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

fn verify_password(password: &str, phc: &str) -> Result<(), Error> {
  let parsed = PasswordHash::new(phc).map_err(|_| Error::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| Error::Unauthorized)
}

/// Extract `(username, password)` from an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;
  Ok((username.to_owned(), password.to_owned()))
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// An authenticated user holding the check-in permission. Carries the user
/// id, which handlers pass on as the acting user.
#[derive(Debug, Clone, Copy)]
pub struct CheckInUser(pub u64);

impl<S: Backend> FromRequestParts<AppState<S>> for CheckInUser {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (username, password) = basic_credentials(&parts.headers)?;

    let creds = state
      .store
      .load_credentials(&username)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?
      .ok_or(Error::Unauthorized)?;

    verify_password(&password, &creds.password_hash)?;

    if !creds.can_check_in {
      tracing::info!(user_id = creds.user_id, "check-in permission denied");
      return Err(Error::Forbidden);
    }
    Ok(CheckInUser(creds.user_id))
  }
}
