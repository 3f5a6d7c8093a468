//! Bearer-token authentication for the admin listing.

use std::fmt;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::error::ContactError;

/// An authenticated admin, identified by the index of the token it used.
///
/// The token itself is never kept, so it cannot end up in logs or rate-limit
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(usize);

impl Identity {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "admin#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminAuth {
    tokens: Vec<String>,
}

impl AdminAuth {
    /// Empty tokens are dropped; with no tokens every request is rejected.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.trim().is_empty())
            .collect();
        Self { tokens }
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Resolves the `Authorization: Bearer <token>` header to an identity.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Unauthorized` if the header is absent, not a
    /// bearer credential, or names an unknown token.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, ContactError> {
        let presented = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer)
            .ok_or(ContactError::Unauthorized)?;

        self.tokens
            .iter()
            .position(|token| constant_time_eq(token.as_bytes(), presented.as_bytes()))
            .map(Identity)
            .ok_or(ContactError::Unauthorized)
    }
}

fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
