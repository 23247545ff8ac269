// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token introspection against the OAuth2 tokeninfo endpoint.
//!
//! A token is considered live iff the endpoint reports claims for it. A 400
//! answer is the endpoint's way of saying "dead token" and maps to an empty
//! claims map; every other non-200 status is a transport failure and is
//! never silently swallowed.

use reqwest::StatusCode;
use tracing::debug;

use crate::error::Error;
use crate::flow::urlencoded;

/// Default introspection endpoint.
pub const TOKENINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/tokeninfo";

/// Claims reported for a live token (`scope`, `expires_in`, `email`, ...).
/// An empty map is the canonical "invalid token" signal.
pub type TokenInfo = serde_json::Map<String, serde_json::Value>;

/// Oracle for access-token liveness.
///
/// A trait so the acquirer can be exercised with a fake; the real
/// implementation is [`Introspector`].
pub trait Validator {
    /// Introspect a token. `Ok` with an empty map means the token is
    /// invalid; `Err` means the endpoint itself misbehaved.
    fn introspect(&self, access_token: &str) -> Result<TokenInfo, Error>;

    /// A token is valid iff introspection reports any claims for it.
    fn is_valid(&self, access_token: &str) -> Result<bool, Error> {
        Ok(!self.introspect(access_token)?.is_empty())
    }
}

/// HTTP validator backed by the tokeninfo endpoint.
pub struct Introspector {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Introspector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::blocking::Client::new(), base_url: base_url.into() }
    }
}

impl Default for Introspector {
    fn default() -> Self {
        Self::new(TOKENINFO_URL)
    }
}

impl Validator for Introspector {
    fn introspect(&self, access_token: &str) -> Result<TokenInfo, Error> {
        let url = format!("{}?access_token={}", self.base_url, urlencoded(access_token));
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::transport(format!("tokeninfo request failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::BAD_REQUEST {
            debug!("tokeninfo answered 400, token is invalid");
            return Ok(TokenInfo::new());
        }
        if status != StatusCode::OK {
            return Err(Error::transport(format!("tokeninfo answered {status}")));
        }
        resp.json::<TokenInfo>()
            .map_err(|e| Error::transport(format!("invalid tokeninfo response: {e}")))
    }
}

#[cfg(test)]
#[path = "tokeninfo_tests.rs"]
mod tests;
