// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential model and the acquisition decision protocol.
//!
//! The core decision lives in [`acquire`]: whatever the store hands back
//! (cached or freshly minted), its liveness is confirmed via introspection
//! rather than by trusting any locally recorded expiry, and only an invalid
//! token triggers a refresh. A refreshed token is trusted as-is.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Error;
use crate::store::CredentialStore;
use crate::tokeninfo::Validator;

/// Built-in installed-app client identity, used when `--json` is absent.
/// Installed-app "secrets" are not confidential (RFC 8252 section 8.5).
const DEFAULT_CLIENT_ID: &str = "tokfetch-cli.apps.googleusercontent.com";
const DEFAULT_CLIENT_SECRET: &str = "tokfetch-installed-app";

/// User agent sent by token requests.
pub const USER_AGENT: &str = concat!("tokfetch/", env!("CARGO_PKG_VERSION"));

/// OAuth client identity used to request tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_owned(),
            client_secret: DEFAULT_CLIENT_SECRET.to_owned(),
            user_agent: USER_AGENT.to_owned(),
        }
    }
}

/// Where the client identity for a fetch comes from (`--json` resolution).
#[derive(Debug, Clone)]
pub enum IdentitySource {
    /// No key file given; built-in installed-app client.
    Default,
    /// Client-secrets file for an installed app.
    ClientSecrets(ClientInfo),
    /// Service-account key file; authorization runs the JWT-bearer flow.
    ServiceAccount(PathBuf),
}

impl IdentitySource {
    pub fn client_info(&self) -> ClientInfo {
        match self {
            Self::ClientSecrets(info) => info.clone(),
            Self::Default | Self::ServiceAccount(_) => ClientInfo::default(),
        }
    }
}

/// Resolve `--json` into an identity source.
///
/// A file declaring `type: "service_account"` selects the JWT-bearer path;
/// anything else must be an installed-app client-secrets file with an
/// `installed.client_id` / `installed.client_secret` pair.
pub fn identity_from_flags(json: Option<&Path>) -> Result<IdentitySource, Error> {
    let Some(path) = json else {
        return Ok(IdentitySource::Default);
    };

    let data = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
    let root: serde_json::Value = serde_json::from_str(&data)
        .map_err(|e| Error::config(format!("invalid JSON file {}: {e}", path.display())))?;

    if root.get("type").and_then(|v| v.as_str()) == Some("service_account") {
        return Ok(IdentitySource::ServiceAccount(path.to_path_buf()));
    }

    let installed = root
        .get("installed")
        .ok_or_else(|| Error::config("provided client ID must be for an installed app"))?;
    let client_id = required_str(installed, "client_id", path)?;
    let client_secret = required_str(installed, "client_secret", path)?;

    Ok(IdentitySource::ClientSecrets(ClientInfo {
        client_id,
        client_secret,
        user_agent: USER_AGENT.to_owned(),
    }))
}

fn required_str(obj: &serde_json::Value, field: &str, path: &Path) -> Result<String, Error> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            Error::config(format!("{} is missing installed.{field}", path.display()))
        })
}

/// Credential kind, surfaced by the `pretty` output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    User,
    ServiceAccount,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::ServiceAccount => f.write_str("service_account"),
        }
    }
}

/// A bearer credential as minted or cached.
///
/// Its serde representation is the canonical JSON that the `json` and
/// `json_compact` output formats render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub kind: CredentialKind,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as seconds since the Unix epoch, when the endpoint reported
    /// one. Bookkeeping only; liveness is decided by introspection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub client_id: String,
    pub client_secret: String,
    /// Service-account key file this credential was minted from, so a
    /// refresh can re-run the assertion flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,
}

fn default_token_type() -> String {
    "Bearer".to_owned()
}

/// Fetch a live credential for `scopes`.
///
/// Fails with a configuration error on an empty scope list before touching
/// the store or the network.
pub fn acquire(
    scopes: &[String],
    identity: &IdentitySource,
    store: &dyn CredentialStore,
    validator: &dyn Validator,
) -> Result<Credential, Error> {
    if scopes.is_empty() {
        return Err(Error::config("no scopes provided"));
    }

    let mut credential = store.get_or_create(scopes, identity)?;

    if validator.is_valid(&credential.access_token)? {
        debug!("access token introspects as live");
        return Ok(credential);
    }

    info!("access token invalid, refreshing");
    store.refresh(&mut credential)?;
    Ok(credential)
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
