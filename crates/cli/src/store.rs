// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential store collaborator: a scope-keyed JSON cache on disk plus the
//! authorization flows that mint and refresh tokens.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::credential::{Credential, CredentialKind, IdentitySource};
use crate::error::Error;
use crate::flow;

/// Default cache file, relative to `$HOME`.
const DEFAULT_CACHE_FILE: &str = ".tokfetch.json";

/// Authorization / credential-store collaborator consumed by
/// [`crate::credential::acquire`].
pub trait CredentialStore {
    /// Return a credential covering `scopes`, minting one via the
    /// appropriate authorization flow when no usable cached one exists.
    fn get_or_create(
        &self,
        scopes: &[String],
        identity: &IdentitySource,
    ) -> Result<Credential, Error>;

    /// Obtain a new access token for an existing credential, in place.
    fn refresh(&self, credential: &mut Credential) -> Result<(), Error>;
}

/// On-disk cache layout: scope-set key to stored credential.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    credentials: BTreeMap<String, Credential>,
}

/// File-backed store talking to a real token endpoint.
pub struct DiskStore {
    token_url: String,
    cache: PathBuf,
}

impl DiskStore {
    /// `cache` overrides the default `~/.tokfetch.json` location.
    pub fn new(token_url: impl Into<String>, cache: Option<&Path>) -> Self {
        let cache = match cache {
            Some(p) => p.to_path_buf(),
            None => match std::env::var_os("HOME") {
                Some(home) => PathBuf::from(home).join(DEFAULT_CACHE_FILE),
                None => PathBuf::from(DEFAULT_CACHE_FILE),
            },
        };
        Self { token_url: token_url.into(), cache }
    }

    /// Tolerant load: a missing or unparsable cache is an empty cache.
    fn load(path: &Path) -> CacheFile {
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) => {
                debug!(path = %path.display(), "no credential cache: {e}");
                return CacheFile::default();
            }
        };
        match serde_json::from_str(&data) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path.display(), "failed to parse credential cache: {e}");
                CacheFile::default()
            }
        }
    }

    /// Atomic write: write to a tmp file then rename.
    fn save(path: &Path, cache: &CacheFile) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(cache)
            .map_err(|e| Error::config(format!("serialize credential cache: {e}")))?;

        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
        std::fs::write(&tmp, &json)
            .map_err(|e| Error::config(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| Error::config(format!("rename credential cache {}: {e}", path.display())))?;

        debug!(path = %path.display(), "persisted credential cache");
        Ok(())
    }

    fn scope_key(scopes: &[String]) -> String {
        let mut sorted = scopes.to_vec();
        sorted.sort();
        sorted.join(" ")
    }

    /// A cached entry matches when its granted scope set covers the request;
    /// a broader cached grant is still usable.
    fn lookup(cache: &CacheFile, scopes: &[String]) -> Option<Credential> {
        cache
            .credentials
            .values()
            .find(|c| scopes.iter().all(|s| c.scopes.contains(s)))
            .cloned()
    }
}

impl CredentialStore for DiskStore {
    fn get_or_create(
        &self,
        scopes: &[String],
        identity: &IdentitySource,
    ) -> Result<Credential, Error> {
        let mut file = Self::load(&self.cache);
        if let Some(found) = Self::lookup(&file, scopes) {
            debug!(path = %self.cache.display(), "using cached credential");
            return Ok(found);
        }

        info!("no cached credential for requested scopes, starting authorization");
        let minted = match identity {
            IdentitySource::ServiceAccount(key_file) => {
                flow::service_account_credential(&self.token_url, key_file, scopes)?
            }
            other => {
                flow::installed_app_credential(&self.token_url, &other.client_info(), scopes)?
            }
        };

        file.credentials.insert(Self::scope_key(scopes), minted.clone());
        Self::save(&self.cache, &file)?;
        Ok(minted)
    }

    fn refresh(&self, credential: &mut Credential) -> Result<(), Error> {
        match credential.kind {
            CredentialKind::ServiceAccount => {
                // No refresh token; re-run the assertion flow from the key.
                let key_file = credential.key_file.clone().ok_or_else(|| {
                    Error::auth("service-account credential has no key file recorded")
                })?;
                let fresh =
                    flow::service_account_credential(&self.token_url, &key_file, &credential.scopes)?;
                credential.access_token = fresh.access_token;
                credential.expires_at = fresh.expires_at;
            }
            CredentialKind::User => {
                let token = flow::refresh_grant(&self.token_url, credential)?;
                credential.expires_at = token.expires_at();
                credential.access_token = token.access_token;
                if let Some(refresh_token) = token.refresh_token {
                    credential.refresh_token = Some(refresh_token);
                }
            }
        }

        // Write the fresh token back so the next invocation starts from it.
        let mut file = Self::load(&self.cache);
        file.credentials.insert(Self::scope_key(&credential.scopes), credential.clone());
        Self::save(&self.cache, &file)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
