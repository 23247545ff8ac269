// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tokfetch fetch` / `tokfetch header` — obtain a live token and print it.

use tracing::debug;

use crate::credential::{self, IdentitySource};
use crate::error::Error;
use crate::format::{self, Format};
use crate::scope;
use crate::store::CredentialStore;
use crate::tokeninfo::Validator;

/// Run the fetch path (`header` passes `Format::Header`). Returns the
/// process exit code.
pub fn run(
    raw_scopes: &[String],
    identity: &IdentitySource,
    store: &dyn CredentialStore,
    validator: &dyn Validator,
    format: Format,
) -> Result<i32, Error> {
    let out = render(raw_scopes, identity, store, validator, format)?;
    println!("{out}");
    Ok(0)
}

/// Expand scopes, acquire a credential, and render it.
fn render(
    raw_scopes: &[String],
    identity: &IdentitySource,
    store: &dyn CredentialStore,
    validator: &dyn Validator,
    format: Format,
) -> Result<String, Error> {
    let scopes = scope::expand(raw_scopes);
    debug!(?scopes, "expanded scopes");
    let credential = credential::acquire(&scopes, identity, store, validator)?;
    format::credential(format, &credential)
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
