// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output rendering for credentials and introspection results.
//!
//! Both enumerations are closed and the rendering maps are total, so an
//! unknown format string never gets past argument parsing.

use clap::ValueEnum;
use serde::Serialize;

use crate::credential::Credential;
use crate::error::Error;
use crate::tokeninfo::TokenInfo;

/// Credential output encodings for `tokfetch fetch`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Format {
    Bare,
    Header,
    Json,
    JsonCompact,
    #[default]
    Pretty,
}

/// Introspection output encodings for `tokfetch info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum InfoFormat {
    #[default]
    Json,
    JsonCompact,
}

/// Render a credential according to `format`.
pub fn credential(format: Format, cred: &Credential) -> Result<String, Error> {
    match format {
        Format::Bare => Ok(cred.access_token.clone()),
        Format::Header => Ok(format!("Authorization: Bearer {}", cred.access_token)),
        Format::Json => pretty_json(cred),
        Format::JsonCompact => compact_json(cred),
        Format::Pretty => Ok(format!(
            "Fetched credentials of type:\n  {}\nAccess token:\n  {}",
            cred.kind, cred.access_token
        )),
    }
}

/// Render an introspection result.
pub fn token_info(format: InfoFormat, info: &TokenInfo) -> Result<String, Error> {
    match format {
        InfoFormat::Json => pretty_json(info),
        InfoFormat::JsonCompact => compact_json(info),
    }
}

/// Sorted keys, `,`/`:` separators, no extraneous whitespace.
fn compact_json<T: Serialize>(value: &T) -> Result<String, Error> {
    // Round-trip through Value so struct field order gives way to sorted
    // keys (serde_json objects are BTreeMap-backed).
    let value = to_value(value)?;
    serde_json::to_string(&value).map_err(|e| Error::config(format!("serialize output: {e}")))
}

/// Sorted keys, 4-space indent, `: ` separators.
fn pretty_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let value = to_value(value)?;
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| Error::config(format!("serialize output: {e}")))?;
    String::from_utf8(buf).map_err(|e| Error::config(format!("serialize output: {e}")))
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, Error> {
    serde_json::to_value(value).map_err(|e| Error::config(format!("serialize output: {e}")))
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
