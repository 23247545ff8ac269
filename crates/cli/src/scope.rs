// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scope normalization for `tokfetch fetch` / `tokfetch header`.

/// Prefix applied to short scope names.
const SCOPE_PREFIX: &str = "https://www.googleapis.com/auth/";

/// Expand user-supplied scope tokens into fully-qualified scope URIs.
///
/// Tokens that already start with `https://` pass through unchanged; short
/// names like `bigquery` get the standard prefix. Order-preserving and
/// idempotent.
pub fn expand(scopes: &[String]) -> Vec<String> {
    scopes
        .iter()
        .map(|s| {
            if s.starts_with("https://") {
                s.clone()
            } else {
                format!("{SCOPE_PREFIX}{s}")
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
