// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tokfetch info` / `tokfetch test` — introspect a literal token.

use crate::error::Error;
use crate::format::{self, InfoFormat};
use crate::tokeninfo::Validator;

/// `info`: print the token's claims; an invalid token prints nothing and
/// exits 1.
pub fn run_info(
    validator: &dyn Validator,
    access_token: &str,
    format: InfoFormat,
) -> Result<i32, Error> {
    match render(validator, access_token, format)? {
        Some(out) => {
            println!("{out}");
            Ok(0)
        }
        None => Ok(1),
    }
}

/// `test`: exit status only; 0 when the token is live, no output either way.
pub fn run_test(validator: &dyn Validator, access_token: &str) -> Result<i32, Error> {
    if validator.is_valid(access_token)? {
        Ok(0)
    } else {
        Ok(1)
    }
}

/// `None` means the token introspected as invalid.
fn render(
    validator: &dyn Validator,
    access_token: &str,
    format: InfoFormat,
) -> Result<Option<String>, Error> {
    let info = validator.introspect(access_token)?;
    if info.is_empty() {
        return Ok(None);
    }
    Ok(Some(format::token_info(format, &info)?))
}

#[cfg(test)]
#[path = "info_tests.rs"]
mod tests;
