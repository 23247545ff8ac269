// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the tokfetch CLI.

use std::fmt;

/// Every failure a command can surface, bucketed by origin.
///
/// `Config` is bad local input (malformed key file, empty scope list),
/// `Transport` is an unexpected answer from the introspection endpoint, and
/// `Auth` is an authorization flow (mint or refresh) that could not complete.
/// None of these are retried; all funnel to the top-level handler in `main`.
#[derive(Debug)]
pub enum Error {
    Config(String),
    Transport(String),
    Auth(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Auth(msg) => write!(f, "authorization error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
