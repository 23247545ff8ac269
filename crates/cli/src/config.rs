// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI definition: shared flags and the four subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::format::{Format, InfoFormat};

/// Fetch, validate, and inspect OAuth2 access tokens.
#[derive(Debug, Parser)]
#[command(name = "tokfetch", version, about)]
pub struct Config {
    /// Filename for fetching/storing cached credentials.
    #[arg(long = "credentials_filename", global = true)]
    pub credentials_filename: Option<PathBuf>,

    /// Client-secrets or service-account JSON key file.
    #[arg(long, global = true)]
    pub json: Option<PathBuf>,

    /// Log filter (tracing EnvFilter syntax). Logs go to stderr.
    #[arg(long, global = true, env = "TOKFETCH_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a valid access token and display it.
    Fetch {
        /// Output format for the credential.
        #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Scopes to fetch; short names get the standard prefix.
        scope: Vec<String>,
    },
    /// Fetch an access token and print it as an HTTP Authorization header.
    Header {
        /// Scopes to fetch; short names get the standard prefix.
        scope: Vec<String>,
    },
    /// Print scope, expiry, and user info for an access token.
    Info {
        /// Output format for the introspection result.
        #[arg(short = 'f', long = "format", value_enum, default_value_t = InfoFormat::Json)]
        format: InfoFormat,
        /// Token to introspect.
        access_token: String,
    },
    /// Probe an access token: exit 0 if valid, 1 otherwise. No output.
    Test {
        /// Token to probe.
        access_token: String,
    },
}

impl Command {
    /// Command name used in the top-level error message.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Header { .. } => "header",
            Self::Info { .. } => "info",
            Self::Test { .. } => "test",
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
