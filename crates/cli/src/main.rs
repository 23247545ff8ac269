// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use tokfetch::config::{Command, Config};
use tokfetch::credential;
use tokfetch::error::Error;
use tokfetch::fetch;
use tokfetch::flow;
use tokfetch::format::Format;
use tokfetch::info;
use tokfetch::store::DiskStore;
use tokfetch::tokeninfo::Introspector;

fn main() {
    let config = Config::parse();
    init_tracing(&config);

    // reqwest's rustls backend needs a process-wide crypto provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let command = config.command.name();
    match run(&config) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error encountered in {command} operation: {e}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    // stdout is reserved for command output.
    fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run(config: &Config) -> Result<i32, Error> {
    let validator = Introspector::default();

    match &config.command {
        Command::Fetch { format, scope } => {
            let identity = credential::identity_from_flags(config.json.as_deref())?;
            let store = DiskStore::new(flow::TOKEN_URL, config.credentials_filename.as_deref());
            fetch::run(scope, &identity, &store, &validator, *format)
        }
        Command::Header { scope } => {
            let identity = credential::identity_from_flags(config.json.as_deref())?;
            let store = DiskStore::new(flow::TOKEN_URL, config.credentials_filename.as_deref());
            fetch::run(scope, &identity, &store, &validator, Format::Header)
        }
        Command::Info { format, access_token } => info::run_info(&validator, access_token, *format),
        Command::Test { access_token } => info::run_test(&validator, access_token),
    }
}
