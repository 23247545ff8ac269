// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::FakeValidator;

#[test]
fn info_renders_sorted_claims_for_a_live_token() -> Result<(), Error> {
    let validator = FakeValidator::new(&["ya29.live"]);

    let out = render(&validator, "ya29.live", InfoFormat::Json)?
        .ok_or_else(|| Error::config("expected claims"))?;

    let email = out.find("\"email\"").ok_or_else(|| Error::config("email missing"))?;
    let expires = out.find("\"expires_in\"").ok_or_else(|| Error::config("expires_in missing"))?;
    let scope = out.find("\"scope\"").ok_or_else(|| Error::config("scope missing"))?;
    assert!(email < expires && expires < scope, "keys not sorted: {out}");
    assert!(out.contains("user@example.com"));
    Ok(())
}

#[test]
fn info_on_a_dead_token_produces_no_output() -> Result<(), Error> {
    let validator = FakeValidator::new(&[]);
    assert_eq!(render(&validator, "ya29.dead", InfoFormat::Json)?, None);
    Ok(())
}

#[test]
fn run_info_exit_codes_track_token_liveness() -> Result<(), Error> {
    let validator = FakeValidator::new(&["ya29.live"]);
    assert_eq!(run_info(&validator, "ya29.live", InfoFormat::Json)?, 0);
    assert_eq!(run_info(&validator, "ya29.dead", InfoFormat::Json)?, 1);
    Ok(())
}

#[test]
fn run_test_is_silent_and_reports_via_exit_code() -> Result<(), Error> {
    let validator = FakeValidator::new(&["ya29.live"]);
    assert_eq!(run_test(&validator, "ya29.live")?, 0);
    assert_eq!(run_test(&validator, "ya29.dead")?, 1);
    Ok(())
}

#[test]
fn introspection_failures_surface_as_errors() {
    let validator = FakeValidator::failing();
    crate::assert_err_contains!(render(&validator, "ya29.live", InfoFormat::Json), "503");
    crate::assert_err_contains!(run_test(&validator, "ya29.live"), "503");
}

#[test]
fn compact_format_has_no_padding() -> Result<(), Error> {
    let validator = FakeValidator::new(&["ya29.live"]);

    let out = render(&validator, "ya29.live", InfoFormat::JsonCompact)?
        .ok_or_else(|| Error::config("expected claims"))?;

    assert!(!out.contains(": "), "compact output padded: {out}");
    assert!(!out.contains('\n'));
    Ok(())
}
