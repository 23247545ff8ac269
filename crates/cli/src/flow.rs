// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth authorization flows and token-endpoint exchange.
//!
//! Two ways to mint a credential: the console authorization-code flow for
//! installed-app clients (print the consent URL, paste the verification
//! code), and the JWT-bearer grant for service accounts (RS256-signed
//! assertion built from the key file). Both end in a form POST to the token
//! endpoint, as does the refresh grant.

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::credential::{ClientInfo, Credential, CredentialKind};
use crate::error::Error;

/// Default OAuth token endpoint.
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Consent page for the installed-app flow.
const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Out-of-band redirect: the consent page displays the code for pasting.
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Lifetime claimed in service-account assertions.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Token endpoint success response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Reported lifetime as an absolute Unix timestamp.
    pub fn expires_at(&self) -> Option<u64> {
        self.expires_in.map(|s| now_epoch() + s)
    }
}

/// Token endpoint error response.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// The service-account key file fields the JWT-bearer flow needs.
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

fn now_epoch() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// POST a url-encoded form body to the token endpoint.
///
/// OAuth error bodies (`{"error": ..., "error_description": ...}`) become
/// `Error::Auth` with both fields in the message.
pub fn exchange(token_url: &str, form_body: String) -> Result<TokenResponse, Error> {
    let client = reqwest::blocking::Client::new();
    let resp = client
        .post(token_url)
        .header("User-Agent", crate::credential::USER_AGENT)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(form_body)
        .send()
        .map_err(|e| Error::auth(format!("token request failed: {e}")))?;

    let status = resp.status();
    let body = resp.text().map_err(|e| Error::auth(format!("read token response: {e}")))?;

    if !status.is_success() {
        if let Ok(err) = serde_json::from_str::<TokenErrorResponse>(&body) {
            return Err(Error::auth(format!(
                "{}: {}",
                err.error,
                err.error_description.unwrap_or_default()
            )));
        }
        return Err(Error::auth(format!("token endpoint answered {status}: {body}")));
    }

    serde_json::from_str(&body).map_err(|e| Error::auth(format!("parse token response: {e}")))
}

/// Refresh grant for an installed-app credential.
pub fn refresh_grant(token_url: &str, credential: &Credential) -> Result<TokenResponse, Error> {
    let refresh_token = credential
        .refresh_token
        .as_deref()
        .ok_or_else(|| Error::auth("credential has no refresh token"))?;

    info!("refreshing access token");
    let body = format!(
        "grant_type=refresh_token&client_id={}&client_secret={}&refresh_token={}",
        urlencoded(&credential.client_id),
        urlencoded(&credential.client_secret),
        urlencoded(refresh_token),
    );
    exchange(token_url, body)
}

/// Run the console authorization-code flow and exchange the resulting code.
///
/// Prints the consent URL on stderr (stdout is reserved for the token
/// output) and reads the verification code from stdin.
pub fn installed_app_credential(
    token_url: &str,
    client: &ClientInfo,
    scopes: &[String],
) -> Result<Credential, Error> {
    let code = prompt_for_code(&consent_url(&client.client_id, scopes))?;

    debug!("exchanging authorization code");
    let token = exchange(token_url, authorization_code_body(client, &code))?;

    Ok(Credential {
        kind: CredentialKind::User,
        access_token: token.access_token.clone(),
        refresh_token: token.refresh_token.clone(),
        expires_at: token.expires_at(),
        token_type: token.token_type.clone().unwrap_or_else(|| "Bearer".to_owned()),
        scopes: scopes.to_vec(),
        client_id: client.client_id.clone(),
        client_secret: client.client_secret.clone(),
        key_file: None,
    })
}

/// Consent-page URL for the authorization-code grant.
fn consent_url(client_id: &str, scopes: &[String]) -> String {
    format!(
        "{AUTHORIZE_URL}?response_type=code&client_id={}&redirect_uri={}&scope={}&access_type=offline",
        urlencoded(client_id),
        urlencoded(OOB_REDIRECT_URI),
        urlencoded(&scopes.join(" ")),
    )
}

/// Form body exchanging a pasted verification code for tokens.
fn authorization_code_body(client: &ClientInfo, code: &str) -> String {
    format!(
        "grant_type=authorization_code&client_id={}&client_secret={}&code={}&redirect_uri={}",
        urlencoded(&client.client_id),
        urlencoded(&client.client_secret),
        urlencoded(code),
        urlencoded(OOB_REDIRECT_URI),
    )
}

fn prompt_for_code(auth_url: &str) -> Result<String, Error> {
    let mut err = std::io::stderr();
    let _ = writeln!(err, "Go to the following link in your browser:");
    let _ = writeln!(err);
    let _ = writeln!(err, "    {auth_url}");
    let _ = writeln!(err);
    let _ = write!(err, "Enter verification code: ");
    let _ = err.flush();

    let mut code = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut code)
        .map_err(|e| Error::auth(format!("read verification code: {e}")))?;
    let code = code.trim().to_owned();
    if code.is_empty() {
        return Err(Error::auth("no verification code entered"));
    }
    Ok(code)
}

/// Mint a credential from a service-account key via the JWT-bearer grant.
///
/// The key file's own `token_uri`, when present, wins over `token_url` as
/// both assertion audience and exchange endpoint.
pub fn service_account_credential(
    token_url: &str,
    key_file: &Path,
    scopes: &[String],
) -> Result<Credential, Error> {
    let data = std::fs::read_to_string(key_file)
        .map_err(|e| Error::config(format!("cannot read {}: {e}", key_file.display())))?;
    let key: ServiceAccountKey = serde_json::from_str(&data).map_err(|e| {
        Error::config(format!("invalid service-account key {}: {e}", key_file.display()))
    })?;

    let aud = key.token_uri.clone().unwrap_or_else(|| token_url.to_owned());
    let assertion = sign_assertion(&key, scopes, &aud)?;

    info!(account = %key.client_email, "exchanging service-account assertion");
    let body = format!(
        "grant_type={}&assertion={}",
        urlencoded("urn:ietf:params:oauth:grant-type:jwt-bearer"),
        urlencoded(&assertion),
    );
    let token = exchange(&aud, body)?;

    Ok(Credential {
        kind: CredentialKind::ServiceAccount,
        access_token: token.access_token.clone(),
        refresh_token: None,
        expires_at: token.expires_at(),
        token_type: token.token_type.clone().unwrap_or_else(|| "Bearer".to_owned()),
        scopes: scopes.to_vec(),
        client_id: key.client_email.clone(),
        client_secret: String::new(),
        key_file: Some(key_file.to_path_buf()),
    })
}

/// RS256-sign the JWT assertion for the given scopes and audience.
fn sign_assertion(key: &ServiceAccountKey, scopes: &[String], aud: &str) -> Result<String, Error> {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let iat = now_epoch();
    let claims = json!({
        "iss": key.client_email,
        "scope": scopes.join(" "),
        "aud": aud,
        "iat": iat,
        "exp": iat + ASSERTION_LIFETIME_SECS,
    });
    let claims = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signing_input = format!("{header}.{claims}");

    let der = private_key_der(&key.private_key)?;
    let key_pair = ring::signature::RsaKeyPair::from_pkcs8(&der)
        .map_err(|e| Error::config(format!("unusable service-account private key: {e}")))?;
    let rng = ring::rand::SystemRandom::new();
    let mut sig = vec![0u8; key_pair.public().modulus_len()];
    key_pair
        .sign(&ring::signature::RSA_PKCS1_SHA256, &rng, signing_input.as_bytes(), &mut sig)
        .map_err(|e| Error::config(format!("sign assertion: {e}")))?;

    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(&sig)))
}

/// Decode a PEM `PRIVATE KEY` block to PKCS#8 DER.
fn private_key_der(pem: &str) -> Result<Vec<u8>, Error> {
    let body: String = pem
        .lines()
        .filter(|l| !l.starts_with("-----"))
        .map(str::trim)
        .collect();
    STANDARD
        .decode(body)
        .map_err(|e| Error::config(format!("invalid private key PEM: {e}")))
}

/// Minimal percent-encoding for URL query and form values.
pub fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{b:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "flow_tests.rs"]
mod tests;
