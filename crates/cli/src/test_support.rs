// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: stub OAuth endpoints and fake collaborators.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

use crate::credential::{Credential, CredentialKind, IdentitySource};
use crate::error::Error;
use crate::store::CredentialStore;
use crate::tokeninfo::{TokenInfo, Validator};

static INIT: Once = Once::new();

/// Install the rustls crypto provider (needed for reqwest even on plain HTTP).
pub fn ensure_crypto_provider() {
    INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Serve `router` on an ephemeral port from a background thread with its own
/// runtime (the clients under test are blocking). Returns the base URL.
pub fn spawn_stub_server(router: Router) -> String {
    ensure_crypto_provider();
    let (tx, rx) = std::sync::mpsc::channel::<SocketAddr>();
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(_) => return,
        };
        rt.block_on(async move {
            let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
                Ok(l) => l,
                Err(_) => return,
            };
            if let Ok(addr) = listener.local_addr() {
                let _ = tx.send(addr);
            }
            let _ = axum::serve(listener, router).await;
        });
    });
    let addr = rx.recv().expect("stub server failed to start");
    format!("http://{addr}")
}

/// Stub tokeninfo endpoint at `/`.
///
/// `valid_token` gets the given claims with a 200; the literal token
/// `"server-error"` gets a 500; anything else gets the endpoint's usual 400
/// for a dead token.
pub fn tokeninfo_stub(valid_token: &str, claims: serde_json::Value) -> Router {
    let valid = valid_token.to_owned();
    Router::new().route(
        "/",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let valid = valid.clone();
            let claims = claims.clone();
            async move {
                match params.get("access_token").map(String::as_str) {
                    Some(t) if t == valid => (StatusCode::OK, claims.to_string()),
                    Some("server-error") => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "oops".to_owned())
                    }
                    _ => (
                        StatusCode::BAD_REQUEST,
                        r#"{"error":"invalid_token"}"#.to_owned(),
                    ),
                }
            }
        }),
    )
}

/// Stub token endpoint at `/token` answering every POST with a fixed status
/// and body, recording received form bodies in `seen`.
pub fn token_stub(
    status: StatusCode,
    body: serde_json::Value,
    seen: Arc<Mutex<Vec<String>>>,
) -> Router {
    Router::new().route(
        "/token",
        post(move |req_body: String| {
            let body = body.clone();
            let seen = Arc::clone(&seen);
            async move {
                if let Ok(mut guard) = seen.lock() {
                    guard.push(req_body);
                }
                (status, body.to_string())
            }
        }),
    )
}

/// Canned user credential for store/acquire tests.
pub fn stub_credential(token: &str) -> Credential {
    Credential {
        kind: CredentialKind::User,
        access_token: token.to_owned(),
        refresh_token: Some("refresh-1".to_owned()),
        expires_at: None,
        token_type: "Bearer".to_owned(),
        scopes: vec!["https://www.googleapis.com/auth/userinfo.email".to_owned()],
        client_id: "client-1".to_owned(),
        client_secret: "secret-1".to_owned(),
        key_file: None,
    }
}

/// In-memory store that counts calls and swaps in a fixed token on refresh.
pub struct FakeStore {
    pub credential: Credential,
    pub refreshed_token: String,
    pub get_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
}

impl FakeStore {
    pub fn new(credential: Credential, refreshed_token: &str) -> Self {
        Self {
            credential,
            refreshed_token: refreshed_token.to_owned(),
            get_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }
}

impl CredentialStore for FakeStore {
    fn get_or_create(
        &self,
        _scopes: &[String],
        _identity: &IdentitySource,
    ) -> Result<Credential, Error> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.credential.clone())
    }

    fn refresh(&self, credential: &mut Credential) -> Result<(), Error> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        credential.access_token = self.refreshed_token.clone();
        Ok(())
    }
}

/// Validator with a fixed verdict per token string.
pub struct FakeValidator {
    pub valid_tokens: Vec<String>,
    pub introspect_calls: AtomicUsize,
    /// When set, every call fails as a transport error.
    pub fail: bool,
}

impl FakeValidator {
    pub fn new(valid_tokens: &[&str]) -> Self {
        Self {
            valid_tokens: valid_tokens.iter().map(|t| (*t).to_owned()).collect(),
            introspect_calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self { valid_tokens: Vec::new(), introspect_calls: AtomicUsize::new(0), fail: true }
    }
}

impl Validator for FakeValidator {
    fn introspect(&self, access_token: &str) -> Result<TokenInfo, Error> {
        self.introspect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::transport("tokeninfo answered 503 Service Unavailable"));
        }
        if self.valid_tokens.iter().any(|t| t == access_token) {
            let mut info = TokenInfo::new();
            info.insert(
                "scope".to_owned(),
                serde_json::Value::String(
                    "https://www.googleapis.com/auth/userinfo.email".to_owned(),
                ),
            );
            info.insert("expires_in".to_owned(), serde_json::Value::from(3600));
            info.insert(
                "email".to_owned(),
                serde_json::Value::String("user@example.com".to_owned()),
            );
            Ok(info)
        } else {
            Ok(TokenInfo::new())
        }
    }
}

/// Assert that an expression evaluates to `Err` whose Display output
/// contains the given substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}
