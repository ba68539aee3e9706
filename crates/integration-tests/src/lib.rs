//! Integration tests for the Cravii client.
//!
//! Every test runs the real client against [`FakeBackend`], an in-process
//! HTTP server that answers the PHP endpoints with scripted replies and
//! records what it was sent. Nothing leaves the machine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cravii-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = FakeBackend::start().await;
//! backend.reply("fetch_fee.php", Reply::json(fixtures::fee(100, 500)));
//!
//! let ctx = backend.context(logged_in_store(7, &[]));
//! let mut checkout = ctx.checkout();
//! checkout.load().await.unwrap();
//! assert_eq!(backend.calls("fetch_fee.php"), 1);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use cravii_client::store::{KEY_CART, KEY_USER_ID, MemoryStore};
use cravii_client::{ClientConfig, ClientContext, RetryPolicy};
use cravii_core::CartItem;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

pub mod fixtures;

/// A scripted HTTP reply.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

impl Reply {
    /// `200 OK` with a JSON body.
    #[must_use]
    pub fn json(body: Value) -> Self {
        Self::status(StatusCode::OK, body)
    }

    /// Any status with a JSON body.
    #[must_use]
    pub fn status(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    /// `200 OK` with an HTML body, as PHP serves its fatal errors.
    #[must_use]
    pub fn html(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "text/html; charset=UTF-8",
            body: body.to_string(),
        }
    }

    /// `200 OK`, JSON content type, no body.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "application/json",
            body: String::new(),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// A request the fake backend received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub script: String,
    pub query: HashMap<String, String>,
    /// The JSON body, if the request had one.
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct Script {
    replies: HashMap<String, VecDeque<Reply>>,
    received: Vec<Recorded>,
}

impl Script {
    /// Queued replies are used in order; the last one repeats.
    fn next_reply(&mut self, script: &str) -> Reply {
        match self.replies.get_mut(script) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
        .unwrap_or_else(|| Reply::status(StatusCode::NOT_FOUND, json!({ "error": "Not found" })))
    }
}

type Shared = Arc<Mutex<Script>>;

/// In-process stand-in for the Cravii PHP API.
///
/// Unscripted endpoints answer `404` with a JSON error. The server stops
/// when the value is dropped.
#[derive(Debug)]
pub struct FakeBackend {
    addr: SocketAddr,
    script: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Bind an ephemeral port on localhost and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound.
    pub async fn start() -> Self {
        let script = Shared::default();
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&script));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake backend address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            script,
            server,
        }
    }

    /// API base URL pointing at this server.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid host.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/cravii/api/", self.addr)).expect("Invalid fake backend URL")
    }

    /// Client configuration for this server with fast retries.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: self.base_url(),
            http_timeout: Duration::from_secs(5),
            retry: RetryPolicy::new(3, Duration::from_millis(10)),
            ..ClientConfig::default()
        }
    }

    /// A client context talking to this server over `store`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn context(&self, store: Arc<MemoryStore>) -> ClientContext {
        ClientContext::with_store(self.config(), store).expect("Failed to build client context")
    }

    /// Always answer `script` with `reply`.
    pub fn reply(&self, script: &str, reply: Reply) {
        self.replies(script, vec![reply]);
    }

    /// Answer `script` with each reply in turn, repeating the last.
    pub fn replies(&self, script: &str, replies: Vec<Reply>) {
        self.lock()
            .replies
            .insert(script.to_string(), replies.into());
    }

    /// Requests received for `script`, oldest first.
    #[must_use]
    pub fn received(&self, script: &str) -> Vec<Recorded> {
        self.lock()
            .received
            .iter()
            .filter(|r| r.script == script)
            .cloned()
            .collect()
    }

    /// How many times `script` was called.
    #[must_use]
    pub fn calls(&self, script: &str) -> usize {
        self.lock()
            .received
            .iter()
            .filter(|r| r.script == script)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().expect("Fake backend state poisoned")
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(State(script): State<Shared>, uri: Uri, body: Bytes) -> Response {
    let name = uri.path().rsplit('/').next().unwrap_or_default().to_string();
    let query = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let body = serde_json::from_slice(&body).ok();

    let reply = {
        let mut script = script.lock().expect("Fake backend state poisoned");
        script.received.push(Recorded {
            script: name.clone(),
            query,
            body,
        });
        script.next_reply(&name)
    };
    reply.into_response()
}

/// A store holding a logged-in session for `user_id` and `cart`.
///
/// # Panics
///
/// Panics if the cart cannot be serialized.
#[must_use]
pub fn logged_in_store(user_id: i64, cart: &[CartItem]) -> Arc<MemoryStore> {
    let cart = serde_json::to_string(cart).expect("Failed to serialize cart");
    Arc::new(MemoryStore::with_entries([
        (KEY_USER_ID, user_id.to_string()),
        (KEY_CART, cart),
    ]))
}
