//! Shared test utilities: a scripted transport and a counting pacer.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use tradegate::models::Category;
use tradegate::pacing::Pacer;
use tradegate::transport::{HttpRequest, HttpResponse, HttpTransport};
use tradegate::{BybitConfig, BybitGateway, Credentials, GatewayError};

pub const TEST_BASE_URL: &str = "https://bybit.test";
pub const TEST_API_KEY: &str = "test-key";
pub const TEST_API_SECRET: &str = "test-secret";

/// A successful envelope around `result`.
pub fn ok_envelope(result: Value) -> HttpResponse {
    HttpResponse::ok(
        json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": result,
            "retExtInfo": {},
            "time": 1_700_000_000_000u64,
        })
        .to_string(),
    )
}

/// A 200 response carrying a non-zero `retCode`.
pub fn error_envelope(code: i64, message: &str) -> HttpResponse {
    HttpResponse::ok(
        json!({
            "retCode": code,
            "retMsg": message,
            "result": {},
            "retExtInfo": {},
            "time": 1_700_000_000_000u64,
        })
        .to_string(),
    )
}

pub fn empty_list() -> HttpResponse {
    ok_envelope(json!({ "list": [], "nextPageCursor": "" }))
}

struct Route {
    prefix: String,
    responses: VecDeque<HttpResponse>,
}

/// Replays queued responses by path prefix and records every request.
///
/// Responses for a prefix are served in order; the last one repeats once the
/// queue is down to it. The longest matching prefix wins.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues `response` for requests whose path starts with `prefix`.
    pub fn on(&self, prefix: &str, response: HttpResponse) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        match routes.iter_mut().find(|r| r.prefix == prefix) {
            Some(route) => route.responses.push_back(response),
            None => routes.push(Route {
                prefix: prefix.to_string(),
                responses: VecDeque::from([response]),
            }),
        }
        self
    }

    /// Queues a fixture body as a 200 response.
    pub fn on_fixture(&self, prefix: &str, body: &str) -> &Self {
        self.on(prefix, HttpResponse::ok(body))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests whose path starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path().starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> tradegate::Result<HttpResponse> {
        let path = request.path().to_string();
        self.requests.lock().unwrap().push(request);

        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .filter(|r| path.starts_with(&r.prefix))
            .max_by_key(|r| r.prefix.len());

        match route {
            Some(route) if route.responses.len() > 1 => Ok(route.responses.pop_front().unwrap()),
            Some(route) => Ok(route.responses.front().cloned().unwrap()),
            None => Err(GatewayError::exchange(format!(
                "no scripted response for {path}"
            ))),
        }
    }
}

/// Counts pauses without sleeping.
#[derive(Debug, Default)]
pub struct CountingPacer {
    pauses: AtomicUsize,
}

impl CountingPacer {
    pub fn count(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Pacer for CountingPacer {
    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn credentials() -> Credentials {
    Credentials::new(TEST_API_KEY, TEST_API_SECRET).unwrap()
}

/// A signed gateway over `transport` with a counting pacer.
pub fn gateway(
    category: Category,
    transport: Arc<ScriptedTransport>,
) -> (BybitGateway, Arc<CountingPacer>) {
    let pacer = Arc::new(CountingPacer::default());
    let gateway = BybitGateway::with_transport(
        BybitConfig::default().with_base_url(TEST_BASE_URL),
        Some(credentials()),
        category,
        transport,
    )
    .with_pacer(pacer.clone());
    (gateway, pacer)
}

/// A gateway without credentials.
pub fn public_gateway(category: Category, transport: Arc<ScriptedTransport>) -> BybitGateway {
    BybitGateway::with_transport(
        BybitConfig::default().with_base_url(TEST_BASE_URL),
        None,
        category,
        transport,
    )
}

/// Parses the query string of a recorded request into pairs.
pub fn query_pairs(request: &HttpRequest) -> Vec<(String, String)> {
    request
        .path()
        .split_once('?')
        .map(|(_, q)| {
            q.split('&')
                .filter_map(|kv| kv.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

pub fn query_param(request: &HttpRequest, key: &str) -> Option<String> {
    query_pairs(request)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

/// Parses the JSON body of a recorded POST.
pub fn body_json(request: &HttpRequest) -> Value {
    serde_json::from_str(request.body.as_deref().unwrap_or("{}")).unwrap()
}
