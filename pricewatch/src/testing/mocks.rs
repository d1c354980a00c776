//! Deterministic transports for tests and offline runs.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::errors::TransportError;
use crate::fetch::{HttpRequest, HttpResponse, HttpTransport};

/// Shared log of requests a transport received.
pub type RequestLog = Arc<Mutex<Vec<HttpRequest>>>;

/// Replays a fixed sequence of results, one per request.
///
/// Requests after the script runs out fail with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: RequestLog,
}

impl ScriptedTransport {
    /// Creates a transport that answers with `script` in order.
    #[must_use]
    pub fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Arc::default(),
        }
    }

    /// Handle to the request log; stays valid after the transport moves.
    #[must_use]
    pub fn requests(&self) -> RequestLog {
        Arc::clone(&self.requests)
    }

    /// Number of results not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("script exhausted".into())))
    }
}

/// Answers by URL; unknown URLs get a 404.
#[derive(Debug, Default)]
pub struct RoutedTransport {
    routes: HashMap<String, HttpResponse>,
    requests: RequestLog,
}

impl RoutedTransport {
    /// Creates a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` with `status` for `url`.
    #[must_use]
    pub fn route(mut self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let url = url.into();
        let response = HttpResponse {
            status,
            final_url: url.clone(),
            body: body.into(),
        };
        self.routes.insert(url, response);
        self
    }

    /// Handle to the request log.
    #[must_use]
    pub fn requests(&self) -> RequestLog {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl HttpTransport for RoutedTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());
        Ok(self
            .routes
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, "not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request(url: &str) -> HttpRequest {
        HttpRequest {
            url: url.to_string(),
            headers: Vec::new(),
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_scripted_transport_replays_in_order() {
        let transport = ScriptedTransport::new(vec![
            Ok(HttpResponse::new(503, "")),
            Ok(HttpResponse::new(200, "ok")),
        ]);
        let log = transport.requests();

        assert_eq!(transport.get(&request("a")).await.unwrap().status, 503);
        assert_eq!(transport.get(&request("b")).await.unwrap().status, 200);
        assert!(transport.get(&request("c")).await.is_err());
        assert_eq!(log.lock().len(), 3);
        assert_eq!(transport.remaining(), 0);
    }

    #[tokio::test]
    async fn test_routed_transport() {
        let transport = RoutedTransport::new().route("https://m.shop.example/p/1", 200, "mobile");

        let hit = transport.get(&request("https://m.shop.example/p/1")).await.unwrap();
        assert_eq!(hit.body, "mobile");

        let miss = transport.get(&request("https://shop.example/")).await.unwrap();
        assert_eq!(miss.status, 404);
    }
}
