use std::future::Future;
use std::time::Duration;

use crate::model::TransportFailure;
use crate::utils::{truncate_message, MAX_ERROR_MESSAGE_LEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Option<String>,
}

impl HttpReply {
    pub const fn is_success(&self) -> bool {
        is_success_status(self.status)
    }
}

pub const fn is_success_status(status: u16) -> bool {
    status >= 200 && status < 300
}

/// Http access used by the liveness probe. Redirects are followed by the implementation.
pub trait HttpTransport: Send + Sync {
    /// Existence check without body transfer.
    fn head(&self, url: &str, timeout: Duration) -> impl Future<Output=Result<u16, TransportFailure>> + Send;

    /// Full GET. With `max_body` the body is read up to that many bytes, otherwise it is discarded.
    fn get(&self, url: &str, timeout: Duration, max_body: Option<usize>) -> impl Future<Output=Result<HttpReply, TransportFailure>> + Send;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_transport_failure(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout
    } else if err.is_connect() {
        TransportFailure::Connection
    } else {
        TransportFailure::Other(truncate_message(&err.without_url().to_string(), MAX_ERROR_MESSAGE_LEN))
    }
}

impl HttpTransport for ReqwestTransport {
    async fn head(&self, url: &str, timeout: Duration) -> Result<u16, TransportFailure> {
        let response = self.client.head(url).timeout(timeout).send().await.map_err(to_transport_failure)?;
        Ok(response.status().as_u16())
    }

    async fn get(&self, url: &str, timeout: Duration, max_body: Option<usize>) -> Result<HttpReply, TransportFailure> {
        let mut response = self.client.get(url).timeout(timeout).send().await.map_err(to_transport_failure)?;
        let status = response.status().as_u16();
        let Some(limit) = max_body else {
            return Ok(HttpReply { status, body: None });
        };
        let mut body: Vec<u8> = Vec::with_capacity(8192);
        while let Some(chunk) = response.chunk().await.map_err(to_transport_failure)? {
            let remaining = limit.saturating_sub(body.len());
            body.extend_from_slice(&chunk[..remaining.min(chunk.len())]);
            if body.len() >= limit {
                break;
            }
        }
        Ok(HttpReply { status, body: Some(String::from_utf8_lossy(&body).to_string()) })
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::model::TransportFailure;
    use crate::processing::probe::{HttpReply, HttpTransport};

    #[derive(Debug, Clone)]
    pub struct Script {
        pub head: Result<u16, TransportFailure>,
        pub get: Result<HttpReply, TransportFailure>,
    }

    /// Answers from a per-url script and records every request.
    #[derive(Debug, Default)]
    pub struct FakeTransport {
        scripts: HashMap<String, Script>,
        pub calls: Mutex<Vec<(&'static str, String, Duration)>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: &str, head: Result<u16, TransportFailure>, get: Result<HttpReply, TransportFailure>) -> Self {
            self.scripts.insert(url.to_string(), Script { head, get });
            self
        }

        pub fn manifest(self, url: &str, status: u16, body: &str) -> Self {
            self.with(url, Ok(status), Ok(HttpReply { status, body: Some(body.to_string()) }))
        }

        pub fn failing(self, url: &str, failure: TransportFailure) -> Self {
            self.with(url, Err(failure.clone()), Err(failure))
        }

        pub fn calls(&self) -> Vec<(&'static str, String, Duration)> {
            self.calls.lock().unwrap().clone()
        }

        fn script(&self, url: &str) -> Script {
            self.scripts.get(url).cloned().unwrap_or(Script {
                head: Err(TransportFailure::Connection),
                get: Err(TransportFailure::Connection),
            })
        }
    }

    impl HttpTransport for FakeTransport {
        async fn head(&self, url: &str, timeout: Duration) -> Result<u16, TransportFailure> {
            self.calls.lock().unwrap().push(("HEAD", url.to_string(), timeout));
            self.script(url).head
        }

        async fn get(&self, url: &str, timeout: Duration, max_body: Option<usize>) -> Result<HttpReply, TransportFailure> {
            self.calls.lock().unwrap().push(("GET", url.to_string(), timeout));
            self.script(url).get.map(|reply| HttpReply {
                status: reply.status,
                body: max_body.and(reply.body),
            })
        }
    }
}
