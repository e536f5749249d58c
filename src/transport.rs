use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};

/// Default per-request timeout of [`HttpTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

/// Sends one request and returns the response body.
///
/// Implementations own timeouts. A non-success status is an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<Vec<u8>, TransportError>;
}

/// [`Transport`] over a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<Vec<u8>, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .body(request.body);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
