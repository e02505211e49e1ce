//! HTTP client construction for a remote KMS endpoint.
//! Constructed from a [`KmsClientBuilder`].

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use anyhow::Result;
use jsonrpsee::http_client::{transport::HttpBackend, HttpClient, HttpClientBuilder};

pub const KMS_DEFAULT_ENDPOINT_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const KMS_DEFAULT_ENDPOINT_PORT: u16 = 7979;
pub const KMS_DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// The HTTP client used to reach the KMS. It is cheaply cloneable and
/// safe for concurrent use; in-flight requests are dropped on abort
/// without any local recovery logic running on partial results.
pub type KmsClient = HttpClient<HttpBackend>;

/// Builder for a [`KmsClient`].
#[derive(Debug, Clone, Default)]
pub struct KmsClientBuilder {
    ip: Option<String>,
    port: Option<u16>,
    timeout: Option<Duration>,
    url: Option<String>,
}

impl KmsClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Full endpoint URL; takes precedence over `ip`/`port`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn build(self) -> Result<KmsClient> {
        let url = self.url.unwrap_or_else(|| {
            format!(
                "http://{}:{}",
                self.ip
                    .unwrap_or_else(|| KMS_DEFAULT_ENDPOINT_ADDR.to_string()),
                self.port.unwrap_or(KMS_DEFAULT_ENDPOINT_PORT)
            )
        });

        let client = HttpClientBuilder::default()
            .request_timeout(
                self.timeout
                    .unwrap_or(Duration::from_secs(KMS_DEFAULT_TIMEOUT_SECONDS)),
            )
            .build(url)?;
        Ok(client)
    }
}
