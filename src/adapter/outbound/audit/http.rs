//! Remote audit service client.
//!
//! Posts each event as JSON to `{endpoint}/log` and reads back an
//! acknowledgement of the form `{"status": "ok" | "error"}`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::domain::AuditEvent;
use crate::error::{Error, Result};
use crate::port::{Ack, AuditClient};

const LOG_PATH: &str = "log";

#[derive(Deserialize)]
struct LogResponse {
    status: Ack,
}

/// HTTP implementation of [`AuditClient`].
#[derive(Debug)]
pub struct HttpAuditClient {
    client: Client,
    endpoint: Url,
    closed: AtomicBool,
}

impl HttpAuditClient {
    /// Create a client for the audit service at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not a valid URL or the HTTP client cannot
    /// be built.
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(LOG_PATH)?;
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
            closed: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AuditClient for HttpAuditClient {
    async fn log(&self, event: &AuditEvent) -> Result<Ack> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::Connection("audit client is closed".into()));
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(event)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Connection(e.to_string()))?
            .json::<LogResponse>()
            .await?;

        Ok(response.status)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
