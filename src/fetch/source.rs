use std::time::Duration;

use crate::error::FetchError;

/// Where raw payloads come from. Implementations block the calling thread.
pub trait PriceSource: Send {
    fn fetch_body(&self) -> Result<String, FetchError>;

    fn describe(&self) -> String {
        "price source".to_string()
    }
}

/// `GET <endpoint>` with a hard request timeout.
pub struct HttpPriceSource {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpPriceSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

impl PriceSource for HttpPriceSource {
    fn fetch_body(&self) -> Result<String, FetchError> {
        let resp = self.http.get(&self.endpoint).send()?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(endpoint = %self.endpoint, status = status.as_u16(), "Price request rejected");
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(resp.text()?)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
