use crate::config::SourceMode;
use crate::error::SourceError;
use crate::events::{Sample, SensorPayload};
use crate::sources::SampleSource;
use chrono::Utc;
use log::debug;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Fetches readings from the sensor's HTTP endpoint
///
/// Every poll is a single GET with a fixed timeout. Anything other than a
/// 200 response carrying a well-formed payload is an error for that poll.
pub struct RemoteSource {
    client: Client,
    url: String,
}

impl RemoteSource {
    /// Create a remote source for `url`
    ///
    /// # Errors
    ///
    /// Returns `SourceError::MissingEndpoint` for a blank URL and
    /// `SourceError::ClientBuild` if the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let url = url.into().trim().to_string();
        if url.is_empty() {
            return Err(SourceError::MissingEndpoint);
        }

        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| SourceError::ClientBuild(e.to_string()))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check that the endpoint answers with 200 without parsing the body
    pub async fn probe(&self) -> Result<(), SourceError> {
        let response = self.client.get(&self.url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(SourceError::UnexpectedStatus(status.as_u16())),
        }
    }

    async fn fetch_payload(&self) -> Result<SensorPayload, SourceError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SourceError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.text().await?;
        debug!("Sensor payload: {}", body);
        serde_json::from_str(&body).map_err(|e| SourceError::InvalidPayload(e.to_string()))
    }
}

impl SampleSource for RemoteSource {
    fn fetch<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Sample, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let payload = self.fetch_payload().await?;
            Ok(payload.into_sample(Utc::now()))
        })
    }

    fn mode(&self) -> SourceMode {
        SourceMode::Remote
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
