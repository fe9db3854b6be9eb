//! Client for the external face-recognition service.
//!
//! Only the API layer calls it. Requests use a short timeout and a bounded
//! number of retries with exponential backoff; 4xx responses are not retried.

use std::time::Duration;

use reqwest::{Method, StatusCode, Url};

use rollcall_core::config::FaceServiceConfig;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone)]
pub struct FaceServiceClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    backoff: Duration,
}

impl FaceServiceClient {
    /// ## Summary
    /// Builds a client against `base_url`.
    ///
    /// ## Errors
    /// Returns `FaceService` if `base_url` is not an absolute URL or the HTTP
    /// client cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
        backoff: Duration,
    ) -> ServiceResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self::parse_base(&base_url)?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ServiceError::FaceService(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff,
        })
    }

    /// ## Summary
    /// Builds a client from configuration; `None` when no service URL is configured.
    ///
    /// ## Errors
    /// Returns `FaceService` if the HTTP client cannot be constructed.
    pub fn from_config(config: &FaceServiceConfig) -> ServiceResult<Option<Self>> {
        config
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                Self::new(
                    url,
                    Duration::from_millis(config.timeout_ms),
                    config.max_retries,
                    Duration::from_millis(config.backoff_ms),
                )
            })
            .transpose()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn parse_base(base_url: &str) -> ServiceResult<Url> {
        Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ServiceError::FaceService(format!("invalid face service URL: {base_url}")))
    }

    /// `{base}/unenroll/{CODE}` with the code percent-encoded as one path segment.
    fn unenroll_url(&self, student_code: &str) -> ServiceResult<Url> {
        let mut url = Self::parse_base(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| ServiceError::FaceService(format!("invalid face service URL: {}", self.base_url)))?
            .pop_if_empty()
            .push("unenroll")
            .push(&student_code.trim().to_uppercase());
        Ok(url)
    }

    /// Delay before retry number `attempt` (1-based): `backoff * 2^(attempt - 1)`.
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(1_u32 << attempt.saturating_sub(1).min(16))
    }

    /// Sends a request, retrying transport errors and 5xx responses.
    async fn send_with_retry(&self, method: Method, url: &str) -> ServiceResult<reqwest::Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let failure = match self.client.request(method.clone(), url).send().await {
                Ok(resp) if !resp.status().is_server_error() => return Ok(resp),
                Ok(resp) => format!("status {}", resp.status()),
                Err(e) => e.to_string(),
            };

            if attempt > self.max_retries {
                return Err(ServiceError::FaceService(format!(
                    "{method} {url} failed after {attempt} attempts: {failure}"
                )));
            }

            let delay = self.backoff_for(attempt);
            tracing::debug!(attempt, ?delay, %failure, "Retrying face service request");
            tokio::time::sleep(delay).await;
        }
    }

    /// ## Summary
    /// Removes a student's face encoding. A student unknown to the service
    /// counts as already unenrolled.
    ///
    /// ## Errors
    /// Returns `FaceService` if the service keeps failing or rejects the request.
    #[tracing::instrument(skip(self), fields(face_service = %self.base_url))]
    pub async fn unenroll(&self, student_code: &str) -> ServiceResult<()> {
        let url = self.unenroll_url(student_code)?;
        let resp = self.send_with_retry(Method::DELETE, url.as_str()).await?;

        match resp.status() {
            status if status.is_success() => {
                tracing::info!("Student unenrolled from face service");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                tracing::debug!("Student was not enrolled in face service");
                Ok(())
            }
            status => Err(ServiceError::FaceService(format!(
                "unenroll rejected with status {status}"
            ))),
        }
    }

    /// ## Summary
    /// Returns whether the service answers its health endpoint. Not retried.
    #[tracing::instrument(skip(self), fields(face_service = %self.base_url))]
    pub async fn health(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Face service unreachable");
                false
            }
        }
    }
}
