use crate::ScraperError;
use rand::Rng;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT},
    Client, StatusCode,
};
use std::{sync::Arc, time::Duration};
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// No timeout when `None`.
    pub timeout: Option<Duration>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
            timeout: None,
        }
    }
}

/// Pause taken before every request.
#[async_trait::async_trait]
pub trait Throttle: Send + Sync {
    async fn pause(&self);
}

/// Sleeps for a duration drawn uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct RandomDelay {
    min_ms: u64,
    max_ms: u64,
}

impl RandomDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        let a = u64::try_from(min.as_millis()).unwrap_or(u64::MAX);
        let b = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
        RandomDelay {
            min_ms: a.min(b),
            max_ms: a.max(b),
        }
    }

    pub fn sample(&self) -> Duration {
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }
}

#[async_trait::async_trait]
impl Throttle for RandomDelay {
    async fn pause(&self) {
        let delay = self.sample();
        debug!("Throttle {} ms", delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}

pub struct PageFetcher {
    client: Client,
    throttle: Arc<dyn Throttle>,
}

impl PageFetcher {
    pub fn new(config: &FetcherConfig) -> Result<PageFetcher, ScraperError> {
        let throttle = RandomDelay::new(config.min_delay, config.max_delay);
        Self::with_throttle(config, Arc::new(throttle))
    }

    pub fn with_throttle(
        config: &FetcherConfig,
        throttle: Arc<dyn Throttle>,
    ) -> Result<PageFetcher, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)?,
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(PageFetcher {
            client: builder.build()?,
            throttle,
        })
    }

    /// Throttles, then GETs `url`. Only a 200 response yields a body.
    pub async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        self.throttle.pause().await;

        debug!("Visit {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScraperError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
