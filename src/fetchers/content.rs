use crate::classifier::{PageCategory, PageClassifier};
use crate::error::FetchError;
use crate::fetchers::{HttpTransport, TransportError};
use crate::parsers::html;
use crate::sitemap::PageDescriptor;
use std::sync::Arc;
use std::time::Duration;

/// Exponential backoff between fetch attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made after the first one
    pub retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Multiplier applied to the delay after each retry
    pub factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_secs(2),
            factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (zero-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(self.factor.saturating_pow(retry))
    }
}

/// A page retrieved and reduced to text
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub raw_markup: String,
    pub extracted_text: String,
    pub title: String,
    pub category: PageCategory,
    pub last_modified: Option<String>,
}

enum AttemptError {
    Permanent(String),
    Retryable(String),
}

/// Retrieves pages with bounded retries, extracts their text and tags them
/// with a [`PageCategory`].
pub struct ContentFetcher {
    transport: Arc<dyn HttpTransport>,
    classifier: PageClassifier,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ContentFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        classifier: PageClassifier,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            classifier,
            timeout,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn classifier(&self) -> &PageClassifier {
        &self.classifier
    }

    /// Fetches one sitemap entry.
    ///
    /// HTTP 404 fails at once as permanent. Timeouts, connection errors and
    /// other non-success statuses are retried with exponential backoff and
    /// reported as transient once the retry budget is spent.
    pub async fn fetch(&self, page: &PageDescriptor) -> Result<FetchedPage, FetchError> {
        let url = page.location.as_str();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.attempt(url).await {
                Ok(markup) => return Ok(self.build_page(page, markup)),
                Err(AttemptError::Permanent(reason)) => {
                    return Err(FetchError::Permanent {
                        url: url.to_string(),
                        reason,
                    });
                }
                Err(AttemptError::Retryable(reason)) => {
                    if attempt > self.retry.retries {
                        return Err(FetchError::Transient {
                            url: url.to_string(),
                            attempts: attempt,
                            reason,
                        });
                    }
                    let backoff = self.retry.delay_for(attempt - 1);
                    ::log::warn!(
                        "Fetching {} failed (attempt {}/{}): {}, backing off {:.1}s",
                        url,
                        attempt,
                        self.retry.retries + 1,
                        reason,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<String, AttemptError> {
        match self.transport.get(url, self.timeout).await {
            Ok(response) if response.is_success() => Ok(response.body),
            Ok(response) if response.status == 404 => {
                Err(AttemptError::Permanent("HTTP 404".to_string()))
            }
            Ok(response) => Err(AttemptError::Retryable(format!("HTTP {}", response.status))),
            Err(TransportError::InvalidUrl(reason)) => Err(AttemptError::Permanent(reason)),
            Err(e) => Err(AttemptError::Retryable(e.to_string())),
        }
    }

    fn build_page(&self, page: &PageDescriptor, markup: String) -> FetchedPage {
        let content = html::parse(&markup);
        let category = self.classifier.classify_url(&page.location);
        ::log::debug!(
            "Fetched {} ({}, {} bytes)",
            page.location,
            category,
            markup.len()
        );

        FetchedPage {
            url: page.location.clone(),
            extracted_text: content.text(),
            title: content.title,
            raw_markup: markup,
            category,
            last_modified: page.last_modified.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::HttpResponse;
    use crate::testing::MockTransport;

    const URL: &str = "https://ostrom.de/en/our-tariff";

    fn fetcher(transport: Arc<MockTransport>) -> ContentFetcher {
        let classifier = PageClassifier::new(&["/our-tariff".to_string()]);
        ContentFetcher::new(transport, classifier, Duration::from_secs(30))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_extracts_and_classifies() {
        let html = "<html><head><title>Tariff</title></head>\
                    <body><p>Hourly prices.</p><h1>Our tariff</h1></body></html>";
        let transport = Arc::new(MockTransport::new().route(URL, vec![Ok(HttpResponse::new(200, html))]));

        let mut descriptor = PageDescriptor::new(URL);
        descriptor.last_modified = Some("2024-05-01".to_string());
        let page = fetcher(transport.clone()).fetch(&descriptor).await.unwrap();

        assert_eq!(page.url, URL);
        assert_eq!(page.title, "Tariff");
        assert_eq!(page.extracted_text, "Our tariff\nHourly prices.");
        assert_eq!(page.category, PageCategory::Product);
        assert_eq!(page.last_modified.as_deref(), Some("2024-05-01"));
        assert_eq!(page.raw_markup, html);
        assert_eq!(transport.calls_for(URL), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_not_retried() {
        let transport = Arc::new(MockTransport::new().route(URL, vec![Ok(HttpResponse::new(404, ""))]));

        let err = fetcher(transport.clone())
            .fetch(&PageDescriptor::new(URL))
            .await
            .unwrap_err();

        assert!(err.is_permanent());
        assert_eq!(err.url(), URL);
        assert_eq!(transport.calls_for(URL), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_back_off_exponentially() {
        let transport = Arc::new(MockTransport::new().route(
            URL,
            vec![
                Ok(HttpResponse::new(500, "")),
                Ok(HttpResponse::new(500, "")),
                Ok(HttpResponse::new(500, "")),
                Ok(HttpResponse::new(200, "<p>finally</p>")),
            ],
        ));

        let started = tokio::time::Instant::now();
        let page = fetcher(transport.clone())
            .fetch(&PageDescriptor::new(URL))
            .await
            .unwrap();

        assert_eq!(page.extracted_text, "finally");
        assert_eq!(transport.calls_for(URL), 4);

        let times = transport.call_times(URL);
        let gaps: Vec<u64> = times
            .windows(2)
            .map(|w| (w[1] - w[0]).as_millis() as u64)
            .collect();
        assert_eq!(gaps.len(), 3);
        for (gap, expected) in gaps.iter().zip([2000u64, 4000, 8000]) {
            assert!(
                *gap >= expected && *gap < expected + 100,
                "gap {}ms, expected ~{}ms",
                gap,
                expected
            );
        }
        assert!(started.elapsed() >= Duration::from_secs(14));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_are_transient() {
        let transport = Arc::new(MockTransport::new().route(URL, vec![Err(TransportError::Timeout)]));

        let err = fetcher(transport.clone())
            .fetch(&PageDescriptor::new(URL))
            .await
            .unwrap_err();

        assert!(!err.is_permanent());
        match err {
            FetchError::Transient { attempts, .. } => assert_eq!(attempts, 4),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(transport.calls_for(URL), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_client_errors_are_retried() {
        let transport = Arc::new(MockTransport::new().route(
            URL,
            vec![Ok(HttpResponse::new(403, "")), Ok(HttpResponse::new(200, "<p>ok</p>"))],
        ));

        fetcher(transport.clone())
            .fetch(&PageDescriptor::new(URL))
            .await
            .unwrap();
        assert_eq!(transport.calls_for(URL), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_url_is_permanent() {
        let transport = Arc::new(MockTransport::new().route(
            "::bad::",
            vec![Err(TransportError::InvalidUrl("relative URL".to_string()))],
        ));

        let err = fetcher(transport.clone())
            .fetch(&PageDescriptor::new("::bad::"))
            .await
            .unwrap_err();
        assert!(err.is_permanent());
        assert_eq!(transport.calls_for("::bad::"), 1);
    }

    #[test]
    fn test_retry_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(8));
    }
}
