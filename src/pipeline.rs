use crate::analysis::{AnalysisService, ContentAnalyzer};
use crate::cache::ResultCache;
use crate::classifier::PageClassifier;
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, FetchError, PipelineError};
use crate::fetchers::{ContentFetcher, HttpTransport, RetryPolicy};
use crate::results::StructuredSummary;
use crate::sitemap::{self, PageDescriptor};
use crate::sites::SiteProfile;
use crate::utils::write_atomic;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Why a single page was left out of the results
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Shared per-run state handed to every worker
struct Worker {
    fetcher: ContentFetcher,
    analyzer: ContentAnalyzer,
    cache: Option<ResultCache>,
}

impl Worker {
    async fn process(&self, page: &PageDescriptor) -> Result<StructuredSummary, PageError> {
        if let Some(cached) = self.cached(page).await {
            return Ok(cached);
        }

        let fetched = self.fetcher.fetch(page).await?;
        let summary = self.analyzer.analyze(&fetched).await?;

        if let Some(cache) = &self.cache {
            cache.set(&summary.url, &summary).await;
        }
        Ok(summary)
    }

    async fn cached(&self, page: &PageDescriptor) -> Option<StructuredSummary> {
        let cache = self.cache.as_ref()?;
        let summary: StructuredSummary = cache.get(&page.location).await?;
        // Entries classified under an older product-path table are stale
        let category = self.fetcher.classifier().classify_url(&page.location);
        if summary.url == page.location && summary.page_type == category && summary.is_consistent()
        {
            ::log::info!("Using cached analysis for {}", page.location);
            Some(summary)
        } else {
            ::log::debug!("Ignoring stale cache entry for {}", page.location);
            None
        }
    }
}

/// Sitemap to summaries: fetch and analyze every listed page under a bounded
/// worker budget, dropping pages that fail.
pub struct Pipeline {
    transport: Arc<dyn HttpTransport>,
    service: Arc<dyn AnalysisService>,
    sites: Vec<SiteProfile>,
    cache: Option<ResultCache>,
    max_concurrency: usize,
    request_timeout: Duration,
    retry: RetryPolicy,
    content_limit: usize,
    market_region: String,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(
        config: &AnalyzerConfig,
        transport: Arc<dyn HttpTransport>,
        service: Arc<dyn AnalysisService>,
    ) -> Self {
        Self {
            transport,
            service,
            sites: SiteProfile::builtin(),
            cache: config.cache_dir.as_ref().map(ResultCache::new),
            max_concurrency: config.max_concurrency,
            request_timeout: config.request_timeout(),
            retry: RetryPolicy::default(),
            content_limit: config.content_limit,
            market_region: config.market_region.clone(),
            show_progress: false,
        }
    }

    /// Replace the built-in site profiles
    pub fn with_sites(mut self, sites: Vec<SiteProfile>) -> Self {
        self.sites = sites;
        self
    }

    pub fn with_cache(mut self, cache: Option<ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Draw a progress bar on stderr while pages are processed
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Analyzes up to `url_limit` pages of the sitemap.
    ///
    /// Fails only on setup errors (unknown site, malformed sitemap) or when the
    /// output file cannot be written. Pages that fail to fetch or analyze are
    /// logged and omitted. Product pages come first in the result, each group
    /// in sitemap order.
    pub async fn run(
        &self,
        sitemap_xml: &str,
        output: Option<&Path>,
        url_limit: usize,
    ) -> Result<Vec<StructuredSummary>, PipelineError> {
        let site = SiteProfile::detect(&self.sites, sitemap_xml)?;
        ::log::info!("Analyzing sitemap of {}", site.id);

        let classifier = PageClassifier::new(&site.product_paths);

        let mut pages = sitemap::parse(sitemap_xml)?;
        pages.truncate(url_limit);

        let (products, others): (Vec<_>, Vec<_>) = pages
            .into_iter()
            .partition(|page| classifier.classify_url(&page.location).is_product());
        ::log::info!(
            "Queued {} product pages and {} other pages",
            products.len(),
            others.len()
        );

        let worker = Arc::new(Worker {
            fetcher: ContentFetcher::new(
                Arc::clone(&self.transport),
                classifier,
                self.request_timeout,
            )
            .with_retry_policy(self.retry),
            analyzer: ContentAnalyzer::new(Arc::clone(&self.service))
                .with_content_limit(self.content_limit)
                .with_market_region(self.market_region.as_str()),
            cache: self.cache.clone(),
        });

        let total = products.len() + others.len();
        let progress = self.progress_bar(total as u64);
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency.max(1)));

        let handles: Vec<_> = products
            .into_iter()
            .chain(others)
            .map(|page| {
                let worker = Arc::clone(&worker);
                let semaphore = Arc::clone(&semaphore);
                let progress = progress.clone();

                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok()?;
                    let outcome = worker.process(&page).await;
                    progress.inc(1);
                    match outcome {
                        Ok(summary) => Some(summary),
                        Err(e) => {
                            ::log::error!("Skipping {}: {}", page.location, e);
                            None
                        }
                    }
                })
            })
            .collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(Some(summary)) => summaries.push(summary),
                Ok(None) => {}
                Err(e) => ::log::error!("Worker task failed: {}", e),
            }
        }
        progress.finish_and_clear();

        ::log::info!(
            "Analyzed {} of {} pages ({} skipped)",
            summaries.len(),
            total,
            total - summaries.len()
        );

        if let Some(path) = output {
            write_results(path, &summaries).await?;
            ::log::info!("Results saved to {}", path.display());
        }

        Ok(summaries)
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template(" {bar:40} {percent}% | ETA: {eta} | {pos}/{len} URLs")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar
    }
}

async fn write_results(path: &Path, summaries: &[StructuredSummary]) -> Result<(), PipelineError> {
    let json = serde_json::to_vec_pretty(summaries)?;
    write_atomic(path, &json)
        .await
        .map_err(|source| PipelineError::Output {
            path: path.to_path_buf(),
            source,
        })
}
