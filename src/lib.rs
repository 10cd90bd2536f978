// Re-export modules
pub mod analysis;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod parsers;
pub mod pipeline;
pub mod results;
pub mod sitemap;
pub mod sites;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types for convenience
pub use classifier::PageCategory;
pub use config::AnalyzerConfig;
pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use results::{AnalysisResult, StructuredSummary};
pub use sites::SiteProfile;

use analysis::OpenAiService;
use fetchers::ReqwestTransport;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main builder for analyzing a site's sitemap with the default
/// HTTP transport and OpenAI backend
pub struct WebsiteAnalyzer {
    config: AnalyzerConfig,
    sites: Vec<SiteProfile>,
    show_progress: bool,
}

impl WebsiteAnalyzer {
    /// Create a new builder from a loaded configuration
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            sites: SiteProfile::builtin(),
            show_progress: false,
        }
    }

    /// Set the maximum number of pages processed at once
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set the per-request fetch timeout
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.request_timeout_ms = timeout_ms;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the cache directory, or disable caching with `None`
    pub fn with_cache_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.cache_dir = dir;
        self
    }

    /// Replace the built-in site profiles
    pub fn with_sites(mut self, sites: Vec<SiteProfile>) -> Self {
        self.sites = sites;
        self
    }

    /// Show a progress bar while pages are processed
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze up to `url_limit` pages listed in `sitemap_xml`, optionally
    /// writing the summaries to `output` as a JSON array
    pub async fn analyze(
        &self,
        sitemap_xml: &str,
        output: Option<&Path>,
        url_limit: usize,
    ) -> Result<Vec<StructuredSummary>, PipelineError> {
        let transport = ReqwestTransport::new(&self.config.user_agent)?;
        let service = OpenAiService::new(&self.config.api_key, self.config.model.as_str());
        ::log::debug!(
            "Using model {} with {} workers and {}ms fetch timeout",
            service.model(),
            self.config.max_concurrency,
            self.config.request_timeout_ms
        );

        Pipeline::new(&self.config, Arc::new(transport), Arc::new(service))
            .with_sites(self.sites.clone())
            .with_progress(self.show_progress)
            .run(sitemap_xml, output, url_limit)
            .await
    }
}
