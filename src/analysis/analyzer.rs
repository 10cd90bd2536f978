use crate::analysis::{
    AnalysisRequest, AnalysisService, Conversation, ResponseFormat, ServiceResponse, prompts,
};
use crate::error::AnalysisError;
use crate::fetchers::FetchedPage;
use crate::results::{
    AnalysisResult, GeneralAnalysis, ProductAnalysis, StructuredSummary, SummaryMetadata,
};
use crate::utils::truncate_chars;
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::sync::Arc;

const DEFAULT_CONTENT_LIMIT: usize = 2000;
const DEFAULT_MARKET_REGION: &str = "German and European";

#[derive(Debug, Clone, Copy)]
enum Stage {
    MarketChallenges,
    RegionalContext,
    CompetitiveOutlook,
    Synthesis,
    General,
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::MarketChallenges => "market challenge pass",
            Stage::RegionalContext => "regional context pass",
            Stage::CompetitiveOutlook => "competitive outlook pass",
            Stage::Synthesis => "synthesis pass",
            Stage::General => "general analysis",
        }
    }
}

/// Runs a fetched page through the analysis protocol for its category.
///
/// Product pages get four chained passes, each carrying the whole prior
/// exchange as context; every other page gets a single constrained pass.
pub struct ContentAnalyzer {
    service: Arc<dyn AnalysisService>,
    content_limit: usize,
    market_region: String,
}

impl ContentAnalyzer {
    pub fn new(service: Arc<dyn AnalysisService>) -> Self {
        Self {
            service,
            content_limit: DEFAULT_CONTENT_LIMIT,
            market_region: DEFAULT_MARKET_REGION.to_string(),
        }
    }

    /// Maximum number of characters of page text sent for analysis
    pub fn with_content_limit(mut self, limit: usize) -> Self {
        self.content_limit = limit;
        self
    }

    /// Market named in the regional pass
    pub fn with_market_region(mut self, region: impl Into<String>) -> Self {
        self.market_region = region.into();
        self
    }

    pub async fn analyze(&self, page: &FetchedPage) -> Result<StructuredSummary, AnalysisError> {
        let (analysis, response) = if page.category.is_product() {
            self.analyze_product(page).await?
        } else {
            self.analyze_general(page).await?
        };

        Ok(StructuredSummary {
            url: page.url.clone(),
            page_type: page.category,
            title: page.title.clone(),
            last_modified: page.last_modified.clone(),
            metadata: SummaryMetadata {
                analyzed_at: Utc::now(),
                response_id: response.id,
                model: response.model,
                analysis_type: analysis.analysis_type(),
            },
            analysis,
        })
    }

    async fn analyze_product(
        &self,
        page: &FetchedPage,
    ) -> Result<(AnalysisResult, ServiceResponse), AnalysisError> {
        let excerpt = truncate_chars(&page.extracted_text, self.content_limit);

        let conversation = Conversation::new().user(prompts::market_challenges(page, excerpt));
        let general = self
            .exchange(Stage::MarketChallenges, &conversation, ResponseFormat::Text)
            .await?
            .content;

        let conversation = conversation
            .assistant(general.as_str())
            .user(prompts::regional_context(&general, &self.market_region));
        let regional = self
            .exchange(Stage::RegionalContext, &conversation, ResponseFormat::Text)
            .await?
            .content;

        let conversation = conversation
            .assistant(regional.as_str())
            .user(prompts::competitive_outlook());
        let strategic = self
            .exchange(Stage::CompetitiveOutlook, &conversation, ResponseFormat::Text)
            .await?
            .content;

        let conversation = conversation
            .assistant(strategic.as_str())
            .user(prompts::synthesis(&general, &regional, &strategic));
        let response = self
            .exchange(Stage::Synthesis, &conversation, ResponseFormat::JsonObject)
            .await?;

        let analysis: ProductAnalysis = parse_payload(&response.content, "product analysis")?;
        ::log::debug!(
            "Product analysis of {} found {} products",
            page.url,
            analysis.products_or_services.len()
        );
        Ok((AnalysisResult::Product(analysis), response))
    }

    async fn analyze_general(
        &self,
        page: &FetchedPage,
    ) -> Result<(AnalysisResult, ServiceResponse), AnalysisError> {
        let excerpt = truncate_chars(&page.extracted_text, self.content_limit);
        let conversation = Conversation::new().user(prompts::general(page, excerpt));
        let response = self
            .exchange(Stage::General, &conversation, ResponseFormat::JsonObject)
            .await?;

        let analysis: GeneralAnalysis = parse_payload(&response.content, "general analysis")?;
        Ok((AnalysisResult::General(analysis), response))
    }

    async fn exchange(
        &self,
        stage: Stage,
        conversation: &Conversation,
        format: ResponseFormat,
    ) -> Result<ServiceResponse, AnalysisError> {
        ::log::trace!("Starting {} with {} turns", stage.name(), conversation.len());
        let request = AnalysisRequest {
            conversation: conversation.clone(),
            format,
        };

        let response = self
            .service
            .complete(request)
            .await
            .map_err(|source| AnalysisError::Service {
                stage: stage.name(),
                source,
            })?;

        if response.content.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse {
                stage: stage.name(),
            });
        }
        Ok(response)
    }
}

fn parse_payload<T: DeserializeOwned>(
    content: &str,
    expected: &'static str,
) -> Result<T, AnalysisError> {
    serde_json::from_str(content).map_err(|source| AnalysisError::MalformedPayload { expected, source })
}
