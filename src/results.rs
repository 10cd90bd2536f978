use crate::classifier::PageCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which analysis protocol produced a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Detailed,
    General,
}

impl AnalysisType {
    pub fn for_category(category: PageCategory) -> Self {
        if category.is_product() {
            AnalysisType::Detailed
        } else {
            AnalysisType::General
        }
    }
}

/// Market direction of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketTrend {
    #[serde(rename = "rapid growth")]
    RapidGrowth,
    #[serde(rename = "moderate growth")]
    ModerateGrowth,
    #[serde(rename = "stable")]
    Stable,
    #[serde(rename = "declining")]
    Declining,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingChallenge {
    pub challenge: String,
    pub explanation: String,
    pub examples: String,
    pub sources: String,
    pub competitive_context: String,
    pub future_perspective: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPotentialAssessment {
    pub trend: MarketTrend,
    pub reasoning: String,
    pub scaling_challenges: Vec<ScalingChallenge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOrService {
    pub name: String,
    pub description: String,
    pub primary_purpose: String,
    pub strategic_importance: String,
    pub integration_in_ecosystem: String,
    pub market_potential_assessment: MarketPotentialAssessment,
}

/// Result of the detailed (four pass) protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAnalysis {
    pub products_or_services: Vec<ProductOrService>,
}

/// Result of the single pass protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralAnalysis {
    pub summary: String,
    pub key_points: Vec<String>,
    pub relevant_insights: String,
}

/// Analysis payload; its variant always agrees with `metadata.analysisType`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Product(ProductAnalysis),
    General(GeneralAnalysis),
}

impl AnalysisResult {
    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            AnalysisResult::Product(_) => AnalysisType::Detailed,
            AnalysisResult::General(_) => AnalysisType::General,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetadata {
    pub analyzed_at: DateTime<Utc>,
    pub response_id: String,
    pub model: String,
    pub analysis_type: AnalysisType,
}

/// Persisted outcome for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredSummary {
    pub url: String,
    pub page_type: PageCategory,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    pub analysis: AnalysisResult,
    pub metadata: SummaryMetadata,
}

impl StructuredSummary {
    /// `detailed` analysis exactly for product pages, and a payload shaped to match
    pub fn is_consistent(&self) -> bool {
        let expected = AnalysisType::for_category(self.page_type);
        self.metadata.analysis_type == expected && self.analysis.analysis_type() == expected
    }
}
