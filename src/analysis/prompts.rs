use crate::fetchers::FetchedPage;

pub(crate) fn market_challenges(page: &FetchedPage, excerpt: &str) -> String {
    format!(
        "Analyze this webpage for general market challenges:\n\
         URL: {}\n\
         Title: {}\n\
         Content: {}",
        page.url, page.title, excerpt
    )
}

pub(crate) fn regional_context(first_pass: &str, region: &str) -> String {
    format!(
        "Given this initial analysis: {first_pass}\n\
         Now focus on specific challenges in the {region} market context, including:\n\
         - Regional regulatory frameworks\n\
         - Local market dynamics\n\
         - Consumer behavior in {region} markets"
    )
}

pub(crate) fn competitive_outlook() -> String {
    "Based on previous analyses, provide deep insights on:\n\
     1. Competitive Landscape:\n\
     \x20  - Key competitors\n\
     \x20  - Market positioning\n\
     \x20  - Unique selling propositions\n\
     2. Future Market Evolution:\n\
     \x20  - Regulatory trends\n\
     \x20  - Technology adoption curves\n\
     \x20  - Consumer behavior shifts\n\
     3. Strategic Implications:\n\
     \x20  - Growth bottlenecks\n\
     \x20  - Market opportunities\n\
     \x20  - Risk mitigation strategies"
        .to_string()
}

const PRODUCT_SCHEMA: &str = r#"{
  "productsOrServices": [{
    "name": "product name",
    "description": "detailed description",
    "primaryPurpose": "main benefit/purpose",
    "strategicImportance": "strategic value with competitive context",
    "integrationInEcosystem": "ecosystem fit and market positioning",
    "marketPotentialAssessment": {
      "trend": "rapid growth|moderate growth|stable|declining",
      "reasoning": "comprehensive market analysis synthesis",
      "scalingChallenges": [
        {
          "challenge": "specific challenge name",
          "explanation": "detailed explanation with competitive context",
          "examples": "concrete industry examples",
          "sources": "specific external URLs, research papers, or regulatory documents (provide full URLs when available)",
          "competitiveContext": "how competitors address this challenge",
          "futurePerspective": "how this challenge might evolve"
        }
      ]
    }
  }]
}"#;

pub(crate) fn synthesis(general: &str, regional: &str, strategic: &str) -> String {
    format!(
        "Synthesize all previous analyses into a comprehensive JSON format:\n\
         General Analysis: {general}\n\
         Regional Analysis: {regional}\n\
         Strategic Analysis: {strategic}\n\n\
         Provide final structured analysis in this JSON format:\n{PRODUCT_SCHEMA}"
    )
}

const GENERAL_SCHEMA: &str = r#"{
  "summary": "brief overview",
  "keyPoints": ["key point 1", "key point 2", ...],
  "relevantInsights": "any strategic/market insights if applicable"
}"#;

pub(crate) fn general(page: &FetchedPage, excerpt: &str) -> String {
    format!(
        "Analyze this webpage and provide a general analysis:\n\
         URL: {}\n\
         Title: {}\n\
         Content: {}\n\n\
         Provide analysis in this JSON format:\n{}",
        page.url, page.title, excerpt, GENERAL_SCHEMA
    )
}
