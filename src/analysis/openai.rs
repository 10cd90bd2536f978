use crate::analysis::{
    AnalysisRequest, AnalysisService, ChatMessage, ResponseFormat, Role, ServiceResponse,
};
use crate::error::ServiceError;
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    ResponseFormat as OpenAiResponseFormat,
};
use async_trait::async_trait;

/// [`AnalysisService`] backed by OpenAI chat completions
pub struct OpenAiService {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiService {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        OpenAiService {
            client: Client::with_config(config),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnalysisService for OpenAiService {
    async fn complete(&self, request: AnalysisRequest) -> Result<ServiceResponse, ServiceError> {
        let messages = request
            .conversation
            .turns()
            .iter()
            .map(to_openai_message)
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(self.model.as_str()).messages(messages);
        if request.format == ResponseFormat::JsonObject {
            builder.response_format(OpenAiResponseFormat::JsonObject);
        }
        let body = builder.build()?;

        let response = self.client.chat().create(body).await?;
        ::log::debug!(
            "Completion {} from {} ({} turns of context)",
            response.id,
            response.model,
            request.conversation.len()
        );

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ServiceError::EmptyResponse)?;

        Ok(ServiceResponse {
            id: response.id,
            model: response.model,
            content,
        })
    }
}

fn to_openai_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    let content = message.content.as_str();
    Ok(match message.role {
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    })
}

impl From<OpenAIError> for ServiceError {
    fn from(e: OpenAIError) -> Self {
        match e {
            OpenAIError::ApiError(api) => ServiceError::Rejected(api.message),
            OpenAIError::InvalidArgument(msg) => ServiceError::InvalidRequest(msg),
            other => ServiceError::Transport(other.to_string()),
        }
    }
}
