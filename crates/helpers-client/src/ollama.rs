use crate::http::{build_client, ensure_success, map_send_error, read_json};
use helpers_core::config::ModelConfig;
use helpers_core::error::AppError;
use helpers_core::models::{GenerateOptions, Message, Role};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Request body for Ollama's `/api/chat`.
///
/// API reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-chat-completion>
#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<&'a Message>,
    stream: bool,
    options: ChatOptions<'a>,
}

#[derive(Serialize, Debug, PartialEq)]
struct ChatOptions<'a> {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

/// Non-streaming `/api/chat` response.
#[derive(Deserialize, Debug)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

/// HTTP client for a local Ollama server.
///
/// Every call has two forms: an `async` one that only suspends at the network
/// wait, and a `_blocking` one that drives the same future to completion on a
/// private runtime. Both return the same values and errors.
///
/// # Examples
///
/// ```no_run
/// use helpers_client::OllamaClient;
/// use helpers_core::config::ModelConfig;
/// use helpers_core::models::GenerateOptions;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OllamaClient::new(ModelConfig::default())?;
/// let reply = client.generate("Why is the sky blue?", &GenerateOptions::default()).await?;
/// println!("{}", reply.content);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    /// Used by the blocking path. Pooled connections are bound to the runtime
    /// that opened them, so this one keeps none between calls.
    blocking_client: Client,
    chat_url: Url,
    config: ModelConfig,
}

impl OllamaClient {
    /// Creates a client for the endpoint and model in `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the endpoint is malformed.
    /// Returns `AppError::ConfigError` if the model name is blank.
    pub fn new(config: ModelConfig) -> Result<Self, AppError> {
        if config.model.trim().is_empty() {
            return Err(AppError::ConfigError("model name must not be empty".to_string()));
        }
        let mut base = Url::parse(&config.endpoint)
            .map_err(|e| AppError::InvalidUrl(format!("{}: {}", config.endpoint, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let chat_url = base
            .join("api/chat")
            .map_err(|e| AppError::InvalidUrl(e.to_string()))?;

        let client = build_client(&config.http)?;
        let blocking_client = Client::builder()
            .user_agent(config.http.user_agent.as_str())
            .timeout(config.http.timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            blocking_client,
            chat_url,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends a single user prompt and returns the assistant reply.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NetworkError` if the server is unreachable.
    /// Returns `AppError::UpstreamError` for a non-2xx response.
    /// Returns `AppError::ParseError` if the reply has no `message.content`.
    pub async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<Message, AppError> {
        self.chat(&[Message::user(prompt)], options).await
    }

    /// Sends a conversation and returns the assistant reply.
    pub async fn chat(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<Message, AppError> {
        send_chat(&self.client, &self.chat_url, &self.config, messages, options).await
    }

    /// Blocking form of [`OllamaClient::generate`].
    ///
    /// Must not be called from inside an async runtime.
    pub fn generate_blocking(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<Message, AppError> {
        self.chat_blocking(&[Message::user(prompt)], options)
    }

    /// Blocking form of [`OllamaClient::chat`].
    ///
    /// Must not be called from inside an async runtime.
    pub fn chat_blocking(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<Message, AppError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AppError::Generic(format!("Failed to start runtime: {}", e)))?;
        runtime.block_on(send_chat(
            &self.blocking_client,
            &self.chat_url,
            &self.config,
            messages,
            options,
        ))
    }

    /// Starts generation on the current runtime and returns its handle.
    ///
    /// Dropping the handle does not cancel the request; the result is discarded.
    pub fn spawn_generate(
        &self,
        prompt: impl Into<String>,
        options: GenerateOptions,
    ) -> JoinHandle<Result<Message, AppError>> {
        let client = self.clone();
        let prompt = prompt.into();
        tokio::spawn(async move { client.generate(&prompt, &options).await })
    }
}

/// Request builder, remote call and normalizer shared by both call paths.
async fn send_chat(
    client: &Client,
    url: &Url,
    config: &ModelConfig,
    messages: &[Message],
    options: &GenerateOptions,
) -> Result<Message, AppError> {
    let system = options.system.as_ref().map(Message::system);
    let body = build_request(config, system.as_ref(), messages, options);
    debug!("Ollama chat: model={} messages={}", config.model, body.messages.len());

    let resp = client
        .post(url.clone())
        .json(&body)
        .send()
        .await
        .map_err(|e| map_send_error(e, &config.http))?;

    let resp = ensure_success(resp).await?;
    let parsed: ChatResponse = read_json(resp).await?;
    let reply = normalize(parsed)?;

    info!("Ollama {} replied with {} chars", config.model, reply.content.len());
    Ok(reply)
}

fn build_request<'a>(
    config: &'a ModelConfig,
    system: Option<&'a Message>,
    messages: &'a [Message],
    options: &'a GenerateOptions,
) -> ChatRequest<'a> {
    ChatRequest {
        model: &config.model,
        messages: system.into_iter().chain(messages.iter()).collect(),
        stream: false,
        options: ChatOptions {
            temperature: options.temperature.unwrap_or(config.temperature),
            top_p: options.top_p,
            num_predict: options.num_predict,
            seed: options.seed,
            stop: &options.stop,
        },
    }
}

fn normalize(response: ChatResponse) -> Result<Message, AppError> {
    let content = response
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| AppError::ParseError("response is missing message.content".to_string()))?;
    Ok(Message::new(Role::Assistant, content))
}
