use anyhow::{anyhow, Context, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client as OpenAIClient;
use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use ollama_rs::Ollama;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

use crate::environment::{get_env_var_as_f32, get_env_var_as_f64, get_env_var_as_vec};
use crate::TARGET_LLM_REQUEST;

pub const PROVIDERS_ENV: &str = "CONSOLIDATION_PROVIDERS";
pub const THRESHOLD_ENV: &str = "CONSOLIDATION_THRESHOLD";
pub const SAME_PERSON_THRESHOLD_ENV: &str = "CONSOLIDATION_SAME_PERSON_THRESHOLD";
pub const TEMPERATURE_ENV: &str = "LLM_TEMPERATURE";

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_OLLAMA_PORT: u16 = 11434;

/// A text-completion backend. Implementations must either return the model's raw
/// text or fail; they never retry on their own.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Clone, Debug)]
pub enum LLMClient {
    Ollama(Ollama),
    OpenAI(OpenAIClient<OpenAIConfig>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    OpenAI,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Ollama => write!(f, "ollama"),
            ProviderKind::OpenAI => write!(f, "openai"),
        }
    }
}

impl ProviderKind {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Some(ProviderKind::Ollama),
            "openai" => Some(ProviderKind::OpenAI),
            _ => None,
        }
    }
}

/// One entry in the ordered provider fallback list
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Parses a `kind|endpoint|model[|api_key]` entry.
    pub fn parse(entry: &str) -> Result<Self> {
        let parts: Vec<&str> = entry.split('|').map(str::trim).collect();
        if parts.len() < 3 {
            return Err(anyhow!(
                "expected kind|endpoint|model[|api_key], got '{}'",
                entry
            ));
        }
        let kind = ProviderKind::parse(parts[0])
            .ok_or_else(|| anyhow!("unknown provider kind '{}'", parts[0]))?;
        if parts[2].is_empty() {
            return Err(anyhow!("missing model in '{}'", entry));
        }
        Ok(ProviderConfig {
            kind,
            endpoint: parts[1].to_string(),
            model: parts[2].to_string(),
            api_key: parts.get(3).filter(|k| !k.is_empty()).map(|k| k.to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    pub fn label(&self) -> String {
        format!("{}:{}", self.kind, self.model)
    }
}

/// Explicit configuration for the consolidator; nothing is read from globals.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsolidatorConfig {
    pub providers: Vec<ProviderConfig>,
    pub threshold: f64,
    pub same_person_threshold: f64,
    pub temperature: f32,
}

impl Default for ConsolidatorConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            threshold: crate::clustering::DEFAULT_SIMILARITY_THRESHOLD,
            same_person_threshold: crate::clustering::DEFAULT_SAME_PERSON_THRESHOLD,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ConsolidatorConfig {
    /// Builds a configuration from the environment. Malformed provider entries are
    /// logged and skipped.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let providers = get_env_var_as_vec(PROVIDERS_ENV, ';')
            .into_iter()
            .filter_map(|entry| match ProviderConfig::parse(&entry) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!(target: TARGET_LLM_REQUEST, "Skipping provider entry in {}: {}", PROVIDERS_ENV, e);
                    None
                }
            })
            .collect::<Vec<_>>();

        info!(
            target: TARGET_LLM_REQUEST,
            "Loaded {} consolidation provider(s) from {}",
            providers.len(),
            PROVIDERS_ENV
        );

        Self {
            providers,
            threshold: get_env_var_as_f64(THRESHOLD_ENV).unwrap_or(defaults.threshold),
            same_person_threshold: get_env_var_as_f64(SAME_PERSON_THRESHOLD_ENV)
                .unwrap_or(defaults.same_person_threshold),
            temperature: get_env_var_as_f32(TEMPERATURE_ENV).unwrap_or(defaults.temperature),
        }
    }

    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.providers.push(provider);
        self
    }
}

/// A configured backend ready to serve completions
#[derive(Clone, Debug)]
pub struct LLMParams {
    pub name: String,
    pub llm_client: LLMClient,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LLMParams {
    pub fn from_config(config: &ProviderConfig, temperature: f32) -> Result<Self> {
        let llm_client = match config.kind {
            ProviderKind::Ollama => {
                let url = Url::parse(&config.endpoint)
                    .with_context(|| format!("invalid Ollama endpoint '{}'", config.endpoint))?;
                let host = url
                    .host_str()
                    .ok_or_else(|| anyhow!("Ollama endpoint '{}' has no host", config.endpoint))?;
                let port = url.port_or_known_default().unwrap_or(DEFAULT_OLLAMA_PORT);
                LLMClient::Ollama(Ollama::new(format!("{}://{}", url.scheme(), host), port))
            }
            ProviderKind::OpenAI => {
                let mut openai_config = OpenAIConfig::new();
                if !config.endpoint.is_empty() {
                    openai_config = openai_config.with_api_base(&config.endpoint);
                }
                if let Some(key) = &config.api_key {
                    openai_config = openai_config.with_api_key(key);
                }
                LLMClient::OpenAI(OpenAIClient::with_config(openai_config))
            }
        };

        Ok(LLMParams {
            name: config.label(),
            llm_client,
            model: config.model.clone(),
            temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    async fn send(&self, prompt: &str) -> Result<String> {
        match &self.llm_client {
            LLMClient::Ollama(ollama) => {
                let request = GenerationRequest::new(self.model.clone(), prompt.to_string())
                    .options(GenerationOptions::default().temperature(self.temperature));
                let response = ollama.generate(request).await?;
                Ok(response.response)
            }
            LLMClient::OpenAI(client) => {
                let messages: Vec<ChatCompletionRequestMessage> =
                    vec![ChatCompletionRequestUserMessageArgs::default()
                        .content(prompt)
                        .build()?
                        .into()];
                let request = CreateChatCompletionRequestArgs::default()
                    .model(&self.model)
                    .temperature(self.temperature)
                    .messages(messages)
                    .build()?;
                let response = client.chat().create(request).await?;
                response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .ok_or_else(|| anyhow!("OpenAI response contained no content"))
            }
        }
    }
}

#[async_trait]
impl CompletionProvider for LLMParams {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(target: TARGET_LLM_REQUEST, "{}: sending prompt: {}", self.name, prompt);

        let response_text = match timeout(self.timeout, self.send(prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(e.context(format!("{} request failed", self.name))),
            Err(_) => {
                return Err(anyhow!(
                    "{} request timed out after {:?}",
                    self.name,
                    self.timeout
                ))
            }
        };

        if response_text.trim().is_empty() {
            return Err(anyhow!("{} returned an empty response", self.name));
        }

        debug!(target: TARGET_LLM_REQUEST, "{}: response received: {}", self.name, response_text);
        Ok(response_text)
    }
}

/// Builds the ordered provider chain described by `config`. Entries that cannot be
/// turned into a client are logged and left out.
pub fn build_providers(config: &ConsolidatorConfig) -> Vec<Arc<dyn CompletionProvider>> {
    config
        .providers
        .iter()
        .filter_map(|provider| match LLMParams::from_config(provider, config.temperature) {
            Ok(params) => Some(Arc::new(params) as Arc<dyn CompletionProvider>),
            Err(e) => {
                warn!(target: TARGET_LLM_REQUEST, "Skipping provider {}: {}", provider.label(), e);
                None
            }
        })
        .collect()
}
