use crate::{Adapter, ChatClient};
use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};
use std::sync::Arc;
use tooling::ToolRegistry;

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub model: String,
    pub max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 1024,
        }
    }
}

/// Adapter for the Anthropic Messages API shape. The registry export is
/// already the shape Anthropic expects under `tools`, so it is passed
/// through verbatim.
pub struct AnthropicAdapter<C: ChatClient> {
    client: C,
    registry: Arc<ToolRegistry>,
    config: AnthropicConfig,
}

impl<C: ChatClient> AnthropicAdapter<C> {
    pub fn new(client: C, registry: Arc<ToolRegistry>) -> Self {
        Self::with_config(client, registry, AnthropicConfig::default())
    }

    pub fn with_config(client: C, registry: Arc<ToolRegistry>, config: AnthropicConfig) -> Self {
        Self {
            client,
            registry,
            config,
        }
    }

    fn base_request(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        })
    }
}

#[async_trait]
impl<C: ChatClient> Adapter for AnthropicAdapter<C> {
    async fn generate(&self, prompt: &str) -> Result<Value> {
        debug!("anthropic generate with model '{}'", self.config.model);
        self.client.send(self.base_request(prompt)).await
    }

    async fn call_with_tools(&self, prompt: &str) -> Result<Value> {
        let mut request = self.base_request(prompt);
        request["tools"] = Value::Array(self.registry.get_json());
        debug!(
            "anthropic tool call with {} tools",
            request["tools"].as_array().map_or(0, Vec::len)
        );
        self.client.send(request).await
    }
}
