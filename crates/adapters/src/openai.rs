use crate::{Adapter, ChatClient};
use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};
use std::sync::Arc;
use tooling::ToolRegistry;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Adapter for the OpenAI chat-completions shape. OpenAI wants each tool
/// wrapped in a `function` object with the schema under `parameters`, so
/// the registry export is reshaped entry by entry.
pub struct OpenAiAdapter<C: ChatClient> {
    client: C,
    registry: Arc<ToolRegistry>,
    config: OpenAiConfig,
}

impl<C: ChatClient> OpenAiAdapter<C> {
    pub fn new(client: C, registry: Arc<ToolRegistry>) -> Self {
        Self::with_config(client, registry, OpenAiConfig::default())
    }

    pub fn with_config(client: C, registry: Arc<ToolRegistry>, config: OpenAiConfig) -> Self {
        Self {
            client,
            registry,
            config,
        }
    }

    fn base_request(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
        })
    }

    fn reshape_tool(entry: &Value) -> Value {
        // Tools without a declared schema still need a parameters object.
        let parameters = entry
            .get("input_schema")
            .cloned()
            .unwrap_or_else(|| json!({"type": "object", "properties": {}, "required": []}));

        json!({
            "type": "function",
            "function": {
                "name": entry["name"],
                "description": entry["description"],
                "parameters": parameters,
            },
        })
    }
}

#[async_trait]
impl<C: ChatClient> Adapter for OpenAiAdapter<C> {
    async fn generate(&self, prompt: &str) -> Result<Value> {
        debug!("openai generate with model '{}'", self.config.model);
        self.client.send(self.base_request(prompt)).await
    }

    async fn call_with_tools(&self, prompt: &str) -> Result<Value> {
        let tools: Vec<Value> = self
            .registry
            .get_json()
            .iter()
            .map(Self::reshape_tool)
            .collect();

        let mut request = self.base_request(prompt);
        debug!("openai tool call with {} tools", tools.len());
        request["tools"] = Value::Array(tools);
        self.client.send(request).await
    }
}
