//! Provider adapters: reshape the registry's tool export into a vendor's
//! wire format and relay completion requests through an injected client.
//!
//! Adapters never construct their own network clients; callers hand in
//! anything implementing [`ChatClient`].

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub mod anthropic;
pub mod openai;

pub use anthropic::{AnthropicAdapter, AnthropicConfig};
pub use openai::{OpenAiAdapter, OpenAiConfig};

/// Injected provider client. `request` is the fully built JSON body; the
/// response is returned as raw provider JSON.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send(&self, request: Value) -> Result<Value>;
}

/// Capability set shared by all provider adapters.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Free-form completion from a prompt.
    async fn generate(&self, prompt: &str) -> Result<Value>;

    /// Completion that may invoke the registered tools.
    async fn call_with_tools(&self, prompt: &str) -> Result<Value>;
}
