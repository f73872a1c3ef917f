//! Lightweight, provider-agnostic agent wrapper over a tool registry.
//!
//! The agent owns nothing but a reference to the registry it was handed;
//! it exposes the registered tools as JSON for model adapters and invokes
//! them by name at runtime.

use anyhow::Result;
use log::debug;
use serde_json::Value;
use std::sync::Arc;
use tooling::{default_registry, RegistryError, ToolArguments, ToolModule, ToolRegistry};

pub struct Agent {
    name: String,
    description: String,
    registry: Arc<ToolRegistry>,
}

impl Agent {
    /// Wrap an explicitly supplied registry. This is the composition-root
    /// path; nothing here touches shared process state.
    pub fn new(name: impl Into<String>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            registry,
        }
    }

    /// Script convenience: wrap the process-wide default registry.
    pub fn with_default_registry(name: impl Into<String>) -> Self {
        Self::new(name, default_registry())
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Run module discovery against this agent's registry.
    pub fn discover_tools(&self, package: &dyn ToolModule) -> Result<(), RegistryError> {
        self.registry.autodiscover(package)
    }

    /// Registered tool definitions as a pretty-printed JSON array, suitable
    /// for pasting into an LLM tool list.
    pub fn available_tools_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.registry.get_json())?)
    }

    /// Invoke a registered tool by name. Errors raised by the tool itself
    /// pass through unchanged.
    pub async fn call_tool(&self, name: &str, args: ToolArguments) -> Result<Value> {
        debug!("agent '{}' calling tool '{name}'", self.name);
        self.registry.invoke(name, args).await
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.list_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tooling::{InputSchema, Property, PropertyType, ToolDefinition};

    fn registry_with_echo() -> Arc<ToolRegistry> {
        let registry = Arc::new(ToolRegistry::new());
        registry
            .register(
                ToolDefinition::builder("echo")
                    .description("Echo text back")
                    .input_schema(
                        InputSchema::builder()
                            .property("text", Property::builder(PropertyType::String))
                            .required(["text"]),
                    )
                    .sync_handler(|args| {
                        let text: String = args.get_argument("text")?;
                        Ok(json!(text))
                    })
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn should_expose_tool_names_from_injected_registry() {
        let agent = Agent::new("helper", registry_with_echo());
        assert_eq!(agent.tool_names(), ["echo"]);
    }

    #[test]
    fn should_render_available_tools_as_json() {
        let agent = Agent::new("helper", registry_with_echo()).with_description("test agent");

        let text = agent.available_tools_json().unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed[0]["name"], json!("echo"));
        assert_eq!(parsed[0]["input_schema"]["required"], json!(["text"]));
        assert_eq!(agent.description(), "test agent");
    }

    #[tokio::test]
    async fn should_call_tool_by_name() {
        let agent = Agent::new("helper", registry_with_echo());
        let args = ToolArguments::new().with_argument("text", "hi").unwrap();

        let result = agent.call_tool("echo", args).await.unwrap();
        assert_eq!(result, json!("hi"));
    }

    #[tokio::test]
    async fn should_surface_unknown_tool_name() {
        let agent = Agent::new("helper", registry_with_echo());

        let err = agent
            .call_tool("missing", ToolArguments::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn should_not_touch_default_registry_when_given_explicit_one() {
        let agent = Agent::new("isolated", registry_with_echo());

        assert!(agent.tool_names().contains(&"echo".to_string()));
        assert!(!default_registry().contains("echo"));
    }
}
