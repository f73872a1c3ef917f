use crate::registry::RegistryError;
use crate::schema::{InputSchema, InputSchemaBuilder};
use anyhow::Result;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

const DEFAULT_DESCRIPTION: &str = "No description provided";

/// Named JSON arguments passed to a tool handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments {
    values: HashMap<String, Value>,
}

impl ToolArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build arguments from a provider tool-call payload, which must be a
    /// JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            other => anyhow::bail!("tool arguments must be a JSON object, got {other}"),
        }
    }

    pub fn with_argument<T: Serialize>(mut self, key: &str, value: T) -> Result<Self> {
        let json_value = serde_json::to_value(value)?;
        self.values.insert(key.to_string(), json_value);
        Ok(self)
    }

    pub fn get_argument<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("argument '{key}' not found"))?;

        let result: T = serde_json::from_value(value.clone())?;
        Ok(result)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

type SyncFn = dyn Fn(ToolArguments) -> Result<Value> + Send + Sync;
type AsyncFn = dyn Fn(ToolArguments) -> BoxFuture<'static, Result<Value>> + Send + Sync;

/// The invocable attached to a tool: either a plain function or one that
/// suspends. `invoke` dispatches on the variant and awaits only the latter;
/// failures from the handler itself pass through untouched.
#[derive(Clone)]
pub enum ToolHandler {
    Sync(Arc<SyncFn>),
    Async(Arc<AsyncFn>),
}

impl ToolHandler {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(ToolArguments) -> Result<Value> + Send + Sync + 'static,
    {
        ToolHandler::Sync(Arc::new(f))
    }

    pub fn from_async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        ToolHandler::Async(Arc::new(move |args| Box::pin(f(args))))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, ToolHandler::Async(_))
    }

    pub async fn invoke(&self, args: ToolArguments) -> Result<Value> {
        match self {
            ToolHandler::Sync(f) => f(args),
            ToolHandler::Async(f) => f(args).await,
        }
    }

    /// Whether two handles refer to the same underlying function.
    pub fn same_handler(&self, other: &Self) -> bool {
        match (self, other) {
            (ToolHandler::Sync(a), ToolHandler::Sync(b)) => Arc::ptr_eq(a, b),
            (ToolHandler::Async(a), ToolHandler::Async(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ToolHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolHandler::Sync(_) => f.write_str("ToolHandler::Sync"),
            ToolHandler::Async(_) => f.write_str("ToolHandler::Async"),
        }
    }
}

/// Immutable record describing one registered tool.
///
/// Built once through [`ToolDefinition::builder`] and never mutated;
/// replacing a tool means removing it from the registry and re-adding.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    name: String,
    description: String,
    input_schema: Option<InputSchema>,
    handler: ToolHandler,
}

impl ToolDefinition {
    pub fn builder(name: impl Into<String>) -> ToolDefinitionBuilder {
        ToolDefinitionBuilder {
            name: name.into(),
            description: None,
            input_schema: None,
            handler: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> Option<&InputSchema> {
        self.input_schema.as_ref()
    }

    pub fn handler(&self) -> &ToolHandler {
        &self.handler
    }

    /// The provider-agnostic export entry for this tool. An absent schema
    /// is omitted rather than serialized as null.
    pub fn export_json(&self) -> Value {
        match &self.input_schema {
            Some(schema) => json!({
                "name": self.name,
                "description": self.description,
                "input_schema": schema,
            }),
            None => json!({
                "name": self.name,
                "description": self.description,
            }),
        }
    }
}

pub struct ToolDefinitionBuilder {
    name: String,
    description: Option<String>,
    input_schema: Option<InputSchemaBuilder>,
    handler: Option<ToolHandler>,
}

impl ToolDefinitionBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Schema construction is deferred to `build` so a schema failure can
    /// carry the tool name.
    pub fn input_schema(mut self, schema: InputSchemaBuilder) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn handler(mut self, handler: ToolHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn sync_handler<F>(self, f: F) -> Self
    where
        F: Fn(ToolArguments) -> Result<Value> + Send + Sync + 'static,
    {
        self.handler(ToolHandler::from_fn(f))
    }

    pub fn async_handler<F, Fut>(self, f: F) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.handler(ToolHandler::from_async_fn(f))
    }

    pub fn build(self) -> Result<ToolDefinition, RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let handler = self.handler.ok_or_else(|| RegistryError::MissingHandler {
            name: self.name.clone(),
        })?;

        let input_schema = match self.input_schema {
            Some(builder) => Some(builder.build().map_err(|source| {
                RegistryError::InvalidSchema {
                    name: self.name.clone(),
                    source,
                }
            })?),
            None => None,
        };

        Ok(ToolDefinition {
            name: self.name,
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            input_schema,
            handler,
        })
    }
}
