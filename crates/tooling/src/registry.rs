//! Keyed store of tool definitions: registration, lookup, export, removal.

use crate::schema::SchemaError;
use crate::tool::{ToolArguments, ToolDefinition, ToolHandler};
use anyhow::Result;
use log::debug;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("tool name must not be empty")]
    EmptyName,

    #[error("tool '{name}' has no handler attached")]
    MissingHandler { name: String },

    #[error("tool '{name}' is already registered")]
    DuplicateTool { name: String },

    #[error("tool '{name}' not found")]
    ToolNotFound { name: String },

    #[error("invalid input schema for tool '{name}': {source}")]
    InvalidSchema {
        name: String,
        #[source]
        source: SchemaError,
    },

    #[error("failed to discover tools from module '{module}': {source}")]
    Discovery {
        module: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Default)]
struct Inner {
    tools: HashMap<String, ToolDefinition>,
    // Registration order, used for listing and export.
    order: Vec<String>,
    // Module paths already walked by autodiscover on this registry.
    discovered: HashSet<String>,
}

/// Mapping from tool name to [`ToolDefinition`].
///
/// Populated once at startup in typical usage, then read from many
/// concurrent contexts; reads share the lock, writes serialize the
/// duplicate check and insert.
pub struct ToolRegistry {
    inner: RwLock<Inner>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Store a definition under its name. Returns the stored handler
    /// unchanged so call sites can keep using it directly.
    ///
    /// A duplicate name fails without touching registry state.
    pub fn register(&self, definition: ToolDefinition) -> Result<ToolHandler, RegistryError> {
        let name = definition.name().to_string();
        let mut inner = self.inner.write().unwrap();

        if inner.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool { name });
        }

        let handler = definition.handler().clone();
        inner.order.push(name.clone());
        inner.tools.insert(name.clone(), definition);
        debug!("registered tool '{name}'");

        Ok(handler)
    }

    /// One-call registration in the shape
    /// `(name, description, input_schema, handler)`. Schema failures are
    /// reported with the tool name attached.
    pub fn register_with(
        &self,
        name: &str,
        description: Option<&str>,
        input_schema: Option<crate::schema::InputSchemaBuilder>,
        handler: ToolHandler,
    ) -> Result<ToolHandler, RegistryError> {
        let mut builder = ToolDefinition::builder(name).handler(handler);
        if let Some(description) = description {
            builder = builder.description(description);
        }
        if let Some(schema) = input_schema {
            builder = builder.input_schema(schema);
        }
        self.register(builder.build()?)
    }

    /// Clone of the stored definition for `name`.
    pub fn get(&self, name: &str) -> Result<ToolDefinition, RegistryError> {
        let inner = self.inner.read().unwrap();
        inner
            .tools
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ToolNotFound {
                name: name.to_string(),
            })
    }

    /// The handler stored for `name`. The error echoes the requested name.
    pub fn get_handler(&self, name: &str) -> Result<ToolHandler, RegistryError> {
        Ok(self.get(name)?.handler().clone())
    }

    /// Full name-to-definition mapping as a defensive copy; mutating the
    /// result never affects registry state.
    pub fn get_all(&self) -> HashMap<String, ToolDefinition> {
        self.inner.read().unwrap().tools.clone()
    }

    /// Registered names in registration order.
    pub fn list_names(&self) -> Vec<String> {
        self.inner.read().unwrap().order.clone()
    }

    /// Provider-agnostic export: one entry per tool, in registration order,
    /// shaped `{"name", "description", "input_schema"?}`. Provider-specific
    /// reshaping belongs to adapters.
    pub fn get_json(&self) -> Vec<Value> {
        let inner = self.inner.read().unwrap();
        inner
            .order
            .iter()
            .filter_map(|name| inner.tools.get(name))
            .map(ToolDefinition::export_json)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().unwrap().tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().tools.is_empty()
    }

    /// Remove one tool, returning its definition if it was present.
    pub fn remove(&self, name: &str) -> Option<ToolDefinition> {
        let mut inner = self.inner.write().unwrap();
        let removed = inner.tools.remove(name);
        if removed.is_some() {
            inner.order.retain(|n| n != name);
            debug!("removed tool '{name}'");
        }
        removed
    }

    /// Reset all state, including the record of discovered modules.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.tools.clear();
        inner.order.clear();
        inner.discovered.clear();
        debug!("cleared tool registry");
    }

    /// Look up `name` and invoke its handler. Failures raised by the tool
    /// itself are returned verbatim, never reinterpreted.
    pub async fn invoke(&self, name: &str, args: ToolArguments) -> Result<Value> {
        let handler = self.get_handler(name)?;
        handler.invoke(args).await
    }

    /// Record a module path as walked; false if it was already known.
    pub(crate) fn mark_discovered(&self, path: &str) -> bool {
        self.inner.write().unwrap().discovered.insert(path.to_string())
    }

    /// Forget a module path, used when its registration hook failed.
    pub(crate) fn unmark_discovered(&self, path: &str) {
        self.inner.write().unwrap().discovered.remove(path);
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_REGISTRY: Lazy<Arc<ToolRegistry>> = Lazy::new(|| Arc::new(ToolRegistry::new()));

/// Process-wide shared registry, for scripts and small binaries that do not
/// wire up their own instance. Library code should take a registry
/// explicitly instead of reaching for this.
pub fn default_registry() -> Arc<ToolRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{InputSchema, Property, PropertyType};
    use serde_json::json;

    fn add_tool() -> ToolDefinition {
        ToolDefinition::builder("add")
            .description("Adds two integers")
            .input_schema(
                InputSchema::builder()
                    .property("a", Property::builder(PropertyType::Integer))
                    .property("b", Property::builder(PropertyType::Integer))
                    .required(["a", "b"]),
            )
            .sync_handler(|args| {
                let a: i64 = args.get_argument("a")?;
                let b: i64 = args.get_argument("b")?;
                Ok(json!(a + b))
            })
            .build()
            .unwrap()
    }

    fn named_tool(name: &str) -> ToolDefinition {
        ToolDefinition::builder(name)
            .sync_handler(|_| Ok(json!(null)))
            .build()
            .unwrap()
    }

    #[test]
    fn should_create_empty_registry() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.len(), 0);
        assert!(registry.is_empty());
        assert!(registry.list_names().is_empty());
        assert!(registry.get_json().is_empty());
    }

    #[test]
    fn should_register_and_look_up_tool() {
        let registry = ToolRegistry::new();
        registry.register(add_tool()).unwrap();

        assert!(registry.contains("add"));
        let def = registry.get("add").unwrap();
        assert_eq!(def.description(), "Adds two integers");
    }

    #[test]
    fn should_return_stored_handler_from_register() {
        let registry = ToolRegistry::new();
        let returned = registry.register(add_tool()).unwrap();
        let stored = registry.get_handler("add").unwrap();

        assert!(returned.same_handler(&stored));
    }

    #[test]
    fn should_fail_on_duplicate_registration_and_keep_first() {
        let registry = ToolRegistry::new();
        let first = registry.register(add_tool()).unwrap();

        let second = ToolDefinition::builder("add")
            .sync_handler(|_| Ok(json!("imposter")))
            .build()
            .unwrap();
        let err = registry.register(second).unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateTool { ref name } if name == "add"));
        assert_eq!(registry.len(), 1);
        assert!(registry.get_handler("add").unwrap().same_handler(&first));
    }

    #[test]
    fn should_echo_requested_name_in_not_found_error() {
        let registry = ToolRegistry::new();

        let err = registry.get_handler("missing").unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert!(!err.to_string().contains("None"));

        let err = registry.get_handler("another_name").unwrap_err();
        assert!(err.to_string().contains("another_name"));
    }

    #[test]
    fn should_list_names_in_registration_order() {
        let registry = ToolRegistry::new();
        registry.register(named_tool("a")).unwrap();
        registry.register(named_tool("b")).unwrap();
        registry.register(named_tool("c")).unwrap();

        assert_eq!(registry.list_names(), ["a", "b", "c"]);
    }

    #[test]
    fn should_clear_registry() {
        let registry = ToolRegistry::new();
        registry.register(named_tool("a")).unwrap();
        registry.register(named_tool("b")).unwrap();

        registry.clear();

        assert!(registry.list_names().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn should_remove_single_tool() {
        let registry = ToolRegistry::new();
        registry.register(named_tool("a")).unwrap();
        registry.register(named_tool("b")).unwrap();

        let removed = registry.remove("a").unwrap();
        assert_eq!(removed.name(), "a");
        assert!(!registry.contains("a"));
        assert_eq!(registry.list_names(), ["b"]);

        assert!(registry.remove("a").is_none());
    }

    #[test]
    fn should_return_defensive_copy_from_get_all() {
        let registry = ToolRegistry::new();
        registry.register(named_tool("a")).unwrap();

        let mut all = registry.get_all();
        all.remove("a");

        assert!(registry.contains("a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_export_add_tool_scenario() {
        let registry = ToolRegistry::new();
        registry.register(add_tool()).unwrap();

        let exported = registry.get_json();
        assert_eq!(exported.len(), 1);

        let entry = &exported[0];
        assert_eq!(entry["name"], json!("add"));
        assert_eq!(entry["description"], json!("Adds two integers"));
        assert_eq!(entry["input_schema"]["type"], json!("object"));
        assert_eq!(
            entry["input_schema"]["properties"]["a"]["type"],
            json!("integer")
        );
        assert_eq!(
            entry["input_schema"]["properties"]["b"]["type"],
            json!("integer")
        );
        assert_eq!(entry["input_schema"]["required"], json!(["a", "b"]));
    }

    #[test]
    fn should_omit_schema_for_schemaless_tool() {
        let registry = ToolRegistry::new();
        registry.register(named_tool("bare")).unwrap();

        let entry = &registry.get_json()[0];
        assert_eq!(entry["description"], json!("No description provided"));
        assert!(entry.get("input_schema").is_none());
    }

    #[test]
    fn should_round_trip_nested_schema_through_export() {
        let element = Property::builder(PropertyType::Object)
            .property("id", Property::new(PropertyType::Integer).unwrap())
            .property("label", Property::new(PropertyType::String).unwrap())
            .required(["id"])
            .build()
            .unwrap();

        let registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::builder("batch")
                    .input_schema(
                        InputSchema::builder()
                            .property(
                                "records",
                                Property::builder(PropertyType::Array).items(element),
                            )
                            .required(["records"]),
                    )
                    .sync_handler(|_| Ok(json!(null)))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        // Parse the export back and check the documented shape survives.
        let text = serde_json::to_string(&registry.get_json()).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        let schema = &parsed[0]["input_schema"];

        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["required"], json!(["records"]));
        let items = &schema["properties"]["records"]["items"];
        assert_eq!(items["type"], json!("object"));
        assert_eq!(items["properties"]["id"]["type"], json!("integer"));
        assert_eq!(items["properties"]["label"]["type"], json!("string"));
        assert_eq!(items["required"], json!(["id"]));
    }

    #[test]
    fn should_register_through_register_with() {
        let registry = ToolRegistry::new();
        registry
            .register_with(
                "upper",
                Some("Convert text to uppercase"),
                Some(
                    InputSchema::builder()
                        .property(
                            "text",
                            Property::builder(PropertyType::String).description("input text"),
                        )
                        .required(["text"]),
                ),
                ToolHandler::from_fn(|args| {
                    let text: String = args.get_argument("text")?;
                    Ok(json!(text.to_uppercase()))
                }),
            )
            .unwrap();

        assert!(registry.contains("upper"));
        let entry = &registry.get_json()[0];
        assert_eq!(entry["description"], json!("Convert text to uppercase"));
    }

    #[test]
    fn should_report_tool_name_for_bad_schema_in_register_with() {
        let registry = ToolRegistry::new();
        let err = registry
            .register_with(
                "broken",
                None,
                Some(
                    InputSchema::builder()
                        .property("xs", Property::builder(PropertyType::Array)),
                ),
                ToolHandler::from_fn(|_| Ok(json!(null))),
            )
            .unwrap_err();

        assert!(matches!(err, RegistryError::InvalidSchema { ref name, .. } if name == "broken"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn should_invoke_registered_tool() {
        let registry = ToolRegistry::new();
        registry.register(add_tool()).unwrap();

        let args = ToolArguments::new()
            .with_argument("a", 2)
            .unwrap()
            .with_argument("b", 3)
            .unwrap();

        let result = registry.invoke("add", args).await.unwrap();
        assert_eq!(result, json!(5));
    }

    #[tokio::test]
    async fn should_invoke_async_tool() {
        let registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::builder("delayed_double")
                    .async_handler(|args: ToolArguments| async move {
                        let n: i64 = args.get_argument("n")?;
                        Ok(json!(n * 2))
                    })
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let args = ToolArguments::new().with_argument("n", 8).unwrap();
        let result = registry.invoke("delayed_double", args).await.unwrap();
        assert_eq!(result, json!(16));
    }

    #[tokio::test]
    async fn should_surface_not_found_from_invoke() {
        let registry = ToolRegistry::new();
        let err = registry
            .invoke("missing", ToolArguments::new())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn should_propagate_tool_failure_from_invoke() {
        let registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::builder("faulty")
                    .sync_handler(|_| anyhow::bail!("disk on fire"))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let err = registry
            .invoke("faulty", ToolArguments::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn should_allow_concurrent_reads() {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(add_tool()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(registry.list_names(), ["add"]);
                        assert!(registry.get_handler("add").is_ok());
                        assert_eq!(registry.get_json().len(), 1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn should_share_one_default_registry() {
        let a = default_registry();
        let b = default_registry();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
