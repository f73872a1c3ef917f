pub mod discover;
pub mod registry;
pub mod schema;
pub mod tool;

pub use discover::ToolModule;
pub use registry::{default_registry, RegistryError, ToolRegistry};
pub use schema::{
    InputSchema, InputSchemaBuilder, Property, PropertyBuilder, PropertyType, SchemaError,
};
pub use tool::{ToolArguments, ToolDefinition, ToolDefinitionBuilder, ToolHandler};
