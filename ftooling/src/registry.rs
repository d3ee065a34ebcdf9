//! Tool registry keyed by tool name, validated at registration time.
//!
//! ```rust
//! use fprovider::ToolDefinition;
//! use ftooling::{ToolErrorKind, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register_sync_fn(
//!         ToolDefinition::new("echo", "Echoes input", r#"{"type":"object"}"#),
//!         |args, _ctx| Ok(args),
//!     )
//!     .expect("first registration should succeed");
//!
//! let duplicate = registry
//!     .register_sync_fn(
//!         ToolDefinition::new("echo", "Echoes input again", "{}"),
//!         |args, _ctx| Ok(args),
//!     )
//!     .expect_err("duplicate names are rejected");
//! assert_eq!(duplicate.kind, ToolErrorKind::Registration);
//! ```

use std::future::Future;
use std::sync::Arc;

use fcommon::Registry;
use fprovider::ToolDefinition;
use serde_json::Value;

use crate::{FunctionTool, Tool, ToolError, ToolExecutionContext};

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T) -> Result<(), ToolError>
    where
        T: Tool + 'static,
    {
        self.register_shared(Arc::new(tool))
    }

    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let definition = tool.definition();
        validate_definition(&definition)?;

        if self.tools.contains_key(definition.name.as_str()) {
            return Err(ToolError::registration(format!(
                "tool '{}' is already registered",
                definition.name
            ))
            .with_tool_name(definition.name));
        }

        self.tools.insert(definition.name, tool);
        Ok(())
    }

    pub fn register_fn<F, Fut>(&mut self, definition: ToolDefinition, handler: F) -> Result<(), ToolError>
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(definition, handler))
    }

    pub fn register_sync_fn<F>(&mut self, definition: ToolDefinition, handler: F) -> Result<(), ToolError>
    where
        F: Fn(Value, ToolExecutionContext) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.register_fn(definition, move |args, context| {
            let output = handler(args, context);
            async move { output }
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn validate_definition(definition: &ToolDefinition) -> Result<(), ToolError> {
    if definition.name.trim().is_empty() {
        return Err(ToolError::registration("tool name must not be empty"));
    }

    if definition.name.chars().any(char::is_whitespace) {
        return Err(ToolError::registration(format!(
            "tool name '{}' must not contain whitespace",
            definition.name
        )));
    }

    let schema = serde_json::from_str::<Value>(&definition.parameter_schema).map_err(|err| {
        ToolError::registration(format!(
            "parameter schema for '{}' is not valid JSON: {err}",
            definition.name
        ))
        .with_tool_name(definition.name.clone())
    })?;

    if !schema.is_object() {
        return Err(ToolError::registration(format!(
            "parameter schema for '{}' must be a JSON object",
            definition.name
        ))
        .with_tool_name(definition.name.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ToolErrorKind;

    fn echo_definition(name: &str, schema: &str) -> ToolDefinition {
        ToolDefinition::new(name, "Echoes arguments", schema)
    }

    #[test]
    fn registry_tracks_registered_tools_in_name_order() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry
            .register_sync_fn(echo_definition("translate", "{}"), |args, _| Ok(args))
            .expect("translate should register");
        registry
            .register_sync_fn(echo_definition("search_internet", "{}"), |args, _| Ok(args))
            .expect("search should register");

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("translate"));
        let names = registry
            .definitions()
            .into_iter()
            .map(|definition| definition.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["search_internet", "translate"]);
    }

    #[test]
    fn invalid_definitions_are_rejected() {
        let mut registry = ToolRegistry::new();

        for (name, schema) in [("", "{}"), ("two words", "{}"), ("bad", "{oops"), ("list", "[1]")] {
            let error = registry
                .register_sync_fn(echo_definition(name, schema), |_, _| Ok(json!(null)))
                .expect_err("definition should be rejected");
            assert_eq!(error.kind, ToolErrorKind::Registration, "{name}");
        }

        assert!(registry.is_empty());
    }
}
