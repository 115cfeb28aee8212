use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::tools::core::dyn_tool::DynTool;
use crate::tools::core::tool::Tool;
use crate::types::ToolDefinition;

/// Errors detected when a tool is registered
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid tool name '{0}': use 1-64 letters, digits, '_' or '-'")]
    InvalidName(String),

    #[error("Tool '{0}' must declare an object parameter schema")]
    InvalidSchema(String),
}

fn tool_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid tool name regex"))
}

/// Maps tool names to their implementations for one session
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry with the weather and temperature conversion tools
    pub fn with_default_tools() -> Result<Self> {
        use crate::tools::impls::{ConvertTemperatureTool, FetchWeatherTool};

        let mut registry = Self::new();
        registry.register(FetchWeatherTool)?;
        registry.register(ConvertTemperatureTool)?;
        Ok(registry)
    }

    /// Register a tool in the registry. A tool registered under an existing
    /// name replaces the previous one.
    pub fn register<T: Tool>(&mut self, tool: T) -> Result<(), RegistryError> {
        let spec = Tool::spec(&tool);

        if !tool_name_pattern().is_match(spec.name) {
            return Err(RegistryError::InvalidName(spec.name.to_string()));
        }
        if spec.parameters_schema.get("type").and_then(|t| t.as_str()) != Some("object") {
            return Err(RegistryError::InvalidSchema(spec.name.to_string()));
        }

        if self
            .tools
            .insert(spec.name.to_string(), Box::new(tool))
            .is_some()
        {
            debug!("Replaced previously registered tool '{}'", spec.name);
        }
        Ok(())
    }

    /// Get a tool by name
    pub fn resolve(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Declarations of all registered tools, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|tool| tool.spec().to_definition())
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
