//! Immutable, ordered tool registry.

use crate::protocol::Tool;
use tracing::debug;

/// Catalogue of tool descriptors. Built once, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    /// Build a registry from descriptors in declaration order.
    ///
    /// A later descriptor with a name already present is ignored so names stay
    /// unique.
    pub fn from_tools(tools: impl IntoIterator<Item = Tool>) -> Self {
        let mut registry = Vec::new();
        for tool in tools {
            if registry.iter().any(|t: &Tool| t.name == tool.name) {
                debug!("Ignoring duplicate tool: {}", tool.name);
                continue;
            }
            debug!("Registering tool: {}", tool.name);
            registry.push(tool);
        }
        Self { tools: registry }
    }

    pub fn list(&self) -> &[Tool] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[macro_export]
macro_rules! define_tool {
    (
        name: $name:expr,
        description: $desc:expr,
        schema: $schema:tt
    ) => {
        $crate::protocol::Tool {
            name: $name.into(),
            description: $desc.into(),
            input_schema: ::serde_json::json!($schema),
        }
    };
}
