//! Tools: find_module, search_variables

use crate::define_tool;
use crate::protocol::Tool;

pub fn find_module() -> Tool {
    define_tool! {
        name: "find_module",
        description: "Locate a loaded module whose exports contain every listed property. \
            Returns the module id and its export keys.",
        schema: {
            "type": "object",
            "properties": {
                "props": {
                    "type": "array",
                    "description": "Property names the module must export",
                    "items": { "type": "string" }
                }
            },
            "required": ["props"]
        }
    }
}

pub fn search_variables() -> Tool {
    define_tool! {
        name: "search_variables",
        description: "Recursively search the global object graph for keys matching a query. \
            Returns the paths of matching values.",
        schema: {
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Case-insensitive substring matched against property names"
                },
                "maxDepth": {
                    "type": "integer",
                    "description": "Maximum traversal depth (default: 3)"
                }
            },
            "required": ["query"]
        }
    }
}
