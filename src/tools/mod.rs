//! MCP tool definitions and registry.
//!
//! Tools are executed by the host's execution context; this crate only
//! describes them and forwards calls through the bridge.

pub mod code;
pub mod discovery;
pub mod dom;
pub mod registry;
pub mod store;

pub use registry::ToolRegistry;

/// Create the registry with the built-in catalogue.
///
/// Order here is the order `tools/list` reports.
pub fn create_registry() -> ToolRegistry {
    ToolRegistry::from_tools([
        code::evaluate_code(),
        store::get_store(),
        store::call_store_method(),
        discovery::find_module(),
        discovery::search_variables(),
        dom::inspect_element(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_order() {
        let registry = create_registry();
        let names: Vec<_> = registry.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "evaluate_code",
                "get_store",
                "call_store_method",
                "find_module",
                "search_variables",
                "inspect_element",
            ]
        );
    }

    #[test]
    fn test_schemas_declare_required_params() {
        let registry = create_registry();
        for tool in registry.list() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            let required = tool.input_schema["required"].as_array().unwrap();
            assert!(!required.is_empty(), "{} has no required params", tool.name);
            for param in required {
                let param = param.as_str().unwrap();
                assert!(
                    tool.input_schema["properties"].get(param).is_some(),
                    "{} requires undeclared param {}",
                    tool.name,
                    param
                );
            }
        }
    }

    #[test]
    fn test_call_store_method_schema() {
        let registry = create_registry();
        let tool = registry.get("call_store_method").unwrap();
        assert_eq!(
            tool.input_schema["required"],
            serde_json::json!(["storeName", "methodName"])
        );
        assert_eq!(tool.input_schema["properties"]["args"]["type"], "array");
    }
}
