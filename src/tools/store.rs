//! Tools: get_store, call_store_method

use crate::define_tool;
use crate::protocol::Tool;

pub fn get_store() -> Tool {
    define_tool! {
        name: "get_store",
        description: "Look up a named state store and return a snapshot of its state \
            along with the names of the methods it exposes.",
        schema: {
            "type": "object",
            "properties": {
                "storeName": {
                    "type": "string",
                    "description": "Name of the store (e.g. 'UserStore')"
                }
            },
            "required": ["storeName"]
        }
    }
}

pub fn call_store_method() -> Tool {
    define_tool! {
        name: "call_store_method",
        description: "Invoke a method on a named state store and return its result.",
        schema: {
            "type": "object",
            "properties": {
                "storeName": {
                    "type": "string",
                    "description": "Name of the store"
                },
                "methodName": {
                    "type": "string",
                    "description": "Method to call on the store"
                },
                "args": {
                    "type": "array",
                    "description": "Positional arguments passed to the method",
                    "items": {}
                }
            },
            "required": ["storeName", "methodName"]
        }
    }
}
