//! Tool: inspect_element

use crate::define_tool;
use crate::protocol::Tool;

pub fn inspect_element() -> Tool {
    define_tool! {
        name: "inspect_element",
        description: "Inspect the first DOM element matching a CSS selector. \
            Returns its tag, attributes, computed style summary and text content, \
            or `found: false` when nothing matches.",
        schema: {
            "type": "object",
            "properties": {
                "selector": {
                    "type": "string",
                    "description": "CSS selector of the element to inspect"
                }
            },
            "required": ["selector"]
        }
    }
}
