//! Tool: evaluate_code

use crate::define_tool;
use crate::protocol::Tool;

pub fn evaluate_code() -> Tool {
    define_tool! {
        name: "evaluate_code",
        description: "Evaluate JavaScript in the host application's context and return the result. \
            The code runs with full access to the page; async expressions are awaited. \
            Non-string results are returned as pretty-printed JSON.",
        schema: {
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "JavaScript source to evaluate"
                }
            },
            "required": ["code"]
        }
    }
}
