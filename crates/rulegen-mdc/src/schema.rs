//! Rule document schema required from the synthesis service

use serde::{Deserialize, Serialize};

/// The four-field rule document the synthesis service must return.
///
/// Deserialization doubles as schema validation: a response missing any
/// field (or with wrong types) is a schema violation for the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDoc {
    /// Short descriptive name for the rule
    pub name: String,
    /// Glob pattern selecting the files the rule applies to
    pub glob_pattern: String,
    /// 1-2 sentence description of what the rule covers
    pub description: String,
    /// Rule body in markdown
    pub content: String,
}

/// JSON response-format constraint sent with the completion request.
pub fn response_format() -> serde_json::Value {
    serde_json::json!({
        "type": "json_object",
        "schema": {
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Short descriptive name for the rule"
                },
                "glob_pattern": {
                    "type": "string",
                    "description": "Valid glob pattern for target files"
                },
                "description": {
                    "type": "string",
                    "description": "1-2 sentence description of what the rule does"
                },
                "content": {
                    "type": "string",
                    "description": "Formatted rule content using markdown"
                }
            },
            "required": ["name", "glob_pattern", "description", "content"]
        }
    })
}
