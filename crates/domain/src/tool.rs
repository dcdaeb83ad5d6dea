use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Internal tool call format (service-agnostic).
///
/// The assistant adapter converts every wire representation it receives
/// (object-style calls with pre-parsed arguments, or plain mappings with a
/// JSON-encoded `arguments` string) into this record immediately, so the
/// turn runtime never branches on representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub tool_name: String,
    /// Always a JSON object. Unparseable or non-object arguments become `{}`.
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(call_id: impl Into<String>, tool_name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(_) => arguments,
            _ => Value::Object(Default::default()),
        };
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Synthesize the acknowledgement the service expects before a run can
    /// continue: `{"status":"executed", ...arguments}`.
    pub fn acknowledge(&self) -> ToolOutput {
        let mut body = serde_json::Map::new();
        body.insert("status".into(), Value::String("executed".into()));
        if let Value::Object(args) = &self.arguments {
            for (k, v) in args {
                body.insert(k.clone(), v.clone());
            }
        }
        ToolOutput {
            tool_call_id: self.call_id.clone(),
            output: Value::Object(body).to_string(),
        }
    }
}

/// One tool result submitted back to the assistant service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}
