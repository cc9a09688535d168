//! Invocation requests embedded in model replies.
//!
//! Two shapes are recognized:
//!
//! ```text
//! <tool_call>{"name": "set_appointment", "arguments": {...}}</tool_call>
//! <function=set_appointment>{...}</function>
//! ```
//!
//! The second is what Llama-family models emit when they fall back to their
//! native format; the closing tag is frequently missing.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Plain answer for the user.
    Final(String),
    /// The model wants an operation run before it answers.
    Invoke(ToolCall),
}

fn tagged_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<tool_call>\s*(\{.*?\})\s*(?:</tool_call>|$)").expect("valid regex")
    })
}

fn function_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<function=([A-Za-z_][A-Za-z0-9_]*)>\s*(\{.*?\})?\s*(?:</function>|$)")
            .expect("valid regex")
    })
}

/// Whether the text still carries invocation markup.
pub fn contains_payload(text: &str) -> bool {
    text.contains("<tool_call>") || text.contains("<function=")
}

/// Splits a reply into either a final answer or the first invocation it carries.
pub fn parse_reply(text: &str) -> Reply {
    match extract(text) {
        Some(call) => Reply::Invoke(call),
        None => Reply::Final(text.trim().to_string()),
    }
}

/// Decodes the first invocation found in `text`, if any is well-formed.
pub fn extract(text: &str) -> Option<ToolCall> {
    extract_tagged(text).or_else(|| extract_function(text))
}

fn extract_tagged(text: &str) -> Option<ToolCall> {
    let caps = tagged_pattern().captures(text)?;
    let body: Value = serde_json::from_str(caps.get(1)?.as_str()).ok()?;
    let name = body.get("name")?.as_str()?.to_string();
    let arguments = body
        .get("arguments")
        .or_else(|| body.get("parameters"))
        .cloned()
        .unwrap_or(Value::Null);
    Some(ToolCall {
        name,
        arguments: decode_nested(arguments),
    })
}

fn extract_function(text: &str) -> Option<ToolCall> {
    let caps = function_pattern().captures(text)?;
    let name = caps.get(1)?.as_str().to_string();
    let arguments = match caps.get(2) {
        Some(m) => serde_json::from_str(m.as_str()).ok()?,
        None => Value::Object(Default::default()),
    };
    Some(ToolCall { name, arguments })
}

/// Removes invocation markup, leaving whatever prose surrounded it.
pub fn strip_payload(text: &str) -> String {
    let without_tagged = tagged_pattern().replace_all(text, "");
    let without_function = function_pattern().replace_all(&without_tagged, "");
    without_function
        .replace("<tool_call>", "")
        .replace("</tool_call>", "")
        .trim()
        .to_string()
}

// Some models send the arguments object JSON-encoded inside a string.
fn decode_nested(arguments: Value) -> Value {
    match arguments {
        Value::String(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
        other => other,
    }
}
