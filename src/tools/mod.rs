//! Function tools offered to the model during a chat turn.
//!
//! Nothing is persisted; a recorded lead or unanswered question becomes a log
//! line the operator can pick up.

use crate::llm::chat::ToolCall;
use log::{ info, warn };
use serde::Deserialize;
use serde_json::{ json, Value };

pub const RECORD_USER_DETAILS: &str = "record_user_details";
pub const RECORD_UNKNOWN_QUESTION: &str = "record_unknown_question";

#[derive(Deserialize, Debug)]
struct UserDetails {
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize, Debug)]
struct UnknownQuestion {
    question: String,
}

/// JSON function definitions in the chat-completions `tools` format.
pub fn definitions() -> Vec<Value> {
    vec![
        json!({
            "type": "function",
            "function": {
                "name": RECORD_USER_DETAILS,
                "description": "Record user contact details when they're interested in getting in touch",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "email": { "type": "string", "description": "User's email" },
                        "name": { "type": "string", "description": "User's name" },
                        "notes": { "type": "string", "description": "Conversation context" }
                    },
                    "required": ["email"],
                    "additionalProperties": false
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": RECORD_UNKNOWN_QUESTION,
                "description": "Record questions that couldn't be answered",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "question": { "type": "string", "description": "The unanswered question" }
                    },
                    "required": ["question"],
                    "additionalProperties": false
                }
            }
        })
    ]
}

/// Runs one tool call and returns the JSON string handed back to the model.
/// Failures are reported to the model as `{"error": ...}` rather than aborting the turn.
pub fn execute(call: &ToolCall, user_id: &str) -> String {
    info!("Tool called: {} (call id {})", call.function.name, call.id);
    let result = match call.function.name.as_str() {
        RECORD_USER_DETAILS =>
            parse_args::<UserDetails>(&call.function.arguments).map(|details| {
                info!(
                    "Lead captured: user_id={}, email={}, name={}, notes={}",
                    user_id,
                    details.email,
                    details.name.as_deref().unwrap_or("Not provided"),
                    details.notes.as_deref().unwrap_or("")
                );
                json!({ "recorded": "ok", "email": details.email })
            }),
        RECORD_UNKNOWN_QUESTION =>
            parse_args::<UnknownQuestion>(&call.function.arguments).map(|q| {
                info!("Unknown question: user_id={}, question={}", user_id, q.question);
                json!({ "recorded": "ok" })
            }),
        other => {
            warn!("Model asked for unknown tool '{}'", other);
            Err(format!("Unknown tool: {}", other))
        }
    };

    match result {
        Ok(value) => value.to_string(),
        Err(message) => json!({ "error": message }).to_string(),
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: &str) -> Result<T, String> {
    let raw = if arguments.trim().is_empty() { "{}" } else { arguments };
    serde_json::from_str(raw).map_err(|e| format!("Invalid tool arguments: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::FunctionCall;

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".into(),
            kind: "function".into(),
            function: FunctionCall { name: name.into(), arguments: arguments.into() },
        }
    }

    fn result(call: &ToolCall) -> Value {
        serde_json::from_str(&execute(call, "visitor-7")).unwrap()
    }

    #[test]
    fn definitions_name_both_tools() {
        let names: Vec<_> = definitions()
            .iter()
            .map(|d| d["function"]["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec![RECORD_USER_DETAILS, RECORD_UNKNOWN_QUESTION]);
    }

    #[test]
    fn records_user_details() {
        let out = result(&call(RECORD_USER_DETAILS, r#"{"email":"a@b.co","name":"Bo"}"#));
        assert_eq!(out, json!({ "recorded": "ok", "email": "a@b.co" }));
    }

    #[test]
    fn records_unknown_question() {
        let out = result(&call(RECORD_UNKNOWN_QUESTION, r#"{"question":"Favourite editor?"}"#));
        assert_eq!(out, json!({ "recorded": "ok" }));
    }

    #[test]
    fn missing_required_argument_is_reported_to_the_model() {
        let out = result(&call(RECORD_USER_DETAILS, r#"{"name":"Bo"}"#));
        assert!(out["error"].as_str().unwrap().starts_with("Invalid tool arguments"));
    }

    #[test]
    fn unknown_tool_is_reported_to_the_model() {
        let out = result(&call("launch_rockets", "{}"));
        assert_eq!(out, json!({ "error": "Unknown tool: launch_rockets" }));
    }
}
