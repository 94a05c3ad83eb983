use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct FunctionCallFn {
    pub arguments: String,
    pub name: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct FunctionCall {
    pub function: FunctionCallFn,
    pub id: String,
    pub r#type: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Message {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<FunctionCall>>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: Some(content.to_string()),
            tool_calls: None,
        }
    }
}

#[derive(Serialize)]
pub struct Property {
    pub r#type: String,
    pub description: String,
}

impl Property {
    pub fn new(r#type: &str, description: &str) -> Self {
        Self {
            r#type: r#type.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct Parameters<Props: Serialize> {
    pub r#type: String,
    pub properties: Props,
    pub required: Vec<String>,
}

#[derive(Serialize)]
pub struct Function<Props: Serialize> {
    pub name: String,
    pub description: String,
    pub parameters: Parameters<Props>,
}

#[derive(Serialize)]
pub enum ToolType {
    #[serde(rename = "function")]
    Function,
}

#[derive(Serialize)]
pub struct Tool<Props: Serialize> {
    pub r#type: ToolType,
    pub function: Function<Props>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

impl CompletionResponse {
    /// Arguments of the first tool call in the first choice.
    pub fn tool_call_arguments(&self, function_name: &str) -> Result<&str, Error> {
        self.choices
            .first()
            .and_then(|choice| choice.message.tool_calls.as_ref())
            .and_then(|calls| calls.iter().find(|c| c.function.name == function_name))
            .map(|call| call.function.arguments.as_str())
            .ok_or_else(|| anyhow!("Completion did not call {}", function_name))
    }
}

/// Request a completion that must answer by calling `tool`.
pub async fn forced_tool_completion<Props: Serialize>(
    messages: &[Message],
    tool: &Tool<Props>,
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<CompletionResponse, Error> {
    let payload = json!({
        "model": model,
        "messages": messages,
        "tools": [tool],
        "tool_choice": {
            "type": "function",
            "function": {"name": tool.function.name},
        },
    });
    let url = format!("{}/v1/chat/completions", api_hostname.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60))
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json::<CompletionResponse>()
        .await?;

    Ok(response)
}
