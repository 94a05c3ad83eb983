//! Natural-language event extraction. The language model is treated as
//! an oracle: it receives the text plus a reference time and must
//! answer through the `extract_event_details` function.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::prompt::{ExtractEventContext, Prompt, render};
use crate::core::time::{format_timestamp, normalize_timestamp};
use crate::core::{AppConfig, Error, Result};
use crate::openai::{
    Function, Message, Parameters, Property, Role, Tool, ToolType, forced_tool_completion,
};

const EXTRACT_FUNCTION: &str = "extract_event_details";

fn default_duration() -> i64 {
    60
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFields {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_duration")]
    pub duration: i64,
    pub date: String,
    #[serde(default)]
    pub recurring: bool,
}

#[async_trait]
pub trait EventExtractor: Send + Sync {
    async fn extract(&self, text: &str, reference_time: DateTime<Utc>) -> Result<EventFields>;
}

#[derive(Serialize)]
pub struct ExtractEventProps {
    pub title: Property,
    pub description: Property,
    pub duration: Property,
    pub date: Property,
    pub recurring: Property,
}

pub fn extract_event_tool() -> Tool<ExtractEventProps> {
    Tool {
        r#type: ToolType::Function,
        function: Function {
            name: String::from(EXTRACT_FUNCTION),
            description: String::from(
                "Extracts the event title, description, duration, and date from the given text",
            ),
            parameters: Parameters {
                r#type: String::from("object"),
                properties: ExtractEventProps {
                    title: Property::new("string", "The title of the event"),
                    description: Property::new("string", "The description of the event"),
                    duration: Property::new("integer", "The duration of the event in minutes"),
                    date: Property::new("string", "The date of the event in ISO 8601 format"),
                    recurring: Property::new("boolean", "Whether the event repeats every week"),
                },
                required: vec![
                    String::from("title"),
                    String::from("duration"),
                    String::from("date"),
                    String::from("recurring"),
                ],
            },
        },
    }
}

/// Decode the function arguments returned by the model and normalize
/// the date to canonical UTC.
pub fn parse_event_fields(arguments: &str) -> Result<EventFields> {
    let mut fields: EventFields = serde_json::from_str(arguments)
        .map_err(|e| Error::Upstream(format!("Invalid event data format: {}", e)))?;
    fields.date = normalize_timestamp(&fields.date)
        .map_err(|_| Error::Upstream(format!("Model returned an invalid date {}", fields.date)))?;
    if fields.duration <= 0 {
        fields.duration = default_duration();
    }
    Ok(fields)
}

pub struct OpenAiEventExtractor {
    api_hostname: String,
    api_key: String,
    model: String,
    source_timezone: String,
}

impl OpenAiEventExtractor {
    pub fn new(api_hostname: &str, api_key: &str, model: &str, source_timezone: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            source_timezone: source_timezone.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.openai_api_hostname,
            &config.openai_api_key,
            &config.openai_model,
            &config.source_timezone,
        )
    }
}

#[async_trait]
impl EventExtractor for OpenAiEventExtractor {
    async fn extract(&self, text: &str, reference_time: DateTime<Utc>) -> Result<EventFields> {
        let reference_time = format_timestamp(&reference_time);
        let system_prompt = render(
            Prompt::ExtractEvent,
            &ExtractEventContext {
                reference_time: &reference_time,
                source_timezone: &self.source_timezone,
            },
        )
        .map_err(|e| Error::Upstream(e.to_string()))?;
        let messages = vec![
            Message::new(Role::System, &system_prompt),
            Message::new(Role::User, text),
        ];

        let response = forced_tool_completion(
            &messages,
            &extract_event_tool(),
            &self.api_hostname,
            &self.api_key,
            &self.model,
        )
        .await
        .map_err(|e| {
            tracing::error!("Error with OpenAI API: {}", e);
            Error::Upstream(String::from("language model request failed"))
        })?;

        let arguments = response
            .tool_call_arguments(EXTRACT_FUNCTION)
            .map_err(|e| Error::Upstream(e.to_string()))?;
        parse_event_fields(arguments)
    }
}
