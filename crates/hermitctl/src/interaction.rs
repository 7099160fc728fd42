//! Configured Hermit interaction
//!
//! Shows a fixed command from configuration and interprets Hermit's QR answer
//! according to a payload format. Device-specific response grammars plug in as
//! further `HermitInteraction` implementations.

use hermit_common::{CommandMessage, HermitInteraction, InteractionError, MessageContext, HERMIT_COMMAND_CODE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the decoded QR text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// JSON document
    Json,
    /// Hex-encoded bytes
    Hex,
    /// Any non-empty text
    #[default]
    Text,
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::Json => f.write_str("json"),
            PayloadFormat::Hex => f.write_str("hex"),
            PayloadFormat::Text => f.write_str("text"),
        }
    }
}

/// Parsed Hermit response
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Bytes(Vec<u8>),
    Text(String),
}

impl Payload {
    /// Text form printed to stdout
    pub fn render(&self) -> String {
        match self {
            Payload::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Payload::Bytes(bytes) => hex::encode(bytes),
            Payload::Text(text) => text.clone(),
        }
    }

    /// JSON form used by `--json`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Payload::Json(value) => serde_json::json!({ "format": "json", "value": value }),
            Payload::Bytes(bytes) => serde_json::json!({
                "format": "hex",
                "value": hex::encode(bytes),
                "length": bytes.len(),
            }),
            Payload::Text(text) => serde_json::json!({ "format": "text", "value": text }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PayloadInteraction {
    instructions: String,
    command: String,
    mode: String,
    format: PayloadFormat,
}

impl PayloadInteraction {
    pub fn new(
        instructions: impl Into<String>,
        command: impl Into<String>,
        mode: impl Into<String>,
        format: PayloadFormat,
    ) -> Self {
        Self {
            instructions: instructions.into(),
            command: command.into(),
            mode: mode.into(),
            format,
        }
    }
}

impl HermitInteraction for PayloadInteraction {
    type Output = Payload;

    fn message_for(&self, context: &MessageContext) -> Result<CommandMessage, InteractionError> {
        if context.code != HERMIT_COMMAND_CODE {
            return Err(InteractionError::Configuration(format!(
                "unknown message code '{}'",
                context.code
            )));
        }
        if self.command.trim().is_empty() {
            return Err(InteractionError::Configuration(
                "no Hermit command configured (set [command].command or pass --command)".to_string(),
            ));
        }

        Ok(CommandMessage {
            instructions: self.instructions.clone(),
            command: self.command.clone(),
            mode: self.mode.clone(),
        })
    }

    fn parse(&self, raw: &str) -> Result<Payload, InteractionError> {
        let text = raw.trim();
        match self.format {
            PayloadFormat::Json => serde_json::from_str(text)
                .map(Payload::Json)
                .map_err(|e| InteractionError::Parse(format!("invalid JSON response: {}", e))),
            PayloadFormat::Hex => hex::decode(text)
                .map(Payload::Bytes)
                .map_err(|e| InteractionError::Parse(format!("invalid hex response: {}", e))),
            PayloadFormat::Text => {
                if text.is_empty() {
                    Err(InteractionError::Parse("empty response".to_string()))
                } else {
                    Ok(Payload::Text(text.to_string()))
                }
            }
        }
    }
}
