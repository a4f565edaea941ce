//! One LLM request per search record, mapped onto a typed outcome.
//!
//! The client is total: every record yields exactly one
//! [`ExtractionResult`], in input order, whatever the provider does.

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use log::{info, warn, error};

use crate::config::{DEFAULT_MODEL, RECORD_DELAY};
use crate::delay_manager::{self, Clock, SystemClock};
use crate::error::Result;
use crate::orchestrator::SearchRecord;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn user(model: &str, prompt: &str) -> Self {
        ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage { role: "user".to_string(), content: prompt.to_string() }],
        }
    }
}

/// Raw provider reply, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmReply {
    pub status: u16,
    pub body: String,
}

pub trait LlmTransport {
    /// Sends one request. `Err` means no HTTP reply was obtained.
    fn send(&self, request: &ChatRequest) -> Result<LlmReply>;
}

/// Bearer-authenticated JSON POST to the provider's chat endpoint.
pub struct HttpLlmTransport {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpLlmTransport {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpLlmTransport { client, api_url: api_url.into(), api_key: api_key.into() })
    }
}

impl LlmTransport for HttpLlmTransport {
    fn send(&self, request: &ChatRequest) -> Result<LlmReply> {
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok(LlmReply { status, body })
    }
}

/// What came back for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Extracted(String),
    NoTextGenerated,
    UnexpectedFormat,
    HttpStatus(u16),
    /// Transport or decoding failure; the message is kept for logs, not for display.
    Exception(String),
    /// The entity's search failed, so nothing was sent.
    SearchFailed,
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Extracted(_))
    }
}

impl fmt::Display for ExtractionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionOutcome::Extracted(text) => f.write_str(text),
            ExtractionOutcome::NoTextGenerated => f.write_str("LLM did not generate any text"),
            ExtractionOutcome::UnexpectedFormat => f.write_str("Expected format not received from LLM"),
            ExtractionOutcome::HttpStatus(code) => write!(f, "Request failed with status {}", code),
            ExtractionOutcome::Exception(_) => f.write_str("Exception occurred"),
            ExtractionOutcome::SearchFailed => f.write_str("Search failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub entity: String,
    pub prompt: String,
    pub outcome: ExtractionOutcome,
}

impl ExtractionResult {
    /// The display form: generated text or a sentinel.
    pub fn extracted_info(&self) -> String {
        self.outcome.to_string()
    }
}

/// Maps a provider reply onto an outcome. Expects `{"generations": [{"text": ..}]}`.
pub fn interpret_reply(reply: &LlmReply) -> ExtractionOutcome {
    if !(200..300).contains(&reply.status) {
        return ExtractionOutcome::HttpStatus(reply.status);
    }

    let json: Value = match serde_json::from_str(&reply.body) {
        Ok(v) => v,
        Err(e) => return ExtractionOutcome::Exception(format!("invalid JSON body: {}", e)),
    };

    let first = match json.get("generations").and_then(Value::as_array) {
        Some(generations) => generations.first(),
        None => return ExtractionOutcome::UnexpectedFormat,
    };

    match first {
        None => ExtractionOutcome::UnexpectedFormat,
        Some(generation) => match generation.get("text").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => ExtractionOutcome::Extracted(text.to_string()),
            _ => ExtractionOutcome::NoTextGenerated,
        },
    }
}

pub struct ExtractionClient {
    transport: Box<dyn LlmTransport>,
    model: String,
    clock: Arc<dyn Clock>,
    record_delay: Duration,
}

impl ExtractionClient {
    pub fn new(transport: Box<dyn LlmTransport>) -> Self {
        ExtractionClient {
            transport,
            model: DEFAULT_MODEL.to_string(),
            clock: Arc::new(SystemClock),
            record_delay: RECORD_DELAY,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_record_delay(mut self, delay: Duration) -> Self {
        self.record_delay = delay;
        self
    }

    pub fn extract(&self, records: Vec<SearchRecord>) -> Vec<ExtractionResult> {
        let total = records.len();
        let mut results = Vec::with_capacity(total);

        for (i, record) in records.into_iter().enumerate() {
            info!("Extracting {} / {} : {}", i + 1, total, record.entity);

            let (prompt, outcome) = match record.extracted_text {
                Some(text) => {
                    let outcome = self.extract_one(&text);
                    delay_manager::pause(self.clock.as_ref(), self.record_delay, "Record Delay");
                    (text, outcome)
                }
                None => (String::new(), ExtractionOutcome::SearchFailed),
            };

            if !outcome.is_success() {
                warn!("No information extracted for '{}': {}", record.entity, outcome);
            }

            results.push(ExtractionResult { entity: record.entity, prompt, outcome });
        }

        results
    }

    fn extract_one(&self, prompt: &str) -> ExtractionOutcome {
        let request = ChatRequest::user(&self.model, prompt);
        match self.transport.send(&request) {
            Ok(reply) => interpret_reply(&reply),
            Err(e) => {
                error!("Error: {}", e);
                ExtractionOutcome::Exception(e.to_string())
            }
        }
    }
}
