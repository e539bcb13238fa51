//! Server-Sent Events (SSE) parsing for chat completions streams.
//!
//! The research service delivers a streamed answer as `data: {json}` lines,
//! each carrying a `choices[].delta.content` fragment, terminated by
//! `data: [DONE]`. [`SseBuffer`] accepts raw body chunks as they arrive off
//! the wire, splits them into complete lines, and turns each payload into
//! [`StreamEvent`]s. [`collect_text`] joins the text deltas in arrival order.

use crate::api::chat::UsageInfo;
use serde::Deserialize;
use tracing::{trace, warn};

/// A single event from an SSE stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An incremental text content delta.
    TextDelta(String),
    /// Token usage information (sent in the final chunk).
    Usage(UsageInfo),
    /// An error reported by the service mid-stream. Ends the stream.
    Error(String),
    /// The stream is complete.
    Done,
}

/// Raw SSE data chunk.
#[derive(Deserialize, Debug)]
struct StreamChunk {
    choices: Option<Vec<StreamChoice>>,
    usage: Option<UsageInfo>,
    error: Option<StreamError>,
}

#[derive(Deserialize, Debug)]
struct StreamError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct StreamChoice {
    delta: Option<StreamDelta>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct StreamDelta {
    content: Option<String>,
}

/// Line-oriented accumulator for a streamed response body.
///
/// Chunks may split a line (or a multi-byte character) anywhere, so bytes
/// are held until a newline completes the line.
#[derive(Debug, Default)]
pub struct SseBuffer {
    pending: Vec<u8>,
    events: Vec<StreamEvent>,
    done: bool,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw body chunk. Returns `true` once the stream has ended,
    /// either with `data: [DONE]` or with an error event.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        if self.done {
            return true;
        }
        self.pending.extend_from_slice(chunk);

        while let Some(newline_pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline_pos).collect();
            self.process_line(&String::from_utf8_lossy(&line));
            if self.done {
                self.pending.clear();
                break;
            }
        }
        self.done
    }

    /// Flush any unterminated final line and return the collected events.
    /// A stream that did not end with an error ends with
    /// [`StreamEvent::Done`].
    pub fn finish(mut self) -> Vec<StreamEvent> {
        if !self.pending.is_empty() {
            let remaining = std::mem::take(&mut self.pending);
            self.process_line(&String::from_utf8_lossy(&remaining));
        }
        if !self.done {
            self.events.push(StreamEvent::Done);
        }
        self.events
    }

    fn process_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with(':') {
            return;
        }
        if line == "data: [DONE]" {
            self.events.push(StreamEvent::Done);
            self.done = true;
            return;
        }
        if let Some(data) = line.strip_prefix("data:") {
            parse_sse_data(data.trim_start(), &mut self.events);
            if matches!(self.events.last(), Some(StreamEvent::Error(_))) {
                self.done = true;
            }
        }
    }
}

/// Parse a single SSE `data:` payload into stream events.
fn parse_sse_data(data: &str, events: &mut Vec<StreamEvent>) {
    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => {
            if let Some(error) = chunk.error {
                events.push(StreamEvent::Error(error.message));
                return;
            }
            if let Some(choices) = chunk.choices {
                for choice in choices {
                    if let Some(content) = choice.delta.and_then(|d| d.content)
                        && !content.is_empty()
                    {
                        events.push(StreamEvent::TextDelta(content));
                    }
                    if choice.finish_reason.is_some() {
                        trace!("Stream finish_reason: {:?}", choice.finish_reason);
                    }
                }
            }
            if let Some(usage) = chunk.usage {
                events.push(StreamEvent::Usage(usage));
            }
        }
        Err(e) => {
            warn!("Failed to parse SSE chunk: {e} (data: {data})");
        }
    }
}

/// Assemble a complete text string from a sequence of stream events.
pub fn collect_text(events: &[StreamEvent]) -> String {
    let mut text = String::new();
    for event in events {
        if let StreamEvent::TextDelta(delta) = event {
            text.push_str(delta);
        }
    }
    text
}

/// The first error event, if the stream ended with one.
pub fn stream_error(events: &[StreamEvent]) -> Option<&str> {
    events.iter().find_map(|event| match event {
        StreamEvent::Error(message) => Some(message.as_str()),
        _ => None,
    })
}

/// Extract usage info from stream events (if present).
///
/// Some providers repeat usage on every chunk; the last one wins.
pub fn extract_usage(events: &[StreamEvent]) -> Option<UsageInfo> {
    events.iter().rev().find_map(|event| match event {
        StreamEvent::Usage(usage) => Some(usage.clone()),
        _ => None,
    })
}
