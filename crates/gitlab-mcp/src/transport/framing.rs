//! Message framing for newline-delimited JSON.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{
    JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, McpError, McpResult, RequestId, Response,
    JSONRPC_VERSION,
};

/// Default cap on a single inbound line.
pub const DEFAULT_MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// One unit cut out of the input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete, non-blank line without its terminator.
    Line(Vec<u8>),
    /// A line longer than the configured limit. Its bytes were dropped.
    Oversized { size: usize },
}

/// Accumulates raw chunks and splits them into lines.
///
/// The buffer only ever holds the unterminated tail of the next line. Only
/// `\n` terminates a line; a `\r` right before it is removed. How the input
/// is chunked never changes the frames produced.
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already searched for a terminator.
    scanned: usize,
    max_line_bytes: Option<usize>,
    /// Bytes dropped so far from the current oversized line.
    discarding: Option<usize>,
}

impl LineFramer {
    /// `None` disables the line length limit.
    pub fn new(max_line_bytes: Option<usize>) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_line_bytes,
            discarding: None,
        }
    }

    /// Append a chunk and iterate over every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Frames<'_> {
        self.buffer.extend_from_slice(chunk);
        Frames { framer: self }
    }

    /// Bytes waiting for a terminator.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Consume the framer at end of input, returning how many bytes of an
    /// unterminated line were left over.
    pub fn finish(self) -> usize {
        self.buffer.len() + self.discarding.unwrap_or(0)
    }

    fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') else {
                self.scanned = self.buffer.len();
                if self.exceeds_limit(self.buffer.len()) {
                    *self.discarding.get_or_insert(0) += self.buffer.len();
                    self.buffer.clear();
                    self.scanned = 0;
                }
                return None;
            };

            let end = self.scanned + offset;
            let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
            self.scanned = 0;
            line.pop();

            if let Some(dropped) = self.discarding.take() {
                return Some(Frame::Oversized {
                    size: dropped + line.len(),
                });
            }
            if self.exceeds_limit(line.len()) {
                return Some(Frame::Oversized { size: line.len() });
            }

            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(Frame::Line(line));
        }
    }

    fn exceeds_limit(&self, len: usize) -> bool {
        self.max_line_bytes.is_some_and(|max| len > max)
    }
}

/// Frames completed by one [`LineFramer::feed`] call.
pub struct Frames<'a> {
    framer: &'a mut LineFramer,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.framer.next_frame()
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<RequestId>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Parse a single line as a JSON-RPC message.
///
/// The `jsonrpc` member may be omitted; if present it must be `"2.0"`.
pub fn parse_message(line: &[u8]) -> McpResult<JsonRpcMessage> {
    let value: Value =
        serde_json::from_slice(line).map_err(|e| McpError::ParseError(e.to_string()))?;
    if !value.is_object() {
        return Err(McpError::ParseError(
            "Message must be a JSON object".to_string(),
        ));
    }

    let envelope: Envelope =
        serde_json::from_value(value).map_err(|e| McpError::ParseError(e.to_string()))?;

    if let Some(version) = envelope.jsonrpc.as_deref() {
        if version != JSONRPC_VERSION {
            return Err(McpError::ParseError(format!(
                "Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{version}\""
            )));
        }
    }

    match (envelope.method, envelope.id) {
        (Some(method), Some(id)) => Ok(JsonRpcMessage::Request(JsonRpcRequest {
            id,
            method,
            params: envelope.params,
        })),
        (Some(method), None) => Ok(JsonRpcMessage::Notification(JsonRpcNotification {
            method,
            params: envelope.params,
        })),
        (None, id) if envelope.result.is_some() || envelope.error.is_some() => {
            Ok(JsonRpcMessage::Response { id })
        }
        (None, _) => Err(McpError::ParseError(
            "Message has no method".to_string(),
        )),
    }
}

/// Serialize a response to a JSON line (with trailing newline).
pub fn frame_message(response: &Response) -> McpResult<String> {
    let mut json = serde_json::to_string(response)?;
    json.push('\n');
    Ok(json)
}
