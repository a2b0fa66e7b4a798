//! Stdio transport. Reads JSON-RPC from stdin, writes to stdout.
//!
//! Reading and dispatch run as two futures in the same task, joined by a
//! FIFO queue of frames. Input keeps being framed while a tool call is in
//! flight, but frames are dispatched strictly one at a time, so responses
//! leave in the order requests arrived.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::protocol::ProtocolHandler;
use crate::types::{JsonRpcMessage, McpError, McpResult, Outcome, Response};

use super::framing::{self, Frame, LineFramer, DEFAULT_MAX_LINE_BYTES};

const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: ProtocolHandler,
    max_line_bytes: Option<usize>,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler,
            max_line_bytes: Some(DEFAULT_MAX_LINE_BYTES),
        }
    }

    /// Override the inbound line limit. `None` removes it.
    pub fn with_max_line_bytes(mut self, max_line_bytes: Option<usize>) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    pub fn handler(&self) -> &ProtocolHandler {
        &self.handler
    }

    /// Run the transport loop over stdin and stdout.
    pub async fn run(&self) -> McpResult<()> {
        tracing::info!("Stdio transport started");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve one client over an arbitrary byte stream pair until the reader
    /// reaches end of input. Only a failing writer ends the loop early.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> McpResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let framer = LineFramer::new(self.max_line_bytes);

        tokio::try_join!(read_frames(reader, framer, tx), self.dispatch_frames(rx, writer))?;
        Ok(())
    }

    async fn dispatch_frames<W>(
        &self,
        mut queue: mpsc::UnboundedReceiver<Frame>,
        mut writer: W,
    ) -> McpResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        while let Some(frame) = queue.recv().await {
            let Outcome::Respond(response) = self.process_frame(frame).await else {
                continue;
            };

            let framed = match framing::frame_message(&response) {
                Ok(framed) => framed,
                Err(e) => {
                    tracing::error!("Failed to serialize response: {e}");
                    let fallback = McpError::InternalError(e.to_string());
                    framing::frame_message(&Response::error(response.id().cloned(), &fallback))?
                }
            };

            writer.write_all(framed.as_bytes()).await.map_err(McpError::Io)?;
            writer.flush().await.map_err(McpError::Io)?;
        }

        Ok(())
    }

    /// Run the full pipeline for one frame behind a fault barrier: a panic
    /// while handling the line is answered with an internal error.
    pub async fn process_frame(&self, frame: Frame) -> Outcome {
        let line = match frame {
            Frame::Line(line) => line,
            Frame::Oversized { size } => {
                tracing::warn!("Dropped oversized message of {size} bytes");
                let max = self.max_line_bytes.unwrap_or(0);
                return Outcome::Respond(Response::error(
                    None,
                    &McpError::MessageTooLarge { size, max },
                ));
            }
        };

        let pipeline = async {
            match framing::parse_message(&line) {
                Ok(msg) => self.handler.handle_message(msg).await,
                Err(e) => {
                    tracing::warn!("Parse error: {e}");
                    Outcome::Respond(Response::error(None, &e))
                }
            }
        };

        match AssertUnwindSafe(pipeline).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!("Message handling panicked: {message}");
                let error = McpError::InternalError(message);
                match framing::parse_message(&line) {
                    Ok(JsonRpcMessage::Request(req)) => {
                        Outcome::Respond(Response::error(Some(req.id), &error))
                    }
                    Ok(_) => Outcome::NoResponse,
                    Err(_) => Outcome::Respond(Response::error(None, &error)),
                }
            }
        }
    }
}

/// Read chunks until end of input, pushing every completed frame onto `queue`.
///
/// A read error is treated as end of input: frames already queued are still
/// answered.
async fn read_frames<R>(
    mut reader: R,
    mut framer: LineFramer,
    queue: mpsc::UnboundedSender<Frame>,
) -> McpResult<()>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; READ_CHUNK_BYTES];

    loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) => {
                tracing::info!("EOF on input, shutting down");
                break;
            }
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::error!("Reading input failed, shutting down: {e}");
                break;
            }
        };

        for frame in framer.feed(&chunk[..n]) {
            if queue.send(frame).is_err() {
                return Ok(());
            }
        }
    }

    let leftover = framer.finish();
    if leftover > 0 {
        tracing::warn!("Discarding {leftover} bytes of unterminated input");
    }

    Ok(())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
