//! MCP capability negotiation during initialization.

use crate::types::{InitializeParams, InitializeResult, MCP_VERSION};

/// Handshake state for the single connected client.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    pub initialized: bool,
}

impl NegotiatedCapabilities {
    pub fn negotiate(&mut self, params: InitializeParams) -> InitializeResult {
        if let Some(requested) = params.protocol_version.as_deref() {
            if requested != MCP_VERSION {
                tracing::warn!(
                    "Client requested protocol version {requested}, \
                     server supports {MCP_VERSION}. Proceeding with server version."
                );
            }
        }

        if let Some(client) = params.client_info {
            tracing::info!("Initialized with client: {} v{}", client.name, client.version);
        }

        InitializeResult::default()
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
        tracing::info!("MCP handshake complete");
    }
}
