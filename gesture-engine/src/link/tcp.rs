//! Newline-delimited JSON over TCP

use bytes::BytesMut;
use futures::StreamExt;
use gesture_common::config::LinkConfig;
use std::io;
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, warn};

use super::{Connector, MessageStream, WireMessage};
use crate::error::LinkError;

const ENDPOINT_SCHEME: &str = "tcp://";

/// Line decoder that drops oversized, non-UTF-8 and blank lines instead of
/// failing
///
/// A decode error ends a `FramedRead`, so one bad line would otherwise cost
/// the whole connection.
#[derive(Debug)]
struct BridgeLines {
    lines: LinesCodec,
    max_message_bytes: usize,
}

impl BridgeLines {
    fn new(max_message_bytes: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_message_bytes),
            max_message_bytes,
        }
    }

    fn filter(
        &mut self,
        decoded: Result<Option<String>, LinesCodecError>,
    ) -> Option<Result<Option<String>, LinesCodecError>> {
        match decoded {
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                warn!(max_message_bytes = self.max_message_bytes, "Dropping oversized message");
                None
            }
            Err(LinesCodecError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(error = %e, "Dropping message that is not valid UTF-8");
                // The bad line is already consumed; start the next scan from a clean codec
                self.lines = LinesCodec::new_with_max_length(self.max_message_bytes);
                None
            }
            Ok(Some(line)) if line.trim().is_empty() => None,
            other => Some(other),
        }
    }
}

impl Decoder for BridgeLines {
    type Item = String;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        loop {
            let decoded = self.lines.decode(buf);
            if let Some(result) = self.filter(decoded) {
                return result;
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        loop {
            let decoded = self.lines.decode_eof(buf);
            if let Some(result) = self.filter(decoded) {
                return result;
            }
        }
    }
}

/// One text message per line
///
/// Lines longer than `max_message_bytes` are dropped with a warning; the
/// connection stays up. Blank lines are skipped.
#[derive(Debug, Clone)]
pub struct TcpLineConnector {
    max_message_bytes: usize,
}

impl TcpLineConnector {
    pub fn new(max_message_bytes: usize) -> Self {
        Self { max_message_bytes }
    }

    pub fn from_config(config: &LinkConfig) -> Self {
        Self::new(config.max_message_bytes)
    }
}

impl Default for TcpLineConnector {
    fn default() -> Self {
        Self::from_config(&LinkConfig::default())
    }
}

impl Connector for TcpLineConnector {
    async fn connect(&self, endpoint: &str) -> Result<MessageStream, LinkError> {
        let address = endpoint.strip_prefix(ENDPOINT_SCHEME).unwrap_or(endpoint);

        let socket = TcpStream::connect(address)
            .await
            .map_err(|e| LinkError::ConnectFailed(format!("{}: {}", address, e)))?;
        if let Err(e) = socket.set_nodelay(true) {
            debug!(error = %e, "Could not disable Nagle on bridge socket");
        }

        let messages = FramedRead::new(socket, BridgeLines::new(self.max_message_bytes)).map(|line| {
            line.map(WireMessage::Text)
                .map_err(|e| LinkError::ReceiveFailed(e.to_string()))
        });

        Ok(messages.boxed())
    }
}
