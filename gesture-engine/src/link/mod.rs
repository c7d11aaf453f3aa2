//! Connection to the sensor bridge
//!
//! [`LinkClient`] owns the connect / receive / reconnect state machine.
//! The transport itself sits behind [`Connector`], so the same client drives
//! the TCP line transport in production and scripted streams in tests.

mod client;
mod tcp;

pub use client::LinkClient;
pub use tcp::TcpLineConnector;

pub use crate::codec::WireMessage;

use futures::stream::BoxStream;
use std::future::Future;

use crate::error::LinkError;

/// Inbound half of an open connection
///
/// Ends with `None` when the peer closes; an `Err` item is treated as a lost
/// connection.
pub type MessageStream = BoxStream<'static, Result<WireMessage, LinkError>>;

/// Opens message-oriented connections to an endpoint
pub trait Connector: Send + Sync + 'static {
    fn connect(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<MessageStream, LinkError>> + Send;
}
