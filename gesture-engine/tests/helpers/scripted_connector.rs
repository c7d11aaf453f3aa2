//! Scripted in-memory transport
//!
//! Each connection attempt pops the next [`Attempt`]; once the script is
//! exhausted every further attempt fails.

use futures::stream::{self, StreamExt};
use gesture_engine::{Connector, LinkError, MessageStream, WireMessage};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Spacing between scripted messages
pub const PACE: Duration = Duration::from_millis(300);

pub enum Attempt {
    /// Connect fails immediately
    Fail,
    /// Connect never completes
    Hang,
    /// Deliver messages `PACE` apart, then keep the connection open
    Hold(Vec<WireMessage>),
    /// Deliver messages `PACE` apart, then the peer closes
    Close(Vec<WireMessage>),
    /// Deliver messages without delay, then a receive error
    Break(Vec<WireMessage>),
}

#[derive(Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<VecDeque<Attempt>>>,
    attempts: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new(script: Vec<Attempt>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of connect calls so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

fn paced(messages: Vec<WireMessage>) -> stream::BoxStream<'static, Result<WireMessage, LinkError>> {
    stream::iter(messages)
        .then(|message| async move {
            tokio::time::sleep(PACE).await;
            Ok::<_, LinkError>(message)
        })
        .boxed()
}

impl Connector for ScriptedConnector {
    async fn connect(&self, _endpoint: &str) -> Result<MessageStream, LinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();

        match next.unwrap_or(Attempt::Fail) {
            Attempt::Fail => Err(LinkError::ConnectFailed("scripted refusal".to_string())),
            Attempt::Hang => futures::future::pending().await,
            Attempt::Hold(messages) => Ok(paced(messages).chain(stream::pending()).boxed()),
            Attempt::Close(messages) => Ok(paced(messages)),
            Attempt::Break(messages) => Ok(stream::iter(messages.into_iter().map(Ok::<_, LinkError>))
                .chain(stream::once(async {
                    Err(LinkError::ReceiveFailed("scripted reset".to_string()))
                }))
                .boxed()),
        }
    }
}
