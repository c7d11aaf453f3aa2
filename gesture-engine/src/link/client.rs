//! Link client state machine
//!
//! ```text
//! Disconnected --connect()--> Connecting --ok--> Connected
//!      ^                          |                  |
//!      |                       failure        error / close
//!      |                          v                  v
//!      +---- delay elapsed --- Reconnecting <--------+
//!
//! any state --disconnect()--> Disconnected
//! ```
//!
//! A single supervisor task owns the connection: it connects, runs the
//! receive loop, and sleeps out the reconnect delay. Retries are unbounded.
//! Cancelling the supervisor aborts whichever of those is pending.

use futures::StreamExt;
use gesture_common::config::LinkConfig;
use gesture_common::{ConnectionState, GestureDispatcher, GestureEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Connector, MessageStream};
use crate::error::LinkError;
use crate::pipeline::GesturePipeline;

struct Shared<C> {
    connector: C,
    endpoint: String,
    reconnect_interval: Duration,
    connect_timeout: Duration,
    pipeline: Mutex<GesturePipeline>,
    dispatcher: GestureDispatcher,
    state_tx: watch::Sender<ConnectionState>,
    /// Session clock origin
    started: Instant,
    /// Bumped by every connect and disconnect; only the supervisor holding
    /// the current value may publish state
    generation: AtomicU64,
}

impl<C: Connector> Shared<C> {
    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn pipeline(&self) -> MutexGuard<'_, GesturePipeline> {
        self.pipeline.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish `state` if `generation` is still current
    ///
    /// The check runs under the watch lock, so a stale writer can never land
    /// after a newer supervisor's update.
    fn set_state(&self, generation: u64, state: ConnectionState) {
        self.state_tx.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation || *current == state {
                return false;
            }
            debug!(from = %*current, to = %state, "Connection state changed");
            *current = state;
            true
        });
    }

    fn publish(&self, events: Vec<GestureEvent>) {
        for event in events {
            self.dispatcher.publish(&event);
        }
    }

    /// Connect, then receive until the connection is lost, repeating after
    /// the reconnect delay
    async fn supervise(&self, generation: u64, cancel: CancellationToken) {
        loop {
            let connection_id = Uuid::new_v4();
            self.set_state(generation, ConnectionState::Connecting);
            info!(%connection_id, endpoint = %self.endpoint, "Connecting to sensor bridge");

            let attempt = tokio::select! {
                _ = cancel.cancelled() => break,
                result = time::timeout(self.connect_timeout, self.connector.connect(&self.endpoint)) => {
                    match result {
                        Ok(connected) => connected,
                        Err(_) => Err(LinkError::ConnectTimeout(self.connect_timeout)),
                    }
                }
            };

            match attempt {
                Ok(stream) => {
                    self.set_state(generation, ConnectionState::Connected);
                    info!(%connection_id, endpoint = %self.endpoint, "Connected to sensor bridge");
                    self.pipeline().start_calibration(self.now());

                    let lost = tokio::select! {
                        _ = cancel.cancelled() => break,
                        lost = self.receive_loop(stream, connection_id) => lost,
                    };
                    warn!(%connection_id, error = %lost, "Connection to sensor bridge lost");
                }
                Err(e) => {
                    warn!(%connection_id, endpoint = %self.endpoint, error = %e, "Connect failed");
                }
            }

            self.set_state(generation, ConnectionState::Disconnected);
            self.set_state(generation, ConnectionState::Reconnecting);
            debug!(
                %connection_id,
                delay_secs = self.reconnect_interval.as_secs_f64(),
                "Reconnect scheduled"
            );

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = time::sleep(self.reconnect_interval) => {}
            }
        }

        self.set_state(generation, ConnectionState::Disconnected);
    }

    /// Feed every message into the pipeline in arrival order
    ///
    /// Returns the reason the stream ended.
    async fn receive_loop(&self, mut stream: MessageStream, connection_id: Uuid) -> LinkError {
        while let Some(item) = stream.next().await {
            let message = match item {
                Ok(message) => message,
                Err(e) => return e,
            };

            let now = self.now();
            let outcome = self.pipeline().handle_message(&message, now);
            match outcome {
                Ok(events) => self.publish(events),
                Err(e) => warn!(%connection_id, error = %e, "Dropping undecodable message"),
            }
        }
        LinkError::Closed
    }
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Resilient connection to the sensor bridge
///
/// Every successful connect restarts calibration. Decoded gestures are
/// published on the dispatcher after the pipeline lock is released, so
/// subscribers may call back into the client.
pub struct LinkClient<C: Connector> {
    shared: Arc<Shared<C>>,
    running: Mutex<Option<Running>>,
}

impl<C: Connector> LinkClient<C> {
    pub fn new(
        connector: C,
        config: &LinkConfig,
        pipeline: GesturePipeline,
        dispatcher: GestureDispatcher,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                connector,
                endpoint: config.endpoint.clone(),
                reconnect_interval: config.reconnect_interval(),
                connect_timeout: config.connect_timeout(),
                pipeline: Mutex::new(pipeline),
                dispatcher,
                state_tx,
                started: Instant::now(),
                generation: AtomicU64::new(0),
            }),
            running: Mutex::new(None),
        }
    }

    fn running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start the connection supervisor
    ///
    /// Returns `false` (and does nothing) when a supervisor is already
    /// connecting, connected or waiting to reconnect. Must be called from
    /// within a Tokio runtime.
    pub fn connect(&self) -> bool {
        let mut running = self.running();
        if let Some(active) = running.as_ref() {
            if !active.handle.is_finished() {
                debug!(state = %self.state(), "Connect ignored, link already active");
                return false;
            }
        }

        let generation = self.shared.next_generation();
        let cancel = CancellationToken::new();
        let shared = Arc::clone(&self.shared);
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            shared.supervise(generation, token).await;
        });

        *running = Some(Running { cancel, handle });
        true
    }

    /// Stop the supervisor and wait for it to exit
    ///
    /// Cancels a pending connect, receive or reconnect delay. The state is
    /// `Disconnected` when this returns, unless `connect()` was called again
    /// while waiting; the newer supervisor then owns the state.
    pub async fn disconnect(&self) {
        let (running, generation) = {
            let mut running = self.running();
            (running.take(), self.shared.next_generation())
        };

        if let Some(Running { cancel, handle }) = running {
            cancel.cancel();
            if let Err(e) = handle.await {
                warn!(error = %e, "Link supervisor ended abnormally");
            }
            info!(endpoint = %self.shared.endpoint, "Disconnected from sensor bridge");
        }

        self.shared.set_state(generation, ConnectionState::Disconnected);
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state_tx.borrow()
    }

    /// Watch connection state changes
    ///
    /// Intermediate states may be coalesced for a slow observer.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Discard the baseline and calibrate again on the live stream
    pub fn recalibrate(&self) {
        let now = self.shared.now();
        info!(at = now, "Recalibration requested");
        self.shared.pipeline().start_calibration(now);
    }

    pub fn is_calibrated(&self) -> bool {
        self.shared.pipeline().is_calibrated()
    }

    pub fn dispatcher(&self) -> &GestureDispatcher {
        &self.shared.dispatcher
    }

    pub fn endpoint(&self) -> &str {
        &self.shared.endpoint
    }
}

impl<C: Connector> Drop for LinkClient<C> {
    fn drop(&mut self) {
        let running = match self.running.get_mut() {
            Ok(running) => running.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(running) = running {
            running.cancel.cancel();
        }
    }
}

impl<C: Connector> std::fmt::Debug for LinkClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkClient")
            .field("endpoint", &self.shared.endpoint)
            .field("state", &self.state())
            .finish()
    }
}
