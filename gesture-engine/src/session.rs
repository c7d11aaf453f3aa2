//! Device session composition root

use gesture_common::config::GestureConfig;
use gesture_common::GestureDispatcher;
use tracing::info;

use crate::error::Result;
use crate::link::{Connector, LinkClient, TcpLineConnector};
use crate::pipeline::GesturePipeline;

/// One sensor, one dispatcher, one pipeline, one link
///
/// # Examples
///
/// ```no_run
/// use gesture_common::config::GestureConfig;
/// use gesture_engine::GestureSession;
///
/// # async fn run() -> gesture_engine::Result<()> {
/// let session = GestureSession::tcp(GestureConfig::resolve(None)?)?;
/// session.dispatcher().subscribe(|event| println!("{} at {:.2}s", event.kind, event.timestamp));
/// session.start();
/// // ...
/// session.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GestureSession<C: Connector> {
    config: GestureConfig,
    dispatcher: GestureDispatcher,
    link: LinkClient<C>,
}

impl GestureSession<TcpLineConnector> {
    /// Session over the newline-delimited TCP transport
    pub fn tcp(config: GestureConfig) -> Result<Self> {
        let connector = TcpLineConnector::from_config(&config.link);
        Self::new(config, connector)
    }
}

impl<C: Connector> GestureSession<C> {
    pub fn new(config: GestureConfig, connector: C) -> Result<Self> {
        config.validate()?;

        let dispatcher = GestureDispatcher::new();
        let pipeline = GesturePipeline::new(&config);
        let link = LinkClient::new(connector, &config.link, pipeline, dispatcher.clone());

        Ok(Self {
            config,
            dispatcher,
            link,
        })
    }

    /// Connect if `link.auto_connect` is set
    ///
    /// Returns whether a connection supervisor was started.
    pub fn start(&self) -> bool {
        if !self.config.link.auto_connect {
            info!(endpoint = %self.link.endpoint(), "Auto-connect disabled, waiting for connect()");
            return false;
        }
        self.link.connect()
    }

    /// Connect regardless of `auto_connect`
    pub fn connect(&self) -> bool {
        self.link.connect()
    }

    pub async fn shutdown(&self) {
        self.link.disconnect().await;
        info!("Gesture session shut down");
    }

    pub fn dispatcher(&self) -> &GestureDispatcher {
        &self.dispatcher
    }

    pub fn link(&self) -> &LinkClient<C> {
        &self.link
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }
}
