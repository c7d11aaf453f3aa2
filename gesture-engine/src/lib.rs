//! # IMU Gesture Engine
//!
//! Turns a stream of accelerometer + gyroscope samples arriving over an
//! unreliable link into debounced gesture events (stomp, kick).
//!
//! **Data flow:** LinkClient receives a message → `codec` decodes it into a
//! sample update or a pre-classified remote gesture → `Calibrator` (warm-up)
//! or `MotionClassifier` (after warm-up) consumes it → `GestureDispatcher`
//! fans the event out to subscribers.
//!
//! **Concurrency:** one receive loop per session. Decoding, calibration,
//! classification and dispatch are synchronous and run to completion inside
//! that loop, behind a single pipeline mutex.

pub mod axis;
pub mod calibrator;
pub mod classifier;
pub mod codec;
pub mod error;
pub mod frame;
pub mod link;
pub mod pipeline;
pub mod session;

pub use calibrator::{Baseline, Calibrator};
pub use classifier::{CooldownTracker, MotionClassifier};
pub use error::{DecodeError, Error, LinkError, Result};
pub use link::{Connector, LinkClient, MessageStream, TcpLineConnector, WireMessage};
pub use pipeline::GesturePipeline;
pub use session::GestureSession;
