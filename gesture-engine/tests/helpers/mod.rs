//! Test helper modules for gesture-engine integration tests
//!
//! - ScriptedConnector: in-memory transport driven by a per-attempt script
//! - messages: wire message builders and a short-window test configuration

#![allow(dead_code)]

pub mod messages;
pub mod scripted_connector;

pub use messages::{reading, rest, test_config};
pub use scripted_connector::{Attempt, ScriptedConnector};
