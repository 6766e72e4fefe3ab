//! Library exports for tokenbridge, shared between the binary and tests.
//!
//! Keeps a session token in sync between the isolated execution contexts
//! of a browser extension and the web application's cookie.

pub mod client;
pub mod config;
pub mod cookies;
pub mod error;
pub mod handler;
pub mod interceptors;
pub mod manifest;
pub mod models;
pub mod startup;
pub mod state;
pub mod storage;
pub mod utils;

pub use error::BridgeError;
pub use startup::{init, init_from_config, BridgeOptions};
pub use state::ContextBridge;
