//! Ringlight application
//!
//! Glues the core animation engine with the outer world: a dedicated rendering thread which
//! owns the LED strip, a request/reply command server and its client.

pub use ringlight_core as core;

pub use crate::{
    client::Client,
    config::Config,
    render::{ActionSender, RenderLoop, RenderOptions, RenderState, RenderStats, SubmitError},
    server::{handle_message, CommandServer, MAX_MESSAGE_LEN},
    surface::{LogWriter, SmartLedsSurface},
};

mod client;
mod config;
mod render;
mod server;
mod surface;

/// Default command server port.
pub const DEFAULT_PORT: u16 = 5555;

/// Reply sent back for every accepted command.
pub const SUCCESS_REPLY: &str = "message handled";

/// Prefix of the reply sent back for a rejected command.
pub const FAILURE_REPLY: &str = "failure";
