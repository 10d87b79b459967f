//! One-way intents between the widget process and the main application,
//! carried as newline-delimited `name>>payload` lines over Unix sockets.

pub mod client;
pub mod intent;
pub mod listener;

pub use client::SocketSignal;
pub use intent::{format_intent, parse_intent, Intent};
pub use listener::IntentListener;
