//! Background refresh of the fast cache tier through the main application.
//!
//! The widget process never fetches prayer times itself.  It asks the main
//! application to run its fetch cycle ([`prayer_core::AppSignal`]), waits a
//! bounded time for the fallback tier to change, and copies the result into
//! the fast tier.  Tasks are keyed per `(trigger, family)` and retried with
//! backoff.

pub mod orchestrator;
pub mod runner;
pub mod task;

pub use orchestrator::{RefreshOrchestrator, RefreshOutcome};
pub use runner::{EnqueueOutcome, TaskRunner};
pub use task::{RefreshTask, RetryPolicy};
