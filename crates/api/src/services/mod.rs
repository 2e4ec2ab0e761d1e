//! Application services: ping processing and alert dispatch.

pub mod alerts;
pub mod processor;

pub use alerts::{AlertChannel, ConsoleChannel, ContactAlertDispatcher, WebhookChannel};
pub use processor::{PingProcessor, ProcessError};
