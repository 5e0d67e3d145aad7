//! Telegram logging handler implementation.
//!
//! This module defines [`TelegramHandler`], a handler that formats
//! [`LogRecord`](crate::log_record::LogRecord) values and pushes them to the
//! Telegram Bot API `sendMessage` method. Delivery is synchronous on the
//! calling thread and strictly best effort.
//!
//! # Message shaping
//!
//! - An optional service name is prepended as `<b>[service]</b>` plus a
//!   newline.
//! - Text longer than 4000 characters keeps its first 3997 characters and
//!   gains a `...` suffix.
//! - Every primary attempt uses `parse_mode = HTML` with link previews
//!   disabled.
//!
//! # Retry Semantics
//!
//! - **2xx**: Delivered.
//! - **Transport errors**: the HTTP client is discarded and recreated on the
//!   next attempt; up to two retries with 0.5 s and 1.0 s pauses.
//! - **400**: treated as malformed markup; one fallback send without
//!   `parse_mode`, never retried further.
//! - **Any other status**: reported and dropped.
//!
//! Failures are written to standard error and never surface to the caller.

mod client;
mod client_slot;
mod config;
mod handler;
mod payload;
mod retry;

#[cfg(test)]
mod tests;

pub use client::{
    ChatClient, ClientError, ClientFactory, SendOutcome, UreqClientFactory, describe_error_body,
};
pub use client_slot::ClientSlot;
pub use config::{
    DEFAULT_API_BASE, DEFAULT_BACKOFF_BASE, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT,
    MAX_MESSAGE_CHARS, TelegramHandlerConfig,
};
pub use handler::{DeliveryReport, TelegramHandler};
pub use payload::{ParseMode, SendMessagePayload, compose_text, truncate_chars};
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
