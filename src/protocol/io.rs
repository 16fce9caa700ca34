//! Decoding of replies and inbound notifications
//!
//! This module provides:
//! - `decode_response` for typed replies to requests
//! - `parse_notification_graceful` / `classify_notification` for inbound
//!   notifications, classifying unknown actions instead of failing
//! - `JsonlReader` for streaming JSONL reads (replay fixtures, logs)

use std::io::{BufRead, BufReader, Read};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::message::Notification;
use crate::error::{PaletteError, Result};

/// Maximum length for raw JSON in logs (page text can be large)
const MAX_RAW_LOG_PREVIEW: usize = 200;

/// Get a truncated preview of raw JSON for logging
pub fn log_preview(raw: &str) -> (&str, usize) {
    let len = raw.len();
    if len <= MAX_RAW_LOG_PREVIEW {
        return (raw, len);
    }
    let mut end = MAX_RAW_LOG_PREVIEW;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    (&raw[..end], len)
}

/// Decode the reply to `action` into its typed shape.
///
/// A reply carrying only an `error` string (the shape the background script
/// uses for exceptions) becomes `ActionFailed`; anything else that does not
/// fit becomes `InvalidResponse`.
pub fn decode_response<T: DeserializeOwned>(action: &'static str, value: Value) -> Result<T> {
    if let Some(message) = bare_error(&value) {
        return Err(PaletteError::ActionFailed {
            action,
            message: message.to_string(),
        });
    }
    serde_json::from_value(value).map_err(|e| PaletteError::InvalidResponse {
        action,
        detail: e.to_string(),
    })
}

fn bare_error(value: &Value) -> Option<&str> {
    let object = value.as_object()?;
    if object.contains_key("success") {
        return None;
    }
    object.get("error").and_then(Value::as_str)
}

/// Result type for graceful notification parsing
#[derive(Debug)]
pub enum NotificationParse {
    /// Successfully parsed a known notification
    Ok(Notification),
    /// Message has no "action" field
    MissingAction {
        /// Truncated raw JSON for debugging
        raw: String,
    },
    /// Valid JSON with an "action" the palette does not handle
    UnknownAction {
        action: String,
        /// Truncated raw JSON for debugging
        raw: String,
    },
    /// Known action but invalid payload
    InvalidPayload {
        action: String,
        error: String,
        raw: String,
    },
    /// JSON parsing failed entirely (syntax error)
    ParseError(serde_json::Error),
}

/// Parse a raw JSON notification, classifying unknown actions.
pub fn parse_notification_graceful(line: &str) -> NotificationParse {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => classify_notification(value),
        Err(e) => NotificationParse::ParseError(e),
    }
}

/// Classify an already-decoded runtime message.
///
/// # Classification Logic
/// - Missing "action" field → `MissingAction`
/// - Unknown action value → `UnknownAction`
/// - Known action with invalid payload → `InvalidPayload`
pub fn classify_notification(value: Value) -> NotificationParse {
    let raw = value.to_string();
    let (preview, _) = log_preview(&raw);
    let preview = preview.to_string();

    let action = match value.get("action").and_then(Value::as_str) {
        Some(action) => action.to_string(),
        None => return NotificationParse::MissingAction { raw: preview },
    };

    match serde_json::from_value::<Notification>(value) {
        Ok(notification) => NotificationParse::Ok(notification),
        Err(e) => {
            let error = e.to_string();
            if error.contains("unknown variant") {
                NotificationParse::UnknownAction {
                    action,
                    raw: preview,
                }
            } else {
                NotificationParse::InvalidPayload {
                    action,
                    error,
                    raw: preview,
                }
            }
        }
    }
}

/// JSONL reader that skips blank and malformed lines
///
/// Uses a reusable line buffer to avoid allocating a new String per line.
pub struct JsonlReader<R: Read> {
    reader: BufReader<R>,
    line_buffer: String,
}

impl<R: Read> JsonlReader<R> {
    pub fn new(reader: R) -> Self {
        JsonlReader {
            reader: BufReader::new(reader),
            line_buffer: String::with_capacity(1024),
        }
    }

    /// Read the next line that decodes as `T`.
    ///
    /// # Returns
    /// * `Ok(Some(T))` - Successfully decoded line
    /// * `Ok(None)` - End of stream
    /// * `Err(e)` - IO error (decode errors are logged and skipped)
    pub fn next_item<T: DeserializeOwned>(&mut self) -> std::io::Result<Option<T>> {
        loop {
            self.line_buffer.clear();
            if self.reader.read_line(&mut self.line_buffer)? == 0 {
                debug!("Reached end of JSONL stream");
                return Ok(None);
            }
            let trimmed = self.line_buffer.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(trimmed) {
                Ok(item) => return Ok(Some(item)),
                Err(e) => {
                    let (preview, raw_len) = log_preview(trimmed);
                    warn!(
                        error = %e,
                        raw_preview = %preview,
                        raw_len = raw_len,
                        "Skipping malformed JSONL line"
                    );
                }
            }
        }
    }

    /// Read the next known notification, logging and skipping everything else.
    pub fn next_notification(&mut self) -> std::io::Result<Option<Notification>> {
        loop {
            self.line_buffer.clear();
            if self.reader.read_line(&mut self.line_buffer)? == 0 {
                return Ok(None);
            }
            let trimmed = self.line_buffer.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (preview, raw_len) = log_preview(trimmed);
            match parse_notification_graceful(trimmed) {
                NotificationParse::Ok(notification) => return Ok(Some(notification)),
                NotificationParse::MissingAction { .. } => {
                    warn!(raw_preview = %preview, raw_len, "Skipping message with missing 'action' field");
                }
                NotificationParse::UnknownAction { action, .. } => {
                    warn!(action = %action, raw_preview = %preview, "Skipping unknown action");
                }
                NotificationParse::InvalidPayload { action, error, .. } => {
                    warn!(action = %action, error = %error, raw_preview = %preview, "Skipping notification with invalid payload");
                }
                NotificationParse::ParseError(e) => {
                    warn!(error = %e, raw_preview = %preview, raw_len, "Skipping malformed JSON message");
                }
            }
        }
    }
}
