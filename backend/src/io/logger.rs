//! Logger collaborator
//!
//! Sink for human-readable messages about recoverable failures (load and
//! advance errors). The default implementation forwards to `tracing`.

use std::sync::{Arc, Mutex};

/// Receives status and error messages
pub trait Logger: Send + Sync {
    fn report(&self, message: &str);
}

/// Forwards every report to `tracing::error!`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn report(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Collects reports in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Logger for MemoryLogger {
    fn report(&self, message: &str) {
        let mut messages = self
            .messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        messages.push(message.to_string());
    }
}
