//! Out-of-band tamper alerts.
//!
//! A rejection hands a [`TamperEvent`] to the [`AlertTrigger`], which spawns a
//! detached task to deliver it through an [`AlertSink`]. The task is never
//! joined: the response goes out without waiting, and delivery errors or
//! panics stay inside the task.
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{error, warn};

/// Default destination identifier for bounty alerts.
pub const DEFAULT_ALERT_DESTINATION: &str = "8Bc...XMR";

#[derive(Debug, Clone, Serialize)]
pub struct TamperEvent {
    pub fingerprint: Fingerprint,
    pub detected_at: SystemTime,
    pub destination: String,
}

/// Where tamper alerts end up. Implementations must tolerate being called
/// concurrently from many detached tasks.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&self, event: &TamperEvent) -> Result<()>;
}

/// Emits the alert as a log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn notify(&self, event: &TamperEvent) -> Result<()> {
        warn!(
            destination = %event.destination,
            fingerprint = %event.fingerprint.short(),
            "Bounty alert triggered"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct AlertTrigger {
    sink: Arc<dyn AlertSink>,
    destination: String,
}

impl AlertTrigger {
    pub fn new(sink: Arc<dyn AlertSink>, destination: impl Into<String>) -> Self {
        Self {
            sink,
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Fires one alert for `fingerprint` and returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger(&self, fingerprint: Fingerprint) {
        let event = TamperEvent {
            fingerprint,
            detected_at: SystemTime::now(),
            destination: self.destination.clone(),
        };
        let sink = Arc::clone(&self.sink);

        // Unsupervised: the handle is dropped on purpose.
        tokio::spawn(async move {
            if let Err(e) = sink.notify(&event).await {
                error!(
                    destination = %event.destination,
                    fingerprint = %event.fingerprint.short(),
                    "Alert delivery failed: {}",
                    e
                );
            }
        });
    }
}

impl Default for AlertTrigger {
    fn default() -> Self {
        Self::new(Arc::new(LogAlertSink), DEFAULT_ALERT_DESTINATION)
    }
}

impl std::fmt::Debug for AlertTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AlertTrigger {{ destination: {} }}", self.destination)
    }
}
