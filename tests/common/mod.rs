use async_trait::async_trait;
use axum::Router;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;
use tamper_gate::api::create_router;
use tamper_gate::known_good::{DEFAULT_SEEDS, build_filter, seed_fingerprints};
use tamper_gate::{
    AlertSink, AlertTrigger, AppState, FilterConfigBuilder, FingerprintFilter, Result,
    TamperEvent,
};
use tokio::sync::mpsc;

/// Counts alerts and reports each one on a channel.
pub struct RecordingSink {
    pub calls: Arc<AtomicUsize>,
    events: mpsc::UnboundedSender<TamperEvent>,
}

impl RecordingSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TamperEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            calls: Arc::new(AtomicUsize::new(0)),
            events: tx,
        };
        (sink, rx)
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn notify(&self, event: &TamperEvent) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.events.send(event.clone());
        Ok(())
    }
}

/// Holds every alert for `delay` before finishing.
pub struct SlowSink {
    pub delay: Duration,
    pub finished: Arc<AtomicUsize>,
}

#[async_trait]
impl AlertSink for SlowSink {
    async fn notify(&self, _event: &TamperEvent) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Router over a default-sized filter holding the built-in seeds.
#[allow(dead_code)]
pub fn setup_test_app(sink: Arc<dyn AlertSink>) -> Router {
    setup_test_app_with_limits(sink, 1024 * 1024, Duration::from_secs(5))
}

#[allow(dead_code)]
pub fn setup_test_app_with_limits(
    sink: Arc<dyn AlertSink>,
    max_body_bytes: usize,
    body_read_timeout: Duration,
) -> Router {
    let filter = build_filter(
        FilterConfigBuilder::default().build().unwrap(),
        &seed_fingerprints(&DEFAULT_SEEDS),
    )
    .unwrap();
    setup_test_app_with_filter(sink, filter, max_body_bytes, body_read_timeout)
}

#[allow(dead_code)]
pub fn setup_test_app_with_filter(
    sink: Arc<dyn AlertSink>,
    filter: FingerprintFilter,
    max_body_bytes: usize,
    body_read_timeout: Duration,
) -> Router {
    let state = AppState::new(filter, AlertTrigger::new(sink, "test-destination"))
        .with_limits(max_body_bytes, body_read_timeout);

    create_router(Arc::new(state))
}
