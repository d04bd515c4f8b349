//! Diagnostics tracing layer.
//!
//! Captures WARN and ERROR events into a bounded in-memory buffer so the
//! shell can show recent problems (e.g. a failed audit log fetch that the
//! view itself does not report).

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Events kept when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 100;

/// One captured log event.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DiagnosticEvent {
    /// Module path of the emitting code (e.g. `recs_application::audit_view`)
    pub target: String,
    /// WARN or ERROR
    pub level: String,
    pub message: String,
    /// Structured fields other than `message`
    pub fields: BTreeMap<String, Value>,
    pub timestamp: DateTime<Utc>,
}

/// A tracing layer that forwards WARN+ events to a channel.
pub struct DiagnosticsLayer {
    sender: mpsc::UnboundedSender<DiagnosticEvent>,
}

impl DiagnosticsLayer {
    pub fn new(sender: mpsc::UnboundedSender<DiagnosticEvent>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for DiagnosticsLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > Level::WARN {
            return;
        }

        let mut fields = BTreeMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        let message = match fields.remove("message") {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        // Receiver gone means nobody is collecting anymore.
        let _ = self.sender.send(DiagnosticEvent {
            target: event.metadata().target().to_string(),
            level: level.to_string(),
            message,
            fields,
            timestamp: Utc::now(),
        });
    }
}

struct FieldVisitor<'a>(&'a mut BTreeMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(format!("{:?}", value)));
    }
}

/// Most recent diagnostic events, oldest first.
#[derive(Debug, Clone)]
pub struct DiagnosticsBuffer {
    events: Arc<Mutex<VecDeque<DiagnosticEvent>>>,
    capacity: usize,
}

impl Default for DiagnosticsBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DiagnosticsBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Appends `event`, evicting the oldest one when full.
    pub async fn push(&self, event: DiagnosticEvent) {
        let mut events = self.events.lock().await;
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    pub async fn snapshot(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }

    /// Spawns a task that moves events from `receiver` into this buffer
    /// until every sender is dropped.
    pub fn collect(&self, mut receiver: mpsc::UnboundedReceiver<DiagnosticEvent>) -> JoinHandle<()> {
        let buffer = self.clone();
        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                buffer.push(event).await;
            }
        })
    }
}

/// A layer plus the buffer it feeds. The collecting task is spawned on the
/// current runtime.
pub fn diagnostics(capacity: usize) -> (DiagnosticsLayer, DiagnosticsBuffer) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let buffer = DiagnosticsBuffer::new(capacity);
    buffer.collect(receiver);
    (DiagnosticsLayer::new(sender), buffer)
}
