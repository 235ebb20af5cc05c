//! User-facing notification bus
//!
//! Anything that needs to tell the user about a success or failure is handed
//! an [`AlertBus`] and publishes on it; the presentation layer subscribes.
//! An alert published while nobody listens is dropped with a warning, except
//! for deferred alerts which wait for the next subscriber.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// How long an alert stays on screen unless overridden
pub const DEFAULT_ALERT_DURATION: Duration = Duration::from_millis(5000);

const CHANNEL_CAPACITY: usize = 64;

/// Alert kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Error,
    Warning,
    Info,
}

impl AlertKind {
    /// Title used when none is given
    pub fn default_title(self) -> &'static str {
        match self {
            AlertKind::Success => "Success!",
            AlertKind::Error => "Error!",
            AlertKind::Warning => "Warning!",
            AlertKind::Info => "Information",
        }
    }
}

/// A single notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    /// Zero keeps the alert until dismissed
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl Alert {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: kind.default_title().to_string(),
            message: message.into(),
            duration: DEFAULT_ALERT_DURATION,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_sticky(&self) -> bool {
        self.duration.is_zero()
    }
}

#[derive(Debug)]
struct Inner {
    sender: broadcast::Sender<Alert>,
    deferred: Mutex<Option<Alert>>,
}

/// Receiving end of an [`AlertBus`] subscription
#[derive(Debug)]
pub struct AlertReceiver {
    deferred: Option<Alert>,
    receiver: broadcast::Receiver<Alert>,
}

impl AlertReceiver {
    pub async fn recv(&mut self) -> Result<Alert, broadcast::error::RecvError> {
        if let Some(alert) = self.deferred.take() {
            return Ok(alert);
        }
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Alert, broadcast::error::TryRecvError> {
        if let Some(alert) = self.deferred.take() {
            return Ok(alert);
        }
        self.receiver.try_recv()
    }
}

/// Notification sink shared by every component that reports to the user
#[derive(Debug, Clone)]
pub struct AlertBus {
    inner: Arc<Inner>,
}

impl AlertBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                sender,
                deferred: Mutex::new(None),
            }),
        }
    }

    /// Publish an alert with the kind's default title
    pub fn notify(&self, kind: AlertKind, message: impl Into<String>) {
        self.publish(Alert::new(kind, message));
    }

    pub fn notify_with_title(
        &self,
        kind: AlertKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.publish(Alert::new(kind, message).with_title(title));
    }

    /// Deliver to current subscribers; dropped if there are none
    pub fn publish(&self, alert: Alert) {
        debug!(kind = ?alert.kind, "publishing alert");
        if let Err(broadcast::error::SendError(alert)) = self.inner.sender.send(alert) {
            warn!(message = %alert.message, "no alert subscriber, dropping alert");
        }
    }

    /// Hold an alert for the next subscriber, replacing any held one
    pub fn defer(&self, alert: Alert) {
        *self.inner.deferred.lock() = Some(alert);
    }

    /// Subscribe; a deferred alert goes to this subscriber alone
    pub fn subscribe(&self) -> AlertReceiver {
        AlertReceiver {
            deferred: self.inner.deferred.lock().take(),
            receiver: self.inner.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }
}

impl Default for AlertBus {
    fn default() -> Self {
        Self::new()
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
