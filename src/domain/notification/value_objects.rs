use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// Notification Value Objects
// ============================================================================

/// Opaque identifier of a notification, only used for targeted removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

/// A message raised for the user. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    id: NotificationId,
    message: String,
    kind: NotificationKind,
    #[serde(rename = "expiry_ms", serialize_with = "serialize_millis")]
    expiry: Duration,
    created_at: DateTime<Utc>,
}

impl Notification {
    pub(crate) fn new(message: String, kind: NotificationKind, expiry: Duration) -> Self {
        Self {
            id: NotificationId::new(),
            message,
            kind,
            expiry,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> NotificationId {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Zero means the notification stays until removed.
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn expiry_ms(&self) -> u64 {
        self.expiry.as_millis() as u64
    }

    pub fn is_persistent(&self) -> bool {
        self.expiry.is_zero()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn serialize_millis<S: Serializer>(expiry: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(expiry.as_millis() as u64)
}
