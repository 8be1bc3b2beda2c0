//! Core types shared by the notifier, the inhibition evaluator and the
//! callback handler.
//!
//! - [`Alert`]: an alert record as published by the alert platform
//! - [`AlertStatus`]: lifecycle status of an alert
//! - [`HistoryEntry`]: one prior status/severity record
//! - [`StatusChange`]: a requested status transition
//! - [`Blackout`]: a time-bounded suppression window

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AlertError, Result};

/// Lifecycle status of an alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Newly raised or re-opened.
    #[default]
    Open,
    /// Assigned to someone.
    Assign,
    /// Acknowledged.
    Ack,
    /// Closed.
    Closed,
    /// Timed out without being closed.
    Expired,
    /// Received during a blackout window.
    Blackout,
    /// Shelved.
    Shelved,
    /// Anything the platform reports that is not one of the above.
    #[serde(other)]
    Unknown,
}

impl AlertStatus {
    /// Returns the status as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assign => "assign",
            Self::Ack => "ack",
            Self::Closed => "closed",
            Self::Expired => "expired",
            Self::Blackout => "blackout",
            Self::Shelved => "shelved",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(Self::Open),
            "assign" => Ok(Self::Assign),
            "ack" => Ok(Self::Ack),
            "closed" => Ok(Self::Closed),
            "expired" => Ok(Self::Expired),
            "blackout" => Ok(Self::Blackout),
            "shelved" => Ok(Self::Shelved),
            "unknown" => Ok(Self::Unknown),
            other => Err(AlertError::Serialization(format!(
                "unknown alert status: {other}"
            ))),
        }
    }
}

/// A prior status or severity record of an alert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Identifier of the alert instance this entry was recorded for.
    #[serde(default)]
    pub id: Option<String>,
    /// Event name at the time.
    #[serde(default)]
    pub event: Option<String>,
    /// Severity at the time.
    #[serde(default)]
    pub severity: Option<String>,
    /// Status at the time.
    #[serde(default)]
    pub status: Option<AlertStatus>,
    /// Value at the time.
    #[serde(default)]
    pub value: Option<String>,
    /// Change description.
    #[serde(default)]
    pub text: Option<String>,
    /// Kind of change (`severity`, `status`, `action`, ...).
    #[serde(default, rename = "type")]
    pub change_type: Option<String>,
    /// When the change happened.
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
}

/// An alert record.
///
/// Field names follow the platform's camelCase JSON shape. `history` is
/// ordered most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique identifier.
    pub id: String,
    /// Resource the alert is about.
    pub resource: String,
    /// Event name.
    pub event: String,
    /// Environment, e.g. `Production`.
    #[serde(default)]
    pub environment: String,
    /// Severity name.
    #[serde(default)]
    pub severity: String,
    /// Current status.
    #[serde(default)]
    pub status: AlertStatus,
    /// Source group, e.g. the integration that raised it.
    #[serde(default)]
    pub group: String,
    /// Owning customer, for multi-tenant installations.
    #[serde(default)]
    pub customer: Option<String>,
    /// Affected services.
    #[serde(default)]
    pub service: Vec<String>,
    /// Measured value.
    #[serde(default)]
    pub value: Option<String>,
    /// Description.
    #[serde(default)]
    pub text: String,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form attributes.
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
    /// Sender of the alert.
    #[serde(default)]
    pub origin: Option<String>,
    /// Alert type.
    #[serde(default, rename = "type")]
    pub alert_type: Option<String>,
    /// Timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Raw payload as received by the platform.
    #[serde(default)]
    pub raw_data: Option<String>,
    /// Number of duplicates received.
    #[serde(default)]
    pub duplicate_count: u64,
    /// Whether this event repeats the latest known state of the alert.
    #[serde(default)]
    pub repeat: bool,
    /// Severity before the latest change.
    #[serde(default)]
    pub previous_severity: Option<String>,
    /// When the alert was created.
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    /// When the alert was first received.
    #[serde(default)]
    pub receive_time: Option<DateTime<Utc>>,
    /// When the latest duplicate was received.
    #[serde(default)]
    pub last_receive_time: Option<DateTime<Utc>>,
    /// When the alert last changed.
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
    /// Prior states, most recent first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Alert {
    /// Field names accepted by [`Alert::field`].
    ///
    /// Attributes are reachable as `attributes.<key>`.
    pub const FIELDS: &'static [&'static str] = &[
        "id",
        "resource",
        "event",
        "environment",
        "severity",
        "status",
        "group",
        "customer",
        "service",
        "value",
        "text",
        "tags",
        "origin",
        "type",
        "timeout",
        "raw_data",
        "duplicate_count",
        "repeat",
        "previous_severity",
        "create_time",
        "receive_time",
        "last_receive_time",
        "update_time",
    ];

    /// Creates an open alert with the given identity.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        resource: impl Into<String>,
        event: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            resource: resource.into(),
            event: event.into(),
            ..Self::default()
        }
    }

    /// First eight characters of the identifier.
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id
            .char_indices()
            .nth(8)
            .map_or(self.id.as_str(), |(idx, _)| &self.id[..idx])
    }

    /// Most recent history entry.
    #[must_use]
    pub fn previous(&self) -> Option<&HistoryEntry> {
        self.history.first()
    }

    /// Returns true if `name` is in [`Alert::FIELDS`] or has the form
    /// `attributes.<key>`.
    #[must_use]
    pub fn is_field(name: &str) -> bool {
        Self::FIELDS.contains(&name)
            || name
                .strip_prefix("attributes.")
                .is_some_and(|key| !key.is_empty())
    }

    /// Looks up a field by name, yielding `None` for an attribute this alert
    /// does not carry.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::UnknownField` if [`Alert::is_field`] rejects
    /// `name`.
    pub fn field(&self, name: &str) -> Result<Option<Value>> {
        fn time(t: Option<DateTime<Utc>>) -> Value {
            t.map_or(Value::Null, |t| Value::String(t.to_rfc3339()))
        }
        fn opt(s: Option<&String>) -> Value {
            s.map_or(Value::Null, |s| Value::String(s.clone()))
        }

        if !Self::is_field(name) {
            return Err(AlertError::UnknownField {
                name: name.to_string(),
            });
        }

        let value = match name {
            "id" => Value::String(self.id.clone()),
            "resource" => Value::String(self.resource.clone()),
            "event" => Value::String(self.event.clone()),
            "environment" => Value::String(self.environment.clone()),
            "severity" => Value::String(self.severity.clone()),
            "status" => Value::String(self.status.to_string()),
            "group" => Value::String(self.group.clone()),
            "customer" => opt(self.customer.as_ref()),
            "service" => Value::from(self.service.clone()),
            "value" => opt(self.value.as_ref()),
            "text" => Value::String(self.text.clone()),
            "tags" => Value::from(self.tags.clone()),
            "origin" => opt(self.origin.as_ref()),
            "type" => opt(self.alert_type.as_ref()),
            "timeout" => self.timeout.map_or(Value::Null, Value::from),
            "raw_data" => opt(self.raw_data.as_ref()),
            "duplicate_count" => Value::from(self.duplicate_count),
            "repeat" => Value::Bool(self.repeat),
            "previous_severity" => opt(self.previous_severity.as_ref()),
            "create_time" => time(self.create_time),
            "receive_time" => time(self.receive_time),
            "last_receive_time" => time(self.last_receive_time),
            "update_time" => time(self.update_time),
            other => {
                return Ok(other
                    .strip_prefix("attributes.")
                    .and_then(|key| self.attributes.get(key))
                    .cloned());
            }
        };

        Ok(Some(value))
    }

    /// Looks up a field and renders it as text for pattern matching.
    ///
    /// Strings are returned as-is, null as the empty string and lists are
    /// joined with `", "`.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::UnknownField` as [`Alert::field`] does.
    pub fn field_text(&self, name: &str) -> Result<Option<String>> {
        Ok(self.field(name)?.as_ref().map(value_text))
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// A requested status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Target status.
    pub status: AlertStatus,
    /// Note recorded with the change.
    pub text: String,
    /// Optional timeout in seconds applied with the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl StatusChange {
    /// Creates a status change with a note.
    #[must_use]
    pub fn new(status: AlertStatus, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
            timeout: None,
        }
    }

    /// Sets the timeout applied with the change.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A time-bounded suppression window for a resource/event pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blackout {
    /// Environment the window applies to.
    pub environment: String,
    /// Suppressed resource.
    pub resource: String,
    /// Suppressed event.
    pub event: String,
    /// Window length.
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    /// Note recorded with the window.
    pub text: String,
}

impl Blackout {
    /// Creates a blackout window.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidBlackout` if the duration is zero or the
    /// resource or event is empty.
    pub fn new(
        environment: impl Into<String>,
        resource: impl Into<String>,
        event: impl Into<String>,
        duration: Duration,
    ) -> Result<Self> {
        let resource = resource.into();
        let event = event.into();

        if duration.is_zero() {
            return Err(AlertError::InvalidBlackout {
                reason: "duration must be positive".to_string(),
            });
        }
        if resource.is_empty() || event.is_empty() {
            return Err(AlertError::InvalidBlackout {
                reason: "resource and event are required".to_string(),
            });
        }

        Ok(Self {
            environment: environment.into(),
            resource,
            event,
            duration,
            text: String::new(),
        })
    }

    /// Sets the note recorded with the window.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
