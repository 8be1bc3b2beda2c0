//! Audit event types.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuditError, Result};

/// Severity level for audit events, fixed by the kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine change (status change, untag).
    Info = 0,
    /// Change with wider effect (blackout).
    Low = 1,
}

impl Severity {
    /// Returns the string representation of this severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The HTTP request that caused an audited change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Request path.
    pub endpoint: String,
    /// HTTP method.
    pub method: String,
    /// Peer address, when known.
    pub remote_addr: Option<String>,
    /// `User-Agent` header, when present.
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Creates a context for a `POST` to `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: "POST".to_string(),
            remote_addr: None,
            user_agent: None,
        }
    }

    /// Sets the peer address.
    #[must_use]
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
}

/// An audited change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuditEvent {
    /// An alert was changed from a chat button.
    WebhookUpdated {
        /// Unique event identifier.
        event_id: Uuid,
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// Severity level.
        severity: Severity,
        /// Display name of the chat user.
        actor: String,
        /// Customers the actor is scoped to.
        customers: Vec<String>,
        /// Permission scopes granted to the actor.
        scopes: Vec<String>,
        /// Identifier of the changed resource.
        resource_id: String,
        /// Kind of the changed resource, `alert` for alerts.
        resource_type: String,
        /// Command that was applied.
        action: String,
        /// Originating request.
        request: RequestContext,
        /// Additional metadata.
        #[serde(default)]
        metadata: HashMap<String, serde_json::Value>,
    },

    /// A blackout window was created from a chat button.
    BlackoutCreated {
        /// Unique event identifier.
        event_id: Uuid,
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// Severity level.
        severity: Severity,
        /// Display name of the chat user.
        actor: String,
        /// Customers the actor is scoped to.
        customers: Vec<String>,
        /// Environment the blackout applies to.
        environment: String,
        /// Blacked-out resource.
        resource: String,
        /// Blacked-out event.
        event: String,
        /// Blackout length in seconds.
        duration_secs: u64,
        /// Originating request.
        request: RequestContext,
        /// Additional metadata.
        #[serde(default)]
        metadata: HashMap<String, serde_json::Value>,
    },
}

impl AuditEvent {
    /// Creates a new event builder.
    #[must_use]
    pub fn builder() -> AuditEventBuilder {
        AuditEventBuilder::default()
    }

    /// Returns the event ID.
    #[must_use]
    pub const fn event_id(&self) -> Uuid {
        match self {
            Self::WebhookUpdated { event_id, .. } | Self::BlackoutCreated { event_id, .. } => {
                *event_id
            }
        }
    }

    /// Returns the event timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::WebhookUpdated { timestamp, .. } | Self::BlackoutCreated { timestamp, .. } => {
                *timestamp
            }
        }
    }

    /// Returns the severity level.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::WebhookUpdated { severity, .. } | Self::BlackoutCreated { severity, .. } => {
                *severity
            }
        }
    }

    /// Returns the actor's display name.
    #[must_use]
    pub fn actor(&self) -> &str {
        match self {
            Self::WebhookUpdated { actor, .. } | Self::BlackoutCreated { actor, .. } => actor,
        }
    }

    /// Returns the event type as a string.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::WebhookUpdated { .. } => "webhook-updated",
            Self::BlackoutCreated { .. } => "blackout-created",
        }
    }

    /// Serializes the event to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(AuditError::from)
    }
}

#[derive(Debug, Clone, Copy)]
enum EventType {
    WebhookUpdated,
    BlackoutCreated,
}

/// Builder for audit events.
#[derive(Debug, Default)]
pub struct AuditEventBuilder {
    event_type: Option<EventType>,
    actor: Option<String>,
    customers: Vec<String>,
    scopes: Vec<String>,
    resource_id: Option<String>,
    action: Option<String>,
    environment: Option<String>,
    resource: Option<String>,
    event: Option<String>,
    duration_secs: Option<u64>,
    request: RequestContext,
    metadata: HashMap<String, serde_json::Value>,
}

impl AuditEventBuilder {
    /// Sets this as a `webhook-updated` event.
    #[must_use]
    pub fn webhook_updated(mut self) -> Self {
        self.event_type = Some(EventType::WebhookUpdated);
        self
    }

    /// Sets this as a `blackout-created` event.
    #[must_use]
    pub fn blackout_created(mut self) -> Self {
        self.event_type = Some(EventType::BlackoutCreated);
        self
    }

    /// Sets the actor.
    #[must_use]
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Sets the customers the actor is scoped to.
    #[must_use]
    pub fn customers(mut self, customers: Vec<String>) -> Self {
        self.customers = customers;
        self
    }

    /// Sets the actor's scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the changed alert's identifier.
    #[must_use]
    pub fn resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    /// Sets the applied command.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the blackout target.
    #[must_use]
    pub fn blackout(
        mut self,
        environment: impl Into<String>,
        resource: impl Into<String>,
        event: impl Into<String>,
        duration_secs: u64,
    ) -> Self {
        self.environment = Some(environment.into());
        self.resource = Some(resource.into());
        self.event = Some(event.into());
        self.duration_secs = Some(duration_secs);
        self
    }

    /// Sets the originating request.
    #[must_use]
    pub fn request(mut self, request: RequestContext) -> Self {
        self.request = request;
        self
    }

    /// Adds metadata.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Builds the event.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::MissingField` if the event type or a field
    /// required by it was not set.
    pub fn build(self) -> Result<AuditEvent> {
        let event_type = self.event_type.ok_or(AuditError::MissingField("event_type"))?;
        let actor = self.actor.ok_or(AuditError::MissingField("actor"))?;

        match event_type {
            EventType::WebhookUpdated => Ok(AuditEvent::WebhookUpdated {
                event_id: Uuid::new_v4(),
                timestamp: Utc::now(),
                severity: Severity::Info,
                actor,
                customers: self.customers,
                scopes: self.scopes,
                resource_id: self
                    .resource_id
                    .ok_or(AuditError::MissingField("resource_id"))?,
                resource_type: "alert".to_string(),
                action: self.action.ok_or(AuditError::MissingField("action"))?,
                request: self.request,
                metadata: self.metadata,
            }),
            EventType::BlackoutCreated => Ok(AuditEvent::BlackoutCreated {
                event_id: Uuid::new_v4(),
                timestamp: Utc::now(),
                severity: Severity::Low,
                actor,
                customers: self.customers,
                environment: self
                    .environment
                    .ok_or(AuditError::MissingField("environment"))?,
                resource: self.resource.ok_or(AuditError::MissingField("resource"))?,
                event: self.event.ok_or(AuditError::MissingField("event"))?,
                duration_secs: self
                    .duration_secs
                    .ok_or(AuditError::MissingField("duration_secs"))?,
                request: self.request,
                metadata: self.metadata,
            }),
        }
    }
}
