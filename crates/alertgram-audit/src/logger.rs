//! Audit logging backends.

use parking_lot::Mutex;

use crate::events::AuditEvent;

/// Trait for audit logging backends.
pub trait AuditLogger: Send + Sync {
    /// Logs an audit event.
    fn log(&self, event: &AuditEvent);
}

/// Audit logger that writes through `tracing` under the `alertgram_audit`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

impl TracingAuditLogger {
    /// Creates a new tracing-based audit logger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditLogger for TracingAuditLogger {
    fn log(&self, event: &AuditEvent) {
        let event_type = event.event_type();
        let json = event.to_json().unwrap_or_else(|_| "{}".to_string());

        tracing::info!(
            target: "alertgram_audit",
            event_id = %event.event_id(),
            %event_type,
            severity = %event.severity(),
            actor = event.actor(),
            event_json = %json,
            "[AUDIT] {event_type}"
        );
    }
}

/// A no-op audit logger for disabled auditing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditLogger;

impl NoopAuditLogger {
    /// Creates a new no-op audit logger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditLogger for NoopAuditLogger {
    fn log(&self, _event: &AuditEvent) {}
}

/// Audit logger that keeps events in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryAuditLogger {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditLogger {
    /// Creates an empty in-memory logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every logged event, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

impl AuditLogger for MemoryAuditLogger {
    fn log(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}
