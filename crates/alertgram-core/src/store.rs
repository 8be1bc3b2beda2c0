//! Access to the alert platform's alert records.
//!
//! [`AlertStore`] is the narrow interface the bridge needs: look up one alert,
//! find related open alerts, and request a few mutations. The HTTP
//! implementation lives in the server crate; [`InMemoryAlertStore`] backs
//! tests and dry runs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{AlertError, Result};
use crate::types::{Alert, AlertStatus, Blackout, HistoryEntry, StatusChange};

/// Operations on the alert platform used by alertgram.
pub trait AlertStore: Send + Sync + fmt::Debug {
    /// Finds an alert by id, restricted to `customers` when non-empty.
    fn find_by_id<'a>(
        &'a self,
        id: &'a str,
        customers: &'a [String],
    ) -> BoxFuture<'a, Result<Option<Alert>>>;

    /// Finds open alerts whose `link_field` equals `value`, other than
    /// `exclude_id`.
    fn find_open_linked<'a>(
        &'a self,
        link_field: &'a str,
        value: &'a str,
        exclude_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Alert>>>;

    /// Applies a status change.
    fn set_status<'a>(&'a self, id: &'a str, change: &'a StatusChange)
    -> BoxFuture<'a, Result<()>>;

    /// Removes tags from an alert.
    fn untag<'a>(&'a self, id: &'a str, tags: &'a [String]) -> BoxFuture<'a, Result<()>>;

    /// Creates a blackout window and returns its identifier.
    fn create_blackout<'a>(&'a self, blackout: &'a Blackout) -> BoxFuture<'a, Result<String>>;
}

/// Returns true if an alert owned by `customer` is visible to `customers`.
///
/// An empty scope sees everything.
#[must_use]
pub fn customer_visible(customer: Option<&str>, customers: &[String]) -> bool {
    customers.is_empty() || customer.is_some_and(|c| customers.iter().any(|allowed| allowed == c))
}

/// Alert store held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAlertStore {
    alerts: Arc<RwLock<HashMap<String, Alert>>>,
    blackouts: Arc<RwLock<Vec<Blackout>>>,
}

impl InMemoryAlertStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an alert.
    pub fn insert(&self, alert: Alert) {
        self.alerts.write().insert(alert.id.clone(), alert);
    }

    /// Returns a copy of an alert, ignoring customer scope.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Alert> {
        self.alerts.read().get(id).cloned()
    }

    /// Returns the number of stored alerts.
    #[must_use]
    pub fn alert_count(&self) -> usize {
        self.alerts.read().len()
    }

    /// Returns every blackout created so far.
    #[must_use]
    pub fn blackouts(&self) -> Vec<Blackout> {
        self.blackouts.read().clone()
    }

    fn with_alert<T>(&self, id: &str, f: impl FnOnce(&mut Alert) -> T) -> Result<T> {
        let mut alerts = self.alerts.write();
        let alert = alerts.get_mut(id).ok_or_else(|| AlertError::AlertNotFound {
            id: id.to_string(),
        })?;
        Ok(f(alert))
    }
}

impl AlertStore for InMemoryAlertStore {
    fn find_by_id<'a>(
        &'a self,
        id: &'a str,
        customers: &'a [String],
    ) -> BoxFuture<'a, Result<Option<Alert>>> {
        Box::pin(async move {
            let alerts = self.alerts.read();
            Ok(alerts
                .get(id)
                .filter(|a| customer_visible(a.customer.as_deref(), customers))
                .cloned())
        })
    }

    fn find_open_linked<'a>(
        &'a self,
        link_field: &'a str,
        value: &'a str,
        exclude_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Alert>>> {
        Box::pin(async move {
            if !Alert::is_field(link_field) {
                return Err(AlertError::UnknownField {
                    name: link_field.to_string(),
                });
            }

            let alerts = self.alerts.read();
            let mut linked = Vec::new();

            for alert in alerts.values() {
                if alert.status != AlertStatus::Open || alert.id == exclude_id {
                    continue;
                }
                if alert.field_text(link_field)?.as_deref() == Some(value) {
                    linked.push(alert.clone());
                }
            }

            debug!(link_field, value, found = linked.len(), "linked open alerts");
            Ok(linked)
        })
    }

    fn set_status<'a>(
        &'a self,
        id: &'a str,
        change: &'a StatusChange,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.with_alert(id, |alert| {
                alert.status = change.status;
                if let Some(timeout) = change.timeout {
                    alert.timeout = Some(timeout);
                }
                alert.history.insert(
                    0,
                    HistoryEntry {
                        id: Some(alert.id.clone()),
                        event: Some(alert.event.clone()),
                        severity: Some(alert.severity.clone()),
                        status: Some(change.status),
                        text: Some(change.text.clone()),
                        change_type: Some("status".to_string()),
                        ..HistoryEntry::default()
                    },
                );
            })?;

            info!(alert_id = %id, status = %change.status, "alert status changed");
            Ok(())
        })
    }

    fn untag<'a>(&'a self, id: &'a str, tags: &'a [String]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.with_alert(id, |alert| alert.tags.retain(|t| !tags.contains(t)))?;
            debug!(alert_id = %id, ?tags, "alert untagged");
            Ok(())
        })
    }

    fn create_blackout<'a>(&'a self, blackout: &'a Blackout) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let mut blackouts = self.blackouts.write();
            blackouts.push(blackout.clone());
            let id = format!("blackout-{}", blackouts.len());

            info!(
                blackout_id = %id,
                environment = %blackout.environment,
                resource = %blackout.resource,
                event = %blackout.event,
                duration_secs = blackout.duration.as_secs(),
                "blackout created"
            );
            Ok(id)
        })
    }
}
