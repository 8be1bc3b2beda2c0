//! # alertgram-audit
//!
//! Audit trail for alert mutations performed from chat.
//!
//! Every button press that changes an alert (status change, untag, blackout)
//! produces an [`AuditEvent`] that is handed to an [`AuditLogger`].
//!
//! ## Example
//!
//! ```rust
//! use alertgram_audit::{AuditEvent, AuditLogger, RequestContext, TracingAuditLogger};
//!
//! let logger = TracingAuditLogger::new();
//!
//! let event = AuditEvent::builder()
//!     .webhook_updated()
//!     .actor("Ada Lovelace")
//!     .customers(vec!["acme".to_string()])
//!     .resource_id("6d1a8e3c-51a9-4d6b-9a64-58e0f2e6a0d4")
//!     .action("ack")
//!     .request(RequestContext::new("/api/webhooks/telegram"))
//!     .build();
//!
//! if let Ok(event) = event {
//!     logger.log(&event);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod logger;

pub use error::{AuditError, Result};
pub use events::{AuditEvent, AuditEventBuilder, RequestContext, Severity};
pub use logger::{AuditLogger, MemoryAuditLogger, NoopAuditLogger, TracingAuditLogger};
