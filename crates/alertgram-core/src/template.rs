//! Message templates.
//!
//! Messages are rendered with handlebars in strict mode, so a template that
//! references a field the alert does not have fails to render instead of
//! silently printing nothing. Output is not HTML-escaped; the chat parses it
//! as Markdown.
//!
//! Two helpers are registered:
//!
//! - `capitalize`: upper-cases the first character and lower-cases the rest
//! - `md_escape`: escapes `_` so it is not read as Markdown emphasis

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use handlebars::{Handlebars, handlebars_helper};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AlertError, Result};
use crate::types::{Alert, HistoryEntry};

/// Text sent when the template cannot be rendered.
pub const FALLBACK_TEXT: &str =
    "Something bad has happened but also we can't handle your telegram template message.";

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = r"
{{#if customer}}Customer: `{{customer}}` {{/if}}
*[{{capitalize status}}] {{environment}} {{capitalize severity}}*
{{md_escape event}} {{capitalize resource}}
```
{{text}}
```
";

const TEMPLATE_NAME: &str = "message";

const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn capitalize_str(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

handlebars_helper!(capitalize: |s: String| capitalize_str(&s));
handlebars_helper!(md_escape: |s: String| s.replace('_', "\\_"));

/// Where the message template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Built-in [`DEFAULT_TEMPLATE`].
    Default,
    /// Template file.
    File(PathBuf),
    /// Template text.
    Inline(String),
}

impl TemplateSource {
    /// Interprets a configured template setting.
    ///
    /// A setting naming an existing file is read from that file; any other
    /// non-empty setting is template text.
    #[must_use]
    pub fn from_setting(setting: Option<&str>) -> Self {
        match setting.map(str::trim) {
            None | Some("") => Self::Default,
            Some(s) if Path::new(s).is_file() => Self::File(PathBuf::from(s)),
            Some(s) => Self::Inline(s.to_string()),
        }
    }
}

/// A compiled message template.
#[derive(Debug)]
pub struct MessageTemplate {
    registry: Handlebars<'static>,
}

impl MessageTemplate {
    /// Compiles the template from `source`.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::Template` if the file cannot be read or the
    /// template does not parse.
    pub fn compile(source: &TemplateSource) -> Result<Self> {
        let text = match source {
            TemplateSource::Default => DEFAULT_TEMPLATE.to_string(),
            TemplateSource::Inline(text) => text.clone(),
            TemplateSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                AlertError::Template(format!("cannot read {}: {e}", path.display()))
            })?,
        };

        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("capitalize", Box::new(capitalize));
        registry.register_helper("md_escape", Box::new(md_escape));
        registry.register_template_string(TEMPLATE_NAME, text)?;

        debug!(?source, "message template compiled");
        Ok(Self { registry })
    }

    /// Renders the template.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::Template` if rendering fails, including when the
    /// template references a missing field.
    pub fn render(&self, context: &MessageContext) -> Result<String> {
        Ok(self.registry.render(TEMPLATE_NAME, context)?)
    }

    /// Renders the template, substituting [`FALLBACK_TEXT`] on failure.
    #[must_use]
    pub fn render_or_fallback(&self, context: &MessageContext) -> String {
        self.render(context).unwrap_or_else(|e| {
            warn!(
                alert_id = %context.id,
                error = %e,
                "template rendering failed, using fallback text"
            );
            FALLBACK_TEXT.to_string()
        })
    }
}

/// Values exposed to the message template.
///
/// Times are shifted into the display timezone and formatted; the service
/// list is joined into one string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageContext {
    /// Alert identifier.
    pub id: String,
    /// First eight characters of the identifier.
    pub short_id: String,
    /// Resource.
    pub resource: String,
    /// Event name.
    pub event: String,
    /// Environment.
    pub environment: String,
    /// Severity.
    pub severity: String,
    /// Status.
    pub status: String,
    /// Group.
    pub group: String,
    /// Customer, null when unset.
    pub customer: Option<String>,
    /// Services joined with `", "`.
    pub service: String,
    /// Value, null when unset.
    pub value: Option<String>,
    /// Description.
    pub text: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Attributes, including links lifted from the raw payload.
    pub attributes: HashMap<String, Value>,
    /// Origin, null when unset.
    pub origin: Option<String>,
    /// Alert type, null when unset.
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    /// Timeout in seconds, null when unset.
    pub timeout: Option<u64>,
    /// Number of duplicates.
    pub duplicate_count: u64,
    /// Repeat flag.
    pub repeat: bool,
    /// Previous severity, null when unset.
    pub previous_severity: Option<String>,
    /// Raw payload, null when unset.
    pub raw_data: Option<String>,
    /// Creation time.
    pub create_time: Option<String>,
    /// Receive time.
    pub receive_time: Option<String>,
    /// Last receive time.
    pub last_receive_time: Option<String>,
    /// Update time.
    pub update_time: Option<String>,
    /// History, most recent first.
    pub history: Vec<HistoryEntry>,
}

impl MessageContext {
    /// Builds the context for `alert`, shifting times by `offset`.
    #[must_use]
    pub fn new(alert: &Alert, offset: Duration) -> Self {
        let display = |t: Option<DateTime<Utc>>| {
            t.map(|t| (t + offset).format(DISPLAY_TIME_FORMAT).to_string())
        };

        Self {
            id: alert.id.clone(),
            short_id: alert.short_id().to_string(),
            resource: alert.resource.clone(),
            event: alert.event.clone(),
            environment: alert.environment.clone(),
            severity: alert.severity.clone(),
            status: alert.status.to_string(),
            group: alert.group.clone(),
            customer: alert.customer.clone(),
            service: alert.service.join(", "),
            value: alert.value.clone(),
            text: alert.text.clone(),
            tags: alert.tags.clone(),
            attributes: alert.attributes.clone(),
            origin: alert.origin.clone(),
            alert_type: alert.alert_type.clone(),
            timeout: alert.timeout,
            duplicate_count: alert.duplicate_count,
            repeat: alert.repeat,
            previous_severity: alert.previous_severity.clone(),
            raw_data: alert.raw_data.clone(),
            create_time: display(alert.create_time),
            receive_time: display(alert.receive_time),
            last_receive_time: display(alert.last_receive_time),
            update_time: display(alert.update_time),
            history: alert.history.clone(),
        }
    }
}
