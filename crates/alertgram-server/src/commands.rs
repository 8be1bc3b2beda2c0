//! Offline subcommands: rule checking and template preview.

use std::fmt::Write as _;
use std::path::Path;

use alertgram_core::{
    Alert, AlertError, MessageContext, MessageTemplate, RuleKind, RuleSet, TemplateSource,
    merge_raw_links,
};

use crate::error::ServerResult;

/// Result of `check-rules`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesCheck {
    /// Human-readable listing.
    pub report: String,
    /// Number of rejected entries.
    pub invalid: usize,
}

/// Parses a rule file and lists its rules. Rules that parse but name an
/// unknown field or carry a bad pattern count as invalid.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a YAML mapping.
pub fn check_rules(path: &Path) -> ServerResult<RulesCheck> {
    let set = RuleSet::load(path)?;
    let mut report = String::new();
    let mut valid = 0;
    let mut invalid = set.invalid.clone();

    for rule in &set.rules {
        if let Err(e) = rule.validate() {
            invalid.push((rule.name.clone(), e.to_string()));
            continue;
        }
        valid += 1;
        let _ = match &rule.kind {
            RuleKind::Dependent {
                link_field,
                find_field,
                find_regexp,
            } => writeln!(
                report,
                "ok       {}: linked by {link_field}, {find_field} ~ /{find_regexp}/",
                rule.name
            ),
            RuleKind::Independent {
                find_field,
                find_regexp,
                main_field,
                main_regexp,
            } => writeln!(
                report,
                "ok       {}: {find_field} ~ /{find_regexp}/ and {main_field} ~ /{main_regexp}/",
                rule.name
            ),
        };
    }
    for (name, reason) in &invalid {
        let _ = writeln!(report, "invalid  {name}: {reason}");
    }
    let _ = write!(report, "{valid} valid, {} invalid", invalid.len());

    Ok(RulesCheck {
        report,
        invalid: invalid.len(),
    })
}

/// Renders the message template against an alert JSON file.
///
/// # Errors
///
/// Returns an error if the file is not an alert, the template does not
/// compile, or rendering fails.
pub fn render_alert(
    alert_path: &Path,
    source: &TemplateSource,
    offset_hours: i64,
) -> ServerResult<String> {
    let contents = std::fs::read_to_string(alert_path)
        .map_err(|e| AlertError::Serialization(format!("{}: {e}", alert_path.display())))?;
    let mut alert: Alert = serde_json::from_str(&contents).map_err(AlertError::from)?;
    merge_raw_links(&mut alert);

    let template = MessageTemplate::compile(source)?;
    let context = MessageContext::new(&alert, chrono::Duration::hours(offset_hours));
    Ok(template.render(&context)?)
}
