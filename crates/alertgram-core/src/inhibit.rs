//! Inhibition rules.
//!
//! A rule file is a YAML mapping of rule name to rule:
//!
//! ```yaml
//! db-down-hides-replication:
//!   dependent: true
//!   link_field: resource
//!   find_field: event
//!   find_regexp: "^NodeDown$"
//! noisy-staging-disk:
//!   dependent: false
//!   find_field: environment
//!   find_regexp: "Staging"
//!   main_field: event
//!   main_regexp: "Disk"
//! ```
//!
//! A *dependent* rule matches when another open alert shares the value of
//! `link_field` and its `find_field` matches `find_regexp`. An *independent*
//! rule matches when the alert's own `find_field` and `main_field` match
//! their patterns. Patterns are searched anywhere in the field text. Any
//! matching rule mutes the notification.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::error::{AlertError, Result};
use crate::store::AlertStore;
use crate::types::Alert;

/// How a rule decides whether it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Matches on another open alert linked through a shared field.
    Dependent {
        /// Field whose value links the two alerts.
        link_field: String,
        /// Field of the linked alert tested against `find_regexp`.
        find_field: String,
        /// Pattern searched in `find_field`.
        find_regexp: String,
    },
    /// Matches on two fields of the alert itself.
    Independent {
        /// First field tested.
        find_field: String,
        /// Pattern searched in `find_field`.
        find_regexp: String,
        /// Second field tested.
        main_field: String,
        /// Pattern searched in `main_field`.
        main_regexp: String,
    },
}

/// A named inhibition rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InhibitRule {
    /// Rule name, the key in the rule file.
    pub name: String,
    /// Matching behaviour.
    pub kind: RuleKind,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    #[serde(default)]
    dependent: bool,
    link_field: Option<String>,
    find_field: Option<String>,
    find_regexp: Option<String>,
    main_field: Option<String>,
    main_regexp: Option<String>,
}

impl InhibitRule {
    fn from_raw(name: &str, raw: RawRule) -> Result<Self> {
        let missing = |field: &str| AlertError::InvalidRule {
            name: name.to_string(),
            reason: format!("missing {field}"),
        };

        let find_field = raw.find_field.ok_or_else(|| missing("find_field"))?;
        let find_regexp = raw.find_regexp.ok_or_else(|| missing("find_regexp"))?;

        let kind = if raw.dependent {
            RuleKind::Dependent {
                link_field: raw.link_field.ok_or_else(|| missing("link_field"))?,
                find_field,
                find_regexp,
            }
        } else {
            RuleKind::Independent {
                find_field,
                find_regexp,
                main_field: raw.main_field.ok_or_else(|| missing("main_field"))?,
                main_regexp: raw.main_regexp.ok_or_else(|| missing("main_regexp"))?,
            }
        };

        Ok(Self {
            name: name.to_string(),
            kind,
        })
    }

    /// Checks field names and patterns without evaluating the rule.
    ///
    /// # Errors
    ///
    /// Returns the first unknown field or invalid pattern.
    pub fn validate(&self) -> Result<()> {
        let check_field = |field: &str| -> Result<()> {
            if Alert::is_field(field) {
                Ok(())
            } else {
                Err(AlertError::UnknownField {
                    name: field.to_string(),
                })
            }
        };

        match &self.kind {
            RuleKind::Dependent {
                link_field,
                find_field,
                find_regexp,
            } => {
                check_field(link_field)?;
                check_field(find_field)?;
                compile(find_regexp)?;
            }
            RuleKind::Independent {
                find_field,
                find_regexp,
                main_field,
                main_regexp,
            } => {
                check_field(find_field)?;
                check_field(main_field)?;
                compile(find_regexp)?;
                compile(main_regexp)?;
            }
        }
        Ok(())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AlertError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Rules loaded from one rule file.
///
/// Entries that fail to parse are kept aside in [`RuleSet::invalid`] so the
/// remaining rules still apply.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Well-formed rules, ordered by name.
    pub rules: Vec<InhibitRule>,
    /// Entries rejected while parsing, with the reason.
    pub invalid: Vec<(String, String)>,
}

impl RuleSet {
    /// Parses a rule file's contents.
    ///
    /// An empty document yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::Serialization` if the document is not YAML or is
    /// not a mapping of names to rules.
    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let entries: Option<BTreeMap<String, serde_yaml::Value>> =
            serde_yaml::from_str(yaml).map_err(|e| AlertError::Serialization(e.to_string()))?;

        let mut set = Self::default();
        for (name, value) in entries.unwrap_or_default() {
            let parsed = serde_yaml::from_value::<RawRule>(value)
                .map_err(|e| AlertError::InvalidRule {
                    name: name.clone(),
                    reason: e.to_string(),
                })
                .and_then(|raw| InhibitRule::from_raw(&name, raw));

            match parsed {
                Ok(rule) => set.rules.push(rule),
                Err(e) => set.invalid.push((name, e.to_string())),
            }
        }
        Ok(set)
    }

    /// Reads and parses a rule file.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::RuleFile` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let rule_file_error = |reason: String| AlertError::RuleFile {
            path: path.display().to_string(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| rule_file_error(e.to_string()))?;
        Self::parse(&contents).map_err(|e| rule_file_error(e.to_string()))
    }

    /// Reads a rule file, falling back to an empty set on failure.
    ///
    /// Failures are logged; notification proceeds without inhibition.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(set) => {
                for (name, reason) in &set.invalid {
                    warn!(rule = %name, %reason, "skipping malformed inhibition rule");
                }
                set
            }
            Err(e) => {
                error!(error = %e, "inhibition rules unavailable");
                Self::default()
            }
        }
    }

    /// Returns the number of well-formed rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no well-formed rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Outcome of evaluating a rule set against one alert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InhibitionReport {
    /// Number of rules evaluated.
    pub rules_evaluated: usize,
    /// Number of rules that errored.
    pub rules_errored: usize,
    /// Names of matching rules.
    pub matched: Vec<String>,
    /// Per-rule failures, by rule name.
    pub errors: Vec<(String, String)>,
}

impl InhibitionReport {
    /// Returns true if any rule matched.
    #[must_use]
    pub fn suppressed(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// Evaluates inhibition rules, consulting the alert store for dependent
/// rules.
#[derive(Debug, Clone)]
pub struct Inhibitor {
    store: Arc<dyn AlertStore>,
}

impl Inhibitor {
    /// Creates an evaluator backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    /// Evaluates every rule. A failing rule is recorded and skipped.
    pub async fn evaluate(&self, alert: &Alert, rules: &RuleSet) -> InhibitionReport {
        let mut report = InhibitionReport::default();

        for (name, reason) in &rules.invalid {
            report.rules_errored += 1;
            report.errors.push((name.clone(), reason.clone()));
        }

        for rule in &rules.rules {
            report.rules_evaluated += 1;
            match self.evaluate_rule(alert, rule).await {
                Ok(true) => {
                    debug!(alert_id = %alert.id, rule = %rule.name, "inhibition rule matched");
                    report.matched.push(rule.name.clone());
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        alert_id = %alert.id,
                        rule = %rule.name,
                        error = %e,
                        "inhibition rule failed"
                    );
                    report.rules_errored += 1;
                    report.errors.push((rule.name.clone(), e.to_string()));
                }
            }
        }

        report
    }

    /// Evaluates one rule.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown fields, invalid patterns or store
    /// failures. An attribute an alert does not carry never matches.
    pub async fn evaluate_rule(&self, alert: &Alert, rule: &InhibitRule) -> Result<bool> {
        match &rule.kind {
            RuleKind::Dependent {
                link_field,
                find_field,
                find_regexp,
            } => {
                let pattern = compile(find_regexp)?;
                let Some(value) = alert.field_text(link_field)? else {
                    return Ok(false);
                };
                if !Alert::is_field(find_field) {
                    return Err(AlertError::UnknownField {
                        name: find_field.clone(),
                    });
                }
                let linked = self
                    .store
                    .find_open_linked(link_field, &value, &alert.id)
                    .await?;

                for other in &linked {
                    let Some(text) = other.field_text(find_field)? else {
                        continue;
                    };
                    if pattern.is_match(&text) {
                        debug!(
                            alert_id = %alert.id,
                            linked_id = %other.id,
                            rule = %rule.name,
                            "linked alert matched"
                        );
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            RuleKind::Independent {
                find_field,
                find_regexp,
                main_field,
                main_regexp,
            } => {
                let find = compile(find_regexp)?;
                let main = compile(main_regexp)?;
                let find_text = alert.field_text(find_field)?;
                let main_text = alert.field_text(main_field)?;
                Ok(find_text.is_some_and(|t| find.is_match(&t))
                    && main_text.is_some_and(|t| main.is_match(&t)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAlertStore;
    use crate::types::AlertStatus;
    use std::io::Write;

    const RULES: &str = r#"
db-down:
  dependent: true
  link_field: resource
  find_field: event
  find_regexp: "^NodeDown$"
staging-disk:
  dependent: false
  find_field: environment
  find_regexp: "Staging"
  main_field: event
  main_regexp: "Disk"
"#;

    fn alert(id: &str, resource: &str, event: &str, environment: &str) -> Alert {
        let mut alert = Alert::new(id, resource, event);
        alert.environment = environment.to_string();
        alert
    }

    fn inhibitor(store: &InMemoryAlertStore) -> Inhibitor {
        Inhibitor::new(Arc::new(store.clone()))
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn parses_both_kinds() {
            let set = RuleSet::parse(RULES).unwrap();
            assert_eq!(set.len(), 2);
            assert!(set.invalid.is_empty());
            assert!(matches!(set.rules[0].kind, RuleKind::Dependent { .. }));
            assert!(matches!(set.rules[1].kind, RuleKind::Independent { .. }));
        }

        #[test]
        fn empty_document_is_empty_set() {
            assert!(RuleSet::parse("").unwrap().is_empty());
        }

        #[test]
        fn non_mapping_is_error() {
            assert!(RuleSet::parse("- a\n- b\n").is_err());
        }

        #[test]
        fn malformed_rule_is_set_aside() {
            let yaml = r"
good:
  dependent: false
  find_field: event
  find_regexp: Disk
  main_field: resource
  main_regexp: db
missing-link:
  dependent: true
  find_field: event
  find_regexp: x
typo:
  dependant: true
";
            let set = RuleSet::parse(yaml).unwrap();
            assert_eq!(set.len(), 1);
            assert_eq!(set.rules[0].name, "good");

            let names: Vec<_> = set.invalid.iter().map(|(n, _)| n.as_str()).collect();
            assert_eq!(names, vec!["missing-link", "typo"]);
            assert!(set.invalid[0].1.contains("link_field"));
        }

        #[test]
        fn validate_reports_unknown_field_and_bad_pattern() {
            let set = RuleSet::parse(
                r#"
bad-field:
  dependent: false
  find_field: colour
  find_regexp: red
  main_field: event
  main_regexp: x
bad-pattern:
  dependent: false
  find_field: event
  find_regexp: "("
  main_field: event
  main_regexp: x
attribute:
  dependent: false
  find_field: attributes.region
  find_regexp: eu
  main_field: event
  main_regexp: x
"#,
            )
            .unwrap();

            let results: Vec<_> = set.rules.iter().map(|r| (r.name.as_str(), r.validate())).collect();
            assert!(results[0].1.is_ok(), "attribute fields are accepted");
            assert!(matches!(results[1].1, Err(AlertError::UnknownField { .. })));
            assert!(matches!(results[2].1, Err(AlertError::InvalidPattern { .. })));
        }
    }

    mod load_tests {
        use super::*;

        #[test]
        fn load_reads_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(RULES.as_bytes()).unwrap();

            let set = RuleSet::load(file.path()).unwrap();
            assert_eq!(set.len(), 2);
        }

        #[test]
        fn missing_file_is_error_or_empty() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("inhibit.yaml");

            assert!(matches!(
                RuleSet::load(&path),
                Err(AlertError::RuleFile { .. })
            ));
            assert!(RuleSet::load_or_empty(&path).is_empty());
        }

        #[test]
        fn unparseable_file_is_empty() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(b"db: [unclosed").unwrap();

            assert!(RuleSet::load_or_empty(file.path()).is_empty());
        }
    }

    mod evaluate_tests {
        use super::*;

        #[tokio::test]
        async fn dependent_rule_matches_linked_open_alert() {
            let store = InMemoryAlertStore::new();
            store.insert(alert("node", "db-1", "NodeDown", "Production"));
            let incoming = alert("disk", "db-1", "DiskFull", "Production");
            store.insert(incoming.clone());

            let report = inhibitor(&store)
                .evaluate(&incoming, &RuleSet::parse(RULES).unwrap())
                .await;

            assert!(report.suppressed());
            assert_eq!(report.matched, vec!["db-down".to_string()]);
            assert_eq!(report.rules_evaluated, 2);
        }

        #[tokio::test]
        async fn dependent_rule_ignores_closed_and_self() {
            let store = InMemoryAlertStore::new();
            let mut closed = alert("node", "db-1", "NodeDown", "Production");
            closed.status = AlertStatus::Closed;
            store.insert(closed);
            let incoming = alert("self", "db-1", "NodeDown", "Production");
            store.insert(incoming.clone());

            let report = inhibitor(&store)
                .evaluate(&incoming, &RuleSet::parse(RULES).unwrap())
                .await;

            assert!(!report.suppressed());
        }

        #[tokio::test]
        async fn independent_rule_needs_both_patterns() {
            let store = InMemoryAlertStore::new();
            let rules = RuleSet::parse(RULES).unwrap();
            let inhibitor = inhibitor(&store);

            let both = alert("a", "web-1", "DiskFull", "Staging");
            assert!(inhibitor.evaluate(&both, &rules).await.suppressed());

            let only_env = alert("b", "web-1", "HighLoad", "Staging");
            assert!(!inhibitor.evaluate(&only_env, &rules).await.suppressed());

            let only_event = alert("c", "web-1", "DiskFull", "Production");
            assert!(!inhibitor.evaluate(&only_event, &rules).await.suppressed());
        }

        #[tokio::test]
        async fn patterns_are_searched_not_anchored() {
            let store = InMemoryAlertStore::new();
            let rules = RuleSet::parse(RULES).unwrap();

            let partial = alert("a", "web-1", "RootDiskAlmostFull", "pre-Staging-2");
            assert!(inhibitor(&store).evaluate(&partial, &rules).await.suppressed());
        }

        #[tokio::test]
        async fn failing_rule_does_not_abort_others() {
            let store = InMemoryAlertStore::new();
            let rules = RuleSet::parse(
                r#"
a-broken:
  dependent: false
  find_field: colour
  find_regexp: x
  main_field: event
  main_regexp: x
b-bad-pattern:
  dependent: false
  find_field: event
  find_regexp: "("
  main_field: event
  main_regexp: x
c-works:
  dependent: false
  find_field: event
  find_regexp: Disk
  main_field: resource
  main_regexp: web
d-malformed:
  dependent: true
"#,
            )
            .unwrap();

            let report = inhibitor(&store)
                .evaluate(&alert("x", "web-1", "DiskFull", "Production"), &rules)
                .await;

            assert!(report.suppressed());
            assert_eq!(report.matched, vec!["c-works".to_string()]);
            assert_eq!(report.rules_evaluated, 3);
            assert_eq!(report.rules_errored, 3);
            assert_eq!(report.errors.len(), 3);
        }

        #[tokio::test]
        async fn linked_alerts_without_attribute_do_not_match() {
            let rules = RuleSet::parse(
                r"
core-down:
  dependent: true
  link_field: resource
  find_field: attributes.tier
  find_regexp: core
",
            )
            .unwrap();
            let store = InMemoryAlertStore::new();
            for i in 0..5 {
                store.insert(alert(&format!("plain-{i}"), "db-1", "Ping", "Production"));
            }
            let mut core = alert("core", "db-1", "NodeDown", "Production");
            core.attributes
                .insert("tier".to_string(), serde_json::Value::from("core"));
            store.insert(core);
            let incoming = alert("disk", "db-1", "DiskFull", "Production");
            store.insert(incoming.clone());

            let report = inhibitor(&store).evaluate(&incoming, &rules).await;

            assert!(report.suppressed());
            assert!(report.errors.is_empty());
        }

        #[tokio::test]
        async fn missing_attribute_on_incoming_alert_is_no_match() {
            let rules = RuleSet::parse(
                r"
tiered:
  dependent: false
  find_field: attributes.tier
  find_regexp: '.*'
  main_field: event
  main_regexp: Disk
",
            )
            .unwrap();
            let store = InMemoryAlertStore::new();

            let report = inhibitor(&store)
                .evaluate(&alert("x", "web-1", "DiskFull", "Production"), &rules)
                .await;

            assert!(!report.suppressed());
            assert!(report.errors.is_empty());
        }

        #[tokio::test]
        async fn dependent_rule_with_unknown_find_field_errors() {
            let rules = RuleSet::parse(
                r"
typo:
  dependent: true
  link_field: resource
  find_field: evnt
  find_regexp: NodeDown
",
            )
            .unwrap();
            let store = InMemoryAlertStore::new();
            store.insert(alert("node", "db-1", "NodeDown", "Production"));

            let report = inhibitor(&store)
                .evaluate(&alert("disk", "db-1", "DiskFull", "Production"), &rules)
                .await;

            assert!(!report.suppressed());
            assert_eq!(report.rules_errored, 1);
            assert!(report.errors[0].1.contains("evnt"));
        }

        #[tokio::test]
        async fn empty_rule_set_never_suppresses() {
            let store = InMemoryAlertStore::new();
            let report = inhibitor(&store)
                .evaluate(&alert("x", "web-1", "DiskFull", "Staging"), &RuleSet::default())
                .await;
            assert_eq!(report, InhibitionReport::default());
        }
    }
}
