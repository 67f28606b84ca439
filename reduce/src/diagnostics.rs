//! Diagnostic reporting for recoverable masking conditions.
//!
//! Fatal conditions are returned as [`crate::errors::MaskError`]. Conditions
//! the operation recovers from (a combinator handed a single mask, extra
//! entries in a rectangle range, a percent truncation near float resolution)
//! are reported here as `tracing` events on the [`DIAGNOSTICS_TARGET`]
//! target, tagged with a [`DiagnosticCategory`].
//!
//! Silencing is a property of the subscriber, not of global state: build a
//! [`DiagnosticsConfig`] and either install it process-wide with
//! [`DiagnosticsConfig::init`] or for the current thread with
//! [`DiagnosticsConfig::scoped`], whose guard restores the previous
//! subscriber when dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Tracing target used for every diagnostic event.
pub const DIAGNOSTICS_TARGET: &str = "reduce::diagnostics";

/// Category attached to a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    /// Inputs were usable but not what the operation expects.
    Input,
    /// Float arithmetic is approaching its resolution.
    Imprecision,
    /// The data limited what the operation could do.
    Data,
    /// Information about how a mask was built.
    Masking,
}

impl DiagnosticCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCategory::Input => "input",
            DiagnosticCategory::Imprecision => "imprecision",
            DiagnosticCategory::Data => "data",
            DiagnosticCategory::Masking => "masking",
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report a non-fatal condition.
///
/// The message is also recorded through [`log`], so a DEBUG-level subscriber
/// sees every warning in the log-only stream.
pub fn warn(category: DiagnosticCategory, message: &str) {
    log(category, message);
    tracing::warn!(
        target: DIAGNOSTICS_TARGET,
        category = category.as_str(),
        "{message}"
    );
}

/// Record a condition without surfacing it as a warning.
pub fn log(category: DiagnosticCategory, message: &str) {
    tracing::debug!(
        target: DIAGNOSTICS_TARGET,
        category = category.as_str(),
        "{message}"
    );
}

fn default_level() -> String {
    "info".to_string()
}

/// Subscriber configuration for diagnostics output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Suppress diagnostic warnings. Events on other targets are unaffected.
    #[serde(default)]
    pub silent: bool,

    /// Base filter directive, e.g. `info` or `reduce=debug`.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            silent: false,
            level: default_level(),
        }
    }
}

impl DiagnosticsConfig {
    /// Configuration that drops every diagnostic below ERROR.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    /// Build the filter described by this configuration.
    ///
    /// An unparsable `level` falls back to `info`.
    pub fn filter(&self) -> EnvFilter {
        let directives = if self.silent {
            format!("{},{DIAGNOSTICS_TARGET}=error", self.level)
        } else {
            self.level.clone()
        };
        EnvFilter::try_new(&directives).unwrap_or_else(|_| {
            if self.silent {
                EnvFilter::new(format!("info,{DIAGNOSTICS_TARGET}=error"))
            } else {
                EnvFilter::new("info")
            }
        })
    }

    /// Install a process-wide console subscriber.
    ///
    /// `RUST_LOG` overrides the configured level when set. Does nothing if a
    /// global subscriber is already installed.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| self.filter());
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_filter(filter))
            .try_init();
    }

    /// Install a console subscriber for the current thread only.
    ///
    /// The previous subscriber is restored when the guard drops.
    pub fn scoped(&self) -> DefaultGuard {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_filter(self.filter()))
            .set_default()
    }
}

/// A diagnostic event recorded by [`DiagnosticsCapture`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedDiagnostic {
    pub level: Level,
    pub category: Option<String>,
    pub message: String,
}

/// Visitor to extract the message and category from a tracing event.
#[derive(Default)]
struct DiagnosticVisitor {
    message: String,
    category: Option<String>,
}

impl Visit for DiagnosticVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "category" => self.category = Some(format!("{value:?}").trim_matches('"').to_string()),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "category" => self.category = Some(value.to_string()),
            _ => {}
        }
    }
}

/// Tracing layer that keeps every diagnostic event in memory.
///
/// Clones share the same buffer, so one clone can be handed to a subscriber
/// while another is inspected.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsCapture {
    entries: Arc<Mutex<Vec<CapturedDiagnostic>>>,
}

impl DiagnosticsCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture diagnostics on the current thread until the guard drops.
    pub fn install(&self, config: &DiagnosticsConfig) -> DefaultGuard {
        tracing_subscriber::registry()
            .with(self.clone().with_filter(config.filter()))
            .set_default()
    }

    /// Snapshot of every captured event.
    pub fn entries(&self) -> Vec<CapturedDiagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of captured WARN events in `category`.
    pub fn warning_count(&self, category: DiagnosticCategory) -> usize {
        self.entries()
            .iter()
            .filter(|entry| {
                entry.level == Level::WARN && entry.category.as_deref() == Some(category.as_str())
            })
            .count()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl<S> Layer<S> for DiagnosticsCapture
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() != DIAGNOSTICS_TARGET {
            return;
        }

        let mut visitor = DiagnosticVisitor::default();
        event.record(&mut visitor);

        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(CapturedDiagnostic {
                level: *metadata.level(),
                category: visitor.category,
                message: visitor.message,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_warning() {
        let capture = DiagnosticsCapture::new();
        let _guard = capture.install(&DiagnosticsConfig::default());

        warn(DiagnosticCategory::Input, "only one mask");

        let entries = capture.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::WARN);
        assert_eq!(entries[0].category.as_deref(), Some("input"));
        assert_eq!(entries[0].message, "only one mask");
        assert_eq!(capture.warning_count(DiagnosticCategory::Input), 1);
        assert_eq!(capture.warning_count(DiagnosticCategory::Imprecision), 0);
    }

    #[test]
    fn test_log_only_is_below_default_level() {
        let capture = DiagnosticsCapture::new();
        let _guard = capture.install(&DiagnosticsConfig::default());

        log(DiagnosticCategory::Masking, "iteration finished");

        assert!(capture.entries().is_empty());
    }

    #[test]
    fn test_log_only_visible_at_debug() {
        let capture = DiagnosticsCapture::new();
        let config = DiagnosticsConfig {
            silent: false,
            level: "debug".to_string(),
        };
        let _guard = capture.install(&config);

        log(DiagnosticCategory::Masking, "iteration finished");

        let entries = capture.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::DEBUG);
    }

    #[test]
    fn test_warning_is_also_logged() {
        let capture = DiagnosticsCapture::new();
        let config = DiagnosticsConfig {
            silent: false,
            level: "debug".to_string(),
        };
        let _guard = capture.install(&config);

        warn(DiagnosticCategory::Input, "only one mask");

        let levels: Vec<Level> = capture.entries().iter().map(|entry| entry.level).collect();
        assert_eq!(levels, vec![Level::DEBUG, Level::WARN]);
        assert!(capture
            .entries()
            .iter()
            .all(|entry| entry.message == "only one mask"));
        assert_eq!(capture.warning_count(DiagnosticCategory::Input), 1);
    }

    #[test]
    fn test_silent_config_drops_warnings() {
        let capture = DiagnosticsCapture::new();
        let _guard = capture.install(&DiagnosticsConfig::silent());

        warn(DiagnosticCategory::Imprecision, "close to resolution");

        assert!(capture.entries().is_empty());
    }

    #[test]
    fn test_scope_is_restored_after_guard_drops() {
        let outer = DiagnosticsCapture::new();
        let _outer_guard = outer.install(&DiagnosticsConfig::default());

        {
            let _silent = DiagnosticsConfig::silent().scoped();
            warn(DiagnosticCategory::Input, "hidden");
        }

        warn(DiagnosticCategory::Input, "visible");

        let entries = outer.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "visible");
    }

    #[test]
    fn test_clear() {
        let capture = DiagnosticsCapture::new();
        let _guard = capture.install(&DiagnosticsConfig::default());
        warn(DiagnosticCategory::Data, "first");
        capture.clear();
        assert!(capture.entries().is_empty());
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: DiagnosticsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DiagnosticsConfig::default());

        let config: DiagnosticsConfig = serde_json::from_str(r#"{"silent": true}"#).unwrap();
        assert!(config.silent);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(DiagnosticCategory::Imprecision.to_string(), "imprecision");
        assert_eq!(
            serde_json::to_string(&DiagnosticCategory::Masking).unwrap(),
            "\"masking\""
        );
    }
}
