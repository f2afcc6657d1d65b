//! Reform engine
//!
//! Orchestrates one event: builds the placeholder context, expands the tag
//! template and the field-template map, applies the record-merge policy
//! (renew/keep/remove keys), and optionally re-derives the event time from
//! a produced field.
//!
//! The engine is synchronous and performs no I/O during a reform call; the
//! hostname is resolved once at construction. Everything reachable during
//! a call is either immutable for the engine's lifetime (compiled
//! templates, hostname) or freshly allocated per call, so one engine can
//! serve multiple workers concurrently.

use serde_json::{Map, Value};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::config::{ExpandMode, ReformConfig};
use crate::context::EventContext;
use crate::expand::{stringify, Compiled, ExpressionExpander, LiteralExpander};
use crate::template::Template;
use crate::{Expander, ReformError, ReformResult};

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;

/// Metrics for the reform engine
#[derive(Debug, Default)]
pub struct ReformMetrics {
    /// Events handed to the engine
    pub events_processed: AtomicU64,
    /// Events emitted downstream
    pub events_emitted: AtomicU64,
    /// Events dropped because the tag template expanded to null
    pub events_dropped: AtomicU64,
    /// Events skipped by per-event failure containment
    pub events_failed: AtomicU64,
}

impl ReformMetrics {
    /// Fraction of processed events that produced no output (0.0 - 1.0)
    pub fn drop_rate(&self) -> f64 {
        let processed = self.events_processed.load(Ordering::Relaxed);
        if processed == 0 {
            return 0.0;
        }
        let dropped = self.events_dropped.load(Ordering::Relaxed)
            + self.events_failed.load(Ordering::Relaxed);
        dropped as f64 / processed as f64
    }
}

/// One reformed event ready for downstream emission
#[derive(Debug, Clone, PartialEq)]
pub struct Emitted {
    /// Resolved output tag
    pub tag: String,
    /// Event time, possibly rewritten from a record field
    pub time: i64,
    /// The output record
    pub record: Map<String, Value>,
}

/// Reform engine
///
/// Stateless between events: compiled templates and the hostname are fixed
/// at construction, every per-event structure is built fresh.
pub struct Reformer {
    config: ReformConfig,
    expander: Box<dyn Expander>,
    tag_template: Compiled,
    fields: Template,
    hostname: String,
    metrics: ReformMetrics,
}

impl Reformer {
    /// Create a new reformer
    ///
    /// Compiles the tag template and the field-template map through the
    /// configured expander and resolves the hostname once. Compile
    /// failures are configuration errors.
    pub fn new(config: ReformConfig) -> ReformResult<Self> {
        config.validate().map_err(ReformError::config)?;

        let expander: Box<dyn Expander> = match config.mode {
            ExpandMode::Literal => Box::new(LiteralExpander::new(config.auto_typecast)),
            ExpandMode::Expression => Box::new(ExpressionExpander::new(config.auto_typecast)),
        };

        let tag_template = expander.compile(&config.tag, false)?;
        let fields = Template::compile(&Value::Object(config.fields.clone()), expander.as_ref())?;

        let hostname = hostname::get()?.to_string_lossy().into_owned();

        Ok(Self {
            config,
            expander,
            tag_template,
            fields,
            hostname,
            metrics: ReformMetrics::default(),
        })
    }

    /// Override the resolved hostname (embedders and tests)
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Get engine metrics
    pub fn metrics(&self) -> &ReformMetrics {
        &self.metrics
    }

    /// Whether this reformer is enabled
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// The hostname exposed to templates
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Reform one event.
    ///
    /// Returns `None` when the event is dropped: the tag template expanded
    /// to null, so emitting would corrupt routing.
    pub fn reform(&self, tag: &str, time: i64, record: &Map<String, Value>) -> Option<Emitted> {
        let ctx = EventContext::build(tag, time, record, &self.hostname);

        let new_tag = match self.expander.expand(&self.tag_template, &ctx) {
            Some(Value::Null) | None => {
                debug!(
                    tag,
                    template = self.config.tag.as_str(),
                    "tag template expanded to null, dropping event"
                );
                return None;
            }
            Some(value) => stringify(&value),
        };

        let mut out = if self.config.renew_record {
            let mut kept = Map::new();
            for key in &self.config.keep_keys {
                if let Some(value) = record.get(key) {
                    kept.insert(key.clone(), value.clone());
                }
            }
            kept
        } else {
            record.clone()
        };

        if let Some(Value::Object(expanded)) = self.fields.expand(self.expander.as_ref(), &ctx) {
            for (key, value) in expanded {
                out.insert(key, value);
            }
        }

        // Time renewal reads the field before remove_keys can strip it, so
        // a template may both set the time and remove the carrier field
        let mut new_time = time;
        if let Some(key) = &self.config.renew_time_key {
            if let Some(value) = out.get(key) {
                match coerce_time(value) {
                    Some(t) => new_time = t,
                    None => warn!(
                        key = key.as_str(),
                        value = %value,
                        "renew_time_key value is not a timestamp, keeping event time"
                    ),
                }
            }
        }

        for key in &self.config.remove_keys {
            out.remove(key.as_str());
        }

        Some(Emitted {
            tag: new_tag,
            time: new_time,
            record: out,
        })
    }

    /// Process a batch of events sharing one input tag.
    ///
    /// Per-event failure containment: any failure inside a reform call is
    /// caught here, logged with enough context to diagnose, and the event
    /// skipped; the rest of the batch continues.
    pub fn process_batch(&self, tag: &str, events: &[(i64, Map<String, Value>)]) -> Vec<Emitted> {
        let mut emitted = Vec::with_capacity(events.len());

        for (time, record) in events {
            self.metrics.events_processed.fetch_add(1, Ordering::Relaxed);

            let result = panic::catch_unwind(AssertUnwindSafe(|| self.reform(tag, *time, record)));
            match result {
                Ok(Some(event)) => {
                    self.metrics.events_emitted.fetch_add(1, Ordering::Relaxed);
                    emitted.push(event);
                }
                Ok(None) => {
                    self.metrics.events_dropped.fetch_add(1, Ordering::Relaxed);
                }
                Err(payload) => {
                    self.metrics.events_failed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        error = %panic_message(&payload),
                        "reform failed, skipping event"
                    );
                    debug!(
                        tag,
                        fields = ?self.config.fields,
                        record = ?record,
                        "reform failure context"
                    );
                }
            }
        }

        emitted
    }
}

impl std::fmt::Debug for Reformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reformer")
            .field("config", &self.config)
            .field("expander", &self.expander.name())
            .field("hostname", &self.hostname)
            .finish()
    }
}

/// Interpret a record value as an epoch timestamp.
fn coerce_time(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
