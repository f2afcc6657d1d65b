//! Reform - Engine
//!
//! Per-event record transformation for a streaming log pipeline: given an
//! incoming event (tag, time, record), compute a new tag and a new record
//! by expanding a user-supplied template map against a placeholder context
//! derived from the event and fixed environment facts.
//!
//! # Overview
//!
//! A reformer can:
//! - Rewrite the routing tag from tag segments, prefixes and suffixes
//! - Add, rewrite or remove record fields, with nested maps and arrays
//! - Rebuild the record from scratch (`renew_record` / `keep_keys`)
//! - Re-derive the event time from a produced field (`renew_time_key`)
//!
//! # Design Principles
//!
//! - **Fast**: one synchronous pass per event, no I/O in the hot path
//! - **Thread-safe**: compiled templates are immutable; per-event state is
//!   freshly allocated, so one engine serves many workers
//! - **Failure-isolated**: one bad template or record never drops or
//!   crashes the batch; failures degrade to null/skip with a warning
//!
//! # Architecture
//!
//! ```text
//! [Batch] → per event → [EventContext] → [Expander] → merged record → [Emitted]
//! ```
//!
//! Two interchangeable expanders implement the [`Expander`] trait and are
//! selected once at configuration time:
//!
//! - **Literal**: a closed placeholder token grammar (`${name}`,
//!   `${name[-1]}`, `${record["key"]}`), resolved against a precomputed
//!   token table. No evaluation; the safe mode.
//! - **Expression**: placeholders carry small expressions evaluated in a
//!   restricted scope exposing only the context's bindings.
//!
//! # Example
//!
//! ```
//! use reform_engine::{ReformConfig, Reformer};
//! use serde_json::json;
//!
//! let config = ReformConfig::new("reformed.${tag}")
//!     .with_field("greeting", json!("hello from ${hostname}"));
//! let engine = Reformer::new(config).unwrap();
//!
//! let record = json!({"message": "hi"});
//! let out = engine
//!     .reform("foo.bar", 1_700_000_000, record.as_object().unwrap())
//!     .unwrap();
//! assert_eq!(out.tag, "reformed.foo.bar");
//! ```
//!
//! # Modules
//!
//! - `tag` - tag segmentation (parts, prefixes, suffixes)
//! - `context` - per-event placeholder context
//! - `expand` - the two expander strategies
//! - `template` - structural recursion over nested template values
//! - `config` - typed engine configuration
//! - `engine` - the per-event reform orchestration

mod config;
mod context;
mod engine;
mod error;
mod expand;
mod template;

pub mod tag;

pub use config::{ExpandMode, ReformConfig};
pub use context::{EventContext, RESERVED_NAMES};
pub use engine::{Emitted, ReformMetrics, Reformer};
pub use error::ReformError;
pub use expand::expression::{EvalError, ExpressionExpander, ParseError, Program};
pub use expand::{stringify, Compiled, LiteralExpander};
pub use template::Template;

/// Result type for reformer construction
pub type ReformResult<T> = Result<T, ReformError>;

/// Strategy for expanding template strings against an event context.
///
/// Implementors must be `Send + Sync`: one expander instance is shared by
/// every worker that holds the engine, and calls carry no mutable state.
pub trait Expander: Send + Sync {
    /// Compile a template string once at configuration time.
    ///
    /// `force_string` marks values used as map keys: they must always
    /// expand to strings, so native-type preservation is disabled.
    ///
    /// # Errors
    /// Returns `ReformError::Compile` when the template cannot be parsed;
    /// this is a configuration error, not a per-event failure.
    fn compile(&self, source: &str, force_string: bool) -> ReformResult<Compiled>;

    /// Expand a compiled template string for one event.
    ///
    /// Returns `None` when the template value failed to expand as a
    /// whole; the expander has already logged the reason.
    fn expand(&self, compiled: &Compiled, ctx: &EventContext) -> Option<serde_json::Value>;

    /// Name of this expander for logging and diagnostics
    fn name(&self) -> &'static str;
}
