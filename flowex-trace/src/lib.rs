//! Concrete [`Tracer`] implementations for `flowex-core`.
//!
//! [`TracingTracer`] forwards every trace call to the `tracing` crate, for
//! production use. [`CollectingTracer`] records every call in memory
//! instead, for assertions in tests.

use std::any::Any;

use flowex_core::Tracer;

/// Forwards trace calls to `tracing`, at a level derived from the trace
/// call's own `level: i32` (clamped to the five `tracing` levels, `TRACE`
/// at the low end and `ERROR` at the high end).
#[derive(Default)]
pub struct TracingTracer;

impl TracingTracer {
    pub fn new() -> Self {
        Self
    }

    fn level(level: i32) -> tracing::Level {
        match level {
            i32::MIN..=0 => tracing::Level::TRACE,
            1 => tracing::Level::DEBUG,
            2 => tracing::Level::INFO,
            3 => tracing::Level::WARN,
            _ => tracing::Level::ERROR,
        }
    }
}

impl Tracer for TracingTracer {
    fn message(&mut self, level: i32, text: &str) {
        match Self::level(level) {
            tracing::Level::TRACE => tracing::trace!(%text),
            tracing::Level::DEBUG => tracing::debug!(%text),
            tracing::Level::INFO => tracing::info!(%text),
            tracing::Level::WARN => tracing::warn!(%text),
            tracing::Level::ERROR => tracing::error!(%text),
        }
    }

    fn operator(&mut self, label: &str, passed: bool) {
        tracing::debug!(operator = label, passed, "operator evaluated");
    }

    fn operator_with_value(&mut self, label: &str, passed: bool, value: Option<&dyn Any>) {
        tracing::debug!(
            operator = label,
            passed,
            has_value = value.is_some(),
            "operator evaluated"
        );
    }
}

/// A trace message or operator event, as recorded by [`CollectingTracer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Message { level: i32, text: String },
    Operator { label: String, passed: bool },
    OperatorWithValue { label: String, passed: bool, had_value: bool },
}

/// Records every trace call in order, for assertions in tests. Does not
/// attempt to compare carried values for equality — only whether a value
/// was present — since `ValueSlot` contents are type-erased.
#[derive(Default)]
pub struct CollectingTracer {
    events: Vec<TraceEvent>,
}

impl CollectingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }
}

impl Tracer for CollectingTracer {
    fn message(&mut self, level: i32, text: &str) {
        self.events.push(TraceEvent::Message { level, text: text.to_string() });
    }

    fn operator(&mut self, label: &str, passed: bool) {
        self.events.push(TraceEvent::Operator { label: label.to_string(), passed });
    }

    fn operator_with_value(&mut self, label: &str, passed: bool, value: Option<&dyn Any>) {
        self.events.push(TraceEvent::OperatorWithValue {
            label: label.to_string(),
            passed,
            had_value: value.is_some(),
        });
    }
}
