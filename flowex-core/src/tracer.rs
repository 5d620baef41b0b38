//! The user-facing trace hook.
//!
//! This is distinct from the `tracing` crate usage elsewhere in this
//! workspace: `Tracer` is a public trait a caller implements and binds
//! into a tree at build time (`trace`, `trace_op`, `trace_op_with_value`).
//! Internal diagnostics (reference rebinding, orphaned fail-actions) go
//! through `tracing::warn!` instead and are never routed through this
//! trait.

use std::any::Any;

/// Observes trace messages and operator pass/fail signals emitted while a
/// tree runs.
pub trait Tracer {
    /// A free-form trace message bound via `Builder::trace`.
    fn message(&mut self, level: i32, text: &str);

    /// An operator's predicate result, bound via `Builder::trace_op`.
    fn operator(&mut self, label: &str, passed: bool);

    /// An operator's predicate result together with the value it placed
    /// in its `ValueSlot` (if any), bound via `Builder::trace_op_with_value`.
    fn operator_with_value(&mut self, label: &str, passed: bool, value: Option<&dyn Any>);
}
