//! Build and execute flow expressions: declarative, tree-structured
//! programs that drive a user-supplied context through sequencing,
//! optionality, alternation, repetition, and side effects.
//!
//! This crate is a thin re-export of [`flowex_core`] (and, with the
//! default `trace` feature, [`flowex_trace`]) behind one import surface.
//! Most users only need [`prelude`]:
//!
//! ```
//! use flowex::prelude::*;
//!
//! let mut builder: Builder<&str> = Builder::new();
//! builder.op(|ctx: &mut &str, slot: &mut ValueSlot| slot.set(!ctx.is_empty(), ctx.len()));
//! let root = builder.build();
//! assert!(root.run(&mut "hi"));
//! ```

pub use flowex_core::*;

#[cfg(feature = "trace")]
pub use flowex_trace;

/// Re-exports the names most programs built on this crate need.
pub mod prelude {
    pub use flowex_core::{Builder, CheckResult, Driver, Factory, Node, PreOp, Tracer, ValueSlot};

    #[cfg(feature = "trace")]
    pub use flowex_trace::{CollectingTracer, TracingTracer};
}
