//! Core runtime for flow expressions: tree-structured programs that drive
//! a user-supplied context through sequencing, optionality, alternation,
//! repetition, and side effects.
//!
//! The canonical consumer is a recursive-descent parser, but nothing here
//! names a scanner, a token, or a grammar — `Node<T>` is generic over any
//! context `T` with no required methods. Building a parser means
//! supplying a `T` that exposes whatever scanning operations your
//! operators' predicates need, and predicates that read/advance it.
//!
//! | Module | Covers |
//! |---|---|
//! | [`value`] | [`ValueSlot`](value::ValueSlot), the operator-to-value-action carrier |
//! | [`preop`] | [`PreOp`](preop::PreOp), one-shot lazy pre-operator actions |
//! | [`node`] | [`Node`](node::Node), the sealed tree of node kinds, and `run`/`check_run` |
//! | [`registry`] | [`ReferenceRegistry`](registry::ReferenceRegistry), forward references for recursive productions |
//! | [`build`] | [`Builder`](build::Builder), the fluent tree-construction API |
//! | [`factory`] | [`Factory`](factory::Factory), entry points tying builders to a shared registry |
//! | [`driver`] | [`Driver`](driver::Driver), running a finished tree against a context |
//! | [`tracer`] | [`Tracer`](tracer::Tracer), the user-facing trace hook |
//! | [`error`] | Opt-in build-time error types |

pub mod build;
pub mod driver;
pub mod error;
pub mod factory;
pub mod node;
pub mod preop;
pub mod registry;
pub mod tracer;
pub mod value;

pub use build::{Alternatives, Builder};
pub use driver::Driver;
pub use error::BuildError;
pub use factory::Factory;
pub use node::{CheckResult, Node};
pub use preop::PreOp;
pub use registry::ReferenceRegistry;
pub use tracer::Tracer;
pub use value::ValueSlot;
