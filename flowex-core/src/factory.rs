//! Entry points for constructing a flow expression tree.
//!
//! A [`Factory`] owns the forward-reference registry and (optionally) the
//! tracer that every [`Builder`] it hands out will share, and provides
//! the opt-in completeness check [`Factory::finalize`] that the happy
//! path otherwise leaves as a silent run-time failure.

use std::cell::RefCell;
use std::rc::Rc;

use crate::build::Builder;
use crate::error::BuildError;
use crate::registry::ReferenceRegistry;
use crate::tracer::Tracer;

/// Produces builders that share one forward-reference registry, so
/// several productions (each built with its own [`Builder::record`] call)
/// can refer to each other.
pub struct Factory<T> {
    registry: Rc<RefCell<ReferenceRegistry<T>>>,
    tracer: Option<Rc<RefCell<dyn Tracer>>>,
}

impl<T> Factory<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(ReferenceRegistry::new())),
            tracer: None,
        }
    }

    /// A factory whose builders' trace bindings report to `tracer`.
    pub fn with_tracer(tracer: impl Tracer + 'static) -> Self {
        Self {
            registry: Rc::new(RefCell::new(ReferenceRegistry::new())),
            tracer: Some(Rc::new(RefCell::new(tracer))),
        }
    }

    /// A fresh builder sharing this factory's forward-reference registry
    /// and tracer.
    pub fn builder(&self) -> Builder<T> {
        Builder::with_shared(Rc::clone(&self.registry), self.tracer.clone())
    }

    /// Check that every name referenced via `ref_name` across builders
    /// produced by this factory was eventually bound via `record`.
    pub fn finalize(&self) -> Result<(), BuildError> {
        let unresolved = self.registry.borrow().unresolved();
        if unresolved.is_empty() {
            Ok(())
        } else {
            Err(BuildError::UnresolvedReferences(unresolved))
        }
    }
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueSlot;

    #[test]
    fn finalize_reports_unresolved_reference() {
        let factory: Factory<i32> = Factory::new();
        let mut builder = factory.builder();
        builder.ref_name("expr");
        let _root = builder.build();

        match factory.finalize() {
            Err(BuildError::UnresolvedReferences(names)) => {
                assert_eq!(names, vec!["expr".to_string()])
            }
            other => panic!("expected unresolved reference error, got {other:?}"),
        }
    }

    #[test]
    fn finalize_passes_once_reference_is_recorded() {
        let factory: Factory<i32> = Factory::new();

        let mut expr_builder = factory.builder();
        expr_builder.op(|_ctx: &mut i32, slot: &mut ValueSlot| slot.set(true, 1));
        expr_builder.record("expr");

        let mut user_builder = factory.builder();
        user_builder.ref_name("expr");
        let _root = user_builder.build();

        assert!(factory.finalize().is_ok());
    }
}
