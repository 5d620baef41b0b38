//! Pre-operators — one-shot lazy actions attached to an operator, most
//! commonly used to skip whitespace before the operator's predicate runs.

use std::cell::Cell;
use std::rc::Rc;

/// A lazy, idempotent-until-reset action run once before an operator's
/// predicate fires.
///
/// A `PreOp<T>` may be shared across many operators (the builder's
/// "global pre-op", set once and inherited by every operator added after
/// it) or attached fresh to a single operator (an override). Either way,
/// each `PreOp` instance only actually invokes its action once per
/// "commit" cycle: the first operator to consult a given `PreOp` runs the
/// action and flips an internal flag; every other operator sharing that
/// same `PreOp` in the same cycle sees the flag already set and skips the
/// action. The flag resets when the tree commits forward progress (see
/// [`PreOp::reset`]), so the action fires again on the next token.
pub struct PreOp<T> {
    action: Box<dyn Fn(&mut T)>,
    fired: Cell<bool>,
}

impl<T> PreOp<T> {
    /// Wrap `action` as a fresh, not-yet-fired pre-operator.
    pub fn new(action: impl Fn(&mut T) + 'static) -> Rc<Self> {
        Rc::new(Self {
            action: Box::new(action),
            fired: Cell::new(false),
        })
    }

    /// Run the action if it hasn't fired since the last reset.
    pub fn fire(&self, ctx: &mut T) {
        if !self.fired.get() {
            (self.action)(ctx);
            self.fired.set(true);
        }
    }

    /// Clear the fired flag, so the next `fire` call runs the action again.
    pub fn reset(&self) {
        self.fired.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_until_reset() {
        let calls = Rc::new(Cell::new(0));
        let calls_inner = Rc::clone(&calls);
        let pre = PreOp::new(move |_ctx: &mut ()| calls_inner.set(calls_inner.get() + 1));

        pre.fire(&mut ());
        pre.fire(&mut ());
        assert_eq!(calls.get(), 1);

        pre.reset();
        pre.fire(&mut ());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn shared_instance_fires_once_across_operators() {
        let calls = Rc::new(Cell::new(0));
        let calls_inner = Rc::clone(&calls);
        let shared = PreOp::new(move |_ctx: &mut ()| calls_inner.set(calls_inner.get() + 1));

        let op_a = Rc::clone(&shared);
        let op_b = Rc::clone(&shared);
        op_a.fire(&mut ());
        op_b.fire(&mut ());
        assert_eq!(calls.get(), 1);
    }
}
