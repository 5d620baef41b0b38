//! The node model — one sealed enum covering every kind of tree element,
//! and the two execution entry points (`run`, `check_run`) that give it
//! meaning.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::preop::PreOp;
use crate::registry::ForwardCell;
use crate::tracer::Tracer;
use crate::value::ValueSlot;

/// The three-valued result of a lookahead-aware check.
///
/// `run` collapses this to a plain `bool`; `check_run` keeps the
/// distinction so [`Node::OneOf`] can tell "this alternative didn't match,
/// try the next one" (`FailFirst`) apart from "this alternative started
/// matching and then broke partway through, further alternatives would be
/// wrong to try" (`FailRemainder`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    Passed,
    FailFirst,
    FailRemainder,
}

impl CheckResult {
    pub fn is_pass(self) -> bool {
        matches!(self, CheckResult::Passed)
    }

    fn from_bool(ok: bool) -> Self {
        if ok {
            CheckResult::Passed
        } else {
            CheckResult::FailFirst
        }
    }
}

type Predicate<T> = RefCell<Box<dyn FnMut(&mut T, &mut ValueSlot) -> bool>>;
type ValueAction<T> = RefCell<Box<dyn FnMut(&mut T, Box<dyn Any>)>>;
type PlainAction<T> = RefCell<Box<dyn FnMut(&mut T)>>;
type RepActionFn<T> = RefCell<Box<dyn FnMut(&mut T, usize)>>;

enum TraceMode {
    Operator,
    OperatorWithValue,
}

struct TraceBinding<T> {
    label: String,
    tracer: Rc<RefCell<dyn Tracer>>,
    mode: TraceMode,
    _marker: std::marker::PhantomData<T>,
}

/// A leaf that runs a predicate against the context, optionally preceded
/// by a [`PreOp`], optionally feeding a matched value to a bound
/// value-action, optionally reporting its pass/fail to a bound [`Tracer`].
pub struct OperatorNode<T> {
    pre_op: Option<Rc<PreOp<T>>>,
    predicate: Predicate<T>,
    value_action: Option<ValueAction<T>>,
    trace: Option<TraceBinding<T>>,
}

impl<T> OperatorNode<T> {
    fn run(&self, ctx: &mut T) -> bool {
        if let Some(pre_op) = &self.pre_op {
            pre_op.fire(ctx);
        }
        let mut slot = ValueSlot::new();
        let passed = (self.predicate.borrow_mut())(ctx, &mut slot);

        if let Some(binding) = &self.trace {
            match binding.mode {
                TraceMode::Operator => {
                    binding.tracer.borrow_mut().operator(&binding.label, passed);
                }
                TraceMode::OperatorWithValue => {
                    binding.tracer.borrow_mut().operator_with_value(
                        &binding.label,
                        passed,
                        slot.as_any(),
                    );
                }
            }
        }

        if passed {
            if let (Some(action), Some(value)) = (&self.value_action, slot.take()) {
                (action.borrow_mut())(ctx, value);
            }
        }
        passed
    }
}

/// One node of a flow expression tree.
///
/// This is a sealed enum, not a trait-object hierarchy: the set of node
/// kinds is closed, and dispatch is a single `match` in [`Node::run`] and
/// [`Node::check_run`] rather than a v-table per node.
pub enum Node<T> {
    Sequence(Vec<Rc<Node<T>>>),
    Optional(Rc<Node<T>>),
    OneOf(Vec<Rc<Node<T>>>),
    NotOneOf(Vec<Rc<Node<T>>>),
    Repeat {
        body: Rc<Node<T>>,
        min: usize,
    },
    Operator(OperatorNode<T>),
    /// A read-only lookahead: runs `body` without letting its outcome
    /// consume the surrounding sequence. `negate` flips pass/fail.
    ///
    /// The core places no rollback requirement on the context (`spec.md`
    /// §6: no required `Context` methods), so `body` is expected to be
    /// side-effect-free when used here — the engine does not and cannot
    /// enforce that.
    Assert {
        body: Rc<Node<T>>,
        negate: bool,
    },
    Action(PlainAction<T>),
    RepAction {
        action: RepActionFn<T>,
        counter: Cell<usize>,
    },
    Fail(Option<PlainAction<T>>),
    NamedRef(ForwardCell<T>),
}

impl<T> Node<T> {
    pub(crate) fn new_operator(
        pre_op: Option<Rc<PreOp<T>>>,
        predicate: Box<dyn FnMut(&mut T, &mut ValueSlot) -> bool>,
        value_action: Option<Box<dyn FnMut(&mut T, Box<dyn Any>)>>,
    ) -> Self {
        Node::Operator(OperatorNode {
            pre_op,
            predicate: RefCell::new(predicate),
            value_action: value_action.map(RefCell::new),
            trace: None,
        })
    }

    pub(crate) fn bind_operator_value_action(
        &mut self,
        value_action: Box<dyn FnMut(&mut T, Box<dyn Any>)>,
    ) {
        if let Node::Operator(op) = self {
            op.value_action = Some(RefCell::new(value_action));
        }
    }

    pub(crate) fn set_operator_pre_op(&mut self, pre_op: Option<Rc<PreOp<T>>>) {
        if let Node::Operator(op) = self {
            op.pre_op = pre_op;
        }
    }

    pub(crate) fn bind_operator_trace(
        &mut self,
        label: String,
        tracer: Rc<RefCell<dyn Tracer>>,
        with_value: bool,
    ) {
        if let Node::Operator(op) = self {
            op.trace = Some(TraceBinding {
                label,
                tracer,
                mode: if with_value {
                    TraceMode::OperatorWithValue
                } else {
                    TraceMode::Operator
                },
                _marker: std::marker::PhantomData,
            });
        }
    }

    /// Recursively zero every [`Node::RepAction`] counter reachable from
    /// this node without crossing into a nested [`Node::Repeat`] (that
    /// inner repeat owns its own counters and resets them itself).
    fn reset_rep_action_counters(&self) {
        match self {
            Node::Sequence(children) | Node::OneOf(children) | Node::NotOneOf(children) => {
                for child in children {
                    child.reset_rep_action_counters();
                }
            }
            Node::Optional(body) | Node::Assert { body, .. } => {
                body.reset_rep_action_counters();
            }
            Node::RepAction { counter, .. } => counter.set(0),
            Node::Repeat { .. }
            | Node::Operator(_)
            | Node::Action(_)
            | Node::Fail(_)
            | Node::NamedRef(_) => {}
        }
    }

    /// Run this node against `ctx`, collapsing any lookahead distinction
    /// to a plain pass/fail.
    pub fn run(&self, ctx: &mut T) -> bool {
        self.check_run(ctx).is_pass()
    }

    /// Run this node against `ctx`, keeping the `FailFirst`/`FailRemainder`
    /// distinction alternation needs.
    pub fn check_run(&self, ctx: &mut T) -> CheckResult {
        match self {
            Node::Sequence(children) => {
                for (i, child) in children.iter().enumerate() {
                    match child.check_run(ctx) {
                        CheckResult::Passed => continue,
                        CheckResult::FailRemainder => return CheckResult::FailRemainder,
                        CheckResult::FailFirst => {
                            return if i == 0 {
                                CheckResult::FailFirst
                            } else {
                                CheckResult::FailRemainder
                            };
                        }
                    }
                }
                CheckResult::Passed
            }

            Node::Optional(body) => {
                let _ = body.check_run(ctx);
                CheckResult::Passed
            }

            Node::OneOf(alternatives) => {
                for alt in alternatives {
                    match alt.check_run(ctx) {
                        CheckResult::Passed => return CheckResult::Passed,
                        CheckResult::FailRemainder => return CheckResult::FailRemainder,
                        CheckResult::FailFirst => continue,
                    }
                }
                CheckResult::FailFirst
            }

            Node::NotOneOf(alternatives) => {
                for alt in alternatives {
                    if alt.check_run(ctx).is_pass() {
                        return CheckResult::FailFirst;
                    }
                }
                CheckResult::Passed
            }

            Node::Repeat { body, min } => {
                body.reset_rep_action_counters();
                let mut count = 0usize;
                while body.run(ctx) {
                    count += 1;
                }
                CheckResult::from_bool(count >= *min)
            }

            Node::Operator(op) => CheckResult::from_bool(op.run(ctx)),

            Node::Assert { body, negate } => {
                let passed = body.check_run(ctx).is_pass();
                CheckResult::from_bool(passed != *negate)
            }

            Node::Action(action) => {
                (action.borrow_mut())(ctx);
                CheckResult::Passed
            }

            Node::RepAction { action, counter } => {
                let idx = counter.get();
                (action.borrow_mut())(ctx, idx);
                counter.set(idx + 1);
                CheckResult::Passed
            }

            Node::Fail(on_fail) => {
                if let Some(action) = on_fail {
                    (action.borrow_mut())(ctx);
                }
                CheckResult::FailFirst
            }

            Node::NamedRef(cell) => {
                let target = cell
                    .borrow()
                    .clone()
                    .expect("unresolved forward reference used before Factory::finalize");
                target.check_run(ctx)
            }
        }
    }

    /// Whether this node can never hard-fail a surrounding [`Node::Sequence`]
    /// (used by the builder to decide when a `FailFirst` at position 0 is
    /// safe to treat as "no-op" rather than "rest of the sequence is
    /// unreachable").
    pub fn is_optional(&self) -> bool {
        matches!(self, Node::Optional(_) | Node::Action(_) | Node::RepAction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(pred: impl FnMut(&mut i32, &mut ValueSlot) -> bool + 'static) -> Rc<Node<i32>> {
        Rc::new(Node::new_operator(None, Box::new(pred), None))
    }

    #[test]
    fn sequence_fails_first_when_first_child_fails() {
        let seq = Node::Sequence(vec![op(|_, _| false), op(|_, _| true)]);
        assert_eq!(seq.check_run(&mut 0), CheckResult::FailFirst);
    }

    #[test]
    fn sequence_fails_remainder_when_later_child_fails() {
        let seq = Node::Sequence(vec![op(|_, _| true), op(|_, _| false)]);
        assert_eq!(seq.check_run(&mut 0), CheckResult::FailRemainder);
    }

    #[test]
    fn one_of_tries_next_alternative_on_fail_first() {
        let alt = Node::OneOf(vec![op(|_, _| false), op(|_, _| true)]);
        assert!(alt.run(&mut 0));
    }

    #[test]
    fn one_of_stops_on_fail_remainder() {
        let committed = Node::Sequence(vec![op(|_, _| true), op(|_, _| false)]);
        let alt = Node::OneOf(vec![Rc::new(committed), op(|_, _| true)]);
        assert_eq!(alt.check_run(&mut 0), CheckResult::FailRemainder);
    }

    #[test]
    fn optional_always_passes() {
        let opt = Node::Optional(op(|_, _| false));
        assert!(opt.run(&mut 0));
    }

    #[test]
    fn not_one_of_passes_only_when_nothing_matches() {
        let nof = Node::NotOneOf(vec![op(|_, _| false), op(|_, _| false)]);
        assert!(nof.run(&mut 0));

        let nof = Node::NotOneOf(vec![op(|_, _| false), op(|_, _| true)]);
        assert!(!nof.run(&mut 0));
    }

    #[test]
    fn repeat_counts_until_failure_and_checks_min() {
        let countdown = Rc::new(RefCell::new(3));
        let countdown_inner = Rc::clone(&countdown);
        let body = op(move |_: &mut i32, _| {
            let mut c = countdown_inner.borrow_mut();
            if *c == 0 {
                false
            } else {
                *c -= 1;
                true
            }
        });
        let repeat = Node::Repeat { body, min: 2 };
        assert!(repeat.run(&mut 0));
    }

    #[test]
    fn repeat_fails_below_min() {
        let body = op(|_, _| false);
        let repeat = Node::Repeat { body, min: 1 };
        assert!(!repeat.run(&mut 0));
    }

    #[test]
    fn assert_does_not_block_reruns_and_negate_flips() {
        let calls = Rc::new(Cell::new(0));
        let calls_inner = Rc::clone(&calls);
        let body = op(move |_: &mut i32, _| {
            calls_inner.set(calls_inner.get() + 1);
            true
        });
        let positive = Node::Assert { body: Rc::clone(&body), negate: false };
        assert!(positive.run(&mut 0));
        let negative = Node::Assert { body, negate: true };
        assert!(!negative.run(&mut 0));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn fail_node_always_fails_and_runs_its_action() {
        let fired = Rc::new(Cell::new(false));
        let fired_inner = Rc::clone(&fired);
        let fail = Node::Fail(Some(RefCell::new(Box::new(move |_: &mut i32| {
            fired_inner.set(true);
        }))));
        assert!(!fail.run(&mut 0));
        assert!(fired.get());
    }

    #[test]
    fn rep_action_receives_increasing_indices() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_inner = Rc::clone(&seen);
        let rep_action = Rc::new(Node::RepAction {
            action: RefCell::new(Box::new(move |_: &mut i32, idx: usize| {
                seen_inner.borrow_mut().push(idx);
            })),
            counter: Cell::new(0),
        });

        let countdown = Rc::new(RefCell::new(3));
        let countdown_inner = Rc::clone(&countdown);
        let matcher = op(move |_: &mut i32, _| {
            let mut c = countdown_inner.borrow_mut();
            if *c == 0 {
                false
            } else {
                *c -= 1;
                true
            }
        });
        let body = Rc::new(Node::Sequence(vec![matcher, rep_action]));
        let repeat = Node::Repeat { body, min: 0 };
        assert!(repeat.run(&mut 0));
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }
}
