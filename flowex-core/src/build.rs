//! The fluent builder — the primary way a caller assembles a flow
//! expression tree.
//!
//! A [`Builder`] accumulates a flat sequence of nodes (its "host"). Most
//! methods append one node and return `&mut Self` so calls chain; a few
//! (`seq`, `optional`, `repeat`, `assert`, `assert_not`, `one_of`,
//! `not_one_of`) take a closure that receives a fresh nested builder,
//! build a subtree, and append that subtree as a single node. Methods
//! that configure the most recently added operator (`skip`, `pre_op`,
//! `act_value`, `trace_op`, `trace_op_with_value`) only have an effect
//! when called immediately after `op` — anything else that appends a
//! node commits the pending operator first, after which those calls are
//! no-ops. This mirrors a fluent registry builder accepting configuration
//! for "the thing I just added" before moving on to the next one.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::node::Node;
use crate::preop::PreOp;
use crate::registry::ReferenceRegistry;
use crate::tracer::Tracer;
use crate::value::ValueSlot;

/// State shared by a builder and every nested builder spawned from it:
/// the global pre-op, the skip-by-default flag, the forward-reference
/// registry, and an optional bound tracer.
struct Shared<T> {
    global_pre_op: RefCell<Option<Rc<PreOp<T>>>>,
    default_skip: RefCell<bool>,
    registry: Rc<RefCell<ReferenceRegistry<T>>>,
    tracer: Option<Rc<RefCell<dyn Tracer>>>,
}

/// Builds one subtree of a flow expression.
pub struct Builder<T> {
    shared: Rc<Shared<T>>,
    host: Vec<Rc<Node<T>>>,
    pending: Option<Node<T>>,
}

impl<T> Builder<T> {
    /// Start a fresh, standalone builder with no global pre-op, no bound
    /// tracer, and a private forward-reference registry.
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared {
                global_pre_op: RefCell::new(None),
                default_skip: RefCell::new(false),
                registry: Rc::new(RefCell::new(ReferenceRegistry::new())),
                tracer: None,
            }),
            host: Vec::new(),
            pending: None,
        }
    }

    /// Start a fresh builder whose trace bindings (`trace`, `trace_op`,
    /// `trace_op_with_value`) report to `tracer`.
    pub fn with_tracer(tracer: impl Tracer + 'static) -> Self {
        Self::with_shared(
            Rc::new(RefCell::new(ReferenceRegistry::new())),
            Some(Rc::new(RefCell::new(tracer))),
        )
    }

    /// Start a fresh builder whose trace bindings report to an
    /// already-shared tracer handle, so the caller can keep its own
    /// clone to inspect afterward (a freshly-owned tracer passed to
    /// [`Builder::with_tracer`] is otherwise only reachable through the
    /// tree's trace bindings themselves).
    pub fn with_tracer_handle(tracer: Rc<RefCell<dyn Tracer>>) -> Self {
        Self::with_shared(Rc::new(RefCell::new(ReferenceRegistry::new())), Some(tracer))
    }

    /// Start a fresh builder sharing an existing forward-reference
    /// registry and tracer, used by [`crate::factory::Factory`] so
    /// multiple productions can refer to each other.
    pub(crate) fn with_shared(
        registry: Rc<RefCell<ReferenceRegistry<T>>>,
        tracer: Option<Rc<RefCell<dyn Tracer>>>,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                global_pre_op: RefCell::new(None),
                default_skip: RefCell::new(false),
                registry,
                tracer,
            }),
            host: Vec::new(),
            pending: None,
        }
    }

    fn child(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
            host: Vec::new(),
            pending: None,
        }
    }

    fn commit_pending(&mut self) {
        if let Some(node) = self.pending.take() {
            self.host.push(Rc::new(node));
        }
    }

    fn push_complete(&mut self, node: Node<T>) -> &mut Self {
        self.commit_pending();
        self.host.push(Rc::new(node));
        self
    }

    fn push_rc(&mut self, node: Rc<Node<T>>) -> &mut Self {
        self.commit_pending();
        self.host.push(node);
        self
    }

    fn pending_operator_mut(&mut self) -> Option<&mut Node<T>> {
        match &self.pending {
            Some(Node::Operator(_)) => self.pending.as_mut(),
            _ => None,
        }
    }

    /// Finalize a nested builder's accumulated host into a single node: the
    /// lone node if exactly one was added, otherwise a [`Node::Sequence`].
    fn finish(mut self) -> Rc<Node<T>> {
        self.commit_pending();
        if self.host.len() == 1 {
            self.host.pop().expect("checked len == 1")
        } else {
            Rc::new(Node::Sequence(self.host))
        }
    }

    // -- tree-wide configuration --------------------------------------

    /// Set the pre-op every operator added after this call inherits,
    /// unless overridden per-operator via [`Builder::pre_op`] or disabled
    /// via [`Builder::skip`].
    pub fn global_pre_op(&mut self, action: impl Fn(&mut T) + 'static) -> &mut Self {
        *self.shared.global_pre_op.borrow_mut() = Some(PreOp::new(action));
        self
    }

    /// Whether operators added after this call inherit the global pre-op
    /// by default (`true`, the default) or must opt in explicitly via
    /// [`Builder::pre_op`] (`false`).
    pub fn default_skip(&mut self, skip: bool) -> &mut Self {
        *self.shared.default_skip.borrow_mut() = skip;
        self
    }

    // -- leaves ---------------------------------------------------------

    /// Add an operator: a leaf predicate that reads/advances the context
    /// and may place a value in its [`ValueSlot`] for a following
    /// [`Builder::act_value`] to consume.
    pub fn op(
        &mut self,
        predicate: impl FnMut(&mut T, &mut ValueSlot) -> bool + 'static,
    ) -> &mut Self {
        self.commit_pending();
        let pre_op = if *self.shared.default_skip.borrow() {
            None
        } else {
            self.shared.global_pre_op.borrow().clone()
        };
        self.pending = Some(Node::new_operator(pre_op, Box::new(predicate), None));
        self
    }

    /// Disable the pre-op for the operator just added via [`Builder::op`].
    pub fn skip(&mut self) -> &mut Self {
        if let Some(node) = self.pending_operator_mut() {
            node.set_operator_pre_op(None);
        }
        self
    }

    /// Give the operator just added a pre-op of its own, overriding
    /// whatever the global pre-op would have supplied.
    pub fn pre_op(&mut self, action: impl Fn(&mut T) + 'static) -> &mut Self {
        if let Some(node) = self.pending_operator_mut() {
            node.set_operator_pre_op(Some(PreOp::new(action)));
        }
        self
    }

    /// Bind a value-action to the operator just added via [`Builder::op`]:
    /// when that operator passes and left a value of type `V` in its
    /// slot, `action` is invoked with it.
    pub fn act_value<V: 'static>(
        &mut self,
        mut action: impl FnMut(&mut T, V) + 'static,
    ) -> &mut Self {
        if let Some(node) = self.pending_operator_mut() {
            let wrapped: Box<dyn FnMut(&mut T, Box<dyn Any>)> =
                Box::new(move |ctx: &mut T, value: Box<dyn Any>| {
                    if let Ok(v) = value.downcast::<V>() {
                        action(ctx, *v);
                    }
                });
            node.bind_operator_value_action(wrapped);
        }
        self
    }

    /// Bind the operator just added to the builder's tracer, reporting
    /// pass/fail on every invocation.
    pub fn trace_op(&mut self, label: impl Into<String>) -> &mut Self {
        if let Some(tracer) = self.shared.tracer.clone() {
            if let Some(node) = self.pending_operator_mut() {
                node.bind_operator_trace(label.into(), tracer, false);
            }
        }
        self
    }

    /// Like [`Builder::trace_op`], also reporting the matched value (if
    /// any) to the tracer.
    pub fn trace_op_with_value(&mut self, label: impl Into<String>) -> &mut Self {
        if let Some(tracer) = self.shared.tracer.clone() {
            if let Some(node) = self.pending_operator_mut() {
                node.bind_operator_trace(label.into(), tracer, true);
            }
        }
        self
    }

    /// Emit a trace message through the builder's tracer when this point
    /// in the tree is reached. A no-op if no tracer was bound.
    pub fn trace(&mut self, level: i32, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        match self.shared.tracer.clone() {
            Some(tracer) => self.push_complete(Node::Action(RefCell::new(Box::new(
                move |_ctx: &mut T| tracer.borrow_mut().message(level, &text),
            )))),
            None => self,
        }
    }

    /// Add a plain side-effecting action. Always succeeds.
    pub fn act(&mut self, action: impl FnMut(&mut T) + 'static) -> &mut Self {
        self.push_complete(Node::Action(RefCell::new(Box::new(action))))
    }

    /// Add a repetition-indexed action, meaningful as a child of a
    /// [`Builder::repeat`] body: invoked once per iteration with the
    /// (zero-based) iteration count.
    pub fn rep_act(&mut self, action: impl FnMut(&mut T, usize) + 'static) -> &mut Self {
        self.push_complete(Node::RepAction {
            action: RefCell::new(Box::new(action)),
            counter: std::cell::Cell::new(0),
        })
    }

    /// Add an unconditional failure.
    pub fn fail(&mut self) -> &mut Self {
        self.push_complete(Node::Fail(None))
    }

    /// Add an unconditional failure that first runs `action` (typically
    /// used to report a diagnostic before the surrounding sequence aborts).
    pub fn fail_with(&mut self, action: impl FnMut(&mut T) + 'static) -> &mut Self {
        self.push_complete(Node::Fail(Some(RefCell::new(Box::new(action)))))
    }

    // -- structural composition -----------------------------------------

    /// Add a nested sequence as a single child node.
    pub fn seq(&mut self, build: impl FnOnce(&mut Builder<T>)) -> &mut Self {
        let mut child = self.child();
        build(&mut child);
        self.push_rc(child.finish())
    }

    /// Add a nested subtree that always succeeds, regardless of whether
    /// its body matched.
    pub fn optional(&mut self, build: impl FnOnce(&mut Builder<T>)) -> &mut Self {
        let mut child = self.child();
        build(&mut child);
        self.push_complete(Node::Optional(child.finish()))
    }

    /// Add a repeated subtree: `build` describes one iteration's body,
    /// repeated until it fails to match. Passes overall if it matched at
    /// least `min` times.
    pub fn repeat(&mut self, min: usize, build: impl FnOnce(&mut Builder<T>)) -> &mut Self {
        let mut child = self.child();
        build(&mut child);
        self.push_complete(Node::Repeat { body: child.finish(), min })
    }

    /// Add a positive lookahead: succeeds if `build`'s subtree would
    /// match, without letting that match commit to the surrounding
    /// sequence.
    pub fn assert(&mut self, build: impl FnOnce(&mut Builder<T>)) -> &mut Self {
        let mut child = self.child();
        build(&mut child);
        self.push_complete(Node::Assert { body: child.finish(), negate: false })
    }

    /// Add a negative lookahead: succeeds only if `build`'s subtree would
    /// not match.
    pub fn assert_not(&mut self, build: impl FnOnce(&mut Builder<T>)) -> &mut Self {
        let mut child = self.child();
        build(&mut child);
        self.push_complete(Node::Assert { body: child.finish(), negate: true })
    }

    /// Add an alternation: each call inside `build` adds one alternative,
    /// tried in order until one matches.
    pub fn one_of(&mut self, build: impl FnOnce(&mut Alternatives<T>)) -> &mut Self {
        let mut alts = Alternatives { builder: self.child(), alternatives: Vec::new() };
        build(&mut alts);
        alts.commit_current();
        self.push_complete(Node::OneOf(alts.alternatives))
    }

    /// Add a negative alternation: succeeds only if none of the
    /// alternatives inside `build` would match.
    pub fn not_one_of(&mut self, build: impl FnOnce(&mut Alternatives<T>)) -> &mut Self {
        let mut alts = Alternatives { builder: self.child(), alternatives: Vec::new() };
        build(&mut alts);
        alts.commit_current();
        self.push_complete(Node::NotOneOf(alts.alternatives))
    }

    // -- forward references ----------------------------------------------

    /// Add a reference to a production that will be (or already was)
    /// named via [`Builder::record`]. Resolution happens lazily, so
    /// `ref_name` may be called before the corresponding `record`.
    pub fn ref_name(&mut self, name: impl Into<String>) -> &mut Self {
        let cell = self.shared.registry.borrow_mut().cell(&name.into());
        self.push_complete(Node::NamedRef(cell))
    }

    /// Finalize everything added so far into a single node, bind it to
    /// `name` in the shared forward-reference registry, and reset this
    /// builder so it can go on to build the next production. Returns the
    /// finalized node so the caller can also use it directly (e.g. as the
    /// tree's root).
    pub fn record(&mut self, name: impl Into<String>) -> Rc<Node<T>> {
        self.commit_pending();
        let node: Rc<Node<T>> = if self.host.len() == 1 {
            self.host.pop().expect("checked len == 1")
        } else {
            Rc::new(Node::Sequence(std::mem::take(&mut self.host)))
        };
        self.shared.registry.borrow_mut().record(&name.into(), Rc::clone(&node));
        node
    }

    /// Finalize everything added so far into a single root node.
    pub fn build(&mut self) -> Rc<Node<T>> {
        self.commit_pending();
        if self.host.len() == 1 {
            self.host.pop().expect("checked len == 1")
        } else {
            Rc::new(Node::Sequence(std::mem::take(&mut self.host)))
        }
    }

}

impl<T> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A scope for adding alternatives inside [`Builder::one_of`] /
/// [`Builder::not_one_of`]. Each call to [`Alternatives::alt`] closes off
/// the previous alternative and starts a new one.
pub struct Alternatives<T> {
    builder: Builder<T>,
    alternatives: Vec<Rc<Node<T>>>,
}

impl<T> Alternatives<T> {
    fn commit_current(&mut self) {
        self.builder.commit_pending();
        if !self.builder.host.is_empty() {
            let node = if self.builder.host.len() == 1 {
                self.builder.host.pop().expect("checked len == 1")
            } else {
                Rc::new(Node::Sequence(std::mem::take(&mut self.builder.host)))
            };
            self.alternatives.push(node);
        }
    }

    /// Add one alternative, described by `build`.
    pub fn alt(&mut self, build: impl FnOnce(&mut Builder<T>)) -> &mut Self {
        self.commit_current();
        build(&mut self.builder);
        self
    }
}
