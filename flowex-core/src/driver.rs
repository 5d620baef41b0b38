//! The execution driver: runs a built tree against a context.

use std::rc::Rc;

use crate::node::{CheckResult, Node};

/// Wraps a finished tree so it can be run repeatedly against different
/// contexts without re-threading the root through every call site.
pub struct Driver<T> {
    root: Rc<Node<T>>,
}

impl<T> Driver<T> {
    pub fn new(root: Rc<Node<T>>) -> Self {
        Self { root }
    }

    /// Run the tree against `ctx`, collapsing the result to pass/fail.
    pub fn run(&self, ctx: &mut T) -> bool {
        self.root.run(ctx)
    }

    /// Run the tree against `ctx`, keeping the three-valued lookahead
    /// result.
    pub fn check_run(&self, ctx: &mut T) -> CheckResult {
        self.root.check_run(ctx)
    }

    /// The tree this driver runs.
    pub fn root(&self) -> &Rc<Node<T>> {
        &self.root
    }
}

/// Run `root` against `ctx` once, without constructing a [`Driver`].
pub fn run<T>(root: &Node<T>, ctx: &mut T) -> bool {
    root.run(ctx)
}
