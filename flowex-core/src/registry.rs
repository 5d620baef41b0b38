//! Forward-reference registry — lets a grammar production refer to a node
//! that hasn't been built yet, enabling recursive and mutually-recursive
//! productions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::node::Node;

/// A cell that may be read (`ref_name`) before it is written (`record`).
pub type ForwardCell<T> = Rc<RefCell<Option<Rc<Node<T>>>>>;

/// Name-to-node table backing forward references. Names are matched
/// case-insensitively; rebinding an existing name silently overwrites the
/// prior cell's target (and logs a `tracing::warn!`, see [`ReferenceRegistry::record`]).
pub struct ReferenceRegistry<T> {
    cells: HashMap<String, ForwardCell<T>>,
}

impl<T> Default for ReferenceRegistry<T> {
    fn default() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }
}

impl<T> ReferenceRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    /// Look up the forward cell for `name`, creating an empty one if this
    /// is the first reference to that name.
    pub fn cell(&mut self, name: &str) -> ForwardCell<T> {
        Rc::clone(
            self.cells
                .entry(Self::key(name))
                .or_insert_with(|| Rc::new(RefCell::new(None))),
        )
    }

    /// Bind `node` as the target for `name`. If `name` was already bound,
    /// the prior target is silently replaced — `ref` cells that already
    /// captured the old `Rc<RefCell<..>>` see the new target on their next
    /// read, since they share the same cell. A rebind is unusual enough in
    /// a well-formed grammar that it's worth a diagnostic even though it's
    /// not an error.
    pub fn record(&mut self, name: &str, node: Rc<Node<T>>) {
        let cell = self.cell(name);
        if cell.borrow().is_some() {
            tracing::warn!(name, "forward reference rebound; previous target discarded");
        }
        *cell.borrow_mut() = Some(node);
    }

    /// Names referenced via [`ReferenceRegistry::cell`] whose cell is still
    /// empty — used by `Factory::finalize`'s opt-in completeness check.
    pub fn unresolved(&self) -> Vec<String> {
        self.cells
            .iter()
            .filter(|(_, cell)| cell.borrow().is_none())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn unrecorded_name_is_unresolved() {
        let mut reg: ReferenceRegistry<()> = ReferenceRegistry::new();
        reg.cell("expr");
        assert_eq!(reg.unresolved(), vec!["expr".to_string()]);
    }

    #[test]
    fn record_resolves_prior_cell_reads() {
        let mut reg: ReferenceRegistry<()> = ReferenceRegistry::new();
        let cell = reg.cell("Expr");
        assert!(cell.borrow().is_none());

        let target = Rc::new(Node::Fail);
        reg.record("expr", Rc::clone(&target));

        assert!(cell.borrow().is_some());
        assert!(reg.unresolved().is_empty());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut reg: ReferenceRegistry<()> = ReferenceRegistry::new();
        let a = reg.cell("Expr");
        let b = reg.cell("EXPR");
        assert!(Rc::ptr_eq(&a, &b));
    }
}
