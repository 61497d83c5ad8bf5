//! Linear offset index over an [`AtomTree`].
//!
//! Offset `o` is the caret gap right after atom `order[o]`. Offset 0 sits
//! after the root body sentinel, i.e. before the first real atom.
//!
//! The index is derived data: it is rebuilt from scratch whenever the tree
//! changes, and never patched in place.

use std::collections::HashMap;

use crate::atom::AtomId;
use crate::selection::Offset;
use crate::tree::AtomTree;

/// Bidirectional map between offsets and atoms.
#[derive(Debug, Clone, Default)]
pub struct OffsetMap {
    order: Vec<AtomId>,
    index: HashMap<AtomId, Offset>,
}

impl OffsetMap {
    /// Builds the index from the tree's canonical flattening.
    pub fn build(tree: &AtomTree) -> Self {
        let order = tree.flatten();
        let index = order
            .iter()
            .enumerate()
            .map(|(offset, &id)| (id, offset))
            .collect();
        tracing::trace!(atoms = order.len(), "rebuilt offset index");
        Self { order, index }
    }

    /// The atom at `offset`, if any.
    pub fn atom_at(&self, offset: Offset) -> Option<AtomId> {
        self.order.get(offset).copied()
    }

    /// The offset of `id`, `None` if the atom is not in the tree.
    pub fn offset_of(&self, id: AtomId) -> Option<Offset> {
        self.index.get(&id).copied()
    }

    /// The maximum valid offset.
    pub fn last_offset(&self) -> Offset {
        self.order.len().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Atoms in offset order.
    pub fn iter(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.order.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{Atom, AtomKind, Branch};

    #[test]
    fn test_round_trip_every_atom() {
        let mut tree = AtomTree::new();
        let root = tree.root();
        let frac = tree
            .push(root, Branch::Body, Atom::new(AtomKind::Genfrac, ""))
            .unwrap();
        tree.push_run(frac, Branch::Above, AtomKind::Ord, "ab").unwrap();
        tree.push_run(frac, Branch::Below, AtomKind::Ord, "c").unwrap();

        let map = OffsetMap::build(&tree);
        assert_eq!(map.len(), 7);
        assert_eq!(map.last_offset(), 6);
        for offset in 0..=map.last_offset() {
            let id = map.atom_at(offset).unwrap();
            assert_eq!(map.offset_of(id), Some(offset));
        }
        assert_eq!(map.atom_at(7), None);
        assert_eq!(map.offset_of(root), None);
    }
}
