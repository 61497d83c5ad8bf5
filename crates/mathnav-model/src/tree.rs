//! Arena-backed formula tree.
//!
//! ## Learning: Arenas Instead of `Rc<RefCell<_>>`
//!
//! A formula tree is navigated in every direction: up to the parent,
//! sideways to siblings, down into named branches or matrix cells.
//! Owning pointers can't express that without reference cycles, so all
//! atoms live in one `Vec` and refer to each other by [`AtomId`].
//! Detaching an atom only unlinks it; its slot stays valid.

use crate::atom::{Atom, AtomId, AtomKind, Branch};
use crate::{ModelError, ModelResult};

/// An ordered tree of atoms.
///
/// The root always owns a `body` branch, and every branch starts with a
/// `first` sentinel atom.
#[derive(Debug, Clone)]
pub struct AtomTree {
    atoms: Vec<Atom>,
    root: AtomId,
}

impl AtomTree {
    /// Creates a tree holding only the root and its body sentinel.
    pub fn new() -> Self {
        let mut tree = Self {
            atoms: vec![Atom::new(AtomKind::Root, "")],
            root: AtomId(0),
        };
        let root = tree.root;
        tree.attach_sentinel(root, Branch::Body);
        tree
    }

    /// Returns the root atom id.
    pub fn root(&self) -> AtomId {
        self.root
    }

    /// Returns the atom with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id was not issued by this tree.
    pub fn atom(&self, id: AtomId) -> &Atom {
        &self.atoms[id.index()]
    }

    pub fn get(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id.index())
    }

    pub(crate) fn atom_mut(&mut self, id: AtomId) -> &mut Atom {
        &mut self.atoms[id.index()]
    }

    /// Number of arena slots, detached atoms included.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root is always present
        false
    }

    fn check(&self, id: AtomId) -> ModelResult<&Atom> {
        self.get(id).ok_or(ModelError::UnknownAtom(id))
    }

    fn alloc(&mut self, atom: Atom) -> AtomId {
        let id = AtomId(self.atoms.len() as u32);
        self.atoms.push(atom);
        id
    }

    fn attach_sentinel(&mut self, parent: AtomId, branch: Branch) -> AtomId {
        let mode = self.atom(parent).mode;
        let mut sentinel = Atom::sentinel(mode);
        sentinel.parent = Some(parent);
        sentinel.tree_branch = Some(branch);
        let id = self.alloc(sentinel);
        self.atom_mut(parent).branches.insert(branch, vec![id]);
        id
    }

    fn validate_branch(&self, parent: AtomId, branch: Branch) -> ModelResult<()> {
        let atom = self.check(parent)?;
        if !atom.kind.can_have_branches() {
            return Err(ModelError::NoBranches(atom.kind));
        }
        if branch.is_cell() && !atom.kind.is_array() {
            return Err(ModelError::NotAnArray(parent));
        }
        Ok(())
    }

    /// Adds an empty branch (holding only its sentinel) to `parent`.
    pub fn create_branch(&mut self, parent: AtomId, branch: Branch) -> ModelResult<&[AtomId]> {
        self.validate_branch(parent, branch)?;
        if self.atom(parent).has_branch(branch) {
            return Err(ModelError::BranchExists { atom: parent, branch });
        }
        self.attach_sentinel(parent, branch);
        Ok(self.branch(parent, branch).unwrap_or_default())
    }

    /// Appends `atom` to a branch of `parent`, creating the branch if needed.
    pub fn push(&mut self, parent: AtomId, branch: Branch, atom: Atom) -> ModelResult<AtomId> {
        self.validate_branch(parent, branch)?;
        if !self.atom(parent).has_branch(branch) {
            self.attach_sentinel(parent, branch);
        }

        let mut atom = atom;
        atom.parent = Some(parent);
        atom.tree_branch = Some(branch);
        atom.branches.clear();
        let id = self.alloc(atom);
        self.atom_mut(parent)
            .branches
            .entry(branch)
            .or_default()
            .push(id);
        Ok(id)
    }

    /// Appends one atom of `kind` per character of `run`.
    pub fn push_run(
        &mut self,
        parent: AtomId,
        branch: Branch,
        kind: AtomKind,
        run: &str,
    ) -> ModelResult<Vec<AtomId>> {
        run.chars()
            .map(|c| self.push(parent, branch, Atom::new(kind, c.to_string())))
            .collect()
    }

    /// Returns the atoms of a branch, sentinel included.
    pub fn branch(&self, id: AtomId, branch: Branch) -> Option<&[AtomId]> {
        self.get(id)?.branches.get(&branch).map(Vec::as_slice)
    }

    /// Iterates over the branches of an atom in canonical order.
    pub fn branches(&self, id: AtomId) -> impl Iterator<Item = (Branch, &[AtomId])> + '_ {
        self.atom(id)
            .branches
            .iter()
            .map(|(branch, atoms)| (*branch, atoms.as_slice()))
    }

    pub fn parent(&self, id: AtomId) -> Option<AtomId> {
        self.get(id)?.parent
    }

    /// The branch `id` belongs to.
    pub fn siblings(&self, id: AtomId) -> Option<&[AtomId]> {
        let atom = self.get(id)?;
        self.branch(atom.parent?, atom.tree_branch?)
    }

    /// Index of `id` within its branch (the sentinel is index 0).
    pub fn sibling_index(&self, id: AtomId) -> Option<usize> {
        self.siblings(id)?.iter().position(|&sibling| sibling == id)
    }

    pub fn left_sibling(&self, id: AtomId) -> Option<AtomId> {
        let index = self.sibling_index(id)?;
        let siblings = self.siblings(id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    pub fn right_sibling(&self, id: AtomId) -> Option<AtomId> {
        let index = self.sibling_index(id)?;
        self.siblings(id)?.get(index + 1).copied()
    }

    /// The sentinel of the branch `id` belongs to.
    pub fn first_sibling(&self, id: AtomId) -> Option<AtomId> {
        self.siblings(id)?.first().copied()
    }

    pub fn last_sibling(&self, id: AtomId) -> Option<AtomId> {
        self.siblings(id)?.last().copied()
    }

    pub fn is_first_sibling(&self, id: AtomId) -> bool {
        self.first_sibling(id) == Some(id)
    }

    /// The root (and any atom without a branch) counts as a last sibling.
    pub fn is_last_sibling(&self, id: AtomId) -> bool {
        match self.siblings(id) {
            Some(siblings) => siblings.last() == Some(&id),
            None => true,
        }
    }

    /// Returns the nearest strict ancestor of `id` that captures selection.
    pub fn capture_owner(&self, id: AtomId) -> Option<AtomId> {
        let mut current = self.parent(id);
        while let Some(atom) = current {
            if self.atom(atom).capture_selection {
                return Some(atom);
            }
            current = self.parent(atom);
        }
        None
    }

    pub fn in_capture_selection(&self, id: AtomId) -> bool {
        self.capture_owner(id).is_some()
    }

    /// Returns true if `id` is reachable from the root.
    pub fn is_attached(&self, id: AtomId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            let Some(parent) = self.parent(current) else {
                return false;
            };
            let listed = self
                .siblings(current)
                .is_some_and(|siblings| siblings.contains(&current));
            if !listed {
                return false;
            }
            current = parent;
        }
    }

    // ==================== Arrays ====================

    /// The atoms of cell `(row, col)` of an array atom.
    pub fn cell(&self, array: AtomId, row: usize, col: usize) -> Option<&[AtomId]> {
        self.branch(array, Branch::Cell(row, col))
    }

    /// Number of rows of an array atom (0 for other atoms).
    pub fn row_count(&self, array: AtomId) -> usize {
        self.atom(array)
            .branches
            .keys()
            .filter_map(|branch| branch.cell())
            .map(|(row, _)| row + 1)
            .max()
            .unwrap_or(0)
    }

    /// Highest column index present in `row`.
    pub fn last_column(&self, array: AtomId, row: usize) -> Option<usize> {
        self.atom(array)
            .branches
            .keys()
            .filter_map(|branch| branch.cell())
            .filter(|&(r, _)| r == row)
            .map(|(_, col)| col)
            .max()
    }

    // ==================== Mutation ====================

    /// Unlinks `id` from its parent's branch. Sentinels cannot be detached.
    pub(crate) fn detach(&mut self, id: AtomId) -> bool {
        if self.atom(id).kind.is_sentinel() {
            return false;
        }
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let Some(branch) = self.atom(id).tree_branch else {
            return false;
        };
        let Some(siblings) = self.atom_mut(parent).branches.get_mut(&branch) else {
            return false;
        };
        let before = siblings.len();
        siblings.retain(|&sibling| sibling != id);
        let removed = siblings.len() != before;
        if removed {
            let atom = self.atom_mut(id);
            atom.parent = None;
            atom.tree_branch = None;
        }
        removed
    }

    /// Post-order flattening: for each branch, each atom's descendants
    /// followed by the atom itself. The root is excluded.
    pub fn flatten(&self) -> Vec<AtomId> {
        let mut order = Vec::with_capacity(self.atoms.len());
        self.flatten_into(self.root, &mut order);
        order
    }

    fn flatten_into(&self, id: AtomId, order: &mut Vec<AtomId>) {
        for atoms in self.atom(id).branches.values() {
            for &child in atoms {
                self.flatten_into(child, order);
                order.push(child);
            }
        }
    }
}

impl Default for AtomTree {
    fn default() -> Self {
        Self::new()
    }
}
