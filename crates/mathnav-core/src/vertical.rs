//! Vertical moves between stacked branches and matrix rows.
//!
//! Moving up from a `below` branch (a denominator, a lower limit) goes to
//! the `above` branch of the same construct, and the other way round.
//! Inside an array the caret keeps its column and its index within the
//! cell as far as the target row allows.

use mathnav_model::{AtomId, Branch, Direction, Offset, Selection, SelectionDirection};

use crate::event::{Announcement, NavEffect};
use crate::navigator::{NavDirection, NavOptions, Navigator, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    Up,
    Down,
}

impl Vertical {
    /// The branch a move starts from.
    fn source(self) -> Branch {
        match self {
            Vertical::Up => Branch::Below,
            Vertical::Down => Branch::Above,
        }
    }

    fn target(self) -> Branch {
        match self {
            Vertical::Up => Branch::Above,
            Vertical::Down => Branch::Below,
        }
    }

    fn collapse_toward(self) -> Direction {
        match self {
            Vertical::Up => Direction::Backward,
            Vertical::Down => Direction::Forward,
        }
    }

    fn announcement(self) -> Announcement {
        match self {
            Vertical::Up => Announcement::MoveUp,
            Vertical::Down => Announcement::MoveDown,
        }
    }

    fn escape(self) -> NavDirection {
        match self {
            Vertical::Up => NavDirection::Upward,
            Vertical::Down => NavDirection::Downward,
        }
    }
}

/// The nearest enclosing construct the caret can move vertically in.
enum Anchor {
    Cell {
        array: AtomId,
        atom: AtomId,
        row: usize,
        col: usize,
    },
    Stacked(AtomId),
}

impl Navigator {
    /// Moves into the branch or matrix row above.
    pub fn move_upward(&mut self, options: NavOptions) -> Outcome {
        self.move_vertically(Vertical::Up, options)
    }

    /// Moves into the branch or matrix row below.
    pub fn move_downward(&mut self, options: NavOptions) -> Outcome {
        self.move_vertically(Vertical::Down, options)
    }

    fn move_vertically(&mut self, toward: Vertical, options: NavOptions) -> Outcome {
        let previous = self.model.position();
        if !options.extend {
            self.model.collapse_selection(toward.collapse_toward());
        }

        let moved = match self.vertical_anchor(toward.source()) {
            None => return Outcome::Escaped(toward.escape()),
            Some(Anchor::Cell {
                array,
                atom,
                row,
                col,
            }) => self.move_in_array(toward, array, atom, (row, col), options),
            Some(Anchor::Stacked(atom)) => self.move_in_stack(toward, atom, options),
        };

        if !moved {
            self.plonk();
            return Outcome::Rejected;
        }
        self.announce(toward.announcement(), Some(previous));
        Outcome::Moved
    }

    fn vertical_anchor(&self, source: Branch) -> Option<Anchor> {
        let tree = self.model.tree();
        let mut current = self.model.at(self.model.position());
        while let Some(id) = current {
            let atom = tree.atom(id);
            match (atom.tree_branch(), atom.parent()) {
                (Some(Branch::Cell(row, col)), Some(parent))
                    if tree.atom(parent).kind.is_array() =>
                {
                    return Some(Anchor::Cell {
                        array: parent,
                        atom: id,
                        row,
                        col,
                    });
                }
                (Some(branch), Some(_)) if branch == source => return Some(Anchor::Stacked(id)),
                _ => current = atom.parent(),
            }
        }
        None
    }

    /// The offset of the matching atom in the row above or below.
    fn array_target(
        &self,
        toward: Vertical,
        array: AtomId,
        atom: AtomId,
        (row, col): (usize, usize),
    ) -> Option<Offset> {
        let tree = self.model.tree();
        let index = tree.cell(array, row, col)?.iter().position(|&id| id == atom)?;

        let row_count = tree.row_count(array);
        let wanted_row = match toward {
            Vertical::Up => row.saturating_sub(1),
            Vertical::Down => (row + 1).min(row_count.saturating_sub(1)),
        };
        // A row without cells can't be entered
        let target_row = if tree.last_column(array, wanted_row).is_some() {
            wanted_row
        } else {
            row
        };
        let target_col = col.min(tree.last_column(array, target_row)?);
        let cell = tree
            .cell(array, target_row, target_col)
            .or_else(|| tree.cell(array, row, col))?;

        let target = *cell.get(index).or_else(|| cell.last())?;
        self.model.offset_of(target)
    }

    fn move_in_array(
        &mut self,
        toward: Vertical,
        array: AtomId,
        atom: AtomId,
        cell: (usize, usize),
        options: NavOptions,
    ) -> bool {
        let Some(target) = self.array_target(toward, array, atom, cell) else {
            return false;
        };
        tracing::trace!(%array, ?cell, target, "array move");

        if !options.extend {
            self.set_position_handling_placeholder(target);
            return true;
        }

        let range = self.model.selection().primary();
        let pivot = match toward {
            Vertical::Up => range.start,
            Vertical::Down => range.end,
        };
        let selection = if target < pivot {
            Selection::single(target, range.end, SelectionDirection::Backward)
        } else {
            Selection::single(range.start, target, SelectionDirection::Forward)
        };
        self.model.set_selection_ranges(selection);
        true
    }

    fn move_in_stack(&mut self, toward: Vertical, atom: AtomId, options: NavOptions) -> bool {
        let Some(parent) = self.model.tree().parent(atom) else {
            return false;
        };

        if options.extend {
            // Select the whole construct
            let tree = self.model.tree();
            let start = tree
                .left_sibling(parent)
                .and_then(|left| self.model.offset_of(left));
            let end = self.model.offset_of(parent);
            return match start.zip(end) {
                Some((start, end)) => {
                    self.model.set_selection(start, end);
                    true
                }
                None => false,
            };
        }

        let branch = toward.target();
        if !self.model.atom(parent).has_branch(branch) {
            if let Err(err) = self.model.create_branch(parent, branch) {
                tracing::warn!(%parent, %branch, %err, "cannot create branch");
                return false;
            }
            self.record(NavEffect::BranchCreated {
                atom: parent,
                branch,
            });
        }

        let last = self
            .model
            .tree()
            .branch(parent, branch)
            .and_then(|atoms| atoms.last().copied())
            .and_then(|id| self.model.offset_of(id));
        match last {
            Some(offset) => {
                self.set_position_handling_placeholder(offset);
                true
            }
            None => false,
        }
    }
}
