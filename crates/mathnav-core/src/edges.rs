//! Jumps to branch and formula edges, and whole-unit selections.

use mathnav_model::{Direction, Mode, Offset};

use crate::navigator::{NavOptions, Navigator};

impl Navigator {
    /// Moves to the start or end of the branch holding the caret.
    pub fn move_to_group_edge(&mut self, direction: Direction, options: NavOptions) -> bool {
        let previous = self.model.position();
        let tree = self.model.tree();
        let target = self
            .model
            .at(previous)
            .and_then(|id| match direction {
                Direction::Forward => tree.last_sibling(id),
                Direction::Backward => tree.first_sibling(id),
            })
            .and_then(|id| self.model.offset_of(id));

        match target {
            Some(target) => self.land(target, previous, options),
            None => self.plonk(),
        }
    }

    /// Moves to the start or end of the whole formula.
    pub fn move_to_edge(&mut self, direction: Direction, options: NavOptions) -> bool {
        let previous = self.model.position();
        let target = match direction {
            Direction::Forward => self.model.last_offset(),
            Direction::Backward => 0,
        };
        self.land(target, previous, options)
    }

    /// Selects everything.
    pub fn select_all(&mut self) -> bool {
        let last = self.model.last_offset();
        self.model.set_selection(0, last);
        true
    }

    /// Selects the text word under the caret.
    pub fn select_word(&mut self) -> bool {
        let previous = self.model.position();
        let Some((start, end)) = self.word_around(previous) else {
            return self.plonk();
        };
        if start == end {
            return self.plonk();
        }
        self.model.set_selection(start, end);
        self.announce(crate::event::Announcement::Move, Some(previous));
        true
    }

    /// The word containing the character after the caret, or the one
    /// before it when the caret ends a word.
    fn word_around(&self, position: Offset) -> Option<(Offset, Offset)> {
        let is_word_text = |offset: Offset| {
            self.model
                .atom_at(offset)
                .is_some_and(|atom| atom.mode == Mode::Text && !atom.is_whitespace())
        };
        let origin = if is_word_text(position + 1) {
            position + 1
        } else if position > 0 && is_word_text(position) {
            position
        } else {
            return None;
        };

        let scanner = self.word_scanner();
        let start = scanner.boundary(&self.model, origin, Direction::Backward);
        let end = scanner.boundary(&self.model, origin, Direction::Forward);
        Some((start, end))
    }
}
