//! Word boundaries inside text-mode runs.
//!
//! ## Learning: Character Classes
//!
//! Word motion classifies the character under the caret and then scans
//! while the class holds. Three classes cover what platform text fields
//! do:
//!
//! - word characters (ASCII letters and digits, plus configured extras)
//! - whitespace
//! - everything else (punctuation)
//!
//! Starting on whitespace crosses the whitespace *and* the word after
//! it. Starting on punctuation crosses the punctuation and the
//! whitespace after it.

use mathnav_model::{Atom, Direction, Mode, Model, Offset};

/// Returns the caret offset at the edge of the text word containing the
/// atom at `offset`, scanning in `direction`.
///
/// Atoms outside text mode are not words: the offset comes back
/// unchanged.
pub fn word_boundary_offset(model: &Model, offset: Offset, direction: Direction) -> Offset {
    WordScanner::default().boundary(model, offset, direction)
}

/// Word scanner with a configurable set of extra word characters.
#[derive(Debug, Clone, Default)]
pub struct WordScanner {
    extra_word_chars: String,
}

impl WordScanner {
    pub fn new(extra_word_chars: impl Into<String>) -> Self {
        Self {
            extra_word_chars: extra_word_chars.into(),
        }
    }

    fn is_word(&self, atom: &Atom) -> bool {
        !atom.value.is_empty()
            && atom
                .value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || self.extra_word_chars.contains(c))
    }

    /// Scans from atom index `i` while `matches` holds and returns the
    /// index of the first atom that failed (or the first missing index).
    fn scan(
        model: &Model,
        mut i: isize,
        step: isize,
        matches: impl Fn(&Atom) -> bool,
    ) -> isize {
        while let Some(id) = model.at_signed(i) {
            if !matches(model.atom(id)) {
                break;
            }
            i += step;
        }
        i
    }

    /// See [`word_boundary_offset`].
    pub fn boundary(&self, model: &Model, offset: Offset, direction: Direction) -> Offset {
        let Some(start) = model.atom_at(offset) else {
            return offset;
        };
        if start.mode != Mode::Text {
            return offset;
        }

        let step = direction.sign();
        let origin = offset as isize;
        let in_text = |atom: &Atom| atom.mode == Mode::Text;

        // Index of the first atom past the run(s) crossed
        let stop = if self.is_word(start) {
            Self::scan(model, origin, step, |a| in_text(a) && self.is_word(a))
        } else if start.is_whitespace() {
            let spaces = Self::scan(model, origin, step, |a| in_text(a) && a.is_whitespace());
            if model.at_signed(spaces).is_none() {
                spaces
            } else {
                Self::scan(model, spaces, step, |a| in_text(a) && !a.is_whitespace())
            }
        } else {
            let punctuation =
                Self::scan(model, origin, step, |a| in_text(a) && !a.is_whitespace());
            Self::scan(model, punctuation, step, |a| in_text(a) && a.is_whitespace())
        };

        // Last atom crossed, then atom index to caret gap
        let last_crossed = stop - step;
        let gap = match direction {
            Direction::Forward => last_crossed,
            Direction::Backward => last_crossed - 1,
        };
        let result = gap.clamp(0, model.last_offset() as isize) as Offset;
        tracing::trace!(offset, ?direction, result, "word boundary");
        result
    }
}
