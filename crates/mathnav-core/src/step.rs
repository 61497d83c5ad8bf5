//! Single-offset caret steps.
//!
//! A plain step moves the caret one offset. A handful of atom flags bend
//! that rule:
//!
//! - a capture-selection zone is crossed as a whole
//! - the branches of a skip-boundary atom are entered and left in one step
//! - landing next to a placeholder selects it
//! - stepping forward onto an autocomplete suggestion commits it

use mathnav_model::{Direction, Offset};

use crate::event::Announcement;
use crate::navigator::{NavDirection, NavOptions, Navigator, Outcome};

/// Result of adjusting a candidate offset for atom flags.
enum Candidate {
    At(isize),
    /// The caret was repositioned; take another step from there
    StepAgain,
}

impl Navigator {
    /// Moves one step in `direction` without settling escapes.
    ///
    /// Vertical directions go to the vertical engine. Any direction but
    /// forward first discards a pending autocomplete suggestion.
    pub fn step(&mut self, direction: NavDirection, options: NavOptions) -> Outcome {
        if direction != NavDirection::Forward {
            self.discard_suggestion();
        }

        let horizontal = match direction {
            NavDirection::Upward => return self.move_upward(options),
            NavDirection::Downward => return self.move_downward(options),
            NavDirection::Forward => Direction::Forward,
            NavDirection::Backward => Direction::Backward,
        };

        if options.extend {
            return if self.model.extend_selection(horizontal) {
                Outcome::Moved
            } else {
                Outcome::Rejected
            };
        }

        let previous = self.model.position();
        self.step_horizontal(horizontal, previous)
    }

    fn step_horizontal(&mut self, direction: Direction, previous: Offset) -> Outcome {
        if self.model.selection_is_placeholder() {
            self.model.collapse_selection(direction);
            return self.step_horizontal(direction, previous);
        }

        // Collapsing a selection is the move
        if !self.model.collapse_selection(direction) {
            let candidate = self.model.position() as isize + direction.sign();
            let candidate = match self.adjust_candidate(direction, candidate) {
                Candidate::At(candidate) => candidate,
                Candidate::StepAgain => return self.step_horizontal(direction, previous),
            };

            if candidate < 0 || candidate as usize > self.model.last_offset() {
                return Outcome::Escaped(direction.into());
            }
            self.set_position_handling_placeholder(candidate as usize);
        }

        self.announce(Announcement::Move, Some(previous));
        Outcome::Moved
    }

    fn adjust_candidate(&mut self, direction: Direction, candidate: isize) -> Candidate {
        let Some(id) = self.model.at_signed(candidate) else {
            return Candidate::At(candidate);
        };
        let tree = self.model.tree();
        let owner = tree.capture_owner(id);
        let parent_skips = tree
            .parent(id)
            .is_some_and(|parent| tree.atom(parent).skip_boundary);
        let first = tree.is_first_sibling(id);
        let last = tree.is_last_sibling(id);

        match direction {
            Direction::Forward => {
                if let Some(owner) = owner {
                    return Candidate::At(self.offset_or(owner, candidate));
                }
                if parent_skips && last && !first {
                    let next = candidate + 1;
                    if next == self.model.last_offset() as isize {
                        return Candidate::At(next);
                    }
                    self.model.set_position(next as Offset);
                    return Candidate::StepAgain;
                }
                self.accept_suggestion(id);
                Candidate::At(candidate)
            }
            Direction::Backward => {
                if let Some(owner) = owner {
                    let before = tree
                        .left_sibling(owner)
                        .and_then(|left| self.model.offset_of(left))
                        .unwrap_or(0);
                    return Candidate::At(before as isize);
                }
                if parent_skips && first && !last {
                    return Candidate::At((candidate - 1).max(0));
                }
                Candidate::At(candidate)
            }
        }
    }

    fn offset_or(&self, id: mathnav_model::AtomId, fallback: isize) -> isize {
        self.model
            .offset_of(id)
            .map_or(fallback, |offset| offset as isize)
    }
}

#[cfg(test)]
mod tests {
    use mathnav_model::{Range, SelectionDirection};

    use crate::event::{Announcement, NavEffect};
    use crate::navigator::{AlwaysPlonk, NavDirection, NavOptions, Navigator, Outcome};
    use crate::testing::{math, run};

    fn navigator(body: &str) -> Navigator {
        Navigator::new(math(body))
    }

    fn forward(nav: &mut Navigator) -> bool {
        nav.move_cursor(NavDirection::Forward, NavOptions::MOVE, &mut AlwaysPlonk)
    }

    fn backward(nav: &mut Navigator) -> bool {
        nav.move_cursor(NavDirection::Backward, NavOptions::MOVE, &mut AlwaysPlonk)
    }

    #[test]
    fn test_plain_steps() {
        let mut nav = navigator(&format!("[{}]", run("ord", "abc")));
        assert!(forward(&mut nav));
        assert!(forward(&mut nav));
        assert_eq!(nav.model().position(), 2);
        assert!(backward(&mut nav));
        assert_eq!(nav.model().position(), 1);

        let events = nav.take_events();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.announcement == Announcement::Move));
        assert_eq!(events[2].previous_position, Some(2));
    }

    #[test]
    fn test_steps_through_fraction_branches() {
        // first, x, [first, 1], [first, 2], frac
        let mut nav = navigator(
            r#"[{ "kind": "ord", "value": "x" },
                { "kind": "genfrac",
                  "above": [{ "kind": "ord", "value": "1" }],
                  "below": [{ "kind": "ord", "value": "2" }] }]"#,
        );
        let mut seen = vec![nav.model().position()];
        while nav.model().position() < nav.model().last_offset() {
            assert!(forward(&mut nav));
            seen.push(nav.model().position());
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_collapsing_is_the_move() {
        let mut nav = navigator(&format!("[{}]", run("ord", "abcd")));
        nav.model_mut().set_selection(1, 3);
        assert!(backward(&mut nav));
        assert_eq!(nav.model().position(), 1);
        assert!(nav.model().is_collapsed());

        nav.model_mut().set_selection(3, 1);
        assert!(forward(&mut nav));
        assert_eq!(nav.model().position(), 3);
    }

    #[test]
    fn test_extend_uses_the_anchor() {
        let mut nav = navigator(&format!("[{}]", run("ord", "ab")));
        let mut host = AlwaysPlonk;
        assert!(nav.move_cursor(NavDirection::Forward, NavOptions::EXTEND, &mut host));
        assert!(nav.move_cursor(NavDirection::Forward, NavOptions::EXTEND, &mut host));
        assert_eq!(nav.model().selection().primary(), Range::new(0, 2));
        assert_eq!(nav.model().selection().direction, SelectionDirection::Forward);
        // No room left: no escape, no announcement
        assert_eq!(nav.step(NavDirection::Forward, NavOptions::EXTEND), Outcome::Rejected);
        assert!(nav.events().is_empty());
    }

    #[test]
    fn test_landing_on_placeholder_selects_it() {
        // first, x, +, placeholder
        let mut nav = navigator(
            r#"[{ "kind": "ord", "value": "x" },
                { "kind": "bin", "value": "+" },
                { "kind": "placeholder" }]"#,
        );
        nav.model_mut().set_position(1);
        assert!(forward(&mut nav));
        // Caret after '+' with the placeholder to its right
        assert_eq!(nav.model().selection().primary(), Range::new(2, 3));
        assert!(nav.model().selection_is_placeholder());

        // The placeholder selection collapses forward, then the step
        // runs into the end of the formula
        assert!(forward(&mut nav));
        assert_eq!(nav.model().position(), 3);
        assert_eq!(
            nav.events().last().map(|e| e.announcement),
            Some(Announcement::Plonk)
        );
    }

    #[test]
    fn test_backward_onto_placeholder_selects_it() {
        // first, x, placeholder, y
        let mut nav = navigator(
            r#"[{ "kind": "ord", "value": "x" },
                { "kind": "placeholder" },
                { "kind": "ord", "value": "y" }]"#,
        );
        // Landing right after the placeholder
        nav.model_mut().set_position(3);
        assert!(backward(&mut nav));
        assert_eq!(nav.model().selection().primary(), Range::new(1, 2));
        assert!(nav.model().selection_is_placeholder());

        // Landing on 'x' with the placeholder to its right
        nav.model_mut().set_position(2);
        assert!(backward(&mut nav));
        assert_eq!(nav.model().selection().primary(), Range::new(1, 2));
        assert_eq!(nav.model().position(), 2);

        // The placeholder selection collapses backward, then steps on
        assert!(backward(&mut nav));
        assert_eq!(nav.model().position(), 0);
    }

    #[test]
    fn test_capture_selection_is_crossed_whole() {
        // first, x, [first, a, b], group, y
        let mut nav = navigator(
            r#"[{ "kind": "ord", "value": "x" },
                { "kind": "group", "capture_selection": true,
                  "body": [{ "kind": "ord", "value": "a" }, { "kind": "ord", "value": "b" }] },
                { "kind": "ord", "value": "y" }]"#,
        );
        nav.model_mut().set_position(1);
        assert!(forward(&mut nav));
        assert_eq!(nav.model().position(), 5);
        assert!(forward(&mut nav));
        assert_eq!(nav.model().position(), 6);

        assert!(backward(&mut nav));
        assert_eq!(nav.model().position(), 5);
        assert!(backward(&mut nav));
        assert_eq!(nav.model().position(), 1);
    }

    #[test]
    fn test_skip_boundary_branches_take_one_step() {
        let group = r#"{ "kind": "group", "skip_boundary": true,
            "body": [{ "kind": "ord", "value": "a" }, { "kind": "ord", "value": "b" }] }"#;

        // first, [first, a, b], group
        let mut nav = navigator(&format!("[{group}]"));
        nav.model_mut().set_position(2);
        // After 'b' is the same place as after the group, which ends the formula
        assert!(forward(&mut nav));
        assert_eq!(nav.model().position(), 4);

        // first, [first, a, b], group, y
        let mut nav = navigator(&format!(r#"[{group}, {{ "kind": "ord", "value": "y" }}]"#));
        nav.model_mut().set_position(2);
        // The caret is put after the group and steps again from there
        assert!(forward(&mut nav));
        assert_eq!(nav.model().position(), 5);

        // Backward from after 'a' leaves the group at once
        nav.model_mut().set_position(2);
        assert!(backward(&mut nav));
        assert_eq!(nav.model().position(), 0);
    }

    #[test]
    fn test_forward_onto_suggestion_accepts_it() {
        let mut nav = navigator(
            r#"[{ "kind": "latexgroup", "body": [
                { "kind": "latex", "value": "\\fr" },
                { "kind": "latex", "value": "ac", "suggestion": true }
            ] }]"#,
        );
        // first, [first, \, f, r, a, c], group
        nav.model_mut().set_position(4);
        assert!(forward(&mut nav));
        assert_eq!(nav.model().position(), 5);
        let accepted = nav.model().at(5).unwrap();
        assert!(!nav.model().atom(accepted).is_suggestion);
        assert_eq!(nav.take_effects(), vec![NavEffect::SuggestionAccepted(accepted)]);
    }

    #[test]
    fn test_backward_discards_pending_suggestion() {
        let mut nav = navigator(
            r#"[{ "kind": "latexgroup", "body": [
                { "kind": "latex", "value": "\\fr" },
                { "kind": "latex", "value": "ac", "suggestion": true }
            ] }]"#,
        );
        nav.model_mut().set_position(4);
        let before = nav.model().last_offset();

        assert!(backward(&mut nav));
        assert_eq!(nav.model().last_offset(), before - 2);
        assert_eq!(nav.model().position(), 3);
        assert!(matches!(
            nav.take_effects().as_slice(),
            [NavEffect::SuggestionDiscarded { range: (4, 6), atoms }] if atoms.len() == 2
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn forward_then_backward_returns(
                kinds in prop::collection::vec(prop::sample::select(vec!["ord", "bin", "rel", "text"]), 1..12),
                start in 0usize..12,
            ) {
                let body: Vec<String> = kinds.iter().map(|k| run(k, "q")).collect();
                let mut nav = navigator(&format!("[{}]", body.join(",")));
                let last = nav.model().last_offset();
                let start = start.min(last.saturating_sub(1));
                nav.model_mut().set_position(start);

                prop_assume!(start < last);
                prop_assert!(forward(&mut nav));
                prop_assert_eq!(nav.model().position(), start + 1);
                prop_assert!(backward(&mut nav));
                prop_assert_eq!(nav.model().position(), start);
            }
        }
    }
}
