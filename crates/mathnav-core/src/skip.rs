//! Structural skips: word, command, fence or same-kind run at a time.
//!
//! ## Learning: Dispatch on the Adjacent Atom
//!
//! The atom next to the caret in the direction of travel decides what a
//! skip crosses:
//!
//! | adjacent atom            | skip crosses                          |
//! |--------------------------|---------------------------------------|
//! | text                     | a word ([`crate::word`])              |
//! | latex                    | the command name                      |
//! | `(` forward, `)` backward| the balanced fence group              |
//! | branch sentinel, backward| every sentinel back to a real atom    |
//! | anything else            | the run of siblings of the same kind  |
//!
//! Sibling walks never leave the branch they start in.

use mathnav_model::{AtomId, AtomKind, Direction, Offset};

use crate::navigator::{NavOptions, Navigator};

impl Navigator {
    /// Moves to the next point of structural interest in `direction`.
    ///
    /// A backward skip first discards a pending autocomplete suggestion.
    /// Returns false (and announces a plonk) when nothing could be
    /// crossed.
    pub fn skip(&mut self, direction: Direction, options: NavOptions) -> bool {
        let previous = self.model.position();
        if direction == Direction::Backward {
            self.discard_suggestion();
        }
        if !options.extend {
            self.model.collapse_selection(direction);
        }

        match self.skip_target(direction) {
            Some(target) => self.land(target, previous, options),
            None => self.plonk(),
        }
    }

    /// The atom a skip starts from.
    fn adjacent_atom(&self, direction: Direction) -> Option<AtomId> {
        let position = self.model.position();
        match direction {
            Direction::Backward => self.model.at(position),
            Direction::Forward => {
                let current = self.model.at(position)?;
                if self.model.atom(current).kind == AtomKind::SubSup {
                    if let Some(right) = self.model.tree().right_sibling(current) {
                        return Some(right);
                    }
                }
                self.model.at(position + 1)
            }
        }
    }

    fn skip_target(&mut self, direction: Direction) -> Option<Offset> {
        let atom = self.adjacent_atom(direction)?;
        let offset = self.model.offset_of(atom)?;
        let kind = self.model.atom(atom).kind;
        tracing::trace!(%atom, %kind, offset, ?direction, "skip");

        if kind.is_text() {
            return Some(self.word_scanner().boundary(&self.model, offset, direction));
        }
        if kind.is_command() {
            return self.skip_command(atom, offset, direction);
        }
        match direction {
            Direction::Forward if kind.is_fence_open() => self.skip_fence_forward(atom),
            Direction::Backward if kind.is_fence_close() => self.skip_fence_backward(atom),
            Direction::Backward if kind.is_sentinel() => Some(self.skip_sentinels_backward(offset)),
            Direction::Backward => self.skip_run_backward(atom),
            Direction::Forward => self.skip_run_forward(atom),
        }
    }

    fn is_command_char(&self, id: AtomId) -> bool {
        let atom = self.model.atom(id);
        let extra = &self.config().commands.extra_command_chars;
        atom.kind.is_command()
            && !atom.is_suggestion
            && !atom.value.is_empty()
            && atom
                .value
                .chars()
                .all(|c| c.is_ascii_alphabetic() || extra.contains(c))
    }

    fn skip_command(&mut self, atom: AtomId, offset: Offset, direction: Direction) -> Option<Offset> {
        if self.model.atom(atom).is_suggestion {
            debug_assert_eq!(
                direction,
                Direction::Forward,
                "a pending suggestion is only ever skipped forward"
            );
            // Accept the whole suggestion and land after it
            let mut landing = offset;
            let mut current = Some(atom);
            while let Some(id) = current.filter(|&id| self.model.atom(id).kind.is_command()) {
                self.accept_suggestion(id);
                landing = self.model.offset_of(id)?;
                current = self.model.tree().right_sibling(id);
            }
            return Some(landing);
        }

        let tree = self.model.tree();
        let next = |id: AtomId| match direction {
            Direction::Forward => tree.right_sibling(id),
            Direction::Backward => tree.left_sibling(id),
        };
        // Caret gap on the far side of `id`
        let past = |id: AtomId| match direction {
            Direction::Forward => self.model.offset_of(id),
            Direction::Backward => tree.left_sibling(id).and_then(|left| self.model.offset_of(left)),
        };

        // A leading backslash or other non-name character is crossed alone
        let mut current = Some(atom);
        let mut landing = None;
        if !self.is_command_char(atom) {
            landing = past(atom);
            current = next(atom);
        }
        while let Some(id) = current.filter(|&id| self.is_command_char(id)) {
            landing = past(id);
            current = next(id);
        }
        landing.or(Some(offset))
    }

    /// Lands after the `)` matching the `(` at `open`.
    fn skip_fence_forward(&self, open: AtomId) -> Option<Offset> {
        let tree = self.model.tree();
        let mut level = 0usize;
        let mut current = open;
        loop {
            let kind = tree.atom(current).kind;
            if kind.is_fence_open() {
                level += 1;
            } else if kind.is_fence_close() {
                level = level.saturating_sub(1);
            }
            if level == 0 {
                break;
            }
            match tree.right_sibling(current) {
                Some(next) => current = next,
                // Unterminated: end of the run
                None => break,
            }
        }
        self.model.offset_of(current)
    }

    /// Lands before the `(` matching the `)` at `close`.
    fn skip_fence_backward(&self, close: AtomId) -> Option<Offset> {
        let tree = self.model.tree();
        let mut level = 0usize;
        let mut current = close;
        loop {
            let kind = tree.atom(current).kind;
            if kind.is_fence_close() {
                level += 1;
            } else if kind.is_fence_open() {
                level = level.saturating_sub(1);
            }
            if level == 0 {
                return self.model.offset_of(tree.left_sibling(current)?);
            }
            match tree.left_sibling(current) {
                Some(previous) if !tree.atom(previous).kind.is_sentinel() => current = previous,
                // Unterminated: start of the run
                _ => return self.model.offset_of(tree.first_sibling(close)?),
            }
        }
    }

    fn skip_sentinels_backward(&self, mut offset: Offset) -> Offset {
        while offset > 0 && self.model.kind_at(offset) == Some(AtomKind::First) {
            offset -= 1;
        }
        offset
    }

    fn skip_run_backward(&self, atom: AtomId) -> Option<Offset> {
        let tree = self.model.tree();
        // Scripts belong to their base
        let mut current = atom;
        if tree.atom(atom).kind == AtomKind::SubSup {
            current = tree.left_sibling(atom)?;
            if tree.atom(current).kind.is_sentinel() {
                return self.model.offset_of(current);
            }
        }
        let kind = tree.atom(current).kind;

        while let Some(previous) = tree.left_sibling(current) {
            let previous_kind = tree.atom(previous).kind;
            if previous_kind == AtomKind::SubSup {
                match tree.left_sibling(previous) {
                    Some(base) if tree.atom(base).kind == kind => current = base,
                    _ => break,
                }
            } else if previous_kind == kind {
                current = previous;
            } else {
                break;
            }
        }
        self.model.offset_of(tree.left_sibling(current)?)
    }

    fn skip_run_forward(&self, atom: AtomId) -> Option<Offset> {
        let tree = self.model.tree();
        let kind = tree.atom(atom).kind;
        let mut current = atom;
        while let Some(next) = tree.right_sibling(current) {
            let next_kind = tree.atom(next).kind;
            if next_kind != kind && next_kind != AtomKind::SubSup {
                break;
            }
            current = next;
        }
        self.model.offset_of(current)
    }
}

#[cfg(test)]
mod tests {
    use mathnav_model::{Direction, Range};

    use crate::event::{Announcement, NavEffect};
    use crate::navigator::{AlwaysPlonk, NavOptions, Navigator};
    use crate::testing::{math, run, text};

    fn navigator(body: &str) -> Navigator {
        Navigator::new(math(body))
    }

    fn fences(source: &str) -> String {
        let atoms: Vec<String> = source
            .chars()
            .map(|c| {
                let kind = match c {
                    '(' => "open",
                    ')' => "close",
                    _ => "ord",
                };
                format!(r#"{{ "kind": "{kind}", "value": "{c}" }}"#)
            })
            .collect();
        format!("[{}]", atoms.join(","))
    }

    #[test]
    fn test_skip_word_in_text() {
        let mut nav = Navigator::new(text("blue   yellow"));
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 4);
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 13);
        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 7);
    }

    #[test]
    fn test_skip_same_kind_run() {
        // first, a, b, +, c
        let body = format!("[{},{},{}]", run("ord", "ab"), run("bin", "+"), run("ord", "c"));
        let mut nav = navigator(&body);
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 2);
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 3);
        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 2);
        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 0);

        let events = nav.take_events();
        assert!(events.iter().all(|e| e.announcement == Announcement::Move));
        assert_eq!(events[1].previous_position, Some(2));
    }

    #[test]
    fn test_skip_at_edges_plonks() {
        let mut nav = navigator(&format!("[{}]", run("ord", "ab")));
        assert!(!nav.skip(Direction::Backward, NavOptions::MOVE));
        nav.model_mut().set_position(2);
        assert!(!nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(
            nav.events().last().map(|e| e.announcement),
            Some(Announcement::Plonk)
        );
    }

    #[test]
    fn test_skip_balanced_fences() {
        // first, (, a, (, b, ), ), c
        let mut nav = navigator(&fences("(a(b))c"));
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 6);

        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 0);

        // Inner group
        nav.model_mut().set_position(2);
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 5);
    }

    #[test]
    fn test_skip_fence_as_last_sibling() {
        // first, x, (, y, )
        let mut nav = navigator(&fences("x(y)"));
        nav.model_mut().set_position(1);
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 4);
        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 1);
    }

    #[test]
    fn test_skip_unterminated_fences() {
        // first, (, a, b
        let mut nav = navigator(&fences("(ab"));
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 3);

        // first, a, b, )
        let mut nav = navigator(&fences("ab)"));
        nav.model_mut().set_position(3);
        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 0);
    }

    #[test]
    fn test_skip_backward_over_scripted_base() {
        // first, +, x, [first, 2], subsup, y
        let mut nav = navigator(
            r#"[{ "kind": "bin", "value": "+" },
                { "kind": "ord", "value": "x" },
                { "kind": "subsup", "superscript": [{ "kind": "ord", "value": "2" }] },
                { "kind": "ord", "value": "y" }]"#,
        );
        let last = nav.model().last_offset();
        nav.model_mut().set_position(last);
        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 1);

        // Starting on the scripts retargets to the base
        nav.model_mut().set_position(5);
        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 1);
    }

    #[test]
    fn test_skip_forward_over_scripted_base() {
        // first, x, [first, 2], subsup, y, +
        let mut nav = navigator(
            r#"[{ "kind": "ord", "value": "x" },
                { "kind": "subsup", "superscript": [{ "kind": "ord", "value": "2" }] },
                { "kind": "ord", "value": "y" },
                { "kind": "bin", "value": "+" }]"#,
        );
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 5);
    }

    #[test]
    fn test_skip_backward_from_branch_start() {
        // first, x, [first, 1], [first, 2], frac
        let mut nav = navigator(
            r#"[{ "kind": "ord", "value": "x" },
                { "kind": "genfrac",
                  "above": [{ "kind": "ord", "value": "1" }],
                  "below": [{ "kind": "ord", "value": "2" }] }]"#,
        );
        nav.model_mut().set_position(2);
        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 1);
    }

    fn command(suggestion: &str) -> Navigator {
        // first, [first, \, f, r, a, c, <suggestion>], group
        navigator(&format!(
            r#"[{{ "kind": "latexgroup", "body": [
                {{ "kind": "latex", "value": "\\frac" }},
                {{ "kind": "latex", "value": "{suggestion}", "suggestion": true }}
            ] }}]"#
        ))
    }

    #[test]
    fn test_skip_command_name() {
        let mut nav = command("x");
        // Caret after '\'
        nav.model_mut().set_position(2);
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 6);

        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        // The backslash is not a name character
        assert_eq!(nav.model().position(), 2);
    }

    #[test]
    fn test_skip_accepts_suggestion() {
        let mut nav = command("tion");
        nav.model_mut().set_position(6);
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 10);
        let accepted = nav
            .take_effects()
            .into_iter()
            .filter(|e| matches!(e, NavEffect::SuggestionAccepted(_)))
            .count();
        assert_eq!(accepted, 4);
        assert_eq!(nav.model().command_suggestion_range(), None);
    }

    #[test]
    fn test_skip_backward_over_one_name_char() {
        let mut nav = command("x");
        // Caret after '\f'
        nav.model_mut().set_position(3);
        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 2);
    }

    #[test]
    fn test_skip_forward_crosses_backslash_and_name() {
        let mut nav = command("x");
        nav.model_mut().set_position(1);
        assert!(nav.skip(Direction::Forward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 6);
    }

    #[test]
    fn test_group_end_then_skip_backward_discards_suggestion() {
        // first, [first, \, f, r, a, c], group
        let mut nav = navigator(
            r#"[{ "kind": "latexgroup", "body": [
                { "kind": "latex", "value": "\\fr" },
                { "kind": "latex", "value": "ac", "suggestion": true }
            ] }]"#,
        );
        nav.model_mut().set_position(3);
        assert!(nav.execute("group-end".parse().unwrap(), &mut AlwaysPlonk));
        assert_eq!(nav.model().position(), 6);
        assert_eq!(nav.model().command_suggestion_range(), Some((4, 6)));

        assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
        assert_eq!(nav.model().position(), 2);
        assert_eq!(nav.model().command_suggestion_range(), None);
        assert!(matches!(
            nav.take_effects().as_slice(),
            [NavEffect::SuggestionDiscarded { range: (4, 6), atoms }] if atoms.len() == 2
        ));
        assert_eq!(nav.take_events().last().map(|e| e.previous_position), Some(Some(6)));
    }

    #[test]
    fn test_skip_extend() {
        let body = format!("[{},{}]", run("ord", "ab"), run("rel", "="));
        let mut nav = navigator(&body);
        assert!(nav.skip(Direction::Forward, NavOptions::EXTEND));
        assert_eq!(nav.model().selection().primary(), Range::new(0, 2));
        assert!(nav.skip(Direction::Forward, NavOptions::EXTEND));
        assert_eq!(nav.model().selection().primary(), Range::new(0, 3));
        assert_eq!(nav.model().anchor(), 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn skip_crosses_a_run_in_one_step(kinds in prop::collection::vec(
                (prop::sample::select(vec!["ord", "bin", "rel", "punct"]), 1usize..5),
                1..6,
            )) {
                let body: Vec<String> = kinds
                    .iter()
                    .map(|(kind, n)| run(kind, &"q".repeat(*n)))
                    .collect();
                let mut nav = navigator(&format!("[{}]", body.join(",")));
                let last = nav.model().last_offset();

                // Forward skips visit run ends, backward skips come back
                let mut stops = vec![0];
                while nav.skip(Direction::Forward, NavOptions::MOVE) {
                    stops.push(nav.model().position());
                }
                prop_assert_eq!(*stops.last().unwrap(), last);
                // Adjacent runs of the same kind merge into one
                prop_assert!(stops.len() <= kinds.len() + 1);

                for window in stops.windows(2).rev() {
                    prop_assert!(nav.skip(Direction::Backward, NavOptions::MOVE));
                    prop_assert_eq!(nav.model().position(), window[0]);
                }
            }
        }
    }
}
