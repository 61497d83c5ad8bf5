//! Model builders shared by the unit tests.

use mathnav_model::{AtomKind, AtomTree, Branch, FormulaSpec, Model};

use crate::navigator::{MoveOutHandler, NavDirection};

/// A model whose body is one text atom per character of `s`.
pub(crate) fn text(s: &str) -> Model {
    let mut tree = AtomTree::new();
    let root = tree.root();
    tree.push_run(root, Branch::Body, AtomKind::Text, s).unwrap();
    Model::new(tree)
}

/// A model built from a JSON array of atom specs used as the root body.
pub(crate) fn math(body: &str) -> Model {
    let spec = FormulaSpec::from_json(&format!(r#"{{ "body": {body} }}"#)).unwrap();
    Model::new(spec.build().unwrap())
}

/// Shorthand for a run of same-kind single-character atoms.
pub(crate) fn run(kind: &str, chars: &str) -> String {
    chars
        .chars()
        .map(|c| format!(r#"{{ "kind": "{kind}", "value": "{c}" }}"#))
        .collect::<Vec<_>>()
        .join(",")
}

/// Host that records every escape and answers with a fixed result.
pub(crate) struct RecordingHost {
    pub calls: Vec<NavDirection>,
    result: bool,
}

impl RecordingHost {
    pub(crate) fn new(result: bool) -> Self {
        Self {
            calls: Vec::new(),
            result,
        }
    }
}

impl MoveOutHandler for RecordingHost {
    fn move_out(&mut self, _model: &Model, direction: NavDirection) -> bool {
        self.calls.push(direction);
        self.result
    }
}
