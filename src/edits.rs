use std::fmt::Display;

use serde_repr::{Deserialize_repr, Serialize_repr};

/// One kind of edit step. The numeric values follow the wire convention of
/// the wider diff-match-patch family (-1 delete, 0 equal, 1 insert).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum Op {
    Delete = -1,
    Equal = 0,
    Insert = 1,
}

/// One step of an edit script: an operation plus the text it applies to.
///
/// The crate-public `Edit` carries Unicode code points. The `T` parameter
/// exists for the line-mode acceleration, which runs the same machinery over
/// opaque line handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit<T = char>(pub(crate) Op, pub(crate) Vec<T>);

impl<T: Copy + Eq> Edit<T> {
    pub fn new(op: Op, data: &[T]) -> Self {
        Self(op, data.to_vec())
    }

    pub fn delete(data: &[T]) -> Self {
        Self::new(Op::Delete, data)
    }

    pub fn insert(data: &[T]) -> Self {
        Self::new(Op::Insert, data)
    }

    pub fn equal(data: &[T]) -> Self {
        Self::new(Op::Equal, data)
    }

    pub fn op(&self) -> Op {
        self.0
    }

    pub fn data(&self) -> &[T] {
        &self.1
    }

    pub fn len(&self) -> usize {
        self.1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.1.is_empty()
    }
}

impl Edit {
    /// Convenience constructor from `&str`; the crate core is code points.
    pub fn from_str(op: Op, text: &str) -> Self {
        Self(op, text.chars().collect())
    }

    /// The edit's text as an owned `String`.
    pub fn text(&self) -> String {
        self.1.iter().collect()
    }
}

impl Display for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {})", self.op(), self.text())
    }
}

/// Concatenation of every `Equal` and `Delete` edit: the first of the two
/// texts the script was computed from.
pub fn source_text<T: Copy + Eq>(edits: &[Edit<T>]) -> Vec<T> {
    edits
        .iter()
        .filter(|e| e.op() != Op::Insert)
        .flat_map(|e| e.data().iter().copied())
        .collect()
}

/// Concatenation of every `Equal` and `Insert` edit: the second text.
pub fn destination_text<T: Copy + Eq>(edits: &[Edit<T>]) -> Vec<T> {
    edits
        .iter()
        .filter(|e| e.op() != Op::Delete)
        .flat_map(|e| e.data().iter().copied())
        .collect()
}

/// Levenshtein distance implied by an edit script: each run of adjacent
/// non-equal edits contributes `max(inserted, deleted)`.
pub fn levenshtein<T: Copy + Eq>(edits: &[Edit<T>]) -> usize {
    let mut total = 0;
    let mut inserts = 0;
    let mut deletes = 0;

    for edit in edits {
        match edit.op() {
            Op::Insert => inserts += edit.len(),
            Op::Delete => deletes += edit.len(),
            Op::Equal => {
                total += inserts.max(deletes);
                inserts = 0;
                deletes = 0;
            }
        }
    }

    total + inserts.max(deletes)
}

/// Translate a position in the source text to the corresponding position in
/// the destination text. A location inside a deletion maps to the point
/// where the deletion happened.
pub fn x_index<T: Copy + Eq>(edits: &[Edit<T>], loc: usize) -> usize {
    let mut chars1 = 0;
    let mut chars2 = 0;
    let mut last_chars1 = 0;
    let mut last_chars2 = 0;

    let mut overshot = None;

    for edit in edits {
        if edit.op() != Op::Insert {
            chars1 += edit.len();
        }
        if edit.op() != Op::Delete {
            chars2 += edit.len();
        }
        if chars1 > loc {
            overshot = Some(edit);
            break;
        }
        last_chars1 = chars1;
        last_chars2 = chars2;
    }

    if let Some(edit) = overshot {
        if edit.op() == Op::Delete {
            // The location was deleted.
            return last_chars2;
        }
    }

    last_chars2 + (loc - last_chars1)
}

/// Render an edit script with `+` before insertions and `-` before
/// deletions; equalities pass through verbatim.
pub fn render_raw(edits: &[Edit]) -> String {
    let mut out = String::new();
    for edit in edits {
        match edit.op() {
            Op::Insert => out.push('+'),
            Op::Delete => out.push('-'),
            Op::Equal => {}
        }
        out.extend(edit.data().iter());
    }
    out
}

/// Render an edit script for humans: semantic cleanup first, then bracketed
/// `-[...]`/`+[...]` groups around unchanged text.
pub fn render_humanized(edits: &[Edit]) -> String {
    let mut edits = edits.to_vec();
    crate::diff::cleanup_semantic(&mut edits);

    let mut out = String::new();
    for edit in &edits {
        match edit.op() {
            Op::Insert => {
                out.push_str("+[");
                out.extend(edit.data().iter());
                out.push(']');
            }
            Op::Delete => {
                out.push_str("-[");
                out.extend(edit.data().iter());
                out.push(']');
            }
            Op::Equal => out.extend(edit.data().iter()),
        }
    }
    out
}
