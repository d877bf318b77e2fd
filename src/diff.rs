//! The diff engine: Myers' bidirectional bisect plus the speedups and
//! cleanup passes that make its output small and readable.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::edits::{Edit, Op};
use crate::errors::Error;
use crate::text::{
    common_overlap, common_prefix, common_suffix, half_match, percent_decode, percent_encode,
};
use crate::Redline;

impl Redline {
    /// Find the differences between two texts.
    ///
    /// Positions and lengths are Unicode code points. The result reproduces
    /// both inputs: the `Equal`+`Delete` edits concatenate to `old`, the
    /// `Equal`+`Insert` edits to `new`. If the configured timeout expires
    /// mid-computation the script stays valid but may be coarser than
    /// optimal.
    pub fn diff(&self, old: &str, new: &str) -> Vec<Edit> {
        let old: Vec<char> = old.chars().collect();
        let new: Vec<char> = new.chars().collect();

        self.diff_chars(&old, &new, self.checklines(), self.deadline())
    }

    pub(crate) fn diff_chars(
        &self,
        old: &[char],
        new: &[char],
        checklines: bool,
        deadline: Option<DateTime<Utc>>,
    ) -> Vec<Edit> {
        if old == new {
            if old.is_empty() {
                return Vec::new();
            }
            return vec![Edit::equal(old)];
        }

        if old.is_empty() {
            return vec![Edit::insert(new)];
        }
        if new.is_empty() {
            return vec![Edit::delete(old)];
        }

        let prefix = common_prefix(old, new);
        let suffix = common_suffix(&old[prefix..], &new[prefix..]);

        let mut edits = self.compute(
            &old[prefix..old.len() - suffix],
            &new[prefix..new.len() - suffix],
            checklines,
            deadline,
        );

        if prefix > 0 {
            edits.insert(0, Edit::equal(&old[..prefix]));
        }
        if suffix > 0 {
            edits.push(Edit::equal(&new[new.len() - suffix..]));
        }

        cleanup_merge(&mut edits);

        edits
    }

    // Both sides non-empty with no common prefix or suffix.
    fn compute(
        &self,
        old: &[char],
        new: &[char],
        checklines: bool,
        deadline: Option<DateTime<Utc>>,
    ) -> Vec<Edit> {
        if old.is_empty() {
            return vec![Edit::insert(new)];
        }
        if new.is_empty() {
            return vec![Edit::delete(old)];
        }

        let (long, short, old_is_long) = if old.len() > new.len() {
            (old, new, true)
        } else {
            (new, old, false)
        };

        if let Some(at) = long.windows(short.len()).position(|w| w == short) {
            // Shorter text sits inside the longer text.
            let op = if old_is_long { Op::Delete } else { Op::Insert };
            return vec![
                Edit::new(op, &long[..at]),
                Edit::equal(short),
                Edit::new(op, &long[at + short.len()..]),
            ];
        }

        if short.len() == 1 {
            // Single character with no substring match above: no equality.
            return vec![Edit::delete(old), Edit::insert(new)];
        }

        // Only worth trying under a time budget, where a suboptimal split
        // is an acceptable trade for speed.
        if self.timeout_enabled() {
            if let Some(hm) = half_match(old, new) {
                let mut edits = self.diff_chars(hm.a_prefix, hm.b_prefix, checklines, deadline);
                edits.push(Edit::equal(hm.common));
                edits.extend(self.diff_chars(hm.a_suffix, hm.b_suffix, checklines, deadline));
                return edits;
            }
        }

        if checklines && old.len() > 100 && new.len() > 100 {
            return self.line_mode(old, new, deadline);
        }

        match bisect(old, new, deadline) {
            Some((x, y)) => {
                let mut edits = self.diff_chars(&old[..x], &new[..y], false, deadline);
                edits.extend(self.diff_chars(&old[x..], &new[y..], false, deadline));
                edits
            }
            None => vec![Edit::delete(old), Edit::insert(new)],
        }
    }

    // Quick line-level diff, then re-diff the replacement blocks character
    // by character. Faster on big texts, can produce non-minimal scripts.
    fn line_mode(
        &self,
        old: &[char],
        new: &[char],
        deadline: Option<DateTime<Utc>>,
    ) -> Vec<Edit> {
        let encoded = lines_to_handles(old, new);
        let handle_edits = self.diff_handles(&encoded.old, &encoded.new, deadline);
        let mut edits = handles_to_lines(&handle_edits, &encoded.lines);

        // Eliminate freak matches between unrelated lines.
        cleanup_semantic(&mut edits);

        // Re-diff each delete/insert block at character level, in place.
        edits.push(Edit::equal(&[]));

        let mut pointer = 0;
        let mut inserts = 0;
        let mut deletes = 0;
        let mut insert_data: Vec<char> = Vec::new();
        let mut delete_data: Vec<char> = Vec::new();

        while pointer < edits.len() {
            match edits[pointer].op() {
                Op::Insert => {
                    inserts += 1;
                    insert_data.extend_from_slice(edits[pointer].data());
                }
                Op::Delete => {
                    deletes += 1;
                    delete_data.extend_from_slice(edits[pointer].data());
                }
                Op::Equal => {
                    if deletes >= 1 && inserts >= 1 {
                        let start = pointer - deletes - inserts;
                        let replacement =
                            self.diff_chars(&delete_data, &insert_data, false, deadline);
                        let added = replacement.len();
                        edits.splice(start..pointer, replacement);
                        pointer = start + added;
                    }
                    inserts = 0;
                    deletes = 0;
                    insert_data.clear();
                    delete_data.clear();
                }
            }
            pointer += 1;
        }

        edits.pop();

        edits
    }

    // The handle-level twin of `diff_chars`: same pipeline minus the
    // line-mode branch, over opaque line handles.
    fn diff_handles(
        &self,
        old: &[usize],
        new: &[usize],
        deadline: Option<DateTime<Utc>>,
    ) -> Vec<Edit<usize>> {
        if old == new {
            if old.is_empty() {
                return Vec::new();
            }
            return vec![Edit::equal(old)];
        }

        if old.is_empty() {
            return vec![Edit::insert(new)];
        }
        if new.is_empty() {
            return vec![Edit::delete(old)];
        }

        let prefix = common_prefix(old, new);
        let suffix = common_suffix(&old[prefix..], &new[prefix..]);

        let mut edits = self.compute_handles(
            &old[prefix..old.len() - suffix],
            &new[prefix..new.len() - suffix],
            deadline,
        );

        if prefix > 0 {
            edits.insert(0, Edit::equal(&old[..prefix]));
        }
        if suffix > 0 {
            edits.push(Edit::equal(&new[new.len() - suffix..]));
        }

        cleanup_merge(&mut edits);

        edits
    }

    fn compute_handles(
        &self,
        old: &[usize],
        new: &[usize],
        deadline: Option<DateTime<Utc>>,
    ) -> Vec<Edit<usize>> {
        if old.is_empty() {
            return vec![Edit::insert(new)];
        }
        if new.is_empty() {
            return vec![Edit::delete(old)];
        }

        let (long, short, old_is_long) = if old.len() > new.len() {
            (old, new, true)
        } else {
            (new, old, false)
        };

        if let Some(at) = long.windows(short.len()).position(|w| w == short) {
            let op = if old_is_long { Op::Delete } else { Op::Insert };
            return vec![
                Edit::new(op, &long[..at]),
                Edit::equal(short),
                Edit::new(op, &long[at + short.len()..]),
            ];
        }

        if short.len() == 1 {
            return vec![Edit::delete(old), Edit::insert(new)];
        }

        if self.timeout_enabled() {
            if let Some(hm) = half_match(old, new) {
                let mut edits = self.diff_handles(hm.a_prefix, hm.b_prefix, deadline);
                edits.push(Edit::equal(hm.common));
                edits.extend(self.diff_handles(hm.a_suffix, hm.b_suffix, deadline));
                return edits;
            }
        }

        match bisect(old, new, deadline) {
            Some((x, y)) => {
                let mut edits = self.diff_handles(&old[..x], &new[..y], deadline);
                edits.extend(self.diff_handles(&old[x..], &new[y..], deadline));
                edits
            }
            None => vec![Edit::delete(old), Edit::insert(new)],
        }
    }
}

/// Find the middle-snake split point of the two inputs, walking the forward
/// and reverse d-paths until they overlap. Returns `None` when the deadline
/// fires first; the caller falls back to a delete-everything plus
/// insert-everything script for this subproblem.
///
/// See Myers 1986, "An O(ND) Difference Algorithm and Its Variations".
pub(crate) fn bisect<T: Copy + Eq>(
    old: &[T],
    new: &[T],
    deadline: Option<DateTime<Utc>>,
) -> Option<(usize, usize)> {
    let old_len = old.len() as isize;
    let new_len = new.len() as isize;

    let max_d = (old_len + new_len + 1) / 2;
    let v_offset = max_d;
    let v_len = (2 * max_d) as usize;

    let mut v1 = vec![-1_isize; v_len];
    let mut v2 = vec![-1_isize; v_len];
    v1[v_offset as usize + 1] = 0;
    v2[v_offset as usize + 1] = 0;

    let delta = old_len - new_len;
    // With an odd delta the forward path detects the collision; with an
    // even delta the reverse path does.
    let front = delta % 2 != 0;

    // Trim the k range once a path runs off an edge of the grid.
    let mut k1start: isize = 0;
    let mut k1end: isize = 0;
    let mut k2start: isize = 0;
    let mut k2end: isize = 0;

    for d in 0..max_d {
        if deadline.is_some_and(|t| Utc::now() > t) {
            break;
        }

        // Walk the forward path one step.
        let mut k1 = -d + k1start;
        while k1 < d + 1 - k1end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;

            while x1 < old_len && y1 < new_len && old[x1 as usize] == new[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;

            if x1 > old_len {
                // Ran off the right of the graph.
                k1end += 2;
            } else if y1 > new_len {
                // Ran off the bottom of the graph.
                k1start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && (k2_offset as usize) < v_len && v2[k2_offset as usize] != -1 {
                    // Mirror the reverse frontier onto this coordinate
                    // system.
                    let x2 = old_len - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return Some((x1 as usize, y1 as usize));
                    }
                }
            }

            k1 += 2;
        }

        // Walk the reverse path one step.
        let mut k2 = -d + k2start;
        while k2 < d + 1 - k2end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;

            while x2 < old_len
                && y2 < new_len
                && old[(old_len - x2 - 1) as usize] == new[(new_len - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;

            if x2 > old_len {
                // Ran off the left of the graph.
                k2end += 2;
            } else if y2 > new_len {
                // Ran off the top of the graph.
                k2start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && (k1_offset as usize) < v_len && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    if x1 >= old_len - x2 {
                        // Split at the reverse snake's endpoint, mirrored
                        // into forward coordinates.
                        return Some(((old_len - x2) as usize, (new_len - y2) as usize));
                    }
                }
            }

            k2 += 2;
        }
    }

    None
}

struct LineHandles<'a> {
    old: Vec<usize>,
    new: Vec<usize>,
    lines: Vec<&'a [char]>,
}

// Map each distinct line (newline-inclusive) to a dense handle. Handle 0 is
// a blank sentinel, so real lines start at 1.
fn lines_to_handles<'a>(old: &'a [char], new: &'a [char]) -> LineHandles<'a> {
    let mut lines: Vec<&[char]> = vec![&[]];
    let mut table: HashMap<&[char], usize> = HashMap::new();

    let old = encode_lines(old, &mut lines, &mut table);
    let new = encode_lines(new, &mut lines, &mut table);

    LineHandles { old, new, lines }
}

fn encode_lines<'a>(
    text: &'a [char],
    lines: &mut Vec<&'a [char]>,
    table: &mut HashMap<&'a [char], usize>,
) -> Vec<usize> {
    let mut handles = Vec::new();

    for line in text.split_inclusive(|&c| c == '\n') {
        let handle = *table.entry(line).or_insert(lines.len());
        if handle == lines.len() {
            lines.push(line);
        }
        handles.push(handle);
    }

    handles
}

fn handles_to_lines(edits: &[Edit<usize>], lines: &[&[char]]) -> Vec<Edit> {
    edits
        .iter()
        .map(|edit| {
            let text: Vec<char> = edit
                .data()
                .iter()
                .flat_map(|&h| lines[h].iter().copied())
                .collect();
            Edit::new(edit.op(), &text)
        })
        .collect()
}

/// Reorder and merge like edit sections; merge equalities. Any edit can
/// slide as long as it does not cross an equality. Idempotent.
pub fn cleanup_merge<T: Copy + Eq>(edits: &mut Vec<Edit<T>>) {
    // Sentinel equality to flush the trailing run.
    edits.push(Edit::equal(&[]));

    let mut pointer = 0;
    let mut inserts = 0;
    let mut deletes = 0;
    let mut insert_data: Vec<T> = Vec::new();
    let mut delete_data: Vec<T> = Vec::new();

    while pointer < edits.len() {
        match edits[pointer].op() {
            Op::Insert => {
                inserts += 1;
                insert_data.extend_from_slice(edits[pointer].data());
                pointer += 1;
            }
            Op::Delete => {
                deletes += 1;
                delete_data.extend_from_slice(edits[pointer].data());
                pointer += 1;
            }
            Op::Equal => {
                if inserts + deletes > 1 {
                    if inserts != 0 && deletes != 0 {
                        // Factor out a shared prefix into the preceding
                        // equality.
                        let n = common_prefix(&insert_data, &delete_data);
                        if n != 0 {
                            let run_start = pointer - inserts - deletes;
                            if run_start > 0 && edits[run_start - 1].op() == Op::Equal {
                                let common = insert_data[..n].to_vec();
                                edits[run_start - 1].1.extend(common);
                            } else {
                                edits.insert(0, Edit::equal(&insert_data[..n]));
                                pointer += 1;
                            }
                            insert_data.drain(..n);
                            delete_data.drain(..n);
                        }

                        // And a shared suffix into the following equality.
                        let n = common_suffix(&insert_data, &delete_data);
                        if n != 0 {
                            let mut merged = insert_data[insert_data.len() - n..].to_vec();
                            merged.extend_from_slice(edits[pointer].data());
                            edits[pointer].1 = merged;
                            insert_data.truncate(insert_data.len() - n);
                            delete_data.truncate(delete_data.len() - n);
                        }
                    }

                    // Replace the run with at most one delete and one
                    // insert.
                    let run_start = pointer - inserts - deletes;
                    edits.drain(run_start..pointer);
                    pointer = run_start;
                    if !delete_data.is_empty() {
                        edits.insert(pointer, Edit::delete(&delete_data));
                        pointer += 1;
                    }
                    if !insert_data.is_empty() {
                        edits.insert(pointer, Edit::insert(&insert_data));
                        pointer += 1;
                    }
                    pointer += 1;
                } else if pointer != 0 && edits[pointer - 1].op() == Op::Equal {
                    // Merge into the previous equality.
                    let data = edits.remove(pointer).1;
                    edits[pointer - 1].1.extend(data);
                } else {
                    pointer += 1;
                }

                inserts = 0;
                deletes = 0;
                insert_data.clear();
                delete_data.clear();
            }
        }
    }

    if edits.last().is_some_and(|e| e.is_empty()) {
        edits.pop();
    }

    // Second pass: slide single edits sandwiched between equalities to
    // eliminate one of the equalities, e.g. A<ins>BA</ins>C to <ins>AB</ins>AC.
    let mut changes = false;
    let mut pointer = 1;

    while pointer + 1 < edits.len() {
        if edits[pointer - 1].op() == Op::Equal && edits[pointer + 1].op() == Op::Equal {
            if edits[pointer].data().ends_with(edits[pointer - 1].data()) {
                // Slide left, absorbing the previous equality.
                let prev = edits[pointer - 1].1.clone();
                let cur = &edits[pointer].1;
                let mut slid = prev.clone();
                slid.extend_from_slice(&cur[..cur.len() - prev.len()]);
                let mut next = prev;
                next.extend_from_slice(edits[pointer + 1].data());

                edits[pointer].1 = slid;
                edits[pointer + 1].1 = next;
                edits.remove(pointer - 1);
                changes = true;
            } else if edits[pointer].data().starts_with(edits[pointer + 1].data()) {
                // Slide right, absorbing the next equality.
                let next = edits[pointer + 1].1.clone();
                edits[pointer - 1].1.extend_from_slice(&next);
                let mut slid = edits[pointer].1[next.len()..].to_vec();
                slid.extend_from_slice(&next);

                edits[pointer].1 = slid;
                edits.remove(pointer + 1);
                changes = true;
            }
        }
        pointer += 1;
    }

    if changes {
        cleanup_merge(edits);
    }
}

/// Reduce the number of edits by eliminating semantically trivial
/// equalities, then pull overlaps between adjacent deletions and
/// insertions out into equalities.
pub fn cleanup_semantic(edits: &mut Vec<Edit>) {
    let mut changes = false;
    // Indices of candidate equalities, innermost last.
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<Vec<char>> = None;

    // Edit sizes either side of the candidate equality.
    let mut ins_pre = 0;
    let mut del_pre = 0;
    let mut ins_post = 0;
    let mut del_post = 0;

    let mut pointer = 0;
    while pointer < edits.len() {
        if edits[pointer].op() == Op::Equal {
            equalities.push(pointer);
            ins_pre = ins_post;
            del_pre = del_post;
            ins_post = 0;
            del_post = 0;
            last_equality = Some(edits[pointer].1.clone());
            pointer += 1;
            continue;
        }

        if edits[pointer].op() == Op::Insert {
            ins_post += edits[pointer].len();
        } else {
            del_post += edits[pointer].len();
        }

        // An equality dwarfed by the edits on both sides of it carries no
        // meaning; replace it with a delete/insert pair.
        let eliminate = last_equality.as_ref().is_some_and(|eq| {
            eq.len() <= ins_pre.max(del_pre) && eq.len() <= ins_post.max(del_post)
        });

        if eliminate {
            let eq = last_equality.take().unwrap();
            let at = equalities.pop().unwrap();
            edits.insert(at, Edit::delete(&eq));
            edits[at + 1].0 = Op::Insert;

            // The equality before the eliminated one needs re-evaluation
            // too.
            equalities.pop();
            pointer = equalities.last().map_or(0, |&p| p + 1);

            ins_pre = 0;
            del_pre = 0;
            ins_post = 0;
            del_post = 0;
            changes = true;
            continue;
        }

        pointer += 1;
    }

    if changes {
        cleanup_merge(edits);
    }

    cleanup_semantic_lossless(edits);

    // Extract overlaps between adjacent delete/insert pairs when the
    // overlap is at least half of either edit:
    //   <del>abcxxx</del><ins>xxxdef</ins> to <del>abc</del>xxx<ins>def</ins>
    //   <del>xxxabc</del><ins>defxxx</ins> to <ins>def</ins>xxx<del>abc</del>
    let mut pointer = 1;
    while pointer < edits.len() {
        if edits[pointer - 1].op() == Op::Delete && edits[pointer].op() == Op::Insert {
            let deletion = edits[pointer - 1].1.clone();
            let insertion = edits[pointer].1.clone();

            let overlap1 = common_overlap(&deletion, &insertion);
            let overlap2 = common_overlap(&insertion, &deletion);

            let del_half = deletion.len() / 2 + deletion.len() % 2;
            let ins_half = insertion.len() / 2 + insertion.len() % 2;

            if overlap1 >= overlap2 {
                if overlap1 >= del_half || overlap1 >= ins_half {
                    edits.insert(pointer, Edit::equal(&insertion[..overlap1]));
                    edits[pointer - 1].1 = deletion[..deletion.len() - overlap1].to_vec();
                    edits[pointer + 1].1 = insertion[overlap1..].to_vec();
                    pointer += 1;
                }
            } else if overlap2 >= del_half || overlap2 >= ins_half {
                edits.insert(pointer, Edit::equal(&deletion[..overlap2]));
                edits[pointer - 1] = Edit::insert(&insertion[..insertion.len() - overlap2]);
                edits[pointer + 1] = Edit::delete(&deletion[overlap2..]);
                pointer += 1;
            }
            pointer += 1;
        }
        pointer += 1;
    }
}

/// Slide single edits sandwiched between equalities to align edit
/// boundaries with word, sentence and line boundaries, e.g.
/// `The c<ins>at c</ins>ame.` becomes `The <ins>cat </ins>came.`
pub fn cleanup_semantic_lossless(edits: &mut Vec<Edit>) {
    let mut pointer = 1;

    // First and last edits need no checking.
    while pointer + 1 < edits.len() {
        if edits[pointer - 1].op() == Op::Equal && edits[pointer + 1].op() == Op::Equal {
            let mut prev = edits[pointer - 1].1.clone();
            let mut edit = edits[pointer].1.clone();
            let mut next = edits[pointer + 1].1.clone();

            // Start fully left.
            let n = common_suffix(&prev, &edit);
            if n > 0 {
                let common = edit[edit.len() - n..].to_vec();
                prev.truncate(prev.len() - n);

                let mut slid = common.clone();
                slid.extend_from_slice(&edit[..edit.len() - n]);
                edit = slid;

                let mut grown = common;
                grown.extend_from_slice(&next);
                next = grown;
            }

            // Then step right one character at a time, keeping the best
            // scoring boundary.
            let mut best_prev = prev.clone();
            let mut best_edit = edit.clone();
            let mut best_next = next.clone();
            let mut best_score = boundary_score(&prev, &edit) + boundary_score(&edit, &next);

            while !edit.is_empty() && !next.is_empty() && edit[0] == next[0] {
                prev.push(edit[0]);
                edit.remove(0);
                edit.push(next[0]);
                next.remove(0);

                let score = boundary_score(&prev, &edit) + boundary_score(&edit, &next);
                // >= favors trailing over leading whitespace on the edit.
                if score >= best_score {
                    best_score = score;
                    best_prev.clone_from(&prev);
                    best_edit.clone_from(&edit);
                    best_next.clone_from(&next);
                }
            }

            if edits[pointer - 1].1 != best_prev {
                if best_prev.is_empty() {
                    edits.remove(pointer - 1);
                    pointer -= 1;
                } else {
                    edits[pointer - 1].1 = best_prev;
                }

                edits[pointer].1 = best_edit;

                if best_next.is_empty() {
                    edits.remove(pointer + 1);
                    pointer = pointer.saturating_sub(1);
                } else {
                    edits[pointer + 1].1 = best_next;
                }
            }
        }
        pointer += 1;
    }
}

// Score how nicely an edit boundary between `one` and `two` sits: 6 at a
// text edge down to 0 mid-word.
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
        return 6;
    };

    let whitespace1 = c1.is_whitespace();
    let whitespace2 = c2.is_whitespace();
    let linebreak1 = whitespace1 && (c1 == '\n' || c1 == '\r');
    let linebreak2 = whitespace2 && (c2 == '\n' || c2 == '\r');
    let blankline1 = linebreak1 && ends_with_blank_line(one);
    let blankline2 = linebreak2 && starts_with_blank_line(two);

    if blankline1 || blankline2 {
        5
    } else if linebreak1 || linebreak2 {
        4
    } else if !c1.is_alphanumeric() && !whitespace1 && whitespace2 {
        // End of sentence.
        3
    } else if whitespace1 || whitespace2 {
        2
    } else if !c1.is_alphanumeric() || !c2.is_alphanumeric() {
        1
    } else {
        0
    }
}

fn ends_with_blank_line(text: &[char]) -> bool {
    text.ends_with(&['\n', '\n']) || text.ends_with(&['\n', '\r', '\n'])
}

fn starts_with_blank_line(text: &[char]) -> bool {
    text.starts_with(&['\r', '\n', '\r', '\n'])
        || text.starts_with(&['\r', '\n', '\n'])
        || text.starts_with(&['\n', '\r', '\n'])
        || text.starts_with(&['\n', '\n'])
}

impl Redline {
    /// Reduce the number of edits by eliminating operationally trivial
    /// equalities: short keeps that cost more to carry than to re-edit,
    /// judged against the configured edit cost.
    pub fn cleanup_efficiency(&self, edits: &mut Vec<Edit>) {
        if edits.is_empty() {
            return;
        }

        let edit_cost = self.edit_cost();

        let mut changes = false;
        let mut equalities: Vec<usize> = Vec::new();
        let mut last_equality: Option<Vec<char>> = None;

        // Are there edit operations before/after the candidate equality?
        let mut pre_ins = false;
        let mut pre_del = false;
        let mut post_ins = false;
        let mut post_del = false;

        let mut pointer = 0;
        while pointer < edits.len() {
            if edits[pointer].op() == Op::Equal {
                if edits[pointer].len() < edit_cost && (post_ins || post_del) {
                    // Candidate.
                    equalities.push(pointer);
                    pre_ins = post_ins;
                    pre_del = post_del;
                    last_equality = Some(edits[pointer].1.clone());
                } else {
                    // Not a candidate, and can never become one.
                    equalities.clear();
                    last_equality = None;
                }
                post_ins = false;
                post_del = false;
                pointer += 1;
                continue;
            }

            if edits[pointer].op() == Op::Delete {
                post_del = true;
            } else {
                post_ins = true;
            }

            // Five configurations to split, with X the candidate equality:
            //   <ins>A</ins><del>B</del>X<ins>C</ins><del>D</del>
            //   <ins>A</ins>X<ins>C</ins><del>D</del>
            //   <ins>A</ins><del>B</del>X<ins>C</ins>
            //   <ins>A</ins>X<del>C</del><ins>D</ins>
            //   <ins>A</ins><del>B</del>X<del>C</del>
            let split = last_equality.as_ref().is_some_and(|eq| {
                (pre_ins && pre_del && post_ins && post_del)
                    || (eq.len() < edit_cost / 2
                        && u8::from(pre_ins)
                            + u8::from(pre_del)
                            + u8::from(post_ins)
                            + u8::from(post_del)
                            == 3)
            });

            if split {
                let eq = last_equality.take().unwrap();
                let at = equalities.pop().unwrap();
                edits.insert(at, Edit::delete(&eq));
                edits[at + 1].0 = Op::Insert;
                changes = true;

                if pre_ins && pre_del {
                    // Nothing before the split point can be affected.
                    post_ins = true;
                    post_del = true;
                    equalities.clear();
                } else {
                    // The previous equality needs re-evaluation.
                    equalities.pop();
                    pointer = equalities.last().map_or(0, |&p| p + 1);
                    post_ins = false;
                    post_del = false;
                    continue;
                }
            }

            pointer += 1;
        }

        if changes {
            cleanup_merge(edits);
        }
    }
}

/// Crush an edit script into a compact string relative to its source text:
/// `=3\t-2\t+ing` keeps 3 characters, deletes 2 and inserts "ing". Counts
/// are code points; inserted text is percent-encoded.
pub fn to_delta(edits: &[Edit]) -> String {
    edits
        .iter()
        .map(|edit| match edit.op() {
            Op::Insert => format!("+{}", percent_encode(edit.data())),
            Op::Delete => format!("-{}", edit.len()),
            Op::Equal => format!("={}", edit.len()),
        })
        .collect::<Vec<_>>()
        .join("\t")
}

/// Rebuild the full edit script from a source text and a delta produced by
/// [`to_delta`]. The delta must consume the source exactly.
pub fn from_delta(source: &str, delta: &str) -> Result<Vec<Edit>, Error> {
    let source: Vec<char> = source.chars().collect();
    let mut edits = Vec::new();
    let mut cursor: usize = 0;

    for token in delta.split('\t') {
        if token.is_empty() {
            continue;
        }

        // One opcode character, then the parameter.
        let opcode = token.chars().next().unwrap();
        let param = &token[opcode.len_utf8()..];

        match opcode {
            '+' => {
                let text = percent_decode(&param.chars().collect::<Vec<_>>())?;
                edits.push(Edit::insert(&text));
            }
            '-' | '=' => {
                let n: usize = param
                    .parse()
                    .map_err(|_| Error::InvalidArgument("bad count in delta"))?;
                let end = cursor
                    .checked_add(n)
                    .filter(|&end| end <= source.len())
                    .ok_or(Error::InvalidArgument("delta runs past end of source"))?;

                let text = &source[cursor..end];
                cursor = end;

                if opcode == '=' {
                    edits.push(Edit::equal(text));
                } else {
                    edits.push(Edit::delete(text));
                }
            }
            _ => return Err(Error::InvalidArgument("unknown delta opcode")),
        }
    }

    if cursor != source.len() {
        return Err(Error::InvalidArgument("delta does not cover source text"));
    }

    Ok(edits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn edit(op: Op, text: &str) -> Edit {
        Edit::from_str(op, text)
    }

    #[test]
    fn test_bisect_split_point() {
        // "cat" -> "map": the frontiers meet at (1, 1) or an equivalent
        // valid split; recursing must reproduce both inputs.
        let rl = Redline::new();
        let old = chars("cat");
        let new = chars("map");
        let (x, y) = bisect(&old, &new, None).unwrap();
        assert!(x <= old.len() && y <= new.len());

        let edits = rl.diff("cat", "map");
        assert_eq!(
            "cat",
            crate::edits::source_text(&edits).iter().collect::<String>()
        );
        assert_eq!(
            "map",
            crate::edits::destination_text(&edits)
                .iter()
                .collect::<String>()
        );
    }

    #[test]
    fn test_bisect_deadline_expired() {
        // An already-expired deadline forces the coarse answer.
        let deadline = Utc::now()
            .checked_sub_signed(chrono::TimeDelta::milliseconds(10))
            .unwrap();
        assert_eq!(None, bisect(&chars("cat"), &chars("map"), Some(deadline)));
    }

    #[test]
    fn test_cleanup_merge_null() {
        let mut edits: Vec<Edit> = vec![];
        cleanup_merge(&mut edits);
        assert!(edits.is_empty());
    }

    #[test]
    fn test_cleanup_merge_no_change() {
        let mut edits = vec![
            edit(Op::Equal, "a"),
            edit(Op::Delete, "b"),
            edit(Op::Insert, "c"),
        ];
        cleanup_merge(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Equal, "a"),
                edit(Op::Delete, "b"),
                edit(Op::Insert, "c"),
            ],
            edits
        );
    }

    #[test]
    fn test_cleanup_merge_like_ops() {
        let mut edits = vec![
            edit(Op::Equal, "a"),
            edit(Op::Equal, "b"),
            edit(Op::Equal, "c"),
        ];
        cleanup_merge(&mut edits);
        assert_eq!(vec![edit(Op::Equal, "abc")], edits);

        let mut edits = vec![
            edit(Op::Delete, "a"),
            edit(Op::Delete, "b"),
            edit(Op::Delete, "c"),
        ];
        cleanup_merge(&mut edits);
        assert_eq!(vec![edit(Op::Delete, "abc")], edits);

        let mut edits = vec![
            edit(Op::Insert, "a"),
            edit(Op::Insert, "b"),
            edit(Op::Insert, "c"),
        ];
        cleanup_merge(&mut edits);
        assert_eq!(vec![edit(Op::Insert, "abc")], edits);
    }

    #[test]
    fn test_cleanup_merge_interleaved() {
        let mut edits = vec![
            edit(Op::Delete, "a"),
            edit(Op::Insert, "b"),
            edit(Op::Delete, "c"),
            edit(Op::Insert, "d"),
            edit(Op::Equal, "e"),
            edit(Op::Equal, "f"),
        ];
        cleanup_merge(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Delete, "ac"),
                edit(Op::Insert, "bd"),
                edit(Op::Equal, "ef"),
            ],
            edits
        );
    }

    #[test]
    fn test_cleanup_merge_factor_affixes() {
        // Prefix and suffix detection.
        let mut edits = vec![
            edit(Op::Delete, "a"),
            edit(Op::Insert, "abc"),
            edit(Op::Delete, "dc"),
        ];
        cleanup_merge(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Equal, "a"),
                edit(Op::Delete, "d"),
                edit(Op::Insert, "b"),
                edit(Op::Equal, "c"),
            ],
            edits
        );

        // With equalities around.
        let mut edits = vec![
            edit(Op::Equal, "x"),
            edit(Op::Delete, "a"),
            edit(Op::Insert, "abc"),
            edit(Op::Delete, "dc"),
            edit(Op::Equal, "y"),
        ];
        cleanup_merge(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Equal, "xa"),
                edit(Op::Delete, "d"),
                edit(Op::Insert, "b"),
                edit(Op::Equal, "cy"),
            ],
            edits
        );
    }

    #[test]
    fn test_cleanup_merge_slide() {
        // Slide edit left.
        let mut edits = vec![
            edit(Op::Equal, "a"),
            edit(Op::Insert, "ba"),
            edit(Op::Equal, "c"),
        ];
        cleanup_merge(&mut edits);
        assert_eq!(vec![edit(Op::Insert, "ab"), edit(Op::Equal, "ac")], edits);

        // Slide edit right.
        let mut edits = vec![
            edit(Op::Equal, "c"),
            edit(Op::Insert, "ab"),
            edit(Op::Equal, "a"),
        ];
        cleanup_merge(&mut edits);
        assert_eq!(vec![edit(Op::Equal, "ca"), edit(Op::Insert, "ba")], edits);

        // Slide edit left recursive.
        let mut edits = vec![
            edit(Op::Equal, "a"),
            edit(Op::Delete, "b"),
            edit(Op::Equal, "c"),
            edit(Op::Delete, "ac"),
            edit(Op::Equal, "x"),
        ];
        cleanup_merge(&mut edits);
        assert_eq!(vec![edit(Op::Delete, "abc"), edit(Op::Equal, "acx")], edits);

        // Slide edit right recursive.
        let mut edits = vec![
            edit(Op::Equal, "x"),
            edit(Op::Delete, "ca"),
            edit(Op::Equal, "c"),
            edit(Op::Delete, "b"),
            edit(Op::Equal, "a"),
        ];
        cleanup_merge(&mut edits);
        assert_eq!(vec![edit(Op::Equal, "xca"), edit(Op::Delete, "cba")], edits);
    }

    #[test]
    fn test_cleanup_merge_idempotent() {
        let mut once = vec![
            edit(Op::Delete, "b"),
            edit(Op::Insert, "ab"),
            edit(Op::Equal, "c"),
        ];
        cleanup_merge(&mut once);
        let mut twice = once.clone();
        cleanup_merge(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cleanup_semantic_elimination() {
        // No elimination.
        let mut edits = vec![
            edit(Op::Delete, "ab"),
            edit(Op::Insert, "cd"),
            edit(Op::Equal, "12"),
            edit(Op::Delete, "e"),
        ];
        cleanup_semantic(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Delete, "ab"),
                edit(Op::Insert, "cd"),
                edit(Op::Equal, "12"),
                edit(Op::Delete, "e"),
            ],
            edits
        );

        // Simple elimination.
        let mut edits = vec![
            edit(Op::Delete, "a"),
            edit(Op::Equal, "b"),
            edit(Op::Delete, "c"),
        ];
        cleanup_semantic(&mut edits);
        assert_eq!(vec![edit(Op::Delete, "abc"), edit(Op::Insert, "b")], edits);

        // Backpass elimination.
        let mut edits = vec![
            edit(Op::Delete, "ab"),
            edit(Op::Equal, "cd"),
            edit(Op::Delete, "e"),
            edit(Op::Equal, "f"),
            edit(Op::Insert, "g"),
        ];
        cleanup_semantic(&mut edits);
        assert_eq!(
            vec![edit(Op::Delete, "abcdef"), edit(Op::Insert, "cdfg")],
            edits
        );
    }

    #[test]
    fn test_cleanup_semantic_overlap() {
        // Overlap elimination, forward.
        let mut edits = vec![edit(Op::Delete, "abcxxx"), edit(Op::Insert, "xxxdef")];
        cleanup_semantic(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Delete, "abc"),
                edit(Op::Equal, "xxx"),
                edit(Op::Insert, "def"),
            ],
            edits
        );

        // Reverse overlap elimination.
        let mut edits = vec![edit(Op::Delete, "xxxabc"), edit(Op::Insert, "defxxx")];
        cleanup_semantic(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Insert, "def"),
                edit(Op::Equal, "xxx"),
                edit(Op::Delete, "abc"),
            ],
            edits
        );

        // Two overlap eliminations.
        let mut edits = vec![
            edit(Op::Delete, "abcd1212"),
            edit(Op::Insert, "1212efghi"),
            edit(Op::Equal, "----"),
            edit(Op::Delete, "A3"),
            edit(Op::Insert, "3BC"),
        ];
        cleanup_semantic(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Delete, "abcd"),
                edit(Op::Equal, "1212"),
                edit(Op::Insert, "efghi"),
                edit(Op::Equal, "----"),
                edit(Op::Delete, "A"),
                edit(Op::Equal, "3"),
                edit(Op::Insert, "BC"),
            ],
            edits
        );
    }

    #[test]
    fn test_cleanup_semantic_lossless_alignment() {
        // Blank lines.
        let mut edits = vec![
            edit(Op::Equal, "AAA\r\n\r\nBBB"),
            edit(Op::Insert, "\r\nDDD\r\n\r\nBBB"),
            edit(Op::Equal, "\r\nEEE"),
        ];
        cleanup_semantic_lossless(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Equal, "AAA\r\n\r\n"),
                edit(Op::Insert, "BBB\r\nDDD\r\n\r\n"),
                edit(Op::Equal, "BBB\r\nEEE"),
            ],
            edits
        );

        // Line boundaries.
        let mut edits = vec![
            edit(Op::Equal, "AAA\r\nBBB"),
            edit(Op::Insert, " DDD\r\nBBB"),
            edit(Op::Equal, " EEE"),
        ];
        cleanup_semantic_lossless(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Equal, "AAA\r\n"),
                edit(Op::Insert, "BBB DDD\r\n"),
                edit(Op::Equal, "BBB EEE"),
            ],
            edits
        );

        // Word boundaries.
        let mut edits = vec![
            edit(Op::Equal, "The c"),
            edit(Op::Insert, "ow and the c"),
            edit(Op::Equal, "at."),
        ];
        cleanup_semantic_lossless(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Equal, "The "),
                edit(Op::Insert, "cow and the "),
                edit(Op::Equal, "cat."),
            ],
            edits
        );

        // Sentence boundaries.
        let mut edits = vec![
            edit(Op::Equal, "The xxx. The "),
            edit(Op::Insert, "zzz. The "),
            edit(Op::Equal, "yyy."),
        ];
        cleanup_semantic_lossless(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Equal, "The xxx."),
                edit(Op::Insert, " The zzz."),
                edit(Op::Equal, " The yyy."),
            ],
            edits
        );
    }

    #[test]
    fn test_cleanup_efficiency() {
        let rl = Redline::new();

        // Null case.
        let mut edits: Vec<Edit> = vec![];
        rl.cleanup_efficiency(&mut edits);
        assert!(edits.is_empty());

        // No elimination.
        let mut edits = vec![
            edit(Op::Delete, "ab"),
            edit(Op::Insert, "12"),
            edit(Op::Equal, "wxyz"),
            edit(Op::Delete, "cd"),
            edit(Op::Insert, "34"),
        ];
        rl.cleanup_efficiency(&mut edits);
        assert_eq!(
            vec![
                edit(Op::Delete, "ab"),
                edit(Op::Insert, "12"),
                edit(Op::Equal, "wxyz"),
                edit(Op::Delete, "cd"),
                edit(Op::Insert, "34"),
            ],
            edits
        );

        // Four-edit elimination.
        let mut edits = vec![
            edit(Op::Delete, "ab"),
            edit(Op::Insert, "12"),
            edit(Op::Equal, "xyz"),
            edit(Op::Delete, "cd"),
            edit(Op::Insert, "34"),
        ];
        rl.cleanup_efficiency(&mut edits);
        assert_eq!(
            vec![edit(Op::Delete, "abxyzcd"), edit(Op::Insert, "12xyz34")],
            edits
        );

        // Three-edit elimination.
        let mut edits = vec![
            edit(Op::Insert, "12"),
            edit(Op::Equal, "x"),
            edit(Op::Delete, "cd"),
            edit(Op::Insert, "34"),
        ];
        rl.cleanup_efficiency(&mut edits);
        assert_eq!(
            vec![edit(Op::Delete, "xcd"), edit(Op::Insert, "12x34")],
            edits
        );

        // Backpass elimination.
        let mut edits = vec![
            edit(Op::Delete, "ab"),
            edit(Op::Insert, "12"),
            edit(Op::Equal, "xy"),
            edit(Op::Insert, "34"),
            edit(Op::Equal, "z"),
            edit(Op::Delete, "cd"),
            edit(Op::Insert, "56"),
        ];
        rl.cleanup_efficiency(&mut edits);
        assert_eq!(
            vec![edit(Op::Delete, "abxyzcd"), edit(Op::Insert, "12xy34z56")],
            edits
        );

        // High cost elimination.
        let mut rl = Redline::new();
        rl.set_edit_cost(5);
        let mut edits = vec![
            edit(Op::Delete, "ab"),
            edit(Op::Insert, "12"),
            edit(Op::Equal, "wxyz"),
            edit(Op::Delete, "cd"),
            edit(Op::Insert, "34"),
        ];
        rl.cleanup_efficiency(&mut edits);
        assert_eq!(
            vec![edit(Op::Delete, "abwxyzcd"), edit(Op::Insert, "12wxyz34")],
            edits
        );
    }

    #[test]
    fn test_diff_trivial() {
        let rl = Redline::new();

        // Null case.
        assert!(rl.diff("", "").is_empty());

        // Equality.
        assert_eq!(vec![edit(Op::Equal, "abc")], rl.diff("abc", "abc"));

        // Simple insertion.
        assert_eq!(
            vec![
                edit(Op::Equal, "ab"),
                edit(Op::Insert, "123"),
                edit(Op::Equal, "c"),
            ],
            rl.diff("abc", "ab123c")
        );

        // Simple deletion.
        assert_eq!(
            vec![
                edit(Op::Equal, "a"),
                edit(Op::Delete, "123"),
                edit(Op::Equal, "bc"),
            ],
            rl.diff("a123bc", "abc")
        );

        // Two insertions.
        assert_eq!(
            vec![
                edit(Op::Equal, "a"),
                edit(Op::Insert, "123"),
                edit(Op::Equal, "b"),
                edit(Op::Insert, "456"),
                edit(Op::Equal, "c"),
            ],
            rl.diff("abc", "a123b456c")
        );

        // Two deletions.
        assert_eq!(
            vec![
                edit(Op::Equal, "a"),
                edit(Op::Delete, "123"),
                edit(Op::Equal, "b"),
                edit(Op::Delete, "456"),
                edit(Op::Equal, "c"),
            ],
            rl.diff("a123b456c", "abc")
        );

        // Empty to something and back.
        assert_eq!(vec![edit(Op::Insert, "xyz")], rl.diff("", "xyz"));
        assert_eq!(vec![edit(Op::Delete, "xyz")], rl.diff("xyz", ""));
    }

    #[test]
    fn test_diff_reconstruction() {
        // The script reproduces both inputs, timeout on or off.
        let mut rl = Redline::new();
        rl.set_timeout(None);

        for (old, new) in [
            ("The cat in the hat.", "The dog in the hat."),
            ("mouse", "sofas"),
            ("", "everything"),
            ("everything", ""),
            ("left side", "left side"),
            ("a\nb\nc\n", "a\nd\nc\n"),
            ("🤪 emoji drift 🤔", "🤔 emoji drift 🤪"),
        ] {
            let edits = rl.diff(old, new);
            assert_eq!(
                old,
                crate::edits::source_text(&edits).iter().collect::<String>()
            );
            assert_eq!(
                new,
                crate::edits::destination_text(&edits)
                    .iter()
                    .collect::<String>()
            );
        }
    }

    #[test]
    fn test_diff_cat_dog() {
        let rl = Redline::new();
        assert_eq!(
            vec![
                edit(Op::Equal, "The "),
                edit(Op::Delete, "cat"),
                edit(Op::Insert, "dog"),
                edit(Op::Equal, " in the hat."),
            ],
            rl.diff("The cat in the hat.", "The dog in the hat.")
        );
    }

    #[test]
    fn test_diff_line_mode_matches_char_mode() {
        // Line mode is a speedup; the rehydrated result must reproduce the
        // same texts.
        let rl = Redline::new();
        let old = "1234567890\n".repeat(13);
        let new = "abcdefghij\n".repeat(13);

        let line_edits = rl.diff(&old, &new);
        assert_eq!(
            old,
            crate::edits::source_text(&line_edits)
                .iter()
                .collect::<String>()
        );
        assert_eq!(
            new,
            crate::edits::destination_text(&line_edits)
                .iter()
                .collect::<String>()
        );

        let mut by_char = Redline::new();
        by_char.set_checklines(false);
        let char_edits = by_char.diff(&old, &new);
        assert_eq!(
            old,
            crate::edits::source_text(&char_edits)
                .iter()
                .collect::<String>()
        );
    }

    #[test]
    fn test_diff_timeout_degrades() {
        let mut rl = Redline::new();
        rl.set_timeout(Some(1));

        // Two unrelated ~100kb texts; the budget will expire.
        let old = "`Twas brillig, and the slithy toves\nDid gyre and gimble in the wabe:\n"
            .repeat(1024);
        let new = "I am the very model of a modern major general,\nI've information vegetable, animal, and mineral.\n"
            .repeat(1024);

        let edits = rl.diff(&old, &new);
        assert_eq!(
            old,
            crate::edits::source_text(&edits).iter().collect::<String>()
        );
        assert_eq!(
            new,
            crate::edits::destination_text(&edits)
                .iter()
                .collect::<String>()
        );
    }

    #[test]
    fn test_lines_to_handles_sentinel() {
        let old = chars("alpha\nbeta\nalpha\n");
        let new = chars("beta\nalpha\nbeta\n");
        let encoded = lines_to_handles(&old, &new);

        // Handle 0 is reserved for the blank sentinel.
        assert_eq!(encoded.lines[0], &[] as &[char]);
        assert_eq!(vec![1, 2, 1], encoded.old);
        assert_eq!(vec![2, 1, 2], encoded.new);

        // Rehydration round-trips.
        let rehydrated: String = encoded
            .old
            .iter()
            .flat_map(|&h| encoded.lines[h].iter())
            .collect();
        assert_eq!("alpha\nbeta\nalpha\n", rehydrated);
    }

    #[test]
    fn test_delta_roundtrip() {
        let rl = Redline::new();

        let edits = rl.diff("abc", "abd");
        let delta = to_delta(&edits);
        assert_eq!("=2\t-1\t+d", delta);

        let back = from_delta("abc", &delta).unwrap();
        assert_eq!(edits, back);
        assert_eq!(
            "abd",
            crate::edits::destination_text(&back)
                .iter()
                .collect::<String>()
        );

        // Special characters survive.
        let edits = vec![
            edit(Op::Equal, "\u{0680} \x00 \t %"),
            edit(Op::Delete, "\u{0681} \x01 \n ^"),
            edit(Op::Insert, "\u{0682} \x02 \\ |"),
        ];
        let source: String = crate::edits::source_text(&edits).iter().collect();
        let delta = to_delta(&edits);
        assert_eq!(edits, from_delta(&source, &delta).unwrap());
    }

    #[test]
    fn test_delta_errors() {
        let rl = Redline::new();
        let edits = rl.diff("abc", "abd");
        let delta = to_delta(&edits);

        // Delta longer than the source.
        assert_eq!(
            Err(Error::InvalidArgument("delta does not cover source text")),
            from_delta("abc12", &delta)
        );
        // Delta shorter than the source: the keep runs past the end.
        assert_eq!(
            Err(Error::InvalidArgument("delta runs past end of source")),
            from_delta("a", &delta)
        );
        // Negative count.
        assert_eq!(
            Err(Error::InvalidArgument("bad count in delta")),
            from_delta("abc", "=-2\t-1\t+d")
        );
        // Unknown opcode.
        assert_eq!(
            Err(Error::InvalidArgument("unknown delta opcode")),
            from_delta("abc", "*3")
        );
    }
}
