//! The patch engine: context-bearing hunks built from an edit script,
//! applied to possibly drifted text with the Bitap matcher relocating each
//! hunk.

use std::fmt::Display;

use crate::diff::{cleanup_semantic, cleanup_semantic_lossless};
use crate::edits::{destination_text, levenshtein, source_text, x_index, Edit, Op};
use crate::errors::Error;
use crate::text::{percent_decode, percent_encode};
use crate::Redline;

/// One hunk: an edit script bracketed by equal context, with its spans in
/// the source (`start1`/`length1`) and destination (`start2`/`length2`)
/// texts. All coordinates are code points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub(crate) edits: Vec<Edit>,
    pub(crate) start1: usize,
    pub(crate) start2: usize,
    pub(crate) length1: usize,
    pub(crate) length2: usize,
}

impl Patch {
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn start1(&self) -> usize {
        self.start1
    }

    pub fn start2(&self) -> usize {
        self.start2
    }
}

/// Renders the wire form: a `@@ -S1,L1 +S2,L2 @@` header, then one
/// percent-encoded edit per line. Starts print 1-based; a zero-length span
/// prints its start un-decremented, matching the rest of the
/// diff-match-patch family.
impl Display for Patch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let coords1 = match self.length1 {
            0 => format!("{},0", self.start1),
            1 => format!("{}", self.start1 + 1),
            n => format!("{},{}", self.start1 + 1, n),
        };
        let coords2 = match self.length2 {
            0 => format!("{},0", self.start2),
            1 => format!("{}", self.start2 + 1),
            n => format!("{},{}", self.start2 + 1, n),
        };

        writeln!(f, "@@ -{coords1} +{coords2} @@")?;

        for edit in &self.edits {
            let sign = match edit.op() {
                Op::Insert => '+',
                Op::Delete => '-',
                Op::Equal => ' ',
            };
            writeln!(f, "{sign}{}", percent_encode(edit.data()))?;
        }

        Ok(())
    }
}

pub type Patches = Vec<Patch>;

/// What to build patches from. `Texts` diffs (and cleans up) for you;
/// `TextEdits` is the cheapest when both are already at hand; `Edits`
/// reconstructs the source text from the script.
pub enum PatchSource<'a> {
    Texts(&'a str, &'a str),
    Edits(&'a [Edit]),
    TextEdits(&'a str, &'a [Edit]),
}

impl Redline {
    /// Build a list of patches from two texts or a ready-made edit script.
    pub fn patch_make(&self, source: PatchSource) -> Patches {
        match source {
            PatchSource::Texts(old, new) => {
                let mut edits = self.diff(old, new);
                if edits.len() > 2 {
                    cleanup_semantic(&mut edits);
                    self.cleanup_efficiency(&mut edits);
                }
                let old: Vec<char> = old.chars().collect();
                self.patch_make_from(&old, &edits)
            }
            PatchSource::Edits(edits) => {
                let old = source_text(edits);
                self.patch_make_from(&old, edits)
            }
            PatchSource::TextEdits(old, edits) => {
                let old: Vec<char> = old.chars().collect();
                self.patch_make_from(&old, edits)
            }
        }
    }

    fn patch_make_from(&self, text: &[char], edits: &[Edit]) -> Patches {
        if edits.is_empty() {
            return Vec::new();
        }

        let margin = self.patch_margin();

        let mut patches = Vec::new();
        let mut patch = Patch::default();

        // Cursors into the source and destination texts.
        let mut chars1 = 0;
        let mut chars2 = 0;

        // Unlike unidiff, these patches roll their context forward: each
        // patch's context reflects the application of the ones before it.
        let mut prepatch: Vec<char> = text.to_vec();
        let mut postpatch: Vec<char> = prepatch.clone();

        for (idx, edit) in edits.iter().enumerate() {
            if patch.edits.is_empty() && edit.op() != Op::Equal {
                patch.start1 = chars1;
                patch.start2 = chars2;
            }

            match edit.op() {
                Op::Insert => {
                    patch.length2 += edit.len();
                    postpatch.splice(chars2..chars2, edit.data().iter().copied());
                    patch.edits.push(edit.clone());
                }
                Op::Delete => {
                    patch.length1 += edit.len();
                    postpatch.drain(chars2..chars2 + edit.len());
                    patch.edits.push(edit.clone());
                }
                Op::Equal => {
                    if edit.len() <= 2 * margin && !patch.edits.is_empty() && idx + 1 != edits.len()
                    {
                        // Small equality: keep it inside the patch.
                        patch.length1 += edit.len();
                        patch.length2 += edit.len();
                        patch.edits.push(edit.clone());
                    } else if edit.len() >= 2 * margin && !patch.edits.is_empty() {
                        // Big equality: close out the current patch.
                        self.patch_add_context(&mut patch, &prepatch);
                        patches.push(std::mem::take(&mut patch));

                        prepatch.clone_from(&postpatch);
                        chars1 = chars2;
                    }
                }
            }

            if edit.op() != Op::Insert {
                chars1 += edit.len();
            }
            if edit.op() != Op::Delete {
                chars2 += edit.len();
            }
        }

        if !patch.edits.is_empty() {
            self.patch_add_context(&mut patch, &prepatch);
            patches.push(patch);
        }

        patches
    }

    // Grow the context around a patch until its pattern is unique within
    // `text` (or would exceed what the matcher can handle), then add one
    // margin of literal context on each side.
    fn patch_add_context(&self, patch: &mut Patch, text: &[char]) {
        if text.is_empty() {
            return;
        }

        let margin = self.patch_margin();
        let max_pattern = self.match_max_bits().saturating_sub(2 * margin);

        let mut pattern = &text[patch.start2..patch.start2 + patch.length1];
        let mut padding = 0;

        while pattern.is_empty()
            || (!is_unique(pattern, text) && pattern.len() < max_pattern)
        {
            padding += margin;
            let begin = patch.start2.saturating_sub(padding);
            let end = (patch.start2 + patch.length1 + padding).min(text.len());
            pattern = &text[begin..end];
        }

        // One more chunk for good luck.
        padding += margin;

        let begin = patch.start2.saturating_sub(padding);
        let prefix = &text[begin..patch.start2];
        if !prefix.is_empty() {
            patch.edits.insert(0, Edit::equal(prefix));
        }

        let begin = (patch.start2 + patch.length1).min(text.len());
        let end = (patch.start2 + patch.length1 + padding).min(text.len());
        let suffix = &text[begin..end];
        if !suffix.is_empty() {
            patch.edits.push(Edit::equal(suffix));
        }

        patch.start1 -= prefix.len();
        patch.start2 -= prefix.len();
        patch.length1 += prefix.len() + suffix.len();
        patch.length2 += prefix.len() + suffix.len();
    }

    /// Apply `patches` to `text`. Returns the patched text and one flag per
    /// patch telling whether it could be located and applied. Application
    /// never fails outright: hunks that cannot be placed within the match
    /// threshold are skipped and reported `false`.
    pub fn patch_apply(&self, patches: &Patches, text: &str) -> (String, Vec<bool>) {
        if patches.is_empty() {
            return (text.to_string(), Vec::new());
        }

        let deadline = self.deadline();
        let max_bits = self.match_max_bits();

        // Work on a private copy; callers keep their patch list.
        let mut patches = patches.clone();
        let null_pad = self.patch_add_padding(&mut patches);

        let mut source: Vec<char> = null_pad.clone();
        source.extend(text.chars());
        source.extend_from_slice(&null_pad);

        self.patch_split_max(&mut patches);

        // Running offset between expected and actual patch positions. A
        // patch found at 12 when expected at 10 shifts every later
        // expectation by 2.
        let mut delta = 0_isize;
        let mut results = vec![false; patches.len()];

        for (x, patch) in patches.iter().enumerate() {
            let expected_loc = (patch.start2 as isize + delta).max(0) as usize;
            let text1 = source_text(&patch.edits);

            let (start_loc, end_loc) = if text1.len() > max_bits {
                // split_max only leaves an oversized pattern for a monster
                // delete; match its head and tail separately.
                match self.locate_chars(&source, &text1[..max_bits], expected_loc) {
                    Some(sl) => {
                        let el = self.locate_chars(
                            &source,
                            &text1[text1.len() - max_bits..],
                            expected_loc + text1.len() - max_bits,
                        );
                        match el {
                            // Both ends found, in the right order.
                            Some(el) if sl < el => (Some(sl), Some(el)),
                            _ => (None, None),
                        }
                    }
                    None => (None, None),
                }
            } else {
                (self.locate_chars(&source, &text1, expected_loc), None)
            };

            let Some(start_loc) = start_loc else {
                // No match; pull the delta back for the patches behind us.
                delta -= patch.length2 as isize - patch.length1 as isize;
                continue;
            };

            results[x] = true;
            delta = start_loc as isize - expected_loc as isize;

            let found_end = match end_loc {
                Some(el) => (el + max_bits).min(source.len()),
                None => (start_loc + text1.len()).min(source.len()),
            };
            let text2 = source[start_loc..found_end].to_vec();

            if text1 == text2 {
                // Perfect match: splice the replacement straight in.
                source.splice(
                    start_loc..start_loc + text1.len(),
                    destination_text(&patch.edits),
                );
                continue;
            }

            // Imperfect match: diff what we expected against what we found
            // and replay the patch through that index framework.
            let mut diffs = self.diff_chars(&text1, &text2, false, deadline);

            if text1.len() > max_bits
                && levenshtein(&diffs) as f32 / text1.len() as f32 > self.delete_threshold()
            {
                // The end points match but the content is unacceptably bad.
                results[x] = false;
                continue;
            }

            cleanup_semantic_lossless(&mut diffs);

            let mut index1 = 0;
            for edit in &patch.edits {
                if edit.op() != Op::Equal {
                    let index2 = x_index(&diffs, index1);
                    if edit.op() == Op::Insert {
                        let at = (start_loc + index2).min(source.len());
                        source.splice(at..at, edit.data().iter().copied());
                    } else {
                        let from = (start_loc + index2).min(source.len());
                        let to = (start_loc + x_index(&diffs, index1 + edit.len()))
                            .clamp(from, source.len());
                        source.drain(from..to);
                    }
                }
                if edit.op() != Op::Delete {
                    index1 += edit.len();
                }
            }
        }

        // Strip the padding back off.
        source.drain(..null_pad.len().min(source.len()));
        source.truncate(source.len().saturating_sub(null_pad.len()));

        (source.into_iter().collect(), results)
    }

    // Pad the ends of every coordinate so edge patches have full context to
    // match against. The padding characters (code points 1..=margin) cannot
    // collide with real text in practice and are stripped after apply.
    fn patch_add_padding(&self, patches: &mut Patches) -> Vec<char> {
        let pad_len = self.patch_margin();
        let null_pad: Vec<char> = (1..=pad_len as u32)
            .filter_map(char::from_u32)
            .collect();

        // Bump all the patches forward.
        for patch in patches.iter_mut() {
            patch.start1 += pad_len;
            patch.start2 += pad_len;
        }

        // Lead-in padding on the first patch.
        if let Some(first) = patches.first_mut() {
            match first.edits.first_mut() {
                Some(head) if head.op() == Op::Equal => {
                    if pad_len > head.len() {
                        // Grow the first equality to a full margin.
                        let extra = pad_len - head.len();
                        let mut grown = null_pad[head.len()..].to_vec();
                        grown.extend_from_slice(head.data());
                        head.1 = grown;
                        first.start1 -= extra;
                        first.start2 -= extra;
                        first.length1 += extra;
                        first.length2 += extra;
                    }
                }
                _ => {
                    first.edits.insert(0, Edit::equal(&null_pad));
                    first.start1 -= pad_len;
                    first.start2 -= pad_len;
                    first.length1 += pad_len;
                    first.length2 += pad_len;
                }
            }
        }

        // Trailing padding on the last patch.
        if let Some(last) = patches.last_mut() {
            match last.edits.last_mut() {
                Some(tail) if tail.op() == Op::Equal => {
                    if pad_len > tail.len() {
                        // Grow the last equality to a full margin.
                        let extra = pad_len - tail.len();
                        tail.1.extend_from_slice(&null_pad[..extra]);
                        last.length1 += extra;
                        last.length2 += extra;
                    }
                }
                _ => {
                    last.edits.push(Edit::equal(&null_pad));
                    last.length1 += pad_len;
                    last.length2 += pad_len;
                }
            }
        }

        null_pad
    }

    // Break up any patch spanning more source text than the matcher's state
    // word can hold, carrying a margin of context between the pieces.
    pub(crate) fn patch_split_max(&self, patches: &mut Patches) {
        let max_bits = self.match_max_bits();
        let margin = self.patch_margin();
        if max_bits <= margin {
            return;
        }

        let mut idx = 0;
        while idx < patches.len() {
            if patches[idx].length1 <= max_bits {
                idx += 1;
                continue;
            }

            let mut big = patches.remove(idx);
            let mut start1 = big.start1;
            let mut start2 = big.start2;

            let mut precontext: Vec<char> = Vec::new();
            let mut pieces: Patches = Vec::new();

            while !big.edits.is_empty() {
                let mut patch = Patch {
                    start1: start1 - precontext.len(),
                    start2: start2 - precontext.len(),
                    ..Default::default()
                };
                let mut empty = true;

                if !precontext.is_empty() {
                    patch.length1 = precontext.len();
                    patch.length2 = precontext.len();
                    patch.edits.push(Edit::equal(&precontext));
                }

                while !big.edits.is_empty() && patch.length1 < max_bits - margin {
                    let op = big.edits[0].op();
                    match op {
                        Op::Insert => {
                            // Insertions are harmless.
                            patch.length2 += big.edits[0].len();
                            start2 += big.edits[0].len();
                            patch.edits.push(big.edits.remove(0));
                            empty = false;
                        }
                        Op::Delete
                            if patch.edits.len() == 1
                                && patch.edits[0].op() == Op::Equal
                                && big.edits[0].len() > 2 * max_bits =>
                        {
                            // A monster delete passes through in one chunk.
                            patch.length1 += big.edits[0].len();
                            start1 += big.edits[0].len();
                            patch.edits.push(big.edits.remove(0));
                            empty = false;
                        }
                        _ => {
                            // Deletion or equality: take what fits.
                            let take = big.edits[0]
                                .len()
                                .min(max_bits - patch.length1 - margin);
                            let piece = big.edits[0].data()[..take].to_vec();

                            patch.length1 += piece.len();
                            start1 += piece.len();
                            if op == Op::Equal {
                                patch.length2 += piece.len();
                                start2 += piece.len();
                            } else {
                                empty = false;
                            }

                            patch.edits.push(Edit::new(op, &piece));

                            if piece.len() == big.edits[0].len() {
                                big.edits.remove(0);
                            } else {
                                big.edits[0].1.drain(..piece.len());
                            }
                        }
                    }
                }

                // Head context of the next piece is the tail of this one's
                // destination.
                precontext = destination_text(&patch.edits);
                if precontext.len() > margin {
                    precontext.drain(..precontext.len() - margin);
                }

                // Tail context comes from what's left of the big patch.
                let mut postcontext = source_text(&big.edits);
                postcontext.truncate(margin);

                if !postcontext.is_empty() {
                    patch.length1 += postcontext.len();
                    patch.length2 += postcontext.len();

                    match patch.edits.last_mut() {
                        Some(last) if last.op() == Op::Equal => {
                            last.1.extend_from_slice(&postcontext);
                        }
                        _ => patch.edits.push(Edit::equal(&postcontext)),
                    }
                }

                if !empty {
                    pieces.push(patch);
                }
            }

            // Skip over the inserted pieces; when none survived, the next
            // patch has slid into `idx` and gets examined as-is.
            let added = pieces.len();
            patches.splice(idx..idx, pieces);
            idx += added;
        }
    }

    /// Serialize a patch list to the textual wire form.
    pub fn patch_to_text(&self, patches: &Patches) -> String {
        patches.iter().map(Patch::to_string).collect()
    }

    /// Parse a patch list from the textual wire form produced by
    /// [`Redline::patch_to_text`].
    pub fn patch_from_text(&self, text: &str) -> Result<Patches, Error> {
        let mut patches = Vec::new();
        if text.is_empty() {
            return Ok(patches);
        }

        let lines: Vec<&str> = text.lines().collect();
        let mut i = 0;

        while i < lines.len() {
            let (start1, len1, start2, len2) = parse_header(lines[i])
                .ok_or(Error::InvalidArgument("invalid patch header"))?;

            let mut patch = Patch {
                start1,
                start2,
                ..Default::default()
            };

            // Header coordinates are 1-based except for zero-length spans,
            // which print their start as-is.
            match len1 {
                None => {
                    patch.start1 = start1
                        .checked_sub(1)
                        .ok_or(Error::InvalidArgument("invalid patch header"))?;
                    patch.length1 = 1;
                }
                Some(0) => patch.length1 = 0,
                Some(n) => {
                    patch.start1 = start1
                        .checked_sub(1)
                        .ok_or(Error::InvalidArgument("invalid patch header"))?;
                    patch.length1 = n;
                }
            }
            match len2 {
                None => {
                    patch.start2 = start2
                        .checked_sub(1)
                        .ok_or(Error::InvalidArgument("invalid patch header"))?;
                    patch.length2 = 1;
                }
                Some(0) => patch.length2 = 0,
                Some(n) => {
                    patch.start2 = start2
                        .checked_sub(1)
                        .ok_or(Error::InvalidArgument("invalid patch header"))?;
                    patch.length2 = n;
                }
            }

            i += 1;

            while i < lines.len() {
                let line = lines[i];
                let Some(sign) = line.chars().next() else {
                    i += 1;
                    continue;
                };
                if sign == '@' {
                    // Next patch header.
                    break;
                }

                let body: Vec<char> = line[sign.len_utf8()..].chars().collect();
                let data = percent_decode(&body)?;

                match sign {
                    '-' => patch.edits.push(Edit::delete(&data)),
                    '+' => patch.edits.push(Edit::insert(&data)),
                    ' ' => patch.edits.push(Edit::equal(&data)),
                    _ => return Err(Error::InvalidArgument("unknown edit sign in patch text")),
                }

                i += 1;
            }

            patches.push(patch);
        }

        Ok(patches)
    }
}

fn is_unique(pattern: &[char], text: &[char]) -> bool {
    let mut hits = text.windows(pattern.len()).filter(|w| *w == pattern);
    hits.next();
    hits.next().is_none()
}

fn parse_header(line: &str) -> Option<(usize, Option<usize>, usize, Option<usize>)> {
    let rest = line.strip_prefix("@@ -")?;
    let rest = rest.strip_suffix(" @@")?;
    let (old_span, new_span) = rest.split_once(" +")?;
    let (start1, len1) = parse_span(old_span)?;
    let (start2, len2) = parse_span(new_span)?;
    Some((start1, len1, start2, len2))
}

fn parse_span(span: &str) -> Option<(usize, Option<usize>)> {
    match span.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, Some(len.parse().ok()?))),
        None => Some((span.parse().ok()?, None)),
    }
}
