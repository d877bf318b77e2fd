//! Diff, fuzzy match and patch for plain Unicode text.
//!
//! The crate is built around three cooperating engines:
//!
//! * a diff engine producing a compact edit script between two texts
//!   (Myers' bidirectional bisect with affix stripping, half-match
//!   splitting, optional line-mode acceleration and semantic/efficiency
//!   cleanup),
//! * a Bitap fuzzy matcher locating a pattern near an expected position,
//! * a patch engine turning edit scripts into context-bearing hunks and
//!   applying them to drifted text, relocating each hunk with the matcher.
//!
//! All text is handled as Unicode code points: positions, lengths and the
//! counts in the delta and patch formats are in `char`s, never bytes.
//! Behavior can therefore differ from UTF-16 based implementations around
//! surrogate pairs.
//!
//! ```
//! use redline::{PatchSource, Redline};
//!
//! let rl = Redline::new();
//! let patches = rl.patch_make(PatchSource::Texts(
//!     "The quick brown fox.",
//!     "The quick red fox.",
//! ));
//! let (patched, results) = rl.patch_apply(&patches, "The quick brown fox jumps.");
//! assert_eq!("The quick red fox jumps.", patched);
//! assert!(results.iter().all(|&ok| ok));
//! ```

pub mod bitap;
pub mod diff;
pub mod edits;
pub mod errors;
pub mod fuzz;
pub mod html;
pub mod patch;
pub(crate) mod text;

pub use diff::{cleanup_merge, cleanup_semantic, cleanup_semantic_lossless, from_delta, to_delta};
pub use edits::{
    destination_text, levenshtein, render_humanized, render_raw, source_text, x_index, Edit, Op,
};
pub use errors::Error;
pub use html::HtmlConfig;
pub use patch::{Patch, PatchSource, Patches};

use chrono::{DateTime, TimeDelta, Utc};

/// The engine: a bundle of tunables shared by the diff, match and patch
/// operations. Construct one, adjust settings, reuse it freely; it keeps no
/// state between calls.
#[derive(Debug, Clone)]
pub struct Redline {
    /// Run a line-level pre-pass on large inputs. Faster, slightly less
    /// optimal scripts. Defaults to true.
    checklines: bool,
    /// Wall-clock budget for a single diff in milliseconds. `None` or 0
    /// disables the budget (and with it the half-match speedup, which can
    /// return suboptimal splits). Defaults to 1000.
    timeout: Option<u32>,
    /// Cost of an empty edit operation in terms of edit characters, used by
    /// the efficiency cleanup. Defaults to 4.
    edit_cost: usize,
    /// At what point is no match declared (0.0 = perfection, 1.0 = very
    /// loose). Defaults to 0.5.
    match_threshold: f32,
    /// How far to search for a match; a hit this many characters from the
    /// expected location adds 1.0 to its score. 0 demands exact position.
    /// Defaults to 1000.
    match_distance: usize,
    /// Width of the Bitap state word in bits; patterns longer than this are
    /// split by the patch engine. Defaults to 32.
    match_max_bits: usize,
    /// How closely the content of a large deletion has to match the text at
    /// the located position (0.0 strict, 1.0 anything). Defaults to 0.5.
    delete_threshold: f32,
    /// Context length carried on each side of a patch. Defaults to 4.
    patch_margin: u8,
}

impl Default for Redline {
    fn default() -> Self {
        Self {
            checklines: true,
            timeout: Some(1000),
            edit_cost: 4,
            match_threshold: 0.5,
            match_distance: 1000,
            match_max_bits: 32,
            delete_threshold: 0.5,
            patch_margin: 4,
        }
    }
}

impl Redline {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn checklines(&self) -> bool {
        self.checklines
    }

    /// Enable or disable the line-mode speedup for inputs over 100
    /// characters a side.
    pub fn set_checklines(&mut self, checklines: bool) {
        self.checklines = checklines;
    }

    pub(crate) fn timeout_enabled(&self) -> bool {
        self.timeout.is_some_and(|t| t > 0)
    }

    /// Set the diff time budget in milliseconds. `None` or `Some(0)` means
    /// unlimited. The budget is advisory: an expired diff degrades to a
    /// coarser but still valid script.
    pub fn set_timeout(&mut self, timeout: Option<u32>) {
        self.timeout = timeout;
    }

    /// Absolute deadline for a diff starting now, if a budget is set.
    pub(crate) fn deadline(&self) -> Option<DateTime<Utc>> {
        if !self.timeout_enabled() {
            return None;
        }
        self.timeout
            .and_then(|ms| Utc::now().checked_add_signed(TimeDelta::milliseconds(ms as i64)))
    }

    pub(crate) fn edit_cost(&self) -> usize {
        self.edit_cost
    }

    /// Set the efficiency-cleanup edit cost.
    pub fn set_edit_cost(&mut self, edit_cost: usize) {
        self.edit_cost = edit_cost;
    }

    pub(crate) fn match_threshold(&self) -> f32 {
        self.match_threshold
    }

    /// Set the match cutoff score. Closer to 0 demands accuracy, closer to
    /// 1 accepts looser matches.
    pub fn set_match_threshold(&mut self, threshold: f32) {
        self.match_threshold = threshold;
    }

    pub(crate) fn match_distance(&self) -> usize {
        self.match_distance
    }

    /// Set the distance over which proximity to the expected location decays
    /// to a full mismatch.
    pub fn set_match_distance(&mut self, distance: usize) {
        self.match_distance = distance;
    }

    pub(crate) fn match_max_bits(&self) -> usize {
        self.match_max_bits
    }

    /// Set the Bitap state-word width. Clamped to `1..=usize::BITS`; the
    /// state lives in a machine word, so "unbounded" is not on offer. The
    /// patch engine splits oversized patterns instead.
    pub fn set_match_max_bits(&mut self, bits: usize) {
        self.match_max_bits = bits.clamp(1, usize::BITS as usize);
    }

    pub(crate) fn delete_threshold(&self) -> f32 {
        self.delete_threshold
    }

    /// Set how faithfully the content of a large deletion must match before
    /// `patch_apply` accepts it.
    pub fn set_delete_threshold(&mut self, threshold: f32) {
        self.delete_threshold = threshold;
    }

    pub(crate) fn patch_margin(&self) -> usize {
        self.patch_margin as usize
    }

    /// Set the length of context carried on each side of a patch.
    pub fn set_patch_margin(&mut self, margin: u8) {
        self.patch_margin = margin;
    }
}
