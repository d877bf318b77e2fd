//! Round-trip oracle shared by the fuzz target and the integration tests.

use crate::{PatchSource, Redline};

/// Diff two texts, build patches from the script, apply them back to the
/// old text and assert the new text comes out. Panics on violation.
pub fn roundtrip(old: &str, new: &str) {
    let rl = Redline::new();

    let edits = rl.diff(old, new);
    let patches = rl.patch_make(PatchSource::TextEdits(old, &edits));
    let (rebuilt, _) = rl.patch_apply(&patches, old);

    assert_eq!(new, rebuilt);
}
