use redline::{from_delta, to_delta, PatchSource, Redline};

/// Ship an edit over the wire as a delta: the sender diffs and serializes,
/// the receiver rebuilds the script against its own copy of the source and
/// patches it forward.

const TXT_OLD: &str = "I am the very model of a modern Major-General,
I've information vegetable, animal, and mineral,
I know the kings of England, and I quote the fights historical,
From Marathon to Waterloo, in order categorical.";

const TXT_NEW: &str = "I am the very model of a cartoon individual,
My animation's comical, unusual, and whimsical,
I'm quite adept at funny gags, comedic theory I have read,
From wicked puns and stupid jokes to anvils that drop on your head.";

fn at_source() -> String {
    let rl = Redline::new();

    let edits = rl.diff(TXT_OLD, TXT_NEW);

    // The delta is the minimal over-the-air representation of the script:
    // inserts travel verbatim, keeps and deletes as code-point counts.
    let delta = to_delta(&edits);
    println!("delta: {delta}");

    delta
}

fn at_destination(delta: &str) -> Result<(), redline::Error> {
    let rl = Redline::new();

    // Rebuild the script from the local copy of the old text.
    let edits = from_delta(TXT_OLD, delta)?;
    let patches = rl.patch_make(PatchSource::TextEdits(TXT_OLD, &edits));

    let (rebuilt, applied) = rl.patch_apply(&patches, TXT_OLD);
    for ok in applied {
        println!("{}", if ok { "OK" } else { "FAIL" });
    }

    assert_eq!(TXT_NEW, rebuilt);
    println!("patched to the new text, byte for byte");

    Ok(())
}

fn main() -> Result<(), redline::Error> {
    let delta = at_source();
    at_destination(&delta)
}
