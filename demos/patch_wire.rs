use redline::{PatchSource, Redline};

/// Ship an edit over the wire as patch text. Unlike the delta form, patches
/// carry their own context, so the receiver's copy may have drifted from
/// the sender's.

const TXT_OLD: &str = "Let's start with some basics 😊. We've got your standard smiley face 🙂, \
your sad face ☹️, and your angry face 😠.";

const TXT_NEW: &str = "Now, let's explore some emotional extremes 🌊. We've got your ecstatic \
face 🤩, your devastated face 😭, and your utterly confused face 🤯.";

fn at_source() -> String {
    let rl = Redline::new();

    let patches = rl.patch_make(PatchSource::Texts(TXT_OLD, TXT_NEW));
    let wire = rl.patch_to_text(&patches);
    println!("patch text:\n{wire}");

    wire
}

fn at_destination(wire: &str) -> Result<(), redline::Error> {
    let rl = Redline::new();

    let patches = rl.patch_from_text(wire)?;

    // The receiver's document gained a suffix since the patches were made;
    // the fuzzy matcher still places every hunk.
    let drifted = format!("{TXT_OLD} But wait, there's more!");
    let (rebuilt, applied) = rl.patch_apply(&patches, &drifted);
    for ok in applied {
        println!("{}", if ok { "OK" } else { "FAIL" });
    }

    assert_eq!(format!("{TXT_NEW} But wait, there's more!"), rebuilt);
    println!("patched the drifted text");

    Ok(())
}

fn main() -> Result<(), redline::Error> {
    let wire = at_source();
    at_destination(&wire)
}
