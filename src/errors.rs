use thiserror::Error;

/// Everything that can go wrong across diff, match and patch.
///
/// Timeouts are not errors: a diff that runs out of time degrades to a
/// coarser edit script, and `patch_apply` reports unlocatable hunks through
/// its per-patch result flags.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed caller input: a bad delta token, a bad patch header, an
    /// unknown edit sign, a cursor that does not land on the end of the
    /// source text.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Percent-decoded bytes did not form valid UTF-8.
    #[error("decoded text is not valid utf-8")]
    Encoding,
}
