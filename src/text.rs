use crate::errors::Error;

// The binary-search probe outperforms the naive linear scan once inputs get
// big; see https://neil.fraser.name/news/2007/10/09/
pub(crate) fn common_prefix<T: Eq>(lhs: &[T], rhs: &[T]) -> usize {
    if lhs.is_empty() || rhs.is_empty() || lhs.first() != rhs.first() {
        return 0;
    }

    let mut lo = 0;
    let mut hi = lhs.len().min(rhs.len());
    let mut mid = hi;
    let mut start = 0;

    while lo < mid {
        if lhs[start..mid] == rhs[start..mid] {
            lo = mid;
            start = lo;
        } else {
            hi = mid;
        }
        mid = (hi - lo) / 2 + lo;
    }

    mid
}

pub(crate) fn common_suffix<T: Eq>(lhs: &[T], rhs: &[T]) -> usize {
    if lhs.is_empty() || rhs.is_empty() || lhs.last() != rhs.last() {
        return 0;
    }

    let mut lo = 0;
    let mut hi = lhs.len().min(rhs.len());
    let mut mid = hi;
    let mut start = 0;

    while lo < mid {
        if lhs[lhs.len() - mid..lhs.len() - start] == rhs[rhs.len() - mid..rhs.len() - start] {
            lo = mid;
            start = lo;
        } else {
            hi = mid;
        }
        mid = (hi - lo) / 2 + lo;
    }

    mid
}

/// Largest n such that the last n items of `lhs` equal the first n of `rhs`.
pub(crate) fn common_overlap<T: Eq>(lhs: &[T], rhs: &[T]) -> usize {
    if lhs.is_empty() || rhs.is_empty() {
        return 0;
    }

    // Truncate to equal lengths.
    let l = &lhs[lhs.len().saturating_sub(rhs.len())..];
    let r = &rhs[..rhs.len().min(lhs.len())];
    let minlen = l.len();

    if l == r {
        return minlen;
    }

    // Grow a candidate suffix of `l`, jumping by where it next occurs in `r`.
    // Performance analysis: https://neil.fraser.name/news/2010/11/04/
    let mut best = 0;
    let mut len = 1;

    loop {
        let pattern = &l[minlen - len..];
        let Some(found) = r.windows(pattern.len()).position(|w| w == pattern) else {
            return best;
        };

        len += found;
        if found == 0 || l[minlen - len..] == r[..len] {
            best = len;
            len += 1;
        }
    }
}

/// A split of both inputs around a shared substring at least half as long as
/// the longer input. `a_*` slices come from the first input, `b_*` from the
/// second.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct HalfMatch<'a, T> {
    pub a_prefix: &'a [T],
    pub a_suffix: &'a [T],
    pub b_prefix: &'a [T],
    pub b_suffix: &'a [T],
    pub common: &'a [T],
}

/// Probe for a half match, seeding from the quarter and half points of the
/// longer input and keeping the longer of the two hits. Purely a speedup:
/// callers with unlimited time must skip it, since the result can be
/// suboptimal.
pub(crate) fn half_match<'a, T: Copy + Eq>(
    old: &'a [T],
    new: &'a [T],
) -> Option<HalfMatch<'a, T>> {
    let (long, short) = if old.len() > new.len() {
        (old, new)
    } else {
        (new, old)
    };

    if long.len() < 4 || short.len() * 2 < long.len() {
        return None;
    }

    let hm1 = half_match_i(long, short, long.len() / 4);
    let hm2 = half_match_i(long, short, long.len() / 2);

    let hm = match (hm1, hm2) {
        (Some(one), Some(two)) => {
            if one.common.len() > two.common.len() {
                one
            } else {
                two
            }
        }
        (Some(one), None) => one,
        (None, Some(two)) => two,
        (None, None) => return None,
    };

    // `hm` is phrased long/short; rephrase as old/new.
    if old.len() > new.len() {
        Some(hm)
    } else {
        Some(HalfMatch {
            a_prefix: hm.b_prefix,
            a_suffix: hm.b_suffix,
            b_prefix: hm.a_prefix,
            b_suffix: hm.a_suffix,
            common: hm.common,
        })
    }
}

// Does a substring of `short` exist within `long` such that the substring is
// at least half the length of `long`? Seeds with the quarter-length
// substring of `long` starting at `idx`.
fn half_match_i<'a, T: Copy + Eq>(
    long: &'a [T],
    short: &'a [T],
    idx: usize,
) -> Option<HalfMatch<'a, T>> {
    let seed = &long[idx..idx + long.len() / 4];

    let mut best_common: &[T] = &[];
    let mut best = None;

    let mut j = 0;
    while let Some(pos) = short[j..].windows(seed.len()).position(|w| w == seed) {
        j += pos;

        let prefix_len = common_prefix(&long[idx..], &short[j..]);
        let suffix_len = common_suffix(&long[..idx], &short[..j]);

        if best_common.len() < suffix_len + prefix_len {
            best_common = &short[j - suffix_len..j + prefix_len];
            best = Some(HalfMatch {
                a_prefix: &long[..idx - suffix_len],
                a_suffix: &long[idx + prefix_len..],
                b_prefix: &short[..j - suffix_len],
                b_suffix: &short[j + prefix_len..],
                common: best_common,
            });
        }

        j += 1;
    }

    if best_common.len() * 2 >= long.len() {
        best
    } else {
        None
    }
}

// Characters that survive percent-encoding untouched, beyond ASCII
// alphanumerics. The punctuation set mirrors what the reference URL encoder
// leaves or un-escapes; changing it breaks delta/patch-text round trips with
// the wider diff-match-patch family.
const URI_SAFE: &str = " !~*'();/?:@&=+$,#-_.";

fn is_uri_literal(c: char) -> bool {
    c.is_ascii_alphanumeric() || URI_SAFE.contains(c)
}

/// Percent-encode text for the delta and patch-text formats. Unsafe
/// characters become uppercase `%XX` escapes of their UTF-8 bytes.
pub(crate) fn percent_encode(data: &[char]) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(data.len());
    let mut buf = [0u8; 4];

    for &c in data {
        if is_uri_literal(c) {
            out.push(c);
        } else {
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push('%');
                out.push(HEX[(byte >> 4) as usize] as char);
                out.push(HEX[(byte & 0xf) as usize] as char);
            }
        }
    }

    out
}

/// Reverse [`percent_encode`]. Fails on truncated or non-hex escapes and on
/// escape sequences that do not decode to UTF-8.
pub(crate) fn percent_decode(data: &[char]) -> Result<Vec<char>, Error> {
    let mut bytes = Vec::with_capacity(data.len());
    let mut buf = [0u8; 4];
    let mut iter = data.iter();

    while let Some(&c) = iter.next() {
        if c != '%' {
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let hi = iter
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or(Error::InvalidArgument("truncated or malformed % escape"))?;
        let lo = iter
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or(Error::InvalidArgument("truncated or malformed % escape"))?;

        bytes.push(((hi << 4) | lo) as u8);
    }

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.chars().collect()),
        Err(_) => Err(Error::Encoding),
    }
}
