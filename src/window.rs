//! Logical address space for indexed bytes.
//!
//! Ported from zstd's `ZSTD_window_t` (`lib/compress/zstd_compress_internal.h`)
//! and its accessors (`ZSTD_index2addr`-style lookups scattered through
//! `zstd_lazy.c`). Unlike the C source, this crate never stores raw
//! pointers: a [`Window`] borrows two byte slices (`prefix`, `dict`) and
//! every index is a plain `u32` logical position, resolved by a single
//! branch on `idx < dictLimit`.

/// The maximal contiguous readable span starting at a logical index,
/// together with which side of the window it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Bytes live in `dictBase + idx`, readable up to `dictLimit`.
    Dict,
    /// Bytes live in `base + idx`, readable up to `nextSrc`.
    Prefix,
}

/// Logical address space over a sliding window.
///
/// Invariant: for any index `i` with `lowLimit <= i`, the byte at logical
/// position `i` is `(i < dictLimit ? dictBase : base) + i`; readable up to
/// `dictLimit - 1` or `nextSrc - 1` respectively.
pub struct Window<'a> {
    /// Bytes for indices `>= dict_limit`, addressed as `prefix[idx - dict_limit]`.
    pub prefix: &'a [u8],
    /// Bytes for indices `< dict_limit` (may alias `prefix` when no external
    /// dictionary is attached and the "dictionary" is really an earlier
    /// portion of the same prefix — `ExtDict` mode).
    pub dict: &'a [u8],
    /// Logical index of `dict[0]`. When `dict` coincides with an extDict
    /// region of the same stream this is simply where the scrolled-off
    /// region starts.
    pub dict_base_idx: u32,
    /// Indices `< dict_limit` live in `dict`; indices `>= dict_limit` live
    /// in `prefix`.
    pub dict_limit: u32,
    /// Lowest index still valid for matching.
    pub low_limit: u32,
    /// Non-zero if a dictionary is attached.
    pub loaded_dict_end: u32,
}

impl<'a> Window<'a> {
    /// A window with no external dictionary: `dict` is empty and
    /// `dict_limit == low_limit == 0`.
    pub fn no_dict(prefix: &'a [u8]) -> Self {
        Window {
            prefix,
            dict: &[],
            dict_base_idx: 0,
            dict_limit: 0,
            low_limit: 0,
            loaded_dict_end: 0,
        }
    }

    /// Index one past the last byte currently present in the prefix
    /// (`nextSrc`).
    #[inline]
    pub fn next_src(&self) -> u32 {
        self.dict_limit + self.prefix.len() as u32
    }

    /// `byteAt(idx) -> (side, offset-into-side-slice)`. Returns `None` if
    /// `idx` is below `low_limit` or at/past the end of the stream.
    #[inline]
    pub fn locate(&self, idx: u32) -> Option<(Side, usize)> {
        if idx < self.low_limit {
            return None;
        }
        if idx < self.dict_limit {
            let off = (idx - self.dict_base_idx) as usize;
            if off >= self.dict.len() {
                return None;
            }
            Some((Side::Dict, off))
        } else {
            let off = (idx - self.dict_limit) as usize;
            if off >= self.prefix.len() {
                return None;
            }
            Some((Side::Prefix, off))
        }
    }

    /// The maximal contiguous readable span starting at `idx`, as a slice,
    /// plus whether it is bounded by the dict/prefix boundary (i.e. whether
    /// a match starting here might need the two-segment comparator).
    #[inline]
    pub fn span_from(&self, idx: u32) -> &'a [u8] {
        match self.locate(idx) {
            Some((Side::Dict, off)) => &self.dict[off..],
            Some((Side::Prefix, off)) => &self.prefix[off..],
            None => &[],
        }
    }

    /// `true` if a match candidate starting at `idx` would cross the
    /// prefix/dict boundary before `idx + len` bytes, meaning length
    /// counting must switch to [`crate::matchlen::count2segments`].
    #[inline]
    pub fn crosses_boundary(&self, idx: u32, len: u32) -> bool {
        idx < self.dict_limit && idx + len > self.dict_limit
    }

    /// `lowestMatchIndex(curr, windowLog)`: `max(lowLimit, curr - (1<<windowLog))`,
    /// saturating at 0.
    #[inline]
    pub fn lowest_match_index(&self, curr: u32, window_log: u32) -> u32 {
        let back = 1u32.checked_shl(window_log).unwrap_or(u32::MAX);
        let floor = curr.saturating_sub(back);
        self.low_limit.max(floor)
    }

    /// Read `n` bytes starting at logical index `idx`, or `None` if fewer
    /// than `n` bytes are readable there without crossing the boundary.
    /// Used by the hash function, which never needs to span segments: it is
    /// a pure function of `mls` contiguous bytes.
    #[inline]
    pub fn peek(&self, idx: u32, n: usize) -> Option<&'a [u8]> {
        let span = self.span_from(idx);
        if span.len() >= n {
            Some(&span[..n])
        } else {
            None
        }
    }
}
