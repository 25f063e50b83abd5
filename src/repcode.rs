//! Repeat-code state: the pair of most-recently-used match offsets a lazy
//! parse carries across sequences.
//!
//! Ported from zstd's `rep[ZSTD_REP_NUM]` handling in `zstd_lazy.c`'s
//! `ZSTD_compressBlock_lazy_generic`. A pair of non-zero offsets; `0` is the
//! sentinel for "disabled".

/// The two most-recent non-zero match offsets (`rep0`, `rep1`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepState {
    pub rep0: u32,
    pub rep1: u32,
}

impl RepState {
    pub fn new(rep0: u32, rep1: u32) -> Self {
        RepState { rep0, rep1 }
    }

    /// After emitting a *normal* (non-repeat) match with raw offset
    /// `raw_offset`: `rep1 <- rep0; rep0 <- raw_offset`.
    #[inline]
    pub fn push_normal(&mut self, raw_offset: u32) {
        self.rep1 = self.rep0;
        self.rep0 = raw_offset;
    }

    /// After emitting a match whose offset code referenced `rep0`: state is
    /// unchanged.
    #[inline]
    pub fn push_rep0(&mut self) {}

    /// After emitting a match whose offset code referenced `rep1`: the pair
    /// swaps.
    #[inline]
    pub fn push_rep1(&mut self) {
        core::mem::swap(&mut self.rep0, &mut self.rep1);
    }

    /// Decode a `Sequence`'s `offsetCode` back into the raw
    /// offset it denotes under the *current* (pre-update) state, and which
    /// of the three repeat-code shapes it was — used by the parser to route
    /// to [`Self::push_normal`]/[`Self::push_rep0`]/[`Self::push_rep1`] on
    /// emission, and by the test decoder to reconstruct bytes.
    ///
    /// `offsetCode` is `ZSTD_REP_MOVE + rawOffset` for a normal offset, or
    /// one of `{1,2,3}` for rep0 / rep1 / rep0-1.
    pub fn resolve(&self, offset_code: u32) -> (u32, RepKind) {
        match offset_code {
            1 => (self.rep0, RepKind::Rep0),
            2 => {
                if self.rep1 != 0 {
                    (self.rep1, RepKind::Rep1)
                } else {
                    (self.rep0, RepKind::Rep0)
                }
            }
            3 => (self.rep0.saturating_sub(1).max(1), RepKind::Rep0Minus1),
            raw => (raw - crate::params::REP_MOVE, RepKind::Normal),
        }
    }
}

/// Which of the four offset-code shapes a sequence used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepKind {
    Rep0,
    Rep1,
    Rep0Minus1,
    Normal,
}
