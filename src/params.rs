//! Compile-time tunables, compression parameters, and the strategy /
//! search-method / dict-mode enumerations that key the dispatch table.
//!
//! Translated from the constants and enums scattered across zstd's
//! `lib/compress/zstd_compress_internal.h` and `lib/compress/zstd_lazy.c`:
//!   - `ZSTD_LAZY_DDSS_BUCKET_LOG`         → [`DDSS_BUCKET_LOG`]
//!   - `kSearchStrength`                   → [`SEARCH_STRENGTH`]
//!   - `kPrefetchNb`                       → [`PREFETCH_NB`]
//!   - `MINMATCH`                          → [`MINMATCH`]
//!   - `kShortBits` (tag width)            → [`SHORT_BITS`]
//!   - `ZSTD_REP_MOVE`                     → [`REP_MOVE`]
//!   - `ZSTD_strategy`                     → [`Strategy`]
//!   - search-method selector (HC/BT/Row)  → [`SearchMethod`]
//!   - dict-mode selector                  → [`DictMode`]
//!   - `ZSTD_compressionParameters` (subset actually consumed by the
//!     match finder) → [`CParams`]

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Tunables
// ─────────────────────────────────────────────────────────────────────────────

/// Bucket factor for the dedicated-dictionary-search layout: each hash
/// bucket holds `(1 << DDSS_BUCKET_LOG) - 1` cached positions plus one
/// packed chain pointer.
pub const DDSS_BUCKET_LOG: u32 = 4;

/// Governs the incompressible-skip heuristic: on a failed search, `ip`
/// advances by `((ip - anchor) >> SEARCH_STRENGTH) + 1`.
pub const SEARCH_STRENGTH: u32 = 8;

/// Depth of the row-hash's hash-cache prefetch ring.
pub const PREFETCH_NB: usize = 8;

/// Minimum emittable match length (after hash-based search, which may use a
/// longer MLS to form the hash).
pub const MINMATCH: u32 = 3;

/// Width, in bits, of the row-hash tag (the low bits of the row-hash value
/// not consumed by row selection).
pub const SHORT_BITS: u32 = 8;

/// Offset-code bias applied to raw offsets that are not repeat codes.
pub const REP_MOVE: u32 = 3;

/// Sentinel stored in a binary-tree "large" child slot to mark a position
/// that has been chained into its bucket but not yet sorted by
/// [`crate::index::binary_tree`].
pub const UNSORTED_MARK: u32 = u32::MAX;

/// `ilimit = iend - MATCH_SAFEGUARD_DISTANCE`: the lazy parser never starts
/// a new search within this many bytes of the block end, guaranteeing every
/// hash read (up to `mls <= 8` bytes) and the repeat-code probe's own
/// 4-byte read stay in bounds.
pub const MATCH_SAFEGUARD_DISTANCE: usize = 8;

// ─────────────────────────────────────────────────────────────────────────────
// Strategy / search-method / dict-mode enums
// ─────────────────────────────────────────────────────────────────────────────

/// Lazy-parser depth policy. Mirrors the subset of `ZSTD_strategy` this
/// crate implements (`ZSTD_greedy`, `ZSTD_lazy`, `ZSTD_lazy2`; `btlazy2`
/// reuses the same parser driven by the binary-tree search method).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Strategy {
    /// No look-ahead: take the first match at or above `MINMATCH`.
    Greedy,
    /// One position of look-ahead (depth 1).
    Lazy,
    /// Two positions of look-ahead (depth 2).
    Lazy2,
}

impl Strategy {
    /// Look-ahead depth implied by this strategy (0, 1, or 2).
    #[inline]
    pub fn depth(self) -> u32 {
        match self {
            Strategy::Greedy => 0,
            Strategy::Lazy => 1,
            Strategy::Lazy2 => 2,
        }
    }
}

/// Which index backs the match search. `btlazy2` is `Strategy::Lazy2` with
/// `SearchMethod::BinaryTree`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchMethod {
    HashChain,
    BinaryTree,
    RowHash,
}

/// How the attached dictionary, if any, is addressed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DictMode {
    /// No dictionary attached.
    None,
    /// Dictionary is a separately-initialised, fully indexed `MatchState`
    /// attached via `dictMatchState`.
    DictMatchState,
    /// Dictionary is indexed through the read-only [`crate::index::dedicated_dict`]
    /// layout.
    DedicatedDictSearch,
    /// Dictionary is a scrolled-off region of the same logical window,
    /// addressed via the two-segment comparator.
    ExtDict,
}

// ─────────────────────────────────────────────────────────────────────────────
// CParams
// ─────────────────────────────────────────────────────────────────────────────

/// Per-session compression parameters.
#[derive(Clone, Copy, Debug)]
pub struct CParams {
    /// log2 of the hash table entry count.
    pub hash_log: u32,
    /// log2 of the chain table entry count (HC and BT both size off this).
    pub chain_log: u32,
    /// log2 of the max attempts per search (`2^searchLog`).
    pub search_log: u32,
    /// log2 of the maximum window size the index may reference.
    pub window_log: u32,
    /// Bytes digested per hash (`mls`), `3..=7` (clamped to `4..=6` for the
    /// hash mixer itself, see [`Self::hash_mls`]).
    pub min_match: u32,
    /// Row width exponent for [`SearchMethod::RowHash`] (`4` or `5`,
    /// i.e. 16 or 32 entries per row). Unused by HC/BT.
    pub row_log: u32,
    pub strategy: Strategy,
}

/// A caller-contract violation detected before the hot loop runs.
///
/// Mirrors the single genuine fallibility boundary this crate has: every
/// other caller-contract violation is debug-assert territory, not a
/// `Result`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParamError {
    /// `hash_log`, `chain_log`, `search_log`, `window_log`, or `row_log` is
    /// outside its supported range.
    LogOutOfRange(&'static str),
    /// `min_match` is outside `3..=7`.
    MinMatchOutOfRange,
    /// The requested `(DictMode::DedicatedDictSearch, SearchMethod::BinaryTree)`
    /// combination is unsupported.
    UnsupportedDictSearchCombination,
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::LogOutOfRange(which) => write!(f, "{which} out of supported range"),
            ParamError::MinMatchOutOfRange => write!(f, "min_match out of range 3..=7"),
            ParamError::UnsupportedDictSearchCombination => {
                write!(f, "dedicated-dict-search is not supported with the binary-tree method")
            }
        }
    }
}

impl std::error::Error for ParamError {}

impl CParams {
    /// Validate ranges. Parameter *selection* (choosing a level's
    /// `hash_log`/`chain_log`/etc.) is out of scope for this crate, but the
    /// ranges themselves are part of the match-finder's own contract.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(6..=30).contains(&self.hash_log) {
            return Err(ParamError::LogOutOfRange("hash_log"));
        }
        if !(6..=30).contains(&self.chain_log) {
            return Err(ParamError::LogOutOfRange("chain_log"));
        }
        if !(1..=10).contains(&self.search_log) {
            return Err(ParamError::LogOutOfRange("search_log"));
        }
        if !(10..=31).contains(&self.window_log) {
            return Err(ParamError::LogOutOfRange("window_log"));
        }
        if !(3..=7).contains(&self.min_match) {
            return Err(ParamError::MinMatchOutOfRange);
        }
        if !(4..=5).contains(&self.row_log) {
            return Err(ParamError::LogOutOfRange("row_log"));
        }
        Ok(())
    }

    /// `mls` clamped into the `4..=6` range the hash mixer actually supports.
    /// Real zstd clamps `searchParams.minMatch` the same way before forming
    /// the hash while still honouring the smaller value for emitted match
    /// length.
    #[inline]
    pub fn hash_mls(&self) -> u32 {
        self.min_match.clamp(4, 6)
    }
}
