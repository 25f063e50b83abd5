//! The `ms` aggregate: per-session match-finding state.
//!
//! Ties a [`CParams`]-sized index (HC, BT, or Row) to the dict-mode that
//! governs how dictionary candidates, if any, are folded into a search.
//! `DictMode::None` and `DictMode::ExtDict` need nothing extra here — the
//! [`Window`] passed into every search already resolves prefix/dict
//! addressing transparently — so only `DictMatchState` and
//! `DedicatedDictSearch` need a second, explicitly-passed index to search.
//!
//! Unlike the reference's `dictMatchState` field (a raw pointer to another
//! `ZSTD_matchState_t` embedded in the struct), this crate passes the
//! attached dictionary's index as an explicit [`DictContext`] argument to
//! the handful of calls that need it, rather than storing a self-referential
//! pointer inside `MatchState`. Ownership stays plain borrowing; it changes
//! nothing about which candidates are found.

use crate::index::binary_tree::BinaryTreeIndex;
use crate::index::dedicated_dict::DedicatedDictIndex;
use crate::index::hash_chain::HashChainIndex;
use crate::index::row_hash::RowHashIndex;
use crate::index::MatchCandidate;
use crate::params::{CParams, DictMode, ParamError, SearchMethod};
use crate::window::Window;

enum IndexVariant {
    HashChain(HashChainIndex),
    BinaryTree(BinaryTreeIndex),
    RowHash(RowHashIndex),
}

impl IndexVariant {
    fn next_to_update(&self) -> u32 {
        match self {
            IndexVariant::HashChain(i) => i.next_to_update,
            IndexVariant::BinaryTree(i) => i.next_to_update,
            IndexVariant::RowHash(i) => i.next_to_update,
        }
    }

    fn find_best_match(
        &mut self,
        window: &Window,
        ip: u32,
        cparams: &CParams,
        i_limit: u32,
    ) -> MatchCandidate {
        match self {
            IndexVariant::HashChain(i) => i.find_best_match(window, ip, cparams, i_limit),
            IndexVariant::BinaryTree(i) => i.find_best_match(window, ip, cparams, i_limit),
            IndexVariant::RowHash(i) => i.find_best_match(window, ip, cparams, i_limit),
        }
    }
}

/// The dictionary-side index paired with the window it was built over, for
/// the two dict modes that need a second search.
pub enum DictIndexRef<'d> {
    HashChain(&'d HashChainIndex),
    BinaryTree(&'d BinaryTreeIndex),
    RowHash(&'d RowHashIndex),
    Dedicated(&'d DedicatedDictIndex),
}

pub struct DictContext<'d> {
    pub window: Window<'d>,
    pub index: DictIndexRef<'d>,
}

impl<'d> DictContext<'d> {
    pub fn new(window: Window<'d>, index: DictIndexRef<'d>) -> Self {
        DictContext { window, index }
    }
}

/// Per-session match-finding state: the selected index plus the
/// `cParams`/`searchMethod`/`dictMode` tuple that keyed its construction.
pub struct MatchState {
    pub cparams: CParams,
    pub search_method: SearchMethod,
    pub dict_mode: DictMode,
    index: IndexVariant,
}

impl MatchState {
    /// Validates `cparams`, rejects the one unsupported `(dict_mode,
    /// search_method)` cell (dedicated-dict-search with the binary-tree
    /// method), and allocates zero-initialized backing tables.
    pub fn new(
        cparams: CParams,
        search_method: SearchMethod,
        dict_mode: DictMode,
    ) -> Result<Self, ParamError> {
        cparams.validate()?;
        if dict_mode == DictMode::DedicatedDictSearch && search_method == SearchMethod::BinaryTree
        {
            return Err(ParamError::UnsupportedDictSearchCombination);
        }
        let index = match search_method {
            SearchMethod::HashChain => IndexVariant::HashChain(HashChainIndex::new(&cparams)),
            SearchMethod::BinaryTree => IndexVariant::BinaryTree(BinaryTreeIndex::new(&cparams)),
            SearchMethod::RowHash => IndexVariant::RowHash(RowHashIndex::new(&cparams)),
        };
        Ok(MatchState {
            cparams,
            search_method,
            dict_mode,
            index,
        })
    }

    /// Monotone counter shared by the parser's update-before-search
    /// invariant.
    pub fn next_to_update(&self) -> u32 {
        self.index.next_to_update()
    }

    /// Prefix-only (or `ExtDict`, which the window already resolves) search.
    pub fn find_best_match(&mut self, window: &Window, ip: u32, i_limit: u32) -> MatchCandidate {
        self.index.find_best_match(window, ip, &self.cparams, i_limit)
    }

    /// Search combining the prefix-side index with an attached dictionary's
    /// index. Required for `DictMode::DictMatchState` and
    /// `DictMode::DedicatedDictSearch`; callers in `DictMode::None`/`ExtDict`
    /// never need this.
    pub fn find_best_match_with_dict(
        &mut self,
        window: &Window,
        ip: u32,
        i_limit: u32,
        dict: &DictContext,
    ) -> MatchCandidate {
        match (&mut self.index, &dict.index) {
            (IndexVariant::HashChain(i), DictIndexRef::HashChain(di)) => i
                .find_best_match_dict_augmented(
                    window,
                    ip,
                    &self.cparams,
                    i_limit,
                    di,
                    &dict.window,
                ),
            (IndexVariant::BinaryTree(i), DictIndexRef::BinaryTree(di)) => i
                .find_best_match_dict_augmented(
                    window,
                    ip,
                    &self.cparams,
                    i_limit,
                    di,
                    &dict.window,
                ),
            (IndexVariant::RowHash(i), DictIndexRef::RowHash(di)) => i
                .find_best_match_dict_augmented(
                    window,
                    ip,
                    &self.cparams,
                    i_limit,
                    di,
                    &dict.window,
                ),
            (IndexVariant::HashChain(i), DictIndexRef::Dedicated(dds)) => {
                let prefix_best = i.find_best_match(window, ip, &self.cparams, i_limit);
                let dict_best = dds.find_best_match(window, ip, &self.cparams, &dict.window);
                if dict_best.length > prefix_best.length {
                    dict_best
                } else {
                    prefix_best
                }
            }
            (IndexVariant::RowHash(i), DictIndexRef::Dedicated(dds)) => {
                let prefix_best = i.find_best_match(window, ip, &self.cparams, i_limit);
                let dict_best = dds.find_best_match(window, ip, &self.cparams, &dict.window);
                if dict_best.length > prefix_best.length {
                    dict_best
                } else {
                    prefix_best
                }
            }
            // BT+Dedicated is rejected at construction; any other pairing
            // means the caller built a DictContext inconsistent with this
            // MatchState's search method. Fall back to the prefix-only
            // search rather than panic.
            _ => {
                debug_assert!(false, "DictContext kind does not match MatchState's search method");
                self.index.find_best_match(window, ip, &self.cparams, i_limit)
            }
        }
    }
}
