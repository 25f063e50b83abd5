//! Lazy match-finding core for a zstd-style LZ77 block compressor.
//!
//! Given an input block and caller-owned match-state tables, [`parser::compress_block`]
//! emits a stream of `(literalLength, offsetCode, matchLength)` sequences via
//! [`seqstore::SeqStore`] that losslessly reconstructs the block. Entropy
//! coding, frame/block framing, and parameter selection all live outside
//! this crate — it is the match-finder and lazy parser only.

pub mod hash;
pub mod index;
pub mod matchlen;
pub mod matchstate;
pub mod params;
pub mod parser;
pub mod repcode;
pub mod seqstore;
pub mod window;

pub use matchstate::{DictContext, DictIndexRef, MatchState};
pub use params::{CParams, DictMode, ParamError, SearchMethod, Strategy};
pub use parser::compress_block;
pub use repcode::RepState;
pub use seqstore::SeqStore;
pub use window::Window;
