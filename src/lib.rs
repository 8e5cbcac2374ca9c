//! In-memory fuzzy symbol search for code intelligence.
//!
//! Given a fuzzy name query (plus optional scope and kind filters), symdex
//! returns the best-matching known symbols - functions, types, variables -
//! ranked by a quality x relevance score. It powers completion,
//! go-to-definition and workspace search for a language-server front end,
//! with an indexer periodically rebuilding the corpus underneath concurrent
//! queries.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌──────────────┐    ┌──────────┐
//! │ types.rs │───▶│ trigram.rs│───▶│    dex.rs    │───▶│ top_n.rs │
//! │ (Symbol, │    │ (tokens)  │    │ (build, find)│    │ (best N) │
//! │   slab)  │    └───────────┘    └──────┬───────┘    └──────────┘
//! └────┬─────┘                            │
//!      │          ┌───────────┐    ┌──────▼───────┐
//!      └─────────▶│ scoring.rs│    │ iterator.rs  │
//!                 │ (quality, │    │ (AND/OR/TRUE │
//!                 │ relevance)│    │  over lists) │
//!                 └───────────┘    └──────────────┘
//! ```
//!
//! Two engines answer the same [`SymbolIndex`] contract: [`Dex`] compiles
//! queries against a trigram inverted index whose posting lists are ordered
//! by symbol quality, and [`MemIndex`] scans linearly - the reference
//! implementation and the sane choice for small corpora. Both publish
//! immutable builds behind an atomic swap, so rebuilds never block or tear
//! running queries.
//!
//! The fuzzy name scorer itself is a boundary, not a feature: engines accept
//! any [`NameMatcher`] and only rely on its exclude-or-score contract.
//!
//! # Usage
//!
//! ```ignore
//! use symdex::{Dex, FuzzyFindRequest, SubsequenceMatcher, SymbolIndex};
//!
//! let slab = std::sync::Arc::new(load_symbols()?);
//! let index = Dex::build(slab);
//!
//! let req = FuzzyFindRequest {
//!     query: "vec".into(),
//!     scopes: vec!["std::".into()],
//!     max_candidate_count: 20,
//!     ..FuzzyFindRequest::default()
//! };
//! let matcher = SubsequenceMatcher::new(&req.query);
//! let more = index.fuzzy_find(&req, &matcher, &mut |sym| {
//!     println!("{}{}", sym.scope, sym.name);
//! });
//! ```

mod dex;
mod iterator;
mod matcher;
mod mem_index;
mod scoring;
mod slab_io;
pub mod testing;
mod top_n;
mod trigram;
mod types;

pub use dex::{Dex, DEFAULT_PRE_SCORING_OVERSAMPLE};
pub use iterator::{consume, DocId, PostingList, QueryIterator, DEFAULT_BOOST_SCORE};
pub use matcher::{NameMatcher, SubsequenceMatcher};
pub use mem_index::MemIndex;
pub use scoring::{
    categorize, combined_score, encode_float, is_reserved_name, quality, sort_text,
    AccessibleScope, CompletionCandidate, ContextKind, Linkage, QueryKind, SymbolCategory,
    SymbolQualitySignals, SymbolRelevanceSignals,
};
pub use slab_io::{
    read_slab, read_slab_file, write_slab_binary, write_slab_json, SlabError, MAGIC, VERSION,
};
pub use top_n::TopN;
pub use trigram::{generate_search_tokens, identifier_trigrams, Token, TokenKind};
pub use types::{
    split_qualified_name, FuzzyFindRequest, IncludeHeader, LookupRequest, ParseIdError, Position,
    Ref, RefKind, RefsRequest, Symbol, SymbolFlags, SymbolId, SymbolIndex, SymbolInfo, SymbolKind,
    SymbolLanguage, SymbolLocation, SymbolOrigin, SymbolSlab, SymbolSlabBuilder, SCOPE_SEPARATOR,
};
