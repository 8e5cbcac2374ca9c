//! The inverted-index engine.
//!
//! `Dex` answers fuzzy-find queries without scanning the corpus. At build
//! time every symbol is scored once for quality, symbols are ranked by that
//! score, and each symbol's retrieval tokens are appended to posting lists in
//! rank order. That single decision - document ids assigned in descending
//! quality order - is what the whole query path leans on: posting lists are
//! ascending in id, therefore descending in quality, therefore the first K
//! ids drained from any boolean combination of lists are approximately the K
//! best-quality matches.
//!
//! ```text
//! SymbolSlab ──quality()──▶ ranked symbols ──tokens──▶ posting lists
//!                                                          │
//! query ──trigrams/scopes──▶ iterator tree ──consume──▶ candidates
//!                                                          │
//!                        matcher × cached quality ──▶ TopN ──▶ callback
//! ```
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **RANK_ORDER**: `quality[i] >= quality[j]` for all ids `i < j` within
//!    one build.
//! 2. **POSTING_SORTED**: every posting list is strictly ascending.
//! 3. **ATOMIC_PUBLISH**: a build is visible either entirely or not at all;
//!    queries snapshot one build and never observe a mix.

use crate::iterator::{consume, DocId, PostingList, QueryIterator};
use crate::matcher::NameMatcher;
use crate::scoring::quality;
use crate::top_n::TopN;
use crate::trigram::{generate_search_tokens, identifier_trigrams, Token};
use crate::types::{
    FuzzyFindRequest, LookupRequest, Ref, RefsRequest, Symbol, SymbolFlags, SymbolId, SymbolIndex,
    SymbolSlab, SCOPE_SEPARATOR,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, Once};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How many candidates the boolean stage hands to final scoring, per
/// requested result.
///
/// Retrieval draws `oversample x max_candidate_count` ids from the iterator
/// tree before the fuzzy matcher reorders them. The tree yields candidates
/// in quality order, but the final ranking multiplies in the name-match
/// score, so a symbol outside the quality-ordered prefix can still belong in
/// the top N. Oversampling bounds how often such a symbol is missed, at the
/// price of scoring more candidates; it is a recall/work trade, so it is a
/// visible knob ([`Dex::with_oversample`]) rather than a buried literal.
pub const DEFAULT_PRE_SCORING_OVERSAMPLE: usize = 100;

/// One complete, immutable build of the inverted index.
struct DexData {
    slab: Arc<SymbolSlab>,
    /// DocId -> slab position, in descending quality order.
    by_rank: Vec<u32>,
    /// DocId -> cached quality score. Aligned with `by_rank`.
    quality: Vec<f32>,
    lookup: HashMap<SymbolId, DocId>,
    postings: HashMap<Token, PostingList>,
}

impl DexData {
    fn build(slab: Arc<SymbolSlab>) -> DexData {
        #[cfg(feature = "parallel")]
        let scores: Vec<f32> = slab.symbols().par_iter().map(quality).collect();
        #[cfg(not(feature = "parallel"))]
        let scores: Vec<f32> = slab.symbols().iter().map(quality).collect();

        // RANK_ORDER: sort slab positions by quality, descending. The sort is
        // stable, so equal-quality symbols keep their slab order.
        let mut ranked: Vec<u32> = (0..slab.len() as u32).collect();
        ranked.sort_by_key(|&pos| {
            std::cmp::Reverse(crate::scoring::encode_float(scores[pos as usize]))
        });

        let mut by_rank = Vec::with_capacity(slab.len());
        let mut quality_by_rank = Vec::with_capacity(slab.len());
        let mut lookup = HashMap::with_capacity(slab.len());
        let mut postings: HashMap<Token, PostingList> = HashMap::new();

        for (rank, &pos) in ranked.iter().enumerate() {
            let sym = &slab.symbols()[pos as usize];
            by_rank.push(pos);
            quality_by_rank.push(scores[pos as usize]);
            lookup.insert(sym.id, rank as DocId);
            // POSTING_SORTED holds because ranks are appended in increasing
            // order and each token appears once per symbol.
            for token in generate_search_tokens(sym) {
                postings.entry(token).or_default().push(rank as DocId);
            }
        }

        DexData {
            slab,
            by_rank,
            quality: quality_by_rank,
            lookup,
            postings,
        }
    }

    #[inline]
    fn num_docs(&self) -> DocId {
        self.by_rank.len() as DocId
    }

    #[inline]
    fn symbol(&self, id: DocId) -> &Symbol {
        &self.slab.symbols()[self.by_rank[id as usize] as usize]
    }

    fn estimate_memory_usage(&self) -> usize {
        let mut bytes = self.lookup.len() * mem::size_of::<(SymbolId, DocId)>();
        bytes += self.quality.len() * mem::size_of::<f32>();
        bytes += self.by_rank.len() * mem::size_of::<u32>();
        for (token, list) in &self.postings {
            bytes += mem::size_of::<Token>() + token.value.len();
            bytes += list.len() * mem::size_of::<DocId>();
        }
        bytes
    }
}

/// Inverted-index symbol search engine.
///
/// Built from a [`SymbolSlab`]; rebuilt wholesale via [`Dex::rebuild`].
/// Queries and rebuilds may race freely - see the concurrency notes on
/// [`Dex::rebuild`].
pub struct Dex {
    published: RwLock<Arc<DexData>>,
    oversample: usize,
}

impl Dex {
    /// Build an index over `slab` with the default oversampling factor.
    pub fn build(slab: Arc<SymbolSlab>) -> Dex {
        Dex::with_oversample(slab, DEFAULT_PRE_SCORING_OVERSAMPLE)
    }

    /// Build with an explicit pre-scoring oversampling factor.
    pub fn with_oversample(slab: Arc<SymbolSlab>, oversample: usize) -> Dex {
        let data = DexData::build(slab);
        tracing::debug!(
            symbols = data.num_docs(),
            bytes = data.estimate_memory_usage(),
            "built inverted symbol index"
        );
        Dex {
            published: RwLock::new(Arc::new(data)),
            oversample,
        }
    }

    /// Replace the published build with one built from `slab`.
    ///
    /// All construction happens on local state; the write lock is held only
    /// for the pointer swap, so concurrent readers are never blocked behind
    /// build work. A query that started before the swap finishes against the
    /// build it snapshotted; one that starts after sees the new build -
    /// never a mix. If building ever fails upstream (e.g. the slab could not
    /// be loaded), nothing reaches this method and the previous build stays
    /// published.
    pub fn rebuild(&self, slab: Arc<SymbolSlab>) {
        let data = DexData::build(slab);
        tracing::debug!(
            symbols = data.num_docs(),
            bytes = data.estimate_memory_usage(),
            "rebuilt inverted symbol index"
        );
        *self.published.write() = Arc::new(data);
    }

    /// Clone the currently published build.
    fn snapshot(&self) -> Arc<DexData> {
        self.published.read().clone()
    }
}

impl SymbolIndex for Dex {
    /// Compile the query into an iterator tree, drain an oversampled prefix,
    /// then let the matcher and the quality cache fight over the top N.
    fn fuzzy_find(
        &self,
        req: &FuzzyFindRequest,
        matcher: &dyn NameMatcher,
        callback: &mut dyn FnMut(&Symbol),
    ) -> bool {
        assert!(
            !req.query.contains(SCOPE_SEPARATOR),
            "fuzzy_find query must not contain a scope separator; \
             split the qualifier into FuzzyFindRequest::scopes"
        );

        let data = self.snapshot();
        let mut top_level: Vec<QueryIterator<'_>> = Vec::new();

        // AND over the query's trigrams, restricted to trigrams the corpus
        // actually produced. Missing trigrams loosen the query rather than
        // emptying it; the matcher rejects false positives later.
        let trigram_leaves: Vec<QueryIterator<'_>> = identifier_trigrams(&req.query)
            .into_iter()
            .filter_map(|token| data.postings.get(&token))
            .map(|list| QueryIterator::leaf(list))
            .collect();
        if !trigram_leaves.is_empty() {
            top_level.push(QueryIterator::and(trigram_leaves));
        }

        // OR over the requested scopes.
        let scope_leaves: Vec<QueryIterator<'_>> = req
            .scopes
            .iter()
            .filter_map(|scope| data.postings.get(&Token::scope(scope.clone())))
            .map(|list| QueryIterator::leaf(list))
            .collect();
        if !scope_leaves.is_empty() {
            top_level.push(QueryIterator::or(scope_leaves));
        }

        // No usable terms: degrade to scanning everything, quality-first.
        let mut root = if top_level.is_empty() {
            QueryIterator::all(data.num_docs())
        } else {
            QueryIterator::and(top_level)
        };

        // The window never collapses to zero: a zero-candidate request still
        // has to report whether anything was available.
        let to_retrieve = self.oversample.saturating_mul(req.max_candidate_count.max(1));
        let candidates = consume(&mut root, to_retrieve);

        let mut more = false;
        let mut top: TopN<DocId> = TopN::new(req.max_candidate_count);
        for (id, boost) in candidates {
            let sym = data.symbol(id);
            if req.restrict_for_code_completion
                && !sym.flags.contains(SymbolFlags::INDEXED_FOR_COMPLETION)
            {
                continue;
            }
            let Some(name_score) = matcher.match_name(&sym.name) else {
                continue;
            };
            let final_score = name_score * data.quality[id as usize] * boost;
            if top.push(final_score, id) {
                more = true;
            }
        }

        for (_score, id) in top.into_sorted_vec() {
            callback(data.symbol(id));
        }
        more
    }

    fn lookup(&self, req: &LookupRequest, callback: &mut dyn FnMut(&Symbol)) {
        let data = self.snapshot();
        for id in &req.ids {
            if let Some(&rank) = data.lookup.get(id) {
                callback(data.symbol(rank));
            }
        }
    }

    /// Occurrences are not indexed by this engine; the linear engine serves
    /// them. Degraded on purpose: log once, return nothing.
    fn refs(&self, _req: &RefsRequest, _callback: &mut dyn FnMut(&Ref)) {
        static REFS_UNIMPLEMENTED: Once = Once::new();
        REFS_UNIMPLEMENTED
            .call_once(|| tracing::warn!("refs is not implemented by the inverted-index engine"));
    }

    fn estimate_memory_usage(&self) -> usize {
        self.snapshot().estimate_memory_usage()
    }
}

/// Validate RANK_ORDER and POSTING_SORTED on a built engine.
///
/// Test support; quadratic checks are fine at test corpus sizes.
#[cfg(any(test, debug_assertions))]
#[allow(dead_code)]
pub(crate) fn check_index_well_formed(dex: &Dex) -> bool {
    let data = dex.snapshot();

    for pair in data.quality.windows(2) {
        if pair[0] < pair[1] {
            return false;
        }
    }
    for list in data.postings.values() {
        if list.is_empty() {
            return false;
        }
        for pair in list.windows(2) {
            if pair[0] >= pair[1] {
                return false;
            }
        }
        if list.iter().any(|&id| id >= data.num_docs()) {
            return false;
        }
    }
    data.lookup.len() == data.by_rank.len()
}
