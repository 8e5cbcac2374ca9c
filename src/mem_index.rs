//! The linear-scan engine.
//!
//! `MemIndex` implements the same query contract as the inverted-index
//! engine by brute force: every query walks every symbol, applies the
//! scope and flag filters, asks the matcher, multiplies by cached quality
//! and feeds the selector. No posting lists, no iterator tree.
//!
//! It earns its keep twice: as the reference implementation the Dex engine
//! is tested against, and as the better choice for small corpora where
//! index-build overhead outweighs scan cost. Unlike Dex it also serves
//! occurrence lookups, straight from the slab's ref table.

use crate::matcher::NameMatcher;
use crate::scoring::quality;
use crate::top_n::TopN;
use crate::types::{
    FuzzyFindRequest, LookupRequest, Ref, RefsRequest, Symbol, SymbolFlags, SymbolId, SymbolIndex,
    SymbolSlab, SCOPE_SEPARATOR,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

/// One complete, immutable build of the linear engine.
struct MemData {
    slab: Arc<SymbolSlab>,
    /// SymbolId -> slab position.
    lookup: HashMap<SymbolId, u32>,
    /// Slab position -> cached quality score.
    quality: Vec<f32>,
}

impl MemData {
    fn build(slab: Arc<SymbolSlab>) -> MemData {
        let mut lookup = HashMap::with_capacity(slab.len());
        let mut cached = Vec::with_capacity(slab.len());
        for (pos, sym) in slab.symbols().iter().enumerate() {
            lookup.insert(sym.id, pos as u32);
            cached.push(quality(sym));
        }
        MemData {
            slab,
            lookup,
            quality: cached,
        }
    }

    fn estimate_memory_usage(&self) -> usize {
        self.lookup.len() * mem::size_of::<(SymbolId, u32)>()
            + self.quality.len() * mem::size_of::<f32>()
    }
}

/// Brute-force symbol search engine; drop-in substitute for the
/// inverted-index engine behind [`SymbolIndex`].
pub struct MemIndex {
    published: RwLock<Arc<MemData>>,
}

impl MemIndex {
    pub fn build(slab: Arc<SymbolSlab>) -> MemIndex {
        let data = MemData::build(slab);
        tracing::debug!(
            symbols = data.slab.len(),
            bytes = data.estimate_memory_usage(),
            "built linear symbol index"
        );
        MemIndex {
            published: RwLock::new(Arc::new(data)),
        }
    }

    /// Replace the published build. Same discipline as the Dex engine:
    /// construction happens off-lock, the write lock covers only the swap.
    pub fn rebuild(&self, slab: Arc<SymbolSlab>) {
        let data = MemData::build(slab);
        *self.published.write() = Arc::new(data);
    }

    fn snapshot(&self) -> Arc<MemData> {
        self.published.read().clone()
    }
}

impl SymbolIndex for MemIndex {
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
        let mut more = false;
        let mut top: TopN<u32> = TopN::new(req.max_candidate_count);

        for (pos, sym) in data.slab.symbols().iter().enumerate() {
            // Exact match against all requested scopes.
            if !req.scopes.is_empty() && !req.scopes.iter().any(|s| *s == sym.scope) {
                continue;
            }
            if req.restrict_for_code_completion
                && !sym.flags.contains(SymbolFlags::INDEXED_FOR_COMPLETION)
            {
                continue;
            }
            let Some(name_score) = matcher.match_name(&sym.name) else {
                continue;
            };
            if top.push(name_score * data.quality[pos], pos as u32) {
                more = true;
            }
        }

        for (_score, pos) in top.into_sorted_vec() {
            callback(&data.slab.symbols()[pos as usize]);
        }
        more
    }

    fn lookup(&self, req: &LookupRequest, callback: &mut dyn FnMut(&Symbol)) {
        let data = self.snapshot();
        for id in &req.ids {
            if let Some(&pos) = data.lookup.get(id) {
                callback(&data.slab.symbols()[pos as usize]);
            }
        }
    }

    fn refs(&self, req: &RefsRequest, callback: &mut dyn FnMut(&Ref)) {
        let data = self.snapshot();
        for id in &req.ids {
            for reference in data.slab.refs_for(*id) {
                if req.filter.intersects(reference.kind) {
                    callback(reference);
                }
            }
        }
    }

    fn estimate_memory_usage(&self) -> usize {
        self.snapshot().estimate_memory_usage()
    }
}
