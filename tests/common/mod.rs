//! Shared fixtures for integration tests.

#![allow(dead_code)]

// Re-export canonical test utilities from symdex::testing
pub use symdex::testing::{make_symbol, slab_of, test_id};

use symdex::{FuzzyFindRequest, NameMatcher, SubsequenceMatcher, Symbol, SymbolIndex};

/// Run a fuzzy-find with the stock matcher, collecting names in rank order.
pub fn find_names(index: &dyn SymbolIndex, req: &FuzzyFindRequest) -> (Vec<String>, bool) {
    let matcher = SubsequenceMatcher::new(&req.query);
    let mut names = Vec::new();
    let more = index.fuzzy_find(req, &matcher, &mut |sym| names.push(sym.name.clone()));
    (names, more)
}

/// Brute-force expected ranking: matcher score x quality, descending, name
/// ascending on ties. The ground truth both engines must agree with.
pub fn expected_ranking(symbols: &[Symbol], query: &str, limit: usize) -> Vec<String> {
    let matcher = SubsequenceMatcher::new(query);
    let mut scored: Vec<(f32, String)> = symbols
        .iter()
        .filter_map(|sym| {
            matcher
                .match_name(&sym.name)
                .map(|score| (score * symdex::quality(sym), sym.name.clone()))
        })
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap()
            .then_with(|| a.1.cmp(&b.1))
    });
    scored.truncate(limit);
    scored.into_iter().map(|(_, name)| name).collect()
}
