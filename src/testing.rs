//! Canonical test fixtures, shared by unit tests, integration tests and
//! benches.

#![allow(dead_code)]

use crate::types::{Symbol, SymbolId, SymbolInfo, SymbolKind, SymbolLanguage, SymbolSlab};
use std::sync::Arc;

/// Deterministic content hash for fixtures: FNV-1a over scope + name, so the
/// same (scope, name) pair always gets the same id - which is exactly the
/// stability property real ids have.
pub fn test_id(scope: &str, name: &str) -> SymbolId {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in scope.bytes().chain(name.bytes()) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    SymbolId::new(hash.to_be_bytes())
}

/// A function symbol with the given name, scope and reference count.
pub fn make_symbol(name: &str, scope: &str, references: u32) -> Symbol {
    Symbol {
        id: test_id(scope, name),
        name: name.into(),
        scope: scope.into(),
        info: SymbolInfo {
            kind: SymbolKind::Function,
            lang: SymbolLanguage::Cpp,
        },
        references,
        signature: "()".into(),
        return_type: "void".into(),
        ..Symbol::default()
    }
}

/// Collect symbols into a shareable slab.
pub fn slab_of(symbols: Vec<Symbol>) -> Arc<SymbolSlab> {
    let mut builder = SymbolSlab::builder();
    for sym in symbols {
        builder.insert(sym);
    }
    Arc::new(builder.build())
}
