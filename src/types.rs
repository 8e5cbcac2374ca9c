// Copyright 2026-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of a symbol index.
//!
//! These types define what the index knows about a symbol: its identity, its
//! declaring scope, where it lives, and how often the workspace refers to it.
//! Everything here is an owned value record - a build of the index takes a
//! [`SymbolSlab`] and never mutates it afterwards, so all downstream
//! structures (posting lists, quality caches, lookup tables) can reference
//! symbols by plain integer index without lifetime gymnastics.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **SymbolId**: identifies a symbol across rebuilds. Equality is byte-wise;
//!   two slabs built from the same unchanged declaration carry the same id.
//! - **SymbolSlab**: at most one symbol per id. [`SymbolSlabBuilder`] enforces
//!   this (last insert wins), so engines may index by id without dedup logic.
//! - **Queries**: `FuzzyFindRequest::query` must not contain the scope
//!   separator `::` - scope filtering goes through `scopes`. Violating this is
//!   a caller bug, not a runtime condition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The substring that separates scope qualifiers from unqualified names.
///
/// Query text handed to [`SymbolIndex::fuzzy_find`] must never contain it;
/// use [`split_qualified_name`] on the caller side first.
pub const SCOPE_SEPARATOR: &str = "::";

// =============================================================================
// SYMBOL IDENTITY
// =============================================================================

/// Opaque fixed-size content hash identifying a symbol.
///
/// Stable across index rebuilds as long as the underlying declaration is
/// unchanged. The core never computes ids from source - the indexer supplies
/// them - but it does round-trip them through the hex text format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SymbolId(pub(crate) [u8; 8]);

impl SymbolId {
    /// Wrap raw hash bytes.
    #[inline]
    pub const fn new(raw: [u8; 8]) -> Self {
        SymbolId(raw)
    }

    /// The underlying hash bytes.
    #[inline]
    pub const fn raw(self) -> [u8; 8] {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Error parsing a [`SymbolId`] from its hex form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    input: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a 16-digit hex symbol id", self.input)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for SymbolId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseIdError {
            input: s.to_string(),
        };
        if s.len() != 16 || !s.is_ascii() {
            return Err(err());
        }
        let mut raw = [0u8; 8];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hex = std::str::from_utf8(chunk).map_err(|_| err())?;
            raw[i] = u8::from_str_radix(hex, 16).map_err(|_| err())?;
        }
        Ok(SymbolId(raw))
    }
}

impl Serialize for SymbolId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SymbolId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// SYMBOL FACTS
// =============================================================================

/// What kind of declaration a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Unknown,
    Keyword,
    Module,
    Namespace,
    NamespaceAlias,
    Macro,
    Enum,
    Struct,
    Class,
    Union,
    TypeAlias,
    Function,
    Method,
    Constructor,
    Destructor,
    Variable,
    Field,
    EnumConstant,
    Parameter,
    Using,
}

impl Default for SymbolKind {
    fn default() -> Self {
        SymbolKind::Unknown
    }
}

/// Source language the symbol was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolLanguage {
    Unknown,
    C,
    Cpp,
    ObjC,
    Swift,
}

impl Default for SymbolLanguage {
    fn default() -> Self {
        SymbolLanguage::Unknown
    }
}

/// Kind and language together, as the text format groups them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    #[serde(rename = "Kind", default)]
    pub kind: SymbolKind,
    #[serde(rename = "Lang", default)]
    pub lang: SymbolLanguage,
}

/// A line/column position, zero-based, as reported by the indexer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "Line")]
    pub line: u32,
    #[serde(rename = "Column")]
    pub column: u32,
}

/// A half-open source range inside one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolLocation {
    #[serde(rename = "FileURI")]
    pub file_uri: String,
    #[serde(rename = "Start")]
    pub start: Position,
    #[serde(rename = "End")]
    pub end: Position,
}

/// Where a symbol record came from.
///
/// Opaque provenance byte; the scorer never inspects it, but mergers and
/// debuggers do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SymbolOrigin(pub u8);

impl SymbolOrigin {
    pub const UNKNOWN: SymbolOrigin = SymbolOrigin(0);
    pub const AST: SymbolOrigin = SymbolOrigin(1 << 0);
    pub const DYNAMIC: SymbolOrigin = SymbolOrigin(1 << 1);
    pub const STATIC: SymbolOrigin = SymbolOrigin(1 << 2);
    pub const MERGE: SymbolOrigin = SymbolOrigin(1 << 3);
}

/// Per-symbol flag bitset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SymbolFlags(pub u8);

impl SymbolFlags {
    pub const NONE: SymbolFlags = SymbolFlags(0);
    /// The symbol is eligible for code-completion results.
    pub const INDEXED_FOR_COMPLETION: SymbolFlags = SymbolFlags(1 << 0);
    /// The declaration is marked deprecated.
    pub const DEPRECATED: SymbolFlags = SymbolFlags(1 << 1);
    /// The name is implementation-reserved (`_Upper` or leading `__`).
    pub const RESERVED_NAME: SymbolFlags = SymbolFlags(1 << 2);

    /// True if every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: SymbolFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`.
    #[inline]
    pub fn insert(&mut self, other: SymbolFlags) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for SymbolFlags {
    type Output = SymbolFlags;

    fn bitor(self, rhs: SymbolFlags) -> SymbolFlags {
        SymbolFlags(self.0 | rhs.0)
    }
}

/// An `#include` line that makes the symbol available, with how often the
/// workspace was seen using it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeHeader {
    #[serde(rename = "Header")]
    pub header: String,
    #[serde(rename = "References")]
    pub references: u32,
}

/// One known symbol: everything the index stores about a declaration.
///
/// Immutable once built. Owned by a [`SymbolSlab`]; engines refer to symbols
/// by slab position, never by pointer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Content-hash identity, stable across rebuilds.
    #[serde(rename = "ID")]
    pub id: SymbolId,
    /// Unqualified name, e.g. `push_back`.
    #[serde(rename = "Name")]
    pub name: String,
    /// Declaring scope qualifier including the trailing separator,
    /// e.g. `std::`. Empty for global symbols.
    #[serde(rename = "Scope", default)]
    pub scope: String,
    #[serde(rename = "SymInfo", default)]
    pub info: SymbolInfo,
    #[serde(rename = "CanonicalDeclaration", default)]
    pub canonical_declaration: Option<SymbolLocation>,
    #[serde(rename = "Definition", default)]
    pub definition: Option<SymbolLocation>,
    /// How many references the indexer observed across the workspace.
    #[serde(rename = "References", default)]
    pub references: u32,
    #[serde(rename = "Origin", default)]
    pub origin: SymbolOrigin,
    #[serde(rename = "Flags", default)]
    pub flags: SymbolFlags,
    /// Display signature, e.g. `(int x, int y) -> void`.
    #[serde(rename = "Signature", default)]
    pub signature: String,
    /// Snippet text appended to the name when completing, e.g. `(${1:x})`.
    #[serde(rename = "CompletionSnippetSuffix", default)]
    pub completion_snippet_suffix: String,
    #[serde(rename = "Documentation", default)]
    pub documentation: String,
    #[serde(rename = "ReturnType", default)]
    pub return_type: String,
    #[serde(rename = "IncludeHeaders", default)]
    pub include_headers: Vec<IncludeHeader>,
}

// =============================================================================
// REFERENCES / OCCURRENCES
// =============================================================================

/// Bitmask of occurrence kinds, used both on records and as a query filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct RefKind(pub u8);

impl RefKind {
    pub const UNKNOWN: RefKind = RefKind(0);
    pub const DECLARATION: RefKind = RefKind(1 << 0);
    pub const DEFINITION: RefKind = RefKind(1 << 1);
    pub const REFERENCE: RefKind = RefKind(1 << 2);
    pub const ALL: RefKind = RefKind(0b111);

    /// True if the masks share any bit.
    #[inline]
    pub const fn intersects(self, other: RefKind) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for RefKind {
    type Output = RefKind;

    fn bitor(self, rhs: RefKind) -> RefKind {
        RefKind(self.0 | rhs.0)
    }
}

/// One observed occurrence of a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ref {
    #[serde(rename = "Location")]
    pub location: SymbolLocation,
    #[serde(rename = "Kind", default)]
    pub kind: RefKind,
}

// =============================================================================
// SLAB: one build's worth of symbols
// =============================================================================

/// An immutable batch of symbols plus their occurrence table.
///
/// One slab backs one index build. Engines share it behind an `Arc` so a
/// rebuild can publish a new slab while in-flight queries finish against the
/// old one.
#[derive(Debug, Default)]
pub struct SymbolSlab {
    symbols: Vec<Symbol>,
    refs: std::collections::HashMap<SymbolId, Vec<Ref>>,
}

impl SymbolSlab {
    pub fn builder() -> SymbolSlabBuilder {
        SymbolSlabBuilder::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols, in insertion order. Positions are stable for the life of
    /// the slab - engines use them as internal handles.
    #[inline]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Occurrences recorded for `id`, empty if none.
    pub fn refs_for(&self, id: SymbolId) -> &[Ref] {
        self.refs.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over `(id, occurrences)` pairs.
    pub fn all_refs(
        &self,
    ) -> impl Iterator<Item = (SymbolId, &[Ref])> + '_ {
        self.refs.iter().map(|(id, refs)| (*id, refs.as_slice()))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }
}

/// Accumulates symbols and occurrences into a [`SymbolSlab`].
///
/// At most one symbol per id: inserting a duplicate replaces the earlier
/// record. This is the validation boundary - engines downstream assume ids
/// are unique.
#[derive(Debug, Default)]
pub struct SymbolSlabBuilder {
    symbols: Vec<Symbol>,
    by_id: std::collections::HashMap<SymbolId, usize>,
    refs: std::collections::HashMap<SymbolId, Vec<Ref>>,
}

impl SymbolSlabBuilder {
    /// Insert a symbol; a later insert with the same id wins.
    pub fn insert(&mut self, symbol: Symbol) {
        match self.by_id.get(&symbol.id) {
            Some(&slot) => self.symbols[slot] = symbol,
            None => {
                self.by_id.insert(symbol.id, self.symbols.len());
                self.symbols.push(symbol);
            }
        }
    }

    /// Record an occurrence of `id`.
    pub fn insert_ref(&mut self, id: SymbolId, reference: Ref) {
        self.refs.entry(id).or_default().push(reference);
    }

    pub fn build(self) -> SymbolSlab {
        SymbolSlab {
            symbols: self.symbols,
            refs: self.refs,
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// A fuzzy name query with optional scope/flag restrictions.
#[derive(Debug, Clone, Default)]
pub struct FuzzyFindRequest {
    /// Unqualified fuzzy name pattern. Must not contain [`SCOPE_SEPARATOR`].
    pub query: String,
    /// Restrict matches to symbols declared in any of these scopes. Empty
    /// means no restriction.
    pub scopes: Vec<String>,
    /// Only return symbols flagged [`SymbolFlags::INDEXED_FOR_COMPLETION`].
    pub restrict_for_code_completion: bool,
    /// Upper bound on returned candidates.
    pub max_candidate_count: usize,
}

/// Exact-id lookup.
#[derive(Debug, Clone, Default)]
pub struct LookupRequest {
    pub ids: Vec<SymbolId>,
}

/// Occurrence lookup for a set of symbols.
#[derive(Debug, Clone, Default)]
pub struct RefsRequest {
    pub ids: Vec<SymbolId>,
    /// Only occurrences whose kind intersects this mask are reported.
    pub filter: RefKind,
}

// =============================================================================
// THE INDEX CONTRACT
// =============================================================================

/// The uniform query contract both engines implement.
///
/// Results are delivered through callbacks so engines never clone symbols out
/// of the published build; a callback borrows the symbol for the duration of
/// the call only.
pub trait SymbolIndex {
    /// Run a fuzzy-find query, invoking `callback` for up to
    /// `req.max_candidate_count` symbols in descending combined-score order.
    ///
    /// `matcher` is the injected name scorer built from `req.query`; a
    /// candidate it rejects is never reported. Returns true when candidates
    /// had to be discarded because of the cap, i.e. more results may exist.
    ///
    /// # Panics
    ///
    /// If `req.query` contains [`SCOPE_SEPARATOR`] - that is a caller-side
    /// error, not a query result.
    fn fuzzy_find(
        &self,
        req: &FuzzyFindRequest,
        matcher: &dyn crate::matcher::NameMatcher,
        callback: &mut dyn FnMut(&Symbol),
    ) -> bool;

    /// Invoke `callback` exactly once for each requested id present in the
    /// index. Order is unspecified. No scoring.
    fn lookup(&self, req: &LookupRequest, callback: &mut dyn FnMut(&Symbol));

    /// Invoke `callback` for each occurrence of the requested symbols whose
    /// kind passes `req.filter`. Engines may degrade this to a no-op (with a
    /// log) when they don't index occurrences.
    fn refs(&self, req: &RefsRequest, callback: &mut dyn FnMut(&Ref));

    /// Rough resident size of the published build, in bytes.
    fn estimate_memory_usage(&self) -> usize;
}

/// Split `std::vector` into `("std::", "vector")`.
///
/// The front end uses this before building a [`FuzzyFindRequest`], since
/// query text itself must stay separator-free. A name without a separator
/// comes back with an empty scope.
pub fn split_qualified_name(qualified: &str) -> (&str, &str) {
    match qualified.rfind(SCOPE_SEPARATOR) {
        Some(pos) => (
            &qualified[..pos + SCOPE_SEPARATOR.len()],
            &qualified[pos + SCOPE_SEPARATOR.len()..],
        ),
        None => ("", qualified),
    }
}
