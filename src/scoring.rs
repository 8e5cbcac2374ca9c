//! Scoring: how symbols get ranked.
//!
//! Two independent signal sets reduce to two scalars, combined
//! multiplicatively into the final rank key:
//!
//! - **Quality** ([`SymbolQualitySignals`]) is a property of the symbol alone
//!   - reference counts, deprecation, category. It is computed once per build
//!   and cached; the inverted index orders its posting lists by it.
//! - **Relevance** ([`SymbolRelevanceSignals`]) depends on the query - name
//!   match strength, accessibility at the use site, lexical scope of the
//!   request. It is accumulated per candidate per query.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! ## MULTIPLIER_DISCIPLINE
//! Every signal is a multiplicative factor on a base score of 1. Factors must
//! stay non-negative so scores stay comparable and [`sort_text`] stays
//! order-preserving.
//!
//! ## CONSTANTS
//! - References only help once `>= 3` (factor `ln(references)`). Below that
//!   the signal is noise: it would punish new code and missing data alike.
//! - Completion priority maps onto `(0, 2]` via `2 - min(80, p) / 40`.
//! - Deprecated and reserved names each cost a flat `x0.1`.
//! - Scope factors apply to code-completion queries only:
//!   Global x1, File x1.5, Class x2, Function x4.

use crate::types::{Symbol, SymbolFlags, SymbolKind};

// =============================================================================
// QUALITY
// =============================================================================

/// Coarse symbol category for quality weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolCategory {
    Unknown,
    Keyword,
    Namespace,
    Type,
    Function,
    Variable,
    Macro,
}

/// Map a declaration kind onto its scoring category.
pub fn categorize(kind: SymbolKind) -> SymbolCategory {
    match kind {
        SymbolKind::Keyword => SymbolCategory::Keyword,
        SymbolKind::Namespace | SymbolKind::NamespaceAlias | SymbolKind::Module => {
            SymbolCategory::Namespace
        }
        SymbolKind::Macro => SymbolCategory::Macro,
        SymbolKind::Enum
        | SymbolKind::Struct
        | SymbolKind::Class
        | SymbolKind::Union
        | SymbolKind::TypeAlias => SymbolCategory::Type,
        SymbolKind::Function
        | SymbolKind::Method
        | SymbolKind::Constructor
        | SymbolKind::Destructor => SymbolCategory::Function,
        SymbolKind::Variable
        | SymbolKind::Field
        | SymbolKind::EnumConstant
        | SymbolKind::Parameter => SymbolCategory::Variable,
        SymbolKind::Using | SymbolKind::Unknown => SymbolCategory::Unknown,
    }
}

/// True for implementation-reserved identifiers: `_Upper...` or `__...`.
pub fn is_reserved_name(name: &str) -> bool {
    let mut chars = name.chars();
    if chars.next() != Some('_') {
        return false;
    }
    matches!(chars.next(), Some(second) if second == '_' || second.is_ascii_uppercase())
}

/// Query-independent signals about a symbol's worth.
///
/// Accumulates with max/merge semantics from every available source (static
/// index facts, live completion facts), then reduces via [`evaluate`].
///
/// [`evaluate`]: SymbolQualitySignals::evaluate
#[derive(Debug, Clone)]
pub struct SymbolQualitySignals {
    pub deprecated: bool,
    pub reserved_name: bool,
    pub references: u32,
    pub category: SymbolCategory,
    /// Raw priority from the live completion engine, lower is better.
    /// Absent for purely static results.
    pub completion_priority: Option<u32>,
}

impl Default for SymbolQualitySignals {
    fn default() -> Self {
        SymbolQualitySignals {
            deprecated: false,
            reserved_name: false,
            references: 0,
            category: SymbolCategory::Unknown,
            completion_priority: None,
        }
    }
}

impl SymbolQualitySignals {
    /// Fold in facts from a static index symbol.
    pub fn merge_symbol(&mut self, sym: &Symbol) {
        self.references = self.references.max(sym.references);
        self.category = categorize(sym.info.kind);
        self.deprecated |= sym.flags.contains(SymbolFlags::DEPRECATED);
        self.reserved_name |=
            sym.flags.contains(SymbolFlags::RESERVED_NAME) || is_reserved_name(&sym.name);
    }

    /// Fold in facts from a live completion candidate.
    pub fn merge_completion(&mut self, candidate: &CompletionCandidate<'_>) {
        self.deprecated |= candidate.deprecated;
        self.completion_priority = match self.completion_priority {
            Some(current) => Some(current.min(candidate.priority)),
            None => Some(candidate.priority),
        };
    }

    /// Reduce to a single non-negative score.
    pub fn evaluate(&self) -> f32 {
        let mut score = 1.0f32;

        // This avoids a sharp gradient for tail symbols, and also neatly
        // avoids the question of whether 0 references means a bad symbol or
        // missing data.
        if self.references >= 3 {
            score *= (self.references as f32).ln();
        }

        if let Some(priority) = self.completion_priority {
            // Lower priority is better; 80 caps the penalty, 0 doubles.
            score *= 2.0 - priority.min(80) as f32 / 40.0;
        }

        if self.deprecated {
            score *= 0.1;
        }
        if self.reserved_name {
            score *= 0.1;
        }

        match self.category {
            // Usually relevant, but misses most signals.
            SymbolCategory::Keyword => score *= 10.0,
            SymbolCategory::Type | SymbolCategory::Function | SymbolCategory::Variable => {
                score *= 1.1
            }
            SymbolCategory::Namespace => score *= 0.8,
            SymbolCategory::Macro => score *= 0.2,
            SymbolCategory::Unknown => {}
        }

        score
    }
}

/// Quality of a static index symbol, evaluated in one step.
///
/// Engines call this once per symbol at build time and cache the result.
pub fn quality(sym: &Symbol) -> f32 {
    let mut signals = SymbolQualitySignals::default();
    signals.merge_symbol(sym);
    signals.evaluate()
}

// =============================================================================
// RELEVANCE
// =============================================================================

/// What kind of request is being scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Workspace search, go-to-definition, anything non-completion.
    Generic,
    /// Code completion at a cursor; scope proximity matters here.
    CodeComplete,
}

/// Narrowest-to-widest visibility of a declaration.
///
/// Variant order is load-bearing: `min` on two scopes picks the narrower one,
/// which is how merging multiple declarations works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessibleScope {
    FunctionScope,
    ClassScope,
    FileScope,
    GlobalScope,
}

/// One step of a declaration's enclosing-context chain, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Function,
    Method,
    Record,
    Namespace,
}

/// Linkage of the declaration, as far as visibility is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    Internal,
    External,
}

impl AccessibleScope {
    /// Classify a declaration from its enclosing contexts and linkage.
    ///
    /// The first function or method context wins; otherwise any record
    /// context makes it class-scoped; otherwise internal linkage pins it to
    /// the file; everything else is global.
    pub fn classify(contexts: &[ContextKind], linkage: Linkage) -> AccessibleScope {
        let mut in_class = false;
        for context in contexts {
            match context {
                ContextKind::Function | ContextKind::Method => {
                    return AccessibleScope::FunctionScope
                }
                ContextKind::Record => in_class = true,
                ContextKind::Namespace => {}
            }
        }
        if in_class {
            return AccessibleScope::ClassScope;
        }
        if linkage == Linkage::Internal {
            return AccessibleScope::FileScope;
        }
        AccessibleScope::GlobalScope
    }
}

/// Facts about a candidate coming from the live completion engine rather
/// than the static index.
#[derive(Debug, Clone)]
pub struct CompletionCandidate<'a> {
    /// Raw completion priority, lower is better.
    pub priority: u32,
    pub deprecated: bool,
    /// Not available or not accessible at the use site.
    pub forbidden: bool,
    /// The candidate has a declaration in the file being edited.
    pub declared_in_active_file: bool,
    /// Enclosing contexts of the declaration, innermost first.
    pub enclosing_contexts: &'a [ContextKind],
    pub linkage: Linkage,
}

/// Query-dependent signals about a candidate, built once per query per
/// candidate and reduced via [`evaluate`].
///
/// [`evaluate`]: SymbolRelevanceSignals::evaluate
#[derive(Debug, Clone)]
pub struct SymbolRelevanceSignals {
    /// Match strength from the injected fuzzy matcher, in `[0, 1]`.
    pub name_match: f32,
    /// Forces the score to exactly zero, overriding everything else.
    pub forbidden: bool,
    /// `1.0` if the symbol has a declaration in the file being edited,
    /// else `0.0`.
    pub proximity: f32,
    pub scope: AccessibleScope,
    pub query_kind: QueryKind,
}

impl Default for SymbolRelevanceSignals {
    fn default() -> Self {
        SymbolRelevanceSignals {
            name_match: 1.0,
            forbidden: false,
            proximity: 0.0,
            scope: AccessibleScope::GlobalScope,
            query_kind: QueryKind::Generic,
        }
    }
}

impl SymbolRelevanceSignals {
    /// Fold in facts from a static index symbol.
    ///
    /// Index results are assumed globally scoped; nothing to pick up yet.
    pub fn merge_symbol(&mut self, _sym: &Symbol) {}

    /// Fold in facts from a live completion candidate.
    pub fn merge_completion(&mut self, candidate: &CompletionCandidate<'_>) {
        self.forbidden |= candidate.forbidden;
        if candidate.declared_in_active_file {
            self.proximity = self.proximity.max(1.0);
        }
        self.scope = self.scope.min(AccessibleScope::classify(
            candidate.enclosing_contexts,
            candidate.linkage,
        ));
    }

    /// Reduce to a single non-negative score.
    pub fn evaluate(&self) -> f32 {
        if self.forbidden {
            return 0.0;
        }

        let mut score = 1.0f32;
        score *= self.name_match;

        // Proximity is [0,1]; fold into a multiplier in [1,2].
        score *= 1.0 + self.proximity;

        // Symbols like local variables may only be referenced within their
        // scope. Conversely if we're in that scope, it's likely we'll
        // reference them.
        if self.query_kind == QueryKind::CodeComplete {
            match self.scope {
                AccessibleScope::GlobalScope => {}
                AccessibleScope::FileScope => score *= 1.5,
                AccessibleScope::ClassScope => score *= 2.0,
                AccessibleScope::FunctionScope => score *= 4.0,
            }
        }

        score
    }
}

/// The final rank key: quality times relevance.
pub fn combined_score(quality: f32, relevance: f32) -> f32 {
    quality * relevance
}

// =============================================================================
// SORT-KEY ENCODING
// =============================================================================

/// Produces an integer that sorts in the same order as `value`.
/// That is: `a < b <==> encode_float(a) < encode_float(b)`.
///
/// IEEE-754 floats compare like sign-magnitude integers: positives map onto
/// the high half of the unsigned range, negatives onto the low half with
/// their order reversed.
pub fn encode_float(value: f32) -> u32 {
    const TOP_BIT: u32 = 1 << 31;
    let bits = value.to_bits();
    if bits & TOP_BIT != 0 {
        0u32.wrapping_sub(bits)
    } else {
        bits + TOP_BIT
    }
}

/// Encode `(score, name)` as a string whose lexicographic order is
/// (score descending, name ascending).
///
/// The score is negated, bit-encoded and hex-printed at fixed width, so
/// clients that can only sort strings (completion lists, most of them) still
/// see the right ranking. Example: `(0.5, "foo")` becomes `"41000000foo"`.
pub fn sort_text(score: f32, name: &str) -> String {
    format!("{:08x}{}", encode_float(-score), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SymbolInfo, SymbolLanguage};

    fn symbol_with(name: &str, kind: SymbolKind, references: u32, flags: SymbolFlags) -> Symbol {
        Symbol {
            name: name.into(),
            info: SymbolInfo {
                kind,
                lang: SymbolLanguage::Cpp,
            },
            references,
            flags,
            ..Symbol::default()
        }
    }

    #[test]
    fn test_references_only_boost_at_three_or_more() {
        let base = quality(&symbol_with("f", SymbolKind::Function, 0, SymbolFlags::NONE));
        let two = quality(&symbol_with("f", SymbolKind::Function, 2, SymbolFlags::NONE));
        let three = quality(&symbol_with("f", SymbolKind::Function, 3, SymbolFlags::NONE));
        let thousand = quality(&symbol_with("f", SymbolKind::Function, 1000, SymbolFlags::NONE));

        assert_eq!(base, two);
        assert!(three > two);
        assert!(thousand > three);
    }

    #[test]
    fn test_quality_monotone_in_references() {
        let mut previous = 0.0f32;
        for references in [3u32, 5, 10, 100, 10_000] {
            let score = quality(&symbol_with(
                "f",
                SymbolKind::Function,
                references,
                SymbolFlags::NONE,
            ));
            assert!(score >= previous, "references={references}");
            previous = score;
        }
    }

    #[test]
    fn test_deprecated_costs_a_factor_of_ten() {
        let clean = quality(&symbol_with("f", SymbolKind::Function, 100, SymbolFlags::NONE));
        let deprecated = quality(&symbol_with(
            "f",
            SymbolKind::Function,
            100,
            SymbolFlags::DEPRECATED,
        ));
        assert!((deprecated - clean * 0.1).abs() < 1e-6);
        assert!(deprecated < clean);
    }

    #[test]
    fn test_reserved_name_detected_and_penalized() {
        assert!(is_reserved_name("_Bool"));
        assert!(is_reserved_name("__builtin_expect"));
        assert!(!is_reserved_name("_lowercase"));
        assert!(!is_reserved_name("plain"));
        assert!(!is_reserved_name(""));
        assert!(!is_reserved_name("_"));

        let clean = quality(&symbol_with("size", SymbolKind::Function, 0, SymbolFlags::NONE));
        let reserved = quality(&symbol_with("_Size", SymbolKind::Function, 0, SymbolFlags::NONE));
        assert!(reserved < clean);
    }

    #[test]
    fn test_completion_priority_mapping() {
        let mut signals = SymbolQualitySignals::default();
        let contexts: [ContextKind; 0] = [];
        signals.merge_completion(&CompletionCandidate {
            priority: 0,
            deprecated: false,
            forbidden: false,
            declared_in_active_file: false,
            enclosing_contexts: &contexts,
            linkage: Linkage::External,
        });
        // Priority 0 doubles the score.
        assert!((signals.evaluate() - 2.0).abs() < 1e-6);

        signals.completion_priority = Some(80);
        assert!((signals.evaluate() - 0.0).abs() < 1e-6);
        // Priorities beyond 80 don't get worse.
        signals.completion_priority = Some(10_000);
        assert!((signals.evaluate() - 0.0).abs() < 1e-6);

        // Merging keeps the best (lowest) priority.
        signals.completion_priority = Some(60);
        signals.merge_completion(&CompletionCandidate {
            priority: 20,
            deprecated: false,
            forbidden: false,
            declared_in_active_file: false,
            enclosing_contexts: &contexts,
            linkage: Linkage::External,
        });
        assert_eq!(signals.completion_priority, Some(20));
    }

    #[test]
    fn test_forbidden_short_circuits_everything() {
        let signals = SymbolRelevanceSignals {
            name_match: 1.0,
            forbidden: true,
            proximity: 1.0,
            scope: AccessibleScope::FunctionScope,
            query_kind: QueryKind::CodeComplete,
        };
        assert_eq!(signals.evaluate(), 0.0);
    }

    #[test]
    fn test_proximity_doubles_at_most() {
        let near = SymbolRelevanceSignals {
            proximity: 1.0,
            ..SymbolRelevanceSignals::default()
        };
        let far = SymbolRelevanceSignals::default();
        assert!((near.evaluate() - 2.0 * far.evaluate()).abs() < 1e-6);
    }

    #[test]
    fn test_scope_boost_only_for_completion() {
        let completion = SymbolRelevanceSignals {
            scope: AccessibleScope::FunctionScope,
            query_kind: QueryKind::CodeComplete,
            ..SymbolRelevanceSignals::default()
        };
        let generic = SymbolRelevanceSignals {
            scope: AccessibleScope::FunctionScope,
            query_kind: QueryKind::Generic,
            ..SymbolRelevanceSignals::default()
        };
        assert!((completion.evaluate() - 4.0).abs() < 1e-6);
        assert!((generic.evaluate() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_narrower_scope_scores_higher_in_completion() {
        let score_for = |scope| {
            SymbolRelevanceSignals {
                scope,
                query_kind: QueryKind::CodeComplete,
                ..SymbolRelevanceSignals::default()
            }
            .evaluate()
        };
        let global = score_for(AccessibleScope::GlobalScope);
        let file = score_for(AccessibleScope::FileScope);
        let class = score_for(AccessibleScope::ClassScope);
        let function = score_for(AccessibleScope::FunctionScope);
        assert!(global < file && file < class && class < function);
    }

    #[test]
    fn test_scope_classification_walks_contexts() {
        use AccessibleScope::*;
        use ContextKind::*;

        assert_eq!(
            AccessibleScope::classify(&[Function, Record], Linkage::External),
            FunctionScope
        );
        assert_eq!(
            AccessibleScope::classify(&[Record, Namespace], Linkage::External),
            ClassScope
        );
        assert_eq!(
            AccessibleScope::classify(&[Namespace], Linkage::Internal),
            FileScope
        );
        assert_eq!(AccessibleScope::classify(&[], Linkage::External), GlobalScope);
        // Method contexts count as function scope.
        assert_eq!(
            AccessibleScope::classify(&[Method], Linkage::External),
            FunctionScope
        );
    }

    #[test]
    fn test_sort_text_orders_by_score_then_name() {
        // Higher score sorts first regardless of name.
        assert!(sort_text(1.0, "z") < sort_text(0.0, "a"));
        // Equal scores fall back to name, ascending.
        assert!(sort_text(0.0, "a") < sort_text(0.0, "z"));
    }

    #[test]
    fn test_sort_text_handles_sign_crossings() {
        let scores = [
            f32::INFINITY,
            100.0,
            1.0,
            0.5,
            0.0,
            -0.5,
            -1.0,
            -100.0,
            f32::NEG_INFINITY,
        ];
        for pair in scores.windows(2) {
            assert!(
                sort_text(pair[0], "x") < sort_text(pair[1], "x"),
                "{} should sort before {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_encode_float_preserves_order() {
        let values = [
            f32::NEG_INFINITY,
            -1.0e10,
            -2.5,
            -0.0,
            0.0,
            1.0e-10,
            1.0,
            3.5,
            f32::INFINITY,
        ];
        for pair in values.windows(2) {
            assert!(
                encode_float(pair[0]) <= encode_float(pair[1]),
                "{} vs {}",
                pair[0],
                pair[1]
            );
        }
        // -0.0 and 0.0 compare equal and must encode equal.
        assert_eq!(encode_float(-0.0), encode_float(0.0));
    }

    #[test]
    fn test_combined_score_is_product() {
        assert_eq!(combined_score(2.0, 3.0), 6.0);
        assert_eq!(combined_score(2.0, 0.0), 0.0);
    }
}
