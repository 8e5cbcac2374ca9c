//! Retrieval tokens: trigrams and scopes.
//!
//! The inverted index does not match names directly; it matches small tokens
//! derived from them. A symbol contributes every distinct lower-cased
//! three-character window of its unqualified name plus one token for its
//! declaring scope. Queries run through the same trigram generator, so a
//! query trigram can only hit posting lists that some symbol actually
//! produced.
//!
//! Names shorter than a trigram still need to be findable: they produce a
//! single degenerate trigram token holding the whole lower-cased name. An
//! empty name produces no trigram token at all (the scope token still makes
//! the symbol reachable through scope queries).

use crate::types::Symbol;
use std::collections::HashSet;

/// Discriminates the posting-list key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Three lower-cased characters of a name, or a whole name shorter than
    /// three characters.
    Trigram,
    /// The declaring scope string, verbatim.
    Scope,
}

/// A posting-list key. Equality and hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Token {
            kind,
            value: value.into(),
        }
    }

    pub fn trigram(value: impl Into<String>) -> Self {
        Token::new(TokenKind::Trigram, value)
    }

    pub fn scope(value: impl Into<String>) -> Self {
        Token::new(TokenKind::Scope, value)
    }
}

/// All distinct trigram tokens of `name`, in first-occurrence order.
///
/// Used for both index and query sides. Deduplicated so repeated windows
/// ("aaaa") don't produce duplicate postings for one symbol.
pub fn identifier_trigrams(name: &str) -> Vec<Token> {
    let lowered: Vec<char> = name.to_lowercase().chars().collect();
    if lowered.is_empty() {
        return Vec::new();
    }
    if lowered.len() < 3 {
        // Degenerate token: the whole short name.
        return vec![Token::trigram(lowered.into_iter().collect::<String>())];
    }

    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    for window in lowered.windows(3) {
        let value: String = window.iter().collect();
        if seen.insert(value.clone()) {
            tokens.push(Token::trigram(value));
        }
    }
    tokens
}

/// The tokens a symbol is indexed under: its name trigrams plus exactly one
/// scope token.
pub fn generate_search_tokens(sym: &Symbol) -> Vec<Token> {
    let mut tokens = identifier_trigrams(&sym.name);
    tokens.push(Token::scope(sym.scope.clone()));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigram_values(name: &str) -> Vec<String> {
        identifier_trigrams(name)
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_trigrams_slide_over_the_name() {
        assert_eq!(trigram_values("vector"), ["vec", "ect", "cto", "tor"]);
    }

    #[test]
    fn test_trigrams_are_lowercased() {
        assert_eq!(trigram_values("FooBar"), ["foo", "oob", "oba", "bar"]);
    }

    #[test]
    fn test_trigrams_deduplicate() {
        // "aaaa" has two identical windows.
        assert_eq!(trigram_values("aaaa"), ["aaa"]);
        assert_eq!(trigram_values("abcabc"), ["abc", "bca", "cab"]);
    }

    #[test]
    fn test_short_names_produce_degenerate_token() {
        assert_eq!(trigram_values("ab"), ["ab"]);
        assert_eq!(trigram_values("X"), ["x"]);
    }

    #[test]
    fn test_empty_name_produces_no_trigrams() {
        assert!(trigram_values("").is_empty());
    }

    #[test]
    fn test_exactly_three_chars_is_one_window() {
        assert_eq!(trigram_values("abc"), ["abc"]);
    }

    #[test]
    fn test_search_tokens_include_one_scope_token() {
        let sym = Symbol {
            name: "vector".into(),
            scope: "std::".into(),
            ..Symbol::default()
        };
        let tokens = generate_search_tokens(&sym);
        let scopes: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Scope)
            .collect();
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].value, "std::");
        assert!(tokens.contains(&Token::trigram("vec")));
    }

    #[test]
    fn test_global_scope_token_is_empty_string() {
        let sym = Symbol {
            name: "main".into(),
            ..Symbol::default()
        };
        let tokens = generate_search_tokens(&sym);
        assert!(tokens.contains(&Token::scope("")));
    }
}
