//! Rule string tokenizer

use crate::error::ParseError;
use crate::rule::ast::LogicalConnective;
use once_cell::sync::Lazy;
use regex::Regex;

/// Identifiers, digit runs, comparator runs and single parentheses.
/// Anything between matches is either whitespace or dropped.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Alphabetic}_][\p{Alphabetic}\p{Nd}_]*|[0-9]+|[<>=!&|]+|[()]")
        .expect("token pattern is valid")
});

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    IntegerLiteral,
    Comparator,
    LogicalConnective(LogicalConnective),
    OpenParen,
    CloseParen,
}

/// One lexical unit with its literal text and byte offset in the rule string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: usize,
}

/// Split a rule string into tokens. Never fails: characters that cannot
/// start a token (quotes, commas, stray punctuation) are skipped.
pub fn tokenize(rule: &str) -> Vec<Token<'_>> {
    TOKEN_PATTERN
        .find_iter(rule)
        .map(|m| Token {
            kind: classify(m.as_str()),
            text: m.as_str(),
            offset: m.start(),
        })
        .collect()
}

/// Like [`tokenize`], but rejects any non-whitespace character that is
/// not part of a token.
pub fn tokenize_strict(rule: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for m in TOKEN_PATTERN.find_iter(rule) {
        check_gap(rule, cursor, m.start())?;
        tokens.push(Token {
            kind: classify(m.as_str()),
            text: m.as_str(),
            offset: m.start(),
        });
        cursor = m.end();
    }
    check_gap(rule, cursor, rule.len())?;

    Ok(tokens)
}

/// True if `text` lexes as exactly one identifier, which is what the parser
/// accepts as an attribute or a text literal.
pub fn is_word(text: &str) -> bool {
    TOKEN_PATTERN
        .find(text)
        .is_some_and(|m| m.start() == 0 && m.end() == text.len())
        && classify(text) == TokenKind::Identifier
}

fn check_gap(rule: &str, start: usize, end: usize) -> Result<(), ParseError> {
    match rule[start..end].char_indices().find(|(_, c)| !c.is_whitespace()) {
        Some((i, ch)) => Err(ParseError::UnexpectedCharacter {
            ch,
            offset: start + i,
        }),
        None => Ok(()),
    }
}

fn classify(text: &str) -> TokenKind {
    // The pattern guarantees a non-empty match
    let first = text.as_bytes()[0];
    match first {
        b'(' => TokenKind::OpenParen,
        b')' => TokenKind::CloseParen,
        b'0'..=b'9' => TokenKind::IntegerLiteral,
        b'<' | b'>' | b'=' | b'!' | b'&' | b'|' => TokenKind::Comparator,
        _ => match LogicalConnective::from_keyword(text) {
            Some(connective) => TokenKind::LogicalConnective(connective),
            None => TokenKind::Identifier,
        },
    }
}
