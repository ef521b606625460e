//! Rule string parser
//!
//! Operator-precedence (shunting-yard) reduction over an operand stack and
//! an operator stack. AND binds tighter than OR, both associate to the left,
//! and parentheses override precedence.

use crate::error::ParseError;
use crate::rule::ast::{AstNode, ComparatorKind, LiteralValue, LogicalConnective, Operand};
use crate::rule::lexer::{tokenize, tokenize_strict, Token, TokenKind};
use smallvec::SmallVec;

/// Parse a rule string into an AST, skipping characters the lexer does not
/// recognise.
pub fn parse(rule: &str) -> Result<AstNode, ParseError> {
    parse_tokens(&tokenize(rule))
}

/// Parse a rule string, rejecting any character outside the rule grammar.
pub fn parse_strict(rule: &str) -> Result<AstNode, ParseError> {
    parse_tokens(&tokenize_strict(rule)?)
}

/// Operator stack entry; the offset locates the token for error reporting.
#[derive(Debug, Clone, Copy)]
enum StackEntry {
    Connective(LogicalConnective, usize),
    OpenParen(usize),
}

/// Build a single AST from a token sequence.
///
/// Tokens must alternate between terms (a comparison, a bare integer or a
/// parenthesised group) and connectives, starting and ending with a term.
pub fn parse_tokens(tokens: &[Token<'_>]) -> Result<AstNode, ParseError> {
    let mut operands: Vec<AstNode> = Vec::new();
    let mut operators: SmallVec<[StackEntry; 8]> = SmallVec::new();
    // true until a term has been read, and again after each connective or `(`
    let mut expect_term = true;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        match token.kind {
            TokenKind::Identifier | TokenKind::IntegerLiteral | TokenKind::OpenParen
                if !expect_term =>
            {
                return Err(unexpected(token));
            }
            TokenKind::Identifier => {
                operands.push(parse_comparison(tokens, i)?);
                expect_term = false;
                // attribute, comparator, literal
                i += 3;
                continue;
            }
            TokenKind::IntegerLiteral => {
                let value = parse_integer(token)?;
                operands.push(AstNode::Operand(Operand::Integer { value }));
                expect_term = false;
            }
            TokenKind::LogicalConnective(incoming) => {
                if expect_term {
                    return Err(ParseError::MissingOperand {
                        connective: incoming,
                        offset: token.offset,
                    });
                }
                while let Some(&StackEntry::Connective(top, offset)) = operators.last() {
                    if top.precedence() < incoming.precedence() {
                        break;
                    }
                    operators.pop();
                    reduce(&mut operands, top, offset)?;
                }
                operators.push(StackEntry::Connective(incoming, token.offset));
                expect_term = true;
            }
            TokenKind::OpenParen => operators.push(StackEntry::OpenParen(token.offset)),
            TokenKind::CloseParen if expect_term => {
                return Err(match operators.last() {
                    Some(&StackEntry::Connective(connective, offset)) => {
                        ParseError::MissingOperand { connective, offset }
                    }
                    // `()`
                    Some(StackEntry::OpenParen(_)) => ParseError::EmptyExpression { found: 0 },
                    None => ParseError::MismatchedParen {
                        offset: token.offset,
                    },
                });
            }
            TokenKind::CloseParen => loop {
                match operators.pop() {
                    Some(StackEntry::Connective(connective, offset)) => {
                        reduce(&mut operands, connective, offset)?
                    }
                    Some(StackEntry::OpenParen(_)) => break,
                    None => {
                        return Err(ParseError::MismatchedParen {
                            offset: token.offset,
                        })
                    }
                }
            },
            TokenKind::Comparator => return Err(unexpected(token)),
        }
        i += 1;
    }

    if expect_term {
        return Err(match operators.last() {
            Some(&StackEntry::Connective(connective, offset)) => {
                ParseError::MissingOperand { connective, offset }
            }
            Some(&StackEntry::OpenParen(offset)) => ParseError::MismatchedParen { offset },
            None => ParseError::EmptyExpression { found: 0 },
        });
    }

    while let Some(entry) = operators.pop() {
        match entry {
            StackEntry::Connective(connective, offset) => {
                reduce(&mut operands, connective, offset)?
            }
            StackEntry::OpenParen(offset) => return Err(ParseError::MismatchedParen { offset }),
        }
    }

    match (operands.pop(), operands.len()) {
        (Some(root), 0) => Ok(root),
        (None, _) => Err(ParseError::EmptyExpression { found: 0 }),
        (Some(_), rest) => Err(ParseError::EmptyExpression { found: rest + 1 }),
    }
}

/// Pop two operands and push them back joined by `connective`.
fn reduce(
    operands: &mut Vec<AstNode>,
    connective: LogicalConnective,
    offset: usize,
) -> Result<(), ParseError> {
    let missing = || ParseError::MissingOperand { connective, offset };
    let right = operands.pop().ok_or_else(missing)?;
    let left = operands.pop().ok_or_else(missing)?;
    operands.push(AstNode::operator(connective, left, right));
    Ok(())
}

/// Consume `attribute comparator literal` starting at `start`.
fn parse_comparison(tokens: &[Token<'_>], start: usize) -> Result<AstNode, ParseError> {
    let attribute = &tokens[start];
    let incomplete = |reason: String| ParseError::IncompleteComparison {
        attribute: attribute.text.to_string(),
        offset: attribute.offset,
        reason,
    };

    let comparator_token = tokens
        .get(start + 1)
        .ok_or_else(|| incomplete("missing comparator".to_string()))?;
    if comparator_token.kind != TokenKind::Comparator {
        return Err(incomplete(format!(
            "expected comparator, found '{}'",
            comparator_token.text
        )));
    }
    let comparator = ComparatorKind::from_symbol(comparator_token.text).ok_or_else(|| {
        incomplete(format!(
            "'{}' is not a valid comparator",
            comparator_token.text
        ))
    })?;

    let literal_token = tokens
        .get(start + 2)
        .ok_or_else(|| incomplete(format!("missing literal after '{}'", comparator)))?;
    let literal = match literal_token.kind {
        TokenKind::IntegerLiteral => LiteralValue::Integer(parse_integer(literal_token)?),
        TokenKind::Identifier => LiteralValue::Text(literal_token.text.to_string()),
        _ => return Err(unexpected(literal_token)),
    };

    Ok(AstNode::comparison(attribute.text, comparator, literal))
}

fn unexpected(token: &Token<'_>) -> ParseError {
    ParseError::UnexpectedToken {
        token: token.text.to_string(),
        offset: token.offset,
    }
}

fn parse_integer(token: &Token<'_>) -> Result<i64, ParseError> {
    token
        .text
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidInteger {
            text: token.text.to_string(),
            offset: token.offset,
        })
}
