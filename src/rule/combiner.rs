//! Multi-rule combination

use crate::error::{Result, RuleEngineError};
use crate::rule::ast::AstNode;
use crate::rule::parser::parse;

/// Parse every rule and join them left to right with AND:
/// `((r1 AND r2) AND r3) ...`. A single rule is returned unchanged.
pub fn combine<S: AsRef<str>>(rules: &[S]) -> Result<AstNode> {
    let asts = rules
        .iter()
        .map(|rule| parse(rule.as_ref()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    combine_asts(asts)
}

/// Fold already-parsed rules into a single conjunction.
pub fn combine_asts<I>(asts: I) -> Result<AstNode>
where
    I: IntoIterator<Item = AstNode>,
{
    asts.into_iter()
        .reduce(AstNode::and)
        .ok_or(RuleEngineError::EmptyRuleSet)
}
