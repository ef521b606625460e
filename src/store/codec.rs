//! Structural JSON encoding of ASTs
//!
//! Nodes are listed in postfix order, so encoded size and decode work are
//! linear in the number of nodes whatever the tree depth.
//!
//! ```json
//! {"nodes": [
//!   {"type": "operand", "kind": "comparison", "attribute": "age",
//!    "comparator": ">", "literal": {"type": "integer", "value": 30}},
//!   {"type": "operand", "kind": "comparison", "attribute": "department",
//!    "comparator": "==", "literal": {"type": "text", "value": "Sales"}},
//!   {"type": "operator", "connective": "AND"}
//! ]}
//! ```

use crate::error::StoreError;
use crate::rule::AstNode;

pub fn encode(ast: &AstNode) -> Result<String, StoreError> {
    Ok(serde_json::to_string(ast)?)
}

pub fn decode(encoded: &str) -> Result<AstNode, StoreError> {
    Ok(serde_json::from_str(encoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{combine, parse, ComparatorKind, LiteralValue, Operand};

    #[test]
    fn test_round_trip_complex_rule() {
        let ast = parse(
            "((age > 30 AND department == Sales) OR (age < 25 AND department == Marketing)) \
             AND (salary > 50000 OR experience > 5)",
        )
        .unwrap();

        let decoded = decode(&encode(&ast).unwrap()).unwrap();
        assert_eq!(decoded, ast);
    }

    #[test]
    fn test_round_trip_combined_rules() {
        let rules: Vec<String> = (0..300)
            .map(|i| format!("(a{} > {} OR b{} == x)", i, i, i))
            .collect();
        let ast = combine(&rules).unwrap();

        let encoded = encode(&ast).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, ast);
        assert_eq!(encode(&decoded).unwrap(), encoded);
    }

    #[test]
    fn test_text_literal_must_be_a_word() {
        // "5" as text would come back as an integer once rendered and reparsed
        for text in ["5", "New York", "OR", ""] {
            let ast =
                AstNode::comparison("code", ComparatorKind::Equal, LiteralValue::Text(text.into()));
            assert!(matches!(encode(&ast), Err(StoreError::Encoding(_))), "encoded {:?}", text);
        }

        let json = r#"{"nodes": [{"type": "operand", "kind": "comparison", "attribute": "code",
            "comparator": "==", "literal": {"type": "text", "value": "5"}}]}"#;
        assert!(matches!(decode(json), Err(StoreError::Encoding(_))));
    }

    #[test]
    fn test_bare_integer_round_trip() {
        let ast = AstNode::Operand(Operand::Integer { value: 3 });
        assert_eq!(decode(&encode(&ast).unwrap()).unwrap(), ast);

        let negative = AstNode::Operand(Operand::Integer { value: -3 });
        assert!(matches!(encode(&negative), Err(StoreError::Encoding(_))));
    }

    #[test]
    fn test_decode_documented_shape() {
        let json = r#"{"nodes": [
            {"type": "operand", "kind": "comparison", "attribute": "age",
             "comparator": "<=", "literal": {"type": "integer", "value": 18}},
            {"type": "operand", "kind": "comparison", "attribute": "tier",
             "comparator": "!=", "literal": {"type": "text", "value": "gold"}},
            {"type": "operator", "connective": "OR"}
        ]}"#;

        let ast = decode(json).unwrap();
        assert_eq!(
            ast,
            AstNode::or(
                AstNode::comparison("age", ComparatorKind::LessEqual, 18),
                AstNode::comparison("tier", ComparatorKind::NotEqual, "gold"),
            )
        );
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(matches!(decode("{}"), Err(StoreError::Encoding(_))));
        assert!(matches!(decode("not json"), Err(StoreError::Encoding(_))));
        assert!(matches!(
            decode(r#"{"nodes": [{"type": "operator", "connective": "XOR"}]}"#),
            Err(StoreError::Encoding(_))
        ));
        assert!(matches!(
            decode(r#"{"nodes": [{"type": "operand", "kind": "comparison", "attribute": "a",
                      "comparator": "=", "literal": {"type": "integer", "value": 1}}]}"#),
            Err(StoreError::Encoding(_))
        ));
        // Nested form is not accepted
        assert!(matches!(
            decode(r#"{"type": "operand", "kind": "integer", "value": 1}"#),
            Err(StoreError::Encoding(_))
        ));
    }
}
