//! End-to-end behaviour of the public API: parse, combine, evaluate, persist.

use rule_engine_core::{
    combine, evaluate, parse, AstNode, ComparatorKind, EngineConfig, EvaluationError, LiteralKind, MemoryRuleStore,
    MissingAttributePolicy, ParseError, Record, RuleEngine, RuleEngineError, RuleStore,
    SqliteRuleStore, StoreError,
};

const EMPLOYEE_RULE: &str = "((age > 30 AND department == Sales) OR (age < 25 AND department == Marketing)) \
                             AND (salary > 50000 OR experience > 5)";

fn corpus() -> Vec<Record> {
    let mut records = Vec::new();
    for age in [20, 24, 30, 35, 50] {
        for department in ["Sales", "Marketing", "Engineering"] {
            for (salary, experience) in [(40000, 2), (60000, 3), (30000, 8), (90000, 10)] {
                records.push(
                    Record::new()
                        .with("age", age)
                        .with("department", department)
                        .with("salary", salary)
                        .with("experience", experience),
                );
            }
        }
    }
    records
}

#[test]
fn test_end_to_end_example() {
    let ast = parse(EMPLOYEE_RULE).unwrap();
    let record =
        Record::from_json(r#"{"age": 35, "department": "Sales", "salary": 60000, "experience": 3}"#)
            .unwrap();

    assert!(evaluate(&ast, &record).unwrap());
}

#[test]
fn test_precedence() {
    let ast = parse("a > 1 AND b > 2 OR c > 3").unwrap();
    let record = Record::new().with("a", 0).with("b", 0).with("c", 4);
    assert!(evaluate(&ast, &record).unwrap());
}

#[test]
fn test_parenthesis_override() {
    let grouped = parse("a > 1 OR (b > 2 AND c > 3)").unwrap();
    let record = Record::new().with("a", 0).with("b", 5).with("c", 0);
    assert!(!evaluate(&grouped, &record).unwrap());

    // Grouping the other way round changes the outcome for a > 1
    let regrouped = parse("(a > 1 OR b > 2) AND c > 3").unwrap();
    let record = Record::new().with("a", 5).with("b", 0).with("c", 0);
    assert!(evaluate(&grouped, &record).unwrap());
    assert!(!evaluate(&regrouped, &record).unwrap());
}

#[test]
fn test_round_trip_through_stores() {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = SqliteRuleStore::open(dir.path().join("rules.db")).unwrap();
    let memory = MemoryRuleStore::new();
    let stores: [&dyn RuleStore; 2] = [&memory, &sqlite];

    let rules = [
        EMPLOYEE_RULE,
        "age >= 30 AND department != Engineering",
        "salary <= 40000 OR experience == 8",
    ];

    for store in stores {
        for rule in rules {
            let ast = parse(rule).unwrap();
            let loaded = store.load(store.save(&ast).unwrap()).unwrap();

            assert_eq!(loaded, ast);
            for record in corpus() {
                assert_eq!(
                    evaluate(&loaded, &record).unwrap(),
                    evaluate(&ast, &record).unwrap()
                );
            }
        }
    }
}

#[test]
fn test_deeply_combined_rule_round_trips_through_stores() {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = SqliteRuleStore::open(dir.path().join("rules.db")).unwrap();
    let memory = MemoryRuleStore::new();
    let stores: [&dyn RuleStore; 2] = [&memory, &sqlite];

    let rules: Vec<String> = (0..1000).map(|i| format!("level{} >= {}", i, i)).collect();
    let combined = combine(&rules).unwrap();
    let passing: Record = (0..1000i64).map(|i| (format!("level{}", i), i)).collect();
    let failing = passing.clone().with("level999", 0);

    for store in stores {
        let loaded = store.load(store.save(&combined).unwrap()).unwrap();

        assert_eq!(loaded.leaf_count(), 1000);
        assert_eq!(loaded, combined);
        assert!(evaluate(&loaded, &passing).unwrap());
        assert!(!evaluate(&loaded, &failing).unwrap());
    }
}

#[test]
fn test_store_refuses_tree_that_does_not_reparse() {
    let memory = MemoryRuleStore::new();
    let ast = AstNode::comparison("city", ComparatorKind::Equal, "New York");

    assert!(matches!(memory.save(&ast), Err(StoreError::Encoding(_))));
    assert!(memory.is_empty().unwrap());
}

#[test]
fn test_combiner_is_conjunction() {
    let rules = [
        "age > 24",
        "department == Sales OR department == Marketing",
        "salary > 50000 OR experience > 5",
    ];
    let combined = combine(&rules).unwrap();
    let parsed: Vec<_> = rules.iter().map(|r| parse(r).unwrap()).collect();

    for record in corpus() {
        let expected = parsed
            .iter()
            .all(|ast| evaluate(ast, &record).unwrap());
        assert_eq!(evaluate(&combined, &record).unwrap(), expected);
    }
}

#[test]
fn test_empty_rule_set() {
    let rules: [&str; 0] = [];
    assert!(matches!(combine(&rules), Err(RuleEngineError::EmptyRuleSet)));
}

#[test]
fn test_missing_attribute() {
    let ast = parse("age > 30").unwrap();
    let err = evaluate(&ast, &Record::new()).unwrap_err();

    assert_eq!(
        err,
        EvaluationError::UnknownAttribute {
            attribute: "age".to_string()
        }
    );
    assert!(err.to_string().contains("age"));
}

#[test]
fn test_type_mismatch() {
    let ast = parse("department == 5").unwrap();
    let record = Record::new().with("department", "Sales");

    assert_eq!(
        evaluate(&ast, &record),
        Err(EvaluationError::TypeMismatch {
            attribute: "department".to_string(),
            expected: LiteralKind::Integer,
            actual: LiteralKind::Text,
        })
    );
}

#[test]
fn test_parse_errors_name_the_problem() {
    let cases = [
        ("age >", "age"),
        ("(age > 30", "parenthesis"),
        ("age > 30 )", "parenthesis"),
        ("age > 30 AND", "AND"),
        ("< 3", "<"),
        ("AND a > 1 b > 2", "AND"),
        ("a > 1 b > 2 OR", "'b' at offset 6"),
        ("a > 1 (AND b > 2)", "'(' at offset 6"),
        ("() a > 1", "found 0"),
    ];

    for (rule, needle) in cases {
        let err = parse(rule).unwrap_err();
        assert!(
            err.to_string().contains(needle),
            "'{}' gave '{}'",
            rule,
            err
        );
    }
    assert!(matches!(
        parse("age > 30 AND (salary > 1"),
        Err(ParseError::MismatchedParen { offset: 13 })
    ));
}

#[test]
fn test_engine_with_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("engine.json");
    std::fs::write(&config_path, r#"{"missing_attribute": "false"}"#).unwrap();

    let engine = RuleEngine::new(EngineConfig::from_path(&config_path).unwrap());
    assert_eq!(
        engine.config().missing_attribute,
        MissingAttributePolicy::False
    );

    let store = SqliteRuleStore::open(dir.path().join("rules.db")).unwrap();
    let id = engine.store_rule(&store, EMPLOYEE_RULE).unwrap();
    let ast = engine.retrieve_rule(&store, id).unwrap();

    // salary and experience are absent and therefore false
    let partial = Record::new().with("age", 35).with("department", "Sales");
    assert!(!engine.evaluate_rule(&ast, &partial).unwrap());
    assert_eq!(store.load_source(id).unwrap().as_deref(), Some(EMPLOYEE_RULE));

    store.delete(id).unwrap();
    assert!(matches!(
        engine.retrieve_rule(&store, id),
        Err(RuleEngineError::Store(StoreError::NotFound(_)))
    ));
}

#[test]
fn test_shared_ast_across_threads() {
    use std::sync::Arc;
    use std::thread;

    let ast = Arc::new(parse(EMPLOYEE_RULE).unwrap());
    let records = Arc::new(corpus());
    let expected: Vec<bool> = records
        .iter()
        .map(|r| evaluate(&ast, r).unwrap())
        .collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ast = Arc::clone(&ast);
            let records = Arc::clone(&records);
            thread::spawn(move || {
                records
                    .iter()
                    .map(|r| evaluate(&ast, r).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
