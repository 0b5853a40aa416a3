//! Tests for rhizome-formula-expression.

use crate::{
    must_parse, parse_sexpr, parse_sexprs, parse_symbol, Expression, List, Namespace, ParseError,
    SourceContext, Symbol, Value, WireError, WireExpression, WireList, WireValue,
};

#[test]
fn test_symbol_grammar() {
    let sym = parse_symbol("abc").unwrap();
    assert_eq!(sym, Symbol::unqualified("abc"));
    assert!(sym.namespace().is_empty());

    let sym = parse_symbol(":hello").unwrap();
    assert_eq!(sym.name(), "hello");
    assert_eq!(sym.namespace(), &Namespace::KEYWORD);
    assert_eq!(sym.expression_string(), ":hello");

    let sym = parse_symbol("a:b").unwrap();
    assert_eq!(sym, Symbol::new("b", "a"));
    assert_eq!(sym.to_string(), "a:b");

    assert_eq!(parse_symbol("a::b").unwrap(), parse_symbol("a:b").unwrap());

    assert!(matches!(
        parse_symbol("::x"),
        Err(ParseError::BadSymbol { .. })
    ));
}

#[test]
fn test_symbol_name_keeps_later_colons() {
    let sym = parse_symbol("a:b:c").unwrap();
    assert_eq!(sym.namespace().as_str(), "a");
    assert_eq!(sym.name(), "b:c");
    assert_eq!(parse_symbol(&sym.to_string()).unwrap(), sym);
}

#[test]
fn test_symbol_parse_error_in_list_is_indexed() {
    let err = parse_sexpr("(a ::b)").unwrap_err();
    match err {
        ParseError::ListElement { index, at, .. } => {
            assert_eq!(index, 1);
            assert_eq!(at, SourceContext::new(1, 4));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_list_printing() {
    assert_eq!(must_parse("(1 2 a::b)").expression_string(), "(1 2 a:b)");
    assert_eq!(
        must_parse("(+ 4 (* 2.5 -3e5))").expression_string(),
        "(+ 4 (* 2.5 -300000))"
    );
    assert_eq!(must_parse("()").expression_string(), "()");
    assert_eq!(
        must_parse(r#"("quoted \"text\"" :kw)"#).expression_string(),
        r#"("quoted \"text\"" :kw)"#
    );
}

#[test]
fn test_scalar_printing() {
    assert_eq!(Expression::from_bool(true).expression_string(), "true");
    assert_eq!(Expression::from(7u32).expression_string(), "7");
    assert_eq!(Expression::from_f32(1.5).expression_string(), "1.5");
    assert_eq!(Expression::from_bytes(vec![1, 2, 3]).expression_string(), "[1 2 3]");
}

#[test]
fn test_extreme_floats_print_with_exponent() {
    assert_eq!(Expression::from_f64(1e21).expression_string(), "1e21");
    assert_eq!(Expression::from_f64(-1.5e-7).expression_string(), "-1.5e-7");
    assert_eq!(Expression::from_f64(0.0).expression_string(), "0");
    assert_eq!(must_parse("1e21").value(), &Value::Double(1e21));
    assert_eq!(must_parse(&Expression::from_f64(2.5e-9).expression_string()).value(), &Value::Double(2.5e-9));
}

#[test]
fn test_round_trip() {
    let cases = [
        "abc",
        ":hello",
        "a:b",
        "42",
        "-7",
        "2.5",
        r#""line\nbreak""#,
        "(1 2 (3 (4 five) \"six\") :seven ns:eight)",
        "()",
    ];
    for case in cases {
        let parsed = must_parse(case);
        let reparsed = parse_sexpr(&parsed.expression_string()).unwrap();
        assert_eq!(parsed, reparsed, "round trip of {case}");
        assert_eq!(reparsed.expression_string(), parsed.expression_string());
    }
}

#[test]
fn test_number_kinds() {
    assert_eq!(must_parse("123").value(), &Value::Int(123));
    assert_eq!(must_parse("1.0").value(), &Value::Double(1.0));
    assert!(matches!(
        parse_sexpr("99999999999999999999"),
        Err(ParseError::UnsupportedNumber { .. })
    ));
}

#[test]
fn test_symbol_accessor() {
    assert_eq!(must_parse("x").symbol(), Some(&Symbol::unqualified("x")));
    assert_eq!(must_parse("1").symbol(), None);
    assert_eq!(must_parse("(x)").symbol(), None);
}

#[test]
fn test_source_context_ignored_by_equality() {
    let parsed = must_parse("  foo");
    assert_eq!(parsed.source_context(), Some(&SourceContext::new(1, 3)));
    assert_eq!(parsed, Expression::from_symbol(Symbol::unqualified("foo")));
}

#[test]
fn test_list_tail_is_fresh() {
    let list = match must_parse("(a b c d)").into_value() {
        Value::List(list) => list,
        other => panic!("expected list, got {other}"),
    };
    let tail = list.tail(2);
    assert_eq!(tail.expression_string(), "(c d)");
    assert_eq!(list.tail(9), List::default());
    assert_eq!(list.len(), 4);
}

#[test]
fn test_parse_multiple() {
    let exprs = parse_sexprs("1 /* two */ (three) ; four").unwrap();
    assert_eq!(exprs.len(), 2);
    assert_eq!(exprs[1].expression_string(), "(three)");
}

#[test]
fn test_wire_matches_constructors() {
    assert_eq!(
        must_parse("1").to_wire().value,
        Expression::from_int(1).to_wire().value
    );
    assert_eq!(Expression::from_int(1).to_wire().value, Some(WireValue::Int64(1)));
    assert_eq!(Expression::from_f32(2.0).to_wire().value, Some(WireValue::Float(2.0)));
}

#[test]
fn test_wire_json_roundtrip() {
    let expr = must_parse("(if (ns:f 1 2.5 \"s\") :yes (x 7))");
    let json = serde_json::to_string(&expr).unwrap();
    let parsed: Expression = serde_json::from_str(&json).unwrap();
    assert_eq!(expr, parsed);
    assert_eq!(parsed.source_context(), expr.source_context());
}

#[test]
fn test_wire_integer_widths_collapse() {
    let json = r#"{"value": {"list": {"elements": [
        {"value": {"int32": -1}},
        {"value": {"sfixed64": 2}},
        {"value": {"fixed32": 3}},
        {"value": {"uint64": 4}}
    ]}}}"#;
    let expr: Expression = serde_json::from_str(json).unwrap();
    let list = expr.as_list().unwrap();
    assert_eq!(list.nth(0).unwrap().value(), &Value::Int(-1));
    assert_eq!(list.nth(1).unwrap().value(), &Value::Int(2));
    assert_eq!(list.nth(2).unwrap().value(), &Value::Int(3));
    assert_eq!(list.nth(3).unwrap().value(), &Value::Int(4));
}

#[test]
fn test_unsigned_wire_integers_round_trip_through_text() {
    let wire = WireExpression {
        source_context: None,
        value: Some(WireValue::Uint32(5)),
    };
    let expr = Expression::from_wire(wire).unwrap();
    assert_eq!(expr, Expression::from_int(5));
    assert_eq!(parse_sexpr(&expr.expression_string()).unwrap(), expr);
    assert_eq!(Expression::try_from(5u64).unwrap(), Expression::from_int(5));
    assert!(Expression::try_from(u64::MAX).is_err());
}

#[test]
fn test_unsigned_wire_integer_out_of_range() {
    let wire = WireExpression {
        source_context: None,
        value: Some(WireValue::Fixed64(u64::MAX)),
    };
    assert!(matches!(
        Expression::from_wire(wire),
        Err(WireError::IntegerOutOfRange { value: u64::MAX })
    ));
    let json = format!(r#"{{"value": {{"uint64": {}}}}}"#, i64::MAX as u64 + 1);
    assert!(serde_json::from_str::<Expression>(&json).is_err());
}

#[test]
fn test_wire_errors() {
    assert!(matches!(
        Expression::from_wire(WireExpression::default()),
        Err(WireError::MissingValue)
    ));

    let wire = WireExpression {
        source_context: None,
        value: Some(WireValue::List(WireList {
            elements: vec![Expression::from_int(1).to_wire(), WireExpression::default()],
        })),
    };
    let err = Expression::from_wire(wire).unwrap_err();
    assert!(matches!(err, WireError::ListElement { index: 1, .. }));
    assert!(err.to_string().contains("list[1]"));

    let unknown = r#"{"value": {"complex": [1, 2]}}"#;
    assert!(serde_json::from_str::<Expression>(unknown).is_err());
}

#[test]
fn test_from_impls() {
    let _: Expression = true.into();
    let _: Expression = 42i32.into();
    let _: Expression = 42u32.into();
    let _: Expression = 3.5f64.into();
    let _: Expression = "hello".into();
    let list: Expression = vec![Expression::from(1i64), Symbol::keyword("k").into()].into();
    assert_eq!(list.expression_string(), "(1 :k)");
}

#[test]
#[should_panic(expected = "failed to parse")]
fn test_must_parse_panics() {
    must_parse("(unbalanced");
}
