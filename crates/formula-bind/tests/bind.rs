//! Binding through the public API, the way downstream crates use it.

use rhizome_formula_bind::{bind_new, bind_record, AssociationList, BindError, Binder};
use rhizome_formula_expression::{must_parse, parse_sexpr, Expression, Symbol};

bind_record! {
    /// `(defn name (params...) body...)`
    #[derive(Debug, Default)]
    pub struct Defn {
        pub op: Symbol,
        pub name: Symbol,
        pub params: Vec<Symbol>,
        pub body: Vec<Expression> as "&rest",
    }
}

bind_record! {
    #[derive(Debug, Default)]
    pub struct Annotated {
        pub target: Symbol,
        pub options: AssociationList,
    }
}

#[test]
fn test_defn_shape() {
    let form = parse_sexpr("(defn add (a b) (+ a b) ; trailing\n)").unwrap();
    let defn: Defn = bind_new(&form).unwrap();

    assert_eq!(defn.name, Symbol::unqualified("add"));
    assert_eq!(
        defn.params,
        vec![Symbol::unqualified("a"), Symbol::unqualified("b")]
    );
    assert_eq!(defn.body.len(), 1);
    assert_eq!(defn.body[0].expression_string(), "(+ a b)");
    assert!(defn.body[0].source_context().is_some());
}

#[test]
fn test_defn_errors_name_the_field() {
    let err = bind_new::<Defn>(&must_parse("(defn add a)")).unwrap_err();
    match err {
        BindError::Field { field, index, .. } => {
            assert_eq!(field, "params");
            assert_eq!(index, 2);
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = bind_new::<Defn>(&must_parse("(defn add)")).unwrap_err();
    assert!(err.to_string().contains("want >=3"), "{err}");
}

#[test]
fn test_association_list_field() {
    let got: Annotated = bind_new(&must_parse(r#"(widget (:color "red" :size 3))"#)).unwrap();
    assert_eq!(got.target, Symbol::unqualified("widget"));
    assert_eq!(
        got.options.lookup_symbol(&Symbol::keyword("size")),
        Some(&Expression::from_int(3))
    );

    let err = bind_new::<Annotated>(&must_parse("(widget (:color))")).unwrap_err();
    match err {
        BindError::Field { source, .. } => {
            assert!(matches!(*source, BindError::OddAssociationList { len: 1, .. }))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_shared_record_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let text = format!("(defn f{i} (x) x)");
                bind_new::<Defn>(&must_parse(&text)).map(|defn| defn.name)
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let name = handle.join().unwrap().unwrap();
        assert_eq!(name.name(), format!("f{i}"));
    }
}

#[test]
fn test_explicit_registry() {
    let binder = Binder::new();
    let mut defn = Defn::default();
    binder
        .bind(&must_parse("(defn g () 1 2)"), &mut defn)
        .unwrap();
    assert!(defn.params.is_empty());
    assert_eq!(defn.body, vec![Expression::from_int(1), Expression::from_int(2)]);
}
