use super::{BinaryOp, Expr, parse};

fn canonical(source: &str) -> String {
    parse(source).unwrap().to_string()
}

#[test]
fn simple_feature() {
    insta::assert_snapshot!(parse("attribute(popularity)").unwrap().dump(), @r"
    Ref attribute()
      Ref popularity
    ");
}

#[test]
fn feature_with_output_and_arguments() {
    insta::assert_snapshot!(parse("fieldMatch(title, 2).completeness").unwrap().dump(), @r"
    Ref fieldMatch() .completeness
      Ref title
      Number 2
    ");
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    insta::assert_snapshot!(parse("a + b * 2").unwrap().dump(), @r"
    Binary +
      Ref a
      Binary *
        Ref b
        Number 2
    ");
}

#[test]
fn power_is_right_associative() {
    let expr = parse("a ^ b ^ c").unwrap();

    let Expr::Binary(BinaryOp::Pow, left, right) = expr else {
        panic!("expected power");
    };
    assert_eq!(*left, Expr::ident("a"));
    assert!(matches!(*right, Expr::Binary(BinaryOp::Pow, _, _)));
}

#[test]
fn subtraction_is_left_associative() {
    let expr = parse("a - b - c").unwrap();

    let Expr::Binary(BinaryOp::Sub, left, _) = expr else {
        panic!("expected subtraction");
    };
    assert!(matches!(*left, Expr::Binary(BinaryOp::Sub, _, _)));
}

#[test]
fn logical_and_comparison_levels() {
    insta::assert_snapshot!(parse("!a && b < 1 || c").unwrap().dump(), @r"
    Binary ||
      Binary &&
        Unary !
          Ref a
        Binary <
          Ref b
          Number 1
      Ref c
    ");
}

#[test]
fn canonical_spacing() {
    assert_eq!(canonical("a+b*2"), "a + b * 2");
    assert_eq!(canonical("if( x >0 , 1,  -1 )"), "if(x > 0,1,-1)");
    assert_eq!(canonical("f ( )"), "f()");
}

#[test]
fn source_parentheses_are_kept() {
    assert_eq!(canonical("(a+b)*c"), "(a + b) * c");
    assert_eq!(canonical("(a*b)+c"), "(a * b) + c");
    assert_eq!(canonical("a-(b-c)"), "a - (b - c)");
}

#[test]
fn display_round_trips() {
    for source in [
        "attribute(x) * 2 + fieldMatch(title).completeness",
        "-a ^ b ^ c",
        "--a",
        "a - -b",
        "if(query(threshold) < 0.5,bm25(title),nativeRank)",
        "expressionRef(f@deadbeef) % 3",
        r#"term("x y").weight"#,
        "map(attribute(t),f(x)(x * 2))",
        "reduce(tensor<float>(x[2],y{}):{a:[1,2],b:[.5,query(q)]},sum,x)",
        "tensor(x[3])(x + 1) * 2",
    ] {
        let first = parse(source).unwrap();
        let second = parse(&first.to_string()).unwrap();
        assert_eq!(first, second, "{source}");
    }
}

#[test]
fn synthesized_trees_get_needed_parentheses() {
    let sum = Expr::Binary(
        BinaryOp::Add,
        Box::new(Expr::ident("a")),
        Box::new(Expr::ident("b")),
    );
    let product = Expr::Binary(BinaryOp::Mul, Box::new(sum), Box::new(Expr::number("2")));

    assert_eq!(product.to_string(), "(a + b) * 2");
}

#[test]
fn dotted_outputs() {
    assert_eq!(canonical("onnx(m).out.0"), "onnx(m).out.0");
    assert_eq!(canonical("nativeRank.foo"), "nativeRank.foo");
}

#[test]
fn empty_input_is_an_error() {
    let err = parse("").unwrap_err();

    assert!(err.message.contains("expected expression"));
    assert_eq!(err.span, 0..0);
}

#[test]
fn trailing_tokens_are_an_error() {
    let err = parse("a b").unwrap_err();

    assert_eq!(err.span, 2..3);
}

#[test]
fn unclosed_call_is_an_error() {
    let err = parse("f(a, b").unwrap_err();

    assert!(err.message.contains("`,` or `)`"));
}

#[test]
fn missing_output_name_is_an_error() {
    assert!(parse("f(a).").is_err());
}

#[test]
fn deep_nesting_is_rejected() {
    let source = format!("{}a{}", "(".repeat(1000), ")".repeat(1000));

    let err = parse(&source).unwrap_err();

    assert!(err.message.contains("nested too deeply"));
}

#[test]
fn leading_dot_numbers() {
    assert_eq!(canonical("0.5 + .5"), "0.5 + .5");
    assert_eq!(canonical("f(a).0"), "f(a).0");
}

#[test]
fn lambda_argument() {
    insta::assert_snapshot!(parse("map(attribute(t), f(x)(x * 2))").unwrap().dump(), @r"
    Ref map()
      Ref attribute()
        Ref t
      Lambda x
        Binary *
          Ref x
          Number 2
    ");
}

#[test]
fn lambda_with_several_parameters() {
    assert_eq!(canonical("join(a, b, f(x, y)(x+y))"), "join(a,b,f(x,y)(x + y))");
}

#[test]
fn function_call_named_f_is_not_a_lambda() {
    let expr = parse("f(a) + 1").unwrap();

    let Expr::Binary(BinaryOp::Add, left, _) = expr else {
        panic!("expected addition");
    };
    assert!(matches!(*left, Expr::Ref(_)));
}

#[test]
fn dense_tensor_literal() {
    assert_eq!(
        canonical("reduce(tensor(x[2]):[1,2], sum)"),
        "reduce(tensor(x[2]):[1,2],sum)"
    );
    assert_eq!(
        canonical("tensor<float>(x[2], y[2]):[[1, 2], [3, a+1]]"),
        "tensor<float>(x[2],y[2]):[[1,2],[3,a + 1]]"
    );
}

#[test]
fn mapped_tensor_literal() {
    assert_eq!(
        canonical(r#"tensor(x{}):{a:1, "b c":2}"#),
        r#"tensor(x{}):{a:1,"b c":2}"#
    );
    assert_eq!(
        canonical("tensor(x{},y{}):{ {x:a, y:0}:1.5 }"),
        "tensor(x{},y{}):{{x:a,y:0}:1.5}"
    );
}

#[test]
fn tensor_generator() {
    insta::assert_snapshot!(parse("tensor(x[3])(x + 1)").unwrap().dump(), @r"
    Tensor tensor(x[3])
      Binary +
        Ref x
        Number 1
    ");
}

#[test]
fn tensor_type_without_body_is_an_error() {
    let err = parse("tensor(x[2]):").unwrap_err();

    assert!(err.message.contains("expected `[` or `{`"), "{err}");
}
