//! parser module tests

use super::*;

fn single_stmt(code: &str) -> StmtKind {
    let mut program = parse(code).unwrap();
    assert_eq!(program.body.len(), 1, "expected one statement in {code:?}");
    program.body.remove(0).kind
}

fn single_expr(code: &str) -> ExprKind {
    match single_stmt(code) {
        StmtKind::Expr(expr) => expr.kind,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn test_parse_empty_program() {
    assert!(parse("").unwrap().body.is_empty());
    assert!(parse("// only a comment\n/* block */").unwrap().body.is_empty());
}

#[test]
fn test_parse_let_with_array() {
    let StmtKind::VarDecl(decl) = single_stmt("let xs = [1, 2, 3];") else {
        panic!("expected declaration");
    };
    assert_eq!(decl.kind, VarKind::Let);
    assert_eq!(decl.declarations.len(), 1);
    assert_eq!(decl.declarations[0].name, "xs");
    let Some(Expr {
        kind: ExprKind::Array(elements),
        ..
    }) = &decl.declarations[0].init
    else {
        panic!("expected array initializer");
    };
    assert_eq!(elements.len(), 3);
    assert_eq!(elements[0].kind, ExprKind::Literal(Literal::Number(1.0)));
}

#[test]
fn test_parse_type_annotations_are_dropped() {
    let StmtKind::VarDecl(decl) = single_stmt("const names: string[] = [\"a\"]") else {
        panic!("expected declaration");
    };
    assert_eq!(decl.kind, VarKind::Const);
    assert_eq!(decl.declarations[0].name, "names");

    let StmtKind::FuncDecl { name, params, body } =
        single_stmt("function add(a: number, b?: Map<string, number>): void { return; }")
    else {
        panic!("expected function");
    };
    assert_eq!(name, "add");
    let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].kind, StmtKind::Return(None));
}

#[test]
fn test_parse_multiple_declarators() {
    let StmtKind::VarDecl(decl) = single_stmt("var a = 1, b, c = 'x'") else {
        panic!("expected declaration");
    };
    assert_eq!(decl.kind, VarKind::Var);
    assert_eq!(decl.declarations.len(), 3);
    assert!(decl.declarations[1].init.is_none());
    assert_eq!(
        decl.declarations[2].init.as_ref().map(|e| &e.kind),
        Some(&ExprKind::Literal(Literal::String("x".to_string())))
    );
}

#[test]
fn test_parse_method_call_chain() {
    let ExprKind::Call { callee, args } = single_expr("basic.showString(\"hi\");") else {
        panic!("expected call");
    };
    assert_eq!(callee.dotted_name().as_deref(), Some("basic.showString"));
    assert_eq!(args.len(), 1);
}

#[test]
fn test_parse_computed_member() {
    let ExprKind::Member { object, property } = single_expr("xs[i + 1]") else {
        panic!("expected member access");
    };
    assert_eq!(object.kind, ExprKind::Ident("xs".to_string()));
    let MemberProperty::Computed(index) = property else {
        panic!("expected computed property");
    };
    assert!(matches!(index.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
}

#[test]
fn test_parse_precedence() {
    // a + b * c parses as a + (b * c)
    let ExprKind::Binary { op, left, right } = single_expr("a + b * c") else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(left.kind, ExprKind::Ident("a".to_string()));
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn test_parse_left_associative_subtraction() {
    let ExprKind::Binary { op, left, .. } = single_expr("a - b - c") else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Sub);
    assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
}

#[test]
fn test_parse_right_associative_power() {
    let ExprKind::Binary { op, right, .. } = single_expr("2 ** 3 ** 2") else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Pow);
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));
}

#[test]
fn test_parse_logical_and_comparison() {
    let ExprKind::Logical { op, left, right } = single_expr("a < 1 && b !== c") else {
        panic!("expected logical");
    };
    assert_eq!(op, LogicalOp::And);
    assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Lt, .. }));
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::StrictNotEq, .. }));
}

#[test]
fn test_parse_compound_assignment() {
    let ExprKind::Assign { op, target, value } = single_expr("total <<= 2") else {
        panic!("expected assignment");
    };
    assert_eq!(op, AssignOp::Shl);
    assert_eq!(target.kind, ExprKind::Ident("total".to_string()));
    assert_eq!(value.kind, ExprKind::Literal(Literal::Number(2.0)));
}

#[test]
fn test_parse_assignment_is_right_associative() {
    let ExprKind::Assign { value, .. } = single_expr("a = b = 3") else {
        panic!("expected assignment");
    };
    assert!(matches!(value.kind, ExprKind::Assign { .. }));
}

#[test]
fn test_parse_invalid_assignment_target() {
    let err = parse("f() = 3").unwrap_err();
    assert!(matches!(err, TranspileError::ParseError { .. }));
}

#[test]
fn test_parse_update_expressions() {
    assert!(matches!(
        single_expr("i++"),
        ExprKind::Update {
            op: UpdateOp::Increment,
            prefix: false,
            ..
        }
    ));
    assert!(matches!(
        single_expr("--i"),
        ExprKind::Update {
            op: UpdateOp::Decrement,
            prefix: true,
            ..
        }
    ));
}

#[test]
fn test_parse_unary_nesting() {
    let ExprKind::Unary { op, argument } = single_expr("!-x") else {
        panic!("expected unary");
    };
    assert_eq!(op, UnaryOp::Not);
    assert!(matches!(argument.kind, ExprKind::Unary { op: UnaryOp::Neg, .. }));
}

#[test]
fn test_parse_if_else_chain() {
    let code = r#"
if (x > 0) {
    y = 1;
} else if (x < 0) {
    y = -1;
} else {
    y = 0;
}
"#;
    let StmtKind::If { consequent, alternate, .. } = single_stmt(code) else {
        panic!("expected if");
    };
    assert!(matches!(consequent.kind, StmtKind::Block(_)));
    let Some(alternate) = alternate else {
        panic!("expected else branch");
    };
    assert!(matches!(alternate.kind, StmtKind::If { alternate: Some(_), .. }));
}

#[test]
fn test_parse_while_loop() {
    let StmtKind::While { test, body } = single_stmt("while (n > 0) n--;") else {
        panic!("expected while");
    };
    assert!(matches!(test.kind, ExprKind::Binary { op: BinaryOp::Gt, .. }));
    assert!(matches!(body.kind, StmtKind::Expr(_)));
}

#[test]
fn test_parse_for_loop() {
    let code = "for (let i = 0; i < xs.length; i++) { basic.showNumber(xs[i]); }";
    let StmtKind::For { init, test, update, body } = single_stmt(code) else {
        panic!("expected for");
    };
    assert!(matches!(init, Some(ForInit::VarDecl(_))));
    assert!(test.is_some());
    assert!(matches!(
        update.map(|u| u.kind),
        Some(ExprKind::Update { prefix: false, .. })
    ));
    assert!(matches!(body.kind, StmtKind::Block(ref stmts) if stmts.len() == 1));
}

#[test]
fn test_parse_for_with_empty_header() {
    let StmtKind::For { init, test, update, .. } = single_stmt("for (;;) {}") else {
        panic!("expected for");
    };
    assert!(init.is_none() && test.is_none() && update.is_none());
}

#[test]
fn test_parse_for_expression_init() {
    let StmtKind::For { init, .. } = single_stmt("for (i = 0; i < 3; i += 1) ;") else {
        panic!("expected for");
    };
    assert!(matches!(init, Some(ForInit::Expr(_))));
}

#[test]
fn test_parse_unsupported_statements() {
    assert_eq!(
        single_stmt("for (const x of xs) {}"),
        StmtKind::Unsupported("ForOfStatement".to_string())
    );
    assert_eq!(
        single_stmt("for (const k in obj) {}"),
        StmtKind::Unsupported("ForInStatement".to_string())
    );
    let program = parse("while (true) { break; continue; }").unwrap();
    let StmtKind::While { body, .. } = &program.body[0].kind else {
        panic!("expected while");
    };
    let StmtKind::Block(stmts) = &body.kind else {
        panic!("expected block");
    };
    assert_eq!(stmts[0].kind, StmtKind::Unsupported("BreakStatement".to_string()));
    assert_eq!(stmts[1].kind, StmtKind::Unsupported("ContinueStatement".to_string()));
}

#[test]
fn test_parse_unsupported_expressions() {
    let ExprKind::Assign { value, .. } = single_expr("x = a ? b : c") else {
        panic!("expected assignment");
    };
    assert_eq!(value.kind, ExprKind::Unsupported("ConditionalExpression".to_string()));
    assert_eq!(
        single_expr("a ? b : c"),
        ExprKind::Unsupported("ConditionalExpression".to_string())
    );
    assert_eq!(single_expr("`hi`"), ExprKind::Unsupported("TemplateLiteral".to_string()));
    assert_eq!(single_expr("this"), ExprKind::Unsupported("ThisExpression".to_string()));
    assert_eq!(single_expr("new Foo()"), ExprKind::Unsupported("NewExpression".to_string()));
    assert_eq!(
        single_expr("obj?.value"),
        ExprKind::Unsupported("ChainExpression".to_string())
    );
}

#[test]
fn test_parse_literals() {
    assert_eq!(single_expr("0x10"), ExprKind::Literal(Literal::Number(16.0)));
    assert_eq!(single_expr("2.5"), ExprKind::Literal(Literal::Number(2.5)));
    assert_eq!(single_expr("true"), ExprKind::Literal(Literal::Bool(true)));
    assert_eq!(single_expr("null"), ExprKind::Literal(Literal::Null));
    assert_eq!(
        single_expr(r#"'say \"hi\"\n'"#),
        ExprKind::Literal(Literal::String("say \"hi\"\n".to_string()))
    );
}

#[test]
fn test_parse_without_semicolons() {
    let program = parse("let a = 1\nlet b = 2\nbasic.showNumber(a + b)\n").unwrap();
    assert_eq!(program.body.len(), 3);
}

#[test]
fn test_parse_records_locations() {
    let program = parse("let a = 1;\n  led.on();").unwrap();
    assert_eq!(program.body[0].loc, SourceLocation::new(1, 1));
    assert_eq!(program.body[1].loc, SourceLocation::new(2, 3));
}

#[test]
fn test_parse_keyword_prefixed_identifiers() {
    let StmtKind::VarDecl(decl) = single_stmt("let format = iffy + newer") else {
        panic!("expected declaration");
    };
    assert_eq!(decl.declarations[0].name, "format");
    let Some(init) = &decl.declarations[0].init else {
        panic!("expected initializer");
    };
    assert!(matches!(init.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
}

#[test]
fn test_parse_error_reports_position() {
    let err = parse("let x = ;").unwrap_err();
    let TranspileError::ParseError { line, column, .. } = err else {
        panic!("expected parse error, got {err:?}");
    };
    assert_eq!(line, 1);
    assert!(column >= 7);
}

#[test]
fn test_parse_strips_bom() {
    assert_eq!(parse("\u{feff}let a = 1").unwrap().body.len(), 1);
}

#[test]
fn test_statements_on_one_line_need_a_semicolon() {
    for code in ["a b", "let n = y as number;", "x = v satisfies Shape", "namespace Foo { led.on(); }", "declare let z: number;"] {
        let err = parse(code).unwrap_err();
        assert!(matches!(err, TranspileError::ParseError { line: 1, .. }), "{code:?}: {err:?}");
    }
    assert_eq!(parse("a = 1; b = 2").unwrap().body.len(), 2);
}

#[test]
fn test_statement_ends_at_line_break_brace_or_comment() {
    assert_eq!(parse("a = 1\nb = 2").unwrap().body.len(), 2);
    assert_eq!(parse("a = 1 // note\nb = 2").unwrap().body.len(), 2);
    assert_eq!(parse("a = 1 /* note */; b = 2").unwrap().body.len(), 2);
    assert_eq!(parse("a = 1 /* spans\nlines */ b = 2").unwrap().body.len(), 2);
    let StmtKind::Block(stmts) = single_stmt("{ led.on() }") else {
        panic!("expected block");
    };
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_expression_continues_across_lines() {
    assert!(matches!(single_expr("x = a\n    + b"), ExprKind::Assign { .. }));
    assert!(matches!(single_expr("basic\n    .showNumber(1)"), ExprKind::Call { .. }));
    let StmtKind::VarDecl(decl) = single_stmt("let xs: number[]\n    = [1]") else {
        panic!("expected declaration");
    };
    assert!(decl.declarations[0].init.is_some());
}

#[test]
fn test_postfix_update_stays_on_operand_line() {
    let program = parse("let a = 1\n++b").unwrap();
    assert_eq!(program.body.len(), 2);
    let StmtKind::VarDecl(decl) = &program.body[0].kind else {
        panic!("expected declaration");
    };
    assert_eq!(
        decl.declarations[0].init.as_ref().map(|e| &e.kind),
        Some(&ExprKind::Literal(Literal::Number(1.0)))
    );
    let StmtKind::Expr(update) = &program.body[1].kind else {
        panic!("expected expression statement");
    };
    assert!(matches!(update.kind, ExprKind::Update { prefix: true, .. }));
    assert!(parse("i\n++").is_err());
}

#[test]
fn test_return_argument_must_start_on_same_line() {
    let StmtKind::FuncDecl { body, .. } = single_stmt("function f() { return\n1 }") else {
        panic!("expected function");
    };
    assert_eq!(body.len(), 2);
    assert_eq!(body[0].kind, StmtKind::Return(None));
    assert_eq!(body[1].kind, StmtKind::Expr(Expr::new(ExprKind::Literal(Literal::Number(1.0)), SourceLocation::new(2, 1))));

    let StmtKind::FuncDecl { body, .. } = single_stmt("function g() { return 2 }") else {
        panic!("expected function");
    };
    assert!(matches!(body[0].kind, StmtKind::Return(Some(_))));
}
