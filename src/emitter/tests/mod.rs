//! emitter module tests

use super::*;
use crate::parser::parse;
use pretty_assertions::assert_eq;

fn emit_source(code: &str) -> EmittedProgram {
    emit(&parse(code).unwrap(), &ShimTable::builtin()).unwrap()
}

fn body(code: &str) -> String {
    emit_source(code).body.join("\n")
}

fn issues(code: &str) -> Vec<EmitIssue> {
    emit(&parse(code).unwrap(), &ShimTable::builtin()).unwrap_err()
}

#[test]
fn test_integer_array_declaration() {
    assert_eq!(body("let xs = [1, 2, 3];"), "std::vector<int> xs = { 1, 2, 3 };");
}

#[test]
fn test_first_element_decides_array_type() {
    assert_eq!(
        body("let xs = [1, \"two\", true];"),
        "std::vector<int> xs = { 1, \"two\", true };"
    );
    assert_eq!(
        body("const names = ['a', 'b'];"),
        "std::vector<std::string> names = { \"a\", \"b\" };"
    );
    assert_eq!(body("var flags = [false];"), "std::vector<bool> flags = { false };");
}

#[test]
fn test_empty_and_non_literal_arrays_use_auto() {
    assert_eq!(body("let e = [];"), "std::vector<auto> e = {};");
    assert_eq!(body("let ys = [x, 1];"), "std::vector<auto> ys = { x, 1 };");
}

#[test]
fn test_declarator_spellings() {
    assert_eq!(body("let s = \"hi\\n\";"), "std::string s = \"hi\\n\";");
    assert_eq!(body("let x;"), "auto x;");
    assert_eq!(body("let n = 4 * 2;"), "auto n = 4 * 2;");
    assert_eq!(body("const t: string = name;"), "auto t = name;");
}

#[test]
fn test_multiple_declarators_become_separate_statements() {
    assert_eq!(body("let a = 1, b = 's';"), "auto a = 1;\nstd::string b = \"s\";");
}

#[test]
fn test_splice_default_count_is_one() {
    assert_eq!(
        body("list.splice(2);"),
        "list.erase(list.begin() + 2, list.begin() + 2 + 1);"
    );
}

#[test]
fn test_splice_with_count() {
    assert_eq!(
        body("list.splice(2, 3);"),
        "list.erase(list.begin() + 2, list.begin() + 2 + 3);"
    );
}

#[test]
fn test_splice_parenthesises_additive_operands() {
    assert_eq!(
        body("list.splice(i + 1, n - i);"),
        "list.erase(list.begin() + (i + 1), list.begin() + (i + 1) + (n - i));"
    );
    assert_eq!(
        body("list.splice(i * 2, 1);"),
        "list.erase(list.begin() + i * 2, list.begin() + i * 2 + 1);"
    );
}

#[test]
fn test_container_mutations() {
    let code = "list.push(4);\nlist.pop();\nlist.shift();\nlist.reverse();";
    let expected = "\
list.push_back(4);
list.pop_back();
list.erase(list.begin());
std::reverse(list.begin(), list.end());";
    assert_eq!(body(code), expected);
}

#[test]
fn test_push_several_items_inserts_at_end() {
    assert_eq!(body("list.push(1, 2);"), "list.insert(list.end(), { 1, 2 });");
}

#[test]
fn test_container_member_access_without_call() {
    assert_eq!(body("let n = list.length;"), "auto n = list.size();");
    assert_eq!(body("let f = list.push;"), "auto f = list.push_back;");
    assert_eq!(body("let g = list.splice;"), "auto g = list.erase;");
    assert_eq!(body("let p = list.pop;"), "auto p = list.pop_back();");
}

#[test]
fn test_shim_call_keeps_arguments() {
    assert_eq!(body("let r = Math.sqrt(x + 1);"), "auto r = sqrt(x + 1);");
    assert_eq!(body("Math.atan2(y, x);"), "atan2(y, x);");
    assert_eq!(body("basic.showString(\"hi\");"), "basic::showString(\"hi\");");
    assert_eq!(body("basic.showNumber(list.length);"), "basic::showNumber(list.size());");
    assert_eq!(body("led.on();"), "led::on();");
}

#[test]
fn test_unmapped_names_fall_back_to_scoped_form() {
    assert_eq!(body("radio.send(1);"), "radio::send(1);");
    assert_eq!(body("let p = Math.PI;"), "auto p = Math::PI;");
    assert_eq!(body("a.b.c(1);"), "a::b::c(1);");
}

#[test]
fn test_custom_shim_table() {
    let shims = ShimTable::from_entries([("radio.send", "net::broadcast")]);
    let program = parse("radio.send(1);\nMath.sqrt(2);").unwrap();
    let emitted = emit(&program, &shims).unwrap();
    assert_eq!(emitted.body, vec!["net::broadcast(1);", "Math::sqrt(2);"]);
}

#[test]
fn test_computed_member_access() {
    assert_eq!(body("xs[i + 1] = xs[0];"), "xs[i + 1] = xs[0];");
}

#[test]
fn test_literals() {
    assert_eq!(body("f(2.5, 1e3, 0x10, true, null);"), "f(2.5, 1000, 16, true, null);");
    assert_eq!(body("f('say \"hi\"');"), "f(\"say \\\"hi\\\"\");");
    assert_eq!(body("f(\"a\\\\b\\t\");"), "f(\"a\\\\b\\t\");");
}

#[test]
fn test_large_numbers_use_exponent_form() {
    assert_eq!(body("f(1e21, 123456789012345, 2e15);"), "f(1e+21, 123456789012345, 2e+15);");
    assert_eq!(body("f(1.5e300);"), "f(1.5e+300);");
}

#[test]
fn test_operator_spelling() {
    assert_eq!(body("a === b;"), "a == b;");
    assert_eq!(body("a !== b;"), "a != b;");
    assert_eq!(body("let p = 2 ** 3;"), "auto p = pow(2, 3);");
    assert_eq!(body("ok = a < 1 && !done || b >= 2;"), "ok = a < 1 && !done || b >= 2;");
    assert_eq!(body("total += n % 3;"), "total += n % 3;");
}

#[test]
fn test_parentheses_follow_tree_grouping() {
    assert_eq!(body("x = (a + b) * c;"), "x = (a + b) * c;");
    assert_eq!(body("x = a - (b - c);"), "x = a - (b - c);");
    assert_eq!(body("x = a - b - c;"), "x = a - b - c;");
    assert_eq!(body("x = (a || b) && c;"), "x = (a || b) && c;");
    assert_eq!(body("x = -(a + b);"), "x = -(a + b);");
    assert_eq!(body("n = (a + b).length;"), "n = (a + b).size();");
}

#[test]
fn test_nested_negation_keeps_tokens_apart() {
    assert_eq!(body("x = - -y;"), "x = -(-y);");
    assert_eq!(body("x = -(--y);"), "x = -(--y);");
    assert_eq!(body("x = !!y;"), "x = !!y;");
}

#[test]
fn test_update_expressions() {
    assert_eq!(body("i++;\n--j;"), "i++;\n--j;");
}

#[test]
fn test_if_else_chain() {
    let code = r#"
if (x > 0) {
    y = 1;
} else if (x < 0) {
    y = -1;
} else {
    y = 0;
}
"#;
    let expected = "\
if (x > 0) {
    y = 1;
} else if (x < 0) {
    y = -1;
} else {
    y = 0;
}";
    assert_eq!(body(code), expected);
}

#[test]
fn test_unbraced_bodies_get_braces() {
    assert_eq!(body("while (n > 0) n--;"), "while (n > 0) {\n    n--;\n}");
    assert_eq!(body("if (a) b(); else c();"), "if (a) {\n    b();\n} else {\n    c();\n}");
}

#[test]
fn test_for_loop() {
    let code = "for (let i = 0; i < xs.length; i++) { basic.showNumber(xs[i]); }";
    let expected = "\
for (auto i = 0; i < xs.size(); i++) {
    basic::showNumber(xs[i]);
}";
    assert_eq!(body(code), expected);
}

#[test]
fn test_for_header_variants() {
    assert_eq!(body("for (;;) {}"), "for (;;) {}");
    assert_eq!(body("for (i = 0; ; i += 2) {}"), "for (i = 0;; i += 2) {}");
    assert_eq!(
        body("for (let i = 0, j = 10; i < j; i++) {}"),
        "for (auto i = 0, j = 10; i < j; i++) {}"
    );
}

#[test]
fn test_nested_blocks_indent() {
    let code = r#"
while (running) {
    if (count > 3) {
        led.on();
    }
    count++;
}
"#;
    let expected = "\
while (running) {
    if (count > 3) {
        led::on();
    }
    count++;
}";
    assert_eq!(body(code), expected);
}

#[test]
fn test_standalone_block_and_empty_statement() {
    assert_eq!(body("{ led.on(); }"), "{\n    led::on();\n}");
    assert_eq!(body(";"), ";");
}

#[test]
fn test_functions_are_hoisted() {
    let code = r#"
basic.showAkhila();
function add(a: number, b: number) {
    return a + b;
}
function stop() { return; }
"#;
    let emitted = emit_source(code);
    assert_eq!(emitted.body, vec!["basic::showAkhila();"]);
    assert_eq!(
        emitted.functions,
        vec![
            "void add(auto a, auto b) {\n    return a + b;\n}".to_string(),
            "void stop() {\n    return;\n}".to_string(),
        ]
    );
}

#[test]
fn test_join_and_concat_are_partial() {
    let emitted = emit_source("let j = xs.join;");
    assert_eq!(emitted.body, vec!["auto j = xs;"]);
    assert_eq!(emitted.warnings.len(), 1);
    assert_eq!(emitted.warnings[0].kind, IssueKind::Partial);
    assert_eq!(emitted.warnings[0].construct, "join()");
    assert!(!emitted.warnings[0].is_fatal());

    let emitted = emit_source("let c = a.concat(b);");
    assert_eq!(emitted.body, vec!["auto c = a(b);"]);
    assert_eq!(emitted.warnings[0].construct, "concat()");
}

#[test]
fn test_unsupported_expression_reports_kind_and_location() {
    let found = issues("let a = 1;\nx = a ? b : c;");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, IssueKind::Unsupported);
    assert_eq!(found[0].construct, "ConditionalExpression");
    assert_eq!(found[0].loc, SourceLocation::new(2, 5));
}

#[test]
fn test_unsupported_statements_are_aggregated() {
    let code = "for (const x of xs) {}\nled.on();\nwhile (true) { break; }";
    let found = issues(code);
    let constructs: Vec<&str> = found.iter().map(|i| i.construct.as_str()).collect();
    assert_eq!(constructs, vec!["ForOfStatement", "BreakStatement"]);
    assert!(found.iter().all(EmitIssue::is_fatal));
}

#[test]
fn test_unsupported_operators() {
    assert_eq!(issues("ok = k in obj;")[0].construct, "operator 'in'");
    assert_eq!(issues("ok = a instanceof B;")[0].construct, "operator 'instanceof'");
    assert_eq!(issues("x = a >>> 1;")[0].construct, "operator '>>>'");
    assert_eq!(issues("x = a ?? b;")[0].construct, "operator '??'");
    assert_eq!(issues("t = typeof a;")[0].construct, "operator 'typeof'");
    assert_eq!(issues("x **= 2;")[0].construct, "operator '**='");
    assert_eq!(issues("x ||= y;")[0].construct, "operator '||='");
}

#[test]
fn test_unsupported_container_calls() {
    assert_eq!(issues("list.push();")[0].construct, "push() without arguments");
    assert_eq!(issues("list.splice();")[0].construct, "splice() without a start index");
    assert_eq!(issues("list.splice(0, 1, 9);")[0].construct, "splice() with insertion items");
    assert_eq!(issues("list.pop(1);")[0].construct, "pop() with arguments");
}

#[test]
fn test_container_spelled_twice_must_be_a_path() {
    assert_eq!(
        issues("getList().splice(1);")[0].construct,
        "splice() on a computed container"
    );
    assert_eq!(issues("make().reverse();")[0].construct, "reverse() on a computed container");
    assert_eq!(issues("rows[next()].shift();")[0].construct, "shift() on a computed container");
    assert_eq!(body("getList().push(1);"), "getList().push_back(1);");
    assert_eq!(
        body("grid.rows[i].splice(0);"),
        "grid::rows[i].erase(grid::rows[i].begin() + 0, grid::rows[i].begin() + 0 + 1);"
    );
}

#[test]
fn test_nested_function_is_unsupported() {
    let found = issues("if (x) {\n    function inner() {}\n}");
    assert_eq!(found[0].construct, "nested FunctionDeclaration");
    assert_eq!(found[0].loc, SourceLocation::new(2, 5));
}

#[test]
fn test_warnings_follow_errors_on_failure() {
    let found = issues("let j = xs.join;\nx = this;");
    assert_eq!(found.len(), 2);
    assert!(found[0].is_fatal());
    assert_eq!(found[1].kind, IssueKind::Partial);
}

#[test]
fn test_emission_is_deterministic() {
    let program = parse("let xs = [3, 1];\nxs.push(2);\nbasic.showNumber(xs.length);").unwrap();
    let shims = ShimTable::builtin();
    let first = emit(&program, &shims).unwrap();
    let second = emit(&program, &shims).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_issue_display() {
    let issue = EmitIssue::unsupported("ClassDeclaration", SourceLocation::new(3, 1));
    assert_eq!(issue.to_string(), "unsupported construct 'ClassDeclaration' at 3:1");
    let issue = EmitIssue::partial("join()", SourceLocation::unknown());
    assert_eq!(issue.to_string(), "partial translation of 'join()'");
}
