//! Emitter module - C++ code generation

mod type_infer;

pub use type_infer::{infer_array_element_type, ElementType};

use serde::Serialize;

use crate::parser::{
    AssignOp, BinaryOp, Declarator, Expr, ExprKind, ForInit, Literal, LogicalOp, MemberProperty,
    Param, Program, SourceLocation, Stmt, StmtKind, UnaryOp,
};
use crate::shims::ShimTable;

/// Text for one node, or every issue that prevented producing it
pub type Fragment = Result<String, Vec<EmitIssue>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    /// Construct with no translation; output is refused
    Unsupported,
    /// Translated, but the result is knowingly incomplete
    Partial,
}

/// A construct the emitter could not translate faithfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmitIssue {
    pub kind: IssueKind,
    pub construct: String,
    pub loc: SourceLocation,
}

impl EmitIssue {
    pub fn unsupported(construct: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            kind: IssueKind::Unsupported,
            construct: construct.into(),
            loc,
        }
    }

    pub fn partial(construct: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            kind: IssueKind::Partial,
            construct: construct.into(),
            loc,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == IssueKind::Unsupported
    }
}

impl std::fmt::Display for EmitIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            IssueKind::Unsupported => write!(f, "unsupported construct '{}'", self.construct)?,
            IssueKind::Partial => write!(f, "partial translation of '{}'", self.construct)?,
        }
        if self.loc.is_known() {
            write!(f, " at {}", self.loc)?;
        }
        Ok(())
    }
}

/// Emitted translation unit, before assembly
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmittedProgram {
    /// Top-level function definitions, in source order
    pub functions: Vec<String>,
    /// Statements for the entry point, one entry per top-level statement
    pub body: Vec<String>,
    pub warnings: Vec<EmitIssue>,
}

/// Emit C++ code from the AST
///
/// Fails with every fatal issue found; partial translations are collected
/// as warnings on success and appended after the errors on failure.
pub fn emit(program: &Program, shims: &ShimTable) -> Result<EmittedProgram, Vec<EmitIssue>> {
    let mut emitter = CppEmitter::new(shims);
    emitter.emit_program(program)
}

/// C++ code emitter
pub struct CppEmitter<'a> {
    shims: &'a ShimTable,
    indent: usize,
    warnings: Vec<EmitIssue>,
}

impl<'a> CppEmitter<'a> {
    pub fn new(shims: &'a ShimTable) -> Self {
        Self {
            shims,
            indent: 0,
            warnings: Vec::new(),
        }
    }

    pub fn emit_program(&mut self, program: &Program) -> Result<EmittedProgram, Vec<EmitIssue>> {
        let mut functions = Vec::new();
        let mut body = Vec::new();
        let mut issues = Vec::new();

        for stmt in &program.body {
            let fragment = match &stmt.kind {
                StmtKind::FuncDecl { name, params, body } => {
                    self.emit_function(name, params, body).map(|f| (true, f))
                }
                _ => self.emit_stmt(stmt).map(|s| (false, s)),
            };
            match fragment {
                Ok((true, text)) => functions.push(text),
                Ok((false, text)) => body.push(text),
                Err(mut errs) => issues.append(&mut errs),
            }
        }

        let warnings = std::mem::take(&mut self.warnings);
        if !issues.is_empty() {
            issues.extend(warnings);
            return Err(issues);
        }
        log::debug!(
            "emitted {} function(s) and {} statement(s)",
            functions.len(),
            body.len()
        );
        Ok(EmittedProgram {
            functions,
            body,
            warnings,
        })
    }

    fn pad(&self) -> String {
        "    ".repeat(self.indent)
    }

    fn emit_function(&mut self, name: &str, params: &[Param], body: &[Stmt]) -> Fragment {
        let params: Vec<String> = params.iter().map(|p| format!("auto {}", p.name)).collect();
        let block = self.emit_block(body)?;
        Ok(format!("{}void {}({}) {}", self.pad(), name, params.join(", "), block))
    }

    /// Emit a statement list, collecting the issues of every failing statement
    fn emit_stmts(&mut self, stmts: &[Stmt]) -> Fragment {
        let mut lines = Vec::new();
        let mut issues = Vec::new();
        for stmt in stmts {
            match self.emit_stmt(stmt) {
                Ok(line) => lines.push(line),
                Err(mut errs) => issues.append(&mut errs),
            }
        }
        if issues.is_empty() {
            Ok(lines.join("\n"))
        } else {
            Err(issues)
        }
    }

    /// `{ ... }` with the statements one level deeper than the current line
    fn emit_block(&mut self, stmts: &[Stmt]) -> Fragment {
        if stmts.is_empty() {
            return Ok("{}".to_string());
        }
        self.indent += 1;
        let inner = self.emit_stmts(stmts);
        self.indent -= 1;
        Ok(format!("{{\n{}\n{}}}", inner?, self.pad()))
    }

    /// Body of a control-flow statement, braced even when the source omits braces
    fn emit_body(&mut self, body: &Stmt) -> Fragment {
        match &body.kind {
            StmtKind::Block(stmts) => self.emit_block(stmts),
            _ => self.emit_block(std::slice::from_ref(body)),
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Fragment {
        let pad = self.pad();
        let text = match &stmt.kind {
            StmtKind::Expr(expr) => format!("{};", self.emit_expr(expr)?),
            StmtKind::VarDecl(decl) => {
                // One C++ declaration per declarator; mixed element types can't share one.
                let lines = decl
                    .declarations
                    .iter()
                    .map(|d| self.emit_declarator(d).map(|text| format!("{pad}{text};")))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(lines.join("\n"));
            }
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => self.emit_if(test, consequent, alternate.as_deref())?,
            StmtKind::While { test, body } => {
                let test = self.emit_expr(test)?;
                format!("while ({}) {}", test, self.emit_body(body)?)
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                let header = self.emit_for_header(init.as_ref(), test.as_ref(), update.as_ref())?;
                format!("for ({}) {}", header, self.emit_body(body)?)
            }
            StmtKind::Block(stmts) => self.emit_block(stmts)?,
            StmtKind::FuncDecl { .. } => {
                return Err(vec![EmitIssue::unsupported("nested FunctionDeclaration", stmt.loc)]);
            }
            StmtKind::Return(Some(argument)) => format!("return {};", self.emit_expr(argument)?),
            StmtKind::Return(None) => "return;".to_string(),
            StmtKind::Empty => ";".to_string(),
            StmtKind::Unsupported(kind) => {
                return Err(vec![EmitIssue::unsupported(kind.as_str(), stmt.loc)]);
            }
        };
        Ok(format!("{pad}{text}"))
    }

    fn emit_if(&mut self, test: &Expr, consequent: &Stmt, alternate: Option<&Stmt>) -> Fragment {
        let test = self.emit_expr(test)?;
        let mut text = format!("if ({}) {}", test, self.emit_body(consequent)?);
        match alternate {
            Some(Stmt {
                kind:
                    StmtKind::If {
                        test,
                        consequent,
                        alternate,
                    },
                ..
            }) => {
                text.push_str(" else ");
                text.push_str(&self.emit_if(test, consequent, alternate.as_deref())?);
            }
            Some(other) => {
                text.push_str(" else ");
                text.push_str(&self.emit_body(other)?);
            }
            None => {}
        }
        Ok(text)
    }

    /// Loop header; the initializer is emitted without its own terminator
    fn emit_for_header(
        &mut self,
        init: Option<&ForInit>,
        test: Option<&Expr>,
        update: Option<&Expr>,
    ) -> Fragment {
        let mut header = match init {
            Some(ForInit::VarDecl(decl)) => {
                let mut parts = Vec::with_capacity(decl.declarations.len());
                for (i, declarator) in decl.declarations.iter().enumerate() {
                    if i == 0 {
                        parts.push(self.emit_declarator(declarator)?);
                    } else {
                        parts.push(self.emit_trailing_declarator(declarator)?);
                    }
                }
                parts.join(", ")
            }
            Some(ForInit::Expr(expr)) => self.emit_expr(expr)?,
            None => String::new(),
        };
        header.push(';');
        if let Some(test) = test {
            header.push(' ');
            header.push_str(&self.emit_expr(test)?);
        }
        header.push(';');
        if let Some(update) = update {
            header.push(' ');
            header.push_str(&self.emit_expr(update)?);
        }
        Ok(header)
    }

    /// Declaration spelling chosen from the initializer's shape
    fn emit_declarator(&mut self, declarator: &Declarator) -> Fragment {
        let name = &declarator.name;
        match &declarator.init {
            None => Ok(format!("auto {name}")),
            Some(Expr {
                kind: ExprKind::Array(elements),
                ..
            }) => {
                let element = infer_array_element_type(elements);
                let init = self.emit_array(elements)?;
                Ok(format!("std::vector<{}> {} = {}", element.cpp_name(), name, init))
            }
            Some(
                init @ Expr {
                    kind: ExprKind::Literal(Literal::String(_)),
                    ..
                },
            ) => Ok(format!("std::string {} = {}", name, self.emit_expr(init)?)),
            Some(init) => Ok(format!("auto {} = {}", name, self.emit_expr(init)?)),
        }
    }

    /// Second and later declarators of a `for` header share the first one's type
    fn emit_trailing_declarator(&mut self, declarator: &Declarator) -> Fragment {
        match &declarator.init {
            Some(init) => Ok(format!("{} = {}", declarator.name, self.emit_expr(init)?)),
            None => Ok(declarator.name.clone()),
        }
    }

    fn emit_array(&mut self, elements: &[Expr]) -> Fragment {
        if elements.is_empty() {
            return Ok("{}".to_string());
        }
        Ok(format!("{{ {} }}", self.emit_args(elements)?))
    }

    fn emit_args(&mut self, args: &[Expr]) -> Fragment {
        let args = args
            .iter()
            .map(|a| self.emit_expr(a))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(args.join(", "))
    }

    /// Emit `expr`, parenthesised when it binds looser than `min_precedence`
    fn emit_operand(&mut self, expr: &Expr, min_precedence: u8) -> Fragment {
        let text = self.emit_expr(expr)?;
        if precedence(expr) < min_precedence {
            Ok(format!("({text})"))
        } else {
            Ok(text)
        }
    }

    pub fn emit_expr(&mut self, expr: &Expr) -> Fragment {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(emit_literal(literal)),
            ExprKind::Ident(name) => Ok(name.clone()),
            ExprKind::Array(elements) => self.emit_array(elements),
            ExprKind::Member { object, property } => self.emit_member(expr, object, property),
            ExprKind::Call { callee, args } => self.emit_call(expr, callee, args),
            ExprKind::Binary { op, left, right } => {
                let symbol = match op {
                    BinaryOp::Pow => {
                        return Ok(format!(
                            "pow({}, {})",
                            self.emit_expr(left)?,
                            self.emit_expr(right)?
                        ));
                    }
                    BinaryOp::StrictEq => "==",
                    BinaryOp::StrictNotEq => "!=",
                    BinaryOp::In | BinaryOp::InstanceOf | BinaryOp::UShr => {
                        return Err(vec![EmitIssue::unsupported(
                            format!("operator '{}'", op.symbol()),
                            expr.loc,
                        )]);
                    }
                    other => other.symbol(),
                };
                let prec = precedence(expr);
                let left = self.emit_operand(left, prec)?;
                let right = self.emit_operand(right, prec + 1)?;
                Ok(format!("{left} {symbol} {right}"))
            }
            ExprKind::Logical { op, left, right } => {
                if *op == LogicalOp::Nullish {
                    return Err(vec![EmitIssue::unsupported("operator '??'", expr.loc)]);
                }
                let prec = precedence(expr);
                let left = self.emit_operand(left, prec)?;
                let right = self.emit_operand(right, prec + 1)?;
                Ok(format!("{} {} {}", left, op.symbol(), right))
            }
            ExprKind::Unary { op, argument } => {
                if matches!(op, UnaryOp::TypeOf | UnaryOp::Void | UnaryOp::Delete) {
                    return Err(vec![EmitIssue::unsupported(
                        format!("operator '{}'", op.symbol()),
                        expr.loc,
                    )]);
                }
                let symbol = op.symbol();
                let operand = self.emit_operand(argument, UNARY)?;
                // `- -x` must not collapse into `--x`
                if matches!(op, UnaryOp::Neg | UnaryOp::Pos) && operand.starts_with(symbol) {
                    Ok(format!("{symbol}({operand})"))
                } else {
                    Ok(format!("{symbol}{operand}"))
                }
            }
            ExprKind::Update {
                op,
                prefix,
                argument,
            } => {
                let operand = self.emit_operand(argument, POSTFIX)?;
                if *prefix {
                    Ok(format!("{}{}", op.symbol(), operand))
                } else {
                    Ok(format!("{}{}", operand, op.symbol()))
                }
            }
            ExprKind::Assign { op, target, value } => {
                if matches!(
                    op,
                    AssignOp::Pow | AssignOp::UShr | AssignOp::And | AssignOp::Or | AssignOp::Nullish
                ) {
                    return Err(vec![EmitIssue::unsupported(
                        format!("operator '{}'", op.symbol()),
                        expr.loc,
                    )]);
                }
                let target = self.emit_operand(target, POSTFIX)?;
                let value = self.emit_operand(value, ASSIGN)?;
                Ok(format!("{} {} {}", target, op.symbol(), value))
            }
            ExprKind::Unsupported(kind) => Err(vec![EmitIssue::unsupported(kind.as_str(), expr.loc)]),
        }
    }

    fn emit_member(&mut self, expr: &Expr, object: &Expr, property: &MemberProperty) -> Fragment {
        let obj = self.emit_operand(object, POSTFIX)?;
        let prop = match property {
            MemberProperty::Computed(index) => {
                return Ok(format!("{}[{}]", obj, self.emit_expr(index)?));
            }
            MemberProperty::Named(prop) => prop,
        };
        let text = match prop.as_str() {
            "length" => format!("{obj}.size()"),
            "push" => format!("{obj}.push_back"),
            "pop" => format!("{obj}.pop_back()"),
            "shift" => format!("{obj}.erase({obj}.begin())"),
            "splice" => format!("{obj}.erase"),
            "reverse" => format!("std::reverse({obj}.begin(), {obj}.end())"),
            "concat" | "join" => {
                self.warnings
                    .push(EmitIssue::partial(format!("{prop}()"), expr.loc));
                obj
            }
            _ => self
                .shim_for(expr)
                .unwrap_or_else(|| format!("{obj}::{prop}")),
        };
        Ok(text)
    }

    /// Shim-table target for a dotted name expression
    fn shim_for(&self, expr: &Expr) -> Option<String> {
        let name = expr.dotted_name()?;
        self.shims.lookup(&name).map(str::to_string)
    }

    fn emit_call(&mut self, expr: &Expr, callee: &Expr, args: &[Expr]) -> Fragment {
        if let ExprKind::Member {
            object,
            property: MemberProperty::Named(method),
        } = &callee.kind
        {
            if let Some(text) = self.emit_container_call(expr, object, method, args)? {
                return Ok(text);
            }
        }
        if let Some(mapped) = self.shim_for(callee) {
            return Ok(format!("{}({})", mapped, self.emit_args(args)?));
        }
        let callee = self.emit_operand(callee, POSTFIX)?;
        Ok(format!("{}({})", callee, self.emit_args(args)?))
    }

    /// `push`, `pop`, `shift`, `reverse` and `splice` on a container
    ///
    /// Returns `Ok(None)` for any other method name.
    fn emit_container_call(
        &mut self,
        expr: &Expr,
        object: &Expr,
        method: &str,
        args: &[Expr],
    ) -> Result<Option<String>, Vec<EmitIssue>> {
        let unsupported = |what: &str| -> Result<Option<String>, Vec<EmitIssue>> {
            Err(vec![EmitIssue::unsupported(what, expr.loc)])
        };
        if !matches!(method, "push" | "pop" | "shift" | "reverse" | "splice") {
            return Ok(None);
        }
        // Every form except `push(x)` and `pop()` spells the container more than once.
        let single_use = matches!((method, args.len()), ("push", 1) | ("pop", 0));
        if !single_use && !is_container_path(object) {
            return unsupported(&format!("{method}() on a computed container"));
        }
        let obj = self.emit_operand(object, POSTFIX)?;
        let text = match (method, args) {
            ("push", []) => return unsupported("push() without arguments"),
            ("push", [item]) => format!("{}.push_back({})", obj, self.emit_expr(item)?),
            ("push", items) => format!("{}.insert({}.end(), {{ {} }})", obj, obj, self.emit_args(items)?),
            ("pop", []) => format!("{obj}.pop_back()"),
            ("shift", []) => format!("{obj}.erase({obj}.begin())"),
            ("reverse", []) => format!("std::reverse({obj}.begin(), {obj}.end())"),
            ("pop" | "shift" | "reverse", _) => {
                return unsupported(&format!("{method}() with arguments"));
            }
            ("splice", []) => return unsupported("splice() without a start index"),
            ("splice", [start]) => {
                let start = self.emit_operand(start, MULTIPLICATIVE)?;
                splice_erase(&obj, &start, "1")
            }
            ("splice", [start, count]) => {
                let start = self.emit_operand(start, MULTIPLICATIVE)?;
                let count = self.emit_operand(count, MULTIPLICATIVE)?;
                splice_erase(&obj, &start, &count)
            }
            _ => return unsupported("splice() with insertion items"),
        };
        Ok(Some(text))
    }
}

/// Name, member chain or index chain: safe to spell more than once
fn is_container_path(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(_) => true,
        ExprKind::Member {
            object,
            property: MemberProperty::Named(_),
        } => is_container_path(object),
        ExprKind::Member {
            object,
            property: MemberProperty::Computed(index),
        } => {
            is_container_path(object)
                && (is_container_path(index) || matches!(index.kind, ExprKind::Literal(_)))
        }
        _ => false,
    }
}

/// Erase the half-open range `[start, start + count)`
fn splice_erase(obj: &str, start: &str, count: &str) -> String {
    format!("{obj}.erase({obj}.begin() + {start}, {obj}.begin() + {start} + {count})")
}

const ASSIGN: u8 = 2;
const MULTIPLICATIVE: u8 = 12;
const UNARY: u8 = 14;
const POSTFIX: u8 = 16;

/// C++ binding strength of the text emitted for `expr` (higher binds tighter)
fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Assign { .. } => ASSIGN,
        ExprKind::Logical {
            op: LogicalOp::Or | LogicalOp::Nullish,
            ..
        } => 3,
        ExprKind::Logical {
            op: LogicalOp::And, ..
        } => 4,
        ExprKind::Binary { op, .. } => match op {
            BinaryOp::BitOr => 5,
            BinaryOp::BitXor => 6,
            BinaryOp::BitAnd => 7,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 8,
            BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::LtEq
            | BinaryOp::GtEq
            | BinaryOp::In
            | BinaryOp::InstanceOf => 9,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 10,
            BinaryOp::Add | BinaryOp::Sub => 11,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => MULTIPLICATIVE,
            // Emitted as a `pow(..)` call
            BinaryOp::Pow => POSTFIX,
        },
        ExprKind::Unary { .. } | ExprKind::Update { prefix: true, .. } => UNARY,
        ExprKind::Update { prefix: false, .. } | ExprKind::Call { .. } | ExprKind::Member { .. } => {
            POSTFIX
        }
        _ => 17,
    }
}

fn emit_literal(literal: &Literal) -> String {
    match literal {
        Literal::String(value) => quote_string(value),
        Literal::Number(n) if n.is_finite() && n.abs() >= 1e15 => exponent_form(*n),
        Literal::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
        Literal::Number(n) => format!("{n}"),
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "null".to_string(),
    }
}

/// `1e+21` style, with an explicit sign on positive exponents
fn exponent_form(n: f64) -> String {
    let text = format!("{n:e}");
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => text,
    }
}

/// C++ string literal for `value`
fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests;
