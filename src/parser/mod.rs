//! Parser module - pest-based TypeScript subset parser
//!
//! Produces the [`Program`] tree consumed by the emitter. Constructs that the
//! grammar recognises but the emitter does not translate are kept as
//! `Unsupported` nodes named after their ESTree kind.

mod ast;
pub mod estree;
mod location;
mod utils;

pub use ast::*;
pub use location::SourceLocation;

use once_cell::sync::Lazy;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;

use crate::error::TranspileError;

#[derive(Parser)]
#[grammar = "parser/script.pest"]
pub struct ScriptParser;

type ParseResult<T> = Result<T, TranspileError>;

/// Binary operator precedence, lowest first (JavaScript table)
static BINARY_PRATT: Lazy<PrattParser<Rule>> = Lazy::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::op_nullish, Assoc::Left))
        .op(Op::infix(Rule::op_or, Assoc::Left))
        .op(Op::infix(Rule::op_and, Assoc::Left))
        .op(Op::infix(Rule::op_bit_or, Assoc::Left))
        .op(Op::infix(Rule::op_bit_xor, Assoc::Left))
        .op(Op::infix(Rule::op_bit_and, Assoc::Left))
        .op(Op::infix(Rule::op_eq, Assoc::Left)
            | Op::infix(Rule::op_ne, Assoc::Left)
            | Op::infix(Rule::op_strict_eq, Assoc::Left)
            | Op::infix(Rule::op_strict_ne, Assoc::Left))
        .op(Op::infix(Rule::op_lt, Assoc::Left)
            | Op::infix(Rule::op_gt, Assoc::Left)
            | Op::infix(Rule::op_le, Assoc::Left)
            | Op::infix(Rule::op_ge, Assoc::Left)
            | Op::infix(Rule::kw_instanceof, Assoc::Left)
            | Op::infix(Rule::kw_in, Assoc::Left))
        .op(Op::infix(Rule::op_shl, Assoc::Left)
            | Op::infix(Rule::op_shr, Assoc::Left)
            | Op::infix(Rule::op_ushr, Assoc::Left))
        .op(Op::infix(Rule::op_add, Assoc::Left) | Op::infix(Rule::op_sub, Assoc::Left))
        .op(Op::infix(Rule::op_mul, Assoc::Left)
            | Op::infix(Rule::op_div, Assoc::Left)
            | Op::infix(Rule::op_mod, Assoc::Left))
        .op(Op::infix(Rule::op_pow, Assoc::Right))
});

/// Parse TypeScript source code into AST
pub fn parse(source: &str) -> ParseResult<Program> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut pairs = ScriptParser::parse(Rule::program, source).map_err(|err| {
        let (line, column) = match err.line_col {
            pest::error::LineColLocation::Pos(pos) => pos,
            pest::error::LineColLocation::Span(start, _) => start,
        };
        TranspileError::ParseError {
            line,
            column,
            message: err.variant.message().to_string(),
        }
    })?;

    let program = pairs.next().ok_or_else(|| TranspileError::ParseError {
        line: 1,
        column: 1,
        message: "empty parse tree".to_string(),
    })?;

    let mut body = Vec::new();
    for pair in program.into_inner() {
        if pair.as_rule() == Rule::EOI {
            break;
        }
        body.push(build_stmt(pair)?);
    }
    Ok(Program { body })
}

fn loc_of(pair: &Pair<Rule>) -> SourceLocation {
    let (line, column) = pair.as_span().start_pos().line_col();
    SourceLocation::new(line, column)
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_break
            | Rule::kw_const
            | Rule::kw_continue
            | Rule::kw_else
            | Rule::kw_for
            | Rule::kw_function
            | Rule::kw_if
            | Rule::kw_in
            | Rule::kw_let
            | Rule::kw_new
            | Rule::kw_of
            | Rule::kw_return
            | Rule::kw_var
            | Rule::kw_while
    )
}

/// Children of a pair with keyword tokens and type annotations filtered out
fn significant<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    pair.into_inner()
        .filter(|p| !is_keyword(p.as_rule()) && p.as_rule() != Rule::type_annotation)
}

fn malformed_at(loc: SourceLocation, what: &str) -> TranspileError {
    TranspileError::ParseError {
        line: loc.line,
        column: loc.column,
        message: format!("malformed {what}"),
    }
}

fn malformed(pair: &Pair<Rule>, what: &str) -> TranspileError {
    malformed_at(loc_of(pair), what)
}

fn next_child<'i>(
    inner: &mut impl Iterator<Item = Pair<'i, Rule>>,
    loc: SourceLocation,
    what: &str,
) -> ParseResult<Pair<'i, Rule>> {
    inner.next().ok_or_else(|| malformed_at(loc, what))
}

fn build_stmt(pair: Pair<Rule>) -> ParseResult<Stmt> {
    let loc = loc_of(&pair);
    let kind = match pair.as_rule() {
        Rule::block => StmtKind::Block(build_block(pair)?),
        Rule::empty_stmt => StmtKind::Empty,
        Rule::var_stmt => {
            let decl = next_child(&mut pair.into_inner(), loc, "declaration")?;
            StmtKind::VarDecl(build_var_decl(decl)?)
        }
        Rule::function_decl => build_function(pair)?,
        Rule::if_stmt => {
            let mut inner = significant(pair);
            let test = build_expr(next_child(&mut inner, loc, "if statement")?)?;
            let consequent = build_stmt(next_child(&mut inner, loc, "if statement")?)?;
            let alternate = inner.next().map(build_stmt).transpose()?;
            StmtKind::If {
                test,
                consequent: Box::new(consequent),
                alternate: alternate.map(Box::new),
            }
        }
        Rule::while_stmt => {
            let mut inner = significant(pair);
            let test = build_expr(next_child(&mut inner, loc, "while statement")?)?;
            let body = build_stmt(next_child(&mut inner, loc, "while statement")?)?;
            StmtKind::While {
                test,
                body: Box::new(body),
            }
        }
        Rule::for_stmt => build_for(pair)?,
        Rule::for_of_stmt => {
            let is_in = pair.clone().into_inner().any(|p| p.as_rule() == Rule::kw_in);
            let kind = if is_in { "ForInStatement" } else { "ForOfStatement" };
            StmtKind::Unsupported(kind.to_string())
        }
        Rule::return_stmt => {
            let argument = significant(pair).next().map(build_expr).transpose()?;
            StmtKind::Return(argument)
        }
        Rule::break_stmt => StmtKind::Unsupported("BreakStatement".to_string()),
        Rule::continue_stmt => StmtKind::Unsupported("ContinueStatement".to_string()),
        Rule::expr_stmt => {
            let expr = next_child(&mut pair.into_inner(), loc, "expression statement")?;
            StmtKind::Expr(build_expr(expr)?)
        }
        _ => return Err(malformed(&pair, "statement")),
    };
    Ok(Stmt::new(kind, loc))
}

fn build_block(pair: Pair<Rule>) -> ParseResult<Vec<Stmt>> {
    pair.into_inner().map(build_stmt).collect()
}

fn build_var_decl(pair: Pair<Rule>) -> ParseResult<VarDecl> {
    let mut kind = VarKind::Let;
    let mut declarations = Vec::new();
    for child in pair.into_inner() {
        match child.as_rule() {
            Rule::var_kind => {
                kind = VarKind::from_keyword(child.as_str().trim()).unwrap_or(VarKind::Let);
            }
            Rule::declarator => {
                let loc = loc_of(&child);
                let mut inner = significant(child);
                let name = next_child(&mut inner, loc, "declarator")?.as_str().to_string();
                let init = inner.next().map(build_expr).transpose()?;
                declarations.push(Declarator { name, init, loc });
            }
            _ => {}
        }
    }
    Ok(VarDecl { kind, declarations })
}

fn build_function(pair: Pair<Rule>) -> ParseResult<StmtKind> {
    let loc = loc_of(&pair);
    let mut name = None;
    let mut params = Vec::new();
    let mut body = None;
    for child in significant(pair) {
        match child.as_rule() {
            Rule::ident => name = Some(child.as_str().to_string()),
            Rule::params => {
                for param in child.into_inner() {
                    let loc = loc_of(&param);
                    let ident = next_child(&mut significant(param), loc, "parameter")?;
                    params.push(Param {
                        name: ident.as_str().to_string(),
                        loc,
                    });
                }
            }
            Rule::block => body = Some(build_block(child)?),
            _ => {}
        }
    }
    match (name, body) {
        (Some(name), Some(body)) => Ok(StmtKind::FuncDecl { name, params, body }),
        _ => Err(malformed_at(loc, "function declaration")),
    }
}

fn build_for(pair: Pair<Rule>) -> ParseResult<StmtKind> {
    let loc = loc_of(&pair);
    let mut init = None;
    let mut test = None;
    let mut update = None;
    let mut body = None;
    for child in significant(pair) {
        match child.as_rule() {
            Rule::for_init => {
                let init_loc = loc_of(&child);
                let inner = next_child(&mut child.into_inner(), init_loc, "for initializer")?;
                init = Some(match inner.as_rule() {
                    Rule::var_decl => ForInit::VarDecl(build_var_decl(inner)?),
                    _ => ForInit::Expr(build_expr(inner)?),
                });
            }
            Rule::for_test => test = child.into_inner().next().map(build_expr).transpose()?,
            Rule::for_update => update = child.into_inner().next().map(build_expr).transpose()?,
            _ => body = Some(build_stmt(child)?),
        }
    }
    let body = body.ok_or_else(|| malformed_at(loc, "for statement"))?;
    Ok(StmtKind::For {
        init,
        test,
        update,
        body: Box::new(body),
    })
}

/// Build an expression from any expression-level pair
fn build_expr(pair: Pair<Rule>) -> ParseResult<Expr> {
    let loc = loc_of(&pair);
    match pair.as_rule() {
        Rule::expression => {
            let mut inner = pair.into_inner();
            let lhs = build_expr(next_child(&mut inner, loc, "expression")?)?;
            let Some(op) = inner.next() else {
                return Ok(lhs);
            };
            let op_loc = loc_of(&op);
            let symbol = op.as_str();
            let op = AssignOp::from_symbol(symbol).ok_or_else(|| TranspileError::ParseError {
                line: op_loc.line,
                column: op_loc.column,
                message: format!("unknown assignment operator '{symbol}'"),
            })?;
            let value = build_expr(next_child(&mut inner, op_loc, "assignment")?)?;
            if !matches!(lhs.kind, ExprKind::Ident(_) | ExprKind::Member { .. }) {
                return Err(TranspileError::ParseError {
                    line: lhs.loc.line,
                    column: lhs.loc.column,
                    message: "invalid assignment target".to_string(),
                });
            }
            Ok(Expr::new(
                ExprKind::Assign {
                    op,
                    target: Box::new(lhs),
                    value: Box::new(value),
                },
                loc,
            ))
        }
        Rule::conditional => {
            let mut inner = pair.into_inner();
            let test = build_expr(next_child(&mut inner, loc, "conditional expression")?)?;
            if inner.next().is_some() {
                return Ok(Expr::new(
                    ExprKind::Unsupported("ConditionalExpression".to_string()),
                    loc,
                ));
            }
            Ok(test)
        }
        Rule::binary => build_binary(pair),
        Rule::unary => build_unary(pair),
        Rule::postfix => build_postfix(pair),
        Rule::call_chain => build_call_chain(pair),
        _ => build_primary(pair),
    }
}

fn build_binary(pair: Pair<Rule>) -> ParseResult<Expr> {
    BINARY_PRATT
        .map_primary(build_expr)
        .map_infix(|lhs, op, rhs| {
            let lhs = lhs?;
            let rhs = rhs?;
            let loc = lhs.loc;
            let kind = match op.as_rule() {
                Rule::op_and => logical(LogicalOp::And, lhs, rhs),
                Rule::op_or => logical(LogicalOp::Or, lhs, rhs),
                Rule::op_nullish => logical(LogicalOp::Nullish, lhs, rhs),
                _ => {
                    let symbol = op.as_str().trim();
                    let op = BinaryOp::from_symbol(symbol).ok_or_else(|| malformed(&op, "operator"))?;
                    ExprKind::Binary {
                        op,
                        left: Box::new(lhs),
                        right: Box::new(rhs),
                    }
                }
            };
            Ok(Expr::new(kind, loc))
        })
        .parse(pair.into_inner())
}

fn logical(op: LogicalOp, left: Expr, right: Expr) -> ExprKind {
    ExprKind::Logical {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn build_unary(pair: Pair<Rule>) -> ParseResult<Expr> {
    let loc = loc_of(&pair);
    let children: Vec<Pair<Rule>> = pair.into_inner().collect();
    let Some((operand, prefixes)) = children.split_last() else {
        return Err(malformed_at(loc, "unary expression"));
    };
    let mut expr = build_expr(operand.clone())?;
    // Innermost prefix operator applies first.
    for prefix in prefixes.iter().rev() {
        let loc = loc_of(prefix);
        let kind = match prefix.as_rule() {
            Rule::op_incr | Rule::op_decr => ExprKind::Update {
                op: UpdateOp::from_symbol(prefix.as_str()).ok_or_else(|| malformed(prefix, "update"))?,
                prefix: true,
                argument: Box::new(expr),
            },
            _ => ExprKind::Unary {
                op: UnaryOp::from_symbol(prefix.as_str().trim())
                    .ok_or_else(|| malformed(prefix, "unary operator"))?,
                argument: Box::new(expr),
            },
        };
        expr = Expr::new(kind, loc);
    }
    Ok(expr)
}

fn build_postfix(pair: Pair<Rule>) -> ParseResult<Expr> {
    let loc = loc_of(&pair);
    let mut inner = pair.into_inner();
    let operand = build_expr(next_child(&mut inner, loc, "postfix expression")?)?;
    match inner.next() {
        Some(op) => {
            let loc = operand.loc;
            let op = UpdateOp::from_symbol(op.as_str()).ok_or_else(|| malformed(&op, "update"))?;
            Ok(Expr::new(
                ExprKind::Update {
                    op,
                    prefix: false,
                    argument: Box::new(operand),
                },
                loc,
            ))
        }
        None => Ok(operand),
    }
}

fn build_call_chain(pair: Pair<Rule>) -> ParseResult<Expr> {
    let loc = loc_of(&pair);
    let mut inner = pair.into_inner();
    let mut expr = build_expr(next_child(&mut inner, loc, "call expression")?)?;
    for link in inner {
        let kind = match link.as_rule() {
            Rule::call_args => ExprKind::Call {
                callee: Box::new(expr),
                args: build_list(link)?,
            },
            Rule::member_dot => {
                let link_loc = loc_of(&link);
                let name = next_child(&mut link.into_inner(), link_loc, "member access")?
                    .as_str()
                    .to_string();
                ExprKind::Member {
                    object: Box::new(expr),
                    property: MemberProperty::Named(name),
                }
            }
            Rule::member_index => {
                let link_loc = loc_of(&link);
                let index = build_expr(next_child(&mut link.into_inner(), link_loc, "index access")?)?;
                ExprKind::Member {
                    object: Box::new(expr),
                    property: MemberProperty::Computed(Box::new(index)),
                }
            }
            _ => ExprKind::Unsupported("ChainExpression".to_string()),
        };
        expr = Expr::new(kind, loc);
    }
    Ok(expr)
}

fn build_list(pair: Pair<Rule>) -> ParseResult<Vec<Expr>> {
    pair.into_inner().map(build_expr).collect()
}

fn build_primary(pair: Pair<Rule>) -> ParseResult<Expr> {
    let loc = loc_of(&pair);
    let kind = match pair.as_rule() {
        Rule::paren => {
            return build_expr(next_child(&mut pair.into_inner(), loc, "parenthesized expression")?);
        }
        Rule::ident => ExprKind::Ident(pair.as_str().to_string()),
        Rule::number => ExprKind::Literal(Literal::Number(utils::parse_number(pair.as_str()).ok_or_else(
            || malformed(&pair, "number literal"),
        )?)),
        Rule::string => {
            let raw = pair.clone().into_inner().next().map(|p| p.as_str()).unwrap_or("");
            let value = utils::unescape_string(raw).ok_or_else(|| malformed(&pair, "string literal"))?;
            ExprKind::Literal(Literal::String(value))
        }
        Rule::kw_true => ExprKind::Literal(Literal::Bool(true)),
        Rule::kw_false => ExprKind::Literal(Literal::Bool(false)),
        Rule::kw_null => ExprKind::Literal(Literal::Null),
        Rule::array_lit => ExprKind::Array(build_list(pair)?),
        Rule::spread => ExprKind::Unsupported("SpreadElement".to_string()),
        Rule::object_lit => ExprKind::Unsupported("ObjectExpression".to_string()),
        Rule::template => ExprKind::Unsupported("TemplateLiteral".to_string()),
        Rule::kw_this => ExprKind::Unsupported("ThisExpression".to_string()),
        Rule::new_expr => ExprKind::Unsupported("NewExpression".to_string()),
        Rule::function_expr => ExprKind::Unsupported("FunctionExpression".to_string()),
        _ => return Err(malformed(&pair, "expression")),
    };
    Ok(Expr::new(kind, loc))
}

#[cfg(test)]
mod tests;
