//! ESTree reader - builds the AST from an ESTree JSON document
//!
//! Accepts the output of `@typescript-eslint/typescript-estree` (or any
//! ESTree producer) serialized as JSON with `loc: true`. Node types the
//! emitter does not know are kept as `Unsupported` nodes; a document missing
//! required fields is rejected as malformed.

use serde_json::Value;

use super::ast::*;
use super::location::SourceLocation;
use crate::error::TranspileError;

type ReadResult<T> = Result<T, TranspileError>;

/// Parse an ESTree JSON document into a [`Program`]
pub fn parse_estree(json: &str) -> ReadResult<Program> {
    let value: Value = serde_json::from_str(json)?;
    read_program(&value)
}

/// Convert an already-decoded ESTree `Program` node
pub fn read_program(node: &Value) -> ReadResult<Program> {
    let kind = node_type(node)?;
    if kind != "Program" {
        return Err(malformed(node, format!("expected Program, found {kind}")));
    }
    let body = array_field(node, "body")?
        .iter()
        .map(read_stmt)
        .collect::<ReadResult<Vec<_>>>()?;
    Ok(Program { body })
}

fn malformed(node: &Value, message: String) -> TranspileError {
    let loc = location(node);
    let message = if loc.is_known() {
        format!("{message} (at {loc})")
    } else {
        message
    };
    TranspileError::AstError { message }
}

fn location(node: &Value) -> SourceLocation {
    let start = &node["loc"]["start"];
    match (start["line"].as_u64(), start["column"].as_u64()) {
        // ESTree columns are 0-based.
        (Some(line), Some(column)) => SourceLocation::new(line as usize, column as usize + 1),
        _ => SourceLocation::unknown(),
    }
}

fn node_type(node: &Value) -> ReadResult<&str> {
    node["type"]
        .as_str()
        .ok_or_else(|| malformed(node, "node without a type".to_string()))
}

fn field<'a>(node: &'a Value, name: &str) -> ReadResult<&'a Value> {
    match node.get(name) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(malformed(
            node,
            format!("{} is missing '{name}'", node["type"].as_str().unwrap_or("node")),
        )),
    }
}

fn optional_field<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    node.get(name).filter(|value| !value.is_null())
}

fn array_field<'a>(node: &'a Value, name: &str) -> ReadResult<&'a Vec<Value>> {
    field(node, name)?
        .as_array()
        .ok_or_else(|| malformed(node, format!("'{name}' is not an array")))
}

fn str_field<'a>(node: &'a Value, name: &str) -> ReadResult<&'a str> {
    field(node, name)?
        .as_str()
        .ok_or_else(|| malformed(node, format!("'{name}' is not a string")))
}

fn bool_flag(node: &Value, name: &str) -> bool {
    node[name].as_bool().unwrap_or(false)
}

fn identifier_name(node: &Value) -> ReadResult<Option<&str>> {
    if node_type(node)? == "Identifier" {
        Ok(Some(str_field(node, "name")?))
    } else {
        Ok(None)
    }
}

fn read_stmt(node: &Value) -> ReadResult<Stmt> {
    let loc = location(node);
    let kind = match node_type(node)? {
        "ExpressionStatement" => StmtKind::Expr(read_expr(field(node, "expression")?)?),
        "VariableDeclaration" => match read_var_decl(node)? {
            Ok(decl) => StmtKind::VarDecl(decl),
            Err(unsupported) => return Ok(unsupported),
        },
        "IfStatement" => StmtKind::If {
            test: read_expr(field(node, "test")?)?,
            consequent: Box::new(read_stmt(field(node, "consequent")?)?),
            alternate: optional_field(node, "alternate")
                .map(read_stmt)
                .transpose()?
                .map(Box::new),
        },
        "WhileStatement" => StmtKind::While {
            test: read_expr(field(node, "test")?)?,
            body: Box::new(read_stmt(field(node, "body")?)?),
        },
        "ForStatement" => {
            let init = match optional_field(node, "init") {
                Some(init) if init["type"] == "VariableDeclaration" => match read_var_decl(init)? {
                    Ok(decl) => Some(ForInit::VarDecl(decl)),
                    Err(unsupported) => return Ok(unsupported),
                },
                Some(init) => Some(ForInit::Expr(read_expr(init)?)),
                None => None,
            };
            StmtKind::For {
                init,
                test: optional_field(node, "test").map(read_expr).transpose()?,
                update: optional_field(node, "update").map(read_expr).transpose()?,
                body: Box::new(read_stmt(field(node, "body")?)?),
            }
        }
        "BlockStatement" => StmtKind::Block(read_stmts(node)?),
        "FunctionDeclaration" => {
            if bool_flag(node, "async") || bool_flag(node, "generator") {
                let kind = if bool_flag(node, "async") {
                    "AsyncFunctionDeclaration"
                } else {
                    "GeneratorFunctionDeclaration"
                };
                return Ok(Stmt::new(StmtKind::Unsupported(kind.to_string()), loc));
            }
            let id = field(node, "id")?;
            let name = identifier_name(id)?
                .ok_or_else(|| malformed(id, "function name is not an identifier".to_string()))?
                .to_string();
            let mut params = Vec::new();
            for param in array_field(node, "params")? {
                match identifier_name(param)? {
                    Some(param_name) => params.push(Param {
                        name: param_name.to_string(),
                        loc: location(param),
                    }),
                    // Default values, rest and destructuring parameters
                    None => {
                        let kind = node_type(param)?.to_string();
                        return Ok(Stmt::new(StmtKind::Unsupported(kind), location(param)));
                    }
                }
            }
            StmtKind::FuncDecl {
                name,
                params,
                body: read_stmts(field(node, "body")?)?,
            }
        }
        "ReturnStatement" => {
            StmtKind::Return(optional_field(node, "argument").map(read_expr).transpose()?)
        }
        "EmptyStatement" => StmtKind::Empty,
        other => StmtKind::Unsupported(other.to_string()),
    };
    Ok(Stmt::new(kind, loc))
}

fn read_stmts(block: &Value) -> ReadResult<Vec<Stmt>> {
    array_field(block, "body")?.iter().map(read_stmt).collect()
}

/// Inner `Err` carries an unsupported-statement node for declarations with
/// binding patterns (`const { a } = obj`).
fn read_var_decl(node: &Value) -> ReadResult<Result<VarDecl, Stmt>> {
    let keyword = str_field(node, "kind")?;
    let Some(kind) = VarKind::from_keyword(keyword) else {
        return Ok(Err(Stmt::new(
            StmtKind::Unsupported(format!("VariableDeclaration({keyword})")),
            location(node),
        )));
    };
    let mut declarations = Vec::new();
    for declarator in array_field(node, "declarations")? {
        let id = field(declarator, "id")?;
        let Some(name) = identifier_name(id)? else {
            return Ok(Err(Stmt::new(
                StmtKind::Unsupported(node_type(id)?.to_string()),
                location(id),
            )));
        };
        declarations.push(Declarator {
            name: name.to_string(),
            init: optional_field(declarator, "init").map(read_expr).transpose()?,
            loc: location(declarator),
        });
    }
    Ok(Ok(VarDecl { kind, declarations }))
}

fn read_expr(node: &Value) -> ReadResult<Expr> {
    let loc = location(node);
    let kind = match node_type(node)? {
        "Literal" => read_literal(node)?,
        "Identifier" => ExprKind::Ident(str_field(node, "name")?.to_string()),
        "ArrayExpression" => {
            let mut elements = Vec::new();
            for element in array_field(node, "elements")? {
                if element.is_null() {
                    elements.push(Expr::new(ExprKind::Unsupported("ArrayHole".to_string()), loc));
                } else {
                    elements.push(read_expr(element)?);
                }
            }
            ExprKind::Array(elements)
        }
        "MemberExpression" if !bool_flag(node, "optional") => {
            let object = Box::new(read_expr(field(node, "object")?)?);
            let property = field(node, "property")?;
            let property = if bool_flag(node, "computed") {
                MemberProperty::Computed(Box::new(read_expr(property)?))
            } else {
                match identifier_name(property)? {
                    Some(name) => MemberProperty::Named(name.to_string()),
                    // Private names (`obj.#field`)
                    None => return Ok(Expr::new(ExprKind::Unsupported(node_type(property)?.to_string()), loc)),
                }
            };
            ExprKind::Member { object, property }
        }
        "CallExpression" if !bool_flag(node, "optional") => ExprKind::Call {
            callee: Box::new(read_expr(field(node, "callee")?)?),
            args: array_field(node, "arguments")?
                .iter()
                .map(read_expr)
                .collect::<ReadResult<Vec<_>>>()?,
        },
        "BinaryExpression" => {
            let symbol = str_field(node, "operator")?;
            let op = BinaryOp::from_symbol(symbol)
                .ok_or_else(|| malformed(node, format!("unknown binary operator '{symbol}'")))?;
            ExprKind::Binary {
                op,
                left: Box::new(read_expr(field(node, "left")?)?),
                right: Box::new(read_expr(field(node, "right")?)?),
            }
        }
        "LogicalExpression" => {
            let symbol = str_field(node, "operator")?;
            let op = LogicalOp::from_symbol(symbol)
                .ok_or_else(|| malformed(node, format!("unknown logical operator '{symbol}'")))?;
            ExprKind::Logical {
                op,
                left: Box::new(read_expr(field(node, "left")?)?),
                right: Box::new(read_expr(field(node, "right")?)?),
            }
        }
        "UnaryExpression" => {
            let symbol = str_field(node, "operator")?;
            let op = UnaryOp::from_symbol(symbol)
                .ok_or_else(|| malformed(node, format!("unknown unary operator '{symbol}'")))?;
            ExprKind::Unary {
                op,
                argument: Box::new(read_expr(field(node, "argument")?)?),
            }
        }
        "UpdateExpression" => {
            let symbol = str_field(node, "operator")?;
            let op = UpdateOp::from_symbol(symbol)
                .ok_or_else(|| malformed(node, format!("unknown update operator '{symbol}'")))?;
            ExprKind::Update {
                op,
                prefix: bool_flag(node, "prefix"),
                argument: Box::new(read_expr(field(node, "argument")?)?),
            }
        }
        "AssignmentExpression" => {
            let symbol = str_field(node, "operator")?;
            let op = AssignOp::from_symbol(symbol)
                .ok_or_else(|| malformed(node, format!("unknown assignment operator '{symbol}'")))?;
            let target = field(node, "left")?;
            if !matches!(node_type(target)?, "Identifier" | "MemberExpression") {
                return Ok(Expr::new(
                    ExprKind::Unsupported(node_type(target)?.to_string()),
                    location(target),
                ));
            }
            ExprKind::Assign {
                op,
                target: Box::new(read_expr(target)?),
                value: Box::new(read_expr(field(node, "right")?)?),
            }
        }
        "MemberExpression" | "CallExpression" => ExprKind::Unsupported("ChainExpression".to_string()),
        other => ExprKind::Unsupported(other.to_string()),
    };
    Ok(Expr::new(kind, loc))
}

fn read_literal(node: &Value) -> ReadResult<ExprKind> {
    if node.get("regex").is_some() {
        return Ok(ExprKind::Unsupported("RegExpLiteral".to_string()));
    }
    if node.get("bigint").is_some() {
        return Ok(ExprKind::Unsupported("BigIntLiteral".to_string()));
    }
    let literal = match node.get("value") {
        Some(Value::Number(n)) => Literal::Number(
            n.as_f64()
                .ok_or_else(|| malformed(node, "number out of range".to_string()))?,
        ),
        Some(Value::String(s)) => Literal::String(s.clone()),
        Some(Value::Bool(b)) => Literal::Bool(*b),
        Some(Value::Null) => Literal::Null,
        _ => return Err(malformed(node, "Literal without a value".to_string())),
    };
    Ok(ExprKind::Literal(literal))
}
