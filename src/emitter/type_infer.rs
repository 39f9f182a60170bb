//! Element type selection for array declarations
//!
//! A spelling heuristic, not type checking: only the first element of the
//! literal is inspected and later elements are never validated. Anything that
//! is not a number, string or boolean literal falls back to `auto`.

use crate::parser::{Expr, ExprKind, Literal};

/// Element type chosen for a `std::vector` declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Integer,
    Text,
    Boolean,
    /// Empty array or non-literal first element
    Unspecified,
}

impl ElementType {
    /// C++ spelling of the element type
    pub fn cpp_name(&self) -> &'static str {
        match self {
            ElementType::Integer => "int",
            ElementType::Text => "std::string",
            ElementType::Boolean => "bool",
            ElementType::Unspecified => "auto",
        }
    }
}

/// Pick the element type of an array literal from its first element
///
/// Every numeric literal counts as integer, including `2.5`.
pub fn infer_array_element_type(elements: &[Expr]) -> ElementType {
    match elements.first().map(|e| &e.kind) {
        Some(ExprKind::Literal(Literal::Number(_))) => ElementType::Integer,
        Some(ExprKind::Literal(Literal::String(_))) => ElementType::Text,
        Some(ExprKind::Literal(Literal::Bool(_))) => ElementType::Boolean,
        _ => ElementType::Unspecified,
    }
}
