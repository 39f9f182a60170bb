//! Diagnostics - collection and output of translation problems

use serde::Serialize;
use serde_json::json;
use std::path::Path;

use crate::emitter::{EmitIssue, IssueKind};
use crate::error::TranspileError;
use crate::parser::SourceLocation;
use crate::unsupported_features::{UnsupportedFeature, UnsupportedFeatureRegistry};

pub const MISSING_INPUT: &str = "T2C-MISSING-INPUT";
pub const IO_ERROR: &str = "T2C-IO-ERROR";
pub const PARSE_ERROR: &str = "T2C-PARSE-ERROR";
pub const AST_ERROR: &str = "T2C-AST-ERROR";
pub const UNSUPPORTED_SYNTAX: &str = "T2C-UNSUPPORTED-SYNTAX";
pub const UNSUPPORTED_CONSTRUCT: &str = "T2C-UNSUPPORTED-CONSTRUCT";
pub const PARTIAL_TRANSLATION: &str = "T2C-PARTIAL-TRANSLATION";
pub const INVALID_INCLUDE: &str = "T2C-INVALID-INCLUDE";

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticSpan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub span: DiagnosticSpan,
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Diagnostics {
    pub diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn add(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
    }

    /// The first error, converted back into a [`TranspileError`]
    pub fn first_error(&self) -> Option<TranspileError> {
        let diag = self
            .diagnostics
            .iter()
            .find(|d| d.severity == DiagnosticSeverity::Error)?;
        let construct = diag
            .meta
            .as_ref()
            .and_then(|meta| meta["construct"].as_str())
            .map(str::to_string);
        let err = match (diag.code.as_str(), construct) {
            (PARSE_ERROR, _) => TranspileError::ParseError {
                line: diag.span.line,
                column: diag.span.column,
                message: diag.message.clone(),
            },
            (UNSUPPORTED_SYNTAX | UNSUPPORTED_CONSTRUCT, Some(construct)) => {
                TranspileError::UnsupportedConstruct {
                    construct,
                    line: diag.span.line,
                }
            }
            _ => TranspileError::AstError {
                message: diag.message.clone(),
            },
        };
        Some(err)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for diag in &self.diagnostics {
            let file = diag.span.file.as_deref().unwrap_or("<input>");
            out.push_str(&format!(
                "[{}] {}:{}:{} {}\n",
                diag.code, file, diag.span.line, diag.span.column, diag.message
            ));
        }
        out
    }
}

pub fn span_for_line(file: Option<&Path>, line: usize, column: usize, len: usize) -> DiagnosticSpan {
    let end_col = if len == 0 {
        column
    } else {
        column + len.saturating_sub(1)
    };
    DiagnosticSpan {
        file: file.map(|p| p.display().to_string()),
        line,
        column,
        end_line: line,
        end_column: end_col,
    }
}

pub fn span_for_location(file: Option<&Path>, loc: SourceLocation, len: usize) -> DiagnosticSpan {
    span_for_line(file, loc.line, loc.column, len)
}

pub fn error_diag(code: &str, message: String, span: DiagnosticSpan, phase: &str) -> Diagnostic {
    Diagnostic {
        code: code.to_string(),
        message,
        severity: DiagnosticSeverity::Error,
        span,
        phase: phase.to_string(),
        meta: None,
    }
}

pub fn warning_diag(code: &str, message: String, span: DiagnosticSpan, phase: &str) -> Diagnostic {
    Diagnostic {
        severity: DiagnosticSeverity::Warning,
        ..error_diag(code, message, span, phase)
    }
}

pub fn from_error(err: &TranspileError, file: Option<&Path>) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let (code, message, line, column, phase) = match err {
        TranspileError::MissingInput { .. } => (MISSING_INPUT, err.to_string(), 1, 1, "io"),
        TranspileError::ParseError {
            line,
            column,
            message,
        } => (PARSE_ERROR, message.clone(), *line, *column, "parse"),
        TranspileError::AstError { message } => (AST_ERROR, message.clone(), 1, 1, "parse"),
        TranspileError::UnsupportedConstruct { construct, line } => (
            UNSUPPORTED_CONSTRUCT,
            format!("unsupported construct: {construct}"),
            *line,
            1,
            "emit",
        ),
        TranspileError::InvalidInclude { .. } => (INVALID_INCLUDE, err.to_string(), 1, 1, "io"),
        TranspileError::IoError(_) => (IO_ERROR, err.to_string(), 1, 1, "io"),
        TranspileError::JsonError(json_err) => (
            AST_ERROR,
            err.to_string(),
            json_err.line().max(1),
            json_err.column().max(1),
            "parse",
        ),
    };
    let span = span_for_line(file, line, column, 1);
    diags.add(error_diag(code, message, span, phase));
    diags
}

/// Convert emitter issues: unsupported constructs are errors, partial
/// translations are warnings
pub fn from_emit_issues(issues: &[EmitIssue], file: Option<&Path>) -> Diagnostics {
    let mut diags = Diagnostics::new();
    for issue in issues {
        let span = span_for_location(file, issue.loc, 1);
        let mut diag = match issue.kind {
            IssueKind::Unsupported => error_diag(
                UNSUPPORTED_CONSTRUCT,
                format!("unsupported construct: {}", issue.construct),
                span,
                "emit",
            ),
            IssueKind::Partial => warning_diag(
                PARTIAL_TRANSLATION,
                format!("partial translation: {}", issue.construct),
                span,
                "emit",
            ),
        };
        diag.meta = Some(json!({ "construct": issue.construct }));
        diags.add(diag);
    }
    diags
}

/// Comment and string state carried from one line to the next
#[derive(Debug, Default)]
struct MaskState {
    in_block_comment: bool,
    in_template: bool,
}

/// Blank out comments and string contents, keeping columns intact
fn mask_line(line: &str, state: &mut MaskState) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut string_char: Option<char> = if state.in_template { Some('`') } else { None };
    let mut escape = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        if state.in_block_comment {
            if c == '*' && next == Some('/') {
                state.in_block_comment = false;
                out.push_str("  ");
                i += 2;
            } else {
                out.push(' ');
                i += 1;
            }
            continue;
        }
        if let Some(quote) = string_char {
            out.push(' ');
            i += 1;
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == quote {
                string_char = None;
            }
            continue;
        }
        match (c, next) {
            ('/', Some('/')) => break,
            ('/', Some('*')) => {
                state.in_block_comment = true;
                out.push_str("  ");
                i += 2;
            }
            ('"' | '\'' | '`', _) => {
                string_char = Some(c);
                out.push(' ');
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    // Only template literals may span lines.
    state.in_template = string_char == Some('`');
    out
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Byte offset of `keyword` as a whole word, not preceded by `.`
fn find_keyword(line: &str, keyword: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let k = keyword.as_bytes();
    if k.is_empty() {
        return None;
    }
    let mut i = 0usize;
    while i + k.len() <= bytes.len() {
        if &bytes[i..i + k.len()] == k {
            let left_ok = i == 0 || !(is_ident_byte(bytes[i - 1]) || bytes[i - 1] == b'.');
            let right_ok = i + k.len() == bytes.len() || !is_ident_byte(bytes[i + k.len()]);
            if left_ok && right_ok {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// `expr as Type` / `expr satisfies Type`: the operator sits between an
/// operand and a type
fn find_type_operator(line: &str, keyword: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(offset) = find_keyword(&line[from..], keyword) {
        let pos = from + offset;
        let before = line[..pos].trim_end().bytes().last();
        let after = line[pos + keyword.len()..].trim_start().bytes().next();
        let operand_before = before.is_some_and(|b| is_ident_byte(b) || b == b')' || b == b']');
        let type_after = after.is_some_and(|b| is_ident_byte(b) || matches!(b, b'{' | b'[' | b'(' | b'"' | b'\''));
        if operand_before && type_after {
            return Some(pos);
        }
        from = pos + keyword.len();
    }
    None
}

/// `namespace Name` / `declare let ...`: the keyword opens a declaration
fn find_declaration_keyword(line: &str, keyword: &str) -> Option<usize> {
    let pos = find_keyword(line, keyword)?;
    let next = line[pos + keyword.len()..].trim_start().bytes().next();
    next.is_some_and(|b| b.is_ascii_alphabetic() || b == b'_' || b == b'$')
        .then_some(pos)
}

/// `type Name = ...` or `type Name<T> = ...`
fn find_type_alias(line: &str) -> Option<usize> {
    let pos = find_keyword(line, "type")?;
    let rest = line[pos + "type".len()..].trim_start();
    let name_len = rest.bytes().take_while(|b| is_ident_byte(*b)).count();
    if name_len == 0 {
        return None;
    }
    let mut rest = rest[name_len..].trim_start();
    if rest.starts_with('<') {
        let close = rest.find('>')?;
        rest = rest[close + 1..].trim_start();
    }
    (rest.starts_with('=') && !rest.starts_with("==")).then_some(pos)
}

/// Report TypeScript syntax no front end can translate
pub fn scan_unsupported_syntax(
    source: &str,
    file: Option<&Path>,
    registry: &UnsupportedFeatureRegistry,
) -> Diagnostics {
    use UnsupportedFeature as UF;

    let checks: [(&str, UF, &str); 17] = [
        ("class", UF::ClassDeclaration, "class declarations are unsupported"),
        ("=>", UF::ArrowFunction, "arrow functions are unsupported"),
        ("async", UF::AsyncFunction, "async functions are unsupported"),
        ("await", UF::AwaitExpr, "await is unsupported"),
        ("import", UF::ImportDeclaration, "import is unsupported"),
        ("export", UF::ExportDeclaration, "export is unsupported"),
        ("try", UF::TryStatement, "try statement is unsupported"),
        ("throw", UF::ThrowStatement, "throw statement is unsupported"),
        ("switch", UF::SwitchStatement, "switch statement is unsupported"),
        ("do", UF::DoWhileStatement, "do-while loop is unsupported"),
        ("yield", UF::YieldExpr, "yield is unsupported"),
        ("interface", UF::InterfaceDeclaration, "interface declarations are unsupported"),
        ("enum", UF::EnumDeclaration, "enum declarations are unsupported"),
        ("as", UF::AsExpression, "type assertions with 'as' are unsupported"),
        ("satisfies", UF::SatisfiesExpression, "satisfies expressions are unsupported"),
        ("namespace", UF::NamespaceDeclaration, "namespace declarations are unsupported"),
        ("declare", UF::AmbientDeclaration, "ambient declarations are unsupported"),
    ];

    let mut diags = Diagnostics::new();
    let mut state = MaskState::default();
    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = mask_line(raw_line, &mut state);
        if line.trim().is_empty() {
            continue;
        }

        for (kw, feature, msg) in checks {
            if !registry.is_enabled(feature) {
                continue;
            }
            let pos = match kw {
                "=>" => line.find(kw),
                "as" | "satisfies" => find_type_operator(&line, kw),
                "namespace" | "declare" => find_declaration_keyword(&line, kw),
                _ => find_keyword(&line, kw),
            };
            if let Some(col) = pos {
                let span = span_for_line(file, line_no, col + 1, kw.len());
                let mut diag = error_diag(UNSUPPORTED_SYNTAX, msg.to_string(), span, "scan");
                diag.meta = Some(json!({ "construct": kw }));
                diags.add(diag);
            }
        }

        if registry.is_enabled(UF::TypeAlias) {
            if let Some(col) = find_type_alias(&line) {
                let span = span_for_line(file, line_no, col + 1, "type".len());
                let mut diag = error_diag(
                    UNSUPPORTED_SYNTAX,
                    "type aliases are unsupported".to_string(),
                    span,
                    "scan",
                );
                diag.meta = Some(json!({ "construct": "type" }));
                diags.add(diag);
            }
        }
    }
    diags
}
