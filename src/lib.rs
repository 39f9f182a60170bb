//! ts2cpp - TypeScript subset to C++ transpiler
//!
//! # Overview
//! Translates a small, fixed subset of TypeScript (numbers, strings, arrays,
//! functions and structured control flow) into a single C++ translation unit
//! that includes a runtime support file and runs the script body from `main`.
//!
//! Pipeline: source → [`parser`] (pest grammar or ESTree JSON) → [`emitter`]
//! (consulting the [`shims::ShimTable`]) → [`assembler`].

pub mod assembler;
pub mod diagnostics;
pub mod emitter;
pub mod error;
pub mod parser;
pub mod shims;
pub mod unsupported_features;

use anyhow::Result;
use std::path::Path;

use assembler::AssemblerOptions;
use diagnostics::Diagnostics;
use error::TranspileError;
use parser::Program;
use shims::ShimTable;

/// Input flavour accepted by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// TypeScript source text
    #[default]
    TypeScript,
    /// ESTree JSON document
    Estree,
}

impl SourceFormat {
    /// `.json` inputs are ESTree documents, everything else is TypeScript
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceFormat::Estree,
            _ => SourceFormat::TypeScript,
        }
    }
}

/// Configuration for one translation run
#[derive(Debug, Clone, Default)]
pub struct TranspileOptions {
    pub shims: ShimTable,
    pub assembler: AssemblerOptions,
}

/// Generated C++ plus any non-fatal diagnostics
#[derive(Debug, Clone)]
pub struct Translation {
    pub code: String,
    pub diagnostics: Diagnostics,
}

/// Parse TypeScript source into the AST
pub fn parse_source(source: &str) -> Result<Program> {
    Ok(parser::parse(source)?)
}

/// Read an ESTree JSON document into the AST
pub fn parse_estree(json: &str) -> Result<Program> {
    Ok(parser::estree::parse_estree(json)?)
}

/// Transpile TypeScript source code to a complete C++ program
///
/// Runs the same pipeline as [`transpile_with_diagnostics`] and reports the
/// first error.
pub fn transpile(source: &str) -> Result<String> {
    match transpile_with_diagnostics(source, SourceFormat::TypeScript, None, &TranspileOptions::default()) {
        Ok(translation) => Ok(translation.code),
        Err(diags) => Err(diags
            .first_error()
            .unwrap_or_else(|| TranspileError::AstError {
                message: "translation failed without a reported error".to_string(),
            })
            .into()),
    }
}

/// Transpile source text of the given format, collecting diagnostics
pub fn transpile_with_diagnostics(
    source: &str,
    format: SourceFormat,
    file: Option<&Path>,
    options: &TranspileOptions,
) -> std::result::Result<Translation, Diagnostics> {
    let program = match format {
        SourceFormat::TypeScript => {
            let registry = unsupported_features::UnsupportedFeatureRegistry::default();
            let diags = diagnostics::scan_unsupported_syntax(source, file, &registry);
            if diags.has_errors() {
                return Err(diags);
            }
            parser::parse(source)
        }
        SourceFormat::Estree => parser::estree::parse_estree(source),
    };
    let program = program.map_err(|err| diagnostics::from_error(&err, file))?;
    log::debug!("parsed {} top-level statement(s)", program.body.len());
    transpile_program(&program, file, options)
}

/// Emit and assemble an already-parsed program
pub fn transpile_program(
    program: &Program,
    file: Option<&Path>,
    options: &TranspileOptions,
) -> std::result::Result<Translation, Diagnostics> {
    log::debug!("emitting with {} shim entries", options.shims.len());
    let emitted = emitter::emit(program, &options.shims)
        .map_err(|issues| diagnostics::from_emit_issues(&issues, file))?;
    for warning in &emitted.warnings {
        log::warn!("{warning}");
    }
    let diagnostics = diagnostics::from_emit_issues(&emitted.warnings, file);
    let code = assembler::assemble(&emitted, &options.assembler);
    log::debug!("assembled {} bytes of C++", code.len());
    Ok(Translation { code, diagnostics })
}

/// Read `input`, transpile it, and write the C++ program to `output`
///
/// The input format is chosen from the file extension.
pub fn transpile_file(input: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        return Err(TranspileError::MissingInput {
            path: input.to_path_buf(),
        }
        .into());
    }
    let source = std::fs::read_to_string(input).map_err(TranspileError::from)?;
    let format = SourceFormat::from_path(input);
    let translation = transpile_with_diagnostics(&source, format, Some(input), &TranspileOptions::default())
        .map_err(|diags| anyhow::anyhow!("{}", diags.to_text().trim_end()))?;
    assembler::write_program(output, &translation.code)?;
    Ok(())
}
