//! ts2cpp CLI - TypeScript subset to C++ transpiler

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use ts2cpp::assembler::{self, AssemblerOptions, MAIN_FILE};
use ts2cpp::diagnostics::{self, Diagnostics};
use ts2cpp::error::TranspileError;
use ts2cpp::{parser, SourceFormat, TranspileOptions};

/// ts2cpp - TypeScript subset to C++ transpiler
#[derive(Parser, Debug)]
#[command(name = "ts2cpp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Transpile a TypeScript subset to C++", long_about = None)]
struct Cli {
    /// Input file (TypeScript source, or ESTree JSON with --estree)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output C++ file
    #[arg(short, long, value_name = "OUTPUT", default_value = MAIN_FILE)]
    output: PathBuf,

    /// Write main.cpp and the runtime support unit into a folder
    #[arg(short, long, value_name = "PROJECT_DIR")]
    project: Option<PathBuf>,

    /// Treat INPUT as an ESTree JSON document (implied by a .json extension)
    #[arg(long)]
    estree: bool,

    /// Include name of the runtime support unit
    #[arg(long, value_name = "NAME", default_value = assembler::DEFAULT_RUNTIME_INCLUDE)]
    include: String,

    /// Dump the parsed AST as JSON and exit
    #[arg(long)]
    dump_ast: bool,

    /// Check only (don't write output)
    #[arg(short, long)]
    check: bool,

    /// Emit JSON diagnostics to stderr (on failure only)
    #[arg(long)]
    diag_json: bool,

    /// Show debug information
    #[arg(short, long)]
    debug: bool,
}

fn fail(diags: &Diagnostics, json: bool) -> ! {
    print!("{}", diags.to_text());
    if json {
        eprintln!("{}", diags.to_json());
    }
    std::process::exit(1);
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    log::debug!("input: {:?}", cli.input);
    log::debug!("output: {:?}, project: {:?}", cli.output, cli.project);

    if !cli.input.exists() {
        let err = TranspileError::MissingInput {
            path: cli.input.clone(),
        };
        fail(&diagnostics::from_error(&err, Some(&cli.input)), cli.diag_json);
    }

    let source = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    log::debug!("source length: {} bytes", source.len());

    let format = if cli.estree {
        SourceFormat::Estree
    } else {
        SourceFormat::from_path(&cli.input)
    };

    if cli.dump_ast {
        let program = match format {
            SourceFormat::TypeScript => parser::parse(&source),
            SourceFormat::Estree => parser::estree::parse_estree(&source),
        };
        match program {
            Ok(program) => {
                println!("{}", serde_json::to_string_pretty(&program)?);
                return Ok(());
            }
            Err(err) => fail(&diagnostics::from_error(&err, Some(&cli.input)), cli.diag_json),
        }
    }

    let options = TranspileOptions {
        assembler: AssemblerOptions {
            runtime_include: cli.include.clone(),
        },
        ..TranspileOptions::default()
    };

    let translation =
        match ts2cpp::transpile_with_diagnostics(&source, format, Some(&cli.input), &options) {
            Ok(translation) => translation,
            Err(diags) => fail(&diags, cli.diag_json),
        };
    if !translation.diagnostics.is_empty() {
        print!("{}", translation.diagnostics.to_text());
        log::warn!("{} warning(s)", translation.diagnostics.warnings().count());
    }
    log::debug!("generated C++:\n{}", translation.code);

    if cli.check {
        println!("✅ Transpilation successful!");
        return Ok(());
    }

    if let Some(dir) = &cli.project {
        if let Err(err) = assembler::write_project(dir, &translation.code, &options.assembler) {
            fail(&diagnostics::from_error(&err, None), cli.diag_json);
        }
        println!("✅ Generated project: {}/", dir.display());
        println!("   Build: g++ -std=c++20 {}/{}", dir.display(), MAIN_FILE);
        return Ok(());
    }

    assembler::write_program(&cli.output, &translation.code)?;
    println!("✅ Transpiled to: {:?}", cli.output);

    Ok(())
}
