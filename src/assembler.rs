//! Program assembler - wraps emitted code in the C++ entry point
//!
//! Output shape:
//!
//! ```text
//! #include "basic.cpp"
//!
//! void helper(auto a) {
//!     ...
//! }
//!
//! int main() {
//!     <body>
//!     return 0;
//! }
//! ```

use std::fs;
use std::path::Path;

use crate::emitter::EmittedProgram;
use crate::error::{Result, TranspileError};

/// Runtime support unit bundled into generated projects
pub const RUNTIME_SUPPORT: &str = include_str!("../runtime/basic.cpp");

/// Default include name of the runtime support unit
pub const DEFAULT_RUNTIME_INCLUDE: &str = "basic.cpp";

/// File name of the generated translation unit
pub const MAIN_FILE: &str = "main.cpp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Name used in the `#include` directive (and for the bundled runtime file)
    pub runtime_include: String,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            runtime_include: DEFAULT_RUNTIME_INCLUDE.to_string(),
        }
    }
}

impl AssemblerOptions {
    /// Check that the runtime file can sit next to `main.cpp` in a project folder
    pub fn validate_project_include(&self) -> Result<()> {
        let name = &self.runtime_include;
        let reason = if name.is_empty() {
            "name is empty"
        } else if name == MAIN_FILE {
            "name collides with the generated main file"
        } else if name.contains(|c: char| c == '/' || c == '\\') || name == ".." || name == "." {
            "name must be a plain file name"
        } else {
            return Ok(());
        };
        Err(TranspileError::InvalidInclude {
            name: name.clone(),
            reason: reason.to_string(),
        })
    }
}

/// Render the complete C++ source for an emitted program
pub fn assemble(program: &EmittedProgram, options: &AssemblerOptions) -> String {
    let mut out = format!("#include \"{}\"\n\n", options.runtime_include);
    for function in &program.functions {
        out.push_str(function);
        out.push_str("\n\n");
    }
    out.push_str("int main() {\n");
    for stmt in &program.body {
        out.push_str(&indent(stmt));
        out.push('\n');
    }
    out.push_str("    return 0;\n");
    out.push_str("}\n");
    out
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("    {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `code` to `path`, replacing any previous content
pub fn write_program(path: &Path, code: &str) -> Result<()> {
    fs::write(path, code)?;
    log::info!("wrote {} ({} bytes)", path.display(), code.len());
    Ok(())
}

/// Write a compilable folder: `main.cpp` next to the runtime support unit
pub fn write_project(dir: &Path, code: &str, options: &AssemblerOptions) -> Result<()> {
    options.validate_project_include()?;
    fs::create_dir_all(dir)?;
    write_program(&dir.join(MAIN_FILE), code)?;
    write_program(&dir.join(&options.runtime_include), RUNTIME_SUPPORT)?;
    Ok(())
}
