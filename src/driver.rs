//! File-level driver: read a template, generate, write the output atomically.

use crate::ast::Template;
use crate::codegen::{Generated, GeneratorConfig};
use crate::error::Error;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Parse the template at `input` without generating anything.
pub fn check_file(input: &Path) -> Result<Template, Error> {
    let source = fs::read_to_string(input)?;
    crate::parse(&source)
}

/// Generate code for the template at `input` and write it to `output`.
///
/// The source is generated fully in memory, written to a temporary file next to
/// `output`, then renamed over it. On any error `output` is left untouched.
pub fn generate_file(
    input: &Path,
    output: &Path,
    config: &GeneratorConfig,
) -> Result<Generated, Error> {
    let source = fs::read_to_string(input)?;
    let generated = crate::generate(&source, config)?;
    write_atomically(output, generated.to_source().as_bytes())?;
    info!(
        input = %input.display(),
        output = %output.display(),
        messages = generated.messages,
        "wrote generated source"
    );
    Ok(generated)
}

fn write_atomically(output: &Path, bytes: &[u8]) -> Result<(), Error> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(output).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
