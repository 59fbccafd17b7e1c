use anyhow::Context;
use msgtemplate::{driver, GeneratorConfig};
use std::path::{Path, PathBuf};

const TEMPLATE: &str = "templates/conformance.msg";

fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed={}", TEMPLATE);
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").context("OUT_DIR not set")?);
    let generated = driver::generate_file(
        Path::new(TEMPLATE),
        &out_dir.join("messages.rs"),
        &GeneratorConfig::default(),
    )
    .with_context(|| format!("generating codecs from {}", TEMPLATE))?;
    for d in &generated.diagnostics {
        println!("cargo:warning={}", d);
    }
    Ok(())
}
