//! Generate Rust message codecs from a message template.
//!
//! Usage:
//!   msgtemplate TEMPLATE [-o OUT.rs] [--runtime-path PATH] [--separator SEP] [--disable TAG]...
//!   msgtemplate TEMPLATE --check
//!
//! Without `-o` the generated source goes to stdout. `RUST_LOG` overrides the log filter.

use anyhow::Context;
use clap::Parser;
use msgtemplate::{driver, GeneratorConfig};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Message template compiler
#[derive(Parser)]
#[command(name = "msgtemplate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Template file to compile
    template: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path through which generated code reaches the runtime module
    #[arg(long, default_value = "::msgtemplate::runtime")]
    runtime_path: String,

    /// Separator between message and block names in block type names
    #[arg(long, default_value = "_")]
    separator: String,

    /// Type tag without a codec in the target build (repeatable)
    #[arg(long = "disable", value_name = "TAG")]
    disabled: Vec<String>,

    /// Only parse the template and list its messages
    #[arg(long)]
    check: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.check {
        let template = driver::check_file(&cli.template)
            .with_context(|| format!("checking {}", cli.template.display()))?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(
            out,
            "{}: version {}, {} messages",
            cli.template.display(),
            template.version,
            template.messages.len()
        )?;
        for m in &template.messages {
            writeln!(
                out,
                "  {:#010x} {} {} {} blocks, {} fields",
                m.number(),
                m.name,
                m.frequency,
                m.blocks.len(),
                m.field_count()
            )?;
        }
        return Ok(());
    }

    let config = GeneratorConfig {
        runtime_path: cli.runtime_path,
        block_separator: cli.separator,
        disabled_types: cli.disabled.into_iter().collect(),
    };

    let generated = match &cli.output {
        Some(output) => driver::generate_file(&cli.template, output, &config)
            .with_context(|| format!("generating {}", output.display()))?,
        None => {
            let source = std::fs::read_to_string(&cli.template)
                .with_context(|| format!("reading {}", cli.template.display()))?;
            let generated = msgtemplate::generate(&source, &config)
                .with_context(|| format!("compiling {}", cli.template.display()))?;
            std::io::stdout().write_all(generated.to_source().as_bytes())?;
            generated
        }
    };
    if !generated.diagnostics.is_empty() {
        tracing::warn!(
            skipped = generated.diagnostics.len(),
            messages = generated.messages,
            "some messages were generated without a codec"
        );
    }
    Ok(())
}
