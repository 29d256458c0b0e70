//! Command-line front end for Markdown to PPTX conversion.

use anyhow::{Context, Result};
use clap::Parser;
use slides_core::Error;
use slides_pptx::{convert_file, ConverterConfig};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Convert a Markdown file into a branded PowerPoint presentation.
#[derive(Parser, Debug)]
#[command(name = "md2slides")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input Markdown file
    pub input: PathBuf,

    /// Output .pptx path (default: input with .pptx extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Logo image placed bottom-right on every slide
    #[arg(long, env = "MD2SLIDES_LOGO")]
    pub logo: Option<PathBuf>,

    /// Print the parsed slide model as JSON instead of converting
    #[arg(long)]
    pub dump_model: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the command, writing results to `out` and diagnostics to `err`.
///
/// Returns the process exit code.
pub fn run(args: &Args, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    let result = if args.dump_model {
        dump_model(&args.input, out)
    } else {
        convert(args, out)
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(err, "{}", error_message(&e));
            1
        }
    }
}

/// User-facing message for a failed run.
pub fn error_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<Error>() {
        Some(inner @ Error::NotFound(_)) => format!("Error: {}", inner),
        Some(Error::Validation(message)) => format!("Validation error: {}", message),
        _ => format!("Unexpected error: {:#}", e),
    }
}

fn convert(args: &Args, out: &mut dyn Write) -> Result<()> {
    let mut config = ConverterConfig::new();
    if let Some(logo) = &args.logo {
        config = config.with_logo_path(logo);
    }

    log::debug!("Converting {}", args.input.display());
    let written = convert_file(&args.input, args.output.as_deref(), config)?;
    writeln!(out, "Created: {}", written.display())?;
    Ok(())
}

fn dump_model(input: &Path, out: &mut dyn Write) -> Result<()> {
    if !input.exists() {
        return Err(Error::NotFound(input.to_path_buf()).into());
    }
    let markdown = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let slides = slides_core::parse(&markdown)?;
    let json = serde_json::to_string_pretty(&slides).context("Failed to serialize slides")?;
    writeln!(out, "{}", json)?;
    Ok(())
}
