use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use zpalloc::config::{AllocConfig, ByteCount, Offset};
use zpalloc::{Session, Strictness, TranslationUnit, report};

#[derive(Parser)]
#[command(name = "zpalloc", version)]
#[command(about = "Static zero page allocator and call dependency checker")]
struct Cli {
    #[arg(required = true, help = "Directive source files, one per translation unit")]
    inputs: Vec<PathBuf>,

    #[arg(short, long, help = "Configuration file (default: ./zpalloc.toml if present)")]
    config: Option<PathBuf>,

    #[arg(long, value_parser = parse_number, help = "Scratch region base address")]
    base: Option<Offset>,

    #[arg(long, value_parser = parse_number, help = "Scratch region size in bytes")]
    capacity: Option<ByteCount>,

    #[arg(short = 'W', long, value_parser = parse_strictness, help = "Warning level: 0, 1 or 2")]
    strictness: Option<Strictness>,

    #[arg(long, help = "Do not check call sites against declared dependencies")]
    no_safe_calls: bool,

    #[arg(long, help = "Allow routines without a forward declaration")]
    implicit_declarations: bool,

    #[arg(short, long, help = "Write exported symbols here instead of stdout")]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Asm)]
    format: Format,

    #[arg(long, help = "Write a routine layout map")]
    map: Option<PathBuf>,

    #[arg(short, long, help = "Log allocation decisions")]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Asm,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = build_config(cli)?;

    let mut units = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let source = fs::read_to_string(path).with_context(|| format!("{}", path.display()))?;
        let name = path.display().to_string();
        match TranslationUnit::parse(name, source.as_str()) {
            Ok(unit) => units.push(unit),
            Err(e) => {
                eprintln!("{}", e.format_with_source(&source));
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    let mut session = Session::new(config.clone());
    let outcome = session.run(&units);

    // Warnings gathered before a fatal error are still worth showing
    for warning in session.warnings() {
        eprintln!("{}", warning.format_with_units(&units));
    }

    if let Err(e) = outcome {
        eprintln!("{}", e.format_with_units(&units));
        return Ok(ExitCode::FAILURE);
    }

    let allocator = session.allocator();
    let symbols = match cli.format {
        Format::Asm => allocator.exports().render_asm(),
        Format::Json => allocator
            .exports()
            .render_json()
            .context("could not serialize symbols")?,
    };

    match &cli.output {
        Some(path) => fs::write(path, &symbols)
            .with_context(|| format!("could not write to {}", path.display()))?,
        None => print!("{}", symbols),
    }

    if let Some(path) = &cli.map {
        let map = report::render_map(allocator.layouts(), &config.scratch);
        fs::write(path, map).with_context(|| format!("could not write to {}", path.display()))?;
    }

    Ok(ExitCode::SUCCESS)
}

fn build_config(cli: &Cli) -> Result<AllocConfig> {
    let mut config = match &cli.config {
        Some(path) => AllocConfig::load(path)?,
        None => AllocConfig::load_or_default()?,
    };

    if let Some(base) = cli.base {
        config.scratch.base = base;
    }
    if let Some(capacity) = cli.capacity {
        config.scratch.capacity = capacity;
    }
    if let Some(strictness) = cli.strictness {
        config.checks.strictness = strictness;
    }
    if cli.no_safe_calls {
        config.checks.safe_calls = false;
    }
    if cli.implicit_declarations {
        config.checks.implicit_declarations = true;
    }

    config.scratch.validate()?;
    Ok(config)
}

/// Decimal, `$hex`, `0xhex`, `%bin` or `0bbin`
fn parse_number(text: &str) -> Result<u16, String> {
    let (digits, radix) = if let Some(hex) = text.strip_prefix('$').or_else(|| text.strip_prefix("0x")) {
        (hex, 16)
    } else if let Some(bin) = text.strip_prefix('%').or_else(|| text.strip_prefix("0b")) {
        (bin, 2)
    } else {
        (text, 10)
    };
    u16::from_str_radix(digits, radix).map_err(|e| format!("invalid number '{}': {}", text, e))
}

fn parse_strictness(text: &str) -> Result<Strictness, String> {
    let level: u8 = text.parse().map_err(|_| format!("invalid strictness '{}'", text))?;
    Strictness::try_from(level)
}
