use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "choreo", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a show into fixture segments.
    Compile(CompileArgs),
    /// Check a template document without compiling it.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Show JSON (tempo, fixtures, placements).
    #[arg(long)]
    show: PathBuf,

    /// Rig calibration JSON.
    #[arg(long)]
    rig: PathBuf,

    /// Compile options JSON; defaults when omitted.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Write quantized DMX segments instead of the curve IR.
    #[arg(long)]
    dmx: bool,

    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Template JSON.
    #[arg(long)]
    template: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let r = BufReader::new(f);
    serde_json::from_reader(r).with_context(|| format!("parse {what} JSON '{}'", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), value)
        .with_context(|| format!("write '{}'", path.display()))
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let show: choreo::ShowDocument = read_json(&args.show, "show")?;
    show.validate()?;
    let rig: choreo::RigCalibration = read_json(&args.rig, "rig")?;
    let options = match &args.options {
        Some(p) => read_json(p, "options")?,
        None => choreo::CompileOptions::default(),
    };

    let compiler = choreo::Compiler::new(options)?;
    let ctx = choreo::CompileContext {
        clock: &show.tempo,
        fixtures: &show.fixtures,
        rig: &rig,
    };
    let ir = compiler.compile_show(&ctx, &show.placements)?;
    tracing::info!(
        segments = ir.segments.len(),
        boundaries = ir.boundaries.len(),
        fingerprint = %ir.fingerprint(),
        "compiled show"
    );

    if args.dmx {
        write_json(&args.out, &ir.to_dmx()?)?;
    } else {
        write_json(&args.out, &ir)?;
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let template: choreo::Template = read_json(&args.template, "template")?;
    template
        .validate()
        .with_context(|| format!("template '{}'", args.template.display()))?;
    eprintln!("ok: template '{}'", template.id);
    Ok(())
}
