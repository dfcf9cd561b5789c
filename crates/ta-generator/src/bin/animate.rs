//! CLI turning a theorem into a rendered Manim animation.
//!
//! # Usage
//!
//! ```bash
//! # Full run: intuition, script, video
//! ta-animate run "a^2+b^2=c^2" out/pythagoras
//!
//! # Theorem taken from the first theorem environment of a LaTeX file
//! ta-animate run --tex paper.tex out/paper
//!
//! # Only the intuition text
//! ta-animate intuition "a^2+b^2=c^2" out/pythagoras
//! ```
//!
//! `GEMINI_API_KEY` must be set. `RUST_LOG` controls log verbosity.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ta_core::{RenderQuality, TheoremStatement};
use ta_generator::{ClientConfig, GeminiClient, GeneratorConfig, PipelineError, TheoremPipeline};
use ta_render::ManimRenderer;
use ta_syntax::PythonSyntaxValidator;

type Pipeline = TheoremPipeline<GeminiClient, PythonSyntaxValidator, ManimRenderer>;

#[derive(Debug, Parser)]
#[command(name = "ta-animate", version, about = "Turn a theorem into a Manim animation")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Explain, script and render a theorem
    Run(RunArgs),
    /// Only write intuition.txt
    Intuition(InputArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// THEOREM then OUT_DIR, or only OUT_DIR with --tex
    #[arg(value_name = "THEOREM")]
    first: String,

    #[arg(value_name = "OUT_DIR")]
    second: Option<PathBuf>,

    /// Read the theorem from a LaTeX file
    #[arg(long, value_name = "FILE")]
    tex: Option<PathBuf>,

    /// Model name (overrides GEMINI_MODEL)
    #[arg(long)]
    model: Option<String>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Render quality: low, medium or high
    #[arg(long, value_parser = parse_quality)]
    quality: Option<RenderQuality>,

    /// Render attempts, counting the first render
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    render_attempts: Option<u32>,

    /// Syntax repair rounds after the reviewed draft
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    repair_rounds: Option<u32>,

    /// Fewer retries
    #[arg(long, conflicts_with = "thorough")]
    quick: bool,

    /// More retries and a better video
    #[arg(long)]
    thorough: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

fn parse_quality(s: &str) -> Result<RenderQuality, String> {
    RenderQuality::parse(s).ok_or_else(|| format!("unknown quality {:?} (low, medium, high)", s))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => run(args).await,
        Command::Intuition(args) => intuition(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: RunArgs) -> Result<(), CliError> {
    let mut config = if args.quick {
        GeneratorConfig::quick()
    } else if args.thorough {
        GeneratorConfig::thorough()
    } else {
        GeneratorConfig::default()
    };
    if let Some(quality) = args.quality {
        config.quality = quality;
    }
    if let Some(max) = args.render_attempts {
        config.render_attempts_max = max;
    }
    if let Some(max) = args.repair_rounds {
        config.syntax_repair_rounds_max = max;
    }

    let (theorem, out_dir) = resolve_input(&args.input).await?;
    let pipeline = build_pipeline(args.input.model, config)?;

    println!("Theorem Animator");
    println!("================");
    println!();
    println!("Theorem: {}", theorem);
    println!("Output:  {}", out_dir.display());
    println!(
        "Budgets: {} render attempts, {} repair rounds",
        pipeline.config().render_attempts_max,
        pipeline.config().syntax_repair_rounds_max
    );
    println!();

    let report = pipeline.run(&theorem, &out_dir).await?;
    println!("{}", report.format_summary());
    Ok(())
}

async fn intuition(args: InputArgs) -> Result<(), CliError> {
    let (theorem, out_dir) = resolve_input(&args).await?;
    let pipeline = build_pipeline(args.model, GeneratorConfig::default())?;

    let intuition = pipeline.run_intuition(&theorem, &out_dir).await?;
    println!("{}", intuition);
    Ok(())
}

fn build_pipeline(
    model: Option<String>,
    config: GeneratorConfig,
) -> Result<Pipeline, PipelineError> {
    let mut client = ClientConfig::from_env()?;
    if let Some(model) = model {
        client = client.with_model(model);
    }
    Ok(TheoremPipeline::from_client_config(client, config)?)
}

/// `THEOREM OUT_DIR`, or `--tex FILE OUT_DIR`.
async fn resolve_input(args: &InputArgs) -> Result<(TheoremStatement, PathBuf), CliError> {
    match (&args.tex, &args.second) {
        (Some(path), None) => {
            let source = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CliError::Read {
                    path: path.clone(),
                    source,
                })?;
            let theorem = TheoremStatement::from_latex(&source).map_err(PipelineError::from)?;
            Ok((theorem, PathBuf::from(&args.first)))
        }
        (Some(_), Some(_)) => Err(CliError::Usage(
            "with --tex, pass only OUT_DIR".to_string(),
        )),
        (None, Some(out_dir)) => {
            let theorem = TheoremStatement::new(args.first.as_str()).map_err(PipelineError::from)?;
            Ok((theorem, out_dir.clone()))
        }
        (None, None) => Err(CliError::Usage(
            "missing OUT_DIR (usage: THEOREM OUT_DIR, or --tex FILE OUT_DIR)".to_string(),
        )),
    }
}
