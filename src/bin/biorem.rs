use std::io::Read;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use biorem_engine::app::{App, ConsortiumOptions};
use biorem_engine::catalog::ReferenceCatalog;
use biorem_engine::config::ConfigLoader;
use biorem_engine::domain::ReferenceSource;
use biorem_engine::error::EngineError;
use biorem_engine::output::{JsonOutput, LogSink};

#[derive(Parser)]
#[command(name = "biorem")]
#[command(about = "Annotate per-sample KO uploads against bioremediation reference catalogs")]
#[command(version, author)]
struct Cli {
    /// Path to biorem.json (defaults to ./biorem.json when present)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Join an upload against all reference catalogs")]
    Run(UploadArgs),
    #[command(about = "Select a minimal sample consortium for one compound class")]
    Consortium(ConsortiumArgs),
    #[command(about = "Show the loaded reference catalogs")]
    Catalog,
}

#[derive(Args)]
struct UploadArgs {
    /// Upload file, or `-` for stdin
    upload: String,
}

#[derive(Args)]
struct ConsortiumArgs {
    #[command(flatten)]
    upload: UploadArgs,

    #[arg(long)]
    class: String,

    #[arg(long, value_enum, default_value_t = ReferenceSource::Bioremediation)]
    source: ReferenceSource,

    /// Cover every catalog compound of the class, reporting the ones no sample reaches
    #[arg(long)]
    against_catalog: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<EngineError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &EngineError) -> u8 {
    match error {
        EngineError::Validation { .. }
        | EngineError::EmptyResult { .. }
        | EngineError::InvalidOrthologId(_)
        | EngineError::UnknownSource(_) => 2,
        EngineError::Configuration { .. }
        | EngineError::ConfigRead(_)
        | EngineError::ConfigParse(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let catalog = ReferenceCatalog::load(&config.catalog)?;
    let app = App::new(&catalog, config.upload.clone());

    match cli.command {
        Commands::Run(args) => {
            let raw = read_upload(&args.upload)?;
            let result = app.run(&raw, &LogSink)?;
            JsonOutput::print_run(&result).into_diagnostic()
        }
        Commands::Consortium(args) => {
            let raw = read_upload(&args.upload.upload)?;
            let result = app.run(&raw, &LogSink)?;
            let options = ConsortiumOptions {
                source: args.source,
                against_catalog: args.against_catalog,
            };
            let consortium = app.consortium(&result, &args.class, options, &LogSink)?;
            JsonOutput::print_consortium(&consortium).into_diagnostic()
        }
        Commands::Catalog => JsonOutput::print_catalog(&app.catalog()).into_diagnostic(),
    }
}

fn read_upload(path: &str) -> Result<String, EngineError> {
    if path == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|err| EngineError::Filesystem(format!("stdin: {err}")))?;
        return Ok(raw);
    }
    std::fs::read_to_string(path).map_err(|err| EngineError::Filesystem(format!("{path}: {err}")))
}
