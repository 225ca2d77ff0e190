//! MPIJob admission tool - composition root
//!
//! Registers the MPIJob types once, then either prints the CRD manifest or
//! runs manifests through defaulting and validation.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use kube::ResourceExt;
use mpijob_operator::codec::{decode_json, decode_yaml_stream, encode_json, encode_yaml};
use mpijob_operator::registry::{self, TypeRegistry};
use mpijob_operator::{MPIJob, ValidationError, admit, admit_all};
use mpijob_shared::config::{ConfigLoader, OperatorConfigDto, OutputFormat};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// MPIJob admission tool
#[derive(Parser, Debug)]
#[command(name = "mpijob-admit")]
#[command(version)]
#[command(about = "Defaults and validates MPIJob manifests", long_about = None)]
struct Args {
    /// Optional .env file loaded before reading the environment
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Log level, overriding `RUST_LOG`
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the MPIJob CustomResourceDefinition
    Crd,
    /// Default and validate MPIJob manifests, printing the canonical form
    Check {
        /// Manifest files (YAML or JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::new(args.env_file.clone())
        .load_operator_config()
        .context("Failed to load configuration")?;

    let directives = args
        .log_level
        .map_or(config.logging.level.as_str(), |level| level.as_str());
    let filter = EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter: {directives}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(
        log_filter = directives,
        namespace = %config.namespace,
        aggregate_errors = config.admission.aggregate_errors,
        output_format = %config.admission.output_format,
        "Configuration loaded"
    );

    let mut types = TypeRegistry::new();
    registry::install(&mut types).context("Failed to register MPIJob types")?;
    for identity in types.identities() {
        info!(%identity, "Serving type");
    }

    match args.command {
        Command::Crd => {
            let manifest = MPIJob::crd_yaml().context("Failed to render CRD")?;
            print!("{manifest}");
            Ok(())
        }
        Command::Check { files } => check(&config, &files),
    }
}

fn check(config: &OperatorConfigDto, files: &[PathBuf]) -> Result<()> {
    let mut total = 0usize;
    let mut rejected = 0usize;

    for path in files {
        for decoded in read_manifest(path)? {
            total += 1;
            let mut job = match decoded {
                Ok(job) => job,
                Err(err) => {
                    rejected += 1;
                    report(path, None, &[err]);
                    continue;
                }
            };
            if job.namespace().is_none() {
                job.metadata.namespace = Some(config.namespace.clone());
            }

            let outcome = if config.admission.aggregate_errors {
                admit_all(&job)
            } else {
                admit(&job).map_err(|e| vec![e])
            };

            match outcome {
                Ok(canonical) => println!("{}", render(&canonical, config.admission.output_format)?),
                Err(errors) => {
                    rejected += 1;
                    report(path, Some(&job), &errors);
                }
            }
        }
    }

    if rejected > 0 {
        bail!("{rejected} of {total} manifest(s) rejected");
    }
    Ok(())
}

/// One output document. YAML documents carry their `---` separator; JSON
/// objects are written one after another.
fn render(job: &MPIJob, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => format!("---\n{}", encode_yaml(job)?.trim_end()),
        OutputFormat::Json => encode_json(job)?,
    })
}

/// Outer error: the file could not be read. Inner errors: documents that are
/// not MPIJobs. YAML files may hold several `---` separated documents.
fn read_manifest(path: &Path) -> Result<Vec<std::result::Result<MPIJob, ValidationError>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    Ok(if is_json {
        vec![decode_json(&content)]
    } else {
        decode_yaml_stream(&content)
    })
}

fn report(path: &Path, job: Option<&MPIJob>, errors: &[ValidationError]) {
    let name = job.map(|job| job.name_any()).unwrap_or_default();
    for err in errors {
        error!(
            file = %path.display(),
            name = %name,
            kind = %err.kind,
            field = %err.field,
            expected = err.expected.as_deref().unwrap_or("-"),
            actual = err.actual.as_deref().unwrap_or("-"),
            "{}",
            err.message
        );
        eprintln!("{}: {}", path.display(), err);
    }
}
