use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use ttn_decode_core::{
    BatchReport, DeviceModel, EncodedFrame, OutcomeStatus, RouteEntry, RouteTable, SensorReading,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TTN_DECODE_BUILD_COMMIT"),
    " ",
    env!("TTN_DECODE_BUILD_DATE"),
    ")"
);

const DECODE_EXAMPLES: &str = "Examples:\n  ttn-decode events decode live_data.json -o report.json\n  ttn-decode events decode webhook.json --stdout --pretty\n  ttn-decode events decode live_data.json --route 2=lht52 --route 10=lwl02 -o report.json";

#[derive(Parser, Debug)]
#[command(name = "ttn-decode")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decode LoRaWAN sensor frames from The Things Network uplink events (LHT52 / LWL02).",
    long_about = None,
    after_help = DECODE_EXAMPLES
)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on TTN event batches (live-data exports or webhook bodies).
    Events {
        #[command(subcommand)]
        command: EventsCommands,
    },
    /// Operations on a single base64 frame.
    Frame {
        #[command(subcommand)]
        command: FrameCommands,
    },
}

#[derive(Subcommand, Debug)]
enum EventsCommands {
    /// Decode every uplink in an event file and write a JSON report.
    #[command(alias = "analyse")]
    #[command(after_help = DECODE_EXAMPLES)]
    Decode(DecodeArgs),
}

#[derive(Subcommand, Debug)]
enum FrameCommands {
    /// Decode one base64 frame with the given device model.
    Decode {
        /// Device model codec to apply (lht52, lwl02)
        #[arg(short, long)]
        model: DeviceModel,

        /// Base64 frame payload (`frm_payload`); may be empty
        #[arg(allow_hyphen_values = true)]
        frame: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Path to a TTN event JSON file
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any frame failed to decode
    #[arg(long)]
    strict: bool,

    /// List failed frames after decoding
    #[arg(long)]
    list_failures: bool,

    /// Route a port to a codec, as PORT=MODEL (repeatable; replaces the default 2=lht52)
    #[arg(long = "route", value_name = "PORT=MODEL")]
    routes: Vec<RouteEntry>,

    /// Codec tried for unrouted ports; its failures are skipped, not reported as failed
    #[arg(long, value_name = "MODEL")]
    fallback: Option<DeviceModel>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(
        &cli.command,
        Commands::Events {
            command: EventsCommands::Decode(args)
        } if args.quiet
    );
    init_logging(cli.verbose, quiet);

    let result = match cli.command {
        Commands::Events { command } => match command {
            EventsCommands::Decode(args) => cmd_events_decode(&args),
        },
        Commands::Frame { command } => match command {
            FrameCommands::Decode {
                model,
                frame,
                pretty,
            } => cmd_frame_decode(model, &frame, pretty),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn build_route_table(args: &DecodeArgs) -> RouteTable {
    let routes = if args.routes.is_empty() {
        RouteTable::default()
    } else {
        RouteTable::from_entries(args.routes.iter().copied())
    };
    match args.fallback {
        Some(model) => routes.with_fallback(model),
        None => routes,
    }
}

fn cmd_events_decode(args: &DecodeArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report_path = if args.stdout {
        None
    } else {
        let path = args.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?;
        ensure_distinct_output(&path, &input_abs)?;
        Some(path)
    };

    let routes = build_route_table(args);
    debug!(
        input = %resolved_input.display(),
        routes = routes.entries().count(),
        fallback = ?routes.fallback(),
        "decoding event file"
    );
    let rep = ttn_decode_core::decode_events_file(&resolved_input, &routes)
        .context("event decoding failed")?;
    let json = serialize_json(&rep, args.pretty, args.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !args.quiet {
                eprintln!(
                    "OK: {} envelopes ({} decoded, {} ignored, {} failed) -> {}",
                    rep.summary.envelopes_total,
                    rep.summary.decoded,
                    rep.summary.ignored,
                    rep.summary.failed,
                    report.display()
                );
            }
        }
    }

    if args.list_failures && !args.quiet {
        print_failures(&rep);
    }
    if args.strict && rep.summary.failed > 0 {
        return Err(CliError::new(
            format!("{} frame(s) failed to decode", rep.summary.failed),
            Some("use --list-failures to inspect".to_string()),
        ));
    }
    Ok(())
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    model: DeviceModel,
    reading: &'a SensorReading,
}

fn cmd_frame_decode(model: DeviceModel, frame: &str, pretty: bool) -> Result<(), CliError> {
    let reading = model.decode(&EncodedFrame::new(frame)).map_err(|err| {
        CliError::new(
            format!("{model} frame decode failed: {err}"),
            Some(format!(
                "error kind '{}'; check the frame is standard base64 from a {model} device",
                err.kind().as_str()
            )),
        )
    })?;
    let output = FrameOutput {
        model,
        reading: &reading,
    };
    println!("{}", serialize_json(&output, pretty, false)?);
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_dir = report_path
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose();
    // A missing parent directory is created later and cannot hold the input.
    let Ok(Some(report_dir)) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_json<T: Serialize>(value: &T, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}

fn print_failures(rep: &BatchReport) {
    eprintln!("Failed frames:");
    for record in rep
        .outcomes
        .iter()
        .filter(|record| record.status == OutcomeStatus::Failed)
    {
        let kind = record
            .error
            .as_ref()
            .map(|error| error.kind.as_str())
            .unwrap_or("unknown");
        eprintln!(
            "  #{} {} port {} {}",
            record.index,
            record.device_id.as_deref().unwrap_or("-"),
            record.port,
            kind
        );
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .json event export or webhook body".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .json event export or webhook body".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "json" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .json file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected a .json file".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}{}",
                    pattern, count, listed, more
                ),
                Some("pass a single event file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
