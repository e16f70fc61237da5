//! Driftwatch CLI
//!
//! Usage:
//!   driftwatch --demo                          # Scripted conversation
//!   driftwatch --input chat.jsonl              # JSON Lines file
//!   driftwatch --input - --format chat         # `[ts] user: text` from stdin
//!   driftwatch --demo --json                   # Pretty JSON per result
//!   driftwatch --serve                         # HTTP API server

use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use driftwatch::config::{parse_users, DriftConfig};
use driftwatch::core::{
    new_run_id, read_messages, run_server, scripted_conversation, scripted_users, AlertLog,
    DriftPipeline, InputFormat, RunSummary, UnknownUserPolicy,
};
use driftwatch::error::DriftError;
use driftwatch::types::AnalysisResult;
use driftwatch::{telemetry, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "driftwatch",
    version = VERSION,
    about = "Score chat messages for adversarial drift and flag sustained trust decay",
    long_about = "Driftwatch scores each message of a per-user chat stream with a drift\n\
                  score (0-1) and keeps a rolling window of each user's recent scores.\n\
                  When a full window averages above the threshold, a trust decay alert\n\
                  is raised for that user.\n\n\
                  States:\n  \
                  WARMING   - Window not full yet\n  \
                  STEADY    - Average at or below threshold\n  \
                  DECAYING  - Average above threshold, alert raised"
)]
struct Args {
    /// Run the built-in scripted conversation
    #[arg(long)]
    demo: bool,

    /// Input file, or '-' for stdin
    #[arg(short, long)]
    input: Option<String>,

    /// Input layout
    #[arg(long, value_enum, default_value_t = InputFormat::Jsonl)]
    format: InputFormat,

    /// Output pretty JSON documents
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Feed synthetic biometric readings to the scorer
    #[arg(long)]
    biometrics: bool,

    /// Messages per rolling window
    #[arg(long)]
    window_size: Option<usize>,

    /// Trust decay threshold (strictly greater triggers)
    #[arg(long)]
    threshold: Option<f64>,

    /// Custom lexicon JSON file
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Directory for the per-run alert log
    #[arg(long)]
    alert_dir: Option<PathBuf>,

    /// Pre-register users, comma-separated (e.g. --users ana,ben)
    #[arg(long, value_delimiter = ',')]
    users: Vec<String>,

    /// Only accept pre-registered users (--users, DRIFT_USERS, demo roster)
    #[arg(long)]
    reject_unknown: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,
}

impl Args {
    fn apply(&self, config: &mut DriftConfig) {
        if let Some(n) = self.window_size {
            config.window_size = n;
        }
        if let Some(t) = self.threshold {
            config.threshold = t;
        }
        if let Some(path) = &self.lexicon {
            config.lexicon_path = Some(path.clone());
        }
        if let Some(dir) = &self.alert_dir {
            config.alert_dir = Some(dir.clone());
        }
        if self.biometrics {
            config.biometrics = true;
        }
        if !self.users.is_empty() {
            config.users = parse_users(&self.users.join(","));
        }
        if self.reject_unknown {
            config.unknown_users = UnknownUserPolicy::Reject;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "driftwatch failed");
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), DriftError> {
    let mut config = DriftConfig::from_env()?;
    args.apply(&mut config);
    config.validate()?;
    telemetry::init(&config.log_filter)?;

    let mut pipeline = DriftPipeline::from_config(&config)?;
    if args.demo {
        pipeline.seed_users(scripted_users());
    }

    let run_id = new_run_id();
    let alert_log = config
        .alert_dir
        .as_ref()
        .map(|dir| AlertLog::open(dir, &run_id))
        .transpose()?;
    if let Some(log) = &alert_log {
        info!(path = %log.path().display(), "writing triggered results");
    }

    if args.serve {
        return run_server(&args.addr, pipeline, alert_log).await;
    }

    print_header(&args, &run_id);
    let summary = if args.demo {
        run_stream(&mut pipeline, scripted_conversation().into_iter().map(Ok), alert_log, &args)
    } else {
        match args.input.as_deref() {
            None | Some("-") => {
                let stdin = io::stdin();
                run_stream(&mut pipeline, read_messages(stdin.lock(), args.format), alert_log, &args)
            }
            Some(path) => {
                let file = File::open(path)?;
                run_stream(&mut pipeline, read_messages(BufReader::new(file), args.format), alert_log, &args)
            }
        }
    };
    print_summary(&summary, args.json);
    Ok(())
}

fn run_stream<I>(
    pipeline: &mut DriftPipeline,
    messages: I,
    mut alert_log: Option<AlertLog>,
    args: &Args,
) -> RunSummary
where
    I: IntoIterator<Item = Result<driftwatch::types::Message, driftwatch::error::StreamError>>,
{
    pipeline.process_stream(messages, |result| {
        print_result(result, args);
        if let Some(log) = alert_log.as_mut() {
            if let Err(e) = log.record(result) {
                error!(error = %e, "failed to persist alert");
            }
        }
    })
}

fn print_header(args: &Args, run_id: &str) {
    if args.json {
        return;
    }
    println!("{}", format!("*** Driftwatch v{} - run {} ***", VERSION, run_id).bold());
    println!();
}

fn print_result(result: &AnalysisResult, args: &Args) {
    if args.json {
        match serde_json::to_string_pretty(result) {
            Ok(doc) => println!("{}", doc),
            Err(e) => error!(error = %e, "failed to serialize result"),
        }
    } else if args.no_color {
        println!("{}", result.to_parseable_string());
        if let Some(warning) = &result.trust_decay_analysis.warning_message {
            println!("  [!] {}", warning);
        }
    } else {
        println!("{}", result.to_terminal_string());
    }
}

fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        if let Ok(doc) = serde_json::to_string_pretty(summary) {
            eprintln!("{}", doc);
        }
        return;
    }
    println!();
    println!(
        "{} processed={} skipped={} alerts={} users={}",
        "*** Run complete".bold(),
        summary.processed,
        summary.skipped,
        summary.alerts,
        summary.users
    );
}
