//! CLI entry point for `rmsforms`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use rmsforms::config::{self, Config};
use rmsforms::driver::{ClassifiedMessages, Driver};
use rmsforms::model::message_type::MessageTypeId;
use rmsforms::model::raw::RawMessage;
use rmsforms::parser;

#[derive(Parser)]
#[command(
    name = "rmsforms",
    version,
    about = "Classify Winlink exercise messages and extract their forms",
    after_help = "PATH is an mbox file, a single .eml/.mime/.b2f message, or a directory of messages."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Messages to classify (same as `summary PATH`)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Reject malformed dates and page numbers instead of keeping them raw
    #[arg(long, global = true)]
    strict: bool,

    /// Message id or sender call to log in detail (repeatable, or comma separated)
    #[arg(long, global = true, value_name = "ID", value_delimiter = ',')]
    filter: Vec<String>,

    /// Worker threads (0 = one per CPU)
    #[arg(short, long, global = true, value_name = "N")]
    workers: Option<usize>,

    /// Directory of SENDER_MESSAGEID.txt form-data files
    #[arg(long, global = true, value_name = "DIR")]
    form_data: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Count messages per type
    Summary { path: PathBuf },
    /// Print every record as JSON, grouped by type
    Json {
        path: PathBuf,
        /// Only these types (e.g. ics_213,check_in)
        #[arg(long, value_delimiter = ',')]
        types: Vec<MessageTypeId>,
        /// Pretty-print
        #[arg(long)]
        pretty: bool,
    },
    /// List rejected messages with reason and context
    Rejects {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    // CLI flags override the file.
    if cli.strict {
        config.parsing.strict = true;
    }
    if !cli.filter.is_empty() {
        config.parsing.filter_ids = cli.filter.clone();
    }
    if let Some(dir) = cli.form_data.clone() {
        config.parsing.form_data_dir = Some(dir);
    }
    if let Some(workers) = cli.workers {
        config.performance.workers = workers;
    }

    match cli.command {
        Some(Commands::Summary { path }) => cmd_summary(&path, &config),
        Some(Commands::Json { path, types, pretty }) => cmd_json(&path, &types, pretty, &config),
        Some(Commands::Rejects { path, json }) => cmd_rejects(&path, json, &config),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        None => match cli.path {
            Some(path) => cmd_summary(&path, &config),
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        },
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_file = config::log_file_path(config);
    let log_dir = config::cache_dir(config);
    let file_name = log_file.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, file_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "rmsforms", &mut std::io::stdout());
    Ok(())
}

/// Load, classify and extract, with progress bars for both phases.
fn classify_path(path: &Path, config: &Config) -> anyhow::Result<(ClassifiedMessages, usize, Duration)> {
    if !path.exists() {
        anyhow::bail!("Input not found: {}", path.display());
    }
    let context = Arc::new(config::parser_context(&config.parsing)?);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Reading [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let messages: Vec<Arc<RawMessage>> = parser::load_messages(
        path,
        Some(&|current, total| {
            pb.set_length(total);
            pb.set_position(current);
        }),
    )?
    .into_iter()
    .map(Arc::new)
    .collect();
    pb.finish_and_clear();

    let driver = Driver::new(context).with_workers(config.performance.workers);
    let pb = ProgressBar::new(messages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Classifying [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("valid template")
            .progress_chars("#>-"),
    );
    let result = driver.run_with_progress(&messages, |n| pb.inc(n as u64));
    pb.finish_and_clear();

    Ok((result, messages.len(), start.elapsed()))
}

/// Print record counts per type.
fn cmd_summary(path: &Path, config: &Config) -> anyhow::Result<()> {
    let (result, total, elapsed) = classify_path(path, config)?;

    let counts = result.counts();
    let width = counts.keys().map(|t| t.key().len()).max().unwrap_or(0).max(8);

    println!();
    println!("  Input:      {}", path.display());
    println!("  Messages:   {total}");
    println!("  Time:       {:.2?}", elapsed);
    println!();
    println!("  {:<width$}  {:>8}", "Type", "Records");
    println!("  {:-<width$}  {:->8}", "", "");
    for (message_type, count) in &counts {
        println!("  {:<width$}  {:>8}", message_type.key(), count);
    }

    let mut reasons: BTreeMap<&'static str, usize> = BTreeMap::new();
    for rejection in result.rejects() {
        *reasons.entry(rejection.reason.as_str()).or_default() += 1;
    }
    if !reasons.is_empty() {
        println!();
        println!("  Rejections by reason:");
        for (reason, count) in &reasons {
            println!("    {reason:<24} {count:>6}");
        }
    }
    println!();
    Ok(())
}

/// Print records as JSON, optionally restricted to some types.
fn cmd_json(path: &Path, types: &[MessageTypeId], pretty: bool, config: &Config) -> anyhow::Result<()> {
    let (result, _, _) = classify_path(path, config)?;

    let selected: BTreeMap<&'static str, _> = result
        .iter()
        .filter(|(t, _)| types.is_empty() || types.contains(t))
        .map(|(t, records)| (t.key(), records))
        .collect();

    let output = if pretty {
        serde_json::to_string_pretty(&selected)?
    } else {
        serde_json::to_string(&selected)?
    };
    println!("{output}");
    Ok(())
}

/// Print one line per rejection, or the rejections as JSON.
fn cmd_rejects(path: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    let (result, _, _) = classify_path(path, config)?;

    if json {
        let rejects: Vec<_> = result.rejects().collect();
        println!("{}", serde_json::to_string_pretty(&rejects)?);
        return Ok(());
    }

    println!(
        "{:<14} {:<10} {:<22} {:<24} CONTEXT",
        "MESSAGE ID", "FROM", "TYPE", "REASON"
    );
    println!("{}", "-".repeat(100));
    for r in result.rejects() {
        println!(
            "{:<14} {:<10} {:<22} {:<24} {}",
            r.raw.message_id,
            r.raw.from,
            r.attempted_type.key(),
            r.reason.as_str(),
            r.context.replace('\n', " ")
        );
    }
    println!();
    println!("{} rejected", result.get(MessageTypeId::Rejects).len());
    Ok(())
}
