//! CLI entry point for `mboxzip2json`.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;

use mboxzip2json::config::{self, Config};
use mboxzip2json::extract::{extract_emails_from_zip, ExtractOptions};

/// Extract every email from the MBOX files inside a (nested) zip archive
/// and print them as a JSON array.
#[derive(Parser)]
#[command(name = "mboxzip2json", version, about)]
struct Cli {
    /// Zip archive to read
    #[arg(value_name = "FILE")]
    archive: PathBuf,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Refuse nested archives larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    max_nested_size: Option<u64>,

    /// Configuration file (defaults to $MBOXZIP2JSON_CONFIG or the user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::read_config(path)?,
        None => config::load_config(),
    };
    if cli.pretty {
        config.output.pretty = true;
    }
    if let Some(max) = cli.max_nested_size {
        config.archive.max_nested_size = Some(max);
    }

    // Logs go to stderr so stdout carries only JSON
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    cmd_extract(&cli.archive, &config)
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let file_layer = config.general.log_file.as_deref().and_then(|log_file| {
        let dir = match log_file.parent() {
            Some(d) if !d.as_os_str().is_empty() => d,
            _ => Path::new("."),
        };
        let name = log_file.file_name()?;
        std::fs::create_dir_all(dir).ok()?;
        let file_appender = tracing_appender::rolling::never(dir, name);
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender),
        )
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

/// Extract all messages and write them to stdout as one JSON array.
fn cmd_extract(path: &Path, config: &Config) -> anyhow::Result<()> {
    let options = ExtractOptions::from(config);
    let emails = extract_emails_from_zip(path, &options)?;

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    if config.output.pretty {
        serde_json::to_writer_pretty(&mut out, &emails)?;
    } else {
        serde_json::to_writer(&mut out, &emails)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
