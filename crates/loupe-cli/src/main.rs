//! Loupe CLI - inspect stored objects from the command line.

use clap::{Parser, Subcommand};
use loupe_inflate::InflateConfig;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::ListFormat;

/// Loupe - read stored objects byte for byte
#[derive(Parser, Debug)]
#[command(name = "loupe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    /// Size of the inflate staging buffers in bytes
    #[arg(long, default_value_t = loupe_inflate::DEFAULT_CHUNK_SIZE, global = true)]
    chunk_size: usize,

    /// Refuse objects that inflate to more than this many bytes
    #[arg(long, global = true)]
    max_output: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inflate a stored object and write its raw bytes
    Inflate {
        /// Path to the compressed object
        path: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the entries of a stored tree object
    LsTree {
        /// Path to the compressed object
        path: PathBuf,
        /// The object has no `tree <size>` header
        #[arg(long)]
        raw: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },

    /// List the entries of an already inflated tree body
    ParseTree {
        /// Path to the tree body
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },

    /// Show version information
    Version,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum LogFormat {
    /// Human-readable output.
    Pretty,
    /// One JSON object per event.
    Json,
}

fn init_logging(verbose: u8, format: LogFormat) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("loupe={log_level},loupe_inflate={log_level},loupe_tree={log_level}").into()
    });
    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so object bytes on stdout stay clean.
    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    let config = InflateConfig {
        input_chunk: cli.chunk_size,
        output_chunk: cli.chunk_size,
        max_output: cli.max_output,
    };

    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Commands::Inflate { path, output } => match output {
            Some(output) => commands::inflate_to_file(&path, &config, &output),
            None => commands::inflate(&path, &config, &mut stdout),
        },
        Commands::LsTree { path, raw, format } => {
            commands::ls_tree(&path, raw, format, &config, &mut stdout)
        }
        Commands::ParseTree { file, format } => {
            commands::parse_tree_file(&file, format, &mut stdout)
        }
        Commands::Version => writeln!(stdout, "loupe {}", env!("CARGO_PKG_VERSION"))
            .map_err(commands::CliError::from),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
