//! Ferry terminal entry point.

use std::{
    net::SocketAddr,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use clap::Parser;
use ferry_app::{DEFAULT_NOTIFICATION_HISTORY, FerryConfig, Runtime};
use ferry_core::{DEFAULT_TIME_FORMAT, SystemEnv};
use ferry_tui::{LinkMode, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Ferry: send files and text to a directly connected peer
#[derive(Parser, Debug)]
#[command(name = "ferry")]
#[command(about = "Send files and text to a directly connected peer")]
#[command(version)]
struct Args {
    /// Address to accept the peer on
    #[arg(short, long, conflicts_with = "connect", required_unless_present = "connect")]
    listen: Option<SocketAddr>,

    /// Peer address to dial (host:port)
    #[arg(short, long)]
    connect: Option<String>,

    /// Directory received files are written to
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log file; the terminal itself is taken by the UI
    #[arg(long, default_value = "ferry.log")]
    log_file: PathBuf,

    /// Display format for received message timestamps (chrono, UTC)
    #[arg(long, default_value = DEFAULT_TIME_FORMAT)]
    time_format: String,

    /// Received files kept before the oldest is dropped
    #[arg(long)]
    max_files: Option<NonZeroUsize>,

    /// Received messages kept before the oldest is dropped
    #[arg(long)]
    max_texts: Option<NonZeroUsize>,

    /// Notifications kept on screen
    #[arg(long, default_value_t = DEFAULT_NOTIFICATION_HISTORY)]
    notification_history: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let dir = args.log_file.parent().filter(|p| !p.as_os_str().is_empty());
    let file = args.log_file.file_name().ok_or("--log-file must name a file")?;
    let appender = tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), file);
    let (writer, _guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    let mode = match (args.listen, args.connect) {
        (Some(addr), _) => LinkMode::Listen(addr),
        (None, Some(addr)) => LinkMode::Connect(addr),
        (None, None) => return Err("one of --listen or --connect is required".into()),
    };

    let config = FerryConfig {
        time_format: args.time_format,
        max_files: args.max_files,
        max_texts: args.max_texts,
        notification_history: args.notification_history,
    };

    tracing::info!(%mode, save_dir = ?args.save_dir, "ferry starting");

    let driver = TerminalDriver::new(mode, args.save_dir)?;
    Runtime::new(driver, SystemEnv::new(), &config).run().await?;

    tracing::info!("ferry stopped");
    Ok(())
}
