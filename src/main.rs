use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rawsniff::capture::{FrameSource, PnetCapture};
use rawsniff::error::{CaptureError, MonitorError, PRIVILEGE_HINT};
use rawsniff::reporter::ConsoleReporter;
use rawsniff::{Config, Sniffer};

#[derive(Parser)]
#[command(name = "rawsniff")]
#[command(about = "Promiscuous-mode frame inspector")]
struct Cli {
    /// Debug logging, timestamps and frame lengths
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: $RAWSNIFF_CONFIG or /etc/rawsniff.conf)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture and decode frames
    Sniff {
        /// Network interface to capture on (e.g., eth0)
        #[arg(short, long)]
        interface: Option<String>,

        /// Capture buffer size in bytes
        #[arg(long, value_parser = clap::value_parser!(u16).range(64..))]
        snaplen: Option<u16>,

        /// Do not put the interface into promiscuous mode
        #[arg(long)]
        no_promisc: bool,

        /// Stop after this many frames
        #[arg(short = 'c', long)]
        count: Option<u64>,
    },
    /// Print interface, address and route change notifications
    Monitor {
        /// Also subscribe to IPv6 address and route changes
        #[arg(long)]
        routes: bool,
    },
    /// List network interfaces
    Interfaces,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.verbose {
        config.log_level = "debug".to_string();
    }
    init_logging(&config.log_level);

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl-C, shutting down");
        flag.store(false, Ordering::SeqCst);
    }) {
        tracing::warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let result = match cli.command {
        Commands::Sniff {
            interface,
            snaplen,
            no_promisc,
            count,
        } => {
            if interface.is_some() {
                config.interface = interface;
            }
            if let Some(snaplen) = snaplen {
                config.snaplen = usize::from(snaplen);
            }
            if no_promisc {
                config.promiscuous = false;
            }
            run_sniff(&config, count, cli.verbose, running)
        }
        Commands::Monitor { routes } => run_monitor(routes, running),
        Commands::Interfaces => {
            for line in PnetCapture::list_interfaces() {
                println!("{}", line);
            }
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            if needs_privilege_hint(&e) {
                eprintln!("{}", PRIVILEGE_HINT);
            }
            ExitCode::FAILURE
        }
    }
}

/// Only errors that elevated privileges could fix get the sudo hint.
fn needs_privilege_hint(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<CaptureError>()
        .map(CaptureError::may_need_privileges)
        .or_else(|| {
            error
                .downcast_ref::<MonitorError>()
                .map(MonitorError::may_need_privileges)
        })
        .unwrap_or(false)
}

/// Log to stderr; `RUST_LOG` takes precedence over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_sniff(
    config: &Config,
    count: Option<u64>,
    verbose: bool,
    running: Arc<AtomicBool>,
) -> Result<()> {
    let capture = match &config.interface {
        Some(name) => PnetCapture::new(name),
        None => PnetCapture::on_default_interface(),
    }
    .context("failed to select capture interface")?;

    let mut capture = capture.with_options(config.capture_options());
    capture
        .open()
        .with_context(|| format!("failed to open capture on {}", capture.interface_name()))?;
    capture.set_running(running);

    let reporter = ConsoleReporter::new().with_verbose(verbose);
    Sniffer::new(capture, reporter)
        .with_limit(count)
        .run()
        .context("capture failed")?;

    Ok(())
}

#[cfg(target_os = "linux")]
fn run_monitor(routes: bool, running: Arc<AtomicBool>) -> Result<()> {
    use rawsniff::monitor::{
        interface_name, NetlinkEvent, NetlinkMonitor, DEFAULT_GROUPS, ROUTE_GROUPS,
    };

    let groups = if routes {
        DEFAULT_GROUPS | ROUTE_GROUPS
    } else {
        DEFAULT_GROUPS
    };

    let mut monitor = NetlinkMonitor::open(groups).context("failed to start interface monitor")?;
    monitor.set_running(running);

    while let Some(events) = monitor.next_events().context("netlink receive failed")? {
        for event in events {
            if let NetlinkEvent::Error(code) = event {
                if code != 0 {
                    tracing::warn!("Netlink reported error {}", code);
                }
            }
            for line in event.render(&interface_name) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run_monitor(_routes: bool, _running: Arc<AtomicBool>) -> Result<()> {
    anyhow::bail!("the interface monitor needs Linux rtnetlink")
}
